// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for multi_type_vector.

mod custom;
mod properties;
mod transfer;
