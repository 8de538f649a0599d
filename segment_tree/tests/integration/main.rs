// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for segment_tree.

mod stabbing;
