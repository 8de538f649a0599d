// SPDX-License-Identifier: MIT OR Apache-2.0

//! The element category registry.

use std::any::Any;
use std::fmt;

/// Stable identifier for the element type stored in a block.
///
/// Category `0` is reserved for the empty sentinel; the standard element
/// types occupy the low range, and client-defined categories start at
/// [`CategoryId::USER_START`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(u32);

impl CategoryId {
    /// The empty sentinel; no element block ever carries this category.
    pub const EMPTY: Self = Self(0);

    pub const BOOLEAN: Self = Self(1);
    pub const INT8: Self = Self(2);
    pub const UINT8: Self = Self(3);
    pub const INT16: Self = Self(4);
    pub const UINT16: Self = Self(5);
    pub const INT32: Self = Self(6);
    pub const UINT32: Self = Self(7);
    pub const INT64: Self = Self(8);
    pub const UINT64: Self = Self(9);
    pub const FLOAT32: Self = Self(10);
    pub const FLOAT64: Self = Self(11);
    pub const STRING: Self = Self(12);

    /// First category available to client-defined element types.
    pub const USER_START: Self = Self(50);

    /// The `offset`-th client-defined category.
    pub const fn user(offset: u32) -> Self {
        Self(Self::USER_START.0 + offset)
    }

    pub const fn is_empty_category(self) -> bool {
        self.0 == Self::EMPTY.0
    }
}

/// A type storable in a [`MultiTypeVector`][crate::MultiTypeVector].
///
/// Implementations must pick a [`CategoryId`] that is unique within the
/// application and never [`CategoryId::EMPTY`]; two element types sharing a
/// category would make typed access ambiguous.
pub trait Element: Any + Clone + PartialEq + fmt::Debug {
    const CATEGORY: CategoryId;
}

macro_rules! impl_standard_element {
    ($($ty:ty => $category:expr,)*) => {
        $(
            impl Element for $ty {
                const CATEGORY: CategoryId = $category;
            }
        )*
    };
}

impl_standard_element! {
    bool => CategoryId::BOOLEAN,
    i8 => CategoryId::INT8,
    u8 => CategoryId::UINT8,
    i16 => CategoryId::INT16,
    u16 => CategoryId::UINT16,
    i32 => CategoryId::INT32,
    u32 => CategoryId::UINT32,
    i64 => CategoryId::INT64,
    u64 => CategoryId::UINT64,
    f32 => CategoryId::FLOAT32,
    f64 => CategoryId::FLOAT64,
    String => CategoryId::STRING,
}
