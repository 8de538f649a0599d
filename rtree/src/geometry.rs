// SPDX-License-Identifier: MIT OR Apache-2.0

//! Points, extents and the R* cost metrics computed over them.

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Key requirements for spatial coordinates.
///
/// Subtraction and multiplication feed the area / margin / overlap metrics;
/// `Default` doubles as the zero of those metrics. Both the primitive
/// integers and floats qualify.
pub trait SpatialKey:
    Copy
    + Default
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + fmt::Debug
{
}

impl<T> SpatialKey for T where
    T: Copy
        + Default
        + PartialOrd
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + fmt::Debug
{
}

/// A point in `D`-dimensional key space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<K, const D: usize> {
    pub coords: [K; D],
}

impl<K: SpatialKey, const D: usize> Point<K, D> {
    pub fn new(coords: [K; D]) -> Self {
        Self { coords }
    }
}

impl<K: SpatialKey, const D: usize> Default for Point<K, D> {
    fn default() -> Self {
        Self {
            coords: [K::default(); D],
        }
    }
}

impl<K: SpatialKey, const D: usize> From<[K; D]> for Point<K, D> {
    fn from(coords: [K; D]) -> Self {
        Self { coords }
    }
}

impl<K: SpatialKey + fmt::Display, const D: usize> fmt::Display for Point<K, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, coord) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{coord}")?;
        }
        write!(f, ")")
    }
}

/// An axis-aligned bounding box: `start[d] <= end[d]` in every dimension.
///
/// A point is an extent whose `start` equals its `end`. Containment and
/// intersection treat the box as closed on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent<K, const D: usize> {
    pub start: Point<K, D>,
    pub end: Point<K, D>,
}

impl<K: SpatialKey, const D: usize> Extent<K, D> {
    pub fn new(start: Point<K, D>, end: Point<K, D>) -> Self {
        debug_assert!(
            start
                .coords
                .iter()
                .zip(end.coords.iter())
                .all(|(s, e)| s <= e),
            "extent start must not exceed its end in any dimension"
        );
        Self { start, end }
    }

    /// The degenerate extent covering exactly one point.
    pub fn from_point(point: Point<K, D>) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    pub fn contains_point(&self, point: &Point<K, D>) -> bool {
        (0..D).all(|d| self.start.coords[d] <= point.coords[d] && point.coords[d] <= self.end.coords[d])
    }

    pub fn contains(&self, other: &Self) -> bool {
        (0..D).all(|d| {
            self.start.coords[d] <= other.start.coords[d]
                && other.end.coords[d] <= self.end.coords[d]
        })
    }

    pub fn intersects(&self, other: &Self) -> bool {
        (0..D).all(|d| {
            self.start.coords[d] <= other.end.coords[d]
                && other.start.coords[d] <= self.end.coords[d]
        })
    }

    /// Whether `other` touches this extent's boundary in any dimension.
    ///
    /// Used to decide whether removing `other` can possibly shrink this
    /// extent: an interior box never does.
    pub fn contains_at_boundary(&self, other: &Self) -> bool {
        (0..D).any(|d| {
            self.start.coords[d] == other.start.coords[d]
                || other.end.coords[d] == self.end.coords[d]
        })
    }

    /// Grow this extent to cover `other`. Returns whether it grew.
    pub fn extend_to_fit(&mut self, other: &Self) -> bool {
        let mut enlarged = false;
        for d in 0..D {
            if other.start.coords[d] < self.start.coords[d] {
                self.start.coords[d] = other.start.coords[d];
                enlarged = true;
            }
            if self.end.coords[d] < other.end.coords[d] {
                self.end.coords[d] = other.end.coords[d];
                enlarged = true;
            }
        }
        enlarged
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut merged = *self;
        merged.extend_to_fit(other);
        merged
    }

    /// Product of the edge lengths.
    pub fn area(&self) -> K {
        let mut area = self.end.coords[0] - self.start.coords[0];
        for d in 1..D {
            area = area * (self.end.coords[d] - self.start.coords[d]);
        }
        area
    }

    /// Sum of one edge length per dimension, as used by the R* split-axis
    /// selection.
    pub fn half_margin(&self) -> K {
        let mut margin = self.end.coords[0] - self.start.coords[0];
        for d in 1..D {
            margin = margin + (self.end.coords[d] - self.start.coords[d]);
        }
        margin
    }

    /// Length of the overlap between two extents along one dimension; zero
    /// when they do not overlap there.
    fn linear_intersection(&self, other: &Self, d: usize) -> K {
        let (mut start1, mut end1) = (self.start.coords[d], self.end.coords[d]);
        let (mut start2, mut end2) = (other.start.coords[d], other.end.coords[d]);

        if start1 > start2 {
            std::mem::swap(&mut start1, &mut start2);
            std::mem::swap(&mut end1, &mut end2);
        }

        if end1 < start2 {
            // Disjoint along this dimension.
            return K::default();
        }
        if end1 < end2 {
            return end1 - start2;
        }
        end2 - start2
    }

    /// Volume of the intersection of two extents; zero when they are
    /// disjoint along any dimension.
    pub fn intersection_volume(&self, other: &Self) -> K {
        let mut volume = self.linear_intersection(other, 0);
        if volume == K::default() {
            return K::default();
        }
        for d in 1..D {
            let segment = self.linear_intersection(other, d);
            if segment == K::default() {
                return K::default();
            }
            volume = volume * segment;
        }
        volume
    }

    /// How much this extent's area would grow to accommodate `guest`.
    pub fn area_enlargement(&self, guest: &Self) -> K {
        let mut enlarged = *self;
        if !enlarged.extend_to_fit(guest) {
            return K::default();
        }
        enlarged.area() - self.area()
    }
}

impl<K: SpatialKey, const D: usize> Default for Extent<K, D> {
    fn default() -> Self {
        Self {
            start: Point::default(),
            end: Point::default(),
        }
    }
}

impl<K: SpatialKey + fmt::Display, const D: usize> fmt::Display for Extent<K, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}
