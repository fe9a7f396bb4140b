//! Strongly typed identifier wrappers and the allocator that hands them out.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Ordering matters: the density
//! comparator breaks ties in favour of the lower [`IntersectionId`], which is
//! the intersection allocated first.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Generate a typed ID wrapper around a `u32`.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u32> for $name {
            #[inline(always)]
            fn from(raw: u32) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// One of the paired intersections ("light systems").
    pub struct IntersectionId;
}

typed_id! {
    /// A single traffic light inside an intersection.
    pub struct LightId;
}

typed_id! {
    /// A vehicle-counting scanner bound to one light.
    pub struct ScannerId;
}

// ── IdAllocator ───────────────────────────────────────────────────────────────

/// First intersection id handed out by [`IdAllocator::default`].
pub const INTERSECTION_BASE: u32 = 305;
/// First light id handed out by [`IdAllocator::default`].
pub const LIGHT_BASE: u32 = 805;
/// First scanner id handed out by [`IdAllocator::default`].
pub const SCANNER_BASE: u32 = 9023;

/// Monotonic id sequences, one per id kind.
///
/// Owned by the orchestrator and passed by reference into setup code; there
/// is no process-wide counter.  Allocation only needs `&self`, so one
/// allocator can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct IdAllocator {
    intersections: AtomicU32,
    lights:        AtomicU32,
    scanners:      AtomicU32,
}

impl IdAllocator {
    /// Allocator whose three sequences start at the given values.
    pub fn new(intersection_base: u32, light_base: u32, scanner_base: u32) -> Self {
        Self {
            intersections: AtomicU32::new(intersection_base),
            lights:        AtomicU32::new(light_base),
            scanners:      AtomicU32::new(scanner_base),
        }
    }

    #[inline]
    pub fn next_intersection(&self) -> IntersectionId {
        IntersectionId(self.intersections.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn next_light(&self) -> LightId {
        LightId(self.lights.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn next_scanner(&self) -> ScannerId {
        ScannerId(self.scanners.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(INTERSECTION_BASE, LIGHT_BASE, SCANNER_BASE)
    }
}
