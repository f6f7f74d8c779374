// Re-export parry for the appropriate float size
#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

/// Default distance tolerance, used when a caller has no tuned value.
///
/// Every predicate in this crate takes its tolerance explicitly; degenerate
/// real-world inputs (coplanar, near-parallel, flush-contact geometry) need a
/// per-dataset value, so nothing below reads this constant implicitly.
#[cfg(feature = "f32")]
pub const DEFAULT_EPSILON: Real = 1e-4;
/// Default distance tolerance, used when a caller has no tuned value.
///
/// Every predicate in this crate takes its tolerance explicitly; degenerate
/// real-world inputs (coplanar, near-parallel, flush-contact geometry) need a
/// per-dataset value, so nothing below reads this constant implicitly.
#[cfg(feature = "f64")]
pub const DEFAULT_EPSILON: Real = 1e-6;
