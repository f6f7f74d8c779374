//! Convex **cell complexes** from planar primitive arrangements, built by recursive
//! space partitioning with [BSP](https://en.wikipedia.org/wiki/Binary_space_partitioning) trees.
//!
//! Given an ordered set of cutting planes (typically fitted to the faces of a
//! reconstructed surface) and an initial bounding volume, [`CellComplex::construct`]
//! partitions the volume into convex polyhedral cells and discovers which cells share
//! a boundary facet. Downstream consumers label, extract, or re-export those cells.
//!
//! # Features
//! - **f64**: use f64 as Real (default)
//! - **f32**: use f32 as Real, this conflicts with f64
//!
//! Parallel adjacency assembly is selected at runtime via the `parallel` argument of
//! [`CellComplex::construct`]; it changes wall-clock time only, never the result.

#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod aabb;
pub mod adjacency;
pub mod broadphase;
pub mod bsp;
pub mod cell;
pub mod complex;
pub mod errors;
pub mod float_types;
pub mod plane;
pub mod polygon;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use bsp::BspTree;
pub use cell::Cell;
pub use complex::CellComplex;
pub use errors::ConstructError;
pub use plane::Plane;
pub use polygon::Polygon;
