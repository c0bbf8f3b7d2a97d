//! Spatial reference systems
//!
//! A [`SpatialRef`] is an immutable WKT definition. Geometry field definitions
//! share one through `Rc`, so assigning it is a reference increment rather
//! than a copy, and replacing it is the only way to change it.

mod srs;

pub use srs::SpatialRef;
