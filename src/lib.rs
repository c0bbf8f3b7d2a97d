//! OGR-style vector features with a native Shapefile/DBF store.
//!
//! A self describing schema ([`vector::Defn`]) is shared by every
//! [`vector::Feature`] built from it. Features hold typed, nullable field
//! values which convert between types following the OGR coercion rules, and
//! geometries backed by [`geo_types`].
//!
//! [`vector::ShapeLayer`] reads and writes the `.shp`/`.shx`/`.dbf` triple
//! of an ESRI Shapefile.
//!
//! ## Use
//!
//! ```no_run
//! use ogr_shape::vector::{LayerAccess, OpenFlags, ShapeLayer};
//!
//! let mut layer = ShapeLayer::open("roads.shp", OpenFlags::READONLY).unwrap();
//! for feature in layer.features() {
//!     let index = feature.field_index("highway").unwrap();
//!     let highway = feature.field_as_string(index).unwrap();
//!     println!("{} {:?}", highway, feature.geometry().map(|g| g.wkt()));
//! }
//! ```
//!
//! Warnings raised on the way (an integer that had to be clamped, a string
//! truncated to its column width) are sent to [`config::cpl_error`], which
//! logs through `tracing` unless a handler is installed with
//! [`config::set_error_handler`].

#![crate_name = "ogr_shape"]
#![crate_type = "lib"]

pub mod config;
pub mod cpl;
pub mod errors;
pub mod spatial_ref;
pub(crate) mod utils;
pub mod vector;

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(test)]
fn assert_almost_eq(a: f64, b: f64) {
    let diff: f64 = b - a;
    assert!(diff.abs() < f64::EPSILON);
}
