//! Vector Data
//!
//! The feature model (definitions, features, field values and their
//! coercions) and a Shapefile layer built on top of it.
//!
//! ## Reading
//!
//! ```no_run
//! use ogr_shape::vector::{LayerAccess, OpenFlags, ShapeLayer};
//!
//! let mut layer = ShapeLayer::open("roads.shp", OpenFlags::READONLY).unwrap();
//! for feature in layer.features() {
//!     let highway_field = feature.field("highway").unwrap();
//!     let geometry = feature.geometry();
//!     println!(
//!         "{:?} {:?}",
//!         highway_field.and_then(|v| v.into_string()),
//!         geometry.map(|g| g.wkt().unwrap())
//!     );
//! }
//! ```
//!
//! ## Writing
//!
//! ```no_run
//! use ogr_shape::vector::{
//!     FieldDefn, FieldValue, LayerAccess, LayerOptions, OGRFieldType, OGRwkbGeometryType,
//!     ShapeLayer, ToOgr,
//! };
//!
//! let mut layer = ShapeLayer::create(
//!     "cities.shp",
//!     &LayerOptions {
//!         ty: OGRwkbGeometryType::wkbPoint,
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//! layer
//!     .create_field(&FieldDefn::new("name", OGRFieldType::OFTString), true)
//!     .unwrap();
//! let geometry = geo_types::Point::new(4.83, 45.76).to_ogr().unwrap();
//! layer
//!     .create_feature_fields(
//!         geometry,
//!         &["name"],
//!         &[FieldValue::StringValue("Lyon".to_string())],
//!     )
//!     .unwrap();
//! ```

pub use crate::vector::defn::Defn;
pub use crate::vector::feature::{
    Feature, SpecialField, StyleTable, ValidateFlags, NULL_FID, SPECIAL_FIELD_COUNT, SPF_FID,
    SPF_OGR_GEOMETRY, SPF_OGR_GEOM_AREA, SPF_OGR_GEOM_WKT, SPF_OGR_STYLE,
};
pub use crate::vector::field_defn::{FieldDefn, GeomFieldDefn};
pub use crate::vector::field_type::{
    are_type_subtype_compatible, field_sub_type_to_name, field_type_code_to_name,
    field_type_to_name, OGRFieldSubType, OGRFieldType, OGRJustification,
};
pub use crate::vector::field_value::{
    FieldDateTime, FieldValue, TZ_LOCALTIME, TZ_UNKNOWN, TZ_UTC,
};
pub use crate::vector::geometry::{Geometry, OGREnvelope};
pub use crate::vector::geometry_type::{geometry_type_to_name, OGRwkbGeometryType};
pub use crate::vector::layer::{FeatureIterator, LayerAccess, LayerCaps};
pub use crate::vector::options::{AlterFieldFlags, LayerOptions, OpenFlags};
pub use crate::vector::shape::{ShapeLayer, ShapeType};

use crate::errors::Result;

/// Convert object to an OGR geometry.
pub trait ToOgr {
    fn to_ogr(&self) -> Result<Geometry>;
}

mod defn;
mod feature;
mod field_defn;
mod field_type;
pub(crate) mod field_value;
mod geo_to_ogr;
mod geometry;
mod geometry_type;
mod layer;
mod ogr_to_geo;
mod ops;
mod options;
mod shape;

#[cfg(test)]
mod vector_tests;
