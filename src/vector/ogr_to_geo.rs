use std::convert::TryFrom;

use crate::errors::{OgrError, Result};
use crate::vector::Geometry;

impl From<Geometry> for geo_types::Geometry<f64> {
    fn from(geometry: Geometry) -> geo_types::Geometry<f64> {
        geometry.into_geo()
    }
}

impl TryFrom<&Geometry> for geo_types::Point<f64> {
    type Error = OgrError;

    fn try_from(geometry: &Geometry) -> Result<Self> {
        match geometry.as_geo() {
            geo_types::Geometry::Point(p) => Ok(*p),
            _ => Err(OgrError::UnsupportedGeometryType {
                geometry_type: geometry.geometry_type(),
                target: "point",
            }),
        }
    }
}

impl TryFrom<&Geometry> for geo_types::LineString<f64> {
    type Error = OgrError;

    fn try_from(geometry: &Geometry) -> Result<Self> {
        match geometry.as_geo() {
            geo_types::Geometry::LineString(ls) => Ok(ls.clone()),
            _ => Err(OgrError::UnsupportedGeometryType {
                geometry_type: geometry.geometry_type(),
                target: "line string",
            }),
        }
    }
}

impl TryFrom<&Geometry> for geo_types::Polygon<f64> {
    type Error = OgrError;

    fn try_from(geometry: &Geometry) -> Result<Self> {
        match geometry.as_geo() {
            geo_types::Geometry::Polygon(p) => Ok(p.clone()),
            _ => Err(OgrError::UnsupportedGeometryType {
                geometry_type: geometry.geometry_type(),
                target: "polygon",
            }),
        }
    }
}
