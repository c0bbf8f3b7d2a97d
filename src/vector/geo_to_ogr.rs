use crate::errors::Result;
use crate::vector::{Geometry, ToOgr};

macro_rules! impl_to_ogr {
    ($($ty:ident),* $(,)?) => {
        $(
            impl ToOgr for geo_types::$ty<f64> {
                fn to_ogr(&self) -> Result<Geometry> {
                    Ok(Geometry::from_geo(geo_types::Geometry::$ty(self.clone())))
                }
            }
        )*
    };
}

impl_to_ogr!(
    Point,
    Line,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    Rect,
    Triangle,
);

impl ToOgr for geo_types::Geometry<f64> {
    fn to_ogr(&self) -> Result<Geometry> {
        Ok(Geometry::from_geo(self.clone()))
    }
}

impl From<geo_types::Geometry<f64>> for Geometry {
    fn from(geometry: geo_types::Geometry<f64>) -> Self {
        Geometry::from_geo(geometry)
    }
}
