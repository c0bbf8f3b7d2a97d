//! ESRI Shapefile storage: a `.shp` geometry file, its `.shx` index and a
//! `.dbf` attribute table.

mod codepage;
mod dbf;
mod layer;
mod shape2ogr;
mod shp;

pub use layer::ShapeLayer;
pub use shp::ShapeType;
