use std::fmt::{Debug, Formatter};

use geo_types::{Coord, LineString, Polygon};

use crate::errors::{OgrError, Result};
use crate::vector::OGRwkbGeometryType;

/// Rectangle bounding a geometry, or a layer's content.
#[allow(non_snake_case)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OGREnvelope {
    pub MinX: f64,
    pub MaxX: f64,
    pub MinY: f64,
    pub MaxY: f64,
}

impl OGREnvelope {
    pub fn intersects(&self, other: &OGREnvelope) -> bool {
        self.MinX <= other.MaxX
            && self.MaxX >= other.MinX
            && self.MinY <= other.MaxY
            && self.MaxY >= other.MinY
    }

    /// Grow this envelope to cover `other`.
    pub fn merge(&mut self, other: &OGREnvelope) {
        self.MinX = self.MinX.min(other.MinX);
        self.MaxX = self.MaxX.max(other.MaxX);
        self.MinY = self.MinY.min(other.MinY);
        self.MaxY = self.MaxY.max(other.MaxY);
    }
}

/// A 2D vector geometry.
///
/// Backed by a [`geo_types::Geometry`] restricted to the kinds OGR knows:
/// `Line`, `Rect` and `Triangle` are normalized to `LineString` and `Polygon`
/// on construction. Cloning is a deep copy.
#[derive(Clone, PartialEq)]
pub struct Geometry {
    inner: geo_types::Geometry<f64>,
}

impl Geometry {
    /// Wrap a geo-types geometry.
    pub fn from_geo(geometry: geo_types::Geometry<f64>) -> Geometry {
        Geometry {
            inner: Self::normalize(geometry),
        }
    }

    fn normalize(geometry: geo_types::Geometry<f64>) -> geo_types::Geometry<f64> {
        use geo_types::Geometry as G;
        match geometry {
            G::Line(line) => G::LineString(LineString::from(vec![line.start, line.end])),
            G::Rect(rect) => G::Polygon(rect.to_polygon()),
            G::Triangle(triangle) => G::Polygon(triangle.to_polygon()),
            G::GeometryCollection(collection) => G::GeometryCollection(
                collection.into_iter().map(Self::normalize).collect(),
            ),
            other => other,
        }
    }

    /// Create an empty geometry of the given type.
    ///
    /// Points cannot be empty, so `wkbPoint` is rejected.
    pub fn empty(ty: OGRwkbGeometryType) -> Result<Geometry> {
        use geo_types::Geometry as G;
        let inner = match ty.flatten() {
            OGRwkbGeometryType::wkbLineString => G::LineString(LineString::new(vec![])),
            OGRwkbGeometryType::wkbPolygon => {
                G::Polygon(Polygon::new(LineString::new(vec![]), vec![]))
            }
            OGRwkbGeometryType::wkbMultiPoint => G::MultiPoint(geo_types::MultiPoint(vec![])),
            OGRwkbGeometryType::wkbMultiLineString => {
                G::MultiLineString(geo_types::MultiLineString(vec![]))
            }
            OGRwkbGeometryType::wkbMultiPolygon => {
                G::MultiPolygon(geo_types::MultiPolygon(vec![]))
            }
            OGRwkbGeometryType::wkbGeometryCollection => {
                G::GeometryCollection(geo_types::GeometryCollection(vec![]))
            }
            _ => {
                return Err(OgrError::BadArgument(format!(
                    "Cannot create an empty geometry of type {ty}"
                )))
            }
        };
        Ok(Geometry { inner })
    }

    pub fn as_geo(&self) -> &geo_types::Geometry<f64> {
        &self.inner
    }

    pub fn into_geo(self) -> geo_types::Geometry<f64> {
        self.inner
    }

    /// The geometry type. Geometries are 2D, so Z and M are never set.
    pub fn geometry_type(&self) -> OGRwkbGeometryType {
        use geo_types::Geometry as G;
        match &self.inner {
            G::Point(_) => OGRwkbGeometryType::wkbPoint,
            G::Line(_) | G::LineString(_) => OGRwkbGeometryType::wkbLineString,
            G::Polygon(_) | G::Rect(_) | G::Triangle(_) => OGRwkbGeometryType::wkbPolygon,
            G::MultiPoint(_) => OGRwkbGeometryType::wkbMultiPoint,
            G::MultiLineString(_) => OGRwkbGeometryType::wkbMultiLineString,
            G::MultiPolygon(_) => OGRwkbGeometryType::wkbMultiPolygon,
            G::GeometryCollection(_) => OGRwkbGeometryType::wkbGeometryCollection,
        }
    }

    /// WKT name of the geometry, e.g. `POLYGON`.
    pub fn geometry_name(&self) -> &'static str {
        match self.geometry_type() {
            OGRwkbGeometryType::wkbPoint => "POINT",
            OGRwkbGeometryType::wkbLineString => "LINESTRING",
            OGRwkbGeometryType::wkbPolygon => "POLYGON",
            OGRwkbGeometryType::wkbMultiPoint => "MULTIPOINT",
            OGRwkbGeometryType::wkbMultiLineString => "MULTILINESTRING",
            OGRwkbGeometryType::wkbMultiPolygon => "MULTIPOLYGON",
            _ => "GEOMETRYCOLLECTION",
        }
    }

    pub fn is_empty(&self) -> bool {
        use geo_types::Geometry as G;
        match &self.inner {
            G::Point(_) | G::Line(_) | G::Rect(_) | G::Triangle(_) => false,
            G::LineString(ls) => ls.0.is_empty(),
            G::Polygon(poly) => poly.exterior().0.is_empty(),
            G::MultiPoint(mp) => mp.0.is_empty(),
            G::MultiLineString(mls) => mls.0.iter().all(|ls| ls.0.is_empty()),
            G::MultiPolygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
            G::GeometryCollection(gc) => gc
                .0
                .iter()
                .all(|g| Geometry::from_geo(g.clone()).is_empty()),
        }
    }

    /// Number of direct sub-geometries: members of a collection, rings of a polygon.
    pub fn geometry_count(&self) -> usize {
        use geo_types::Geometry as G;
        match &self.inner {
            G::Polygon(poly) if poly.exterior().0.is_empty() => 0,
            G::Polygon(poly) => 1 + poly.interiors().len(),
            G::MultiPoint(mp) => mp.0.len(),
            G::MultiLineString(mls) => mls.0.len(),
            G::MultiPolygon(mp) => mp.0.len(),
            G::GeometryCollection(gc) => gc.0.len(),
            _ => 0,
        }
    }

    /// Number of vertices of a point or line string, 0 for other kinds.
    pub fn point_count(&self) -> usize {
        use geo_types::Geometry as G;
        match &self.inner {
            G::Point(_) => 1,
            G::LineString(ls) => ls.0.len(),
            _ => 0,
        }
    }

    /// Visit every vertex, in storage order.
    pub(crate) fn for_each_coord(&self, mut f: impl FnMut(Coord<f64>)) {
        fn visit(g: &geo_types::Geometry<f64>, f: &mut dyn FnMut(Coord<f64>)) {
            use geo_types::Geometry as G;
            let ring = |ls: &LineString<f64>, f: &mut dyn FnMut(Coord<f64>)| {
                ls.0.iter().for_each(|c| f(*c))
            };
            let polygon = |p: &Polygon<f64>, f: &mut dyn FnMut(Coord<f64>)| {
                ring(p.exterior(), f);
                p.interiors().iter().for_each(|r| ring(r, f));
            };
            match g {
                G::Point(p) => f(p.0),
                G::Line(l) => {
                    f(l.start);
                    f(l.end);
                }
                G::LineString(ls) => ring(ls, f),
                G::Polygon(p) => polygon(p, f),
                G::MultiPoint(mp) => mp.0.iter().for_each(|p| f(p.0)),
                G::MultiLineString(mls) => mls.0.iter().for_each(|ls| ring(ls, f)),
                G::MultiPolygon(mp) => mp.0.iter().for_each(|p| polygon(p, f)),
                G::GeometryCollection(gc) => gc.0.iter().for_each(|g| visit(g, f)),
                G::Rect(r) => polygon(&r.to_polygon(), f),
                G::Triangle(t) => polygon(&t.to_polygon(), f),
            }
        }
        visit(&self.inner, &mut f);
    }

    /// Computes and returns the axis-aligned 2D bounding envelope, `None` when empty.
    pub fn envelope(&self) -> Option<OGREnvelope> {
        let mut envelope: Option<OGREnvelope> = None;
        self.for_each_coord(|c| {
            let point = OGREnvelope {
                MinX: c.x,
                MaxX: c.x,
                MinY: c.y,
                MaxY: c.y,
            };
            match envelope.as_mut() {
                Some(env) => env.merge(&point),
                None => envelope = Some(point),
            }
        });
        envelope
    }

    /// Compute geometry area in square units of the coordinate system.
    ///
    /// Holes are subtracted from their polygon; points and lines have no area.
    pub fn area(&self) -> f64 {
        fn ring_area(ring: &LineString<f64>) -> f64 {
            let coords = &ring.0;
            let n = coords.len();
            if n < 3 {
                return 0.0;
            }
            let twice: f64 = (0..n)
                .map(|i| {
                    let a = coords[i];
                    let b = coords[(i + 1) % n];
                    a.x * b.y - b.x * a.y
                })
                .sum();
            (twice / 2.0).abs()
        }
        fn polygon_area(p: &Polygon<f64>) -> f64 {
            ring_area(p.exterior()) - p.interiors().iter().map(ring_area).sum::<f64>()
        }
        fn area(g: &geo_types::Geometry<f64>) -> f64 {
            use geo_types::Geometry as G;
            match g {
                G::Polygon(p) => polygon_area(p),
                G::MultiPolygon(mp) => mp.0.iter().map(polygon_area).sum(),
                G::GeometryCollection(gc) => gc.0.iter().map(area).sum(),
                G::Rect(r) => r.width() * r.height(),
                G::Triangle(t) => polygon_area(&t.to_polygon()),
                _ => 0.0,
            }
        }
        area(&self.inner)
    }
}

impl Debug for Geometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.wkt() {
            Ok(wkt) => f.write_str(wkt.as_str()),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use geo_types::{coord, line_string, point, polygon, Rect};

    use super::*;
    use crate::assert_almost_eq;

    #[test]
    fn test_normalizes_geo_types() {
        let rect = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 1.0 });
        let geom = Geometry::from_geo(rect.into());
        assert_eq!(geom.geometry_type(), OGRwkbGeometryType::wkbPolygon);
        assert_almost_eq(geom.area(), 2.0);

        let line = geo_types::Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        let geom = Geometry::from_geo(line.into());
        assert_eq!(geom.geometry_name(), "LINESTRING");
        assert_eq!(geom.point_count(), 2);
    }

    #[test]
    fn test_area_subtracts_holes() {
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 1.0, y: 2.0), (x: 1.0, y: 1.0)]],
        );
        let geom = Geometry::from_geo(poly.into());
        assert_almost_eq(geom.area(), 99.0);
        assert_eq!(geom.geometry_count(), 2);

        let line = Geometry::from_geo(line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 5.0)].into());
        assert_eq!(line.area(), 0.0);
    }

    #[test]
    fn test_envelope() {
        let geom = Geometry::from_geo(
            line_string![(x: -1.0, y: 4.0), (x: 3.0, y: -2.0), (x: 0.5, y: 0.5)].into(),
        );
        let env = geom.envelope().unwrap();
        assert_eq!(
            env,
            OGREnvelope {
                MinX: -1.0,
                MaxX: 3.0,
                MinY: -2.0,
                MaxY: 4.0
            }
        );
        let empty = Geometry::empty(OGRwkbGeometryType::wkbMultiPoint).unwrap();
        assert!(empty.is_empty());
        assert!(empty.envelope().is_none());
        assert!(Geometry::empty(OGRwkbGeometryType::wkbPoint).is_err());
    }

    #[test]
    fn test_clone_is_deep() {
        let geom = Geometry::from_geo(point!(x: 1.0, y: 2.0).into());
        let copy = geom.clone();
        assert_eq!(geom, copy);
        assert_eq!(copy.point_count(), 1);
    }
}
