use crate::vector::Geometry;

/// # Geometric Predicates
///
/// These methods provide common [spatial relations](https://en.wikipedia.org/wiki/DE-9IM#Spatial_predicates) between
/// two geometries.
impl Geometry {
    /// Tests if two geometries [_intersect_][DE-9IM];
    /// `self` and `other` have at least one point in common.
    ///
    /// There is no rigorous topology engine behind this: `true` is returned
    /// if the envelopes (bounding boxes) of the two geometries overlap.
    /// Empty geometries intersect nothing.
    ///
    /// [DE-9IM]: https://en.wikipedia.org/wiki/DE-9IM#Spatial_predicates
    pub fn intersects(&self, other: &Self) -> bool {
        match (self.envelope(), other.envelope()) {
            (Some(a), Some(b)) => a.intersects(&b),
            _ => false,
        }
    }

    /// Tests if two geometries are structurally equal: same type, same
    /// vertices in the same order.
    pub fn equals(&self, other: &Self) -> bool {
        self.as_geo() == other.as_geo()
    }
}

#[cfg(test)]
mod tests {
    use geo_types::{line_string, point, polygon};

    use crate::vector::Geometry;

    #[test]
    fn test_intersects_by_envelope() {
        let square = Geometry::from_geo(
            polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)]
                .into(),
        );
        let inside = Geometry::from_geo(point!(x: 5.0, y: 5.0).into());
        let outside = Geometry::from_geo(point!(x: 15.0, y: 5.0).into());
        let crossing =
            Geometry::from_geo(line_string![(x: -5.0, y: 5.0), (x: 5.0, y: 20.0)].into());

        assert!(square.intersects(&inside));
        assert!(inside.intersects(&square));
        assert!(!square.intersects(&outside));
        assert!(square.intersects(&crossing));
    }

    #[test]
    fn test_equals() {
        let a = Geometry::from_geo(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into());
        let b = Geometry::from_geo(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into());
        let c = Geometry::from_geo(line_string![(x: 1.0, y: 1.0), (x: 0.0, y: 0.0)].into());
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
    }
}
