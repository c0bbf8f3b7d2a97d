use std::path::Path;

use crate::spatial_ref::SpatialRef;
use crate::test_utils::{collect_errors, SuppressErrorLog, TempFixture};
use crate::assert_almost_eq;

use super::{
    Feature, FeatureIterator, FieldValue, Geometry, LayerAccess, LayerCaps::*, LayerOptions,
    OGRFieldType, OGRwkbGeometryType, OpenFlags, ShapeLayer,
};

mod convert_geo;

const WGS84: &str = "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",\
                     SPHEROID[\"WGS 84\",6378137,298.257223563]],\
                     PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]]";

/// (geometry, highway, sort_key, lanes)
const ROADS: [(&str, &str, Option<f64>, Option<i32>); 4] = [
    ("LINESTRING (0 0,1 1)", "footway", Some(-9.0), Some(1)),
    ("LINESTRING (2 2,3 3)", "residential", Some(2.5), Some(2)),
    ("LINESTRING (10 10,11 12)", "residential", None, None),
    ("LINESTRING (-5 -5,-4 -6)", "primary", Some(1.25), Some(4)),
];

/// Write the roads layer to a fresh shapefile.
fn roads_fixture() -> TempFixture {
    let fixture = TempFixture::empty("roads.shp");
    let srs = SpatialRef::from_wkt(WGS84).unwrap();
    let mut layer = ShapeLayer::create(
        fixture.path(),
        &LayerOptions {
            ty: OGRwkbGeometryType::wkbLineString,
            srs: Some(&srs),
            ..Default::default()
        },
    )
    .unwrap();
    layer
        .create_defn_fields(&[
            ("highway", OGRFieldType::OFTString),
            ("sort_key", OGRFieldType::OFTReal),
            ("lanes", OGRFieldType::OFTInteger),
        ])
        .unwrap();
    for (wkt, highway, sort_key, lanes) in ROADS {
        let mut feature = Feature::new(layer.defn());
        feature
            .set_geometry_directly(Geometry::from_wkt(wkt).unwrap())
            .unwrap();
        feature.set_field_string(0, highway).unwrap();
        if let Some(sort_key) = sort_key {
            feature.set_field_double(1, sort_key).unwrap();
        }
        if let Some(lanes) = lanes {
            feature.set_field_integer(2, lanes).unwrap();
        }
        layer.create_feature(&mut feature).unwrap();
    }
    fixture
}

fn with_layer<F>(path: &Path, f: F)
where
    F: FnOnce(ShapeLayer),
{
    let layer = ShapeLayer::open(path, OpenFlags::READONLY).unwrap();
    f(layer);
}

fn with_features<F>(path: &Path, f: F)
where
    F: FnOnce(FeatureIterator<ShapeLayer>),
{
    with_layer(path, |mut layer| f(layer.features()));
}

fn with_feature<F>(path: &Path, fid: i64, f: F)
where
    F: FnOnce(Feature),
{
    with_layer(path, |mut layer| f(layer.feature(fid).unwrap().unwrap()));
}

fn point_layer(fixture: &TempFixture, fields: &[(&str, OGRFieldType)]) -> ShapeLayer {
    let mut layer = ShapeLayer::create(
        fixture.path(),
        &LayerOptions {
            ty: OGRwkbGeometryType::wkbPoint,
            ..Default::default()
        },
    )
    .unwrap();
    layer.create_defn_fields(fields).unwrap();
    layer
}

#[cfg(test)]
mod tests {
    use crate::errors::{OGRErr, OgrError};
    use crate::vector::{AlterFieldFlags, FieldDateTime, FieldDefn};

    use super::*;

    #[test]
    fn test_layer_name() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |layer| {
            assert_eq!(layer.name(), "roads");
        });
    }

    #[test]
    fn test_feature_count() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |mut layer| {
            assert_eq!(layer.feature_count().unwrap(), 4);
        });
    }

    #[test]
    fn test_feature() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |mut layer| {
            assert!(layer.feature(0).unwrap().is_some());
            assert!(layer.feature(3).unwrap().is_some());
            assert!(layer.feature(4).unwrap().is_none());
            assert!(layer.feature(-1).unwrap().is_none());
        });
    }

    #[test]
    fn test_iterate_features() {
        let fixture = roads_fixture();
        with_features(fixture.path(), |features| {
            assert_eq!(features.count(), 4);
        });
    }

    #[test]
    fn test_features_reset() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |mut layer| {
            assert_eq!(layer.features().count(), layer.features().count());
        });
    }

    #[test]
    fn test_fid() {
        let fixture = roads_fixture();
        with_features(fixture.path(), |features| {
            let fids: Vec<_> = features.map(|f| f.fid().unwrap()).collect();
            assert_eq!(fids, vec![0, 1, 2, 3]);
        });
    }

    #[test]
    fn test_string_field() {
        let fixture = roads_fixture();
        with_feature(fixture.path(), 0, |feature| {
            assert_eq!(
                feature.field("highway").unwrap().unwrap().into_string(),
                Some("footway".to_string())
            );
        });
        with_features(fixture.path(), |features| {
            assert_eq!(
                features
                    .filter(|feature| {
                        let highway = feature.field("highway").unwrap().unwrap().into_string();
                        highway == Some("residential".to_string())
                    })
                    .count(),
                2
            );
        });
    }

    #[test]
    fn test_null_field() {
        let fixture = roads_fixture();
        with_feature(fixture.path(), 2, |feature| {
            assert_eq!(feature.field("sort_key").unwrap(), None);
            assert_eq!(feature.field("lanes").unwrap(), None);
            assert!(!feature.is_field_set(1));
            assert!(feature.is_field_set(0));
        });
    }

    #[test]
    fn test_get_field_as_x() {
        let fixture = roads_fixture();
        with_feature(fixture.path(), 0, |feature| {
            let highway_field = 0;
            let sort_key_field = 1;

            assert_eq!(feature.field_as_string(highway_field).unwrap(), "footway");
            assert_eq!(feature.field_as_integer(sort_key_field).unwrap(), -9);
            assert_almost_eq(feature.field_as_double(sort_key_field).unwrap(), -9.0);
            assert_eq!(feature.field_as_integer(highway_field).unwrap(), 0);

            assert!(matches!(
                feature.field_as_string(23).unwrap_err(),
                OgrError::InvalidFieldIndex {
                    index: 23,
                    method_name: "field_as_string",
                }
            ));
        });
    }

    #[test]
    fn test_float_field() {
        let fixture = roads_fixture();
        with_feature(fixture.path(), 1, |feature| {
            assert_almost_eq(
                feature
                    .field("sort_key")
                    .unwrap()
                    .unwrap()
                    .into_real()
                    .unwrap(),
                2.5,
            );
            assert_eq!(
                feature.field("lanes").unwrap(),
                Some(FieldValue::Integer64Value(2))
            );
        });
    }

    #[test]
    fn test_missing_field() {
        let fixture = roads_fixture();
        with_feature(fixture.path(), 0, |feature| {
            assert!(feature.field("no such field").is_err());
        });
    }

    #[test]
    fn test_wkt() {
        let fixture = roads_fixture();
        with_feature(fixture.path(), 2, |feature| {
            let wkt = feature.geometry().unwrap().wkt().unwrap();
            assert_eq!(wkt, "LINESTRING (10 10,11 12)");
        });
    }

    #[test]
    fn test_schema() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |layer| {
            let fields = layer
                .defn()
                .fields()
                .map(|f| (f.name().to_string(), f.field_type(), f.width(), f.precision()))
                .collect::<Vec<_>>();
            assert_eq!(
                fields,
                vec![
                    ("highway".to_string(), OGRFieldType::OFTString, 80, 0),
                    ("sort_key".to_string(), OGRFieldType::OFTReal, 24, 15),
                    ("lanes".to_string(), OGRFieldType::OFTInteger64, 11, 0),
                ]
            );
        });
    }

    #[test]
    fn test_geom_fields() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |layer| {
            assert_eq!(layer.defn().geom_field_count(), 1);
            assert_eq!(
                layer.defn().geometry_type(),
                OGRwkbGeometryType::wkbLineString
            );
            let srs = layer.spatial_ref().unwrap();
            assert_eq!(srs.to_wkt().unwrap(), WGS84);
        });
    }

    #[test]
    fn test_unreadable_prj_is_ignored() {
        let fixture = roads_fixture();
        std::fs::write(fixture.with_extension("prj"), "not a coordinate system").unwrap();
        let (layer, messages) =
            collect_errors(|| ShapeLayer::open(fixture.path(), OpenFlags::READONLY));
        let layer = layer.unwrap();
        assert!(layer.spatial_ref().is_none());
        assert!(messages
            .iter()
            .any(|(_, msg)| msg.starts_with("Failed to parse .prj file")));
    }

    #[test]
    fn test_layer_get_extent() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |layer| {
            let extent = layer.get_extent().unwrap();
            assert_almost_eq(extent.MinX, -5.0);
            assert_almost_eq(extent.MaxX, 11.0);
            assert_almost_eq(extent.MinY, -6.0);
            assert_almost_eq(extent.MaxY, 12.0);
        });
    }

    #[test]
    fn test_layer_capabilities() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |layer| {
            assert!(!layer.has_capability(OLCFastSpatialFilter));
            assert!(layer.has_capability(OLCFastFeatureCount));
            assert!(layer.has_capability(OLCFastGetExtent));
            assert!(layer.has_capability(OLCRandomRead));
            assert!(!layer.has_capability(OLCSequentialWrite));
            assert!(!layer.has_capability(OLCCreateField));
        });
        let layer = ShapeLayer::open(fixture.path(), OpenFlags::UPDATE).unwrap();
        assert!(layer.has_capability(OLCSequentialWrite));
        assert!(layer.has_capability(OLCRandomWrite));
        assert!(layer.has_capability(OLCDeleteFeature));
        assert!(layer.has_capability(OLCCreateField));
    }

    #[test]
    fn test_spatial_filter() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |mut layer| {
            assert_eq!(layer.features().count(), 4);

            let bbox =
                Geometry::from_wkt("POLYGON ((-0.5 -0.5,-0.5 3.5,3.5 3.5,3.5 -0.5,-0.5 -0.5))")
                    .unwrap();
            layer.set_spatial_filter(&bbox);
            assert!(!layer.has_capability(OLCFastFeatureCount));
            assert_eq!(layer.features().count(), 2);
            assert_eq!(layer.feature_count().unwrap(), 2);

            // random reads ignore the filter
            assert!(layer.feature(2).unwrap().is_some());

            layer.clear_spatial_filter();
            assert_eq!(layer.features().count(), 4);
        });
    }

    #[test]
    fn test_write_features() {
        let fixture = TempFixture::empty("output.shp");
        {
            let mut layer = point_layer(
                &fixture,
                &[
                    ("Name", OGRFieldType::OFTString),
                    ("Value", OGRFieldType::OFTReal),
                    ("Int_value", OGRFieldType::OFTInteger),
                ],
            );
            layer
                .create_feature_fields(
                    Geometry::from_wkt("POINT (1 2)").unwrap(),
                    &["Name", "Value", "Int_value"],
                    &[
                        FieldValue::StringValue("Feature 1".to_string()),
                        FieldValue::RealValue(45.78),
                        FieldValue::IntegerValue(1),
                    ],
                )
                .unwrap();
            // files are synced here
        }

        with_layer(fixture.path(), |mut layer| {
            let ft = layer.features().next().unwrap();
            assert_eq!(ft.geometry().unwrap().wkt().unwrap(), "POINT (1 2)");
            assert_eq!(
                ft.field("Name").unwrap().unwrap().into_string(),
                Some("Feature 1".to_string())
            );
            assert_eq!(ft.field("Value").unwrap().unwrap().into_real(), Some(45.78));
            assert_eq!(ft.field("Int_value").unwrap().unwrap().into_int64(), Some(1));
        });
    }

    #[test]
    fn test_create_feature_assigns_fid() {
        let fixture = TempFixture::empty("fids.shp");
        let mut layer = point_layer(&fixture, &[]);
        for expected in 0..3 {
            let mut feature = Feature::new(layer.defn());
            feature.set_fid(Some(42));
            feature
                .set_geometry_directly(Geometry::from_wkt("POINT (0 0)").unwrap())
                .unwrap();
            layer.create_feature(&mut feature).unwrap();
            assert_eq!(feature.fid(), Some(expected));
        }
        assert_eq!(layer.feature_count().unwrap(), 3);
    }

    #[test]
    fn test_set_feature() {
        let fixture = roads_fixture();
        {
            let mut layer = ShapeLayer::open(fixture.path(), OpenFlags::UPDATE).unwrap();
            let mut feature = layer.feature(2).unwrap().unwrap();
            // sort_key of feature 2 is null; we set it.
            feature.set_field_double(1, 7.5).unwrap();
            // a longer geometry no longer fits in place
            feature
                .set_geometry_directly(
                    Geometry::from_wkt("LINESTRING (10 10,11 12,13 14,15 16)").unwrap(),
                )
                .unwrap();
            layer.set_feature(&feature).unwrap();
        }

        with_feature(fixture.path(), 2, |feature| {
            assert_eq!(feature.field_as_double(1).unwrap(), 7.5);
            assert_eq!(feature.field_as_string(0).unwrap(), "residential");
            assert_eq!(
                feature.geometry().unwrap().wkt().unwrap(),
                "LINESTRING (10 10,11 12,13 14,15 16)"
            );
        });
        with_layer(fixture.path(), |mut layer| {
            assert_eq!(layer.feature_count().unwrap(), 4);
            assert_almost_eq(layer.get_extent().unwrap().MaxX, 15.0);
        });
    }

    #[test]
    fn test_set_feature_needs_existing_fid() {
        let fixture = roads_fixture();
        let mut layer = ShapeLayer::open(fixture.path(), OpenFlags::UPDATE).unwrap();
        let mut feature = Feature::new(layer.defn());
        let _nolog = SuppressErrorLog::new();
        assert!(matches!(
            layer.set_feature(&feature).unwrap_err(),
            OgrError::OgrError {
                err: OGRErr::NonExistingFeature,
                method_name: "set_feature",
            }
        ));
        feature.set_fid(Some(4));
        assert!(layer.set_feature(&feature).is_err());
    }

    #[test]
    fn test_delete_feature() {
        let fixture = roads_fixture();
        {
            let mut layer = ShapeLayer::open(fixture.path(), OpenFlags::UPDATE).unwrap();
            layer.delete_feature(1).unwrap();
            assert_eq!(layer.feature_count().unwrap(), 3);
            assert!(layer.feature(1).unwrap().is_none());
            let fids: Vec<_> = layer.features().map(|f| f.fid().unwrap()).collect();
            assert_eq!(fids, vec![0, 2, 3]);

            let _nolog = SuppressErrorLog::new();
            assert!(matches!(
                layer.delete_feature(1).unwrap_err(),
                OgrError::OgrError {
                    err: OGRErr::NonExistingFeature,
                    method_name: "delete_feature",
                }
            ));
            assert!(layer.delete_feature(10).is_err());
            // dropping the layer repacks it
        }

        with_features(fixture.path(), |features| {
            let rows: Vec<_> = features
                .map(|f| (f.fid().unwrap(), f.field_as_string(0).unwrap()))
                .collect();
            assert_eq!(
                rows,
                vec![
                    (0, "footway".to_string()),
                    (1, "residential".to_string()),
                    (2, "primary".to_string()),
                ]
            );
        });
    }

    #[test]
    fn test_explicit_repack() {
        let fixture = roads_fixture();
        let mut layer = ShapeLayer::open(fixture.path(), OpenFlags::UPDATE).unwrap();
        layer.delete_feature(0).unwrap();
        layer.delete_feature(3).unwrap();
        layer.repack().unwrap();
        assert_eq!(layer.feature_count().unwrap(), 2);
        let feature = layer.feature(0).unwrap().unwrap();
        assert_eq!(feature.field_as_string(0).unwrap(), "residential");
        assert_eq!(
            feature.geometry().unwrap().wkt().unwrap(),
            "LINESTRING (2 2,3 3)"
        );
        let extent = layer.get_extent().unwrap();
        assert_almost_eq(extent.MinX, 2.0);
        assert_almost_eq(extent.MaxY, 12.0);
    }

    #[test]
    fn test_read_only_layer_rejects_writes() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |mut layer| {
            let _nolog = SuppressErrorLog::new();
            let mut feature = Feature::new(layer.defn());
            assert!(matches!(
                layer.create_feature(&mut feature).unwrap_err(),
                OgrError::NotWritable {
                    method_name: "create_feature",
                    ..
                }
            ));
            assert!(layer.delete_feature(0).is_err());
            drop(feature);
            assert!(layer
                .create_field(&FieldDefn::new("extra", OGRFieldType::OFTString), true)
                .is_err());
        });
    }

    #[test]
    fn test_create_field_on_populated_layer() {
        let fixture = roads_fixture();
        let mut layer = ShapeLayer::open(fixture.path(), OpenFlags::UPDATE).unwrap();
        let (result, messages) = collect_errors(|| {
            layer.create_field(&FieldDefn::new("extra", OGRFieldType::OFTString), true)
        });
        assert!(result.is_err());
        assert_eq!(
            messages.last().unwrap().1,
            "Can't create fields on a Shapefile layer with features."
        );
        assert_eq!(layer.defn().field_count(), 3);
    }

    #[test]
    fn test_create_field_while_features_alive() {
        let fixture = TempFixture::empty("in_use.shp");
        let mut layer = point_layer(&fixture, &[]);
        let feature = Feature::new(layer.defn());
        assert!(matches!(
            layer
                .create_field(&FieldDefn::new("name", OGRFieldType::OFTString), true)
                .unwrap_err(),
            OgrError::SchemaInUse { .. }
        ));
        drop(feature);
        layer
            .create_field(&FieldDefn::new("name", OGRFieldType::OFTString), true)
            .unwrap();
        assert_eq!(layer.defn().field_count(), 1);
    }

    #[test]
    fn test_create_field_types() {
        let fixture = TempFixture::empty("types.shp");
        let mut layer = point_layer(&fixture, &[]);

        let mut narrow = FieldDefn::new("code", OGRFieldType::OFTString);
        narrow.set_width(4);
        layer.create_field(&narrow, false).unwrap();

        let (result, messages) = collect_errors(|| {
            layer.create_field(&FieldDefn::new("seen", OGRFieldType::OFTDateTime), false)
        });
        result.unwrap();
        assert_eq!(
            messages[0].1,
            "Field seen create as date field, though DateTime requested."
        );

        let _nolog = SuppressErrorLog::new();
        assert!(matches!(
            layer
                .create_field(&FieldDefn::new("blob", OGRFieldType::OFTBinary), false)
                .unwrap_err(),
            OgrError::UnhandledFieldType {
                field_type: OGRFieldType::OFTBinary,
                method_name: "create_field",
            }
        ));

        let fields = layer
            .defn()
            .fields()
            .map(|f| (f.name().to_string(), f.field_type(), f.width()))
            .collect::<Vec<_>>();
        assert_eq!(
            fields,
            vec![
                ("code".to_string(), OGRFieldType::OFTString, 4),
                ("seen".to_string(), OGRFieldType::OFTDate, 8),
            ]
        );
    }

    #[test]
    fn test_field_name_laundering() {
        let fixture = TempFixture::empty("names.shp");
        let mut layer = point_layer(&fixture, &[]);
        let long_name = FieldDefn::new("population_2020", OGRFieldType::OFTInteger);
        {
            let _nolog = SuppressErrorLog::new();
            assert!(matches!(
                layer.create_field(&long_name, false).unwrap_err(),
                OgrError::InvalidFieldName { .. }
            ));
        }

        let (result, messages) = collect_errors(|| layer.create_field(&long_name, true));
        result.unwrap();
        assert_eq!(
            messages[0].1,
            "Normalized/laundered field name: 'population_2020' to 'population'"
        );
        layer
            .create_field(
                &FieldDefn::new("population_2021", OGRFieldType::OFTInteger),
                true,
            )
            .unwrap();

        let names: Vec<_> = layer.defn().fields().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["population", "populati_1"]);
    }

    #[test]
    fn test_delete_and_reorder_fields() {
        let fixture = roads_fixture();
        {
            let mut layer = ShapeLayer::open(fixture.path(), OpenFlags::UPDATE).unwrap();
            layer.reorder_fields(&[2, 0, 1]).unwrap();
            assert!(layer.reorder_fields(&[0, 0, 1]).is_err());
            layer.delete_field(2).unwrap();
            assert!(layer.delete_field(5).is_err());
            let names: Vec<_> = layer.defn().fields().map(|f| f.name().to_string()).collect();
            assert_eq!(names, vec!["lanes", "highway"]);
        }

        with_feature(fixture.path(), 3, |feature| {
            assert_eq!(feature.field_count(), 2);
            assert_eq!(feature.field_as_integer(0).unwrap(), 4);
            assert_eq!(feature.field_as_string(1).unwrap(), "primary");
        });
    }

    #[test]
    fn test_date_field() {
        let fixture = TempFixture::empty("dates.shp");
        {
            let mut layer = point_layer(&fixture, &[("day", OGRFieldType::OFTDate)]);
            let mut feature = Feature::new(layer.defn());
            feature
                .set_field_date_time(0, FieldDateTime::date(2020, 2, 29))
                .unwrap();
            layer.create_feature(&mut feature).unwrap();
            let mut empty = Feature::new(layer.defn());
            layer.create_feature(&mut empty).unwrap();
        }

        with_layer(fixture.path(), |mut layer| {
            assert_eq!(layer.defn().field_defn(0).unwrap().field_type(), OGRFieldType::OFTDate);
            let feature = layer.feature(0).unwrap().unwrap();
            assert_eq!(
                feature.field_as_date_time(0).unwrap(),
                Some(FieldDateTime::date(2020, 2, 29))
            );
            assert!(feature.geometry().is_none());
            let empty = layer.feature(1).unwrap().unwrap();
            assert!(!empty.is_field_set(0));
        });
    }

    #[test]
    fn test_string_truncation_warns_once() {
        let fixture = TempFixture::empty("narrow.shp");
        let mut layer = point_layer(&fixture, &[]);
        let mut narrow = FieldDefn::new("code", OGRFieldType::OFTString);
        narrow.set_width(5);
        layer.create_field(&narrow, false).unwrap();

        let (_, messages) = collect_errors(|| {
            for _ in 0..2 {
                let mut feature = Feature::new(layer.defn());
                feature.set_field_string(0, "abcdefgh").unwrap();
                layer.create_feature(&mut feature).unwrap();
            }
        });
        assert_eq!(messages.len(), 1);
        assert!(messages[0]
            .1
            .starts_with("Value 'abcdefgh' of field code has been truncated to 5 characters."));

        let feature = layer.feature(1).unwrap().unwrap();
        assert_eq!(feature.field_as_string(0).unwrap(), "abcde");
    }

    #[test]
    fn test_number_too_wide() {
        let fixture = TempFixture::empty("wide.shp");
        let mut layer = point_layer(&fixture, &[]);
        let mut small = FieldDefn::new("small", OGRFieldType::OFTInteger);
        small.set_width(3);
        layer.create_field(&small, false).unwrap();

        let mut feature = Feature::new(layer.defn());
        feature.set_field_integer(0, 12345).unwrap();
        let (result, messages) = collect_errors(|| layer.create_feature(&mut feature));
        result.unwrap();
        assert_eq!(
            messages[0].1,
            "Value 12345 of field small of feature 0 not successfully written. \
             Possibly due to too larger number with respect to field width"
        );
    }

    #[test]
    fn test_geometry_type_mismatch() {
        let fixture = TempFixture::empty("points.shp");
        let mut layer = point_layer(&fixture, &[]);
        let mut feature = Feature::new(layer.defn());
        feature
            .set_geometry_directly(Geometry::from_wkt("LINESTRING (0 0,1 1)").unwrap())
            .unwrap();
        assert!(matches!(
            layer.create_feature(&mut feature).unwrap_err(),
            OgrError::UnsupportedGeometryType {
                geometry_type: OGRwkbGeometryType::wkbLineString,
                target: "POINT",
            }
        ));
        assert_eq!(layer.feature_count().unwrap(), 0);
    }

    #[test]
    fn test_shape_type_from_first_feature() {
        let fixture = TempFixture::empty("auto.shp");
        {
            let mut layer = ShapeLayer::create(fixture.path(), &LayerOptions::default()).unwrap();
            assert_eq!(layer.defn().geometry_type(), OGRwkbGeometryType::wkbUnknown);
            let mut feature = Feature::new(layer.defn());
            feature
                .set_geometry_directly(
                    Geometry::from_wkt("POLYGON ((0 0,0 1,1 1,1 0,0 0))").unwrap(),
                )
                .unwrap();
            layer.create_feature(&mut feature).unwrap();
            // The feature still holds the definition.
            assert_eq!(layer.defn().geometry_type(), OGRwkbGeometryType::wkbPolygon);
            assert_eq!(
                feature.defn().geometry_type(),
                OGRwkbGeometryType::wkbPolygon
            );
        }
        with_layer(fixture.path(), |layer| {
            assert_eq!(layer.defn().geometry_type(), OGRwkbGeometryType::wkbPolygon);
        });
    }

    #[test]
    fn test_reset_geom_type() {
        let fixture = TempFixture::empty("reset.shp");
        let mut layer = ShapeLayer::create(fixture.path(), &LayerOptions::default()).unwrap();
        layer
            .reset_geom_type(OGRwkbGeometryType::wkbMultiPoint)
            .unwrap();
        assert_eq!(
            layer.defn().geometry_type(),
            OGRwkbGeometryType::wkbMultiPoint
        );
        for extension in ["shp", "shx"] {
            let bytes = std::fs::read(fixture.with_extension(extension)).unwrap();
            assert_eq!(&bytes[32..36], &8i32.to_le_bytes());
        }

        let mut feature = Feature::new(layer.defn());
        feature
            .set_geometry_directly(Geometry::from_wkt("MULTIPOINT ((1 2),(3 4))").unwrap())
            .unwrap();
        layer.create_feature(&mut feature).unwrap();
        drop(feature);

        let _nolog = SuppressErrorLog::new();
        assert!(layer.reset_geom_type(OGRwkbGeometryType::wkbPoint).is_err());
    }

    #[test]
    fn test_multi_part_arcs() {
        let fixture = TempFixture::empty("arcs.shp");
        {
            let mut layer = ShapeLayer::create(
                fixture.path(),
                &LayerOptions {
                    ty: OGRwkbGeometryType::wkbMultiLineString,
                    ..Default::default()
                },
            )
            .unwrap();
            for wkt in [
                "MULTILINESTRING ((0 0,1 1),(2 2,3 3))",
                "LINESTRING (5 5,6 6)",
            ] {
                let mut feature = Feature::new(layer.defn());
                feature
                    .set_geometry_directly(Geometry::from_wkt(wkt).unwrap())
                    .unwrap();
                layer.create_feature(&mut feature).unwrap();
            }
        }
        with_layer(fixture.path(), |mut layer| {
            let wkts: Vec<_> = layer
                .features()
                .map(|f| f.geometry().unwrap().wkt().unwrap())
                .collect();
            assert_eq!(
                wkts,
                vec![
                    "MULTILINESTRING ((0 0,1 1),(2 2,3 3))".to_string(),
                    "LINESTRING (5 5,6 6)".to_string(),
                ]
            );
        });
    }

    #[test]
    fn test_polygon_with_hole() {
        let fixture = TempFixture::empty("holes.shp");
        let wkt = "POLYGON ((0 0,0 10,10 10,10 0,0 0),(2 2,4 2,4 4,2 2))";
        {
            let mut layer = ShapeLayer::create(
                fixture.path(),
                &LayerOptions {
                    ty: OGRwkbGeometryType::wkbPolygon,
                    ..Default::default()
                },
            )
            .unwrap();
            layer
                .create_feature_fields(Geometry::from_wkt(wkt).unwrap(), &[], &[])
                .unwrap();
        }
        with_feature(fixture.path(), 0, |feature| {
            assert_eq!(feature.geometry().unwrap().wkt().unwrap(), wkt);
        });
    }

    #[test]
    fn test_shpt_option() {
        let fixture = TempFixture::empty("shpt.shp");
        let options = crate::cpl::CslStringList::from(&[("SHPT", "arcz")]);
        let layer = ShapeLayer::create(
            fixture.path(),
            &LayerOptions {
                options: Some(&options),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(layer.shape_type(), crate::vector::ShapeType::ArcZ);
        assert_eq!(
            layer.defn().geometry_type(),
            OGRwkbGeometryType::wkbLineString
        );
    }

    #[test]
    fn test_unsupported_layer_geometry_type() {
        let fixture = TempFixture::empty("none.shp");
        let _nolog = SuppressErrorLog::new();
        for ty in [
            OGRwkbGeometryType::wkbNone,
            OGRwkbGeometryType::wkbGeometryCollection,
        ] {
            assert!(ShapeLayer::create(
                fixture.path(),
                &LayerOptions {
                    ty,
                    ..Default::default()
                },
            )
            .is_err());
        }
    }

    #[test]
    fn test_restore_shx() {
        let fixture = roads_fixture();
        std::fs::remove_file(fixture.with_extension("shx")).unwrap();

        assert!(matches!(
            ShapeLayer::open(fixture.path(), OpenFlags::READONLY),
            Err(OgrError::CorruptFile { .. })
        ));

        crate::config::set_thread_local_config_option("SHAPE_RESTORE_SHX", "YES").unwrap();
        let layer = ShapeLayer::open(fixture.path(), OpenFlags::READONLY);
        crate::config::clear_thread_local_config_option("SHAPE_RESTORE_SHX").unwrap();
        let mut layer = layer.unwrap();
        assert_eq!(layer.feature_count().unwrap(), 4);
        assert!(fixture.with_extension("shx").exists());
        let debug = format!("{layer:?}");
        assert!(debug.starts_with("ShapeLayer"));
        assert!(debug.contains("records: 4"));
        drop(layer);

        with_feature(fixture.path(), 3, |feature| {
            assert_eq!(
                feature.geometry().unwrap().wkt().unwrap(),
                "LINESTRING (-5 -5,-4 -6)"
            );
        });
    }

    #[test]
    fn test_ignored_fields() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |mut layer| {
            assert!(layer.has_capability(OLCIgnoreFields));
            layer
                .set_ignored_fields(&["highway", "OGR_GEOMETRY"])
                .unwrap();
            let feature = layer.feature(0).unwrap().unwrap();
            assert!(!feature.is_field_set(0));
            assert!(feature.is_field_set(2));
            assert!(feature.geometry().is_none());
            drop(feature);

            assert!(layer.set_ignored_fields(&["no_such_field"]).is_err());
            layer.set_ignored_fields(&[]).unwrap();
            let feature = layer.feature(0).unwrap().unwrap();
            assert!(feature.is_field_set(0));
            assert!(feature.geometry().is_some());
        });
    }

    #[test]
    fn test_wide_integer_columns() {
        let fixture = TempFixture::empty("wide_ints.shp");
        {
            let mut layer = point_layer(&fixture, &[("big", OGRFieldType::OFTInteger64)]);
            let mut ten = FieldDefn::new("ten", OGRFieldType::OFTInteger);
            ten.set_width(10);
            layer.create_field(&ten, false).unwrap();
            let mut whole = FieldDefn::new("whole", OGRFieldType::OFTReal);
            whole.set_width(20);
            layer.create_field(&whole, false).unwrap();

            let mut feature = Feature::new(layer.defn());
            feature.set_field_integer64(0, 5_000_000_000).unwrap();
            feature.set_field_integer(1, 2_000_000_000).unwrap();
            feature.set_field_double(2, 1e19).unwrap();
            layer.create_feature(&mut feature).unwrap();
        }

        with_layer(fixture.path(), |mut layer| {
            let fields = layer
                .defn()
                .fields()
                .map(|f| (f.field_type(), f.width()))
                .collect::<Vec<_>>();
            assert_eq!(
                fields,
                vec![
                    (OGRFieldType::OFTInteger64, 18),
                    (OGRFieldType::OFTInteger64, 10),
                    (OGRFieldType::OFTReal, 20),
                ]
            );
            let feature = layer.feature(0).unwrap().unwrap();
            assert_eq!(
                feature.field("big").unwrap(),
                Some(FieldValue::Integer64Value(5_000_000_000))
            );
            assert_eq!(feature.field_as_integer64(1).unwrap(), 2_000_000_000);
            assert_eq!(feature.field_as_double(2).unwrap(), 1e19);
        });
    }

    #[test]
    fn test_alter_field_defn() {
        let fixture = roads_fixture();
        with_layer(fixture.path(), |mut layer| {
            let _nolog = SuppressErrorLog::new();
            let rename = FieldDefn::new("kind", OGRFieldType::OFTString);
            assert!(matches!(
                layer.alter_field_defn(0, &rename, AlterFieldFlags::NAME),
                Err(OgrError::NotWritable { .. })
            ));
        });

        {
            let mut layer = ShapeLayer::open(fixture.path(), OpenFlags::UPDATE).unwrap();
            assert!(layer.has_capability(OLCAlterFieldDefn));

            let mut kind = FieldDefn::new("road_kind_of_way", OGRFieldType::OFTString);
            kind.set_width(8);
            layer
                .alter_field_defn(
                    0,
                    &kind,
                    AlterFieldFlags::NAME | AlterFieldFlags::WIDTH_PRECISION,
                )
                .unwrap();
            let lanes = FieldDefn::new("lanes", OGRFieldType::OFTString);
            layer
                .alter_field_defn(2, &lanes, AlterFieldFlags::TYPE)
                .unwrap();

            let _nolog = SuppressErrorLog::new();
            let to_integer = FieldDefn::new("sort_key", OGRFieldType::OFTInteger);
            assert!(layer
                .alter_field_defn(1, &to_integer, AlterFieldFlags::TYPE)
                .is_err());
            assert!(matches!(
                layer.alter_field_defn(7, &kind, AlterFieldFlags::ALL),
                Err(OgrError::InvalidFieldIndex { index: 7, .. })
            ));
            let clash = FieldDefn::new("sort_key", OGRFieldType::OFTString);
            assert!(layer
                .alter_field_defn(0, &clash, AlterFieldFlags::NAME)
                .is_err());

            let feature = layer.feature(1).unwrap().unwrap();
            assert_eq!(feature.field_as_string(0).unwrap(), "resident");
            assert_eq!(feature.field_as_string(2).unwrap(), "2");
        }

        with_layer(fixture.path(), |mut layer| {
            let fields = layer
                .defn()
                .fields()
                .map(|f| (f.name().to_string(), f.field_type(), f.width()))
                .collect::<Vec<_>>();
            assert_eq!(
                fields,
                vec![
                    ("road_kind_".to_string(), OGRFieldType::OFTString, 8),
                    ("sort_key".to_string(), OGRFieldType::OFTReal, 24),
                    ("lanes".to_string(), OGRFieldType::OFTString, 11),
                ]
            );
            let feature = layer.feature(3).unwrap().unwrap();
            assert_eq!(feature.field_as_string(0).unwrap(), "primary");
            assert_eq!(feature.field_as_double(1).unwrap(), 1.25);
            assert_eq!(feature.field_as_string(2).unwrap(), "4");
            assert!(!layer.feature(2).unwrap().unwrap().is_field_set(2));
        });
    }

    #[test]
    fn test_integer_to_integer64() {
        let fixture = TempFixture::empty("counts.shp");
        {
            let mut layer = point_layer(&fixture, &[]);
            let mut count = FieldDefn::new("count", OGRFieldType::OFTInteger);
            count.set_width(9);
            layer.create_field(&count, false).unwrap();
            let mut feature = Feature::new(layer.defn());
            feature.set_field_integer(0, 123_456_789).unwrap();
            layer.create_feature(&mut feature).unwrap();
        }

        let mut layer = ShapeLayer::open(fixture.path(), OpenFlags::UPDATE).unwrap();
        assert_eq!(
            layer.defn().field_defn(0).unwrap().field_type(),
            OGRFieldType::OFTInteger
        );
        let mut wide = FieldDefn::new("count", OGRFieldType::OFTInteger64);
        wide.set_width(18);
        layer
            .alter_field_defn(
                0,
                &wide,
                AlterFieldFlags::TYPE | AlterFieldFlags::WIDTH_PRECISION,
            )
            .unwrap();
        let mut feature = Feature::new(layer.defn());
        feature.set_field_integer64(0, 98_765_432_109).unwrap();
        layer.create_feature(&mut feature).unwrap();
        drop(feature);
        drop(layer);

        with_layer(fixture.path(), |mut layer| {
            let values = layer
                .features()
                .map(|f| f.field_as_integer64(0).unwrap())
                .collect::<Vec<_>>();
            assert_eq!(values, vec![123_456_789, 98_765_432_109]);
        });
    }

    #[test]
    fn test_code_page_round_trip() {
        let fixture = TempFixture::empty("latin.shp");
        let options = crate::cpl::CslStringList::from(&[("ENCODING", "1252")]);
        {
            let mut layer = ShapeLayer::create(
                fixture.path(),
                &LayerOptions {
                    ty: OGRwkbGeometryType::wkbPoint,
                    options: Some(&options),
                    ..Default::default()
                },
            )
            .unwrap();
            assert_eq!(layer.encoding(), "windows-1252");
            layer
                .create_defn_fields(&[("city", OGRFieldType::OFTString)])
                .unwrap();
            let mut feature = Feature::new(layer.defn());
            feature.set_field_string(0, "Orléans").unwrap();
            layer.create_feature(&mut feature).unwrap();
        }
        assert_eq!(
            std::fs::read_to_string(fixture.with_extension("cpg")).unwrap(),
            "1252"
        );
        let dbf = std::fs::read(fixture.with_extension("dbf")).unwrap();
        assert!(dbf.windows(7).any(|w| w == b"Orl\xe9ans"));
        with_feature(fixture.path(), 0, |feature| {
            assert_eq!(feature.field_as_string(0).unwrap(), "Orléans");
        });

        crate::config::set_thread_local_config_option("SHAPE_ENCODING", "").unwrap();
        let layer = ShapeLayer::open(fixture.path(), OpenFlags::READONLY);
        crate::config::clear_thread_local_config_option("SHAPE_ENCODING").unwrap();
        let mut layer = layer.unwrap();
        assert_eq!(layer.encoding(), "UTF-8");
        let feature = layer.feature(0).unwrap().unwrap();
        assert_eq!(feature.field_as_string(0).unwrap(), "Orl\u{FFFD}ans");
    }

    #[test]
    fn test_default_code_page_is_utf8() {
        let fixture = TempFixture::empty("utf8.shp");
        let layer = point_layer(&fixture, &[("name", OGRFieldType::OFTString)]);
        assert_eq!(layer.encoding(), "UTF-8");
        drop(layer);
        assert_eq!(
            std::fs::read_to_string(fixture.with_extension("cpg")).unwrap(),
            "UTF-8"
        );
    }

    #[test]
    fn test_feature_schema_must_match() {
        let fixture = TempFixture::empty("target.shp");
        let source_fixture = TempFixture::empty("source.shp");
        let twin_fixture = TempFixture::empty("twin.shp");
        let mut layer = point_layer(&fixture, &[]);
        let source = point_layer(&source_fixture, &[("name", OGRFieldType::OFTString)]);
        let mut twin = point_layer(&twin_fixture, &[("label", OGRFieldType::OFTString)]);

        let mut feature = Feature::new(source.defn());
        feature
            .set_geometry_directly(Geometry::from_wkt("POINT (1 1)").unwrap())
            .unwrap();
        feature.set_field_string(0, "stray").unwrap();
        {
            let _nolog = SuppressErrorLog::new();
            assert!(matches!(
                layer.create_feature(&mut feature),
                Err(OgrError::BadArgument(_))
            ));
            assert_eq!(layer.feature_count().unwrap(), 0);
            feature.set_fid(Some(0));
            assert!(layer.set_feature(&feature).is_err());
        }

        // Same field types under another definition.
        twin.create_feature(&mut feature).unwrap();
        assert_eq!(twin.feature(0).unwrap().unwrap().field_as_string(0).unwrap(), "stray");
    }
}
