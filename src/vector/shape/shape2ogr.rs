//! Conversion between shapefile records and features.

use std::rc::Rc;

use geo_types::{Coord, LineString, MultiLineString, MultiPoint, Point, Polygon};

use crate::config::cpl_error;
use crate::errors::*;
use crate::utils::format_g;
use crate::vector::shape::dbf::{DbfField, DbfFile, DbfRecord};
use crate::vector::shape::shp::{ShapeRecord, ShapeType, ShpFile};
use crate::vector::{Defn, Feature, FieldDateTime, FieldDefn, Geometry, OGRFieldType};

/// Field type a DBF column is read as.
///
/// Numbers without decimals are integers: 32 bit ones below 10 digits, 64
/// bit ones up to 18 digits. Wider numbers are reals.
pub(crate) fn column_field_type(column: &DbfField) -> OGRFieldType {
    match column.kind {
        b'C' => OGRFieldType::OFTString,
        b'N' | b'F' if column.decimals == 0 && column.width < 10 => OGRFieldType::OFTInteger,
        b'N' | b'F' if column.decimals == 0 && column.width <= 18 => OGRFieldType::OFTInteger64,
        b'D' => OGRFieldType::OFTDate,
        _ => OGRFieldType::OFTReal,
    }
}

/// Build the layer definition from the DBF columns and the `.shp` shape type.
pub(crate) fn derive_feature_schema(name: &str, shp: &ShpFile, dbf: &DbfFile) -> Defn {
    let mut defn = Defn::new(name);
    for column in dbf.fields() {
        let field_type = column_field_type(column);
        let mut field = FieldDefn::new(&column.name, field_type);
        field.set_width(column.width as i32);
        if field_type == OGRFieldType::OFTReal {
            field.set_precision(column.decimals as i32);
        }
        defn.add_field_defn(&field);
    }
    defn.set_geom_type(shp.shape_type().geometry_type());
    defn
}

/// Read the geometry of record `index`, `None` for a null shape.
pub(crate) fn read_geometry(shp: &mut ShpFile, index: usize) -> Result<Option<Geometry>> {
    let record = shp.read_record(index)?;
    Ok(record_to_geometry(&record))
}

fn ring(coords: &[Coord<f64>]) -> LineString<f64> {
    LineString::from(coords.to_vec())
}

pub(crate) fn record_to_geometry(record: &ShapeRecord) -> Option<Geometry> {
    if record.vertices.is_empty() {
        return None;
    }
    let geometry: geo_types::Geometry<f64> = match record.shape_type.flatten() {
        ShapeType::Point => Point::from(record.vertices[0]).into(),
        ShapeType::MultiPoint => record
            .vertices
            .iter()
            .map(|c| Point::from(*c))
            .collect::<MultiPoint<f64>>()
            .into(),
        ShapeType::Arc => {
            let mut lines: Vec<LineString<f64>> = record.parts().map(ring).collect();
            if lines.len() == 1 {
                lines.remove(0).into()
            } else {
                MultiLineString::new(lines).into()
            }
        }
        ShapeType::Polygon => {
            let mut rings = record.parts().map(ring);
            let exterior = rings.next()?;
            Polygon::new(exterior, rings.collect()).into()
        }
        _ => return None,
    };
    Some(Geometry::from_geo(geometry))
}

fn unsupported(geometry: &Geometry, shape_type: ShapeType) -> OgrError {
    OgrError::UnsupportedGeometryType {
        geometry_type: geometry.geometry_type(),
        target: shape_type.name(),
    }
}

/// Lay out `geometry` as a record of the file's `shape_type`.
///
/// The geometry must belong to the family of the shape type. Empty
/// geometries become null shapes.
pub(crate) fn geometry_to_record(
    shape_type: ShapeType,
    geometry: Option<&Geometry>,
) -> Result<ShapeRecord> {
    let geometry = match geometry {
        Some(g) if !g.is_empty() => g,
        _ => return Ok(ShapeRecord::null()),
    };
    use geo_types::Geometry as G;

    let mut parts: Vec<Vec<Coord<f64>>> = Vec::new();
    match (shape_type.flatten(), geometry.as_geo()) {
        (ShapeType::Point, G::Point(p)) => parts.push(vec![p.0]),
        (ShapeType::MultiPoint, G::Point(p)) => parts.push(vec![p.0]),
        (ShapeType::MultiPoint, G::MultiPoint(mp)) => {
            parts.push(mp.iter().map(|p| p.0).collect());
        }
        (ShapeType::Arc, G::Line(line)) => parts.push(vec![line.start, line.end]),
        (ShapeType::Arc, G::LineString(ls)) => parts.push(ls.0.clone()),
        (ShapeType::Arc, G::MultiLineString(mls)) => {
            parts.extend(mls.iter().filter(|ls| !ls.0.is_empty()).map(|ls| ls.0.clone()));
        }
        (ShapeType::Polygon, G::Polygon(poly)) => push_rings(&mut parts, poly),
        (ShapeType::Polygon, G::Rect(rect)) => push_rings(&mut parts, &rect.to_polygon()),
        (ShapeType::Polygon, G::Triangle(tri)) => push_rings(&mut parts, &tri.to_polygon()),
        (ShapeType::Polygon, G::MultiPolygon(mpoly)) => {
            for poly in mpoly {
                push_rings(&mut parts, poly);
            }
        }
        _ => return Err(unsupported(geometry, shape_type)),
    }

    let mut record = ShapeRecord {
        shape_type,
        part_starts: Vec::with_capacity(parts.len()),
        vertices: Vec::new(),
    };
    for part in parts {
        record.part_starts.push(record.vertices.len());
        record.vertices.extend(part);
    }
    Ok(record)
}

fn push_rings(parts: &mut Vec<Vec<Coord<f64>>>, polygon: &Polygon<f64>) {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .filter(|ring| !ring.0.is_empty())
        .for_each(|ring| parts.push(ring.0.clone()));
}

/// Write `geometry` as shape `index`; `index == record_count()` appends.
pub(crate) fn write_geometry(
    shp: &mut ShpFile,
    index: usize,
    geometry: Option<&Geometry>,
) -> Result<()> {
    let shape_type = shp.shape_type();
    if shape_type.flatten() == ShapeType::MultiPatch {
        return Err(OgrError::OgrError {
            err: OGRErr::UnsupportedGeometryType,
            method_name: "write_geometry",
        });
    }
    let record = geometry_to_record(shape_type, geometry)?;
    shp.write_record(index, &record)
}

/// Read record `index` as a feature of `defn`, with the record number as id.
///
/// Ignored fields and an ignored geometry are not read. Null DBF values
/// leave the field unset.
pub(crate) fn read_feature(
    shp: &mut ShpFile,
    dbf: &mut DbfFile,
    defn: &Rc<Defn>,
    index: usize,
) -> Result<Feature> {
    if index >= dbf.record_count() {
        return Err(OgrError::BadArgument(format!(
            "attempt to read shape with feature id ({index}) out of available range"
        )));
    }
    let mut feature = Feature::new(defn);
    if !defn.is_geometry_ignored() {
        if let Some(geometry) = read_geometry(shp, index)? {
            feature.set_geometry_directly(geometry)?;
        }
    }

    let record = dbf.read_record(index)?;
    for (i, field) in defn.fields().enumerate() {
        if field.is_ignored() {
            continue;
        }
        let column = dbf.field(i).ok_or_else(|| OgrError::InvalidFieldIndex {
            index: i,
            method_name: "read_feature",
        })?;
        if record.is_null(column) {
            continue;
        }
        match field.field_type() {
            OGRFieldType::OFTString => feature.set_field_string(i, &record.string(column))?,
            OGRFieldType::OFTInteger => feature.set_field_integer(i, record.integer(column))?,
            OGRFieldType::OFTInteger64 => {
                feature.set_field_integer64(i, record.integer64(column))?
            }
            OGRFieldType::OFTReal => feature.set_field_double(i, record.double(column))?,
            OGRFieldType::OFTDate => {
                if let Some((year, month, day)) = record.date(column) {
                    feature.set_field_date_time(i, FieldDateTime::date(year, month, day))?;
                }
            }
            field_type => {
                return Err(OgrError::UnhandledFieldType {
                    field_type,
                    method_name: "read_feature",
                })
            }
        }
    }
    feature.set_fid(Some(index as i64));
    Ok(feature)
}

fn writable_field_type(field_type: OGRFieldType) -> bool {
    matches!(
        field_type,
        OGRFieldType::OFTString
            | OGRFieldType::OFTInteger
            | OGRFieldType::OFTInteger64
            | OGRFieldType::OFTReal
            | OGRFieldType::OFTDate
            | OGRFieldType::OFTDateTime
    )
}

/// Write `feature` as record `fid`, or as a new record when it has no id.
/// Returns the record number written.
///
/// `truncation_warned` limits string truncation warnings to one per layer.
pub(crate) fn write_feature(
    shp: &mut ShpFile,
    dbf: &mut DbfFile,
    defn: &Defn,
    feature: &Feature,
    truncation_warned: &mut bool,
) -> Result<usize> {
    let index = match feature.fid() {
        Some(fid) => usize::try_from(fid)?,
        None => dbf.record_count(),
    };
    if let Some(field) = defn.fields().find(|f| !writable_field_type(f.field_type())) {
        return Err(OgrError::UnhandledFieldType {
            field_type: field.field_type(),
            method_name: "write_feature",
        });
    }

    write_geometry(shp, index, feature.geometry())?;

    let mut record = if index < dbf.record_count() {
        dbf.read_record(index)?
    } else {
        dbf.blank_record()
    };
    for (i, field) in defn.fields().enumerate() {
        let column = dbf.field(i).ok_or_else(|| OgrError::InvalidFieldIndex {
            index: i,
            method_name: "write_feature",
        })?;
        write_attribute(&mut record, column, field, feature, i, index, truncation_warned)?;
    }
    dbf.write_record(index, &record)?;
    Ok(index)
}

fn write_attribute(
    record: &mut DbfRecord,
    column: &DbfField,
    field: &FieldDefn,
    feature: &Feature,
    i: usize,
    index: usize,
    truncation_warned: &mut bool,
) -> Result<()> {
    if !feature.is_field_set(i) {
        record.write_null(column);
        return Ok(());
    }
    let not_written = |value: String| {
        cpl_error(
            CplErrType::Warning,
            cple::APP_DEFINED,
            &format!(
                "Value {value} of field {} of feature {index} not successfully written. \
                 Possibly due to too larger number with respect to field width",
                field.name()
            ),
        )
    };
    match field.field_type() {
        OGRFieldType::OFTString => {
            let value = feature.field_as_string(i)?;
            if !record.write_string(column, &value) && !*truncation_warned {
                cpl_error(
                    CplErrType::Warning,
                    cple::APP_DEFINED,
                    &format!(
                        "Value '{value}' of field {} has been truncated to {} characters.\n\
                         This warning will not be emitted any more for that layer.",
                        field.name(),
                        column.width
                    ),
                );
                *truncation_warned = true;
            }
        }
        OGRFieldType::OFTInteger | OGRFieldType::OFTInteger64 => {
            let value = feature.field_as_integer64(i)?;
            if !record.write_integer(column, value) {
                not_written(value.to_string());
            }
        }
        OGRFieldType::OFTReal => {
            let value = feature.field_as_double(i)?;
            if !record.write_double(column, value) {
                not_written(format_g(value, 15));
            }
        }
        OGRFieldType::OFTDate | OGRFieldType::OFTDateTime => {
            match feature.field_as_date_time(i)? {
                Some(dt) => {
                    record.write_date(column, dt.year, dt.month, dt.day);
                }
                None => record.write_null(column),
            }
        }
        field_type => {
            return Err(OgrError::UnhandledFieldType {
                field_type,
                method_name: "write_feature",
            })
        }
    }
    Ok(())
}
