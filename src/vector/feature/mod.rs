use std::rc::Rc;

use crate::errors::{OgrError, Result};
use crate::vector::{Defn, FieldValue, Geometry};

mod coercion;
mod dump;
mod set_from;
mod special;
mod style;
mod validate;

pub use special::{
    SpecialField, SPECIAL_FIELD_COUNT, SPF_FID, SPF_OGR_GEOMETRY, SPF_OGR_GEOM_AREA,
    SPF_OGR_GEOM_WKT, SPF_OGR_STYLE,
};
pub use style::StyleTable;
pub use validate::ValidateFlags;

/// Feature id of a feature that has not been assigned one.
pub const NULL_FID: i64 = -1;

/// OGR Feature
///
/// A feature holds one value slot per attribute field and one geometry slot
/// per geometry field of the [`Defn`] it was created from. The definition is
/// shared: it stays referenced, and cannot be modified, while the feature
/// lives.
#[derive(Debug)]
pub struct Feature {
    defn: Rc<Defn>,
    fid: i64,
    fields: Vec<Option<FieldValue>>,
    geometries: Vec<Option<Geometry>>,
    style_string: Option<String>,
    style_table: Option<StyleTable>,
}

impl Feature {
    /// Create an empty feature: every field unset, every geometry absent.
    pub fn new(defn: &Rc<Defn>) -> Feature {
        defn.reference();
        Feature {
            defn: Rc::clone(defn),
            fid: NULL_FID,
            fields: vec![None; defn.field_count()],
            geometries: vec![None; defn.geom_field_count()],
            style_string: None,
            style_table: None,
        }
    }

    pub fn defn(&self) -> &Rc<Defn> {
        &self.defn
    }

    /// The feature id, `None` while unassigned.
    pub fn fid(&self) -> Option<i64> {
        if self.fid == NULL_FID {
            None
        } else {
            Some(self.fid)
        }
    }

    pub fn set_fid(&mut self, fid: Option<i64>) {
        self.fid = fid.unwrap_or(NULL_FID);
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn geom_field_count(&self) -> usize {
        self.geometries.len()
    }

    /// Index of the field named `name`, case insensitive.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.defn.field_index(name)
    }

    /// Index of the geometry field named `name`, case insensitive.
    pub fn geom_field_index(&self, name: &str) -> Option<usize> {
        self.defn.geom_field_index(name)
    }

    /// Whether field `index` holds a value.
    ///
    /// Indices past the attribute fields address the special fields: the FID
    /// is set when assigned, the style when present, and the geometry derived
    /// ones when geometry field 0 holds a geometry.
    pub fn is_field_set(&self, index: usize) -> bool {
        match self.fields.get(index) {
            Some(slot) => slot.is_some(),
            None => match SpecialField::from_index(index, self.fields.len()) {
                Some(SpecialField::Fid) => self.fid != NULL_FID,
                Some(SpecialField::Style) => self.style_string.is_some(),
                Some(SpecialField::Geometry)
                | Some(SpecialField::GeometryWkt)
                | Some(SpecialField::GeometryArea) => self.geometry().is_some(),
                None => false,
            },
        }
    }

    /// Clear field `index`.
    pub fn unset_field(&mut self, index: usize) -> Result<()> {
        let slot = self
            .fields
            .get_mut(index)
            .ok_or(OgrError::InvalidFieldIndex {
                index,
                method_name: "unset_field",
            })?;
        *slot = None;
        Ok(())
    }

    /// The raw value of field `index`, `None` when unset.
    pub fn field_by_index(&self, index: usize) -> Result<Option<&FieldValue>> {
        self.fields
            .get(index)
            .map(Option::as_ref)
            .ok_or(OgrError::InvalidFieldIndex {
                index,
                method_name: "field_by_index",
            })
    }

    /// Get the value of a named field. The value is a [`FieldValue`] wrapper
    /// that you need to unpack to a base type (string, float, etc). Unset
    /// fields give `Ok(None)`, unknown names an error.
    pub fn field(&self, name: &str) -> Result<Option<FieldValue>> {
        let index = self.field_index(name).ok_or_else(|| OgrError::InvalidFieldName {
            field_name: name.to_string(),
            method_name: "field",
        })?;
        Ok(self.fields[index].clone())
    }

    /// Iterate over `(name, value)` pairs of the attribute fields.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.defn
            .fields()
            .zip(self.fields.iter())
            .map(|(defn, value)| (defn.name(), value.as_ref()))
    }

    pub(crate) fn take_field_slot(&mut self, index: usize) -> Option<FieldValue> {
        self.fields.get_mut(index).and_then(Option::take)
    }

    fn store(&mut self, index: usize, value: FieldValue) {
        self.fields[index] = Some(value);
    }

    /// The geometry of geometry field 0, if any.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometries.first().and_then(Option::as_ref)
    }

    /// The geometry of geometry field `index`, `Ok(None)` when empty.
    pub fn geom_field(&self, index: usize) -> Result<Option<&Geometry>> {
        self.geometries
            .get(index)
            .map(Option::as_ref)
            .ok_or(OgrError::InvalidGeomFieldIndex {
                index,
                method_name: "geom_field",
            })
    }

    pub fn geometry_by_name(&self, field_name: &str) -> Result<Option<&Geometry>> {
        let index =
            self.geom_field_index(field_name)
                .ok_or_else(|| OgrError::InvalidFieldName {
                    field_name: field_name.to_string(),
                    method_name: "geometry_by_name",
                })?;
        self.geom_field(index)
    }

    /// Set geometry field 0, taking ownership of `geometry`.
    pub fn set_geometry_directly(&mut self, geometry: Geometry) -> Result<()> {
        self.set_geom_field_directly(0, geometry)
    }

    /// Set geometry field 0 to a copy of `geometry`.
    pub fn set_geometry(&mut self, geometry: &Geometry) -> Result<()> {
        self.set_geom_field(0, geometry)
    }

    /// Set geometry field `index`, taking ownership of `geometry`.
    ///
    /// The geometry is consumed even when `index` is out of range.
    pub fn set_geom_field_directly(&mut self, index: usize, geometry: Geometry) -> Result<()> {
        let slot = self
            .geometries
            .get_mut(index)
            .ok_or(OgrError::InvalidGeomFieldIndex {
                index,
                method_name: "set_geom_field_directly",
            })?;
        *slot = Some(geometry);
        Ok(())
    }

    /// Set geometry field `index` to a copy of `geometry`.
    pub fn set_geom_field(&mut self, index: usize, geometry: &Geometry) -> Result<()> {
        if index >= self.geometries.len() {
            return Err(OgrError::InvalidGeomFieldIndex {
                index,
                method_name: "set_geom_field",
            });
        }
        self.geometries[index] = Some(geometry.clone());
        Ok(())
    }

    /// Take the geometry of geometry field 0 out of the feature.
    pub fn steal_geometry(&mut self) -> Option<Geometry> {
        self.steal_geom_field(0)
    }

    /// Take the geometry of geometry field `index` out of the feature,
    /// leaving the slot empty.
    pub fn steal_geom_field(&mut self, index: usize) -> Option<Geometry> {
        self.geometries.get_mut(index).and_then(Option::take)
    }

    pub fn style_string(&self) -> Option<&str> {
        self.style_string.as_deref()
    }

    pub fn set_style_string(&mut self, style: Option<&str>) {
        self.style_string = style.map(str::to_string);
    }

    pub fn style_table(&self) -> Option<&StyleTable> {
        self.style_table.as_ref()
    }

    pub fn set_style_table(&mut self, table: Option<StyleTable>) {
        self.style_table = table;
    }

    /// Whether `self` and `other` hold the same content.
    ///
    /// Both must share the same definition instance and have the same FID.
    /// Fields compare by set state then by value, with NaN equal to NaN and
    /// date and time values compared to the second. Geometries compare
    /// structurally.
    pub fn equal(&self, other: &Feature) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.fid != other.fid || !Rc::ptr_eq(&self.defn, &other.defn) {
            return false;
        }
        let fields_match = self
            .fields
            .iter()
            .zip(&other.fields)
            .all(|(a, b)| match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.same_as(b),
                _ => false,
            });
        fields_match
            && self
                .geometries
                .iter()
                .zip(&other.geometries)
                .all(|(a, b)| match (a, b) {
                    (None, None) => true,
                    (Some(a), Some(b)) => a.equals(b),
                    _ => false,
                })
    }
}

impl Clone for Feature {
    /// Copy the feature against the same definition, with independent
    /// copies of every value and geometry.
    fn clone(&self) -> Self {
        self.defn.reference();
        Feature {
            defn: Rc::clone(&self.defn),
            fid: self.fid,
            fields: self.fields.clone(),
            geometries: self.geometries.clone(),
            style_string: self.style_string.clone(),
            style_table: self.style_table.clone(),
        }
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl Drop for Feature {
    fn drop(&mut self) {
        self.defn.dereference();
    }
}
