use std::cell::Cell;
use std::rc::Rc;

use crate::errors::*;
use crate::vector::{FieldDefn, GeomFieldDefn, OGRwkbGeometryType};

/// Layer definition
///
/// Defines the fields available for features in a layer. A definition is
/// shared through an `Rc` by the layer and every [`crate::vector::Feature`]
/// built from it; [`Defn::make_mut`] grants mutable access only while nothing
/// else holds it.
#[derive(Debug)]
pub struct Defn {
    name: String,
    fields: Vec<FieldDefn>,
    geom_fields: Vec<GeomFieldDefn>,
    style_ignored: bool,
    feature_refs: Cell<usize>,
}

impl Defn {
    /// Create a definition with no attribute field and one unnamed geometry
    /// field of type `wkbUnknown`.
    pub fn new(name: &str) -> Defn {
        Defn {
            name: name.to_string(),
            fields: Vec::new(),
            geom_fields: vec![GeomFieldDefn::new("", OGRwkbGeometryType::wkbUnknown)],
            style_ignored: false,
            feature_refs: Cell::new(0),
        }
    }

    /// Mutable access to a shared definition.
    ///
    /// Fails with [`OgrError::SchemaInUse`] while another handle exists, live
    /// features included, since their value arrays are laid out after the
    /// current field list.
    pub fn make_mut(this: &mut Rc<Defn>) -> Result<&mut Defn> {
        let name = this.name.clone();
        Rc::get_mut(this).ok_or(OgrError::SchemaInUse { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of live features built against this definition.
    pub fn reference_count(&self) -> usize {
        self.feature_refs.get()
    }

    pub(crate) fn reference(&self) {
        self.feature_refs.set(self.feature_refs.get() + 1);
    }

    pub(crate) fn dereference(&self) {
        self.feature_refs.set(self.feature_refs.get().saturating_sub(1));
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over the field schema of this layer.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefn> {
        self.fields.iter()
    }

    pub fn field_defn(&self, index: usize) -> Result<&FieldDefn> {
        self.fields.get(index).ok_or(OgrError::InvalidFieldIndex {
            index,
            method_name: "field_defn",
        })
    }

    pub fn field_defn_mut(&mut self, index: usize) -> Result<&mut FieldDefn> {
        self.fields.get_mut(index).ok_or(OgrError::InvalidFieldIndex {
            index,
            method_name: "field_defn_mut",
        })
    }

    /// Append a copy of `field`.
    pub fn add_field_defn(&mut self, field: &FieldDefn) {
        self.fields.push(FieldDefn::from_prototype(field));
    }

    pub fn delete_field_defn(&mut self, index: usize) -> Result<()> {
        if index >= self.fields.len() {
            return Err(OgrError::InvalidFieldIndex {
                index,
                method_name: "delete_field_defn",
            });
        }
        self.fields.remove(index);
        Ok(())
    }

    /// Reorder the field definitions: the field at position `i` afterwards is
    /// the one previously at `new_order[i]`.
    ///
    /// `new_order` must be a permutation of `0..field_count()`, otherwise
    /// nothing changes.
    pub fn reorder_field_defns(&mut self, new_order: &[usize]) -> Result<()> {
        check_permutation(new_order, self.fields.len())?;
        let reordered = new_order.iter().map(|&i| self.fields[i].clone()).collect();
        self.fields = reordered;
        Ok(())
    }

    /// Find a field by name, case insensitively.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn geom_field_count(&self) -> usize {
        self.geom_fields.len()
    }

    /// Iterate over the geometry field schema of this layer.
    pub fn geom_fields(&self) -> impl Iterator<Item = &GeomFieldDefn> {
        self.geom_fields.iter()
    }

    pub fn geom_field_defn(&self, index: usize) -> Result<&GeomFieldDefn> {
        self.geom_fields
            .get(index)
            .ok_or(OgrError::InvalidGeomFieldIndex {
                index,
                method_name: "geom_field_defn",
            })
    }

    pub fn geom_field_defn_mut(&mut self, index: usize) -> Result<&mut GeomFieldDefn> {
        self.geom_fields
            .get_mut(index)
            .ok_or(OgrError::InvalidGeomFieldIndex {
                index,
                method_name: "geom_field_defn_mut",
            })
    }

    /// Append a copy of `field`.
    pub fn add_geom_field_defn(&mut self, field: &GeomFieldDefn) {
        self.geom_fields.push(GeomFieldDefn::from_prototype(field));
    }

    /// Append `field` itself, taking ownership.
    pub fn adopt_geom_field_defn(&mut self, field: GeomFieldDefn) {
        self.geom_fields.push(field);
    }

    pub fn delete_geom_field_defn(&mut self, index: usize) -> Result<()> {
        if index >= self.geom_fields.len() {
            return Err(OgrError::InvalidGeomFieldIndex {
                index,
                method_name: "delete_geom_field_defn",
            });
        }
        self.geom_fields.remove(index);
        Ok(())
    }

    /// Find a geometry field by name, case insensitively.
    pub fn geom_field_index(&self, name: &str) -> Option<usize> {
        self.geom_fields
            .iter()
            .position(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Get the geometry type of the first geometry field, `wkbNone` when there is none.
    pub fn geometry_type(&self) -> OGRwkbGeometryType {
        self.geom_fields
            .first()
            .map_or(OGRwkbGeometryType::wkbNone, |f| f.field_type())
    }

    /// Set the geometry type of the first geometry field.
    ///
    /// With no geometry field, one is added unless `ty` is `wkbNone`. With a
    /// single geometry field, `wkbNone` removes it.
    pub fn set_geom_type(&mut self, ty: OGRwkbGeometryType) {
        match self.geom_fields.len() {
            0 => {
                if ty != OGRwkbGeometryType::wkbNone {
                    self.geom_fields.push(GeomFieldDefn::new("", ty));
                }
            }
            1 if ty == OGRwkbGeometryType::wkbNone => self.geom_fields.clear(),
            _ => self.geom_fields[0].set_field_type(ty),
        }
    }

    /// Settle an unknown type of the first geometry field, even while the
    /// definition is shared with features.
    pub(crate) fn settle_geometry_type(&self, ty: OGRwkbGeometryType) -> bool {
        self.geom_fields
            .first()
            .is_some_and(|f| f.settle_field_type(ty))
    }

    pub fn is_geometry_ignored(&self) -> bool {
        self.geom_fields.first().is_some_and(|f| f.is_ignored())
    }

    pub fn set_geometry_ignored(&mut self, ignored: bool) {
        if let Some(field) = self.geom_fields.first_mut() {
            field.set_ignored(ignored);
        }
    }

    pub fn is_style_ignored(&self) -> bool {
        self.style_ignored
    }

    pub fn set_style_ignored(&mut self, ignored: bool) {
        self.style_ignored = ignored;
    }

    /// Deep copy of the name and every field and geometry field definition.
    ///
    /// The copy has no live features.
    pub fn clone_defn(&self) -> Defn {
        let mut copy = Defn::new(&self.name);
        copy.set_geom_type(OGRwkbGeometryType::wkbNone);
        for field in &self.fields {
            copy.add_field_defn(field);
        }
        for geom_field in &self.geom_fields {
            copy.add_geom_field_defn(geom_field);
        }
        copy
    }

    /// Structural equality of names and of every field and geometry field.
    pub fn is_same(&self, other: &Defn) -> bool {
        self.name == other.name
            && self.fields.len() == other.fields.len()
            && self.geom_fields.len() == other.geom_fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.is_same(b))
            && self
                .geom_fields
                .iter()
                .zip(&other.geom_fields)
                .all(|(a, b)| a.is_same(b))
    }
}

/// Check that `map` is a permutation of `0..count`.
pub(crate) fn check_permutation(map: &[usize], count: usize) -> Result<()> {
    let mut seen = vec![false; count];
    if map.len() != count {
        return Err(OgrError::BadArgument(format!(
            "Reordering map has {} entries, {count} expected",
            map.len()
        )));
    }
    for &i in map {
        if i >= count || seen[i] {
            return Err(OgrError::BadArgument(format!(
                "Reordering map is not a permutation of 0..{count}"
            )));
        }
        seen[i] = true;
    }
    Ok(())
}
