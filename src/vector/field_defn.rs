use std::cell::Cell;
use std::rc::Rc;

use crate::config::cpl_error;
use crate::errors::{cple, CplErrType, OgrError, Result};
use crate::spatial_ref::SpatialRef;
use crate::utils::strtod;
use crate::vector::{
    are_type_subtype_compatible, OGRFieldSubType, OGRFieldType, OGRJustification,
    OGRwkbGeometryType,
};

/// Attribute field definition: one column of a [`crate::vector::Defn`].
///
/// By default, fields have no width, precision, are nullable, not unique and
/// not ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefn {
    name: String,
    alternative_name: String,
    field_type: OGRFieldType,
    sub_type: OGRFieldSubType,
    justify: OGRJustification,
    width: i32,
    precision: i32,
    default: Option<String>,
    nullable: bool,
    unique: bool,
    ignored: bool,
}

impl FieldDefn {
    /// Create a new field definition.
    pub fn new(name: &str, field_type: OGRFieldType) -> FieldDefn {
        FieldDefn {
            name: name.to_string(),
            alternative_name: String::new(),
            field_type,
            sub_type: OGRFieldSubType::OFSTNone,
            justify: OGRJustification::OJUndefined,
            width: 0,
            precision: 0,
            default: None,
            nullable: true,
            unique: false,
            ignored: false,
        }
    }

    /// Copy a prototype. The ignored flag is not carried over.
    pub fn from_prototype(prototype: &FieldDefn) -> FieldDefn {
        FieldDefn {
            ignored: false,
            ..prototype.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the alternative name (alias) of this field, empty when not set.
    pub fn alternative_name(&self) -> &str {
        &self.alternative_name
    }

    pub fn set_alternative_name(&mut self, alternative_name: &str) {
        self.alternative_name = alternative_name.to_string();
    }

    pub fn field_type(&self) -> OGRFieldType {
        self.field_type
    }

    /// Set the type of this field.
    ///
    /// If the current sub-type does not fit the new type, it is reset to
    /// [`OGRFieldSubType::OFSTNone`] and a warning is emitted.
    pub fn set_field_type(&mut self, field_type: OGRFieldType) {
        if !are_type_subtype_compatible(field_type, self.sub_type) {
            Self::warn_incompatible();
            self.sub_type = OGRFieldSubType::OFSTNone;
        }
        self.field_type = field_type;
    }

    pub fn sub_type(&self) -> OGRFieldSubType {
        self.sub_type
    }

    /// Set the sub-type of this field.
    ///
    /// A sub-type that does not fit the field type resets it to
    /// [`OGRFieldSubType::OFSTNone`] with a warning.
    pub fn set_sub_type(&mut self, sub_type: OGRFieldSubType) {
        if are_type_subtype_compatible(self.field_type, sub_type) {
            self.sub_type = sub_type;
        } else {
            Self::warn_incompatible();
            self.sub_type = OGRFieldSubType::OFSTNone;
        }
    }

    fn warn_incompatible() {
        cpl_error(
            CplErrType::Warning,
            cple::APP_DEFINED,
            "Type and subtype of field definition are not compatible. Resetting to OFSTNone",
        );
    }

    pub fn justify(&self) -> OGRJustification {
        self.justify
    }

    pub fn set_justify(&mut self, justify: OGRJustification) {
        self.justify = justify;
    }

    /// Get the formatting width for this field.
    ///
    /// Zero means no specified width.
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn set_width(&mut self, width: i32) {
        self.width = width.max(0);
    }

    /// Get the formatting precision for this field.
    ///
    /// This should normally be zero for fields of types other than Real.
    pub fn precision(&self) -> i32 {
        self.precision
    }

    pub fn set_precision(&mut self, precision: i32) {
        self.precision = precision;
    }

    /// Set width, precision and justification in one call.
    pub fn set(&mut self, width: i32, precision: i32, justify: OGRJustification) {
        self.set_width(width);
        self.set_precision(precision);
        self.set_justify(justify);
    }

    /// Get default field value.
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Set default field value.
    ///
    /// The value is kept verbatim. It may be `NULL`, a number, a single-quoted
    /// literal whose embedded quotes are doubled (`'O''Brien'`),
    /// `CURRENT_TIMESTAMP`, `CURRENT_TIME`, `CURRENT_DATE` or a driver specific
    /// expression. A badly quoted literal is rejected and leaves the default unset.
    pub fn set_default(&mut self, default: Option<&str>) -> Result<()> {
        self.default = None;
        let value = match default {
            Some(value) => value,
            None => return Ok(()),
        };
        if value.starts_with('\'') && value.ends_with('\'') {
            let bytes = value.as_bytes();
            let mut pos = 1;
            let mut closed = false;
            while pos < bytes.len() {
                if bytes[pos] == b'\'' {
                    if pos + 1 == bytes.len() {
                        closed = true;
                        break;
                    }
                    if bytes[pos + 1] != b'\'' {
                        return Err(Self::bad_quoting());
                    }
                    pos += 1;
                }
                pos += 1;
            }
            if !closed {
                return Err(Self::bad_quoting());
            }
        }
        self.default = Some(value.to_string());
        Ok(())
    }

    fn bad_quoting() -> OgrError {
        let msg = "Incorrectly quoted string literal";
        cpl_error(CplErrType::Failure, cple::APP_DEFINED, msg);
        OgrError::CplError {
            class: CplErrType::Failure,
            number: cple::APP_DEFINED,
            msg: msg.to_string(),
        }
    }

    /// Whether the default value is driver specific: anything other than
    /// `NULL`, a number, a quoted literal or one of the `CURRENT_*` keywords.
    pub fn is_default_driver_specific(&self) -> bool {
        let default = match self.default.as_deref() {
            Some(default) => default,
            None => return false,
        };
        if ["NULL", "CURRENT_TIMESTAMP", "CURRENT_TIME", "CURRENT_DATE"]
            .iter()
            .any(|k| default.eq_ignore_ascii_case(k))
        {
            return false;
        }
        if default.starts_with('\'') && default.ends_with('\'') {
            return false;
        }
        let (_, consumed) = strtod(default);
        consumed != default.len()
    }

    /// Return whether this field can receive null values.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn set_nullable(&mut self, nullable: bool) {
        self.nullable = nullable;
    }

    /// Return whether this field has a unique constraint.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn set_unique(&mut self, unique: bool) {
        self.unique = unique;
    }

    /// Return whether this field should be omitted when fetching features.
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn set_ignored(&mut self, ignored: bool) {
        self.ignored = ignored;
    }

    /// Structural equality, ignoring the alternative name and the ignored flag.
    pub fn is_same(&self, other: &FieldDefn) -> bool {
        self.name == other.name
            && self.field_type == other.field_type
            && self.sub_type == other.sub_type
            && self.width == other.width
            && self.precision == other.precision
            && self.nullable == other.nullable
    }
}

/// Geometry field definition.
#[derive(Clone, Debug)]
pub struct GeomFieldDefn {
    name: String,
    // A layer may settle the type of an unknown geometry field while the
    // definition is shared.
    geom_type: Cell<OGRwkbGeometryType>,
    spatial_ref: Option<Rc<SpatialRef>>,
    nullable: bool,
    ignored: bool,
}

impl GeomFieldDefn {
    pub fn new(name: &str, geom_type: OGRwkbGeometryType) -> GeomFieldDefn {
        GeomFieldDefn {
            name: name.to_string(),
            geom_type: Cell::new(geom_type),
            spatial_ref: None,
            nullable: true,
            ignored: false,
        }
    }

    /// Copy a prototype, sharing its spatial reference. The ignored flag is
    /// not carried over.
    pub fn from_prototype(prototype: &GeomFieldDefn) -> GeomFieldDefn {
        GeomFieldDefn {
            ignored: false,
            ..prototype.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn field_type(&self) -> OGRwkbGeometryType {
        self.geom_type.get()
    }

    pub fn set_field_type(&mut self, geom_type: OGRwkbGeometryType) {
        self.geom_type.set(geom_type);
    }

    /// Replace a `wkbUnknown` type through a shared definition. Returns
    /// false, leaving the type alone, when it is already known.
    pub(crate) fn settle_field_type(&self, geom_type: OGRwkbGeometryType) -> bool {
        if self.geom_type.get() != OGRwkbGeometryType::wkbUnknown {
            return false;
        }
        self.geom_type.set(geom_type);
        true
    }

    pub fn spatial_ref(&self) -> Option<&Rc<SpatialRef>> {
        self.spatial_ref.as_ref()
    }

    /// Replace the spatial reference. The previous one is released; the new
    /// one is shared, not copied.
    pub fn set_spatial_ref(&mut self, spatial_ref: Option<Rc<SpatialRef>>) {
        self.spatial_ref = spatial_ref;
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn set_nullable(&mut self, nullable: bool) {
        self.nullable = nullable;
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn set_ignored(&mut self, ignored: bool) {
        self.ignored = ignored;
    }

    /// Same name, geometry type and spatial reference (the same instance, or
    /// two equivalent definitions).
    pub fn is_same(&self, other: &GeomFieldDefn) -> bool {
        if self.name != other.name || self.geom_type.get() != other.geom_type.get() {
            return false;
        }
        match (&self.spatial_ref, &other.spatial_ref) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b) || a.is_same(b),
            _ => false,
        }
    }
}
