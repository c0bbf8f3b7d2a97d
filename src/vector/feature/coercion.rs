//! Typed access to field values.
//!
//! Getters convert the stored value to the requested type, unset fields give
//! the zero value of that type. Setters convert the given value to the
//! declared type of the field; combinations with no sensible conversion are
//! ignored.

use std::rc::Rc;

use crate::config::{cpl_error, get_config_bool};
use crate::errors::{cple, CplErrType, OgrError, Result};
use crate::utils::{atof, atoi, atoi64, format_g, hex_to_binary, strtod, strtol};
use crate::vector::field_value::{
    format_binary, format_float32, format_list, parse_list_notation,
};
use crate::vector::{
    Defn, Feature, FieldDateTime, FieldDefn, FieldValue, OGRFieldSubType, OGRFieldType,
};

use super::special::SpecialField;

fn warn(msg: &str) {
    cpl_error(CplErrType::Warning, cple::APP_DEFINED, msg);
}

fn checked_field<'d>(
    defn: &'d Defn,
    index: usize,
    method_name: &'static str,
) -> Result<&'d FieldDefn> {
    defn.field_defn(index)
        .map_err(|_| OgrError::InvalidFieldIndex { index, method_name })
}

/// Apply the value constraints of the Boolean and Int16 subtypes.
fn integer_for_subtype(field: &FieldDefn, value: i32) -> i32 {
    match field.sub_type() {
        OGRFieldSubType::OFSTBoolean if value != 0 && value != 1 => {
            warn("Only 0 or 1 should be passed for a OFSTBoolean subtype. Considering this non-zero value as 1.");
            1
        }
        OGRFieldSubType::OFSTInt16 if value < i32::from(i16::MIN) => {
            warn("Out-of-range value for a OFSTInt16 subtype. Considering this value as -32768.");
            i32::from(i16::MIN)
        }
        OGRFieldSubType::OFSTInt16 if value > i32::from(i16::MAX) => {
            warn("Out-of-range value for a OFSTInt16 subtype. Considering this value as 32767.");
            i32::from(i16::MAX)
        }
        _ => value,
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn narrow_on_read(value: i64) -> i32 {
    let narrowed = clamp_i32(value);
    if i64::from(narrowed) != value {
        warn("Integer overflow occurred when trying to return 64bit integer. Use field_as_integer64() instead");
    }
    narrowed
}

fn narrow_on_write(value: i64) -> i32 {
    let narrowed = clamp_i32(value);
    if i64::from(narrowed) != value {
        warn("Integer overflow occurred when trying to set 32bit field.");
    }
    narrowed
}

fn format_real(field: &FieldDefn, value: f64) -> String {
    if field.width() != 0 {
        let width = field.width().max(0) as usize;
        let precision = field.precision().max(0) as usize;
        format!("{value:width$.precision$}")
    } else if field.sub_type() == OGRFieldSubType::OFSTFloat32 {
        format_float32(value)
    } else {
        format_g(value, 15)
    }
}

fn format_real_item(field: &FieldDefn, value: f64) -> String {
    if field.width() != 0 {
        let width = field.width().max(0) as usize;
        let precision = field.precision().max(0) as usize;
        format!("{value:width$.precision$}")
    } else {
        format_g(value, 16)
    }
}

enum Slot<'a> {
    Attribute(&'a FieldDefn, Option<&'a FieldValue>),
    Special(SpecialField),
}

impl Feature {
    fn resolve(&self, index: usize, method_name: &'static str) -> Result<Slot<'_>> {
        if let Some(value) = self.fields.get(index) {
            return Ok(Slot::Attribute(
                checked_field(&self.defn, index, method_name)?,
                value.as_ref(),
            ));
        }
        SpecialField::from_index(index, self.fields.len())
            .map(Slot::Special)
            .ok_or(OgrError::InvalidFieldIndex { index, method_name })
    }

    /// Value of field `index` as a 32 bit integer.
    ///
    /// Reals are truncated, 64 bit integers clamped with a warning and
    /// strings parsed like C `atoi`.
    pub fn field_as_integer(&self, index: usize) -> Result<i32> {
        Ok(match self.resolve(index, "field_as_integer")? {
            Slot::Special(SpecialField::Fid) => narrow_on_read(self.fid),
            Slot::Special(SpecialField::GeometryArea) => self.special_area() as i32,
            Slot::Special(_) | Slot::Attribute(_, None) => 0,
            Slot::Attribute(_, Some(value)) => match value {
                FieldValue::IntegerValue(v) => *v,
                FieldValue::Integer64Value(v) => narrow_on_read(*v),
                FieldValue::RealValue(v) => *v as i32,
                FieldValue::StringValue(s) => atoi(s),
                _ => 0,
            },
        })
    }

    /// Value of field `index` as a 64 bit integer.
    pub fn field_as_integer64(&self, index: usize) -> Result<i64> {
        Ok(match self.resolve(index, "field_as_integer64")? {
            Slot::Special(SpecialField::Fid) => self.fid,
            Slot::Special(SpecialField::GeometryArea) => self.special_area() as i64,
            Slot::Special(_) | Slot::Attribute(_, None) => 0,
            Slot::Attribute(_, Some(value)) => match value {
                FieldValue::IntegerValue(v) => i64::from(*v),
                FieldValue::Integer64Value(v) => *v,
                FieldValue::RealValue(v) => *v as i64,
                FieldValue::StringValue(s) => atoi64(s, true),
                _ => 0,
            },
        })
    }

    /// Value of field `index` as a double.
    pub fn field_as_double(&self, index: usize) -> Result<f64> {
        Ok(match self.resolve(index, "field_as_double")? {
            Slot::Special(SpecialField::Fid) => self.fid as f64,
            Slot::Special(SpecialField::GeometryArea) => self.special_area(),
            Slot::Special(_) | Slot::Attribute(_, None) => 0.0,
            Slot::Attribute(_, Some(value)) => match value {
                FieldValue::IntegerValue(v) => f64::from(*v),
                FieldValue::Integer64Value(v) => *v as f64,
                FieldValue::RealValue(v) => *v,
                FieldValue::StringValue(s) => atof(s),
                _ => 0.0,
            },
        })
    }

    /// Value of field `index` rendered as text.
    ///
    /// Lists render as `(N:v1,v2,...)`, binary as upper case hex and dates
    /// as `YYYY/MM/DD HH:MM:SS`. Long lists and binaries are cut with `...`.
    pub fn field_as_string(&self, index: usize) -> Result<String> {
        let (field, value) = match self.resolve(index, "field_as_string")? {
            Slot::Special(special) => return Ok(self.special_as_string(special)),
            Slot::Attribute(_, None) => return Ok(String::new()),
            Slot::Attribute(field, Some(value)) => (field, value),
        };
        Ok(match value {
            FieldValue::StringValue(s) => s.clone(),
            FieldValue::IntegerValue(v) => v.to_string(),
            FieldValue::Integer64Value(v) => v.to_string(),
            FieldValue::RealValue(v) => format_real(field, *v),
            FieldValue::DateTimeValue(dt) => dt.format_date_time(),
            FieldValue::DateValue(dt) => dt.format_date(),
            FieldValue::TimeValue(dt) => dt.format_time(),
            FieldValue::IntegerListValue(list) => {
                format_list(list.len(), list.iter().map(i32::to_string))
            }
            FieldValue::Integer64ListValue(list) => {
                format_list(list.len(), list.iter().map(i64::to_string))
            }
            FieldValue::RealListValue(list) => format_list(
                list.len(),
                list.iter().map(|v| format_real_item(field, *v)),
            ),
            FieldValue::StringListValue(list) => format_list(list.len(), list.iter().cloned()),
            FieldValue::BinaryValue(data) => format_binary(data),
        })
    }

    /// Value of an IntegerList field, empty for any other type.
    pub fn field_as_integer_list(&self, index: usize) -> Result<Vec<i32>> {
        Ok(match self.resolve(index, "field_as_integer_list")? {
            Slot::Attribute(_, Some(FieldValue::IntegerListValue(list))) => list.clone(),
            _ => Vec::new(),
        })
    }

    /// Value of an Integer64List field, empty for any other type.
    pub fn field_as_integer64_list(&self, index: usize) -> Result<Vec<i64>> {
        Ok(match self.resolve(index, "field_as_integer64_list")? {
            Slot::Attribute(_, Some(FieldValue::Integer64ListValue(list))) => list.clone(),
            _ => Vec::new(),
        })
    }

    /// Value of a RealList field, empty for any other type.
    pub fn field_as_double_list(&self, index: usize) -> Result<Vec<f64>> {
        Ok(match self.resolve(index, "field_as_double_list")? {
            Slot::Attribute(_, Some(FieldValue::RealListValue(list))) => list.clone(),
            _ => Vec::new(),
        })
    }

    /// Value of a StringList field, empty for any other type.
    pub fn field_as_string_list(&self, index: usize) -> Result<Vec<String>> {
        Ok(match self.resolve(index, "field_as_string_list")? {
            Slot::Attribute(_, Some(FieldValue::StringListValue(list))) => list.clone(),
            _ => Vec::new(),
        })
    }

    /// Bytes of a Binary field, or the text of a String field.
    pub fn field_as_binary(&self, index: usize) -> Result<Vec<u8>> {
        Ok(match self.resolve(index, "field_as_binary")? {
            Slot::Attribute(_, Some(FieldValue::BinaryValue(data))) => data.clone(),
            Slot::Attribute(_, Some(FieldValue::StringValue(s))) => s.as_bytes().to_vec(),
            _ => Vec::new(),
        })
    }

    /// Value of a Date, Time or DateTime field.
    pub fn field_as_date_time(&self, index: usize) -> Result<Option<FieldDateTime>> {
        Ok(match self.resolve(index, "field_as_date_time")? {
            Slot::Attribute(
                _,
                Some(
                    FieldValue::DateValue(dt)
                    | FieldValue::TimeValue(dt)
                    | FieldValue::DateTimeValue(dt),
                ),
            ) => Some(*dt),
            _ => None,
        })
    }

    /// Set field `index` from a 32 bit integer.
    pub fn set_field_integer(&mut self, index: usize, value: i32) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        let field = checked_field(&defn, index, "set_field_integer")?;
        match field.field_type() {
            OGRFieldType::OFTInteger => {
                self.store(index, FieldValue::IntegerValue(integer_for_subtype(field, value)))
            }
            OGRFieldType::OFTInteger64 => self.store(
                index,
                FieldValue::Integer64Value(i64::from(integer_for_subtype(field, value))),
            ),
            OGRFieldType::OFTReal => self.store(index, FieldValue::RealValue(f64::from(value))),
            OGRFieldType::OFTIntegerList => self.set_field_integer_list(index, &[value])?,
            OGRFieldType::OFTInteger64List => {
                self.set_field_integer64_list(index, &[i64::from(value)])?
            }
            OGRFieldType::OFTRealList => self.set_field_double_list(index, &[f64::from(value)])?,
            OGRFieldType::OFTString => self.store(index, FieldValue::StringValue(value.to_string())),
            OGRFieldType::OFTStringList => {
                self.store(index, FieldValue::StringListValue(vec![value.to_string()]))
            }
            _ => {}
        }
        Ok(())
    }

    /// Set field `index` from a 64 bit integer. Integer fields clamp the
    /// value with a warning.
    pub fn set_field_integer64(&mut self, index: usize, value: i64) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        let field = checked_field(&defn, index, "set_field_integer64")?;
        match field.field_type() {
            OGRFieldType::OFTInteger => self.set_field_integer(index, narrow_on_write(value))?,
            OGRFieldType::OFTInteger64 => self.store(index, FieldValue::Integer64Value(value)),
            OGRFieldType::OFTReal => self.store(index, FieldValue::RealValue(value as f64)),
            OGRFieldType::OFTIntegerList => {
                self.set_field_integer_list(index, &[narrow_on_write(value)])?
            }
            OGRFieldType::OFTInteger64List => self.set_field_integer64_list(index, &[value])?,
            OGRFieldType::OFTRealList => self.set_field_double_list(index, &[value as f64])?,
            OGRFieldType::OFTString => self.store(index, FieldValue::StringValue(value.to_string())),
            OGRFieldType::OFTStringList => {
                self.store(index, FieldValue::StringListValue(vec![value.to_string()]))
            }
            _ => {}
        }
        Ok(())
    }

    /// Set field `index` from a double. Integer fields truncate the value.
    pub fn set_field_double(&mut self, index: usize, value: f64) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        let field = checked_field(&defn, index, "set_field_double")?;
        match field.field_type() {
            OGRFieldType::OFTReal => self.store(index, FieldValue::RealValue(value)),
            OGRFieldType::OFTInteger => self.store(
                index,
                FieldValue::IntegerValue(integer_for_subtype(field, value as i32)),
            ),
            OGRFieldType::OFTInteger64 => {
                self.store(index, FieldValue::Integer64Value(value as i64))
            }
            OGRFieldType::OFTRealList => self.set_field_double_list(index, &[value])?,
            OGRFieldType::OFTIntegerList => self.set_field_integer_list(index, &[value as i32])?,
            OGRFieldType::OFTInteger64List => {
                self.set_field_integer64_list(index, &[value as i64])?
            }
            OGRFieldType::OFTString => {
                self.store(index, FieldValue::StringValue(format_g(value, 16)))
            }
            OGRFieldType::OFTStringList => {
                self.store(index, FieldValue::StringListValue(vec![format_g(value, 16)]))
            }
            _ => {}
        }
        Ok(())
    }

    /// Set field `index` from text.
    ///
    /// Numbers are parsed from the leading part of the text; when trailing
    /// characters are ignored a warning is emitted, unless the
    /// `OGR_SETFIELD_NUMERIC_WARNING` option is off. Dates that do not parse
    /// leave the field unchanged. Lists accept the `(N:v1,v2)` notation.
    pub fn set_field_string(&mut self, index: usize, value: &str) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        let field = checked_field(&defn, index, "set_field_string")?;
        let numeric_warning = || get_config_bool("OGR_SETFIELD_NUMERIC_WARNING", true);
        match field.field_type() {
            OGRFieldType::OFTString => self.store(index, FieldValue::StringValue(value.to_string())),
            OGRFieldType::OFTInteger => {
                let (parsed, consumed, overflow) = strtol(value);
                let clamped = clamp_i32(parsed);
                let stored = integer_for_subtype(field, clamped);
                self.store(index, FieldValue::IntegerValue(stored));
                if stored == clamped
                    && (overflow || i64::from(clamped) != parsed || consumed < value.len())
                    && numeric_warning()
                {
                    warn(&format!(
                        "Value '{value}' of field {}.{} parsed incompletely to integer {stored}.",
                        defn.name(),
                        field.name()
                    ));
                }
            }
            OGRFieldType::OFTInteger64 => {
                let warn_enabled = numeric_warning();
                let parsed = atoi64(value, warn_enabled);
                self.store(index, FieldValue::Integer64Value(parsed));
                let (_, consumed, overflow) = strtol(value);
                if warn_enabled && !overflow && consumed < value.len() {
                    warn(&format!(
                        "Value '{value}' of field {}.{} parsed incompletely to integer64 {parsed}.",
                        defn.name(),
                        field.name()
                    ));
                }
            }
            OGRFieldType::OFTReal => {
                let (parsed, consumed) = strtod(value);
                self.store(index, FieldValue::RealValue(parsed));
                if consumed < value.len() && numeric_warning() {
                    warn(&format!(
                        "Value '{value}' of field {}.{} parsed incompletely to real {}.",
                        defn.name(),
                        field.name(),
                        format_g(parsed, 16)
                    ));
                }
            }
            ty @ (OGRFieldType::OFTDate | OGRFieldType::OFTTime | OGRFieldType::OFTDateTime) => {
                if let Some(parsed) = FieldDateTime::parse(value) {
                    self.store(index, temporal_value(ty, parsed));
                }
            }
            OGRFieldType::OFTIntegerList
            | OGRFieldType::OFTInteger64List
            | OGRFieldType::OFTRealList
            | OGRFieldType::OFTStringList => {
                let items =
                    parse_list_notation(value).unwrap_or_else(|| vec![value.to_string()]);
                self.set_field_string_list(index, &items)?;
            }
            OGRFieldType::OFTBinary => {
                if let Some(data) = hex_to_binary(value) {
                    self.store(index, FieldValue::BinaryValue(data));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Set field `index` from a list of 32 bit integers. Scalar numeric
    /// fields accept a single element list.
    pub fn set_field_integer_list(&mut self, index: usize, values: &[i32]) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        let field = checked_field(&defn, index, "set_field_integer_list")?;
        match field.field_type() {
            OGRFieldType::OFTIntegerList => {
                let list = values
                    .iter()
                    .map(|v| integer_for_subtype(field, *v))
                    .collect();
                self.store(index, FieldValue::IntegerListValue(list));
            }
            OGRFieldType::OFTInteger64List => self.store(
                index,
                FieldValue::Integer64ListValue(values.iter().map(|v| i64::from(*v)).collect()),
            ),
            OGRFieldType::OFTRealList => self.store(
                index,
                FieldValue::RealListValue(values.iter().map(|v| f64::from(*v)).collect()),
            ),
            OGRFieldType::OFTInteger | OGRFieldType::OFTInteger64 | OGRFieldType::OFTReal
                if values.len() == 1 =>
            {
                self.set_field_integer(index, values[0])?
            }
            OGRFieldType::OFTStringList => self.store(
                index,
                FieldValue::StringListValue(values.iter().map(i32::to_string).collect()),
            ),
            _ => {}
        }
        Ok(())
    }

    /// Set field `index` from a list of 64 bit integers.
    pub fn set_field_integer64_list(&mut self, index: usize, values: &[i64]) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        let field = checked_field(&defn, index, "set_field_integer64_list")?;
        match field.field_type() {
            OGRFieldType::OFTIntegerList => {
                let narrowed: Vec<i32> = values.iter().map(|v| narrow_on_write(*v)).collect();
                self.set_field_integer_list(index, &narrowed)?;
            }
            OGRFieldType::OFTInteger64List => {
                self.store(index, FieldValue::Integer64ListValue(values.to_vec()))
            }
            OGRFieldType::OFTRealList => self.store(
                index,
                FieldValue::RealListValue(values.iter().map(|v| *v as f64).collect()),
            ),
            OGRFieldType::OFTInteger | OGRFieldType::OFTInteger64 | OGRFieldType::OFTReal
                if values.len() == 1 =>
            {
                self.set_field_integer64(index, values[0])?
            }
            OGRFieldType::OFTStringList => self.store(
                index,
                FieldValue::StringListValue(values.iter().map(i64::to_string).collect()),
            ),
            _ => {}
        }
        Ok(())
    }

    /// Set field `index` from a list of doubles.
    pub fn set_field_double_list(&mut self, index: usize, values: &[f64]) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        let field = checked_field(&defn, index, "set_field_double_list")?;
        match field.field_type() {
            OGRFieldType::OFTRealList => {
                self.store(index, FieldValue::RealListValue(values.to_vec()))
            }
            OGRFieldType::OFTIntegerList => {
                let truncated: Vec<i32> = values.iter().map(|v| *v as i32).collect();
                self.set_field_integer_list(index, &truncated)?;
            }
            OGRFieldType::OFTInteger64List => self.store(
                index,
                FieldValue::Integer64ListValue(values.iter().map(|v| *v as i64).collect()),
            ),
            OGRFieldType::OFTInteger | OGRFieldType::OFTInteger64 | OGRFieldType::OFTReal
                if values.len() == 1 =>
            {
                self.set_field_double(index, values[0])?
            }
            OGRFieldType::OFTStringList => self.store(
                index,
                FieldValue::StringListValue(values.iter().map(|v| format_g(*v, 16)).collect()),
            ),
            _ => {}
        }
        Ok(())
    }

    /// Set field `index` from a list of strings. Numeric list fields parse
    /// every element.
    pub fn set_field_string_list<S: AsRef<str>>(&mut self, index: usize, values: &[S]) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        let field = checked_field(&defn, index, "set_field_string_list")?;
        match field.field_type() {
            OGRFieldType::OFTStringList => self.store(
                index,
                FieldValue::StringListValue(
                    values.iter().map(|v| v.as_ref().to_string()).collect(),
                ),
            ),
            OGRFieldType::OFTIntegerList => {
                let parsed: Vec<i32> = values
                    .iter()
                    .map(|v| {
                        let text = v.as_ref();
                        let (value, _, overflow) = strtol(text);
                        let narrowed = clamp_i32(value);
                        if overflow || i64::from(narrowed) != value {
                            warn(&format!("32 bit integer overflow when converting {text}"));
                        }
                        narrowed
                    })
                    .collect();
                self.set_field_integer_list(index, &parsed)?;
            }
            OGRFieldType::OFTInteger64List => self.store(
                index,
                FieldValue::Integer64ListValue(
                    values.iter().map(|v| atoi64(v.as_ref(), true)).collect(),
                ),
            ),
            OGRFieldType::OFTRealList => self.store(
                index,
                FieldValue::RealListValue(values.iter().map(|v| atof(v.as_ref())).collect()),
            ),
            _ => {}
        }
        Ok(())
    }

    /// Set field `index` from raw bytes. String fields take the bytes as
    /// UTF-8 text.
    pub fn set_field_binary(&mut self, index: usize, value: &[u8]) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        let field = checked_field(&defn, index, "set_field_binary")?;
        match field.field_type() {
            OGRFieldType::OFTBinary => self.store(index, FieldValue::BinaryValue(value.to_vec())),
            OGRFieldType::OFTString => {
                self.set_field_string(index, &String::from_utf8_lossy(value))?
            }
            OGRFieldType::OFTStringList => {
                self.set_field_string_list(index, &[String::from_utf8_lossy(value)])?
            }
            _ => {}
        }
        Ok(())
    }

    /// Set field `index` from a date and time record. String fields receive
    /// the `YYYY/MM/DD HH:MM:SS` rendering.
    pub fn set_field_date_time(&mut self, index: usize, value: FieldDateTime) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        let field = checked_field(&defn, index, "set_field_date_time")?;
        match field.field_type() {
            ty @ (OGRFieldType::OFTDate | OGRFieldType::OFTTime | OGRFieldType::OFTDateTime) => {
                if value.year < i32::from(i16::MIN) || value.year > i32::from(i16::MAX) {
                    cpl_error(
                        CplErrType::Failure,
                        cple::APP_DEFINED,
                        "Years < -32768 or > 32767 are not supported",
                    );
                    return Err(OgrError::failure("set_field_date_time"));
                }
                self.store(index, temporal_value(ty, value));
            }
            OGRFieldType::OFTString => {
                self.store(index, FieldValue::StringValue(value.format_date_time()))
            }
            OGRFieldType::OFTStringList => self.store(
                index,
                FieldValue::StringListValue(vec![value.format_date_time()]),
            ),
            _ => {}
        }
        Ok(())
    }

    /// Set field `index` from any value, converting it to the declared type
    /// of the field.
    pub fn set_field(&mut self, index: usize, value: &FieldValue) -> Result<()> {
        match value {
            FieldValue::IntegerValue(v) => self.set_field_integer(index, *v),
            FieldValue::Integer64Value(v) => self.set_field_integer64(index, *v),
            FieldValue::RealValue(v) => self.set_field_double(index, *v),
            FieldValue::StringValue(v) => self.set_field_string(index, v),
            FieldValue::IntegerListValue(v) => self.set_field_integer_list(index, v),
            FieldValue::Integer64ListValue(v) => self.set_field_integer64_list(index, v),
            FieldValue::RealListValue(v) => self.set_field_double_list(index, v),
            FieldValue::StringListValue(v) => self.set_field_string_list(index, v),
            FieldValue::BinaryValue(v) => self.set_field_binary(index, v),
            FieldValue::DateValue(v) | FieldValue::TimeValue(v) | FieldValue::DateTimeValue(v) => {
                self.set_field_date_time(index, *v)
            }
        }
    }
}

pub(super) fn temporal_value(ty: OGRFieldType, value: FieldDateTime) -> FieldValue {
    match ty {
        OGRFieldType::OFTDate => FieldValue::DateValue(value),
        OGRFieldType::OFTTime => FieldValue::TimeValue(value),
        _ => FieldValue::DateTimeValue(value),
    }
}
