use std::rc::Rc;

use bitflags::bitflags;

use crate::config::cpl_error;
use crate::errors::{cple, CplErrType, Result};
use crate::vector::{
    geometry_type_to_name, Feature, FieldDateTime, FieldValue, OGRFieldType, OGRwkbGeometryType,
    TZ_UTC,
};

bitflags! {
    /// Checks run by [`Feature::validate`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ValidateFlags: u32 {
        /// Non-nullable fields and geometry fields must be set.
        const NULL = 0x1;
        /// Geometries must match the declared geometry type.
        const GEOM_TYPE = 0x2;
        /// String values must fit the declared width.
        const WIDTH = 0x4;
        /// Unset non-nullable fields are accepted when they have a default.
        const ALLOW_NULL_WHEN_DEFAULT = 0x8;
        /// Geometries may differ from the declared type by their Z or M
        /// dimension.
        const ALLOW_DIFFERENT_GEOM_DIM = 0x10;
        const ALL = Self::NULL.bits() | Self::GEOM_TYPE.bits() | Self::WIDTH.bits();
    }
}

impl Feature {
    /// Check the feature against the constraints of its definition.
    ///
    /// Every field is checked; with `emit_error`, each violation is reported
    /// on the diagnostics channel.
    pub fn validate(&self, flags: ValidateFlags, emit_error: bool) -> bool {
        let report = |msg: String| {
            if emit_error {
                cpl_error(CplErrType::Failure, cple::APP_DEFINED, &msg);
            }
        };
        let mut valid = true;

        for (geom_field, geometry) in self.defn.geom_fields().zip(&self.geometries) {
            if flags.contains(ValidateFlags::NULL)
                && !geom_field.is_nullable()
                && geometry.is_none()
            {
                valid = false;
                report(format!(
                    "Geometry field {} has a NULL content which is not allowed",
                    geom_field.name()
                ));
            }

            let declared = geom_field.field_type();
            let Some(geometry) = geometry else {
                continue;
            };
            if !flags.contains(ValidateFlags::GEOM_TYPE)
                || declared == OGRwkbGeometryType::wkbUnknown
            {
                continue;
            }
            let actual = geometry.geometry_type();
            let mismatch = if flags.contains(ValidateFlags::ALLOW_DIFFERENT_GEOM_DIM) {
                declared.flatten() != OGRwkbGeometryType::wkbUnknown
                    && declared.flatten() != actual.flatten()
            } else {
                let any_with_z = OGRwkbGeometryType::wkbUnknown.set_z();
                (declared == any_with_z && !actual.has_z())
                    || (declared != any_with_z && declared != actual)
            };
            if mismatch {
                valid = false;
                report(format!(
                    "Geometry field {} has a {} geometry whereas {} is expected",
                    geom_field.name(),
                    geometry_type_to_name(actual),
                    geometry_type_to_name(declared)
                ));
            }
        }

        for (field, value) in self.defn.fields().zip(&self.fields) {
            if flags.contains(ValidateFlags::NULL)
                && !field.is_nullable()
                && value.is_none()
                && !(flags.contains(ValidateFlags::ALLOW_NULL_WHEN_DEFAULT)
                    && field.default_value().is_some())
            {
                valid = false;
                report(format!(
                    "Field {} has a NULL content which is not allowed",
                    field.name()
                ));
            }
            if flags.contains(ValidateFlags::WIDTH)
                && field.width() > 0
                && field.field_type() == OGRFieldType::OFTString
            {
                if let Some(FieldValue::StringValue(s)) = value {
                    let chars = s.chars().count();
                    if chars > field.width() as usize {
                        valid = false;
                        report(format!(
                            "Field {} has a {} UTF-8 characters whereas a maximum of {} is allowed",
                            field.name(),
                            chars,
                            field.width()
                        ));
                    }
                }
            }
        }
        valid
    }

    /// Set unset fields that have a default value to that default.
    ///
    /// With `not_nullable_only`, only non-nullable fields are filled.
    /// `CURRENT_TIMESTAMP`, `CURRENT_DATE` and `CURRENT_TIME` resolve to the
    /// current UTC time; quoted literals are unescaped. Driver specific
    /// expressions are left alone.
    pub fn fill_unset_with_default(&mut self, not_nullable_only: bool) -> Result<()> {
        let defn = Rc::clone(&self.defn);
        for (index, field) in defn.fields().enumerate() {
            if self.fields[index].is_some() || (not_nullable_only && field.is_nullable()) {
                continue;
            }
            let Some(default) = field.default_value() else {
                continue;
            };
            let ty = field.field_type();
            if ty.is_temporal() {
                if default.get(..7).is_some_and(|p| p.eq_ignore_ascii_case("CURRENT")) {
                    self.set_field_date_time(index, FieldDateTime::now_utc())?;
                } else if let Some(parsed) = parse_quoted_date_time(default) {
                    self.set_field_date_time(index, parsed)?;
                }
            } else if ty == OGRFieldType::OFTString
                && default.len() >= 2
                && default.starts_with('\'')
                && default.ends_with('\'')
            {
                let unquoted = default[1..default.len() - 1].replace("''", "'");
                self.set_field_string(index, &unquoted)?;
            } else if !field.is_default_driver_specific() && !default.eq_ignore_ascii_case("NULL") {
                self.set_field_string(index, default)?;
            }
        }
        Ok(())
    }
}

/// `'YYYY/MM/DD HH:MM:SS[.sss]'`, the form temporal defaults are stored in.
fn parse_quoted_date_time(text: &str) -> Option<FieldDateTime> {
    let inner = text.strip_prefix('\'')?;
    let inner = inner.strip_suffix('\'').unwrap_or(inner);
    let (date, time) = inner.trim().split_once(' ')?;
    let mut date_parts = date.split('/').map(|p| p.trim().parse::<i32>().ok());
    let year = date_parts.next()??;
    let month = date_parts.next()??;
    let day = date_parts.next()??;
    let mut time_parts = time.trim().split(':');
    let hour = time_parts.next()?.trim().parse::<u8>().ok()?;
    let minute = time_parts.next()?.trim().parse::<u8>().ok()?;
    let second = time_parts.next()?.trim().parse::<f32>().ok()?;
    Some(FieldDateTime::new(
        year,
        u8::try_from(month).ok()?,
        u8::try_from(day).ok()?,
        hour,
        minute,
        second,
        TZ_UTC,
    ))
}
