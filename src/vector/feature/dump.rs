use std::io::Write;

use crate::cpl::CslStringList;
use crate::errors::Result;
use crate::vector::{field_sub_type_to_name, field_type_to_name, Feature, OGRFieldSubType};

impl Feature {
    /// Human readable rendering of the feature.
    ///
    /// Recognized options are `DISPLAY_FIELDS=YES/NO`, `DISPLAY_STYLE=YES/NO`
    /// and `DISPLAY_GEOMETRY=YES/NO/SUMMARY`.
    ///
    /// ```text
    /// OGRFeature(cities):3
    ///   name (String) = Lyon
    ///   pop (Integer) = 513275
    ///   POINT (4.83 45.76)
    /// ```
    pub fn dump_readable(&self, options: Option<&CslStringList>) -> Result<String> {
        let mut out = Vec::new();
        self.dump_readable_to(&mut out, options)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Write the [`Feature::dump_readable`] rendering to `out`.
    pub fn dump_readable_to<W: Write>(
        &self,
        out: &mut W,
        options: Option<&CslStringList>,
    ) -> Result<()> {
        let fetch_bool = |key: &str| options.map_or(true, |o| o.fetch_bool(key, true));
        let display_geometry = options.and_then(|o| o.fetch_name_value("DISPLAY_GEOMETRY"));

        writeln!(out, "OGRFeature({}):{}", self.defn.name(), self.fid)?;

        if fetch_bool("DISPLAY_FIELDS") {
            for (index, field) in self.defn.fields().enumerate() {
                let sub_type = if field.sub_type() == OGRFieldSubType::OFSTNone {
                    String::new()
                } else {
                    format!("({})", field_sub_type_to_name(field.sub_type()))
                };
                let value = if self.fields[index].is_some() {
                    self.field_as_string(index)?
                } else {
                    "(null)".to_string()
                };
                writeln!(
                    out,
                    "  {} ({}{}) = {}",
                    field.name(),
                    field_type_to_name(field.field_type()),
                    sub_type,
                    value
                )?;
            }
        }

        if let Some(style) = &self.style_string {
            if fetch_bool("DISPLAY_STYLE") {
                writeln!(out, "  Style = {style}")?;
            }
        }

        let show_geometry = display_geometry.map_or(true, |v| !v.eq_ignore_ascii_case("NO"));
        if show_geometry {
            let summary = display_geometry.is_some_and(|v| v.eq_ignore_ascii_case("SUMMARY"));
            let several = self.geometries.len() > 1;
            for (geom_field, geometry) in self.defn.geom_fields().zip(&self.geometries) {
                let Some(geometry) = geometry else {
                    continue;
                };
                write!(out, "  ")?;
                if several && !geom_field.name().is_empty() {
                    write!(out, "{} = ", geom_field.name())?;
                }
                write!(out, "{}", geometry.dump_readable("", summary)?)?;
            }
        }

        writeln!(out)?;
        Ok(())
    }
}
