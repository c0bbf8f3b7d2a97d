use std::rc::Rc;

use crate::errors::{OgrError, Result};
use crate::vector::{Defn, Feature, FieldValue, OGRFieldType};

use super::coercion::temporal_value;
use super::NULL_FID;

impl Feature {
    /// Copy geometries, style and attribute values from `src`, matching
    /// fields by name.
    ///
    /// Fields of `src` with no counterpart are skipped. The FID is reset.
    /// See [`Feature::set_from_with_map`] for `forgiving`.
    pub fn set_from(&mut self, src: &Feature, forgiving: bool) -> Result<()> {
        let map: Vec<Option<usize>> = src
            .defn
            .fields()
            .map(|field| self.field_index(field.name()))
            .collect();
        self.set_from_with_map(src, &map, forgiving)
    }

    /// Like [`Feature::set_from`], with `map[i]` naming the field of `self`
    /// that receives field `i` of `src`.
    pub fn set_from_with_map(
        &mut self,
        src: &Feature,
        map: &[Option<usize>],
        forgiving: bool,
    ) -> Result<()> {
        self.fid = NULL_FID;

        let defn = Rc::clone(&self.defn);
        if self.geometries.len() == 1 {
            let name = defn.geom_field_defn(0)?.name();
            let geometry = match src.geom_field_index(name) {
                Some(src_index) => src.geom_field(src_index)?,
                None => src.geometry(),
            };
            self.geometries[0] = geometry.cloned();
        } else {
            for (index, geom_field) in defn.geom_fields().enumerate() {
                self.geometries[index] = match src.geom_field_index(geom_field.name()) {
                    Some(src_index) => src.geom_field(src_index)?.cloned(),
                    None => None,
                };
            }
        }

        self.style_string = src.style_string.clone();

        self.set_fields_from(src, map, forgiving)
    }

    /// Copy the attribute values of `src`, `map[i]` naming the field of
    /// `self` that receives field `i` of `src`.
    ///
    /// Values are converted to the destination type. A conversion that makes
    /// no sense (a date into a number, say) fails unless `forgiving` is set,
    /// in which case the field is skipped. Fields copied before a failure
    /// keep their new value.
    pub fn set_fields_from(
        &mut self,
        src: &Feature,
        map: &[Option<usize>],
        forgiving: bool,
    ) -> Result<()> {
        if map.len() < src.fields.len() {
            return Err(OgrError::BadArgument(format!(
                "field map has {} entries, {} needed",
                map.len(),
                src.fields.len()
            )));
        }

        let defn = Rc::clone(&self.defn);
        for (src_index, target) in map.iter().take(src.fields.len()).enumerate() {
            let Some(dst_index) = *target else {
                continue;
            };
            let dst_type = defn
                .field_defn(dst_index)
                .map_err(|_| OgrError::InvalidFieldIndex {
                    index: dst_index,
                    method_name: "set_fields_from",
                })?
                .field_type();

            let value = match &src.fields[src_index] {
                Some(value) => value,
                None => {
                    self.fields[dst_index] = None;
                    continue;
                }
            };
            if value.ogr_field_type() == dst_type {
                self.fields[dst_index] = Some(value.clone());
                continue;
            }

            let to_text = matches!(
                dst_type,
                OGRFieldType::OFTString | OGRFieldType::OFTStringList
            );
            match value {
                FieldValue::IntegerValue(v) => self.set_field_integer(dst_index, *v)?,
                FieldValue::Integer64Value(v) => self.set_field_integer64(dst_index, *v)?,
                FieldValue::RealValue(v) => self.set_field_double(dst_index, *v)?,
                FieldValue::StringValue(v) => self.set_field_string(dst_index, v)?,
                FieldValue::IntegerListValue(_)
                | FieldValue::Integer64ListValue(_)
                | FieldValue::RealListValue(_)
                | FieldValue::StringListValue(_) => {
                    if dst_type == OGRFieldType::OFTString {
                        self.set_field_string(dst_index, &src.field_as_string(src_index)?)?
                    } else {
                        self.set_field(dst_index, value)?
                    }
                }
                FieldValue::DateValue(dt)
                | FieldValue::TimeValue(dt)
                | FieldValue::DateTimeValue(dt) => {
                    if dst_type.is_temporal() {
                        self.fields[dst_index] = Some(temporal_value(dst_type, *dt));
                    } else if to_text {
                        self.set_field_string(dst_index, &src.field_as_string(src_index)?)?
                    } else if !forgiving {
                        return Err(OgrError::failure("set_fields_from"));
                    }
                }
                FieldValue::BinaryValue(_) => {
                    if to_text {
                        self.set_field_string(dst_index, &src.field_as_string(src_index)?)?
                    } else if !forgiving {
                        return Err(OgrError::failure("set_fields_from"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Lay the attribute values out after `new_defn` (or the current
    /// definition), `remap_source[i]` naming the current field whose value
    /// goes to field `i`. Values of fields no longer referenced are dropped.
    pub fn remap_fields(
        &mut self,
        new_defn: Option<&Rc<Defn>>,
        remap_source: &[Option<usize>],
    ) -> Result<()> {
        let target_count = new_defn.map_or(self.defn.field_count(), |d| d.field_count());
        check_remap(remap_source, target_count, self.fields.len(), "remap_fields")?;

        let old = std::mem::take(&mut self.fields);
        self.fields = remap_source
            .iter()
            .map(|source| source.and_then(|i| old[i].clone()))
            .collect();
        if let Some(defn) = new_defn {
            self.switch_defn(defn);
        }
        Ok(())
    }

    /// Geometry counterpart of [`Feature::remap_fields`].
    pub fn remap_geom_fields(
        &mut self,
        new_defn: Option<&Rc<Defn>>,
        remap_source: &[Option<usize>],
    ) -> Result<()> {
        let target_count =
            new_defn.map_or(self.defn.geom_field_count(), |d| d.geom_field_count());
        check_remap(
            remap_source,
            target_count,
            self.geometries.len(),
            "remap_geom_fields",
        )?;

        let old = std::mem::take(&mut self.geometries);
        self.geometries = remap_source
            .iter()
            .map(|source| source.and_then(|i| old[i].clone()))
            .collect();
        if let Some(defn) = new_defn {
            self.switch_defn(defn);
        }
        Ok(())
    }

    fn switch_defn(&mut self, defn: &Rc<Defn>) {
        defn.reference();
        self.defn.dereference();
        self.defn = Rc::clone(defn);
    }
}

fn check_remap(
    remap_source: &[Option<usize>],
    target_count: usize,
    source_count: usize,
    method_name: &'static str,
) -> Result<()> {
    if remap_source.len() != target_count {
        return Err(OgrError::BadArgument(format!(
            "{method_name}: {} entries for {target_count} fields",
            remap_source.len()
        )));
    }
    match remap_source.iter().flatten().find(|&&i| i >= source_count) {
        Some(&index) => Err(OgrError::InvalidFieldIndex { index, method_name }),
        None => Ok(()),
    }
}
