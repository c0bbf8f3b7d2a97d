//! Read-only fields computed from the feature rather than stored: they are
//! addressed by the indices following the attribute fields, in this order.

use crate::utils::format_g;
use crate::vector::Feature;

pub const SPF_FID: usize = 0;
pub const SPF_OGR_GEOMETRY: usize = 1;
pub const SPF_OGR_STYLE: usize = 2;
pub const SPF_OGR_GEOM_WKT: usize = 3;
pub const SPF_OGR_GEOM_AREA: usize = 4;
pub const SPECIAL_FIELD_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialField {
    Fid,
    Geometry,
    Style,
    GeometryWkt,
    GeometryArea,
}

impl SpecialField {
    /// The special field addressed by `index` on a feature with
    /// `field_count` attribute fields.
    pub fn from_index(index: usize, field_count: usize) -> Option<SpecialField> {
        match index.checked_sub(field_count)? {
            SPF_FID => Some(SpecialField::Fid),
            SPF_OGR_GEOMETRY => Some(SpecialField::Geometry),
            SPF_OGR_STYLE => Some(SpecialField::Style),
            SPF_OGR_GEOM_WKT => Some(SpecialField::GeometryWkt),
            SPF_OGR_GEOM_AREA => Some(SpecialField::GeometryArea),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpecialField::Fid => "FID",
            SpecialField::Geometry => "OGR_GEOMETRY",
            SpecialField::Style => "OGR_STYLE",
            SpecialField::GeometryWkt => "OGR_GEOM_WKT",
            SpecialField::GeometryArea => "OGR_GEOM_AREA",
        }
    }
}

impl Feature {
    pub(super) fn special_area(&self) -> f64 {
        self.geometry().map_or(0.0, |g| g.area())
    }

    pub(super) fn special_as_string(&self, field: SpecialField) -> String {
        match field {
            SpecialField::Fid => self.fid.to_string(),
            SpecialField::Geometry => self
                .geometry()
                .map(|g| g.geometry_name().to_string())
                .unwrap_or_default(),
            SpecialField::Style => self.style_string.clone().unwrap_or_default(),
            SpecialField::GeometryWkt => self
                .geometry()
                .and_then(|g| g.wkt().ok())
                .unwrap_or_default(),
            SpecialField::GeometryArea => {
                if self.geometry().is_some() {
                    format_g(self.special_area(), 16)
                } else {
                    String::new()
                }
            }
        }
    }
}
