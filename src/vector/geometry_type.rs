use std::fmt::{Display, Formatter};

/// Geometry type code, using the ISO numbering: the flat type plus 1000 for Z,
/// 2000 for M and 3000 for ZM.
///
/// Associated constants keep the traditional OGR names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OGRwkbGeometryType(u32);

#[allow(non_upper_case_globals)]
impl OGRwkbGeometryType {
    pub const wkbUnknown: Self = Self(0);
    pub const wkbPoint: Self = Self(1);
    pub const wkbLineString: Self = Self(2);
    pub const wkbPolygon: Self = Self(3);
    pub const wkbMultiPoint: Self = Self(4);
    pub const wkbMultiLineString: Self = Self(5);
    pub const wkbMultiPolygon: Self = Self(6);
    pub const wkbGeometryCollection: Self = Self(7);
    pub const wkbCircularString: Self = Self(8);
    pub const wkbCompoundCurve: Self = Self(9);
    pub const wkbCurvePolygon: Self = Self(10);
    pub const wkbMultiCurve: Self = Self(11);
    pub const wkbMultiSurface: Self = Self(12);
    pub const wkbCurve: Self = Self(13);
    pub const wkbSurface: Self = Self(14);
    pub const wkbNone: Self = Self(100);

    pub const wkbPoint25D: Self = Self(1001);
    pub const wkbLineString25D: Self = Self(1002);
    pub const wkbPolygon25D: Self = Self(1003);
    pub const wkbMultiPoint25D: Self = Self(1004);
    pub const wkbPointM: Self = Self(2001);
    pub const wkbLineStringM: Self = Self(2002);
    pub const wkbPolygonM: Self = Self(2003);
    pub const wkbMultiPointM: Self = Self(2004);

    /// Build from an ISO code, `None` for codes outside the known ranges.
    pub fn from_code(code: u32) -> Option<Self> {
        if code == 100 {
            return Some(Self::wkbNone);
        }
        if code / 1000 <= 3 && code % 1000 <= 14 {
            Some(Self(code))
        } else {
            None
        }
    }

    pub fn code(self) -> u32 {
        self.0
    }

    /// The 2D type, with Z and M dropped.
    pub fn flatten(self) -> Self {
        if self == Self::wkbNone {
            return self;
        }
        Self(self.0 % 1000)
    }

    pub fn has_z(self) -> bool {
        self != Self::wkbNone && matches!(self.0 / 1000, 1 | 3)
    }

    pub fn has_m(self) -> bool {
        self != Self::wkbNone && matches!(self.0 / 1000, 2 | 3)
    }

    pub fn set_z(self) -> Self {
        if self == Self::wkbNone || self.has_z() {
            return self;
        }
        Self(self.0 + 1000)
    }

    pub fn set_m(self) -> Self {
        if self == Self::wkbNone || self.has_m() {
            return self;
        }
        Self(self.0 + 2000)
    }
}

impl Default for OGRwkbGeometryType {
    fn default() -> Self {
        Self::wkbUnknown
    }
}

impl Display for OGRwkbGeometryType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&geometry_type_to_name(*self))
    }
}

/// Fetch a human readable name corresponding to a geometry type.
pub fn geometry_type_to_name(ty: OGRwkbGeometryType) -> String {
    let base = match ty.flatten().code() {
        0 => "Unknown (any)",
        1 => "Point",
        2 => "Line String",
        3 => "Polygon",
        4 => "Multi Point",
        5 => "Multi Line String",
        6 => "Multi Polygon",
        7 => "Geometry Collection",
        8 => "Circular String",
        9 => "Compound Curve",
        10 => "Curve Polygon",
        11 => "Multi Curve",
        12 => "Multi Surface",
        13 => "Curve",
        14 => "Surface",
        100 => "None",
        _ => "Unrecognized",
    };
    match (ty.has_z(), ty.has_m()) {
        (true, true) => format!("{base} ZM"),
        (false, true) => format!("{base} M"),
        (true, false) => format!("3D {base}"),
        (false, false) => base.to_string(),
    }
}
