use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::errors::{OgrError, Result};

/// Spatial reference system described by its WKT definition
#[derive(Debug, Clone)]
pub struct SpatialRef {
    wkt: String,
}

const ROOT_KEYWORDS: [&str; 6] = [
    "PROJCS", "GEOGCS", "GEOCCS", "COMPD_CS", "VERT_CS", "LOCAL_CS",
];

impl SpatialRef {
    /// Build a spatial reference from a WKT definition, such as the content
    /// of a `.prj` file.
    pub fn from_wkt(wkt: &str) -> Result<SpatialRef> {
        let wkt = wkt.trim().trim_start_matches('\u{feff}');
        let keyword_ok = ROOT_KEYWORDS.iter().any(|k| {
            wkt.len() > k.len()
                && wkt.is_char_boundary(k.len())
                && wkt[..k.len()].eq_ignore_ascii_case(k)
                && wkt[k.len()..].trim_start().starts_with('[')
        });
        if !keyword_ok || !Self::balanced(wkt) {
            return Err(OgrError::BadArgument(format!(
                "Not a WKT coordinate system definition: '{wkt}'"
            )));
        }
        Ok(SpatialRef {
            wkt: wkt.to_string(),
        })
    }

    fn balanced(wkt: &str) -> bool {
        let mut depth = 0i32;
        let mut in_quotes = false;
        for c in wkt.chars() {
            match c {
                '"' => in_quotes = !in_quotes,
                '[' | '(' if !in_quotes => depth += 1,
                ']' | ')' if !in_quotes => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0 && !in_quotes
    }

    pub fn to_wkt(&self) -> Result<String> {
        Ok(self.wkt.clone())
    }

    /// The name of the root node, e.g. `WGS 84` for `GEOGCS["WGS 84",...]`.
    pub fn name(&self) -> Option<String> {
        let start = self.wkt.find('"')? + 1;
        let len = self.wkt[start..].find('"')?;
        Some(self.wkt[start..start + len].to_string())
    }

    /// Whether the root node is a projected coordinate system.
    pub fn is_projected(&self) -> bool {
        self.wkt
            .get(..6)
            .is_some_and(|k| k.eq_ignore_ascii_case("PROJCS"))
    }

    /// The authority code of the root node, when the definition ends with an
    /// `AUTHORITY["EPSG","4326"]` clause.
    pub fn auth_code(&self) -> Result<i32> {
        let missing = || OgrError::BadArgument(format!("No root authority in '{}'", self.wkt));
        let upper = self.wkt.to_ascii_uppercase();
        let pos = upper.rfind("AUTHORITY[").ok_or_else(missing)?;
        // only the authority of the root node counts: nothing but closing brackets after it
        let clause = &self.wkt[pos + "AUTHORITY[".len()..];
        let close = clause.find(']').ok_or_else(missing)?;
        if !clause[close + 1..].trim().chars().all(|c| c == ']') {
            return Err(missing());
        }
        let code = clause[..close]
            .split(',')
            .nth(1)
            .ok_or_else(missing)?
            .trim()
            .trim_matches('"');
        code.parse::<i32>().map_err(|_| missing())
    }

    fn normalized(&self) -> String {
        let mut out = String::with_capacity(self.wkt.len());
        let mut in_quotes = false;
        for c in self.wkt.chars() {
            if c == '"' {
                in_quotes = !in_quotes;
            }
            if !in_quotes && c.is_whitespace() {
                continue;
            }
            out.extend(c.to_uppercase());
        }
        out
    }

    /// Structural comparison: same definition up to case and insignificant blanks.
    pub fn is_same(&self, other: &SpatialRef) -> bool {
        self.normalized() == other.normalized()
    }
}

impl PartialEq for SpatialRef {
    fn eq(&self, other: &SpatialRef) -> bool {
        self.is_same(other)
    }
}

impl FromStr for SpatialRef {
    type Err = OgrError;

    fn from_str(s: &str) -> Result<Self> {
        SpatialRef::from_wkt(s)
    }
}

impl Display for SpatialRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.wkt)
    }
}
