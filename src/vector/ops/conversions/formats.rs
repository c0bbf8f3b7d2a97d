use geo_types::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

use crate::errors::{OgrError, Result};
use crate::utils::{format_g, strtod};
use crate::vector::Geometry;

/// Methods supporting translation between [`Geometry`] and text representations.
///
/// These include:
/// * ["Well Known" representations of geometry][wikipedia].
/// * The human readable dump used by [`crate::vector::Feature::dump_readable`].
///
/// [wikipedia]: https://en.wikipedia.org/wiki/Well-known_text_representation_of_geometry
///
impl Geometry {
    /// Create a geometry by parsing a
    /// [WKT](https://en.wikipedia.org/wiki/Well-known_text_representation_of_geometry) string.
    ///
    /// `Z`, `M` and `ZM` tagged input is accepted; the extra ordinates are dropped.
    pub fn from_wkt(wkt: &str) -> Result<Geometry> {
        let mut parser = WktParser {
            input: wkt.as_bytes(),
            text: wkt,
            pos: 0,
        };
        let geometry = parser.geometry()?;
        parser.skip_blanks();
        if parser.pos != parser.input.len() {
            return Err(parser.error("trailing characters"));
        }
        Ok(Geometry::from_geo(geometry))
    }

    /// Serialize the geometry as WKT.
    ///
    /// Integral coordinates print without decimals (`POINT (1 2)`), others with
    /// 15 significant digits.
    pub fn wkt(&self) -> Result<String> {
        let mut out = String::new();
        write_geometry(self.as_geo(), &mut out)?;
        Ok(out)
    }

    /// Human readable rendering, one line per geometry, each starting with `prefix`.
    ///
    /// With `summary` set, only the geometry name and vertex/ring/member counts
    /// are written instead of the full WKT.
    pub fn dump_readable(&self, prefix: &str, summary: bool) -> Result<String> {
        if !summary {
            return Ok(format!("{prefix}{}\n", self.wkt()?));
        }
        let mut out = String::new();
        dump_summary(self.as_geo(), prefix, &mut out);
        Ok(out)
    }
}

fn dump_summary(geometry: &geo_types::Geometry<f64>, prefix: &str, out: &mut String) {
    use geo_types::Geometry as G;
    let name = Geometry::from_geo(geometry.clone()).geometry_name();
    out.push_str(&format!("{prefix}{name} : "));
    match geometry {
        G::Point(_) => out.push('\n'),
        G::Line(_) => out.push_str("2 points\n"),
        G::LineString(ls) => out.push_str(&format!("{} points\n", ls.0.len())),
        G::Polygon(poly) => dump_polygon_summary(poly, out),
        G::Rect(rect) => dump_polygon_summary(&rect.to_polygon(), out),
        G::Triangle(triangle) => dump_polygon_summary(&triangle.to_polygon(), out),
        G::MultiPoint(mp) => {
            out.push_str(&format!("{} geometries:\n", mp.0.len()));
            for p in &mp.0 {
                dump_summary(&G::Point(*p), prefix, out);
            }
        }
        G::MultiLineString(mls) => {
            out.push_str(&format!("{} geometries:\n", mls.0.len()));
            for ls in &mls.0 {
                dump_summary(&G::LineString(ls.clone()), prefix, out);
            }
        }
        G::MultiPolygon(mp) => {
            out.push_str(&format!("{} geometries:\n", mp.0.len()));
            for poly in &mp.0 {
                dump_summary(&G::Polygon(poly.clone()), prefix, out);
            }
        }
        G::GeometryCollection(gc) => {
            out.push_str(&format!("{} geometries:\n", gc.0.len()));
            for member in &gc.0 {
                dump_summary(member, prefix, out);
            }
        }
    }
}

fn dump_polygon_summary(poly: &Polygon<f64>, out: &mut String) {
    if poly.exterior().0.is_empty() {
        out.push_str("empty\n");
        return;
    }
    out.push_str(&format!("{} points", poly.exterior().0.len()));
    if !poly.interiors().is_empty() {
        let rings: Vec<String> = poly
            .interiors()
            .iter()
            .map(|ring| format!("{} points", ring.0.len()))
            .collect();
        out.push_str(&format!(
            ", {} inner rings ({})",
            poly.interiors().len(),
            rings.join(", ")
        ));
    }
    out.push('\n');
}

fn format_ordinate(value: f64) -> String {
    let text = format_g(value, 15);
    if text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        format!("{text}.0")
    } else {
        text
    }
}

fn format_coord(c: &Coord<f64>) -> String {
    let is_int = |v: f64| v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX);
    if is_int(c.x) && is_int(c.y) {
        format!("{} {}", c.x as i32, c.y as i32)
    } else {
        format!("{} {}", format_ordinate(c.x), format_ordinate(c.y))
    }
}

fn coord_list(coords: &[Coord<f64>]) -> String {
    let parts: Vec<String> = coords.iter().map(format_coord).collect();
    format!("({})", parts.join(","))
}

fn polygon_body(poly: &Polygon<f64>) -> Option<String> {
    if poly.exterior().0.is_empty() {
        return None;
    }
    let mut rings = vec![coord_list(&poly.exterior().0)];
    rings.extend(poly.interiors().iter().map(|r| coord_list(&r.0)));
    Some(format!("({})", rings.join(",")))
}

fn write_geometry(geometry: &geo_types::Geometry<f64>, out: &mut String) -> Result<()> {
    use geo_types::Geometry as G;
    let name = Geometry::from_geo(geometry.clone()).geometry_name();
    out.push_str(name);
    let body = match geometry {
        G::Point(p) => Some(format!("({})", format_coord(&p.0))),
        G::Line(l) => Some(coord_list(&[l.start, l.end])),
        G::LineString(ls) if ls.0.is_empty() => None,
        G::LineString(ls) => Some(coord_list(&ls.0)),
        G::Polygon(poly) => polygon_body(poly),
        G::Rect(r) => polygon_body(&r.to_polygon()),
        G::Triangle(t) => polygon_body(&t.to_polygon()),
        G::MultiPoint(mp) if mp.0.is_empty() => None,
        G::MultiPoint(mp) => {
            let parts: Vec<String> = mp.0.iter().map(|p| format!("({})", format_coord(&p.0))).collect();
            Some(format!("({})", parts.join(",")))
        }
        G::MultiLineString(mls) if mls.0.is_empty() => None,
        G::MultiLineString(mls) => {
            let parts: Vec<String> = mls
                .0
                .iter()
                .map(|ls| {
                    if ls.0.is_empty() {
                        "EMPTY".to_string()
                    } else {
                        coord_list(&ls.0)
                    }
                })
                .collect();
            Some(format!("({})", parts.join(",")))
        }
        G::MultiPolygon(mp) if mp.0.is_empty() => None,
        G::MultiPolygon(mp) => {
            let parts: Vec<String> = mp
                .0
                .iter()
                .map(|p| polygon_body(p).unwrap_or_else(|| "EMPTY".to_string()))
                .collect();
            Some(format!("({})", parts.join(",")))
        }
        G::GeometryCollection(gc) if gc.0.is_empty() => None,
        G::GeometryCollection(gc) => {
            let mut parts = Vec::with_capacity(gc.0.len());
            for member in &gc.0 {
                let mut text = String::new();
                write_geometry(member, &mut text)?;
                parts.push(text);
            }
            Some(format!("({})", parts.join(",")))
        }
    };
    match body {
        Some(body) => {
            out.push(' ');
            out.push_str(&body);
        }
        None => out.push_str(" EMPTY"),
    }
    Ok(())
}

struct WktParser<'a> {
    input: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl WktParser<'_> {
    fn error(&self, msg: &str) -> OgrError {
        OgrError::BadArgument(format!(
            "Invalid WKT at offset {}: {msg} in '{}'",
            self.pos, self.text
        ))
    }

    fn skip_blanks(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_blanks();
        self.input.get(self.pos).copied()
    }

    fn expect(&mut self, c: u8) -> Result<()> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c as char)))
        }
    }

    fn word(&mut self) -> String {
        self.skip_blanks();
        let start = self.pos;
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_alphabetic() {
            self.pos += 1;
        }
        self.text[start..self.pos].to_ascii_uppercase()
    }

    /// Consume an optional `Z`/`M`/`ZM` tag, then `EMPTY` if present.
    fn empty_marker(&mut self) -> Result<bool> {
        let save = self.pos;
        let mut word = self.word();
        if matches!(word.as_str(), "Z" | "M" | "ZM") {
            let after_tag = self.pos;
            word = self.word();
            if word.is_empty() {
                self.pos = after_tag;
            }
        }
        match word.as_str() {
            "EMPTY" => Ok(true),
            "" => Ok(false),
            _ => {
                self.pos = save;
                Err(self.error(&format!("unexpected keyword '{word}'")))
            }
        }
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_blanks();
        let (value, consumed) = strtod(&self.text[self.pos..]);
        if consumed == 0 {
            return Err(self.error("expected a number"));
        }
        self.pos += consumed;
        Ok(value)
    }

    fn coord(&mut self) -> Result<Coord<f64>> {
        let x = self.number()?;
        let y = self.number()?;
        // extra Z / M ordinates
        while matches!(self.peek(), Some(b'-' | b'+' | b'.' | b'0'..=b'9')) {
            self.number()?;
        }
        Ok(Coord { x, y })
    }

    fn coords(&mut self) -> Result<Vec<Coord<f64>>> {
        self.expect(b'(')?;
        let mut coords = vec![self.coord()?];
        while self.peek() == Some(b',') {
            self.pos += 1;
            coords.push(self.coord()?);
        }
        self.expect(b')')?;
        Ok(coords)
    }

    fn list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.expect(b'(')?;
        let mut items = vec![item(self)?];
        while self.peek() == Some(b',') {
            self.pos += 1;
            items.push(item(self)?);
        }
        self.expect(b')')?;
        Ok(items)
    }

    fn polygon(&mut self) -> Result<Polygon<f64>> {
        if self.empty_marker()? {
            return Ok(Polygon::new(LineString::new(vec![]), vec![]));
        }
        let mut rings = self.list(|p| p.coords().map(LineString::from))?;
        let exterior = rings.remove(0);
        Ok(Polygon::new(exterior, rings))
    }

    fn line_string(&mut self) -> Result<LineString<f64>> {
        if self.empty_marker()? {
            return Ok(LineString::new(vec![]));
        }
        Ok(LineString::from(self.coords()?))
    }

    fn geometry(&mut self) -> Result<geo_types::Geometry<f64>> {
        use geo_types::Geometry as G;
        let keyword = self.word();
        let geometry = match keyword.as_str() {
            "POINT" => {
                if self.empty_marker()? {
                    return Err(self.error("empty points are not supported"));
                }
                self.expect(b'(')?;
                let c = self.coord()?;
                self.expect(b')')?;
                G::Point(Point(c))
            }
            "LINESTRING" => G::LineString(self.line_string()?),
            "POLYGON" => G::Polygon(self.polygon()?),
            "MULTIPOINT" => {
                if self.empty_marker()? {
                    return Ok(G::MultiPoint(MultiPoint(vec![])));
                }
                let points = self.list(|p| {
                    if p.peek() == Some(b'(') {
                        p.pos += 1;
                        let c = p.coord()?;
                        p.expect(b')')?;
                        Ok(Point(c))
                    } else {
                        p.coord().map(Point)
                    }
                })?;
                G::MultiPoint(MultiPoint(points))
            }
            "MULTILINESTRING" => {
                if self.empty_marker()? {
                    return Ok(G::MultiLineString(MultiLineString(vec![])));
                }
                let lines = self.list(|p| {
                    if p.peek() == Some(b'(') {
                        p.coords().map(LineString::from)
                    } else {
                        p.line_string()
                    }
                })?;
                G::MultiLineString(MultiLineString(lines))
            }
            "MULTIPOLYGON" => {
                if self.empty_marker()? {
                    return Ok(G::MultiPolygon(MultiPolygon(vec![])));
                }
                let polygons = self.list(|p| p.polygon())?;
                G::MultiPolygon(MultiPolygon(polygons))
            }
            "GEOMETRYCOLLECTION" => {
                if self.empty_marker()? {
                    return Ok(G::GeometryCollection(geo_types::GeometryCollection(vec![])));
                }
                let members = self.list(|p| p.geometry())?;
                G::GeometryCollection(geo_types::GeometryCollection(members))
            }
            _ => return Err(self.error(&format!("unknown geometry type '{keyword}'"))),
        };
        Ok(geometry)
    }
}
