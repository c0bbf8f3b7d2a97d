use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use geo_types::Coord;
use tracing::{debug, trace};

use crate::errors::{OgrError, Result};
use crate::vector::{OGREnvelope, OGRwkbGeometryType};

pub(crate) const HEADER_SIZE: usize = 100;
const FILE_CODE: i32 = 9994;
const VERSION: i32 = 1000;
const SHX_ENTRY_SIZE: usize = 8;
const RECORD_HEADER_SIZE: usize = 8;
/// Offset of the shape type word in the `.shp` and `.shx` headers.
pub(crate) const SHAPE_TYPE_OFFSET: usize = 32;

/// Shape type code of a `.shp` file and of its records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Null = 0,
    Point = 1,
    Arc = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    ArcZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    ArcM = 23,
    PolygonM = 25,
    MultiPointM = 28,
    MultiPatch = 31,
}

const ALL_SHAPE_TYPES: [ShapeType; 14] = [
    ShapeType::Null,
    ShapeType::Point,
    ShapeType::Arc,
    ShapeType::Polygon,
    ShapeType::MultiPoint,
    ShapeType::PointZ,
    ShapeType::ArcZ,
    ShapeType::PolygonZ,
    ShapeType::MultiPointZ,
    ShapeType::PointM,
    ShapeType::ArcM,
    ShapeType::PolygonM,
    ShapeType::MultiPointM,
    ShapeType::MultiPatch,
];

impl ShapeType {
    pub fn from_code(code: i32) -> Option<ShapeType> {
        ALL_SHAPE_TYPES.into_iter().find(|t| t.code() == code)
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// The `SHPT` creation option spelling: `POINT`, `ARCZ`, `POLYGONM`...
    pub fn name(self) -> &'static str {
        match self {
            ShapeType::Null => "NULL",
            ShapeType::Point => "POINT",
            ShapeType::Arc => "ARC",
            ShapeType::Polygon => "POLYGON",
            ShapeType::MultiPoint => "MULTIPOINT",
            ShapeType::PointZ => "POINTZ",
            ShapeType::ArcZ => "ARCZ",
            ShapeType::PolygonZ => "POLYGONZ",
            ShapeType::MultiPointZ => "MULTIPOINTZ",
            ShapeType::PointM => "POINTM",
            ShapeType::ArcM => "ARCM",
            ShapeType::PolygonM => "POLYGONM",
            ShapeType::MultiPointM => "MULTIPOINTM",
            ShapeType::MultiPatch => "MULTIPATCH",
        }
    }

    /// Parse a `SHPT` creation option value, case-insensitively.
    pub fn from_name(name: &str) -> Option<ShapeType> {
        ALL_SHAPE_TYPES
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn has_z(self) -> bool {
        matches!(
            self,
            ShapeType::PointZ
                | ShapeType::ArcZ
                | ShapeType::PolygonZ
                | ShapeType::MultiPointZ
                | ShapeType::MultiPatch
        )
    }

    /// Whether records carry a measure array. Z types always do.
    pub fn has_m(self) -> bool {
        self.has_z()
            || matches!(
                self,
                ShapeType::PointM | ShapeType::ArcM | ShapeType::PolygonM | ShapeType::MultiPointM
            )
    }

    /// The 2D type of the same family.
    pub fn flatten(self) -> ShapeType {
        match self {
            ShapeType::PointZ | ShapeType::PointM => ShapeType::Point,
            ShapeType::ArcZ | ShapeType::ArcM => ShapeType::Arc,
            ShapeType::PolygonZ | ShapeType::PolygonM => ShapeType::Polygon,
            ShapeType::MultiPointZ | ShapeType::MultiPointM => ShapeType::MultiPoint,
            other => other,
        }
    }

    /// The geometry type features read from this shape type carry. Z and M
    /// variants map to the 2D type.
    pub fn geometry_type(self) -> OGRwkbGeometryType {
        match self.flatten() {
            ShapeType::Point => OGRwkbGeometryType::wkbPoint,
            ShapeType::Arc => OGRwkbGeometryType::wkbLineString,
            ShapeType::Polygon => OGRwkbGeometryType::wkbPolygon,
            ShapeType::MultiPoint => OGRwkbGeometryType::wkbMultiPoint,
            _ => OGRwkbGeometryType::wkbUnknown,
        }
    }

    /// Shape type able to store geometries of type `ty`. `wkbUnknown` maps
    /// to [`ShapeType::Null`], to be settled by the first feature written.
    pub fn from_geometry_type(ty: OGRwkbGeometryType) -> Option<ShapeType> {
        let (z, m) = (ty.has_z(), ty.has_m());
        let pick = |flat: ShapeType, with_z: ShapeType, with_m: ShapeType| {
            if z {
                with_z
            } else if m {
                with_m
            } else {
                flat
            }
        };
        match ty.flatten() {
            OGRwkbGeometryType::wkbUnknown if !z && !m => Some(ShapeType::Null),
            OGRwkbGeometryType::wkbPoint => {
                Some(pick(ShapeType::Point, ShapeType::PointZ, ShapeType::PointM))
            }
            OGRwkbGeometryType::wkbLineString | OGRwkbGeometryType::wkbMultiLineString => {
                Some(pick(ShapeType::Arc, ShapeType::ArcZ, ShapeType::ArcM))
            }
            OGRwkbGeometryType::wkbPolygon | OGRwkbGeometryType::wkbMultiPolygon => {
                Some(pick(ShapeType::Polygon, ShapeType::PolygonZ, ShapeType::PolygonM))
            }
            OGRwkbGeometryType::wkbMultiPoint => Some(pick(
                ShapeType::MultiPoint,
                ShapeType::MultiPointZ,
                ShapeType::MultiPointM,
            )),
            _ => None,
        }
    }
}

/// One decoded `.shp` record: vertices split in parts.
///
/// Z and M values are not kept.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ShapeRecord {
    pub shape_type: ShapeType,
    /// Index in `vertices` of the first vertex of each part.
    pub part_starts: Vec<usize>,
    pub vertices: Vec<Coord<f64>>,
}

impl ShapeRecord {
    pub fn null() -> ShapeRecord {
        ShapeRecord {
            shape_type: ShapeType::Null,
            part_starts: Vec::new(),
            vertices: Vec::new(),
        }
    }

    /// The vertices of each part.
    pub fn parts(&self) -> impl Iterator<Item = &[Coord<f64>]> {
        let ends = self
            .part_starts
            .iter()
            .skip(1)
            .copied()
            .chain(std::iter::once(self.vertices.len()));
        self.part_starts
            .iter()
            .zip(ends)
            .map(|(&start, end)| &self.vertices[start..end])
    }

    pub fn bounds(&self) -> Option<OGREnvelope> {
        let first = self.vertices.first()?;
        let mut envelope = OGREnvelope {
            MinX: first.x,
            MaxX: first.x,
            MinY: first.y,
            MaxY: first.y,
        };
        for c in &self.vertices[1..] {
            envelope.MinX = envelope.MinX.min(c.x);
            envelope.MaxX = envelope.MaxX.max(c.x);
            envelope.MinY = envelope.MinY.min(c.y);
            envelope.MaxY = envelope.MaxY.max(c.y);
        }
        Some(envelope)
    }

    /// Record content, as stored after the 8 byte record header.
    pub fn encode(&self) -> Vec<u8> {
        let ty = self.shape_type;
        let mut out = Vec::with_capacity(44 + 4 * self.part_starts.len() + 32 * self.vertices.len());
        put_i32_le(&mut out, ty.code());
        if ty == ShapeType::Null {
            return out;
        }

        if ty.flatten() == ShapeType::Point {
            let c = self.vertices.first().copied().unwrap_or(Coord { x: 0.0, y: 0.0 });
            put_f64_le(&mut out, c.x);
            put_f64_le(&mut out, c.y);
            if ty.has_z() {
                put_f64_le(&mut out, 0.0);
            }
            if ty.has_m() {
                put_f64_le(&mut out, 0.0);
            }
            return out;
        }

        let bounds = self.bounds().unwrap_or_default();
        for v in [bounds.MinX, bounds.MinY, bounds.MaxX, bounds.MaxY] {
            put_f64_le(&mut out, v);
        }
        let with_parts = ty.flatten() != ShapeType::MultiPoint;
        if with_parts {
            put_i32_le(&mut out, self.part_starts.len() as i32);
        }
        put_i32_le(&mut out, self.vertices.len() as i32);
        if with_parts {
            for &start in &self.part_starts {
                put_i32_le(&mut out, start as i32);
            }
        }
        for c in &self.vertices {
            put_f64_le(&mut out, c.x);
            put_f64_le(&mut out, c.y);
        }
        let zeroed_ordinate = |out: &mut Vec<u8>| {
            put_f64_le(out, 0.0);
            put_f64_le(out, 0.0);
            for _ in &self.vertices {
                put_f64_le(out, 0.0);
            }
        };
        if ty.has_z() {
            zeroed_ordinate(&mut out);
        }
        if ty.has_m() {
            zeroed_ordinate(&mut out);
        }
        out
    }

    /// Decode record content. The error is a description of the damage.
    pub fn decode(content: &[u8]) -> std::result::Result<ShapeRecord, String> {
        if content.is_empty() {
            return Ok(ShapeRecord::null());
        }
        let mut reader = ByteReader::new(content);
        let code = reader.i32_le()?;
        let shape_type =
            ShapeType::from_code(code).ok_or_else(|| format!("unknown shape type {code}"))?;

        match shape_type.flatten() {
            ShapeType::Null => Ok(ShapeRecord::null()),
            ShapeType::Point => {
                let x = reader.f64_le()?;
                let y = reader.f64_le()?;
                Ok(ShapeRecord {
                    shape_type,
                    part_starts: vec![0],
                    vertices: vec![Coord { x, y }],
                })
            }
            ShapeType::MultiPoint => {
                reader.skip(32)?;
                let count = reader.count("point")?;
                let vertices = reader.coords(count)?;
                let part_starts = if count == 0 { Vec::new() } else { vec![0] };
                Ok(ShapeRecord {
                    shape_type,
                    part_starts,
                    vertices,
                })
            }
            _ => {
                reader.skip(32)?;
                let part_count = reader.count("part")?;
                let vertex_count = reader.count("point")?;
                let mut part_starts = Vec::with_capacity(part_count.min(content.len() / 4));
                for _ in 0..part_count {
                    let start = reader.i32_le()?;
                    let start = usize::try_from(start)
                        .ok()
                        .filter(|&s| s < vertex_count)
                        .ok_or_else(|| format!("part start {start} out of range"))?;
                    if part_starts.last().is_some_and(|&previous| start < previous) {
                        return Err("part starts are not increasing".to_string());
                    }
                    part_starts.push(start);
                }
                if shape_type == ShapeType::MultiPatch {
                    reader.skip(4 * part_count)?;
                }
                let vertices = reader.coords(vertex_count)?;
                if part_starts.is_empty() && !vertices.is_empty() {
                    part_starts.push(0);
                } else if let Some(first) = part_starts.first_mut() {
                    *first = 0;
                }
                Ok(ShapeRecord {
                    shape_type,
                    part_starts,
                    vertices,
                })
            }
        }
    }
}

fn put_i32_le(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_f64_le(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Bounds checked little-endian reads over a record.
struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        ByteReader { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> std::result::Result<&'a [u8], String> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.buf.len());
        match end {
            Some(end) => {
                let bytes = &self.buf[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            None => Err(format!(
                "record of {} bytes is too short, {} more needed at offset {}",
                self.buf.len(),
                n,
                self.pos
            )),
        }
    }

    fn skip(&mut self, n: usize) -> std::result::Result<(), String> {
        self.take(n).map(|_| ())
    }

    fn i32_le(&mut self) -> std::result::Result<i32, String> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.take(4)?);
        Ok(i32::from_le_bytes(bytes))
    }

    fn f64_le(&mut self) -> std::result::Result<f64, String> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(f64::from_le_bytes(bytes))
    }

    fn count(&mut self, what: &str) -> std::result::Result<usize, String> {
        let n = self.i32_le()?;
        usize::try_from(n).map_err(|_| format!("negative {what} count {n}"))
    }

    fn coords(&mut self, count: usize) -> std::result::Result<Vec<Coord<f64>>, String> {
        let bytes = count
            .checked_mul(16)
            .ok_or_else(|| format!("{count} points do not fit in a record"))?;
        let raw = self.take(bytes)?;
        Ok(raw
            .chunks_exact(16)
            .map(|chunk| {
                let mut x = [0u8; 8];
                let mut y = [0u8; 8];
                x.copy_from_slice(&chunk[..8]);
                y.copy_from_slice(&chunk[8..]);
                Coord {
                    x: f64::from_le_bytes(x),
                    y: f64::from_le_bytes(y),
                }
            })
            .collect())
    }
}

fn be_i32_at(buf: &[u8], pos: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[pos..pos + 4]);
    i32::from_be_bytes(bytes)
}

fn le_i32_at(buf: &[u8], pos: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[pos..pos + 4]);
    i32::from_le_bytes(bytes)
}

fn le_f64_at(buf: &[u8], pos: usize) -> f64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[pos..pos + 8]);
    f64::from_le_bytes(bytes)
}

/// Length in 16 bit words, as stored in headers.
fn words(bytes: u64) -> [u8; 4] {
    u32::try_from(bytes / 2).unwrap_or(u32::MAX).to_be_bytes()
}

/// The 100 byte header shared by `.shp` and `.shx`.
///
/// `bounds` is Xmin, Ymin, Xmax, Ymax, Zmin, Zmax, Mmin, Mmax.
fn header_bytes(shape_type: ShapeType, file_len: u64, bounds: &[f64; 8]) -> [u8; HEADER_SIZE] {
    let mut buf = [0u8; HEADER_SIZE];
    buf[0..4].copy_from_slice(&FILE_CODE.to_be_bytes());
    buf[24..28].copy_from_slice(&words(file_len));
    buf[28..32].copy_from_slice(&VERSION.to_le_bytes());
    buf[32..36].copy_from_slice(&shape_type.code().to_le_bytes());
    for (i, v) in bounds.iter().enumerate() {
        let pos = 36 + 8 * i;
        buf[pos..pos + 8].copy_from_slice(&v.to_le_bytes());
    }
    buf
}

/// Paths of the `.shp`, `.shx` and sibling files of a layer, keeping the
/// extension case of the `.shp` path.
pub(crate) fn sibling(path: &Path, extension: &str) -> PathBuf {
    let upper = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.chars().all(|c| c.is_ascii_uppercase()) && !e.is_empty());
    if upper {
        path.with_extension(extension.to_ascii_uppercase())
    } else {
        path.with_extension(extension)
    }
}

/// A `.shp` geometry file with its `.shx` record index.
pub(crate) struct ShpFile {
    path: PathBuf,
    shp: File,
    shx: File,
    shape_type: ShapeType,
    /// Byte offset of each record header in the `.shp`.
    offsets: Vec<u64>,
    /// Content size of each record, without its header.
    sizes: Vec<u64>,
    file_size: u64,
    bounds: [f64; 8],
    has_bounds: bool,
    header_dirty: bool,
}

impl ShpFile {
    /// Create an empty `.shp`/`.shx` pair, overwriting existing files.
    pub fn create(path: &Path, shape_type: ShapeType) -> Result<ShpFile> {
        let open = |p: &Path| {
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(p)
        };
        let mut shp_file = ShpFile {
            path: path.to_path_buf(),
            shp: open(path)?,
            shx: open(&sibling(path, "shx"))?,
            shape_type,
            offsets: Vec::new(),
            sizes: Vec::new(),
            file_size: HEADER_SIZE as u64,
            bounds: [0.0; 8],
            has_bounds: false,
            header_dirty: true,
        };
        shp_file.write_header()?;
        debug!(path = %path.display(), shape_type = shape_type.name(), "created shapefile");
        Ok(shp_file)
    }

    /// Open an existing `.shp`, with its `.shx`.
    ///
    /// With `restore_shx`, a missing `.shx` is rebuilt by scanning the `.shp`.
    pub fn open(path: &Path, update: bool, restore_shx: bool) -> Result<ShpFile> {
        let open = |p: &Path| OpenOptions::new().read(true).write(update).open(p);
        let mut shp = open(path)?;
        let file_size = shp.metadata()?.len();

        let mut header = [0u8; HEADER_SIZE];
        shp.read_exact(&mut header)
            .map_err(|_| corrupt(path, "header is truncated"))?;
        if be_i32_at(&header, 0) != FILE_CODE {
            return Err(corrupt(path, "not a shapefile, bad file code"));
        }
        let code = le_i32_at(&header, SHAPE_TYPE_OFFSET);
        let shape_type = ShapeType::from_code(code)
            .ok_or_else(|| corrupt(path, &format!("unknown shape type {code}")))?;
        let mut bounds = [0.0; 8];
        for (i, b) in bounds.iter_mut().enumerate() {
            *b = le_f64_at(&header, 36 + 8 * i);
        }

        let shx_path = sibling(path, "shx");
        let (shx, offsets, sizes) = match open(&shx_path) {
            Ok(shx) => {
                let (offsets, sizes) = read_index(shx_path.as_path(), &shx, file_size)?;
                (shx, offsets, sizes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound && restore_shx => {
                let (offsets, sizes) = scan_records(path, &mut shp, file_size)?;
                let shx = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&shx_path)?;
                debug!(path = %shx_path.display(), records = offsets.len(), "restored index file");
                let mut shp_file = ShpFile {
                    path: path.to_path_buf(),
                    shp,
                    shx,
                    shape_type,
                    offsets,
                    sizes,
                    file_size,
                    bounds,
                    has_bounds: true,
                    header_dirty: false,
                };
                shp_file.write_index()?;
                shp_file.write_shx_header()?;
                return Ok(shp_file);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(corrupt(
                    &shx_path,
                    "index file is missing. Set SHAPE_RESTORE_SHX config option to YES to restore it",
                ))
            }
            Err(e) => return Err(e.into()),
        };

        debug!(
            path = %path.display(),
            shape_type = shape_type.name(),
            records = offsets.len(),
            "opened shapefile"
        );
        Ok(ShpFile {
            path: path.to_path_buf(),
            shp,
            shx,
            shape_type,
            has_bounds: !offsets.is_empty(),
            offsets,
            sizes,
            file_size,
            bounds,
            header_dirty: false,
        })
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn record_count(&self) -> usize {
        self.offsets.len()
    }

    /// The X/Y bounds stored in the header.
    pub fn extent(&self) -> OGREnvelope {
        OGREnvelope {
            MinX: self.bounds[0],
            MinY: self.bounds[1],
            MaxX: self.bounds[2],
            MaxY: self.bounds[3],
        }
    }

    /// Raw content of record `index`, without its header.
    pub fn read_record_bytes(&mut self, index: usize) -> Result<Vec<u8>> {
        let (offset, size) = match (self.offsets.get(index), self.sizes.get(index)) {
            (Some(&offset), Some(&size)) => (offset, size),
            _ => {
                return Err(OgrError::BadArgument(format!(
                    "shape {index} out of range, {} records",
                    self.offsets.len()
                )))
            }
        };
        if offset + RECORD_HEADER_SIZE as u64 + size > self.file_size {
            return Err(corrupt(
                &self.path,
                &format!("record {index} extends past the end of the file"),
            ));
        }
        let mut content = vec![0u8; size as usize];
        self.shp
            .seek(SeekFrom::Start(offset + RECORD_HEADER_SIZE as u64))?;
        self.shp.read_exact(&mut content)?;
        Ok(content)
    }

    pub fn read_record(&mut self, index: usize) -> Result<ShapeRecord> {
        let content = self.read_record_bytes(index)?;
        trace!(index, bytes = content.len(), "read shape");
        ShapeRecord::decode(&content)
            .map_err(|msg| corrupt(&self.path, &format!("record {index}: {msg}")))
    }

    /// Write record `index`; `index == record_count()` appends.
    ///
    /// An existing record is overwritten in place when the new content fits,
    /// and moved to the end of the file otherwise.
    pub fn write_record(&mut self, index: usize, record: &ShapeRecord) -> Result<()> {
        let content = record.encode();
        self.put_content(index, &content, record.bounds())
    }

    fn put_content(
        &mut self,
        index: usize,
        content: &[u8],
        bounds: Option<OGREnvelope>,
    ) -> Result<()> {
        let count = self.offsets.len();
        if index > count {
            return Err(OgrError::BadArgument(format!(
                "shape {index} out of range, {count} records"
            )));
        }
        let size = content.len() as u64;
        let offset = if index < count && size <= self.sizes[index] {
            self.offsets[index]
        } else {
            self.file_size
        };

        let mut buf = Vec::with_capacity(RECORD_HEADER_SIZE + content.len());
        buf.extend_from_slice(&(index as i32 + 1).to_be_bytes());
        buf.extend_from_slice(&words(size));
        buf.extend_from_slice(content);
        self.shp.seek(SeekFrom::Start(offset))?;
        self.shp.write_all(&buf)?;
        self.file_size = self.file_size.max(offset + buf.len() as u64);

        if index == count {
            self.offsets.push(offset);
            self.sizes.push(size);
        } else {
            self.offsets[index] = offset;
            self.sizes[index] = size;
        }
        self.write_index_entry(index)?;

        if let Some(b) = bounds {
            if self.has_bounds {
                self.bounds[0] = self.bounds[0].min(b.MinX);
                self.bounds[1] = self.bounds[1].min(b.MinY);
                self.bounds[2] = self.bounds[2].max(b.MaxX);
                self.bounds[3] = self.bounds[3].max(b.MaxY);
            } else {
                self.bounds[..4].copy_from_slice(&[b.MinX, b.MinY, b.MaxX, b.MaxY]);
                self.has_bounds = true;
            }
        }
        self.header_dirty = true;
        trace!(index, offset, bytes = size, "wrote shape");
        Ok(())
    }

    /// Rewrite the shape type word of both headers in place.
    pub fn set_shape_type(&mut self, shape_type: ShapeType) -> Result<()> {
        let word = shape_type.code().to_le_bytes();
        for file in [&mut self.shp, &mut self.shx] {
            file.seek(SeekFrom::Start(SHAPE_TYPE_OFFSET as u64))?;
            file.write_all(&word)?;
        }
        self.shape_type = shape_type;
        Ok(())
    }

    /// Keep only the records listed in `keep`, in that order, renumbered
    /// from 0 and stored contiguously.
    pub fn repack(&mut self, keep: &[usize]) -> Result<()> {
        let mut contents = Vec::with_capacity(keep.len());
        for &index in keep {
            contents.push(self.read_record_bytes(index)?);
        }

        self.shp.set_len(HEADER_SIZE as u64)?;
        self.shx.set_len(HEADER_SIZE as u64)?;
        self.offsets.clear();
        self.sizes.clear();
        self.file_size = HEADER_SIZE as u64;
        self.bounds[..4].copy_from_slice(&[0.0; 4]);
        self.has_bounds = false;

        for (index, content) in contents.iter().enumerate() {
            let bounds = ShapeRecord::decode(content)
                .map_err(|msg| corrupt(&self.path, &format!("record {index}: {msg}")))?
                .bounds();
            self.put_content(index, content, bounds)?;
        }
        self.write_header()?;
        debug!(path = %self.path.display(), records = keep.len(), "repacked shapes");
        Ok(())
    }

    fn write_index_entry(&mut self, index: usize) -> Result<()> {
        let mut entry = [0u8; SHX_ENTRY_SIZE];
        entry[0..4].copy_from_slice(&words(self.offsets[index]));
        entry[4..8].copy_from_slice(&words(self.sizes[index]));
        self.shx.seek(SeekFrom::Start(
            (HEADER_SIZE + SHX_ENTRY_SIZE * index) as u64,
        ))?;
        self.shx.write_all(&entry)?;
        Ok(())
    }

    fn write_index(&mut self) -> Result<()> {
        let mut buf = Vec::with_capacity(SHX_ENTRY_SIZE * self.offsets.len());
        for (offset, size) in self.offsets.iter().zip(&self.sizes) {
            buf.extend_from_slice(&words(*offset));
            buf.extend_from_slice(&words(*size));
        }
        self.shx.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
        self.shx.write_all(&buf)?;
        Ok(())
    }

    pub fn write_header(&mut self) -> Result<()> {
        let shp_header = header_bytes(self.shape_type, self.file_size, &self.bounds);
        self.shp.seek(SeekFrom::Start(0))?;
        self.shp.write_all(&shp_header)?;
        self.write_shx_header()?;
        self.header_dirty = false;
        Ok(())
    }

    fn write_shx_header(&mut self) -> Result<()> {
        let shx_len = (HEADER_SIZE + SHX_ENTRY_SIZE * self.offsets.len()) as u64;
        let shx_header = header_bytes(self.shape_type, shx_len, &self.bounds);
        self.shx.seek(SeekFrom::Start(0))?;
        self.shx.write_all(&shx_header)?;
        Ok(())
    }

    pub fn sync(&mut self) -> Result<()> {
        if self.header_dirty {
            self.write_header()?;
        }
        self.shp.flush()?;
        self.shx.flush()?;
        Ok(())
    }
}

fn corrupt(path: &Path, msg: &str) -> OgrError {
    OgrError::CorruptFile {
        path: path.display().to_string(),
        msg: msg.to_string(),
    }
}

/// Record offsets and sizes from a `.shx`.
fn read_index(path: &Path, mut shx: &File, shp_size: u64) -> Result<(Vec<u64>, Vec<u64>)> {
    let mut buf = Vec::new();
    shx.read_to_end(&mut buf)?;
    if buf.len() < HEADER_SIZE || be_i32_at(&buf, 0) != FILE_CODE {
        return Err(corrupt(path, "bad index file header"));
    }
    let entries = &buf[HEADER_SIZE..];
    let count = entries.len() / SHX_ENTRY_SIZE;
    let mut offsets = Vec::with_capacity(count);
    let mut sizes = Vec::with_capacity(count);
    for (index, entry) in entries.chunks_exact(SHX_ENTRY_SIZE).enumerate() {
        let offset = u64::from(be_i32_at(entry, 0) as u32) * 2;
        let size = u64::from(be_i32_at(entry, 4) as u32) * 2;
        if offset < HEADER_SIZE as u64 || offset > shp_size {
            return Err(corrupt(
                path,
                &format!("record {index} has an invalid offset {offset}"),
            ));
        }
        offsets.push(offset);
        sizes.push(size);
    }
    Ok((offsets, sizes))
}

/// Record offsets and sizes recovered by walking the `.shp` records.
fn scan_records(path: &Path, shp: &mut File, file_size: u64) -> Result<(Vec<u64>, Vec<u64>)> {
    let mut offsets = Vec::new();
    let mut sizes = Vec::new();
    let mut offset = HEADER_SIZE as u64;
    let mut record_header = [0u8; RECORD_HEADER_SIZE];
    while offset + RECORD_HEADER_SIZE as u64 <= file_size {
        shp.seek(SeekFrom::Start(offset))?;
        shp.read_exact(&mut record_header)?;
        let size = u64::from(be_i32_at(&record_header, 4) as u32) * 2;
        if offset + RECORD_HEADER_SIZE as u64 + size > file_size {
            return Err(corrupt(
                path,
                &format!("record at offset {offset} extends past the end of the file"),
            ));
        }
        offsets.push(offset);
        sizes.push(size);
        offset += RECORD_HEADER_SIZE as u64 + size;
    }
    Ok((offsets, sizes))
}
