use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::Datelike;
use encoding_rs::Encoding;
use tracing::{debug, trace};

use crate::errors::{OgrError, Result};
use crate::utils::{atof, atoi, atoi64};
use crate::vector::shape::codepage::{encode_within, read_cpg, resolve_encoding};
use crate::vector::shape::shp::sibling;

/// Longest field name a DBF header stores.
pub(crate) const MAX_FIELD_NAME_LEN: usize = 10;
pub(crate) const MAX_FIELD_WIDTH: usize = 255;
const HEADER_PREFIX_SIZE: usize = 32;
const FIELD_DESCRIPTOR_SIZE: usize = 32;
const HEADER_TERMINATOR: u8 = 0x0d;
const END_OF_FILE: u8 = 0x1a;
const DELETED: u8 = b'*';
const NOT_DELETED: u8 = b' ';

/// Column description from a DBF header.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DbfField {
    pub name: String,
    /// Native type: `C`, `N`, `F`, `D` or `L`.
    pub kind: u8,
    pub width: usize,
    pub decimals: usize,
    /// Position of the value in a record, after the deletion marker.
    pub offset: usize,
}

impl DbfField {
    /// Byte a null value is filled with.
    fn null_filler(&self) -> u8 {
        match self.kind {
            b'N' | b'F' => b'*',
            b'D' => b'0',
            b'L' => b'?',
            _ => b' ',
        }
    }

    fn range(&self) -> std::ops::Range<usize> {
        1 + self.offset..1 + self.offset + self.width
    }

    fn is_numeric(&self) -> bool {
        matches!(self.kind, b'N' | b'F')
    }
}

/// One fixed width record, deletion marker included, with the encoding of
/// its text.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DbfRecord {
    bytes: Vec<u8>,
    encoding: &'static Encoding,
}

impl DbfRecord {
    pub fn blank(record_length: usize, encoding: &'static Encoding) -> DbfRecord {
        DbfRecord {
            bytes: vec![b' '; record_length],
            encoding,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.bytes.first() == Some(&DELETED)
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        if let Some(marker) = self.bytes.first_mut() {
            *marker = if deleted { DELETED } else { NOT_DELETED };
        }
    }

    /// The value text, cut at the first NUL and stripped of surrounding
    /// blanks.
    pub fn string(&self, field: &DbfField) -> String {
        let slot = self.bytes.get(field.range()).unwrap_or_default();
        let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
        let (text, _) = self.encoding.decode_without_bom_handling(&slot[..end]);
        text.trim_matches(' ').to_string()
    }

    pub fn integer(&self, field: &DbfField) -> i32 {
        atoi(&self.string(field))
    }

    /// The value as a 64 bit integer, saturated with a warning when out of
    /// range.
    pub fn integer64(&self, field: &DbfField) -> i64 {
        atoi64(&self.string(field), true)
    }

    pub fn double(&self, field: &DbfField) -> f64 {
        atof(&self.string(field))
    }

    /// `(year, month, day)` of a `YYYYMMDD` value.
    pub fn date(&self, field: &DbfField) -> Option<(i32, u8, u8)> {
        let text = self.string(field);
        if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = text[0..4].parse().ok()?;
        let month = text[4..6].parse().ok()?;
        let day = text[6..8].parse().ok()?;
        Some((year, month, day))
    }

    /// Whether the value is the null filler of its type. Blank values are
    /// null for every type.
    pub fn is_null(&self, field: &DbfField) -> bool {
        let text = self.string(field);
        match field.kind {
            b'N' | b'F' => text.is_empty() || text.starts_with('*'),
            b'D' => text.is_empty() || text.starts_with("00000000"),
            b'L' => text.is_empty() || text.starts_with('?'),
            _ => text.is_empty(),
        }
    }

    pub fn write_null(&mut self, field: &DbfField) {
        let filler = field.null_filler();
        if let Some(slot) = self.bytes.get_mut(field.range()) {
            slot.fill(filler);
        }
    }

    /// Store `value` left aligned, in the record's encoding. Returns false
    /// when it had to be cut to the field width; the cut never splits a
    /// character.
    pub fn write_string(&mut self, field: &DbfField, value: &str) -> bool {
        let (bytes, whole) = encode_within(self.encoding, value, field.width);
        self.put(field, &bytes, false);
        whole
    }

    /// Store `value` right aligned with the field's decimal count. Returns
    /// false when the text does not fit the width and was cut.
    pub fn write_double(&mut self, field: &DbfField, value: f64) -> bool {
        let text = format!(
            "{:>width$.prec$}",
            value,
            width = field.width,
            prec = field.decimals
        );
        self.put_number(field, &text)
    }

    pub fn write_integer(&mut self, field: &DbfField, value: i64) -> bool {
        if field.decimals > 0 {
            return self.write_double(field, value as f64);
        }
        let text = format!("{:>width$}", value, width = field.width);
        self.put_number(field, &text)
    }

    pub fn write_date(&mut self, field: &DbfField, year: i32, month: u8, day: u8) -> bool {
        let text = format!("{year:04}{month:02}{day:02}");
        self.write_string(field, &text)
    }

    fn put_number(&mut self, field: &DbfField, text: &str) -> bool {
        let fits = text.len() <= field.width;
        let bytes = &text.as_bytes()[..text.len().min(field.width)];
        self.put(field, bytes, true);
        fits
    }

    /// The bytes of the `old` value laid out for the `new` column.
    ///
    /// Null values become the null filler of the new type. A narrower
    /// column keeps the rightmost bytes of a right aligned number or date
    /// and the leftmost bytes of anything else. A wider numeric column
    /// keeps its values right aligned.
    fn resized_value(&self, old: &DbfField, new: &DbfField) -> Vec<u8> {
        if self.is_null(old) {
            return vec![new.null_filler(); new.width];
        }
        let value = &self.bytes[old.range()];
        if new.width <= old.width {
            let right_aligned = (old.is_numeric() || old.kind == b'D') && value[0] == b' ';
            if right_aligned {
                value[old.width - new.width..].to_vec()
            } else {
                value[..new.width].to_vec()
            }
        } else {
            let padding = vec![b' '; new.width - old.width];
            if old.is_numeric() {
                [padding.as_slice(), value].concat()
            } else {
                [value, padding.as_slice()].concat()
            }
        }
    }

    fn put(&mut self, field: &DbfField, value: &[u8], right_aligned: bool) {
        let Some(slot) = self.bytes.get_mut(field.range()) else {
            return;
        };
        slot.fill(b' ');
        let start = if right_aligned {
            slot.len() - value.len()
        } else {
            0
        };
        slot[start..start + value.len()].copy_from_slice(value);
    }
}

/// A `.dbf` attribute table.
pub(crate) struct DbfFile {
    path: PathBuf,
    file: File,
    fields: Vec<DbfField>,
    record_count: usize,
    header_length: usize,
    record_length: usize,
    header_dirty: bool,
    /// Header byte 29.
    language_driver: u8,
    encoding: &'static Encoding,
}

impl DbfFile {
    /// Create an empty table with no field and no code page, overwriting
    /// an existing file.
    pub fn create(path: &Path) -> Result<DbfFile> {
        DbfFile::create_with_code_page(path, None)
    }

    /// Create an empty table with no field, overwriting an existing file.
    ///
    /// A `LDID/<n>` code page is stored in the header as language driver
    /// `n`. Any other one is written to a `.cpg` file next to the table.
    pub fn create_with_code_page(path: &Path, code_page: Option<&str>) -> Result<DbfFile> {
        let cpg_path = sibling(path, "cpg");
        let language_driver = code_page
            .and_then(|cp| cp.strip_prefix("LDID/"))
            .and_then(|n| u8::try_from(atoi(n)).ok());
        match code_page {
            Some(cp) if language_driver.is_none() => fs::write(&cpg_path, cp)?,
            _ => match fs::remove_file(&cpg_path) {
                Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
                _ => {}
            },
        }
        let encoding = resolve_encoding(code_page)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut dbf = DbfFile {
            path: path.to_path_buf(),
            file,
            fields: Vec::new(),
            record_count: 0,
            header_length: HEADER_PREFIX_SIZE + 1,
            record_length: 1,
            header_dirty: true,
            language_driver: language_driver.unwrap_or(0),
            encoding,
        };
        dbf.sync()?;
        debug!(
            path = %path.display(),
            encoding = encoding.name(),
            "created attribute table"
        );
        Ok(dbf)
    }

    pub fn open(path: &Path, update: bool) -> Result<DbfFile> {
        let mut file = OpenOptions::new().read(true).write(update).open(path)?;
        let mut prefix = [0u8; HEADER_PREFIX_SIZE];
        file.read_exact(&mut prefix)
            .map_err(|_| corrupt(path, "header is truncated"))?;
        let record_count =
            u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]) as usize;
        let header_length = usize::from(u16::from_le_bytes([prefix[8], prefix[9]]));
        let record_length = usize::from(u16::from_le_bytes([prefix[10], prefix[11]]));
        if header_length < HEADER_PREFIX_SIZE || record_length == 0 {
            return Err(corrupt(path, "invalid header or record length"));
        }
        let language_driver = prefix[29];
        let code_page = read_cpg(&sibling(path, "cpg"))?
            .or_else(|| (language_driver != 0).then(|| format!("LDID/{language_driver}")));
        let encoding = resolve_encoding(code_page.as_deref())?;

        let mut descriptors = vec![0u8; header_length - HEADER_PREFIX_SIZE];
        file.read_exact(&mut descriptors)
            .map_err(|_| corrupt(path, "field descriptors are truncated"))?;
        let mut fields = Vec::new();
        let mut offset = 0;
        for descriptor in descriptors.chunks_exact(FIELD_DESCRIPTOR_SIZE) {
            if descriptor[0] == HEADER_TERMINATOR || descriptor[0] == 0 {
                break;
            }
            let name_end = descriptor[..11].iter().position(|&b| b == 0).unwrap_or(11);
            let (name, _) = encoding.decode_without_bom_handling(&descriptor[..name_end]);
            let name = name.trim().to_string();
            let kind = descriptor[11];
            let (width, decimals) = if kind == b'C' {
                (
                    usize::from(descriptor[16]) + 256 * usize::from(descriptor[17]),
                    0,
                )
            } else {
                (usize::from(descriptor[16]), usize::from(descriptor[17]))
            };
            fields.push(DbfField {
                name,
                kind,
                width,
                decimals,
                offset,
            });
            offset += width;
        }
        if offset + 1 > record_length {
            return Err(corrupt(
                path,
                &format!("fields need {} bytes, records have {record_length}", offset + 1),
            ));
        }

        debug!(
            path = %path.display(),
            fields = fields.len(),
            records = record_count,
            code_page = code_page.as_deref().unwrap_or_default(),
            "opened attribute table"
        );
        Ok(DbfFile {
            path: path.to_path_buf(),
            file,
            fields,
            record_count,
            header_length,
            record_length,
            header_dirty: false,
            language_driver,
            encoding,
        })
    }

    /// Encoding text values and field names are stored in.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn fields(&self) -> &[DbfField] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&DbfField> {
        self.fields.get(index)
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Index of the field named `name`, compared case-insensitively.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn blank_record(&self) -> DbfRecord {
        DbfRecord::blank(self.record_length, self.encoding)
    }

    fn record_offset(&self, index: usize) -> u64 {
        (self.header_length + index * self.record_length) as u64
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.record_count {
            Ok(())
        } else {
            Err(OgrError::BadArgument(format!(
                "record {index} out of range, {} records",
                self.record_count
            )))
        }
    }

    pub fn read_record(&mut self, index: usize) -> Result<DbfRecord> {
        self.check_index(index)?;
        let mut bytes = vec![0u8; self.record_length];
        self.file.seek(SeekFrom::Start(self.record_offset(index)))?;
        self.file
            .read_exact(&mut bytes)
            .map_err(|_| corrupt(&self.path, &format!("record {index} is truncated")))?;
        trace!(index, "read attribute record");
        Ok(DbfRecord {
            bytes,
            encoding: self.encoding,
        })
    }

    /// Write record `index`; `index == record_count()` appends.
    pub fn write_record(&mut self, index: usize, record: &DbfRecord) -> Result<()> {
        if index > self.record_count {
            return Err(OgrError::BadArgument(format!(
                "record {index} out of range, {} records",
                self.record_count
            )));
        }
        self.file.seek(SeekFrom::Start(self.record_offset(index)))?;
        self.file.write_all(&record.bytes)?;
        if index == self.record_count {
            self.file.write_all(&[END_OF_FILE])?;
            self.record_count += 1;
            self.header_dirty = true;
        }
        Ok(())
    }

    pub fn is_deleted(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let mut marker = [0u8; 1];
        self.file.seek(SeekFrom::Start(self.record_offset(index)))?;
        self.file.read_exact(&mut marker)?;
        Ok(marker[0] == DELETED)
    }

    pub fn set_deleted(&mut self, index: usize, deleted: bool) -> Result<()> {
        self.check_index(index)?;
        self.file.seek(SeekFrom::Start(self.record_offset(index)))?;
        self.file
            .write_all(&[if deleted { DELETED } else { NOT_DELETED }])?;
        Ok(())
    }

    /// Append a field. Only possible while the table has no record.
    pub fn add_field(
        &mut self,
        name: &str,
        kind: u8,
        width: usize,
        decimals: usize,
    ) -> Result<usize> {
        if self.record_count > 0 {
            return Err(OgrError::BadArgument(format!(
                "cannot add field {name} to a table holding records"
            )));
        }
        if width < 1 {
            return Err(OgrError::BadArgument(format!(
                "field {name} has width {width}"
            )));
        }
        let width = width.min(MAX_FIELD_WIDTH);
        if self.record_length + width > usize::from(u16::MAX)
            || self.header_length + FIELD_DESCRIPTOR_SIZE > usize::from(u16::MAX)
        {
            return Err(OgrError::BadArgument(format!(
                "cannot add field {name}, DBF record or header length limit reached"
            )));
        }
        let mut fields = self.fields.clone();
        fields.push(DbfField {
            name: name.to_string(),
            kind,
            width,
            decimals,
            offset: 0,
        });
        self.rewrite(fields, Vec::new())?;
        Ok(self.fields.len() - 1)
    }

    /// Remove field `index` from the header and every record.
    pub fn delete_field(&mut self, index: usize) -> Result<()> {
        if index >= self.fields.len() {
            return Err(OgrError::InvalidFieldIndex {
                index,
                method_name: "delete_field",
            });
        }
        let new_order: Vec<usize> = (0..self.fields.len()).filter(|&i| i != index).collect();
        self.relayout(&new_order)
    }

    /// Field `i` of the result is the current field `new_order[i]`.
    /// `new_order` must be a permutation.
    pub fn reorder_fields(&mut self, new_order: &[usize]) -> Result<()> {
        self.relayout(new_order)
    }

    /// Keep the fields listed in `columns`, in that order.
    fn relayout(&mut self, columns: &[usize]) -> Result<()> {
        let old_fields = self.fields.clone();
        let mut fields = Vec::with_capacity(columns.len());
        for &c in columns {
            let field = old_fields.get(c).ok_or(OgrError::InvalidFieldIndex {
                index: c,
                method_name: "reorder_fields",
            })?;
            fields.push(field.clone());
        }
        let record_length = 1 + fields.iter().map(|f| f.width).sum::<usize>();

        let mut records = Vec::with_capacity(self.record_count);
        for index in 0..self.record_count {
            let old = self.read_record(index)?;
            let mut bytes = Vec::with_capacity(record_length);
            bytes.push(old.bytes[0]);
            for field in &fields {
                bytes.extend_from_slice(&old.bytes[field.range()]);
            }
            records.push(DbfRecord {
                bytes,
                encoding: self.encoding,
            });
        }
        self.rewrite(fields, records)
    }

    /// Change the name, type, width and decimal count of field `index`,
    /// laying out the values of every record for the new column.
    pub fn alter_field(
        &mut self,
        index: usize,
        name: &str,
        kind: u8,
        width: usize,
        decimals: usize,
    ) -> Result<()> {
        let old = self
            .fields
            .get(index)
            .cloned()
            .ok_or(OgrError::InvalidFieldIndex {
                index,
                method_name: "alter_field",
            })?;
        if width < 1 {
            return Err(OgrError::BadArgument(format!(
                "field {name} has width {width}"
            )));
        }
        let width = width.min(MAX_FIELD_WIDTH);
        if self.record_length - old.width + width > usize::from(u16::MAX) {
            return Err(OgrError::BadArgument(format!(
                "cannot widen field {name}, DBF record length limit reached"
            )));
        }
        let new = DbfField {
            name: name.to_string(),
            kind,
            width,
            decimals,
            offset: old.offset,
        };

        let mut records = Vec::with_capacity(self.record_count);
        for i in 0..self.record_count {
            let record = self.read_record(i)?;
            let mut bytes = Vec::with_capacity(self.record_length - old.width + width);
            bytes.extend_from_slice(&record.bytes[..1 + old.offset]);
            bytes.extend(record.resized_value(&old, &new));
            bytes.extend_from_slice(&record.bytes[old.range().end..]);
            records.push(DbfRecord {
                bytes,
                encoding: self.encoding,
            });
        }
        let mut fields = self.fields.clone();
        fields[index] = new;
        self.rewrite(fields, records)?;
        debug!(path = %self.path.display(), field = name, width, "altered field");
        Ok(())
    }

    /// Keep only the records listed in `keep`, in that order.
    pub fn repack(&mut self, keep: &[usize]) -> Result<()> {
        let mut records = Vec::with_capacity(keep.len());
        for &index in keep {
            records.push(self.read_record(index)?);
        }
        let fields = self.fields.clone();
        self.rewrite(fields, records)?;
        debug!(path = %self.path.display(), records = keep.len(), "repacked attribute table");
        Ok(())
    }

    /// Replace the whole file content.
    fn rewrite(&mut self, mut fields: Vec<DbfField>, records: Vec<DbfRecord>) -> Result<()> {
        let mut offset = 0;
        for field in &mut fields {
            field.offset = offset;
            offset += field.width;
        }
        self.fields = fields;
        self.record_length = 1 + offset;
        self.header_length = HEADER_PREFIX_SIZE + FIELD_DESCRIPTOR_SIZE * self.fields.len() + 1;
        self.record_count = records.len();

        self.file.set_len(0)?;
        let mut buf = self.header_bytes();
        for record in &records {
            buf.extend_from_slice(&record.bytes);
        }
        buf.push(END_OF_FILE);
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&buf)?;
        self.header_dirty = false;
        Ok(())
    }

    fn header_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.header_length];
        let today = chrono::Utc::now().date_naive();
        buf[0] = 0x03;
        buf[1] = u8::try_from(today.year() - 1900).unwrap_or(u8::MAX);
        buf[2] = today.month() as u8;
        buf[3] = today.day() as u8;
        buf[4..8].copy_from_slice(&u32::try_from(self.record_count).unwrap_or(u32::MAX).to_le_bytes());
        buf[8..10].copy_from_slice(&(self.header_length as u16).to_le_bytes());
        buf[10..12].copy_from_slice(&(self.record_length as u16).to_le_bytes());
        buf[29] = self.language_driver;

        for (i, field) in self.fields.iter().enumerate() {
            let descriptor = &mut buf[HEADER_PREFIX_SIZE + FIELD_DESCRIPTOR_SIZE * i..][..FIELD_DESCRIPTOR_SIZE];
            let (name, _) = encode_within(self.encoding, &field.name, MAX_FIELD_NAME_LEN);
            descriptor[..name.len()].copy_from_slice(&name);
            descriptor[11] = field.kind;
            if field.kind == b'C' {
                descriptor[16] = (field.width % 256) as u8;
                descriptor[17] = (field.width / 256) as u8;
            } else {
                descriptor[16] = field.width as u8;
                descriptor[17] = field.decimals as u8;
            }
        }
        buf[HEADER_PREFIX_SIZE + FIELD_DESCRIPTOR_SIZE * self.fields.len()] = HEADER_TERMINATOR;
        buf
    }

    /// Write the header if records were added, then flush.
    pub fn sync(&mut self) -> Result<()> {
        if self.header_dirty {
            let header = self.header_bytes();
            self.file.seek(SeekFrom::Start(0))?;
            self.file.write_all(&header)?;
            if self.record_count == 0 {
                self.file.write_all(&[END_OF_FILE])?;
            }
            self.header_dirty = false;
        }
        self.file.flush()?;
        Ok(())
    }
}

fn corrupt(path: &Path, msg: &str) -> OgrError {
    OgrError::CorruptFile {
        path: path.display().to_string(),
        msg: msg.to_string(),
    }
}
