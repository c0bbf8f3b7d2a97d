use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::utils::{atoi, binary_to_hex, format_g, strtod};
use crate::vector::OGRFieldType;

/// Time zone flag of a [`FieldDateTime`]: unknown.
pub const TZ_UNKNOWN: u8 = 0;
/// Time zone flag of a [`FieldDateTime`]: local time.
pub const TZ_LOCALTIME: u8 = 1;
/// Time zone flag of a [`FieldDateTime`]: UTC. Other values are offsets from
/// UTC in quarter hours, added to 100.
pub const TZ_UTC: u8 = 100;

/// Broken-down date and time, as stored by Date, Time and DateTime fields.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldDateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: f32,
    pub tz_flag: u8,
}

impl FieldDateTime {
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: f32,
        tz_flag: u8,
    ) -> FieldDateTime {
        FieldDateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            tz_flag,
        }
    }

    pub fn date(year: i32, month: u8, day: u8) -> FieldDateTime {
        FieldDateTime::new(year, month, day, 0, 0, 0.0, TZ_UNKNOWN)
    }

    /// Current UTC time, to the second.
    pub fn now_utc() -> FieldDateTime {
        let now = Utc::now();
        FieldDateTime::new(
            now.year(),
            now.month() as u8,
            now.day() as u8,
            now.hour() as u8,
            now.minute() as u8,
            now.second() as f32,
            TZ_UTC,
        )
    }

    /// Offset from UTC in minutes, `None` for unknown or local time.
    pub fn utc_offset_minutes(&self) -> Option<i32> {
        if self.tz_flag > TZ_LOCALTIME {
            Some((i32::from(self.tz_flag) - 100) * 15)
        } else {
            None
        }
    }

    fn milliseconds(&self) -> i32 {
        ((self.second - self.second.floor()) * 1000.0 + 0.5) as i32 % 1000
    }

    /// Equality of the calendar and clock fields, sub-second fraction excluded.
    pub fn same_instant_fields(&self, other: &FieldDateTime) -> bool {
        self.year == other.year
            && self.month == other.month
            && self.day == other.day
            && self.hour == other.hour
            && self.minute == other.minute
            && (self.second as i32) == (other.second as i32)
            && self.tz_flag == other.tz_flag
    }

    /// `YYYY/MM/DD`
    pub fn format_date(&self) -> String {
        format!("{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }

    /// `HH:MM:SS`, or `HH:MM:SS.sss` when there is a sub-second fraction.
    pub fn format_time(&self) -> String {
        if self.milliseconds() != 0 || self.second.is_nan() {
            format!("{:02}:{:02}:{:06.3}", self.hour, self.minute, self.second)
        } else {
            format!(
                "{:02}:{:02}:{:02}",
                self.hour, self.minute, self.second as i32
            )
        }
    }

    /// `YYYY/MM/DD HH:MM:SS[.sss][+HH[MM]]`
    pub fn format_date_time(&self) -> String {
        let mut out = if self.milliseconds() != 0 {
            format!(
                "{} {:02}:{:02}:{:06.3}",
                self.format_date(),
                self.hour,
                self.minute,
                self.second
            )
        } else {
            let second = if self.second.is_nan() || self.second < 0.0 || self.second > 62.0 {
                0
            } else {
                self.second as i32
            };
            format!(
                "{} {:02}:{:02}:{:02}",
                self.format_date(),
                self.hour,
                self.minute,
                second
            )
        };
        if let Some(offset) = self.utc_offset_minutes() {
            let sign = if offset < 0 { '-' } else { '+' };
            let hours = (offset / 60).abs();
            let minutes = (offset % 60).abs();
            if minutes == 0 {
                out.push_str(&format!("{sign}{hours:02}"));
            } else {
                out.push_str(&format!("{sign}{hours:02}{minutes:02}"));
            }
        }
        out
    }

    /// Parse a date, a time, or both.
    ///
    /// Accepted forms are `YYYY/MM/DD`, `YYYY-MM-DD`, optionally followed by
    /// `T` or blanks and `HH:MM[:SS[.sss]]`, optionally followed by `Z` or a
    /// `+HH`, `+HH:MM` or `+HHMM` offset. A time alone is accepted too.
    pub fn parse(input: &str) -> Option<FieldDateTime> {
        DateParser {
            s: input.as_bytes(),
            pos: 0,
        }
        .parse()
    }
}

struct DateParser<'a> {
    s: &'a [u8],
    pos: usize,
}

impl DateParser<'_> {
    fn at(&self, offset: usize) -> u8 {
        self.s.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn skip_blanks(&mut self) {
        while self.at(0) == b' ' {
            self.pos += 1;
        }
    }

    fn two_digits(&mut self) -> Option<u8> {
        let (a, b) = (self.at(0), self.at(1));
        if a.is_ascii_digit() && b.is_ascii_digit() {
            self.pos += 2;
            Some((a - b'0') * 10 + (b - b'0'))
        } else {
            None
        }
    }

    fn rest(&self) -> &str {
        std::str::from_utf8(&self.s[self.pos.min(self.s.len())..]).unwrap_or("")
    }

    fn parse(mut self) -> Option<FieldDateTime> {
        let mut field = FieldDateTime::default();
        self.skip_blanks();
        let mut got_something = false;
        let mut t_found = false;

        if self.s[self.pos..].iter().any(|&c| c == b'-' || c == b'/') {
            let first = self.at(0);
            if !(first == b'-' || first == b'+' || first.is_ascii_digit()) {
                return None;
            }
            let year = atoi(self.rest());
            if year > i32::from(i16::MAX) || year < i32::from(i16::MIN) {
                return None;
            }
            field.year = year;
            if matches!(self.at(1), b'-' | b'/') || matches!(self.at(2), b'-' | b'/') {
                if (30..100).contains(&field.year) {
                    field.year += 1900;
                } else if (0..30).contains(&field.year) {
                    field.year += 2000;
                }
            }
            if matches!(self.at(0), b'-' | b'+') {
                self.pos += 1;
            }
            while self.at(0).is_ascii_digit() {
                self.pos += 1;
            }
            if !matches!(self.at(0), b'-' | b'/') {
                return None;
            }
            self.pos += 1;
            let month = self.two_digits()?;
            if month == 0 || month > 12 {
                return None;
            }
            field.month = month;
            if !matches!(self.at(0), b'-' | b'/') {
                return None;
            }
            self.pos += 1;
            let day = self.two_digits()?;
            if day == 0 || day > 31 {
                return None;
            }
            field.day = day;
            match self.at(0) {
                0 => return Some(field),
                b'T' => {
                    t_found = true;
                    self.pos += 1;
                }
                b'Z' => {
                    field.tz_flag = TZ_UTC;
                    return Some(field);
                }
                b' ' => {}
                _ => return None,
            }
            got_something = true;
        }

        self.skip_blanks();
        if self.at(0) == b'T' {
            t_found = true;
            self.pos += 1;
        }

        if t_found || self.s[self.pos..].contains(&b':') {
            if !t_found && self.at(2) != b':' {
                return None;
            }
            let hour = self.two_digits()?;
            if hour > 23 {
                return None;
            }
            field.hour = hour;
            if self.at(0) == b':' {
                self.pos += 1;
            }
            let minute = self.two_digits()?;
            if minute > 59 {
                return None;
            }
            field.minute = minute;

            if (t_found && self.at(0).is_ascii_digit()) || self.at(0) == b':' {
                if self.at(0) == b':' {
                    self.pos += 1;
                }
                if !(self.at(0).is_ascii_digit() && self.at(1).is_ascii_digit()) {
                    return None;
                }
                let (seconds, consumed) = strtod(self.rest());
                // 60 is a leap second
                if seconds > 60.0 {
                    return None;
                }
                field.second = seconds as f32;
                self.pos += consumed;
                if self.at(0) == b'Z' {
                    field.tz_flag = TZ_UTC;
                    self.pos += 1;
                }
            }
            got_something = true;
        } else if got_something && self.at(0) != 0 {
            return None;
        }

        if !got_something {
            return None;
        }

        self.skip_blanks();
        let sign = self.at(0);
        if sign == b'-' || sign == b'+' {
            let negative = sign == b'-';
            let digits = &self.s[self.pos + 1..];
            // Offset components have at most two digits.
            let number = |bytes: &[u8]| -> i32 {
                bytes
                    .iter()
                    .take(2)
                    .take_while(|b| b.is_ascii_digit())
                    .fold(0, |acc, b| acc * 10 + i32::from(b - b'0'))
            };
            let all_digits = |bytes: &[u8]| bytes.iter().all(u8::is_ascii_digit);
            let (hours, minutes) = if digits.len() <= 2 {
                (number(digits), 0)
            } else if digits[2] == b':' {
                (number(&digits[..2]), number(&digits[3..]))
            } else if digits.len() >= 4 && all_digits(&digits[..4]) {
                (number(&digits[..2]), number(&digits[2..4]))
            } else if digits.len() == 3 && all_digits(digits) {
                (number(&digits[..1]), number(&digits[1..]))
            } else {
                return Some(field);
            };
            if minutes < 60 && minutes % 15 == 0 {
                let quarters = hours * 4 + minutes / 15;
                let quarters = if negative { -quarters } else { quarters };
                field.tz_flag = (100 + quarters).clamp(0, 255) as u8;
            }
        }
        Some(field)
    }
}

impl From<NaiveDate> for FieldDateTime {
    fn from(date: NaiveDate) -> Self {
        FieldDateTime::date(date.year(), date.month() as u8, date.day() as u8)
    }
}

impl From<NaiveTime> for FieldDateTime {
    fn from(time: NaiveTime) -> Self {
        let second = time.second() as f32 + time.nanosecond() as f32 / 1e9;
        FieldDateTime::new(
            0,
            0,
            0,
            time.hour() as u8,
            time.minute() as u8,
            second,
            TZ_UNKNOWN,
        )
    }
}

impl From<DateTime<FixedOffset>> for FieldDateTime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        let offset_quarters = dt.offset().local_minus_utc() / 900;
        let second = dt.second() as f32 + dt.nanosecond() as f32 / 1e9;
        FieldDateTime::new(
            dt.year(),
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            second,
            (100 + offset_quarters) as u8,
        )
    }
}

/// Value of one attribute field.
///
/// The variant always matches the declared [`OGRFieldType`] of the field it
/// was read from.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    IntegerValue(i32),
    IntegerListValue(Vec<i32>),
    Integer64Value(i64),
    Integer64ListValue(Vec<i64>),
    StringValue(String),
    StringListValue(Vec<String>),
    RealValue(f64),
    RealListValue(Vec<f64>),
    BinaryValue(Vec<u8>),
    DateValue(FieldDateTime),
    TimeValue(FieldDateTime),
    DateTimeValue(FieldDateTime),
}

impl FieldValue {
    /// Interpret the value as `String`.
    pub fn into_string(self) -> Option<String> {
        match self {
            FieldValue::StringValue(rv) => Some(rv),
            _ => None,
        }
    }

    /// Interpret the value as `f64`.
    pub fn into_real(self) -> Option<f64> {
        match self {
            FieldValue::RealValue(rv) => Some(rv),
            _ => None,
        }
    }

    /// Interpret the value as `i32`.
    pub fn into_int(self) -> Option<i32> {
        match self {
            FieldValue::IntegerValue(rv) => Some(rv),
            _ => None,
        }
    }

    /// Interpret the value as `i64`. Integer values are widened.
    pub fn into_int64(self) -> Option<i64> {
        match self {
            FieldValue::IntegerValue(rv) => Some(i64::from(rv)),
            FieldValue::Integer64Value(rv) => Some(rv),
            _ => None,
        }
    }

    pub fn into_int_list(self) -> Option<Vec<i32>> {
        match self {
            FieldValue::IntegerListValue(rv) => Some(rv),
            _ => None,
        }
    }

    pub fn into_int64_list(self) -> Option<Vec<i64>> {
        match self {
            FieldValue::Integer64ListValue(rv) => Some(rv),
            _ => None,
        }
    }

    pub fn into_real_list(self) -> Option<Vec<f64>> {
        match self {
            FieldValue::RealListValue(rv) => Some(rv),
            _ => None,
        }
    }

    pub fn into_string_list(self) -> Option<Vec<String>> {
        match self {
            FieldValue::StringListValue(rv) => Some(rv),
            _ => None,
        }
    }

    pub fn into_binary(self) -> Option<Vec<u8>> {
        match self {
            FieldValue::BinaryValue(rv) => Some(rv),
            _ => None,
        }
    }

    /// Interpret the value as a `NaiveDate`.
    pub fn into_date(self) -> Option<NaiveDate> {
        match self {
            FieldValue::DateValue(rv) | FieldValue::DateTimeValue(rv) => {
                NaiveDate::from_ymd_opt(rv.year, u32::from(rv.month), u32::from(rv.day))
            }
            _ => None,
        }
    }

    /// Interpret the value as a `NaiveTime`.
    pub fn into_time(self) -> Option<NaiveTime> {
        match self {
            FieldValue::TimeValue(rv) | FieldValue::DateTimeValue(rv) => {
                let whole = rv.second.trunc();
                let nanos = ((rv.second - whole) * 1e9) as u32;
                NaiveTime::from_hms_nano_opt(
                    u32::from(rv.hour),
                    u32::from(rv.minute),
                    whole as u32,
                    nanos,
                )
            }
            _ => None,
        }
    }

    /// Interpret the value as a `DateTime`. Values without a known offset are
    /// taken as UTC.
    pub fn into_datetime(self) -> Option<DateTime<FixedOffset>> {
        match self {
            FieldValue::DateTimeValue(rv) => {
                let offset = FixedOffset::east_opt(rv.utc_offset_minutes().unwrap_or(0) * 60)?;
                let date = FieldValue::DateValue(rv).into_date()?;
                let time = FieldValue::TimeValue(rv).into_time()?;
                offset.from_local_datetime(&date.and_time(time)).single()
            }
            _ => None,
        }
    }

    /// The field type this value belongs to.
    pub fn ogr_field_type(&self) -> OGRFieldType {
        match self {
            FieldValue::IntegerValue(_) => OGRFieldType::OFTInteger,
            FieldValue::IntegerListValue(_) => OGRFieldType::OFTIntegerList,
            FieldValue::Integer64Value(_) => OGRFieldType::OFTInteger64,
            FieldValue::Integer64ListValue(_) => OGRFieldType::OFTInteger64List,
            FieldValue::StringValue(_) => OGRFieldType::OFTString,
            FieldValue::StringListValue(_) => OGRFieldType::OFTStringList,
            FieldValue::RealValue(_) => OGRFieldType::OFTReal,
            FieldValue::RealListValue(_) => OGRFieldType::OFTRealList,
            FieldValue::BinaryValue(_) => OGRFieldType::OFTBinary,
            FieldValue::DateValue(_) => OGRFieldType::OFTDate,
            FieldValue::TimeValue(_) => OGRFieldType::OFTTime,
            FieldValue::DateTimeValue(_) => OGRFieldType::OFTDateTime,
        }
    }

    /// Type-specific equality: NaN equals NaN, date and time values ignore
    /// the sub-second fraction.
    pub(crate) fn same_as(&self, other: &FieldValue) -> bool {
        fn same_real(a: f64, b: f64) -> bool {
            (a.is_nan() && b.is_nan()) || a == b
        }
        use FieldValue::*;
        match (self, other) {
            (RealValue(a), RealValue(b)) => same_real(*a, *b),
            (RealListValue(a), RealListValue(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_real(*x, *y))
            }
            (DateValue(a), DateValue(b))
            | (TimeValue(a), TimeValue(b))
            | (DateTimeValue(a), DateTimeValue(b)) => a.same_instant_fields(b),
            _ => self == other,
        }
    }
}

/// Largest rendering of a list value, in bytes, before it is cut with `...`.
const LIST_BUFFER_SIZE: usize = 80;
/// Bytes of a binary value rendered before it is cut with `...`.
const MAX_BINARY_RENDERED: usize = 36;

/// Render list items as `(N:a,b,c)`, ending with `,...)` when the text would
/// not fit the list buffer.
pub(crate) fn format_list<I>(count: usize, items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut out = format!("({count}:");
    let mut written = 0;
    for item in items {
        if out.len() + item.len() + 6 >= LIST_BUFFER_SIZE {
            break;
        }
        if written > 0 {
            out.push(',');
        }
        out.push_str(&item);
        written += 1;
    }
    if written < count {
        out.push_str(",...)");
    } else {
        out.push(')');
    }
    out
}

/// Upper case hex rendering of a binary value, cut with `...` when long.
pub(crate) fn format_binary(data: &[u8]) -> String {
    if data.len() > MAX_BINARY_RENDERED {
        format!("{}...", binary_to_hex(&data[..MAX_BINARY_RENDERED]))
    } else {
        binary_to_hex(data)
    }
}

/// Shortest `%g` rendering that reads back as the same `f32`.
pub(crate) fn format_float32(value: f64) -> String {
    let target = value as f32;
    (1..=9)
        .map(|precision| format_g(f64::from(target), precision))
        .find(|text| text.parse::<f32>().ok() == Some(target))
        .unwrap_or_else(|| format_g(f64::from(target), 9))
}

/// Split the `(N:a,b,c)` list notation into its items, `None` when `text` is
/// not in that form or when `N` disagrees with the number of items.
pub(crate) fn parse_list_notation(text: &str) -> Option<Vec<String>> {
    if !text.starts_with('(') || !text.contains(':') {
        return None;
    }
    let tokens: Vec<String> = text
        .split(|c| matches!(c, ',' | ':' | '(' | ')'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    let (count, items) = tokens.split_first()?;
    if usize::try_from(atoi(count)).ok()? != items.len() {
        return None;
    }
    Some(items.to_vec())
}
