//! Character encoding of attribute tables.
//!
//! A table names its code page in a `.cpg` file next to the `.dbf`, or in
//! the language driver byte of the DBF header. Text is decoded from and
//! encoded to that code page, unless the `SHAPE_ENCODING` configuration
//! option names another one. Setting `SHAPE_ENCODING` to an empty value
//! turns recoding off.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use encoding_rs::Encoding;
use tracing::debug;

use crate::config::find_config_option;
use crate::errors::Result;

/// Code page of a table whose header carries language driver `ldid`.
pub(crate) fn language_driver_code_page(ldid: u8) -> Option<String> {
    let cp = match ldid {
        1 | 11 | 13 | 15 | 17 | 21 | 24 | 25 | 27 => 437,
        2 | 10 | 14 | 16 | 18 | 20 | 22 | 26 | 29 | 37 | 55 => 850,
        3 | 88 | 89 => 1252,
        4 => 10000,
        8 | 23 | 102 => 865,
        19 | 123 => 932,
        28 | 108 => 863,
        31 | 34 | 35 | 64 | 100 | 135 => 852,
        36 => 860,
        38 | 101 => 866,
        77 | 122 => 936,
        78 | 121 => 949,
        79 | 120 => 950,
        80 | 124 => 874,
        87 => return Some("ISO-8859-1".to_string()),
        103 => 861,
        104 => 895,
        105 => 620,
        106 | 134 => 737,
        107 | 136 => 857,
        150 => 10007,
        151 => 10029,
        200 => 1250,
        201 => 1251,
        202 => 1254,
        203 => 1253,
        204 => 1257,
        _ => return None,
    };
    Some(format!("CP{cp}"))
}

/// Encoding name for the content of a `.cpg` file.
///
/// Bare Windows and DOS code page numbers become `CP<n>`, `8859-<n>`
/// becomes `ISO-8859-<n>`. Other values, such as `Big5`, are kept as
/// they are.
pub(crate) fn cpg_encoding_name(cpg: &str) -> String {
    let cpg = cpg.trim();
    let upper = cpg.to_ascii_uppercase();
    let number = crate::utils::atoi(cpg);
    if (437..=950).contains(&number) || (1250..=1258).contains(&number) {
        format!("CP{number}")
    } else if let Some(part) = upper.strip_prefix("8859") {
        format!("ISO-8859-{}", part.strip_prefix('-').unwrap_or(part))
    } else if upper.starts_with("UTF-8") || upper.starts_with("UTF8") {
        "UTF-8".to_string()
    } else if upper.starts_with("ANSI 1251") {
        "CP1251".to_string()
    } else {
        cpg.to_string()
    }
}

/// Encoding name for a code page as stored with a table: `LDID/<n>`, or
/// the first line of its `.cpg`.
pub(crate) fn code_page_encoding_name(code_page: &str) -> Option<String> {
    match code_page.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("LDID/") => {
            u8::try_from(crate::utils::atoi(&code_page[5..]))
                .ok()
                .and_then(language_driver_code_page)
        }
        _ => Some(cpg_encoding_name(code_page)),
    }
}

/// The codec for an encoding name, `None` when it cannot be recoded.
pub(crate) fn lookup_encoding(name: &str) -> Option<&'static Encoding> {
    let upper = name.trim().to_ascii_uppercase();
    if let Some(number) = upper.strip_prefix("CP") {
        let encoding = match number {
            "866" => encoding_rs::IBM866,
            "874" => encoding_rs::WINDOWS_874,
            "932" => encoding_rs::SHIFT_JIS,
            "936" => encoding_rs::GBK,
            "949" => encoding_rs::EUC_KR,
            "950" => encoding_rs::BIG5,
            "10000" => encoding_rs::MACINTOSH,
            "10007" => encoding_rs::X_MAC_CYRILLIC,
            _ => return Encoding::for_label(format!("windows-{number}").as_bytes()),
        };
        return Some(encoding);
    }
    Encoding::for_label(upper.as_bytes())
}

/// Encoding used to recode text of a table, from the `SHAPE_ENCODING`
/// configuration option or else from the table's code page.
///
/// Without a code page, or with one that has no codec, text is read as
/// UTF-8.
pub(crate) fn resolve_encoding(code_page: Option<&str>) -> Result<&'static Encoding> {
    let name = match find_config_option("SHAPE_ENCODING")? {
        Some(name) => name,
        None => match code_page.and_then(code_page_encoding_name) {
            Some(name) => name,
            None => return Ok(encoding_rs::UTF_8),
        },
    };
    if name.is_empty() {
        return Ok(encoding_rs::UTF_8);
    }
    debug!(encoding = %name, "treating attribute table as encoded");
    Ok(lookup_encoding(&name).unwrap_or_else(|| {
        debug!("Cannot recode from '{name}'. Disabling recoding");
        encoding_rs::UTF_8
    }))
}

/// First line of the `.cpg` file at `path`, `None` when there is no such
/// file or it is empty.
pub(crate) fn read_cpg(path: &Path) -> Result<Option<String>> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let end = content
        .iter()
        .position(|&b| b == b'\n' || b == b'\r')
        .unwrap_or(content.len());
    let line = String::from_utf8_lossy(&content[..end]).trim().to_string();
    Ok(Some(line).filter(|l| !l.is_empty()))
}

/// Encode `value`, cut to at most `limit` bytes without splitting a
/// character. The flag is false when the value was cut.
pub(crate) fn encode_within(
    encoding: &'static Encoding,
    value: &str,
    limit: usize,
) -> (Vec<u8>, bool) {
    let (encoded, _, _) = encoding.encode(value);
    if encoded.len() <= limit {
        return (encoded.into_owned(), true);
    }
    let mut out = Vec::with_capacity(limit);
    let mut buf = [0u8; 4];
    for ch in value.chars() {
        let (bytes, _, _) = encoding.encode(ch.encode_utf8(&mut buf));
        if out.len() + bytes.len() > limit {
            break;
        }
        out.extend_from_slice(&bytes);
    }
    (out, false)
}
