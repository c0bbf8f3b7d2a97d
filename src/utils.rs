//! Locale independent number parsing and printf-style formatting shared by the
//! feature model and the DBF codec.

use crate::config::cpl_error;
use crate::errors::{cple, CplErrType};

/// `strtol`-like parse of a base 10 integer prefix.
///
/// Returns the saturated value, the number of bytes consumed (0 when no digits
/// were found) and whether the value overflowed 64 bits.
pub(crate) fn strtol(s: &str) -> (i64, usize, bool) {
    let bytes = s.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    let mut negative = false;
    if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
        negative = bytes[pos] == b'-';
        pos += 1;
    }
    let digits_start = pos;
    let mut value: i64 = 0;
    let mut overflow = false;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        let digit = i64::from(bytes[pos] - b'0');
        if !overflow {
            let next = value
                .checked_mul(10)
                .and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) });
            match next {
                Some(v) => value = v,
                None => {
                    overflow = true;
                    value = if negative { i64::MIN } else { i64::MAX };
                }
            }
        }
        pos += 1;
    }
    if pos == digits_start {
        return (0, 0, false);
    }
    (value, pos, overflow)
}

/// C `atoi`: leading integer prefix, clamped to the 32 bit range.
pub(crate) fn atoi(s: &str) -> i32 {
    let (value, _, _) = strtol(s);
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Overflow-safe conversion of a string to a 64 bit integer.
///
/// When `warn` is set, an overflow is reported on the diagnostics channel.
pub(crate) fn atoi64(s: &str, warn: bool) -> i64 {
    let (value, _, overflow) = strtol(s);
    if overflow && warn {
        cpl_error(
            CplErrType::Warning,
            cple::APP_DEFINED,
            &format!("64 bit integer overflow when converting {s}"),
        );
    }
    value
}

/// `strtod`-like parse of a floating point prefix, independent of the locale.
///
/// Returns the value and the number of bytes consumed (0 when nothing parsed).
pub(crate) fn strtod(s: &str) -> (f64, usize) {
    let bytes = s.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    let start = pos;
    if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
        pos += 1;
    }

    let rest = &s[pos..];
    for word in ["infinity", "inf", "nan"] {
        if rest.len() >= word.len() && rest.as_bytes()[..word.len()].eq_ignore_ascii_case(word.as_bytes()) {
            let end = pos + word.len();
            return (s[start..end].parse().unwrap_or(0.0), end);
        }
    }

    let mut digits = 0;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
        digits += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return (0.0, 0);
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp_end = pos + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            pos = exp_end;
        }
    }

    let mut text = s[start..pos].to_string();
    if text.ends_with('.') {
        text.push('0');
    }
    (text.parse().unwrap_or(0.0), pos)
}

/// C `atof`, independent of the locale.
pub(crate) fn atof(s: &str) -> f64 {
    strtod(s).0
}

/// Whether `s` parses entirely as a number (surrounding blanks allowed).
pub(crate) fn is_numeric(s: &str) -> bool {
    let (_, consumed) = strtod(s);
    consumed > 0 && s[consumed..].trim().is_empty()
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// printf `%.<precision>g`.
pub(crate) fn format_g(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        strip_trailing_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

/// Upper case hexadecimal rendering of a byte buffer.
pub(crate) fn binary_to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02X}")).collect()
}

/// Decode a hexadecimal string, `None` when it is not valid hex.
pub(crate) fn hex_to_binary(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| hex.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}
