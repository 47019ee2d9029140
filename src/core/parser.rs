// dmesg-recent - core/parser.rs
//
// Line classification for kernel log text and parsing of the leading
// `[seconds]` timestamp. Works on raw bytes so non-UTF-8 lines pass
// through the filter untouched.

use crate::core::model::{ContinuationMode, LineKind};
use regex::bytes::Regex;
use std::sync::OnceLock;

/// Float as accepted by C's `%lf`: hexadecimal, decimal, inf/infinity or
/// nan. Hex comes first so `0x10` is not cut short at the leading `0`.
const FLOAT_PATTERN: &str = concat!(
    r"[+-]?(?:",
    r"0[xX](?:[0-9a-fA-F]+(?:\.[0-9a-fA-F]*)?|\.[0-9a-fA-F]+)(?:[pP][+-]?[0-9]+)?",
    r"|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?",
    r"|(?i:infinity|inf|nan)",
    r")"
);

/// `[` followed by optional whitespace and a float. The closing `]` is not
/// required, matching a `"[%lf]"` scan.
fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(&format!(r"^\[[ \t\n\x0B\x0C\r]*(?P<ts>{FLOAT_PATTERN})"))
            .expect("header_regex: invalid regex")
    })
}

/// Leading whitespace followed by a float.
fn float_prefix_regex() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| {
        Regex::new(&format!(r"^[ \t\n\x0B\x0C\r]*(?P<ts>{FLOAT_PATTERN})"))
            .expect("float_prefix_regex: invalid regex")
    })
}

/// `isspace` for the C locale. Unlike `u8::is_ascii_whitespace` this
/// includes vertical tab.
fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0B' | b'\x0C' | b'\r')
}

/// True if the line begins with whitespace (an empty `"\n"` line counts).
pub fn starts_with_whitespace(line: &[u8]) -> bool {
    line.first().copied().is_some_and(is_c_space)
}

fn capture_float(re: &Regex, bytes: &[u8]) -> Option<f64> {
    let caps = re.captures(bytes)?;
    let ts = caps.name("ts")?;
    // The pattern only admits ASCII, so this cannot fail in practice.
    parse_c_float(std::str::from_utf8(ts.as_bytes()).ok()?)
}

/// Convert text matched by `FLOAT_PATTERN` to a value.
fn parse_c_float(text: &str) -> Option<f64> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let lower = body.to_ascii_lowercase();
    let magnitude = if let Some(hex) = lower.strip_prefix("0x") {
        parse_hex_float(hex)?
    } else {
        match lower.as_str() {
            "inf" | "infinity" => f64::INFINITY,
            "nan" => f64::NAN,
            decimal => decimal.parse().ok()?,
        }
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Hex mantissa with optional binary exponent, e.g. `1.8p3` (lowercase,
/// without the `0x` prefix).
fn parse_hex_float(hex: &str) -> Option<f64> {
    let (mantissa, exponent) = match hex.split_once('p') {
        Some((m, e)) => (m, e.parse::<i32>().ok()?),
        None => (hex, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mut value = 0.0f64;
    for c in int_part.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in frac_part.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }
    Some(value * 2f64.powi(exponent))
}

/// Parse the `[seconds]` timestamp at the start of a line.
pub fn parse_header_timestamp(line: &[u8]) -> Option<f64> {
    capture_float(header_regex(), line)
}

/// Parse a float at the start of `text`, skipping leading whitespace and
/// ignoring anything after it.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    capture_float(float_prefix_regex(), text.as_bytes())
}

/// Classify a line under the given continuation mode.
///
/// In strict mode only whitespace-led lines are continuations; any other
/// line without a timestamp is `Unparsed` and the caller decides whether
/// that is fatal. In multiline mode such lines are continuations.
pub fn classify(line: &[u8], mode: ContinuationMode) -> LineKind {
    if starts_with_whitespace(line) {
        return LineKind::Continuation;
    }
    match (parse_header_timestamp(line), mode) {
        (Some(ts), _) => LineKind::Header(ts),
        (None, ContinuationMode::Multiline) => LineKind::Continuation,
        (None, ContinuationMode::Strict) => LineKind::Unparsed,
    }
}
