//! Parser for the scale's human-readable output lines.
//!
//! Frames look like `"  4.72 kg"` or `"    2.4lb"`, possibly with status
//! prefixes (`"ST,GS,  4.72 kg"`). The first `<number><unit>` match wins;
//! there is no checksum and no fixed column layout.

use std::sync::LazyLock;

use regex::Regex;
use scale_traits::{Measurement, Reading, Unit};

use crate::util::decode_permissive;

static FRAME_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9.]+)\s*(kg|lb)").ok());

/// Parse one line (terminators already stripped) into a reading.
///
/// Lines without a usable `<number><unit>` pair come back unparsed with the
/// text preserved. That includes a structural match whose number does not
/// parse (`"1.2.3 kg"`) or overflows.
pub fn parse(line: &str) -> Reading {
    match extract(line) {
        Some(m) => Reading::parsed(line, m),
        None => Reading::unparsed(line),
    }
}

/// Decode raw device bytes and parse them. Non-ASCII bytes are dropped and
/// surrounding whitespace trimmed; a line that is empty afterwards yields
/// no reading at all.
pub fn parse_bytes(bytes: &[u8]) -> Option<Reading> {
    let text = decode_permissive(bytes);
    let line = text.trim();
    if line.is_empty() {
        return None;
    }
    Some(parse(line))
}

fn extract(line: &str) -> Option<Measurement> {
    let re = FRAME_RE.as_ref()?;
    let caps = re.captures(line)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = Unit::from_token(caps.get(2)?.as_str())?;
    Measurement::new(value, unit)
}
