use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TimecodeError;

// @module: Sexagesimal timecode codec

// @const: Strict HH:MM:SS.mmm pattern (two-digit fields, variable fraction)
static TIMECODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2}):(\d{2}):(\d{2})\.(\d+)$").unwrap());

/// The minimal representable unit subtracted by [`decrement_one_unit`].
///
/// Chapter end times are derived as "next chapter's start minus one unit" so
/// adjacent output files never share a boundary frame. One millisecond keeps
/// the gap inaudible.
pub const ONE_UNIT_MS: u64 = 1;

/// Parse a `HH:MM:SS.mmm` timecode into a millisecond count.
///
/// The fraction is interpreted as fractional seconds, so `00:00:01.5` means
/// one and a half seconds. Hours above 99 are representable on the formatting
/// side but not the parsing side; audiobooks do not get that long.
pub fn parse(text: &str) -> Result<u64, TimecodeError> {
    let caps = TIMECODE_REGEX
        .captures(text.trim())
        .ok_or_else(|| TimecodeError::Malformed(text.to_string()))?;

    let hours: u64 = caps[1].parse().unwrap();
    let minutes: u64 = caps[2].parse().unwrap();
    let seconds: u64 = caps[3].parse().unwrap();
    if minutes >= 60 || seconds >= 60 {
        return Err(TimecodeError::Malformed(text.to_string()));
    }

    // Right-pad the fraction so ".5" reads as 500ms, not 5ms; anything
    // beyond millisecond precision is truncated
    let millis: u64 = format!("{:0<3}", &caps[4])
        .chars()
        .take(3)
        .collect::<String>()
        .parse()
        .unwrap();

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Format a millisecond count as `HH:MM:SS.mmm`, zero-padding every field.
pub fn format(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Subtract one minimal unit from a textual timecode.
///
/// Borrows propagate naturally across the seconds, minutes, and hours fields:
/// `01:00:00.000` becomes `00:59:59.999`. Fails if the input cannot be parsed
/// or if the result would fall below `00:00:00.000`.
pub fn decrement_one_unit(text: &str) -> Result<String, TimecodeError> {
    let ms = parse(text)?;
    if ms < ONE_UNIT_MS {
        return Err(TimecodeError::Underflow(text.to_string()));
    }
    Ok(format(ms - ONE_UNIT_MS))
}
