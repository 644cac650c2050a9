/*!
 * Tests for the sexagesimal timecode codec
 */

use chapterize::errors::TimecodeError;
use chapterize::timecode;

/// Round-trip property: format(parse(x)) == x for canonical timecodes
#[test]
fn test_parse_format_withCanonicalTimecodes_shouldRoundTrip() {
    for text in ["00:00:00.000", "01:02:03.004", "10:59:59.999", "00:45:30.500"] {
        let ms = timecode::parse(text).unwrap();
        assert_eq!(timecode::format(ms), text);
    }
}

#[test]
fn test_parse_withKnownValue_shouldReturnMilliseconds() {
    assert_eq!(timecode::parse("01:23:45.678").unwrap(), 5_025_678);
    assert_eq!(timecode::parse("00:00:00.000").unwrap(), 0);
}

/// A short fraction reads as fractional seconds, not raw milliseconds
#[test]
fn test_parse_withShortFraction_shouldScaleToMilliseconds() {
    assert_eq!(timecode::parse("00:00:01.5").unwrap(), 1_500);
    assert_eq!(timecode::parse("00:00:01.50").unwrap(), 1_500);
    assert_eq!(timecode::parse("00:00:01.500").unwrap(), 1_500);
}

/// Precision beyond a millisecond is truncated, not rejected
#[test]
fn test_parse_withLongFraction_shouldTruncateToMilliseconds() {
    assert_eq!(timecode::parse("00:00:01.123456").unwrap(), 1_123);
}

#[test]
fn test_parse_withMalformedInput_shouldFail() {
    for bad in [
        "1:02:03.000",
        "00:61:00.000",
        "00:00:61.000",
        "00:00:00",
        "00:00:00,500",
        "abc",
        "",
    ] {
        assert!(
            matches!(timecode::parse(bad), Err(TimecodeError::Malformed(_))),
            "expected '{bad}' to be rejected"
        );
    }
}

/// Borrows propagate across seconds, minutes, and hours with zero padding
#[test]
fn test_decrement_withBorrowChain_shouldRollAllFields() {
    assert_eq!(
        timecode::decrement_one_unit("01:00:00.000").unwrap(),
        "00:59:59.999"
    );
    assert_eq!(
        timecode::decrement_one_unit("00:01:00.000").unwrap(),
        "00:00:59.999"
    );
    assert_eq!(
        timecode::decrement_one_unit("10:00:00.000").unwrap(),
        "09:59:59.999"
    );
}

#[test]
fn test_decrement_withinSecond_shouldOnlyTouchFraction() {
    assert_eq!(
        timecode::decrement_one_unit("00:00:00.500").unwrap(),
        "00:00:00.499"
    );
}

#[test]
fn test_decrement_atZero_shouldUnderflow() {
    assert!(matches!(
        timecode::decrement_one_unit("00:00:00.000"),
        Err(TimecodeError::Underflow(_))
    ));
}

#[test]
fn test_decrement_withMalformedInput_shouldFail() {
    assert!(matches!(
        timecode::decrement_one_unit("garbage"),
        Err(TimecodeError::Malformed(_))
    ));
}
