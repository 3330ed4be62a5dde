/*!
 * Tests for the time expression algebra
 */

use anyhow::Result;
use subcanon::errors::TimeError;
use subcanon::time_expression::{
    ClockFormat, MetricUnit, TimeExpression, UNSYNCED_TIME_FULL, UNSYNCED_TIME_ONE_HOUR_DIGIT,
    fraction_to_milliseconds, is_unsynced_sentinel, milliseconds_to_clock_string,
    parse_time_expression,
};

#[test]
fn test_parse_time_expression_withClockTimes_shouldReturnMilliseconds() -> Result<()> {
    assert_eq!(parse_time_expression("00:00:01.000", None)?, 1000);
    assert_eq!(parse_time_expression("01:02:03.004", None)?, 3_723_004);
    assert_eq!(parse_time_expression("00:00:01,5", None)?, 1500);
    assert_eq!(parse_time_expression("0:00:02.25", None)?, 2250);
    assert_eq!(parse_time_expression("00:01:00", None)?, 60_000);
    assert_eq!(parse_time_expression("99:59:59.999", None)?, UNSYNCED_TIME_FULL);
    Ok(())
}

#[test]
fn test_parse_time_expression_withLongFraction_shouldTruncateToMilliseconds() -> Result<()> {
    assert_eq!(parse_time_expression("00:00:01.23456", None)?, 1234);
    assert_eq!(fraction_to_milliseconds("5"), 500);
    assert_eq!(fraction_to_milliseconds("05"), 50);
    assert_eq!(fraction_to_milliseconds("1234"), 123);
    Ok(())
}

#[test]
fn test_parse_time_expression_withMetricUnits_shouldScale() -> Result<()> {
    assert_eq!(parse_time_expression("2h", None)?, 7_200_000);
    assert_eq!(parse_time_expression("1.5m", None)?, 90_000);
    assert_eq!(parse_time_expression("3.5s", None)?, 3500);
    assert_eq!(parse_time_expression("0.57s", None)?, 570);
    assert_eq!(parse_time_expression("250ms", None)?, 250);
    assert_eq!(parse_time_expression("1.9ms", None)?, 1);
    Ok(())
}

#[test]
fn test_parse_time_expression_withFrames_shouldResolveToZero() -> Result<()> {
    assert_eq!(parse_time_expression("25f", None)?, 0);
    Ok(())
}

#[test]
fn test_parse_time_expression_withTicks_shouldUseTickRate() -> Result<()> {
    assert_eq!(parse_time_expression("10000000t", Some(10_000_000))?, 1000);
    assert_eq!(parse_time_expression("15t", Some(10))?, 1500);
    assert_eq!(parse_time_expression("1t", Some(3))?, 333);
    Ok(())
}

#[test]
fn test_parse_time_expression_withTicksAndNoRate_shouldFail() {
    assert!(matches!(
        parse_time_expression("100t", None),
        Err(TimeError::MissingTickRate(_))
    ));
    assert!(matches!(
        parse_time_expression("100t", Some(0)),
        Err(TimeError::MissingTickRate(_))
    ));
}

#[test]
fn test_parse_time_expression_withGarbage_shouldFail() {
    for text in ["", "abc", "1:2:3", "00:61:00.000", "00:00:75.000", "12x", "-1s"] {
        assert!(
            matches!(parse_time_expression(text, None), Err(TimeError::InvalidExpression(_))),
            "'{}' should be rejected",
            text
        );
    }
}

#[test]
fn test_time_expression_parse_shouldKeepStructure() -> Result<()> {
    assert_eq!(
        TimeExpression::parse("01:02:03.5")?,
        TimeExpression::ClockTime {
            hours: 1,
            minutes: 2,
            seconds: 3,
            fraction: 500
        }
    );
    assert_eq!(
        TimeExpression::parse("4.5s")?,
        TimeExpression::Metric {
            amount: 4.5,
            unit: MetricUnit::Seconds
        }
    );
    assert_eq!(TimeExpression::parse("12t")?, TimeExpression::Tick { count: 12.0 });
    Ok(())
}

#[test]
fn test_milliseconds_to_clock_string_withValues_shouldFormat() {
    assert_eq!(milliseconds_to_clock_string(Some(0)), "00:00:00.000");
    assert_eq!(milliseconds_to_clock_string(Some(3_723_004)), "01:02:03.004");
    assert_eq!(milliseconds_to_clock_string(None), "99:59:59.999");
}

#[test]
fn test_clock_string_roundTrip_withSampledRange_shouldBeInverse() -> Result<()> {
    let mut ms = 0;
    while ms <= UNSYNCED_TIME_FULL {
        let text = milliseconds_to_clock_string(Some(ms));
        assert_eq!(parse_time_expression(&text, None)?, ms, "round trip of {}", text);
        ms += 999_983;
    }
    assert_eq!(
        parse_time_expression(&milliseconds_to_clock_string(Some(UNSYNCED_TIME_FULL)), None)?,
        UNSYNCED_TIME_FULL
    );
    Ok(())
}

#[test]
fn test_clock_format_withPerFormatLayouts_shouldFormat() {
    assert_eq!(ClockFormat::SRT.format(Some(3_723_004)), "01:02:03,004");
    assert_eq!(ClockFormat::WEBVTT.format(Some(3_723_004)), "01:02:03.004");
    assert_eq!(ClockFormat::SBV.format(Some(3_723_004)), "1:02:03.004");
    assert_eq!(ClockFormat::SSA.format(Some(3_723_004)), "1:02:03.00");
}

#[test]
fn test_clock_format_withNone_shouldPrintSentinel() {
    assert_eq!(ClockFormat::SRT.format(None), "99:59:59,999");
    assert_eq!(ClockFormat::WEBVTT.format(None), "99:59:59.999");
    assert_eq!(ClockFormat::SBV.format(None), "9:59:59.000");
    assert_eq!(ClockFormat::SSA.format(None), "9:59:59.99");
}

#[test]
fn test_clock_format_ssa_withHalfCentisecond_shouldRoundUp() {
    assert_eq!(ClockFormat::SSA.format(Some(133)), "0:00:00.13");
    assert_eq!(ClockFormat::SSA.format(Some(238)), "0:00:00.24");
    assert_eq!(ClockFormat::SSA.format(Some(59_996)), "0:01:00.00");
}

#[test]
fn test_clock_format_parse_withSentinel_shouldReturnNone() -> Result<()> {
    assert_eq!(ClockFormat::SRT.parse("99:59:59,999")?, None);
    assert_eq!(ClockFormat::SBV.parse("9:59:59.000")?, None);
    assert_eq!(ClockFormat::SSA.parse("9:59:59.99")?, None);
    assert_eq!(ClockFormat::SRT.parse("00:00:02,000")?, Some(2000));
    Ok(())
}

#[test]
fn test_is_unsynced_sentinel_withThresholds_shouldCompare() {
    assert!(is_unsynced_sentinel(UNSYNCED_TIME_FULL, UNSYNCED_TIME_FULL));
    assert!(!is_unsynced_sentinel(UNSYNCED_TIME_FULL - 1, UNSYNCED_TIME_FULL));
    assert!(is_unsynced_sentinel(UNSYNCED_TIME_ONE_HOUR_DIGIT, UNSYNCED_TIME_ONE_HOUR_DIGIT));
    assert!(!is_unsynced_sentinel(UNSYNCED_TIME_FULL + 1, UNSYNCED_TIME_FULL));
}

#[test]
fn test_resolve_pastSentinel_shouldOnlyClampOneDigitHourFormats() -> Result<()> {
    assert_eq!(ClockFormat::SRT.parse("100:00:00,000")?, Some(360_000_000));
    assert_eq!(ClockFormat::WEBVTT.resolve(UNSYNCED_TIME_FULL + 1), Some(UNSYNCED_TIME_FULL + 1));
    assert_eq!(ClockFormat::TTML.resolve(UNSYNCED_TIME_FULL), None);
    assert_eq!(ClockFormat::SBV.parse("9:59:59.500")?, None);
    assert_eq!(ClockFormat::SSA.parse("12:00:00.00")?, None);
    assert_eq!(ClockFormat::SSA.parse("9:59:58.00")?, Some(UNSYNCED_TIME_ONE_HOUR_DIGIT - 1000));
    Ok(())
}
