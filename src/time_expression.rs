/*!
 * Time expression algebra.
 *
 * Milliseconds are the only unit stored in a track. This module converts
 * between milliseconds and the textual forms found in subtitle documents:
 * clock times (`HH:MM:SS.fff`), metric offsets (`<n><unit>`) and tick counts
 * (`<n>t`, scaled by the document tick rate).
 *
 * Each output format also has its own clock layout and its own "unsynced"
 * sentinel, the maximum time it can print, used to represent cues that have
 * no timing yet. `ClockFormat` captures both.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::errors::TimeError;

/// Sentinel for formats with two-digit hours: 99:59:59.999
pub const UNSYNCED_TIME_FULL: u64 = 359_999_999;

/// Sentinel for formats with a single hour digit: 9:59:59.000
pub const UNSYNCED_TIME_ONE_HOUR_DIGIT: u64 = 35_999_000;

static CLOCK_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3}):(\d{2}):(\d{2})(?:[.,](\d+))?$").expect("Invalid clock time regex")
});

static METRIC_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)(h|ms|m|s|f|t)$").expect("Invalid metric time regex")
});

/// Unit of a metric time expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    /// Frames; no frame rate is known so these always resolve to zero
    Frames,
}

impl MetricUnit {
    // @returns: Milliseconds per unit
    pub fn multiplier(&self) -> u64 {
        match self {
            Self::Hours => 3_600_000,
            Self::Minutes => 60_000,
            Self::Seconds => 1_000,
            Self::Milliseconds => 1,
            Self::Frames => 0,
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "h" => Some(Self::Hours),
            "m" => Some(Self::Minutes),
            "s" => Some(Self::Seconds),
            "ms" => Some(Self::Milliseconds),
            "f" => Some(Self::Frames),
            _ => None,
        }
    }
}

/// A parsed time expression, before it is normalized to milliseconds
#[derive(Debug, Clone, PartialEq)]
pub enum TimeExpression {
    /// `HH:MM:SS.fff`; `fraction` is already scaled to milliseconds
    ClockTime {
        hours: u64,
        minutes: u64,
        seconds: u64,
        fraction: u64,
    },
    /// `<amount><unit>` with h, m, s, ms or f
    Metric { amount: f64, unit: MetricUnit },
    /// `<count>t`
    Tick { count: f64 },
}

impl TimeExpression {
    /// Parse the textual form without resolving it
    pub fn parse(text: &str) -> Result<Self, TimeError> {
        let text = text.trim();

        if let Some(caps) = CLOCK_TIME_REGEX.captures(text) {
            let number = |idx: usize| -> Result<u64, TimeError> {
                caps[idx]
                    .parse::<u64>()
                    .map_err(|_| TimeError::Overflow(text.to_string()))
            };
            let minutes = number(2)?;
            let seconds = number(3)?;
            if minutes > 59 || seconds > 59 {
                return Err(TimeError::InvalidExpression(text.to_string()));
            }
            return Ok(Self::ClockTime {
                hours: number(1)?,
                minutes,
                seconds,
                fraction: caps.get(4).map_or(0, |m| fraction_to_milliseconds(m.as_str())),
            });
        }

        if let Some(caps) = METRIC_TIME_REGEX.captures(text) {
            let amount = caps[1]
                .parse::<f64>()
                .map_err(|_| TimeError::InvalidExpression(text.to_string()))?;
            return match &caps[2] {
                "t" => Ok(Self::Tick { count: amount }),
                suffix => match MetricUnit::from_suffix(suffix) {
                    Some(unit) => Ok(Self::Metric { amount, unit }),
                    None => Err(TimeError::InvalidExpression(text.to_string())),
                },
            };
        }

        Err(TimeError::InvalidExpression(text.to_string()))
    }

    /// Normalize to milliseconds
    pub fn to_milliseconds(&self, tick_rate: Option<u32>) -> Result<u64, TimeError> {
        match *self {
            Self::ClockTime {
                hours,
                minutes,
                seconds,
                fraction,
            } => hours
                .checked_mul(3_600_000)
                .and_then(|h| h.checked_add(minutes * 60_000 + seconds * 1_000 + fraction))
                .ok_or_else(|| TimeError::Overflow(self.to_string())),
            Self::Metric { amount, unit } => scale(amount, unit.multiplier() as f64)
                .ok_or_else(|| TimeError::Overflow(self.to_string())),
            Self::Tick { count } => match tick_rate {
                Some(rate) if rate > 0 => {
                    // Integer division on whole ticks keeps results exact
                    let ticks = count.trunc();
                    if ticks > u64::MAX as f64 / 1000.0 {
                        return Err(TimeError::Overflow(self.to_string()));
                    }
                    Ok(ticks as u64 * 1000 / u64::from(rate))
                }
                _ => Err(TimeError::MissingTickRate(self.to_string())),
            },
        }
    }
}

impl fmt::Display for TimeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClockTime {
                hours,
                minutes,
                seconds,
                fraction,
            } => write!(f, "{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, fraction),
            Self::Metric { amount, unit } => {
                let suffix = match unit {
                    MetricUnit::Hours => "h",
                    MetricUnit::Minutes => "m",
                    MetricUnit::Seconds => "s",
                    MetricUnit::Milliseconds => "ms",
                    MetricUnit::Frames => "f",
                };
                write!(f, "{}{}", amount, suffix)
            }
            Self::Tick { count } => write!(f, "{}t", count),
        }
    }
}

// Multiply and truncate, tolerating float noise such as 0.57 * 1000 = 570.0000000001
fn scale(amount: f64, multiplier: f64) -> Option<u64> {
    let value = amount * multiplier;
    if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
        return None;
    }
    let rounded = value.round();
    if (value - rounded).abs() < 1e-6 {
        Some(rounded as u64)
    } else {
        Some(value.trunc() as u64)
    }
}

/// Scale a fraction string to milliseconds: "5" -> 500, "05" -> 50, "1234" -> 123
pub fn fraction_to_milliseconds(fraction: &str) -> u64 {
    let mut digits: String = fraction.chars().take(3).collect();
    while digits.len() < 3 {
        digits.push('0');
    }
    digits.parse::<u64>().unwrap_or(0)
}

/// Parse any supported time expression into milliseconds
pub fn parse_time_expression(text: &str, tick_rate: Option<u32>) -> Result<u64, TimeError> {
    TimeExpression::parse(text)?.to_milliseconds(tick_rate)
}

/// Format milliseconds as `HH:MM:SS.mmm`; `None` becomes the 99:59:59.999 sentinel
pub fn milliseconds_to_clock_string(ms: Option<u64>) -> String {
    ClockFormat::TTML.format(ms)
}

/// Whether a parsed value is exactly a format's "unsynced" sentinel
pub fn is_unsynced_sentinel(ms: u64, format_max: u64) -> bool {
    ms == format_max
}

/// Hours, minutes, seconds and milliseconds of a millisecond value
pub fn clock_components(ms: u64) -> (u64, u64, u64, u64) {
    let (total_seconds, millis) = (ms / 1000, ms % 1000);
    let (total_minutes, seconds) = (total_seconds / 60, total_seconds % 60);
    (total_minutes / 60, total_minutes % 60, seconds, millis)
}

/// Clock layout and unsynced sentinel of one output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFormat {
    // @field: Minimum number of hour digits
    pub hour_digits: usize,
    // @field: Separator between seconds and fraction
    pub fraction_separator: char,
    // @field: 3 for milliseconds, 2 for centiseconds
    pub fraction_digits: u32,
    // @field: Parsed value that means unsynced
    pub unsynced_threshold: u64,
    // @field: Values past the threshold are unsynced too
    pub unsynced_above: bool,
    // @field: Value printed for an unsynced time
    pub sentinel: u64,
}

impl ClockFormat {
    pub const SRT: ClockFormat = ClockFormat {
        hour_digits: 2,
        fraction_separator: ',',
        fraction_digits: 3,
        unsynced_threshold: UNSYNCED_TIME_FULL,
        unsynced_above: false,
        sentinel: UNSYNCED_TIME_FULL,
    };

    pub const WEBVTT: ClockFormat = ClockFormat {
        hour_digits: 2,
        fraction_separator: '.',
        fraction_digits: 3,
        unsynced_threshold: UNSYNCED_TIME_FULL,
        unsynced_above: false,
        sentinel: UNSYNCED_TIME_FULL,
    };

    pub const TTML: ClockFormat = ClockFormat {
        hour_digits: 2,
        fraction_separator: '.',
        fraction_digits: 3,
        unsynced_threshold: UNSYNCED_TIME_FULL,
        unsynced_above: false,
        sentinel: UNSYNCED_TIME_FULL,
    };

    pub const SBV: ClockFormat = ClockFormat {
        hour_digits: 1,
        fraction_separator: '.',
        fraction_digits: 3,
        unsynced_threshold: UNSYNCED_TIME_ONE_HOUR_DIGIT,
        unsynced_above: true,
        sentinel: UNSYNCED_TIME_ONE_HOUR_DIGIT,
    };

    /// SSA prints 9:59:59.99 for unsynced cues
    pub const SSA: ClockFormat = ClockFormat {
        hour_digits: 1,
        fraction_separator: '.',
        fraction_digits: 2,
        unsynced_threshold: UNSYNCED_TIME_ONE_HOUR_DIGIT,
        unsynced_above: true,
        sentinel: UNSYNCED_TIME_ONE_HOUR_DIGIT + 990,
    };

    /// Format a time, printing the sentinel for `None`
    pub fn format(&self, ms: Option<u64>) -> String {
        let ms = ms.unwrap_or(self.sentinel);
        let (hours, minutes, seconds, fraction) = if self.fraction_digits == 2 {
            // Centiseconds round half up, carrying into the seconds
            let centis = (ms + 5) / 10;
            let (h, m, s, _) = clock_components(centis / 100 * 1000);
            (h, m, s, centis % 100)
        } else {
            clock_components(ms)
        };
        format!(
            "{:0hw$}:{:02}:{:02}{}{:0fw$}",
            hours,
            minutes,
            seconds,
            self.fraction_separator,
            fraction,
            hw = self.hour_digits,
            fw = self.fraction_digits as usize
        )
    }

    /// Map a parsed value back to `None` when it is the unsynced sentinel.
    /// One-digit-hour formats cannot show later times, so anything past
    /// their sentinel is unsynced as well.
    pub fn resolve(&self, ms: u64) -> Option<u64> {
        let past = self.unsynced_above && ms > self.unsynced_threshold;
        if past || is_unsynced_sentinel(ms, self.unsynced_threshold) {
            None
        } else {
            Some(ms)
        }
    }

    /// Parse a clock string of this layout, mapping sentinels to `None`
    pub fn parse(&self, text: &str) -> Result<Option<u64>, TimeError> {
        let ms = parse_time_expression(text, None)?;
        Ok(self.resolve(ms))
    }
}
