//! Go-style duration strings such as `"5s"`, `"100ms"` or `"1m30s"`.

use std::{sync::OnceLock, time::Duration};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serializer, de};

static SEGMENT: OnceLock<Regex> = OnceLock::new();

fn segment_regex() -> &'static Regex {
    SEGMENT.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|ms|s|m|h)").unwrap()
    })
}

/// Parses a duration made of one or more `<number><unit>` segments.
///
/// Units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `"0"` is
/// accepted as zero.
///
/// # Errors
/// Returns a description of the problem if the input has no segments, has
/// text between segments, or overflows.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();

    if input == "0" {
        return Ok(Duration::ZERO);
    }
    if input.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total_nanos: u128 = 0;
    let mut consumed = 0;

    for captures in segment_regex().captures_iter(input) {
        let (whole, [number, unit]) = captures.extract();
        let start = captures.get(0).map(|m| m.start()).unwrap_or_default();

        if start != consumed {
            return Err(format!("invalid duration '{input}'"));
        }
        consumed += whole.len();

        let scale: f64 = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(format!("unknown unit '{unit}' in duration '{input}'")),
        };

        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid number '{number}' in duration '{input}'"))?;

        let nanos = (value * scale).round();
        if !nanos.is_finite() || nanos > u64::MAX as f64 {
            return Err(format!("duration '{input}' overflows"));
        }

        total_nanos = total_nanos
            .checked_add(nanos as u128)
            .ok_or_else(|| format!("duration '{input}' overflows"))?;
    }

    if consumed != input.len() {
        return Err(format!("invalid duration '{input}'"));
    }

    let nanos = u64::try_from(total_nanos).map_err(|_| format!("duration '{input}' overflows"))?;
    Ok(Duration::from_nanos(nanos))
}

/// Formats a duration the way Go's `time.Duration.String` does.
///
/// Sub-second values use the largest fitting unit (`"250ms"`, `"1.5µs"`),
/// longer values are written as hours, minutes and seconds (`"1m30s"`).
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", with_fraction(nanos / 1_000, nanos % 1_000, 3));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", with_fraction(nanos / 1_000_000, nanos % 1_000_000, 6));
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = with_fraction(
        u128::from(total_secs % 60),
        u128::from(duration.subsec_nanos()),
        9,
    );

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{seconds}s"));
    out
}

fn with_fraction(whole: u128, fraction: u128, digits: usize) -> String {
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{fraction:0digits$}");
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}

/// Serde adapter for optional `Duration` fields.
pub mod serde_duration_opt {
    use super::*;

    /// Serializes an optional duration as a Go-style string.
    ///
    /// # Errors
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&format_duration(*duration)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional duration from a Go-style string.
    ///
    /// # Errors
    /// Returns a deserialization error if the string is not a valid duration.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_duration(&raw).map_err(de::Error::custom))
            .transpose()
    }
}
