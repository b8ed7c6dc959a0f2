use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use clap::ValueEnum;

/// Unix values above this are taken as milliseconds.
const MILLIS_THRESHOLD: f64 = 1e12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TimeFormat {
    /// RFC 3339, UTC
    #[default]
    Iso,
    /// Unix seconds
    Unix,
}

/// Parses a bar timestamp into Unix seconds.
///
/// Accepts Unix seconds or milliseconds, RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD`, the last three read as UTC.
/// Values that carry a sub-second part are rejected rather than truncated,
/// since truncation can merge two distinct bars into one second.
pub fn parse_timestamp(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(value) = s.parse::<u64>() {
        if value as f64 > MILLIS_THRESHOLD {
            return (value % 1000 == 0).then_some(value / 1000);
        }
        return Some(value);
    }

    if let Ok(value) = s.parse::<f64>() {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let secs = if value > MILLIS_THRESHOLD {
            value / 1000.0
        } else {
            value
        };
        // 2^64: anything at or above does not fit in u64
        if secs.fract() != 0.0 || secs >= 18_446_744_073_709_551_616.0 {
            return None;
        }
        return Some(secs as u64);
    }

    let secs = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        if dt.timestamp_subsec_nanos() != 0 {
            return None;
        }
        dt.timestamp()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        dt.and_utc().timestamp()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        dt.and_utc().timestamp()
    } else {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?
            .and_utc()
            .timestamp()
    };

    u64::try_from(secs).ok()
}

pub fn format_timestamp(timestamp: u64, format: TimeFormat) -> String {
    match format {
        TimeFormat::Unix => timestamp.to_string(),
        TimeFormat::Iso => i64::try_from(timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| timestamp.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unix() {
        assert_eq!(parse_timestamp("1700000000"), Some(1_700_000_000));
        assert_eq!(parse_timestamp("1700000000.0"), Some(1_700_000_000));
        assert_eq!(parse_timestamp("1700000000000"), Some(1_700_000_000));
        assert_eq!(parse_timestamp("1.7e9"), Some(1_700_000_000));
        assert_eq!(parse_timestamp(" 60 "), Some(60));
    }

    #[test]
    fn test_parse_rejects_sub_second() {
        assert_eq!(parse_timestamp("1700000000.9"), None);
        assert_eq!(parse_timestamp("1700000000500"), None);
        assert_eq!(parse_timestamp("1700000000500.0"), None);
        assert_eq!(parse_timestamp("2024-01-01T00:00:00.250Z"), None);
        assert_eq!(parse_timestamp("2024-01-01T00:00:00.000Z"), Some(1_704_067_200));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert_eq!(parse_timestamp("1e30"), None);
        assert_eq!(parse_timestamp("18446744073709551616000"), None);
    }

    #[test]
    fn test_parse_dates() {
        assert_eq!(parse_timestamp("1970-01-02"), Some(86_400));
        assert_eq!(parse_timestamp("1970-01-01 00:01:00"), Some(60));
        assert_eq!(parse_timestamp("1970-01-01T00:01:00"), Some(60));
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z"), Some(1_704_067_200));
        assert_eq!(parse_timestamp("2024-01-01T02:00:00+02:00"), Some(1_704_067_200));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("-5"), None);
        assert_eq!(parse_timestamp("NaN"), None);
        assert_eq!(parse_timestamp("1969-12-31"), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_timestamp(1_704_067_200, TimeFormat::Unix), "1704067200");
        assert_eq!(
            format_timestamp(1_704_067_200, TimeFormat::Iso),
            "2024-01-01T00:00:00Z"
        );
    }
}
