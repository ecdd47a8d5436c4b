//! Target byte rates and the tick frequency derived from them.

use crate::error::ThroughputError;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// Target rate in bytes per second. Negative means unmetered.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Throughput(f64);

impl Throughput {
    pub const UNMETERED: Throughput = Throughput(-1.0);

    pub fn bytes_per_second(bytes: f64) -> Self {
        Throughput(bytes)
    }

    pub fn as_bytes_per_second(&self) -> f64 {
        self.0
    }

    pub fn is_metered(&self) -> bool {
        self.0 > 0.0
    }
}

impl Default for Throughput {
    fn default() -> Self {
        Throughput::UNMETERED
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_metered() {
            write!(f, "{} B/s", self.0)
        } else {
            f.write_str("unmetered")
        }
    }
}

impl std::str::FromStr for Throughput {
    type Err = ThroughputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_throughput(s)
    }
}

impl<'de> Deserialize<'de> for Throughput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_throughput(&text).map_err(serde::de::Error::custom)
    }
}

fn pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^((?:0|[1-9]\d*)(?:\.\d+)?)([KkMmGgTt]?[Bb])/([smhd])$").ok())
        .as_ref()
}

/// Parse `<number><unit>/<time>`, e.g. `200KB/s` or `1.5Mb/m`.
///
/// The unit prefix is case-insensitive and binary (`K` = 1024); a lowercase
/// `b` counts bits, an uppercase `B` bytes. An empty string is unmetered.
pub fn parse_throughput(input: &str) -> Result<Throughput, ThroughputError> {
    if input.is_empty() {
        return Ok(Throughput::UNMETERED);
    }
    let invalid = || ThroughputError(input.to_string());
    let captures = pattern()
        .and_then(|re| re.captures(input))
        .ok_or_else(invalid)?;

    let mut value: f64 = captures[1].parse().map_err(|_| invalid())?;
    value /= match &captures[3] {
        "s" => 1.0,
        "m" => 60.0,
        "h" => 3600.0,
        "d" => 86400.0,
        _ => return Err(invalid()),
    };

    let unit = &captures[2];
    let multiplier = match unit.len() {
        1 => 1.0,
        _ => match unit.as_bytes()[0].to_ascii_uppercase() {
            b'K' => 1024.0,
            b'M' => 1024.0 * 1024.0,
            b'G' => 1024.0 * 1024.0 * 1024.0,
            b'T' => 1024.0 * 1024.0 * 1024.0 * 1024.0,
            _ => return Err(invalid()),
        },
    };
    let bits = unit.ends_with('b');

    let bytes = value * multiplier;
    Ok(Throughput(if bits { bytes / 8.0 } else { bytes }))
}

/// Delay between ticks so that `num` records of `bytes` bytes per tick
/// sustain `throughput`. Unmetered throughput gives zero.
pub fn calculate_frequency(bytes: usize, num: usize, throughput: Throughput) -> Duration {
    if !throughput.is_metered() {
        return Duration::ZERO;
    }
    let total = bytes as f64 * num as f64;
    let millis = total / throughput.0 * 1000.0;
    Duration::from_millis(millis as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_throughput("200KB/s").unwrap().0, 200.0 * 1024.0);
        assert_eq!(parse_throughput("2MB/s").unwrap().0, 2.0 * 1024.0 * 1024.0);
        assert_eq!(parse_throughput("500Kb/s").unwrap().0, 500.0 * 1024.0 / 8.0);
        assert_eq!(parse_throughput("8b/s").unwrap().0, 1.0);
        assert_eq!(parse_throughput("10B/s").unwrap().0, 10.0);
        assert_eq!(parse_throughput("1kB/s").unwrap().0, 1024.0);
        assert_eq!(parse_throughput("1gb/s").unwrap().0, 1024.0 * 1024.0 * 1024.0 / 8.0);
        assert_eq!(
            parse_throughput("1TB/s").unwrap().0,
            1024.0 * 1024.0 * 1024.0 * 1024.0
        );
    }

    #[test]
    fn test_parse_time_units() {
        assert_eq!(parse_throughput("60B/m").unwrap().0, 1.0);
        assert_eq!(parse_throughput("3600B/h").unwrap().0, 1.0);
        assert_eq!(parse_throughput("86400B/d").unwrap().0, 1.0);
        assert_eq!(parse_throughput("1.5KB/s").unwrap().0, 1536.0);
    }

    #[test]
    fn test_empty_is_unmetered() {
        let unmetered = parse_throughput("").unwrap();
        assert_eq!(unmetered, Throughput::UNMETERED);
        assert!(!unmetered.is_metered());
    }

    #[test]
    fn test_invalid() {
        for input in ["fast", "200KB", "200KB/w", "-1KB/s", "01KB/s", "1.KB/s", "1XB/s", " 1KB/s"] {
            assert!(parse_throughput(input).is_err(), "{input} should not parse");
        }
    }

    #[test]
    fn test_calculate_frequency() {
        let throughput = parse_throughput("200KB/s").unwrap();
        assert_eq!(calculate_frequency(1024, 2, throughput), Duration::from_millis(10));
        assert_eq!(calculate_frequency(1024, 2, Throughput::UNMETERED), Duration::ZERO);
        assert_eq!(
            calculate_frequency(100, 1, Throughput::bytes_per_second(0.0)),
            Duration::ZERO
        );
        // 3 bytes at 2 B/s is 1500 ms
        assert_eq!(
            calculate_frequency(3, 1, Throughput::bytes_per_second(2.0)),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn test_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            throughput: Throughput,
        }
        let w: Wrapper = serde_json::from_str(r#"{"throughput":"1KB/s"}"#).unwrap();
        assert_eq!(w.throughput.as_bytes_per_second(), 1024.0);
        assert!(serde_json::from_str::<Wrapper>(r#"{"throughput":"x"}"#).is_err());
    }
}
