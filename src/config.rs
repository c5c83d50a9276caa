//! # Environment Configuration
//!
//! All settings come from the process environment and are resolved once at
//! startup.
//!
//! ## Required
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `LASTFM_API` | Last.fm API key |
//! | `LASTFM_SECRET` | Last.fm shared secret |
//! | `LASTFM_USERAGENT` | User-Agent sent with every Last.fm request |
//! | `LASTFM_USERNAME` | Account whose now-playing track is followed |
//! | `PRINTER_USB` | Serial device path, e.g. `/dev/ttyUSB0` |
//! | `PRINTER_BAUDRATE` | Serial baud rate, e.g. `19200` |
//! | `PRINTER_ROTATION` | Final image rotation in degrees (multiple of 90) |
//!
//! ## Optional
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LASTFM_POLL_INTERVAL` | `10` (seconds) |
//! | `IMAGES_DIR` | `images` |
//! | `FONTS_DIR` | `fonts` |
//!
//! Lookups go through a closure so tests never touch the real environment:
//!
//! ```
//! use scrobbleprint::config::Config;
//!
//! let err = Config::from_lookup(|_| None).unwrap_err();
//! assert!(err.to_string().contains("LASTFM_API"));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ScrobblePrintError};

pub const LASTFM_API: &str = "LASTFM_API";
pub const LASTFM_SECRET: &str = "LASTFM_SECRET";
pub const LASTFM_USERAGENT: &str = "LASTFM_USERAGENT";
pub const LASTFM_USERNAME: &str = "LASTFM_USERNAME";
pub const PRINTER_USB: &str = "PRINTER_USB";
pub const PRINTER_BAUDRATE: &str = "PRINTER_BAUDRATE";
pub const PRINTER_ROTATION: &str = "PRINTER_ROTATION";

/// Every setting that must be present for the service to start.
pub const REQUIRED_KEYS: [&str; 7] = [
    LASTFM_API,
    LASTFM_SECRET,
    LASTFM_USERAGENT,
    LASTFM_USERNAME,
    PRINTER_USB,
    PRINTER_BAUDRATE,
    PRINTER_ROTATION,
];

const LASTFM_POLL_INTERVAL: &str = "LASTFM_POLL_INTERVAL";
const IMAGES_DIR: &str = "IMAGES_DIR";
const FONTS_DIR: &str = "FONTS_DIR";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Last.fm credentials and the account to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastFmConfig {
    pub api_key: String,
    pub secret: String,
    pub user_agent: String,
    pub username: String,
    pub poll_interval: Duration,
}

/// Serial connection and mounting of the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterSettings {
    pub device: String,
    pub baud_rate: u32,
    /// Clockwise rotation in degrees, normalized to 0, 90, 180 or 270.
    pub rotation: u16,
}

/// Fully resolved service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub lastfm: LastFmConfig,
    pub printer: PrinterSettings,
    pub images_dir: PathBuf,
    pub fonts_dir: PathBuf,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Reports every missing required key at once, not just the first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ScrobblePrintError::ConfigurationMissing(missing));
        }

        // Presence was checked above
        let required = |key: &str| get(key).unwrap_or_default();

        let baud_rate = parse_baud_rate(&required(PRINTER_BAUDRATE))?;
        let rotation = parse_rotation(&required(PRINTER_ROTATION))?;

        let poll_interval = match get(LASTFM_POLL_INTERVAL) {
            Some(raw) => parse_poll_interval(&raw)?,
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        };

        Ok(Self {
            lastfm: LastFmConfig {
                api_key: required(LASTFM_API),
                secret: required(LASTFM_SECRET),
                user_agent: required(LASTFM_USERAGENT),
                username: required(LASTFM_USERNAME),
                poll_interval,
            },
            printer: PrinterSettings {
                device: required(PRINTER_USB),
                baud_rate,
                rotation,
            },
            images_dir: get(IMAGES_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("images")),
            fonts_dir: get(FONTS_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("fonts")),
        })
    }
}

fn parse_baud_rate(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(rate) if rate > 0 => Ok(rate),
        _ => Err(ScrobblePrintError::ConfigurationInvalid {
            key: PRINTER_BAUDRATE,
            value: raw.to_string(),
            reason: "expected a positive integer".to_string(),
        }),
    }
}

/// Parse a rotation in degrees and normalize it into `0..360`.
///
/// Negative values are accepted (`-90` is `270`). Only quarter turns are
/// allowed because the canvas is square and must stay printer-width.
pub fn parse_rotation(raw: &str) -> Result<u16> {
    let invalid = |reason: &str| ScrobblePrintError::ConfigurationInvalid {
        key: PRINTER_ROTATION,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let degrees: i32 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected an integer number of degrees"))?;
    if degrees % 90 != 0 {
        return Err(invalid("rotation must be a multiple of 90"));
    }
    Ok(degrees.rem_euclid(360) as u16)
}

fn parse_poll_interval(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ScrobblePrintError::ConfigurationInvalid {
            key: LASTFM_POLL_INTERVAL,
            value: raw.to_string(),
            reason: "expected a positive number of seconds".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (LASTFM_API, "key".to_string()),
            (LASTFM_SECRET, "secret".to_string()),
            (LASTFM_USERAGENT, "scrobbleprint/test".to_string()),
            (LASTFM_USERNAME, "someone".to_string()),
            (PRINTER_USB, "/dev/ttyUSB0".to_string()),
            (PRINTER_BAUDRATE, "19200".to_string()),
            (PRINTER_ROTATION, "180".to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<Config> {
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_complete_environment() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.lastfm.api_key, "key");
        assert_eq!(config.lastfm.username, "someone");
        assert_eq!(config.lastfm.poll_interval, Duration::from_secs(10));
        assert_eq!(config.printer.device, "/dev/ttyUSB0");
        assert_eq!(config.printer.baud_rate, 19200);
        assert_eq!(config.printer.rotation, 180);
        assert_eq!(config.images_dir, PathBuf::from("images"));
        assert_eq!(config.fonts_dir, PathBuf::from("fonts"));
    }

    #[test]
    fn test_each_required_key_is_fatal() {
        for key in REQUIRED_KEYS {
            let mut env = full_env();
            env.remove(key);
            match load(&env) {
                Err(ScrobblePrintError::ConfigurationMissing(missing)) => {
                    assert_eq!(missing, vec![key]);
                }
                other => panic!("expected missing {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut env = full_env();
        env.insert(LASTFM_SECRET, String::new());
        assert!(matches!(
            load(&env),
            Err(ScrobblePrintError::ConfigurationMissing(ref keys)) if keys == &vec![LASTFM_SECRET]
        ));
    }

    #[test]
    fn test_whitespace_value_is_kept() {
        let mut env = full_env();
        env.insert(LASTFM_SECRET, "  ".to_string());
        let config = load(&env).unwrap();
        assert_eq!(config.lastfm.secret, "  ");
    }

    #[test]
    fn test_all_missing_reported_together() {
        match Config::from_lookup(|_| None) {
            Err(ScrobblePrintError::ConfigurationMissing(missing)) => {
                assert_eq!(missing, REQUIRED_KEYS.to_vec());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_baud_rate() {
        let mut env = full_env();
        env.insert(PRINTER_BAUDRATE, "fast".to_string());
        assert!(matches!(
            load(&env),
            Err(ScrobblePrintError::ConfigurationInvalid { key: PRINTER_BAUDRATE, .. })
        ));
    }

    #[test]
    fn test_rotation_normalization() {
        assert_eq!(parse_rotation("0").unwrap(), 0);
        assert_eq!(parse_rotation("90").unwrap(), 90);
        assert_eq!(parse_rotation("-90").unwrap(), 270);
        assert_eq!(parse_rotation("450").unwrap(), 90);
        assert_eq!(parse_rotation(" 270 ").unwrap(), 270);
        assert!(parse_rotation("45").is_err());
        assert!(parse_rotation("left").is_err());
    }

    #[test]
    fn test_optional_overrides() {
        let mut env = full_env();
        env.insert(LASTFM_POLL_INTERVAL, "30".to_string());
        env.insert(IMAGES_DIR, "/tmp/art".to_string());
        env.insert(FONTS_DIR, "/usr/share/fonts/ssp".to_string());
        let config = load(&env).unwrap();
        assert_eq!(config.lastfm.poll_interval, Duration::from_secs(30));
        assert_eq!(config.images_dir, PathBuf::from("/tmp/art"));
        assert_eq!(config.fonts_dir, PathBuf::from("/usr/share/fonts/ssp"));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut env = full_env();
        env.insert(LASTFM_POLL_INTERVAL, "0".to_string());
        assert!(load(&env).is_err());
    }
}
