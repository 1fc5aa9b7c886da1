//! INI parsing logic for converting `Ini` → `ViewerConfig`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;

use super::file::{ConfigFileError, ViewerConfig};
use crate::catalog::Region;
use crate::loader::{RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};

/// Parse an `Ini` object into a `ViewerConfig`.
///
/// Starts from `ViewerConfig::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ViewerConfig, ConfigFileError> {
    let mut config = ViewerConfig::default();

    // [cycling] section
    if let Some(section) = ini.section(Some("cycling")) {
        if let Some(v) = section.get("interval_ms") {
            let ms: u64 = parse_positive("cycling", "interval_ms", v)?;
            config.cycling.cycle_interval = Duration::from_millis(ms);
        }
        if let Some(v) = section.get("idle_timeout_ms") {
            let ms: u64 = parse_positive("cycling", "idle_timeout_ms", v)?;
            config.cycling.idle_timeout = Duration::from_millis(ms);
        }
        if let Some(v) = section.get("auto_start") {
            config.cycling.auto_start = parse_bool("cycling", "auto_start", v)?;
        }
        if let Some(v) = section.get("timeout_prevented") {
            config.cycling.timeout_prevented = parse_bool("cycling", "timeout_prevented", v)?;
        }
        if let Some(v) = section.get("recent_bound") {
            config.cycling.recent_bound = v.trim().parse().map_err(|_| {
                invalid("cycling", "recent_bound", v, "must be a non-negative integer")
            })?;
        }
        if let Some(v) = section.get("region") {
            let v = v.trim();
            config.cycling.region = match v {
                "" | "all" | "none" => None,
                name => Some(Region::from_str(name).map_err(|_| {
                    invalid(
                        "cycling",
                        "region",
                        name,
                        "must be one of: europe, asia, americas, africa, oceania, middle-east",
                    )
                })?),
            };
        }
    }

    // [map] section
    if let Some(section) = ini.section(Some("map")) {
        if let Some(v) = section.get("api_key") {
            let v = v.trim();
            if !v.is_empty() {
                config.loader.api_key = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("load_timeout_secs") {
            let secs: u64 = parse_positive("map", "load_timeout_secs", v)?;
            config.loader.load_timeout = Duration::from_secs(secs);
        }

        let max_attempts = section
            .get("max_attempts")
            .map(|v| parse_positive::<u32>("map", "max_attempts", v))
            .transpose()?;
        let base_delay_ms = section
            .get("retry_base_delay_ms")
            .map(|v| parse_positive::<u64>("map", "retry_base_delay_ms", v))
            .transpose()?;
        if max_attempts.is_some() || base_delay_ms.is_some() {
            config.loader.retry = RetryPolicy::linear(
                max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
                Duration::from_millis(base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS)),
            );
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(invalid(section, key, value, "must be a positive integer")),
    }
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ViewerConfig, ConfigFileError> {
        parse_ini(&Ini::load_from_str(text).unwrap())
    }

    fn assert_invalid(text: &str, expected_key: &str) {
        match parse(text) {
            Err(ConfigFileError::InvalidValue { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected invalid {}, got {:?}", expected_key, other),
        }
    }

    #[test]
    fn test_empty_ini_is_default() {
        assert_eq!(parse("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn test_cycling_section() {
        let config = parse(
            "[cycling]\ninterval_ms = 1500\nidle_timeout_ms = 8000\nauto_start = no\n\
             timeout_prevented = yes\nrecent_bound = 0\nregion = middle-east\n",
        )
        .unwrap();

        assert_eq!(config.cycling.cycle_interval, Duration::from_millis(1500));
        assert_eq!(config.cycling.idle_timeout, Duration::from_millis(8000));
        assert!(!config.cycling.auto_start);
        assert!(config.cycling.timeout_prevented);
        assert_eq!(config.cycling.recent_bound, 0);
        assert_eq!(config.cycling.region, Some(Region::MiddleEast));
    }

    #[test]
    fn test_region_all_means_unrestricted() {
        let config = parse("[cycling]\nregion = all\n").unwrap();
        assert_eq!(config.cycling.region, None);
    }

    #[test]
    fn test_map_section() {
        let config = parse(
            "[map]\napi_key =  AIzaSyA-very_long_test_key \nload_timeout_secs = 20\n\
             max_attempts = 4\nretry_base_delay_ms = 250\n",
        )
        .unwrap();

        assert_eq!(config.loader.api_key.as_deref(), Some("AIzaSyA-very_long_test_key"));
        assert_eq!(config.loader.load_timeout, Duration::from_secs(20));
        assert_eq!(
            config.loader.retry,
            RetryPolicy::linear(4, Duration::from_millis(250))
        );
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = parse("[map]\napi_key =   \n").unwrap();
        assert!(config.loader.api_key.is_none());
    }

    #[test]
    fn test_partial_retry_keeps_other_default() {
        let config = parse("[map]\nmax_attempts = 6\n").unwrap();
        assert_eq!(
            config.loader.retry,
            RetryPolicy::linear(6, Duration::from_millis(DEFAULT_BASE_DELAY_MS))
        );
    }

    #[test]
    fn test_logging_section_expands_tilde() {
        let config = parse("[logging]\ndirectory = ~/carousel-logs\nfile = viewer.log\n").unwrap();
        assert_eq!(config.logging.file, "viewer.log");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.logging.directory, home.join("carousel-logs"));
        }
    }

    #[test]
    fn test_invalid_values_name_the_key() {
        assert_invalid("[cycling]\ninterval_ms = soon\n", "interval_ms");
        assert_invalid("[cycling]\nidle_timeout_ms = 0\n", "idle_timeout_ms");
        assert_invalid("[cycling]\nauto_start = maybe\n", "auto_start");
        assert_invalid("[cycling]\nrecent_bound = -1\n", "recent_bound");
        assert_invalid("[cycling]\nregion = atlantis\n", "region");
        assert_invalid("[map]\nmax_attempts = 0\n", "max_attempts");
        assert_invalid("[map]\nload_timeout_secs = x\n", "load_timeout_secs");
    }
}
