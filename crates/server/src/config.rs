use std::time::Duration;

use landcover_core::analysis::DialogTimings;
use landcover_core::shell::DEFAULT_LOCATION;

/// Server settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub geocoder_url: String,
    pub geocoder_timeout: Duration,
    pub timings: DialogTimings,
    pub report_location: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |key: &str, default: Duration| {
            get(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };
        let defaults = DialogTimings::default();

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            geocoder_url: get("GEOCODER_URL")
                .unwrap_or_else(|| "https://photon.komoot.io".to_string()),
            geocoder_timeout: get("GEOCODER_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
            timings: DialogTimings {
                loading: millis("LOADING_MS", defaults.loading),
                analyzing: millis("ANALYZING_MS", defaults.analyzing),
                reset: millis("RESET_MS", defaults.reset),
            },
            report_location: get("REPORT_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.geocoder_url, "https://photon.komoot.io");
        assert_eq!(cfg.geocoder_timeout, Duration::from_secs(10));
        assert_eq!(cfg.timings, DialogTimings::default());
        assert_eq!(cfg.report_location, "Chittagong, Bangladesh");
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let cfg = config(&[
            ("LOADING_MS", "10"),
            ("ANALYZING_MS", "not-a-number"),
            ("GEOCODER_URL", "http://127.0.0.1:2322"),
        ]);
        assert_eq!(cfg.timings.loading, Duration::from_millis(10));
        assert_eq!(cfg.timings.analyzing, Duration::from_millis(4000));
        assert_eq!(cfg.geocoder_url, "http://127.0.0.1:2322");
    }
}
