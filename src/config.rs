use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use cross_xdg::BaseDirs;
use tracing::debug;

use crate::error::TraceError;

pub const DEFAULT_WRAP_WIDTH: usize = 78;
pub const DELAY_ENV: &str = "BF_TRACE_DELAY";
pub const MAX_STEPS_ENV: &str = "BF_TRACE_MAX_STEPS";

/// Settings for a traced run.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceConfig {
    /// Pause between two steps.
    pub delay: Duration,
    /// Width at which the code view wraps.
    pub wrap_width: usize,
    /// Highlight the current cell and instruction with ANSI colours.
    pub color: bool,
    /// Clear the screen before each frame.
    pub clear: bool,
    /// Abort after this many instructions.
    pub max_steps: Option<usize>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            wrap_width: DEFAULT_WRAP_WIDTH,
            color: true,
            clear: true,
            max_steps: None,
        }
    }
}

/// Parse a delay given in (possibly fractional) seconds.
pub fn parse_delay(value: &str) -> Result<Duration, TraceError> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| TraceError::InvalidDelay(value.to_string()))?;
    Duration::try_from_secs_f64(secs).map_err(|_| TraceError::InvalidDelay(value.to_string()))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl TraceConfig {
    /// Defaults, overlaid with the user config file, overlaid with the environment.
    /// Command-line flags are applied on top by the caller.
    pub fn load() -> Self {
        let mut cfg = Self::default();
        if let Some(content) = config_path().and_then(|p| fs::read_to_string(p).ok()) {
            cfg.apply_file(&content);
        }
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg
    }

    /// Apply the `[trace]` section of a config file.
    ///
    /// Very small hand-rolled parser: `key = value` pairs, `#` comments, values
    /// optionally quoted. Unknown keys and unparsable values are ignored.
    pub fn apply_file(&mut self, content: &str) {
        let mut in_trace = false;
        let mut map: HashMap<String, String> = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                in_trace = &line[1..line.len() - 1] == "trace";
                continue;
            }
            if !in_trace {
                continue;
            }
            if let Some((key, val_raw)) = line.split_once('=') {
                let val_raw = val_raw.trim();
                let val = val_raw
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(val_raw);
                map.insert(key.trim().to_string(), val.to_string());
            }
        }

        if let Some(d) = map.get("delay").and_then(|v| parse_delay(v).ok()) {
            self.delay = d;
        }
        if let Some(w) = map.get("wrap_width").and_then(|v| v.parse::<usize>().ok()) {
            self.wrap_width = w.max(1);
        }
        if let Some(c) = map.get("color").and_then(|v| parse_bool(v)) {
            self.color = c;
        }
        if let Some(c) = map.get("clear").and_then(|v| parse_bool(v)) {
            self.clear = c;
        }
        if let Some(n) = map.get("max_steps").and_then(|v| v.parse::<usize>().ok()) {
            self.max_steps = Some(n);
        }
    }

    /// Apply `BF_TRACE_DELAY` and `BF_TRACE_MAX_STEPS`, looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(d) = var(DELAY_ENV).and_then(|v| parse_delay(&v).ok()) {
            self.delay = d;
        }
        if let Some(n) = var(MAX_STEPS_ENV).and_then(|v| v.parse::<usize>().ok()) {
            self.max_steps = Some(n);
        }
        if var("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.color = false;
        }
    }
}

/// `$XDG_CONFIG_HOME/bf-trace.toml`, usually `~/.config/bf-trace.toml`.
fn config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().into_iter().next()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf-trace.toml");
    debug!(path = %path.display(), "config file");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_accepts_fractions() {
        assert_eq!(parse_delay("0.25").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_delay("2").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_delay("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn delay_rejects_garbage_and_negatives() {
        assert!(matches!(parse_delay("soon"), Err(TraceError::InvalidDelay(_))));
        assert!(matches!(parse_delay("-1"), Err(TraceError::InvalidDelay(_))));
        assert!(matches!(parse_delay("inf"), Err(TraceError::InvalidDelay(_))));
    }

    #[test]
    fn file_values_only_come_from_trace_section() {
        let mut cfg = TraceConfig::default();
        cfg.apply_file(
            r#"
            # shared config
            [colors]
            delay = 9

            [trace]
            delay = "0.5"
            wrap_width = 40
            color = false
            clear = no
            max_steps = 1000
            "#,
        );
        assert_eq!(cfg.delay, Duration::from_millis(500));
        assert_eq!(cfg.wrap_width, 40);
        assert!(!cfg.color);
        assert!(!cfg.clear);
        assert_eq!(cfg.max_steps, Some(1000));
    }

    #[test]
    fn bad_file_values_keep_defaults() {
        let mut cfg = TraceConfig::default();
        cfg.apply_file("[trace]\ndelay = later\nwrap_width = wide\ncolor = maybe\n");
        assert_eq!(cfg, TraceConfig::default());
    }

    #[test]
    fn env_overrides_file() {
        let mut cfg = TraceConfig::default();
        cfg.apply_file("[trace]\ndelay = 3\n");
        cfg.apply_env(|key| match key {
            DELAY_ENV => Some("0.1".to_string()),
            MAX_STEPS_ENV => Some("77".to_string()),
            "NO_COLOR" => Some("1".to_string()),
            _ => None,
        });
        assert_eq!(cfg.delay, Duration::from_millis(100));
        assert_eq!(cfg.max_steps, Some(77));
        assert!(!cfg.color);
    }
}
