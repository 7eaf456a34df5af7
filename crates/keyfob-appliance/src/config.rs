//! TOML configuration, loaded once at startup and immutable afterwards.
//!
//! Every field has a default so a missing file or a partial file works: the
//! appliance boots with sane values on first run and old config files stay
//! valid when new fields appear. The file is looked up at the path given on
//! the command line, falling back to `$XDG_CONFIG_HOME/keyfob/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory could be determined from the environment.
    #[error("could not determine config directory (set XDG_CONFIG_HOME or HOME)")]
    NoConfigDir,

    /// A file system error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema ─────────────────────────────────────────────────────────────

/// Top-level appliance configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub button: ButtonConfig,
    #[serde(default)]
    pub indicator: IndicatorConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub appliance: ApplianceConfig,
}

/// Remote command surface settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    /// IP address to bind; `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    /// Shared secret required (exact match) on gated routes. Empty disables
    /// the credential check.
    #[serde(default)]
    pub shared_secret: String,
}

/// HID bridge connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// Host running the bridge agent on the target computer.
    #[serde(default = "default_bridge_host")]
    pub target_host: String,
    #[serde(default = "default_bridge_port")]
    pub target_port: u16,
    #[serde(default = "default_reconnect_secs")]
    pub reconnect_secs: u64,
    /// Name announced in the bridge handshake.
    #[serde(default = "default_appliance_name")]
    pub appliance_name: String,
}

/// Physical button settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ButtonConfig {
    /// evdev device exposing the gpio-keys button.
    #[serde(default = "default_button_device")]
    pub device_path: String,
    /// Key code the button reports (`KEY_PROG1` in the usual overlay).
    #[serde(default = "default_button_key_code")]
    pub key_code: u16,
    /// Minimum held duration for a long press.
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
}

/// Status LED settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorConfig {
    /// sysfs LED class brightness attribute driving the indicator.
    #[serde(default = "default_led_path")]
    pub led_brightness_path: String,
}

/// Link supervision settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// Interface whose operstate is polled.
    #[serde(default = "default_interface")]
    pub interface: String,
    /// Continuous outage duration before the indicator starts flashing.
    #[serde(default = "default_fail_threshold_ms")]
    pub fail_threshold_ms: u64,
    /// Half-period of the flash square wave.
    #[serde(default = "default_flash_period_ms")]
    pub flash_period_ms: u64,
}

/// Loop and logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplianceConfig {
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_bridge_host() -> String {
    "127.0.0.1".to_string()
}
fn default_bridge_port() -> u16 {
    24900
}
fn default_reconnect_secs() -> u64 {
    5
}
fn default_appliance_name() -> String {
    "keyfob".to_string()
}
fn default_button_device() -> String {
    "/dev/input/by-path/platform-gpio-keys-event".to_string()
}
fn default_button_key_code() -> u16 {
    148 // KEY_PROG1
}
fn default_long_press_ms() -> u64 {
    2000
}
fn default_led_path() -> String {
    "/sys/class/leds/keyfob:status/brightness".to_string()
}
fn default_interface() -> String {
    "wlan0".to_string()
}
fn default_fail_threshold_ms() -> u64 {
    60_000
}
fn default_flash_period_ms() -> u64 {
    5_000
}
fn default_tick_period_ms() -> u64 {
    50
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_http_port(),
            shared_secret: String::new(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            target_host: default_bridge_host(),
            target_port: default_bridge_port(),
            reconnect_secs: default_reconnect_secs(),
            appliance_name: default_appliance_name(),
        }
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            device_path: default_button_device(),
            key_code: default_button_key_code(),
            long_press_ms: default_long_press_ms(),
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            led_brightness_path: default_led_path(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            fail_threshold_ms: default_fail_threshold_ms(),
            flash_period_ms: default_flash_period_ms(),
        }
    }
}

impl Default for ApplianceConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            log_level: default_log_level(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads configuration.
///
/// With an explicit `path` the file must exist and parse. Without one, the
/// default location is tried and a missing file yields `AppConfig::default()`.
///
/// # Errors
///
/// Returns [`ConfigError`] for unreadable files, malformed TOML, or (when no
/// path is given) an undeterminable config directory.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            info!("loaded config from {}", path.display());
            Ok(toml::from_str(&content)?)
        }
        None => {
            let path = default_config_path()?;
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    info!("loaded config from {}", path.display());
                    Ok(toml::from_str(&content)?)
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    info!("no config at {}, using defaults", path.display());
                    Ok(AppConfig::default())
                }
                Err(source) => Err(ConfigError::Io { path, source }),
            }
        }
    }
}

/// `$XDG_CONFIG_HOME/keyfob/config.toml`, falling back to `~/.config`.
fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("keyfob").join("config.toml"))
}
