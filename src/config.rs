use crate::encoder::EncoderConfig;
use crate::error::SupervisorError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `STREAM_ENCODER__ENCODER__BINARY_PATH`
pub const ENV_PREFIX: &str = "STREAM_ENCODER";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub encoder: EncoderSettings,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
    #[serde(default)]
    pub encoders: Vec<EncoderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Global settings shared by every encoder session
#[derive(Debug, Clone, Deserialize)]
pub struct EncoderSettings {
    /// Path to the encoder binary; `~` and `$VAR` are expanded
    #[serde(default = "default_binary_path")]
    pub binary_path: String,
    /// ffmpeg input device type (e.g., "alsa", "pulse", "avfoundation")
    #[serde(default = "default_capture_backend")]
    pub capture_backend: String,
}

/// Timers and restart policy
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorConfig {
    /// Scheduler tick; at most one session starts per tick
    #[serde(default = "default_tick_interval", with = "humantime_serde")]
    pub tick_interval: Duration,
    /// How often the config file is re-read and reconciled
    #[serde(default = "default_reload_interval", with = "humantime_serde")]
    pub reload_interval: Duration,
    /// Exit code meaning the encoder stopped on purpose
    #[serde(default)]
    pub clean_exit_code: i32,
    #[serde(default = "default_clean_cooldown", with = "humantime_serde")]
    pub clean_cooldown: Duration,
    #[serde(default = "default_error_cooldown", with = "humantime_serde")]
    pub error_cooldown: Duration,
    /// Grace period for a terminated encoder to exit
    #[serde(default = "default_termination_timeout", with = "humantime_serde")]
    pub termination_timeout: Duration,
    /// Console status refresh
    #[serde(default = "default_console_interval", with = "humantime_serde")]
    pub console_interval: Duration,
}

impl Config {
    /// Load from `path` (extension optional) plus environment overrides
    pub fn load(path: &str) -> Result<Self, SupervisorError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;

        Ok(cfg)
    }

    /// Reject configurations the supervisor cannot run
    pub fn validate(&self) -> Result<(), SupervisorError> {
        if self.encoders.is_empty() {
            return Err(SupervisorError::configuration(
                "there are no encoders in the config",
            ));
        }

        let mut seen = HashSet::new();
        for encoder in &self.encoders {
            if encoder.id.trim().is_empty() {
                return Err(SupervisorError::configuration("encoder with empty id"));
            }
            if !seen.insert(encoder.id.as_str()) {
                return Err(SupervisorError::configuration(format!(
                    "duplicate encoder id '{}'",
                    encoder.id
                )));
            }
            if encoder.bitrate == 0 || encoder.channels == 0 || encoder.sample_rate == 0 {
                return Err(SupervisorError::configuration(format!(
                    "encoder '{}': bitrate, channels and sample_rate must be positive",
                    encoder.id
                )));
            }
        }

        if self.encoder.binary_path.trim().is_empty() {
            return Err(SupervisorError::configuration("encoder.binary_path is empty"));
        }

        Ok(())
    }

    /// `encoder.binary_path` with `~` and environment variables expanded
    pub fn binary_path(&self) -> Result<PathBuf, SupervisorError> {
        let expanded = shellexpand::full(&self.encoder.binary_path).map_err(|e| {
            SupervisorError::configuration(format!("encoder.binary_path: {}", e))
        })?;

        Ok(PathBuf::from(expanded.as_ref()))
    }
}

/// Where the supervisor gets its declared configuration from
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<Config, SupervisorError>;
}

/// Config file on disk, re-read on every `load`
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: String,
}

impl FileConfigSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<Config, SupervisorError> {
        Config::load(&self.path)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            binary_path: default_binary_path(),
            capture_backend: default_capture_backend(),
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            reload_interval: default_reload_interval(),
            clean_exit_code: 0,
            clean_cooldown: default_clean_cooldown(),
            error_cooldown: default_error_cooldown(),
            termination_timeout: default_termination_timeout(),
            console_interval: default_console_interval(),
        }
    }
}

fn default_service_name() -> String {
    "stream-encoder".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7080
}

fn default_binary_path() -> String {
    "ffmpeg".to_string()
}

fn default_capture_backend() -> String {
    "alsa".to_string()
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_reload_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_clean_cooldown() -> Duration {
    Duration::from_secs(5)
}

fn default_error_cooldown() -> Duration {
    Duration::from_secs(20)
}

fn default_termination_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_console_interval() -> Duration {
    Duration::from_secs(1)
}
