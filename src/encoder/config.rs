use serde::{Deserialize, Serialize};

/// Relay (Icecast) target for one encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relay host, optionally with port (e.g., "icecast.example.org:8000")
    pub server: String,

    /// Mount point on the relay, with or without a leading slash
    pub mount: String,

    /// Source user (Icecast default: "source")
    #[serde(default = "default_relay_user")]
    pub user: String,

    pub password: String,
}

/// Configuration for one encoder session
///
/// Owned by the configuration layer; the supervisor only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Unique session identifier (e.g., "studio-a")
    pub id: String,

    /// Capture input handed to the capture backend (e.g., "hw:0" for ALSA)
    #[serde(default)]
    pub capture_device: String,

    /// Encode format: "mp3", "aac", "opus" or "vorbis"
    #[serde(default = "default_format")]
    pub format: String,

    /// Target bitrate in kbps
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,

    /// Number of output channels (1 = mono, 2 = stereo)
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Output sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Optional ffmpeg filter graph (e.g., "loudnorm=I=-16:LRA=12:TP=-1.5")
    #[serde(default)]
    pub audio_filter: Option<String>,

    /// Full argument override; replaces the generated argument vector
    #[serde(default)]
    pub raw_args: Option<Vec<String>>,

    pub relay: RelayConfig,
}

/// Display-safe view of an encoder config (no credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSummary {
    pub format: String,
    pub bitrate: u32,
    pub channels: u16,
    pub sample_rate: u32,
    pub capture_device: String,
    pub server: String,
    pub mount: String,
    pub audio_filter: Option<String>,
}

impl EncoderConfig {
    pub fn summary(&self) -> EncoderSummary {
        EncoderSummary {
            format: self.format.clone(),
            bitrate: self.bitrate,
            channels: self.channels,
            sample_rate: self.sample_rate,
            capture_device: self.capture_device.clone(),
            server: self.relay.server.clone(),
            mount: self.relay.mount.clone(),
            audio_filter: self.audio_filter.clone(),
        }
    }
}

fn default_relay_user() -> String {
    "source".to_string()
}

fn default_format() -> String {
    "mp3".to_string()
}

fn default_bitrate() -> u32 {
    128
}

fn default_channels() -> u16 {
    2
}

fn default_sample_rate() -> u32 {
    44100
}
