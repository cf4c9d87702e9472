use super::config::EncoderConfig;
use super::launcher::{EncoderProcess, ProcessExit, ProcessLauncher};
use crate::error::SupervisorError;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Encode formats the relay accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Aac,
    Opus,
    Vorbis,
}

impl AudioFormat {
    pub fn parse(format: &str) -> Option<Self> {
        match format.trim().to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "aac" => Some(Self::Aac),
            "opus" => Some(Self::Opus),
            "vorbis" | "ogg" => Some(Self::Vorbis),
            _ => None,
        }
    }

    pub fn codec(self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::Aac => "aac",
            Self::Opus => "libopus",
            Self::Vorbis => "libvorbis",
        }
    }

    pub fn container(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Aac => "adts",
            Self::Opus | Self::Vorbis => "ogg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Aac => "audio/aac",
            Self::Opus | Self::Vorbis => "audio/ogg",
        }
    }
}

/// Launches ffmpeg, capturing from `capture_backend` and pushing to Icecast
pub struct FfmpegLauncher {
    capture_backend: String,
}

impl FfmpegLauncher {
    pub fn new(capture_backend: impl Into<String>) -> Self {
        Self {
            capture_backend: capture_backend.into(),
        }
    }

    /// Icecast URL with percent-encoded credentials
    pub fn relay_url(config: &EncoderConfig) -> String {
        let relay = &config.relay;
        format!(
            "icecast://{}:{}@{}/{}",
            utf8_percent_encode(&relay.user, NON_ALPHANUMERIC),
            utf8_percent_encode(&relay.password, NON_ALPHANUMERIC),
            relay.server.trim(),
            relay.mount.trim().trim_start_matches('/'),
        )
    }

    fn check_required(config: &EncoderConfig) -> Result<(), SupervisorError> {
        let required = [
            ("capture_device", &config.capture_device),
            ("relay.server", &config.relay.server),
            ("relay.mount", &config.relay.mount),
            ("relay.password", &config.relay.password),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(SupervisorError::invalid_format(
                    &config.id,
                    format!("missing required field `{}`", field),
                ));
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl ProcessLauncher for FfmpegLauncher {
    fn build_arguments(&self, config: &EncoderConfig) -> Result<Vec<String>, SupervisorError> {
        if let Some(raw) = config.raw_args.as_ref().filter(|raw| !raw.is_empty()) {
            return Ok(raw.clone());
        }

        let format = AudioFormat::parse(&config.format).ok_or_else(|| {
            SupervisorError::invalid_format(
                &config.id,
                format!("unsupported format '{}'", config.format),
            )
        })?;

        Self::check_required(config)?;

        let mut argv: Vec<String> = Vec::with_capacity(32);
        let mut push = |items: &[&str]| argv.extend(items.iter().map(|s| s.to_string()));

        push(&["-hide_banner", "-nostdin", "-nostats", "-loglevel", "info"]);
        push(&["-f", self.capture_backend.as_str(), "-i", config.capture_device.as_str()]);

        if let Some(filter) = config.audio_filter.as_deref().filter(|f| !f.trim().is_empty()) {
            push(&["-af", filter]);
        }

        push(&["-muxdelay", "1", "-muxpreload", "1"]);
        push(&["-c:a", format.codec()]);
        push(&["-b:a", format!("{}k", config.bitrate).as_str()]);
        push(&["-ac", config.channels.to_string().as_str()]);
        push(&["-ar", config.sample_rate.to_string().as_str()]);
        push(&["-content_type", format.content_type()]);
        push(&["-f", format.container()]);
        push(&[Self::relay_url(config).as_str()]);

        Ok(argv)
    }

    async fn spawn(&self, binary: &Path, args: &[String]) -> io::Result<Box<dyn EncoderProcess>> {
        let process = FfmpegProcess::spawn(binary, args)?;
        Ok(Box::new(process))
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Most recent stderr kept per encoder
pub const STDERR_TAIL_BYTES: usize = 64 * 1024;

/// How long `wait` keeps draining stderr once the child has exited
const STDERR_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest single stderr line before it is cut
const MAX_LINE_BYTES: usize = 4 * 1024;

/// Rolling tail of an encoder's stderr, one line per `\n`
#[derive(Debug, Default)]
struct StderrTail {
    text: String,
}

impl StderrTail {
    fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');

        // Trim in batches
        if self.text.len() > 2 * STDERR_TAIL_BYTES {
            self.trim();
        }
    }

    fn trim(&mut self) {
        if self.text.len() <= STDERR_TAIL_BYTES {
            return;
        }
        let mut cut = self.text.len() - STDERR_TAIL_BYTES;
        while !self.text.is_char_boundary(cut) {
            cut += 1;
        }
        self.text.drain(..cut);
    }

    fn take(&mut self) -> String {
        self.trim();
        std::mem::take(&mut self.text)
    }
}

/// Handle to a spawned encoder process
///
/// The child is spawned with `kill_on_drop`, so dropping the handle on any
/// exit path takes the process down with it.
pub struct FfmpegProcess {
    child: Child,
    pid: Option<u32>,
    stderr: Arc<Mutex<StderrTail>>,
    stderr_task: Option<JoinHandle<()>>,
}

impl FfmpegProcess {
    /// Spawn `binary` with piped stdout/stderr
    pub fn spawn(binary: &Path, args: &[String]) -> io::Result<Self> {
        let mut child = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let pid = child.id();
        info!("Spawned {} (pid {:?})", binary.display(), pid);

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("[encoder {:?} stdout] {}", pid, line);
                }
            });
        }

        let stderr = Arc::new(Mutex::new(StderrTail::default()));
        let stderr_task = child
            .stderr
            .take()
            .map(|pipe| tokio::spawn(collect_stderr(pipe, Arc::clone(&stderr), pid)));

        Ok(Self {
            child,
            pid,
            stderr,
            stderr_task,
        })
    }

    fn captured_stderr(&self) -> String {
        match self.stderr.lock() {
            Ok(mut tail) => tail.take(),
            Err(_) => String::new(),
        }
    }
}

/// Read stderr until EOF, splitting lines on `\n` or `\r` (ffmpeg's
/// progress output) and logging each one
async fn collect_stderr(
    pipe: impl AsyncRead + Unpin,
    tail: Arc<Mutex<StderrTail>>,
    pid: Option<u32>,
) {
    let mut reader = BufReader::new(pipe);
    let mut chunk = [0u8; 4096];
    let mut line: Vec<u8> = Vec::new();

    let flush = |line: &mut Vec<u8>| {
        if line.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(line);
        debug!("[encoder {:?}] {}", pid, text);
        if let Ok(mut tail) = tail.lock() {
            tail.push_line(&text);
        }
        line.clear();
    };

    loop {
        let read = match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };

        for &byte in &chunk[..read] {
            match byte {
                b'\n' | b'\r' => flush(&mut line),
                _ => {
                    line.push(byte);
                    if line.len() >= MAX_LINE_BYTES {
                        flush(&mut line);
                    }
                }
            }
        }
    }

    flush(&mut line);
}

#[async_trait::async_trait]
impl EncoderProcess for FfmpegProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    async fn wait(&mut self) -> io::Result<ProcessExit> {
        let status = self.child.wait().await?;

        // A descendant may still hold the pipe open; don't let it delay the exit
        if let Some(mut task) = self.stderr_task.take() {
            if tokio::time::timeout(STDERR_DRAIN_TIMEOUT, &mut task).await.is_err() {
                debug!("stderr of encoder {:?} still open after exit", self.pid);
                task.abort();
            }
        }

        Ok(ProcessExit {
            code: status.code(),
            stderr: self.captured_stderr(),
        })
    }

    async fn terminate(&mut self, grace: Duration) -> io::Result<()> {
        if let Err(e) = self.child.start_kill() {
            // Already reaped
            if e.kind() != io::ErrorKind::InvalidInput {
                return Err(e);
            }
        }

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => status.map(|_| ()),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("process {:?} did not exit within {:?}", self.pid, grace),
            )),
        }
    }
}
