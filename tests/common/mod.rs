// Shared helpers for supervisor integration tests
//
// FakeLauncher stands in for the encoder binary: every spawned "process"
// runs until the test calls `exit(id, ..)` or the supervisor terminates it.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stream_encoder::{
    EncoderConfig, EncoderProcess, ProcessExit, ProcessLauncher, RelayConfig, RestartPolicy,
    SessionStatus, SharedRegistry, SupervisorError, SupervisorSettings,
};
use tokio::sync::oneshot;

#[derive(Default)]
struct FakeState {
    exits: HashMap<String, oneshot::Sender<io::Result<ProcessExit>>>,
    spawned: Vec<String>,
    terminated: Vec<String>,
    fail_spawn: HashSet<String>,
}

#[derive(Default)]
pub struct FakeLauncher {
    state: Arc<Mutex<FakeState>>,
}

impl FakeLauncher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every spawn for `id` fail as if the binary were missing
    pub fn fail_spawn(&self, id: &str) {
        self.state.lock().unwrap().fail_spawn.insert(id.to_string());
    }

    /// End the running fake process for `id`; false if none is running
    pub fn exit(&self, id: &str, code: Option<i32>, stderr: &str) -> bool {
        let sender = self.state.lock().unwrap().exits.remove(id);
        match sender {
            Some(tx) => tx
                .send(Ok(ProcessExit {
                    code,
                    stderr: stderr.to_string(),
                }))
                .is_ok(),
            None => false,
        }
    }

    /// Make waiting on the running fake process for `id` fail
    pub fn lose(&self, id: &str) -> bool {
        let sender = self.state.lock().unwrap().exits.remove(id);
        match sender {
            Some(tx) => tx
                .send(Err(io::Error::new(io::ErrorKind::Other, "wait interrupted")))
                .is_ok(),
            None => false,
        }
    }

    pub fn spawned(&self) -> Vec<String> {
        self.state.lock().unwrap().spawned.clone()
    }

    pub fn terminated(&self) -> Vec<String> {
        self.state.lock().unwrap().terminated.clone()
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.state.lock().unwrap().exits.contains_key(id)
    }
}

#[async_trait::async_trait]
impl ProcessLauncher for FakeLauncher {
    fn build_arguments(&self, config: &EncoderConfig) -> Result<Vec<String>, SupervisorError> {
        if config.format == "bogus" {
            return Err(SupervisorError::invalid_format(&config.id, "unsupported format 'bogus'"));
        }
        Ok(vec![config.id.clone()])
    }

    async fn spawn(&self, _binary: &Path, args: &[String]) -> io::Result<Box<dyn EncoderProcess>> {
        let id = args[0].clone();
        let mut state = self.state.lock().unwrap();

        if state.fail_spawn.contains(&id) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "fake-encoder: not found"));
        }

        let (tx, rx) = oneshot::channel();
        state.exits.insert(id.clone(), tx);
        state.spawned.push(id.clone());

        Ok(Box::new(FakeProcess {
            id,
            rx,
            state: Arc::clone(&self.state),
        }))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct FakeProcess {
    id: String,
    rx: oneshot::Receiver<io::Result<ProcessExit>>,
    state: Arc<Mutex<FakeState>>,
}

#[async_trait::async_trait]
impl EncoderProcess for FakeProcess {
    fn pid(&self) -> Option<u32> {
        None
    }

    async fn wait(&mut self) -> io::Result<ProcessExit> {
        match (&mut self.rx).await {
            Ok(result) => result,
            Err(_) => std::future::pending().await,
        }
    }

    async fn terminate(&mut self, _grace: Duration) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.exits.remove(&self.id);
        state.terminated.push(self.id.clone());
        Ok(())
    }
}

pub fn encoder(id: &str) -> EncoderConfig {
    EncoderConfig {
        id: id.to_string(),
        capture_device: "hw:0,0".to_string(),
        format: "mp3".to_string(),
        bitrate: 128,
        channels: 2,
        sample_rate: 44100,
        audio_filter: None,
        raw_args: None,
        relay: RelayConfig {
            server: "relay.local:8000".to_string(),
            mount: id.to_string(),
            user: "source".to_string(),
            password: "secret".to_string(),
        },
    }
}

/// Reference timings: 5s after a clean exit, 20s otherwise
pub fn settings() -> SupervisorSettings {
    SupervisorSettings {
        binary_path: PathBuf::from("fake-encoder"),
        policy: RestartPolicy::default(),
        tick_interval: Duration::from_secs(1),
        reload_interval: Duration::from_secs(30),
    }
}

pub async fn status_of(registry: &SharedRegistry, id: &str) -> Option<SessionStatus> {
    registry.read().await.find(id).map(|s| s.status)
}

/// Poll until `id` reaches `status`, in 10ms steps, for at most 2s
pub async fn wait_for_status(registry: &SharedRegistry, id: &str, status: SessionStatus) {
    for _ in 0..200 {
        if status_of(registry, id).await == Some(status) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "session {} never reached {} (now {:?})",
        id,
        status,
        status_of(registry, id).await
    );
}
