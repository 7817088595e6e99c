// Test doubles shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use lift_replays::error::{ControlError, TranscodeError};
use lift_replays::status::{Phase, StatusSink};
use lift_replays::trim::{Sleeper, TranscodeJob, Transcoder};
use lift_replays::RemoteControl;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Records every action; optionally rejects one key after it has been
/// accepted `accept_first` times
#[derive(Default)]
pub struct FakeControl {
    pub calls: Mutex<Vec<String>>,
    pub reject_key: Option<String>,
    pub accept_first: usize,
}

impl FakeControl {
    pub fn rejecting(key: &str) -> Self {
        Self::rejecting_after(key, 0)
    }

    pub fn rejecting_after(key: &str, accept_first: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reject_key: Some(key.to_string()),
            accept_first,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteControl for FakeControl {
    async fn trigger_action(&self, action_id: &str) -> Result<(), ControlError> {
        let seen = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(action_id.to_string());
            calls.iter().filter(|c| c.as_str() == action_id).count()
        };
        if self.reject_key.as_deref() == Some(action_id) && seen > self.accept_first {
            return Err(ControlError::Remote {
                code: 600,
                message: format!("hotkey {} not bound", action_id),
            });
        }
        Ok(())
    }
}

/// Capture tool that writes `Camera1.<ext>` holding `take<n>` on every start
pub struct CaptureToolSim {
    pub capture_dir: PathBuf,
    pub raw_extension: String,
    pub start_key: String,
    pub takes: AtomicU32,
}

impl CaptureToolSim {
    pub fn new(capture_dir: PathBuf, raw_extension: &str) -> Self {
        Self {
            capture_dir,
            raw_extension: raw_extension.to_string(),
            start_key: "OBS_KEY_F7".to_string(),
            takes: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl RemoteControl for CaptureToolSim {
    async fn trigger_action(&self, action_id: &str) -> Result<(), ControlError> {
        if action_id == self.start_key {
            let take = self.takes.fetch_add(1, Ordering::SeqCst) + 1;
            let path = self.capture_dir.join(format!("Camera1.{}", self.raw_extension));
            tokio::fs::write(&path, format!("take{}", take))
                .await
                .map_err(|e| ControlError::Connection(e.to_string()))?;
        }
        Ok(())
    }
}

/// Copies input to output, failing the first `fail_first` runs and every run
/// whose input path contains `always_fail_on`
#[derive(Default)]
pub struct FakeTranscoder {
    pub fail_first: u32,
    pub always_fail_on: Option<String>,
    pub jobs: Mutex<Vec<TranscodeJob>>,
    pub successes: AtomicU32,
}

impl FakeTranscoder {
    pub fn failing_first(n: u32) -> Self {
        Self {
            fail_first: n,
            ..Default::default()
        }
    }

    pub fn failing_on(fragment: &str) -> Self {
        Self {
            always_fail_on: Some(fragment.to_string()),
            ..Default::default()
        }
    }

    pub fn jobs(&self) -> Vec<TranscodeJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, job: &TranscodeJob) -> Result<(), TranscodeError> {
        let run = {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.push(job.clone());
            jobs.len() as u32
        };

        let input = job.input.to_string_lossy();
        if run <= self.fail_first
            || self
                .always_fail_on
                .as_deref()
                .map_or(false, |fragment| input.contains(fragment))
        {
            return Err(TranscodeError::Failed(format!("run {} failed", run)));
        }

        tokio::fs::copy(&job.input, &job.output).await?;
        self.successes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Returns immediately and remembers what it was asked to wait
#[derive(Default)]
pub struct InstantSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl InstantSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Blocks every sleep until the test hands out a permit
pub struct GatedSleeper {
    pub permits: Semaphore,
}

impl GatedSleeper {
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(0),
        }
    }

    pub fn release(&self, sleeps: usize) {
        self.permits.add_permits(sleeps);
    }
}

#[async_trait]
impl Sleeper for GatedSleeper {
    async fn sleep(&self, _duration: Duration) {
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }
}

/// Keeps every status update in order
#[derive(Default)]
pub struct RecordingSink {
    pub updates: Mutex<Vec<(Phase, String)>>,
}

impl RecordingSink {
    pub fn phases(&self) -> Vec<Phase> {
        self.updates.lock().unwrap().iter().map(|(p, _)| *p).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.updates.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }
}

impl StatusSink for RecordingSink {
    fn send_status(&self, phase: Phase, message: &str) {
        self.updates.lock().unwrap().push((phase, message.to_string()));
    }
}
