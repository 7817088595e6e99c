use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::events::TimingEvent;
use super::report::AttemptReport;
use super::settings::RecorderSettings;
use crate::error::{CameraFailure, ControlError, RecordingError};
use crate::files::{discover_raw_files, format_timestamp, FileOrganizer, Placement, RawCaptureFile};
use crate::obs::{Action, RemoteControl};
use crate::state::{AttemptState, LiftType, StateStore};
use crate::status::{Phase, StatusSink};
use crate::trim::{Sleeper, TokioSleeper, TrimExecutor};

/// Directory under the capture dir where a decided attempt's raw files wait
/// for trimming, one subdirectory per attempt
pub const STAGING_DIR: &str = "processing";

/// Where the recorder is in the attempt cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPhase {
    Idle,
    /// Capture running, waiting for a decision
    Armed,
    /// Capture stopped, clips being trimmed and filed
    Trimming,
}

/// Offset into the raw capture where the clip should start.
///
/// Zero when no valid start was captured, so the raw file is kept whole.
pub fn trim_offset_ms(attempt: &AttemptState, lead_ms: i64) -> i64 {
    if !attempt.has_valid_start() {
        return 0;
    }
    attempt
        .stop_time_ms
        .saturating_sub(attempt.start_time_ms)
        .saturating_sub(lead_ms)
        .max(0)
}

/// Drives the capture tool from timing events and files the trimmed clips
///
/// Cheap to clone; clones share state, so a decision's trim pipeline can run
/// on its own task while events keep flowing.
#[derive(Clone)]
pub struct Recorder {
    control: Arc<dyn RemoteControl>,
    store: StateStore,
    executor: Arc<TrimExecutor>,
    organizer: FileOrganizer,
    status: Arc<dyn StatusSink>,
    settings: Arc<RecorderSettings>,
    sleeper: Arc<dyn Sleeper>,
    phase: Arc<Mutex<RecorderPhase>>,

    /// Serializes capture-tool calls and holds whether it may be recording.
    ///
    /// A decided attempt keeps this locked until its raw files are staged, so
    /// the next reset/start cannot write into the capture dir before then.
    capture: Arc<Mutex<bool>>,
    staged_batches: Arc<AtomicU64>,
}

impl Recorder {
    pub fn new(
        control: Arc<dyn RemoteControl>,
        store: StateStore,
        executor: Arc<TrimExecutor>,
        organizer: FileOrganizer,
        status: Arc<dyn StatusSink>,
        settings: RecorderSettings,
    ) -> Self {
        Self {
            control,
            store,
            executor,
            organizer,
            status,
            settings: Arc::new(settings),
            sleeper: Arc::new(TokioSleeper),
            phase: Arc::new(Mutex::new(RecorderPhase::Idle)),
            capture: Arc::new(Mutex::new(false)),
            staged_batches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replace the sleeper used for the post-stop settle delay
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub async fn phase(&self) -> RecorderPhase {
        *self.phase.lock().await
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Arm and start the capture tool for a new attempt
    pub async fn on_attempt_start(
        &self,
        athlete: &str,
        lift_type: LiftType,
        attempt_number: u32,
        start_time_ms: i64,
    ) -> Result<(), RecordingError> {
        match self.phase().await {
            RecorderPhase::Armed => warn!("Attempt start while already recording; re-arming"),
            RecorderPhase::Trimming => info!("Previous attempt still trimming; starting new capture"),
            RecorderPhase::Idle => {}
        }

        let started = {
            let mut recording = self.capture.lock().await;
            match self.trigger(Action::Reset).await {
                Ok(()) => {
                    *recording = true;
                    self.trigger(Action::Start).await
                }
                Err(e) => Err(e),
            }
        };

        if let Err(e) = started {
            let mut phase = self.phase.lock().await;
            if *phase == RecorderPhase::Armed {
                *phase = RecorderPhase::Idle;
            }
            drop(phase);
            self.report_failure(&format!("Failed to start recording: {}", e));
            return Err(e.into());
        }

        let attempt = self
            .store
            .update(|s| {
                s.athlete = athlete.to_string();
                s.lift_type = lift_type;
                s.attempt_number = attempt_number;
                s.start_time_ms = start_time_ms;
                s.stop_time_ms = 0;
            })
            .await;

        self.status
            .send_status(Phase::Recording, &format!("Recording: {}", attempt.describe()));
        *self.phase.lock().await = RecorderPhase::Armed;

        info!("Started recording: {}", attempt.describe());
        Ok(())
    }

    /// Stop capture and run the whole trim pipeline inline.
    ///
    /// Returns `Ok(None)` when no attempt is armed.
    pub async fn on_decision(&self, stop_time_ms: i64) -> Result<Option<AttemptReport>, RecordingError> {
        match self.stop_capture(stop_time_ms).await? {
            Some((attempt, gate)) => self.process_attempt(attempt, gate).await.map(Some),
            None => Ok(None),
        }
    }

    /// Tell the capture tool to stop, without trimming anything.
    ///
    /// Safe to call at any time. Sends Stop whenever the capture tool may
    /// still be recording, including after a failed start or stop; does
    /// nothing otherwise.
    pub async fn force_stop(&self) {
        let mut phase = self.phase.lock().await;
        let mut recording = self.capture.lock().await;

        if *recording {
            match self.trigger(Action::Stop).await {
                Ok(()) => {
                    *recording = false;
                    info!("Recording force-stopped");
                }
                Err(e) => error!("Failed to stop recording: {}", e),
            }
        } else {
            debug!("Force stop with no capture running");
        }

        if *phase == RecorderPhase::Armed {
            *phase = RecorderPhase::Idle;
        }
    }

    /// Consume events in order until the channel closes.
    ///
    /// Trim pipelines run on their own tasks so a slow transcode never
    /// delays the next attempt's start. Pending pipelines are awaited before
    /// returning.
    pub async fn run(self, mut events: mpsc::Receiver<TimingEvent>) {
        let mut pipelines = JoinSet::new();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.dispatch(event, &mut pipelines).await,
                    None => break,
                },
                Some(joined) = pipelines.join_next(), if !pipelines.is_empty() => {
                    if let Err(e) = joined {
                        error!("Trim pipeline task failed: {}", e);
                    }
                }
            }
        }

        info!("Event channel closed, waiting for {} trim pipeline(s)", pipelines.len());
        while let Some(joined) = pipelines.join_next().await {
            if let Err(e) = joined {
                error!("Trim pipeline task failed: {}", e);
            }
        }
    }

    async fn dispatch(&self, event: TimingEvent, pipelines: &mut JoinSet<()>) {
        match event {
            TimingEvent::SessionChanged { name } => {
                info!("Session changed to '{}'", name);
                self.store.update(|s| s.session_name = name).await;
            }
            TimingEvent::AttemptStart {
                athlete,
                lift_type,
                attempt_number,
                start_time_ms,
            } => {
                if let Err(e) = self
                    .on_attempt_start(&athlete, lift_type, attempt_number, start_time_ms)
                    .await
                {
                    error!("Attempt start failed: {}", e);
                }
            }
            TimingEvent::DecisionGiven { stop_time_ms } => match self.stop_capture(stop_time_ms).await {
                Ok(Some((attempt, gate))) => {
                    let recorder = self.clone();
                    pipelines.spawn(async move {
                        if let Err(e) = recorder.process_attempt(attempt, gate).await {
                            error!("Attempt processing failed: {}", e);
                        }
                    });
                }
                Ok(None) => {}
                Err(e) => error!("Stopping capture failed: {}", e),
            },
        }
    }

    /// First half of a decision: move to Trimming and stop the capture tool.
    ///
    /// Returns the attempt snapshot the pipeline should work from, plus the
    /// still-held capture gate.
    async fn stop_capture(
        &self,
        stop_time_ms: i64,
    ) -> Result<Option<(AttemptState, OwnedMutexGuard<bool>)>, RecordingError> {
        {
            let mut phase = self.phase.lock().await;
            if *phase != RecorderPhase::Armed {
                warn!("Decision received while {:?}; ignoring", *phase);
                return Ok(None);
            }
            *phase = RecorderPhase::Trimming;
        }

        let attempt = self.store.update(|s| s.stop_time_ms = stop_time_ms).await;
        self.status
            .send_status(Phase::Trimming, &format!("Trimming videos: {}", attempt.describe()));

        let mut gate = self.capture.clone().lock_owned().await;
        let stopped = match self.trigger(Action::Stop).await {
            Ok(()) => {
                *gate = false;
                self.trigger(Action::Reset).await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = stopped {
            drop(gate);
            self.report_failure(&format!("Failed to stop recording: {}", e));
            self.finish().await;
            return Err(e.into());
        }

        Ok(Some((attempt, gate)))
    }

    /// Second half of a decision: settle, trim every camera, file the clips
    async fn process_attempt(
        &self,
        attempt: AttemptState,
        gate: OwnedMutexGuard<bool>,
    ) -> Result<AttemptReport, RecordingError> {
        let result = self.trim_and_file(&attempt, gate).await;

        match &result {
            Ok(report) => {
                self.status.send_status(Phase::Ready, &report.summary());
                info!(
                    "Processed {} video(s) for {}: {:?}",
                    report.artifacts.len(),
                    attempt.describe(),
                    report.artifacts.iter().map(|a| &a.path).collect::<Vec<_>>()
                );
            }
            Err(e) => self.report_failure(&format!("{}: {}", attempt.describe(), e)),
        }

        self.finish().await;
        result
    }

    async fn trim_and_file(
        &self,
        attempt: &AttemptState,
        gate: OwnedMutexGuard<bool>,
    ) -> Result<AttemptReport, RecordingError> {
        let settings = &self.settings;

        self.sleeper.sleep(settings.settle_delay).await;

        let raw_files = discover_raw_files(&settings.capture_dir, &settings.raw_extension).await?;
        if raw_files.is_empty() {
            return Err(RecordingError::FileDiscovery {
                dir: settings.capture_dir.display().to_string(),
            });
        }

        let timestamp = format_timestamp(Local::now());
        let batch = self.staged_batches.fetch_add(1, Ordering::Relaxed) + 1;
        let staging = settings
            .capture_dir
            .join(STAGING_DIR)
            .join(format!("{}_{}", timestamp, batch));
        let mut failures = Vec::new();
        let raw_files = stage_raw_files(raw_files, &staging, &mut failures).await?;
        drop(gate);

        let offset_ms = trim_offset_ms(attempt, settings.lead_ms);
        if !attempt.has_valid_start() {
            warn!("No valid start time captured; keeping raw files untrimmed");
        }

        let session_dir = self.organizer.session_dir(&attempt.session_name).await?;
        let trimmed_dir = match self.organizer.placement() {
            // Copy leaves the trimmed clip where a live replay source reads it
            Placement::Copy => &settings.capture_dir,
            Placement::Move => &staging,
        };

        let mut artifacts = Vec::with_capacity(raw_files.len());

        for raw in raw_files {
            let trimmed = trimmed_dir.join(format!("Camera{}.{}", raw.camera, settings.output_extension));

            info!(
                "Trimming camera {} from {} ms: {}",
                raw.camera,
                offset_ms,
                attempt.describe()
            );

            if let Err(e) = self.executor.trim(&raw.path, offset_ms, &trimmed).await {
                error!("Failed to trim video for camera {}: {}", raw.camera, e);
                failures.push(CameraFailure {
                    camera: raw.camera,
                    error: e.to_string(),
                });
                continue;
            }

            match self
                .organizer
                .place(&trimmed, &session_dir, &timestamp, attempt, &raw.camera)
                .await
            {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    error!("Failed to file video for camera {}: {}", raw.camera, e);
                    failures.push(CameraFailure {
                        camera: raw.camera,
                        error: e.to_string(),
                    });
                }
            }
        }

        if let Err(e) = fs::remove_dir(&staging).await {
            debug!("Keeping staging dir {}: {}", staging.display(), e);
        }

        if artifacts.is_empty() {
            return Err(RecordingError::AllCamerasFailed { failures });
        }

        Ok(AttemptReport {
            trim_offset_ms: offset_ms,
            artifacts,
            failures,
        })
    }

    /// Back to Idle, unless a new attempt already armed the capture tool
    async fn finish(&self) {
        let mut phase = self.phase.lock().await;
        if *phase == RecorderPhase::Trimming {
            *phase = RecorderPhase::Idle;
        }
    }

    async fn trigger(&self, action: Action) -> Result<(), ControlError> {
        let key = self.settings.hotkeys.key_for(action);
        debug!("Sending {:?} ({})", action, key);
        self.control.trigger_action(key).await
    }

    fn report_failure(&self, message: &str) {
        error!("{}", message);
        self.status.send_status(Phase::Error, message);
    }
}

/// Move an attempt's raw files out of the capture dir's top level so the next
/// capture cannot be mistaken for them
async fn stage_raw_files(
    raw_files: Vec<RawCaptureFile>,
    staging: &Path,
    failures: &mut Vec<CameraFailure>,
) -> std::io::Result<Vec<RawCaptureFile>> {
    fs::create_dir_all(staging).await?;

    let mut staged = Vec::with_capacity(raw_files.len());
    for raw in raw_files {
        let Some(name) = raw.path.file_name() else {
            continue;
        };
        let path: PathBuf = staging.join(name);

        match fs::rename(&raw.path, &path).await {
            Ok(()) => staged.push(RawCaptureFile {
                path,
                camera: raw.camera,
            }),
            Err(e) => {
                error!("Failed to stage {}: {}", raw.path.display(), e);
                failures.push(CameraFailure {
                    camera: raw.camera,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(staged)
}
