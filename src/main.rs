use anyhow::{Context, Result};
use clap::Parser;
use lift_replays::{
    create_router, AppState, Config, FfmpegTranscoder, FileOrganizer, LoggingControl, ObsClient,
    Recorder, RemoteControl, StateStore, StatusBoard, TrimExecutor,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn, Level};

#[derive(Debug, Parser)]
#[command(name = "lift-replays", about = "Records, trims and files lift replays from OBS")]
struct Args {
    /// Path to the configuration file (created with defaults if missing)
    #[arg(long, default_value = "config/lift-replays.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log control actions instead of sending them to OBS
    #[arg(long)]
    no_video: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let cfg = Config::load_or_create(&args.config)?;

    info!("Lift Replays v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Capture directory: {}", cfg.capture_dir().display());
    info!("Videos will be stored in: {}", cfg.video_dir().display());

    let video_dir = cfg.video_dir();
    std::fs::create_dir_all(&video_dir)
        .with_context(|| format!("Failed to create video directory {}", video_dir.display()))?;

    let obs = if args.no_video {
        info!("--no-video: control actions are logged, not sent");
        None
    } else {
        Some(Arc::new(
            ObsClient::connect(&cfg.obs.url, cfg.handshake_timeout())
                .await
                .context("Failed to connect to OBS WebSocket")?,
        ))
    };
    let control: Arc<dyn RemoteControl> = match &obs {
        Some(client) => client.clone() as Arc<dyn RemoteControl>,
        None => Arc::new(LoggingControl),
    };

    let transcoder = FfmpegTranscoder::new(&cfg.transcoder.path);
    info!("Transcoder: {}", transcoder.path().display());
    let executor = Arc::new(TrimExecutor::new(Arc::new(transcoder), cfg.retry_policy()));
    let organizer = FileOrganizer::new(
        video_dir,
        cfg.recording.placement,
        cfg.recording.output_extension.clone(),
    );
    let status = StatusBoard::new();

    let recorder = Recorder::new(
        control,
        StateStore::new(),
        executor,
        organizer,
        Arc::new(status.clone()),
        cfg.recorder_settings(),
    );

    let (events_tx, events_rx) = mpsc::channel(100);
    let recorder_task = tokio::spawn(recorder.clone().run(events_rx));

    let app = create_router(AppState::new(events_tx, status));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // The router held the last event sender; its drop lets the loop drain
    info!("Shutting down");
    recorder.force_stop().await;
    recorder_task.await.context("Recorder task panicked")?;

    if let Some(client) = obs {
        if let Err(e) = client.close().await {
            warn!("Failed to close OBS connection: {}", e);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
