//! Kagami - Webcam-driven face retargeting service
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kagami::{
    config::Config,
    pipeline::FrameGate,
    retarget::{self, pose::RotationSample},
    rig::loader,
    tracking::{
        remote::RemoteTracker,
        subprocess::{check_tracker_available, TrackerSubprocess},
    },
    web::WebServer,
    AppState,
};

/// Kagami - Webcam-driven face retargeting for rigged 3D avatars
#[derive(Parser, Debug)]
#[command(name = "kagami", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Avatar to load on startup (overrides config)
    #[arg(short, long)]
    avatar: Option<String>,

    /// List configured avatars and exit
    #[arg(long)]
    list_avatars: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Do not auto-launch the tracker subprocess
    #[arg(long)]
    no_launch: bool,

    /// Disable HTTP server
    #[arg(long)]
    no_http: bool,

    /// HTTP server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", kagami::NAME, kagami::VERSION);

    // Handle list-avatars mode
    if args.list_avatars {
        list_avatars(&args)?;
        return Ok(());
    }

    let state = setup_and_spawn_services(&args).await?;

    // Wait for Ctrl+C / SIGTERM
    shutdown_signal().await;
    info!("Shutdown signal received");
    state.shutdown();

    // Give tasks a moment to clean up
    tokio::time::sleep(Duration::from_millis(500)).await;

    info!("Kagami stopped");
    Ok(())
}

/// Setup config, create AppState, and spawn all background services.
async fn setup_and_spawn_services(args: &Args) -> anyhow::Result<Arc<AppState>> {
    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    if let Some(ref avatar) = args.avatar {
        config.avatar.default = avatar.clone();
    }
    if args.no_launch {
        config.tracker.auto_launch = false;
    }
    if args.no_http {
        config.http.enabled = false;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }

    // Validate configuration
    config.validate()?;

    info!("Avatar: {}", config.avatar.default);
    info!("Tracker port: {}", config.tracker.port);
    info!("HTTP server: {}", config.http.enabled);

    if config.tracker.auto_launch && !check_tracker_available() {
        warn!("python3 cannot import mediapipe, disabling tracker auto-launch");
        config.tracker.auto_launch = false;
    }

    // Create shared application state
    let state = AppState::new(config.clone());

    // Start the tracking loop
    let tracking_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = run_tracking(tracking_state).await {
            error!("Tracking error: {}", e);
        }
    });

    // Start the animator
    let animator_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = run_animator(animator_state).await {
            error!("Animator error: {}", e);
        }
    });

    // Start HTTP server if enabled
    if config.http.enabled {
        let http_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = run_http_server(http_state).await {
                error!("HTTP server error: {}", e);
            }
        });
    }

    Ok(state)
}

fn list_avatars(args: &Args) -> anyhow::Result<()> {
    let config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    println!("Configured avatars:\n");

    let mut names: Vec<&String> = config.avatar.library.keys().collect();
    names.sort();

    for name in names {
        if *name == config.avatar.default {
            println!("  * {} (default)", name);
        } else {
            println!("    {}", name);
        }
    }

    Ok(())
}

/// Receive tracker frames, gate them by capture time, and feed fresh
/// detections into the shared expression buffer.
async fn run_tracking(state: Arc<AppState>) -> anyhow::Result<()> {
    let config = state.config.read().await;
    let tracker_config = config.tracker.clone();
    drop(config);

    let mut shutdown_rx = state.subscribe_shutdown();

    // Optionally launch the subprocess
    let mut subprocess = if tracker_config.auto_launch {
        let mut sp = TrackerSubprocess::new(&tracker_config);
        if let Err(e) = sp.start() {
            error!("Failed to auto-launch face tracker: {}", e);
            // Continue anyway, the tracker may be running externally
        }
        // Give the tracker a moment to start sending
        tokio::time::sleep(Duration::from_secs(2)).await;
        Some(sp)
    } else {
        None
    };

    // Start the receiver
    let mut receiver = RemoteTracker::new(&tracker_config);
    receiver.start()?;

    let mut gate = FrameGate::new();
    let started = std::time::Instant::now();

    info!("Tracking started (port: {})", tracker_config.port);

    loop {
        let timestamp_ms = started.elapsed().as_millis() as i64;

        match receiver.poll_frame() {
            Ok(Some(frame)) => match gate.process(&mut receiver, &frame, timestamp_ms) {
                Ok(Some(detection)) => {
                    let rotation = RotationSample::from_matrix(&detection.transform);
                    state.update_buffer(detection.categories, rotation).await;
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Detection error: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            },
            Ok(None) => {}
            Err(e) => {
                error!("Tracker receive error: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }

        // Check subprocess health and auto-restart if needed
        if let Some(ref mut sp) = subprocess {
            if !sp.is_running() && tracker_config.auto_restart {
                info!(
                    "Face tracker subprocess crashed, restarting in {}s",
                    tracker_config.restart_delay_secs
                );
                tokio::time::sleep(Duration::from_secs(tracker_config.restart_delay_secs))
                    .await;
                if let Err(e) = sp.start() {
                    error!("Failed to restart face tracker: {}", e);
                }
            }
        }

        // Small yield to avoid busy-spinning when no data arrives
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(5)) => {}
            _ = shutdown_rx.recv() => {
                info!("Tracking shutting down");
                break;
            }
        }
    }

    // Cleanup
    receiver.stop();
    if let Some(ref mut sp) = subprocess {
        sp.stop().await;
    }

    Ok(())
}

/// Drive the rig from the held expression on a fixed tick, and reload
/// the rig when a different avatar is selected.
async fn run_animator(state: Arc<AppState>) -> anyhow::Result<()> {
    let config = state.config.read().await;
    let avatar_config = config.avatar.clone();
    let tick_hz = config.render.tick_hz;
    drop(config);

    let mut shutdown_rx = state.subscribe_shutdown();

    // Load the initial rig
    let avatar = state.get_active_avatar().await;
    let mut rig = loader::load_from_config(&avatar_config, &avatar)?;

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / tick_hz as f64));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("Animator started ({} Hz, avatar '{}')", tick_hz, rig.name);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let buffer = state.get_buffer().await;
                retarget::animate(&buffer, &mut rig);
                state.update_pose(rig.pose()).await;
            }
            _ = state.wait_avatar_changed() => {
                let name = state.get_active_avatar().await;
                let avatar_config = state.config.read().await.avatar.clone();
                match loader::load_from_config(&avatar_config, &name) {
                    Ok(new_rig) => {
                        info!("Avatar switched to '{}'", new_rig.name);
                        rig = new_rig;
                    }
                    Err(e) => {
                        error!("Failed to load avatar '{}': {}", name, e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Animator shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn run_http_server(state: Arc<AppState>) -> anyhow::Result<()> {
    use kagami::error::WebError;

    let config = state.config.read().await;
    let http_config = config.http.clone();
    drop(config);

    let web_server = WebServer::new(state.clone(), &http_config);

    let addr = format!("{}:{}", http_config.host, http_config.port);
    info!("HTTP server listening on {}", addr);

    let app = web_server.router();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WebError::Bind(format!("{}: {}", addr, e)))?;

    let mut shutdown_rx = state.subscribe_shutdown();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .map_err(|e| WebError::Startup(e.to_string()))?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
