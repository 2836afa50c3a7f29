//! Kagami - Webcam-driven face retargeting for rigged 3D avatars
//!
//! A headless Rust service that:
//! - Receives face tracking frames (blendshape scores + head transform) over UDP
//! - Deduplicates frames by capture time and holds the last expression through
//!   tracking dropouts
//! - Retargets expression scores onto ReadyPlayerMe-style GLB rigs with damped
//!   head/neck/spine rotation
//! - Publishes the animated rig pose over HTTP and SSE

pub mod config;
pub mod error;
pub mod expression;
pub mod pipeline;
pub mod retarget;
pub mod rig;
pub mod tracking;
pub mod web;

pub use config::Config;
pub use error::{KagamiError, Result};

use std::sync::Arc;
use tokio::sync::{broadcast, Notify, RwLock};

use expression::ExpressionSnapshot;
use pipeline::ExpressionBuffer;
use retarget::pose::RotationSample;
use rig::RigPose;

/// Application state shared across all components
#[derive(Debug)]
pub struct AppState {
    /// Current configuration
    pub config: RwLock<Config>,
    /// Last non-empty detection, held across tracking dropouts
    pub buffer: RwLock<ExpressionBuffer>,
    /// Most recent animated rig pose
    pub latest_pose: RwLock<Option<RigPose>>,
    /// Channel for animated rig poses, one per render tick
    pub pose_tx: broadcast::Sender<RigPose>,
    /// Shutdown signal
    pub shutdown_tx: broadcast::Sender<()>,
    /// Name of the avatar the animator should drive
    pub active_avatar: RwLock<String>,
    /// Avatar selection changed signal
    pub avatar_changed: Notify,
}

impl AppState {
    /// Create a new application state with the given configuration
    pub fn new(config: Config) -> Arc<Self> {
        let (pose_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);

        let default_avatar = config.avatar.default.clone();

        Arc::new(Self {
            config: RwLock::new(config),
            buffer: RwLock::new(ExpressionBuffer::new()),
            latest_pose: RwLock::new(None),
            pose_tx,
            shutdown_tx,
            active_avatar: RwLock::new(default_avatar),
            avatar_changed: Notify::new(),
        })
    }

    /// Replace the held expression with a fresh detection
    pub async fn update_buffer(&self, snapshot: ExpressionSnapshot, rotation: RotationSample) {
        let mut buffer = self.buffer.write().await;
        buffer.update(snapshot, rotation);
    }

    /// Get a copy of the held expression
    pub async fn get_buffer(&self) -> ExpressionBuffer {
        self.buffer.read().await.clone()
    }

    /// Store the latest rig pose and broadcast it to subscribers
    pub async fn update_pose(&self, pose: RigPose) {
        let mut current = self.latest_pose.write().await;
        *current = Some(pose.clone());
        let _ = self.pose_tx.send(pose);
    }

    /// Get the most recent rig pose, if the animator has produced one
    pub async fn get_pose(&self) -> Option<RigPose> {
        self.latest_pose.read().await.clone()
    }

    /// Subscribe to animated rig poses
    pub fn subscribe_pose(&self) -> broadcast::Receiver<RigPose> {
        self.pose_tx.subscribe()
    }

    /// Subscribe to shutdown signal
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get the name of the currently selected avatar
    pub async fn get_active_avatar(&self) -> String {
        self.active_avatar.read().await.clone()
    }

    /// Select a different avatar and signal the animator to reload.
    /// The expression buffer is left untouched so the new avatar picks up
    /// the held expression on its first tick.
    pub async fn select_avatar(&self, name: String) {
        let mut current = self.active_avatar.write().await;
        *current = name;
        drop(current);
        self.avatar_changed.notify_one();
    }

    /// Wait for an avatar selection change
    pub async fn wait_avatar_changed(&self) {
        self.avatar_changed.notified().await;
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
