//! farsight: out-of-process Unreal Engine object reader
//!
//! This library reads a running Unreal Engine game's memory from another
//! process, rebuilds the parts of its object graph an overlay needs (camera,
//! player pawns, bone transforms) and projects world positions onto a
//! viewport.
//!
//! # Architecture
//!
//! - **Platform Layer**: Abstracts process discovery and memory access
//! - **Memory Layer**: Fail-soft typed reads and remote array views over a session
//! - **Engine Layer**: Target structure layouts and the object graph walker
//! - **Math / Transform / Projection**: Matrix composition and world-to-screen
//! - **Config**: Offset tables keyed by target build
//! - **Offset Finder**: Offline discovery of build-specific offsets

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod math;
pub mod memory;
pub mod offset_finder;
pub mod platform;
pub mod projection;
pub mod transform;

// Re-export commonly used types
pub use config::{OffsetConfig, OffsetTable, TargetProfile};
pub use engine::world::{Actor, FrameSnapshot, ProjectedActor, World};
pub use engine::{Camera, Transform};
pub use math::{Matrix4, Quat, Rotator, Vector2, Vector3};
pub use memory::{RemoteArrayView, Session};
pub use platform::{MemoryReader, Platform};
pub use projection::{project, project_bone, BoneProjection, ScaleBasis, Viewport};
pub use transform::resolve_world_position;

/// Result type used throughout the library
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type
///
/// Only session setup and configuration loading fail. Per-frame reads are
/// fail-soft and never produce one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Platform-specific error, including a missing or unopenable target
    #[error("Platform error: {0}")]
    Platform(#[from] platform::PlatformError),

    /// No offset table for the requested build
    #[error("No offset table for build {0:?}")]
    UnknownBuild(String),

    /// Malformed offset config
    #[error("Invalid offset config: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging for the library
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("farsight=info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();
}
