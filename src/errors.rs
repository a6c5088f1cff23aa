//! Error Types
//!
//! This module defines the error taxonomy of the avatar stage.
//!
//! # Overview
//!
//! - [`ConstructionError`]: any failure while building a scene. Fatal to that build attempt and
//!   reported once; nothing from the failed build is left wired into a live scene.
//! - [`PlaybackError`]: a requested animation could not be played. Recoverable; callers apply
//!   their own fallback policy (see [`crate::stage::reply`]).
//! - [`AssetError`]: IO, format and decode failures below the loader. These surface to callers
//!   wrapped inside [`ConstructionError::Load`].
//!
//! Parameter updates that find nothing to act on are not errors at all; they are skipped.
//!
//! ```rust,ignore
//! use avatar_stage::errors::{ConstructionError, Result};
//!
//! async fn open(builder: SceneBuilder, surface: &RenderSurface) -> Result<AvatarScene> {
//!     builder.build(surface).await
//! }
//! ```

use thiserror::Error;

/// Failures while reading or decoding a single asset.
#[derive(Error, Debug)]
pub enum AssetError {
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested asset does not exist in the reader's source.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but its contents are unusable.
    #[error("Invalid asset data: {0}")]
    InvalidData(String),

    /// Task join error (when a blocking decode task fails to complete).
    #[error("Task join error: {0}")]
    TaskJoin(String),
}

#[cfg(not(target_arch = "wasm32"))]
impl From<tokio::task::JoinError> for AssetError {
    fn from(err: tokio::task::JoinError) -> Self {
        AssetError::TaskJoin(err.to_string())
    }
}

/// Failures of the physics-capable animation runtime capability.
#[derive(Error, Debug)]
#[error("Physics runtime error: {0}")]
pub struct PhysicsError(pub String);

/// Fatal failure of a scene build.
#[derive(Error, Debug)]
pub enum ConstructionError {
    /// The configuration violates an invariant checked before any load starts.
    #[error("Invalid scene configuration: {0}")]
    InvalidConfiguration(String),

    /// One load task failed; the whole join is considered failed.
    #[error("Failed to load {task}: {source}")]
    Load {
        /// Identity of the failing task (animation name or `model`)
        task: String,
        #[source]
        source: AssetError,
    },

    /// The animation runtime could not be initialised.
    #[error("Failed to initialise animation runtime: {0}")]
    Runtime(#[from] PhysicsError),

    /// The render surface was torn down while the build was in flight.
    #[error("Render surface was torn down before the scene finished building")]
    Cancelled,
}

/// Recoverable failure of a `play` request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// No registry is attached (scene not built, or already disposed).
    #[error("Animation registry is not initialised")]
    Uninitialized,

    /// The name is not one of the loaded animations.
    #[error("Animation \"{0}\" not found")]
    UnknownAnimation(String),
}

/// Alias for `Result<T, ConstructionError>`.
pub type Result<T> = std::result::Result<T, ConstructionError>;
