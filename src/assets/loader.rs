//! Resource Loader
//!
//! Runs the three load families of a scene build as independent futures joined by an
//! all-complete barrier:
//!
//! 1. the physics-capable animation runtime,
//! 2. one clip per configured animation (each possibly composed from several files),
//! 3. the skinned model.
//!
//! The first failure fails the whole load; values already produced by the other families are
//! dropped, which releases their device allocations. Clip results keep configuration order
//! regardless of completion order.

use std::sync::Arc;

use futures::future::try_join_all;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::animation::{AnimationRuntime, LoadedClip, PhysicsBackend};
use crate::assets::io::AssetReaderVariant;
use crate::assets::model::{LoadedModel, SkinnedModel};
use crate::assets::motion::{MotionSource, compose_clip};
use crate::assets::progress::LoadStatusBoard;
use crate::config::SceneConfiguration;
use crate::errors::{AssetError, ConstructionError, Result};
use crate::resources::{GpuResourceKind, GpuResourceTracker};

/// Task name of the model slot on the status board.
pub const MODEL_TASK: &str = "model";

// per-runtime evaluation buffers
const RUNTIME_BYTES: u64 = 256 * 1024;
// per-track evaluator state
const TRACK_BYTES: u64 = 1024;

/// Everything a successful load produced.
#[derive(Debug)]
pub struct LoadedResources {
    pub runtime: AnimationRuntime,
    /// `(name, clip)` in configuration order.
    pub clips: Vec<(String, LoadedClip)>,
    pub model: LoadedModel,
}

pub struct ResourceLoader {
    reader: AssetReaderVariant,
    tracker: GpuResourceTracker,
    board: LoadStatusBoard,
}

impl ResourceLoader {
    #[must_use]
    pub fn new(reader: AssetReaderVariant, tracker: GpuResourceTracker, board: LoadStatusBoard) -> Self {
        Self {
            reader,
            tracker,
            board,
        }
    }

    #[must_use]
    pub fn board(&self) -> &LoadStatusBoard {
        &self.board
    }

    /// Loads every resource `config` names. Returns only after all families complete.
    pub async fn load(
        &self,
        config: &SceneConfiguration,
        physics: Box<dyn PhysicsBackend>,
        surface: Uuid,
    ) -> Result<LoadedResources> {
        // slots: one per animation in configuration order, then the model
        let clip_jobs: Vec<(&str, &[String], usize)> = config
            .model
            .motion
            .iter()
            .map(|(name, files)| (name.as_str(), files.as_slice(), self.board.register(name)))
            .collect();
        let model_slot = self.board.register(MODEL_TASK);

        log::info!(
            "Loading {} animation(s) and model '{}'",
            clip_jobs.len(),
            config.model.path
        );

        let runtime = self.init_runtime(physics, surface);
        let clips = try_join_all(
            clip_jobs
                .iter()
                .map(|&(name, files, slot)| self.load_clip(name, files, slot)),
        );
        let model = self.load_model(&config.model.path, model_slot);

        let (runtime, clips, model) = futures::try_join!(runtime, clips, model)?;

        log::info!("All resources loaded ({} clips)", clips.len());
        Ok(LoadedResources {
            runtime,
            clips,
            model,
        })
    }

    async fn init_runtime(
        &self,
        mut physics: Box<dyn PhysicsBackend>,
        surface: Uuid,
    ) -> Result<AnimationRuntime> {
        physics.initialize().await.inspect_err(|e| log::error!("{e}"))?;
        let allocation = self.tracker.allocate(
            GpuResourceKind::RuntimeInstance,
            format!("AnimationRuntime_{}", physics.name()),
            RUNTIME_BYTES,
        );
        log::debug!("Animation runtime ready ({} physics)", physics.name());
        Ok(AnimationRuntime::new(physics, surface, allocation))
    }

    async fn load_clip(&self, name: &str, files: &[String], slot: usize) -> Result<(String, LoadedClip)> {
        let per_file = Mutex::new(vec![(0u64, 0u64); files.len()]);

        let reads = files.iter().enumerate().map(|(i, file)| {
            let per_file = &per_file;
            async move {
                let on_progress = move |loaded: u64, total: u64| {
                    let (loaded, total) = {
                        let mut p = per_file.lock();
                        p[i] = (loaded, total);
                        p.iter().fold((0, 0), |(l, t), &(fl, ft)| (l + fl, t + ft))
                    };
                    self.board.update(slot, loaded, total);
                };
                self.reader.read_bytes_with_progress(file, &on_progress).await
            }
        });

        let blobs = try_join_all(reads)
            .await
            .map_err(|e| self.failed(slot, name, e))?;

        let clip_name = name.to_string();
        let clip = run_blocking(move || {
            let sources = blobs
                .iter()
                .map(|bytes| MotionSource::from_slice(bytes))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(compose_clip(&clip_name, &sources))
        })
        .await
        .map_err(|e| self.failed(slot, name, e))?;

        let allocation = self.tracker.allocate(
            GpuResourceKind::ClipEvaluator,
            format!("Clip_{name}"),
            clip.tracks.len() as u64 * TRACK_BYTES,
        );
        self.board.finish(slot);
        log::debug!("Clip '{name}' ready: {} tracks, {:.2}s", clip.tracks.len(), clip.duration);

        Ok((
            name.to_string(),
            LoadedClip {
                clip: Arc::new(clip),
                allocation,
            },
        ))
    }

    async fn load_model(&self, path: &str, slot: usize) -> Result<LoadedModel> {
        let on_progress = |loaded: u64, total: u64| self.board.update(slot, loaded, total);
        let bytes = self
            .reader
            .read_bytes_with_progress(path, &on_progress)
            .await
            .map_err(|e| self.failed(slot, MODEL_TASK, e))?;

        let model = run_blocking(move || SkinnedModel::from_slice(&bytes))
            .await
            .map_err(|e| self.failed(slot, MODEL_TASK, e))?;

        let allocation = self.tracker.allocate(
            GpuResourceKind::ModelBuffers,
            format!("Model_{}", model.name),
            model.gpu_bytes(),
        );
        self.board.finish(slot);
        Ok(LoadedModel { model, allocation })
    }

    fn failed(&self, slot: usize, task: &str, source: AssetError) -> ConstructionError {
        self.board.fail(slot);
        log::error!("Failed to load {task}: {source}");
        ConstructionError::Load {
            task: task.to_string(),
            source,
        }
    }
}

/// Runs CPU-bound decoding off the async executor where threads exist.
async fn run_blocking<T, F>(f: F) -> std::result::Result<T, AssetError>
where
    F: FnOnce() -> std::result::Result<T, AssetError> + Send + 'static,
    T: Send + 'static,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::task::spawn_blocking(f).await?
    }
    #[cfg(target_arch = "wasm32")]
    {
        f()
    }
}
