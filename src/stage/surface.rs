//! Render surface handle.
//!
//! The drawable target the stage composites into. Besides its size it carries the CSS-like
//! background shown behind the transparent clear colour, the loading overlay, and a teardown
//! flag that in-flight builds check before wiring their results.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::BackgroundSettings;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackgroundStyle {
    pub image: Option<String>,
    pub size: String,
    pub position: String,
    pub repeat: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadingOverlay {
    pub visible: bool,
    pub text: String,
}

#[derive(Debug, Default)]
struct SurfaceState {
    width: u32,
    height: u32,
    background: BackgroundStyle,
    overlay: LoadingOverlay,
}

struct SurfaceInner {
    id: Uuid,
    label: String,
    torn_down: AtomicBool,
    state: Mutex<SurfaceState>,
}

/// Shared handle to a render surface. Clones refer to the same surface.
#[derive(Clone)]
pub struct RenderSurface {
    inner: Arc<SurfaceInner>,
}

impl fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSurface")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("torn_down", &self.is_torn_down())
            .finish_non_exhaustive()
    }
}

impl RenderSurface {
    #[must_use]
    pub fn new(label: &str, width: u32, height: u32) -> Self {
        Self {
            inner: Arc::new(SurfaceInner {
                id: Uuid::new_v4(),
                label: label.to_string(),
                torn_down: AtomicBool::new(false),
                state: Mutex::new(SurfaceState {
                    width,
                    height,
                    ..SurfaceState::default()
                }),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        let state = self.inner.state.lock();
        (state.width, state.height)
    }

    /// Marks the owning view as gone. Builds still in flight will discard their results.
    pub fn tear_down(&self) {
        if !self.inner.torn_down.swap(true, Ordering::AcqRel) {
            log::info!("Render surface '{}' torn down", self.inner.label);
        }
    }

    #[inline]
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::Acquire)
    }

    // === Background ===

    #[must_use]
    pub fn background(&self) -> BackgroundStyle {
        self.inner.state.lock().background.clone()
    }

    /// Applies size/position/repeat and the first configured image, returning the replaced style.
    pub fn apply_background(&self, settings: &BackgroundSettings) -> BackgroundStyle {
        self.set_background(BackgroundStyle {
            image: settings.image.first().cloned(),
            size: settings.size.clone(),
            position: settings.position.clone(),
            repeat: settings.repeat.clone(),
        })
    }

    pub fn set_background(&self, style: BackgroundStyle) -> BackgroundStyle {
        std::mem::replace(&mut self.inner.state.lock().background, style)
    }

    pub fn set_background_image(&self, image: &str) {
        self.inner.state.lock().background.image = Some(image.to_string());
    }

    // === Loading overlay ===

    #[must_use]
    pub fn loading_overlay(&self) -> LoadingOverlay {
        self.inner.state.lock().overlay.clone()
    }

    pub fn show_loading_ui(&self) {
        self.inner.state.lock().overlay.visible = true;
    }

    pub fn set_loading_text(&self, text: &str) {
        text.clone_into(&mut self.inner.state.lock().overlay.text);
    }

    pub fn hide_loading_ui(&self) {
        let mut state = self.inner.state.lock();
        state.overlay.visible = false;
        state.overlay.text.clear();
    }
}
