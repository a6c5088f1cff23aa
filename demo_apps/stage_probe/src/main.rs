//! Stage probe
//!
//! Usage: `stage_probe <asset-root> [scene.json] [animation]`
//!
//! Builds a scene from the filesystem, plays the requested animation through the reply
//! fallback and renders frames at 60 Hz for a few seconds, logging progress along the way.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use avatar_stage::stage::{LightingState, SceneUpdate};
use avatar_stage::utils::FrameClock;
use avatar_stage::{
    FileAssetReader, RenderSurface, SceneBuilder, SceneConfiguration, ShadowQuality,
    apply_reply_motion,
};

const FRAME: Duration = Duration::from_millis(16);
const RUN_FOR: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let root = args.next().unwrap_or_else(|| ".".to_string());
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            SceneConfiguration::from_json(&text).with_context(|| format!("parsing {path}"))?
        }
        None => SceneConfiguration::default(),
    };
    let requested = args.next();

    let surface = RenderSurface::new("probe", 1280, 720);
    let builder = SceneBuilder::new(config, Arc::new(FileAssetReader::new(&root)));
    let status = builder.status();
    let progress = tokio::spawn(async move {
        while let Ok(text) = status.recv_async().await {
            log::debug!("\n{text}");
        }
    });

    let mut scene = builder.build(&surface).await.context("building scene")?;
    progress.abort();
    log::info!("Animations: {:?}", scene.available_animations());

    if let Some(playing) = apply_reply_motion(&mut scene, requested.as_deref()) {
        log::info!("Playing '{playing}'");
    }

    scene.update_scene(&SceneUpdate {
        lighting: Some(LightingState {
            intensity: 2.1,
            direction: [0.5, -1.0, 1.0].into(),
            color: [1.0, 1.0, 1.0].into(),
            ambient: 0.5,
            shadow_enabled: true,
            shadow_quality: ShadowQuality::High,
        }),
        ..SceneUpdate::default()
    });

    let mut clock = FrameClock::new();
    let mut interval = tokio::time::interval(FRAME);
    while clock.elapsed() < RUN_FOR {
        interval.tick().await;
        scene.render_frame(clock.tick());
    }

    log::info!(
        "Rendered {} frames, {} live allocations ({} bytes)",
        scene.frames_rendered(),
        scene.tracker().live_count(),
        scene.tracker().live_bytes()
    );
    log::info!("{}", serde_json::to_string_pretty(&SceneUpdate::reset_defaults())?);

    scene.dispose();
    Ok(())
}
