//! Conversion entry points.
//!
//! Each entry point owns a scratch [`Workspace`] for the duration of the
//! call, runs its tool chain, optionally embeds pack metadata, and returns
//! either complete output bytes or the first hard failure. The workspace is
//! removed on every path out of the function.

use std::path::PathBuf;
use std::sync::Arc;

use stickerforge_core::config::{Config, WebmToWebpConfig};
use stickerforge_core::{JobId, Result};

use crate::chain::{first_success, ChainOutcome, Strategy};
use crate::command::{CommandRunner, SystemRunner, ToolCommand};
use crate::exif::MetadataEmbedder;
use crate::raster;
use crate::rasterize::{ExternalRasterizer, VectorRasterizer};
use crate::reducer::QualityReducer;
use crate::workspace::Workspace;

/// Canvas edge of WEBM video stickers.
const VIDEO_STICKER_EDGE: u32 = 512;

/// Upper bound on WEBM video sticker size, passed to ffmpeg `-fs`.
const VIDEO_STICKER_SIZE_CAP: &str = "256K";

/// Sticker converter.
///
/// Holds the injected configuration and the process seams; stateless
/// between calls and safe to share across threads.
pub struct StickerConverter {
    scratch_root: PathBuf,
    ffmpeg: PathBuf,
    convert: PathBuf,
    webm_to_webp: WebmToWebpConfig,
    reducer: QualityReducer,
    embedder: MetadataEmbedder,
    runner: Arc<dyn CommandRunner>,
    rasterizer: Arc<dyn VectorRasterizer>,
}

impl StickerConverter {
    /// Converter that runs real processes.
    pub fn new(config: &Config) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    /// Converter using `runner` for every external process, including the
    /// rasterizer configured in `config.tools.rasterizer`.
    pub fn with_runner(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        let rasterizer = Arc::new(ExternalRasterizer::new(
            config.tools.rasterizer.clone(),
            runner.clone(),
        ));
        Self::with_parts(config, runner, rasterizer)
    }

    /// Converter with explicit process and rasterizer seams.
    pub fn with_parts(
        config: &Config,
        runner: Arc<dyn CommandRunner>,
        rasterizer: Arc<dyn VectorRasterizer>,
    ) -> Self {
        Self {
            scratch_root: config.scratch.root.clone(),
            ffmpeg: config.tools.ffmpeg.clone(),
            convert: config.tools.convert.clone(),
            webm_to_webp: config.limits.webm_to_webp.clone(),
            reducer: QualityReducer::new(config.limits.reducer.clone()),
            embedder: MetadataEmbedder::new(&config.tools.webpmux, config.sticker.clone()),
            runner,
            rasterizer,
        }
    }

    fn acquire(&self, job: &JobId) -> Result<Workspace> {
        Workspace::acquire(&self.scratch_root, job)
    }

    /// TGS → animated WEBP under the size ceiling, with pack metadata.
    #[tracing::instrument(skip_all, fields(job = %job))]
    pub fn tgs_to_webp(&self, job: &JobId, tgs: &[u8]) -> Result<Vec<u8>> {
        let ws = self.acquire(job)?;
        let reduced = self
            .reducer
            .reduce(|budget| self.rasterizer.rasterize(&ws, tgs, budget))?;

        tracing::info!(
            quality = reduced.budget.quality,
            fps = reduced.budget.fps,
            attempts = reduced.attempts,
            size = reduced.data.len(),
            "tgs converted to webp"
        );
        Ok(self
            .embedder
            .embed_or_original(self.runner.as_ref(), &ws, reduced.data))
    }

    /// WEBM video → animated WEBP, with pack metadata.
    ///
    /// `scale` and `pad` are ffmpeg filter arguments; `None` uses the
    /// configured square-canvas defaults.
    #[tracing::instrument(skip_all, fields(job = %job))]
    pub fn webm_to_webp(
        &self,
        job: &JobId,
        webm: &[u8],
        scale: Option<&str>,
        pad: Option<&str>,
    ) -> Result<Vec<u8>> {
        let cfg = &self.webm_to_webp;
        let scale = scale.unwrap_or(&cfg.scale);
        let pad = pad.unwrap_or(&cfg.pad);

        let ws = self.acquire(job)?;
        let input = ws.write("input.webm", webm)?;
        let output = ws.file("output.webp");

        ToolCommand::new(&self.ffmpeg)
            .arg("-i")
            .path_arg(&input)
            .args(["-fs".to_string(), cfg.size_cap_bytes.to_string()])
            .arg("-vf")
            .arg(format!(
                "fps={},scale={scale},format=rgba,pad={pad}:color=#00000000",
                cfg.fps
            ))
            .path_arg(&output)
            .current_dir(ws.dir())
            .execute(self.runner.as_ref())?;

        let data = ws.read("output.webp")?;
        tracing::info!(size = data.len(), "webm converted to webp");
        Ok(self.embedder.embed_or_original(self.runner.as_ref(), &ws, data))
    }

    /// Animated WEBP → VP9 WEBM video sticker.
    ///
    /// Frames are coalesced into a GIF first (ImageMagick handles animated
    /// WEBP better than ffmpeg), then encoded onto a 512x512 canvas at
    /// 30 fps without audio, capped at 256 KiB.
    #[tracing::instrument(skip_all, fields(job = %job))]
    pub fn webp_to_webm(&self, job: &JobId, webp: &[u8]) -> Result<Vec<u8>> {
        let ws = self.acquire(job)?;
        let input = ws.write("input.webp", webp)?;
        let gif = ws.file("temp.gif");
        let output = ws.file("output.webm");

        ToolCommand::new(&self.convert)
            .path_arg(&input)
            .args(["-coalesce", "-loop", "0"])
            .path_arg(&gif)
            .current_dir(ws.dir())
            .execute(self.runner.as_ref())?;
        tracing::debug!("webp coalesced to gif");

        let edge = VIDEO_STICKER_EDGE;
        ToolCommand::new(&self.ffmpeg)
            .args(["-stream_loop", "-1", "-i"])
            .path_arg(&gif)
            .args(["-c:v", "libvpx-vp9", "-an", "-vf"])
            .arg(format!(
                "scale={edge}:{edge}:force_original_aspect_ratio=decrease,pad={edge}:{edge}:(ow-iw)/2:(oh-ih)/2"
            ))
            .args([
                "-r",
                "30",
                "-b:v",
                "0",
                "-crf",
                "30",
                "-deadline",
                "good",
                "-cpu-used",
                "2",
                "-fs",
                VIDEO_STICKER_SIZE_CAP,
                "-y",
            ])
            .path_arg(&output)
            .current_dir(ws.dir())
            .execute(self.runner.as_ref())?;

        let data = ws.read("output.webm")?;
        tracing::info!(size = data.len(), "webp converted to webm");
        Ok(data)
    }

    /// Animated WEBP → looping GIF.
    #[tracing::instrument(skip_all, fields(job = %job))]
    pub fn webp_to_gif(&self, job: &JobId, webp: &[u8]) -> Result<Vec<u8>> {
        let ws = self.acquire(job)?;
        let input = ws.write("input.webp", webp)?;
        let output = ws.file("output.gif");

        ToolCommand::new(&self.convert)
            .path_arg(&input)
            .args(["-loop", "0", "-dispose", "previous"])
            .path_arg(&output)
            .current_dir(ws.dir())
            .execute(self.runner.as_ref())?;

        let data = ws.read("output.gif")?;
        tracing::info!(size = data.len(), "webp converted to gif");
        Ok(data)
    }

    /// Animated WEBP → WEBM, falling back to GIF when the video path fails.
    ///
    /// Each strategy gets its own workspace acquisition; the failure of the
    /// WEBM attempt is kept in the returned outcome.
    pub fn webp_to_animation(&self, job: &JobId, webp: &[u8]) -> Result<ChainOutcome> {
        first_success([
            Strategy::new("webm", || self.webp_to_webm(job, webp)),
            Strategy::new("gif", || self.webp_to_gif(job, webp)),
        ])
    }

    /// Still WEBP → padded still WEBP, with pack metadata.
    #[tracing::instrument(skip_all, fields(job = %job, width_pad = width_pad, height_pad = height_pad))]
    pub fn pad_webp(
        &self,
        job: &JobId,
        webp: &[u8],
        width_pad: u32,
        height_pad: u32,
    ) -> Result<Vec<u8>> {
        let ws = self.acquire(job)?;
        let padded = raster::pad_webp(webp, width_pad, height_pad)?;
        Ok(self
            .embedder
            .embed_or_original(self.runner.as_ref(), &ws, padded))
    }

    /// Embed pack metadata into an existing WEBP, best-effort.
    pub fn embed_metadata(&self, job: &JobId, webp: Vec<u8>) -> Result<Vec<u8>> {
        let ws = self.acquire(job)?;
        Ok(self.embedder.embed_or_original(self.runner.as_ref(), &ws, webp))
    }
}
