// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context, Result};

use crate::denoise::{self, Denoiser};
use crate::scene::Scene;
use crate::scene::config::RenderOptions;

use super::backend::{BackendError, RenderBackend};
use super::passes::{ImageId, RenderTargets};
use super::present::{self, PresentSource, RgbaFrame};
use super::scheduler::{self, DenoiseRequest, FrameInputs, TickKind, TickPlan};
use super::state::SchedulerState;

/// What a host drives once per frame.
///
/// Nothing here returns an error: failures are logged and show up as state
/// on later calls.
pub trait Renderer {
    /// Run one scheduling step. `None` when nothing was committed.
    fn tick(&mut self, scene: &mut Scene) -> Option<TickKind>;

    /// Image to put on screen. `None` once resources are released.
    fn present(&self, scene: &Scene) -> Option<PresentSource>;

    /// Read the presented image back at render resolution.
    fn export_frame(&mut self, scene: &Scene) -> Option<RgbaFrame>;

    fn sample_count(&self) -> u32;

    fn progress(&self, options: &RenderOptions) -> f32;

    fn is_converged(&self, scene: &Scene) -> bool;

    /// Free backend resources early. Later calls become no-ops.
    fn release(&mut self);
}

/// Renders one tile per tick and presents through a double buffer.
pub struct TiledRenderer<B: RenderBackend> {
    targets: RenderTargets,
    backend: Option<B>,
    denoiser: Option<Box<dyn Denoiser>>,
    state: SchedulerState,
    warned_no_denoiser: bool,
}

impl<B: RenderBackend> TiledRenderer<B> {
    /// Acquire backend resources sized for the tile grid in `options`.
    pub fn new<F>(
        options: &RenderOptions,
        make_backend: F,
        denoiser: Option<Box<dyn Denoiser>>,
    ) -> Result<Self>
    where
        F: FnOnce(&RenderTargets) -> Result<B>,
    {
        Self::with_targets(RenderTargets::tiled(options), make_backend, denoiser)
    }

    pub fn with_targets<F>(
        targets: RenderTargets,
        make_backend: F,
        denoiser: Option<Box<dyn Denoiser>>,
    ) -> Result<Self>
    where
        F: FnOnce(&RenderTargets) -> Result<B>,
    {
        let backend = make_backend(&targets).context("Failed to create render backend")?;

        let extent = &targets.extent;
        let (preview_w, preview_h) = extent.preview_size();
        log::info!(
            "Window resolution: {}x{}",
            extent.window_width,
            extent.window_height
        );
        log::info!(
            "Render resolution: {}x{}",
            extent.render_width,
            extent.render_height
        );
        log::info!("Preview resolution: {preview_w}x{preview_h}");
        log::info!(
            "Tile size: {}x{} ({}x{} tiles)",
            targets.grid.tile_width,
            targets.grid.tile_height,
            targets.grid.num_tiles_x,
            targets.grid.num_tiles_y
        );

        Ok(Self {
            state: SchedulerState::new(&targets.grid),
            targets,
            backend: Some(backend),
            denoiser,
            warned_no_denoiser: false,
        })
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    fn denoise(&mut self, request: DenoiseRequest) -> bool {
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };
        let Some(denoiser) = self.denoiser.as_deref_mut() else {
            if !self.warned_no_denoiser {
                log::warn!("Denoiser enabled but none is available; showing raw samples");
                self.warned_no_denoiser = true;
            }
            return false;
        };

        match denoise_stable_half(backend, denoiser, request) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Denoise failed: {e:#}");
                false
            }
        }
    }
}

fn denoise_stable_half<B: RenderBackend>(
    backend: &mut B,
    denoiser: &mut dyn Denoiser,
    request: DenoiseRequest,
) -> Result<()> {
    let source = ImageId::Output(request.source);
    let (width, height) = backend.image_size(source);

    let color = backend
        .read_rgb(source)
        .context("Failed to read back the stable image")?;
    let denoised = denoiser.denoise(&color, width, height)?;
    denoise::check_shape(&denoised, width, height)?;
    backend
        .write_rgb(ImageId::Denoised, &denoised)
        .context("Failed to upload the denoised image")?;

    log::debug!(
        "Denoised {width}x{height} from {:?} after {} passes",
        request.source,
        request.pass
    );
    Ok(())
}

fn execute_plan<B: RenderBackend>(backend: &mut B, plan: &TickPlan) -> Result<(), BackendError> {
    if plan.passes.is_empty() && !plan.clear_accumulation {
        return Ok(());
    }
    if plan.clear_accumulation {
        backend.clear(ImageId::Accumulation)?;
    }
    for pass in &plan.passes {
        backend.execute(pass)?;
    }
    backend.submit()
}

impl<B: RenderBackend> Renderer for TiledRenderer<B> {
    fn tick(&mut self, scene: &mut Scene) -> Option<TickKind> {
        if self.backend.is_none() {
            log::warn!("Tiled renderer is not initialized");
            return None;
        }

        let inputs = FrameInputs {
            dirty: scene.is_dirty(),
            options: &scene.options,
            camera: scene.camera(),
        };
        let plan = scheduler::tick(&self.state, &self.targets.grid, &self.targets.extent, &inputs);

        let denoised = plan.denoise.filter(|&request| self.denoise(request));

        let backend = self.backend.as_mut()?;
        if let Err(e) = execute_plan(backend, &plan) {
            log::error!("Render tick failed, retrying next tick: {e}");
            if let Some(request) = denoised {
                request.commit(&mut self.state);
            }
            return None;
        }

        self.state = plan.next;
        if let Some(request) = denoised {
            request.commit(&mut self.state);
        }
        if plan.consumed_invalidation {
            scene.clear_dirty();
        }

        match plan.kind {
            TickKind::Tile {
                pass_completed: true,
                ..
            } => log::debug!("Sample pass complete, spp = {}", self.state.sample_counter),
            TickKind::Preview => log::debug!("Scene changed, accumulation reset"),
            _ => {}
        }
        Some(plan.kind)
    }

    fn present(&self, scene: &Scene) -> Option<PresentSource> {
        if self.backend.is_none() {
            log::warn!("Tiled renderer is not initialized");
            return None;
        }
        Some(present::select(&self.state, scene.is_dirty(), &scene.options))
    }

    fn export_frame(&mut self, scene: &Scene) -> Option<RgbaFrame> {
        let source = self.present(scene)?;
        let backend = self.backend.as_mut()?;

        let image = source.image();
        let (width, height) = backend.image_size(image);
        let pixels = match backend.read_rgba8(image) {
            Ok(pixels) => pixels,
            Err(e) => {
                log::error!("Failed to read back {image:?}: {e}");
                return None;
            }
        };

        let frame = RgbaFrame {
            width,
            height,
            pixels,
        };
        let (render_w, render_h) = self.targets.render_size();
        Some(frame.resized_nearest(render_w, render_h))
    }

    fn sample_count(&self) -> u32 {
        self.state.sample_counter
    }

    fn progress(&self, options: &RenderOptions) -> f32 {
        self.state.progress(options)
    }

    fn is_converged(&self, scene: &Scene) -> bool {
        !scene.is_dirty() && self.state.is_converged(&scene.options)
    }

    fn release(&mut self) {
        if self.backend.take().is_some() {
            log::info!("Released renderer resources");
        }
    }
}

/// Renders the whole frame every tick: each tick is a full sample pass.
pub struct ProgressiveRenderer<B: RenderBackend> {
    inner: TiledRenderer<B>,
}

impl<B: RenderBackend> ProgressiveRenderer<B> {
    pub fn new<F>(
        options: &RenderOptions,
        make_backend: F,
        denoiser: Option<Box<dyn Denoiser>>,
    ) -> Result<Self>
    where
        F: FnOnce(&RenderTargets) -> Result<B>,
    {
        let inner =
            TiledRenderer::with_targets(RenderTargets::whole_frame(options), make_backend, denoiser)?;
        Ok(Self { inner })
    }

    pub fn state(&self) -> &SchedulerState {
        self.inner.state()
    }

    pub fn targets(&self) -> &RenderTargets {
        self.inner.targets()
    }

    pub fn backend(&self) -> Option<&B> {
        self.inner.backend()
    }
}

impl<B: RenderBackend> Renderer for ProgressiveRenderer<B> {
    fn tick(&mut self, scene: &mut Scene) -> Option<TickKind> {
        self.inner.tick(scene)
    }

    fn present(&self, scene: &Scene) -> Option<PresentSource> {
        self.inner.present(scene)
    }

    fn export_frame(&mut self, scene: &Scene) -> Option<RgbaFrame> {
        self.inner.export_frame(scene)
    }

    fn sample_count(&self) -> u32 {
        self.inner.sample_count()
    }

    fn progress(&self, options: &RenderOptions) -> f32 {
        self.inner.progress(options)
    }

    fn is_converged(&self, scene: &Scene) -> bool {
        self.inner.is_converged(scene)
    }

    fn release(&mut self) {
        self.inner.release()
    }
}
