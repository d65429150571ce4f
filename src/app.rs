// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::constants::{DEFAULT_MAX_TICKS, PROGRESS_LOG_INTERVAL};
use crate::denoise;
use crate::gpu::{GpuContext, WgpuBackend};
use crate::io::export;
use crate::render::{ProgressiveRenderer, RenderTargets, Renderer, TickKind, TiledRenderer};
use crate::scene::Scene;
use crate::scene::exporter::save_config;
use crate::scene::loader::load_config;
use crate::shaders::{ShaderComposer, ShaderDefines};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// One tile per tick
    #[default]
    Tiled,
    /// The whole frame per tick
    Progressive,
}

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about = "Headless progressive tile path tracer")]
pub struct CliArgs {
    /// Render config (YAML or JSON)
    pub config: PathBuf,

    /// Give up after this many ticks
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    pub ticks: u64,

    /// PNG to write; defaults to a timestamped name
    #[arg(long, short = 'o', value_parser)]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "tiled")]
    pub strategy: Strategy,

    /// Directory of .wgsl files layered over the built-in kernels
    #[arg(long = "shaders", value_name = "DIR")]
    pub shader_dir: Option<PathBuf>,

    /// Also write the resolved config, defaults filled in, as JSON
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,
}

/// Render a config headlessly until it converges or runs out of ticks, then
/// export the presented frame.
pub fn run(args: CliArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    if let Some(path) = &args.save_config {
        save_config(&config, path)?;
    }
    let mut scene = Scene::new(&config);

    let composer = match &args.shader_dir {
        Some(dir) => ShaderComposer::with_overrides(dir)?,
        None => ShaderComposer::embedded(),
    };
    let defines = ShaderDefines::from_options(&scene.options);
    let make_backend = |targets: &RenderTargets| -> Result<WgpuBackend> {
        WgpuBackend::new(GpuContext::new()?, targets, &composer, &defines)
    };
    let denoiser = if scene.options.enable_denoiser {
        denoise::default_denoiser()
    } else {
        None
    };

    let mut renderer: Box<dyn Renderer> = match args.strategy {
        Strategy::Tiled => Box::new(TiledRenderer::new(&scene.options, make_backend, denoiser)?),
        Strategy::Progressive => Box::new(ProgressiveRenderer::new(
            &scene.options,
            make_backend,
            denoiser,
        )?),
    };

    let start = Instant::now();
    scene.mark_dirty();
    for tick in 0..args.ticks {
        // A converged tick still gets to run the final denoise.
        if renderer.tick(&mut scene) == Some(TickKind::Converged) {
            log::info!("Converged after {tick} ticks");
            break;
        }
        if tick % PROGRESS_LOG_INTERVAL == 0 {
            log::info!(
                "tick {tick}: {} spp, {:.1}% ({:.1}s)",
                renderer.sample_count(),
                renderer.progress(&scene.options),
                start.elapsed().as_secs_f32()
            );
        }
    }

    let frame = renderer
        .export_frame(&scene)
        .context("Renderer produced no frame to export")?;
    let path = args
        .out
        .unwrap_or_else(|| export::default_export_path(renderer.sample_count()));
    export::save_png(&frame, &path)?;

    log::info!(
        "Rendered {} spp in {:.2}s",
        renderer.sample_count(),
        start.elapsed().as_secs_f32()
    );
    renderer.release();
    Ok(())
}
