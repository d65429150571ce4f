// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use bytemuck::Zeroable;

use crate::constants::RGBA_F32_BYTES_PER_PIXEL;
use crate::render::backend::{BackendError, RenderBackend, to_unorm8};
use crate::render::frame::dispatch_pass;
use crate::render::passes::{
    AccumulateUniforms, ImageId, PassInvocation, PassKind, PassUniforms, RenderTargets,
    TonemapUniforms, TraceUniforms,
};
use crate::render::state::BufferIndex;
use crate::shaders::{ShaderComposer, ShaderDefines};

use super::buffers;
use super::context::GpuContext;
use super::pipeline;

const ALL_IMAGES: [ImageId; 6] = [
    ImageId::TileWork,
    ImageId::Preview,
    ImageId::Accumulation,
    ImageId::Output(BufferIndex::First),
    ImageId::Output(BufferIndex::Second),
    ImageId::Denoised,
];

/// Runs scheduler passes as wgpu compute dispatches.
///
/// Images are `vec4<f32>` storage buffers, rows top-down. Passes recorded
/// between two submits share one command encoder.
pub struct WgpuBackend {
    gpu: GpuContext,
    targets: RenderTargets,
    images: HashMap<ImageId, wgpu::Buffer>,
    uniforms: HashMap<PassKind, wgpu::Buffer>,
    pipelines: HashMap<PassKind, wgpu::ComputePipeline>,
    /// Keyed by the image the pass writes.
    bind_groups: HashMap<ImageId, wgpu::BindGroup>,
    encoder: Option<wgpu::CommandEncoder>,
    /// Uniform buffers written since the last submit.
    pending_uniforms: HashSet<PassKind>,
}

impl WgpuBackend {
    pub fn new(
        gpu: GpuContext,
        targets: &RenderTargets,
        composer: &ShaderComposer,
        defines: &ShaderDefines,
    ) -> Result<Self> {
        let device = &gpu.device;

        let mut images = HashMap::new();
        for image in ALL_IMAGES {
            let size = image_bytes(targets, image);
            if size > gpu.max_storage_binding() {
                anyhow::bail!(
                    "{image:?} needs {size} bytes, device allows {}",
                    gpu.max_storage_binding()
                );
            }
            let label = format!("{image:?} image");
            images.insert(image, buffers::create_empty_storage_buffer(device, size, &label));
        }

        let mut uniforms = HashMap::new();
        for kind in PassKind::ALL.iter().copied() {
            let label = format!("{} params", kind.name());
            let buffer = match kind {
                PassKind::Tile | PassKind::Preview => {
                    buffers::create_uniform_buffer(device, &TraceUniforms::zeroed(), &label)
                }
                PassKind::Accumulate => {
                    buffers::create_uniform_buffer(device, &AccumulateUniforms::zeroed(), &label)
                }
                PassKind::Tonemap => {
                    buffers::create_uniform_buffer(device, &TonemapUniforms::zeroed(), &label)
                }
            };
            uniforms.insert(kind, buffer);
        }

        let trace_layout = pipeline::create_trace_layout(device);
        let image_layout = pipeline::create_image_layout(device);

        let prelude = defines.prelude();
        let mut pipelines = HashMap::new();
        for kind in PassKind::ALL.iter().copied() {
            let source = composer.compose_with_prelude(kind.name(), &prelude)?;
            let layout = match kind {
                PassKind::Tile | PassKind::Preview => &trace_layout,
                PassKind::Accumulate | PassKind::Tonemap => &image_layout,
            };
            let label = format!("{} pipeline", kind.name());
            pipelines.insert(
                kind,
                pipeline::create_compute_pipeline(device, &source, &[layout], &label)?,
            );
        }

        let mut bind_groups = HashMap::new();
        let trace_group = |kind: PassKind, target: ImageId| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} bind group", kind.name())),
                layout: &trace_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniforms[&kind].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: images[&target].as_entire_binding(),
                    },
                ],
            })
        };
        bind_groups.insert(ImageId::TileWork, trace_group(PassKind::Tile, ImageId::TileWork));
        bind_groups.insert(ImageId::Preview, trace_group(PassKind::Preview, ImageId::Preview));

        let image_group = |kind: PassKind, source: ImageId, target: ImageId| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} {target:?} bind group", kind.name())),
                layout: &image_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniforms[&kind].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: images[&source].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: images[&target].as_entire_binding(),
                    },
                ],
            })
        };
        bind_groups.insert(
            ImageId::Accumulation,
            image_group(PassKind::Accumulate, ImageId::TileWork, ImageId::Accumulation),
        );
        for half in [BufferIndex::First, BufferIndex::Second] {
            let target = ImageId::Output(half);
            bind_groups.insert(
                target,
                image_group(PassKind::Tonemap, ImageId::Accumulation, target),
            );
        }

        log::info!(
            "GPU images allocated: {:.1} MiB",
            ALL_IMAGES
                .iter()
                .map(|&image| image_bytes(targets, image))
                .sum::<u64>() as f64
                / (1024.0 * 1024.0)
        );

        Ok(Self {
            gpu,
            targets: *targets,
            images,
            uniforms,
            pipelines,
            bind_groups,
            encoder: None,
            pending_uniforms: HashSet::new(),
        })
    }

    fn image_buffer(&self, image: ImageId) -> Result<&wgpu::Buffer, BackendError> {
        self.images
            .get(&image)
            .ok_or_else(|| BackendError::Other(format!("no storage for {image:?}")))
    }

    fn read_rgba_f32(&mut self, image: ImageId) -> Result<Vec<f32>, BackendError> {
        self.submit()?;
        let buffer = self.image_buffer(image)?;
        let size = image_bytes(&self.targets, image);
        buffers::read_buffer::<f32>(&self.gpu.device, &self.gpu.queue, buffer, size)
            .map_err(|e| BackendError::Readback(image, format!("{e:#}")))
    }
}

fn image_bytes(targets: &RenderTargets, image: ImageId) -> u64 {
    let (w, h) = targets.image_size(image);
    u64::from(w) * u64::from(h) * RGBA_F32_BYTES_PER_PIXEL
}

/// Drop alpha from interleaved RGBA.
pub fn rgba_to_rgb(rgba: &[f32]) -> Vec<f32> {
    rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

/// Interleave RGB with an opaque alpha.
pub fn rgb_to_rgba(rgb: &[f32]) -> Vec<f32> {
    rgb.chunks_exact(3)
        .flat_map(|px| [px[0], px[1], px[2], 1.0])
        .collect()
}

impl RenderBackend for WgpuBackend {
    fn execute(&mut self, pass: &PassInvocation) -> Result<(), BackendError> {
        // A uniform buffer can hold only one value per submit.
        if self.pending_uniforms.contains(&pass.kind) {
            self.submit()?;
        }

        let pipeline = self
            .pipelines
            .get(&pass.kind)
            .ok_or(BackendError::UnsupportedPass(pass.kind.name()))?;
        let bind_group = self
            .bind_groups
            .get(&pass.target)
            .ok_or(BackendError::UnsupportedPass(pass.kind.name()))?;
        let uniform = &self.uniforms[&pass.kind];

        let queue = &self.gpu.queue;
        match (pass.kind, pass.uniforms) {
            (PassKind::Tile | PassKind::Preview, PassUniforms::Trace(u)) => {
                buffers::update_uniform_buffer(queue, uniform, &u)
            }
            (PassKind::Accumulate, PassUniforms::Accumulate(u)) => {
                buffers::update_uniform_buffer(queue, uniform, &u)
            }
            (PassKind::Tonemap, PassUniforms::Tonemap(u)) => {
                buffers::update_uniform_buffer(queue, uniform, &u)
            }
            _ => return Err(BackendError::UnsupportedPass(pass.kind.name())),
        }

        let device = &self.gpu.device;
        let encoder = self.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tick encoder"),
            })
        });
        dispatch_pass(encoder, pipeline, bind_group, pass);
        self.pending_uniforms.insert(pass.kind);
        Ok(())
    }

    fn clear(&mut self, image: ImageId) -> Result<(), BackendError> {
        let buffer = self
            .images
            .get(&image)
            .ok_or_else(|| BackendError::Other(format!("no storage for {image:?}")))?;
        let device = &self.gpu.device;
        let encoder = self.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tick encoder"),
            })
        });
        encoder.clear_buffer(buffer, 0, None);
        Ok(())
    }

    fn submit(&mut self) -> Result<(), BackendError> {
        if let Some(encoder) = self.encoder.take() {
            self.gpu.queue.submit(std::iter::once(encoder.finish()));
            // Non-blocking: reclaim finished work without stalling.
            self.gpu.device.poll(wgpu::Maintain::Poll);
        }
        self.pending_uniforms.clear();
        Ok(())
    }

    fn read_rgb(&mut self, image: ImageId) -> Result<Vec<f32>, BackendError> {
        Ok(rgba_to_rgb(&self.read_rgba_f32(image)?))
    }

    fn write_rgb(&mut self, image: ImageId, rgb: &[f32]) -> Result<(), BackendError> {
        let (w, h) = self.image_size(image);
        let expected = w as usize * h as usize * 3;
        if rgb.len() != expected {
            return Err(BackendError::SizeMismatch {
                image,
                expected,
                actual: rgb.len(),
            });
        }

        self.submit()?;
        let buffer = self.image_buffer(image)?;
        buffers::update_storage_buffer(&self.gpu.queue, buffer, &rgb_to_rgba(rgb));
        Ok(())
    }

    fn read_rgba8(&mut self, image: ImageId) -> Result<Vec<u8>, BackendError> {
        Ok(self
            .read_rgba_f32(image)?
            .into_iter()
            .map(to_unorm8)
            .collect())
    }

    fn image_size(&self, image: ImageId) -> (u32, u32) {
        self.targets.image_size(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::config::RenderOptions;

    #[test]
    fn test_channel_conversion() {
        let rgba = [0.1, 0.2, 0.3, 0.0, 0.4, 0.5, 0.6, 0.5];
        let rgb = rgba_to_rgb(&rgba);
        assert_eq!(rgb, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        assert_eq!(
            rgb_to_rgba(&rgb),
            vec![0.1, 0.2, 0.3, 1.0, 0.4, 0.5, 0.6, 1.0]
        );
    }

    #[test]
    fn test_image_bytes() {
        let opts = RenderOptions {
            render_resolution: [640, 480],
            tile_width: 128,
            tile_height: 128,
            ..Default::default()
        };
        let targets = RenderTargets::tiled(&opts);
        assert_eq!(image_bytes(&targets, ImageId::TileWork), 128 * 128 * 16);
        assert_eq!(image_bytes(&targets, ImageId::Accumulation), 640 * 480 * 16);
    }
}
