// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::constants::WORKGROUP_SIZE;
use crate::gpu::buffers::dispatch_size;

use super::passes::{PassInvocation, PassKind};

/// Record one scheduler pass, covering exactly its viewport.
pub fn dispatch_pass(
    encoder: &mut wgpu::CommandEncoder,
    pipeline: &wgpu::ComputePipeline,
    bind_group: &wgpu::BindGroup,
    pass: &PassInvocation,
) {
    let label = match pass.kind {
        PassKind::Tile => "tile trace pass",
        PassKind::Preview => "preview trace pass",
        PassKind::Accumulate => "accumulate pass",
        PassKind::Tonemap => "tonemap pass",
    };
    dispatch_compute(
        encoder,
        pipeline,
        bind_group,
        pass.viewport.width,
        pass.viewport.height,
        label,
    );
}

fn dispatch_compute(
    encoder: &mut wgpu::CommandEncoder,
    pipeline: &wgpu::ComputePipeline,
    bind_group: &wgpu::BindGroup,
    width: u32,
    height: u32,
    label: &str,
) {
    let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
        label: Some(label),
        timestamp_writes: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, Some(bind_group), &[]);
    pass.dispatch_workgroups(
        dispatch_size(width, WORKGROUP_SIZE),
        dispatch_size(height, WORKGROUP_SIZE),
        1,
    );
}
