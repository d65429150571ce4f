// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::scene::config::RenderOptions;

use super::denoise_gate::DenoiseState;
use super::tile::{TileCursor, TileGrid};

/// One half of the double-buffered presentation store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferIndex {
    First,
    Second,
}

impl BufferIndex {
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    pub fn as_usize(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// Everything the scheduler mutates between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerState {
    pub cursor: TileCursor,
    /// Starts at 1; bumped each time the whole grid has been covered once.
    pub sample_counter: u32,
    /// Steady-state ticks since the last reset; seeds the trace passes.
    pub frame_counter: u64,
    /// Half written during the current sample pass.
    pub current_buffer: BufferIndex,
    pub denoise: DenoiseState,
    /// Completed passes in the image the denoiser last produced.
    pub denoised_pass: u32,
}

impl SchedulerState {
    pub fn new(grid: &TileGrid) -> Self {
        Self {
            cursor: grid.sentinel(),
            sample_counter: 1,
            frame_counter: 1,
            current_buffer: BufferIndex::First,
            denoise: DenoiseState::Raw,
            denoised_pass: 0,
        }
    }

    /// Drop all accumulated progress. The buffer index is left alone.
    pub fn reset(&mut self, grid: &TileGrid) {
        self.cursor = grid.sentinel();
        self.sample_counter = 1;
        self.frame_counter = 1;
        self.denoise = DenoiseState::Raw;
        self.denoised_pass = 0;
    }

    /// Half holding the last fully completed sample pass.
    pub fn stable_buffer(&self) -> BufferIndex {
        self.current_buffer.other()
    }

    pub fn is_converged(&self, options: &RenderOptions) -> bool {
        options
            .sample_limit()
            .is_some_and(|limit| self.sample_counter >= limit)
    }

    /// Percentage of the configured sample budget; 0 when unbounded.
    pub fn progress(&self, options: &RenderOptions) -> f32 {
        if options.max_spp <= 0 {
            return 0.0;
        }
        (self.sample_counter as f32 * 100.0 / options.max_spp as f32).min(100.0)
    }
}
