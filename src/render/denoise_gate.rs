// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::scene::config::{DenoiseCadence, RenderOptions};

use super::state::SchedulerState;
use super::tile::TileGrid;

/// Whether presentation may use the denoised image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DenoiseState {
    #[default]
    Raw,
    Denoised,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Denoiser disabled or nothing complete to denoise yet.
    Raw,
    /// Keep showing whatever is there.
    Hold,
    /// Denoise the stable half now.
    Run,
}

/// Decide what the denoiser does this tick, based on the state before the tick's work.
pub fn evaluate(state: &SchedulerState, options: &RenderOptions, grid: &TileGrid) -> GateDecision {
    if !options.enable_denoiser || state.sample_counter <= 1 {
        return GateDecision::Raw;
    }
    if state.denoise == DenoiseState::Raw {
        return GateDecision::Run;
    }

    let period = options.denoiser_frame_cnt.max(1) as u64;
    let due = match options.denoiser_cadence {
        DenoiseCadence::Tiles => state.frame_counter % (period * grid.tile_count() as u64) == 0,
        // The first tick of a pass is the one right after the flip.
        DenoiseCadence::Samples => {
            state.cursor == grid.first() && (state.sample_counter as u64 - 1) % period == 0
        }
    };

    if due { GateDecision::Run } else { GateDecision::Hold }
}
