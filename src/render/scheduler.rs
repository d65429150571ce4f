// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! The progressive scheduler as a pure function of its state.
//!
//! [`tick`] never touches a backend. It looks at the current
//! [`SchedulerState`], the invalidation signal and the options, and returns
//! the next state together with the work that has to be executed to make that
//! state true. The caller runs the work in order and commits `next` only if
//! the backend accepted it.

use crate::camera::camera::Camera;
use crate::scene::config::{RenderExtent, RenderOptions};

use super::denoise_gate::{self, DenoiseState, GateDecision};
use super::passes::{self, PassInvocation};
use super::state::{BufferIndex, SchedulerState};
use super::tile::{TileCursor, TileGrid};

/// What the scheduler observes from the outside world this tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub dirty: bool,
    pub options: &'a RenderOptions,
    pub camera: &'a Camera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// Sample budget reached; nothing rendered.
    Converged,
    /// Scene changed: accumulation dropped and a preview rendered.
    Preview,
    /// One tile traced and merged.
    Tile {
        cursor: TileCursor,
        pass_completed: bool,
    },
}

/// Read the stable half back and hand it to the denoiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenoiseRequest {
    pub source: BufferIndex,
    /// Completed sample passes held by `source`.
    pub pass: u32,
}

impl DenoiseRequest {
    /// Record a successful denoise in `state`.
    pub fn commit(self, state: &mut SchedulerState) {
        state.denoise = DenoiseState::Denoised;
        state.denoised_pass = self.pass;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickPlan {
    pub kind: TickKind,
    /// State after the work succeeds. Its `denoise` field reflects the gate
    /// before the request below runs; a successful denoise upgrades it.
    pub next: SchedulerState,
    pub clear_accumulation: bool,
    pub denoise: Option<DenoiseRequest>,
    /// Executed strictly in order.
    pub passes: Vec<PassInvocation>,
    /// The invalidation signal was acted on and should be cleared.
    pub consumed_invalidation: bool,
}

impl TickPlan {
    fn idle(kind: TickKind, next: SchedulerState) -> Self {
        Self {
            kind,
            next,
            clear_accumulation: false,
            denoise: None,
            passes: Vec::new(),
            consumed_invalidation: false,
        }
    }
}

pub fn tick(
    state: &SchedulerState,
    grid: &TileGrid,
    extent: &RenderExtent,
    inputs: &FrameInputs,
) -> TickPlan {
    if inputs.dirty {
        return invalidate(state, grid, extent, inputs);
    }

    let mut next = *state;
    let gate = denoise_gate::evaluate(state, inputs.options, grid);
    if gate == GateDecision::Raw {
        next.denoise = DenoiseState::Raw;
    }
    let request = DenoiseRequest {
        source: state.stable_buffer(),
        pass: state.sample_counter.saturating_sub(1),
    };
    let denoise = (gate == GateDecision::Run).then_some(request);

    if state.is_converged(inputs.options) {
        // The final image is denoised once, whatever the cadence did before.
        let stale =
            state.denoise == DenoiseState::Raw || state.denoised_pass < request.pass;
        let mut plan = TickPlan::idle(TickKind::Converged, next);
        plan.denoise = (gate != GateDecision::Raw && stale).then_some(request);
        return plan;
    }

    if next.cursor.is_sentinel() {
        let _ = next.cursor.advance(grid);
    }
    let cursor = next.cursor;

    let passes = vec![
        passes::trace_tile(
            grid,
            cursor,
            state.frame_counter,
            inputs.options,
            inputs.camera,
        ),
        passes::accumulate(grid, cursor),
        passes::tonemap(
            grid,
            next.current_buffer,
            next.sample_counter,
            inputs.options,
        ),
    ];

    next.frame_counter += 1;
    let pass_completed = next.cursor.advance(grid);
    if pass_completed {
        next.sample_counter += 1;
        next.current_buffer = next.current_buffer.other();
    }

    TickPlan {
        kind: TickKind::Tile {
            cursor,
            pass_completed,
        },
        next,
        clear_accumulation: false,
        denoise,
        passes,
        consumed_invalidation: false,
    }
}

fn invalidate(
    state: &SchedulerState,
    grid: &TileGrid,
    extent: &RenderExtent,
    inputs: &FrameInputs,
) -> TickPlan {
    let mut next = *state;
    next.reset(grid);

    TickPlan {
        kind: TickKind::Preview,
        next,
        clear_accumulation: true,
        denoise: None,
        passes: vec![passes::preview(extent, inputs.options, inputs.camera)],
        consumed_invalidation: true,
    }
}
