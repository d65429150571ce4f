// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod backend;
pub mod denoise_gate;
pub mod frame;
pub mod passes;
pub mod present;
pub mod renderer;
pub mod scheduler;
pub mod state;
pub mod tile;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{BackendError, RenderBackend};
pub use passes::{ImageId, PassKind, RenderTargets};
pub use present::{PresentSource, RgbaFrame};
pub use renderer::{ProgressiveRenderer, Renderer, TiledRenderer};
pub use scheduler::TickKind;
