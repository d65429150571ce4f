// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Progressive tile-based scheduling for a GPU path tracer.
//!
//! [`render::scheduler`] decides, one tick at a time, which tile to trace,
//! when a sample pass completes, when to denoise and what to present.
//! [`render::Renderer`] runs those decisions against a [`render::RenderBackend`];
//! [`gpu::WgpuBackend`] is the wgpu implementation.

pub mod app;
pub mod camera;
pub mod constants;
pub mod denoise;
pub mod gpu;
pub mod io;
pub mod render;
pub mod scene;
pub mod shaders;
