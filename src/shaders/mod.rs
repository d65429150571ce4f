// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod composer;
pub mod defines;

pub use composer::ShaderComposer;
pub use defines::ShaderDefines;
