// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;
use clap::Parser;
use tiled_path_tracer::app;

fn main() -> Result<()> {
    env_logger::init();
    app::run(app::CliArgs::parse())
}
