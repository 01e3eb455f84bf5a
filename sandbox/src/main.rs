// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// DefRen Sandbox
// Renders a few headless frames and runs debug console commands against them.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use defren_agents::{FrameContext, RenderThreadAgent};
use defren_core::math::{Aabb, Vec3};
use defren_core::renderer::{DepthMinMaxStrategy, RenderError, RenderSettings};
use defren_infra::logging::init_logging;
use defren_infra::WgpuDevice;
use defren_lanes::{load_settings, RayTraceField};

#[derive(Parser, Debug)]
#[command(name = "sandbox", about = "Headless deferred renderer demo")]
struct Args {
    /// Window width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Number of frames to render.
    #[arg(long, default_value_t = 8)]
    frames: u32,

    /// Grow the window by this many pixels every frame.
    #[arg(long, default_value_t = 0)]
    grow: u32,

    /// RON file with render settings.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Divide the render size by this factor.
    #[arg(long)]
    down_scale: Option<u32>,

    /// Build the depth min/max pyramid.
    #[arg(long, value_enum)]
    depth_min_max: Option<Strategy>,

    /// Console command to run, may be given several times.
    #[arg(short, long = "command")]
    commands: Vec<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Strategy {
    Packed,
    Separate,
    Doubled,
}

impl From<Strategy> for DepthMinMaxStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Packed => DepthMinMaxStrategy::PackedTwoChannel,
            Strategy::Separate => DepthMinMaxStrategy::SeparateTextures,
            Strategy::Doubled => DepthMinMaxStrategy::DoubledWidth,
        }
    }
}

fn settings(args: &Args) -> Result<RenderSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            load_settings(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => RenderSettings::default(),
    };
    if let Some(scale) = args.down_scale {
        settings.render_down_scale = scale.max(1);
    }
    if let Some(strategy) = args.depth_min_max {
        settings.depth_min_max = Some(strategy.into());
    }
    Ok(settings)
}

// Stands in for the geometry, lighting and post-processing passes.
fn render_passes(ctx: &mut FrameContext<'_>, field: &mut RayTraceField) -> Result<(), RenderError> {
    let deferred = &mut *ctx.deferred;
    let framebuffers = &mut *ctx.framebuffers;

    deferred.activate_material_color(framebuffers)?;
    deferred.activate_temporary1(framebuffers, true)?;
    deferred.activate_luminance(framebuffers)?;

    if let Some(pyramid) = deferred.depth_min_max_mut() {
        for level in 0..pyramid.level_count() {
            pyramid.activate_level(framebuffers, level)?;
        }
    }

    deferred.activate_post_process(framebuffers, false)?;
    deferred.swap_post_process_target();
    deferred.activate_post_process(framebuffers, false)?;

    if ctx.frame == 0 {
        field.trace(framebuffers, |field, _| {
            log::info!(
                "Sandbox: tracing {} probes with {} rays each",
                field.total_probe_count(),
                field.ray_directions().len()
            );
            Ok(())
        })?;
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let settings = settings(&args)?;

    let device = Arc::new(WgpuDevice::new_headless()?);
    log::info!("Sandbox: running on \"{}\"", device.adapter_info().name);

    let mut field = RayTraceField::new(settings.ray_trace_field.clone());
    field.init(Aabb::from_min_max(Vec3::new(-8.0, 0.0, -8.0), Vec3::new(8.0, 4.0, 8.0)));

    let mut agent = RenderThreadAgent::new(device.clone(), settings)?;

    let client = agent.console_client();
    let commands = args.commands.clone();
    let console = thread::spawn(move || {
        for line in commands {
            match client.execute(line.as_str(), Duration::from_secs(10)) {
                Ok(reply) => println!("> {line}\n{reply}"),
                Err(err) => {
                    eprintln!("> {line}\n{err}");
                    break;
                }
            }
        }
    });

    let mut frame = 0;
    while frame < args.frames || !console.is_finished() {
        let grow = args.grow * frame.min(args.frames);
        agent.render_frame(args.width + grow, args.height + grow, |ctx| {
            render_passes(ctx, &mut field)
        })?;
        frame += 1;
    }
    if console.join().is_err() {
        log::error!("Sandbox: console thread panicked");
    }

    let deferred = agent.deferred();
    log::info!(
        "Sandbox: {} frames at {}x{}, {} bytes of render targets",
        agent.frame_count(),
        deferred.width(),
        deferred.height(),
        deferred.memory_usage()
    );

    drop(field);
    agent.shutdown();
    log::info!("Sandbox: {} bytes still allocated", device.allocated_bytes());
    Ok(())
}
