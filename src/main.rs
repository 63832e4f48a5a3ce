//! Headless demo: scripts a short session against a 2×2 grid of canvases
//! and logs what a renderer would draw.
//!
//! Usage: `zoomview [options.toml [effective.toml]]`. The second path
//! receives the options the session ran with. Run with `RUST_LOG=debug`
//! to see animation and tile-layer events.

use std::path::Path;

use glam::DVec2;
use zoomview::camera::{Projection, Rect, View};
use zoomview::canvas::{FlyToOptions, ImageDescriptor, PanOptions, ZoomOptions};
use zoomview::engine::{CanvasId, Viewer, ViewerCommand};
use zoomview::options::Options;
use zoomview::tiles::TileKind;
use zoomview::ViewerError;

const FRAME_MS: f64 = 1000.0 / 60.0;

fn load_options() -> Result<Options, ViewerError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading options from {path}");
            Options::load(Path::new(&path))
        }
        None => Ok(Options::default()),
    }
}

fn build_grid(viewer: &mut Viewer) -> Result<Vec<CanvasId>, ViewerError> {
    let images = [
        ImageDescriptor::image(16_384.0, 12_288.0, Projection::Flat),
        ImageDescriptor::image(
            8192.0,
            4096.0,
            Projection::Spherical { true_north: 0.0 },
        ),
        ImageDescriptor::image(2048.0, 2048.0, Projection::from_code(2)),
        ImageDescriptor::image(4000.0, 3000.0, Projection::Flat),
    ];
    let mut ids = Vec::with_capacity(images.len());
    for (i, descriptor) in images.into_iter().enumerate() {
        let id = viewer.create_canvas(descriptor, None)?;
        let cell = Rect::new(
            0.5 * (i % 2) as f64,
            0.5 * (i / 2) as f64,
            0.5,
            0.5,
        );
        let _ = viewer.set_area(id, cell, false, 0.0)?;
        ids.push(id);
    }
    Ok(ids)
}

/// Tick at 60 Hz until everything settles, logging each drawn frame.
fn run_until_idle(viewer: &mut Viewer, now: &mut f64) {
    let mut frames = 0_u32;
    loop {
        *now += FRAME_MS;
        let report = viewer.tick(*now);
        if report.needs_draw {
            frames += 1;
            let plan = viewer.draw_plan();
            let tiles: usize = viewer
                .tile_plans()
                .iter()
                .map(|p| p.of_kind(TileKind::Visible).count())
                .sum();
            log::debug!(
                "frame {frames}: {} canvases, {tiles} visible tiles",
                plan.items.len()
            );
            viewer.confirm_draw();
        }
        if !report.animating {
            break;
        }
    }
    log::info!("settled after {frames} frames at t={now:.0}ms");
}

fn log_draw_plan(viewer: &mut Viewer) {
    for item in viewer.draw_plan().images() {
        log::info!(
            "{:?} depth {} region {:?} opacity {:.2} view ({:.3}, {:.3}, {:.3}x{:.3})",
            item.canvas,
            item.depth,
            item.region,
            item.opacity,
            item.view.center_x,
            item.view.center_y,
            item.view.width,
            item.view.height
        );
    }
    for plan in viewer.tile_plans() {
        log::info!(
            "layer {}/{}: {} visible, {} prefetch, {} fallback",
            plan.layer,
            plan.max_layer,
            plan.of_kind(TileKind::Visible).count(),
            plan.of_kind(TileKind::Prefetch).count(),
            plan.of_kind(TileKind::Fallback).count()
        );
    }
}

fn run() -> Result<(), ViewerError> {
    let options = load_options()?;
    if let Some(path) = std::env::args().nth(2) {
        options.save(Path::new(&path))?;
        log::info!("effective options written to {path}");
    }
    let mut viewer = Viewer::new(1280.0, 720.0, 2.0, options);
    let ids = build_grid(&mut viewer)?;
    let mut now = 0.0;

    let script = [
        ViewerCommand::FlyTo {
            canvas: ids[0],
            view: View::new(0.3, 0.6, 0.05, 0.05),
            options: FlyToOptions {
                is_jump: true,
                ..FlyToOptions::default()
            },
        },
        ViewerCommand::Zoom {
            canvas: ids[3],
            delta: 2.0,
            focus: DVec2::new(100.0, 80.0),
            options: ZoomOptions::default(),
        },
        ViewerCommand::SetYaw {
            canvas: ids[1],
            radians: std::f64::consts::FRAC_PI_2,
        },
        ViewerCommand::Pan {
            canvas: ids[2],
            delta: DVec2::new(-40.0, 0.0),
            options: PanOptions::default(),
        },
        ViewerCommand::ReleasePan {
            canvas: ids[2],
            kinetic: true,
        },
        ViewerCommand::SetArea {
            canvas: ids[0],
            area: Rect::UNIT,
            animate: true,
        },
        ViewerCommand::SetZIndex {
            canvas: ids[0],
            z_index: 1,
        },
    ];
    for command in script {
        let outcome = viewer.execute(command, now)?;
        log::info!("{outcome:?}");
        run_until_idle(&mut viewer, &mut now);
    }

    viewer.resize(1920.0, 1080.0, 1.0);
    run_until_idle(&mut viewer, &mut now);
    log_draw_plan(&mut viewer);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
