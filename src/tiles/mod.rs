//! Tile visibility and priority.
//!
//! Derives the tiles a canvas needs from its current view. The engine
//! never stores tiles; a [`TilePlan`] is just coordinates for the asset
//! loader, ordered by how urgently they are needed.
//!
//! Selection rules:
//! - The target layer comes from [`TilePyramid::target_layer`].
//! - `Visible` tiles intersect the view at the target layer. For 360
//!   images each candidate is checked on a 3×3 grid of sample points and
//!   kept only if some sample faces the camera inside the region.
//! - `Prefetch` tiles ring the visible set, `prefetch_margin` tiles wide.
//! - `Fallback` tiles are the coarsest layer, kept so something is always
//!   drawable. Omni canvases also fall back on nearby frames.

pub mod pyramid;

use glam::DVec2;
use rustc_hash::FxHashSet;

pub use pyramid::TilePyramid;

use crate::camera::{Projection, Rect, View, ViewGeometry};
use crate::canvas::Canvas;
use crate::engine::CanvasId;
use crate::options::TileOptions;
use crate::util::wrapped_delta;

/// Screen samples per axis when estimating the 360 candidate window.
const SPHERE_SAMPLES: u32 = 8;

/// Slack around the estimated 360 window, in view fractions.
const SPHERE_PADDING: f64 = 0.02;

/// Address of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    /// Owning canvas.
    pub canvas: CanvasId,
    /// Omni frame (`ring * frame_count + frame`); 0 for flat and 360.
    pub frame: u32,
    /// Zoom layer, 0 being the coarsest.
    pub layer: u32,
    /// Column within the layer.
    pub column: u32,
    /// Row within the layer.
    pub row: u32,
}

/// Why a tile is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Intersects the view at the target layer.
    Visible,
    /// Just outside the view, loaded ahead of panning.
    Prefetch,
    /// Coarse stand-in drawn until finer tiles arrive.
    Fallback,
}

impl TileKind {
    /// Boundary code: 0 visible, 1 prefetch, 2 fallback.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Visible => 0,
            Self::Prefetch => 1,
            Self::Fallback => 2,
        }
    }
}

/// One requested tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRequest {
    /// Tile address.
    pub id: TileId,
    /// Request reason.
    pub kind: TileKind,
    /// Higher loads first.
    pub priority: f64,
}

/// Tiles a canvas needs for its current view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TilePlan {
    /// Target layer.
    pub layer: u32,
    /// Finest layer of the image.
    pub max_layer: u32,
    /// Requests, highest priority first.
    pub tiles: Vec<TileRequest>,
}

impl TilePlan {
    /// Requests of one kind.
    pub fn of_kind(&self, kind: TileKind) -> impl Iterator<Item = &TileRequest> + '_ {
        self.tiles.iter().filter(move |t| t.kind == kind)
    }

    /// Flat `(frame, layer, column, row, kind, rank)` records for the
    /// handle boundary; rank is the position in priority order.
    #[must_use]
    pub fn to_records(&self) -> Vec<i32> {
        self.tiles
            .iter()
            .enumerate()
            .flat_map(|(rank, t)| {
                [
                    t.id.frame as i32,
                    t.id.layer as i32,
                    t.id.column as i32,
                    t.id.row as i32,
                    t.kind.code(),
                    rank as i32,
                ]
            })
            .collect()
    }
}

/// Context shared by every tile decision of one plan.
struct Planner<'a> {
    id: CanvasId,
    canvas: &'a Canvas,
    geometry: ViewGeometry,
    view: View,
    pyramid: TilePyramid,
    options: &'a TileOptions,
}

/// Plan the tiles `canvas` needs on a display with `device_pixel_ratio`.
///
/// Containers and canvases without a screen region need nothing.
#[must_use]
pub fn plan_tiles(
    id: CanvasId,
    canvas: &Canvas,
    device_pixel_ratio: f64,
    options: &TileOptions,
) -> TilePlan {
    let descriptor = canvas.descriptor();
    if !descriptor.has_image() || !canvas.is_laid_out() {
        return TilePlan::default();
    }
    let pyramid = TilePyramid::new(descriptor.width, descriptor.height, descriptor.tile_size);
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let layer = pyramid.target_layer(canvas.scale(), dpr);
    let planner = Planner {
        id,
        canvas,
        geometry: canvas.geometry(),
        view: canvas.view(),
        pyramid,
        options,
    };
    let mut tiles = planner.plan(layer);
    tiles.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    TilePlan {
        layer,
        max_layer: pyramid.max_layer(),
        tiles,
    }
}

impl Planner<'_> {
    fn plan(&self, layer: u32) -> Vec<TileRequest> {
        let frame = self.frame();
        let windows = self.view_windows();
        let mut seen = FxHashSet::default();
        let mut visible = FxHashSet::default();
        let mut out = Vec::new();

        for window in &windows {
            let Some(((c0, c1), (r0, r1))) = self.pyramid.tile_range(layer, window) else {
                continue;
            };
            for column in c0..=c1 {
                for row in r0..=r1 {
                    if !seen.insert((column, row)) || !self.faces_camera(layer, column, row) {
                        continue;
                    }
                    let _ = visible.insert((column, row));
                    out.push(TileRequest {
                        id: self.tile(frame, layer, column, row),
                        kind: TileKind::Visible,
                        priority: 1.0 + self.visible_score(layer, column, row, &windows),
                    });
                }
            }
        }

        self.prefetch(frame, layer, &visible, &mut out);

        if self.options.keep_fallback || out.is_empty() {
            self.fallback(frame, layer, &mut out);
        }
        out
    }

    fn tile(&self, frame: u32, layer: u32, column: u32, row: u32) -> TileId {
        TileId {
            canvas: self.id,
            frame,
            layer,
            column,
            row,
        }
    }

    /// Displayed omni frame as a flat index; 0 otherwise.
    fn frame(&self) -> u32 {
        match self.geometry.projection {
            Projection::Omni(params) => self
                .canvas
                .omni_frame()
                .map_or(0, |(frame, ring)| ring * params.frame_count + frame),
            _ => 0,
        }
    }

    /// Normalized image rectangles the view covers.
    fn view_windows(&self) -> Vec<Rect> {
        match self.geometry.projection {
            Projection::Flat => self.view.bounds().intersection(&Rect::UNIT).into_iter().collect(),
            Projection::Spherical { .. } => self.sphere_window().split_wrapped(),
            Projection::Omni(_) => self.omni_window().into_iter().collect(),
        }
    }

    /// Longitude/latitude window containing every on-screen direction.
    fn sphere_window(&self) -> View {
        let g = &self.geometry;
        let view = &self.view;
        let mut half_lon: f64 = 0.0;
        let (mut top, mut bottom) = (view.center_y, view.center_y);
        for i in 0..=SPHERE_SAMPLES {
            for j in 0..=SPHERE_SAMPLES {
                let sx = g.region.x + g.region.width * f64::from(i) / f64::from(SPHERE_SAMPLES);
                let sy = g.region.y + g.region.height * f64::from(j) / f64::from(SPHERE_SAMPLES);
                let p = g.unproject(view, sx, sy, true);
                half_lon = half_lon.max(wrapped_delta(view.center_x, p.x).abs());
                top = top.min(p.y);
                bottom = bottom.max(p.y);
            }
        }
        if self.on_screen(0.5, 0.0) {
            top = 0.0;
            half_lon = 0.5;
        }
        if self.on_screen(0.5, 1.0) {
            bottom = 1.0;
            half_lon = 0.5;
        }
        View::new(
            view.center_x,
            0.5 * (top + bottom),
            2.0 * half_lon + SPHERE_PADDING,
            bottom - top + SPHERE_PADDING,
        )
    }

    /// Bounding box of the frame plane seen through the region.
    fn omni_window(&self) -> Option<Rect> {
        let g = &self.geometry;
        let mut lo = DVec2::splat(f64::INFINITY);
        let mut hi = DVec2::splat(f64::NEG_INFINITY);
        for i in 0..=4 {
            for j in 0..=4 {
                let sx = g.region.x + g.region.width * f64::from(i) / 4.0;
                let sy = g.region.y + g.region.height * f64::from(j) / 4.0;
                let p = g.unproject(&self.view, sx, sy, true);
                lo = lo.min(p);
                hi = hi.max(p);
            }
        }
        Rect::from_edges(lo.x, lo.y, hi.x, hi.y).intersection(&Rect::UNIT)
    }

    fn on_screen(&self, x: f64, y: f64) -> bool {
        let p = self.geometry.project(&self.view, x, y, false);
        let r = &self.geometry.region;
        p.is_visible() && p.x >= r.x && p.x <= r.right() && p.y >= r.y && p.y <= r.bottom()
    }

    /// 360 tiles must show at least one sample in front of the camera and
    /// on screen, or contain the view center.
    fn faces_camera(&self, layer: u32, column: u32, row: u32) -> bool {
        if !matches!(self.geometry.projection, Projection::Spherical { .. }) {
            return true;
        }
        let rect = self.pyramid.tile_rect(layer, column, row);
        let contains_center = self.view.center_x >= rect.x
            && self.view.center_x <= rect.right()
            && self.view.center_y >= rect.y
            && self.view.center_y <= rect.bottom();
        contains_center
            || (0..3).any(|i| {
                (0..3).any(|j| {
                    self.on_screen(
                        rect.x + rect.width * f64::from(i) / 2.0,
                        rect.y + rect.height * f64::from(j) / 2.0,
                    )
                })
            })
    }

    /// Distance of a tile center from the view center, in view extents.
    fn center_distance(&self, rect: &Rect) -> f64 {
        let dx = if self.geometry.projection.wraps_horizontally() {
            wrapped_delta(self.view.center_x, rect.center_x())
        } else {
            rect.center_x() - self.view.center_x
        };
        let dy = rect.center_y() - self.view.center_y;
        (dx / self.view.width).hypot(dy / self.view.height)
    }

    /// Score in (0, 1]: fuller coverage and nearer the center score higher.
    fn visible_score(&self, layer: u32, column: u32, row: u32, windows: &[Rect]) -> f64 {
        let rect = self.pyramid.tile_rect(layer, column, row);
        let covered: f64 = windows
            .iter()
            .filter_map(|w| w.intersection(&rect))
            .map(|r| r.area())
            .sum();
        let coverage = (covered / rect.area()).clamp(0.0, 1.0);
        let nearness = 1.0 - self.center_distance(&rect).min(1.0);
        0.5 * coverage + 0.5 * nearness.max(f64::EPSILON)
    }

    fn prefetch(
        &self,
        frame: u32,
        layer: u32,
        visible: &FxHashSet<(u32, u32)>,
        out: &mut Vec<TileRequest>,
    ) {
        let margin = i64::from(self.options.prefetch_margin);
        if margin == 0 || visible.is_empty() {
            return;
        }
        let (cols, rows) = self.pyramid.grid(layer);
        let (cols, rows) = (i64::from(cols), i64::from(rows));
        let wraps = self.geometry.projection.wraps_horizontally();
        let mut ring = FxHashSet::default();
        for &(column, row) in visible {
            for dc in -margin..=margin {
                for dr in -margin..=margin {
                    let mut c = i64::from(column) + dc;
                    let r = i64::from(row) + dr;
                    if wraps {
                        c = c.rem_euclid(cols);
                    }
                    if c < 0 || c >= cols || r < 0 || r >= rows {
                        continue;
                    }
                    let cell = (c as u32, r as u32);
                    if !visible.contains(&cell) {
                        let _ = ring.insert(cell);
                    }
                }
            }
        }
        for (column, row) in ring {
            let rect = self.pyramid.tile_rect(layer, column, row);
            let nearness = 1.0 / (1.0 + self.center_distance(&rect));
            out.push(TileRequest {
                id: self.tile(frame, layer, column, row),
                kind: TileKind::Prefetch,
                priority: nearness,
            });
        }
    }

    /// Coarsest-layer tiles for the displayed frame, plus nearby omni
    /// frames. Skipped where the target layer already is the coarsest.
    fn fallback(&self, frame: u32, layer: u32, out: &mut Vec<TileRequest>) {
        let mut frames = vec![(frame, 0)];
        if let Projection::Omni(params) = self.geometry.projection {
            if let Some((current, ring)) = self.canvas.omni_frame() {
                let window = self.options.omni_frame_window;
                for f in 0..params.frame_count {
                    let distance = params.frame_distance(f, current);
                    if distance > 0 && distance <= window {
                        frames.push((ring * params.frame_count + f, distance));
                    }
                }
            }
        }
        let (cols, rows) = self.pyramid.grid(0);
        for (f, distance) in frames {
            if f == frame && layer == 0 {
                continue;
            }
            for column in 0..cols {
                for row in 0..rows {
                    out.push(TileRequest {
                        id: self.tile(f, 0, column, row),
                        kind: TileKind::Fallback,
                        priority: 2.0 + 1.0 / (1.0 + f64::from(distance)),
                    });
                }
            }
        }
    }
}
