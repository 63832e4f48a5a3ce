//! Zoom-layer arithmetic for one tiled image.
//!
//! Layer 0 is the coarsest: the whole image fits in one tile. Each finer
//! layer doubles the resolution up to `max_layer`, which is the source
//! image itself.

use crate::camera::Rect;

/// Layer geometry of a tiled image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePyramid {
    width: f64,
    height: f64,
    tile_size: f64,
    max_layer: u32,
}

impl TilePyramid {
    /// Pyramid for an image of `width`×`height` pixels cut into
    /// `tile_size` tiles.
    #[must_use]
    pub fn new(width: f64, height: f64, tile_size: u32) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let tile_size = f64::from(tile_size.max(1));
        let ratio = width.max(height) / tile_size;
        let max_layer = if ratio > 1.0 { ratio.log2().ceil() as u32 } else { 0 };
        Self {
            width,
            height,
            tile_size,
            max_layer,
        }
    }

    /// Finest layer (full resolution).
    #[must_use]
    pub fn max_layer(&self) -> u32 {
        self.max_layer
    }

    /// How many halvings `layer` is from full resolution.
    #[must_use]
    pub fn downsample_exponent(&self, layer: u32) -> u32 {
        self.max_layer.saturating_sub(layer)
    }

    /// Pixel size of `layer`.
    #[must_use]
    pub fn layer_size(&self, layer: u32) -> (f64, f64) {
        let factor = f64::from(self.downsample_exponent(layer)).exp2();
        (
            (self.width / factor).ceil().max(1.0),
            (self.height / factor).ceil().max(1.0),
        )
    }

    /// Columns and rows of `layer`.
    #[must_use]
    pub fn grid(&self, layer: u32) -> (u32, u32) {
        let (w, h) = self.layer_size(layer);
        (
            (w / self.tile_size).ceil() as u32,
            (h / self.tile_size).ceil() as u32,
        )
    }

    /// Layer whose resolution best matches the image drawn `scale` screen
    /// pixels per image pixel on a `device_pixel_ratio` display.
    #[must_use]
    pub fn target_layer(&self, scale: f64, device_pixel_ratio: f64) -> u32 {
        let resolution = self.width * scale * device_pixel_ratio;
        let level = (resolution / self.tile_size).log2().floor();
        if level.is_nan() || level < 0.0 {
            0
        } else {
            (level as u32).min(self.max_layer)
        }
    }

    /// Normalized rectangle covered by a tile.
    #[must_use]
    pub fn tile_rect(&self, layer: u32, column: u32, row: u32) -> Rect {
        let (w, h) = self.layer_size(layer);
        let x0 = f64::from(column) * self.tile_size;
        let y0 = f64::from(row) * self.tile_size;
        Rect::from_edges(
            x0 / w,
            y0 / h,
            (x0 + self.tile_size).min(w) / w,
            (y0 + self.tile_size).min(h) / h,
        )
    }

    /// Inclusive column and row ranges of `layer` tiles touching `rect`
    /// (normalized), or `None` when the rect misses the image.
    #[must_use]
    pub fn tile_range(&self, layer: u32, rect: &Rect) -> Option<((u32, u32), (u32, u32))> {
        let clipped = rect.intersection(&Rect::UNIT)?;
        let (w, h) = self.layer_size(layer);
        let (cols, rows) = self.grid(layer);
        let span = |lo: f64, hi: f64, extent: f64, count: u32| {
            let first = (lo * extent / self.tile_size).floor().max(0.0) as u32;
            let last = ((hi * extent / self.tile_size).ceil() as u32).max(first + 1) - 1;
            (first.min(count - 1), last.min(count - 1))
        };
        Some((
            span(clipped.x, clipped.right(), w, cols),
            span(clipped.y, clipped.bottom(), h, rows),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_count() {
        assert_eq!(TilePyramid::new(4096.0, 4096.0, 256).max_layer(), 4);
        assert_eq!(TilePyramid::new(2048.0, 2048.0, 256).max_layer(), 3);
        assert_eq!(TilePyramid::new(3000.0, 1000.0, 256).max_layer(), 4);
        assert_eq!(TilePyramid::new(200.0, 100.0, 256).max_layer(), 0);
    }

    #[test]
    fn test_layer_sizes_and_grids() {
        let p = TilePyramid::new(3000.0, 1000.0, 256);
        assert_eq!(p.layer_size(4), (3000.0, 1000.0));
        assert_eq!(p.grid(4), (12, 4));
        assert_eq!(p.layer_size(0), (188.0, 63.0));
        assert_eq!(p.grid(0), (1, 1));
    }

    #[test]
    fn test_target_layer() {
        let p = TilePyramid::new(2048.0, 2048.0, 256);
        // whole image on 512 px
        assert_eq!(p.target_layer(0.25, 1.0), 1);
        assert_eq!(p.downsample_exponent(1), 2);
        assert_eq!(p.grid(1), (2, 2));
        // high-DPI screens need a finer layer
        assert_eq!(p.target_layer(0.25, 2.0), 2);
        assert_eq!(p.target_layer(100.0, 1.0), 3);
        assert_eq!(p.target_layer(0.001, 1.0), 0);
        assert_eq!(p.target_layer(f64::NAN, 1.0), 0);
    }

    #[test]
    fn test_tile_rects_partition_the_image() {
        let p = TilePyramid::new(600.0, 300.0, 256);
        let (cols, rows) = p.grid(p.max_layer());
        assert_eq!((cols, rows), (3, 2));
        let total: f64 = (0..cols)
            .flat_map(|c| (0..rows).map(move |r| (c, r)))
            .map(|(c, r)| p.tile_rect(p.max_layer(), c, r).area())
            .sum();
        assert!((total - 1.0).abs() < 1e-12);
        let last = p.tile_rect(p.max_layer(), 2, 1);
        assert!((last.right() - 1.0).abs() < 1e-12 && (last.bottom() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tile_range() {
        let p = TilePyramid::new(1024.0, 1024.0, 256);
        let range = p.tile_range(2, &Rect::new(0.3, 0.3, 0.2, 0.2));
        assert_eq!(range, Some(((1, 1), (1, 1))));
        let range = p.tile_range(2, &Rect::new(-1.0, 0.0, 1.5, 1.0));
        assert_eq!(range, Some(((0, 1), (0, 3))));
        assert_eq!(p.tile_range(2, &Rect::new(1.5, 0.0, 0.5, 1.0)), None);
    }
}
