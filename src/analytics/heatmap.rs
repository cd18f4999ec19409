//! Click heatmap rasterizer.
//!
//! Each click is painted as a soft red radial gradient over a dark background,
//! scaled from the viewport it was recorded in to the raster size. Gradients
//! are composited with plain source-over alpha blending, so clustered clicks
//! build up a hotter red.

use crate::analytics::store::HeatmapPoint;

const BACKGROUND: [f32; 3] = [26.0, 26.0, 46.0]; // #1a1a2e
const HOT: [f32; 3] = [255.0, 0.0, 0.0];
const PEAK_ALPHA: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
}

impl Heatmap {
    pub fn new(width: u32, height: u32) -> Self {
        Heatmap {
            width,
            height,
            pixels: vec![BACKGROUND; (width as usize) * (height as usize)],
        }
    }

    /// Paint one gradient centred on raster position (`cx`, `cy`).
    pub fn splat(&mut self, cx: f64, cy: f64, radius: f64) {
        if radius <= 0.0 || !cx.is_finite() || !cy.is_finite() {
            return;
        }
        let x0 = (cx - radius).floor().max(0.0) as u32;
        let y0 = (cy - radius).floor().max(0.0) as u32;
        let x1 = ((cx + radius).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((cy + radius).ceil().max(0.0) as u32).min(self.height);

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist >= radius {
                    continue;
                }
                let alpha = PEAK_ALPHA * (1.0 - (dist / radius) as f32);
                let pixel = &mut self.pixels[(py * self.width + px) as usize];
                for (channel, hot) in pixel.iter_mut().zip(HOT) {
                    *channel = hot * alpha + *channel * (1.0 - alpha);
                }
            }
        }
    }

    /// RGB at (`x`, `y`), or `None` outside the raster
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, b] = self.pixels[(y * self.width + x) as usize];
        Some([r.round() as u8, g.round() as u8, b.round() as u8])
    }

    /// Opaque RGBA bytes, row-major, ready for an `ImageData`
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|[r, g, b]| [r.round() as u8, g.round() as u8, b.round() as u8, 255])
            .collect()
    }
}

/// Render `points`, recorded in a `viewport_width` x `viewport_height`
/// viewport, onto a `width` x `height` raster.
pub fn rasterize(
    points: &[HeatmapPoint],
    viewport_width: f64,
    viewport_height: f64,
    width: u32,
    height: u32,
    radius: u32,
) -> Heatmap {
    let mut heatmap = Heatmap::new(width, height);
    if viewport_width <= 0.0 || viewport_height <= 0.0 {
        return heatmap;
    }

    let scale_x = width as f64 / viewport_width;
    let scale_y = height as f64 / viewport_height;
    for point in points {
        heatmap.splat(point.x * scale_x, point.y * scale_y, radius as f64);
    }
    heatmap
}
