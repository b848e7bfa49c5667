/// The rendering engine
///
/// Takes a filter kind, its parameter values and an input bitmap, and
/// produces a new output bitmap. The session never touches pixels itself;
/// everything pixel-shaped lives behind the `RenderEngine` trait so tests
/// can substitute a recording engine.

use image::RgbaImage;

use super::kind::{FilterKind, FilterParams};

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Input image has an unsupported extent: {width}x{height}")]
    EmptyInput { width: u32, height: u32 },
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Renders one output bitmap from a filter configuration
pub trait RenderEngine {
    fn render(
        &self,
        kind: FilterKind,
        params: &FilterParams,
        input: &RgbaImage,
    ) -> EngineResult<RgbaImage>;
}

/// CPU implementation of all seven filters
///
/// Blur-based filters delegate to the `image` crate's gaussian blur; the
/// rest are plain per-pixel passes.
#[derive(Debug, Default)]
pub struct CpuEngine;

impl CpuEngine {
    pub fn new() -> Self {
        Self
    }
}

impl RenderEngine for CpuEngine {
    fn render(
        &self,
        kind: FilterKind,
        params: &FilterParams,
        input: &RgbaImage,
    ) -> EngineResult<RgbaImage> {
        let (width, height) = input.dimensions();
        if width == 0 || height == 0 {
            return Err(EngineError::EmptyInput { width, height });
        }

        let output = match kind {
            FilterKind::Crystallize => crystallize(input, params.radius.unwrap_or(20.0)),
            FilterKind::Edges => edges(input, params.intensity.unwrap_or(1.0)),
            FilterKind::GaussianBlur => gaussian_blur(input, params.radius.unwrap_or(10.0)),
            FilterKind::Pixellate => pixellate(input, params.scale.unwrap_or(8.0)),
            FilterKind::SepiaTone => sepia_tone(input, params.intensity.unwrap_or(1.0)),
            FilterKind::UnsharpMask => unsharp_mask(
                input,
                params.radius.unwrap_or(2.5),
                params.intensity.unwrap_or(0.5),
            ),
            FilterKind::Vignette => vignette(
                input,
                params.intensity.unwrap_or(0.0),
                params.radius.unwrap_or(100.0),
            ),
        };

        Ok(output)
    }
}

/// Classic sepia matrix, blended with the original by intensity
fn sepia_tone(input: &RgbaImage, intensity: f32) -> RgbaImage {
    let intensity = intensity.clamp(0.0, 1.0);
    let mut output = input.clone();

    for pixel in output.pixels_mut() {
        let r = pixel[0] as f32;
        let g = pixel[1] as f32;
        let b = pixel[2] as f32;

        let tr = (0.393 * r + 0.769 * g + 0.189 * b).min(255.0);
        let tg = (0.349 * r + 0.686 * g + 0.168 * b).min(255.0);
        let tb = (0.272 * r + 0.534 * g + 0.131 * b).min(255.0);

        pixel[0] = (r * (1.0 - intensity) + tr * intensity) as u8;
        pixel[1] = (g * (1.0 - intensity) + tg * intensity) as u8;
        pixel[2] = (b * (1.0 - intensity) + tb * intensity) as u8;
    }

    output
}

/// Gaussian blur via the image crate
///
/// The radius convention (0..200 from the slider) maps to sigma with the
/// usual radius ≈ 3σ rule of thumb.
fn gaussian_blur(input: &RgbaImage, radius: f32) -> RgbaImage {
    let sigma = radius / 3.0;
    if sigma <= 0.0 {
        return input.clone();
    }
    image::imageops::blur(input, sigma)
}

/// Block-average mosaic
fn pixellate(input: &RgbaImage, scale: f32) -> RgbaImage {
    let block = (scale.round() as u32).max(1);
    let (width, height) = input.dimensions();
    let mut output = input.clone();

    for y in (0..height).step_by(block as usize) {
        for x in (0..width).step_by(block as usize) {
            let y_end = (y + block).min(height);
            let x_end = (x + block).min(width);

            // Average color over the block
            let mut sum_r = 0u32;
            let mut sum_g = 0u32;
            let mut sum_b = 0u32;
            let mut count = 0u32;

            for by in y..y_end {
                for bx in x..x_end {
                    let pixel = input.get_pixel(bx, by);
                    sum_r += pixel[0] as u32;
                    sum_g += pixel[1] as u32;
                    sum_b += pixel[2] as u32;
                    count += 1;
                }
            }

            let avg_r = (sum_r / count) as u8;
            let avg_g = (sum_g / count) as u8;
            let avg_b = (sum_b / count) as u8;

            for by in y..y_end {
                for bx in x..x_end {
                    let pixel = output.get_pixel_mut(bx, by);
                    pixel[0] = avg_r;
                    pixel[1] = avg_g;
                    pixel[2] = avg_b;
                }
            }
        }
    }

    output
}

/// Sobel edge magnitude, scaled by intensity
fn edges(input: &RgbaImage, intensity: f32) -> RgbaImage {
    let mut output = input.clone();

    let sobel_x: [i32; 9] = [-1, 0, 1, -2, 0, 2, -1, 0, 1];
    let sobel_y: [i32; 9] = [-1, -2, -1, 0, 0, 0, 1, 2, 1];

    // Border pixels keep their original value
    for y in 1..input.height().saturating_sub(1) {
        for x in 1..input.width().saturating_sub(1) {
            let mut gx = 0i32;
            let mut gy = 0i32;

            for ky in -1i32..=1 {
                for kx in -1i32..=1 {
                    let px = (x as i32 + kx) as u32;
                    let py = (y as i32 + ky) as u32;
                    let pixel = input.get_pixel(px, py);
                    let gray = (pixel[0] as i32 + pixel[1] as i32 + pixel[2] as i32) / 3;

                    let ki = ((ky + 1) * 3 + (kx + 1)) as usize;
                    gx += gray * sobel_x[ki];
                    gy += gray * sobel_y[ki];
                }
            }

            let magnitude = ((gx * gx + gy * gy) as f32).sqrt() * intensity;
            let value = magnitude.clamp(0.0, 255.0) as u8;
            let pixel = output.get_pixel_mut(x, y);
            pixel[0] = value;
            pixel[1] = value;
            pixel[2] = value;
        }
    }

    output
}

/// Crystal-cell mosaic: a jittered grid of seed points, every pixel takes
/// the color of its nearest seed
///
/// The jitter comes from an integer hash of the cell coordinates, so two
/// renders of the same inputs are bit-identical.
fn crystallize(input: &RgbaImage, radius: f32) -> RgbaImage {
    let cell = (radius.round() as u32).max(1);
    let (width, height) = input.dimensions();
    let mut output = input.clone();

    let cells_x = width.div_ceil(cell) as i32;
    let cells_y = height.div_ceil(cell) as i32;

    // Seed position inside a cell, jittered deterministically
    let seed = |cx: i32, cy: i32| -> (f32, f32) {
        let h = cell_hash(cx, cy);
        let jx = (h & 0xffff) as f32 / 65535.0;
        let jy = ((h >> 16) & 0xffff) as f32 / 65535.0;
        let sx = (cx as f32 + jx) * cell as f32;
        let sy = (cy as f32 + jy) * cell as f32;
        (
            sx.min(width as f32 - 1.0),
            sy.min(height as f32 - 1.0),
        )
    };

    for y in 0..height {
        for x in 0..width {
            let cx = (x / cell) as i32;
            let cy = (y / cell) as i32;

            // Nearest seed among the 3x3 neighborhood of cells
            let mut best = (x as f32, y as f32);
            let mut best_dist = f32::MAX;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let nx = cx + dx;
                    let ny = cy + dy;
                    if nx < 0 || ny < 0 || nx >= cells_x || ny >= cells_y {
                        continue;
                    }
                    let (sx, sy) = seed(nx, ny);
                    let ddx = sx - x as f32;
                    let ddy = sy - y as f32;
                    let dist = ddx * ddx + ddy * ddy;
                    if dist < best_dist {
                        best_dist = dist;
                        best = (sx, sy);
                    }
                }
            }

            let source = input.get_pixel(best.0 as u32, best.1 as u32);
            let pixel = output.get_pixel_mut(x, y);
            pixel[0] = source[0];
            pixel[1] = source[1];
            pixel[2] = source[2];
        }
    }

    output
}

/// Integer hash for crystallize cell jitter (splitmix-style mixing)
fn cell_hash(cx: i32, cy: i32) -> u32 {
    let mut h = (cx as u32).wrapping_mul(0x9e37_79b9) ^ (cy as u32).wrapping_mul(0x85eb_ca6b);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^ (h >> 16)
}

/// Unsharp mask: original + (original - blurred) * amount
fn unsharp_mask(input: &RgbaImage, radius: f32, amount: f32) -> RgbaImage {
    let sigma = radius / 3.0;
    if sigma <= 0.0 || amount <= 0.0 {
        return input.clone();
    }

    let blurred = image::imageops::blur(input, sigma);
    let mut output = input.clone();

    for (pixel, soft) in output.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let original = pixel[c] as f32;
            let detail = original - soft[c] as f32;
            pixel[c] = (original + detail * amount).clamp(0.0, 255.0) as u8;
        }
    }

    output
}

/// Radial darkening toward the corners
///
/// `strength` is how dark the corners get, `radius` (0..200) is how far
/// from the edge the falloff starts.
fn vignette(input: &RgbaImage, strength: f32, radius: f32) -> RgbaImage {
    let strength = strength.clamp(0.0, 1.0);
    let reach = (radius / 200.0).clamp(0.0, 1.0);
    let start = 1.0 - reach;

    let (width, height) = input.dimensions();
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let max_distance = (center_x * center_x + center_y * center_y).sqrt();

    let mut output = input.clone();

    for (y, row) in output.rows_mut().enumerate() {
        for (x, pixel) in row.enumerate() {
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let normalized = (dx * dx + dy * dy).sqrt() / max_distance;

            let t = ((normalized - start) / (1.0 - start).max(0.001)).clamp(0.0, 1.0);
            let factor = 1.0 - strength * t;

            pixel[0] = (pixel[0] as f32 * factor) as u8;
            pixel[1] = (pixel[1] as f32 * factor) as u8;
            pixel[2] = (pixel[2] as f32 * factor) as u8;
        }
    }

    output
}
