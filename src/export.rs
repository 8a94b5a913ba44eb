//! Heightmap export: PNG images and terminal previews.

use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

use crate::tilemap::Tilemap;

/// Bring a value produced with `height_scaling = scale` back into [0, 1].
fn unit(value: f32, scale: f32) -> f32 {
    if scale == 0.0 {
        0.0
    } else {
        (value / scale).clamp(0.0, 1.0)
    }
}

/// Export a heightmap as an 8-bit grayscale PNG.
/// `scale` is the height scaling the map was generated with.
pub fn export_heightmap<P: AsRef<Path>>(
    heightmap: &Tilemap<f32>,
    scale: f32,
    path: P,
) -> Result<(), image::ImageError> {
    let mut img: GrayImage = ImageBuffer::new(heightmap.width as u32, heightmap.height as u32);

    for (x, y, &val) in heightmap.iter() {
        let level = (unit(val, scale) * 255.0).round() as u8;
        img.put_pixel(x as u32, y as u32, Luma([level]));
    }

    img.save(path)
}

/// Export a heightmap using a spectral colormap.
pub fn export_heightmap_spectral<P: AsRef<Path>>(
    heightmap: &Tilemap<f32>,
    scale: f32,
    path: P,
) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(heightmap.width as u32, heightmap.height as u32);

    for (x, y, &val) in heightmap.iter() {
        img.put_pixel(x as u32, y as u32, Rgb(spectral_colormap(unit(val, scale))));
    }

    img.save(path)
}

/// Spectral colormap (matplotlib style): dark blue -> cyan -> green -> yellow -> orange -> red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],  // Dark blue/purple (low)
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],  // Dark red (high)
    ];

    let t_scaled = t.clamp(0.0, 1.0) * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f32;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}

// ============================================================================
// ASCII PREVIEW
// ============================================================================

/// ASCII character for a normalized elevation (11-level gradient)
pub fn height_char(normalized: f32) -> char {
    const CHARS: &[char] = &['~', '.', '-', '=', '+', '*', '#', '%', '^', 'A', 'M'];
    let idx = (normalized.clamp(0.0, 1.0) * (CHARS.len() - 1) as f32) as usize;
    CHARS[idx.min(CHARS.len() - 1)]
}

/// Render a heightmap as text, skipping cells so at most `max_width`
/// columns are printed. Rows are sampled at the same stride.
pub fn render_ascii(heightmap: &Tilemap<f32>, scale: f32, max_width: usize) -> String {
    let stride = heightmap.width.div_ceil(max_width.max(1)).max(1);
    let cols = heightmap.width.div_ceil(stride);
    let rows = heightmap.height.div_ceil(stride);
    let mut result = String::with_capacity((cols + 1) * rows);

    for y in (0..heightmap.height).step_by(stride) {
        for x in (0..heightmap.width).step_by(stride) {
            result.push(height_char(unit(*heightmap.get(x, y), scale)));
        }
        result.push('\n');
    }

    result
}

/// Generate height legend
pub fn height_legend() -> String {
    "=== HEIGHT LEGEND ===\n\
     Low → High:\n\
     ~ . - = + * # % ^ A M\n\
     (0.0)           (1.0)\n".to_string()
}
