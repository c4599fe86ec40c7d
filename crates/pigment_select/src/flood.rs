//! Flood fill region computation
//!
//! A pixel matches when its Euclidean RGBA distance to the seed pixel is
//! at most `tolerance` (0 to 510). Contiguous fills grow 4-connected from
//! the seed; non-contiguous fills take every matching pixel on the surface.

use pigment_core::{rgba_distance, Pixel};
use pigment_paint::RasterSurface;

use crate::selection::MaskRegion;

/// Pixels matching the seed color. Empty for a zero-size surface or a seed
/// outside it.
pub fn flood_fill<S: RasterSurface + ?Sized>(
    surface: &S,
    seed: (i32, i32),
    tolerance: f32,
    contiguous: bool,
) -> MaskRegion {
    let (width, height) = (surface.width(), surface.height());
    let mut region = MaskRegion::new(width, height);
    if width == 0 || height == 0 || !surface.contains(seed.0, seed.1) {
        tracing::debug!(?seed, width, height, "flood fill seed outside surface");
        return region;
    }

    let target = surface.get_pixel(seed.0, seed.1);
    let tolerance = if tolerance.is_nan() { 0.0 } else { tolerance.max(0.0) };
    let matches = |pixel: Pixel| rgba_distance(pixel, target) <= tolerance;

    if contiguous {
        let mut visited = vec![false; width as usize * height as usize];
        let mut stack = vec![(seed.0 as u32, seed.1 as u32)];
        visited[seed.1 as usize * width as usize + seed.0 as usize] = true;

        while let Some((x, y)) = stack.pop() {
            if !matches(surface.get_pixel(x as i32, y as i32)) {
                continue;
            }
            region.insert(x, y);

            let neighbors = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbors {
                if nx >= width || ny >= height {
                    continue;
                }
                let idx = ny as usize * width as usize + nx as usize;
                if !visited[idx] {
                    visited[idx] = true;
                    stack.push((nx, ny));
                }
            }
        }
    } else {
        for y in 0..height {
            for x in 0..width {
                if matches(surface.get_pixel(x as i32, y as i32)) {
                    region.insert(x, y);
                }
            }
        }
    }

    tracing::debug!(
        ?seed,
        tolerance,
        contiguous,
        selected = region.len(),
        "flood fill"
    );
    region
}
