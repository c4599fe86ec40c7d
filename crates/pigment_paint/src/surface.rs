//! Raster surfaces
//!
//! [`RasterSurface`] is the pixel-buffer contract the engine paints into and
//! composites from. [`Surface`] is the in-memory RGBA8 implementation used
//! for layer contents.
//!
//! All coordinate access is bounds-checked: reads outside the surface return
//! transparent black and writes outside it are dropped.

use image::{imageops, Rgba, RgbaImage};
use pigment_core::{Pixel, TRANSPARENT_PIXEL};

use crate::error::{Result, SurfaceError};

/// A 2D pixel buffer
pub trait RasterSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Change the buffer size. Existing content stays anchored at the origin.
    fn resize(&mut self, width: u32, height: u32);

    fn get_pixel(&self, x: i32, y: i32) -> Pixel;

    fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel);

    fn clear(&mut self, pixel: Pixel);

    /// Copy `source` onto this surface with its top-left corner at
    /// `(dest_x, dest_y)`, clipped to both surfaces
    fn blit<S: RasterSurface + ?Sized>(&mut self, source: &S, dest_x: i32, dest_y: i32)
    where
        Self: Sized,
    {
        let x0 = dest_x.max(0);
        let y0 = dest_y.max(0);
        let x1 = (dest_x + source.width() as i32).min(self.width() as i32);
        let y1 = (dest_y + source.height() as i32).min(self.height() as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_pixel(x, y, source.get_pixel(x - dest_x, y - dest_y));
            }
        }
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }
}

/// In-memory straight-alpha RGBA8 surface
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Create a surface filled with one pixel value
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(pixel)),
        }
    }

    /// Rebuild a surface from tightly packed RGBA8 bytes
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = bytes.len();
        RgbaImage::from_raw(width, height, bytes)
            .filter(|_| actual == expected)
            .map(|image| Self { image })
            .ok_or(SurfaceError::InvalidBuffer { expected, actual })
    }

    /// Tightly packed RGBA8 copy of the contents
    pub fn to_raw(&self) -> Vec<u8> {
        self.image.as_raw().clone()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel_count(&self) -> usize {
        self.image.width() as usize * self.image.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Overwrite every pixel for which `predicate(x, y)` holds
    pub fn fill_where(&mut self, pixel: Pixel, mut predicate: impl FnMut(i32, i32) -> bool) {
        for (x, y, p) in self.image.enumerate_pixels_mut() {
            if predicate(x as i32, y as i32) {
                *p = Rgba(pixel);
            }
        }
    }

    /// Number of pixels that differ between two surfaces; a size mismatch
    /// counts every pixel of the larger one
    pub fn diff_pixel_count(&self, other: &Surface) -> usize {
        if self.image.dimensions() != other.image.dimensions() {
            return self.pixel_count().max(other.pixel_count());
        }
        self.image
            .pixels()
            .zip(other.image.pixels())
            .filter(|(a, b)| a != b)
            .count()
    }
}

impl RasterSurface for Surface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.image.dimensions() == (width, height) {
            return;
        }
        let mut resized = RgbaImage::new(width, height);
        imageops::replace(&mut resized, &self.image, 0, 0);
        self.image = resized;
    }

    fn get_pixel(&self, x: i32, y: i32) -> Pixel {
        if x < 0 || y < 0 {
            return TRANSPARENT_PIXEL;
        }
        self.image
            .get_pixel_checked(x as u32, y as u32)
            .map_or(TRANSPARENT_PIXEL, |p| p.0)
    }

    fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(p) = self.image.get_pixel_mut_checked(x as u32, y as u32) {
            *p = Rgba(pixel);
        }
    }

    fn clear(&mut self, pixel: Pixel) {
        for p in self.image.pixels_mut() {
            *p = Rgba(pixel);
        }
    }
}
