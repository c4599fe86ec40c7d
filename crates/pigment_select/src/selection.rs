//! Selection regions
//!
//! A document has at most one [`Selection`]. Setting a new one replaces the
//! old one. No selection means no spatial restriction, so
//! [`SelectionEngine::allows`] admits every pixel in that case while
//! [`SelectionEngine::is_point_in_selection`] reports `false`.

use pigment_core::{Point, Rect};
use rustc_hash::FxHashSet;

use crate::polygon::point_in_polygon;

/// A set of pixels on a `width × height` grid, as produced by flood fill
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaskRegion {
    width: u32,
    height: u32,
    pixels: FxHashSet<(u32, u32)>,
}

impl MaskRegion {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: FxHashSet::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Add a pixel; coordinates outside the grid are ignored
    pub fn insert(&mut self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels.insert((x, y))
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && self.pixels.contains(&(x as u32, y as u32))
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pixels.iter().copied()
    }

    /// Pixels with at least one 4-neighbour outside the region (the grid
    /// edge counts as outside), sorted row by row
    pub fn boundary(&self) -> Vec<(u32, u32)> {
        let mut edge: Vec<(u32, u32)> = self
            .pixels
            .iter()
            .copied()
            .filter(|&(x, y)| {
                let (x, y) = (x as i32, y as i32);
                [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
                    .iter()
                    .any(|&(nx, ny)| !self.contains(nx, ny))
            })
            .collect();
        edge.sort_unstable_by_key(|&(x, y)| (y, x));
        edge
    }

    /// Smallest rectangle covering every pixel
    pub fn bounds(&self) -> Option<Rect> {
        let mut iter = self.pixels.iter();
        let &(x, y) = iter.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (x, y, x, y);
        for &(x, y) in iter {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Some(Rect::new(
            x0 as f32,
            y0 as f32,
            (x1 - x0 + 1) as f32,
            (y1 - y0 + 1) as f32,
        ))
    }
}

impl FromIterator<(u32, u32)> for MaskRegion {
    /// Collect pixels into a region sized to fit them
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        let pixels: FxHashSet<(u32, u32)> = iter.into_iter().collect();
        let width = pixels.iter().map(|&(x, _)| x + 1).max().unwrap_or(0);
        let height = pixels.iter().map(|&(_, y)| y + 1).max().unwrap_or(0);
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// A selected region
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Rectangle(Rect),
    /// Open polygons are tested as if closed
    Polygon { points: Vec<Point>, closed: bool },
    Mask(MaskRegion),
}

impl Selection {
    /// Whether a document-space point lies in the region. Rectangles include
    /// all four edges; masks test the pixel containing the point.
    pub fn contains(&self, point: Point) -> bool {
        match self {
            Selection::Rectangle(rect) => rect.normalized().contains(point),
            Selection::Polygon { points, .. } => point_in_polygon(point, points),
            Selection::Mask(mask) => mask.contains(point.x.floor() as i32, point.y.floor() as i32),
        }
    }

    /// Whether pixel `(x, y)` is selected, tested at its centre
    pub fn contains_pixel(&self, x: i32, y: i32) -> bool {
        match self {
            Selection::Mask(mask) => mask.contains(x, y),
            _ => self.contains(Point::new(x as f32 + 0.5, y as f32 + 0.5)),
        }
    }

    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Selection::Rectangle(rect) => Some(rect.normalized()),
            Selection::Polygon { points, .. } => Rect::bounding(points),
            Selection::Mask(mask) => mask.bounds(),
        }
    }
}

/// Holds the document's current selection
#[derive(Clone, Debug, Default)]
pub struct SelectionEngine {
    current: Option<Selection>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current selection
    pub fn set_selection(&mut self, selection: Selection) {
        tracing::debug!(bounds = ?selection.bounds(), "selection set");
        self.current = Some(selection);
    }

    /// Drop the current selection. Returns whether there was one.
    pub fn clear_selection(&mut self) -> bool {
        let had = self.current.take().is_some();
        if had {
            tracing::debug!("selection cleared");
        }
        had
    }

    pub fn has_selection(&self) -> bool {
        self.current.is_some()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    /// `false` when there is no selection
    pub fn is_point_in_selection(&self, x: f32, y: f32) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.contains(Point::new(x, y)))
    }

    /// Paint clip test: every pixel passes when nothing is selected
    pub fn allows(&self, x: i32, y: i32) -> bool {
        self.current
            .as_ref()
            .map_or(true, |s| s.contains_pixel(x, y))
    }
}
