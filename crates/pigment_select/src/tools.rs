//! Interactive selection tools
//!
//! Each tool tracks its gesture through [`SelectionPhase`]:
//!
//! ```text
//! Idle ──down──▶ Drawing ──commit──▶ Committed
//!                   │
//!                   └──cancel / too small──▶ Cancelled
//! ```
//!
//! Committed and Cancelled tools start a new gesture on the next pointer
//! down. Pointer handlers return a [`SelectionOutcome`] telling the caller
//! what to do with the document selection.
//!
//! Minimum sizes: a rectangle must be wider and taller than 1px, a lasso or
//! click polygon needs more than 2 vertices. Smaller gestures clear the
//! selection instead of committing.

use pigment_core::{Point, Rect, StateMachine};

use crate::selection::Selection;

/// Gesture state of a selection tool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SelectionPhase {
    #[default]
    Idle,
    Drawing,
    Committed,
    Cancelled,
}

/// Inputs of the phase machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    Begin,
    Commit,
    Cancel,
}

/// What the caller should do after a tool handled an event
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SelectionOutcome {
    #[default]
    None,
    /// Show an in-progress outline; the document selection is unchanged
    Preview(Selection),
    /// Replace the document selection
    Commit(Selection),
    /// Remove the document selection
    Clear,
}

/// Selection tool variants
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectKind {
    Rectangle,
    Freehand,
    Polygon,
    MagicWand,
}

fn phase_machine() -> StateMachine<SelectionPhase, PhaseEvent> {
    use SelectionPhase::*;
    StateMachine::builder(Idle)
        .on_any(&[Idle, Committed, Cancelled], PhaseEvent::Begin, Drawing)
        .on(Drawing, PhaseEvent::Commit, Committed)
        .on(Drawing, PhaseEvent::Cancel, Cancelled)
        .build()
}

/// Pointer-driven selection tool
pub trait SelectionTool: Send {
    fn kind(&self) -> SelectKind;

    fn phase(&self) -> SelectionPhase;

    fn pointer_down(&mut self, point: Point) -> SelectionOutcome;

    fn pointer_move(&mut self, point: Point) -> SelectionOutcome;

    fn pointer_up(&mut self, point: Point) -> SelectionOutcome;

    fn double_click(&mut self, _point: Point) -> SelectionOutcome {
        SelectionOutcome::None
    }

    /// Out-of-band request to finish the gesture
    fn close(&mut self) -> SelectionOutcome {
        SelectionOutcome::None
    }

    /// Abandon an in-progress gesture. Returns whether one was abandoned.
    fn cancel(&mut self) -> bool;
}

/// Build the interactive tool for `kind`. The magic wand acts on a single
/// click and has no gesture state, so it has no tool object.
pub fn tool_for(kind: SelectKind) -> Option<Box<dyn SelectionTool>> {
    match kind {
        SelectKind::Rectangle => Some(Box::new(RectSelectTool::new())),
        SelectKind::Freehand => Some(Box::new(FreehandSelectTool::new())),
        SelectKind::Polygon => Some(Box::new(PolygonSelectTool::new())),
        SelectKind::MagicWand => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rectangle
// ─────────────────────────────────────────────────────────────────────────────

/// Drag-rectangle state in document coordinates
#[derive(Clone, Copy, Debug, Default)]
struct DragRect {
    active: bool,
    start: Point,
    current: Point,
}

impl DragRect {
    fn begin(&mut self, point: Point) {
        self.active = true;
        self.start = point;
        self.current = point;
    }

    fn update(&mut self, point: Point) {
        if self.active {
            self.current = point;
        }
    }

    fn rect(&self) -> Option<Rect> {
        self.active
            .then(|| Rect::from_corners(self.start, self.current))
    }

    fn take_final(&mut self) -> Option<Rect> {
        let rect = self.rect();
        self.active = false;
        rect
    }
}

/// Rectangular marquee
#[derive(Debug)]
pub struct RectSelectTool {
    drag: DragRect,
    phase: StateMachine<SelectionPhase, PhaseEvent>,
}

impl Default for RectSelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl RectSelectTool {
    pub fn new() -> Self {
        Self {
            drag: DragRect::default(),
            phase: phase_machine(),
        }
    }
}

impl SelectionTool for RectSelectTool {
    fn kind(&self) -> SelectKind {
        SelectKind::Rectangle
    }

    fn phase(&self) -> SelectionPhase {
        self.phase.current_state()
    }

    fn pointer_down(&mut self, point: Point) -> SelectionOutcome {
        self.phase.send(PhaseEvent::Begin);
        self.drag.begin(point);
        SelectionOutcome::None
    }

    fn pointer_move(&mut self, point: Point) -> SelectionOutcome {
        self.drag.update(point);
        self.drag
            .rect()
            .map_or(SelectionOutcome::None, |r| SelectionOutcome::Preview(Selection::Rectangle(r)))
    }

    fn pointer_up(&mut self, point: Point) -> SelectionOutcome {
        self.drag.update(point);
        let Some(rect) = self.drag.take_final() else {
            return SelectionOutcome::None;
        };
        if rect.width() > 1.0 && rect.height() > 1.0 {
            self.phase.send(PhaseEvent::Commit);
            tracing::debug!(?rect, "rectangle selection committed");
            SelectionOutcome::Commit(Selection::Rectangle(rect))
        } else {
            self.phase.send(PhaseEvent::Cancel);
            SelectionOutcome::Clear
        }
    }

    fn cancel(&mut self) -> bool {
        self.drag.take_final();
        self.phase.is_in(SelectionPhase::Drawing)
            && self.phase.send(PhaseEvent::Cancel) == SelectionPhase::Cancelled
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Freehand
// ─────────────────────────────────────────────────────────────────────────────

/// Lasso: every pointer move adds a vertex
#[derive(Debug)]
pub struct FreehandSelectTool {
    points: Vec<Point>,
    phase: StateMachine<SelectionPhase, PhaseEvent>,
}

impl Default for FreehandSelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl FreehandSelectTool {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            phase: phase_machine(),
        }
    }

    fn push(&mut self, point: Point) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }
}

impl SelectionTool for FreehandSelectTool {
    fn kind(&self) -> SelectKind {
        SelectKind::Freehand
    }

    fn phase(&self) -> SelectionPhase {
        self.phase.current_state()
    }

    fn pointer_down(&mut self, point: Point) -> SelectionOutcome {
        self.phase.send(PhaseEvent::Begin);
        self.points.clear();
        self.points.push(point);
        SelectionOutcome::None
    }

    fn pointer_move(&mut self, point: Point) -> SelectionOutcome {
        if !self.phase.is_in(SelectionPhase::Drawing) {
            return SelectionOutcome::None;
        }
        self.push(point);
        SelectionOutcome::Preview(Selection::Polygon {
            points: self.points.clone(),
            closed: false,
        })
    }

    fn pointer_up(&mut self, point: Point) -> SelectionOutcome {
        if !self.phase.is_in(SelectionPhase::Drawing) {
            return SelectionOutcome::None;
        }
        self.push(point);
        let points = std::mem::take(&mut self.points);
        if points.len() > 2 {
            self.phase.send(PhaseEvent::Commit);
            tracing::debug!(vertices = points.len(), "freehand selection committed");
            SelectionOutcome::Commit(Selection::Polygon {
                points,
                closed: true,
            })
        } else {
            self.phase.send(PhaseEvent::Cancel);
            SelectionOutcome::Clear
        }
    }

    fn cancel(&mut self) -> bool {
        self.points.clear();
        self.phase.is_in(SelectionPhase::Drawing)
            && self.phase.send(PhaseEvent::Cancel) == SelectionPhase::Cancelled
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Polygon by clicks
// ─────────────────────────────────────────────────────────────────────────────

/// Click-by-click polygon. Stays in `Drawing` across clicks and commits on
/// a double-click or [`close`](SelectionTool::close), closing the path back
/// to the first vertex.
#[derive(Debug)]
pub struct PolygonSelectTool {
    vertices: Vec<Point>,
    cursor: Option<Point>,
    phase: StateMachine<SelectionPhase, PhaseEvent>,
}

impl Default for PolygonSelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonSelectTool {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            cursor: None,
            phase: phase_machine(),
        }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Rubber-band segment from the last vertex to the pointer
    pub fn preview_segment(&self) -> Option<(Point, Point)> {
        if !self.phase.is_in(SelectionPhase::Drawing) {
            return None;
        }
        Some((*self.vertices.last()?, self.cursor?))
    }

    fn preview(&self) -> SelectionOutcome {
        let mut points = self.vertices.clone();
        if let Some(cursor) = self.cursor {
            if points.last() != Some(&cursor) {
                points.push(cursor);
            }
        }
        SelectionOutcome::Preview(Selection::Polygon {
            points,
            closed: false,
        })
    }

    fn finish(&mut self) -> SelectionOutcome {
        if !self.phase.is_in(SelectionPhase::Drawing) {
            return SelectionOutcome::None;
        }
        self.cursor = None;
        let points = std::mem::take(&mut self.vertices);
        if points.len() > 2 {
            self.phase.send(PhaseEvent::Commit);
            tracing::debug!(vertices = points.len(), "polygon selection committed");
            SelectionOutcome::Commit(Selection::Polygon {
                points,
                closed: true,
            })
        } else {
            self.phase.send(PhaseEvent::Cancel);
            SelectionOutcome::Clear
        }
    }
}

impl SelectionTool for PolygonSelectTool {
    fn kind(&self) -> SelectKind {
        SelectKind::Polygon
    }

    fn phase(&self) -> SelectionPhase {
        self.phase.current_state()
    }

    fn pointer_down(&mut self, point: Point) -> SelectionOutcome {
        if !self.phase.is_in(SelectionPhase::Drawing) {
            self.phase.send(PhaseEvent::Begin);
            self.vertices.clear();
        }
        // the clicks of a double-click land on the same spot
        if self.vertices.last() != Some(&point) {
            self.vertices.push(point);
        }
        self.cursor = Some(point);
        self.preview()
    }

    fn pointer_move(&mut self, point: Point) -> SelectionOutcome {
        self.cursor = Some(point);
        if self.phase.is_in(SelectionPhase::Drawing) {
            self.preview()
        } else {
            SelectionOutcome::None
        }
    }

    fn pointer_up(&mut self, _point: Point) -> SelectionOutcome {
        SelectionOutcome::None
    }

    fn double_click(&mut self, point: Point) -> SelectionOutcome {
        if self.phase.is_in(SelectionPhase::Drawing) && self.vertices.last() != Some(&point) {
            self.vertices.push(point);
        }
        self.finish()
    }

    fn close(&mut self) -> SelectionOutcome {
        self.finish()
    }

    fn cancel(&mut self) -> bool {
        self.vertices.clear();
        self.cursor = None;
        self.phase.is_in(SelectionPhase::Drawing)
            && self.phase.send(PhaseEvent::Cancel) == SelectionPhase::Cancelled
    }
}
