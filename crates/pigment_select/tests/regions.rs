//! Selection regions built from layer pixels and pointer gestures

use pigment_core::{Point, Rect};
use pigment_paint::{RasterSurface, Surface};
use pigment_select::{
    flood_fill, tool_for, SelectKind, Selection, SelectionEngine, SelectionOutcome, SelectionPhase,
};
use pretty_assertions::assert_eq;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

#[test]
fn flood_fill_of_uniform_surface_selects_every_pixel() {
    let surface = Surface::filled(10, 10, RED);
    let region = flood_fill(&surface, (3, 7), 0.0, true);

    assert_eq!(region.len(), 100);
    assert_eq!(region.bounds(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));

    let mut engine = SelectionEngine::new();
    engine.set_selection(Selection::Mask(region));
    assert!(engine.is_point_in_selection(0.0, 0.0));
    assert!(engine.is_point_in_selection(9.9, 9.9));
    assert!(!engine.is_point_in_selection(10.0, 5.0));
}

#[test]
fn flood_fill_stops_at_color_boundary_unless_global() {
    // Left half red, right half blue, with a red island inside the blue
    let mut surface = Surface::filled(10, 4, RED);
    for y in 0..4 {
        for x in 5..10 {
            surface.set_pixel(x, y, BLUE);
        }
    }
    surface.set_pixel(8, 1, RED);

    let contiguous = flood_fill(&surface, (0, 0), 0.0, true);
    assert_eq!(contiguous.len(), 20);
    assert!(!contiguous.contains(8, 1));

    let global = flood_fill(&surface, (0, 0), 0.0, false);
    assert_eq!(global.len(), 21);
    assert!(global.contains(8, 1));
}

#[test]
fn rectangle_gesture_commits_a_selection() {
    let mut tool = tool_for(SelectKind::Rectangle).unwrap();
    let mut engine = SelectionEngine::new();

    assert_eq!(tool.pointer_down(Point::new(12.0, 8.0)), SelectionOutcome::None);
    let preview = tool.pointer_move(Point::new(4.0, 2.0));
    assert!(matches!(preview, SelectionOutcome::Preview(Selection::Rectangle(_))));

    match tool.pointer_up(Point::new(2.0, 2.0)) {
        SelectionOutcome::Commit(selection) => engine.set_selection(selection),
        other => panic!("expected a commit, got {other:?}"),
    }
    assert_eq!(tool.phase(), SelectionPhase::Committed);
    assert!(engine.is_point_in_selection(5.0, 5.0));
    assert!(!engine.is_point_in_selection(13.0, 5.0));
    assert!(engine.allows(2, 2));
    assert!(!engine.allows(12, 2));
}

#[test]
fn polygon_gesture_closes_to_first_vertex() {
    let mut tool = tool_for(SelectKind::Polygon).unwrap();
    for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)] {
        tool.pointer_down(Point::new(x, y));
        tool.pointer_up(Point::new(x, y));
    }
    assert_eq!(tool.phase(), SelectionPhase::Drawing);

    let outcome = tool.double_click(Point::new(0.0, 10.0));
    let SelectionOutcome::Commit(selection) = outcome else {
        panic!("expected a commit");
    };
    assert_eq!(
        selection,
        Selection::Polygon {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            closed: true,
        }
    );
    assert!(selection.contains(Point::new(5.0, 5.0)));
    assert!(!selection.contains(Point::new(15.0, 5.0)));
}

#[test]
fn magic_wand_has_no_pointer_tool() {
    assert!(tool_for(SelectKind::MagicWand).is_none());
}
