//! Tool dispatch
//!
//! The editor has a closed set of tools. Each maps to one behavior that
//! decides where pointer input is routed.

use pigment_input::BrushKind;
use pigment_select::SelectKind;
use serde::{Deserialize, Serialize};

/// Every tool the editor offers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Brush,
    Pencil,
    Eraser,
    Airbrush,
    Calligraphy,
    RectSelect,
    FreehandSelect,
    PolygonSelect,
    MagicWand,
    Fill,
}

/// How a tool consumes pointer input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolBehavior {
    /// Strokes go through the input pipeline and paint the active layer
    Paint(BrushKind),
    /// Pointer input drives a selection tool
    Select(SelectKind),
    /// A click fills the active layer
    Fill,
}

impl ToolKind {
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Brush,
        ToolKind::Pencil,
        ToolKind::Eraser,
        ToolKind::Airbrush,
        ToolKind::Calligraphy,
        ToolKind::RectSelect,
        ToolKind::FreehandSelect,
        ToolKind::PolygonSelect,
        ToolKind::MagicWand,
        ToolKind::Fill,
    ];

    pub fn behavior(&self) -> ToolBehavior {
        match self {
            ToolKind::Brush => ToolBehavior::Paint(BrushKind::Brush),
            ToolKind::Pencil => ToolBehavior::Paint(BrushKind::Pencil),
            ToolKind::Eraser => ToolBehavior::Paint(BrushKind::Eraser),
            ToolKind::Airbrush => ToolBehavior::Paint(BrushKind::Airbrush),
            ToolKind::Calligraphy => ToolBehavior::Paint(BrushKind::Calligraphy),
            ToolKind::RectSelect => ToolBehavior::Select(SelectKind::Rectangle),
            ToolKind::FreehandSelect => ToolBehavior::Select(SelectKind::Freehand),
            ToolKind::PolygonSelect => ToolBehavior::Select(SelectKind::Polygon),
            ToolKind::MagicWand => ToolBehavior::Select(SelectKind::MagicWand),
            ToolKind::Fill => ToolBehavior::Fill,
        }
    }

    /// Whether the tool writes pixels
    pub fn paints(&self) -> bool {
        matches!(self.behavior(), ToolBehavior::Paint(_) | ToolBehavior::Fill)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Brush => "brush",
            ToolKind::Pencil => "pencil",
            ToolKind::Eraser => "eraser",
            ToolKind::Airbrush => "airbrush",
            ToolKind::Calligraphy => "calligraphy",
            ToolKind::RectSelect => "rect-select",
            ToolKind::FreehandSelect => "freehand-select",
            ToolKind::PolygonSelect => "polygon-select",
            ToolKind::MagicWand => "magic-wand",
            ToolKind::Fill => "fill",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }
}
