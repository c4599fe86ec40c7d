//! Editor change notifications

use pigment_core::{Event, Rect};
use pigment_paint::{LayerId, LayerPropertyKey};

use crate::tools::ToolKind;

/// What changed about a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerChange {
    Property(LayerPropertyKey),
    /// Pixels were painted, filled or restored
    Pixels,
    /// Position in the stack
    Order,
}

/// Payload of an editor notification
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    LayerAdded { id: LayerId, name: String },
    LayerRemoved { id: LayerId },
    LayerChanged { id: LayerId, change: LayerChange },
    ActiveLayerChanged { id: Option<LayerId> },
    /// `bounds` is `None` once the selection is cleared. Previews are
    /// in-progress outlines that have not replaced the selection yet.
    SelectionChanged { bounds: Option<Rect>, preview: bool },
    ToolChanged { tool: ToolKind },
    /// The dash offset advanced
    MarchingAnts { offset: u32 },
    CanvasChanged { width: u32, height: u32 },
}

/// Discriminant used to subscribe to one kind of [`EditorEvent`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditorEventKind {
    LayerAdded,
    LayerRemoved,
    LayerChanged,
    ActiveLayerChanged,
    SelectionChanged,
    ToolChanged,
    MarchingAnts,
    CanvasChanged,
}

impl Event for EditorEvent {
    type Kind = EditorEventKind;

    fn kind(&self) -> EditorEventKind {
        match self {
            EditorEvent::LayerAdded { .. } => EditorEventKind::LayerAdded,
            EditorEvent::LayerRemoved { .. } => EditorEventKind::LayerRemoved,
            EditorEvent::LayerChanged { .. } => EditorEventKind::LayerChanged,
            EditorEvent::ActiveLayerChanged { .. } => EditorEventKind::ActiveLayerChanged,
            EditorEvent::SelectionChanged { .. } => EditorEventKind::SelectionChanged,
            EditorEvent::ToolChanged { .. } => EditorEventKind::ToolChanged,
            EditorEvent::MarchingAnts { .. } => EditorEventKind::MarchingAnts,
            EditorEvent::CanvasChanged { .. } => EditorEventKind::CanvasChanged,
        }
    }
}
