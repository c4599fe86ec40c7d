//! Editor context
//!
//! [`EditorContext`] owns one document and everything that acts on it: the
//! layer stack, the selection, the stroke pipeline, the active tool, the
//! timers and the event bus. Hosts forward pointer input and a periodic
//! [`tick`](EditorContext::tick) and read results back through the
//! accessors and [`composite`](EditorContext::composite).
//!
//! Paint and fill operations need an active, unlocked layer. Without one
//! they are skipped (logged at debug level) and report `false`. All pixel
//! writes are clipped to the current selection when there is one.

use pigment_core::{
    blend_pixel, BlendMode, Color, EventBus, IntervalScheduler, ListenerId, Point, TimerId,
};
use pigment_input::{
    BrushRenderer, BrushSettings, InputSample, StrokeBatch, StrokeInputPipeline, StrokePoint,
};
use pigment_paint::{
    composite, gradient, GradientDefinition, Layer, LayerId, LayerProperty, LayerStack,
    RasterSurface,
};
use pigment_select::{
    flood_fill, tool_for, MarchingAnts, SelectKind, Selection, SelectionEngine, SelectionOutcome,
    SelectionTool,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::EditorConfig;
use crate::events::{EditorEvent, EditorEventKind, LayerChange};
use crate::tools::{ToolBehavior, ToolKind};

/// Upper bound on airbrush sprays replayed for one late tick
const MAX_CATCH_UP_SPRAYS: u32 = 8;

/// Repeating airbrush dab while the pointer is held
#[derive(Clone, Copy, Debug)]
struct AirbrushHold {
    timer: TimerId,
    position: Point,
    pressure: f32,
}

/// One open document plus its tools
pub struct EditorContext {
    config: EditorConfig,
    stack: LayerStack,
    selection: SelectionEngine,
    preview: Option<Selection>,
    tool: ToolKind,
    select_tool: Option<Box<dyn SelectionTool>>,
    pipeline: StrokeInputPipeline,
    brush: BrushRenderer,
    stroke_layer: Option<LayerId>,
    last_stroke_point: Option<StrokePoint>,
    airbrush: Option<AirbrushHold>,
    scheduler: IntervalScheduler,
    ants: MarchingAnts,
    events: EventBus<EditorEvent>,
    rng: StdRng,
    now_ms: f64,
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("canvas", &(self.stack.width(), self.stack.height()))
            .field("layers", &self.stack.len())
            .field("tool", &self.tool)
            .field("has_selection", &self.selection.has_selection())
            .finish()
    }
}

impl EditorContext {
    /// Empty document sized from `config.canvas`
    pub fn new(config: EditorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as [`new`](Self::new) with a deterministic airbrush scatter
    pub fn with_seed(config: EditorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EditorConfig, rng: StdRng) -> Self {
        let tool = ToolKind::default();
        let brush_kind = match tool.behavior() {
            ToolBehavior::Paint(kind) => kind,
            _ => Default::default(),
        };
        tracing::debug!(
            width = config.canvas.width,
            height = config.canvas.height,
            "editor context created"
        );
        Self {
            stack: LayerStack::new(config.canvas.width, config.canvas.height),
            selection: SelectionEngine::new(),
            preview: None,
            tool,
            select_tool: None,
            pipeline: StrokeInputPipeline::new(config.stabilizer, config.pressure),
            brush: BrushRenderer::new(brush_kind, config.brush.to_settings(), config.airbrush),
            stroke_layer: None,
            last_stroke_point: None,
            airbrush: None,
            scheduler: IntervalScheduler::new(),
            ants: MarchingAnts::new(config.selection.ants_interval_ms),
            events: EventBus::new(),
            rng,
            now_ms: 0.0,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layer_stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn brush_settings(&self) -> &BrushSettings {
        &self.brush.settings
    }

    pub fn set_brush_settings(&mut self, settings: BrushSettings) {
        self.brush.settings = settings.sanitized();
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.brush.settings.color = color;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────

    pub fn subscribe<F>(&mut self, kind: EditorEventKind, listener: F) -> ListenerId
    where
        F: Fn(&EditorEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    fn emit(&self, event: EditorEvent) {
        self.events.publish(&event);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Layers
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let id = self.stack.add_layer(name);
        let name = self
            .stack
            .layer(id)
            .map(|layer| layer.name.clone())
            .unwrap_or_default();
        self.emit(EditorEvent::LayerAdded { id, name });
        self.emit(EditorEvent::ActiveLayerChanged { id: Some(id) });
        id
    }

    /// Add a layer at the bottom of the stack filled with
    /// `config.canvas.background` and make it active
    pub fn add_background_layer(&mut self) -> LayerId {
        let id = self.add_layer("Background");
        let color = self.config.canvas.background_color();
        if let Some(layer) = self.stack.layer_mut(id) {
            layer.surface_mut().clear(color.to_rgba8());
        }
        if self.stack.len() > 1 {
            self.move_layer(id, 0);
        }
        self.emit_pixels(id);
        id
    }

    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let copy = self.stack.duplicate_layer(id)?;
        let name = self
            .stack
            .layer(copy)
            .map(|layer| layer.name.clone())
            .unwrap_or_default();
        self.emit(EditorEvent::LayerAdded { id: copy, name });
        self.emit(EditorEvent::ActiveLayerChanged { id: Some(copy) });
        Some(copy)
    }

    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let previous_active = self.stack.active_layer_id();
        if !self.stack.remove_layer(id) {
            return false;
        }
        if self.stroke_layer == Some(id) {
            self.abort_stroke();
        }
        self.emit(EditorEvent::LayerRemoved { id });
        let active = self.stack.active_layer_id();
        if active != previous_active {
            self.emit(EditorEvent::ActiveLayerChanged { id: active });
        }
        true
    }

    pub fn move_layer(&mut self, id: LayerId, index: usize) -> bool {
        if !self.stack.move_layer(id, index) {
            return false;
        }
        self.emit(EditorEvent::LayerChanged {
            id,
            change: LayerChange::Order,
        });
        true
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        if !self.stack.set_active_layer(id) {
            return false;
        }
        self.emit(EditorEvent::ActiveLayerChanged { id: Some(id) });
        true
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.stack.active_layer()
    }

    pub fn set_layer_property(&mut self, id: LayerId, property: LayerProperty) -> bool {
        let key = property.key();
        if !self.stack.set_layer_property(id, property) {
            return false;
        }
        self.emit(EditorEvent::LayerChanged {
            id,
            change: LayerChange::Property(key),
        });
        true
    }

    /// String-keyed variant of [`set_layer_property`](Self::set_layer_property).
    /// Unknown keys and unparsable values report `false`.
    pub fn set_layer_property_str(&mut self, id: LayerId, key: &str, value: &str) -> bool {
        match LayerProperty::parse(key, value) {
            Some(property) => self.set_layer_property(id, property),
            None => {
                tracing::debug!(?id, key, value, "unrecognized layer property");
                false
            }
        }
    }

    /// Resize the canvas and every layer
    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        self.abort_stroke();
        self.stack.resize_canvas(width, height);
        self.emit(EditorEvent::CanvasChanged { width, height });
    }

    pub fn snapshot_layer(&self, id: LayerId) -> Option<Vec<u8>> {
        self.stack.snapshot_layer(id)
    }

    pub fn restore_layer(&mut self, id: LayerId, bytes: Vec<u8>) -> pigment_paint::Result<bool> {
        let restored = self.stack.restore_layer(id, bytes)?;
        if restored {
            self.emit_pixels(id);
        }
        Ok(restored)
    }

    /// Flatten all visible layers into `output`
    pub fn composite<S: RasterSurface>(&self, output: &mut S) {
        composite(&self.stack, output);
    }

    fn emit_pixels(&self, id: LayerId) {
        self.emit(EditorEvent::LayerChanged {
            id,
            change: LayerChange::Pixels,
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_selection(&mut self, selection: Selection) {
        let bounds = selection.bounds();
        self.preview = None;
        self.selection.set_selection(selection);
        self.ants.start(&mut self.scheduler, self.now_ms);
        self.emit(EditorEvent::SelectionChanged {
            bounds,
            preview: false,
        });
    }

    pub fn clear_selection(&mut self) {
        self.preview = None;
        self.ants.stop(&mut self.scheduler);
        if self.selection.clear_selection() {
            self.emit(EditorEvent::SelectionChanged {
                bounds: None,
                preview: false,
            });
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selection.has_selection()
    }

    pub fn is_point_in_selection(&self, x: f32, y: f32) -> bool {
        self.selection.is_point_in_selection(x, y)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.selection()
    }

    /// Outline of a selection gesture in progress
    pub fn selection_preview(&self) -> Option<&Selection> {
        self.preview.as_ref()
    }

    pub fn marching_ants(&self) -> &MarchingAnts {
        &self.ants
    }

    /// Select the pixels of the active layer matching the color at `(x, y)`,
    /// using the configured tolerance and contiguity. An empty result clears
    /// the selection.
    pub fn magic_wand(&mut self, x: i32, y: i32) -> bool {
        let Some(layer) = self.stack.active_layer() else {
            tracing::debug!("magic wand skipped: no active layer");
            return false;
        };
        let region = flood_fill(
            layer.surface(),
            (x, y),
            self.config.selection.tolerance,
            self.config.selection.contiguous,
        );
        if region.is_empty() {
            self.clear_selection();
            return false;
        }
        self.set_selection(Selection::Mask(region));
        true
    }

    fn apply_outcome(&mut self, outcome: SelectionOutcome) {
        match outcome {
            SelectionOutcome::None => {}
            SelectionOutcome::Preview(selection) => {
                let bounds = selection.bounds();
                self.preview = Some(selection);
                self.emit(EditorEvent::SelectionChanged {
                    bounds,
                    preview: true,
                });
            }
            SelectionOutcome::Commit(selection) => self.set_selection(selection),
            SelectionOutcome::Clear => self.clear_selection(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tools
    // ─────────────────────────────────────────────────────────────────────

    /// Switch tools. An in-progress stroke ends without further painting
    /// and an in-progress selection gesture is cancelled without committing.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool == self.tool {
            return;
        }
        self.abort_stroke();
        if let Some(mut previous) = self.select_tool.take() {
            if previous.cancel() {
                tracing::debug!(tool = ?self.tool, "selection gesture cancelled by tool switch");
            }
        }
        if self.preview.take().is_some() {
            self.emit(EditorEvent::SelectionChanged {
                bounds: self.selection.selection().and_then(Selection::bounds),
                preview: false,
            });
        }

        self.ants.stop(&mut self.scheduler);
        match tool.behavior() {
            ToolBehavior::Paint(kind) => self.brush.kind = kind,
            ToolBehavior::Select(kind) => {
                self.select_tool = tool_for(kind);
                if self.selection.has_selection() {
                    self.ants.start(&mut self.scheduler, self.now_ms);
                }
            }
            ToolBehavior::Fill => {}
        }

        tracing::debug!(from = ?self.tool, to = ?tool, "tool changed");
        self.tool = tool;
        self.emit(EditorEvent::ToolChanged { tool });
    }

    pub fn pointer_down(&mut self, sample: &InputSample) {
        self.now_ms = sample.timestamp_ms;
        match self.tool.behavior() {
            ToolBehavior::Paint(_) => self.begin_stroke(sample),
            ToolBehavior::Select(SelectKind::MagicWand) => {
                self.magic_wand(sample.x.floor() as i32, sample.y.floor() as i32);
            }
            ToolBehavior::Select(_) => {
                if let Some(tool) = self.select_tool.as_mut() {
                    let outcome = tool.pointer_down(sample.position());
                    self.apply_outcome(outcome);
                }
            }
            ToolBehavior::Fill => {
                let color = self.brush.settings.color;
                self.bucket_fill(sample.x.floor() as i32, sample.y.floor() as i32, color);
            }
        }
    }

    pub fn pointer_move(&mut self, sample: &InputSample) {
        self.now_ms = sample.timestamp_ms;
        match self.tool.behavior() {
            ToolBehavior::Paint(_) => {
                if !self.pipeline.is_active() {
                    return;
                }
                let batch = self.pipeline.on_stroke_move(sample);
                self.paint_batch(&batch);
            }
            ToolBehavior::Select(_) => {
                if let Some(tool) = self.select_tool.as_mut() {
                    let outcome = tool.pointer_move(sample.position());
                    self.apply_outcome(outcome);
                }
            }
            ToolBehavior::Fill => {}
        }
    }

    pub fn pointer_up(&mut self, sample: &InputSample) {
        self.now_ms = sample.timestamp_ms;
        match self.tool.behavior() {
            ToolBehavior::Paint(_) => {
                if !self.pipeline.is_active() {
                    return;
                }
                let batch = self.pipeline.on_stroke_end(sample);
                self.paint_batch(&batch);
                if let Some(id) = self.stroke_layer {
                    self.emit_pixels(id);
                }
                self.abort_stroke();
            }
            ToolBehavior::Select(_) => {
                if let Some(tool) = self.select_tool.as_mut() {
                    let outcome = tool.pointer_up(sample.position());
                    self.apply_outcome(outcome);
                }
            }
            ToolBehavior::Fill => {}
        }
    }

    pub fn double_click(&mut self, sample: &InputSample) {
        self.now_ms = sample.timestamp_ms;
        if let Some(tool) = self.select_tool.as_mut() {
            let outcome = tool.double_click(sample.position());
            self.apply_outcome(outcome);
        }
    }

    /// Finish a click-by-click polygon, closing it to its first vertex
    pub fn close_polygon(&mut self) {
        if let Some(tool) = self.select_tool.as_mut() {
            let outcome = tool.close();
            self.apply_outcome(outcome);
        }
    }

    /// Advance timers to `now_ms`: marching ants and the airbrush repeat
    pub fn tick(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        for fired in self.scheduler.tick(now_ms) {
            if let Some(offset) = self.ants.on_fired(&fired) {
                self.emit(EditorEvent::MarchingAnts { offset });
                continue;
            }
            let Some(hold) = self.airbrush.filter(|hold| hold.timer == fired.id) else {
                continue;
            };
            let mut written = 0;
            if let Some(layer) = paintable_layer(&mut self.stack, self.stroke_layer) {
                let selection = &self.selection;
                let clip = |x: i32, y: i32| selection.allows(x, y);
                let mut surface = layer.surface_mut();
                for _ in 0..fired.count.min(MAX_CATCH_UP_SPRAYS) {
                    written += self.brush.spray(
                        &mut surface,
                        hold.position,
                        hold.pressure,
                        &mut self.rng,
                        &clip,
                    );
                }
            }
            if written > 0 {
                if let Some(id) = self.stroke_layer {
                    self.emit_pixels(id);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Painting
    // ─────────────────────────────────────────────────────────────────────

    fn begin_stroke(&mut self, sample: &InputSample) {
        let active = self.stack.active_layer_id();
        let Some(layer) = paintable_layer(&mut self.stack, active) else {
            return;
        };
        let id = layer.id();
        self.stroke_layer = Some(id);
        self.last_stroke_point = None;
        self.pipeline.on_stroke_start(sample);
        tracing::trace!(?id, tool = ?self.tool, "stroke started");

        if self.tool == ToolKind::Airbrush {
            let pressure = self.pipeline.pressure().last_pressure();
            let timer = self
                .scheduler
                .start(self.brush.airbrush.interval_ms, sample.timestamp_ms);
            self.airbrush = Some(AirbrushHold {
                timer,
                position: sample.position(),
                pressure,
            });
        }
    }

    /// Stop the current stroke, cancelling the airbrush repeat
    fn abort_stroke(&mut self) {
        if let Some(hold) = self.airbrush.take() {
            self.scheduler.cancel(hold.timer);
        }
        self.pipeline.cancel();
        self.stroke_layer = None;
        self.last_stroke_point = None;
    }

    fn paint_batch(&mut self, batch: &StrokeBatch) {
        if batch.is_empty() {
            return;
        }
        let Some(layer) = paintable_layer(&mut self.stack, self.stroke_layer) else {
            return;
        };
        let selection = &self.selection;
        let clip = |x: i32, y: i32| selection.allows(x, y);
        let mut surface = layer.surface_mut();

        for point in batch {
            if self.tool == ToolKind::Airbrush {
                self.brush.spray(
                    &mut surface,
                    point.position(),
                    point.pressure,
                    &mut self.rng,
                    &clip,
                );
                if let Some(hold) = self.airbrush.as_mut() {
                    hold.position = point.position();
                    hold.pressure = point.pressure;
                }
            } else {
                match self.last_stroke_point {
                    Some(previous) => {
                        self.brush.stroke_segment(&mut surface, &previous, point, &clip)
                    }
                    None => self.brush.dab(&mut surface, point, &clip),
                };
            }
            self.last_stroke_point = Some(*point);
        }
    }

    /// Overwrite the active layer with `color`, inside the selection if any
    pub fn fill_active_layer(&mut self, color: Color) -> bool {
        let active = self.stack.active_layer_id();
        let Some(layer) = paintable_layer(&mut self.stack, active) else {
            return false;
        };
        let selection = &self.selection;
        layer
            .surface_mut()
            .fill_where(color.to_rgba8(), |x, y| selection.allows(x, y));
        let id = layer.id();
        self.emit_pixels(id);
        true
    }

    /// Paint-bucket fill: overwrite the region matching the color at
    /// `(x, y)` on the active layer
    pub fn bucket_fill(&mut self, x: i32, y: i32, color: Color) -> bool {
        let active = self.stack.active_layer_id();
        let Some(layer) = paintable_layer(&mut self.stack, active) else {
            return false;
        };
        let region = flood_fill(
            layer.surface(),
            (x, y),
            self.config.selection.tolerance,
            self.config.selection.contiguous,
        );
        if region.is_empty() {
            return false;
        }
        let pixel = color.to_rgba8();
        let mut surface = layer.surface_mut();
        for (px, py) in region.pixels() {
            let (px, py) = (px as i32, py as i32);
            if self.selection.allows(px, py) {
                surface.set_pixel(px, py, pixel);
            }
        }
        let id = layer.id();
        self.emit_pixels(id);
        true
    }

    /// Composite a gradient over the active layer, inside the selection if
    /// any
    pub fn fill_gradient(&mut self, definition: &GradientDefinition) -> bool {
        let active = self.stack.active_layer_id();
        let (width, height) = (self.stack.width(), self.stack.height());
        let Some(layer) = paintable_layer(&mut self.stack, active) else {
            return false;
        };
        let fill = gradient::render(definition, width, height);
        let mut surface = layer.surface_mut();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                if !self.selection.allows(x, y) {
                    continue;
                }
                let src = fill.get_pixel(x, y);
                let dst = surface.get_pixel(x, y);
                surface.set_pixel(x, y, blend_pixel(BlendMode::Normal, src, dst, 1.0));
            }
        }
        let id = layer.id();
        self.emit_pixels(id);
        true
    }
}

/// The layer `id` if it exists and accepts paint
fn paintable_layer(stack: &mut LayerStack, id: Option<LayerId>) -> Option<&mut Layer> {
    let Some(id) = id else {
        tracing::debug!("paint skipped: no active layer");
        return None;
    };
    let layer = stack.layer_mut(id)?;
    if !layer.is_paintable() {
        tracing::debug!(?id, "paint skipped: layer is locked");
        return None;
    }
    Some(layer)
}
