//! The track viewer engine.
//!
//! [`TrackViewer`] owns a private copy of the data snapshot, the layout, the zoom state and
//! a retained [`Scene`]. Every mutation ends in either a full rebuild (layout, margin,
//! track groups, then a draw pass) or a draw pass alone. A draw pass is a function of the
//! data, the [`ViewState`] and the current zoom transform.
//!
//! The engine has no clock. Hosts call [`TrackViewer::tick`] to advance zoom transitions
//! and the debounced resize.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use log::{debug, info};

use crate::config::{validate_domain, ViewerConfig};
use crate::error::{Result, ViewerError};
use crate::geometry::{
    annotation_geometry, primitive_geometry, AnnotationGeometry, Bounds, PrimitiveGeometry, ShapeGeometry,
};
use crate::host::{ContainerBox, Host};
use crate::labels::{label_background, label_visible, place_label};
use crate::layout::{apply_hysteresis, required_left_margin, TrackLayout, COLLAPSED_MARGIN_LEFT};
use crate::menu::{ContextMenu, MenuAction, MenuEntry, MenuItem};
use crate::reconcile::{reconcile_children, ReconcileReport};
use crate::resize::{responsive_width, DebounceSlot};
use crate::scale::{format_bp, LinearScale};
use crate::scene::{Baseline, IdAllocator, Layer, Node, Scene, Shape, Style, TextAnchor};
use crate::types::{Annotation, DrawingPrimitive, LabelVisibility, PrimitiveType, Track, TrackViewerData};
use crate::zoom::{Cursor, PointerEvent, ZoomController, ZoomTransform, ZOOM_TRANSITION};

/// Offset of the tooltip from the pointer, in page pixels
pub const TOOLTIP_OFFSET: (f64, f64) = (10.0, -28.0);
/// Gap between the track label column and the chart
pub const TRACK_LABEL_OFFSET: f64 = 10.0;
const AXIS_TICK_SIZE: f64 = 6.0;
const AXIS_TICK_SPACING: f64 = 80.0;

/// Pointer interaction on a single annotation. Coordinates are page pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnnotationEvent {
    Click,
    Over { x: f64, y: f64 },
    Out,
}

type ClickCallback = Box<dyn FnMut(&Annotation, &Track)>;
type HoverCallback = Box<dyn FnMut(&Annotation, &Track, &AnnotationEvent)>;
type BackgroundCallback = Box<dyn FnMut()>;

/// Host callbacks, invoked synchronously from the triggering event.
#[derive(Default)]
pub struct ViewerCallbacks {
    on_annotation_click: Option<ClickCallback>,
    on_annotation_hover: Option<HoverCallback>,
    on_background_click: Option<BackgroundCallback>,
}

impl ViewerCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_annotation_click<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Annotation, &Track) + 'static,
    {
        self.on_annotation_click = Some(Box::new(f));
        self
    }

    /// Called on both pointer enter and leave; the event tells them apart.
    pub fn on_annotation_hover<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Annotation, &Track, &AnnotationEvent) + 'static,
    {
        self.on_annotation_hover = Some(Box::new(f));
        self
    }

    pub fn on_background_click<F>(mut self, f: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.on_background_click = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for ViewerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerCallbacks")
            .field("on_annotation_click", &self.on_annotation_click.is_some())
            .field("on_annotation_hover", &self.on_annotation_hover.is_some())
            .field("on_background_click", &self.on_background_click.is_some())
            .finish()
    }
}

/// Toggle and interaction state that feeds the draw pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub show_all_annotation_labels: bool,
    pub show_track_labels: bool,
    pub hovered: Option<String>,
    pub dragging: bool,
}

/// Floating tooltip. It lives outside the container, positioned in page coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tooltip {
    pub visible: bool,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl Tooltip {
    fn show(&mut self, text: &str, x: f64, y: f64) {
        self.visible = true;
        self.text = text.to_string();
        self.x = x + TOOLTIP_OFFSET.0;
        self.y = y + TOOLTIP_OFFSET.1;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

/// An annotation as placed by the last draw pass.
#[derive(Debug, Clone, PartialEq)]
struct Placed {
    id: String,
    geometry: AnnotationGeometry,
    track_y: f64,
}

impl Placed {
    fn chart_bounds(&self) -> Bounds {
        self.geometry.bounds.offset(0.0, self.track_y)
    }
}

pub struct TrackViewer<H: Host> {
    config: ViewerConfig,
    initial_margin_left: f64,
    responsive: bool,
    host: H,
    callbacks: ViewerCallbacks,
    data: TrackViewerData,
    layout: TrackLayout,
    base_scale: LinearScale,
    x_scale: LinearScale,
    zoom: ZoomController,
    view: ViewState,
    scene: Scene,
    tooltip: Tooltip,
    menu: ContextMenu,
    pending_resize: DebounceSlot<ContainerBox>,
    placed: Vec<Placed>,
    last_reconcile: ReconcileReport,
}

impl<H: Host> TrackViewer<H> {
    pub fn new(config: ViewerConfig, host: H) -> Result<Self> {
        Self::with_callbacks(config, host, ViewerCallbacks::default())
    }

    pub fn with_callbacks(mut config: ViewerConfig, mut host: H, callbacks: ViewerCallbacks) -> Result<Self> {
        config.validate()?;
        let container = host
            .container(&config.container)
            .ok_or_else(|| ViewerError::container_not_found(config.container.clone()))?;

        let responsive = config.width.is_none();
        let width = config.width.unwrap_or_else(|| responsive_width(&container));
        config.width = Some(width);
        if responsive {
            host.observe_resize(&config.container);
        }

        let chart_width = (width - config.margin.left - config.margin.right).max(0.0);
        let base_scale = LinearScale::new((config.domain[0], config.domain[1]), (0.0, chart_width));
        let view = ViewState { show_track_labels: config.show_track_labels, ..ViewState::default() };
        let scene = Scene::new(clip_id(&config.container));

        let mut viewer = Self {
            initial_margin_left: config.margin.left,
            responsive,
            zoom: ZoomController::new(config.zoom_extent, chart_width),
            config,
            host,
            callbacks,
            data: TrackViewerData::default(),
            layout: TrackLayout::default(),
            base_scale,
            x_scale: base_scale,
            view,
            scene,
            tooltip: Tooltip::default(),
            menu: ContextMenu::new(),
            pending_resize: DebounceSlot::default(),
            placed: Vec::new(),
            last_reconcile: ReconcileReport::default(),
        };
        viewer.rebuild_layout();
        info!(
            "Track viewer mounted on {} ({}px, {})",
            viewer.config.container,
            width,
            if responsive { "responsive" } else { "fixed width" }
        );
        Ok(viewer)
    }

    // ---- data ----

    /// Replace the whole snapshot. Fails without changes if any track, annotation or
    /// primitive id repeats.
    pub fn set_data(&mut self, data: TrackViewerData) -> Result<()> {
        data.validate()?;
        debug!(
            "set_data: {} tracks, {} annotations, {} primitives",
            data.tracks.len(),
            data.annotations.len(),
            data.primitives.len()
        );
        self.data = data;
        self.rebuild_layout();
        Ok(())
    }

    /// A copy of the current snapshot.
    pub fn get_data(&self) -> TrackViewerData {
        self.data.clone()
    }

    pub fn data(&self) -> &TrackViewerData {
        &self.data
    }

    pub fn add_track(&mut self, track: Track) -> Result<()> {
        if self.data.has_track(&track.id) {
            return Err(ViewerError::duplicate_track(track.id));
        }
        self.data.tracks.push(track);
        self.rebuild_layout();
        Ok(())
    }

    /// Remove a track with all of its annotations and primitives.
    pub fn remove_track(&mut self, id: &str) -> Option<Track> {
        let removed = self.data.remove_track(id)?;
        self.rebuild_layout();
        Some(removed)
    }

    /// Add an annotation. One whose track does not exist is kept but not drawn, and is
    /// dropped by the next full rebuild.
    pub fn add_annotation(&mut self, annotation: Annotation) -> Result<()> {
        if self.data.annotation(&annotation.id).is_some() {
            return Err(ViewerError::duplicate_element(annotation.id));
        }
        if !self.data.has_track(&annotation.track_id) {
            debug!("annotation {} references unknown track {}", annotation.id, annotation.track_id);
        }
        self.data.annotations.push(annotation);
        self.draw();
        Ok(())
    }

    pub fn remove_annotation(&mut self, id: &str) -> Option<Annotation> {
        let index = self.data.annotations.iter().position(|a| a.id == id)?;
        let removed = self.data.annotations.remove(index);
        if self.view.hovered.as_deref() == Some(id) {
            self.view.hovered = None;
            self.tooltip.hide();
        }
        self.draw();
        Some(removed)
    }

    pub fn add_primitive(&mut self, primitive: DrawingPrimitive) -> Result<()> {
        if self.data.primitives.iter().any(|p| p.id == primitive.id) {
            return Err(ViewerError::duplicate_element(primitive.id));
        }
        self.data.primitives.push(primitive);
        self.draw();
        Ok(())
    }

    pub fn remove_primitive(&mut self, id: &str) -> Option<DrawingPrimitive> {
        let index = self.data.primitives.iter().position(|p| p.id == id)?;
        let removed = self.data.primitives.remove(index);
        self.draw();
        Some(removed)
    }

    /// Change the genomic domain. The zoom transform is kept.
    pub fn update_domain(&mut self, domain: [f64; 2]) -> Result<()> {
        validate_domain(domain)?;
        self.config.domain = domain;
        self.base_scale.set_domain((domain[0], domain[1]));
        self.draw();
        Ok(())
    }

    // ---- zoom ----

    /// Animate to the transform that fits `[start, end]` to the chart width.
    pub fn zoom_to(&mut self, start: f64, end: f64) {
        let target = self.zoom.transform_for_interval(&self.base_scale, start, end);
        debug!("zoom_to {}..{} -> k={:.3} x={:.1}", start, end, target.k, target.x);
        self.zoom.transition_to(target, ZOOM_TRANSITION);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.transition_to(ZoomTransform::IDENTITY, ZOOM_TRANSITION);
    }

    /// Advance transitions and the pending resize. Returns true when anything was redrawn.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let mut redrawn = false;
        if let Some(container) = self.pending_resize.poll(elapsed) {
            redrawn |= self.apply_width(responsive_width(&container));
        }
        if self.zoom.tick(elapsed) {
            self.draw();
            redrawn = true;
        }
        redrawn
    }

    /// Route a pointer event on the background to the zoom controller.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let changed = self.zoom.handle(event);
        self.view.dragging = self.zoom.is_dragging();
        if changed {
            self.draw();
        }
        changed
    }

    pub fn handle_background_click(&mut self) {
        if self.zoom.take_click_suppression() {
            debug!("click after pan ignored");
            return;
        }
        self.menu.close();
        if let Some(callback) = self.callbacks.on_background_click.as_mut() {
            callback();
        }
    }

    /// Deliver a pointer event for one annotation. Returns false if the event was ignored.
    pub fn handle_annotation_event(&mut self, id: &str, event: AnnotationEvent) -> bool {
        let Some(annotation) = self.data.annotation(id).cloned() else {
            return false;
        };
        let Some(track) = self.data.track(&annotation.track_id).cloned() else {
            return false;
        };
        match event {
            AnnotationEvent::Click => {
                if self.zoom.take_click_suppression() {
                    return false;
                }
                if let Some(callback) = self.callbacks.on_annotation_click.as_mut() {
                    callback(&annotation, &track);
                }
            }
            AnnotationEvent::Over { x, y } => {
                if self.view.dragging {
                    return false;
                }
                self.view.hovered = Some(annotation.id.clone());
                if let Some(text) = annotation.tooltip.as_deref() {
                    self.tooltip.show(text, x, y);
                }
                if let Some(callback) = self.callbacks.on_annotation_hover.as_mut() {
                    callback(&annotation, &track, &event);
                }
                self.draw();
            }
            AnnotationEvent::Out => {
                if self.view.dragging {
                    return false;
                }
                if self.view.hovered.as_deref() == Some(id) {
                    self.view.hovered = None;
                }
                self.tooltip.hide();
                if let Some(callback) = self.callbacks.on_annotation_hover.as_mut() {
                    callback(&annotation, &track, &event);
                }
                self.draw();
            }
        }
        true
    }

    /// Top-most annotation under a point given in container coordinates.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&str> {
        let cx = x - self.config.margin.left;
        let cy = y - self.config.margin.top;
        if cx < 0.0 || cx > self.chart_width() || cy < 0.0 || cy > self.layout.content_height() {
            return None;
        }
        self.placed
            .iter()
            .rev()
            .find(|p| p.chart_bounds().contains(cx, cy))
            .map(|p| p.id.as_str())
    }

    // ---- resize ----

    /// Queue a container size change; bursts collapse into one relayout.
    pub fn notify_container_resize(&mut self, container: ContainerBox) {
        if self.responsive {
            self.pending_resize.schedule(container);
        }
    }

    /// Re-measure the container and relayout immediately.
    pub fn resize(&mut self) {
        self.pending_resize.cancel();
        if !self.responsive {
            return;
        }
        if let Some(container) = self.host.container(&self.config.container) {
            self.apply_width(responsive_width(&container));
        }
    }

    fn apply_width(&mut self, width: f64) -> bool {
        if self.config.width == Some(width) {
            return false;
        }
        debug!("resize to {}px", width);
        self.config.width = Some(width);
        self.update_dimensions();
        self.draw();
        true
    }

    // ---- view toggles and menu ----

    pub fn set_show_all_annotation_labels(&mut self, show: bool) {
        if self.view.show_all_annotation_labels != show {
            self.view.show_all_annotation_labels = show;
            self.draw();
        }
    }

    pub fn set_show_track_labels(&mut self, show: bool) {
        if self.view.show_track_labels != show {
            self.view.show_track_labels = show;
            self.config.show_track_labels = show;
            self.rebuild_layout();
        }
    }

    pub fn open_context_menu(&mut self, x: f64, y: f64) {
        self.menu.open(x, y);
    }

    pub fn context_menu(&self) -> &ContextMenu {
        &self.menu
    }

    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        self.menu.entries(&self.view)
    }

    /// Apply a menu selection. Toggles take effect here; export actions are returned for
    /// the embedder to carry out.
    pub fn select_menu_item(&mut self, item: MenuItem) -> MenuAction {
        let action = self.menu.select(item, &self.view);
        match action {
            MenuAction::SetShowAllAnnotationLabels(show) => self.set_show_all_annotation_labels(show),
            MenuAction::SetShowTrackLabels(show) => self.set_show_track_labels(show),
            MenuAction::SaveSvg | MenuAction::SavePng => {}
        }
        action
    }

    // ---- accessors ----

    /// A copy of the fully resolved configuration.
    pub fn get_config(&self) -> ViewerConfig {
        self.config.clone()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn transform(&self) -> ZoomTransform {
        self.zoom.transform()
    }

    pub fn is_dragging(&self) -> bool {
        self.zoom.is_dragging()
    }

    pub fn cursor(&self) -> Cursor {
        self.zoom.cursor()
    }

    pub fn x_scale(&self) -> &LinearScale {
        &self.x_scale
    }

    /// Genomic interval currently spanning the chart width.
    pub fn visible_domain(&self) -> (f64, f64) {
        self.x_scale.domain()
    }

    pub fn track_offset(&self, id: &str) -> Option<f64> {
        self.layout.offset(id)
    }

    pub fn content_height(&self) -> f64 {
        self.layout.content_height()
    }

    pub fn width(&self) -> f64 {
        self.config.width.unwrap_or(0.0)
    }

    pub fn chart_width(&self) -> f64 {
        (self.width() - self.config.margin.left - self.config.margin.right).max(0.0)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Element and label reconciliation counts of the last draw pass.
    pub fn last_reconcile(&self) -> ReconcileReport {
        self.last_reconcile
    }

    /// Detach everything this viewer created and hand the host back.
    pub fn destroy(mut self) -> H {
        if self.responsive {
            self.host.disconnect_resize(&self.config.container);
        }
        self.pending_resize.cancel();
        self.scene.clear();
        self.tooltip = Tooltip::default();
        self.menu.close();
        info!("Track viewer on {} destroyed", self.config.container);
        self.host
    }

    // ---- layout and drawing ----

    fn rebuild_layout(&mut self) {
        let pruned = self.data.prune_orphans();
        if pruned > 0 {
            debug!("dropped {} elements without a track", pruned);
        }
        if let Some(hovered) = self.view.hovered.as_deref() {
            if self.data.annotation(hovered).is_none() {
                self.view.hovered = None;
                self.tooltip.hide();
            }
        }

        self.layout = TrackLayout::compute(&self.data.tracks, self.config.track_height);
        self.update_margin();
        self.config.height = self.layout.total_height(&self.config.margin);
        self.update_dimensions();
        self.rebuild_track_groups();
        self.draw();
    }

    fn update_margin(&mut self) {
        let target = if self.view.show_track_labels {
            required_left_margin(&self.data.tracks, &self.host, self.initial_margin_left)
        } else {
            COLLAPSED_MARGIN_LEFT
        };
        if let Some(left) = apply_hysteresis(self.config.margin.left, target) {
            debug!("left margin {} -> {}", self.config.margin.left, left);
            self.config.margin.left = left;
        }
    }

    fn update_dimensions(&mut self) {
        let chart_width = self.chart_width();
        self.base_scale.set_range((0.0, chart_width));
        self.zoom.set_width(chart_width);
        self.scene.set_frame(self.width(), self.config.height, &self.config.margin);
    }

    fn rebuild_track_groups(&mut self) {
        let keys: Vec<String> = self.data.tracks.iter().map(|t| t.id.clone()).collect();

        let (tracks, ids) = self.scene.layer_and_ids(Layer::Tracks);
        let ops = reconcile_children(&mut tracks.children, &keys, ids, |id, _| Node::group(id).with_class("track"));
        debug!("track groups: {:?}", ops);

        let (labels, ids) = self.scene.layer_and_ids(Layer::TrackLabels);
        reconcile_children(&mut labels.children, &keys, ids, |id, _| {
            Node::new(
                id,
                Shape::Text {
                    x: 0.0,
                    y: 0.0,
                    content: String::new(),
                    anchor: TextAnchor::End,
                    baseline: Baseline::Middle,
                },
            )
            .with_class("track-label")
        });
        labels.visible = self.view.show_track_labels;
        for (node, track) in labels.children.iter_mut().zip(&self.data.tracks) {
            let Some(slot) = self.layout.slot(&track.id) else {
                continue;
            };
            node.shape = Shape::Text {
                x: -TRACK_LABEL_OFFSET,
                y: slot.y + slot.height / 2.0,
                content: track.label.clone(),
                anchor: TextAnchor::End,
                baseline: Baseline::Middle,
            };
        }
    }

    fn draw(&mut self) {
        self.last_reconcile = ReconcileReport::default();
        self.x_scale = self.zoom.transform().rescale_x(&self.base_scale);
        self.view.dragging = self.zoom.is_dragging();
        self.draw_axis();
        self.draw_tracks();
        self.draw_labels();
    }

    fn draw_axis(&mut self) {
        let chart_width = self.chart_width();
        let count = (chart_width / AXIS_TICK_SPACING).floor().clamp(2.0, 10.0) as usize;
        let ticks = self.x_scale.ticks(count);
        let content_height = self.layout.content_height();
        let scale = self.x_scale;

        let (axis, ids) = self.scene.layer_and_ids(Layer::Axis);
        axis.translate = Some((0.0, content_height));
        axis.children.clear();
        axis.children.push(
            Node::new(ids.alloc(), Shape::Line { x1: 0.0, y1: 0.0, x2: chart_width, y2: 0.0 }).with_class("domain"),
        );
        for tick in ticks {
            let mut group = Node::group(ids.alloc()).with_class("tick");
            group.translate = Some((scale.apply(tick), 0.0));
            group
                .children
                .push(Node::new(ids.alloc(), Shape::Line { x1: 0.0, y1: 0.0, x2: 0.0, y2: AXIS_TICK_SIZE }));
            group.children.push(Node::new(
                ids.alloc(),
                Shape::Text {
                    x: 0.0,
                    y: AXIS_TICK_SIZE + 3.0,
                    content: format_bp(tick),
                    anchor: TextAnchor::Middle,
                    baseline: Baseline::Hanging,
                },
            ));
            axis.children.push(group);
        }
    }

    fn draw_tracks(&mut self) {
        let mut annotations: HashMap<&str, Vec<&Annotation>> = HashMap::new();
        for a in &self.data.annotations {
            annotations.entry(a.track_id.as_str()).or_default().push(a);
        }
        let mut primitives: HashMap<&str, Vec<&DrawingPrimitive>> = HashMap::new();
        for p in self.data.primitives.iter().filter(|p| p.kind != PrimitiveType::Unknown) {
            primitives.entry(p.track_id.as_str()).or_default().push(p);
        }

        self.placed.clear();
        let (tracks, ids) = self.scene.layer_and_ids(Layer::Tracks);
        for group in tracks.children.iter_mut() {
            let Some(key) = group.key.as_deref() else {
                continue;
            };
            let Some(slot) = self.layout.slot(key) else {
                continue;
            };
            group.translate = Some((0.0, slot.y));
            if group.children.len() != 2 {
                group.children = vec![
                    Node::group(ids.alloc()).with_class("primitives"),
                    Node::group(ids.alloc()).with_class("annotations"),
                ];
            }

            let prims = primitives.get(key).map(Vec::as_slice).unwrap_or(&[]);
            let keys: Vec<String> = prims.iter().map(|p| p.id.clone()).collect();
            let ops = reconcile_children(&mut group.children[0].children, &keys, ids, |id, _| Node::group(id));
            self.last_reconcile.absorb(&ops);
            for (node, primitive) in group.children[0].children.iter_mut().zip(prims) {
                render_primitive(node, ids, primitive, &self.x_scale, slot.height);
            }

            let anns = annotations.get(key).map(Vec::as_slice).unwrap_or(&[]);
            let keys: Vec<String> = anns.iter().map(|a| a.id.clone()).collect();
            let ops = reconcile_children(&mut group.children[1].children, &keys, ids, |id, _| Node::group(id));
            self.last_reconcile.absorb(&ops);
            for (node, annotation) in group.children[1].children.iter_mut().zip(anns) {
                let geometry = annotation_geometry(annotation, &self.x_scale, slot.height);
                let hovered = self.view.hovered.as_deref() == Some(annotation.id.as_str());
                render_annotation(node, ids, annotation, &geometry, hovered);
                self.placed.push(Placed { id: annotation.id.clone(), geometry, track_y: slot.y });
            }
        }
    }

    fn draw_labels(&mut self) {
        let by_id: HashMap<&str, &Annotation> =
            self.data.annotations.iter().map(|a| (a.id.as_str(), a)).collect();
        let labelled: Vec<(&Placed, &Annotation)> = self
            .placed
            .iter()
            .filter_map(|p| by_id.get(p.id.as_str()).map(|a| (p, *a)))
            .filter(|(_, a)| !a.label.is_empty())
            .collect();
        let keys: Vec<String> = labelled.iter().map(|(p, _)| p.id.clone()).collect();

        let (layer, ids) = self.scene.layer_and_ids(Layer::AnnotationLabels);
        let ops = reconcile_children(&mut layer.children, &keys, ids, |id, _| {
            Node::group(id).with_class("annotation-label-group")
        });
        self.last_reconcile.absorb(&ops);

        for (node, (placed, annotation)) in layer.children.iter_mut().zip(&labelled) {
            node.children.clear();
            let hovered = self.view.hovered.as_deref() == Some(annotation.id.as_str());
            let placement = place_label(annotation, &placed.geometry, placed.track_y);

            if annotation.show_label == LabelVisibility::Hover {
                match label_background(&self.host, &annotation.label, &placement) {
                    Some(b) => {
                        let mut bg = Node::new(
                            ids.alloc(),
                            Shape::Rect { x: b.x, y: b.y, width: b.width, height: b.height, rx: 2.0 },
                        )
                        .with_class("annotation-label-bg");
                        bg.visible = hovered;
                        node.children.push(bg);
                    }
                    None => debug!("no text box for label of {}, background skipped", annotation.id),
                }
            }

            let mut text = Node::new(
                ids.alloc(),
                Shape::Text {
                    x: placement.x,
                    y: placement.y,
                    content: annotation.label.clone(),
                    anchor: TextAnchor::Middle,
                    baseline: placement.baseline,
                },
            )
            .with_class("annotation-label");
            text.visible = label_visible(annotation.show_label, hovered, self.view.show_all_annotation_labels);
            node.children.push(text);
        }
    }
}

impl<H: Host> fmt::Debug for TrackViewer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackViewer")
            .field("config", &self.config)
            .field("view", &self.view)
            .field("transform", &self.zoom.transform())
            .field("tracks", &self.data.tracks.len())
            .field("annotations", &self.data.annotations.len())
            .finish()
    }
}

fn clip_id(container: &str) -> String {
    let name: String = container
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    format!("clip-{}", name)
}

fn render_primitive(
    node: &mut Node,
    ids: &mut IdAllocator,
    primitive: &DrawingPrimitive,
    scale: &LinearScale,
    track_height: f64,
) {
    node.children.clear();
    node.classes = vec!["primitive".to_string()];
    match primitive.kind {
        PrimitiveType::HorizontalLine => node.classes.push("horizontal-line".to_string()),
        PrimitiveType::Background => node.classes.push("background".to_string()),
        PrimitiveType::Unknown => {}
    }
    if !primitive.class.is_empty() {
        node.classes.extend(primitive.class.split_whitespace().map(str::to_string));
    }
    let style = Style {
        fill: primitive.fill.clone(),
        stroke: primitive.stroke.clone(),
        opacity: primitive.opacity,
        ..Style::default()
    };
    let shape = match primitive_geometry(primitive, scale, track_height) {
        Some(PrimitiveGeometry::Line { x1, x2, y }) => Shape::Line { x1, y1: y, x2, y2: y },
        Some(PrimitiveGeometry::Rect(b)) => Shape::Rect { x: b.x, y: b.y, width: b.width, height: b.height, rx: 0.0 },
        None => return,
    };
    node.children.push(Node::new(ids.alloc(), shape).with_style(style));
}

fn render_annotation(
    node: &mut Node,
    ids: &mut IdAllocator,
    annotation: &Annotation,
    geometry: &AnnotationGeometry,
    hovered: bool,
) {
    node.children.clear();
    node.classes = vec!["annotation".to_string(), format!("annotation-{}", annotation.kind.as_str())];
    node.classes.extend(annotation.classes.iter().cloned());
    node.set_class("hovered", hovered);
    node.cursor = Some("pointer");

    let style = Style {
        fill: annotation.fill.clone(),
        stroke: annotation.stroke.clone(),
        opacity: annotation.opacity,
        ..Style::default()
    };
    match &geometry.shape {
        ShapeGeometry::Rect { bounds, rx } => node.children.push(
            Node::new(
                ids.alloc(),
                Shape::Rect { x: bounds.x, y: bounds.y, width: bounds.width, height: bounds.height, rx: *rx },
            )
            .with_style(style),
        ),
        ShapeGeometry::Path { d } => {
            node.children.push(Node::new(ids.alloc(), Shape::Path { d: d.clone() }).with_style(style))
        }
        ShapeGeometry::Circle { cx, cy, r } => node
            .children
            .push(Node::new(ids.alloc(), Shape::Circle { cx: *cx, cy: *cy, r: *r }).with_style(style)),
        ShapeGeometry::Pin { x, y1, y2, head_r } => {
            node.children.push(
                Node::new(ids.alloc(), Shape::Line { x1: *x, y1: *y1, x2: *x, y2: *y2 }).with_style(Style {
                    stroke: annotation.stroke.clone(),
                    opacity: annotation.opacity,
                    ..Style::default()
                }),
            );
            node.children
                .push(Node::new(ids.alloc(), Shape::Circle { cx: *x, cy: *y2, r: *head_r }).with_style(style));
        }
    }
}
