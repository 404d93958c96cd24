//! Retained scene graph
//!
//! The viewer renders into a tree of typed draw commands rather than a document. A
//! backend (see `bgcv-export`) maps nodes onto concrete SVG or raster output. Node ids are
//! allocated once when a node is created and survive updates, so a node's identity tells
//! whether reconciliation reused or recreated it.
//!
//! The chart group has a fixed set of layers. Their order is the paint order, and the
//! annotation label layer is always last.

use crate::config::Margin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn alloc(&mut self) -> NodeId {
        self.next += 1;
        NodeId(self.next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    #[default]
    Alphabetic,
    Middle,
    Hanging,
}

impl Baseline {
    pub fn as_str(self) -> &'static str {
        match self {
            Baseline::Alphabetic => "alphabetic",
            Baseline::Middle => "middle",
            Baseline::Hanging => "hanging",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Group,
    Rect { x: f64, y: f64, width: f64, height: f64, rx: f64 },
    Path { d: String },
    Circle { cx: f64, cy: f64, r: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Text { x: f64, y: f64, content: String, anchor: TextAnchor, baseline: Baseline },
}

impl Shape {
    /// Element name used for selector matching and serialization.
    pub fn tag(&self) -> &'static str {
        match self {
            Shape::Group => "g",
            Shape::Rect { .. } => "rect",
            Shape::Path { .. } => "path",
            Shape::Circle { .. } => "circle",
            Shape::Line { .. } => "line",
            Shape::Text { .. } => "text",
        }
    }
}

/// Presentation properties. `None` means inherited or left to the stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub font: Option<String>,
}

impl Style {
    /// Overlay `other` on top of `self`; set properties of `other` win.
    pub fn merge(&mut self, other: &Style) {
        if other.fill.is_some() {
            self.fill = other.fill.clone();
        }
        if other.stroke.is_some() {
            self.stroke = other.stroke.clone();
        }
        if other.stroke_width.is_some() {
            self.stroke_width = other.stroke_width;
        }
        if other.opacity.is_some() {
            self.opacity = other.opacity;
        }
        if other.font.is_some() {
            self.font = other.font.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Stable data key (track, annotation or primitive id) for keyed children
    pub key: Option<String>,
    pub shape: Shape,
    pub classes: Vec<String>,
    pub style: Style,
    pub translate: Option<(f64, f64)>,
    pub clip_path: Option<String>,
    pub cursor: Option<&'static str>,
    pub visible: bool,
    /// Set once computed styles have been inlined for export
    pub styled: bool,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(id: NodeId, shape: Shape) -> Self {
        Self {
            id,
            key: None,
            shape,
            classes: Vec::new(),
            style: Style::default(),
            translate: None,
            clip_path: None,
            cursor: None,
            visible: true,
            styled: false,
            children: Vec::new(),
        }
    }

    pub fn group(id: NodeId) -> Self {
        Self::new(id, Shape::Group)
    }

    pub fn with_class<S: Into<String>>(mut self, class: S) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes.extend(classes.into_iter().map(Into::into));
        self
    }

    pub fn with_key<S: Into<String>>(mut self, key: S) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn set_class(&mut self, class: &str, on: bool) {
        let present = self.has_class(class);
        if on && !present {
            self.classes.push(class.to_string());
        } else if !on && present {
            self.classes.retain(|c| c != class);
        }
    }

    pub fn child_by_key(&self, key: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.key.as_deref() == Some(key))
    }

    /// Depth-first search for the first node with the given class.
    pub fn find_class(&self, class: &str) -> Option<&Node> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_class(class))
    }

    /// Depth-first search by key.
    pub fn find_key(&self, key: &str) -> Option<&Node> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_key(key))
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

/// Fixed layers of the chart group, in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background = 0,
    TrackLabels = 1,
    Axis = 2,
    Tracks = 3,
    AnnotationLabels = 4,
}

const LAYER_CLASSES: [&str; 5] = ["background", "track-labels", "x-axis", "tracks", "annotation-labels"];

#[derive(Debug, Clone, PartialEq)]
pub struct ClipRect {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub clip: ClipRect,
    pub chart: Node,
    ids: IdAllocator,
}

impl Scene {
    pub fn new(clip_id: String) -> Self {
        let mut ids = IdAllocator::default();
        let mut chart = Node::group(ids.alloc()).with_class("chart");
        for (i, class) in LAYER_CLASSES.iter().enumerate() {
            let node = if i == Layer::Background as usize {
                Node::new(ids.alloc(), Shape::Rect { x: 0.0, y: 0.0, width: 0.0, height: 0.0, rx: 0.0 })
            } else {
                Node::group(ids.alloc())
            };
            chart.children.push(node.with_class(*class));
        }
        // labels above the first track sit at negative y and stay unclipped
        chart.children[Layer::Tracks as usize].clip_path = Some(clip_id.clone());
        Self {
            width: 0.0,
            height: 0.0,
            clip: ClipRect { id: clip_id, width: 0.0, height: 0.0 },
            chart,
            ids,
        }
    }

    pub fn layer(&self, layer: Layer) -> &Node {
        &self.chart.children[layer as usize]
    }

    pub fn layer_mut(&mut self, layer: Layer) -> &mut Node {
        &mut self.chart.children[layer as usize]
    }

    /// Split borrow of a layer and the id allocator.
    pub fn layer_and_ids(&mut self, layer: Layer) -> (&mut Node, &mut IdAllocator) {
        (&mut self.chart.children[layer as usize], &mut self.ids)
    }

    pub fn ids(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// Resize every frame-dependent element: the drawing, the chart translate, the clip
    /// rectangle and the background hit target.
    pub fn set_frame(&mut self, width: f64, height: f64, margin: &Margin) {
        let chart_width = (width - margin.left - margin.right).max(0.0);
        let chart_height = (height - margin.top - margin.bottom).max(0.0);
        self.width = width;
        self.height = height;
        self.chart.translate = Some((margin.left, margin.top));
        self.clip.width = chart_width;
        self.clip.height = chart_height;
        if let Shape::Rect { width: w, height: h, .. } = &mut self.layer_mut(Layer::Background).shape {
            *w = chart_width;
            *h = chart_height;
        }
    }

    /// Drop every node created for data; the fixed layers remain, empty.
    pub fn clear(&mut self) {
        for (i, layer) in self.chart.children.iter_mut().enumerate() {
            if i != Layer::Background as usize {
                layer.children.clear();
            }
        }
    }
}
