//! SVG serialization of a scene.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bgcv_core::geometry::fmt_num;
use bgcv_core::scene::{Node, Scene, Shape, Style};

/// Layout of the written document
#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Blank border added around the drawing, in pixels
    pub margin: f64,
    /// Fill of a full-size rectangle painted first
    pub background: Option<String>,
    /// Comment lines placed at the top of the document
    pub comments: Vec<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self { margin: 0.0, background: None, comments: Vec::new() }
    }
}

/// Builds the document as a list of indented element lines.
pub struct SvgWriter {
    width: f64,
    height: f64,
    elements: Vec<String>,
    depth: usize,
}

impl SvgWriter {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, elements: Vec::new(), depth: 1 }
    }

    fn push(&mut self, line: String) {
        let indent = "  ".repeat(self.depth);
        self.elements.push(format!("{}{}", indent, line));
    }

    pub fn add_comment(&mut self, text: &str) {
        for line in text.lines() {
            // "--" is not allowed inside XML comments
            self.push(format!("<!-- {} -->", line.replace("--", "- -")));
        }
    }

    pub fn add_background(&mut self, fill: &str) {
        self.push(format!(
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            fmt_num(self.width),
            fmt_num(self.height),
            escape_xml(fill)
        ));
    }

    pub fn add_clip_rect(&mut self, id: &str, width: f64, height: f64) {
        self.push("<defs>".to_string());
        self.depth += 1;
        self.push(format!(r#"<clipPath id="{}">"#, escape_xml(id)));
        self.depth += 1;
        self.push(format!(
            r#"<rect x="0" y="0" width="{}" height="{}"/>"#,
            fmt_num(width),
            fmt_num(height)
        ));
        self.depth -= 1;
        self.push("</clipPath>".to_string());
        self.depth -= 1;
        self.push("</defs>".to_string());
    }

    pub fn open_group(&mut self, translate: Option<(f64, f64)>) {
        match translate {
            Some((x, y)) => self.push(format!(r#"<g transform="translate({},{})">"#, fmt_num(x), fmt_num(y))),
            None => self.push("<g>".to_string()),
        }
        self.depth += 1;
    }

    pub fn close_group(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.push("</g>".to_string());
    }

    /// Write a node and its visible descendants. Hidden nodes are skipped entirely.
    pub fn add_node(&mut self, node: &Node) {
        if !node.visible {
            return;
        }
        let attrs = node_attributes(node);
        match &node.shape {
            Shape::Group => {
                if node.children.is_empty() {
                    self.push(format!("<g{}/>", attrs));
                    return;
                }
                self.push(format!("<g{}>", attrs));
                self.depth += 1;
                for child in &node.children {
                    self.add_node(child);
                }
                self.depth -= 1;
                self.push("</g>".to_string());
            }
            Shape::Rect { x, y, width, height, rx } => {
                let rx = if *rx > 0.0 { format!(r#" rx="{}""#, fmt_num(*rx)) } else { String::new() };
                self.push(format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}"{}{}/>"#,
                    fmt_num(*x),
                    fmt_num(*y),
                    fmt_num(*width),
                    fmt_num(*height),
                    rx,
                    attrs
                ));
            }
            Shape::Path { d } => self.push(format!(r#"<path d="{}"{}/>"#, escape_xml(d), attrs)),
            Shape::Circle { cx, cy, r } => self.push(format!(
                r#"<circle cx="{}" cy="{}" r="{}"{}/>"#,
                fmt_num(*cx),
                fmt_num(*cy),
                fmt_num(*r),
                attrs
            )),
            Shape::Line { x1, y1, x2, y2 } => self.push(format!(
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                fmt_num(*x1),
                fmt_num(*y1),
                fmt_num(*x2),
                fmt_num(*y2),
                attrs
            )),
            Shape::Text { x, y, content, anchor, baseline } => self.push(format!(
                r#"<text x="{}" y="{}" text-anchor="{}" dominant-baseline="{}"{}>{}</text>"#,
                fmt_num(*x),
                fmt_num(*y),
                anchor.as_str(),
                baseline.as_str(),
                attrs,
                escape_xml(content)
            )),
        }
    }

    pub fn finish(self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            out,
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
            w = fmt_num(self.width),
            h = fmt_num(self.height)
        );
        for element in &self.elements {
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }
}

/// Serialize a scene. Styles are written as found; inline them first for standalone output.
pub fn scene_to_svg(scene: &Scene, options: &SvgOptions) -> String {
    let margin = options.margin.max(0.0);
    let mut svg = SvgWriter::new(scene.width + 2.0 * margin, scene.height + 2.0 * margin);
    for comment in &options.comments {
        svg.add_comment(comment);
    }
    if let Some(fill) = &options.background {
        svg.add_background(fill);
    }
    svg.add_clip_rect(&scene.clip.id, scene.clip.width, scene.clip.height);
    if margin > 0.0 {
        svg.open_group(Some((margin, margin)));
        svg.add_node(&scene.chart);
        svg.close_group();
    } else {
        svg.add_node(&scene.chart);
    }
    svg.finish()
}

pub fn write_svg<P: AsRef<Path>>(svg: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, svg).with_context(|| format!("Failed to write SVG to {}", path.display()))
}

fn node_attributes(node: &Node) -> String {
    let mut attrs = String::new();
    if !node.classes.is_empty() {
        let _ = write!(attrs, r#" class="{}""#, escape_xml(&node.classes.join(" ")));
    }
    if let Some((x, y)) = node.translate {
        let _ = write!(attrs, r#" transform="translate({},{})""#, fmt_num(x), fmt_num(y));
    }
    if let Some(clip) = &node.clip_path {
        let _ = write!(attrs, r#" clip-path="url(#{})""#, escape_xml(clip));
    }
    push_style(&mut attrs, &node.style);
    attrs
}

fn push_style(attrs: &mut String, style: &Style) {
    if let Some(fill) = &style.fill {
        let _ = write!(attrs, r#" fill="{}""#, escape_xml(fill));
    }
    if let Some(stroke) = &style.stroke {
        let _ = write!(attrs, r#" stroke="{}""#, escape_xml(stroke));
    }
    if let Some(width) = style.stroke_width {
        let _ = write!(attrs, r#" stroke-width="{}""#, fmt_num(width));
    }
    if let Some(opacity) = style.opacity {
        let _ = write!(attrs, r#" opacity="{}""#, fmt_num(opacity));
    }
    if let Some(font) = &style.font {
        for (name, value) in font_attributes(font) {
            let _ = write!(attrs, r#" {}="{}""#, name, escape_xml(&value));
        }
    }
}

/// Expand a CSS `font` shorthand (`[style] [weight] size family`) into attributes.
pub fn font_attributes(font: &str) -> Vec<(&'static str, String)> {
    let tokens: Vec<&str> = font.split_whitespace().collect();
    let Some(size_at) = tokens.iter().position(|t| t.starts_with(|c: char| c.is_ascii_digit())) else {
        return vec![("font-family", font.trim().to_string())];
    };
    let mut attrs = Vec::new();
    for token in &tokens[..size_at] {
        match *token {
            "italic" | "oblique" => attrs.push(("font-style", token.to_string())),
            "normal" => {}
            weight => attrs.push(("font-weight", weight.to_string())),
        }
    }
    // "12px/1.5" carries a line height we do not need
    let size = tokens[size_at].split('/').next().unwrap_or(tokens[size_at]);
    attrs.push(("font-size", size.trim_end_matches("px").to_string()));
    let family = tokens[size_at + 1..].join(" ");
    if !family.is_empty() {
        attrs.push(("font-family", family));
    }
    attrs
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgcv_core::scene::{Baseline, IdAllocator, TextAnchor};

    #[test]
    fn test_font_attributes() {
        assert_eq!(
            font_attributes("12px sans-serif"),
            vec![("font-size", "12".to_string()), ("font-family", "sans-serif".to_string())]
        );
        assert_eq!(
            font_attributes("italic bold 10px/1.2 \"Open Sans\", serif"),
            vec![
                ("font-style", "italic".to_string()),
                ("font-weight", "bold".to_string()),
                ("font-size", "10".to_string()),
                ("font-family", "\"Open Sans\", serif".to_string()),
            ]
        );
        assert_eq!(font_attributes("serif"), vec![("font-family", "serif".to_string())]);
    }

    #[test]
    fn test_hidden_nodes_omitted_and_text_escaped() {
        let mut ids = IdAllocator::default();
        let mut group = Node::group(ids.alloc()).with_class("labels");
        let text = Node::new(
            ids.alloc(),
            Shape::Text {
                x: 1.0,
                y: 2.5,
                content: "PKS <KS&AT>".into(),
                anchor: TextAnchor::Middle,
                baseline: Baseline::Middle,
            },
        );
        let mut hidden = Node::new(ids.alloc(), Shape::Circle { cx: 0.0, cy: 0.0, r: 1.0 });
        hidden.visible = false;
        group.children.push(text);
        group.children.push(hidden);

        let mut svg = SvgWriter::new(100.0, 50.0);
        svg.add_node(&group);
        let out = svg.finish();
        assert!(out.contains("PKS &lt;KS&amp;AT&gt;"));
        assert!(out.contains(r#"<text x="1" y="2.5" text-anchor="middle""#));
        assert!(!out.contains("<circle"));
        assert!(out.starts_with("<?xml"));
        assert!(out.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_scene_margin_and_clip() {
        let scene = Scene::new("clip-viewer".into());
        let options = SvgOptions { margin: 10.0, background: Some("white".into()), comments: vec![] };
        let out = scene_to_svg(&scene, &options);
        assert!(out.contains(r#"<svg width="20" height="20""#));
        assert!(out.contains(r#"<clipPath id="clip-viewer">"#));
        assert!(out.contains(r#"<g transform="translate(10,10)">"#));
        assert!(out.contains(r#"fill="white""#));
    }
}
