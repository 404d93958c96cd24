//! Class-based stylesheet used to compute presentation attributes.
//!
//! Supports the subset of CSS the viewer's own stylesheet uses: compound selectors made of
//! an optional element name and any number of classes, descendant combinators, and the
//! properties `fill`, `stroke`, `stroke-width`, `opacity`, `font`, `font-size` and
//! `font-family`. Matching rules apply in specificity order, source order breaking ties.

use log::debug;

use crate::scene::{Node, Style};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
    pub tag: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split('.');
        let tag = parts.next()?.trim();
        let tag = if tag.is_empty() || tag == "*" { None } else { Some(tag.to_string()) };
        let classes: Vec<String> = parts.map(|c| c.trim().to_string()).collect();
        if classes.iter().any(String::is_empty) {
            return None;
        }
        Some(Self { tag, classes })
    }

    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if tag != node.shape.tag() {
                return false;
            }
        }
        self.classes.iter().all(|c| node.has_class(c))
    }
}

/// A descendant selector: the last compound matches the node, earlier ones its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub parts: Vec<Compound>,
}

impl Selector {
    pub fn parse(text: &str) -> Option<Self> {
        let parts = text
            .split_whitespace()
            .map(Compound::parse)
            .collect::<Option<Vec<_>>>()?;
        if parts.is_empty() {
            return None;
        }
        Some(Self { parts })
    }

    fn specificity(&self) -> (usize, usize) {
        let classes = self.parts.iter().map(|p| p.classes.len()).sum();
        let tags = self.parts.iter().filter(|p| p.tag.is_some()).count();
        (classes, tags)
    }

    /// `ancestors` is ordered from the root down to the node's parent.
    pub fn matches(&self, node: &Node, ancestors: &[&Node]) -> bool {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }
        let mut remaining = ancestors;
        for part in rest.iter().rev() {
            match remaining.iter().rposition(|a| part.matches(a)) {
                Some(pos) => remaining = &remaining[..pos],
                None => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: Selector,
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

/// Stylesheet the viewer ships with.
pub const DEFAULT_CSS: &str = r#"
.annotation { fill: #4a90d9; stroke: #2c5f8a; stroke-width: 1; }
.annotation.hovered { stroke: #000000; stroke-width: 2; }
.annotation-pin line { stroke: #333333; stroke-width: 1.5; }
.annotation-pin circle { fill: #d94a4a; stroke: #333333; }
.primitive.horizontal-line { fill: none; stroke: #999999; stroke-width: 1; }
.primitive.background { fill: #f5f5f5; stroke: none; opacity: 1; }
.track-label { fill: #333333; font: 12px sans-serif; }
.annotation-label { fill: #222222; font: 11px sans-serif; }
.annotation-label-bg { fill: #ffffff; opacity: 0.8; stroke: none; }
.background { fill: #ffffff; opacity: 0; }
.x-axis line { stroke: #666666; stroke-width: 1; }
.x-axis text { fill: #666666; font: 10px sans-serif; }
"#;

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn push(&mut self, selector: Selector, style: Style) {
        self.rules.push(Rule { selector, style });
    }

    /// Parse CSS text. Rules with selectors or declarations outside the supported subset
    /// are skipped.
    pub fn parse(css: &str) -> Self {
        let mut sheet = Self::new();
        for block in css.split('}') {
            let Some((selectors, body)) = block.split_once('{') else {
                continue;
            };
            let style = parse_declarations(body);
            for text in selectors.split(',') {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match Selector::parse(text) {
                    Some(selector) => sheet.push(selector, style.clone()),
                    None => debug!("skipping unsupported selector {:?}", text),
                }
            }
        }
        sheet
    }

    /// Append the rules of `other` after this sheet's own.
    pub fn extend(&mut self, other: Stylesheet) {
        self.rules.extend(other.rules);
    }

    /// Properties from all rules matching `node`, without the node's own style.
    pub fn computed(&self, node: &Node, ancestors: &[&Node]) -> Style {
        let mut matched: Vec<(usize, &Rule)> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.selector.matches(node, ancestors))
            .collect();
        matched.sort_by_key(|(i, r)| (r.selector.specificity(), *i));
        let mut style = Style::default();
        for (_, rule) in matched {
            style.merge(&rule.style);
        }
        style
    }

    /// Rule properties with the node's own presentation attributes on top.
    pub fn resolve(&self, node: &Node, ancestors: &[&Node]) -> Style {
        let mut style = self.computed(node, ancestors);
        style.merge(&node.style);
        style
    }
}

impl std::str::FromStr for Stylesheet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// The built-in viewer stylesheet.
pub fn default_stylesheet() -> Stylesheet {
    Stylesheet::parse(DEFAULT_CSS)
}

fn parse_declarations(body: &str) -> Style {
    let mut style = Style::default();
    let mut font_size: Option<String> = None;
    let mut font_family: Option<String> = None;
    for decl in body.split(';') {
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match name.trim() {
            "fill" => style.fill = Some(value),
            "stroke" => style.stroke = Some(value),
            "stroke-width" => style.stroke_width = parse_px(&value),
            "opacity" => style.opacity = value.parse().ok(),
            "font" => style.font = Some(value),
            "font-size" => font_size = Some(value),
            "font-family" => font_family = Some(value),
            other => debug!("ignoring css property {:?}", other),
        }
    }
    if font_size.is_some() || font_family.is_some() {
        let size = font_size.unwrap_or_else(|| "12px".to_string());
        let family = font_family.unwrap_or_else(|| "sans-serif".to_string());
        style.font = Some(format!("{} {}", size, family));
    }
    style
}

fn parse_px(value: &str) -> Option<f64> {
    value.trim_end_matches("px").trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{IdAllocator, Shape};

    fn line(ids: &mut IdAllocator) -> Node {
        Node::new(ids.alloc(), Shape::Line { x1: 0.0, y1: 0.0, x2: 1.0, y2: 0.0 })
    }

    #[test]
    fn test_parse_default_sheet() {
        let sheet = default_stylesheet();
        assert!(sheet.rules().len() >= 10);
    }

    #[test]
    fn test_specificity_and_source_order() {
        let sheet = Stylesheet::parse(
            ".annotation.hovered { stroke: black; } .annotation { stroke: blue; fill: red; }",
        );
        let mut ids = IdAllocator::default();
        let node = Node::group(ids.alloc()).with_classes(["annotation", "hovered"]);
        let style = sheet.computed(&node, &[]);
        assert_eq!(style.stroke.as_deref(), Some("black"));
        assert_eq!(style.fill.as_deref(), Some("red"));
    }

    #[test]
    fn test_descendant_selector() {
        let sheet = Stylesheet::parse(".x-axis line { stroke: #666; stroke-width: 2px; }");
        let mut ids = IdAllocator::default();
        let axis = Node::group(ids.alloc()).with_class("x-axis");
        let tick = Node::group(ids.alloc()).with_class("tick");
        let node = line(&mut ids);
        let style = sheet.computed(&node, &[&axis, &tick]);
        assert_eq!(style.stroke.as_deref(), Some("#666"));
        assert_eq!(style.stroke_width, Some(2.0));
        assert!(sheet.computed(&node, &[&tick]).is_empty());
    }

    #[test]
    fn test_node_style_wins() {
        let sheet = Stylesheet::parse(".annotation { fill: red; }");
        let mut ids = IdAllocator::default();
        let node = Node::group(ids.alloc())
            .with_class("annotation")
            .with_style(Style { fill: Some("green".into()), ..Style::default() });
        assert_eq!(sheet.resolve(&node, &[]).fill.as_deref(), Some("green"));
    }

    #[test]
    fn test_font_parts_combine() {
        let sheet = Stylesheet::parse("text { font-size: 14px; font-family: serif; }");
        let mut ids = IdAllocator::default();
        let node = Node::new(
            ids.alloc(),
            Shape::Text {
                x: 0.0,
                y: 0.0,
                content: "x".into(),
                anchor: Default::default(),
                baseline: Default::default(),
            },
        );
        assert_eq!(sheet.computed(&node, &[]).font.as_deref(), Some("14px serif"));
    }

    #[test]
    fn test_unsupported_selector_skipped() {
        let sheet = Stylesheet::parse("a > b { fill: red; } .ok { fill: blue; }");
        // ">" parses as a tag compound that never matches a scene node
        assert!(sheet.rules().iter().any(|r| r.style.fill.as_deref() == Some("blue")));
        let sheet = Stylesheet::parse(".bad..class { fill: red; }");
        assert!(sheet.rules().is_empty());
    }
}
