//! Computed-style inlining on a scene clone.
//!
//! Standalone SVG has no access to the viewer's stylesheet, so every concrete shape gets
//! its effective `fill`, `stroke`, `stroke-width`, `opacity` and `font` written onto it.
//! Inheritable properties flow from groups to their descendants the same way CSS
//! inheritance does; `opacity` stays on the node that declares it.

use bgcv_core::scene::{Node, Scene, Shape, Style};
use bgcv_core::Stylesheet;

/// Clone `scene` with computed styles inlined. The live scene is not touched.
pub fn inline_styles(scene: &Scene, sheet: &Stylesheet) -> Scene {
    let mut out = scene.clone();
    let mut ancestors = Vec::new();
    out.chart = styled_clone(&scene.chart, sheet, &mut ancestors, &Style::default());
    out
}

fn inheritable(style: &Style) -> Style {
    Style { opacity: None, ..style.clone() }
}

fn shallow_clone(node: &Node) -> Node {
    Node {
        id: node.id,
        key: node.key.clone(),
        shape: node.shape.clone(),
        classes: node.classes.clone(),
        style: node.style.clone(),
        translate: node.translate,
        clip_path: node.clip_path.clone(),
        cursor: node.cursor,
        visible: node.visible,
        styled: node.styled,
        children: Vec::with_capacity(node.children.len()),
    }
}

fn styled_clone<'a>(node: &'a Node, sheet: &Stylesheet, ancestors: &mut Vec<&'a Node>, inherited: &Style) -> Node {
    let mut effective = inherited.clone();
    effective.merge(&sheet.computed(node, ancestors));
    effective.merge(&node.style);

    let mut out = shallow_clone(node);
    if !node.styled {
        out.style = match node.shape {
            Shape::Group => Style { opacity: effective.opacity, ..Style::default() },
            _ => effective.clone(),
        };
        out.styled = true;
    }

    // an already styled node carries its own effective style
    let passed = if node.styled { inheritable(&node.style) } else { inheritable(&effective) };
    ancestors.push(node);
    for child in &node.children {
        out.children.push(styled_clone(child, sheet, ancestors, &passed));
    }
    ancestors.pop();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgcv_core::scene::{IdAllocator, Layer};

    fn scene_with_annotation() -> Scene {
        let mut scene = Scene::new("clip".into());
        let (tracks, ids) = scene.layer_and_ids(Layer::Tracks);
        let rect = rect(ids);
        let mut group = Node::group(ids.alloc()).with_classes(["annotation", "annotation-box"]).with_key("a");
        group.children.push(rect);
        tracks.children.push(group);
        scene
    }

    fn rect(ids: &mut IdAllocator) -> Node {
        Node::new(ids.alloc(), Shape::Rect { x: 0.0, y: 0.0, width: 10.0, height: 5.0, rx: 0.0 })
    }

    fn first_rect(scene: &Scene) -> &Node {
        &scene.layer(Layer::Tracks).find_key("a").unwrap().children[0]
    }

    #[test]
    fn test_inherits_from_group_rules() {
        let sheet = Stylesheet::parse(".annotation { fill: red; stroke: black; opacity: 0.5; }");
        let scene = scene_with_annotation();
        let styled = inline_styles(&scene, &sheet);
        let rect = first_rect(&styled);
        assert!(rect.styled);
        assert_eq!(rect.style.fill.as_deref(), Some("red"));
        assert_eq!(rect.style.stroke.as_deref(), Some("black"));
        // opacity applies once, on the group
        assert_eq!(rect.style.opacity, None);
        let group = styled.layer(Layer::Tracks).find_key("a").unwrap();
        assert_eq!(group.style.opacity, Some(0.5));
        // live scene untouched
        assert!(!first_rect(&scene).styled);
        assert!(first_rect(&scene).style.is_empty());
    }

    #[test]
    fn test_own_attributes_win() {
        let sheet = Stylesheet::parse(".annotation { fill: red; }");
        let mut scene = scene_with_annotation();
        let tracks = scene.layer_mut(Layer::Tracks);
        tracks.children[0].children[0].style.fill = Some("#00ff00".into());
        let styled = inline_styles(&scene, &sheet);
        assert_eq!(first_rect(&styled).style.fill.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_idempotent() {
        let sheet = Stylesheet::parse(".annotation { fill: red; } rect { stroke-width: 2; }");
        let scene = scene_with_annotation();
        let once = inline_styles(&scene, &sheet);
        let twice = inline_styles(&once, &sheet);
        assert_eq!(once.chart, twice.chart);
    }
}
