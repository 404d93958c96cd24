//! Right-click context menu for the viewer.

use crate::viewer::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    ShowAllAnnotationLabels,
    ShowTrackLabels,
    SaveSvg,
    SavePng,
}

/// What selecting an item asks the viewer (or its embedder) to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    SetShowAllAnnotationLabels(bool),
    SetShowTrackLabels(bool),
    SaveSvg,
    SavePng,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub item: MenuItem,
    pub label: &'static str,
    /// Check state for toggles, `None` for plain actions
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ContextMenu {
    open_at: Option<(f64, f64)>,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, x: f64, y: f64) {
        self.open_at = Some((x, y));
    }

    pub fn close(&mut self) {
        self.open_at = None;
    }

    pub fn is_open(&self) -> bool {
        self.open_at.is_some()
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.open_at
    }

    pub fn entries(&self, view: &ViewState) -> Vec<MenuEntry> {
        vec![
            MenuEntry {
                item: MenuItem::ShowAllAnnotationLabels,
                label: "Show all annotation labels",
                checked: Some(view.show_all_annotation_labels),
            },
            MenuEntry {
                item: MenuItem::ShowTrackLabels,
                label: "Show track labels",
                checked: Some(view.show_track_labels),
            },
            MenuEntry { item: MenuItem::SaveSvg, label: "Save as SVG", checked: None },
            MenuEntry { item: MenuItem::SavePng, label: "Save as PNG", checked: None },
        ]
    }

    /// Select an item and close the menu.
    pub fn select(&mut self, item: MenuItem, view: &ViewState) -> MenuAction {
        self.close();
        match item {
            MenuItem::ShowAllAnnotationLabels => {
                MenuAction::SetShowAllAnnotationLabels(!view.show_all_annotation_labels)
            }
            MenuItem::ShowTrackLabels => MenuAction::SetShowTrackLabels(!view.show_track_labels),
            MenuItem::SaveSvg => MenuAction::SaveSvg,
            MenuItem::SavePng => MenuAction::SavePng,
        }
    }
}
