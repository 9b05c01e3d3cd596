//! # In-Memory UI Tree
//!
//! A small retained document: elements with screen rectangles, parent links
//! and z-order by insertion (later elements paint on top). Focus changes and
//! dispatched events are appended to a journal so callers can forward them to
//! a real toolkit, log them, or assert on them.
//!
//! ## Usage
//!
//! ```
//! use skyline_input::ui::{Document, ElementInfo, ElementKind, Rect, UiTree};
//!
//! let mut tree = UiTree::new();
//! let panel = tree.insert(None, Rect::new(0.0, 0.0, 300.0, 200.0), ElementInfo::default());
//! let button = tree.insert(
//!     Some(panel),
//!     Rect::new(20.0, 20.0, 100.0, 40.0),
//!     ElementInfo::new(ElementKind::Button).with_label("Credits"),
//! );
//!
//! assert_eq!(tree.element_from_point(50.0, 30.0), Some(button));
//! assert_eq!(tree.element_from_point(250.0, 150.0), Some(panel));
//! assert_eq!(tree.parent(button), Some(panel));
//! ```

use tracing::debug;

use super::{Document, ElementId, ElementInfo, FocusOptions, SyntheticEvent};

/// Axis-aligned screen rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges are outside.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// One entry in the tree's journal.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchRecord {
    Focus {
        target: ElementId,
        prevent_scroll: bool,
    },
    Event {
        target: ElementId,
        event: SyntheticEvent,
    },
}

impl DispatchRecord {
    /// `"focus"` or the event type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Focus { .. } => "focus",
            Self::Event { event, .. } => event.name(),
        }
    }

    #[must_use]
    pub fn target(&self) -> ElementId {
        match self {
            Self::Focus { target, .. } | Self::Event { target, .. } => *target,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    info: ElementInfo,
    rect: Rect,
    parent: Option<ElementId>,
    hidden: bool,
}

/// In-memory [`Document`] implementation.
#[derive(Debug, Clone, Default)]
pub struct UiTree {
    nodes: Vec<Node>,
    focused: Option<ElementId>,
    journal: Vec<DispatchRecord>,
}

impl UiTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element on top of everything inserted before it.
    ///
    /// A `parent` that does not belong to this tree is treated as no parent.
    pub fn insert(&mut self, parent: Option<ElementId>, rect: Rect, info: ElementInfo) -> ElementId {
        let parent = parent.filter(|p| p.0 < self.nodes.len());
        self.nodes.push(Node {
            info,
            rect,
            parent,
            hidden: false,
        });
        ElementId(self.nodes.len() - 1)
    }

    /// Number of elements in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Mutable access to an element's description.
    pub fn info_mut(&mut self, element: ElementId) -> Option<&mut ElementInfo> {
        self.nodes.get_mut(element.0).map(|node| &mut node.info)
    }

    /// Toggles the disabled flag on an element.
    pub fn set_disabled(&mut self, element: ElementId, disabled: bool) {
        if let Some(info) = self.info_mut(element) {
            info.disabled = disabled;
        }
    }

    /// Hidden elements are skipped by hit testing.
    pub fn set_hidden(&mut self, element: ElementId, hidden: bool) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.hidden = hidden;
        }
    }

    /// Everything focused or dispatched so far.
    #[must_use]
    pub fn journal(&self) -> &[DispatchRecord] {
        &self.journal
    }

    /// Drains the journal.
    pub fn take_journal(&mut self) -> Vec<DispatchRecord> {
        std::mem::take(&mut self.journal)
    }

    /// Journal entry names in order (`"focus"`, `"pointerdown"`, ...).
    #[must_use]
    pub fn journal_names(&self) -> Vec<&'static str> {
        self.journal.iter().map(DispatchRecord::name).collect()
    }

    fn label(&self, element: ElementId) -> &str {
        self.nodes
            .get(element.0)
            .map_or("", |node| node.info.label.as_str())
    }
}

impl Document for UiTree {
    fn element_from_point(&self, x: f32, y: f32) -> Option<ElementId> {
        self.nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, node)| !node.hidden && node.rect.contains(x, y))
            .map(|(index, _)| ElementId(index))
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes.get(element.0).and_then(|node| node.parent)
    }

    fn describe(&self, element: ElementId) -> Option<&ElementInfo> {
        self.nodes.get(element.0).map(|node| &node.info)
    }

    fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    fn focus(&mut self, element: ElementId, options: FocusOptions) {
        if element.0 >= self.nodes.len() {
            return;
        }
        debug!("Focus -> #{} '{}'", element.0, self.label(element));
        self.focused = Some(element);
        self.journal.push(DispatchRecord::Focus {
            target: element,
            prevent_scroll: options.prevent_scroll,
        });
    }

    fn dispatch(&mut self, element: ElementId, event: &SyntheticEvent) {
        if element.0 >= self.nodes.len() {
            return;
        }
        debug!(
            "{} -> #{} '{}' at ({:.1}, {:.1})",
            event.name(),
            element.0,
            self.label(element),
            event.client_x,
            event.client_y
        );
        self.journal.push(DispatchRecord::Event {
            target: element,
            event: event.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{ElementKind, InputType, SyntheticEventKind};

    fn sample_tree() -> (UiTree, ElementId, ElementId, ElementId) {
        let mut tree = UiTree::new();
        let root = tree.insert(None, Rect::new(0.0, 0.0, 800.0, 600.0), ElementInfo::default());
        let button = tree.insert(
            Some(root),
            Rect::new(10.0, 10.0, 100.0, 30.0),
            ElementInfo::new(ElementKind::Button).with_label("Fly"),
        );
        let overlay = tree.insert(
            Some(root),
            Rect::new(50.0, 0.0, 100.0, 100.0),
            ElementInfo::new(ElementKind::Generic).with_label("Tooltip"),
        );
        (tree, root, button, overlay)
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(9.99, 9.99));
        assert!(!rect.contains(10.0, 5.0));
        assert!(!rect.contains(5.0, 10.0));
        assert!(!rect.contains(-0.1, 5.0));
    }

    #[test]
    fn test_topmost_element_wins() {
        let (tree, _, button, overlay) = sample_tree();
        // Overlap region: the later-inserted overlay is on top.
        assert_eq!(tree.element_from_point(60.0, 20.0), Some(overlay));
        // Button-only region.
        assert_eq!(tree.element_from_point(20.0, 20.0), Some(button));
    }

    #[test]
    fn test_point_outside_everything() {
        let (tree, ..) = sample_tree();
        assert_eq!(tree.element_from_point(900.0, 900.0), None);
    }

    #[test]
    fn test_hidden_elements_are_not_hit() {
        let (mut tree, _, _, overlay) = sample_tree();
        tree.set_hidden(overlay, true);
        assert_ne!(tree.element_from_point(60.0, 20.0), Some(overlay));
    }

    #[test]
    fn test_parent_links() {
        let (tree, root, button, _) = sample_tree();
        assert_eq!(tree.parent(button), Some(root));
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn test_foreign_parent_is_dropped() {
        let mut tree = UiTree::new();
        let id = tree.insert(Some(ElementId(42)), Rect::new(0.0, 0.0, 1.0, 1.0), ElementInfo::default());
        assert_eq!(tree.parent(id), None);
    }

    #[test]
    fn test_journal_records_focus_and_events() {
        let (mut tree, _, button, _) = sample_tree();
        tree.focus(button, FocusOptions { prevent_scroll: true });
        tree.dispatch(button, &SyntheticEvent::new(SyntheticEventKind::Click, 20.0, 20.0));

        assert_eq!(tree.focused(), Some(button));
        assert_eq!(tree.journal_names(), vec!["focus", "click"]);
        assert!(matches!(
            tree.journal()[0],
            DispatchRecord::Focus { prevent_scroll: true, .. }
        ));
        assert_eq!(tree.journal()[1].target(), button);

        let drained = tree.take_journal();
        assert_eq!(drained.len(), 2);
        assert!(tree.journal().is_empty());
    }

    #[test]
    fn test_stale_handles_are_ignored() {
        let (mut tree, ..) = sample_tree();
        tree.focus(ElementId(99), FocusOptions::default());
        tree.dispatch(ElementId(99), &SyntheticEvent::new(SyntheticEventKind::Click, 0.0, 0.0));
        assert!(tree.journal().is_empty());
        assert!(tree.focused().is_none());
    }

    #[test]
    fn test_disabled_predicate() {
        let (mut tree, root, button, _) = sample_tree();
        assert!(!tree.is_interactive_disabled(button));
        tree.set_disabled(button, true);
        assert!(tree.is_interactive_disabled(button));

        // Generic elements have no disabled state.
        tree.set_disabled(root, true);
        assert!(!tree.is_interactive_disabled(root));
    }

    #[test]
    fn test_focus_accepts_text() {
        let mut tree = UiTree::new();
        let search = tree.insert(
            None,
            Rect::new(0.0, 0.0, 100.0, 20.0),
            ElementInfo::new(ElementKind::Input(InputType::Search)),
        );
        let button = tree.insert(
            None,
            Rect::new(0.0, 30.0, 100.0, 20.0),
            ElementInfo::new(ElementKind::Button),
        );

        assert!(!tree.focus_accepts_text());
        tree.focus(search, FocusOptions::default());
        assert!(tree.focus_accepts_text());
        tree.focus(button, FocusOptions::default());
        assert!(!tree.focus_accepts_text());
    }
}
