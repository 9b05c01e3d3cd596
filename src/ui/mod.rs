//! # UI Document Module
//!
//! The seam between the input layer and whatever UI toolkit renders the HUD.
//!
//! The virtual pointer never touches a concrete widget tree. It asks a
//! [`Document`] for the topmost element under a point, walks parents, reads
//! element descriptions, moves focus and dispatches [`event::SyntheticEvent`]s.
//! [`tree::UiTree`] is an in-memory implementation used by the headless runner
//! and the tests.

pub mod event;
pub mod tree;

pub use event::{SyntheticEvent, SyntheticEventKind};
pub use tree::{DispatchRecord, Rect, UiTree};

/// Opaque handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// `type` attribute of an input element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Text,
    Search,
    Email,
    Password,
    Number,
    Url,
    Tel,
    Checkbox,
    Radio,
    Range,
    Submit,
}

impl InputType {
    /// True for inputs that accept typed text.
    #[must_use]
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Search
                | Self::Email
                | Self::Password
                | Self::Number
                | Self::Url
                | Self::Tel
        )
    }
}

/// Element classes the input layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementKind {
    Button,
    /// Anchor; only interactive when it carries an `href`.
    Link,
    Input(InputType),
    Select,
    TextArea,
    /// Any other element (div, span, img, ...).
    #[default]
    Generic,
}

impl ElementKind {
    /// Form controls are the only elements with a meaningful disabled state.
    #[must_use]
    pub fn is_form_control(self) -> bool {
        matches!(
            self,
            Self::Button | Self::Input(_) | Self::Select | Self::TextArea
        )
    }

    /// True for elements that take typed text.
    #[must_use]
    pub fn is_text_entry(self) -> bool {
        match self {
            Self::Input(kind) => kind.is_text_like(),
            Self::TextArea => true,
            _ => false,
        }
    }
}

/// Computed `cursor` style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Auto,
    Default,
    Pointer,
    Text,
}

/// Options passed along with a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusOptions {
    /// Keep the viewport still instead of scrolling the element into view.
    pub prevent_scroll: bool,
}

/// What the input layer needs to know about one element.
///
/// # Examples
///
/// ```
/// use skyline_input::ui::{CursorStyle, ElementInfo, ElementKind};
///
/// let tile = ElementInfo::new(ElementKind::Generic)
///     .with_role("option")
///     .with_cursor(CursorStyle::Pointer)
///     .with_label("Harbour district");
///
/// assert_eq!(tile.role.as_deref(), Some("option"));
/// assert!(!tile.disabled);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementInfo {
    pub kind: ElementKind,
    pub label: String,
    pub role: Option<String>,
    pub tab_index: Option<i32>,
    pub href: Option<String>,
    pub disabled: bool,
    pub content_editable: bool,
    pub cursor: CursorStyle,
}

impl ElementInfo {
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    #[must_use]
    pub fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }

    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: CursorStyle) -> Self {
        self.cursor = cursor;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn editable(mut self) -> Self {
        self.content_editable = true;
        self
    }

    /// True when typing into this element should not be treated as a command.
    #[must_use]
    pub fn accepts_text(&self) -> bool {
        self.content_editable || self.kind.is_text_entry()
    }
}

/// A UI document the virtual pointer can hit-test and dispatch into.
pub trait Document {
    /// Topmost element whose box contains `(x, y)`.
    fn element_from_point(&self, x: f32, y: f32) -> Option<ElementId>;

    /// Parent of `element`, `None` at the root.
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Description of `element`, `None` if the handle is stale.
    fn describe(&self, element: ElementId) -> Option<&ElementInfo>;

    /// Currently focused element.
    fn focused(&self) -> Option<ElementId>;

    /// Moves focus to `element`.
    fn focus(&mut self, element: ElementId, options: FocusOptions);

    /// Dispatches `event` with `element` as its target.
    fn dispatch(&mut self, element: ElementId, event: &SyntheticEvent);

    /// True for a form control in a disabled state.
    fn is_interactive_disabled(&self, element: ElementId) -> bool {
        self.describe(element)
            .is_some_and(|info| info.kind.is_form_control() && info.disabled)
    }

    /// True when focus sits inside a text-input-like element.
    fn focus_accepts_text(&self) -> bool {
        self.focused()
            .and_then(|element| self.describe(element))
            .is_some_and(ElementInfo::accepts_text)
    }
}
