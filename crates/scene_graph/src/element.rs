//! Element kinds and inline styles carried by scene nodes.

use std::fmt::Write;
use strum_macros::Display;

/// What an element is, which also decides the tag it renders as.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// The page the editor is mounted into
    Root,
    /// The HTML element both the main canvas and the drag surface live in
    Container,
    /// The main editing surface with all non-dragged blocks
    Canvas,
    /// Root of the isolated drag layer
    Surface,
    /// Plain grouping element
    Group,
    /// A rendered block; its children are nested blocks
    Block,
}

impl ElementKind {
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Root => "body",
            ElementKind::Container => "div",
            ElementKind::Canvas | ElementKind::Surface => "svg",
            ElementKind::Group | ElementKind::Block => "g",
        }
    }
}

/// CSS `display` values the editor writes.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum DisplayMode {
    Block,
    None,
}

/// CSS `overflow` values the editor writes.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Overflow {
    Visible,
    Hidden,
}

/// Inline style of an element. Unset properties are not rendered.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Style {
    pub transform: Option<String>,
    pub display: Option<DisplayMode>,
    pub overflow: Option<Overflow>,
}

impl Style {
    pub fn is_empty(&self) -> bool {
        self.transform.is_none() && self.display.is_none() && self.overflow.is_none()
    }

    /// Whether the element is hidden by its own style.
    pub fn is_hidden(&self) -> bool {
        self.display == Some(DisplayMode::None)
    }

    /// Renders the style as an inline CSS declaration list.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        if let Some(transform) = &self.transform {
            let _ = write!(css, "transform: {transform}; ");
        }
        if let Some(display) = self.display {
            let _ = write!(css, "display: {display}; ");
        }
        if let Some(overflow) = self.overflow {
            let _ = write!(css, "overflow: {overflow}; ");
        }
        css.truncate(css.trim_end().len());
        css
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(DisplayMode::None.to_string(), "none");
        assert_eq!(DisplayMode::Block.to_string(), "block");
        assert_eq!(Overflow::Visible.to_string(), "visible");
        assert_eq!(Overflow::Hidden.to_string(), "hidden");
    }

    #[test]
    fn test_css() {
        let style = Style {
            transform: Some("translate3d(20px, 40px, 0px)".into()),
            display: Some(DisplayMode::Block),
            overflow: None,
        };
        assert_eq!(
            style.to_css(),
            "transform: translate3d(20px, 40px, 0px); display: block;"
        );
        assert!(Style::default().to_css().is_empty());
        assert!(!style.is_hidden());
    }

    #[test]
    fn test_tags() {
        assert_eq!(ElementKind::Surface.tag(), "svg");
        assert_eq!(ElementKind::Block.tag(), "g");
        assert_eq!(ElementKind::Container.tag(), "div");
    }
}
