//! Transform codec for the drag surface
//!
//! The drag surface only ever needs translation and uniform scale, so the
//! transforms it writes are plain strings in two dialects:
//!
//! - SVG `transform` attributes on the drag group: `translate(X,Y) scale(S)`
//! - CSS `transform` values on the surface root: `translate3d(Xpx, Ypx, 0px)`
//!
//! The current translation is never cached next to these strings. It is read
//! back out of them, so what is rendered is the only source of truth.

use glam::Vec2;
use regex::Regex;
use std::sync::LazyLock;

static ATTRIBUTE_TRANSLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"translate\(\s*([-+\d.e]+)([ ,]\s*([-+\d.e]+)\s*\))?").expect("valid regex")
});

static STYLE_TRANSLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"translate(?:3d)?\(\s*([-+\d.e]+)\s*px([ ,]\s*([-+\d.e]+)\s*px)?")
        .expect("valid regex")
});

/// Rounds to the nearest whole unit, half away from zero.
///
/// Negative zero is folded into positive zero so `-0` never reaches a
/// transform string.
pub fn round_to_whole(value: f32) -> f32 {
    value.round() + 0.0
}

/// Snaps both axes of `point` to whole units when `round` is set.
pub fn snap(point: Vec2, round: bool) -> Vec2 {
    if round {
        Vec2::new(round_to_whole(point.x), round_to_whole(point.y))
    } else {
        point
    }
}

/// Translation plus uniform scale applied to the drag group.
///
/// Keeps the group's contents lined up with the host canvas while it pans
/// and zooms, independently of the surface following the pointer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GroupTransform {
    /// Translation in surface units
    pub offset: Vec2,
    /// Zoom factor of the host canvas
    pub scale: f32,
}

impl GroupTransform {
    pub fn new(offset: Vec2, scale: f32) -> Self {
        Self { offset, scale }
    }

    /// Renders the SVG attribute form, `translate(X,Y) scale(S)`.
    ///
    /// Only the translation is snapped; the scale is written as given.
    pub fn to_attribute(&self, round: bool) -> String {
        let offset = snap(self.offset, round);
        format!(
            "translate({},{}) scale({})",
            format_number(offset.x),
            format_number(offset.y),
            format_number(self.scale)
        )
    }
}

/// Renders a plain SVG translation attribute, `translate(X,Y)`.
pub fn translate_attribute(offset: Vec2) -> String {
    format!(
        "translate({},{})",
        format_number(offset.x),
        format_number(offset.y)
    )
}

/// Renders the CSS transform value used to move the surface root.
///
/// `offset` is written verbatim; callers scale and snap it first.
pub fn surface_transform(offset: Vec2) -> String {
    format!(
        "translate3d({}px, {}px, 0px)",
        format_number(offset.x),
        format_number(offset.y)
    )
}

/// Parses the translation out of an SVG `transform` attribute.
///
/// Accepts `translate(x)`, `translate(x,y)` and `translate(x y)`, ignoring
/// anything that follows (such as a `scale(..)`). A missing y reads as 0.
pub fn parse_translate_attribute(value: &str) -> Option<Vec2> {
    parse_with(&ATTRIBUTE_TRANSLATE, value)
}

/// Parses the translation out of a CSS `transform` value.
///
/// Accepts both `translate(..)` and `translate3d(..)` with `px` units; the z
/// component of `translate3d` is ignored.
pub fn parse_translate_style(value: &str) -> Option<Vec2> {
    parse_with(&STYLE_TRANSLATE, value)
}

fn parse_with(pattern: &Regex, value: &str) -> Option<Vec2> {
    let captures = pattern.captures(value)?;
    let x = captures.get(1)?.as_str().parse::<f32>().ok()?;
    let y = match captures.get(3) {
        Some(y) => y.as_str().parse::<f32>().ok()?,
        None => 0.0,
    };
    Some(Vec2::new(x, y))
}

fn format_number(value: f32) -> String {
    format!("{}", value + 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_whole() {
        assert_eq!(round_to_whole(2.4), 2.0);
        assert_eq!(round_to_whole(2.5), 3.0);
        assert_eq!(round_to_whole(-2.5), -3.0);
        assert_eq!(round_to_whole(-0.3).to_bits(), 0.0f32.to_bits());
    }

    #[test]
    fn test_snap_can_be_disabled() {
        let point = Vec2::new(1.25, -7.75);
        assert_eq!(snap(point, true), Vec2::new(1.0, -8.0));
        assert_eq!(snap(point, false), point);
    }

    #[test]
    fn test_group_attribute() {
        let transform = GroupTransform::new(Vec2::new(5.4, 4.6), 1.5);
        assert_eq!(transform.to_attribute(true), "translate(5,5) scale(1.5)");
        assert_eq!(
            transform.to_attribute(false),
            "translate(5.4,4.6) scale(1.5)"
        );
    }

    #[test]
    fn test_surface_transform() {
        assert_eq!(
            surface_transform(Vec2::new(20.0, -40.0)),
            "translate3d(20px, -40px, 0px)"
        );
    }

    #[test]
    fn test_translate_attribute() {
        let attribute = translate_attribute(Vec2::new(12.5, -3.0));
        assert_eq!(attribute, "translate(12.5,-3)");
        assert_eq!(
            parse_translate_attribute(&attribute),
            Some(Vec2::new(12.5, -3.0))
        );
    }

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_translate_attribute("translate(5,5) scale(1.5)"),
            Some(Vec2::new(5.0, 5.0))
        );
        assert_eq!(
            parse_translate_attribute("translate( -3.5 12 )"),
            Some(Vec2::new(-3.5, 12.0))
        );
        assert_eq!(
            parse_translate_attribute("translate(7)"),
            Some(Vec2::new(7.0, 0.0))
        );
        assert_eq!(parse_translate_attribute("scale(2)"), None);
        assert_eq!(parse_translate_attribute("translate(e,1)"), None);
    }

    #[test]
    fn test_parse_style() {
        assert_eq!(
            parse_translate_style("translate3d(20px, 40px, 0px)"),
            Some(Vec2::new(20.0, 40.0))
        );
        assert_eq!(
            parse_translate_style("translate(-8px)"),
            Some(Vec2::new(-8.0, 0.0))
        );
        assert_eq!(parse_translate_style("translate3d(20, 40, 0)"), None);
    }

    #[test]
    fn test_surface_transform_parses_back() {
        let offset = Vec2::new(-13.0, 250.0);
        assert_eq!(
            parse_translate_style(&surface_transform(offset)),
            Some(offset)
        );
    }
}
