// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchor points and spacing rules for positioning boxes relative to each
//! other.

use kurbo::{Point, Size, Vec2};

/// Horizontal component of an anchor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    /// The left edge.
    Left,
    /// The horizontal center.
    Center,
    /// The right edge.
    Right,
}

/// Vertical component of an anchor.
///
/// The vertical axis points up, as in the underlying scene graph: `Bottom` is
/// `y = 0` and `Top` is `y = height`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    /// The bottom edge.
    Bottom,
    /// The vertical center.
    Center,
    /// The top edge.
    Top,
}

/// One of the nine anchor points of a rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PositionalAnchor {
    /// Horizontal component.
    pub horizontal: HorizontalAlignment,
    /// Vertical component.
    pub vertical: VerticalAlignment,
}

impl PositionalAnchor {
    /// The local coordinate of this anchor within a rect of the given size.
    pub fn coord_in(self, size: Size) -> Point {
        let x = match self.horizontal {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => size.width / 2.0,
            HorizontalAlignment::Right => size.width,
        };
        let y = match self.vertical {
            VerticalAlignment::Bottom => 0.0,
            VerticalAlignment::Center => size.height / 2.0,
            VerticalAlignment::Top => size.height,
        };
        Point::new(x, y)
    }
}

/// Left-top anchor.
pub const LEFT_TOP: PositionalAnchor = PositionalAnchor {
    horizontal: HorizontalAlignment::Left,
    vertical: VerticalAlignment::Top,
};
/// Left-center anchor.
pub const LEFT_CENTER: PositionalAnchor = PositionalAnchor {
    horizontal: HorizontalAlignment::Left,
    vertical: VerticalAlignment::Center,
};
/// Left-bottom anchor.
pub const LEFT_BOTTOM: PositionalAnchor = PositionalAnchor {
    horizontal: HorizontalAlignment::Left,
    vertical: VerticalAlignment::Bottom,
};
/// Center-top anchor.
pub const CENTER_TOP: PositionalAnchor = PositionalAnchor {
    horizontal: HorizontalAlignment::Center,
    vertical: VerticalAlignment::Top,
};
/// Center anchor.
pub const CENTER_CENTER: PositionalAnchor = PositionalAnchor {
    horizontal: HorizontalAlignment::Center,
    vertical: VerticalAlignment::Center,
};
/// Center-bottom anchor.
pub const CENTER_BOTTOM: PositionalAnchor = PositionalAnchor {
    horizontal: HorizontalAlignment::Center,
    vertical: VerticalAlignment::Bottom,
};
/// Right-top anchor.
pub const RIGHT_TOP: PositionalAnchor = PositionalAnchor {
    horizontal: HorizontalAlignment::Right,
    vertical: VerticalAlignment::Top,
};
/// Right-center anchor.
pub const RIGHT_CENTER: PositionalAnchor = PositionalAnchor {
    horizontal: HorizontalAlignment::Right,
    vertical: VerticalAlignment::Center,
};
/// Right-bottom anchor.
pub const RIGHT_BOTTOM: PositionalAnchor = PositionalAnchor {
    horizontal: HorizontalAlignment::Right,
    vertical: VerticalAlignment::Bottom,
};

/// Spacing applied after anchor alignment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Spacing {
    /// No spacing.
    None,
    /// A signed distance pushed inward from the aligned anchor: positive
    /// values move away from left/bottom edges and toward right/top edges.
    /// A centered axis ignores uniform spacing entirely.
    Uniform(f64),
    /// An exact offset vector, applied verbatim. This overrides the
    /// signed-direction interpretation of [`Spacing::Uniform`].
    Exact(Vec2),
}

impl Spacing {
    /// The offset this spacing contributes for the given aligned anchor.
    pub fn offset(self, anchor: PositionalAnchor) -> Vec2 {
        match self {
            Self::None => Vec2::ZERO,
            Self::Uniform(s) => {
                let x = match anchor.horizontal {
                    HorizontalAlignment::Left => s,
                    HorizontalAlignment::Center => 0.0,
                    HorizontalAlignment::Right => -s,
                };
                let y = match anchor.vertical {
                    VerticalAlignment::Bottom => s,
                    VerticalAlignment::Center => 0.0,
                    VerticalAlignment::Top => -s,
                };
                Vec2::new(x, y)
            }
            Self::Exact(v) => v,
        }
    }
}
