// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Box: a sized box tree with dynamic-size propagation.
//!
//! This crate is the geometry core of the Trellis widget layer. It owns:
//!
//! - [`BoxDefinition`]: an immutable value describing a box's size and
//!   background. Dimensions are nullable; a `None` dimension is *dynamic* and
//!   resolves at runtime via [`DynamicSizeBehaviour`] (fit the bounding box of
//!   descendants, or match the parent's size).
//! - [`BoxTree`]: an arena of boxes with generational [`NodeId`]s. Children
//!   are ordered by z-index (ties broken by insertion order). Sizes are
//!   recomputed *synchronously* whenever children, parent size, or a
//!   definition change; there is never an observable stale size.
//! - Anchor alignment: the nine [`PositionalAnchor`] points of a rectangle
//!   plus [`Spacing`] rules, used to position boxes relative to each other.
//!
//! ## Size propagation
//!
//! A box whose definition leaves a dimension dynamic resolves it on
//! [`BoxTree::update_rect`]:
//!
//! - [`DynamicSizeBehaviour::FitChildren`]: the bounding box of all
//!   descendants, excluding the box itself. A descendant that itself
//!   *matches its parent* contributes zero size in the dimension(s) it
//!   matches. This exclusion is load-bearing: it is what makes the
//!   child-grows → parent-refits → sibling-rematches ripple terminate
//!   instead of inflating forever.
//! - [`DynamicSizeBehaviour::MatchParent`]: the parent's current size, or
//!   zero for a detached box.
//!
//! When a resolved size differs from the cached one, the change is propagated
//! to the parent (which refits if it is dynamically sized) and to every child
//! (match-parent children re-resolve against the new size).
//!
//! ## Coordinates
//!
//! A box's position is expressed in its parent's coordinate space; the box's
//! own rect always has its origin at `(0, 0)`. World transforms are pure
//! translations, composed by summing positions along the ancestor chain.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod align;
mod color;
mod definition;
mod tree;
mod util;

pub use align::{
    CENTER_BOTTOM, CENTER_CENTER, CENTER_TOP, HorizontalAlignment, LEFT_BOTTOM, LEFT_CENTER,
    LEFT_TOP, PositionalAnchor, RIGHT_BOTTOM, RIGHT_CENTER, RIGHT_TOP, Spacing, VerticalAlignment,
};
pub use color::Color;
pub use definition::{BoxDefinition, DefinitionError, DynamicSizeBehaviour};
pub use tree::{BoxTree, NodeId, ZIndex};
pub use util::{rect_contains, rects_intersect};
