// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Selection: rubber-band rectangles and selectable state.
//!
//! Two pieces, both plain state with no tree knowledge:
//!
//! - [`RubberBand`]: rectangles being dragged out by the pointer. One
//!   rectangle is tracked per pressed button combination, so e.g. a left
//!   drag and a right drag can be in flight at once. Drawn rects are
//!   direction-agnostic and clamp to a 1×1 minimum, which keeps a
//!   zero-motion click useful: it still yields a rect that can intersect
//!   things.
//! - [`SelectionSet`]: the highlighted/selected membership of selectable
//!   boxes, with edge-triggered transitions (a highlight that is already set
//!   reports no change, so hosts fire callbacks exactly once per edge).
//!
//! The host feeds [`RubberBand`] from press/drag/release events on a drawing
//! box, intersects the resulting rect with its cached set of selectable
//! boxes, and applies the outcome to a [`SelectionSet`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use kurbo::{Point, Rect, Vec2};
use trellis_pointer::{Buttons, Modifiers};

/// A rectangle being (or just finished being) drawn with the pointer.
///
/// Coordinates are in the space of the drawing surface. Start and end may be
/// in any relative orientation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SelectionRect {
    /// Buttons held when the drawing started.
    pub buttons: Buttons,
    /// Modifiers held when the drawing started.
    pub modifiers: Modifiers,
    /// Where the drawing started.
    pub start: Point,
    /// Where the pointer currently is (or was released).
    pub end: Point,
}

impl SelectionRect {
    /// Vector from start to end.
    pub fn vector(&self) -> Vec2 {
        self.end - self.start
    }

    /// The drawn rect, normalized to any drawing direction and clamped to a
    /// 1×1 minimum.
    pub fn rect(&self) -> Rect {
        let x0 = self.start.x.min(self.end.x);
        let y0 = self.start.y.min(self.end.y);
        let width = (self.end.x - self.start.x).abs().max(1.0);
        let height = (self.end.y - self.start.y).abs().max(1.0);
        Rect::new(x0, y0, x0 + width, y0 + height)
    }
}

/// In-progress selection rectangles, one per button combination.
#[derive(Clone, Debug, Default)]
pub struct RubberBand {
    in_progress: HashMap<u32, SelectionRect>,
}

impl RubberBand {
    /// No drawings in progress.
    pub fn new() -> Self {
        Self {
            in_progress: HashMap::new(),
        }
    }

    /// Start drawing a rect with the given button combination.
    ///
    /// A drawing already in progress for the same combination is restarted.
    pub fn begin(&mut self, buttons: Buttons, modifiers: Modifiers, point: Point) -> SelectionRect {
        let rect = SelectionRect {
            buttons,
            modifiers,
            start: point,
            end: point,
        };
        self.in_progress.insert(buttons.bits(), rect);
        rect
    }

    /// Extend every drawing whose buttons intersect the currently held ones.
    ///
    /// Returns the updated rects for change notifications.
    pub fn update(&mut self, held: Buttons, point: Point) -> Vec<SelectionRect> {
        let mut changed = Vec::new();
        for rect in self.in_progress.values_mut() {
            if rect.buttons.intersects(held) {
                rect.end = point;
                changed.push(*rect);
            }
        }
        changed
    }

    /// Finish the drawing whose buttons intersect the released ones.
    ///
    /// Returns the completed rect, or `None` when no drawing matches (a
    /// release without a paired press is ignored by policy).
    pub fn complete(&mut self, released: Buttons, point: Point) -> Option<SelectionRect> {
        let key = self
            .in_progress
            .keys()
            .copied()
            .find(|bits| Buttons::from_bits_truncate(*bits).intersects(released))?;
        let mut rect = self.in_progress.remove(&key)?;
        rect.end = point;
        Some(rect)
    }

    /// Returns whether any drawing is in progress.
    pub fn active(&self) -> bool {
        !self.in_progress.is_empty()
    }

    /// Abandon all drawings.
    pub fn clear(&mut self) {
        self.in_progress.clear();
    }
}

/// Edge-triggered highlighted/selected membership.
#[derive(Clone, Debug, Default)]
pub struct SelectionSet<K> {
    highlighted: HashSet<K>,
    selected: HashSet<K>,
}

impl<K: Copy + Eq + Hash> SelectionSet<K> {
    /// An empty set.
    pub fn new() -> Self {
        Self {
            highlighted: HashSet::new(),
            selected: HashSet::new(),
        }
    }

    /// Mark a member highlighted; returns whether that is a change.
    pub fn highlight(&mut self, member: K) -> bool {
        self.highlighted.insert(member)
    }

    /// Clear a member's highlight; returns whether that is a change.
    pub fn unhighlight(&mut self, member: K) -> bool {
        self.highlighted.remove(&member)
    }

    /// Mark a member selected; returns whether that is a change.
    pub fn select(&mut self, member: K) -> bool {
        self.selected.insert(member)
    }

    /// Clear a member's selection; returns whether that is a change.
    pub fn deselect(&mut self, member: K) -> bool {
        self.selected.remove(&member)
    }

    /// Returns whether a member is highlighted.
    pub fn is_highlighted(&self, member: K) -> bool {
        self.highlighted.contains(&member)
    }

    /// Returns whether a member is selected.
    pub fn is_selected(&self, member: K) -> bool {
        self.selected.contains(&member)
    }

    /// Drop all selections, returning the members that were deselected.
    pub fn clear_selection(&mut self) -> Vec<K> {
        self.selected.drain().collect()
    }

    /// Drop all highlights, returning the members that were unhighlighted.
    pub fn clear_highlights(&mut self) -> Vec<K> {
        self.highlighted.drain().collect()
    }

    /// Forget a member entirely (destroyed boxes must not linger).
    pub fn forget(&mut self, member: K) {
        self.highlighted.remove(&member);
        self.selected.remove(&member);
    }

    /// The selected members, in unspecified order.
    pub fn selected(&self) -> impl Iterator<Item = K> {
        self.selected.iter().copied()
    }
}
