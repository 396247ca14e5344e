// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-box pointer interaction state.

use crate::event::Buttons;

/// Transient pointer state owned by a single mouse-reactive box.
///
/// The state is updated only by that box's own event handling and is never
/// shared between boxes. The transition rules encode the routing contract:
///
/// - A press merges its buttons into [`PointerState::pressed`] before the
///   press callback runs.
/// - A release only pairs with an earlier press whose buttons overlap; this
///   guards against "click off, drag back on, release" firing a release the
///   box never saw a press for. Paired bits clear after the release callback.
/// - Leaving the hit area entirely voids the hover flag and all pressed
///   bits, so a later re-entry starts from a clean slate.
/// - Dragging is an explicit flag, toggled by press-side and release-side
///   behavior rather than by hit testing (see the crate docs).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerState {
    /// Whether the pointer is currently inside this box's hit area.
    pub hovered: bool,
    /// Buttons pressed while inside this box, as a mask.
    pub pressed: Buttons,
    /// Whether this box is currently being dragged.
    pub dragging: bool,
}

impl PointerState {
    /// Fresh state: not hovered, nothing pressed, not dragging.
    pub const fn new() -> Self {
        Self {
            hovered: false,
            pressed: Buttons::empty(),
            dragging: false,
        }
    }

    /// Merge newly pressed buttons into the pressed mask.
    pub fn note_press(&mut self, buttons: Buttons) {
        self.pressed |= buttons;
    }

    /// Returns whether a release with these buttons pairs with an earlier
    /// press on this box.
    pub fn release_pairs_with_press(&self, buttons: Buttons) -> bool {
        self.pressed.intersects(buttons)
    }

    /// Clear released buttons from the pressed mask.
    ///
    /// Called after the release callback so the callback still observes the
    /// in-flight pressed state.
    pub fn note_release(&mut self, buttons: Buttons) {
        self.pressed &= !buttons;
    }

    /// Record the pointer entering the hit area.
    pub fn enter(&mut self) {
        self.hovered = true;
    }

    /// Record the pointer leaving the hit area.
    ///
    /// Any partial press is voided: a subsequent release after re-entry must
    /// not fire.
    pub fn leave(&mut self) {
        self.hovered = false;
        self.pressed = Buttons::empty();
    }

    /// Mark this box as being dragged.
    pub fn start_drag(&mut self) {
        self.dragging = true;
    }

    /// Mark this box as no longer being dragged.
    pub fn stop_drag(&mut self) {
        self.dragging = false;
    }
}
