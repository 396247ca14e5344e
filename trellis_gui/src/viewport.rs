// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport gating: keeping clipped-out descendants from reacting.

use std::rc::Rc;

use trellis_box::{NodeId, rects_intersect};

use crate::error::GuiError;
use crate::{Gui, GuiCoordCheck};

impl Gui {
    /// Gate the pointer reactivity of a viewport's descendants to its
    /// visible area.
    ///
    /// The renderer clips a viewport's children to its rect; without a
    /// matching hit-test restriction the user could press an invisible
    /// button that happens to be scrolled out of view. This installs an
    /// extra coordinate check on every pointer-reactive descendant so
    /// events only land while the pointer is inside the viewport's current
    /// world rect (the rect is read at event time, so moving or resizing
    /// the viewport needs no re-install).
    ///
    /// Descendants that become pointer-reactive later are not covered;
    /// call this again after adding them.
    pub fn install_viewport(&mut self, viewport: NodeId) -> Result<(), GuiError> {
        if !self.tree.is_alive(viewport) {
            return Err(GuiError::DeadNode(viewport));
        }
        let check: GuiCoordCheck =
            Rc::new(move |gui, _, point| gui.tree().contains_world_point(viewport, point));
        for member in self.tree.descendants(viewport) {
            if self.pointer.contains_key(&member) {
                self.set_coord_check(member, Some(Rc::clone(&check)));
            }
        }
        Ok(())
    }

    /// Returns whether any part of a box is visible within a viewport's
    /// area.
    ///
    /// The box must be a descendant of the viewport for the renderer to
    /// actually clip it; this is a plain world-rect intersection either way.
    pub fn box_visible_in_viewport(&self, viewport: NodeId, id: NodeId) -> bool {
        match (self.tree.world_rect(viewport), self.tree.world_rect(id)) {
            (Some(v), Some(b)) => rects_intersect(v, b),
            _ => false,
        }
    }
}
