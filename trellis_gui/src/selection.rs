// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rubber-band selection: drawing surfaces and selectable boxes.

use std::rc::Rc;

use kurbo::Rect;

use trellis_box::{NodeId, rects_intersect};
use trellis_pointer::{ClickEvent, DragEvent, Modifiers};
use trellis_selection::{RubberBand, SelectionRect};

use crate::Gui;
use crate::error::GuiError;

/// Selection transition callback `(gui, selectable, rect)`.
///
/// The rect is the drawing that caused the transition, or `None` when the
/// selection was changed directly through [`Gui::select_node`] /
/// [`Gui::deselect_node`].
pub type SelectableCallback = Rc<dyn Fn(&mut Gui, NodeId, Option<&SelectionRect>)>;

/// Drawing-progress callback `(gui, surface, rect)`.
pub type SurfaceCallback = Rc<dyn Fn(&mut Gui, NodeId, &SelectionRect)>;

/// Options for [`Gui::make_selectable`].
#[derive(Clone)]
pub struct SelectableOptions {
    /// Called when an in-progress drawing starts covering this box.
    pub on_highlight: Option<SelectableCallback>,
    /// Called when an in-progress drawing stops covering this box.
    pub on_unhighlight: Option<SelectableCallback>,
    /// Called when a completed drawing selects this box.
    pub on_select: Option<SelectableCallback>,
    /// Called when this box is deselected.
    pub on_deselect: Option<SelectableCallback>,
    /// Modifiers that make a new drawing add to the current selection
    /// instead of replacing it. Any one of the bits suffices. Empty means a
    /// new drawing always deselects this box first.
    pub additive_modifiers: Modifiers,
}

impl Default for SelectableOptions {
    fn default() -> Self {
        Self {
            on_highlight: None,
            on_unhighlight: None,
            on_select: None,
            on_deselect: None,
            additive_modifiers: Modifiers::SHIFT,
        }
    }
}

impl core::fmt::Debug for SelectableOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SelectableOptions")
            .field("on_highlight", &self.on_highlight.is_some())
            .field("on_unhighlight", &self.on_unhighlight.is_some())
            .field("on_select", &self.on_select.is_some())
            .field("on_deselect", &self.on_deselect.is_some())
            .field("additive_modifiers", &self.additive_modifiers)
            .finish()
    }
}

/// Options for [`Gui::make_selection_surface`].
#[derive(Clone, Default)]
pub struct SurfaceOptions {
    /// Called when a drawing starts.
    pub on_start: Option<SurfaceCallback>,
    /// Called with each updated rect while a drawing is dragged out.
    pub on_change: Option<SurfaceCallback>,
    /// Called with the final rect when a drawing completes.
    pub on_complete: Option<SurfaceCallback>,
}

impl core::fmt::Debug for SurfaceOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurfaceOptions")
            .field("on_start", &self.on_start.is_some())
            .field("on_change", &self.on_change.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

pub(crate) struct SelectableNode {
    pub(crate) on_highlight: Option<SelectableCallback>,
    pub(crate) on_unhighlight: Option<SelectableCallback>,
    pub(crate) on_select: Option<SelectableCallback>,
    pub(crate) on_deselect: Option<SelectableCallback>,
    pub(crate) additive_modifiers: Modifiers,
}

pub(crate) struct SurfaceNode {
    pub(crate) band: RubberBand,
    /// Selectables cached when the drawing started. Selectables created
    /// mid-drawing are missed until the next drawing, which keeps every
    /// band update a plain scan of a fixed list.
    pub(crate) cache: Vec<NodeId>,
    pub(crate) on_start: Option<SurfaceCallback>,
    pub(crate) on_change: Option<SurfaceCallback>,
    pub(crate) on_complete: Option<SurfaceCallback>,
}

impl Gui {
    /// Make a node selectable by rubber-band drawings.
    ///
    /// Selectables are passive: they never consume pointer events, they are
    /// covered (or not) by rects drawn on a selection surface.
    pub fn make_selectable(&mut self, id: NodeId, options: SelectableOptions) -> Result<(), GuiError> {
        if !self.tree.is_alive(id) {
            return Err(GuiError::DeadNode(id));
        }
        self.selectables.insert(
            id,
            SelectableNode {
                on_highlight: options.on_highlight,
                on_unhighlight: options.on_unhighlight,
                on_select: options.on_select,
                on_deselect: options.on_deselect,
                additive_modifiers: options.additive_modifiers,
            },
        );
        Ok(())
    }

    /// Make a node a selection drawing surface.
    ///
    /// Pressing inside the surface starts a rectangle; dragging grows it and
    /// highlights the selectables it covers; releasing selects them. One
    /// rectangle is tracked per pressed button combination. Drawn rects are
    /// direction-agnostic and clamp to a 1x1 minimum, so a plain click still
    /// selects whatever it lands on.
    pub fn make_selection_surface(
        &mut self,
        id: NodeId,
        options: SurfaceOptions,
    ) -> Result<(), GuiError> {
        if !self.tree.is_alive(id) {
            return Err(GuiError::DeadNode(id));
        }
        self.surfaces.insert(
            id,
            SurfaceNode {
                band: RubberBand::new(),
                cache: Vec::new(),
                on_start: options.on_start,
                on_change: options.on_change,
                on_complete: options.on_complete,
            },
        );
        self.ensure_pointer(id);
        self.register(id);
        Ok(())
    }

    /// Select a node directly. Returns whether that was a transition; the
    /// select callback fires with no drawing rect.
    pub fn select_node(&mut self, id: NodeId) -> bool {
        if !self.selectables.contains_key(&id) || !self.selection.select(id) {
            return false;
        }
        let cb = self.selectables.get(&id).and_then(|s| s.on_select.clone());
        if let Some(cb) = cb {
            cb(self, id, None);
        }
        true
    }

    /// Deselect a node directly. Returns whether that was a transition.
    pub fn deselect_node(&mut self, id: NodeId) -> bool {
        if !self.selection.deselect(id) {
            return false;
        }
        let cb = self.selectables.get(&id).and_then(|s| s.on_deselect.clone());
        if let Some(cb) = cb {
            cb(self, id, None);
        }
        true
    }

    /// Returns whether an in-progress drawing currently covers the node.
    pub fn is_highlighted(&self, id: NodeId) -> bool {
        self.selection.is_highlighted(id)
    }

    /// Begin a drawing on a surface (built-in press behavior).
    pub(crate) fn begin_drawing(&mut self, id: NodeId, event: &ClickEvent) {
        let Some(local) = self.tree.point_to_local(id, event.point) else {
            return;
        };
        // Key the rect by everything held right now, so interleaved
        // multi-button drawings complete independently.
        let held = self
            .pointer
            .get(&id)
            .map(|p| p.state.pressed)
            .unwrap_or(event.buttons);
        let rect = {
            let Some(surface) = self.surfaces.get_mut(&id) else {
                return;
            };
            surface.band.begin(held, event.modifiers, local)
        };
        log::debug!("drawing started on {id:?} at {local:?}");

        let cache: Vec<NodeId> = self
            .selectables
            .keys()
            .copied()
            .filter(|s| self.tree.is_alive(*s))
            .collect();
        if let Some(surface) = self.surfaces.get_mut(&id) {
            surface.cache = cache.clone();
        }
        if let Some(p) = self.pointer.get_mut(&id) {
            p.state.start_drag();
        }

        // A fresh drawing replaces the previous selection, unless the
        // selectable's additive modifier is held.
        for member in cache {
            if !self.selection.is_selected(member) {
                continue;
            }
            let additive = self
                .selectables
                .get(&member)
                .map(|s| s.additive_modifiers)
                .unwrap_or_default();
            if event.modifiers.intersects(additive) {
                continue;
            }
            self.selection.deselect(member);
            let cb = self.selectables.get(&member).and_then(|s| s.on_deselect.clone());
            if let Some(cb) = cb {
                cb(self, member, Some(&rect));
            }
        }

        let cb = self.surfaces.get(&id).and_then(|s| s.on_start.clone());
        if let Some(cb) = cb {
            cb(self, id, &rect);
        }
    }

    /// Grow the in-progress drawings on a surface (built-in drag behavior).
    pub(crate) fn update_drawing(&mut self, id: NodeId, event: &DragEvent) {
        let Some(local) = self.tree.point_to_local(id, event.point) else {
            return;
        };
        let changed: Vec<SelectionRect> = match self.surfaces.get_mut(&id) {
            Some(surface) => surface.band.update(event.buttons, local),
            None => return,
        };
        let cache = self
            .surfaces
            .get(&id)
            .map(|s| s.cache.clone())
            .unwrap_or_default();
        let on_change = self.surfaces.get(&id).and_then(|s| s.on_change.clone());
        for rect in changed {
            self.apply_highlight_pass(id, &cache, &rect);
            if let Some(cb) = &on_change {
                cb(self, id, &rect);
            }
        }
    }

    /// Complete the matching drawing on a surface (built-in release
    /// behavior).
    pub(crate) fn finish_drawing(&mut self, id: NodeId, event: &ClickEvent) {
        let Some(local) = self.tree.point_to_local(id, event.point) else {
            return;
        };
        let completed = match self.surfaces.get_mut(&id) {
            Some(surface) => surface.band.complete(event.buttons, local),
            None => None,
        };
        if let Some(rect) = completed {
            log::debug!("drawing completed on {id:?}: {:?}", rect.rect());
            let cache = self
                .surfaces
                .get(&id)
                .map(|s| s.cache.clone())
                .unwrap_or_default();
            let world = self.drawing_world_rect(id, &rect);
            for member in cache {
                let hit = match (world, self.tree.world_rect(member)) {
                    (Some(w), Some(m)) => rects_intersect(m, w),
                    _ => false,
                };
                // Highlights end with the drawing; the callback only fires
                // for boxes the final rect left out, covered ones transition
                // straight to selected.
                if self.selection.unhighlight(member) && !hit {
                    let cb = self
                        .selectables
                        .get(&member)
                        .and_then(|s| s.on_unhighlight.clone());
                    if let Some(cb) = cb {
                        cb(self, member, Some(&rect));
                    }
                }
                if hit && self.selection.select(member) {
                    let cb = self.selectables.get(&member).and_then(|s| s.on_select.clone());
                    if let Some(cb) = cb {
                        cb(self, member, Some(&rect));
                    }
                }
            }
            let cb = self.surfaces.get(&id).and_then(|s| s.on_complete.clone());
            if let Some(cb) = cb {
                cb(self, id, &rect);
            }
        }
        // The gesture ends once every button that fed the band is up.
        let remaining = self
            .pointer
            .get(&id)
            .map(|p| p.state.pressed & !event.buttons)
            .unwrap_or_default();
        if remaining.is_empty()
            && let Some(p) = self.pointer.get_mut(&id)
        {
            p.state.stop_drag();
        }
    }

    /// One highlight sweep of the cached selectables against a drawing rect.
    fn apply_highlight_pass(&mut self, surface: NodeId, cache: &[NodeId], rect: &SelectionRect) {
        let Some(world) = self.drawing_world_rect(surface, rect) else {
            return;
        };
        for &member in cache {
            let Some(member_rect) = self.tree.world_rect(member) else {
                continue;
            };
            // Already-selected boxes keep their state; highlighting is only
            // for pending additions.
            if self.selection.is_selected(member) {
                continue;
            }
            if rects_intersect(member_rect, world) {
                if self.selection.highlight(member) {
                    let cb = self
                        .selectables
                        .get(&member)
                        .and_then(|s| s.on_highlight.clone());
                    if let Some(cb) = cb {
                        cb(self, member, Some(rect));
                    }
                }
            } else if self.selection.unhighlight(member) {
                let cb = self
                    .selectables
                    .get(&member)
                    .and_then(|s| s.on_unhighlight.clone());
                if let Some(cb) = cb {
                    cb(self, member, Some(rect));
                }
            }
        }
    }

    /// A drawing rect translated from surface-local into world space.
    fn drawing_world_rect(&self, surface: NodeId, rect: &SelectionRect) -> Option<Rect> {
        let origin = self.tree.world_origin(surface)?;
        Some(rect.rect() + origin.to_vec2())
    }
}
