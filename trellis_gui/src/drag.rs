// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag capability: wiring the drag/snap state machine to the tree.

use kurbo::Vec2;

use trellis_box::{CENTER_CENTER, NodeId};
use trellis_drag::{
    DragController, DragTarget, SnapCandidate, SnapEvent, validate_snap_config,
};
use trellis_pointer::DragEvent;

use crate::Gui;
use crate::error::GuiError;

/// Options for [`Gui::make_draggable`].
#[derive(Clone, Debug, Default)]
pub struct DragOptions {
    /// Which box the gesture moves.
    pub target: DragTarget,
    /// Snap targets, in preference order. Empty means free dragging.
    pub snap_boxes: Vec<NodeId>,
    /// Spring back to the current snap target when the drag ends off-target.
    /// Requires at least one snap box.
    pub snap_on_release: bool,
    /// Optional boundary: the drag target is clamped (in world space) to
    /// stay inside this box's rect. The boundary box does not have to be an
    /// ancestor.
    pub bounding_box: Option<NodeId>,
}

pub(crate) struct DragNode {
    pub(crate) controller: DragController<NodeId>,
    pub(crate) target: DragTarget,
    pub(crate) snap_boxes: Vec<NodeId>,
    pub(crate) bounding_box: Option<NodeId>,
}

impl Gui {
    /// Make a node draggable.
    ///
    /// The node becomes pointer-reactive: pressing it starts a drag,
    /// releasing stops it, and drag events move the configured target
    /// (optionally snapping). User pointer callbacks on the same node still
    /// fire — after the built-in behavior, as the gesture's observers.
    pub fn make_draggable(&mut self, id: NodeId, options: DragOptions) -> Result<(), GuiError> {
        if !self.tree.is_alive(id) {
            return Err(GuiError::DeadNode(id));
        }
        validate_snap_config(options.snap_on_release, options.snap_boxes.len())?;
        for snap in &options.snap_boxes {
            if !self.snaps.contains_key(snap) {
                return Err(GuiError::NotASnapTarget(*snap));
            }
        }
        let controller = if options.snap_boxes.is_empty() {
            DragController::free()
        } else {
            DragController::snapping(options.snap_on_release)
        };
        self.drags.insert(
            id,
            DragNode {
                controller,
                target: options.target,
                snap_boxes: options.snap_boxes,
                bounding_box: options.bounding_box,
            },
        );
        self.ensure_pointer(id);
        self.register(id);
        Ok(())
    }

    /// The box a drag gesture on `id` moves, if it exists.
    pub(crate) fn drag_target_of(&self, id: NodeId) -> Option<NodeId> {
        match self.drags.get(&id)?.target {
            DragTarget::SelfBox => Some(id),
            DragTarget::Parent => self.tree.parent_of(id),
        }
    }

    /// The snap target a draggable currently occupies.
    pub fn snapped_to(&self, id: NodeId) -> Option<NodeId> {
        self.drags.get(&id)?.controller.snapped()
    }

    /// Returns whether a node is mid-drag.
    pub fn is_dragging(&self, id: NodeId) -> bool {
        self.pointer.get(&id).is_some_and(|p| p.state.dragging)
    }

    /// Snap a draggable to a target directly (initial placement).
    ///
    /// Aligns centers by moving the drag target and runs the occupancy
    /// transition. Re-snapping the current target only re-aligns.
    pub fn snap_to(&mut self, id: NodeId, snap: NodeId) -> Result<(), GuiError> {
        if !self.drags.contains_key(&id) {
            return Err(GuiError::DeadNode(id));
        }
        if !self.snaps.contains_key(&snap) {
            return Err(GuiError::NotASnapTarget(snap));
        }
        let alignment = self
            .tree
            .vector_between_anchors(id, CENTER_CENTER, snap, CENTER_CENTER)
            .ok_or(GuiError::DeadNode(snap))?;
        let events = self
            .drags
            .get_mut(&id)
            .expect("checked above")
            .controller
            .snap_to(snap, alignment);
        self.apply_snap_events(id, &events);
        self.move_drag_target(id, alignment);
        Ok(())
    }

    /// Detach a draggable from its snap target, if it has one and is not a
    /// spring-back box. The box does not move.
    pub fn unsnap_if_snapped(&mut self, id: NodeId) {
        let released = self
            .drags
            .get_mut(&id)
            .and_then(|d| d.controller.unsnap());
        if let Some(snap) = released {
            self.apply_snap_events(id, &[SnapEvent::Released(snap)]);
        }
    }

    pub(crate) fn begin_drag(&mut self, id: NodeId) {
        log::debug!("drag start on {id:?}");
        if let Some(d) = self.drags.get_mut(&id) {
            d.controller.start();
        }
        if let Some(p) = self.pointer.get_mut(&id) {
            p.state.start_drag();
        }
    }

    /// One drag event on a draggable node: move, then test snaps.
    pub(crate) fn handle_drag_move(&mut self, id: NodeId, event: &DragEvent) {
        let Some(dragged_rect) = self.tree.world_rect(id) else {
            return;
        };
        let snap_boxes = match self.drags.get(&id) {
            Some(d) => d.snap_boxes.clone(),
            None => return,
        };
        let candidates: Vec<SnapCandidate<NodeId>> = snap_boxes
            .iter()
            .filter_map(|&snap| {
                let rect = self.tree.world_rect(snap)?;
                Some(SnapCandidate {
                    id: snap,
                    rect,
                    can_receive: self.snap_can_receive(snap, id),
                })
            })
            .collect();
        let mv = self
            .drags
            .get_mut(&id)
            .expect("drag node checked above")
            .controller
            .drag(event.delta, dragged_rect, &candidates);
        self.apply_snap_events(id, &mv.events);
        self.move_drag_target(id, mv.displacement);
    }

    pub(crate) fn end_drag(&mut self, id: NodeId) {
        log::debug!("drag stop on {id:?}");
        let spring_back = self.drags.get_mut(&id).and_then(|d| d.controller.stop());
        if let Some(snap) = spring_back {
            // Spring back: re-align with the reserved target.
            if let Some(alignment) =
                self.tree
                    .vector_between_anchors(id, CENTER_CENTER, snap, CENTER_CENTER)
            {
                if let Some(d) = self.drags.get_mut(&id) {
                    let _ = d.controller.snap_to(snap, alignment);
                }
                self.move_drag_target(id, alignment);
            }
        }
        if let Some(p) = self.pointer.get_mut(&id) {
            p.state.stop_drag();
        }
    }

    /// Whether a snap target accepts this draggable: the custom hook when
    /// present, the unoccupied rule otherwise.
    fn snap_can_receive(&self, snap: NodeId, dragger: NodeId) -> bool {
        match self.snaps.get(&snap).and_then(|s| s.can_receive.clone()) {
            Some(hook) => hook(self, snap, dragger),
            None => self.occupancy.can_receive(snap),
        }
    }

    fn apply_snap_events(&mut self, dragger: NodeId, events: &[SnapEvent<NodeId>]) {
        for event in events {
            match *event {
                SnapEvent::Released(snap) => {
                    log::debug!("{dragger:?} released snap target {snap:?}");
                    self.occupancy.release(snap);
                    let cb = self.snaps.get(&snap).and_then(|s| s.on_release.clone());
                    if let Some(cb) = cb {
                        cb(self, snap, dragger);
                    }
                }
                SnapEvent::Received(snap) => {
                    log::debug!("{dragger:?} snapped to target {snap:?}");
                    self.occupancy.receive(snap, dragger);
                    let cb = self.snaps.get(&snap).and_then(|s| s.on_receive.clone());
                    if let Some(cb) = cb {
                        cb(self, snap, dragger);
                    }
                }
            }
        }
    }

    /// Move the drag target, clamping to the bounding box when configured.
    fn move_drag_target(&mut self, id: NodeId, displacement: Vec2) {
        let Some(target) = self.drag_target_of(id) else {
            return;
        };
        let Some(position) = self.tree.position(target) else {
            return;
        };
        let mut proposed = position + displacement;
        let bounding = self.drags.get(&id).and_then(|d| d.bounding_box);
        if let Some(boundary) = bounding
            && let Some(boundary_rect) = self.tree.world_rect(boundary)
            && let Some(size) = self.tree.size(target)
        {
            // Compare in world space, where the target would land: that is
            // the one coordinate system shared with an arbitrary boundary.
            let parent_origin = self
                .tree
                .parent_of(target)
                .and_then(|p| self.tree.world_origin(p))
                .unwrap_or(kurbo::Point::ZERO);
            let world = parent_origin + proposed.to_vec2();
            let left_overshoot = world.x - boundary_rect.x0;
            if left_overshoot < 0.0 {
                proposed.x -= left_overshoot;
            } else {
                let right_overshoot = world.x + size.width - boundary_rect.x1;
                if right_overshoot > 0.0 {
                    proposed.x -= right_overshoot;
                }
            }
            let bottom_overshoot = world.y - boundary_rect.y0;
            if bottom_overshoot < 0.0 {
                proposed.y -= bottom_overshoot;
            } else {
                let top_overshoot = world.y + size.height - boundary_rect.y1;
                if top_overshoot > 0.0 {
                    proposed.y -= top_overshoot;
                }
            }
        }
        self.tree.set_position(target, proposed);
    }
}
