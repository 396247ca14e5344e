// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Gui`] itself: tree ownership, capability tables, the handler
//! stack, and node lifecycle.

use std::collections::VecDeque;
use std::rc::Rc;

use hashbrown::HashMap;
use kurbo::Point;

use trellis_box::{BoxDefinition, BoxTree, NodeId, ZIndex};
use trellis_drag::Occupancy;
use trellis_focus::FocusStack;
use trellis_layout::{self as layout, Arrangement, LayoutDefinition};
use trellis_pointer::PointerState;
use trellis_selection::SelectionSet;

use crate::dispatch::InputEvent;
use crate::drag::DragNode;
use crate::error::GuiError;
use crate::focus::FocusNode;
use crate::selection::{SelectableNode, SurfaceNode};
use crate::{GuiCoordCheck, GuiKeyboardHandler, GuiPointerHandlers};

pub(crate) struct PointerNode {
    pub(crate) handlers: GuiPointerHandlers,
    pub(crate) state: PointerState,
    pub(crate) coord_check: Option<GuiCoordCheck>,
}

pub(crate) struct LayoutNode {
    pub(crate) definition: LayoutDefinition,
    pub(crate) arrangement: Arrangement,
}

pub(crate) struct SnapNode {
    pub(crate) can_receive: Option<Rc<dyn Fn(&Gui, NodeId, NodeId) -> bool>>,
    pub(crate) on_receive: Option<Rc<dyn Fn(&mut Gui, NodeId, NodeId)>>,
    pub(crate) on_release: Option<Rc<dyn Fn(&mut Gui, NodeId, NodeId)>>,
}

/// Acceptance hook for a snap target: given the GUI, the snap target and the
/// draggable asking to snap, decide whether to accept. When absent the
/// default rule applies: accept while unoccupied.
pub type CanReceive = Rc<dyn Fn(&Gui, NodeId, NodeId) -> bool>;
/// Occupancy notification for a snap target `(gui, snap target, draggable)`.
pub type SnapCallback = Rc<dyn Fn(&mut Gui, NodeId, NodeId)>;

/// Options for [`Gui::make_snap_target`].
#[derive(Default)]
pub struct SnapOptions {
    /// Acceptance hook; defaults to single occupancy.
    pub can_receive: Option<CanReceive>,
    /// Called when a draggable snaps on.
    pub on_receive: Option<SnapCallback>,
    /// Called when a draggable snaps off.
    pub on_release: Option<SnapCallback>,
}

impl core::fmt::Debug for SnapOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SnapOptions")
            .field("can_receive", &self.can_receive.is_some())
            .field("on_receive", &self.on_receive.is_some())
            .field("on_release", &self.on_release.is_some())
            .finish()
    }
}

/// The retained-mode GUI: a box tree plus capability state, driven by the
/// host engine's input events.
pub struct Gui {
    pub(crate) tree: BoxTree,
    root: NodeId,
    /// Registration order; dispatch walks this in reverse, so later
    /// registrations (children, re-raised nodes) get priority.
    pub(crate) handler_stack: Vec<NodeId>,
    pub(crate) pointer: HashMap<NodeId, PointerNode>,
    pub(crate) focus: HashMap<NodeId, FocusNode>,
    pub(crate) focus_stack: FocusStack<NodeId>,
    pub(crate) keyboard: HashMap<NodeId, GuiKeyboardHandler>,
    pub(crate) drags: HashMap<NodeId, DragNode>,
    pub(crate) snaps: HashMap<NodeId, SnapNode>,
    pub(crate) occupancy: Occupancy<NodeId, NodeId>,
    pub(crate) layouts: HashMap<NodeId, LayoutNode>,
    pub(crate) selectables: HashMap<NodeId, SelectableNode>,
    pub(crate) selection: SelectionSet<NodeId>,
    pub(crate) surfaces: HashMap<NodeId, SurfaceNode>,
    pub(crate) pending: VecDeque<InputEvent>,
    pub(crate) dispatching: bool,
}

impl core::fmt::Debug for Gui {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gui")
            .field("tree", &self.tree)
            .field("root", &self.root)
            .field("handler_stack", &self.handler_stack.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl Gui {
    /// Create a GUI whose scene root is a box of the given size (typically
    /// the window's virtual size).
    pub fn new(width: f64, height: f64) -> Self {
        let mut tree = BoxTree::new();
        let root = tree
            .insert(None, BoxDefinition::sized(width, height))
            .expect("root definition is valid");
        Self {
            tree,
            root,
            handler_stack: Vec::new(),
            pointer: HashMap::new(),
            focus: HashMap::new(),
            focus_stack: FocusStack::new(),
            keyboard: HashMap::new(),
            drags: HashMap::new(),
            snaps: HashMap::new(),
            occupancy: Occupancy::new(),
            layouts: HashMap::new(),
            selectables: HashMap::new(),
            selection: SelectionSet::new(),
            surfaces: HashMap::new(),
            pending: VecDeque::new(),
            dispatching: false,
        }
    }

    /// The scene root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The box tree, for geometry queries.
    pub fn tree(&self) -> &BoxTree {
        &self.tree
    }

    /// The box tree, for direct geometry mutation.
    pub fn tree_mut(&mut self) -> &mut BoxTree {
        &mut self.tree
    }

    // --- node lifecycle ---

    /// Insert a plain box under `parent` at z 0.
    ///
    /// If the parent is a layout container its children are re-arranged.
    pub fn insert(&mut self, parent: NodeId, definition: BoxDefinition) -> Result<NodeId, GuiError> {
        self.insert_with_z(parent, definition, 0)
    }

    /// Insert a plain box with an explicit z value.
    pub fn insert_with_z(
        &mut self,
        parent: NodeId,
        definition: BoxDefinition,
        z: i32,
    ) -> Result<NodeId, GuiError> {
        if !self.tree.is_alive(parent) {
            return Err(GuiError::DeadNode(parent));
        }
        let id = self.tree.insert_with_z(Some(parent), definition, z)?;
        self.rearrange(parent);
        Ok(id)
    }

    /// Destroy a node and its whole subtree.
    ///
    /// Every structure that references any member of the subtree lets go:
    /// the handler stack, the focus stack, snap occupancy (both sides), the
    /// selectable set, and all capability tables.
    pub fn kill(&mut self, id: NodeId) {
        if !self.tree.is_alive(id) {
            return;
        }
        let mut members = vec![id];
        members.extend(self.tree.descendants(id));
        for member in members {
            self.handler_stack.retain(|h| *h != member);
            self.pointer.remove(&member);
            self.keyboard.remove(&member);
            if self.focus.remove(&member).is_some() {
                self.focus_stack.unregister(member);
            }
            if let Some(d) = self.drags.remove(&member)
                && let Some(snap) = d.controller.snapped()
                && self.occupancy.occupant(snap) == Some(&member)
            {
                self.occupancy.release(snap);
            }
            if self.snaps.remove(&member).is_some() {
                self.occupancy.release(member);
            }
            self.occupancy.evict(&member);
            self.layouts.remove(&member);
            if self.selectables.remove(&member).is_some() {
                self.selection.forget(member);
            }
            self.surfaces.remove(&member);
        }
        let parent = self.tree.parent_of(id);
        self.tree.remove(id);
        if let Some(p) = parent {
            self.rearrange(p);
        }
        log::debug!("killed node {id:?}");
    }

    /// Reorder a node within its parent, keeping the handler stack in sync.
    ///
    /// A reorder re-registers the node's subtree at the top of the handler
    /// stack (the exit/enter cycle). Doing this from inside an event
    /// callback can cause handlers not yet visited to be skipped for the
    /// event in flight; consume the event and use
    /// [`Gui::request_redispatch`] when the new order must apply to it.
    pub fn set_z(&mut self, id: NodeId, z: ZIndex) -> bool {
        let changed = self.tree.set_z(id, z);
        if changed {
            self.reregister_subtree(id);
            if let Some(parent) = self.tree.parent_of(id) {
                self.rearrange(parent);
            }
        }
        changed
    }

    // --- capabilities ---

    /// Attach (or replace) pointer callbacks on a node.
    pub fn set_pointer_handlers(
        &mut self,
        id: NodeId,
        handlers: GuiPointerHandlers,
    ) -> Result<(), GuiError> {
        if !self.tree.is_alive(id) {
            return Err(GuiError::DeadNode(id));
        }
        self.ensure_pointer(id).handlers = handlers;
        self.register(id);
        Ok(())
    }

    /// Install or clear the extra hit-test predicate on a node.
    ///
    /// The predicate is supplied externally — typically by a viewport that
    /// wants clipped-out descendants to stop reacting (see
    /// [`Gui::install_viewport`]). An event is only handled when the box
    /// rect contains the pointer *and* this predicate agrees.
    pub fn set_coord_check(&mut self, id: NodeId, check: Option<GuiCoordCheck>) {
        if let Some(node) = self.pointer.get_mut(&id) {
            node.coord_check = check;
        } else if let Some(check) = check {
            let node = self.ensure_pointer(id);
            node.coord_check = Some(check);
        }
    }

    /// Attach a keyboard handler to a node.
    pub fn set_keyboard(&mut self, id: NodeId, handler: GuiKeyboardHandler) -> Result<(), GuiError> {
        if !self.tree.is_alive(id) {
            return Err(GuiError::DeadNode(id));
        }
        self.keyboard.insert(id, handler);
        self.register(id);
        Ok(())
    }

    /// Make a node a snap target for draggables.
    pub fn make_snap_target(&mut self, id: NodeId, options: SnapOptions) -> Result<(), GuiError> {
        if !self.tree.is_alive(id) {
            return Err(GuiError::DeadNode(id));
        }
        self.snaps.insert(
            id,
            SnapNode {
                can_receive: options.can_receive,
                on_receive: options.on_receive,
                on_release: options.on_release,
            },
        );
        Ok(())
    }

    /// Make a node a row or column container and arrange its children.
    ///
    /// Grid definitions are built with [`Gui::build_grid`] instead, which
    /// composes rows and columns; attaching one here is rejected.
    pub fn set_layout(&mut self, id: NodeId, definition: LayoutDefinition) -> Result<(), GuiError> {
        if !self.tree.is_alive(id) {
            return Err(GuiError::DeadNode(id));
        }
        let arrangement = layout::arrangement_of(&definition)?;
        if matches!(arrangement, Arrangement::Grid(_)) {
            return Err(GuiError::Layout(trellis_layout::LayoutError::UnconstrainedGrid));
        }
        self.layouts.insert(
            id,
            LayoutNode {
                definition,
                arrangement,
            },
        );
        self.rearrange(id);
        Ok(())
    }

    /// Build a rectangular grid of detached boxes under `parent`.
    ///
    /// The produced lane containers become row/column containers so later
    /// insertions and kills keep them arranged.
    pub fn build_grid(
        &mut self,
        parent: NodeId,
        definition: &LayoutDefinition,
        boxes: &[NodeId],
    ) -> Result<NodeId, GuiError> {
        if !self.tree.is_alive(parent) {
            return Err(GuiError::DeadNode(parent));
        }
        let grid = layout::build_grid(&mut self.tree, definition, boxes)?;
        let lane_definition = match grid.orientation {
            layout::GridOrientation::ColumnOfRows => LayoutDefinition {
                num_columns: None,
                num_rows: Some(1),
                ..*definition
            },
            layout::GridOrientation::RowOfColumns => LayoutDefinition {
                num_columns: Some(1),
                num_rows: None,
                ..*definition
            },
        };
        let outer_definition = match grid.orientation {
            layout::GridOrientation::ColumnOfRows => LayoutDefinition {
                num_columns: Some(1),
                num_rows: None,
                ..*definition
            },
            layout::GridOrientation::RowOfColumns => LayoutDefinition {
                num_columns: None,
                num_rows: Some(1),
                ..*definition
            },
        };
        for lane in &grid.lanes {
            self.set_layout(*lane, lane_definition)?;
        }
        self.set_layout(grid.outer, outer_definition)?;
        self.tree.attach(grid.outer, parent, 0, false);
        self.rearrange(parent);
        Ok(grid.outer)
    }

    // --- shared internals ---

    pub(crate) fn ensure_pointer(&mut self, id: NodeId) -> &mut PointerNode {
        self.pointer.entry(id).or_insert_with(|| PointerNode {
            handlers: GuiPointerHandlers::new(),
            state: PointerState::new(),
            coord_check: None,
        })
    }

    /// Put a node on the handler stack (push order decides priority; the
    /// host builds parents before children, so children land higher).
    pub(crate) fn register(&mut self, id: NodeId) {
        if !self.handler_stack.contains(&id) {
            self.handler_stack.push(id);
        }
    }

    pub(crate) fn reregister_subtree(&mut self, id: NodeId) {
        let mut members = vec![id];
        members.extend(self.tree.descendants(id));
        for member in members {
            if let Some(pos) = self.handler_stack.iter().position(|h| *h == member) {
                self.handler_stack.remove(pos);
                self.handler_stack.push(member);
            }
        }
    }

    pub(crate) fn rearrange(&mut self, container: NodeId) {
        let Some(node) = self.layouts.get(&container) else {
            return;
        };
        let definition = node.definition;
        match node.arrangement {
            Arrangement::Row => layout::arrange_row(&mut self.tree, container, &definition),
            Arrangement::Column => layout::arrange_column(&mut self.tree, container, &definition),
            Arrangement::Grid(_) => unreachable!("grid containers are composed of rows/columns"),
        }
    }

    /// Hit test a node: world rect containment plus the optional external
    /// coordinate check.
    pub(crate) fn hit_inside(&self, id: NodeId, point: Point) -> bool {
        if !self.tree.contains_world_point(id, point) {
            return false;
        }
        match self.pointer.get(&id).and_then(|p| p.coord_check.clone()) {
            Some(check) => check(self, id, point),
            None => true,
        }
    }

    /// A node's transient pointer state, if it is pointer-reactive.
    pub fn pointer_state(&self, id: NodeId) -> Option<PointerState> {
        self.pointer.get(&id).map(|p| p.state)
    }

    /// Returns whether the given node is selected.
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.is_selected(id)
    }

    /// The selected nodes, in unspecified order.
    pub fn selected(&self) -> Vec<NodeId> {
        self.selection.selected().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DragOptions, GuiKeyboardHandler, KeyMap};
    use kurbo::Size;

    #[test]
    fn insert_into_layout_container_rearranges() {
        let mut gui = Gui::new(800.0, 600.0);
        let row = gui.insert(gui.root(), BoxDefinition::default()).unwrap();
        gui.set_layout(
            row,
            LayoutDefinition {
                spacing: 5.0,
                ..LayoutDefinition::default()
            },
        )
        .unwrap();

        let a = gui.insert(row, BoxDefinition::sized(10.0, 10.0)).unwrap();
        let b = gui.insert(row, BoxDefinition::sized(10.0, 10.0)).unwrap();
        assert_eq!(gui.tree().position(a).unwrap(), Point::new(0.0, 0.0));
        assert_eq!(gui.tree().position(b).unwrap(), Point::new(15.0, 0.0));

        gui.kill(a);
        assert_eq!(gui.tree().position(b).unwrap(), Point::new(0.0, 0.0));
        assert_eq!(gui.tree().size(row).unwrap(), Size::new(10.0, 10.0));
    }

    #[test]
    fn grid_containers_stay_arranged() {
        let mut gui = Gui::new(800.0, 600.0);
        let items: Vec<NodeId> = (0..4)
            .map(|_| {
                gui.tree_mut()
                    .insert(None, BoxDefinition::sized(10.0, 10.0))
                    .unwrap()
            })
            .collect();
        let definition = LayoutDefinition {
            spacing: 0.0,
            num_columns: Some(2),
            num_rows: None,
            ..LayoutDefinition::default()
        };
        let outer = gui.build_grid(gui.root(), &definition, &items).unwrap();
        assert_eq!(gui.tree().size(outer).unwrap(), Size::new(20.0, 20.0));

        // Killing a cell re-arranges its lane.
        gui.kill(items[1]);
        assert_eq!(gui.tree().size(outer).unwrap(), Size::new(20.0, 20.0));
        assert_eq!(gui.tree().position(items[0]).unwrap(), Point::new(0.0, 0.0));
    }

    #[test]
    fn grid_layout_definition_is_rejected_as_plain_container() {
        let mut gui = Gui::new(100.0, 100.0);
        let node = gui.insert(gui.root(), BoxDefinition::default()).unwrap();
        let grid = LayoutDefinition {
            num_columns: Some(2),
            num_rows: Some(2),
            ..LayoutDefinition::default()
        };
        assert!(gui.set_layout(node, grid).is_err());
    }

    #[test]
    fn killing_a_snapped_draggable_frees_the_target() {
        let mut gui = Gui::new(800.0, 600.0);
        let slot = gui
            .insert(gui.root(), BoxDefinition::sized(20.0, 20.0))
            .unwrap();
        gui.make_snap_target(slot, SnapOptions::default()).unwrap();
        let piece = gui
            .insert(gui.root(), BoxDefinition::sized(10.0, 10.0))
            .unwrap();
        gui.make_draggable(
            piece,
            DragOptions {
                snap_boxes: vec![slot],
                ..DragOptions::default()
            },
        )
        .unwrap();
        gui.snap_to(piece, slot).unwrap();
        assert!(gui.occupancy.is_occupied(slot));

        gui.kill(piece);
        assert!(gui.occupancy.can_receive(slot));

        // Killing an occupied snap target releases the occupancy too.
        let piece = gui
            .insert(gui.root(), BoxDefinition::sized(10.0, 10.0))
            .unwrap();
        gui.make_draggable(
            piece,
            DragOptions {
                snap_boxes: vec![slot],
                ..DragOptions::default()
            },
        )
        .unwrap();
        gui.snap_to(piece, slot).unwrap();
        gui.kill(slot);
        assert!(!gui.occupancy.is_occupied(slot));
    }

    #[test]
    fn dead_nodes_are_rejected() {
        let mut gui = Gui::new(100.0, 100.0);
        let node = gui.insert(gui.root(), BoxDefinition::sized(5.0, 5.0)).unwrap();
        gui.kill(node);
        assert_eq!(
            gui.insert(node, BoxDefinition::default()),
            Err(GuiError::DeadNode(node))
        );
        assert!(gui.set_keyboard(node, GuiKeyboardHandler::new(KeyMap::new())).is_err());
    }
}
