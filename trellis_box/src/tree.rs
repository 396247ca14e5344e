// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, sizing, z-order, queries.

use alloc::vec::Vec;
use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;

use crate::align::{PositionalAnchor, Spacing};
use crate::color::Color;
use crate::definition::{BoxDefinition, DefinitionError, DynamicSizeBehaviour};
use crate::util::rects_intersect;

/// Identifier for a box in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Target for [`BoxTree::set_z`]: an explicit value or a symbolic extreme.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ZIndex {
    /// An explicit z value.
    Value(i32),
    /// One past the current highest sibling z; a no-op if the box is already
    /// the topmost sibling.
    Top,
    /// One below the current lowest sibling z; a no-op if the box is already
    /// the bottommost sibling.
    Bottom,
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    /// Ordered by `(z, seq)` ascending; the last child is topmost.
    children: SmallVec<[NodeId; 4]>,
    z: i32,
    /// Insertion-order tiebreak between equal z values.
    seq: u64,
    /// Position of this box's origin in its parent's coordinate space.
    position: Point,
    definition: BoxDefinition,
    /// Cached resolved size; kept consistent synchronously.
    size: Size,
}

impl Node {
    fn new(generation: u32, definition: BoxDefinition) -> Self {
        Self {
            generation,
            parent: None,
            children: SmallVec::new(),
            z: 0,
            seq: 0,
            position: Point::ZERO,
            definition,
            size: Size::ZERO,
        }
    }
}

/// A tree of sized boxes.
///
/// Every mutation that can affect a resolved size — attaching or detaching
/// children, replacing a definition, moving a child — recomputes the affected
/// sizes before returning, so a box's [`BoxTree::rect`] is always consistent
/// with its definition, its children, and its parent.
///
/// ## Example
///
/// ```rust
/// use trellis_box::{BoxDefinition, BoxTree};
///
/// let mut tree = BoxTree::new();
/// let parent = tree.insert(None, BoxDefinition::default()).unwrap();
/// let child = tree
///     .insert(Some(parent), BoxDefinition::sized(40.0, 30.0))
///     .unwrap();
///
/// // The fit-children parent resized to bound the child immediately.
/// assert_eq!(tree.size(parent).unwrap(), tree.size(child).unwrap());
/// ```
#[derive(Clone, Default)]
pub struct BoxTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    next_seq: u64,
}

impl core::fmt::Debug for BoxTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("BoxTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl BoxTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `id` refers to a live box.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Insert a new box as a child of `parent` (or as a root if `None`) at z 0.
    ///
    /// The definition is validated first; a rejected definition never creates
    /// a node.
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        definition: BoxDefinition,
    ) -> Result<NodeId, DefinitionError> {
        self.insert_with_z(parent, definition, 0)
    }

    /// Insert a new box with an explicit z value.
    pub fn insert_with_z(
        &mut self,
        parent: Option<NodeId>,
        definition: BoxDefinition,
        z: i32,
    ) -> Result<NodeId, DefinitionError> {
        definition.validate()?;
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, definition));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, definition)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        self.update_rect(id);
        if let Some(p) = parent {
            self.attach(id, p, z, false);
        }
        Ok(id)
    }

    /// Remove a box and its whole subtree from the tree.
    ///
    /// The parent (if any) is notified of the child-list change first, so a
    /// dynamically sized parent shrinks before the ids go stale.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if self.node(id).parent.is_some() {
            self.detach(id, false);
        }
        self.remove_subtree(id);
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let children = self.node(id).children.clone();
        for child in children {
            self.remove_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Attach a detached box under `parent` at the given z value.
    ///
    /// Triggers a refit of the parent (unless `no_resize`) and notifies every
    /// current child of a possible parent-size change, which is what gives a
    /// freshly attached match-parent child its first real size.
    ///
    /// # Panics
    ///
    /// Panics if either id is stale, if `child` is already attached, or if
    /// the attachment would create a cycle. These are programming errors that
    /// would corrupt the layout invariants.
    pub fn attach(&mut self, child: NodeId, parent: NodeId, z: i32, no_resize: bool) {
        assert!(
            self.is_alive(child) && self.is_alive(parent),
            "attach called with a stale node id"
        );
        assert!(
            self.node(child).parent.is_none(),
            "node is already attached to a parent"
        );
        assert!(
            child != parent && !self.has_ancestor(parent, child),
            "attach would create a cycle"
        );
        self.node_mut(child).z = z;
        self.node_mut(child).seq = self.bump_seq();
        self.insert_child_ordered(parent, child);
        self.node_mut(child).parent = Some(parent);
        self.after_children_changed(parent, no_resize);
    }

    /// Detach a box from its parent, leaving it (and its subtree) alive as a
    /// root. No-op for roots and stale ids.
    ///
    /// The parent refits (unless `no_resize`) and remaining children are
    /// notified; the detached box re-resolves too, so a match-parent child
    /// returns to zero in its matched dimensions.
    pub fn detach(&mut self, child: NodeId, no_resize: bool) {
        if !self.is_alive(child) {
            return;
        }
        let Some(parent) = self.node(child).parent else {
            return;
        };
        self.node_mut(parent).children.retain(|c| *c != child);
        self.node_mut(child).parent = None;
        self.after_children_changed(parent, no_resize);
        if self.node(child).definition.is_dynamic() {
            self.update_rect(child);
        }
    }

    /// Recompute this box's size from its definition.
    ///
    /// Fixed dimensions are used as-is. Dynamic dimensions resolve per the
    /// definition's [`DynamicSizeBehaviour`]; see the crate docs for the
    /// match-parent exclusion that keeps propagation loop-free. If the
    /// resolved size differs from the cached one, the change propagates to
    /// the parent and children.
    pub fn update_rect(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        let def = self.node(id).definition;
        let bound = if def.is_dynamic()
            && def.dynamic_size_behaviour == DynamicSizeBehaviour::FitChildren
        {
            self.bounding_rect_of_children(id).unwrap_or(Rect::ZERO)
        } else {
            Rect::ZERO
        };
        let parent_size = self
            .parent_of(id)
            .and_then(|p| self.size(p))
            .unwrap_or(Size::ZERO);
        let resolve = |fixed: Option<f64>, fitted: f64, matched: f64| match fixed {
            Some(v) => v,
            None => match def.dynamic_size_behaviour {
                DynamicSizeBehaviour::FitChildren => fitted,
                DynamicSizeBehaviour::MatchParent => matched,
            },
        };
        let new = Size::new(
            resolve(def.width, bound.width(), parent_size.width),
            resolve(def.height, bound.height(), parent_size.height),
        );
        if new != self.node(id).size {
            self.node_mut(id).size = new;
            self.on_size_change(id);
        }
    }

    /// Propagate a size change outward.
    ///
    /// The background visual is derived from the size (see
    /// [`BoxTree::background`]), so the refresh is implicit; what has to
    /// ripple is the sizing: a dynamically sized parent refits to its
    /// children, and every child re-resolves against the new parent size.
    fn on_size_change(&mut self, id: NodeId) {
        if let Some(parent) = self.parent_of(id)
            && self.node(parent).definition.is_dynamic()
        {
            self.update_rect(parent);
        }
        let children = self.node(id).children.clone();
        for child in children {
            if self.is_alive(child) && self.node(child).definition.is_dynamic() {
                self.update_rect(child);
            }
        }
    }

    /// Replace this box's definition and re-resolve its size.
    ///
    /// The old definition value is untouched; sharing a definition between
    /// boxes is safe.
    pub fn replace_definition(
        &mut self,
        id: NodeId,
        definition: BoxDefinition,
    ) -> Result<(), DefinitionError> {
        definition.validate()?;
        if self.is_alive(id) {
            self.node_mut(id).definition = definition;
            self.update_rect(id);
        }
        Ok(())
    }

    /// The union of descendant box rects in this box's local space.
    ///
    /// The box itself is excluded. A descendant that dynamically matches its
    /// parent contributes zero size in the dimension(s) it matches, so the
    /// bound never inflates from a size the descendant is about to copy back.
    /// Returns `Rect::ZERO` for a box without descendants, or `None` for a
    /// stale id.
    pub fn bounding_rect_of_children(&self, id: NodeId) -> Option<Rect> {
        if !self.is_alive(id) {
            return None;
        }
        let mut acc: Option<Rect> = None;
        let mut stack: Vec<(NodeId, Vec2)> = self
            .node(id)
            .children
            .iter()
            .map(|&c| (c, Vec2::ZERO))
            .collect();
        while let Some((cur, parent_offset)) = stack.pop() {
            let node = self.node(cur);
            let origin = node.position + parent_offset;
            let width = if node.definition.width_matches_parent() {
                0.0
            } else {
                node.size.width
            };
            let height = if node.definition.height_matches_parent() {
                0.0
            } else {
                node.size.height
            };
            let rect = Rect::from_origin_size(origin, Size::new(width, height));
            acc = Some(match acc {
                Some(a) => a.union(rect),
                None => rect,
            });
            let offset = origin.to_vec2();
            for &c in &node.children {
                stack.push((c, offset));
            }
        }
        Some(acc.unwrap_or(Rect::ZERO))
    }

    // --- z ordering ---

    /// Reorder this box within its parent's child list.
    ///
    /// The box is removed and re-inserted, taking a fresh insertion-order
    /// slot among equal z values. Callers that mirror the child order into an
    /// event-handler stack must treat a `true` return as an exit/enter cycle:
    /// reordering during an event callback can cause siblings to be skipped
    /// for the remainder of that event's propagation, and the documented
    /// workaround is to consume the event and request a re-dispatch.
    ///
    /// Returns whether a reorder actually happened ([`ZIndex::Top`] /
    /// [`ZIndex::Bottom`] are no-ops when already at the extreme).
    ///
    /// # Panics
    ///
    /// Panics if the box has no parent.
    pub fn set_z(&mut self, id: NodeId, z: ZIndex) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let parent = self
            .node(id)
            .parent
            .expect("set_z called on a detached box");
        let target = match z {
            ZIndex::Value(v) => v,
            ZIndex::Top => {
                let last = *self
                    .node(parent)
                    .children
                    .last()
                    .expect("parent of a live child has children");
                if last == id {
                    return false;
                }
                self.node(last).z + 1
            }
            ZIndex::Bottom => {
                let first = *self
                    .node(parent)
                    .children
                    .first()
                    .expect("parent of a live child has children");
                if first == id {
                    return false;
                }
                self.node(first).z - 1
            }
        };
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).z = target;
        self.node_mut(id).seq = self.bump_seq();
        self.insert_child_ordered(parent, id);
        true
    }

    /// The z value of a live box.
    pub fn z_of(&self, id: NodeId) -> Option<i32> {
        self.live(id).map(|n| n.z)
    }

    // --- geometry ---

    /// The resolved size of a live box.
    pub fn size(&self, id: NodeId) -> Option<Size> {
        self.live(id).map(|n| n.size)
    }

    /// The box rect in its own coordinate space (origin at zero).
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.live(id)
            .map(|n| Rect::from_origin_size(Point::ZERO, n.size))
    }

    /// The current definition of a live box.
    pub fn definition(&self, id: NodeId) -> Option<&BoxDefinition> {
        self.live(id).map(|n| &n.definition)
    }

    /// The background fill of a live box, sized to its current rect.
    ///
    /// Returns `None` when no background color is configured; setting the
    /// color to `None` in a replacement definition removes the background.
    pub fn background(&self, id: NodeId) -> Option<(Color, Rect)> {
        let node = self.live(id)?;
        node.definition
            .background
            .map(|c| (c, Rect::from_origin_size(Point::ZERO, node.size)))
    }

    /// This box's origin in its parent's coordinate space.
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.live(id).map(|n| n.position)
    }

    /// Move this box within its parent's coordinate space.
    ///
    /// A fit-children ancestor's bound depends on descendant positions, so
    /// every fit-children ancestor refits when the box moves.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        if !self.is_alive(id) || self.node(id).position == position {
            return;
        }
        self.node_mut(id).position = position;
        let mut cur = self.parent_of(id);
        while let Some(ancestor) = cur {
            let def = self.node(ancestor).definition;
            if def.is_dynamic()
                && def.dynamic_size_behaviour == DynamicSizeBehaviour::FitChildren
            {
                self.update_rect(ancestor);
            }
            cur = self.parent_of(ancestor);
        }
    }

    /// Move this box by a delta within its parent's coordinate space.
    pub fn translate(&mut self, id: NodeId, delta: Vec2) {
        if let Some(p) = self.position(id) {
            self.set_position(id, p + delta);
        }
    }

    /// This box's origin in world space (the sum of ancestor positions).
    pub fn world_origin(&self, id: NodeId) -> Option<Point> {
        if !self.is_alive(id) {
            return None;
        }
        let mut acc = Vec2::ZERO;
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = self.node(n);
            acc += node.position.to_vec2();
            cur = node.parent;
        }
        Some(acc.to_point())
    }

    /// The box rect in world space.
    pub fn world_rect(&self, id: NodeId) -> Option<Rect> {
        let origin = self.world_origin(id)?;
        Some(Rect::from_origin_size(origin, self.node(id).size))
    }

    /// Convert a world-space point into this box's local space.
    pub fn point_to_local(&self, id: NodeId, world: Point) -> Option<Point> {
        let origin = self.world_origin(id)?;
        Some((world - origin).to_point())
    }

    /// Convert a point in this box's local space into world space.
    pub fn point_to_world(&self, id: NodeId, local: Point) -> Option<Point> {
        let origin = self.world_origin(id)?;
        Some(origin + local.to_vec2())
    }

    /// Returns whether a world-space point lies within this box's rect
    /// (edges included).
    pub fn contains_world_point(&self, id: NodeId, world: Point) -> bool {
        self.world_rect(id)
            .is_some_and(|r| crate::util::rect_contains(r, world))
    }

    // --- alignment ---

    /// Position this box so one of its anchors coincides with an anchor of
    /// `other`, plus spacing.
    ///
    /// `self_anchor` defaults to `other_anchor`: aligning with another box's
    /// right-bottom corner aligns this box's own right-bottom corner there
    /// unless told otherwise. Spacing is interpreted against the self anchor;
    /// see [`Spacing`].
    pub fn align_with(
        &mut self,
        id: NodeId,
        other: NodeId,
        other_anchor: PositionalAnchor,
        self_anchor: Option<PositionalAnchor>,
        spacing: Spacing,
    ) {
        if !self.is_alive(id) || !self.is_alive(other) {
            return;
        }
        let self_anchor = self_anchor.unwrap_or(other_anchor);
        let target_world = self
            .point_to_world(other, other_anchor.coord_in(self.node(other).size))
            .expect("other is live");
        let parent_origin = match self.node(id).parent {
            Some(p) => self.world_origin(p).expect("parent of a live box is live"),
            None => Point::ZERO,
        };
        let self_offset = self_anchor.coord_in(self.node(id).size);
        let position = (target_world - parent_origin) - self_offset.to_vec2()
            + spacing.offset(self_anchor);
        self.set_position(id, position.to_point());
    }

    /// The world-space vector from this box's anchor to the other box's
    /// anchor — the translation that would bring the two anchors together.
    pub fn vector_between_anchors(
        &self,
        id: NodeId,
        self_anchor: PositionalAnchor,
        other: NodeId,
        other_anchor: PositionalAnchor,
    ) -> Option<Vec2> {
        let from = self.point_to_world(id, self_anchor.coord_in(self.live(id)?.size))?;
        let to = self.point_to_world(other, other_anchor.coord_in(self.live(other)?.size))?;
        Some(to - from)
    }

    // --- structure queries ---

    /// The parent of a live box, or `None` for roots and stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.live(id).and_then(|n| n.parent)
    }

    /// The children of a box in z order (bottom to top), or an empty slice
    /// for stale ids.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.live(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// All descendants of a box in depth-first order, excluding the box
    /// itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_alive(id) {
            return out;
        }
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(cur) = stack.pop() {
            out.push(cur);
            for &c in self.node(cur).children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Live boxes whose world rects intersect the given world-space rect
    /// (edges included). Order is unspecified.
    pub fn intersecting_world_rect(&self, rect: Rect) -> Vec<NodeId> {
        let mut out = Vec::new();
        for (idx, slot) in self.nodes.iter().enumerate() {
            let Some(node) = slot else { continue };
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            let id = NodeId::new(idx as u32, node.generation);
            if let Some(world) = self.world_rect(id)
                && rects_intersect(world, rect)
            {
                out.push(id);
            }
        }
        out
    }

    // --- internals ---

    fn live(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .filter(|n| n.generation == id.1)
    }

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Returns whether `ancestor` appears on `id`'s ancestor chain.
    fn has_ancestor(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cur = self.node(id).parent;
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.node(n).parent;
        }
        false
    }

    /// Insert `child` into `parent`'s list keeping `(z, seq)` order.
    fn insert_child_ordered(&mut self, parent: NodeId, child: NodeId) {
        let z = self.node(child).z;
        let idx = {
            let siblings = &self.node(parent).children;
            let mut idx = siblings.len();
            for (i, &c) in siblings.iter().enumerate() {
                if self.node(c).z > z {
                    idx = i;
                    break;
                }
            }
            idx
        };
        self.node_mut(parent).children.insert(idx, child);
    }

    fn after_children_changed(&mut self, parent: NodeId, no_resize: bool) {
        if !no_resize && self.node(parent).definition.is_dynamic() {
            self.update_rect(parent);
        }
        let children = self.node(parent).children.clone();
        for child in children {
            if self.is_alive(child) && self.node(child).definition.is_dynamic() {
                self.update_rect(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{CENTER_CENTER, RIGHT_BOTTOM};

    fn fixed(w: f64, h: f64) -> BoxDefinition {
        BoxDefinition::sized(w, h)
    }

    fn fit() -> BoxDefinition {
        BoxDefinition::dynamic(DynamicSizeBehaviour::FitChildren)
    }

    fn match_parent() -> BoxDefinition {
        BoxDefinition::dynamic(DynamicSizeBehaviour::MatchParent)
    }

    #[test]
    fn fit_children_grows_and_shrinks_with_children() {
        let mut tree = BoxTree::new();
        let parent = tree.insert(None, fit()).unwrap();
        assert_eq!(tree.size(parent).unwrap(), Size::ZERO);

        let a = tree.insert(Some(parent), fixed(100.0, 50.0)).unwrap();
        assert_eq!(tree.size(parent).unwrap(), Size::new(100.0, 50.0));

        let b = tree.insert(Some(parent), fixed(300.0, 20.0)).unwrap();
        assert_eq!(tree.size(parent).unwrap(), Size::new(300.0, 50.0));

        tree.remove(b);
        assert_eq!(tree.size(parent).unwrap(), Size::new(100.0, 50.0));

        tree.remove(a);
        assert_eq!(tree.size(parent).unwrap(), Size::ZERO);
    }

    #[test]
    fn match_parent_tracks_parent_size() {
        let mut tree = BoxTree::new();
        let child = tree.insert(None, match_parent()).unwrap();
        assert_eq!(tree.size(child).unwrap(), Size::ZERO);

        let parent = tree.insert(None, fixed(200.0, 100.0)).unwrap();
        tree.attach(child, parent, 0, false);
        assert_eq!(tree.size(child).unwrap(), Size::new(200.0, 100.0));

        tree.replace_definition(parent, fixed(50.0, 60.0)).unwrap();
        assert_eq!(tree.size(child).unwrap(), Size::new(50.0, 60.0));

        tree.detach(child, false);
        assert_eq!(tree.size(child).unwrap(), Size::ZERO);
    }

    #[test]
    fn match_parent_child_does_not_inflate_fit_parent() {
        let mut tree = BoxTree::new();
        let parent = tree.insert(None, fit()).unwrap();
        let _stretchy = tree.insert(Some(parent), match_parent()).unwrap();
        let solid = tree.insert(Some(parent), fixed(80.0, 40.0)).unwrap();

        // The stretchy child copies the parent but never feeds back into it.
        assert_eq!(tree.size(parent).unwrap(), Size::new(80.0, 40.0));

        // Repeated resize cycles stay at the fixed-point, no oscillation.
        for w in [120.0, 30.0, 80.0] {
            tree.replace_definition(solid, fixed(w, 40.0)).unwrap();
            assert_eq!(tree.size(parent).unwrap(), Size::new(w, 40.0));
        }
    }

    #[test]
    fn match_parent_exclusion_is_per_dimension() {
        let mut tree = BoxTree::new();
        let parent = tree.insert(None, fit()).unwrap();
        // Fixed width, match-parent height: only the width counts in the bound.
        let half = BoxDefinition {
            width: Some(50.0),
            height: None,
            dynamic_size_behaviour: DynamicSizeBehaviour::MatchParent,
            background: None,
        };
        tree.insert(Some(parent), half).unwrap();
        let _solid = tree.insert(Some(parent), fixed(20.0, 30.0)).unwrap();
        assert_eq!(tree.size(parent).unwrap(), Size::new(50.0, 30.0));
    }

    #[test]
    fn fit_children_bounds_whole_subtree_with_offsets() {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, fit()).unwrap();
        let mid = tree.insert(Some(root), fit()).unwrap();
        tree.set_position(mid, Point::new(10.0, 20.0));
        let leaf = tree.insert(Some(mid), fixed(30.0, 40.0)).unwrap();
        tree.set_position(leaf, Point::new(5.0, 5.0));

        // Leaf sits at (15, 25) relative to root; the union spans from the
        // mid box origin (10, 20) out to the leaf's far corner (45, 65).
        assert_eq!(
            tree.bounding_rect_of_children(root).unwrap(),
            Rect::new(10.0, 20.0, 45.0, 65.0)
        );
        assert_eq!(tree.size(root).unwrap(), Size::new(35.0, 45.0));
    }

    #[test]
    fn dynamic_resize_end_to_end() {
        let mut tree = BoxTree::new();
        let a = tree.insert(None, fit()).unwrap();
        assert_eq!(tree.rect(a).unwrap(), Rect::new(0.0, 0.0, 0.0, 0.0));

        let b = tree.insert(Some(a), fixed(1000.0, 100.0)).unwrap();
        assert_eq!(tree.rect(a).unwrap(), Rect::new(0.0, 0.0, 1000.0, 100.0));

        tree.replace_definition(b, fixed(300.0, 400.0)).unwrap();
        assert_eq!(tree.rect(a).unwrap(), Rect::new(0.0, 0.0, 300.0, 400.0));
    }

    #[test]
    fn moving_a_child_refits_the_parent() {
        let mut tree = BoxTree::new();
        let parent = tree.insert(None, fit()).unwrap();
        let _anchor = tree.insert(Some(parent), fixed(10.0, 10.0)).unwrap();
        let child = tree.insert(Some(parent), fixed(10.0, 10.0)).unwrap();
        assert_eq!(tree.size(parent).unwrap(), Size::new(10.0, 10.0));

        tree.set_position(child, Point::new(90.0, 0.0));
        assert_eq!(tree.size(parent).unwrap(), Size::new(100.0, 10.0));
    }

    #[test]
    fn children_ordered_by_z_then_insertion() {
        let mut tree = BoxTree::new();
        let parent = tree.insert(None, fit()).unwrap();
        let a = tree.insert_with_z(Some(parent), fixed(1.0, 1.0), 5).unwrap();
        let b = tree.insert_with_z(Some(parent), fixed(1.0, 1.0), 0).unwrap();
        let c = tree.insert_with_z(Some(parent), fixed(1.0, 1.0), 5).unwrap();
        assert_eq!(tree.children_of(parent), &[b, a, c]);
    }

    #[test]
    fn symbolic_z_targets_one_past_the_extreme() {
        let mut tree = BoxTree::new();
        let parent = tree.insert(None, fit()).unwrap();
        let a = tree.insert_with_z(Some(parent), fixed(1.0, 1.0), 1).unwrap();
        let b = tree.insert_with_z(Some(parent), fixed(1.0, 1.0), 3).unwrap();

        // Already topmost: no-op.
        assert!(!tree.set_z(b, ZIndex::Top));
        assert_eq!(tree.z_of(b), Some(3));

        assert!(tree.set_z(a, ZIndex::Top));
        assert_eq!(tree.z_of(a), Some(4));
        assert_eq!(tree.children_of(parent), &[b, a]);

        assert!(tree.set_z(a, ZIndex::Bottom));
        assert_eq!(tree.z_of(a), Some(2));
        assert_eq!(tree.children_of(parent), &[a, b]);

        // Explicit equal z re-inserts after existing equal-z siblings.
        assert!(tree.set_z(a, ZIndex::Value(3)));
        assert_eq!(tree.children_of(parent), &[b, a]);
    }

    #[test]
    fn liveness_and_slot_reuse() {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, fit()).unwrap();
        let a = tree.insert(Some(root), fixed(1.0, 1.0)).unwrap();
        assert!(tree.is_alive(a));

        tree.remove(a);
        assert!(!tree.is_alive(a));
        assert_eq!(tree.size(a), None);
        assert_eq!(tree.parent_of(a), None);

        let b = tree.insert(Some(root), fixed(1.0, 1.0)).unwrap();
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
    }

    #[test]
    fn remove_takes_the_whole_subtree() {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, fit()).unwrap();
        let mid = tree.insert(Some(root), fit()).unwrap();
        let leaf = tree.insert(Some(mid), fixed(10.0, 10.0)).unwrap();
        assert_eq!(tree.size(root).unwrap(), Size::new(10.0, 10.0));

        tree.remove(mid);
        assert!(!tree.is_alive(mid));
        assert!(!tree.is_alive(leaf));
        assert_eq!(tree.size(root).unwrap(), Size::ZERO);
    }

    #[test]
    fn world_coordinates_compose_translations() {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, fixed(500.0, 500.0)).unwrap();
        tree.set_position(root, Point::new(10.0, 20.0));
        let child = tree.insert(Some(root), fixed(50.0, 50.0)).unwrap();
        tree.set_position(child, Point::new(5.0, 7.0));

        assert_eq!(tree.world_origin(child).unwrap(), Point::new(15.0, 27.0));
        assert_eq!(
            tree.world_rect(child).unwrap(),
            Rect::new(15.0, 27.0, 65.0, 77.0)
        );
        assert_eq!(
            tree.point_to_local(child, Point::new(20.0, 30.0)).unwrap(),
            Point::new(5.0, 3.0)
        );
        assert_eq!(
            tree.point_to_world(child, Point::new(1.0, 1.0)).unwrap(),
            Point::new(16.0, 28.0)
        );
        assert!(tree.contains_world_point(child, Point::new(15.0, 27.0)));
        assert!(!tree.contains_world_point(child, Point::new(14.0, 27.0)));
    }

    #[test]
    fn align_center_center() {
        let mut tree = BoxTree::new();
        let a = tree.insert(None, fixed(1000.0, 1000.0)).unwrap();
        let b = tree.insert(Some(a), fixed(100.0, 100.0)).unwrap();
        tree.align_with(b, a, CENTER_CENTER, None, Spacing::None);
        assert_eq!(tree.position(b).unwrap(), Point::new(450.0, 450.0));

        // Uniform spacing never perturbs a centered alignment.
        tree.align_with(b, a, CENTER_CENTER, None, Spacing::Uniform(0.0));
        assert_eq!(tree.position(b).unwrap(), Point::new(450.0, 450.0));
        tree.align_with(b, a, CENTER_CENTER, None, Spacing::Uniform(25.0));
        assert_eq!(tree.position(b).unwrap(), Point::new(450.0, 450.0));
    }

    #[test]
    fn align_defaults_self_anchor_to_other_anchor() {
        let mut tree = BoxTree::new();
        let a = tree.insert(None, fixed(1000.0, 1000.0)).unwrap();
        let b = tree.insert(Some(a), fixed(100.0, 100.0)).unwrap();
        tree.align_with(b, a, RIGHT_BOTTOM, None, Spacing::None);
        assert_eq!(tree.position(b).unwrap(), Point::new(900.0, 0.0));
    }

    #[test]
    fn exact_spacing_overrides_signed_direction() {
        let mut tree = BoxTree::new();
        let a = tree.insert(None, fixed(1000.0, 1000.0)).unwrap();
        let b = tree.insert(Some(a), fixed(100.0, 100.0)).unwrap();
        tree.align_with(
            b,
            a,
            CENTER_CENTER,
            None,
            Spacing::Exact(Vec2::new(10.0, -20.0)),
        );
        assert_eq!(tree.position(b).unwrap(), Point::new(460.0, 430.0));
    }

    #[test]
    fn vector_between_anchors_spans_world_space() {
        let mut tree = BoxTree::new();
        let a = tree.insert(None, fixed(100.0, 100.0)).unwrap();
        let b = tree.insert(None, fixed(20.0, 20.0)).unwrap();
        tree.set_position(b, Point::new(200.0, 0.0));
        let v = tree
            .vector_between_anchors(b, CENTER_CENTER, a, CENTER_CENTER)
            .unwrap();
        assert_eq!(v, Vec2::new(-160.0, 40.0));
    }

    #[test]
    fn invalid_definitions_are_rejected() {
        let mut tree = BoxTree::new();
        assert!(tree.insert(None, fixed(-1.0, 1.0)).is_err());
        let a = tree.insert(None, fixed(1.0, 1.0)).unwrap();
        assert!(tree.replace_definition(a, fixed(f64::NAN, 1.0)).is_err());
        // The failed replacement left the old definition in place.
        assert_eq!(tree.size(a).unwrap(), Size::new(1.0, 1.0));
    }

    #[test]
    fn background_tracks_current_size() {
        let mut tree = BoxTree::new();
        let def = BoxDefinition {
            background: Some(Color::ACTIVE_BLUE),
            ..fit()
        };
        let parent = tree.insert(None, def).unwrap();
        assert_eq!(
            tree.background(parent).unwrap(),
            (Color::ACTIVE_BLUE, Rect::ZERO)
        );
        tree.insert(Some(parent), fixed(30.0, 40.0)).unwrap();
        assert_eq!(
            tree.background(parent).unwrap().1,
            Rect::new(0.0, 0.0, 30.0, 40.0)
        );

        let plain = tree.definition(parent).map(|d| BoxDefinition {
            background: None,
            ..*d
        });
        tree.replace_definition(parent, plain.unwrap()).unwrap();
        assert!(tree.background(parent).is_none());
    }

    #[test]
    fn descendants_are_depth_first() {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, fit()).unwrap();
        let a = tree.insert(Some(root), fit()).unwrap();
        let b = tree.insert(Some(root), fit()).unwrap();
        let c = tree.insert(Some(a), fixed(1.0, 1.0)).unwrap();
        assert_eq!(tree.descendants(root), alloc::vec![a, c, b]);
    }

    #[test]
    fn intersecting_world_rect_includes_shared_edges() {
        let mut tree = BoxTree::new();
        let a = tree.insert(None, fixed(10.0, 10.0)).unwrap();
        let b = tree.insert(None, fixed(10.0, 10.0)).unwrap();
        tree.set_position(b, Point::new(50.0, 50.0));

        let hits = tree.intersecting_world_rect(Rect::new(5.0, 5.0, 50.0, 50.0));
        assert!(hits.contains(&a), "overlapping box should be found");
        assert!(hits.contains(&b), "edge-touching box should be found");

        let hits = tree.intersecting_world_rect(Rect::new(20.0, 20.0, 40.0, 40.0));
        assert!(hits.is_empty());
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn double_attach_is_fatal() {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, fit()).unwrap();
        let other = tree.insert(None, fit()).unwrap();
        let child = tree.insert(Some(root), fixed(1.0, 1.0)).unwrap();
        tree.attach(child, other, 0, false);
    }
}
