// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Drag: the drag/snap state machine.
//!
//! A draggable box is either *free* or *snapped* to a snap target. This
//! crate owns the state machine; it performs no hit testing and moves no
//! boxes. Feed it pointer deltas plus the current world rect of the dragged
//! box and the world rects of candidate snap targets, and it emits the
//! displacement to apply and the occupancy events that occurred.
//!
//! ## Free dragging
//!
//! Without snap targets configured, every drag event moves the target by
//! exactly the pointer delta.
//!
//! ## Snap dragging and hysteresis
//!
//! With snap targets configured, deltas accumulate into a *drag record* and
//! each drag tentatively moves by the whole record, not just the delta. On
//! entering a snap target the box is aligned center-to-center and the record
//! flips to the negated alignment vector. The effect is deliberate: right at
//! a snap boundary the pointer keeps fine control, because backing out by
//! the same distance that snapping absorbed exits the snap zone again. The
//! numeric behavior (record = `-alignment`) is part of the contract and is
//! pinned by tests rather than re-derived.
//!
//! Candidates are scanned in the order given, except that the currently
//! snapped target is preferred while it still spatially qualifies, and it is
//! exempt from its own acceptance check (an occupied target must refuse
//! everyone *else*).
//!
//! ## Must-remain-snapped boxes
//!
//! A controller created with `snap_on_release` never detaches on its own:
//! dragging off every target keeps the reservation, and
//! [`DragController::stop`] reports which target to spring back to. This is
//! what slider handles use. A `snap_on_release` controller with no snap
//! targets is a configuration error, rejected up front by
//! [`validate_snap_config`].
//!
//! [`Occupancy`] tracks which draggable occupies which snap target, with
//! strict receive/release pairing; receiving into an occupied target is an
//! invariant violation and panics.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Rect, Vec2};
use smallvec::SmallVec;
use thiserror::Error;

/// Which box a drag gesture moves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DragTarget {
    /// The draggable box itself.
    #[default]
    SelfBox,
    /// The draggable box's parent (e.g. a window dragged by its title bar).
    Parent,
}

/// A snap-drag configuration was impossible.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum DragConfigError {
    /// `snap_on_release` demands somewhere to spring back to.
    #[error("snap_on_release requires at least one snap target")]
    SnapOnReleaseWithoutTargets,
}

/// Validate a snap configuration before building widgets out of it.
pub fn validate_snap_config(
    snap_on_release: bool,
    num_targets: usize,
) -> Result<(), DragConfigError> {
    if snap_on_release && num_targets == 0 {
        return Err(DragConfigError::SnapOnReleaseWithoutTargets);
    }
    Ok(())
}

/// A snap target as seen by one drag event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapCandidate<K> {
    /// The snap target's key.
    pub id: K,
    /// The snap target's world rect.
    pub rect: Rect,
    /// Whether the target accepts this draggable right now (occupancy plus
    /// any host-defined acceptance hook). Ignored for the currently snapped
    /// target.
    pub can_receive: bool,
}

/// An occupancy transition produced by a drag step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SnapEvent<K> {
    /// The draggable left this snap target.
    Released(K),
    /// The draggable snapped onto this target.
    Received(K),
}

/// The outcome of one drag event.
#[derive(Clone, Debug, PartialEq)]
pub struct DragMove<K> {
    /// Displacement to apply to the drag target's position.
    pub displacement: Vec2,
    /// Occupancy transitions, in the order they must be applied.
    pub events: SmallVec<[SnapEvent<K>; 2]>,
}

/// Per-draggable drag/snap state machine.
#[derive(Clone, Debug, PartialEq)]
pub struct DragController<K> {
    record: Vec2,
    snapped: Option<K>,
    snapping: bool,
    snap_on_release: bool,
}

impl<K: Copy + Eq> DragController<K> {
    /// A controller that drags freely, with no snap targets.
    pub fn free() -> Self {
        Self {
            record: Vec2::ZERO,
            snapped: None,
            snapping: false,
            snap_on_release: false,
        }
    }

    /// A controller that snaps to targets.
    pub fn snapping(snap_on_release: bool) -> Self {
        Self {
            record: Vec2::ZERO,
            snapped: None,
            snapping: true,
            snap_on_release,
        }
    }

    /// The currently snapped target, if any.
    pub fn snapped(&self) -> Option<K> {
        self.snapped
    }

    /// The accumulated drag record. Exposed for inspection; the hysteresis
    /// contract (`-alignment` right after a snap) is tested against this.
    pub fn record(&self) -> Vec2 {
        self.record
    }

    /// Begin a drag gesture: the record starts from zero.
    pub fn start(&mut self) {
        self.record = Vec2::ZERO;
    }

    /// Process one drag event.
    ///
    /// `dragged_rect` is the dragged box's world rect *before* this event.
    /// Free controllers ignore `candidates` and move by the delta.
    pub fn drag(
        &mut self,
        delta: Vec2,
        dragged_rect: Rect,
        candidates: &[SnapCandidate<K>],
    ) -> DragMove<K> {
        if !self.snapping {
            return DragMove {
                displacement: delta,
                events: SmallVec::new(),
            };
        }

        self.record += delta;
        let mut displacement = self.record;
        let moved = dragged_rect + displacement;

        // The current target keeps priority while it still overlaps, and it
        // skips the acceptance check; everyone else is tried in order.
        let chosen = self
            .snapped
            .and_then(|cur| {
                candidates
                    .iter()
                    .find(|c| c.id == cur && rects_overlap(moved, c.rect))
            })
            .or_else(|| {
                candidates
                    .iter()
                    .find(|c| c.can_receive && rects_overlap(moved, c.rect))
            });

        match chosen {
            Some(candidate) => {
                let mut events = SmallVec::new();
                if self.snapped != Some(candidate.id) {
                    if let Some(prev) = self.snapped {
                        events.push(SnapEvent::Released(prev));
                    }
                    events.push(SnapEvent::Received(candidate.id));
                    self.snapped = Some(candidate.id);
                }
                let alignment = candidate.rect.center() - moved.center();
                displacement += alignment;
                self.record = -alignment;
                DragMove {
                    displacement,
                    events,
                }
            }
            None => {
                // Off every valid target: clear the record and unsnap, unless
                // this box must spring back on release.
                self.record = Vec2::ZERO;
                let mut events = SmallVec::new();
                if !self.snap_on_release
                    && let Some(prev) = self.snapped.take()
                {
                    events.push(SnapEvent::Released(prev));
                }
                DragMove {
                    displacement,
                    events,
                }
            }
        }
    }

    /// End the drag gesture.
    ///
    /// Returns the target to spring back to when this box must remain
    /// snapped; the host re-aligns with it. The record is reset either way.
    pub fn stop(&mut self) -> Option<K> {
        self.record = Vec2::ZERO;
        if self.snap_on_release { self.snapped } else { None }
    }

    /// Snap directly to a target, given the alignment vector that brings the
    /// dragged box's center onto the target's center.
    ///
    /// Re-snapping the current target only refreshes the hysteresis record;
    /// receive/release fire solely on a change of target. The host applies
    /// `alignment` to the drag target's position itself.
    pub fn snap_to(&mut self, id: K, alignment: Vec2) -> SmallVec<[SnapEvent<K>; 2]> {
        let mut events = SmallVec::new();
        if self.snapped != Some(id) {
            if let Some(prev) = self.snapped {
                events.push(SnapEvent::Released(prev));
            }
            events.push(SnapEvent::Received(id));
            self.snapped = Some(id);
        }
        self.record = -alignment;
        events
    }

    /// Detach from the current target, if permitted.
    ///
    /// A `snap_on_release` controller keeps its reservation and returns
    /// `None`; otherwise the released target is returned so the host can
    /// update occupancy. The box itself is not moved.
    pub fn unsnap(&mut self) -> Option<K> {
        if self.snap_on_release {
            return None;
        }
        self.snapped.take()
    }
}

fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Single-occupancy bookkeeping for snap targets.
///
/// `S` keys the snap targets, `D` the draggables occupying them.
#[derive(Clone, Debug, Default)]
pub struct Occupancy<S, D> {
    map: HashMap<S, D>,
}

impl<S: Copy + Eq + Hash, D> Occupancy<S, D> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// The occupant of a snap target, if any.
    pub fn occupant(&self, target: S) -> Option<&D> {
        self.map.get(&target)
    }

    /// Returns whether a snap target is occupied.
    pub fn is_occupied(&self, target: S) -> bool {
        self.map.contains_key(&target)
    }

    /// The default acceptance rule: a target can receive while unoccupied.
    pub fn can_receive(&self, target: S) -> bool {
        !self.is_occupied(target)
    }

    /// Mark a target occupied.
    ///
    /// # Panics
    ///
    /// Panics if the target is already occupied — receive/release must be
    /// strictly paired, and a double receive means the single-occupancy
    /// invariant was already broken.
    pub fn receive(&mut self, target: S, occupant: D) {
        let previous = self.map.insert(target, occupant);
        assert!(
            previous.is_none(),
            "snap target received a second occupant while occupied"
        );
    }

    /// Clear a target's occupant, returning it.
    pub fn release(&mut self, target: S) -> Option<D> {
        self.map.remove(&target)
    }

    /// Remove every occupancy involving the given occupant.
    ///
    /// Used when a draggable is destroyed while snapped.
    pub fn evict(&mut self, occupant: &D) -> Option<S>
    where
        D: PartialEq,
    {
        let target = self
            .map
            .iter()
            .find(|(_, d)| *d == occupant)
            .map(|(s, _)| *s);
        if let Some(s) = target {
            self.map.remove(&s);
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    fn snap_at(x: f64) -> SnapCandidate<u32> {
        SnapCandidate {
            id: 1,
            rect: Rect::new(x, 0.0, x + 20.0, 20.0),
            can_receive: true,
        }
    }

    #[test]
    fn free_drag_moves_by_each_delta() {
        let mut ctrl: DragController<u32> = DragController::free();
        ctrl.start();
        let mv = ctrl.drag(Vec2::new(3.0, 4.0), unit_box(), &[]);
        assert_eq!(mv.displacement, Vec2::new(3.0, 4.0));
        assert!(mv.events.is_empty());
        let mv = ctrl.drag(Vec2::new(-1.0, 0.0), unit_box() + mv.displacement, &[]);
        assert_eq!(mv.displacement, Vec2::new(-1.0, 0.0));
        assert_eq!(ctrl.snapped(), None);
    }

    #[test]
    fn snap_aligns_centers_and_inverts_the_record() {
        let mut ctrl: DragController<u32> = DragController::snapping(false);
        ctrl.start();

        // Not yet touching the target: record clears each time.
        let mv = ctrl.drag(Vec2::new(5.0, 0.0), unit_box(), &[snap_at(30.0)]);
        assert_eq!(mv.displacement, Vec2::new(5.0, 0.0));
        assert!(mv.events.is_empty());
        assert_eq!(ctrl.record(), Vec2::ZERO);

        // Into the target: align centers exactly.
        let rect = unit_box() + Vec2::new(5.0, 0.0);
        let mv = ctrl.drag(Vec2::new(20.0, 0.0), rect, &[snap_at(30.0)]);
        assert_eq!(mv.events.as_slice(), &[SnapEvent::Received(1)]);
        // Tentative move lands at (25,0); target center (40,10) minus moved
        // center (30,5) gives alignment (10,5).
        assert_eq!(mv.displacement, Vec2::new(30.0, 5.0));
        assert_eq!(ctrl.record(), Vec2::new(-10.0, -5.0));
        assert_eq!(ctrl.snapped(), Some(1));

        let rect = rect + mv.displacement;
        assert_eq!(rect.center(), kurbo::Point::new(40.0, 10.0));

        // Wiggling near the edge keeps the box glued to the target center.
        let mv = ctrl.drag(Vec2::new(2.0, 0.0), rect, &[snap_at(30.0)]);
        assert!(mv.events.is_empty(), "re-snap must not re-fire receive");
        assert_eq!(mv.displacement, Vec2::ZERO);
        assert_eq!(ctrl.record(), Vec2::new(-8.0, -5.0));

        // A decisive pull breaks out by the whole accumulated record.
        let mv = ctrl.drag(Vec2::new(-30.0, 0.0), rect, &[snap_at(30.0)]);
        assert_eq!(mv.events.as_slice(), &[SnapEvent::Released(1)]);
        assert_eq!(mv.displacement, Vec2::new(-38.0, -5.0));
        assert_eq!(ctrl.snapped(), None);
        assert_eq!(ctrl.record(), Vec2::ZERO);
    }

    #[test]
    fn refused_candidates_are_skipped() {
        let mut ctrl: DragController<u32> = DragController::snapping(false);
        ctrl.start();
        let occupied = SnapCandidate {
            can_receive: false,
            ..snap_at(0.0)
        };
        let mv = ctrl.drag(Vec2::new(1.0, 1.0), unit_box(), &[occupied]);
        assert!(mv.events.is_empty());
        assert_eq!(ctrl.snapped(), None);
        assert_eq!(mv.displacement, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn current_target_is_preferred_and_exempt_from_acceptance() {
        let mut ctrl: DragController<u32> = DragController::snapping(false);
        ctrl.start();
        let mut current = snap_at(0.0);
        current.id = 7;
        ctrl.snap_to(7, Vec2::ZERO);

        // The current target reports can_receive = false (it is occupied by
        // this very box), and an earlier candidate also qualifies; the
        // current target still wins.
        let other = SnapCandidate {
            id: 8,
            rect: Rect::new(0.0, 0.0, 20.0, 20.0),
            can_receive: true,
        };
        let current = SnapCandidate {
            can_receive: false,
            ..current
        };
        let mv = ctrl.drag(Vec2::new(1.0, 0.0), unit_box(), &[other, current]);
        assert!(mv.events.is_empty());
        assert_eq!(ctrl.snapped(), Some(7));
    }

    #[test]
    fn switching_targets_releases_then_receives() {
        let mut ctrl: DragController<u32> = DragController::snapping(false);
        ctrl.start();
        ctrl.snap_to(1, Vec2::ZERO);

        let far = SnapCandidate {
            id: 1,
            rect: Rect::new(100.0, 100.0, 120.0, 120.0),
            can_receive: false,
        };
        let near = SnapCandidate {
            id: 2,
            rect: Rect::new(0.0, 0.0, 20.0, 20.0),
            can_receive: true,
        };
        let mv = ctrl.drag(Vec2::new(1.0, 0.0), unit_box(), &[far, near]);
        assert_eq!(
            mv.events.as_slice(),
            &[SnapEvent::Released(1), SnapEvent::Received(2)]
        );
        assert_eq!(ctrl.snapped(), Some(2));
    }

    #[test]
    fn snap_on_release_reserves_the_target() {
        let mut ctrl: DragController<u32> = DragController::snapping(true);
        ctrl.start();
        ctrl.snap_to(1, Vec2::ZERO);

        // Dragging off every target keeps the reservation.
        let mv = ctrl.drag(Vec2::new(500.0, 0.0), unit_box(), &[snap_at(0.0)]);
        assert!(mv.events.is_empty(), "reserved target must not be released");
        assert_eq!(ctrl.snapped(), Some(1));

        // Explicit unsnap is refused too.
        assert_eq!(ctrl.unsnap(), None);
        assert_eq!(ctrl.snapped(), Some(1));

        // Stopping reports the spring-back target.
        assert_eq!(ctrl.stop(), Some(1));
    }

    #[test]
    fn stop_without_reservation_reports_nothing() {
        let mut ctrl: DragController<u32> = DragController::snapping(false);
        ctrl.start();
        ctrl.snap_to(1, Vec2::ZERO);
        assert_eq!(ctrl.stop(), None);
        // Still snapped; stopping a plain snap drag leaves it in place.
        assert_eq!(ctrl.snapped(), Some(1));
    }

    #[test]
    fn start_resets_the_record() {
        let mut ctrl: DragController<u32> = DragController::snapping(false);
        ctrl.start();
        ctrl.snap_to(1, Vec2::new(4.0, 4.0));
        assert_eq!(ctrl.record(), Vec2::new(-4.0, -4.0));
        ctrl.start();
        assert_eq!(ctrl.record(), Vec2::ZERO);
    }

    #[test]
    fn validate_snap_config_rejects_impossible_spring_back() {
        assert_eq!(
            validate_snap_config(true, 0),
            Err(DragConfigError::SnapOnReleaseWithoutTargets)
        );
        assert!(validate_snap_config(true, 1).is_ok());
        assert!(validate_snap_config(false, 0).is_ok());
    }

    #[test]
    fn occupancy_single_owner() {
        let mut occ: Occupancy<u32, u32> = Occupancy::new();
        assert!(occ.can_receive(1));
        occ.receive(1, 100);
        assert!(!occ.can_receive(1));
        assert_eq!(occ.occupant(1), Some(&100));
        assert!(occ.can_receive(2));

        assert_eq!(occ.release(1), Some(100));
        assert!(occ.can_receive(1));
        assert_eq!(occ.release(1), None);
    }

    #[test]
    #[should_panic(expected = "second occupant")]
    fn double_receive_is_fatal() {
        let mut occ: Occupancy<u32, u32> = Occupancy::new();
        occ.receive(1, 100);
        occ.receive(1, 101);
    }

    #[test]
    fn evict_clears_by_occupant() {
        let mut occ: Occupancy<u32, u32> = Occupancy::new();
        occ.receive(1, 100);
        occ.receive(2, 200);
        assert_eq!(occ.evict(&100), Some(1));
        assert!(occ.can_receive(1));
        assert!(!occ.can_receive(2));
        assert_eq!(occ.evict(&100), None);
    }
}
