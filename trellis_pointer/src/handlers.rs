// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Optional callback slots for a mouse-reactive box.

use alloc::rc::Rc;
use kurbo::Point;

use crate::Response;
use crate::event::{ClickEvent, DragEvent, MotionEvent};

/// Callback for press, press-outside and release events.
///
/// `C` is the host context threaded through dispatch (typically the GUI
/// itself) and `K` the node key of the box the callback is attached to.
pub type ClickCallback<C, K> = Rc<dyn Fn(&mut C, K, &ClickEvent) -> Response>;

/// Callback for hover, unhover and motion events.
pub type MotionCallback<C, K> = Rc<dyn Fn(&mut C, K, &MotionEvent) -> Response>;

/// Callback for drag events.
pub type DragCallback<C, K> = Rc<dyn Fn(&mut C, K, &DragEvent) -> Response>;

/// Extra hit-test predicate supplied externally, e.g. by a viewport that
/// wants clipped-out descendants to stop reacting to the pointer. The event
/// is only handled when the box rect contains the point *and* this predicate
/// (when present) returns true.
pub type CoordCheck<C, K> = Rc<dyn Fn(&C, K, Point) -> bool>;

/// The set of pointer callbacks a box is configured with.
///
/// Every slot is optional; an absent slot means "this event is not
/// applicable here" and the event propagates to other handlers. Which slots
/// are present also feeds the should-handle predicates: a box with no press
/// callback does not participate in press routing at all.
pub struct PointerHandlers<C, K> {
    /// Called when a button is pressed inside the box.
    pub on_press: Option<ClickCallback<C, K>>,
    /// Called when a button is pressed outside the box. Can never consume.
    pub on_press_outside: Option<ClickCallback<C, K>>,
    /// Called when a button is released inside the box, if the press paired.
    pub on_release: Option<ClickCallback<C, K>>,
    /// Called when the pointer enters the box.
    pub on_hover: Option<MotionCallback<C, K>>,
    /// Called when the pointer leaves the box.
    pub on_unhover: Option<MotionCallback<C, K>>,
    /// Called when the pointer moves within the box.
    pub on_motion: Option<MotionCallback<C, K>>,
    /// Called while the box is being dragged.
    pub on_drag: Option<DragCallback<C, K>>,
}

impl<C, K> Default for PointerHandlers<C, K> {
    fn default() -> Self {
        Self {
            on_press: None,
            on_press_outside: None,
            on_release: None,
            on_hover: None,
            on_unhover: None,
            on_motion: None,
            on_drag: None,
        }
    }
}

impl<C, K> Clone for PointerHandlers<C, K> {
    fn clone(&self) -> Self {
        Self {
            on_press: self.on_press.clone(),
            on_press_outside: self.on_press_outside.clone(),
            on_release: self.on_release.clone(),
            on_hover: self.on_hover.clone(),
            on_unhover: self.on_unhover.clone(),
            on_motion: self.on_motion.clone(),
            on_drag: self.on_drag.clone(),
        }
    }
}

impl<C, K> core::fmt::Debug for PointerHandlers<C, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PointerHandlers")
            .field("on_press", &self.on_press.is_some())
            .field("on_press_outside", &self.on_press_outside.is_some())
            .field("on_release", &self.on_release.is_some())
            .field("on_hover", &self.on_hover.is_some())
            .field("on_unhover", &self.on_unhover.is_some())
            .field("on_motion", &self.on_motion.is_some())
            .field("on_drag", &self.on_drag.is_some())
            .finish()
    }
}

impl<C, K> PointerHandlers<C, K> {
    /// No callbacks at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler set that swallows every pointer event.
    ///
    /// Useful for modal shields: the box consumes everything so nothing
    /// underneath reacts.
    pub fn void() -> Self {
        let click: ClickCallback<C, K> = Rc::new(|_, _, _| Some(true));
        let motion: MotionCallback<C, K> = Rc::new(|_, _, _| Some(true));
        let drag: DragCallback<C, K> = Rc::new(|_, _, _| Some(true));
        Self {
            on_press: Some(Rc::clone(&click)),
            on_press_outside: Some(Rc::clone(&click)),
            on_release: Some(click),
            on_hover: Some(Rc::clone(&motion)),
            on_unhover: Some(Rc::clone(&motion)),
            on_motion: Some(motion),
            on_drag: Some(drag),
        }
    }

    /// Whether press routing should consider this box at all.
    pub fn wants_press(&self) -> bool {
        self.on_press.is_some() || self.on_press_outside.is_some()
    }

    /// Whether release routing should consider this box (the pairing check
    /// against the pressed mask is separate).
    pub fn wants_release(&self) -> bool {
        self.on_release.is_some()
    }

    /// Whether hover/unhover routing should consider this box.
    pub fn wants_hover(&self) -> bool {
        self.on_hover.is_some() || self.on_unhover.is_some()
    }

    /// Whether motion routing should consider this box.
    pub fn wants_motion(&self) -> bool {
        self.on_motion.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_handlers_want_nothing() {
        let handlers: PointerHandlers<(), u32> = PointerHandlers::new();
        assert!(!handlers.wants_press());
        assert!(!handlers.wants_release());
        assert!(!handlers.wants_hover());
        assert!(!handlers.wants_motion());
    }

    #[test]
    fn void_swallows_everything() {
        let handlers: PointerHandlers<(), u32> = PointerHandlers::void();
        assert!(handlers.wants_press());
        assert!(handlers.wants_release());
        assert!(handlers.wants_hover());
        assert!(handlers.wants_motion());

        let ev = ClickEvent {
            point: Point::ZERO,
            buttons: crate::Buttons::LEFT,
            modifiers: crate::Modifiers::empty(),
        };
        let response = handlers.on_press.as_ref().unwrap()(&mut (), 7, &ev);
        assert_eq!(response, Some(true));
    }

    #[test]
    fn unhover_presence_enables_hover_routing() {
        let handlers: PointerHandlers<(), u32> = PointerHandlers {
            on_unhover: Some(Rc::new(|_, _, _| None)),
            ..PointerHandlers::new()
        };
        assert!(handlers.wants_hover());
        assert!(!handlers.wants_motion());
    }
}
