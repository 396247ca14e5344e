// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Pointer: pointer events and the per-box pointer state machine.
//!
//! This crate holds the pieces of mouse handling that are independent of any
//! particular box tree:
//!
//! - [`Buttons`] and [`Modifiers`] bitmasks.
//! - Event payloads ([`ClickEvent`], [`MotionEvent`], [`DragEvent`]).
//! - The tri-state [`Response`] consumption model. Callbacks return
//!   `Some(true)` to consume, `Some(false)` to pass, or `None` for the
//!   per-event default — and the default is *asymmetric*: click-class events
//!   (press/release/drag) treat `None` as consumed, while motion-class
//!   events (hover/unhover/motion) treat only an explicit `Some(true)` as
//!   consumed. Overlapping hover regions depend on this asymmetry: a hover
//!   callback that returns `None` must never block a sibling region from
//!   also hovering.
//! - [`PointerState`]: the per-box hover/pressed/dragging state, with the
//!   transition rules for press-bit merging, release pairing, and the
//!   leave-voids-presses rule.
//! - [`PointerHandlers`]: optional callback slots, generic over the host
//!   context and node key so the dispatching layer owns the actual routing.
//!
//! Dragging deserves a note: a press never starts a drag by itself. Fast
//! pointer motion can leave a box's hit area before the first drag event
//! arrives, so drag continuation must not be gated on hit testing — instead
//! a box is explicitly marked dragging (see [`PointerState::start_drag`])
//! and drag events flow to it until [`PointerState::stop_drag`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod event;
mod handlers;
mod state;

pub use event::{Buttons, ClickEvent, DragEvent, Modifiers, MotionEvent};
pub use handlers::{ClickCallback, CoordCheck, DragCallback, MotionCallback, PointerHandlers};
pub use state::PointerState;

/// Tri-state result of a pointer callback.
///
/// `Some(true)` consumes the event, `Some(false)` explicitly passes it on,
/// and `None` defers to the per-event-class default (see the crate docs).
pub type Response = Option<bool>;

/// Returns whether a click-class callback result consumes the event.
///
/// Click-class events are press, release and drag: a configured callback
/// that returns `None` consumes, and only an explicit `Some(false)` lets the
/// event propagate.
pub fn click_consumed(response: Response) -> bool {
    response.unwrap_or(true)
}

/// Returns whether a motion-class callback result consumes the event.
///
/// Motion-class events are hover, unhover and motion: only an explicit
/// `Some(true)` consumes. `None` never blocks other overlapping regions.
pub fn motion_consumed(response: Response) -> bool {
    response == Some(true)
}
