// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis GUI: the retained-mode integration layer.
//!
//! This crate ties the Trellis building blocks into one widget layer. A
//! [`Gui`] owns a [`trellis_box::BoxTree`] plus per-capability state, and the
//! host engine feeds it input events once per frame:
//!
//! ```text
//! engine ──► Gui::on_mouse_press / on_mouse_release / on_mouse_motion
//!            Gui::on_mouse_drag / on_key_press / on_key_release / on_text
//! ```
//!
//! ## Capability composition
//!
//! There is no widget inheritance chain. A node starts as a plain box
//! ([`Gui::insert`]) and picks up orthogonal capabilities:
//!
//! - [`Gui::set_pointer_handlers`] — mouse callbacks ([`PointerHandlers`]).
//! - [`Gui::make_focusable`] — click-to-focus membership in the focus stack,
//!   optionally gating keyboard handlers in the subtree and optionally
//!   raising the node's z-order on focus (the "visual" variant).
//! - [`Gui::set_keyboard`] — a chord keymap, optionally focus-gated.
//! - [`Gui::make_draggable`] / [`Gui::make_snap_target`] — drag gestures
//!   with optional single-occupancy snap targets.
//! - [`Gui::set_layout`] — row/column arrangement of children.
//! - [`Gui::make_selectable`] / [`Gui::make_selection_surface`] —
//!   rubber-band selection.
//!
//! Configuration is validated when a capability is attached; an invalid
//! definition is rejected with a [`GuiError`] and never becomes a node.
//! Runtime invariant violations (a node claiming membership in a parent
//! that does not hold it, a snap target receiving a second occupant) panic:
//! continuing would corrupt layout or occupancy state.
//!
//! ## Dispatch order
//!
//! Input-reactive nodes register on a handler stack as they gain
//! capabilities; dispatch walks the stack top-down, so nodes registered
//! later — children, and anything re-registered by a z-raise — get first
//! refusal. Consumption is tri-state per callback (see [`trellis_pointer`]):
//! click-class events treat a configured callback returning `None` as
//! consumed, motion-class events require an explicit `Some(true)`.
//!
//! Re-ordering a node's z value mid-dispatch re-registers its subtree,
//! which can cause remaining handlers to be skipped for the event being
//! dispatched. The supported pattern — used by the visual focus variant —
//! is to consume the event and call [`Gui::request_redispatch`]: the event
//! re-runs against the updated stack after the current dispatch completes,
//! with no recursion into the dispatcher.
//!
//! Everything is single-threaded and callback re-entrant: callbacks receive
//! `&mut Gui` and may mutate nodes, kill subtrees, or take focus; the
//! dispatcher re-checks liveness at every step.

mod dispatch;
mod drag;
mod error;
mod focus;
mod gui;
mod selection;
mod viewport;

pub use dispatch::InputEvent;
pub use drag::DragOptions;
pub use error::GuiError;
pub use focus::{FocusCallback, FocusOptions};
pub use gui::{CanReceive, Gui, SnapCallback, SnapOptions};
pub use selection::{
    SelectableCallback, SelectableOptions, SurfaceCallback, SurfaceOptions,
};

// The vocabulary types callers compose with.
pub use trellis_box::{
    BoxDefinition, BoxTree, Color, DynamicSizeBehaviour, NodeId, PositionalAnchor, Spacing, ZIndex,
};
pub use trellis_drag::DragTarget;
pub use trellis_keyboard::{Chord, ChordInput, KeyMap, KeyboardAction, KeyboardHandler};
pub use trellis_layout::LayoutDefinition;
pub use trellis_pointer::{
    Buttons, ClickEvent, DragEvent, Modifiers, MotionEvent, PointerHandlers, PointerState, Response,
};
pub use trellis_selection::SelectionRect;

/// Pointer callback slots instantiated for this GUI.
pub type GuiPointerHandlers = PointerHandlers<Gui, NodeId>;
/// Hit-test predicate instantiated for this GUI.
pub type GuiCoordCheck = trellis_pointer::CoordCheck<Gui, NodeId>;
/// Keyboard handler instantiated for this GUI.
pub type GuiKeyboardHandler = KeyboardHandler<Gui>;
