// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer button/modifier bitmasks and event payloads.

use kurbo::{Point, Vec2};

bitflags::bitflags! {
    /// Mouse buttons, combinable into a mask.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u32 {
        /// The primary (left) button.
        const LEFT   = 1 << 0;
        /// The middle button.
        const MIDDLE = 1 << 1;
        /// The secondary (right) button.
        const RIGHT  = 1 << 2;
        /// First extra button.
        const MOUSE4 = 1 << 3;
        /// Second extra button.
        const MOUSE5 = 1 << 4;
    }
}

bitflags::bitflags! {
    /// Keyboard modifiers, as reported alongside pointer and key events.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        /// Shift.
        const SHIFT      = 1 << 0;
        /// Control.
        const CTRL       = 1 << 1;
        /// Alt/Option.
        const ALT        = 1 << 2;
        /// Caps lock latch state.
        const CAPSLOCK   = 1 << 3;
        /// Num lock latch state.
        const NUMLOCK    = 1 << 4;
        /// Windows/Super key.
        const WINDOWS    = 1 << 5;
        /// Command key.
        const COMMAND    = 1 << 6;
        /// Scroll lock latch state.
        const SCROLLLOCK = 1 << 7;
    }
}

impl Modifiers {
    /// The latched lock modifiers that chord handling ignores by default.
    pub const LOCKS: Self = Self::CAPSLOCK.union(Self::NUMLOCK).union(Self::SCROLLLOCK);
}

/// Payload for press and release events.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClickEvent {
    /// Pointer position in world coordinates.
    pub point: Point,
    /// Buttons that changed state in this event.
    pub buttons: Buttons,
    /// Modifiers held at the time of the event.
    pub modifiers: Modifiers,
}

/// Payload for hover, unhover and motion events.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MotionEvent {
    /// Pointer position in world coordinates.
    pub point: Point,
    /// Movement since the previous motion event.
    pub delta: Vec2,
}

/// Payload for drag events (motion with buttons held).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragEvent {
    /// Pointer position in world coordinates.
    pub point: Point,
    /// Movement since the previous drag event.
    pub delta: Vec2,
    /// Buttons held during the drag.
    pub buttons: Buttons,
    /// Modifiers held during the drag.
    pub modifiers: Modifiers,
}
