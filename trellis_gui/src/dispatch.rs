// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The event dispatch loops: walking the handler stack, hit testing, and
//! the pending re-dispatch queue.

use trellis_box::NodeId;
use trellis_keyboard::run_actions;
use trellis_pointer::{
    ClickEvent, DragEvent, Modifiers, MotionEvent, Response, click_consumed, motion_consumed,
};

use crate::Gui;

/// One input event as fed to [`Gui::handle`].
///
/// The host engine normally uses the per-event convenience methods
/// ([`Gui::on_mouse_press`] and friends); this type exists so a handler can
/// capture an event and hand it to [`Gui::request_redispatch`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// A mouse button went down.
    Press(ClickEvent),
    /// A mouse button came up.
    Release(ClickEvent),
    /// The pointer moved with no buttons held.
    Motion(MotionEvent),
    /// The pointer moved with buttons held.
    Drag(DragEvent),
    /// A key went down.
    KeyPress {
        /// Platform scancode.
        key: u32,
        /// Modifiers held.
        modifiers: Modifiers,
    },
    /// A key came up.
    KeyRelease {
        /// Platform scancode.
        key: u32,
        /// Modifiers held.
        modifiers: Modifiers,
    },
    /// Text input.
    Text(char),
}

impl Gui {
    /// Feed one input event through the handler stack.
    ///
    /// Returns whether the event was consumed. Events arriving while a
    /// dispatch is already running (a callback feeding events back in) are
    /// queued and run after the current walk completes, never recursively;
    /// queued events report unconsumed to the re-entrant caller.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        if self.dispatching {
            self.pending.push_back(event);
            return false;
        }
        self.dispatching = true;
        let consumed = self.dispatch(&event);
        while let Some(next) = self.pending.pop_front() {
            self.dispatch(&next);
        }
        self.dispatching = false;
        consumed
    }

    /// Queue an event to re-run after the current dispatch walk completes.
    ///
    /// This is the supported way to react to a mid-dispatch handler-stack
    /// change (such as a z-raise): consume the in-flight event and request it
    /// again, and the re-run sees the updated stack. The queue is drained
    /// iteratively, so a handler requesting re-dispatch never recurses into
    /// the dispatcher.
    pub fn request_redispatch(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    /// Mouse button pressed. Returns whether the event was consumed.
    pub fn on_mouse_press(&mut self, event: ClickEvent) -> bool {
        self.handle(InputEvent::Press(event))
    }

    /// Mouse button released. Returns whether the event was consumed.
    pub fn on_mouse_release(&mut self, event: ClickEvent) -> bool {
        self.handle(InputEvent::Release(event))
    }

    /// Pointer moved with no buttons held. Returns whether the event was
    /// consumed.
    pub fn on_mouse_motion(&mut self, event: MotionEvent) -> bool {
        self.handle(InputEvent::Motion(event))
    }

    /// Pointer moved with buttons held. Returns whether the event was
    /// consumed.
    pub fn on_mouse_drag(&mut self, event: DragEvent) -> bool {
        self.handle(InputEvent::Drag(event))
    }

    /// Key pressed. Returns whether the event was consumed.
    pub fn on_key_press(&mut self, key: u32, modifiers: Modifiers) -> bool {
        self.handle(InputEvent::KeyPress { key, modifiers })
    }

    /// Key released. Returns whether the event was consumed.
    pub fn on_key_release(&mut self, key: u32, modifiers: Modifiers) -> bool {
        self.handle(InputEvent::KeyRelease { key, modifiers })
    }

    /// Text input. Returns whether the event was consumed.
    pub fn on_text(&mut self, ch: char) -> bool {
        self.handle(InputEvent::Text(ch))
    }

    fn dispatch(&mut self, event: &InputEvent) -> bool {
        log::trace!("dispatching {event:?}");
        match event {
            InputEvent::Press(e) => self.dispatch_press(e),
            InputEvent::Release(e) => self.dispatch_release(e),
            InputEvent::Motion(e) => self.dispatch_motion(e),
            InputEvent::Drag(e) => self.dispatch_drag(e),
            InputEvent::KeyPress { key, modifiers } => self.dispatch_key(*key, *modifiers, true),
            InputEvent::KeyRelease { key, modifiers } => self.dispatch_key(*key, *modifiers, false),
            InputEvent::Text(ch) => self.dispatch_text(*ch),
        }
    }

    /// Snapshot of the handler stack in dispatch order (top first).
    ///
    /// Dispatch walks a snapshot: a callback that re-registers nodes mutates
    /// the live stack, and the in-flight event keeps the order it started
    /// with (see [`Gui::request_redispatch`]).
    fn stack_top_down(&self) -> Vec<NodeId> {
        let mut ids = self.handler_stack.clone();
        ids.reverse();
        ids
    }

    /// Whether press routing should consider this node: a press-class
    /// callback is configured, or a built-in press behavior (focus, drag,
    /// selection drawing) applies.
    fn press_interest(&self, id: NodeId) -> bool {
        self.pointer.get(&id).is_some_and(|p| p.handlers.wants_press())
            || self.focus.contains_key(&id)
            || self.drags.contains_key(&id)
            || self.surfaces.contains_key(&id)
    }

    fn dispatch_press(&mut self, event: &ClickEvent) -> bool {
        for id in self.stack_top_down() {
            if !self.tree.is_alive(id) {
                continue;
            }
            if self.hit_inside(id, event.point) {
                if self.press_interest(id)
                    && let Some(p) = self.pointer.get_mut(&id)
                {
                    p.state.note_press(event.buttons);
                }

                // Click-to-focus. The plain variant takes focus without
                // consuming, so whatever sits underneath still reacts. The
                // raise variant reorders the handler stack, so it consumes
                // and re-dispatches the press against the new order; on the
                // re-run the box is already focused and passes the event on.
                if self.focus.contains_key(&id) {
                    let raise = self.focus.get(&id).is_some_and(|f| f.raise_on_focus);
                    if self.take_focus(id) && raise {
                        self.request_redispatch(InputEvent::Press(*event));
                        return true;
                    }
                    if !self.tree.is_alive(id) {
                        continue;
                    }
                }

                let mut consumed = false;
                if self.drags.contains_key(&id) {
                    self.begin_drag(id);
                    consumed = true;
                }
                if self.surfaces.contains_key(&id) {
                    self.begin_drawing(id, event);
                    consumed = true;
                }
                let cb = self.pointer.get(&id).and_then(|p| p.handlers.on_press.clone());
                if let Some(cb) = cb {
                    let response = cb(self, id, event);
                    consumed = click_consumed(response) || consumed;
                }
                if consumed {
                    log::trace!("press consumed by {id:?}");
                    return true;
                }
            } else {
                if self.is_focused(id) {
                    self.release_focus(id);
                    if !self.tree.is_alive(id) {
                        continue;
                    }
                }
                let cb = self
                    .pointer
                    .get(&id)
                    .and_then(|p| p.handlers.on_press_outside.clone());
                if let Some(cb) = cb {
                    // A press outside can never consume.
                    let _ = cb(self, id, event);
                }
            }
        }
        false
    }

    fn dispatch_release(&mut self, event: &ClickEvent) -> bool {
        for id in self.stack_top_down() {
            if !self.tree.is_alive(id) {
                continue;
            }
            let Some(state) = self.pointer.get(&id).map(|p| p.state) else {
                continue;
            };
            // A release only pairs with a press this box actually saw.
            if !state.release_pairs_with_press(event.buttons) {
                continue;
            }
            let dragging = state.dragging;
            let wants_release = self
                .pointer
                .get(&id)
                .is_some_and(|p| p.handlers.wants_release());
            let builtin = dragging && (self.drags.contains_key(&id) || self.surfaces.contains_key(&id));
            if !wants_release && !builtin {
                continue;
            }
            // A dragged box may be released anywhere; the gesture owns it.
            // Everything else requires the release to land inside.
            if !dragging && !self.hit_inside(id, event.point) {
                continue;
            }

            let mut consumed = false;
            if dragging && self.drags.contains_key(&id) {
                self.end_drag(id);
                consumed = true;
            }
            if dragging && self.surfaces.contains_key(&id) {
                self.finish_drawing(id, event);
                consumed = true;
            }
            let cb = self.pointer.get(&id).and_then(|p| p.handlers.on_release.clone());
            if let Some(cb) = cb {
                let response = cb(self, id, event);
                consumed = click_consumed(response) || consumed;
            }
            // Released bits clear after the callback, which still observed
            // the in-flight pressed state.
            if let Some(p) = self.pointer.get_mut(&id) {
                p.state.note_release(event.buttons);
            }
            if consumed {
                log::trace!("release consumed by {id:?}");
                return true;
            }
        }
        false
    }

    fn dispatch_motion(&mut self, event: &MotionEvent) -> bool {
        for id in self.stack_top_down() {
            if !self.tree.is_alive(id) {
                continue;
            }
            let Some(node) = self.pointer.get(&id) else {
                continue;
            };
            let hovered = node.state.hovered;
            let inside = self.hit_inside(id, event.point);
            let mut response: Response = None;
            if inside {
                if !hovered {
                    if let Some(p) = self.pointer.get_mut(&id) {
                        p.state.enter();
                    }
                    let cb = self.pointer.get(&id).and_then(|p| p.handlers.on_hover.clone());
                    if let Some(cb) = cb {
                        response = cb(self, id, event);
                    }
                }
                // Hover gets the first look; an explicit `true` from it
                // claims the movement and suppresses this box's motion.
                if !motion_consumed(response) {
                    let cb = self.pointer.get(&id).and_then(|p| p.handlers.on_motion.clone());
                    if let Some(cb) = cb {
                        response = cb(self, id, event);
                    }
                }
            } else if hovered {
                // Leaving voids any partial press (see `PointerState::leave`).
                if let Some(p) = self.pointer.get_mut(&id) {
                    p.state.leave();
                }
                let cb = self.pointer.get(&id).and_then(|p| p.handlers.on_unhover.clone());
                if let Some(cb) = cb {
                    response = cb(self, id, event);
                }
            }
            // Motion-class consumption is opt-in: `None` from any of the
            // three never blocks overlapping regions from also hovering.
            if motion_consumed(response) {
                log::trace!("motion consumed by {id:?}");
                return true;
            }
        }
        false
    }

    fn dispatch_drag(&mut self, event: &DragEvent) -> bool {
        for id in self.stack_top_down() {
            if !self.tree.is_alive(id) {
                continue;
            }
            // Drag routing is gated on the dragging flag, never on hit
            // testing: fast motion leaves the hit area before the event
            // arrives, and the gesture must not lose its box.
            if !self.pointer.get(&id).is_some_and(|p| p.state.dragging) {
                continue;
            }
            let mut consumed = false;
            if self.drags.contains_key(&id) {
                self.handle_drag_move(id, event);
                consumed = true;
            }
            if self.surfaces.contains_key(&id) {
                self.update_drawing(id, event);
                consumed = true;
            }
            let cb = self.pointer.get(&id).and_then(|p| p.handlers.on_drag.clone());
            if let Some(cb) = cb {
                let response = cb(self, id, event);
                consumed = click_consumed(response) || consumed;
            }
            if consumed {
                return true;
            }
        }
        false
    }

    fn dispatch_key(&mut self, key: u32, modifiers: Modifiers, press: bool) -> bool {
        for id in self.stack_top_down() {
            let Some(handler) = self.keyboard.get(&id) else {
                continue;
            };
            if !handler.active() {
                continue;
            }
            let callbacks = if press {
                handler.keymap.press_callbacks(key, modifiers)
            } else {
                handler.keymap.release_callbacks(key, modifiers)
            };
            if callbacks.is_empty() {
                continue;
            }
            if run_actions(self, &callbacks) {
                log::trace!("key {key} consumed by {id:?}");
                return true;
            }
        }
        false
    }

    fn dispatch_text(&mut self, ch: char) -> bool {
        for id in self.stack_top_down() {
            let Some(handler) = self.keyboard.get(&id) else {
                continue;
            };
            if !handler.active() {
                continue;
            }
            let callbacks = handler.keymap.text_callbacks(ch);
            if callbacks.is_empty() {
                continue;
            }
            if run_actions(self, &callbacks) {
                return true;
            }
        }
        false
    }
}
