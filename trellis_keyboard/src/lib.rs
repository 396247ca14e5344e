// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Keyboard: chord-to-action mapping.
//!
//! A *chord* is a key code plus a modifier mask, with a further set of
//! *ignored* modifiers (num lock, caps lock and scroll lock by default).
//! Registering a chord fans the action out across every combination of its
//! ignored-modifier bits, so a latched num lock can never decide whether an
//! action fires. Lookup is then an exact `(modifier mask, key)` match — no
//! per-event normalization.
//!
//! Actions can also bind single characters for text input. Character
//! bindings live under the empty modifier mask and fire the action's press
//! and release callbacks back to back, since text input has no release
//! event of its own (and may repeat while a key is held).
//!
//! A [`KeyMap`] is a plain value; [`KeyboardHandler`] pairs one with the
//! focus gating flags: a handler only processes events when
//! `focus_required` is false or it currently has focus. Multiple actions may
//! share a chord; all of them run in registration order, and the event is
//! handled if any returns `Some(true)`.
//!
//! ```rust
//! use std::rc::Rc;
//! use trellis_keyboard::{Chord, ChordInput, KeyMap, KeyboardAction, run_actions};
//! use trellis_pointer::Modifiers;
//!
//! let mut map: KeyMap<u32> = KeyMap::new();
//! map.add(KeyboardAction {
//!     chords: vec![ChordInput::Chord(Chord::new(b'a' as u32, Modifiers::CTRL))],
//!     on_press: Some(Rc::new(|count: &mut u32| {
//!         *count += 1;
//!         Some(true)
//!     })),
//!     on_release: None,
//! });
//!
//! let mut count = 0_u32;
//! // Num lock being latched does not matter.
//! let mods = Modifiers::CTRL | Modifiers::NUMLOCK;
//! let handled = run_actions(&mut count, &map.press_callbacks(b'a' as u32, mods));
//! assert!(handled);
//! assert_eq!(count, 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;
use trellis_pointer::Modifiers;

/// Result of a keyboard action callback; `Some(true)` marks the event
/// handled.
pub type KeyResponse = Option<bool>;

/// A keyboard action callback.
pub type KeyCallback<C> = Rc<dyn Fn(&mut C) -> KeyResponse>;

/// A key code plus modifiers, with a set of modifiers to ignore.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Chord {
    /// Platform scancode of the key. Letter keys use their lowercase ASCII
    /// value by convention.
    pub key: u32,
    /// Modifiers that must be held.
    pub modifiers: Modifiers,
    /// Modifiers whose state is irrelevant. Defaults to the latched locks so
    /// that e.g. num lock never affects whether an action fires.
    pub ignored: Modifiers,
}

impl Chord {
    /// A chord with the default ignored set ([`Modifiers::LOCKS`]).
    pub const fn new(key: u32, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            ignored: Modifiers::LOCKS,
        }
    }

    /// A bare key with no required modifiers.
    pub const fn bare(key: u32) -> Self {
        Self::new(key, Modifiers::empty())
    }

    /// Build a chord by combining a list of modifiers into one mask.
    pub fn from_modifier_list(key: u32, modifiers: &[Modifiers]) -> Self {
        let combined = modifiers
            .iter()
            .fold(Modifiers::empty(), |acc, m| acc | *m);
        Self::new(key, combined)
    }
}

impl fmt::Display for Chord {
    /// Renders like `SHIFT+CTRL+A`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, _) in self.modifiers.iter_names() {
            write!(f, "{name}+")?;
        }
        let key = self.key;
        if (0x21..0x7f).contains(&key) {
            let ch = char::from_u32(key).unwrap_or('?').to_ascii_uppercase();
            write!(f, "{ch}")
        } else {
            write!(f, "#{key}")
        }
    }
}

/// A binding input: either a chord or a literal character.
///
/// Character bindings are useful when upper and lower case should be
/// distinguished without handling SHIFT by hand; they match text input
/// events rather than raw key presses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChordInput {
    /// A key-plus-modifiers chord, matched against key press/release events.
    Chord(Chord),
    /// A literal character, matched against text input events.
    Text(char),
}

/// Callbacks to run when any of the listed chords fires.
pub struct KeyboardAction<C> {
    /// Chords or characters that trigger this action.
    pub chords: Vec<ChordInput>,
    /// Called on key press (and on text input).
    pub on_press: Option<KeyCallback<C>>,
    /// Called on key release (and on text input, right after press).
    pub on_release: Option<KeyCallback<C>>,
}

impl<C> Clone for KeyboardAction<C> {
    fn clone(&self) -> Self {
        Self {
            chords: self.chords.clone(),
            on_press: self.on_press.clone(),
            on_release: self.on_release.clone(),
        }
    }
}

impl<C> fmt::Debug for KeyboardAction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardAction")
            .field("chords", &self.chords)
            .field("on_press", &self.on_press.is_some())
            .field("on_release", &self.on_release.is_some())
            .finish()
    }
}

/// Handle to a registered action, used for removal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum KeyInput {
    Code(u32),
    Char(char),
}

/// Iterate every submask of `mask`, including the empty mask and `mask`
/// itself.
fn submasks(mask: u32) -> impl Iterator<Item = u32> {
    let mut current = Some(mask);
    core::iter::from_fn(move || {
        let sub = current?;
        current = if sub == 0 { None } else { Some((sub - 1) & mask) };
        Some(sub)
    })
}

/// Mapping from keyboard inputs to actions.
///
/// Bindings are stored per exact `(modifier mask, key)` pair; the
/// ignored-modifier fan-out happens at registration time, so lookup never
/// has to strip lock bits.
pub struct KeyMap<C> {
    actions: HashMap<ActionId, KeyboardAction<C>>,
    bindings: HashMap<(u32, KeyInput), Vec<ActionId>>,
    next_id: u64,
}

impl<C> Default for KeyMap<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for KeyMap<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMap")
            .field("actions", &self.actions.len())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

impl<C> KeyMap<C> {
    /// Create an empty key map.
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            bindings: HashMap::new(),
            next_id: 0,
        }
    }

    /// Register an action under all of its chords.
    ///
    /// Each chord is bound under every combination of its ignored-modifier
    /// bits; character inputs are bound under the empty modifier mask.
    pub fn add(&mut self, action: KeyboardAction<C>) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;
        for input in &action.chords {
            match *input {
                ChordInput::Text(ch) => self.bind(0, KeyInput::Char(ch), id),
                ChordInput::Chord(chord) => {
                    for sub in submasks(chord.ignored.bits()) {
                        self.bind(chord.modifiers.bits() | sub, KeyInput::Code(chord.key), id);
                    }
                }
            }
        }
        self.actions.insert(id, action);
        id
    }

    /// Remove an action from every binding it appears in.
    ///
    /// Returns whether the action was registered.
    pub fn remove(&mut self, id: ActionId) -> bool {
        if self.actions.remove(&id).is_none() {
            return false;
        }
        self.bindings.retain(|_, ids| {
            ids.retain(|a| *a != id);
            !ids.is_empty()
        });
        true
    }

    fn bind(&mut self, modifiers: u32, key: KeyInput, id: ActionId) {
        let ids = self.bindings.entry((modifiers, key)).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    fn actions_for(&self, modifiers: u32, key: KeyInput) -> impl Iterator<Item = &KeyboardAction<C>> {
        self.bindings
            .get(&(modifiers, key))
            .into_iter()
            .flatten()
            .filter_map(|id| self.actions.get(id))
    }

    /// Press callbacks bound to this exact key and modifier mask, in
    /// registration order. The callbacks are cloned out so the caller can
    /// run them against a context that owns this map.
    pub fn press_callbacks(&self, key: u32, modifiers: Modifiers) -> Vec<KeyCallback<C>> {
        self.actions_for(modifiers.bits(), KeyInput::Code(key))
            .filter_map(|a| a.on_press.clone())
            .collect()
    }

    /// Release callbacks bound to this exact key and modifier mask, in
    /// registration order.
    pub fn release_callbacks(&self, key: u32, modifiers: Modifiers) -> Vec<KeyCallback<C>> {
        self.actions_for(modifiers.bits(), KeyInput::Code(key))
            .filter_map(|a| a.on_release.clone())
            .collect()
    }

    /// Callbacks for a text input event: each bound action contributes its
    /// press callback then its release callback, since there is no separate
    /// release event for text.
    pub fn text_callbacks(&self, ch: char) -> Vec<KeyCallback<C>> {
        let mut out = Vec::new();
        for action in self.actions_for(0, KeyInput::Char(ch)) {
            out.extend(action.on_press.clone());
            out.extend(action.on_release.clone());
        }
        out
    }

    /// Returns whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Run a batch of action callbacks in order.
///
/// Every callback runs (a handled result does not short-circuit the rest);
/// the event counts as handled if any returned `Some(true)`.
pub fn run_actions<C>(ctx: &mut C, callbacks: &[KeyCallback<C>]) -> bool {
    let mut handled = false;
    for cb in callbacks {
        if cb(ctx) == Some(true) {
            handled = true;
        }
    }
    handled
}

/// A key map paired with focus gating.
///
/// The host walks its keyboard handlers on every key/text event; a handler
/// participates only while [`KeyboardHandler::active`] is true.
pub struct KeyboardHandler<C> {
    /// The chord bindings.
    pub keymap: KeyMap<C>,
    /// When true, events are only processed while this handler has focus.
    pub focus_required: bool,
    /// Set by the focus system as focus moves through the tree.
    pub has_focus: bool,
}

impl<C> fmt::Debug for KeyboardHandler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardHandler")
            .field("keymap", &self.keymap)
            .field("focus_required", &self.focus_required)
            .field("has_focus", &self.has_focus)
            .finish()
    }
}

impl<C> KeyboardHandler<C> {
    /// A handler that always processes events.
    pub fn new(keymap: KeyMap<C>) -> Self {
        Self {
            keymap,
            focus_required: false,
            has_focus: false,
        }
    }

    /// A handler that only processes events while focused.
    pub fn focus_gated(keymap: KeyMap<C>) -> Self {
        Self {
            keymap,
            focus_required: true,
            has_focus: false,
        }
    }

    /// Returns whether this handler should process events right now.
    pub fn active(&self) -> bool {
        !self.focus_required || self.has_focus
    }
}

/// Convenience: collect the submask fan-out of a chord for inspection.
pub fn chord_fan_out(chord: &Chord) -> SmallVec<[Modifiers; 8]> {
    submasks(chord.ignored.bits())
        .map(|sub| {
            Modifiers::from_bits_truncate(chord.modifiers.bits() | sub)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;

    const KEY_A: u32 = b'a' as u32;

    fn counting_action(counter: fn(&mut u32) -> KeyResponse) -> KeyboardAction<u32> {
        KeyboardAction {
            chords: vec![ChordInput::Chord(Chord::new(KEY_A, Modifiers::CTRL))],
            on_press: Some(Rc::new(counter)),
            on_release: None,
        }
    }

    #[test]
    fn submask_enumeration_is_the_full_power_set() {
        let mask = Modifiers::LOCKS.bits();
        let subs: Vec<u32> = submasks(mask).collect();
        assert_eq!(subs.len(), 8, "three ignored bits yield eight combos");
        assert!(subs.contains(&0));
        assert!(subs.contains(&mask));
    }

    #[test]
    fn ignored_modifiers_do_not_gate_actions() {
        let mut map: KeyMap<u32> = KeyMap::new();
        map.add(counting_action(|n| {
            *n += 1;
            Some(true)
        }));

        let mut count = 0_u32;
        for extra in [
            Modifiers::empty(),
            Modifiers::NUMLOCK,
            Modifiers::CAPSLOCK,
            Modifiers::NUMLOCK | Modifiers::SCROLLLOCK,
        ] {
            let handled = run_actions(
                &mut count,
                &map.press_callbacks(KEY_A, Modifiers::CTRL | extra),
            );
            assert!(handled);
        }
        assert_eq!(count, 4);

        // A non-ignored modifier still gates.
        assert!(
            map.press_callbacks(KEY_A, Modifiers::CTRL | Modifiers::SHIFT)
                .is_empty()
        );
        assert!(map.press_callbacks(KEY_A, Modifiers::empty()).is_empty());
    }

    #[test]
    fn removal_clears_every_fanned_out_binding() {
        let mut map: KeyMap<u32> = KeyMap::new();
        let id = map.add(counting_action(|_| Some(true)));
        assert!(!map.is_empty());

        assert!(map.remove(id));
        assert!(map.is_empty());
        assert!(map.press_callbacks(KEY_A, Modifiers::CTRL).is_empty());
        assert!(
            map.press_callbacks(KEY_A, Modifiers::CTRL | Modifiers::NUMLOCK)
                .is_empty()
        );
        assert!(!map.remove(id));
    }

    #[test]
    fn shared_chord_runs_all_actions_in_registration_order() {
        let mut map: KeyMap<Vec<u32>> = KeyMap::new();
        for tag in [1_u32, 2, 3] {
            map.add(KeyboardAction {
                chords: vec![ChordInput::Chord(Chord::bare(KEY_A))],
                on_press: Some(Rc::new(move |log: &mut Vec<u32>| {
                    log.push(tag);
                    // Only the second action claims the event.
                    (tag == 2).then_some(true)
                })),
                on_release: None,
            });
        }

        let mut log = Vec::new();
        let handled = run_actions(&mut log, &map.press_callbacks(KEY_A, Modifiers::empty()));
        assert!(handled);
        assert_eq!(log, vec![1, 2, 3], "a handled result must not short-circuit");
    }

    #[test]
    fn text_bindings_fire_press_then_release_under_no_modifiers() {
        let mut map: KeyMap<Vec<&'static str>> = KeyMap::new();
        map.add(KeyboardAction {
            chords: vec![ChordInput::Text('A')],
            on_press: Some(Rc::new(|log: &mut Vec<&'static str>| {
                log.push("press");
                None
            })),
            on_release: Some(Rc::new(|log: &mut Vec<&'static str>| {
                log.push("release");
                Some(true)
            })),
        });

        let mut log = Vec::new();
        let handled = run_actions(&mut log, &map.text_callbacks('A'));
        assert!(handled);
        assert_eq!(log, vec!["press", "release"]);
        // Lowercase is a different character entirely.
        assert!(map.text_callbacks('a').is_empty());
    }

    #[test]
    fn chord_display_is_human_readable() {
        let chord = Chord::new(KEY_A, Modifiers::SHIFT | Modifiers::CTRL);
        assert_eq!(format!("{chord}"), "SHIFT+CTRL+A");
        assert_eq!(format!("{}", Chord::bare(KEY_A)), "A");
        assert_eq!(format!("{}", Chord::bare(0xFF0D)), "#65293");
    }

    #[test]
    fn chord_from_modifier_list_combines_masks() {
        let chord =
            Chord::from_modifier_list(KEY_A, &[Modifiers::CTRL, Modifiers::SHIFT]);
        assert_eq!(chord.modifiers, Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(chord.ignored, Modifiers::LOCKS);
    }

    #[test]
    fn fan_out_includes_base_and_all_lock_combinations() {
        let fan = chord_fan_out(&Chord::new(KEY_A, Modifiers::CTRL));
        assert_eq!(fan.len(), 8);
        assert!(fan.contains(&Modifiers::CTRL));
        assert!(fan.contains(&(Modifiers::CTRL | Modifiers::LOCKS)));
    }

    #[test]
    fn focus_gating() {
        let handler: KeyboardHandler<u32> = KeyboardHandler::new(KeyMap::new());
        assert!(handler.active());

        let mut gated: KeyboardHandler<u32> = KeyboardHandler::focus_gated(KeyMap::new());
        assert!(!gated.active());
        gated.has_focus = true;
        assert!(gated.active());
    }
}
