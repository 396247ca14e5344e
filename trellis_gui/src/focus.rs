// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus capability: click-to-focus, keyboard gating, and the visual
//! raise-to-top variant.

use std::rc::Rc;

use trellis_box::{NodeId, ZIndex};

use crate::Gui;
use crate::error::GuiError;

/// Focus transition callback `(gui, focus box)`.
pub type FocusCallback = Rc<dyn Fn(&mut Gui, NodeId)>;

/// Options for [`Gui::make_focusable`].
#[derive(Default)]
pub struct FocusOptions {
    /// Called after this box takes focus.
    pub on_take: Option<FocusCallback>,
    /// Called after this box loses focus.
    pub on_lose: Option<FocusCallback>,
    /// When true, focus transitions walk this box's subtree and toggle the
    /// `has_focus` flag of every keyboard handler in it, gating which
    /// handlers receive key and text events.
    pub gate_keyboard: bool,
    /// When true, taking focus also raises this box to the top of its
    /// siblings, and a click that took focus is consumed and re-dispatched
    /// so the now-topmost handlers get first refusal on the same click.
    pub raise_on_focus: bool,
}

impl core::fmt::Debug for FocusOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FocusOptions")
            .field("on_take", &self.on_take.is_some())
            .field("on_lose", &self.on_lose.is_some())
            .field("gate_keyboard", &self.gate_keyboard)
            .field("raise_on_focus", &self.raise_on_focus)
            .finish()
    }
}

pub(crate) struct FocusNode {
    pub(crate) on_take: Option<FocusCallback>,
    pub(crate) on_lose: Option<FocusCallback>,
    pub(crate) gate_keyboard: bool,
    pub(crate) raise_on_focus: bool,
    /// z value to restore when a raise-on-focus box loses focus.
    pub(crate) original_z: i32,
}

impl Gui {
    /// Make a node focusable.
    ///
    /// The node joins the focus stack and becomes pointer-reactive: a click
    /// inside it takes focus (without consuming the click, unless
    /// `raise_on_focus` applies), and a click outside drops its focus.
    pub fn make_focusable(&mut self, id: NodeId, options: FocusOptions) -> Result<(), GuiError> {
        if !self.tree.is_alive(id) {
            return Err(GuiError::DeadNode(id));
        }
        let original_z = self.tree.z_of(id).unwrap_or(0);
        self.focus.insert(
            id,
            FocusNode {
                on_take: options.on_take,
                on_lose: options.on_lose,
                gate_keyboard: options.gate_keyboard,
                raise_on_focus: options.raise_on_focus,
                original_z,
            },
        );
        self.focus_stack.register(id);
        self.ensure_pointer(id);
        self.register(id);
        Ok(())
    }

    /// Give a focusable node focus.
    ///
    /// Demotes the previous owner (its lose-focus side effects run first),
    /// reorders the focus stack, applies keyboard gating and the optional
    /// z-raise, then fires the take-focus callback. Returns whether a
    /// transition actually occurred; re-taking focus is a no-op.
    pub fn take_focus(&mut self, id: NodeId) -> bool {
        let Some(change) = self.focus_stack.take(id) else {
            return false;
        };
        if let Some(lost) = change.lost {
            self.on_focus_lost(lost);
        }
        self.on_focus_gained(id);
        true
    }

    /// Drop a node's focus without promoting anyone (the outside-click
    /// path). Returns whether a transition occurred.
    pub fn release_focus(&mut self, id: NodeId) -> bool {
        if self.focus_stack.release(id) {
            self.on_focus_lost(id);
            true
        } else {
            false
        }
    }

    /// Drop a node's focus and promote the most recently focused other
    /// member of the stack (the dismissal path). Returns the promoted node.
    pub fn yield_focus(&mut self, id: NodeId) -> Option<NodeId> {
        if !self.focus_stack.release(id) {
            return None;
        }
        self.on_focus_lost(id);
        let next = self
            .focus_stack
            .entries()
            .iter()
            .copied()
            .find(|m| *m != id)?;
        self.take_focus(next);
        Some(next)
    }

    /// The currently focused node, if any.
    pub fn current_focus(&self) -> Option<NodeId> {
        self.focus_stack.current()
    }

    /// Returns whether the given node is focused.
    pub fn is_focused(&self, id: NodeId) -> bool {
        self.focus_stack.is_focused(id)
    }

    fn on_focus_gained(&mut self, id: NodeId) {
        log::debug!("focus gained by {id:?}");
        self.set_subtree_keyboard_focus(id, true);
        if self
            .focus
            .get(&id)
            .is_some_and(|f| f.raise_on_focus)
        {
            self.set_z(id, ZIndex::Top);
        }
        let cb = self.focus.get(&id).and_then(|f| f.on_take.clone());
        if let Some(cb) = cb {
            cb(self, id);
        }
    }

    fn on_focus_lost(&mut self, id: NodeId) {
        log::debug!("focus lost by {id:?}");
        self.set_subtree_keyboard_focus(id, false);
        let restore = self
            .focus
            .get(&id)
            .and_then(|f| f.raise_on_focus.then_some(f.original_z));
        if let Some(z) = restore
            && self.tree.parent_of(id).is_some()
        {
            self.set_z(id, ZIndex::Value(z));
        }
        let cb = self.focus.get(&id).and_then(|f| f.on_lose.clone());
        if let Some(cb) = cb {
            cb(self, id);
        }
    }

    /// Walk the subtree and toggle keyboard-handler focus flags, when this
    /// focus box gates keyboards at all.
    fn set_subtree_keyboard_focus(&mut self, id: NodeId, value: bool) {
        if !self.focus.get(&id).is_some_and(|f| f.gate_keyboard) {
            return;
        }
        let mut members = vec![id];
        members.extend(self.tree.descendants(id));
        for member in members {
            if let Some(handler) = self.keyboard.get_mut(&member) {
                handler.has_focus = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxDefinition, GuiKeyboardHandler, KeyMap};
    use std::cell::RefCell;

    fn focusable(gui: &mut Gui, log: &Rc<RefCell<Vec<String>>>, name: &'static str) -> NodeId {
        let id = gui
            .insert(gui.root(), BoxDefinition::sized(50.0, 50.0))
            .unwrap();
        let take_log = Rc::clone(log);
        let lose_log = Rc::clone(log);
        gui.make_focusable(
            id,
            FocusOptions {
                on_take: Some(Rc::new(move |_, _| {
                    take_log.borrow_mut().push(format!("take {name}"));
                })),
                on_lose: Some(Rc::new(move |_, _| {
                    lose_log.borrow_mut().push(format!("lose {name}"));
                })),
                ..FocusOptions::default()
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn single_owner_with_stack_reorder() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut gui = Gui::new(800.0, 600.0);
        let first = focusable(&mut gui, &log, "first");
        let second = focusable(&mut gui, &log, "second");

        assert!(gui.take_focus(first));
        assert!(gui.is_focused(first));
        assert!(!gui.is_focused(second));
        assert_eq!(log.borrow().as_slice(), &["take first"]);

        assert!(gui.take_focus(second));
        assert!(gui.is_focused(second));
        assert!(!gui.is_focused(first));
        assert_eq!(gui.focus_stack.entries(), &[second, first]);
        assert_eq!(
            log.borrow().as_slice(),
            &["take first", "lose first", "take second"]
        );

        // Re-taking focus is a no-op: no duplicate callbacks.
        assert!(!gui.take_focus(second));
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn yield_focus_promotes_the_previous_owner() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut gui = Gui::new(800.0, 600.0);
        let first = focusable(&mut gui, &log, "first");
        let second = focusable(&mut gui, &log, "second");
        gui.take_focus(first);
        gui.take_focus(second);
        log.borrow_mut().clear();

        assert_eq!(gui.yield_focus(second), Some(first));
        assert!(gui.is_focused(first));
        assert_eq!(log.borrow().as_slice(), &["lose second", "take first"]);
    }

    #[test]
    fn release_focus_promotes_nobody() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut gui = Gui::new(800.0, 600.0);
        let first = focusable(&mut gui, &log, "first");
        let _second = focusable(&mut gui, &log, "second");
        gui.take_focus(first);

        assert!(gui.release_focus(first));
        assert_eq!(gui.current_focus(), None);
        assert!(!gui.release_focus(first));
    }

    #[test]
    fn keyboard_gating_walks_the_subtree() {
        let mut gui = Gui::new(800.0, 600.0);
        let window = gui
            .insert(gui.root(), BoxDefinition::sized(100.0, 100.0))
            .unwrap();
        let field = gui.insert(window, BoxDefinition::sized(80.0, 20.0)).unwrap();
        gui.set_keyboard(field, GuiKeyboardHandler::focus_gated(KeyMap::new()))
            .unwrap();
        gui.make_focusable(
            window,
            FocusOptions {
                gate_keyboard: true,
                ..FocusOptions::default()
            },
        )
        .unwrap();

        assert!(!gui.keyboard[&field].active());
        gui.take_focus(window);
        assert!(gui.keyboard[&field].active());
        gui.release_focus(window);
        assert!(!gui.keyboard[&field].active());
    }

    #[test]
    fn raise_on_focus_restores_z_on_loss() {
        let mut gui = Gui::new(800.0, 600.0);
        let back = gui
            .insert_with_z(gui.root(), BoxDefinition::sized(50.0, 50.0), 1)
            .unwrap();
        let front = gui
            .insert_with_z(gui.root(), BoxDefinition::sized(50.0, 50.0), 2)
            .unwrap();
        gui.make_focusable(
            back,
            FocusOptions {
                raise_on_focus: true,
                ..FocusOptions::default()
            },
        )
        .unwrap();
        gui.make_focusable(front, FocusOptions::default()).unwrap();

        gui.take_focus(back);
        let children = gui.tree().children_of(gui.root());
        assert_eq!(*children.last().unwrap(), back, "focused box raised to top");

        gui.take_focus(front);
        assert_eq!(gui.tree().z_of(back), Some(1), "original z restored");
    }

    #[test]
    fn killing_the_focused_node_unregisters_silently() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut gui = Gui::new(800.0, 600.0);
        let first = focusable(&mut gui, &log, "first");
        let second = focusable(&mut gui, &log, "second");
        gui.take_focus(first);
        log.borrow_mut().clear();

        gui.kill(first);
        assert_eq!(gui.current_focus(), None);
        assert_eq!(gui.focus_stack.entries(), &[second]);
        assert!(log.borrow().is_empty(), "removal fires no focus callbacks");
    }
}
