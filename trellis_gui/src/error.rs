// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;
use trellis_box::{DefinitionError, NodeId};
use trellis_drag::DragConfigError;
use trellis_layout::LayoutError;

/// A widget configuration was rejected at construction time.
///
/// These are all fail-fast errors: the offending definition is refused and
/// nothing is attached, rather than being silently coerced into something
/// runnable.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GuiError {
    /// The box definition itself was invalid.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    /// The drag/snap configuration was invalid.
    #[error(transparent)]
    DragConfig(#[from] DragConfigError),
    /// The layout definition was invalid.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// An operation referenced a node that is not alive.
    #[error("node {0:?} is not alive")]
    DeadNode(NodeId),
    /// A draggable listed a snap box that is not a snap target.
    #[error("node {0:?} is not a snap target")]
    NotASnapTarget(NodeId),
}
