// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable box definitions.

use thiserror::Error;

use crate::color::Color;

/// How a dynamic dimension of a box resolves at runtime.
///
/// A dimension is dynamic when the definition leaves it as `None`; fixed
/// dimensions ignore this setting.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DynamicSizeBehaviour {
    /// Size to the bounding box of all descendant boxes.
    #[default]
    FitChildren,
    /// Size to the parent box; zero while detached.
    MatchParent,
}

/// Immutable description of a box's size and background.
///
/// Definitions are plain values: reconfiguring a box means building a new
/// definition (typically with struct-update syntax) and swapping it in with
/// [`crate::BoxTree::replace_definition`]. A definition shared between boxes
/// is never mutated through any of them.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BoxDefinition {
    /// Fixed width, or `None` to resolve dynamically.
    pub width: Option<f64>,
    /// Fixed height, or `None` to resolve dynamically.
    pub height: Option<f64>,
    /// How dynamic dimensions resolve.
    pub dynamic_size_behaviour: DynamicSizeBehaviour,
    /// Optional background color for the renderer to fill the box rect with.
    pub background: Option<Color>,
}

/// A definition was rejected at construction time.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DefinitionError {
    /// A fixed dimension was negative or not finite.
    #[error("box dimensions must be finite and non-negative, got {width:?} x {height:?}")]
    InvalidDimensions {
        /// The offending width.
        width: Option<f64>,
        /// The offending height.
        height: Option<f64>,
    },
}

impl BoxDefinition {
    /// A definition with both dimensions fixed.
    pub const fn sized(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            dynamic_size_behaviour: DynamicSizeBehaviour::FitChildren,
            background: None,
        }
    }

    /// A fully dynamic definition with the given behaviour.
    pub const fn dynamic(behaviour: DynamicSizeBehaviour) -> Self {
        Self {
            width: None,
            height: None,
            dynamic_size_behaviour: behaviour,
            background: None,
        }
    }

    /// Returns whether the width resolves dynamically.
    pub const fn width_is_dynamic(&self) -> bool {
        self.width.is_none()
    }

    /// Returns whether the height resolves dynamically.
    pub const fn height_is_dynamic(&self) -> bool {
        self.height.is_none()
    }

    /// Returns whether either dimension resolves dynamically.
    pub const fn is_dynamic(&self) -> bool {
        self.width_is_dynamic() || self.height_is_dynamic()
    }

    /// Returns whether the width tracks the parent's width.
    pub const fn width_matches_parent(&self) -> bool {
        self.width_is_dynamic()
            && matches!(self.dynamic_size_behaviour, DynamicSizeBehaviour::MatchParent)
    }

    /// Returns whether the height tracks the parent's height.
    pub const fn height_matches_parent(&self) -> bool {
        self.height_is_dynamic()
            && matches!(self.dynamic_size_behaviour, DynamicSizeBehaviour::MatchParent)
    }

    /// Validate this definition, rejecting impossible configurations.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let dim_ok = |d: Option<f64>| d.is_none_or(|v| v.is_finite() && v >= 0.0);
        if !dim_ok(self.width) || !dim_ok(self.height) {
            return Err(DefinitionError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fully_dynamic_fit_children() {
        let def = BoxDefinition::default();
        assert!(def.width_is_dynamic());
        assert!(def.height_is_dynamic());
        assert_eq!(def.dynamic_size_behaviour, DynamicSizeBehaviour::FitChildren);
        assert!(!def.width_matches_parent());
    }

    #[test]
    fn validation_rejects_bad_dimensions() {
        assert!(BoxDefinition::sized(10.0, 0.0).validate().is_ok());
        assert!(BoxDefinition::sized(-1.0, 10.0).validate().is_err());
        assert!(
            BoxDefinition {
                height: Some(f64::NAN),
                ..BoxDefinition::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn match_parent_is_per_dimension() {
        let def = BoxDefinition {
            width: Some(50.0),
            height: None,
            dynamic_size_behaviour: DynamicSizeBehaviour::MatchParent,
            background: None,
        };
        assert!(!def.width_matches_parent());
        assert!(def.height_matches_parent());
    }
}
