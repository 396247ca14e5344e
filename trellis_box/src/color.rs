// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RGBA color values for box backgrounds.

/// An RGBA color with 8 bits per channel.
///
/// This is purely a value carried by box definitions for the (out-of-scope)
/// renderer to consume; nothing in this workspace rasterizes it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel; 255 is fully opaque.
    pub a: u8,
}

impl Color {
    /// An opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color from RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Light grey.
    pub const LIGHT_GREY: Self = Self::rgb(160, 160, 190);
    /// Grey.
    pub const GREY: Self = Self::rgb(130, 130, 170);
    /// Dark grey.
    pub const DARK_GREY: Self = Self::rgb(100, 100, 150);
    /// Bright cyan-blue used for active elements.
    pub const ACTIVE_BLUE: Self = Self::rgb(0, 200, 255);
    /// Mid blue used for passive elements.
    pub const PASSIVE_BLUE: Self = Self::rgb(0, 120, 255);
    /// Muted blue.
    pub const MUTED_BLUE: Self = Self::rgb(0, 80, 255);
}
