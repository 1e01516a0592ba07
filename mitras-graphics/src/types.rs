//! Core types shared across the `mitras` drawing code.
//!
//! Pixel geometry uses `kurbo` points and affines. Canvas space has Y
//! pointing **down**; graph space has Y pointing **up**, so every routine
//! that maps graph coordinates to the canvas negates Y exactly once.

use std::str::FromStr;

pub use kurbo::{Affine, Line, Point, Rect, Size, Vec2};

use crate::error::GraphicsError;

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// Pixel and coordinate arithmetic is done in plain `f64`.
pub type Scalar = f64;

/// Build the linear map of a 2×2 matrix `[[m00, m01], [m10, m11]]`.
///
/// kurbo coefficients are `[a, b, c, d, e, f]` with
/// `x' = a·x + c·y + e` and `y' = b·x + d·y + f`.
#[inline]
#[must_use]
pub const fn linear_map(m00: Scalar, m01: Scalar, m10: Scalar, m11: Scalar) -> Affine {
    Affine::new([m00, m10, m01, m11, 0.0, 0.0])
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// RGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: Scalar,
    pub g: Scalar,
    pub b: Scalar,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    #[inline]
    pub const fn new(r: Scalar, g: Scalar, b: Scalar) -> Self {
        Self { r, g, b }
    }

    /// Parse a 7-character `#rrggbb` string.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidColor`] for anything else.
    pub fn from_hex(s: &str) -> Result<Self, GraphicsError> {
        let invalid = || GraphicsError::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| Scalar::from(v) / 255.0)
                .map_err(|_| invalid())
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as a lowercase `#rrggbb` string.
    #[must_use]
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Channels rounded and clamped to `0..=255`.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "channels are clamped to [0, 255] before the cast"
    )]
    #[must_use]
    pub fn to_rgb8(self) -> [u8; 3] {
        let to_u8 = |c: Scalar| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_u8(self.r), to_u8(self.g), to_u8(self.b)]
    }

    /// Adjust brightness: `light < 0` darkens toward black, `light > 0`
    /// tints toward white (`0.9` is nearly white).
    #[must_use]
    pub fn shade(self, light: Scalar) -> Self {
        let adjust = |c: Scalar| {
            if light < 0.0 {
                c * (1.0 + light)
            } else {
                (1.0 - light).mul_add(c, light)
            }
        };
        Self::new(adjust(self.r), adjust(self.g), adjust(self.b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = GraphicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// Drawing options
// ---------------------------------------------------------------------------

/// Per-expression drawing options, owned by whoever owns the expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOptions {
    /// Base color; grid lines use shades of it.
    pub color: Color,
    /// Coordinate numbers along the axes.
    pub show_coords: bool,
    /// Minor (sub-step) grid lines.
    pub show_minor: bool,
    /// When false every drawing call is a no-op.
    pub visible: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            show_coords: true,
            show_minor: true,
            visible: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
