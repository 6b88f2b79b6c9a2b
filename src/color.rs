// src/color.rs

//! Defines the pixel `Color` type, the palette of `NamedColor`s accepted in
//! configuration, and `ColorOrder`, the channel layout a pixel strip expects
//! on the wire.

use serde::{Deserialize, Serialize};

/// A 24-bit RGB pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "ColorValue", into = "ColorValue")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Scales every channel by `brightness`, clamped to `0.0..=1.0`.
    pub fn scaled(self, brightness: f32) -> Color {
        let factor = brightness.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * factor).round() as u8;
        Color::rgb(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Colors that can be referred to by name in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl NamedColor {
    pub fn to_rgb_color(self) -> Color {
        match self {
            NamedColor::Black => Color::BLACK,
            NamedColor::Red => Color::RED,
            NamedColor::Green => Color::GREEN,
            NamedColor::Yellow => Color::rgb(255, 255, 0),
            NamedColor::Blue => Color::BLUE,
            NamedColor::Magenta => Color::rgb(255, 0, 255),
            NamedColor::Cyan => Color::rgb(0, 255, 255),
            NamedColor::White => Color::WHITE,
        }
    }
}

/// Serialized form of a `Color`: either a name (`"red"`) or `[r, g, b]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Named(NamedColor),
    Rgb([u8; 3]),
}

impl From<ColorValue> for Color {
    fn from(value: ColorValue) -> Self {
        match value {
            ColorValue::Named(named) => named.to_rgb_color(),
            ColorValue::Rgb([r, g, b]) => Color::rgb(r, g, b),
        }
    }
}

impl From<Color> for ColorValue {
    fn from(color: Color) -> Self {
        ColorValue::Rgb([color.r, color.g, color.b])
    }
}

/// Order in which a strip expects the color channels of each pixel.
///
/// WS2812-class strips are usually GRB; the `W` variants carry a fourth,
/// white channel which is driven dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOrder {
    Rgb,
    #[default]
    Grb,
    Rgbw,
    Grbw,
}

impl ColorOrder {
    /// Number of bytes one pixel occupies on the wire.
    pub fn channel_count(self) -> usize {
        match self {
            ColorOrder::Rgb | ColorOrder::Grb => 3,
            ColorOrder::Rgbw | ColorOrder::Grbw => 4,
        }
    }

    /// Channel bytes for `color`; only the first `channel_count()` are used.
    pub fn channels(self, color: Color) -> [u8; 4] {
        let Color { r, g, b } = color;
        match self {
            ColorOrder::Rgb | ColorOrder::Rgbw => [r, g, b, 0],
            ColorOrder::Grb | ColorOrder::Grbw => [g, r, b, 0],
        }
    }
}
