//! Style color values.

use std::fmt;

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Opaque white, the clear color a view uses before a style says otherwise.
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from components.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parses a style color string.
    ///
    /// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)` and a handful of CSS names. Returns `None` for
    /// anything else, including expressions.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        if value.starts_with("rgb") {
            return parse_rgb_function(value);
        }

        match value.to_ascii_lowercase().as_str() {
            "black" => Some(Self::rgba(0.0, 0.0, 0.0, 1.0)),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::rgba(1.0, 0.0, 0.0, 1.0)),
            "green" => Some(Self::rgba(0.0, 128.0 / 255.0, 0.0, 1.0)),
            "blue" => Some(Self::rgba(0.0, 0.0, 1.0, 1.0)),
            "gray" | "grey" => Some(Self::rgba(128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0, 1.0)),
            "transparent" => Some(Self::rgba(0.0, 0.0, 0.0, 0.0)),
            _ => None,
        }
    }

    /// Returns the color as 8-bit RGBA.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let digits: Vec<u8> = match hex.len() {
        3 | 4 => hex
            .chars()
            .map(|c| u8::from_str_radix(&c.to_string().repeat(2), 16).ok())
            .collect::<Option<_>>()?,
        6 | 8 => (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
            .collect::<Option<_>>()?,
        _ => return None,
    };

    let alpha = digits.get(3).copied().unwrap_or(255);
    Some(Color::rgba(
        f32::from(digits[0]) / 255.0,
        f32::from(digits[1]) / 255.0,
        f32::from(digits[2]) / 255.0,
        f32::from(alpha) / 255.0,
    ))
}

fn parse_rgb_function(value: &str) -> Option<Color> {
    let open = value.find('(')?;
    let close = value.rfind(')')?;
    let parts: Vec<f32> = value[open + 1..close]
        .split(',')
        .map(|p| p.trim().parse::<f32>().ok())
        .collect::<Option<_>>()?;

    match parts.as_slice() {
        [r, g, b] => Some(Color::rgba(r / 255.0, g / 255.0, b / 255.0, 1.0)),
        [r, g, b, a] => Some(Color::rgba(r / 255.0, g / 255.0, b / 255.0, *a)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::parse("#ffffff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#ff000080").unwrap().to_rgba8(), [255, 0, 0, 128]);
        assert_eq!(Color::parse("#0f08").unwrap().to_rgba8(), [0, 255, 0, 136]);
    }

    #[test]
    fn test_parse_rgb_functions() {
        assert_eq!(
            Color::parse("rgb(255, 128, 0)").unwrap().to_rgba8(),
            [255, 128, 0, 255]
        );
        assert_eq!(
            Color::parse("rgba(0,0,255,0.5)").unwrap().to_rgba8(),
            [0, 0, 255, 128]
        );
    }

    #[test]
    fn test_parse_names_and_garbage() {
        assert_eq!(Color::parse("White"), Some(Color::WHITE));
        assert_eq!(Color::parse("transparent").unwrap().a, 0.0);
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("#gggggg"), None);
        assert_eq!(Color::parse("hsl(0, 0%, 0%)"), None);
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(Color::parse("#336699").unwrap().to_string(), "#336699ff");
    }
}
