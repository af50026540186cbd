use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};


#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rgb {
    // "RRGGBB" as hex
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_rgb_u32(rgb: u32) -> Self {
        let r = ((rgb >> 16) & 0xFF) as u8;
        let g = ((rgb >>  8) & 0xFF) as u8;
        let b = ((rgb >>  0) & 0xFF) as u8;
        Self::new(r, g, b)
    }

    /// Parses a six-digit hex color, with or without leading `#` characters.
    pub fn from_hex(hex: &str) -> Option<Self> {
        hex.trim_start_matches('#').parse().ok()
    }

    /// Formats the color as six uppercase hex digits without a leading `#`.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
impl FromStr for Rgb {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // RRGGBB; u32::from_str_radix would also take a sign
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(());
        }
        let rgb_u32 = u32::from_str_radix(s, 16)
            .map_err(|_| ())?;
        Ok(Self::from_rgb_u32(rgb_u32))
    }
}
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}


/// What to do with color values that are not six hex digits.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HexPolicy {
    /// Keep the value exactly as the document states it (uppercased).
    #[default]
    PassThrough,

    /// Treat malformed values as if the role were absent.
    Strict,
}
impl HexPolicy {
    pub fn admits(&self, value: &str) -> bool {
        match self {
            Self::PassThrough => true,
            Self::Strict => value.parse::<Rgb>().is_ok(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        for hex in ["000000", "FFFFFF", "1a2b3c", "00325C", "fed141", "7F7F7F"] {
            let rgb = Rgb::from_hex(hex).unwrap();
            assert_eq!(Rgb::new(rgb.r, rgb.g, rgb.b).to_hex(), hex.to_uppercase());
        }
    }

    #[test]
    fn test_parse_components() {
        assert_eq!(Rgb::from_hex("#1B9CD0"), Some(Rgb::new(0x1B, 0x9C, 0xD0)));
        assert_eq!(Rgb::from_hex("c81a28"), Some(Rgb::new(0xC8, 0x1A, 0x28)));
        assert_eq!(Rgb::new(0, 103, 185).to_string(), "#0067B9");
    }

    #[test]
    fn test_reject_malformed() {
        assert_eq!(Rgb::from_hex(""), None);
        assert_eq!(Rgb::from_hex("FFF"), None);
        assert_eq!(Rgb::from_hex("FFFFFFF"), None);
        assert_eq!(Rgb::from_hex("GGGGGG"), None);
        assert_eq!(Rgb::from_hex("+12345"), None);
    }

    #[test]
    fn test_hex_policy() {
        assert!(HexPolicy::PassThrough.admits("FFF"));
        assert!(HexPolicy::PassThrough.admits("not a color"));
        assert!(HexPolicy::Strict.admits("ABCDEF"));
        assert!(!HexPolicy::Strict.admits("FFF"));
        assert_eq!(HexPolicy::default(), HexPolicy::PassThrough);
    }
}
