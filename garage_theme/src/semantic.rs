use std::fmt;

use serde::{Serialize, Serializer};
use serde::ser::SerializeMap;

use crate::theme::{ThemeColorSet, ThemeRole};


/// Names under which downstream consumers refer to the theme colors.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum SemanticSlot {
    PrimaryDark,
    PrimaryLight,
    SecondaryDark,
    SecondaryLight,
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Hyperlink,
    FollowedHyperlink,
}
impl SemanticSlot {
    pub const ALL: [SemanticSlot; 12] = [
        Self::PrimaryDark, Self::PrimaryLight, Self::SecondaryDark, Self::SecondaryLight,
        Self::Accent1, Self::Accent2, Self::Accent3, Self::Accent4, Self::Accent5, Self::Accent6,
        Self::Hyperlink, Self::FollowedHyperlink,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryDark => "primary_dark",
            Self::PrimaryLight => "primary_light",
            Self::SecondaryDark => "secondary_dark",
            Self::SecondaryLight => "secondary_light",
            Self::Accent1 => "accent1",
            Self::Accent2 => "accent2",
            Self::Accent3 => "accent3",
            Self::Accent4 => "accent4",
            Self::Accent5 => "accent5",
            Self::Accent6 => "accent6",
            Self::Hyperlink => "hyperlink",
            Self::FollowedHyperlink => "followed_hyperlink",
        }
    }

    /// The theme role this slot is filled from.
    pub const fn theme_role(&self) -> ThemeRole {
        match self {
            Self::PrimaryDark => ThemeRole::Dark1,
            Self::PrimaryLight => ThemeRole::Light1,
            Self::SecondaryDark => ThemeRole::Dark2,
            Self::SecondaryLight => ThemeRole::Light2,
            Self::Accent1 => ThemeRole::Accent1,
            Self::Accent2 => ThemeRole::Accent2,
            Self::Accent3 => ThemeRole::Accent3,
            Self::Accent4 => ThemeRole::Accent4,
            Self::Accent5 => ThemeRole::Accent5,
            Self::Accent6 => ThemeRole::Accent6,
            Self::Hyperlink => ThemeRole::Hyperlink,
            Self::FollowedHyperlink => ThemeRole::FollowedHyperlink,
        }
    }

    /// The value used when the theme does not define the slot's role (the classic Office palette).
    pub const fn default_hex(&self) -> &'static str {
        match self {
            Self::PrimaryDark => "000000",
            Self::PrimaryLight => "FFFFFF",
            Self::SecondaryDark => "1F497D",
            Self::SecondaryLight => "EEECE1",
            Self::Accent1 => "4F81BD",
            Self::Accent2 => "C0504D",
            Self::Accent3 => "9BBB59",
            Self::Accent4 => "8064A2",
            Self::Accent5 => "4BACC6",
            Self::Accent6 => "F79646",
            Self::Hyperlink => "0000FF",
            Self::FollowedHyperlink => "800080",
        }
    }

    const fn index(&self) -> usize {
        *self as usize
    }
}
impl fmt::Display for SemanticSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}


/// A value for every semantic slot.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SemanticColorMap {
    values: [String; 12],
}
impl SemanticColorMap {
    pub fn from_theme_colors(colors: &ThemeColorSet) -> Self {
        let values = SemanticSlot::ALL.map(|slot|
            colors.get(slot.theme_role())
                .unwrap_or(slot.default_hex())
                .to_owned()
        );
        Self { values }
    }

    pub fn get(&self, slot: SemanticSlot) -> &str {
        &self.values[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SemanticSlot, &str)> + '_ {
        SemanticSlot::ALL.into_iter()
            .map(|slot| (slot, self.get(slot)))
    }

    pub fn accent_palette(&self) -> AccentPalette {
        AccentPalette {
            accents: [
                SemanticSlot::Accent1, SemanticSlot::Accent2, SemanticSlot::Accent3,
                SemanticSlot::Accent4, SemanticSlot::Accent5, SemanticSlot::Accent6,
            ].map(|slot| format!("#{}", self.get(slot))),
        }
    }
}
impl Default for SemanticColorMap {
    fn default() -> Self {
        Self::from_theme_colors(&ThemeColorSet::new())
    }
}
impl Serialize for SemanticColorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (slot, value) in self.iter() {
            map.serialize_entry(slot.as_str(), value)?;
        }
        map.end()
    }
}


/// The six accent colors, `#`-prefixed, in `accent1` to `accent6` order.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AccentPalette {
    accents: [String; 6],
}
impl AccentPalette {
    /// Obtains an accent by index; any index is wrapped around onto the six accents.
    pub fn get(&self, index: i64) -> &str {
        let len = self.accents.len() as i64;
        &self.accents[index.rem_euclid(len) as usize]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.accents
    }
}
