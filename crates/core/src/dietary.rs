//! Dietary restrictions: a closed vocabulary and the set a session carries.
//!
//! Parsing is lenient by contract. Tokens outside the vocabulary are dropped
//! without an error, so a `DietaryRestrictionSet` can only ever hold known
//! restrictions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One entry of the fixed restriction vocabulary.
///
/// Declaration order is the canonical rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryRestriction {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
    NutFree,
    Halal,
    Kosher,
}

impl DietaryRestriction {
    /// The full vocabulary, in canonical order.
    pub const ALL: [DietaryRestriction; 7] = [
        Self::Vegetarian,
        Self::Vegan,
        Self::GlutenFree,
        Self::DairyFree,
        Self::NutFree,
        Self::Halal,
        Self::Kosher,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vegetarian => "vegetarian",
            Self::Vegan => "vegan",
            Self::GlutenFree => "gluten-free",
            Self::DairyFree => "dairy-free",
            Self::NutFree => "nut-free",
            Self::Halal => "halal",
            Self::Kosher => "kosher",
        }
    }
}

impl fmt::Display for DietaryRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a token outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dietary restriction: {0}")]
pub struct UnknownRestriction(pub String);

impl FromStr for DietaryRestriction {
    type Err = UnknownRestriction;

    /// Case- and surrounding-whitespace-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or(UnknownRestriction(normalized))
    }
}

/// The active restriction set of a session.
///
/// Updates replace the whole set; there is deliberately no `extend`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DietaryRestrictionSet(BTreeSet<DietaryRestriction>);

impl DietaryRestrictionSet {
    /// The empty set ("no restriction").
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Build a set from loose tokens, dropping anything not in the vocabulary.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            tokens
                .into_iter()
                .filter_map(|t| t.as_ref().parse().ok())
                .collect(),
        )
    }

    /// Parse a comma-separated free-text list such as `"Vegan, kosher"`.
    pub fn parse_list(text: &str) -> Self {
        Self::from_tokens(text.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, restriction: DietaryRestriction) -> bool {
        self.0.contains(&restriction)
    }

    pub fn iter(&self) -> impl Iterator<Item = DietaryRestriction> + '_ {
        self.0.iter().copied()
    }

    /// Canonical `", "`-joined rendering, e.g. `"vegan, gluten-free"`.
    pub fn joined(&self) -> String {
        self.iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<DietaryRestriction> for DietaryRestrictionSet {
    fn from_iter<T: IntoIterator<Item = DietaryRestriction>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for DietaryRestrictionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}
