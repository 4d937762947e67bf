//! Health profiles and the store abstraction that persists them.
//!
//! A profile is keyed by the user's name (case-sensitive). Conditions and
//! age groups match their lowercase tokens exactly; anything else, including
//! a differently cased or padded token, is kept verbatim so the store never
//! rejects a write, and the precaution selector treats an unrecognized
//! condition as matching no rule.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StoreError;

/// A health condition that the rule table can target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    None,
    General,
    Asthma,
    Heart,
    Pregnant,
    Children,
    Senior,
    Copd,
    /// Any value outside the known set, preserved as given.
    Unrecognized(String),
}

impl Condition {
    pub const KNOWN: [Condition; 8] = [
        Condition::None,
        Condition::General,
        Condition::Asthma,
        Condition::Heart,
        Condition::Pregnant,
        Condition::Children,
        Condition::Senior,
        Condition::Copd,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Condition::None => "none",
            Condition::General => "general",
            Condition::Asthma => "asthma",
            Condition::Heart => "heart",
            Condition::Pregnant => "pregnant",
            Condition::Children => "children",
            Condition::Senior => "senior",
            Condition::Copd => "copd",
            Condition::Unrecognized(s) => s,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Condition::Unrecognized(_))
    }
}

impl From<&str> for Condition {
    fn from(s: &str) -> Self {
        match s {
            "none" => Condition::None,
            "general" => Condition::General,
            "asthma" => Condition::Asthma,
            "heart" => Condition::Heart,
            "pregnant" => Condition::Pregnant,
            "children" => Condition::Children,
            "senior" => Condition::Senior,
            "copd" => Condition::Copd,
            _ => Condition::Unrecognized(s.to_string()),
        }
    }
}

impl From<String> for Condition {
    fn from(s: String) -> Self {
        Condition::from(s.as_str())
    }
}

impl From<Condition> for String {
    fn from(c: Condition) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse age bracket of the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgeGroup {
    Child,
    Adult,
    Senior,
    Unrecognized(String),
}

impl AgeGroup {
    pub fn as_str(&self) -> &str {
        match self {
            AgeGroup::Child => "child",
            AgeGroup::Adult => "adult",
            AgeGroup::Senior => "senior",
            AgeGroup::Unrecognized(s) => s,
        }
    }
}

impl From<&str> for AgeGroup {
    fn from(s: &str) -> Self {
        match s {
            "child" => AgeGroup::Child,
            "adult" => AgeGroup::Adult,
            "senior" => AgeGroup::Senior,
            _ => AgeGroup::Unrecognized(s.to_string()),
        }
    }
}

impl From<String> for AgeGroup {
    fn from(s: String) -> Self {
        AgeGroup::from(s.as_str())
    }
}

impl From<AgeGroup> for String {
    fn from(a: AgeGroup) -> Self {
        a.as_str().to_string()
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored health profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    /// Unique, case-sensitive user name
    pub name: String,

    pub condition: Condition,

    pub age_group: AgeGroup,

    /// When the profile was last written
    pub updated_at: DateTime<Utc>,
}

impl HealthProfile {
    pub fn new(
        name: impl Into<String>,
        condition: impl Into<Condition>,
        age_group: impl Into<AgeGroup>,
    ) -> Self {
        Self {
            name: name.into(),
            condition: condition.into(),
            age_group: age_group.into(),
            updated_at: Utc::now(),
        }
    }
}

/// Durable mapping from user name to health profile.
///
/// `save` is an upsert: the last committed write for a name wins and a
/// reader observes either the previous or the new row, never a mix.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// A human-readable backend name (e.g. "sqlite").
    fn name(&self) -> &str;

    /// Insert or overwrite the profile for `profile.name`.
    async fn save(&self, profile: HealthProfile) -> Result<(), StoreError>;

    /// Point lookup by exact name.
    async fn find(&self, name: &str) -> Result<Option<HealthProfile>, StoreError>;

    /// Number of stored profiles.
    async fn count(&self) -> Result<usize, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_conditions_parse_from_exact_tokens() {
        for c in Condition::KNOWN {
            assert_eq!(Condition::from(c.as_str()), c);
        }
    }

    #[test]
    fn case_and_padding_are_kept_verbatim() {
        assert_eq!(Condition::from("Asthma"), Condition::Unrecognized("Asthma".into()));
        assert_eq!(Condition::from(" copd "), Condition::Unrecognized(" copd ".into()));

        let profile = HealthProfile::new("x", " Asthma ", "Adult");
        assert_eq!(profile.condition.as_str(), " Asthma ");
        assert_eq!(profile.age_group.as_str(), "Adult");
        assert!(!profile.condition.is_recognized());
    }

    #[test]
    fn unknown_condition_is_preserved() {
        let c = Condition::from("hay fever");
        assert_eq!(c, Condition::Unrecognized("hay fever".into()));
        assert_eq!(c.to_string(), "hay fever");
        assert!(!c.is_recognized());
    }

    #[test]
    fn profile_serializes_enums_as_strings() {
        let profile = HealthProfile::new("alice", "asthma", "adult");
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["condition"], "asthma");
        assert_eq!(json["age_group"], "adult");

        let back: HealthProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back.condition, Condition::Asthma);
        assert_eq!(back.age_group, AgeGroup::Adult);
    }

    #[test]
    fn unknown_age_group_roundtrips_verbatim() {
        let a: AgeGroup = serde_json::from_str("\"teen\"").unwrap();
        assert_eq!(a, AgeGroup::Unrecognized("teen".into()));
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"teen\"");
    }
}
