use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of party types that select which signature/notary text
/// templates apply. Unknown strings are rejected at parse time instead of
/// falling through to a default template at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
    Individual,
    MarriedCouple,
    Corporation,
    Llc,
    Lp,
    SoleOwnerMarriedCouple,
    Trust,
}

/// Error returned when an owner-type string matches none of the known
/// variants or their accepted aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOwnerType(pub String);

impl fmt::Display for UnknownOwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown owner type: {:?}", self.0)
    }
}

impl std::error::Error for UnknownOwnerType {}

impl std::str::FromStr for OwnerType {
    type Err = UnknownOwnerType;

    /// Accepts the spellings and aliases that appear in uploaded mappings:
    /// `"person"` for individual, `"corp"`/`"entity"` for corporation,
    /// long-form `"limited liability company"` and `"limited partnership"`,
    /// and both comma and no-comma forms of "sole owner, married couple".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "individual" | "person" | "his/her sole property" => Ok(OwnerType::Individual),
            "married couple" | "couple" | "a married couple" | "married_couple" => {
                Ok(OwnerType::MarriedCouple)
            }
            "corporation" | "corp" | "entity" => Ok(OwnerType::Corporation),
            "llc" | "limited liability company" => Ok(OwnerType::Llc),
            "lp" | "limited partnership" => Ok(OwnerType::Lp),
            "sole owner, married couple" | "sole owner married couple"
            | "sole_owner_married_couple" => Ok(OwnerType::SoleOwnerMarriedCouple),
            "trust" => Ok(OwnerType::Trust),
            _ => Err(UnknownOwnerType(s.trim().to_string())),
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OwnerType::Individual => "individual",
            OwnerType::MarriedCouple => "married couple",
            OwnerType::Corporation => "corporation",
            OwnerType::Llc => "LLC",
            OwnerType::Lp => "LP",
            OwnerType::SoleOwnerMarriedCouple => "sole owner, married couple",
            OwnerType::Trust => "trust",
        };
        f.write_str(label)
    }
}

impl OwnerType {
    /// Entity-style parties use the authorized-signatory signature template
    /// and the entity acknowledgment wording.
    pub fn is_entity(self) -> bool {
        matches!(
            self,
            OwnerType::Corporation | OwnerType::Llc | OwnerType::Lp | OwnerType::Trust
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_aliases() {
        assert_eq!("Individual".parse::<OwnerType>(), Ok(OwnerType::Individual));
        assert_eq!("person".parse::<OwnerType>(), Ok(OwnerType::Individual));
        assert_eq!("corp".parse::<OwnerType>(), Ok(OwnerType::Corporation));
        assert_eq!(
            "Limited Liability Company".parse::<OwnerType>(),
            Ok(OwnerType::Llc)
        );
        assert_eq!(
            "Sole Owner, Married Couple".parse::<OwnerType>(),
            Ok(OwnerType::SoleOwnerMarriedCouple)
        );
    }

    #[test]
    fn rejects_unknown_types() {
        let err = "partnership of one".parse::<OwnerType>().unwrap_err();
        assert_eq!(err.0, "partnership of one");
    }

    #[test]
    fn entity_split() {
        assert!(OwnerType::Trust.is_entity());
        assert!(!OwnerType::MarriedCouple.is_entity());
    }
}
