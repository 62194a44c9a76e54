use serde::{Deserialize, Serialize};

/// One parcel description feeding exhibit generation. `is_portion` switches
/// the numbered-list label between `Parcel N:` and `Portion N:`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExhibitParcel {
    pub description: String,
    #[serde(default)]
    pub is_portion: bool,
}

impl ExhibitParcel {
    pub fn whole(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            is_portion: false,
        }
    }
}
