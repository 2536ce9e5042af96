//! Marketplace service and creator records
//!
//! The upstream marketplace stores service fields in inconsistent shapes:
//! plain strings, tagged wrappers (`{type_donnee, valeur, origine_champs}`),
//! or nested objects. Fields are kept as raw JSON values here and unwrapped
//! by [`crate::extract::field_text`] at resolution time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A marketplace service listing, reduced to the fields the location
/// pipeline consumes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRecord {
    /// Fixed GPS position set on the service itself
    pub gps_fixe: Option<Value>,
    /// Free-text address field
    pub adresse: Option<Value>,
    /// Listing title, used as a last-resort label
    pub titre: Option<Value>,
    /// Creator record attached to the service
    #[serde(alias = "serviceCreatorInfo")]
    pub creator: Option<CreatorRecord>,
}

/// The subset of the service-creator record relevant to resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorRecord {
    /// Creator GPS position, frequently a stale signup default
    pub gps: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_tagged_and_plain_fields() {
        let record: ServiceRecord = serde_json::from_value(json!({
            "gps_fixe": {"type_donnee": "gps", "valeur": "4.05,9.7", "origine_champs": "service"},
            "adresse": "Akwa, Douala",
            "serviceCreatorInfo": {"gps": "6.5,3.5"}
        }))
        .unwrap();

        assert!(record.gps_fixe.is_some());
        assert_eq!(record.adresse, Some(json!("Akwa, Douala")));
        assert!(record.titre.is_none());
        assert_eq!(record.creator.unwrap().gps, Some(json!("6.5,3.5")));
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let record: ServiceRecord = serde_json::from_value(json!({})).unwrap();
        assert!(record.gps_fixe.is_none());
        assert!(record.creator.is_none());
    }
}
