use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// One field of a partial update.
///
/// Deserialized with `#[serde(default)]` on the containing struct so an
/// absent key stays `Missing` while an explicit `null` becomes `Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Apply to a nullable slot.
    pub fn apply(self, slot: &mut Option<T>) {
        match self {
            Patch::Missing => {}
            Patch::Null => *slot = None,
            Patch::Value(v) => *slot = Some(v),
        }
    }

    /// Apply to a slot that may not be cleared.
    pub fn apply_required(self, slot: &mut T, field: &str) -> Result<()> {
        match self {
            Patch::Missing => Ok(()),
            Patch::Null => Err(Error::validation(format!("{field} cannot be null"))),
            Patch::Value(v) => {
                *slot = v;
                Ok(())
            }
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default)]
        note: Patch<String>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        let null: Probe = serde_json::from_str(r#"{"note": null}"#).unwrap();
        let value: Probe = serde_json::from_str(r#"{"note": "short bob"}"#).unwrap();

        assert_eq!(absent.note, Patch::Missing);
        assert_eq!(null.note, Patch::Null);
        assert_eq!(value.note, Patch::Value("short bob".to_string()));
    }

    #[test]
    fn apply_leaves_slot_alone_when_missing() {
        let mut slot = Some(3);
        Patch::Missing.apply(&mut slot);
        assert_eq!(slot, Some(3));

        Patch::Null.apply(&mut slot);
        assert_eq!(slot, None);
    }

    #[test]
    fn required_slot_rejects_null() {
        let mut name = "color".to_string();
        let err = Patch::<String>::Null
            .apply_required(&mut name, "service_type")
            .unwrap_err();
        assert!(err.to_string().contains("service_type"));
        assert_eq!(name, "color");
    }
}
