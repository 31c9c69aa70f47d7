//! Typed decoding of the slot configuration form.
//!
//! The editing form posts three fields per slot:
//! `<slot>-sp7-tag`, `<slot>-sp6-tag` and `<slot>-db`. Empty values and the
//! literal `None` mean "unset". A slot whose database is unset is absent,
//! regardless of its tag selections. A slot without a `-db` field at all is
//! left out of the request, which validation then reports as missing.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::slots::{DesiredSlots, SlotTriple};

pub const PRIMARY_TAG_SUFFIX: &str = "-sp7-tag";
pub const COMPANION_TAG_SUFFIX: &str = "-sp6-tag";
pub const DATABASE_SUFFIX: &str = "-db";

/// Field values submitted for one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotFields {
    pub primary_tag: Option<String>,
    pub companion_tag: Option<String>,
    /// `None` when the field was not submitted; `Some(None)` when submitted unset.
    pub database: Option<Option<String>>,
}

/// The submitted form, grouped by slot name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<String, String>")]
pub struct SlotForm {
    slots: BTreeMap<String, SlotFields>,
}

impl SlotForm {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut slots: BTreeMap<String, SlotFields> = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = unset_to_none(value.as_ref());

            if let Some(slot) = key.strip_suffix(PRIMARY_TAG_SUFFIX) {
                slots.entry(slot.to_string()).or_default().primary_tag = value;
            } else if let Some(slot) = key.strip_suffix(COMPANION_TAG_SUFFIX) {
                slots.entry(slot.to_string()).or_default().companion_tag = value;
            } else if let Some(slot) = key.strip_suffix(DATABASE_SUFFIX) {
                slots.entry(slot.to_string()).or_default().database = Some(value);
            }
            // Anything else (submit buttons, CSRF fields of a fronting proxy) is ignored.
        }
        Self { slots }
    }

    pub fn slot(&self, name: &str) -> Option<&SlotFields> {
        self.slots.get(name)
    }
}

impl From<HashMap<String, String>> for SlotForm {
    fn from(fields: HashMap<String, String>) -> Self {
        Self::from_pairs(fields)
    }
}

impl From<SlotForm> for DesiredSlots {
    fn from(form: SlotForm) -> Self {
        form.slots
            .into_iter()
            .filter_map(|(slot, fields)| {
                let database = fields.database?;
                let triple = database.map(|database| SlotTriple {
                    primary_tag: fields.primary_tag,
                    companion_tag: fields.companion_tag,
                    database,
                });
                Some((slot, triple))
            })
            .collect()
    }
}

fn unset_to_none(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "None" {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::{SlotName, ValidationError};

    fn full_form() -> Vec<(String, String)> {
        SlotName::ALL
            .into_iter()
            .flat_map(|slot| {
                [
                    (format!("{slot}-sp7-tag"), "latest".to_string()),
                    (format!("{slot}-sp6-tag"), "6.8.03".to_string()),
                    (format!("{slot}-db"), "None".to_string()),
                ]
            })
            .collect()
    }

    fn set(form: &mut [(String, String)], key: &str, value: &str) {
        let entry = form.iter_mut().find(|(k, _)| k == key).unwrap();
        entry.1 = value.to_string();
    }

    #[test]
    fn test_groups_fields_by_slot() {
        let mut pairs = full_form();
        set(&mut pairs, "db2-db", "kufish");
        set(&mut pairs, "db2-sp7-tag", "v7.9.1");

        let form = SlotForm::from_pairs(pairs);
        assert_eq!(
            form.slot("db2"),
            Some(&SlotFields {
                primary_tag: Some("v7.9.1".to_string()),
                companion_tag: Some("6.8.03".to_string()),
                database: Some(Some("kufish".to_string())),
            })
        );
    }

    #[test]
    fn test_unset_database_makes_slot_absent() {
        let mut pairs = full_form();
        set(&mut pairs, "db1-db", "kufish");
        set(&mut pairs, "db3-db", "");

        let config = DesiredSlots::from(SlotForm::from_pairs(pairs))
            .into_configuration()
            .unwrap();
        assert_eq!(config.configured_count(), 1);
        assert!(config.get(SlotName::Db3).is_none());
        assert_eq!(config.get(SlotName::Db1).unwrap().companion_tag.as_deref(), Some("6.8.03"));
    }

    #[test]
    fn test_missing_database_field_is_missing_slot() {
        let pairs: Vec<_> = full_form()
            .into_iter()
            .filter(|(k, _)| k != "db5-db")
            .collect();

        let err = DesiredSlots::from(SlotForm::from_pairs(pairs))
            .into_configuration()
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingSlot(SlotName::Db5)));
    }

    #[test]
    fn test_extra_slot_is_reported() {
        let mut pairs = full_form();
        pairs.push(("db7-db".to_string(), "extra".to_string()));

        let err = DesiredSlots::from(SlotForm::from_pairs(pairs))
            .into_configuration()
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownSlot(name) if name == "db7"));
    }

    #[test]
    fn test_unrelated_fields_ignored() {
        let mut pairs = full_form();
        pairs.push(("submit".to_string(), "Save".to_string()));

        let desired = DesiredSlots::from(SlotForm::from_pairs(pairs));
        assert_eq!(desired.len(), SlotName::COUNT);
    }

    #[test]
    fn test_map_and_pairs_decode_alike() {
        let body = "db1-db=kufish&db1-sp7-tag=v7&db1-sp6-tag=None&go=1";
        let fields: HashMap<String, String> = serde_json::from_value(serde_json::json!({
            "db1-db": "kufish",
            "db1-sp7-tag": "v7",
            "db1-sp6-tag": "None",
        }))
        .unwrap();
        let form = SlotForm::from(fields);
        assert_eq!(form, SlotForm::from_pairs(body.split('&').filter_map(|kv| kv.split_once('='))));

        let fields = form.slot("db1").unwrap();
        assert_eq!(fields.companion_tag, None);
        assert_eq!(fields.primary_tag.as_deref(), Some("v7"));
    }
}
