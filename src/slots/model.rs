//! Slot data model.
//!
//! # Responsibilities
//! - Define the fixed set of slot names and their ordering
//! - Define the per-slot triple (primary tag, companion tag, database)
//! - Convert a desired slot mapping into a validated `Configuration`
//!
//! # Design Decisions
//! - Slot names are an enum: the schema is fixed at compile time
//! - `Configuration` is an array indexed by slot, so ordering is structural
//! - Values that end up inside rendered artifacts share one character rule

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::slots::error::{SlotField, ValidationError};

/// Tag used when a configured slot leaves an image tag unset.
pub const DEFAULT_TAG: &str = "latest";

/// One of the fixed deployment positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotName {
    Db1,
    Db2,
    Db3,
    Db4,
    Db5,
    Db6,
}

impl SlotName {
    /// Number of slots in the schema.
    pub const COUNT: usize = 6;

    /// All slots in rendering order.
    pub const ALL: [SlotName; Self::COUNT] = [
        SlotName::Db1,
        SlotName::Db2,
        SlotName::Db3,
        SlotName::Db4,
        SlotName::Db5,
        SlotName::Db6,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::Db1 => "db1",
            SlotName::Db2 => "db2",
            SlotName::Db3 => "db3",
            SlotName::Db4 => "db4",
            SlotName::Db5 => "db5",
            SlotName::Db6 => "db6",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SlotName::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownSlot(s.to_string()))
    }
}

impl Serialize for SlotName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SlotName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Desired assignment for a single configured slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTriple {
    /// Application image tag. `None` means [`DEFAULT_TAG`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_tag: Option<String>,

    /// Companion image tag. `None` means [`DEFAULT_TAG`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companion_tag: Option<String>,

    /// Backing database name.
    pub database: String,
}

impl SlotTriple {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            primary_tag: None,
            companion_tag: None,
            database: database.into(),
        }
    }

    pub fn with_primary(mut self, tag: impl Into<String>) -> Self {
        self.primary_tag = Some(tag.into());
        self
    }

    pub fn with_companion(mut self, tag: impl Into<String>) -> Self {
        self.companion_tag = Some(tag.into());
        self
    }

    pub fn primary_or_default(&self) -> &str {
        self.primary_tag.as_deref().unwrap_or(DEFAULT_TAG)
    }

    pub fn companion_or_default(&self) -> &str {
        self.companion_tag.as_deref().unwrap_or(DEFAULT_TAG)
    }

    fn validate(&self, slot: SlotName) -> Result<(), ValidationError> {
        if self.database.is_empty() {
            return Err(ValidationError::MissingDatabase(slot));
        }
        check_field(slot, SlotField::Database, &self.database)?;
        if let Some(tag) = &self.primary_tag {
            check_field(slot, SlotField::PrimaryTag, tag)?;
        }
        if let Some(tag) = &self.companion_tag {
            check_field(slot, SlotField::CompanionTag, tag)?;
        }
        Ok(())
    }
}

fn check_field(slot: SlotName, field: SlotField, value: &str) -> Result<(), ValidationError> {
    if is_embeddable(field, value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            slot,
            field,
            value: value.to_string(),
        })
    }
}

/// Whether `value` may be written verbatim into a rendered artifact.
///
/// Tags follow the container registry alphabet; database names may also contain `$`.
pub(crate) fn is_embeddable(field: SlotField, value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 128
        && value.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '.' | '_' | '-')
                || (field == SlotField::Database && c == '$')
        })
}

/// The full set of slots at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, Option<SlotTriple>>")]
pub struct Configuration {
    slots: [Option<SlotTriple>; SlotName::COUNT],
}

impl Configuration {
    /// A configuration with every slot absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder used when assembling a configuration from known-good parts.
    pub fn with_slot(mut self, slot: SlotName, triple: Option<SlotTriple>) -> Self {
        self.slots[slot.index()] = triple;
        self
    }

    pub fn get(&self, slot: SlotName) -> Option<&SlotTriple> {
        self.slots[slot.index()].as_ref()
    }

    /// Every slot in fixed order, configured or not.
    pub fn iter(&self) -> impl Iterator<Item = (SlotName, Option<&SlotTriple>)> + '_ {
        SlotName::ALL
            .into_iter()
            .map(move |slot| (slot, self.get(slot)))
    }

    /// Configured slots in fixed order.
    pub fn configured(&self) -> impl Iterator<Item = (SlotName, &SlotTriple)> + '_ {
        self.iter()
            .filter_map(|(slot, triple)| triple.map(|t| (slot, t)))
    }

    pub fn configured_count(&self) -> usize {
        self.configured().count()
    }

    /// Deduplicated companion tags of all configured slots, sorted.
    pub fn companion_tags(&self) -> BTreeSet<&str> {
        self.configured()
            .map(|(_, triple)| triple.companion_or_default())
            .collect()
    }

    /// Slots whose contents differ between `self` and `other`.
    pub fn changed_slots(&self, other: &Configuration) -> Vec<SlotName> {
        SlotName::ALL
            .into_iter()
            .filter(|slot| self.get(*slot) != other.get(*slot))
            .collect()
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SlotName::COUNT))?;
        for (slot, triple) in self.iter() {
            map.serialize_entry(slot.as_str(), &triple)?;
        }
        map.end()
    }
}

/// Stored snapshots may omit slots (older, smaller schemas) but never name
/// unknown ones, and every present triple must pass the same checks as a request.
impl TryFrom<BTreeMap<String, Option<SlotTriple>>> for Configuration {
    type Error = ValidationError;

    fn try_from(raw: BTreeMap<String, Option<SlotTriple>>) -> Result<Self, Self::Error> {
        let mut config = Configuration::empty();
        for (name, triple) in raw {
            let slot: SlotName = name.parse()?;
            if let Some(triple) = &triple {
                triple.validate(slot)?;
            }
            config.slots[slot.index()] = triple;
        }
        Ok(config)
    }
}

/// A requested slot mapping as received from a caller, before validation.
///
/// Keys are raw strings so that unknown or repeated slot names survive until
/// validation can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredSlots {
    slots: BTreeMap<String, Option<SlotTriple>>,
    /// First slot name seen more than once while decoding.
    duplicate: Option<String>,
}

impl DesiredSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `slot`, replacing any earlier value.
    pub fn insert(&mut self, slot: impl Into<String>, triple: Option<SlotTriple>) {
        self.slots.insert(slot.into(), triple);
    }

    pub fn with(mut self, slot: impl Into<String>, triple: Option<SlotTriple>) -> Self {
        self.insert(slot, triple);
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Validate and convert into a full-replacement `Configuration`.
    ///
    /// Every fixed slot must be present exactly once (possibly as `None`) and
    /// no others.
    pub fn into_configuration(self) -> Result<Configuration, ValidationError> {
        if let Some(name) = self.duplicate {
            return Err(ValidationError::DuplicateSlot(name));
        }
        let mut slots = self.slots;
        if let Some(unknown) = slots.keys().find(|name| name.parse::<SlotName>().is_err()) {
            return Err(ValidationError::UnknownSlot(unknown.clone()));
        }

        let mut config = Configuration::empty();
        for slot in SlotName::ALL {
            let triple = slots
                .remove(slot.as_str())
                .ok_or(ValidationError::MissingSlot(slot))?;
            if let Some(triple) = &triple {
                triple.validate(slot)?;
            }
            config.slots[slot.index()] = triple;
        }
        Ok(config)
    }
}

impl From<&Configuration> for DesiredSlots {
    fn from(config: &Configuration) -> Self {
        config
            .iter()
            .map(|(slot, triple)| (slot.as_str().to_string(), triple.cloned()))
            .collect()
    }
}

impl FromIterator<(String, Option<SlotTriple>)> for DesiredSlots {
    fn from_iter<I: IntoIterator<Item = (String, Option<SlotTriple>)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
            duplicate: None,
        }
    }
}

impl Serialize for DesiredSlots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slots.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DesiredSlots {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DesiredSlotsVisitor)
    }
}

struct DesiredSlotsVisitor;

impl<'de> Visitor<'de> for DesiredSlotsVisitor {
    type Value = DesiredSlots;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from slot name to slot triple or null")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut desired = DesiredSlots::new();
        while let Some((name, triple)) = access.next_entry::<String, Option<SlotTriple>>()? {
            if desired.slots.contains_key(&name) && desired.duplicate.is_none() {
                desired.duplicate = Some(name.clone());
            }
            desired.slots.insert(name, triple);
        }
        Ok(desired)
    }
}
