//! Person domain model.
//!
//! # Responsibility
//! - Define the flat person record shared by store, layout and kinship code.
//! - Provide lifecycle helpers for soft-delete semantics.
//! - Parse loosely formatted birth dates into comparable calendar dates.
//!
//! # Invariants
//! - `id` is stable and never reused for another person.
//! - `parent_id` never points at the person itself.
//! - `is_deleted` is the source of truth for tombstone state.
//! - `parent_id` is serialized as `null` when absent, never omitted.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static BIRTH_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,4})(?:[-/.](\d{1,2})(?:[-/.](\d{1,2}))?)?$").expect("valid birth date regex")
});

/// Stable identifier for one person record.
///
/// Ids are opaque text: imported snapshots may carry any non-blank string,
/// while ids generated by this crate are UUID v4 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    /// Wraps an existing identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Recorded gender of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Birth date as entered by the user.
///
/// The raw text is kept verbatim for round-tripping. Comparisons go through
/// [`BirthDate::sort_key`], where unparsable or empty values sort before
/// every real date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BirthDate(String);

impl BirthDate {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Empty birth date (unknown).
    pub fn unknown() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Parses `YYYY-MM-DD`, `YYYY-MM` or `YYYY` into a calendar date.
    ///
    /// Missing month/day components resolve to the first month/day.
    /// Returns `None` for empty text or impossible dates.
    pub fn parsed(&self) -> Option<NaiveDate> {
        let captures = BIRTH_DATE_RE.captures(self.0.trim())?;
        let year = captures.get(1)?.as_str().parse::<i32>().ok()?;
        let month = match captures.get(2) {
            Some(value) => value.as_str().parse::<u32>().ok()?,
            None => 1,
        };
        let day = match captures.get(3) {
            Some(value) => value.as_str().parse::<u32>().ok()?,
            None => 1,
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Ordering key; `None` is the "earliest possible" sentinel.
    pub fn sort_key(&self) -> Option<NaiveDate> {
        self.parsed()
    }

    /// Compares two birth dates using the sentinel ordering.
    pub fn compare(&self, other: &BirthDate) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl From<&str> for BirthDate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Validation errors for person records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    /// `id` is blank after trim.
    BlankId,
    /// `parent_id` equals the person's own id.
    SelfParent(PersonId),
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "person id must not be blank"),
            Self::SelfParent(id) => write!(f, "person {id} cannot be its own parent"),
        }
    }
}

impl Error for PersonValidationError {}

/// Canonical person record.
///
/// Serialized as a flat camelCase record, matching the snapshot format used
/// by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PersonWire")]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub birth_date: BirthDate,
    pub is_married: bool,
    pub address: String,
    pub gender: Gender,
    /// Single lineage parent. `None` means root.
    pub parent_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    /// Soft-delete marker. Deleted persons are kept for restoration.
    pub is_deleted: bool,
    /// Cosmetic emphasis flag; no effect on any algorithm.
    pub is_highlight: bool,
}

/// Lenient wire shape: optional flags may be missing in older snapshots.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonWire {
    id: PersonId,
    name: String,
    #[serde(default)]
    birth_date: BirthDate,
    #[serde(default)]
    is_married: bool,
    #[serde(default)]
    address: String,
    gender: Gender,
    #[serde(default)]
    parent_id: Option<PersonId>,
    #[serde(default)]
    spouse_name: Option<String>,
    #[serde(default)]
    biography: Option<String>,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    is_highlight: bool,
}

impl TryFrom<PersonWire> for Person {
    type Error = PersonValidationError;

    fn try_from(wire: PersonWire) -> Result<Self, Self::Error> {
        let person = Person {
            id: wire.id,
            name: wire.name,
            birth_date: wire.birth_date,
            is_married: wire.is_married,
            address: wire.address,
            gender: wire.gender,
            parent_id: wire.parent_id,
            spouse_name: wire.spouse_name.filter(|value| !value.trim().is_empty()),
            biography: wire.biography,
            is_deleted: wire.is_deleted,
            is_highlight: wire.is_highlight,
        };
        person.validate()?;
        Ok(person)
    }
}

impl Person {
    /// Creates an active person with a generated id.
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self::with_id(PersonId::generate(), name, gender)
    }

    /// Creates an active person with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(id: PersonId, name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id,
            name: name.into(),
            birth_date: BirthDate::unknown(),
            is_married: false,
            address: String::new(),
            gender,
            parent_id: None,
            spouse_name: None,
            biography: None,
            is_deleted: false,
            is_highlight: false,
        }
    }

    /// Builder-style setter for the birth date.
    pub fn born(mut self, birth_date: impl Into<BirthDate>) -> Self {
        self.birth_date = birth_date.into();
        self
    }

    /// Builder-style setter for the lineage parent.
    pub fn child_of(mut self, parent_id: impl Into<PersonId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(PersonValidationError::BlankId);
        }
        if self.parent_id.as_ref() == Some(&self.id) {
            return Err(PersonValidationError::SelfParent(self.id.clone()));
        }
        Ok(())
    }

    /// Marks this person as softly deleted.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Clears the soft delete flag.
    pub fn restore(&mut self) {
        self.is_deleted = false;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    pub fn is_male(&self) -> bool {
        self.gender == Gender::Male
    }

    /// Birth order shared by ranks, elder/younger terms and child layout.
    ///
    /// Unparsable dates come first; equal dates fall back to the id, so no two
    /// distinct people compare equal.
    pub fn cmp_birth(&self, other: &Person) -> Ordering {
        self.birth_date
            .compare(&other.birth_date)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Completed years between birth and `today`.
    ///
    /// Returns `None` when the birth date does not parse or lies after `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date.parsed()?;
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

/// User-facing generation number for a layout depth (roots are generation 1).
pub fn generation_label(depth: usize) -> usize {
    depth + 1
}

/// Filters the full collection down to the active set, preserving order.
pub fn active_people(people: &[Person]) -> Vec<Person> {
    people
        .iter()
        .filter(|person| person.is_active())
        .cloned()
        .collect()
}
