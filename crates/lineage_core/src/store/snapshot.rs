//! JSON array snapshot of the whole person collection.

use super::person_repo::PersonRepository;
use super::{StoreError, StoreResult};
use crate::model::person::{Person, PersonId};
use log::{error, info};
use std::collections::HashSet;

/// Serializes every person, deleted ones included, as a pretty JSON array.
pub fn export_snapshot<R: PersonRepository>(repo: &R) -> StoreResult<String> {
    let people = repo.list_people(true)?;
    Ok(serde_json::to_string_pretty(&people)?)
}

/// Parses a snapshot without touching any store.
///
/// # Errors
/// - `StoreError::Json` when the text is not an array of valid records.
/// - `StoreError::DuplicateId` when two records share an id.
pub fn parse_snapshot(json: &str) -> StoreResult<Vec<Person>> {
    let people: Vec<Person> = serde_json::from_str(json)?;
    let mut seen: HashSet<&PersonId> = HashSet::with_capacity(people.len());
    if let Some(duplicate) = people.iter().find(|person| !seen.insert(&person.id)) {
        return Err(StoreError::DuplicateId(duplicate.id.clone()));
    }
    Ok(people)
}

/// Replaces the store content with the snapshot; returns the record count.
pub fn import_snapshot<R: PersonRepository>(repo: &R, json: &str) -> StoreResult<usize> {
    let result = parse_snapshot(json).and_then(|people| {
        repo.replace_all(&people)?;
        Ok(people.len())
    });
    match &result {
        Ok(count) => info!("event=snapshot_import module=store status=ok people={count}"),
        Err(err) => error!("event=snapshot_import module=store status=error error={err}"),
    }
    result
}
