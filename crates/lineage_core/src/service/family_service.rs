//! Family structure use-case service.
//!
//! # Responsibility
//! - Turn structural intents (found, add child, add parent, delete, restore)
//!   into person-store writes.
//! - Guard lineage invariants above the repository layer.
//!
//! # Invariants
//! - A person never becomes its own ancestor through an update.
//! - Soft delete cascades to every active descendant; restore never does.

use crate::model::person::{BirthDate, Gender, Person, PersonId};
use crate::store::person_repo::PersonRepository;
use crate::store::StoreError;
use log::{error, info};
use std::collections::{HashSet, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ROOT_BIRTH_DATE: &str = "1000-01-01";
const ROOT_ADDRESS: &str = "祖籍地";
const CHILD_PLACEHOLDER_NAME: &str = "新成员";
const PARENT_PLACEHOLDER_NAME: &str = "先祖讳名";

/// Errors from family service operations.
#[derive(Debug)]
pub enum FamilyServiceError {
    /// Surname is blank after trim.
    InvalidSurname,
    /// Target person does not exist (or is not active where required).
    MemberNotFound(PersonId),
    /// Referenced parent does not exist.
    ParentNotFound(PersonId),
    /// Parent change would make the person its own ancestor.
    CycleDetected {
        person_id: PersonId,
        parent_id: PersonId,
    },
    /// Store-level failure.
    Store(StoreError),
}

impl Display for FamilyServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSurname => write!(f, "surname must not be blank"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent not found: {id}"),
            Self::CycleDetected {
                person_id,
                parent_id,
            } => write!(
                f,
                "parent change would create cycle: person {person_id} under parent {parent_id}"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FamilyServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for FamilyServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::MemberNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Family service facade.
pub struct FamilyService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> FamilyService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates the founding ancestor of a new genealogy.
    pub fn create_root(&self, surname: &str) -> Result<Person, FamilyServiceError> {
        let surname = surname.trim();
        if surname.is_empty() {
            return Err(FamilyServiceError::InvalidSurname);
        }

        let mut root = Person::new(format!("{surname}氏始祖"), Gender::Male)
            .born(BirthDate::new(ROOT_BIRTH_DATE));
        root.address = ROOT_ADDRESS.to_string();
        root.biography = Some(format!("此乃{surname}氏开宗立派之始祖，功德无量，泽被后世。"));
        root.is_highlight = true;

        self.repo.create_person(&root)?;
        Ok(root)
    }

    /// Adds a male placeholder child under an active parent.
    ///
    /// The child inherits the parent's address.
    pub fn add_child(&self, parent_id: &PersonId) -> Result<Person, FamilyServiceError> {
        let parent = self
            .repo
            .get_person(parent_id, false)?
            .ok_or_else(|| FamilyServiceError::ParentNotFound(parent_id.clone()))?;

        let mut child = Person::new(CHILD_PLACEHOLDER_NAME, Gender::Male).child_of(parent.id);
        child.address = parent.address;

        self.repo.create_person(&child)?;
        Ok(child)
    }

    /// Inserts a new ancestor between a person and its current parent.
    ///
    /// The new ancestor takes over the child's prior `parent_id` and the child
    /// is rewired to point at it.
    pub fn add_parent(&self, child_id: &PersonId) -> Result<Person, FamilyServiceError> {
        let mut child = self
            .repo
            .get_person(child_id, false)?
            .ok_or_else(|| FamilyServiceError::MemberNotFound(child_id.clone()))?;

        let mut ancestor = Person::new(PARENT_PLACEHOLDER_NAME, Gender::Male);
        ancestor.address = child.address.clone();
        ancestor.parent_id = child.parent_id.take();
        child.parent_id = Some(ancestor.id.clone());

        self.repo.insert_parent(&ancestor, &child)?;
        Ok(ancestor)
    }

    /// Replaces a full person record.
    ///
    /// # Errors
    /// - `MemberNotFound` when the id is not stored.
    /// - `ParentNotFound` when `parent_id` references an unknown id.
    /// - `CycleDetected` for self-parenting or when the new parent descends
    ///   from the person.
    pub fn update_person(&self, person: &Person) -> Result<(), FamilyServiceError> {
        if self.repo.get_person(&person.id, true)?.is_none() {
            return Err(FamilyServiceError::MemberNotFound(person.id.clone()));
        }

        if let Some(parent_id) = &person.parent_id {
            if self.repo.get_person(parent_id, true)?.is_none() {
                return Err(FamilyServiceError::ParentNotFound(parent_id.clone()));
            }
            if self.would_create_cycle(&person.id, parent_id)? {
                return Err(FamilyServiceError::CycleDetected {
                    person_id: person.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }

        self.repo.update_person(person).map_err(Into::into)
    }

    /// Soft-deletes a person and all active transitive descendants.
    ///
    /// Returns the affected ids, the target first.
    pub fn soft_delete_subtree(&self, id: &PersonId) -> Result<Vec<PersonId>, FamilyServiceError> {
        let result = self.collect_subtree(id).and_then(|ids| {
            self.repo.set_deleted(&ids, true)?;
            Ok(ids)
        });
        match &result {
            Ok(ids) => info!(
                "event=member_soft_delete module=service status=ok id={id} cascade={}",
                ids.len().saturating_sub(1)
            ),
            Err(err) => error!("event=member_soft_delete module=service status=error id={id} error={err}"),
        }
        result
    }

    /// Clears the soft-delete flag on one person; descendants stay deleted.
    pub fn restore(&self, id: &PersonId) -> Result<(), FamilyServiceError> {
        let result = self
            .repo
            .get_person(id, true)
            .map_err(FamilyServiceError::from)
            .and_then(|found| found.ok_or_else(|| FamilyServiceError::MemberNotFound(id.clone())))
            .and_then(|_| {
                self.repo.set_deleted(std::slice::from_ref(id), false)?;
                Ok(())
            });
        match &result {
            Ok(()) => info!("event=member_restore module=service status=ok id={id}"),
            Err(err) => error!("event=member_restore module=service status=error id={id} error={err}"),
        }
        result
    }

    /// Active people in store order.
    pub fn active_people(&self) -> Result<Vec<Person>, FamilyServiceError> {
        self.repo.list_people(false).map_err(Into::into)
    }

    /// Soft-deleted people in store order, for the restoration list.
    pub fn deleted_people(&self) -> Result<Vec<Person>, FamilyServiceError> {
        Ok(self
            .repo
            .list_people(true)?
            .into_iter()
            .filter(|person| person.is_deleted)
            .collect())
    }

    fn collect_subtree(&self, id: &PersonId) -> Result<Vec<PersonId>, FamilyServiceError> {
        let active = self.repo.list_people(false)?;
        if !active.iter().any(|person| &person.id == id) {
            return Err(FamilyServiceError::MemberNotFound(id.clone()));
        }

        let mut ids = vec![id.clone()];
        let mut seen: HashSet<PersonId> = HashSet::from([id.clone()]);
        let mut queue = VecDeque::from([id.clone()]);
        while let Some(current) = queue.pop_front() {
            for child in active
                .iter()
                .filter(|person| person.parent_id.as_ref() == Some(&current))
            {
                if seen.insert(child.id.clone()) {
                    ids.push(child.id.clone());
                    queue.push_back(child.id.clone());
                }
            }
        }
        Ok(ids)
    }

    fn would_create_cycle(
        &self,
        person_id: &PersonId,
        candidate_parent_id: &PersonId,
    ) -> Result<bool, FamilyServiceError> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent_id.clone());
        while let Some(current) = cursor {
            if &current == person_id {
                return Ok(true);
            }
            if !visited.insert(current.clone()) {
                return Ok(true);
            }
            cursor = self
                .repo
                .get_person(&current, true)?
                .and_then(|person| person.parent_id);
        }
        Ok(false)
    }
}
