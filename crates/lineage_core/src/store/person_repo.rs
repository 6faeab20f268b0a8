//! Person repository contract and SQLite implementation.
//!
//! Each member row stores the full record as JSON, with `is_deleted`
//! mirrored into its own column for filtering.

use super::{StoreError, StoreResult};
use crate::model::person::{Person, PersonId};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Repository interface for person records.
pub trait PersonRepository {
    /// Inserts a new person; fails when the id already exists.
    fn create_person(&self, person: &Person) -> StoreResult<()>;
    /// Replaces the full record, inserting it when missing.
    fn update_person(&self, person: &Person) -> StoreResult<()>;
    /// Inserts `ancestor` and stores the rewired `child` in one transaction.
    ///
    /// Fails with `NotFound` when `child` is not stored; nothing is written.
    fn insert_parent(&self, ancestor: &Person, child: &Person) -> StoreResult<()>;
    fn get_person(&self, id: &PersonId, include_deleted: bool) -> StoreResult<Option<Person>>;
    /// All people in insertion order.
    fn list_people(&self, include_deleted: bool) -> StoreResult<Vec<Person>>;
    /// Sets the soft-delete flag on every listed id in one transaction.
    ///
    /// Returns the number of rows whose flag changed.
    fn set_deleted(&self, ids: &[PersonId], deleted: bool) -> StoreResult<usize>;
    /// Administrative erase; the core never calls this on its own.
    fn hard_delete_person(&self, id: &PersonId) -> StoreResult<()>;
    /// Replaces the whole collection in one transaction.
    fn replace_all(&self, people: &[Person]) -> StoreResult<()>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, person: &Person) -> StoreResult<()> {
        person.validate()?;
        if load_row(self.conn, &person.id)?.is_some() {
            return Err(StoreError::DuplicateId(person.id.clone()));
        }
        insert_row(self.conn, person)
    }

    fn update_person(&self, person: &Person) -> StoreResult<()> {
        person.validate()?;
        let json = serde_json::to_string(person)?;
        self.conn.execute(
            "INSERT INTO members (id, json_content, is_deleted)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                json_content = excluded.json_content,
                is_deleted = excluded.is_deleted,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![person.id.as_str(), json, bool_to_int(person.is_deleted)],
        )?;
        Ok(())
    }

    fn insert_parent(&self, ancestor: &Person, child: &Person) -> StoreResult<()> {
        ancestor.validate()?;
        child.validate()?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_row(&tx, &ancestor.id)?.is_some() {
            return Err(StoreError::DuplicateId(ancestor.id.clone()));
        }
        insert_row(&tx, ancestor)?;
        let changed = tx.execute(
            "UPDATE members
             SET json_content = ?2,
                 is_deleted = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                child.id.as_str(),
                serde_json::to_string(child)?,
                bool_to_int(child.is_deleted)
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(child.id.clone()));
        }
        tx.commit()?;
        Ok(())
    }

    fn get_person(&self, id: &PersonId, include_deleted: bool) -> StoreResult<Option<Person>> {
        Ok(load_row(self.conn, id)?.filter(|person| include_deleted || person.is_active()))
    }

    fn list_people(&self, include_deleted: bool) -> StoreResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, json_content, is_deleted
             FROM members
             WHERE (?1 = 1 OR is_deleted = 0)
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([bool_to_int(include_deleted)])?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_member_row(row)?);
        }
        Ok(people)
    }

    fn set_deleted(&self, ids: &[PersonId], deleted: bool) -> StoreResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut changed = 0;
        for id in ids {
            let mut person = load_row(&tx, id)?.ok_or_else(|| StoreError::NotFound(id.clone()))?;
            if person.is_deleted == deleted {
                continue;
            }
            person.is_deleted = deleted;
            tx.execute(
                "UPDATE members
                 SET json_content = ?2,
                     is_deleted = ?3,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![
                    id.as_str(),
                    serde_json::to_string(&person)?,
                    bool_to_int(deleted)
                ],
            )?;
            changed += 1;
        }
        tx.commit()?;
        Ok(changed)
    }

    fn hard_delete_person(&self, id: &PersonId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE id = ?1;", [id.as_str()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn replace_all(&self, people: &[Person]) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM members;", [])?;
        for person in people {
            person.validate()?;
            if load_row(&tx, &person.id)?.is_some() {
                return Err(StoreError::DuplicateId(person.id.clone()));
            }
            insert_row(&tx, person)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn insert_row(conn: &Connection, person: &Person) -> StoreResult<()> {
    let json = serde_json::to_string(person)?;
    conn.execute(
        "INSERT INTO members (id, json_content, is_deleted) VALUES (?1, ?2, ?3);",
        params![person.id.as_str(), json, bool_to_int(person.is_deleted)],
    )?;
    Ok(())
}

fn load_row(conn: &Connection, id: &PersonId) -> StoreResult<Option<Person>> {
    conn.query_row(
        "SELECT id, json_content, is_deleted FROM members WHERE id = ?1;",
        [id.as_str()],
        |row| Ok(parse_member_row(row)),
    )
    .optional()?
    .transpose()
}

fn parse_member_row(row: &Row<'_>) -> StoreResult<Person> {
    let id: String = row.get("id")?;
    let json: String = row.get("json_content")?;
    let mut person: Person = serde_json::from_str(&json)
        .map_err(|err| StoreError::InvalidData(format!("members.json_content for `{id}`: {err}")))?;

    if person.id.as_str() != id {
        return Err(StoreError::InvalidData(format!(
            "members.id `{id}` does not match record id `{}`",
            person.id
        )));
    }

    person.is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_deleted value `{other}` in members.is_deleted"
            )));
        }
    };
    Ok(person)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
