//! Spell repository contract and SQLite implementation.
//!
//! # Invariants
//! - `id` and `created_at` never change after insert.
//! - `updated_at` is refreshed by the store on every successful update.

use super::sql::{ensure_table_ready, is_unique_violation, parse_id, where_clause, NOW_MS_SQL};
use super::{RepoError, RepoResult};
use crate::model::spell::Spell;
use crate::model::RecordId;
use crate::query::Filter;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TABLE: &str = "spells";

const SPELL_SELECT_SQL: &str = "SELECT
    id,
    name,
    type,
    description,
    created_at,
    updated_at
FROM spells";

/// Store operations for spells.
pub trait SpellRepository {
    /// Inserts a validated spell and returns it with store-assigned timestamps.
    fn insert_spell(&self, spell: &Spell) -> RepoResult<Spell>;
    fn get_spell(&self, id: RecordId) -> RepoResult<Option<Spell>>;
    /// Exact, case-sensitive name lookup.
    fn find_spell_by_name(&self, name: &str) -> RepoResult<Option<Spell>>;
    /// Returns matching spells in store (insertion) order.
    fn find_spells(&self, filter: &Filter) -> RepoResult<Vec<Spell>>;
    /// Replaces all mutable fields and returns the stored result.
    fn update_spell(&self, spell: &Spell) -> RepoResult<Spell>;
    /// Deletes by id and returns the last stored state.
    fn delete_spell(&self, id: RecordId) -> RepoResult<Spell>;
}

/// SQLite-backed spell repository.
pub struct SqliteSpellRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSpellRepository<'conn> {
    /// Wraps a migrated connection, checking the `spells` table exists.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, TABLE)?;
        Ok(Self { conn })
    }
}

impl SpellRepository for SqliteSpellRepository<'_> {
    fn insert_spell(&self, spell: &Spell) -> RepoResult<Spell> {
        spell.validate()?;

        self.conn
            .execute(
                &format!(
                    "INSERT INTO spells (id, name, type, description, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, {NOW_MS_SQL}, {NOW_MS_SQL});"
                ),
                params![
                    spell.id.to_string(),
                    spell.name.as_str(),
                    spell.kind.as_str(),
                    spell.description.as_str(),
                ],
            )
            .map_err(|err| map_write_error(err, &spell.name))?;

        self.get_spell(spell.id)?
            .ok_or_else(|| RepoError::InvalidData(format!("spell {} missing after insert", spell.id)))
    }

    fn get_spell(&self, id: RecordId) -> RepoResult<Option<Spell>> {
        self.conn
            .query_row(
                &format!("{SPELL_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_spell_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_spell_by_name(&self, name: &str) -> RepoResult<Option<Spell>> {
        self.conn
            .query_row(
                &format!("{SPELL_SELECT_SQL} WHERE name = ?1;"),
                [name],
                |row| Ok(parse_spell_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_spells(&self, filter: &Filter) -> RepoResult<Vec<Spell>> {
        let (clause, binds) = where_clause(TABLE, filter);
        let mut stmt = self
            .conn
            .prepare(&format!("{SPELL_SELECT_SQL}{clause} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut spells = Vec::new();
        while let Some(row) = rows.next()? {
            spells.push(parse_spell_row(row)?);
        }
        Ok(spells)
    }

    fn update_spell(&self, spell: &Spell) -> RepoResult<Spell> {
        spell.validate()?;

        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE spells
                     SET
                        name = ?1,
                        type = ?2,
                        description = ?3,
                        updated_at = {NOW_MS_SQL}
                     WHERE id = ?4;"
                ),
                params![
                    spell.name.as_str(),
                    spell.kind.as_str(),
                    spell.description.as_str(),
                    spell.id.to_string(),
                ],
            )
            .map_err(|err| map_write_error(err, &spell.name))?;

        if changed == 0 {
            return Err(RepoError::NotFound(spell.id));
        }

        self.get_spell(spell.id)?.ok_or(RepoError::NotFound(spell.id))
    }

    fn delete_spell(&self, id: RecordId) -> RepoResult<Spell> {
        let existing = self.get_spell(id)?.ok_or(RepoError::NotFound(id))?;
        let changed = self
            .conn
            .execute("DELETE FROM spells WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(existing)
    }
}

fn map_write_error(err: rusqlite::Error, name: &str) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::DuplicateName(name.to_string())
    } else {
        err.into()
    }
}

fn parse_spell_row(row: &Row<'_>) -> RepoResult<Spell> {
    let id_text: String = row.get("id")?;
    let spell = Spell {
        id: parse_id(&id_text, TABLE)?,
        name: row.get("name")?,
        kind: row.get("type")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    spell.validate()?;
    Ok(spell)
}
