//! House repository contract and SQLite implementation.
//!
//! # Invariants
//! - `traits` is persisted as a JSON array string and read back in order.
//! - `updated_at` is refreshed by the store on every successful update.

use super::sql::{ensure_table_ready, is_unique_violation, parse_id, where_clause, NOW_MS_SQL};
use super::{RepoError, RepoResult};
use crate::model::house::House;
use crate::model::RecordId;
use crate::query::Filter;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TABLE: &str = "houses";

const HOUSE_SELECT_SQL: &str = "SELECT
    id,
    name,
    colors,
    symbol,
    head,
    traits,
    description,
    created_at,
    updated_at
FROM houses";

/// Store operations for houses.
pub trait HouseRepository {
    fn insert_house(&self, house: &House) -> RepoResult<House>;
    fn get_house(&self, id: RecordId) -> RepoResult<Option<House>>;
    fn find_house_by_name(&self, name: &str) -> RepoResult<Option<House>>;
    fn find_houses(&self, filter: &Filter) -> RepoResult<Vec<House>>;
    fn update_house(&self, house: &House) -> RepoResult<House>;
    fn delete_house(&self, id: RecordId) -> RepoResult<House>;
}

/// SQLite-backed house repository.
pub struct SqliteHouseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHouseRepository<'conn> {
    /// Wraps a migrated connection, checking the `houses` table exists.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, TABLE)?;
        Ok(Self { conn })
    }
}

impl HouseRepository for SqliteHouseRepository<'_> {
    fn insert_house(&self, house: &House) -> RepoResult<House> {
        house.validate()?;

        self.conn
            .execute(
                &format!(
                    "INSERT INTO houses (
                        id,
                        name,
                        colors,
                        symbol,
                        head,
                        traits,
                        description,
                        created_at,
                        updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, {NOW_MS_SQL}, {NOW_MS_SQL});"
                ),
                params![
                    house.id.to_string(),
                    house.name.as_str(),
                    house.colors.as_deref(),
                    house.symbol.as_deref(),
                    house.head.as_deref(),
                    traits_to_db(&house.traits)?,
                    house.description.as_deref(),
                ],
            )
            .map_err(|err| map_write_error(err, &house.name))?;

        self.get_house(house.id)?
            .ok_or_else(|| RepoError::InvalidData(format!("house {} missing after insert", house.id)))
    }

    fn get_house(&self, id: RecordId) -> RepoResult<Option<House>> {
        self.conn
            .query_row(
                &format!("{HOUSE_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_house_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_house_by_name(&self, name: &str) -> RepoResult<Option<House>> {
        self.conn
            .query_row(
                &format!("{HOUSE_SELECT_SQL} WHERE name = ?1;"),
                [name],
                |row| Ok(parse_house_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_houses(&self, filter: &Filter) -> RepoResult<Vec<House>> {
        let (clause, binds) = where_clause(TABLE, filter);
        let mut stmt = self
            .conn
            .prepare(&format!("{HOUSE_SELECT_SQL}{clause} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut houses = Vec::new();
        while let Some(row) = rows.next()? {
            houses.push(parse_house_row(row)?);
        }
        Ok(houses)
    }

    fn update_house(&self, house: &House) -> RepoResult<House> {
        house.validate()?;

        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE houses
                     SET
                        name = ?1,
                        colors = ?2,
                        symbol = ?3,
                        head = ?4,
                        traits = ?5,
                        description = ?6,
                        updated_at = {NOW_MS_SQL}
                     WHERE id = ?7;"
                ),
                params![
                    house.name.as_str(),
                    house.colors.as_deref(),
                    house.symbol.as_deref(),
                    house.head.as_deref(),
                    traits_to_db(&house.traits)?,
                    house.description.as_deref(),
                    house.id.to_string(),
                ],
            )
            .map_err(|err| map_write_error(err, &house.name))?;

        if changed == 0 {
            return Err(RepoError::NotFound(house.id));
        }

        self.get_house(house.id)?.ok_or(RepoError::NotFound(house.id))
    }

    fn delete_house(&self, id: RecordId) -> RepoResult<House> {
        let existing = self.get_house(id)?.ok_or(RepoError::NotFound(id))?;
        let changed = self
            .conn
            .execute("DELETE FROM houses WHERE id = ?1;", [id.to_string()])?;
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

fn traits_to_db(traits: &[String]) -> RepoResult<String> {
    serde_json::to_string(traits)
        .map_err(|err| RepoError::InvalidData(format!("unencodable traits: {err}")))
}

fn parse_house_row(row: &Row<'_>) -> RepoResult<House> {
    let id_text: String = row.get("id")?;
    let traits_text: String = row.get("traits")?;
    let traits: Vec<String> = serde_json::from_str(&traits_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid traits value `{traits_text}` in houses.traits: {err}"
        ))
    })?;

    let house = House {
        id: parse_id(&id_text, TABLE)?,
        name: row.get("name")?,
        colors: row.get("colors")?,
        symbol: row.get("symbol")?,
        head: row.get("head")?,
        traits,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    house.validate()?;
    Ok(house)
}
