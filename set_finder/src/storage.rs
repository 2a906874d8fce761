//! Per-user persistence of saved card lists and custom set groups.
//!
//! Two tables, `card_lists` and `set_groups`. Card entries and set codes are
//! stored as JSON text, timestamps as RFC 3339 strings. Every query is scoped
//! by `user_id`; a row owned by another user behaves as if it did not exist.

use crate::error::{AppError, AppResult};
use crate::models::{CardEntry, CardList, CustomGroup};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

/// Storage backend used by the collection service
pub trait ListStore {
    fn insert_list(&mut self, list: &CardList) -> AppResult<()>;
    /// Replaces name, cards and `updated_at` of an existing list
    fn update_list(&mut self, list: &CardList) -> AppResult<()>;
    /// Lists of one user, most recently created first
    fn lists_for_user(&self, user_id: &str) -> AppResult<Vec<CardList>>;
    fn get_list(&self, user_id: &str, id: &str) -> AppResult<CardList>;
    fn delete_list(&mut self, user_id: &str, id: &str) -> AppResult<()>;

    fn insert_group(&mut self, group: &CustomGroup) -> AppResult<()>;
    /// Replaces name and sets of an existing group
    fn update_group(&mut self, group: &CustomGroup) -> AppResult<()>;
    fn groups_for_user(&self, user_id: &str) -> AppResult<Vec<CustomGroup>>;
    fn delete_group(&mut self, user_id: &str, id: &str) -> AppResult<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file and initialises the schema
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        log::info!("Collection DB: {}", path.display());
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS card_lists (
            id          TEXT NOT NULL PRIMARY KEY,
            name        TEXT NOT NULL,
            cards       TEXT NOT NULL,
            user_id     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_card_lists_user ON card_lists(user_id);
        CREATE TABLE IF NOT EXISTS set_groups (
            id          TEXT NOT NULL PRIMARY KEY,
            name        TEXT NOT NULL,
            sets        TEXT NOT NULL,
            user_id     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_set_groups_user ON set_groups(user_id);",
    )
}

/// Fixed-width so text order equals time order
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::Validation(format!("Invalid timestamp '{}' in database: {}", s, e)))
}

/// Raw `card_lists` row before JSON and timestamp decoding
struct ListRow {
    id: String,
    name: String,
    cards: String,
    user_id: String,
    created_at: String,
    updated_at: String,
}

impl ListRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            cards: row.get(2)?,
            user_id: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn into_list(self) -> AppResult<CardList> {
        let cards: Vec<CardEntry> = serde_json::from_str(&self.cards)?;
        Ok(CardList {
            id: self.id,
            name: self.name,
            cards,
            user_id: self.user_id,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn group_from_parts(id: String, name: String, sets: String, user_id: String) -> AppResult<CustomGroup> {
    Ok(CustomGroup {
        id,
        name,
        sets: serde_json::from_str(&sets)?,
        user_id,
    })
}

fn not_found(kind: &'static str, id: &str) -> AppError {
    AppError::NotFound {
        kind,
        id: id.to_string(),
    }
}

const LIST_COLUMNS: &str = "id, name, cards, user_id, created_at, updated_at";

impl ListStore for SqliteStore {
    fn insert_list(&mut self, list: &CardList) -> AppResult<()> {
        let cards = serde_json::to_string(&list.cards)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO card_lists (id, name, cards, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                list.id,
                list.name,
                cards,
                list.user_id,
                format_timestamp(&list.created_at),
                format_timestamp(&list.updated_at),
            ],
        )?;
        tx.commit()?;
        log::info!("Saved list '{}' ({} cards)", list.name, list.cards.len());
        Ok(())
    }

    fn update_list(&mut self, list: &CardList) -> AppResult<()> {
        let cards = serde_json::to_string(&list.cards)?;
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE card_lists SET name = ?1, cards = ?2, updated_at = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![
                list.name,
                cards,
                format_timestamp(&list.updated_at),
                list.id,
                list.user_id,
            ],
        )?;
        if changed == 0 {
            return Err(not_found("list", &list.id));
        }
        tx.commit()?;
        log::info!("Updated list '{}' ({} cards)", list.name, list.cards.len());
        Ok(())
    }

    fn lists_for_user(&self, user_id: &str) -> AppResult<Vec<CardList>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM card_lists WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            LIST_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![user_id], ListRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ListRow::into_list).collect()
    }

    fn get_list(&self, user_id: &str, id: &str) -> AppResult<CardList> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM card_lists WHERE id = ?1 AND user_id = ?2",
            LIST_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id, user_id], ListRow::from_row)?;
        match rows.next() {
            Some(row) => row?.into_list(),
            None => Err(not_found("list", id)),
        }
    }

    fn delete_list(&mut self, user_id: &str, id: &str) -> AppResult<()> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM card_lists WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(not_found("list", id));
        }
        tx.commit()?;
        log::info!("Deleted list {}", id);
        Ok(())
    }

    fn insert_group(&mut self, group: &CustomGroup) -> AppResult<()> {
        let sets = serde_json::to_string(&group.sets)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO set_groups (id, name, sets, user_id) VALUES (?1, ?2, ?3, ?4)",
            params![group.id, group.name, sets, group.user_id],
        )?;
        tx.commit()?;
        log::info!("Created group '{}'", group.name);
        Ok(())
    }

    fn update_group(&mut self, group: &CustomGroup) -> AppResult<()> {
        let sets = serde_json::to_string(&group.sets)?;
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE set_groups SET name = ?1, sets = ?2 WHERE id = ?3 AND user_id = ?4",
            params![group.name, sets, group.id, group.user_id],
        )?;
        if changed == 0 {
            return Err(not_found("group", &group.id));
        }
        tx.commit()?;
        log::info!("Updated group '{}' ({} sets)", group.name, group.sets.len());
        Ok(())
    }

    fn groups_for_user(&self, user_id: &str) -> AppResult<Vec<CustomGroup>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, sets, user_id FROM set_groups WHERE user_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<rusqlite::Result<Vec<(String, String, String, String)>>>()?;
        rows.into_iter()
            .map(|(id, name, sets, user_id)| group_from_parts(id, name, sets, user_id))
            .collect()
    }

    fn delete_group(&mut self, user_id: &str, id: &str) -> AppResult<()> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM set_groups WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(not_found("group", id));
        }
        tx.commit()?;
        log::info!("Deleted group {}", id);
        Ok(())
    }
}
