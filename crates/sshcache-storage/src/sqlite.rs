//! SQLite implementation of [`AttributeStore`].
//!
//! [`SqliteStore`] persists entries in a SQLite database with WAL mode and
//! automatic schema migrations. Each attribute value is one row of
//! `entry_attrs`; filters are translated to `EXISTS` sub-queries over that
//! table with bound parameters.
//!
//! Single writes run inside a savepoint so they are atomic on their own.
//! Explicit transactions map to `BEGIN IMMEDIATE` at the outermost level,
//! which takes the database write lock up front: two connections running a
//! read-merge-write sequence are serialized instead of both reading the
//! same state.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::trace;

use sshcache_core::{AttrValue, Attributes, Entry, Filter};

use crate::error::StorageError;
use crate::traits::AttributeStore;

/// SQLite-backed implementation of [`AttributeStore`].
pub struct SqliteStore {
    conn: Connection,
    /// Open transaction levels started through the trait.
    depth: usize,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn, depth: 0 })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn, depth: 0 })
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn savepoint_name(level: usize) -> String {
        format!("sshcache_tx_{}", level)
    }

    /// Returns the row id of an entry, creating the entry row if needed.
    fn ensure_entry(conn: &Connection, namespace: &str, name: &str) -> Result<i64, StorageError> {
        conn.execute(
            "INSERT INTO entries (namespace, name) VALUES (?1, ?2)
             ON CONFLICT (namespace, name) DO NOTHING",
            params![namespace, name],
        )?;
        let id = conn.query_row(
            "SELECT id FROM entries WHERE namespace = ?1 AND name = ?2",
            params![namespace, name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Inserts the values of one attribute.
    fn insert_values(
        conn: &Connection,
        entry_id: i64,
        attr: &str,
        values: &[AttrValue],
    ) -> Result<(), StorageError> {
        let mut stmt = conn.prepare_cached(
            "INSERT INTO entry_attrs (entry_id, attr, position, value, int_value) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (position, value) in values.iter().enumerate() {
            stmt.execute(params![
                entry_id,
                attr,
                position as i64,
                value.to_string(),
                value.as_int(),
            ])?;
        }
        Ok(())
    }

    /// Loads the attributes of one entry, keeping only `wanted` if given.
    fn load_attributes(
        &self,
        entry_id: i64,
        wanted: Option<&[&str]>,
    ) -> Result<Attributes, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT attr, value, int_value FROM entry_attrs WHERE entry_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![entry_id], |row| {
            let attr: String = row.get(0)?;
            let value: String = row.get(1)?;
            let int_value: Option<i64> = row.get(2)?;
            Ok((attr, value, int_value))
        })?;

        let mut attrs = Attributes::new();
        for row in rows {
            let (attr, value, int_value) = row?;
            if let Some(wanted) = wanted {
                if !wanted.contains(&attr.as_str()) {
                    continue;
                }
            }
            let value = match int_value {
                Some(v) => AttrValue::Int(v),
                None => AttrValue::Text(value),
            };
            attrs.add_value(&attr, value)?;
        }
        Ok(attrs)
    }

    /// Translates a filter into a SQL condition over entry alias `e`,
    /// appending its bound parameters in order.
    fn filter_sql(filter: &Filter, params: &mut Vec<Value>) -> String {
        const ATTR_ROW: &str =
            "EXISTS (SELECT 1 FROM entry_attrs a WHERE a.entry_id = e.id AND a.attr = ?";
        match filter {
            Filter::Equals { attr, value } => {
                params.push(Value::Text(attr.clone()));
                params.push(Value::Text(value.to_string()));
                format!("{} AND a.value = ?)", ATTR_ROW)
            }
            Filter::GreaterOrEqual { attr, value } => {
                params.push(Value::Text(attr.clone()));
                params.push(Value::Integer(*value));
                format!("{} AND a.int_value >= ?)", ATTR_ROW)
            }
            Filter::Present { attr } => {
                params.push(Value::Text(attr.clone()));
                format!("{})", ATTR_ROW)
            }
            Filter::And(filters) if filters.is_empty() => "1".to_string(),
            Filter::And(filters) => {
                let parts: Vec<String> = filters
                    .iter()
                    .map(|f| Self::filter_sql(f, params))
                    .collect();
                format!("({})", parts.join(" AND "))
            }
        }
    }
}

impl AttributeStore for SqliteStore {
    fn store_entry(
        &mut self,
        namespace: &str,
        name: &str,
        attrs: &Attributes,
    ) -> Result<(), StorageError> {
        trace!(namespace, name, attrs = attrs.len(), "replacing entry");
        let sp = self.conn.savepoint()?;
        let entry_id = Self::ensure_entry(&sp, namespace, name)?;
        sp.execute(
            "DELETE FROM entry_attrs WHERE entry_id = ?1",
            params![entry_id],
        )?;
        for (attr, values) in attrs.iter() {
            Self::insert_values(&sp, entry_id, attr, values)?;
        }
        sp.commit()?;
        Ok(())
    }

    fn update_entry(
        &mut self,
        namespace: &str,
        name: &str,
        attrs: &Attributes,
    ) -> Result<(), StorageError> {
        trace!(namespace, name, attrs = attrs.len(), "merging into entry");
        let sp = self.conn.savepoint()?;
        let entry_id = Self::ensure_entry(&sp, namespace, name)?;
        for (attr, values) in attrs.iter() {
            sp.execute(
                "DELETE FROM entry_attrs WHERE entry_id = ?1 AND attr = ?2",
                params![entry_id, attr],
            )?;
            Self::insert_values(&sp, entry_id, attr, values)?;
        }
        sp.commit()?;
        Ok(())
    }

    fn search_entries(
        &self,
        namespace: &str,
        filter: &Filter,
        wanted: Option<&[&str]>,
    ) -> Result<Vec<Entry>, StorageError> {
        let mut params = vec![Value::Text(namespace.to_string())];
        let condition = Self::filter_sql(filter, &mut params);
        let sql = format!(
            "SELECT e.id, e.name FROM entries e WHERE e.namespace = ? AND {} ORDER BY e.name",
            condition
        );
        trace!(namespace, %filter, sql = %sql, "searching entries");

        let matched: Vec<(i64, String)> = {
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;
            let mut matched = Vec::new();
            for row in rows {
                matched.push(row?);
            }
            matched
        };

        if matched.is_empty() {
            return Err(StorageError::NoMatch {
                namespace: namespace.to_string(),
                filter: filter.to_string(),
            });
        }

        let mut entries = Vec::with_capacity(matched.len());
        for (entry_id, name) in matched {
            let attributes = self.load_attributes(entry_id, wanted)?;
            entries.push(Entry::new(name, attributes));
        }
        Ok(entries)
    }

    fn delete_entry(&mut self, namespace: &str, name: &str) -> Result<(), StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM entries WHERE namespace = ?1 AND name = ?2",
            params![namespace, name],
        )?;
        trace!(namespace, name, removed, "deleted entry");
        Ok(())
    }

    fn begin_transaction(&mut self) -> Result<(), StorageError> {
        if self.depth == 0 {
            self.conn.execute_batch("BEGIN IMMEDIATE")?;
        } else {
            self.conn
                .execute_batch(&format!("SAVEPOINT {}", Self::savepoint_name(self.depth)))?;
        }
        self.depth += 1;
        trace!(depth = self.depth, "transaction started");
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<(), StorageError> {
        let level = self.depth.checked_sub(1).ok_or(StorageError::NoTransaction)?;
        if level == 0 {
            self.conn.execute_batch("COMMIT")?;
        } else {
            self.conn
                .execute_batch(&format!("RELEASE {}", Self::savepoint_name(level)))?;
        }
        // Only after success: a failed COMMIT leaves the level open for cancel.
        self.depth = level;
        trace!(depth = self.depth, "transaction committed");
        Ok(())
    }

    fn cancel_transaction(&mut self) -> Result<(), StorageError> {
        let level = self.depth.checked_sub(1).ok_or(StorageError::NoTransaction)?;
        self.depth = level;
        if level == 0 {
            // SQLite may already have rolled back on its own (e.g. disk full).
            if !self.conn.is_autocommit() {
                self.conn.execute_batch("ROLLBACK")?;
            }
        } else {
            let sp = Self::savepoint_name(level);
            self.conn
                .execute_batch(&format!("ROLLBACK TO {sp}; RELEASE {sp}"))?;
        }
        trace!(depth = self.depth, "transaction cancelled");
        Ok(())
    }

    fn transaction_depth(&self) -> usize {
        self.depth
    }
}

impl SqliteStore {
    /// Returns true if entry `name` exists in `namespace`, regardless of its
    /// attributes.
    pub fn entry_exists(&self, namespace: &str, name: &str) -> Result<bool, StorageError> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM entries WHERE namespace = ?1 AND name = ?2",
                params![namespace, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "ssh_hosts";

    fn host(name: &str, expire: i64) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.add_string("objectClass", "sshHost").unwrap();
        attrs.add_string("name", name).unwrap();
        attrs.add_int("sshKnownHostsExpire", expire).unwrap();
        attrs
    }

    #[test]
    fn store_then_search_roundtrips_value_kinds() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut attrs = host("web01", 100);
        attrs.add_string("nameAlias", "a1").unwrap();
        attrs.add_string("nameAlias", "a2").unwrap();
        store.store_entry(NS, "web01", &attrs).unwrap();

        let found = store
            .search_entries(NS, &Filter::equals("name", "web01"), None)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "web01");
        assert_eq!(found[0].attributes, attrs);
        assert_eq!(
            found[0].attributes.first_int("sshKnownHostsExpire").unwrap(),
            Some(100)
        );
    }

    #[test]
    fn store_replaces_and_update_merges() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut first = host("web01", 100);
        first.add_string("nameAlias", "a1").unwrap();
        store.store_entry(NS, "web01", &first).unwrap();

        let mut expire = Attributes::new();
        expire.add_int("sshKnownHostsExpire", 500).unwrap();
        store.update_entry(NS, "web01", &expire).unwrap();

        let found = store
            .search_entries(NS, &Filter::equals("name", "web01"), None)
            .unwrap();
        assert_eq!(found[0].attributes.strings("nameAlias").count(), 1);
        assert_eq!(
            found[0].attributes.first_int("sshKnownHostsExpire").unwrap(),
            Some(500)
        );

        store.store_entry(NS, "web01", &host("web01", 1)).unwrap();
        let found = store
            .search_entries(NS, &Filter::equals("name", "web01"), None)
            .unwrap();
        assert!(!found[0].attributes.contains("nameAlias"));
    }

    #[test]
    fn greater_or_equal_uses_integer_comparison() {
        let mut store = SqliteStore::in_memory().unwrap();
        // 9 < 10 numerically but "9" > "10" as text.
        store.store_entry(NS, "a", &host("a", 9)).unwrap();
        store.store_entry(NS, "b", &host("b", 10)).unwrap();
        store.store_entry(NS, "c", &host("c", 11)).unwrap();

        let found = store
            .search_entries(NS, &Filter::greater_or_equal("sshKnownHostsExpire", 10), None)
            .unwrap();
        let names: Vec<&str> = found.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn conjunction_and_projection() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.store_entry(NS, "a", &host("a", 10)).unwrap();
        store.store_entry(NS, "b", &host("b", 20)).unwrap();

        let filter = Filter::and(vec![
            Filter::present("objectClass"),
            Filter::greater_or_equal("sshKnownHostsExpire", 15),
        ]);
        let found = store.search_entries(NS, &filter, Some(&["name"])).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attributes.len(), 1);
        assert_eq!(found[0].attributes.first_string("name").unwrap(), Some("b"));
    }

    #[test]
    fn empty_result_is_no_match() {
        let store = SqliteStore::in_memory().unwrap();
        let err = store
            .search_entries(NS, &Filter::equals("name", "nobody"), None)
            .unwrap_err();
        assert!(err.is_no_match());
    }

    #[test]
    fn delete_missing_entry_succeeds() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.delete_entry(NS, "nobody").unwrap();
        store.store_entry(NS, "web01", &host("web01", 1)).unwrap();
        store.delete_entry(NS, "web01").unwrap();
        assert!(!store.entry_exists(NS, "web01").unwrap());
    }

    #[test]
    fn cancel_rolls_back_and_nesting_uses_savepoints() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.begin_transaction().unwrap();
        store.store_entry(NS, "outer", &host("outer", 1)).unwrap();

        store.begin_transaction().unwrap();
        store.store_entry(NS, "inner", &host("inner", 1)).unwrap();
        assert_eq!(store.transaction_depth(), 2);
        store.cancel_transaction().unwrap();

        store.commit_transaction().unwrap();
        assert_eq!(store.transaction_depth(), 0);
        assert!(store.entry_exists(NS, "outer").unwrap());
        assert!(!store.entry_exists(NS, "inner").unwrap());

        store.begin_transaction().unwrap();
        store.delete_entry(NS, "outer").unwrap();
        store.cancel_transaction().unwrap();
        assert!(store.entry_exists(NS, "outer").unwrap());
    }

    #[test]
    fn unbalanced_commit_is_rejected() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            store.commit_transaction(),
            Err(StorageError::NoTransaction)
        ));
        assert!(matches!(
            store.cancel_transaction(),
            Err(StorageError::NoTransaction)
        ));
    }

    #[test]
    fn filter_sql_binds_in_order() {
        let mut params = vec![Value::Text(NS.to_string())];
        let sql = SqliteStore::filter_sql(
            &Filter::and(vec![
                Filter::equals("name", "web01"),
                Filter::greater_or_equal("sshKnownHostsExpire", 7),
            ]),
            &mut params,
        );
        assert_eq!(sql.matches('?').count(), 4);
        assert_eq!(params.len(), 5);
        assert_eq!(params[4], Value::Integer(7));
    }
}
