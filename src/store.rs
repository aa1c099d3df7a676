use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DataError;

pub const PERIODS: &str = "periods";
pub const HALAQAS: &str = "halaqas";
pub const TEACHERS: &str = "teachers";
pub const STUDENTS: &str = "students";

/// A raw document as the store hands it out: the store-assigned id plus the
/// schemaless field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type SnapshotFn = Box<dyn FnMut(&[Document])>;

struct Subscriber {
    collection: &'static str,
    callback: SnapshotFn,
}

/// Adapter over the underlying document database: four named collections of
/// JSON documents with snapshot subscriptions. Single-threaded; subscription
/// callbacks run synchronously inside the mutating call.
pub struct DocumentStore {
    conn: Connection,
    subscribers: RefCell<HashMap<u64, Subscriber>>,
    next_subscription: Cell<u64>,
}

impl DocumentStore {
    pub fn open(workspace: &Path) -> anyhow::Result<DocumentStore> {
        std::fs::create_dir_all(workspace)?;
        let db_path = workspace.join("halaqa.sqlite3");
        let conn = Connection::open(db_path)?;

        for table in [PERIODS, HALAQAS, TEACHERS, STUDENTS] {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table}(
                        id TEXT PRIMARY KEY,
                        body TEXT NOT NULL
                    )"
                ),
                [],
            )?;
        }

        Ok(DocumentStore {
            conn,
            subscribers: RefCell::new(HashMap::new()),
            next_subscription: Cell::new(0),
        })
    }

    fn table(collection: &str) -> Result<&'static str, DataError> {
        match collection {
            PERIODS => Ok(PERIODS),
            HALAQAS => Ok(HALAQAS),
            TEACHERS => Ok(TEACHERS),
            STUDENTS => Ok(STUDENTS),
            other => Err(DataError::StoreUnavailable(anyhow::anyhow!(
                "unknown collection: {other}"
            ))),
        }
    }

    pub fn add(&self, collection: &str, fields: Value) -> Result<String, DataError> {
        let table = Self::table(collection)?;
        let id = Uuid::new_v4().to_string();
        let body = serde_json::to_string(&fields)?;
        self.conn.execute(
            &format!("INSERT INTO {table}(id, body) VALUES(?, ?)"),
            (&id, &body),
        )?;
        self.notify(table);
        Ok(id)
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DataError> {
        let table = Self::table(collection)?;
        let body: Option<String> = self
            .conn
            .query_row(&format!("SELECT body FROM {table} WHERE id = ?"), [id], |r| {
                r.get(0)
            })
            .optional()?;
        match body {
            Some(body) => Ok(Some(Document {
                id: id.to_string(),
                fields: serde_json::from_str(&body)?,
            })),
            None => Ok(None),
        }
    }

    /// Shallow merge of the patch's top-level fields into the document.
    pub fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), DataError> {
        let table = Self::table(collection)?;
        let Some(doc) = self.get(collection, id)? else {
            return Err(DataError::NotFound);
        };

        let mut fields = doc.fields;
        if let (Some(obj), Some(patch_obj)) = (fields.as_object_mut(), patch.as_object()) {
            for (key, value) in patch_obj {
                obj.insert(key.clone(), value.clone());
            }
        }

        let body = serde_json::to_string(&fields)?;
        self.conn.execute(
            &format!("UPDATE {table} SET body = ? WHERE id = ?"),
            (&body, id),
        )?;
        self.notify(table);
        Ok(())
    }

    pub fn delete(&self, collection: &str, id: &str) -> Result<(), DataError> {
        let table = Self::table(collection)?;
        let removed = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE id = ?"), [id])?;
        if removed == 0 {
            return Err(DataError::NotFound);
        }
        self.notify(table);
        Ok(())
    }

    /// Equality query on a top-level string field. Only used for the guard's
    /// dependent-row pre-checks; no index is maintained at this scale.
    pub fn query(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Document>, DataError> {
        let table = Self::table(collection)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, body FROM {table} WHERE json_extract(body, '$.' || ?1) = ?2 ORDER BY id"
        ))?;
        let rows = stmt.query_map((field, value), |row| {
            let id: String = row.get(0)?;
            let body: String = row.get(1)?;
            Ok((id, body))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, body) = row?;
            docs.push(Document {
                id,
                fields: serde_json::from_str(&body)?,
            });
        }
        Ok(docs)
    }

    /// Appends `element` to the document's array field unless an equal element
    /// is already there. Concurrent appends from elsewhere are not clobbered:
    /// the merge happens against the current stored body.
    pub fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: Value,
    ) -> Result<(), DataError> {
        let table = Self::table(collection)?;
        let Some(doc) = self.get(collection, id)? else {
            return Err(DataError::NotFound);
        };

        let mut fields = doc.fields;
        let obj = fields.as_object_mut().ok_or_else(|| {
            DataError::StoreUnavailable(anyhow::anyhow!("document {id} is not an object"))
        })?;
        let array = obj.entry(field).or_insert_with(|| Value::Array(Vec::new()));
        let Some(items) = array.as_array_mut() else {
            return Err(DataError::StoreUnavailable(anyhow::anyhow!(
                "field {field} of document {id} is not an array"
            )));
        };
        if !items.contains(&element) {
            items.push(element);
        }

        let body = serde_json::to_string(&fields)?;
        self.conn.execute(
            &format!("UPDATE {table} SET body = ? WHERE id = ?"),
            (&body, id),
        )?;
        self.notify(table);
        Ok(())
    }

    /// Fires once immediately with the current snapshot, then once after each
    /// mutation of the collection, until unsubscribed.
    pub fn subscribe(
        &self,
        collection: &str,
        mut callback: SnapshotFn,
    ) -> Result<SubscriptionId, DataError> {
        let table = Self::table(collection)?;
        let snapshot = self.snapshot(table)?;
        callback(&snapshot);

        let id = self.next_subscription.get();
        self.next_subscription.set(id + 1);
        self.subscribers.borrow_mut().insert(
            id,
            Subscriber {
                collection: table,
                callback,
            },
        );
        Ok(SubscriptionId(id))
    }

    pub fn unsubscribe(&self, subscription: SubscriptionId) {
        self.subscribers.borrow_mut().remove(&subscription.0);
    }

    fn snapshot(&self, table: &'static str) -> Result<Vec<Document>, DataError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id, body FROM {table} ORDER BY rowid"))?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let body: String = row.get(1)?;
            Ok((id, body))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, body) = row?;
            docs.push(Document {
                id,
                fields: serde_json::from_str(&body)?,
            });
        }
        Ok(docs)
    }

    fn notify(&self, table: &'static str) {
        let snapshot = match self.snapshot(table) {
            Ok(docs) => docs,
            Err(e) => {
                // Terminal for this collection's subscriptions; the other
                // collections keep their own.
                tracing::error!(collection = table, error = %e, "snapshot failed, dropping subscriptions");
                self.subscribers
                    .borrow_mut()
                    .retain(|_, sub| sub.collection != table);
                return;
            }
        };

        let mut subscribers = self.subscribers.borrow_mut();
        for sub in subscribers.values_mut() {
            if sub.collection == table {
                (sub.callback)(&snapshot);
            }
        }
    }
}
