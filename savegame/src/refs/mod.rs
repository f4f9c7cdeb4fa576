//! Reference store - the indirection tables a savegame stores its values in.
//!
//! Savegames never write strings, lists, tables or positions inline. Each is
//! declared once under a small integer id and referenced by that id:
//! - **strings**: interned literals
//! - **lists**: ordered sequences of [`TypedValue`]
//! - **tables**: key/value maps whose keys are themselves string ids
//! - **positions**: 3D coordinates

mod value;

pub use value::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::entities::Vec3;

/// Id of an entry in one of the reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RefId(pub u64);

impl std::fmt::Display for RefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id of a table key. Its name is the string interned under the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId(pub u64);

impl KeyId {
    /// The string id carrying this key's name.
    pub fn name_ref(&self) -> RefId {
        RefId(self.0)
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four kinds of reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefKind {
    String,
    List,
    Table,
    Vector,
}

impl RefKind {
    /// Parse the `type` attribute of a `refs` block.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "string" => Some(RefKind::String),
            "list" => Some(RefKind::List),
            "table" => Some(RefKind::Table),
            "vector" => Some(RefKind::Vector),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RefKind::String => "string",
            RefKind::List => "list",
            RefKind::Table => "table",
            RefKind::Vector => "vector",
        }
    }
}

impl std::fmt::Display for RefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entries of a single table, keyed by key id.
pub type TableEntries = HashMap<KeyId, TypedValue>;

/// All indirection tables populated while decoding.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    strings: HashMap<RefId, String>,
    lists: HashMap<RefId, Vec<TypedValue>>,
    tables: HashMap<RefId, TableEntries>,
    positions: HashMap<RefId, Vec3>,
    /// Key ids seen in tables. Names stay `None` until [`Self::resolve_key_names`].
    table_key_names: HashMap<KeyId, Option<String>>,
}

impl ReferenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string. The first literal bound to an id wins.
    pub fn insert_string(&mut self, id: RefId, value: impl Into<String>) -> bool {
        if self.strings.contains_key(&id) {
            debug!(%id, "string reference declared twice, keeping the first");
            return false;
        }
        self.strings.insert(id, value.into());
        true
    }

    /// Bind a position to an id.
    pub fn insert_position(&mut self, id: RefId, position: Vec3) {
        self.positions.insert(id, position);
    }

    /// Reserve an empty list for later population.
    pub fn reserve_list(&mut self, id: RefId) {
        self.lists.entry(id).or_default();
    }

    /// Reserve an empty table for later population.
    pub fn reserve_table(&mut self, id: RefId) {
        self.tables.entry(id).or_default();
    }

    /// Append a value to a reserved list. Returns `false` if the list is unknown.
    pub fn push_list_value(&mut self, list: RefId, value: TypedValue) -> bool {
        match self.lists.get_mut(&list) {
            Some(values) => {
                values.push(value);
                true
            }
            None => false,
        }
    }

    /// Store a value under a key of a reserved table. Returns `false` if the table is unknown.
    pub fn insert_table_value(&mut self, table: RefId, key: KeyId, value: TypedValue) -> bool {
        match self.tables.get_mut(&table) {
            Some(entries) => {
                entries.insert(key, value);
                true
            }
            None => false,
        }
    }

    /// Record that a key id was used. Its name is resolved later.
    pub fn register_key(&mut self, key: KeyId) {
        self.table_key_names.entry(key).or_insert(None);
    }

    /// Resolve every registered key id against the string table.
    ///
    /// Must run after all strings are known: a key's name may be declared
    /// after the key is first used. Returns the keys that stay unresolved,
    /// in ascending order.
    pub fn resolve_key_names(&mut self) -> Vec<KeyId> {
        let mut unresolved = Vec::new();
        for (key, name) in self.table_key_names.iter_mut() {
            match self.strings.get(&key.name_ref()) {
                Some(resolved) => *name = Some(resolved.clone()),
                None => unresolved.push(*key),
            }
        }
        unresolved.sort();
        unresolved
    }

    pub fn string(&self, id: RefId) -> Option<&str> {
        self.strings.get(&id).map(String::as_str)
    }

    pub fn list(&self, id: RefId) -> Option<&[TypedValue]> {
        self.lists.get(&id).map(Vec::as_slice)
    }

    pub fn table(&self, id: RefId) -> Option<&TableEntries> {
        self.tables.get(&id)
    }

    pub fn position(&self, id: RefId) -> Option<Vec3> {
        self.positions.get(&id).copied()
    }

    /// Resolved name of a key, if the resolution pass found one.
    pub fn key_name(&self, key: KeyId) -> Option<&str> {
        self.table_key_names.get(&key).and_then(|name| name.as_deref())
    }

    /// Iterate over all registered keys and their (possibly unresolved) names.
    pub fn key_names(&self) -> impl Iterator<Item = (KeyId, Option<&str>)> {
        self.table_key_names
            .iter()
            .map(|(key, name)| (*key, name.as_deref()))
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn key_count(&self) -> usize {
        self.table_key_names.len()
    }
}
