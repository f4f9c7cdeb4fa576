//! Event materializer - builds [`CombatEvent`]s from the decoded event log.
//!
//! Every entry of the event log list references a table. Table keys are
//! interned strings, and the same logical key may be interned under several
//! ids across one save, so fields are looked up through a name -> key ids
//! index and the first id present in an entry wins.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::entities::{CombatEvent, Combatant, GameTime, Vec3};
use crate::refs::{KeyId, RefId, RefKind, ReferenceStore, TableEntries, TypedValue};

/// Key names used by the event-logging script.
pub mod fields {
    pub const TIMESTAMP: &str = "$timestamp";
    pub const EVENT_TYPE: &str = "$eventtype";
    pub const ATTACKER_ID: &str = "$attackerid";
    pub const ATTACKER: &str = "$attacker";
    pub const ATTACKER_TYPE: &str = "$attackertype";
    pub const ATTACKER_FACTION: &str = "$attackerfaction";
    pub const ATTACKED_ID: &str = "$attackedid";
    pub const ATTACKED: &str = "$attacked";
    pub const ATTACKED_TYPE: &str = "$attackedtype";
    pub const ATTACKED_FACTION: &str = "$attackedfaction";
    pub const TARGET_COMPONENT: &str = "$targetcomponent";
    pub const SECTOR: &str = "$sector";
    pub const POSITION: &str = "$position";
}

/// Resolved key name -> every key id interned under that name.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    ids: HashMap<String, Vec<KeyId>>,
}

impl KeyIndex {
    /// Invert the store's resolved key names. Unresolved keys are left out.
    pub fn from_store(store: &ReferenceStore) -> Self {
        let mut ids: HashMap<String, Vec<KeyId>> = HashMap::new();
        for (key, name) in store.key_names() {
            if let Some(name) = name {
                ids.entry(name.to_string()).or_default().push(key);
            }
        }
        for candidates in ids.values_mut() {
            candidates.sort();
        }
        Self { ids }
    }

    /// All key ids carrying `name`, in ascending id order.
    pub fn ids(&self, name: &str) -> &[KeyId] {
        self.ids.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Probe a table entry with each candidate id; the first present wins.
    pub fn probe<'t>(&self, entries: &'t TableEntries, name: &str) -> Option<&'t TypedValue> {
        self.ids(name).iter().find_map(|key| entries.get(key))
    }
}

/// Output of one materialization pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Materialized {
    /// Events in event log order.
    pub events: Vec<CombatEvent>,
    pub diagnostics: Diagnostics,
}

/// Reads combat events out of a decoded [`ReferenceStore`].
pub struct EventMaterializer<'a> {
    store: &'a ReferenceStore,
    keys: KeyIndex,
}

impl<'a> EventMaterializer<'a> {
    /// Create a materializer, building the key index once.
    pub fn new(store: &'a ReferenceStore) -> Self {
        Self {
            store,
            keys: KeyIndex::from_store(store),
        }
    }

    /// Build one event per table entry of the event log list.
    ///
    /// `event_log_name` is only used to describe a missing root.
    pub fn materialize(&self, root: Option<RefId>, event_log_name: &str) -> Materialized {
        let mut output = Materialized::default();

        let Some(root) = root else {
            output.diagnostics.record(Diagnostic::EventLogNotFound {
                name: event_log_name.to_string(),
            });
            return output;
        };
        let Some(entries) = self.store.list(root) else {
            output.diagnostics.record(Diagnostic::DanglingReference {
                kind: RefKind::List,
                id: root,
            });
            return output;
        };

        for (index, entry) in entries.iter().enumerate() {
            let table_id = match entry {
                TypedValue::TableRef(id) => *id,
                TypedValue::StringRef(_)
                | TypedValue::ListRef(_)
                | TypedValue::PositionRef(_)
                | TypedValue::Time(_)
                | TypedValue::Length(_)
                | TypedValue::Keyword(_) => {
                    output.diagnostics.record(Diagnostic::NonTableEntry {
                        index,
                        found: entry.kind_name().to_string(),
                    });
                    continue;
                }
            };
            let Some(table) = self.store.table(table_id) else {
                output.diagnostics.record(Diagnostic::DanglingReference {
                    kind: RefKind::Table,
                    id: table_id,
                });
                continue;
            };
            if let Some(event) = self.build_event(table_id, table, &mut output.diagnostics) {
                output.events.push(event);
            }
        }

        info!(
            entries = entries.len(),
            events = output.events.len(),
            "materialized combat events"
        );
        output
    }

    fn build_event(
        &self,
        table_id: RefId,
        table: &TableEntries,
        diagnostics: &mut Diagnostics,
    ) -> Option<CombatEvent> {
        let Some(timestamp) = self.time(table_id, table, fields::TIMESTAMP, diagnostics) else {
            diagnostics.record(Diagnostic::MissingTimestamp { table: table_id });
            return None;
        };

        let mut required = |field: &str| self.required_text(table_id, table, field, diagnostics);
        let event_type = required(fields::EVENT_TYPE);
        let attacker_id = required(fields::ATTACKER_ID);
        let attacked_id = required(fields::ATTACKED_ID);
        let sector = required(fields::SECTOR);

        let mut text = |field: &str| self.text(table_id, table, field, diagnostics);
        let event = CombatEvent {
            timestamp,
            event_type,
            attacker: Combatant {
                id: attacker_id,
                name: text(fields::ATTACKER),
                ship_type: text(fields::ATTACKER_TYPE),
                faction: text(fields::ATTACKER_FACTION),
            },
            attacked: Combatant {
                id: attacked_id,
                name: text(fields::ATTACKED),
                ship_type: text(fields::ATTACKED_TYPE),
                faction: text(fields::ATTACKED_FACTION),
            },
            target_component: text(fields::TARGET_COMPONENT),
            sector,
            position: self.position(table_id, table, fields::POSITION, diagnostics),
        };
        debug!(table = %table_id, time = %event.timestamp, "materialized event");
        Some(event)
    }

    /// A textual field every event should carry. Absence is diagnosed.
    fn required_text(
        &self,
        table_id: RefId,
        table: &TableEntries,
        field: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        if self.keys.probe(table, field).is_none() {
            diagnostics.record(Diagnostic::MissingField {
                table: table_id,
                field: field.to_string(),
            });
            return None;
        }
        self.text(table_id, table, field, diagnostics)
    }

    /// A textual field: a string reference or an inline keyword.
    fn text(
        &self,
        table_id: RefId,
        table: &TableEntries,
        field: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let value = self.keys.probe(table, field)?;
        match value {
            TypedValue::StringRef(id) => match self.store.string(*id) {
                Some(text) => Some(text.to_string()),
                None => {
                    diagnostics.record(Diagnostic::DanglingReference {
                        kind: RefKind::String,
                        id: *id,
                    });
                    None
                }
            },
            TypedValue::Keyword(word) => Some(word.clone()),
            TypedValue::ListRef(_)
            | TypedValue::TableRef(_)
            | TypedValue::PositionRef(_)
            | TypedValue::Time(_)
            | TypedValue::Length(_) => {
                diagnostics.record(wrong_kind(table_id, field, value));
                None
            }
        }
    }

    fn time(
        &self,
        table_id: RefId,
        table: &TableEntries,
        field: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<GameTime> {
        let value = self.keys.probe(table, field)?;
        match value {
            TypedValue::Time(seconds) => Some(GameTime(*seconds)),
            TypedValue::StringRef(_)
            | TypedValue::ListRef(_)
            | TypedValue::TableRef(_)
            | TypedValue::PositionRef(_)
            | TypedValue::Length(_)
            | TypedValue::Keyword(_) => {
                diagnostics.record(wrong_kind(table_id, field, value));
                None
            }
        }
    }

    fn position(
        &self,
        table_id: RefId,
        table: &TableEntries,
        field: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<Vec3> {
        let value = self.keys.probe(table, field)?;
        match value {
            TypedValue::PositionRef(id) => {
                let position = self.store.position(*id);
                if position.is_none() {
                    diagnostics.record(Diagnostic::DanglingReference {
                        kind: RefKind::Vector,
                        id: *id,
                    });
                }
                position
            }
            TypedValue::StringRef(_)
            | TypedValue::ListRef(_)
            | TypedValue::TableRef(_)
            | TypedValue::Time(_)
            | TypedValue::Length(_)
            | TypedValue::Keyword(_) => {
                diagnostics.record(wrong_kind(table_id, field, value));
                None
            }
        }
    }
}

fn wrong_kind(table: RefId, field: &str, found: &TypedValue) -> Diagnostic {
    Diagnostic::WrongValueKind {
        table,
        field: field.to_string(),
        found: found.kind_name().to_string(),
    }
}
