//! Streaming savegame decoder.
//!
//! The decoder is a state machine fed [`TagEvent`]s in document order:
//!
//! ```text
//! Idle -> InRefsBlock(kind) -> InRef(id) -> InValue | InKey -> InRef -> InRefsBlock -> Idle
//! ```
//!
//! It never looks ahead past the current element's attributes. Table keys
//! are only registered while streaming; their names are resolved in a
//! separate pass by [`SavegameDecoder::finish`], because a key's name string
//! may be declared after the key is first used.

mod loader;
mod xml;

pub use loader::*;
pub use xml::*;

use std::str::FromStr;
use tracing::{debug, info};

use crate::config::DecoderConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::entities::{Component, Vec3};
use crate::refs::{KeyId, RefId, RefKind, ReferenceStore, TypedValue, ValueShape};

const TAG_COMPONENT: &str = "component";
const TAG_REFS: &str = "refs";
const TAG_REF: &str = "ref";
const TAG_VALUE: &str = "value";
const TAG_KEY: &str = "key";

/// The ref currently being populated.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveRef {
    kind: RefKind,
    /// `None` when the ref's id failed to parse; its children are dropped.
    id: Option<RefId>,
    /// Most recent table key still waiting for its value.
    pending_key: Option<KeyId>,
}

impl ActiveRef {
    fn new(kind: RefKind, id: Option<RefId>) -> Self {
        Self {
            kind,
            id,
            pending_key: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    /// Inside a `refs` block. `None` for block types we do not decode.
    InRefsBlock(Option<RefKind>),
    InRef(ActiveRef),
    InValue(ActiveRef),
    InKey(ActiveRef),
}

/// Everything the decode phase produces.
#[derive(Debug, Clone)]
pub struct DecodedSavegame {
    pub store: ReferenceStore,
    pub components: Vec<Component>,
    /// Id of the list holding the combat event log, if the sentinel was found.
    pub event_log_root: Option<RefId>,
    pub diagnostics: Diagnostics,
}

/// State machine populating a [`ReferenceStore`] from tag events.
pub struct SavegameDecoder {
    event_log_name: String,
    state: State,
    store: ReferenceStore,
    components: Vec<Component>,
    components_checked: usize,
    event_log_root: Option<RefId>,
    diagnostics: Diagnostics,
}

impl SavegameDecoder {
    /// Create a decoder with an empty store.
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            event_log_name: config.event_log_name.clone(),
            state: State::Idle,
            store: ReferenceStore::new(),
            components: Vec::new(),
            components_checked: 0,
            event_log_root: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Feed the next structural event.
    pub fn feed(&mut self, event: TagEvent) {
        match event {
            TagEvent::Open { name, attributes } => self.open(&name, &attributes),
            TagEvent::Close { name } => self.close(&name),
        }
    }

    fn open(&mut self, name: &str, attributes: &Attributes) {
        if name == TAG_COMPONENT {
            self.handle_component(attributes);
            return;
        }

        self.state = match (self.state, name) {
            (State::Idle, TAG_REFS) => {
                State::InRefsBlock(attributes.get("type").and_then(RefKind::parse))
            }
            (State::Idle, TAG_VALUE) => {
                self.handle_event_log_sentinel(attributes);
                State::Idle
            }
            (State::InRefsBlock(Some(kind)), TAG_REF) => {
                let id = self.handle_ref(kind, attributes);
                State::InRef(ActiveRef::new(kind, id))
            }
            (State::InRef(active), TAG_VALUE) => State::InValue(self.handle_value(active, attributes)),
            (State::InRef(active), TAG_KEY) => State::InKey(self.handle_key(active, attributes)),
            (state, _) => state,
        };
    }

    fn close(&mut self, name: &str) {
        self.state = match (self.state, name) {
            (State::Idle, _) => State::Idle,
            (_, TAG_REFS) => State::Idle,
            (State::InRef(active), TAG_REF) => State::InRefsBlock(Some(active.kind)),
            (State::InValue(active), TAG_VALUE) => State::InRef(active),
            (State::InKey(active), TAG_KEY) => State::InRef(active),
            (state, _) => state,
        };
    }

    /// Run the key resolution pass and hand over the decoded data.
    pub fn finish(mut self) -> DecodedSavegame {
        for key in self.store.resolve_key_names() {
            self.diagnostics.record(Diagnostic::UnresolvedKey { key });
        }

        info!(
            checked = self.components_checked,
            kept = self.components.len(),
            "loaded ship and station components"
        );
        info!(
            strings = self.store.string_count(),
            lists = self.store.list_count(),
            tables = self.store.table_count(),
            positions = self.store.position_count(),
            keys = self.store.key_count(),
            "decoded reference tables"
        );

        DecodedSavegame {
            store: self.store,
            components: self.components,
            event_log_root: self.event_log_root,
            diagnostics: self.diagnostics,
        }
    }

    fn handle_component(&mut self, attributes: &Attributes) {
        self.components_checked += 1;
        if let Some(component) = Component::from_attributes(
            attributes.get("class"),
            attributes.get("code"),
            attributes.get("owner"),
        ) {
            self.components.push(component);
        }
    }

    fn handle_event_log_sentinel(&mut self, attributes: &Attributes) {
        if attributes.get("name") != Some(self.event_log_name.as_str())
            || attributes.get("type") != Some("list")
        {
            return;
        }
        if let Some(id) = self.required_number::<u64>(TAG_VALUE, attributes, "value") {
            debug!(id, name = %self.event_log_name, "found event log list");
            self.event_log_root = Some(RefId(id));
        }
    }

    fn handle_ref(&mut self, kind: RefKind, attributes: &Attributes) -> Option<RefId> {
        let id = RefId(self.required_number::<u64>(TAG_REF, attributes, "id")?);
        match kind {
            RefKind::String => match attributes.get("string") {
                Some(literal) => {
                    self.store.insert_string(id, literal);
                }
                None => self.diagnostics.record(Diagnostic::MissingAttribute {
                    element: TAG_REF.to_string(),
                    attribute: "string".to_string(),
                }),
            },
            RefKind::Vector => {
                let x = self.required_number::<f64>(TAG_REF, attributes, "x")?;
                let y = self.required_number::<f64>(TAG_REF, attributes, "y")?;
                let z = self.required_number::<f64>(TAG_REF, attributes, "z")?;
                self.store.insert_position(id, Vec3::new(x, y, z));
            }
            RefKind::List => self.store.reserve_list(id),
            RefKind::Table => self.store.reserve_table(id),
        }
        Some(id)
    }

    /// Decode a `value` element and store it in the active container.
    ///
    /// The pending table key is consumed whether or not the value decodes.
    fn handle_value(&mut self, active: ActiveRef, attributes: &Attributes) -> ActiveRef {
        let consumed = ActiveRef {
            pending_key: None,
            ..active
        };
        let Some(container) = active.id else {
            return consumed;
        };
        let Some(value) = self.decode_value(attributes) else {
            return consumed;
        };

        match active.kind {
            RefKind::List => {
                self.store.push_list_value(container, value);
            }
            RefKind::Table => match active.pending_key {
                Some(key) => {
                    self.store.insert_table_value(container, key, value);
                }
                None => self
                    .diagnostics
                    .record(Diagnostic::ValueWithoutKey { table: container }),
            },
            RefKind::String | RefKind::Vector => self
                .diagnostics
                .record(Diagnostic::ValueOutsideContainer { kind: active.kind }),
        }
        consumed
    }

    /// Build a [`TypedValue`] from `type` and `value` attributes.
    ///
    /// Unknown types are dropped without a diagnostic.
    fn decode_value(&mut self, attributes: &Attributes) -> Option<TypedValue> {
        let shape = ValueShape::for_type(attributes.get("type")?)?;
        match shape {
            ValueShape::StringRef
            | ValueShape::ListRef
            | ValueShape::TableRef
            | ValueShape::PositionRef => {
                let id = self.required_number::<u64>(TAG_VALUE, attributes, "value")?;
                shape.reference(RefId(id))
            }
            ValueShape::Seconds => self
                .required_number::<f64>(TAG_VALUE, attributes, "value")
                .map(TypedValue::Time),
            ValueShape::Meters => self
                .required_number::<f64>(TAG_VALUE, attributes, "value")
                .map(TypedValue::Length),
            ValueShape::Keyword => match attributes.get("value") {
                Some(word) => Some(TypedValue::Keyword(word.to_string())),
                None => {
                    self.record_missing(TAG_VALUE, "value");
                    None
                }
            },
        }
    }

    fn handle_key(&mut self, active: ActiveRef, attributes: &Attributes) -> ActiveRef {
        if active.kind != RefKind::Table || active.id.is_none() {
            return active;
        }
        if attributes.get("type") != Some("string") {
            return ActiveRef {
                pending_key: None,
                ..active
            };
        }
        let pending_key = self
            .required_number::<u64>(TAG_KEY, attributes, "value")
            .map(KeyId);
        if let Some(key) = pending_key {
            self.store.register_key(key);
        }
        ActiveRef {
            pending_key,
            ..active
        }
    }

    /// Parse a numeric attribute, recording a diagnostic if it is absent or malformed.
    fn required_number<T: FromStr>(
        &mut self,
        element: &str,
        attributes: &Attributes,
        attribute: &str,
    ) -> Option<T> {
        let Some(raw) = attributes.get(attribute) else {
            self.record_missing(element, attribute);
            return None;
        };
        match raw.trim().parse::<T>() {
            Ok(number) => Some(number),
            Err(_) => {
                self.diagnostics.record(Diagnostic::InvalidNumber {
                    element: element.to_string(),
                    attribute: attribute.to_string(),
                    value: raw.to_string(),
                });
                None
            }
        }
    }

    fn record_missing(&mut self, element: &str, attribute: &str) {
        self.diagnostics.record(Diagnostic::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        });
    }
}
