//! Tagged values stored in lists and tables.

use serde::{Deserialize, Serialize};

use super::RefId;

/// A value inside a list or table.
///
/// Reference variants hold an id into one of the store's tables; the rest
/// carry their literal inline. Consumers match exhaustively so a reference
/// id is never read as a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedValue {
    StringRef(RefId),
    ListRef(RefId),
    TableRef(RefId),
    PositionRef(RefId),
    /// Game time in seconds.
    Time(f64),
    /// Distance in meters.
    Length(f64),
    /// Literal keyword, e.g. an `xmlkeyword`, `shiptype` or `class` value.
    Keyword(String),
}

impl TypedValue {
    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypedValue::StringRef(_) => "string",
            TypedValue::ListRef(_) => "list",
            TypedValue::TableRef(_) => "table",
            TypedValue::PositionRef(_) => "position",
            TypedValue::Time(_) => "time",
            TypedValue::Length(_) => "length",
            TypedValue::Keyword(_) => "keyword",
        }
    }
}

/// How a `value` element's `type` attribute maps onto a [`TypedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    StringRef,
    ListRef,
    TableRef,
    PositionRef,
    Seconds,
    Meters,
    Keyword,
}

impl ValueShape {
    /// Look up the shape for a `type` attribute. Unknown types yield `None`.
    pub fn for_type(value_type: &str) -> Option<Self> {
        match value_type {
            "string" => Some(ValueShape::StringRef),
            "list" => Some(ValueShape::ListRef),
            "table" => Some(ValueShape::TableRef),
            "position" => Some(ValueShape::PositionRef),
            "time" => Some(ValueShape::Seconds),
            "length" => Some(ValueShape::Meters),
            "xmlkeyword" | "shiptype" | "class" => Some(ValueShape::Keyword),
            _ => None,
        }
    }

    /// Wrap a reference id. `None` for shapes that carry a literal.
    pub fn reference(self, id: RefId) -> Option<TypedValue> {
        match self {
            ValueShape::StringRef => Some(TypedValue::StringRef(id)),
            ValueShape::ListRef => Some(TypedValue::ListRef(id)),
            ValueShape::TableRef => Some(TypedValue::TableRef(id)),
            ValueShape::PositionRef => Some(TypedValue::PositionRef(id)),
            ValueShape::Seconds | ValueShape::Meters | ValueShape::Keyword => None,
        }
    }
}
