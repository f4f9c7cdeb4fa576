//! Ship and station records read straight from `component` elements.

use serde::{Deserialize, Serialize};

/// A ship or station found in the savegame universe.
///
/// Components never pass through the reference tables; they are built from
/// the element's own attributes and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Macro class, e.g. `ship_l` or `station`.
    pub class: String,
    /// Unique object code such as `ABC-123`.
    pub code: String,
    pub owner: Option<String>,
}

impl Component {
    /// Build a component from `component` element attributes.
    ///
    /// Returns `None` when `class` or `code` is missing, or when the class
    /// denotes neither a ship nor a station.
    pub fn from_attributes(
        class: Option<&str>,
        code: Option<&str>,
        owner: Option<&str>,
    ) -> Option<Self> {
        let (class, code) = (class?, code?);
        if !(class.contains("ship") || class.contains("station")) {
            return None;
        }
        Some(Self {
            class: class.to_string(),
            code: code.to_string(),
            owner: owner.map(str::to_string),
        })
    }

    pub fn is_ship(&self) -> bool {
        self.class.contains("ship")
    }

    pub fn is_station(&self) -> bool {
        self.class.contains("station")
    }

    /// Check if class, code or owner contains `needle`.
    pub fn matches(&self, needle: &str) -> bool {
        self.class.contains(needle)
            || self.code.contains(needle)
            || self.owner.as_deref().is_some_and(|o| o.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ship_component() {
        let component = Component::from_attributes(Some("ship_l"), Some("ABC-123"), Some("argon"));
        let component = component.unwrap();
        assert!(component.is_ship());
        assert!(!component.is_station());
        assert_eq!(component.owner.as_deref(), Some("argon"));
    }

    #[test]
    fn test_station_without_owner() {
        let component = Component::from_attributes(Some("station"), Some("XYZ-001"), None).unwrap();
        assert!(component.is_station());
        assert!(component.owner.is_none());
    }

    #[test]
    fn test_filtered_components() {
        assert!(Component::from_attributes(Some("sector"), Some("SEC-1"), None).is_none());
        assert!(Component::from_attributes(None, Some("ABC-123"), None).is_none());
        assert!(Component::from_attributes(Some("ship_s"), None, None).is_none());
    }

    #[test]
    fn test_matches() {
        let component = Component::from_attributes(Some("ship_m"), Some("KLM-420"), Some("teladi")).unwrap();
        assert!(component.matches("KLM"));
        assert!(component.matches("tela"));
        assert!(component.matches("ship"));
        assert!(!component.matches("argon"));
    }
}
