//! Combat events materialized from the savegame event log.

use serde::{Deserialize, Serialize};

use super::{GameTime, Vec3};

/// Ship types that make a participant "major".
pub const MAJOR_SHIP_TYPES: [&str; 4] = ["destroyer", "battleship", "carrier", "resupplier"];

/// Check if a ship type is one of the capital classes.
pub fn is_major_ship_type(ship_type: &str) -> bool {
    MAJOR_SHIP_TYPES
        .iter()
        .any(|major| major.eq_ignore_ascii_case(ship_type))
}

/// One side of a combat event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Combatant {
    /// Unit code, e.g. `ABC-123`.
    pub id: Option<String>,
    pub name: Option<String>,
    pub ship_type: Option<String>,
    pub faction: Option<String>,
}

impl Combatant {
    /// Create a combatant with the given unit code.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_ship_type(mut self, ship_type: impl Into<String>) -> Self {
        self.ship_type = Some(ship_type.into());
        self
    }

    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction = Some(faction.into());
        self
    }

    /// Check if this combatant pilots a capital-class ship.
    pub fn is_major(&self) -> bool {
        self.ship_type.as_deref().is_some_and(is_major_ship_type)
    }
}

/// A single attack or destruction record from the event log.
///
/// Everything is copied out of the reference tables, so an event outlives
/// the store it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub timestamp: GameTime,
    pub event_type: Option<String>,
    pub attacker: Combatant,
    pub attacked: Combatant,
    /// Sub-component of the attacked object that was hit.
    pub target_component: Option<String>,
    pub sector: Option<String>,
    /// Position of the attacked object. May be absent.
    pub position: Option<Vec3>,
}

impl CombatEvent {
    /// Create an event at the given time with every other field absent.
    pub fn new(timestamp: GameTime) -> Self {
        Self {
            timestamp,
            event_type: None,
            attacker: Combatant::default(),
            attacked: Combatant::default(),
            target_component: None,
            sector: None,
            position: None,
        }
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn with_attacker(mut self, attacker: Combatant) -> Self {
        self.attacker = attacker;
        self
    }

    pub fn with_attacked(mut self, attacked: Combatant) -> Self {
        self.attacked = attacked;
        self
    }

    pub fn with_target_component(mut self, component: impl Into<String>) -> Self {
        self.target_component = Some(component.into());
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    /// Check if a unit took part in this event on either side.
    pub fn involves(&self, unit_id: &str) -> bool {
        self.attacker.id.as_deref() == Some(unit_id) || self.attacked.id.as_deref() == Some(unit_id)
    }

    /// Check if the event type is one of the given kill types (case-insensitive).
    pub fn is_kill<S: AsRef<str>>(&self, kill_event_types: &[S]) -> bool {
        self.event_type.as_deref().is_some_and(|event_type| {
            kill_event_types
                .iter()
                .any(|kill| kill.as_ref().eq_ignore_ascii_case(event_type))
        })
    }
}
