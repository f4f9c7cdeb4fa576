//! Incidents - spatio-temporal clusters of combat events.

use savegame::{CombatEvent, Combatant, GameTime, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{Classification, IncidentType, Scale};

/// Unique identifier for incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncidentId(pub Uuid);

impl IncidentId {
    /// Create a new random incident ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IncidentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IncidentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an incident knows about one participating unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShipInfo {
    pub ship_type: Option<String>,
    pub faction: Option<String>,
    /// Kills credited to this unit within the incident.
    pub kills: u32,
}

/// Synthesized proper name of a battle, e.g. "second battle of Elena's Fortune".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentName {
    /// 1-based count of battles in the same place.
    pub ordinal: u32,
    pub place: String,
}

impl std::fmt::Display for IncidentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} battle of {}", ordinal_word(self.ordinal), self.place)
    }
}

fn ordinal_word(n: u32) -> String {
    match n {
        1 => "first".to_string(),
        2 => "second".to_string(),
        3 => "third".to_string(),
        _ => {
            let suffix = match (n % 10, n % 100) {
                (_, 11..=13) => "th",
                (1, _) => "st",
                (2, _) => "nd",
                (3, _) => "rd",
                _ => "th",
            };
            format!("{}{}", n, suffix)
        }
    }
}

/// A classified engagement. Built by the clusterer and never changed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub sector: Option<String>,
    /// Mean position of all member events.
    pub center: Vec3,
    pub start_time: GameTime,
    pub end_time: GameTime,
    pub event_count: usize,
    /// Participating units keyed by unit id.
    pub participants: BTreeMap<String, ShipInfo>,
    /// Factions in order of first appearance.
    pub factions: Vec<String>,
    pub classification: Classification,
    pub name: Option<IncidentName>,
    /// Kills of capital ships, in event order.
    pub major_events: Vec<CombatEvent>,
}

impl Incident {
    pub fn kind(&self) -> IncidentType {
        self.classification.kind
    }

    pub fn scale(&self) -> Scale {
        self.classification.scale
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Check if a unit took part in this incident.
    pub fn involves(&self, unit_id: &str) -> bool {
        self.participants.contains_key(unit_id)
    }

    /// Kills credited to a unit, zero if it did not take part.
    pub fn kills_by(&self, unit_id: &str) -> u32 {
        self.participants.get(unit_id).map_or(0, |info| info.kills)
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_time.seconds_since(self.start_time)
    }

    /// Number of participants per faction; `None` collects units of unknown faction.
    pub fn participants_per_faction(&self) -> BTreeMap<Option<&str>, usize> {
        let mut counts = BTreeMap::new();
        for info in self.participants.values() {
            *counts.entry(info.faction.as_deref()).or_default() += 1;
        }
        counts
    }
}

/// An incident still accepting events.
#[derive(Debug, Clone)]
pub(crate) struct OpenIncident {
    sector: Option<String>,
    center: Vec3,
    start_time: GameTime,
    end_time: GameTime,
    event_count: usize,
    participants: BTreeMap<String, ShipInfo>,
    factions: Vec<String>,
    major_events: Vec<CombatEvent>,
}

impl OpenIncident {
    /// Open an incident around `event`. Events without a position cannot seed one.
    pub(crate) fn seed(event: &CombatEvent, kill_event_types: &[String]) -> Option<Self> {
        let center = event.position?;
        let mut incident = Self {
            sector: event.sector.clone(),
            center,
            start_time: event.timestamp,
            end_time: event.timestamp,
            event_count: 1,
            participants: BTreeMap::new(),
            factions: Vec::new(),
            major_events: Vec::new(),
        };
        incident.record(event, kill_event_types);
        Some(incident)
    }

    /// Check if `event` is close enough in time and space to join.
    pub(crate) fn accepts(&self, event: &CombatEvent, max_time_gap_secs: f64, max_distance: f64) -> bool {
        let Some(position) = event.position else {
            return false;
        };
        event.timestamp.seconds_since(self.end_time) < max_time_gap_secs
            && position.distance(&self.center) < max_distance
    }

    /// Add an accepted event.
    pub(crate) fn absorb(&mut self, event: &CombatEvent, kill_event_types: &[String]) {
        if let Some(position) = event.position {
            self.center = self.center.shifted_mean(self.event_count, &position);
        }
        self.end_time = event.timestamp;
        self.event_count += 1;
        self.record(event, kill_event_types);
    }

    fn record(&mut self, event: &CombatEvent, kill_event_types: &[String]) {
        self.add_participant(&event.attacker);
        self.add_participant(&event.attacked);

        for faction in [&event.attacker.faction, &event.attacked.faction]
            .into_iter()
            .flatten()
        {
            if !self.factions.contains(faction) {
                self.factions.push(faction.clone());
            }
        }

        if event.is_kill(kill_event_types) {
            if let Some(info) = event
                .attacker
                .id
                .as_ref()
                .and_then(|id| self.participants.get_mut(id))
            {
                info.kills += 1;
            }
            if event.attacked.is_major() {
                self.major_events.push(event.clone());
            }
        }
    }

    /// First sighting of a unit fixes its ship type and faction.
    fn add_participant(&mut self, combatant: &Combatant) {
        if let Some(id) = &combatant.id {
            self.participants
                .entry(id.clone())
                .or_insert_with(|| ShipInfo {
                    ship_type: combatant.ship_type.clone(),
                    faction: combatant.faction.clone(),
                    kills: 0,
                });
        }
    }

    pub(crate) fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub(crate) fn freeze(self, classification: Classification) -> Incident {
        Incident {
            id: IncidentId::new(),
            sector: self.sector,
            center: self.center,
            start_time: self.start_time,
            end_time: self.end_time,
            event_count: self.event_count,
            participants: self.participants,
            factions: self.factions,
            classification,
            name: None,
            major_events: self.major_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::Thresholds;

    fn kill_types() -> Vec<String> {
        vec!["killed".to_string()]
    }

    fn event(time: f64, attacker: Combatant, attacked: Combatant) -> CombatEvent {
        CombatEvent::new(GameTime(time))
            .with_sector("Grand Exchange I")
            .with_position(Vec3::new(0.0, 0.0, 0.0))
            .with_attacker(attacker)
            .with_attacked(attacked)
    }

    #[test]
    fn test_seed_requires_position() {
        let positionless = CombatEvent::new(GameTime(0.0)).with_sector("Grand Exchange I");
        assert!(OpenIncident::seed(&positionless, &kill_types()).is_none());
    }

    #[test]
    fn test_first_sighting_wins() {
        let first = event(
            0.0,
            Combatant::new("A").with_ship_type("destroyer").with_faction("argon"),
            Combatant::new("B").with_faction("xenon"),
        );
        let second = event(
            10.0,
            Combatant::new("A").with_ship_type("frigate").with_faction("teladi"),
            Combatant::new("C").with_faction("xenon"),
        );

        let mut open = OpenIncident::seed(&first, &kill_types()).unwrap();
        open.absorb(&second, &kill_types());

        let incident = open.freeze(Classification::for_participants(3, &Thresholds::default()));
        assert_eq!(incident.participant_count(), 3);
        assert_eq!(incident.participants["A"].ship_type.as_deref(), Some("destroyer"));
        assert_eq!(incident.factions, vec!["argon", "xenon", "teladi"]);
        assert_eq!(incident.event_count, 2);
        assert_eq!(incident.end_time, GameTime(10.0));
    }

    #[test]
    fn test_kills_and_major_events() {
        let kill_carrier = event(
            0.0,
            Combatant::new("A").with_faction("argon"),
            Combatant::new("B").with_ship_type("carrier").with_faction("xenon"),
        )
        .with_event_type("killed");
        let kill_fighter = event(
            5.0,
            Combatant::new("A").with_faction("argon"),
            Combatant::new("C").with_ship_type("fighter").with_faction("xenon"),
        )
        .with_event_type("killed");
        let hit = event(
            6.0,
            Combatant::new("D").with_faction("xenon"),
            Combatant::new("A").with_ship_type("destroyer").with_faction("argon"),
        )
        .with_event_type("attacked");

        let mut open = OpenIncident::seed(&kill_carrier, &kill_types()).unwrap();
        open.absorb(&kill_fighter, &kill_types());
        open.absorb(&hit, &kill_types());
        let incident = open.freeze(Classification::for_participants(4, &Thresholds::default()));

        assert_eq!(incident.kills_by("A"), 2);
        assert_eq!(incident.kills_by("D"), 0);
        assert_eq!(incident.kills_by("nobody"), 0);
        assert_eq!(incident.major_events.len(), 1);
        assert_eq!(incident.major_events[0].attacked.id.as_deref(), Some("B"));
    }

    #[test]
    fn test_accepts_is_strict() {
        let seed = event(0.0, Combatant::new("A"), Combatant::new("B"));
        let open = OpenIncident::seed(&seed, &kill_types()).unwrap();

        let just_in_time = event(299.9, Combatant::new("A"), Combatant::new("B"));
        let too_late = event(300.0, Combatant::new("A"), Combatant::new("B"));
        let too_far = event(1.0, Combatant::new("A"), Combatant::new("B"))
            .with_position(Vec3::new(30_000.0, 0.0, 0.0));
        let positionless = CombatEvent::new(GameTime(1.0));

        assert!(open.accepts(&just_in_time, 300.0, 30_000.0));
        assert!(!open.accepts(&too_late, 300.0, 30_000.0));
        assert!(!open.accepts(&too_far, 300.0, 30_000.0));
        assert!(!open.accepts(&positionless, 300.0, 30_000.0));
    }

    #[test]
    fn test_participants_per_faction() {
        let e = event(
            0.0,
            Combatant::new("A").with_faction("argon"),
            Combatant::new("B"),
        );
        let open = OpenIncident::seed(&e, &kill_types()).unwrap();
        let incident = open.freeze(Classification::for_participants(2, &Thresholds::default()));

        let counts = incident.participants_per_faction();
        assert_eq!(counts.get(&Some("argon")), Some(&1));
        assert_eq!(counts.get(&None), Some(&1));
    }

    #[test]
    fn test_incident_name_display() {
        let name = |ordinal| IncidentName {
            ordinal,
            place: "Elena's Fortune".to_string(),
        };
        assert_eq!(name(1).to_string(), "first battle of Elena's Fortune");
        assert_eq!(name(3).to_string(), "third battle of Elena's Fortune");
        assert_eq!(name(4).to_string(), "4th battle of Elena's Fortune");
        assert_eq!(name(12).to_string(), "12th battle of Elena's Fortune");
        assert_eq!(name(22).to_string(), "22nd battle of Elena's Fortune");
    }
}
