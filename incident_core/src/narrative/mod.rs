//! Narrative Generator - renders an incident as prose from one unit's view.
//!
//! A rendered text is built from up to five parts, in order:
//! 1. **Intro**: the incident's name, or its scale, type, sector and factions
//! 2. **Statistics**: participant counts per faction
//! 3. **Major participants**: capital ships other than the viewing unit
//! 4. **Major events**: capital ships destroyed during the incident
//! 5. **Personal statistics**: kills credited to the viewing unit
//!
//! Parts with nothing to say are left out. Rendering is a pure function of the
//! incident, the unit id and the configuration.

mod roster;

pub use roster::*;

use savegame::CombatEvent;
use serde::{Deserialize, Serialize};

use crate::clustering::{Incident, IncidentType};

const UNKNOWN_SECTOR: &str = "an unknown sector";

/// Configuration for narrative rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Faction name rendered without a leading "the".
    pub player_faction: String,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            player_faction: "player".to_string(),
        }
    }
}

/// Renders incidents as text.
#[derive(Debug, Clone, Default)]
pub struct NarrativeGenerator {
    config: NarrativeConfig,
}

impl NarrativeGenerator {
    /// Create a new generator with the given configuration.
    pub fn new(config: NarrativeConfig) -> Self {
        Self { config }
    }

    /// Create a generator with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(NarrativeConfig::default())
    }

    /// Render `incident` as seen by `unit_id`. Each part is one line.
    pub fn render(&self, incident: &Incident, unit_id: &str) -> String {
        if incident.kind() == IncidentType::Nothing {
            return format!(
                "{} was present in {}, but nothing worth recording took place.",
                unit_id,
                place(incident)
            );
        }

        let mut lines = vec![self.intro(incident, unit_id), self.statistics(incident)];
        lines.extend(self.major_participants(incident, unit_id));
        lines.extend(self.major_events(incident, unit_id));
        lines.extend(personal_statistics(incident, unit_id));
        lines.join("\n")
    }

    /// Render a faction name. Only the player's own faction goes without "the".
    pub fn faction_name(&self, faction: &str) -> String {
        if faction == self.config.player_faction {
            faction.to_string()
        } else {
            format!("the {}", faction)
        }
    }

    fn intro(&self, incident: &Incident, unit_id: &str) -> String {
        match &incident.name {
            Some(name) => format!(
                "{} took part in the {}, a {} {}.",
                unit_id,
                name,
                incident.scale(),
                incident.kind()
            ),
            None => {
                let factions: Vec<String> = incident
                    .factions
                    .iter()
                    .map(|faction| self.faction_name(faction))
                    .collect();
                let between = if factions.is_empty() {
                    "unknown parties".to_string()
                } else {
                    enumerate(&factions, "and")
                };
                format!(
                    "{} took part in a {} {} in {} between {}.",
                    unit_id,
                    incident.scale(),
                    incident.kind(),
                    place(incident),
                    between
                )
            }
        }
    }

    fn statistics(&self, incident: &Incident) -> String {
        let shares: Vec<String> = incident
            .participants_per_faction()
            .into_iter()
            .map(|(faction, count)| {
                let verb = if count == 1 { "was" } else { "were" };
                let fielder = match faction {
                    Some(faction) => self.faction_name(faction),
                    None => "unknown parties".to_string(),
                };
                format!("{} {} fielded by {}", count, verb, fielder)
            })
            .collect();

        format!(
            "The {} involved {} participants in total, of which {}.",
            incident.kind(),
            incident.participant_count(),
            shares.join(", ")
        )
    }

    fn major_participants(&self, incident: &Incident, unit_id: &str) -> Option<String> {
        let roster = MajorRoster::collect(incident, unit_id);
        if roster.is_empty() {
            return None;
        }

        let mut groups = Vec::new();
        for (faction, ship_types) in roster.iter() {
            for (ship_type, ids) in ship_types {
                let plural = if ids.len() > 1 { "s" } else { "" };
                groups.push(format!(
                    "{} {}{} {}",
                    self.owner_label(faction),
                    ship_type,
                    plural,
                    ids.join(", ")
                ));
            }
        }

        Some(format!("Major participants were {}.", groups.join("; ")))
    }

    fn major_events(&self, incident: &Incident, unit_id: &str) -> Option<String> {
        if incident.major_events.is_empty() {
            return None;
        }

        let losses: Vec<String> = incident
            .major_events
            .iter()
            .map(|event| self.describe_loss(event, unit_id))
            .collect();

        Some(format!(
            "The {} resulted in the destruction of {}.",
            incident.kind(),
            enumerate(&losses, "as well as")
        ))
    }

    fn describe_loss(&self, event: &CombatEvent, unit_id: &str) -> String {
        let attacked = &event.attacked;
        let mut parts = vec![self.owner_label(attacked.faction.as_deref())];
        parts.extend(attacked.ship_type.clone());
        parts.extend(attacked.name.clone());
        parts.extend(attacked.id.as_ref().map(|id| format!("({})", id)));

        let mut text = parts.join(" ");
        if event.attacker.id.as_deref() == Some(unit_id) {
            text.push_str(" by ");
            text.push_str(unit_id);
        }
        text
    }

    fn owner_label(&self, faction: Option<&str>) -> String {
        match faction {
            Some(faction) => self.faction_name(faction),
            None => "an unaffiliated".to_string(),
        }
    }
}

fn place(incident: &Incident) -> &str {
    incident.sector.as_deref().unwrap_or(UNKNOWN_SECTOR)
}

fn personal_statistics(incident: &Incident, unit_id: &str) -> Option<String> {
    if !incident.involves(unit_id) {
        return None;
    }
    let kills = incident.kills_by(unit_id);
    let noun = if kills == 1 { "ship" } else { "ships" };
    Some(format!(
        "{} destroyed {} {} during this {}.",
        unit_id,
        kills,
        noun,
        incident.kind()
    ))
}

/// Join as "a", "a and b", or "a, b and c", with `last` as the final conjunction.
fn enumerate(items: &[String], last: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., tail] => format!("{} {} {}", init.join(", "), last, tail),
    }
}
