//! Clustering Engine - groups combat events into incidents.
//!
//! Events are partitioned by sector, keeping their original order. Within a
//! sector every event joins the first open incident that is both recent enough
//! and close enough, otherwise it opens a new one. Once all events are
//! consumed each incident is classified by participant count, and battles are
//! named after their sector.

mod classification;
mod incident;

pub use classification::*;
pub use incident::*;

use savegame::CombatEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Configuration for the clustering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// An event joins an incident only if it follows the incident's last
    /// event by strictly less than this many seconds.
    pub max_time_gap_secs: f64,

    /// An event joins an incident only if it lies strictly closer than this
    /// to the incident center.
    pub max_distance: f64,

    /// Minimum participant count for a fight.
    pub min_fight: usize,

    /// Minimum participant count for a skirmish.
    pub min_skirmish: usize,

    /// Minimum participant count for a battle.
    pub min_battle: usize,

    /// Event types that count as a kill (compared case-insensitively).
    pub kill_event_types: Vec<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            max_time_gap_secs: 300.0,
            max_distance: 30_000.0,
            min_fight: thresholds.min_fight,
            min_skirmish: thresholds.min_skirmish,
            min_battle: thresholds.min_battle,
            kill_event_types: vec!["killed".to_string(), "destroyed".to_string()],
        }
    }
}

impl ClusterConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_fight: self.min_fight,
            min_skirmish: self.min_skirmish,
            min_battle: self.min_battle,
        }
    }
}

/// Groups combat events into classified incidents.
pub struct Clusterer {
    config: ClusterConfig,
}

impl Clusterer {
    /// Create a new clusterer with the given configuration.
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    /// Create a clusterer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ClusterConfig::default())
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Cluster `events`, which must be in chronological order.
    ///
    /// Incidents come out grouped by sector (in order of the sector's first
    /// event), and in creation order within a sector.
    pub fn cluster(&self, events: &[CombatEvent]) -> Vec<Incident> {
        let thresholds = self.config.thresholds();
        let mut incidents = Vec::new();

        for (sector, sector_events) in partition_by_sector(events) {
            let open = self.cluster_sector(&sector_events);
            info!(
                sector = sector.unwrap_or("<unknown>"),
                events = sector_events.len(),
                incidents = open.len(),
                "clustered sector"
            );

            incidents.extend(open.into_iter().map(|incident| {
                let classification =
                    Classification::for_participants(incident.participant_count(), &thresholds);
                incident.freeze(classification)
            }));
        }

        name_battles(&mut incidents);
        incidents
    }

    fn cluster_sector(&self, events: &[&CombatEvent]) -> Vec<OpenIncident> {
        let kill_types = &self.config.kill_event_types;
        let mut open: Vec<OpenIncident> = Vec::new();

        for event in events {
            let accepting = open.iter_mut().find(|incident| {
                incident.accepts(event, self.config.max_time_gap_secs, self.config.max_distance)
            });

            match accepting {
                Some(incident) => incident.absorb(event, kill_types),
                None => match OpenIncident::seed(event, kill_types) {
                    Some(incident) => {
                        debug!(
                            sector = event.sector.as_deref().unwrap_or("<unknown>"),
                            time = %event.timestamp,
                            "opened incident"
                        );
                        open.push(incident);
                    }
                    None => debug!(time = %event.timestamp, "dropped event without position"),
                },
            }
        }

        open
    }
}

/// Stable partition by sector, sectors in order of first appearance.
fn partition_by_sector(events: &[CombatEvent]) -> Vec<(Option<&str>, Vec<&CombatEvent>)> {
    let mut index: HashMap<Option<&str>, usize> = HashMap::new();
    let mut groups: Vec<(Option<&str>, Vec<&CombatEvent>)> = Vec::new();

    for event in events {
        let sector = event.sector.as_deref();
        let slot = *index.entry(sector).or_insert_with(|| {
            groups.push((sector, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(event);
    }

    groups
}

/// Number battles per sector in start-time order. Battles in an unknown
/// sector stay unnamed.
fn name_battles(incidents: &mut [Incident]) {
    let mut battles: Vec<usize> = incidents
        .iter()
        .enumerate()
        .filter(|(_, incident)| incident.kind() == IncidentType::Battle && incident.sector.is_some())
        .map(|(i, _)| i)
        .collect();
    battles.sort_by(|&a, &b| {
        incidents[a]
            .start_time
            .partial_cmp(&incidents[b].start_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut counts: HashMap<String, u32> = HashMap::new();
    for i in battles {
        let Some(place) = incidents[i].sector.clone() else {
            continue;
        };
        let ordinal = counts.entry(place.clone()).or_default();
        *ordinal += 1;
        incidents[i].name = Some(IncidentName {
            ordinal: *ordinal,
            place,
        });
    }
}
