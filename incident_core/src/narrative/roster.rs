//! Major participant roster - capital ships grouped by faction and ship type.

use savegame::is_major_ship_type;
use std::collections::BTreeMap;

use crate::clustering::Incident;

/// Lowercased ship type -> unit ids.
pub type ShipGroups<'a> = BTreeMap<String, Vec<&'a str>>;

/// Capital-ship participants of one incident, seen from one unit.
///
/// The viewing unit is never listed. Participants of unknown faction are
/// grouped under `None`. Ship types are grouped case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct MajorRoster<'a> {
    groups: BTreeMap<Option<&'a str>, ShipGroups<'a>>,
}

impl<'a> MajorRoster<'a> {
    /// Collect the major participants of `incident` other than `unit_id`.
    pub fn collect(incident: &'a Incident, unit_id: &str) -> Self {
        let mut groups: BTreeMap<Option<&'a str>, ShipGroups<'a>> = BTreeMap::new();

        for (id, info) in &incident.participants {
            if id == unit_id {
                continue;
            }
            let Some(ship_type) = info.ship_type.as_deref() else {
                continue;
            };
            if !is_major_ship_type(ship_type) {
                continue;
            }
            groups
                .entry(info.faction.as_deref())
                .or_default()
                .entry(ship_type.to_ascii_lowercase())
                .or_default()
                .push(id.as_str());
        }

        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of listed ships.
    pub fn ship_count(&self) -> usize {
        self.groups
            .values()
            .flat_map(|types| types.values())
            .map(Vec::len)
            .sum()
    }

    /// Get the ids listed for a faction and ship type.
    pub fn members(&self, faction: Option<&str>, ship_type: &str) -> &[&'a str] {
        self.groups
            .iter()
            .find(|(key, _)| **key == faction)
            .and_then(|(_, types)| types.get(&ship_type.to_ascii_lowercase()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate factions in name order, unknown faction first.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&'a str>, &ShipGroups<'a>)> {
        self.groups.iter().map(|(faction, types)| (*faction, types))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::{Classification, IncidentId, IncidentType, Scale, ShipInfo};
    use savegame::{GameTime, Vec3};

    fn ship(ship_type: &str, faction: Option<&str>) -> ShipInfo {
        ShipInfo {
            ship_type: Some(ship_type.to_string()),
            faction: faction.map(str::to_string),
            kills: 0,
        }
    }

    fn incident(participants: Vec<(&str, ShipInfo)>) -> Incident {
        Incident {
            id: IncidentId::new(),
            sector: Some("Argon Prime".to_string()),
            center: Vec3::default(),
            start_time: GameTime(0.0),
            end_time: GameTime(0.0),
            event_count: 1,
            participants: participants
                .into_iter()
                .map(|(id, info)| (id.to_string(), info))
                .collect(),
            factions: Vec::new(),
            classification: Classification {
                kind: IncidentType::Fight,
                scale: Scale::Tiny,
            },
            name: None,
            major_events: Vec::new(),
        }
    }

    #[test]
    fn test_groups_by_faction_then_type() {
        let incident = incident(vec![
            ("A", ship("destroyer", Some("FactionX"))),
            ("B", ship("frigate", Some("FactionX"))),
            ("C", ship("carrier", Some("FactionY"))),
        ]);

        let roster = MajorRoster::collect(&incident, "B");

        assert_eq!(roster.members(Some("FactionX"), "destroyer"), &["A"]);
        assert_eq!(roster.members(Some("FactionY"), "carrier"), &["C"]);
        assert!(roster.members(Some("FactionX"), "frigate").is_empty());
        assert_eq!(roster.ship_count(), 2);
    }

    #[test]
    fn test_viewing_unit_is_excluded() {
        let incident = incident(vec![
            ("A", ship("battleship", Some("argon"))),
            ("B", ship("battleship", Some("argon"))),
        ]);

        let roster = MajorRoster::collect(&incident, "A");

        assert_eq!(roster.members(Some("argon"), "battleship"), &["B"]);
    }

    #[test]
    fn test_unknown_faction_and_type() {
        let incident = incident(vec![
            ("A", ship("resupplier", None)),
            (
                "B",
                ShipInfo {
                    ship_type: None,
                    faction: Some("argon".to_string()),
                    kills: 0,
                },
            ),
        ]);

        let roster = MajorRoster::collect(&incident, "Z");

        assert_eq!(roster.members(None, "resupplier"), &["A"]);
        assert_eq!(roster.ship_count(), 1);
        let factions: Vec<_> = roster.iter().map(|(faction, _)| faction).collect();
        assert_eq!(factions, vec![None]);
    }

    #[test]
    fn test_ship_type_case_is_ignored() {
        let incident = incident(vec![
            ("A", ship("Destroyer", Some("argon"))),
            ("B", ship("destroyer", Some("argon"))),
            ("C", ship("CARRIER", Some("argon"))),
        ]);

        let roster = MajorRoster::collect(&incident, "Z");

        assert_eq!(roster.members(Some("argon"), "destroyer"), &["A", "B"]);
        assert_eq!(roster.members(Some("argon"), "Carrier"), &["C"]);
        let types: Vec<_> = roster
            .iter()
            .flat_map(|(_, types)| types.keys().cloned())
            .collect();
        assert_eq!(types, vec!["carrier", "destroyer"]);
    }

    #[test]
    fn test_no_capital_ships() {
        let incident = incident(vec![("A", ship("fighter", Some("argon")))]);
        assert!(MajorRoster::collect(&incident, "B").is_empty());
    }
}
