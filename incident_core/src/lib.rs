//! # Incident Core
//!
//! Turns a decoded X4 savegame into a history of engagements. Combat events
//! are clustered into incidents by sector, time and distance, classified by
//! how many units took part, and rendered as prose for any participant.
//!
//! ## Core Components
//!
//! - **clustering**: incident model, classification and the clustering engine
//! - **narrative**: per-unit text rendering of an incident
//! - **config**: TOML-loadable settings for every stage
//!
//! The pipeline is a sequence of batch passes: decode, materialize, cluster.
//! Rendering happens on demand through [`AnalysisResult::render`].

pub mod clustering;
pub mod config;
pub mod error;
pub mod narrative;

pub use clustering::*;
pub use config::*;
pub use error::*;
pub use narrative::*;

use savegame::{
    load_savegame, CombatEvent, Component, DecodedSavegame, Diagnostics, EventMaterializer,
};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Everything an analysis produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    components: Vec<Component>,
    events: Vec<CombatEvent>,
    incidents: Vec<Incident>,
    diagnostics: Diagnostics,
    #[serde(skip)]
    narrative: NarrativeGenerator,
}

impl AnalysisResult {
    /// Ships and stations found in the savegame.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Combat events in event log order.
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    /// Recoverable problems from decoding and materialization, in the order found.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Get an incident by ID.
    pub fn incident(&self, id: IncidentId) -> Option<&Incident> {
        self.incidents.iter().find(|incident| incident.id == id)
    }

    /// Incidents a unit took part in.
    pub fn incidents_for<'a>(&'a self, unit_id: &'a str) -> impl Iterator<Item = &'a Incident> + 'a {
        self.incidents
            .iter()
            .filter(move |incident| incident.involves(unit_id))
    }

    /// Render an incident as seen by `unit_id`.
    pub fn render(&self, incident: &Incident, unit_id: &str) -> String {
        self.narrative.render(incident, unit_id)
    }

    /// Export components, events, incidents and diagnostics as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Materialize and cluster the combat events of a decoded savegame.
///
/// The reference store is dropped once the events are copied out of it.
pub fn analyze(decoded: DecodedSavegame, config: &AnalyzerConfig) -> AnalysisResult {
    let DecodedSavegame {
        store,
        components,
        event_log_root,
        mut diagnostics,
    } = decoded;

    let materialized = EventMaterializer::new(&store)
        .materialize(event_log_root, &config.decoder.event_log_name);
    diagnostics.extend(materialized.diagnostics);

    let incidents = Clusterer::new(config.clustering.clone()).cluster(&materialized.events);
    info!(
        components = components.len(),
        events = materialized.events.len(),
        incidents = incidents.len(),
        diagnostics = diagnostics.len(),
        "analysis complete"
    );

    AnalysisResult {
        components,
        events: materialized.events,
        incidents,
        diagnostics,
        narrative: NarrativeGenerator::new(config.narrative.clone()),
    }
}

/// Load a savegame file (plain or `.gz`) and analyze it.
pub fn analyze_file(
    path: impl AsRef<Path>,
    config: &AnalyzerConfig,
) -> Result<AnalysisResult, AnalyzeError> {
    let decoded = load_savegame(path, &config.decoder)?;
    Ok(analyze(decoded, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use savegame::{decode_reader, Diagnostic, GameTime};
    use std::fmt::Write as _;
    use std::io::Write as _;

    const T0: f64 = 3600.0;

    /// Key names, declared at the end of the document so every key is used
    /// before its name is known.
    const KEY_NAMES: &str = r#"
        <ref id="1" string="$timestamp"/>
        <ref id="2" string="$eventtype"/>
        <ref id="3" string="$attackerid"/>
        <ref id="4" string="$attackedid"/>
        <ref id="5" string="$sector"/>
        <ref id="6" string="$position"/>
        <ref id="7" string="$attackerfaction"/>
        <ref id="8" string="$attackedtype"/>
        <ref id="9" string="$attackedfaction"/>"#;

    struct Entry {
        time: Option<f64>,
        event_type: &'static str,
        attacker: (&'static str, &'static str),
        attacked: (&'static str, &'static str, &'static str),
        x: f64,
    }

    /// `attacker` is (id, faction), `attacked` is (id, faction, ship type).
    fn entry(
        time: f64,
        event_type: &'static str,
        attacker: (&'static str, &'static str),
        attacked: (&'static str, &'static str, &'static str),
        x: f64,
    ) -> Entry {
        Entry {
            time: Some(time),
            event_type,
            attacker,
            attacked,
            x,
        }
    }

    fn save_xml(sector: &str, entries: &[Entry]) -> String {
        let mut literals: Vec<String> = Vec::new();
        let mut intern = |text: &str| {
            let index = match literals.iter().position(|literal| literal == text) {
                Some(index) => index,
                None => {
                    literals.push(text.to_string());
                    literals.len() - 1
                }
            };
            1000 + index
        };

        let mut list = String::new();
        let mut vectors = String::new();
        let mut tables = String::new();
        for (i, entry) in entries.iter().enumerate() {
            let table = 200 + i;
            let position = 60 + i;
            write!(list, r#"<value type="table" value="{}"/>"#, table).unwrap();
            write!(vectors, r#"<ref id="{}" x="{}" y="0" z="0"/>"#, position, entry.x).unwrap();

            write!(tables, r#"<ref id="{}">"#, table).unwrap();
            if let Some(time) = entry.time {
                write!(tables, r#"<key type="string" value="1"/><value type="time" value="{}"/>"#, time).unwrap();
            }
            let fields = [
                (2, "xmlkeyword", entry.event_type.to_string()),
                (3, "string", intern(entry.attacker.0).to_string()),
                (4, "string", intern(entry.attacked.0).to_string()),
                (5, "string", intern(sector).to_string()),
                (6, "position", position.to_string()),
                (7, "string", intern(entry.attacker.1).to_string()),
                (8, "shiptype", entry.attacked.2.to_string()),
                (9, "string", intern(entry.attacked.1).to_string()),
            ];
            for (key, kind, value) in fields {
                write!(
                    tables,
                    r#"<key type="string" value="{}"/><value type="{}" value="{}"/>"#,
                    key, kind, value
                )
                .unwrap();
            }
            tables.push_str("</ref>");
        }

        let strings: String = literals
            .iter()
            .enumerate()
            .map(|(i, literal)| format!(r#"<ref id="{}" string="{}"/>"#, 1000 + i, literal))
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<savegame>
  <universe>
    <component class="ship_l" code="U" owner="argon"/>
    <component class="ship_m" code="W" owner="argon"/>
    <component class="sector" code="S-1" owner="argon"/>
  </universe>
  <value name="$SoHGlobalEvents" type="list" value="100"/>
  <refs type="list"><ref id="100">{list}</ref></refs>
  <refs type="vector">{vectors}</refs>
  <refs type="table">{tables}</refs>
  <refs type="string">{strings}{KEY_NAMES}</refs>
</savegame>"#
        )
    }

    /// U and W attack the xenon destroyer K1 until U kills it.
    fn skirmish_entries(last_offset: f64) -> Vec<Entry> {
        vec![
            entry(T0, "attacked", ("U", "argon"), ("K1", "xenon", "destroyer"), 0.0),
            entry(T0 + 60.0, "attacked", ("W", "argon"), ("K1", "xenon", "destroyer"), 200.0),
            entry(T0 + last_offset, "killed", ("U", "argon"), ("K1", "xenon", "destroyer"), 400.0),
        ]
    }

    fn analyze_xml(xml: &str) -> AnalysisResult {
        let decoded = decode_reader(xml.as_bytes(), &AnalyzerConfig::default().decoder).unwrap();
        analyze(decoded, &AnalyzerConfig::default())
    }

    #[test]
    fn test_three_events_one_fight() {
        let result = analyze_xml(&save_xml("Elena's Fortune", &skirmish_entries(200.0)));

        assert!(result.diagnostics().is_empty(), "{:?}", result.diagnostics());
        assert_eq!(result.components().len(), 2);
        assert_eq!(result.events().len(), 3);
        assert_eq!(result.events()[0].timestamp, GameTime(T0));

        assert_eq!(result.incidents().len(), 1);
        let incident = &result.incidents()[0];
        assert_eq!(incident.event_count, 3);
        assert_eq!(incident.participant_count(), 3);
        assert_eq!(incident.kind(), IncidentType::Fight);
        assert_eq!(incident.scale(), Scale::Tiny);
        assert_eq!(incident.sector.as_deref(), Some("Elena's Fortune"));
        assert_eq!(incident.kills_by("U"), 1);
        assert_eq!(incident.major_events.len(), 1);
        assert!((incident.center.x - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_late_event_splits_incident() {
        let result = analyze_xml(&save_xml("Elena's Fortune", &skirmish_entries(400.0)));

        assert_eq!(result.incidents().len(), 2);
        assert_eq!(result.incidents()[0].event_count, 2);
        assert_eq!(result.incidents()[1].event_count, 1);
    }

    #[test]
    fn test_render_for_unit() {
        let result = analyze_xml(&save_xml("Elena's Fortune", &skirmish_entries(200.0)));
        let incident = &result.incidents()[0];

        let text = result.render(incident, "U");

        assert_eq!(
            text,
            [
                "U took part in a tiny fight in Elena's Fortune between the argon and the xenon.",
                "The fight involved 3 participants in total, of which 2 were fielded by the argon, 1 was fielded by the xenon.",
                "Major participants were the xenon destroyer K1.",
                "The fight resulted in the destruction of the xenon destroyer (K1) by U.",
                "U destroyed 1 ship during this fight.",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_player_faction_from_config() {
        let config = AnalyzerConfig::from_toml_str("[narrative]\nplayer_faction = \"argon\"").unwrap();
        let xml = save_xml("Elena's Fortune", &skirmish_entries(200.0));
        let decoded = decode_reader(xml.as_bytes(), &config.decoder).unwrap();
        let result = analyze(decoded, &config);

        let text = result.render(&result.incidents()[0], "W");
        assert!(text.starts_with("W took part in a tiny fight in Elena's Fortune between argon and the xenon."));
        assert!(text.ends_with("W destroyed 0 ships during this fight."));
    }

    #[test]
    fn test_incidents_for_unit() {
        let mut entries = skirmish_entries(200.0);
        entries.push(entry(T0 + 5_000.0, "attacked", ("K9", "xenon"), ("Q", "teladi", "fighter"), 0.0));
        let result = analyze_xml(&save_xml("Elena's Fortune", &entries));

        assert_eq!(result.incidents().len(), 2);
        assert_eq!(result.incidents_for("U").count(), 1);
        assert_eq!(result.incidents_for("Q").count(), 1);
        assert_eq!(result.incidents_for("nobody").count(), 0);

        let id = result.incidents()[1].id;
        assert!(result.incident(id).is_some_and(|incident| incident.involves("K9")));
    }

    #[test]
    fn test_entry_without_timestamp_is_skipped() {
        let mut entries = skirmish_entries(200.0);
        entries.insert(
            1,
            Entry {
                time: None,
                ..entry(0.0, "attacked", ("X", "xenon"), ("U", "argon", "destroyer"), 0.0)
            },
        );
        let result = analyze_xml(&save_xml("Elena's Fortune", &entries));

        assert_eq!(result.events().len(), 3);
        assert_eq!(result.incidents().len(), 1);
        assert_eq!(result.diagnostics().len(), 1);
        assert!(matches!(
            result.diagnostics().as_slice()[0],
            Diagnostic::MissingTimestamp { .. }
        ));
    }

    #[test]
    fn test_missing_event_log_is_diagnosed() {
        let xml = r#"<savegame><component class="station_l" code="DOCK-1" owner="argon"/></savegame>"#;
        let result = analyze_xml(xml);

        assert_eq!(result.components().len(), 1);
        assert!(result.events().is_empty());
        assert!(result.incidents().is_empty());
        assert!(matches!(
            result.diagnostics().as_slice(),
            [Diagnostic::EventLogNotFound { .. }]
        ));
    }

    #[test]
    fn test_analyze_gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quicksave.xml.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(save_xml("Elena's Fortune", &skirmish_entries(200.0)).as_bytes())
            .unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let result = analyze_file(&path, &AnalyzerConfig::default()).unwrap();

        assert_eq!(result.incidents().len(), 1);
        assert_eq!(result.incidents()[0].kind(), IncidentType::Fight);
    }

    #[test]
    fn test_analyze_missing_file() {
        let result = analyze_file("/nonexistent/save.xml", &AnalyzerConfig::default());
        assert!(matches!(result, Err(AnalyzeError::Decode(_))));
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xml");
        std::fs::write(&path, "<savegame><refs type=\"string\"></savegame>").unwrap();

        let result = analyze_file(&path, &AnalyzerConfig::default());
        assert!(matches!(result, Err(AnalyzeError::Decode(_))));
    }

    #[test]
    fn test_json_export() {
        let result = analyze_xml(&save_xml("Elena's Fortune", &skirmish_entries(200.0)));
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

        assert_eq!(json["events"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["incidents"][0]["event_count"], 3);
        assert_eq!(json["incidents"][0]["classification"]["kind"], "fight");
        assert_eq!(json["incidents"][0]["classification"]["scale"], "tiny");
        assert!(json.get("narrative").is_none());
    }
}
