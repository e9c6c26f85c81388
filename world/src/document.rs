//! JSON boundary for the graph source, exports and completion snapshots.
//!
//! Documents are parsed once into strongly typed shapes and validated by
//! [`Graph::from_planets`]; nothing downstream inspects raw JSON. Object key
//! order is preserved so planets and topics keep their load order.

use std::{
    collections::{BTreeSet, HashSet},
    fmt,
    marker::PhantomData,
};

use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use star_chart_core::{AchievementId, PlanetId};
use tracing::warn;

use crate::{Achievement, Graph, Planet, Tier, Topic, ValidationError};

impl Graph {
    /// Parses and validates a document in the graph source format.
    pub fn from_json(source: &str) -> Result<Self, ValidationError> {
        let document: GraphDocument = serde_json::from_str(source)?;
        document.into_graph()
    }

    /// Parses a graph source document, degrading to the empty graph when it is rejected.
    #[must_use]
    pub fn from_json_or_empty(source: &str) -> Self {
        match Self::from_json(source) {
            Ok(graph) => graph,
            Err(error) => {
                warn!(%error, "graph source rejected, starting with an empty graph");
                Self::empty()
            }
        }
    }

    /// Serializes the graph, including current completion sets, in the source format.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&GraphDocument::from_graph(self))
    }

    /// Overlays a persisted completion snapshot onto the graph.
    ///
    /// Planets named by the snapshot have their completion set replaced;
    /// every other planet keeps its source defaults. Snapshot entries for
    /// planets missing from the graph are ignored.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: &CompletionSnapshot) -> Self {
        for (planet, completed) in &snapshot.planets {
            if let Some(target) = self.planet_mut(planet) {
                target.replace_completed(completed.clone());
            }
        }
        self
    }

    /// Captures every planet's completion set in the minimal snapshot form.
    #[must_use]
    pub fn completion_snapshot(&self) -> CompletionSnapshot {
        CompletionSnapshot {
            planets: self
                .planets()
                .iter()
                .map(|planet| (planet.id().clone(), planet.completed().clone()))
                .collect(),
        }
    }
}

/// Persisted completion state, keyed by planet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompletionSnapshot {
    planets: Vec<(PlanetId, BTreeSet<AchievementId>)>,
}

impl CompletionSnapshot {
    /// Parses either the full graph source shape or the minimal `{planet: [ids]}` form.
    ///
    /// In the full shape only `planets.*.completed` is read; planets without a
    /// `completed` array are left out of the snapshot.
    pub fn parse(source: &str) -> Result<Self, ValidationError> {
        let document: SnapshotDocument = serde_json::from_str(source)?;
        let planets = match document {
            SnapshotDocument::Full { planets } => planets
                .0
                .into_iter()
                .filter_map(|(planet, entry)| {
                    entry
                        .completed
                        .map(|completed| (PlanetId::new(planet), completed.into_iter().collect()))
                })
                .collect(),
            SnapshotDocument::Minimal(planets) => planets
                .0
                .into_iter()
                .map(|(planet, completed)| (PlanetId::new(planet), completed.into_iter().collect()))
                .collect(),
        };
        Ok(Self { planets })
    }

    /// Serializes the snapshot in the minimal `{planet: [ids]}` form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let entries = Entries(
            self.planets
                .iter()
                .map(|(planet, completed)| (planet.to_string(), completed))
                .collect(),
        );
        serde_json::to_string(&entries)
    }

    /// Completion set recorded for the planet, if the snapshot names it.
    #[must_use]
    pub fn completed(&self, planet: &PlanetId) -> Option<&BTreeSet<AchievementId>> {
        self.planets
            .iter()
            .find(|(candidate, _)| candidate == planet)
            .map(|(_, completed)| completed)
    }

    /// Number of planets recorded in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.planets.len()
    }

    /// Reports whether the snapshot records no planets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphDocument {
    planets: Entries<PlanetDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PlanetDocument {
    tiers: Entries<TierDocument>,
    #[serde(default)]
    completed: Vec<AchievementId>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TierDocument {
    topics: Entries<Vec<AchievementDocument>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AchievementDocument {
    id: AchievementId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Full { planets: Entries<SnapshotPlanet> },
    Minimal(Entries<Vec<AchievementId>>),
}

#[derive(Debug, Deserialize)]
struct SnapshotPlanet {
    #[serde(default)]
    completed: Option<Vec<AchievementId>>,
}

impl GraphDocument {
    fn into_graph(self) -> Result<Graph, ValidationError> {
        let planets = self
            .planets
            .0
            .into_iter()
            .map(|(planet, document)| {
                let tiers = document
                    .tiers
                    .0
                    .into_iter()
                    .map(|(tier, document)| {
                        let topics = document
                            .topics
                            .0
                            .into_iter()
                            .map(|(topic, achievements)| {
                                let achievements = achievements
                                    .into_iter()
                                    .map(|entry| {
                                        Achievement::new(entry.id, entry.title, entry.description)
                                    })
                                    .collect();
                                Topic::new(topic.as_str(), achievements)
                            })
                            .collect();
                        Tier::new(tier.as_str(), topics)
                    })
                    .collect();
                Planet::new(planet.as_str(), tiers, document.completed)
            })
            .collect();
        Graph::from_planets(planets)
    }

    fn from_graph(graph: &Graph) -> Self {
        let planets = graph
            .planets()
            .iter()
            .map(|planet| {
                let tiers = planet
                    .tiers()
                    .iter()
                    .map(|tier| {
                        let topics = tier
                            .topics()
                            .iter()
                            .map(|topic| {
                                let achievements = topic
                                    .achievements()
                                    .iter()
                                    .map(|achievement| AchievementDocument {
                                        id: achievement.id().clone(),
                                        title: achievement.title().to_owned(),
                                        description: achievement.description().to_owned(),
                                    })
                                    .collect();
                                (topic.id().to_string(), achievements)
                            })
                            .collect();
                        (
                            tier.id().to_string(),
                            TierDocument {
                                topics: Entries(topics),
                            },
                        )
                    })
                    .collect();
                (
                    planet.id().to_string(),
                    PlanetDocument {
                        tiers: Entries(tiers),
                        completed: planet.completed().iter().cloned().collect(),
                    },
                )
            })
            .collect();
        Self {
            planets: Entries(planets),
        }
    }
}

/// JSON object decoded into its entries in document order.
#[derive(Debug)]
struct Entries<T>(Vec<(String, T)>);

impl<'de, T> Deserialize<'de> for Entries<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

struct EntriesVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for EntriesVisitor<T>
where
    T: Deserialize<'de>,
{
    type Value = Entries<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        let mut seen = HashSet::new();
        while let Some((key, value)) = map.next_entry::<String, T>()? {
            if !seen.insert(key.clone()) {
                return Err(de::Error::custom(format!("duplicate key `{key}`")));
            }
            entries.push((key, value));
        }
        Ok(Entries(entries))
    }
}

impl<T> Serialize for Entries<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use star_chart_core::TierId;

    use super::*;

    // Raw text: `json!` would sort object keys and hide load order.
    const SOURCE: &str = r#"{
        "planets": {
            "venus": {
                "planetName": "Venus",
                "tiers": {
                    "tier2": { "topics": { "deep": [ { "id": "b1", "title": "B1" } ] } },
                    "tier1": {
                        "topics": {
                            "zeta": [ { "id": "a1", "title": "A1", "description": "first" } ],
                            "alpha": [ { "id": "a2", "title": "A2", "description": "second" } ]
                        }
                    }
                },
                "completed": ["a1"]
            },
            "earth": { "tiers": {} }
        }
    }"#;

    #[test]
    fn parse_keeps_planet_and_topic_load_order() {
        let graph = Graph::from_json(SOURCE).expect("valid document");
        let planets: Vec<&str> = graph.planets().iter().map(|p| p.id().as_str()).collect();
        assert_eq!(planets, vec!["venus", "earth"]);

        let venus = &graph.planets()[0];
        let tier1 = venus.tier(&TierId::from("tier1")).expect("tier1");
        let topics: Vec<&str> = tier1.topics().iter().map(|t| t.id().as_str()).collect();
        assert_eq!(topics, vec!["zeta", "alpha"]);
        assert_eq!(venus.tiers()[0].id().as_str(), "tier1");
        assert!(venus.is_completed(&"a1".into()));
    }

    #[test]
    fn missing_text_fields_default_to_empty() {
        let graph = Graph::from_json(SOURCE).expect("valid document");
        let venus = &graph.planets()[0];
        let b1 = venus.locate(&"b1".into()).expect("b1").achievement;
        assert_eq!(b1.title(), "B1");
        assert_eq!(b1.description(), "");
    }

    #[test]
    fn structural_failures_are_rejected() {
        let cases = [
            "not json",
            r#"{"planets": []}"#,
            r#"{"planets": {"p": {}}}"#,
            r#"{"planets": {"p": {"tiers": {"t": {"topics": {"x": [{"title": "no id"}]}}}}}}"#,
            r#"{"planets": {"p": {"tiers": {}}, "p": {"tiers": {}}}}"#,
        ];
        for case in cases {
            assert!(
                matches!(Graph::from_json(case), Err(ValidationError::Malformed(_))),
                "expected rejection for {case}"
            );
        }
    }

    #[test]
    fn malformed_source_degrades_to_empty_graph() {
        assert!(Graph::from_json_or_empty("{").is_empty());
        assert!(Graph::from_json_or_empty(r#"{"planets": {}}"#).is_empty());
    }

    #[test]
    fn export_matches_source_shape() {
        let graph = Graph::from_json(SOURCE).expect("valid document");
        let text = graph.to_json_pretty().expect("export");
        let exported: Value = serde_json::from_str(&text).expect("json");

        assert_eq!(exported["planets"]["venus"]["completed"], json!(["a1"]));
        assert_eq!(exported["planets"]["earth"]["completed"], json!([]));
        assert_eq!(
            exported["planets"]["venus"]["tiers"]["tier1"]["topics"]["alpha"],
            json!([{ "id": "a2", "title": "A2", "description": "second" }])
        );

        let reloaded = Graph::from_json(&text).expect("export reloads");
        assert_eq!(reloaded, graph);
    }

    #[test]
    fn snapshot_accepts_minimal_form() {
        let snapshot = CompletionSnapshot::parse(r#"{"venus": ["b1", "b1"], "pluto": []}"#)
            .expect("minimal snapshot");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.completed(&"venus".into()).map(BTreeSet::len),
            Some(1)
        );
    }

    #[test]
    fn snapshot_accepts_full_form() {
        let snapshot = CompletionSnapshot::parse(SOURCE).expect("full snapshot");
        assert_eq!(snapshot.len(), 1, "earth has no completed array");
        assert!(snapshot
            .completed(&"venus".into())
            .is_some_and(|completed| completed.contains(&AchievementId::from("a1"))));
    }

    #[test]
    fn snapshot_merge_replaces_only_named_planets() {
        let json = json!({
            "planets": {
                "venus": { "tiers": {}, "completed": ["x"] },
                "earth": { "tiers": {}, "completed": ["y"] }
            }
        });
        let graph = Graph::from_json(&json.to_string()).expect("valid document");
        let snapshot =
            CompletionSnapshot::parse(r#"{"venus": ["z"], "pluto": ["q"]}"#).expect("snapshot");

        let merged = graph.with_snapshot(&snapshot);
        let venus = merged.planet(&"venus".into()).expect("venus");
        let earth = merged.planet(&"earth".into()).expect("earth");
        assert_eq!(venus.completed().iter().map(|id| id.as_str()).collect::<Vec<_>>(), ["z"]);
        assert_eq!(earth.completed().iter().map(|id| id.as_str()).collect::<Vec<_>>(), ["y"]);
        assert!(merged.planet(&"pluto".into()).is_none());
    }

    #[test]
    fn completion_snapshot_reparses() {
        let graph = Graph::from_json(SOURCE).expect("valid document");
        let encoded = graph.completion_snapshot().to_json().expect("encode");
        assert_eq!(encoded, r#"{"venus":["a1"],"earth":[]}"#);
        assert_eq!(
            CompletionSnapshot::parse(&encoded).expect("decode"),
            graph.completion_snapshot()
        );
    }
}
