use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::entity_extractor::{Entity, Relation};
use crate::Result;

/// Outgoing edge of a matched node; `target` is `None` when the node has no
/// outgoing edge at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct OutgoingEdge {
    #[serde(rename = "rel")]
    pub relation: Option<String>,
    pub target: Option<String>,
}

/// Incoming edge of a matched node; `source` is `None` when the node has no
/// incoming edge at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct IncomingEdge {
    #[serde(rename = "rel")]
    pub relation: Option<String>,
    pub source: Option<String>,
}

/// A matched entity and its one-hop neighborhood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    pub name: String,
    pub entity_type: Option<String>,
    pub outgoing: Vec<OutgoingEdge>,
    pub incoming: Vec<IncomingEdge>,
}

/// Counts reported by [`GraphStore::reset_and_store`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub entities: usize,
    /// Relations whose endpoints both exist
    pub relations: usize,
    /// Relations dropped because an endpoint is missing
    pub dangling: usize,
}

impl StoreSummary {
    /// Summarize a write of `entities` and `relations` into an empty graph.
    pub fn for_write(entities: &[Entity], relations: &[Relation]) -> Self {
        let names: HashSet<&str> = entities.iter().map(|e| e.name.as_str()).collect();
        let dangling = relations
            .iter()
            .filter(|r| !names.contains(r.source.as_str()) || !names.contains(r.target.as_str()))
            .count();

        Self {
            entities: names.len(),
            relations: relations.len() - dangling,
            dangling,
        }
    }
}

/// Persistent graph of entities and typed relations.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Replace the whole graph with `entities` and `relations`.
    ///
    /// Relations whose source or target is not among the stored entities are
    /// dropped without error.
    async fn reset_and_store(
        &self,
        entities: &[Entity],
        relations: &[Relation],
    ) -> Result<StoreSummary>;

    /// Nodes whose name contains `keyword` (case-insensitive), with their
    /// outgoing and incoming neighbors.
    async fn find_neighborhood(&self, keyword: &str) -> Result<Vec<Neighborhood>>;
}

/// Directed edge in the in-memory graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Edge {
    from: String,
    relation: String,
    to: String,
}

#[derive(Debug, Default, Clone)]
struct Snapshot {
    /// Node names in insertion order
    order: Vec<String>,
    types: HashMap<String, String>,
    edges: Vec<Edge>,
}

impl Snapshot {
    fn build(entities: &[Entity], relations: &[Relation]) -> Self {
        let mut snapshot = Snapshot::default();

        for entity in entities {
            if !snapshot.types.contains_key(&entity.name) {
                snapshot.order.push(entity.name.clone());
            }
            // MERGE + SET: a repeated name overwrites the type
            snapshot
                .types
                .insert(entity.name.clone(), entity.entity_type.clone());
        }

        let mut seen = HashSet::new();
        for rel in relations {
            if !snapshot.types.contains_key(&rel.source) || !snapshot.types.contains_key(&rel.target)
            {
                debug!(
                    "Dropping dangling relation {} --{}--> {}",
                    rel.source, rel.relation, rel.target
                );
                continue;
            }
            if seen.insert(rel.triple()) {
                snapshot.edges.push(Edge {
                    from: rel.source.clone(),
                    relation: rel.relation.clone(),
                    to: rel.target.clone(),
                });
            }
        }

        snapshot
    }

    fn neighborhood(&self, name: &str) -> Neighborhood {
        let mut outgoing = Vec::new();
        let mut incoming = Vec::new();

        for edge in &self.edges {
            if edge.from == name {
                let out = OutgoingEdge {
                    relation: Some(edge.relation.clone()),
                    target: Some(edge.to.clone()),
                };
                if !outgoing.contains(&out) {
                    outgoing.push(out);
                }
            }
            if edge.to == name {
                let inc = IncomingEdge {
                    relation: Some(edge.relation.clone()),
                    source: Some(edge.from.clone()),
                };
                if !incoming.contains(&inc) {
                    incoming.push(inc);
                }
            }
        }

        Neighborhood {
            name: name.to_string(),
            entity_type: self.types.get(name).cloned(),
            outgoing,
            incoming,
        }
    }
}

/// Graph store kept in process memory.
///
/// A build assembles a complete new snapshot and swaps it in under the write
/// lock, so readers see either the previous graph or the new one.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    snapshot: RwLock<Snapshot>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn node_count(&self) -> usize {
        self.snapshot.read().await.order.len()
    }

    pub async fn edge_count(&self) -> usize {
        self.snapshot.read().await.edges.len()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn reset_and_store(
        &self,
        entities: &[Entity],
        relations: &[Relation],
    ) -> Result<StoreSummary> {
        let next = Snapshot::build(entities, relations);
        let summary = StoreSummary::for_write(entities, relations);

        *self.snapshot.write().await = next;
        info!(
            "Stored {} entities, {} relations in memory ({} dangling dropped)",
            summary.entities, summary.relations, summary.dangling
        );
        Ok(summary)
    }

    async fn find_neighborhood(&self, keyword: &str) -> Result<Vec<Neighborhood>> {
        let needle = keyword.to_lowercase();
        let snapshot = self.snapshot.read().await;

        Ok(snapshot
            .order
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .map(|name| snapshot.neighborhood(name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats_graph() -> (Vec<Entity>, Vec<Relation>) {
        (
            vec![
                Entity::new("Cats", "ANIMAL"),
                Entity::new("Mammals", "ANIMAL"),
                Entity::new("Animals", "CONCEPT"),
            ],
            vec![
                Relation::new("Cats", "SUBSET_OF", "Mammals"),
                Relation::new("Mammals", "SUBSET_OF", "Animals"),
            ],
        )
    }

    #[tokio::test]
    async fn stores_entities_and_relations() {
        let store = InMemoryGraphStore::new();
        let (entities, relations) = cats_graph();

        let summary = store.reset_and_store(&entities, &relations).await.unwrap();

        assert_eq!(
            summary,
            StoreSummary {
                entities: 3,
                relations: 2,
                dangling: 0
            }
        );
        assert_eq!(store.node_count().await, 3);
        assert_eq!(store.edge_count().await, 2);
    }

    #[tokio::test]
    async fn finds_by_case_insensitive_substring() {
        let store = InMemoryGraphStore::new();
        let (entities, relations) = cats_graph();
        store.reset_and_store(&entities, &relations).await.unwrap();

        let found = store.find_neighborhood("AMMAL").await.unwrap();

        assert_eq!(found.len(), 1);
        let mammals = &found[0];
        assert_eq!(mammals.name, "Mammals");
        assert_eq!(mammals.entity_type.as_deref(), Some("ANIMAL"));
        assert_eq!(
            mammals.outgoing,
            vec![OutgoingEdge {
                relation: Some("SUBSET_OF".into()),
                target: Some("Animals".into())
            }]
        );
        assert_eq!(
            mammals.incoming,
            vec![IncomingEdge {
                relation: Some("SUBSET_OF".into()),
                source: Some("Cats".into())
            }]
        );
    }

    #[tokio::test]
    async fn substring_can_match_several_nodes() {
        let store = InMemoryGraphStore::new();
        let (entities, relations) = cats_graph();
        store.reset_and_store(&entities, &relations).await.unwrap();

        let names: Vec<String> = store
            .find_neighborhood("a")
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();

        assert_eq!(names, vec!["Cats", "Mammals", "Animals"]);
    }

    #[tokio::test]
    async fn dangling_relation_is_dropped_silently() {
        let store = InMemoryGraphStore::new();
        let entities = vec![Entity::new("Cats", "ANIMAL")];
        let relations = vec![Relation::new("Cats", "EATS", "Mice")];

        let summary = store.reset_and_store(&entities, &relations).await.unwrap();

        assert_eq!(summary.relations, 0);
        assert_eq!(summary.dangling, 1);
        let cats = store.find_neighborhood("cats").await.unwrap();
        assert!(cats[0].outgoing.is_empty());
        assert!(store.find_neighborhood("mice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rebuild_replaces_previous_graph() {
        let store = InMemoryGraphStore::new();
        let (entities, relations) = cats_graph();
        store.reset_and_store(&entities, &relations).await.unwrap();

        store
            .reset_and_store(&[Entity::new("Dogs", "ANIMAL")], &[])
            .await
            .unwrap();

        assert!(store.find_neighborhood("cats").await.unwrap().is_empty());
        assert_eq!(store.node_count().await, 1);
        assert_eq!(store.edge_count().await, 0);
    }

    #[tokio::test]
    async fn rebuilding_with_same_input_is_idempotent() {
        let store = InMemoryGraphStore::new();
        let (entities, relations) = cats_graph();

        store.reset_and_store(&entities, &relations).await.unwrap();
        let first = store.find_neighborhood("").await.unwrap();
        store.reset_and_store(&entities, &relations).await.unwrap();
        let second = store.find_neighborhood("").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.node_count().await, 3);
        assert_eq!(store.edge_count().await, 2);
    }

    #[tokio::test]
    async fn identical_edges_are_merged() {
        let store = InMemoryGraphStore::new();
        let entities = vec![Entity::new("A", "T"), Entity::new("B", "T")];
        let relations = vec![Relation::new("A", "R", "B"), Relation::new("A", "R", "B")];

        store.reset_and_store(&entities, &relations).await.unwrap();

        assert_eq!(store.edge_count().await, 1);
    }

    #[test]
    fn summary_counts_dangling_relations() {
        let entities = vec![Entity::new("A", "T"), Entity::new("B", "T")];
        let relations = vec![
            Relation::new("A", "R", "B"),
            Relation::new("A", "R", "C"),
            Relation::new("X", "R", "B"),
        ];

        let summary = StoreSummary::for_write(&entities, &relations);
        assert_eq!(summary.entities, 2);
        assert_eq!(summary.relations, 1);
        assert_eq!(summary.dangling, 2);
    }
}
