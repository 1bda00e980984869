//! Graph store backed by Neo4j

use async_trait::async_trait;
use neo4rs::{query, Graph, Query, Txn};
use tracing::{debug, info, warn};

use super::entity_extractor::{Entity, Relation};
use super::graph::{GraphStore, IncomingEdge, Neighborhood, OutgoingEdge, StoreSummary};
use crate::config::Neo4jConfig;
use crate::{Error, Result};

const CLEAR_GRAPH: &str = "MATCH (n) DETACH DELETE n";

const UPSERT_ENTITY: &str = "MERGE (n:Entity {name: $name}) SET n.type = $type";

const MERGE_RELATION: &str = "MATCH (a:Entity {name: $src}), (b:Entity {name: $tgt})
     MERGE (a)-[:RELATES {type: $rel}]->(b)";

const FIND_NEIGHBORHOOD: &str = "MATCH (n:Entity) WHERE toLower(n.name) CONTAINS toLower($kw)
     OPTIONAL MATCH (n)-[r:RELATES]->(m)
     OPTIONAL MATCH (p)-[r2:RELATES]->(n)
     RETURN n.name AS entity, n.type AS type,
            collect(DISTINCT {rel: r.type, target: m.name}) AS out,
            collect(DISTINCT {rel: r2.type, source: p.name}) AS inc";

/// Neo4j-backed [`GraphStore`].
pub struct Neo4jGraphStore {
    graph: Graph,
}

impl Neo4jGraphStore {
    /// Connect to Neo4j server
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password).await?;
        info!("Connected to Neo4j at {}", uri);
        Ok(Self { graph })
    }

    /// Connect using the `neo4j` section of the configuration.
    pub async fn from_config(config: &Neo4jConfig) -> Result<Self> {
        if config.password.is_empty() {
            return Err(Error::ConfigError("NEO4J_PASSWORD is not set".to_string()));
        }
        Self::new(&config.uri, &config.username, &config.password).await
    }

    async fn write_all(txn: &mut Txn, entities: &[Entity], relations: &[Relation]) -> Result<()> {
        txn.run(query(CLEAR_GRAPH)).await?;

        for entity in entities {
            txn.run(upsert_entity_query(entity)).await?;
        }

        for relation in relations {
            txn.run(merge_relation_query(relation)).await?;
        }

        Ok(())
    }
}

fn upsert_entity_query(entity: &Entity) -> Query {
    query(UPSERT_ENTITY)
        .param("name", entity.name.clone())
        .param("type", entity.entity_type.clone())
}

fn merge_relation_query(relation: &Relation) -> Query {
    query(MERGE_RELATION)
        .param("src", relation.source.clone())
        .param("rel", relation.relation.clone())
        .param("tgt", relation.target.clone())
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn reset_and_store(
        &self,
        entities: &[Entity],
        relations: &[Relation],
    ) -> Result<StoreSummary> {
        // One transaction: readers keep the old graph until commit
        let mut txn = self.graph.start_txn().await?;

        if let Err(err) = Self::write_all(&mut txn, entities, relations).await {
            if let Err(rollback_err) = txn.rollback().await {
                warn!("Rollback after failed build also failed: {}", rollback_err);
            }
            return Err(err);
        }
        txn.commit().await?;

        let summary = StoreSummary::for_write(entities, relations);
        info!(
            "Stored {} entities, {} relations in Neo4j ({} dangling dropped)",
            summary.entities, summary.relations, summary.dangling
        );
        Ok(summary)
    }

    async fn find_neighborhood(&self, keyword: &str) -> Result<Vec<Neighborhood>> {
        let q = query(FIND_NEIGHBORHOOD).param("kw", keyword.to_string());

        let mut result = self.graph.execute(q).await?;
        let mut neighborhoods = Vec::new();

        while let Some(row) = result.next().await? {
            let name: String = row.get("entity")?;
            let entity_type: Option<String> = row.get("type")?;
            let outgoing: Vec<OutgoingEdge> = row.get("out")?;
            let incoming: Vec<IncomingEdge> = row.get("inc")?;

            neighborhoods.push(Neighborhood {
                name,
                entity_type,
                outgoing,
                incoming,
            });
        }

        debug!(keyword, matches = neighborhoods.len(), "neighborhood lookup");
        Ok(neighborhoods)
    }
}
