use std::collections::HashSet;

use super::entity_extractor::{Entity, Extraction, Relation};

/// Merges per-chunk extractions into one entity list and one relation list.
///
/// Entities are keyed by name and relations by `(source, relation, target)`.
/// The first occurrence wins and output keeps first-seen order.
#[derive(Debug, Default, Clone)]
pub struct Aggregator {
    seen_entities: HashSet<String>,
    seen_relations: HashSet<(String, String, String)>,
    entities: Vec<Entity>,
    relations: Vec<Relation>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, extraction: Extraction) {
        for entity in extraction.entities {
            if self.seen_entities.insert(entity.name.clone()) {
                self.entities.push(entity);
            }
        }

        for relation in extraction.relations {
            let key = (
                relation.source.clone(),
                relation.relation.clone(),
                relation.target.clone(),
            );
            if self.seen_relations.insert(key) {
                self.relations.push(relation);
            }
        }
    }

    pub fn finish(self) -> (Vec<Entity>, Vec<Relation>) {
        (self.entities, self.relations)
    }
}

/// Aggregate a whole sequence of extractions.
pub fn aggregate<I>(extractions: I) -> (Vec<Entity>, Vec<Relation>)
where
    I: IntoIterator<Item = Extraction>,
{
    let mut aggregator = Aggregator::new();
    for extraction in extractions {
        aggregator.push(extraction);
    }
    aggregator.finish()
}
