
use std::collections::HashMap;

use async_trait::async_trait;

use super::closure::{Adjacency, ConceptEdges};
use crate::core::models::ConceptId;
use crate::db::{ConceptLinks, StoreResult};


/// Adjacency materialized from one bulk fetch of the hub table.
#[derive(Debug, Clone, Default)]
pub struct ConceptGraph {
    edges: HashMap<ConceptId, ConceptEdges>,
}

impl ConceptGraph {
    pub fn from_links(links: Vec<ConceptLinks>) -> Self {
        let mut edges: HashMap<ConceptId, ConceptEdges> = links
            .iter()
            .map(|l| {
                (
                    l.id,
                    ConceptEdges {
                        parent: l.parent,
                        synonym_group: l.synonym_group,
                        ..Default::default()
                    },
                )
            })
            .collect();

        for link in &links {
            if let Some(parent) = link.parent {
                if let Some(target) = edges.get_mut(&parent) {
                    target.children.push(link.id);
                }
            }
            if let Some(group) = link.synonym_group {
                if let Some(target) = edges.get_mut(&group) {
                    target.synonym_members.push(link.id);
                }
            }
        }

        Self { edges }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.edges.contains_key(&id)
    }
}

#[async_trait]
impl Adjacency for ConceptGraph {
    async fn edges(&self, id: ConceptId) -> StoreResult<Option<ConceptEdges>> {
        Ok(self.edges.get(&id).cloned())
    }
}
