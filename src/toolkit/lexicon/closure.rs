
use std::collections::{BTreeSet, HashSet, VecDeque};

use async_trait::async_trait;
use tracing::debug;

use crate::core::models::ConceptId;
use crate::db::{ConceptStore, StoreResult};


/// Edges around one concept, in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptEdges {
    pub parent: Option<ConceptId>,
    pub synonym_group: Option<ConceptId>,
    pub children: Vec<ConceptId>,
    pub synonym_members: Vec<ConceptId>,
}


#[async_trait]
pub trait Adjacency: Send + Sync {
    /// `None` when the concept does not exist.
    async fn edges(&self, id: ConceptId) -> StoreResult<Option<ConceptEdges>>;
}


/// Point-query adjacency straight from the store, used on the search path.
pub struct StoreAdjacency<'a> {
    store: &'a dyn ConceptStore,
    with_children: bool,
}

impl<'a> StoreAdjacency<'a> {
    pub fn new(store: &'a dyn ConceptStore, resolver: &ClosureResolver) -> Self {
        Self {
            store,
            with_children: resolver.follows_parents(),
        }
    }
}

#[async_trait]
impl Adjacency for StoreAdjacency<'_> {
    async fn edges(&self, id: ConceptId) -> StoreResult<Option<ConceptEdges>> {
        let Some(links) = self.store.resolve_concept(id).await? else {
            return Ok(None);
        };
        let children = if self.with_children {
            self.store.concepts_with_parent(id).await?
        } else {
            Vec::new()
        };
        let synonym_members = self.store.concepts_with_synonym_group(id).await?;

        Ok(Some(ConceptEdges {
            parent: links.parent,
            synonym_group: links.synonym_group,
            children,
            synonym_members,
        }))
    }
}


/// Breadth-first walk over synonym-group links (and parent links, unless disabled)
/// in both directions. Cycles are expected; the visited set bounds the walk.
#[derive(Debug, Clone, Copy)]
pub struct ClosureResolver {
    follow_parents: bool,
}

impl ClosureResolver {
    pub fn new(follow_parents: bool) -> Self {
        Self { follow_parents }
    }

    pub fn follows_parents(&self) -> bool {
        self.follow_parents
    }

    pub async fn closure(&self, graph: &dyn Adjacency, start: ConceptId) -> StoreResult<BTreeSet<ConceptId>> {
        let mut members = BTreeSet::new();
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(id) = queue.pop_front() {
            // Dangling references are skipped, an unknown start yields an empty closure.
            let Some(edges) = graph.edges(id).await? else {
                continue;
            };
            members.insert(id);

            let mut next: Vec<ConceptId> = edges.synonym_members;
            next.extend(edges.synonym_group);
            if self.follow_parents {
                next.extend(edges.parent);
                next.extend(edges.children);
            }

            for neighbour in next {
                if visited.insert(neighbour) {
                    queue.push_back(neighbour);
                }
            }
        }

        debug!("Closure of concept {}: {} members", start, members.len());
        Ok(members)
    }
}

impl Default for ClosureResolver {
    fn default() -> Self {
        Self::new(true)
    }
}
