
use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use super::closure::ClosureResolver;
use super::graph::ConceptGraph;
use crate::core::models::{ConceptId, Language, SimpleWord};
use crate::db::{ConceptStore, RawPair, StoreResult, WordEntry};


/// Splits both row sets into closure components and keeps, on each side, the words whose
/// component also holds at least one row of the other side.
pub async fn project_rows(
    graph: &ConceptGraph,
    resolver: &ClosureResolver,
    first: &[WordEntry],
    second: &[WordEntry],
) -> StoreResult<RawPair> {
    let concepts: BTreeSet<ConceptId> = first.iter().chain(second).map(|r| r.concept).collect();

    let mut component: HashMap<ConceptId, usize> = HashMap::new();
    let mut next_label = 0usize;
    for id in concepts {
        if component.contains_key(&id) {
            continue;
        }
        for member in resolver.closure(graph, id).await? {
            component.insert(member, next_label);
        }
        next_label += 1;
    }

    let labels_of = |rows: &[WordEntry]| -> HashSet<usize> {
        rows.iter().filter_map(|r| component.get(&r.concept).copied()).collect()
    };
    let first_labels = labels_of(first);
    let second_labels = labels_of(second);

    let keep = |rows: &[WordEntry], other: &HashSet<usize>| -> Vec<String> {
        dedup_words(rows.iter().filter(|r| {
            component
                .get(&r.concept)
                .is_some_and(|label| other.contains(label))
        }))
    };

    let pair = RawPair {
        first: keep(first, &second_labels),
        second: keep(second, &first_labels),
    };
    debug!(
        "Projected {} components into {}/{} words",
        next_label,
        pair.first.len(),
        pair.second.len()
    );
    Ok(pair)
}

fn dedup_words<'a>(rows: impl Iterator<Item = &'a WordEntry>) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.filter(|r| !r.word.is_empty() && seen.insert(r.word.as_str()))
        .map(|r| r.word.clone())
        .collect()
}


pub struct PairProjector<'a> {
    store: &'a dyn ConceptStore,
    resolver: &'a ClosureResolver,
}

impl<'a> PairProjector<'a> {
    pub fn new(store: &'a dyn ConceptStore, resolver: &'a ClosureResolver) -> Self {
        Self { store, resolver }
    }

    /// Unsorted word lists for both sides; the same language yields all its words twice.
    pub async fn project(&self, first: &Language, second: &Language) -> StoreResult<(Vec<SimpleWord>, Vec<SimpleWord>)> {
        if first.language == second.language {
            let rows = self.store.list_words(&first.language).await?;
            let words = to_simple(dedup_words(rows.iter()), &first.tag);
            return Ok((words.clone(), words));
        }

        let raw = self
            .store
            .project_language_pair(&first.language, &second.language, self.resolver)
            .await?;
        Ok((to_simple(raw.first, &first.tag), to_simple(raw.second, &second.tag)))
    }
}

fn to_simple(words: Vec<String>, tag: &str) -> Vec<SimpleWord> {
    words.iter().map(|w| SimpleWord::new(w, tag)).collect()
}
