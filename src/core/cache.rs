

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

use super::models::{LanguageId, SimpleWord};
use crate::toolkit::search::RankingContext;


struct PairEntry {
    low: Vec<SimpleWord>,
    high: Vec<SimpleWord>,
}


/// One cached pair, oriented the way the caller asked for it.
#[derive(Clone)]
pub struct PairView {
    entry: Arc<PairEntry>,
    swapped: bool,
}

impl PairView {
    pub fn first(&self) -> &[SimpleWord] {
        if self.swapped { &self.entry.high } else { &self.entry.low }
    }

    pub fn second(&self) -> &[SimpleWord] {
        if self.swapped { &self.entry.low } else { &self.entry.high }
    }
}


#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub filled: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}


/// Word lists per unordered language pair, stored in a triangular slot table
/// indexed by language ordinals.
pub struct PairCache {
    languages: usize,
    slots: RwLock<Vec<Option<Arc<PairEntry>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PairCache {
    pub fn new(languages: usize) -> Self {
        Self {
            languages,
            slots: RwLock::new(vec![None; languages * (languages + 1) / 2]),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn slot(&self, a: LanguageId, b: LanguageId) -> (usize, bool) {
        let (low, high, swapped) = if a.0 <= b.0 { (a.0, b.0, false) } else { (b.0, a.0, true) };
        debug_assert!(high < self.languages);
        (high * (high + 1) / 2 + low, swapped)
    }

    pub fn get(&self, a: LanguageId, b: LanguageId) -> Option<PairView> {
        let (idx, swapped) = self.slot(a, b);
        let slots = self.slots.read();
        match slots.get(idx).cloned().flatten() {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(PairView { entry, swapped })
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Sorts both sides by the default ranking and stores them for either orientation.
    pub fn insert(&self, a: LanguageId, b: LanguageId, mut first: Vec<SimpleWord>, mut second: Vec<SimpleWord>) -> PairView {
        let ranking = RankingContext::default();
        ranking.sort(&mut first);
        ranking.sort(&mut second);

        let (idx, swapped) = self.slot(a, b);
        let entry = Arc::new(if swapped {
            PairEntry { low: second, high: first }
        } else {
            PairEntry { low: first, high: second }
        });

        let mut slots = self.slots.write();
        if let Some(slot) = slots.get_mut(idx) {
            *slot = Some(Arc::clone(&entry));
        }
        PairView { entry, swapped }
    }

    pub fn invalidate_all(&self) {
        let mut slots = self.slots.write();
        slots.iter_mut().for_each(|slot| *slot = None);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        let slots = self.slots.read();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            filled: slots.iter().filter(|s| s.is_some()).count(),
            capacity: slots.len(),
        }
    }
}
