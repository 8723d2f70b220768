pub mod lexicon;
pub mod search;


pub use lexicon::{ClosureResolver, PairProjector};
pub use search::{RankingContext, SearchEngine};
