pub mod autocomplete;
pub mod engine;
pub mod ranking;

pub use autocomplete::{matches_term, words_with_term};
pub use engine::SearchEngine;
pub use ranking::{RankingContext, compare_words, sort_words};
