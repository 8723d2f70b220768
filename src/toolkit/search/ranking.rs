
use std::cmp::Ordering;

use crate::core::models::{SimpleWord, Word, language_tag};
use crate::utils::{count_sub_words, fold_ascii};


/// Default order: preferred language, then prefix match on the term, then fewest
/// sub-words, then raw text, then language tag.
#[derive(Debug, Clone, Default)]
pub struct RankingContext {
    term: Option<String>,
    preferred_tag: Option<String>,
}

impl RankingContext {
    pub fn new(term: Option<&str>, preferred_tag: Option<&str>) -> Self {
        Self {
            term: term.map(fold_ascii).filter(|t| !t.is_empty()),
            // A preference may be given as a tag or as a full language name.
            preferred_tag: preferred_tag
                .map(|t| language_tag(t.trim()))
                .filter(|t| !t.is_empty()),
        }
    }

    pub fn compare(&self, a: &SimpleWord, b: &SimpleWord) -> Ordering {
        if let Some(tag) = &self.preferred_tag {
            let ord = (b.lang_tag == *tag).cmp(&(a.lang_tag == *tag));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        if let Some(term) = &self.term {
            let ord = b.word_ascii.starts_with(term.as_str()).cmp(&a.word_ascii.starts_with(term.as_str()));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.num_sub_words
            .cmp(&b.num_sub_words)
            .then_with(|| a.word.cmp(&b.word))
            .then_with(|| a.lang_tag.cmp(&b.lang_tag))
    }

    pub fn sort(&self, words: &mut [SimpleWord]) {
        words.sort_by(|a, b| self.compare(a, b));
    }
}

pub fn compare_words(a: &Word, b: &Word) -> Ordering {
    count_sub_words(&a.word)
        .cmp(&count_sub_words(&b.word))
        .then_with(|| a.word.cmp(&b.word))
}

pub fn sort_words(words: &mut [Word]) {
    words.sort_by(compare_words);
}
