
use std::collections::HashSet;

use super::ranking::RankingContext;
use crate::core::cache::PairView;
use crate::core::models::SimpleWord;
use crate::utils::fold_ascii;


/// Case- and diacritic-insensitive substring match; multi-word entries also match
/// their hyphenated spelling.
pub fn matches_term(word: &SimpleWord, folded_term: &str) -> bool {
    if word.word_ascii.contains(folded_term) {
        return true;
    }
    word.num_sub_words > 1 && word.word_ascii.replace(' ', "-").contains(folded_term)
}


/// Filters both sides of a cached pair by `term` and returns the top `limit` candidates.
pub fn words_with_term(pair: &PairView, term: &str, preferred_tag: Option<&str>, limit: usize) -> Vec<SimpleWord> {
    let folded = fold_ascii(term.trim());
    let mut seen: HashSet<(&str, &str)> = HashSet::new();

    let mut candidates: Vec<SimpleWord> = pair
        .first()
        .iter()
        .chain(pair.second())
        .filter(|w| matches_term(w, &folded))
        .filter(|w| seen.insert((w.word.as_str(), w.lang_tag.as_str())))
        .cloned()
        .collect();

    RankingContext::new(Some(&folded), preferred_tag).sort(&mut candidates);
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::PairCache;
    use crate::core::models::LanguageId;

    fn simple(word: &str, tag: &str) -> SimpleWord {
        SimpleWord::new(word, tag)
    }

    fn view(first: Vec<SimpleWord>, second: Vec<SimpleWord>) -> PairView {
        let cache = PairCache::new(2);
        cache.insert(LanguageId(0), LanguageId(1), first, second)
    }

    fn texts(words: &[SimpleWord]) -> Vec<&str> {
        words.iter().map(|w| w.word.as_str()).collect()
    }

    #[test]
    fn test_ranked_scenario() {
        let pair = view(
            vec![simple("angle", "eng"), simple("angel", "eng"), simple("dog", "eng")],
            vec![simple("anguille", "fre"), simple("chien", "fre")],
        );
        let result = words_with_term(&pair, "ang", Some("eng"), 10);
        assert_eq!(texts(&result), vec!["angel", "angle", "anguille"]);
    }

    #[test]
    fn test_diacritic_insensitive() {
        let pair = view(vec![simple("ice cream", "eng")], vec![simple("crème glacée", "fre")]);
        let result = words_with_term(&pair, "CREME", None, 10);
        assert_eq!(texts(&result), vec!["crème glacée"]);
    }

    #[test]
    fn test_hyphenated_term_matches_multi_word() {
        let pair = view(vec![simple("ice cream", "eng")], vec![simple("glace", "fre")]);
        let result = words_with_term(&pair, "ice-cr", None, 10);
        assert_eq!(texts(&result), vec!["ice cream"]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let first: Vec<SimpleWord> = (0..25).map(|i| simple(&format!("word{:02}", i), "eng")).collect();
        let pair = view(first, Vec::new());
        let result = words_with_term(&pair, "word", None, 10);
        assert_eq!(result.len(), 10);
        assert_eq!(result[0].word, "word00");
        assert_eq!(result[9].word, "word09");
    }

    #[test]
    fn test_same_language_sides_not_duplicated() {
        let words = vec![simple("fleur", "fre")];
        let pair = view(words.clone(), words);
        assert_eq!(words_with_term(&pair, "fl", None, 10).len(), 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        let pair = view(vec![simple("dog", "eng")], vec![simple("chien", "fre")]);
        assert!(words_with_term(&pair, "xyz", Some("eng"), 10).is_empty());
    }
}
