

use serde::{Deserialize, Serialize};

use crate::utils::{count_sub_words, fold_ascii};

pub type ConceptId = i64;
pub type FieldId = i64;
pub type GenreId = i64;


/// Ordinal of a language inside the current snapshot's language set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageId(pub usize);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Language {
    pub language: String,
    pub tag: String,
}

impl Language {
    pub fn new(language: &str) -> Self {
        let language = language.to_lowercase();
        let tag = language_tag(&language);
        Self { language, tag }
    }
}


/// Three-letter key used in pair keys and URLs.
pub fn language_tag(name: &str) -> String {
    name.to_lowercase().chars().take(3).collect()
}


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimpleWord {
    #[serde(rename = "w")]
    pub word: String,
    #[serde(skip)]
    pub word_ascii: String,
    #[serde(skip)]
    pub num_sub_words: usize,
    #[serde(rename = "t")]
    pub lang_tag: String,
}

impl SimpleWord {
    pub fn new(word: &str, lang_tag: &str) -> Self {
        Self {
            word: word.to_string(),
            word_ascii: fold_ascii(word),
            num_sub_words: count_sub_words(word),
            lang_tag: lang_tag.to_string(),
        }
    }
}


#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldLabel {
    pub label: String,
    pub description: String,
}


/// Fully resolved search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub language: Language,
    pub description: String,
    pub definition: String,
    pub locality: String,
    pub field: String,
    pub field_description: String,
    pub genre: String,
    pub synonyms: Vec<Word>,
    pub translations: Vec<Word>,
}

impl Word {
    pub fn new(word: &str, language: Language) -> Self {
        Self {
            word: word.to_string(),
            language,
            description: String::new(),
            definition: String::new(),
            locality: String::new(),
            field: String::new(),
            field_description: String::new(),
            genre: String::new(),
            synonyms: Vec::new(),
            translations: Vec::new(),
        }
    }
}
