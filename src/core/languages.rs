

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::error::{DictionaryError, Result};
use super::models::{Language, LanguageId};
use crate::db::LanguageName;
use crate::utils::title_case;

lazy_static! {
    static ref PAIR_KEY: Regex = Regex::new(r"^(\w{3})(\w{3})$").unwrap();
}


/// Admin-curated language list with the hub as a distinguished member.
#[derive(Debug, Clone)]
pub struct LanguageSet {
    languages: Vec<Language>,
    hub: LanguageId,
    by_tag: HashMap<String, LanguageId>,
    by_name: HashMap<String, LanguageId>,
}

impl LanguageSet {
    pub fn new(names: &[String], hub: &str) -> Result<Self> {
        let mut languages: Vec<Language> = Vec::with_capacity(names.len());
        let mut by_tag = HashMap::new();
        let mut by_name = HashMap::new();

        for name in names {
            let language = Language::new(name);
            let id = LanguageId(languages.len());
            if let Some(other) = by_tag.insert(language.tag.clone(), id) {
                return Err(DictionaryError::ReloadFailure(format!(
                    "languages {} and {} share the key {}",
                    languages[other.0].language, language.language, language.tag
                )));
            }
            by_name.insert(language.language.clone(), id);
            languages.push(language);
        }

        let hub = by_name
            .get(&hub.to_lowercase())
            .copied()
            .ok_or_else(|| DictionaryError::ReloadFailure(format!("hub language {} is not loaded", hub)))?;

        Ok(Self {
            languages,
            hub,
            by_tag,
            by_name,
        })
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn hub(&self) -> LanguageId {
        self.hub
    }

    pub fn is_hub(&self, id: LanguageId) -> bool {
        self.hub == id
    }

    pub fn get(&self, id: LanguageId) -> &Language {
        &self.languages[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = LanguageId> + '_ {
        (0..self.languages.len()).map(LanguageId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LanguageId, &Language)> {
        self.languages.iter().enumerate().map(|(i, l)| (LanguageId(i), l))
    }

    /// Accepts either a three-letter tag or a canonical language name.
    pub fn resolve(&self, key: &str) -> Result<LanguageId> {
        let key = key.trim().to_lowercase();
        self.by_tag
            .get(&key)
            .or_else(|| self.by_name.get(&key))
            .copied()
            .ok_or(DictionaryError::InvalidPairKey(key))
    }

    /// Splits a six-character key such as `frefre` into its two languages.
    pub fn parse_pair_key(&self, key: &str) -> Result<(LanguageId, LanguageId)> {
        let key = key.to_lowercase();
        let caps = PAIR_KEY
            .captures(&key)
            .ok_or_else(|| DictionaryError::InvalidPairKey(key.clone()))?;
        Ok((self.resolve(&caps[1])?, self.resolve(&caps[2])?))
    }

    /// Unknown or absent display keys fall back to the hub language.
    pub fn display_language(&self, key: Option<&str>) -> LanguageId {
        key.and_then(|k| self.resolve(k).ok()).unwrap_or(self.hub)
    }
}


/// Square matrix of language names: `names[of][in]`.
#[derive(Debug, Clone)]
pub struct LanguageNames {
    names: Vec<Vec<Option<String>>>,
}

impl LanguageNames {
    pub fn new(languages: &LanguageSet, rows: &[LanguageName]) -> Self {
        let mut names = vec![vec![None; languages.len()]; languages.len()];
        for row in rows {
            let (Ok(of), Ok(within)) = (
                languages.resolve(&row.language),
                languages.resolve(&row.in_language),
            ) else {
                continue;
            };
            if !row.name.trim().is_empty() {
                names[of.0][within.0] = Some(row.name.to_lowercase());
            }
        }
        Self { names }
    }

    pub fn display_name(&self, languages: &LanguageSet, of: LanguageId, within: LanguageId) -> String {
        let name = self.names[of.0][within.0]
            .as_deref()
            .unwrap_or(&languages.get(of).language);
        title_case(name)
    }

    /// All languages named in `display`, with `display` itself swapped into position 0.
    pub fn localized(&self, languages: &LanguageSet, display: LanguageId) -> Vec<Language> {
        let mut result: Vec<Language> = languages
            .iter()
            .map(|(id, lang)| Language {
                language: self.display_name(languages, id, display),
                tag: lang.tag.clone(),
            })
            .collect();
        result.swap(0, display.0);
        result
    }

    pub fn localize(&self, languages: &LanguageSet, of: LanguageId, display: LanguageId) -> Language {
        Language {
            language: self.display_name(languages, of, display),
            tag: languages.get(of).tag.clone(),
        }
    }
}
