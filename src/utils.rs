

use std::collections::HashMap;

use lazy_static::lazy_static;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

lazy_static! {
    // Letters that do not decompose into a base letter plus combining marks.
    static ref FOLD_SPECIAL: HashMap<char, &'static str> = {
        let mut m = HashMap::new();
        m.insert('ß', "ss");
        m.insert('æ', "ae");
        m.insert('œ', "oe");
        m.insert('ø', "o");
        m.insert('đ', "d");
        m.insert('ð', "d");
        m.insert('ł', "l");
        m.insert('þ', "th");
        m.insert('ı', "i");
        m
    };
}


/// Lowercase, diacritic-free form of `text` used for autocomplete matching.
pub fn fold_ascii(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match FOLD_SPECIAL.get(&c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}


#[inline]
pub fn count_sub_words(text: &str) -> usize {
    text.split(' ').filter(|part| !part.is_empty()).count()
}


/// Drops the last character, or returns `None` when nothing would remain.
#[inline]
pub fn drop_last_char(s: &str) -> Option<&str> {
    let (idx, _) = s.char_indices().next_back()?;
    if idx == 0 { None } else { Some(&s[..idx]) }
}


#[inline]
pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
