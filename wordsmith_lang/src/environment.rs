// Environment matching: the left/right context that gates a sound change.
//
// An environment variant is split at its single `_`. For a candidate span
// `[start, end)` of a word, the left part is walked right-to-left from
// `start` and the right part left-to-right from `end`. Each symbol token
// consumes one word symbol; zero-width tokens test the current cursor:
//
// - `#`      the cursor is at the start (left) or end (right) of the word
// - `σ`      the cursor is a syllable edge
//
// Stress marks `ˈ ˌ ˘` do not look at the cursor. Wherever they appear in
// the environment they require the focus itself to sit in a syllable of that
// class: the syllable of the span's first symbol, or for an insertion site
// the syllable of the following symbol (the preceding one at word end).
//
// Syllable rules use the same split but walk syllables instead of symbols
// (`matches_syllable`): `σ` tokens consume one syllable, optionally checking
// its stress class, and `#` tests the word edge.
//
// Category tokens test membership only; weights play no part in matching.

use crate::category::CategoryTable;
use crate::error::LangError;
use crate::pattern::Token;
use crate::types::{Stress, Word};

/// One concrete environment: the tokens left and right of `_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    left: Vec<Token>,
    right: Vec<Token>,
}

impl Environment {
    /// Split an expanded environment variant at its `_`.
    ///
    /// `source` is the environment text, used for error reporting.
    pub fn from_variant(variant: &[Token], source: &str) -> Result<Self, LangError> {
        let mut focus = variant
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Token::Focus)
            .map(|(i, _)| i);
        let (Some(at), None) = (focus.next(), focus.next()) else {
            return Err(LangError::MissingFocus(source.to_string()));
        };
        Ok(Self {
            left: variant[..at].to_vec(),
            right: variant[at + 1..].to_vec(),
        })
    }

    /// The environment `_`, which holds everywhere.
    pub fn anywhere() -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    pub fn left(&self) -> &[Token] {
        &self.left
    }

    pub fn right(&self) -> &[Token] {
        &self.right
    }

    pub fn is_unconditional(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// Whether matching needs syllable structure.
    pub fn needs_prosody(&self) -> bool {
        self.tokens().any(Token::is_prosodic)
    }

    pub(crate) fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.left.iter().chain(self.right.iter())
    }

    /// Whether the context around the span `[start, end)` holds.
    ///
    /// Insertion sites are empty spans (`start == end`).
    pub fn matches(&self, word: &Word, start: usize, end: usize, categories: &CategoryTable) -> bool {
        let symbols = word.symbols();
        let focus = focus_stress(word, start);

        let mut cursor = start;
        for token in self.left.iter().rev() {
            match token {
                Token::Boundary => {
                    if cursor != 0 {
                        return false;
                    }
                }
                Token::StressMark(stress) => {
                    if focus != Some(*stress) {
                        return false;
                    }
                }
                Token::Syllable(_) => {
                    if !word.is_syllable_edge(cursor) {
                        return false;
                    }
                }
                _ => {
                    if cursor == 0 || !token.matches_symbol(symbols[cursor - 1], categories) {
                        return false;
                    }
                    cursor -= 1;
                }
            }
        }

        let mut cursor = end;
        for token in &self.right {
            match token {
                Token::Boundary => {
                    if cursor != symbols.len() {
                        return false;
                    }
                }
                Token::StressMark(stress) => {
                    if focus != Some(*stress) {
                        return false;
                    }
                }
                Token::Syllable(_) => {
                    if !word.is_syllable_edge(cursor) {
                        return false;
                    }
                }
                _ => {
                    if cursor >= symbols.len() || !token.matches_symbol(symbols[cursor], categories) {
                        return false;
                    }
                    cursor += 1;
                }
            }
        }
        true
    }

    /// Syllable-level match around syllable `index`, given the stress class
    /// of every syllable in the word.
    pub fn matches_syllable(&self, stress: &[Stress], index: usize) -> bool {
        let mut cursor = index;
        for token in self.left.iter().rev() {
            match token {
                Token::Boundary => {
                    if cursor != 0 {
                        return false;
                    }
                }
                Token::Syllable(class) => {
                    if cursor == 0 || !class_matches(*class, stress[cursor - 1]) {
                        return false;
                    }
                    cursor -= 1;
                }
                _ => return false,
            }
        }

        let mut cursor = index + 1;
        for token in &self.right {
            match token {
                Token::Boundary => {
                    if cursor != stress.len() {
                        return false;
                    }
                }
                Token::Syllable(class) => {
                    if cursor >= stress.len() || !class_matches(*class, stress[cursor]) {
                        return false;
                    }
                    cursor += 1;
                }
                _ => return false,
            }
        }
        true
    }
}

/// Stress class of the syllable holding the focus that starts at `start`.
fn focus_stress(word: &Word, start: usize) -> Option<Stress> {
    if start < word.len() {
        word.stress_at(start)
    } else {
        word.stress_at(start.checked_sub(1)?)
    }
}

/// A `σ` token with no class matches any syllable.
pub(crate) fn class_matches(wanted: Option<Stress>, actual: Stress) -> bool {
    wanted.is_none_or(|w| w == actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::pattern::{Pattern, PatternContext};
    use crate::types::Prosody;

    fn table() -> CategoryTable {
        let mut t = CategoryTable::new();
        t.insert(Category::parse('V', "aeiou").unwrap());
        t.insert(Category::parse('C', "ptkbdgmnsl").unwrap());
        t
    }

    fn env(src: &str) -> Environment {
        let t = table();
        let pattern = Pattern::parse(src, PatternContext::Environment, &t).unwrap();
        let variants = pattern.expand();
        assert_eq!(variants.len(), 1, "test helper expects one variant");
        Environment::from_variant(&variants[0], src).unwrap()
    }

    #[test]
    fn test_between_vowels() {
        let t = table();
        let e = env("V_V");
        let w = Word::from_text("apa");
        assert!(e.matches(&w, 1, 2, &t));
        assert!(!e.matches(&w, 0, 1, &t));
        assert!(!e.matches(&w, 2, 3, &t));
    }

    #[test]
    fn test_word_boundaries() {
        let t = table();
        let w = Word::from_text("tak");
        assert!(env("_#").matches(&w, 2, 3, &t));
        assert!(!env("_#").matches(&w, 1, 2, &t));
        assert!(env("#_").matches(&w, 0, 1, &t));
        assert!(!env("#_").matches(&w, 1, 2, &t));
        // Insertion site at the very start.
        assert!(env("#_s").matches(&Word::from_text("sta"), 0, 0, &t));
        assert!(!env("#_s").matches(&Word::from_text("sta"), 1, 1, &t));
    }

    #[test]
    fn test_multi_symbol_context() {
        let t = table();
        let e = env("Ca_#");
        assert!(e.matches(&Word::from_text("mtak"), 3, 4, &t));
        assert!(e.matches(&Word::from_text("mak"), 2, 3, &t));
        assert!(!e.matches(&Word::from_text("aak"), 2, 3, &t));
    }

    #[test]
    fn test_adhoc_set() {
        let t = table();
        let e = env("_[ie]");
        assert!(e.matches(&Word::from_text("ki"), 0, 1, &t));
        assert!(!e.matches(&Word::from_text("ka"), 0, 1, &t));
    }

    #[test]
    fn test_missing_or_double_focus() {
        let t = table();
        for src in ["VC", "V_C_"] {
            let p = Pattern::parse(src, PatternContext::Environment, &t).unwrap();
            let err = Environment::from_variant(&p.expand()[0], src).unwrap_err();
            assert_eq!(err, LangError::MissingFocus(src.to_string()));
        }
    }

    #[test]
    fn test_stress_marks_need_prosody() {
        let t = table();
        let e = env("ˈ_");
        assert!(e.needs_prosody());
        let plain = Word::from_text("banana");
        assert!(!e.matches(&plain, 1, 2, &t));

        let w = Word::with_prosody(
            "banana".chars().collect(),
            Prosody::new(
                vec![0, 2, 4],
                vec![Stress::Primary, Stress::Unstressed, Stress::Unstressed],
            ),
        );
        assert!(e.matches(&w, 1, 2, &t));
        assert!(!e.matches(&w, 3, 4, &t));
        assert!(env("˘_").matches(&w, 3, 4, &t));
    }

    #[test]
    fn test_stress_mark_tests_the_focus_syllable() {
        let t = table();
        // ˈba.ka: the `a` before `k` is stressed, `k` itself is not.
        let w = Word::with_prosody(
            "baka".chars().collect(),
            Prosody::new(vec![0, 2], vec![Stress::Primary, Stress::Unstressed]),
        );
        assert!(!env("ˈV_").matches(&w, 2, 3, &t));
        assert!(env("˘V_").matches(&w, 2, 3, &t));
        assert!(env("_ˈV").matches(&w, 0, 1, &t));
        assert!(!env("_˘C").matches(&w, 1, 2, &t));

        // Insertion sites take the following syllable, or the last at word end.
        assert!(env("ˈ_").matches(&w, 0, 0, &t));
        assert!(!env("ˈ_").matches(&w, 2, 2, &t));
        assert!(env("˘_").matches(&w, 4, 4, &t));
    }

    #[test]
    fn test_syllable_edge_in_symbol_environment() {
        let t = table();
        let w = Word::with_prosody(
            "banana".chars().collect(),
            Prosody::new(vec![0, 2, 4], vec![Stress::Unstressed; 3]),
        );
        let e = env("_σ");
        assert!(e.matches(&w, 1, 2, &t));
        assert!(!e.matches(&w, 0, 1, &t));
    }

    #[test]
    fn test_syllable_level_matching() {
        let stress = [Stress::Primary, Stress::Unstressed, Stress::Unstressed];
        assert!(env("#_").matches_syllable(&stress, 0));
        assert!(!env("#_").matches_syllable(&stress, 1));
        assert!(env("_#").matches_syllable(&stress, 2));
        assert!(env("ˈσ_").matches_syllable(&stress, 1));
        assert!(!env("ˈσ_").matches_syllable(&stress, 2));
        assert!(env("σ_σ").matches_syllable(&stress, 1));
    }
}
