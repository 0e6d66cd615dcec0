// Core word types: symbols, stress classes, and derived syllable structure.
//
// The type hierarchy is:
// - `Stress`: primary, secondary, or unstressed class of a syllable
// - `Prosody`: syllable start offsets plus one `Stress` per syllable
// - `Word`: the symbol sequence, with an optional `Prosody` once syllabified
// - `Syllable`: a rendered syllable (text + stress), used for serialization
//
// Prosody is a derived view over the symbols, never embedded in them. Any
// change to the symbols either recomputes it (see `syllable::resyllabify`) or
// rebuilds it from the kept syllables (syllable deletion). So syllable
// indices seen by a later rule always describe the current word.
//
// Markup renders syllables joined by `.` with `ˈ`/`ˌ` before primary and
// secondary syllables, e.g. `ˈba.na.na`.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Stress class of a syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stress {
    Unstressed,
    Secondary,
    Primary,
}

impl Stress {
    /// The pattern/markup character for this class: `ˈ`, `ˌ`, or `˘`.
    pub fn marker(self) -> char {
        match self {
            Stress::Primary => 'ˈ',
            Stress::Secondary => 'ˌ',
            Stress::Unstressed => '˘',
        }
    }

    /// Inverse of `marker`.
    pub fn from_marker(ch: char) -> Option<Stress> {
        match ch {
            'ˈ' => Some(Stress::Primary),
            'ˌ' => Some(Stress::Secondary),
            '˘' => Some(Stress::Unstressed),
            _ => None,
        }
    }
}

/// Syllable boundaries and stress of a word.
///
/// Invariants: `starts` is strictly increasing, begins with 0 when
/// non-empty, and has the same length as `stress`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prosody {
    starts: Vec<usize>,
    stress: Vec<Stress>,
}

impl Prosody {
    pub(crate) fn new(starts: Vec<usize>, stress: Vec<Stress>) -> Self {
        debug_assert_eq!(starts.len(), stress.len());
        debug_assert!(starts.first().is_none_or(|&s| s == 0));
        debug_assert!(starts.windows(2).all(|w| w[0] < w[1]));
        Self { starts, stress }
    }

    /// Start offset of each syllable.
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Stress class of each syllable.
    pub fn stress(&self) -> &[Stress] {
        &self.stress
    }

    pub fn syllable_count(&self) -> usize {
        self.starts.len()
    }

    /// Index of the primary-stressed syllable, if any.
    pub fn primary(&self) -> Option<usize> {
        self.stress.iter().position(|&s| s == Stress::Primary)
    }

    pub fn secondary(&self) -> Option<usize> {
        self.stress.iter().position(|&s| s == Stress::Secondary)
    }

    /// Symbol range of syllable `index` in a word of `word_len` symbols.
    pub fn range(&self, index: usize, word_len: usize) -> Range<usize> {
        let start = self.starts[index];
        let end = self.starts.get(index + 1).copied().unwrap_or(word_len);
        start..end
    }

    /// Syllable holding the symbol at `position`.
    pub fn syllable_of(&self, position: usize) -> Option<usize> {
        if self.starts.is_empty() {
            return None;
        }
        Some(self.starts.partition_point(|&s| s <= position) - 1)
    }
}

/// An ordered sequence of symbols, optionally syllabified.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(into = "WordRecord")]
pub struct Word {
    symbols: Vec<char>,
    prosody: Option<Prosody>,
}

impl Word {
    /// A word with no syllable structure.
    pub fn new(symbols: Vec<char>) -> Self {
        Self {
            symbols,
            prosody: None,
        }
    }

    /// A word from its plain text, one symbol per character.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.chars().collect())
    }

    /// A word from markup: `.`, `ˈ`, and `ˌ` are dropped.
    pub fn from_markup(markup: &str) -> Self {
        Self::new(
            markup
                .chars()
                .filter(|&c| c != '.' && c != 'ˈ' && c != 'ˌ')
                .collect(),
        )
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Plain text with no syllable markup.
    pub fn text(&self) -> String {
        self.symbols.iter().collect()
    }

    pub fn prosody(&self) -> Option<&Prosody> {
        self.prosody.as_ref()
    }

    pub fn is_syllabified(&self) -> bool {
        self.prosody.is_some()
    }

    pub(crate) fn with_prosody(symbols: Vec<char>, prosody: Prosody) -> Self {
        Self {
            symbols,
            prosody: Some(prosody),
        }
    }

    /// The same symbols with syllable structure removed.
    pub fn stripped(&self) -> Word {
        Word::new(self.symbols.clone())
    }

    /// Stress class of the syllable holding the symbol at `position`.
    pub fn stress_at(&self, position: usize) -> Option<Stress> {
        if position >= self.symbols.len() {
            return None;
        }
        let prosody = self.prosody.as_ref()?;
        let syllable = prosody.syllable_of(position)?;
        prosody.stress.get(syllable).copied()
    }

    /// Whether `position` (a site between symbols) is a syllable edge: a
    /// syllable start or the end of the word.
    pub fn is_syllable_edge(&self, position: usize) -> bool {
        match &self.prosody {
            Some(p) => position == self.symbols.len() || p.starts.binary_search(&position).is_ok(),
            None => false,
        }
    }

    /// Rendered syllables; empty when the word is not syllabified.
    pub fn syllables(&self) -> Vec<Syllable> {
        let Some(prosody) = &self.prosody else {
            return Vec::new();
        };
        (0..prosody.syllable_count())
            .map(|i| Syllable {
                text: self.symbols[prosody.range(i, self.symbols.len())]
                    .iter()
                    .collect(),
                stress: prosody.stress[i],
            })
            .collect()
    }

    /// Syllable markup (`ˈba.na.na`), or plain text if not syllabified.
    pub fn markup(&self) -> String {
        if self.prosody.is_none() {
            return self.text();
        }
        let mut out = String::new();
        for (i, syllable) in self.syllables().iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            if syllable.stress != Stress::Unstressed {
                out.push(syllable.stress.marker());
            }
            out.push_str(&syllable.text);
        }
        out
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup())
    }
}

/// One rendered syllable of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syllable {
    /// The symbols of this syllable.
    pub text: String,
    /// Stress class of this syllable.
    pub stress: Stress,
}

/// Serialized form of a `Word`.
#[derive(Debug, Clone, Serialize)]
struct WordRecord {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    markup: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    syllables: Vec<Syllable>,
}

impl From<Word> for WordRecord {
    fn from(word: Word) -> Self {
        WordRecord {
            text: word.text(),
            markup: word.prosody.as_ref().map(|_| word.markup()),
            syllables: word.syllables(),
        }
    }
}
