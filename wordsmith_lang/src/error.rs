// Error and warning types for the word engine.
//
// Two severities, mirroring how the engine treats bad input:
// - `LangError` is fatal. It aborts config compilation before any word is
//   produced. `SourceError` wraps it with the offending source line so the
//   caller can report "line N: ..." without re-scanning the file.
// - `Warning` is recoverable. Rules dropped for a category size mismatch,
//   words that fall back to a single syllable, words with no usable stress
//   pattern, and prosodic rules run on unsyllabified words all produce a
//   `Warning` value that travels with the run results. Each warning is also
//   logged through `tracing::warn!` where it is raised.

use serde::Serialize;

/// A fatal problem in a category, template, rule, or syllable definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LangError {
    /// Unbalanced parentheses, empty alternatives, a misplaced `!`, or a
    /// token that is not allowed where it appears.
    #[error("malformed pattern `{pattern}`: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// A pattern refers to a category name that was never defined.
    #[error("unknown category `{0}`")]
    UnknownCategory(char),

    /// A `{n}` weight that is zero, negative, non-integer, or unterminated.
    #[error("invalid weight specification `{spec}`")]
    InvalidWeight { spec: String },

    /// A category name, category member, or dictionary word uses a
    /// character reserved for rule syntax.
    #[error("reserved character `{ch}` in {context}")]
    ReservedCharacter { ch: char, context: String },

    /// A `:` anywhere other than the second character of a category line.
    #[error("colon must appear once, as the second character of a category definition")]
    InvalidColonPlacement,

    /// A category line with no members.
    #[error("category `{0}` has no members")]
    EmptyCategory(char),

    /// An environment variant without exactly one `_`.
    #[error("environment `{0}` must contain exactly one `_`")]
    MissingFocus(String),

    /// A `-dict` or `-syll` block that never closes.
    #[error("unterminated `{0}` block")]
    UnterminatedBlock(&'static str),

    /// A stress pattern other than `N` or `N-M` with non-zero integers.
    #[error("invalid stress pattern `{0}`")]
    InvalidStressPattern(String),

    /// A line inside `-syll` that is not a known directive.
    #[error("unknown syllable directive `{0}`")]
    UnknownSyllableDirective(String),

    /// A rule line that does not split into input/output(/environment).
    #[error("invalid rule `{0}`")]
    InvalidRule(String),

    /// Input and output expand to variant counts that cannot be paired.
    #[error("rule `{rule}`: {inputs} input variant(s) cannot pair with {outputs} output variant(s)")]
    VariantCountMismatch {
        rule: String,
        inputs: usize,
        outputs: usize,
    },

    /// An output category with no input category to map from.
    #[error("rule `{rule}`: output category `{category}` has no input category to map from")]
    UnmappedOutputCategory { rule: String, category: char },

    /// Word generation was requested but the source defines no templates.
    #[error("no word structure templates defined")]
    EmptyTemplates,
}

impl LangError {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        LangError::MalformedPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// A `LangError` located at a line of the source text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind} (in `{text}`)")]
pub struct SourceError {
    /// 1-based line number in the source text.
    pub line: usize,
    /// The line as written, comments removed.
    pub text: String,
    #[source]
    pub kind: LangError,
}

impl SourceError {
    pub(crate) fn new(line: usize, text: &str, kind: LangError) -> Self {
        Self {
            line,
            text: text.to_string(),
            kind,
        }
    }
}

/// A recoverable problem: the run continues and the warning is reported
/// alongside the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A category-to-category rule whose categories differ in unique symbol
    /// count. The rule is removed from the active set.
    #[error(
        "line {line}: categories {input} and {output} have different sizes ({input_len} vs {output_len}); rule `{rule}` ignored"
    )]
    CategoryCardinalityMismatch {
        line: usize,
        rule: String,
        input: char,
        output: char,
        input_len: usize,
        output_len: usize,
    },

    /// No configured stress pattern fits the word's syllable count.
    #[error("no stress pattern fits {syllables} syllable(s) of `{word}`; left unstressed")]
    NoStressPattern { word: String, syllables: usize },

    /// A `STRESS_PATTERNS` entry that does not parse. The entry is skipped
    /// and the remaining patterns keep their order.
    #[error("line {line}: invalid stress pattern `{pattern}`; skipped")]
    InvalidStressPattern { line: usize, pattern: String },

    /// The onset/coda sets admit no decomposition of the word.
    #[error("no legal syllabification for `{word}`; treated as a single syllable")]
    SyllabificationFallback { word: String },

    /// A syllable- or stress-sensitive rule met a word without syllables.
    #[error("rule `{rule}` needs syllables but `{word}` is not syllabified; skipped")]
    ProsodyUnavailable { word: String, rule: String },
}

impl Warning {
    /// Log the warning and append it to `sink`.
    pub(crate) fn raise(self, sink: &mut Vec<Warning>) {
        tracing::warn!("{self}");
        sink.push(self);
    }
}
