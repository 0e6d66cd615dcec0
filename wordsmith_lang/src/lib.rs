// wordsmith_lang: rule engine for invented-language word forms.
//
// Turns a language file (categories, word templates, sound-change rules, an
// optional syllable spec, and an optional word list) into a compiled `Config`,
// then either generates new words from the templates or rewrites existing
// words by applying the rules in file order. No I/O happens here; the
// `wordsmith` binary in `wordsmith_cli` handles files, flags, and formatting.
//
// Module overview, leaves first:
// - `error.rs`:        `LangError` (fatal), `SourceError` (fatal + line), `Warning` (recoverable).
// - `sampler.rs`:      `WeightedIndex`, O(log n) weighted draws over cumulative weights.
// - `category.rs`:     `Category` / `CategoryTable`, weighted symbol sets and reserved characters.
// - `types.rs`:        `Word`, `Prosody`, `Stress`, `Syllable`.
// - `pattern.rs`:      Pattern grammar, compiled node tree, and variant expansion.
// - `environment.rs`:  Left/right context matching at symbol and syllable level.
// - `syllable.rs`:     `SyllableSpec`, maximal-onset syllabification, stress assignment.
// - `sound_change.rs`: `CompiledRule`, rule compilation and the single-pass applier.
// - `generator.rs`:    `TemplateRule` / `TemplateSet` and word generation.
// - `source.rs`:       Comment stripping, line classification, `-dict` / `-syll` blocks.
// - `config.rs`:       `Config::from_source` and `RunOptions`.
// - `pipeline.rs`:     `Engine`: per-word driver, parallel dictionary and generation runs.
//
// Determinism constraint: all randomness comes from a `wordsmith_prng::WordRng`
// passed in explicitly. Collections that are iterated use `BTreeMap` /
// `BTreeSet`. The same seed and source always produce the same words.

pub mod category;
pub mod config;
pub mod environment;
pub mod error;
pub mod generator;
pub mod pattern;
pub mod pipeline;
pub mod sampler;
pub mod sound_change;
pub mod source;
pub mod syllable;
pub mod types;

// Re-export the types callers work with at the crate root.
pub use category::{Category, CategoryTable};
pub use config::{Config, RunOptions};
pub use error::{LangError, SourceError, Warning};
pub use generator::{TemplateRule, TemplateSet, generate};
pub use pipeline::{Engine, RunReport, WordResult};
pub use sound_change::{ApplyContext, CompiledRule};
pub use syllable::{StressPattern, SyllableSpec, resyllabify, syllabify};
pub use types::{Prosody, Stress, Syllable, Word};
pub use wordsmith_prng::WordRng;
