// Pipeline driver: runs every word through the rule set.
//
// `Engine` pairs a compiled `Config` with `RunOptions`. Each word goes through
// the same steps, whether it came from the dictionary or from the generator:
// strip any markup, syllabify (when enabled and the language has a `-syll`
// block), apply every rule in file order, and record the source text of each
// rule that changed the word.
//
// Words are independent, so both entry points fan out over rayon's pool.
// Generation derives one PRNG stream per word index from the seed, which keeps
// the output identical for a given seed no matter how the work is split
// across threads. Results always come back in input order.

use rayon::prelude::*;
use serde::Serialize;
use wordsmith_prng::WordRng;

use crate::config::{Config, RunOptions};
use crate::error::{LangError, Warning};
use crate::generator::generate;
use crate::sound_change::ApplyContext;
use crate::syllable::syllabify;
use crate::types::Word;

/// The outcome of running one word through the rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordResult {
    /// The word as it entered the pipeline, without markup.
    pub input: Word,
    /// The word after every rule, syllabified if syllabification ran.
    pub output: Word,
    /// Source text of each rule that changed the word, in application order.
    pub applied: Vec<String>,
    /// Warnings raised while processing this word.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Results for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub results: Vec<WordResult>,
    /// Compile-time warnings followed by every per-word warning.
    pub warnings: Vec<Warning>,
}

/// A compiled language plus the switches for one run.
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
    options: RunOptions,
}

impl Engine {
    pub fn new(config: Config, options: RunOptions) -> Self {
        Self { config, options }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    fn context(&self) -> ApplyContext<'_> {
        ApplyContext {
            categories: self.config.categories(),
            syllables: self.config.syllables(),
        }
    }

    /// Run one word through the rule set.
    pub fn process_word(&self, word: &Word) -> WordResult {
        let input = word.stripped();
        let mut warnings = Vec::new();
        let mut current = match self.config.syllables() {
            Some(spec) if self.options.syllabify => syllabify(&input, spec, &mut warnings),
            _ => input.clone(),
        };

        let ctx = self.context();
        let mut applied = Vec::new();
        for rule in self.config.rules() {
            let (next, changed) = rule.apply(&current, &ctx, &mut warnings);
            if changed {
                applied.push(rule.source().to_string());
            }
            current = next;
        }

        WordResult {
            input,
            output: current,
            applied,
            warnings,
        }
    }

    /// Run every word of `words` through the rules, in parallel.
    pub fn process_dictionary(&self, words: &[Word]) -> RunReport {
        let results: Vec<WordResult> = words.par_iter().map(|w| self.process_word(w)).collect();
        self.report(results)
    }

    /// Process the config's own `-dict` words.
    pub fn run_dictionary(&self) -> RunReport {
        self.process_dictionary(self.config.dictionary())
    }

    /// Generate `count` words from the templates. Word `i` uses PRNG stream
    /// `i` of `seed`.
    pub fn generate_words(&self, count: usize, seed: u64) -> Result<Vec<Word>, LangError> {
        if self.config.templates().is_empty() {
            return Err(LangError::EmptyTemplates);
        }
        (0..count)
            .into_par_iter()
            .map(|i| {
                let mut rng = WordRng::for_stream(seed, i as u64);
                generate(self.config.templates(), self.config.categories(), &mut rng)
            })
            .collect()
    }

    /// Generate `count` words with the run's seed and run them through the
    /// rules. An unset seed is 0.
    pub fn run_generated(&self, count: usize) -> Result<RunReport, LangError> {
        let seed = self.options.seed.unwrap_or_default();
        tracing::info!(seed, count, "generating words");
        let words = self.generate_words(count, seed)?;
        Ok(self.process_dictionary(&words))
    }

    fn report(&self, results: Vec<WordResult>) -> RunReport {
        let warnings = self
            .config
            .warnings()
            .iter()
            .cloned()
            .chain(results.iter().flat_map(|r| r.warnings.iter().cloned()))
            .collect();
        RunReport { results, warnings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
C: ptkbdgmn
V: aeiou
P: ptk
B: bdg
CV(C)
CVCV{2}
P/B/V_V
k//_#
-syll
ALLOWED_ONSETS: C
ALLOWED_CODAS: C
STRESS_PATTERNS: 1
-end-syll
";

    fn engine(syllabify: bool) -> Engine {
        Engine::new(
            Config::from_source(SOURCE).unwrap(),
            RunOptions {
                syllabify,
                seed: None,
            },
        )
    }

    #[test]
    fn process_word_records_applied_rules() {
        let result = engine(false).process_word(&Word::from_text("apak"));
        assert_eq!(result.output.text(), "aba");
        assert_eq!(result.applied, vec!["P/B/V_V", "k//_#"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unchanged_word_has_empty_trace() {
        let result = engine(false).process_word(&Word::from_text("mana"));
        assert_eq!(result.output.text(), "mana");
        assert!(result.applied.is_empty());
    }

    #[test]
    fn syllabified_output_carries_markup() {
        let result = engine(true).process_word(&Word::from_markup("ba.na.na"));
        assert_eq!(result.input.text(), "banana");
        assert_eq!(result.output.markup(), "ˈba.na.na");
    }

    #[test]
    fn dictionary_results_keep_input_order() {
        let words: Vec<Word> = ["tak", "apa", "mana", "kak"].iter().map(|w| Word::from_text(w)).collect();
        let report = engine(false).process_dictionary(&words);
        let outputs: Vec<String> = report.results.iter().map(|r| r.output.text()).collect();
        assert_eq!(outputs, vec!["ta", "aba", "mana", "ka"]);
    }

    #[test]
    fn generation_is_reproducible_per_seed() {
        let e = engine(false);
        let a = e.generate_words(200, 7).unwrap();
        let b = e.generate_words(200, 7).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, e.generate_words(200, 8).unwrap());
        assert!(a.iter().all(|w| (2..=4).contains(&w.len())));
    }

    #[test]
    fn generation_prefix_is_stable_across_counts() {
        let e = engine(false);
        let short = e.generate_words(10, 3).unwrap();
        let long = e.generate_words(100, 3).unwrap();
        assert_eq!(short[..], long[..10]);
    }

    #[test]
    fn run_generated_uses_the_option_seed() {
        let seeded = |seed| {
            let options = RunOptions {
                syllabify: false,
                seed,
            };
            Engine::new(Config::from_source(SOURCE).unwrap(), options)
        };
        let report = seeded(Some(7)).run_generated(20).unwrap();
        let inputs: Vec<Word> = report.results.into_iter().map(|r| r.input).collect();
        assert_eq!(inputs, seeded(Some(7)).generate_words(20, 7).unwrap());

        let unseeded = seeded(None).run_generated(5).unwrap();
        let inputs: Vec<Word> = unseeded.results.into_iter().map(|r| r.input).collect();
        assert_eq!(inputs, seeded(None).generate_words(5, 0).unwrap());
    }

    #[test]
    fn generation_without_templates_fails() {
        let config = Config::from_source("C: p\n").unwrap();
        let e = Engine::new(config, RunOptions::default());
        assert_eq!(e.generate_words(3, 1).unwrap_err(), LangError::EmptyTemplates);
    }

    #[test]
    fn report_collects_compile_and_word_warnings() {
        let config = Config::from_source("P: ptk\nF: fs\nP/F/_\na/e/ˈ_\n").unwrap();
        let e = Engine::new(config, RunOptions::default());
        let report = e.process_dictionary(&[Word::from_text("ta")]);
        assert_eq!(report.warnings.len(), 2);
        assert!(matches!(report.warnings[0], Warning::CategoryCardinalityMismatch { .. }));
        assert!(matches!(report.warnings[1], Warning::ProsodyUnavailable { .. }));
    }

    #[test]
    fn report_serializes() {
        let report = engine(true).process_dictionary(&[Word::from_text("apak")]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["input"]["text"], "apak");
        assert_eq!(json["results"][0]["applied"][1], "k//_#");
    }
}
