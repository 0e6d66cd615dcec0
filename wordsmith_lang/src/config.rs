// Compiled language configuration and run options.
//
// `Config` is everything a language file defines, compiled and validated:
// the category table, templates, sound-change rules in file order, the
// optional syllable spec, and the dictionary words. It is built once by
// `Config::from_source` and is read-only afterwards, so one `Config` can back
// any number of parallel word pipelines.
//
// Compilation order matters only in one direction: categories are compiled
// first from every category line in the file, so templates, rules, and
// syllable entries may reference categories defined later in the file. A
// category defined twice keeps its last definition.
//
// `RunOptions` holds the per-run switches. All fields have defaults, so a
// partial JSON object (or `{}`) is valid.

use serde::{Deserialize, Serialize};

use crate::category::CategoryTable;
use crate::error::{SourceError, Warning};
use crate::generator::{TemplateRule, TemplateSet};
use crate::source::{self, Sections};
use crate::sound_change::CompiledRule;
use crate::syllable::SyllableSpec;
use crate::types::Word;

/// A validated, compiled language definition.
#[derive(Debug, Clone, Default)]
pub struct Config {
    categories: CategoryTable,
    templates: TemplateSet,
    rules: Vec<CompiledRule>,
    syllables: Option<SyllableSpec>,
    dictionary: Vec<Word>,
    warnings: Vec<Warning>,
}

impl Config {
    /// Parse and compile a language file. The first fatal problem is
    /// returned with its line; recoverable ones are kept in `warnings()`.
    pub fn from_source(text: &str) -> Result<Self, SourceError> {
        let Sections {
            categories: category_lines,
            templates: template_lines,
            rules: rule_lines,
            dictionary: dictionary_lines,
            syllables: syllable_lines,
        } = source::split_sections(text)?;

        let mut categories = CategoryTable::new();
        for line in &category_lines {
            let category = source::parse_category_line(&line.text).map_err(|e| line.error(e))?;
            categories.insert(category);
        }

        let templates = template_lines
            .iter()
            .map(|line| TemplateRule::parse(&line.text, &categories).map_err(|e| line.error(e)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut warnings = Vec::new();
        let mut rules = Vec::with_capacity(rule_lines.len());
        for line in &rule_lines {
            let compiled = CompiledRule::compile(&line.text, line.number, &categories, &mut warnings)
                .map_err(|e| line.error(e))?;
            rules.extend(compiled);
        }

        let syllables = syllable_lines
            .map(|lines| source::parse_syllable_block(&lines, &categories, &mut warnings))
            .transpose()?;

        let mut dictionary = Vec::new();
        for line in &dictionary_lines {
            dictionary.extend(source::parse_dictionary_line(&line.text).map_err(|e| line.error(e))?);
        }

        tracing::info!(
            categories = categories.len(),
            templates = templates.len(),
            rules = rules.len(),
            dictionary = dictionary.len(),
            syllables = syllables.is_some(),
            "language compiled"
        );

        Ok(Self {
            categories,
            templates: TemplateSet::new(templates),
            rules,
            syllables,
            dictionary,
            warnings,
        })
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Active rules in file order. Rules dropped at compile time are absent.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn syllables(&self) -> Option<&SyllableSpec> {
        self.syllables.as_ref()
    }

    /// Words from the `-dict` block, markup removed.
    pub fn dictionary(&self) -> &[Word] {
        &self.dictionary
    }

    /// Warnings raised while compiling.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// Per-run switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Syllabify words (and assign stress) before applying rules. Has no
    /// effect when the language defines no `-syll` block.
    pub syllabify: bool,
    /// Seed for `Engine::run_generated`. `None` means seed 0.
    pub seed: Option<u64>,
}

impl RunOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
