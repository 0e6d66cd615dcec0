// Sound-change rules: compilation and application.
//
// A rule line `INPUT/OUTPUT/ENVIRONMENT` (separators `/`, `>`, `→`) compiles
// into a `CompiledRule`: every input variant paired with an output variant,
// plus every environment variant split at its `_`. Pairing zips the variant
// lists when their lengths agree and broadcasts a single output variant
// otherwise.
//
// Output category tokens are resolved at compile time to one of:
// - `Copy`: the input has a category of the same name, so the matched symbol
//   passes through unchanged;
// - `Map`: index-aligned mapping from an input category, by declaration order
//   (the input token at the same position if it is a category, else the k-th
//   input category for the k-th output category).
// Mapped categories must have the same unique-symbol count. If not, the rule
// is dropped with a `CategoryCardinalityMismatch` warning.
//
// Application is one left-to-right pass over a snapshot of the word. At each
// site the substitutions are tried in expansion order, each against every
// environment; the first hit writes its output to a fresh buffer and the scan
// resumes after the matched span. Empty-input (insertion) variants are tried
// once per site, so insertion rules always terminate.
//
// Rules whose input is a `σ` token work on whole syllables: they delete or
// restress the syllables they select. Both kinds need a syllabified word when
// they refer to syllables or stress; otherwise the rule is skipped for that
// word with a `ProsodyUnavailable` warning.
//
// A segmental change to a syllabified word re-syllabifies the result, keeping
// the stress array when the syllable count is unchanged.

use crate::category::CategoryTable;
use crate::environment::{Environment, class_matches};
use crate::error::{LangError, Warning};
use crate::pattern::{Pattern, PatternContext, Token, Variant};
use crate::syllable::{SyllableSpec, reflow};
use crate::types::{Prosody, Stress, Word};

/// Characters that split a rule into input, output, and environment.
pub const RULE_SEPARATORS: &[char] = &['/', '>', '→'];

/// Whether `line` is written as a sound-change rule.
pub fn is_rule_line(line: &str) -> bool {
    line.contains(RULE_SEPARATORS)
}

/// Read-only state shared by every rule application.
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext<'a> {
    pub categories: &'a CategoryTable,
    /// Needed to re-syllabify after a segmental change. Without it the
    /// changed word loses its syllable structure.
    pub syllables: Option<&'a SyllableSpec>,
}

/// One output position of a segmental substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutputToken {
    Literal(char),
    /// The symbol matched at input position `from`.
    Copy { from: usize },
    /// The symbol at input position `from`, mapped by index from category
    /// `input` to category `output`.
    Map { from: usize, input: char, output: char },
    /// `²`
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Substitution {
    input: Vec<Token>,
    output: Vec<OutputToken>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyllableResult {
    Delete,
    Restress(Stress),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SyllableChange {
    select: Option<Stress>,
    result: SyllableResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RuleKind {
    Segmental(Vec<Substitution>),
    Syllabic(Vec<SyllableChange>),
}

/// A rule ready to apply to words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    source: String,
    line: usize,
    kind: RuleKind,
    environments: Vec<Environment>,
    prosodic: bool,
}

impl CompiledRule {
    /// Compile one rule line.
    ///
    /// Returns `Ok(None)` when the rule is dropped for a recoverable reason
    /// (a warning is pushed to `warnings`).
    pub fn compile(
        source: &str,
        line: usize,
        categories: &CategoryTable,
        warnings: &mut Vec<Warning>,
    ) -> Result<Option<Self>, LangError> {
        let source = source.trim();
        let parts: Vec<&str> = source.split(RULE_SEPARATORS).map(str::trim).collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(LangError::InvalidRule(source.to_string()));
        }
        let (input_src, output_src) = (parts[0], parts[1]);
        if input_src.is_empty() && output_src.is_empty() {
            return Err(LangError::InvalidRule(source.to_string()));
        }
        let env_src = parts.get(2).copied().filter(|e| !e.is_empty()).unwrap_or("_");

        let inputs = Pattern::parse(input_src, PatternContext::Input, categories)?.expand();
        let outputs = Pattern::parse(output_src, PatternContext::Output, categories)?.expand();
        let environments = Pattern::parse(env_src, PatternContext::Environment, categories)?
            .expand()
            .iter()
            .map(|v| Environment::from_variant(v, env_src))
            .collect::<Result<Vec<_>, _>>()?;

        let pairs: Vec<(&Variant, &Variant)> = if inputs.len() == outputs.len() {
            inputs.iter().zip(outputs.iter()).collect()
        } else if outputs.len() == 1 {
            inputs.iter().map(|i| (i, &outputs[0])).collect()
        } else {
            return Err(LangError::VariantCountMismatch {
                rule: source.to_string(),
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        };

        let syllabic = inputs
            .iter()
            .chain(outputs.iter())
            .flatten()
            .any(|t| matches!(t, Token::Syllable(_)));

        let kind = if syllabic {
            RuleKind::Syllabic(syllable_changes(source, &pairs, &environments)?)
        } else {
            for env in &environments {
                if env.tokens().any(|t| matches!(t, Token::Syllable(Some(_)))) {
                    return Err(LangError::malformed(
                        env_src,
                        "a stressed `σ` is only valid in a syllable rule",
                    ));
                }
            }
            let mut substitutions = Vec::with_capacity(pairs.len());
            for (input, output) in pairs {
                match substitution(source, line, input, output, categories, warnings)? {
                    Some(s) => substitutions.push(s),
                    None => return Ok(None),
                }
            }
            RuleKind::Segmental(substitutions)
        };

        let prosodic = syllabic || environments.iter().any(Environment::needs_prosody);
        Ok(Some(Self {
            source: source.to_string(),
            line,
            kind,
            environments,
            prosodic,
        }))
    }

    /// The rule as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 1-based source line.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// Whether the rule needs a syllabified word.
    pub fn is_prosodic(&self) -> bool {
        self.prosodic
    }

    /// Apply the rule once to `word`. The flag is true when the word changed.
    pub fn apply(&self, word: &Word, ctx: &ApplyContext<'_>, warnings: &mut Vec<Warning>) -> (Word, bool) {
        if self.prosodic && !word.is_syllabified() {
            Warning::ProsodyUnavailable {
                word: word.text(),
                rule: self.source.clone(),
            }
            .raise(warnings);
            return (word.clone(), false);
        }

        let result = match &self.kind {
            RuleKind::Segmental(subs) => self.apply_segmental(subs, word, ctx, warnings),
            RuleKind::Syllabic(changes) => self.apply_syllabic(changes, word),
        };
        match result {
            Some(changed) => {
                tracing::debug!(rule = %self.source, before = %word, after = %changed, "rule applied");
                (changed, true)
            }
            None => (word.clone(), false),
        }
    }

    fn apply_segmental(
        &self,
        subs: &[Substitution],
        word: &Word,
        ctx: &ApplyContext<'_>,
        warnings: &mut Vec<Warning>,
    ) -> Option<Word> {
        let symbols = word.symbols();
        let mut out: Vec<char> = Vec::with_capacity(symbols.len());
        let mut i = 0;
        while i <= symbols.len() {
            let hit = subs.iter().find(|sub| {
                let end = i + sub.input.len();
                input_matches(&sub.input, symbols, i, ctx.categories)
                    && self
                        .environments
                        .iter()
                        .any(|env| env.matches(word, i, end, ctx.categories))
            });
            match hit {
                Some(sub) if !sub.input.is_empty() => {
                    let end = i + sub.input.len();
                    emit(sub, &symbols[i..end], i.checked_sub(1).map(|p| symbols[p]), &mut out, ctx.categories);
                    i = end;
                }
                other => {
                    if let Some(sub) = other {
                        emit(sub, &[], i.checked_sub(1).map(|p| symbols[p]), &mut out, ctx.categories);
                    }
                    if let Some(&s) = symbols.get(i) {
                        out.push(s);
                    }
                    i += 1;
                }
            }
        }

        if out == symbols {
            return None;
        }
        let changed = match (word.prosody(), ctx.syllables) {
            (Some(prosody), Some(spec)) => reflow(out, Some(prosody.stress()), spec, warnings),
            _ => Word::new(out),
        };
        Some(changed)
    }

    fn apply_syllabic(&self, changes: &[SyllableChange], word: &Word) -> Option<Word> {
        let prosody = word.prosody()?;
        let stress = prosody.stress();

        let targets: Vec<Option<SyllableResult>> = (0..stress.len())
            .map(|index| {
                changes
                    .iter()
                    .find(|c| {
                        class_matches(c.select, stress[index])
                            && self.environments.iter().any(|e| e.matches_syllable(stress, index))
                    })
                    .map(|c| c.result)
            })
            .collect();

        let mut new_stress = stress.to_vec();
        for (index, target) in targets.iter().enumerate() {
            if let Some(SyllableResult::Restress(to)) = target {
                new_stress[index] = *to;
            }
        }
        for class in [Stress::Primary, Stress::Secondary] {
            let assigned = targets
                .iter()
                .any(|t| *t == Some(SyllableResult::Restress(class)));
            if !assigned {
                continue;
            }
            for (index, s) in new_stress.iter_mut().enumerate() {
                if *s == class && targets[index] != Some(SyllableResult::Restress(class)) {
                    *s = Stress::Unstressed;
                }
            }
        }

        let mut symbols = Vec::with_capacity(word.len());
        let mut starts = Vec::with_capacity(stress.len());
        let mut kept_stress = Vec::with_capacity(stress.len());
        for index in 0..stress.len() {
            if targets[index] == Some(SyllableResult::Delete) {
                continue;
            }
            starts.push(symbols.len());
            symbols.extend_from_slice(&word.symbols()[prosody.range(index, word.len())]);
            kept_stress.push(new_stress[index]);
        }

        let changed = Word::with_prosody(symbols, Prosody::new(starts, kept_stress));
        (changed != *word).then_some(changed)
    }
}

/// Whether `input` matches the symbols starting at `at`. `²` matches a
/// symbol equal to the one before it.
fn input_matches(input: &[Token], symbols: &[char], at: usize, categories: &CategoryTable) -> bool {
    if at + input.len() > symbols.len() {
        return false;
    }
    input.iter().enumerate().all(|(k, token)| {
        let pos = at + k;
        match token {
            Token::Doubling => pos > 0 && symbols[pos - 1] == symbols[pos],
            t => t.matches_symbol(symbols[pos], categories),
        }
    })
}

/// Write the output of `sub` for the `matched` symbols. `before` is the
/// word symbol preceding the match, used by a leading `²` in insertions.
fn emit(
    sub: &Substitution,
    matched: &[char],
    before: Option<char>,
    out: &mut Vec<char>,
    categories: &CategoryTable,
) {
    let start = out.len();
    for (k, token) in sub.output.iter().enumerate() {
        match *token {
            OutputToken::Literal(c) => out.push(c),
            OutputToken::Copy { from } => out.push(matched[from]),
            OutputToken::Map { from, input, output } => {
                let symbol = matched[from];
                let mapped = categories
                    .get(input)
                    .and_then(|c| c.index_of(symbol))
                    .and_then(|i| categories.get(output)?.symbol_at(i))
                    .unwrap_or(symbol);
                out.push(mapped);
            }
            OutputToken::Double if k == 0 => {
                if matched.is_empty() {
                    out.extend(before);
                } else {
                    out.extend_from_slice(matched);
                    out.extend_from_slice(matched);
                }
            }
            OutputToken::Double => {
                if out.len() > start {
                    let last = out[out.len() - 1];
                    out.push(last);
                }
            }
        }
    }
}

fn substitution(
    rule: &str,
    line: usize,
    input: &[Token],
    output: &[Token],
    categories: &CategoryTable,
    warnings: &mut Vec<Warning>,
) -> Result<Option<Substitution>, LangError> {
    let input_categories: Vec<(usize, char)> = input
        .iter()
        .enumerate()
        .filter_map(|(i, t)| match t {
            Token::Category(c) => Some((i, *c)),
            _ => None,
        })
        .collect();

    let mut resolved = Vec::with_capacity(output.len());
    let mut ordinal = 0;
    for (k, token) in output.iter().enumerate() {
        let out = match token {
            Token::Literal(c) => OutputToken::Literal(*c),
            Token::Doubling => OutputToken::Double,
            Token::Category(name) => {
                let nth = ordinal;
                ordinal += 1;
                if let Some(&(from, _)) = input_categories.iter().find(|(_, c)| c == name) {
                    OutputToken::Copy { from }
                } else {
                    let (from, source) = match input.get(k) {
                        Some(Token::Category(c)) => (k, *c),
                        _ => *input_categories
                            .get(nth)
                            .ok_or_else(|| LangError::UnmappedOutputCategory {
                                rule: rule.to_string(),
                                category: *name,
                            })?,
                    };
                    let (input_len, output_len) =
                        (categories.cardinality(source)?, categories.cardinality(*name)?);
                    if input_len != output_len {
                        Warning::CategoryCardinalityMismatch {
                            line,
                            rule: rule.to_string(),
                            input: source,
                            output: *name,
                            input_len,
                            output_len,
                        }
                        .raise(warnings);
                        return Ok(None);
                    }
                    OutputToken::Map {
                        from,
                        input: source,
                        output: *name,
                    }
                }
            }
            other => {
                return Err(LangError::malformed(
                    rule,
                    format!("{other:?} cannot appear in a rule output"),
                ));
            }
        };
        resolved.push(out);
    }
    Ok(Some(Substitution {
        input: input.to_vec(),
        output: resolved,
    }))
}

fn syllable_changes(
    rule: &str,
    pairs: &[(&Variant, &Variant)],
    environments: &[Environment],
) -> Result<Vec<SyllableChange>, LangError> {
    let mut changes = Vec::with_capacity(pairs.len());
    for (input, output) in pairs {
        let select = match input.as_slice() {
            [Token::Syllable(class)] => *class,
            _ => {
                return Err(LangError::malformed(
                    rule,
                    "a syllable rule's input must be a single `σ`",
                ));
            }
        };
        let result = match output.as_slice() {
            [] => SyllableResult::Delete,
            [Token::Syllable(class)] => SyllableResult::Restress(class.unwrap_or(Stress::Unstressed)),
            _ => {
                return Err(LangError::malformed(
                    rule,
                    "a syllable rule's output must be empty or a single `σ`",
                ));
            }
        };
        changes.push(SyllableChange { select, result });
    }
    for env in environments {
        if env
            .tokens()
            .any(|t| !matches!(t, Token::Boundary | Token::Syllable(_)))
        {
            return Err(LangError::malformed(
                rule,
                "syllable rule environments may only use `#` and `σ`",
            ));
        }
    }
    Ok(changes)
}
