// Syllabification and stress assignment.
//
// A `SyllableSpec` holds the legal onsets and codas (category entries already
// expanded to concrete symbol sequences) and the stress patterns, in
// declaration order.
//
// Boundary placement follows the maximal-onset principle. Every symbol that
// occurs in some onset or coda is a margin symbol; maximal runs of the other
// symbols are nuclei. Then:
// 1. the cluster before the first nucleus must be a legal onset,
// 2. the cluster after the last nucleus must be a legal coda,
// 3. each cluster between two nuclei is split to give the next syllable the
//    longest legal onset whose leftover prefix is a legal (or empty) coda.
// If any step fails, or the word has no nucleus, the word becomes a single
// syllable and a `SyllabificationFallback` warning is raised.
//
// Stress: the first declared pattern that fits the syllable count wins. A
// pattern fits when its primary (and secondary, if any) index names a
// syllable of the word; `-n` counts from the end and fits only when
// n <= count. No fitting pattern leaves the word unstressed with a
// `NoStressPattern` warning. No deterministic choice involves randomness.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::category::{CategoryTable, is_reserved};
use crate::error::{LangError, Warning};
use crate::types::{Prosody, Stress, Word};

/// Primary (and optional secondary) stress position. Positive indices count
/// from the first syllable (`1` is the first), negative ones from the last
/// (`-1` is the last). Zero never occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressPattern {
    pub primary: isize,
    pub secondary: Option<isize>,
}

impl StressPattern {
    /// Parse `N` or `N-M`, where each index is a non-zero integer and may
    /// carry a leading `-` (`-1`, `2--1`). `N-N` keeps only the primary.
    pub fn parse(raw: &str) -> Result<Self, LangError> {
        let invalid = || LangError::InvalidStressPattern(raw.to_string());
        let index = |s: &str| -> Option<isize> {
            let digits = s.strip_prefix('-').unwrap_or(s);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            s.parse::<isize>().ok().filter(|&n| n != 0)
        };
        if let Some(primary) = index(raw) {
            return Ok(Self {
                primary,
                secondary: None,
            });
        }
        // The separator is the first `-` that is not a leading sign.
        let split = raw
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '-')
            .map(|(i, _)| i)
            .ok_or_else(invalid)?;
        let primary = index(&raw[..split]).ok_or_else(invalid)?;
        let secondary = index(&raw[split + 1..]).ok_or_else(invalid)?;
        Ok(Self {
            primary,
            secondary: (secondary != primary).then_some(secondary),
        })
    }

    /// Whether the pattern can be placed on a word of `syllables` syllables.
    pub fn applies_to(&self, syllables: usize) -> bool {
        resolve(self.primary, syllables).is_some()
            && self.secondary.is_none_or(|s| resolve(s, syllables).is_some())
    }
}

/// 0-based syllable for a signed 1-based index, if the word is long enough.
fn resolve(index: isize, syllables: usize) -> Option<usize> {
    let offset = index.unsigned_abs();
    if offset == 0 || offset > syllables {
        None
    } else if index > 0 {
        Some(offset - 1)
    } else {
        Some(syllables - offset)
    }
}

/// Onset/coda legality and stress patterns for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyllableSpec {
    onsets: BTreeSet<Vec<char>>,
    codas: BTreeSet<Vec<char>>,
    stress_patterns: Vec<StressPattern>,
    margins: BTreeSet<char>,
}

impl SyllableSpec {
    pub fn new(
        onsets: impl IntoIterator<Item = Vec<char>>,
        codas: impl IntoIterator<Item = Vec<char>>,
        stress_patterns: Vec<StressPattern>,
    ) -> Self {
        let onsets: BTreeSet<Vec<char>> = onsets.into_iter().filter(|o| !o.is_empty()).collect();
        let codas: BTreeSet<Vec<char>> = codas.into_iter().filter(|c| !c.is_empty()).collect();
        let margins = onsets
            .iter()
            .chain(codas.iter())
            .flat_map(|seq| seq.iter().copied())
            .collect();
        Self {
            onsets,
            codas,
            stress_patterns,
            margins,
        }
    }

    /// Expand one onset/coda entry (e.g. `CL`, `st`, `sC`) into concrete
    /// symbol sequences, taking the Cartesian product over categories in
    /// member order.
    pub fn expand_entry(entry: &str, categories: &CategoryTable) -> Result<Vec<Vec<char>>, LangError> {
        let mut sequences: Vec<Vec<char>> = vec![Vec::new()];
        for ch in entry.chars() {
            if is_reserved(ch) {
                return Err(LangError::ReservedCharacter {
                    ch,
                    context: format!("syllable entry `{entry}`"),
                });
            }
            let options: Vec<char> = match categories.get(ch) {
                Some(category) => category.symbols().collect(),
                None if ch.is_ascii_uppercase() => return Err(LangError::UnknownCategory(ch)),
                None => vec![ch],
            };
            sequences = sequences
                .iter()
                .flat_map(|prefix| {
                    options.iter().map(move |&c| {
                        let mut s = prefix.clone();
                        s.push(c);
                        s
                    })
                })
                .collect();
        }
        Ok(sequences)
    }

    pub fn onsets(&self) -> impl Iterator<Item = &[char]> {
        self.onsets.iter().map(Vec::as_slice)
    }

    pub fn codas(&self) -> impl Iterator<Item = &[char]> {
        self.codas.iter().map(Vec::as_slice)
    }

    pub fn stress_patterns(&self) -> &[StressPattern] {
        &self.stress_patterns
    }

    pub fn is_onset(&self, cluster: &[char]) -> bool {
        self.onsets.contains(cluster)
    }

    pub fn is_coda(&self, cluster: &[char]) -> bool {
        self.codas.contains(cluster)
    }

    /// Syllable start offsets, or `None` if no legal decomposition exists.
    pub fn boundaries(&self, symbols: &[char]) -> Option<Vec<usize>> {
        if symbols.is_empty() {
            return Some(Vec::new());
        }

        let mut nuclei: Vec<(usize, usize)> = Vec::new();
        let mut i = 0;
        while i < symbols.len() {
            if self.margins.contains(&symbols[i]) {
                i += 1;
                continue;
            }
            let start = i;
            while i < symbols.len() && !self.margins.contains(&symbols[i]) {
                i += 1;
            }
            nuclei.push((start, i));
        }

        let (first, last) = (nuclei.first()?, nuclei.last()?);
        let initial = &symbols[..first.0];
        if !initial.is_empty() && !self.is_onset(initial) {
            return None;
        }
        let last_cluster = &symbols[last.1..];
        if !last_cluster.is_empty() && !self.is_coda(last_cluster) {
            return None;
        }

        let mut starts = vec![0];
        for pair in nuclei.windows(2) {
            let (from, to) = (pair[0].1, pair[1].0);
            let cluster = &symbols[from..to];
            // Shortest legal coda first, which leaves the longest onset.
            let coda_len = (0..=cluster.len()).find(|&n| {
                let (coda, onset) = cluster.split_at(n);
                (coda.is_empty() || self.is_coda(coda)) && (onset.is_empty() || self.is_onset(onset))
            })?;
            starts.push(from + coda_len);
        }
        Some(starts)
    }

    /// Stress array for a word of `syllables` syllables, from the first
    /// fitting pattern. `None` when no declared pattern fits.
    pub fn stress_for(&self, syllables: usize) -> Option<Vec<Stress>> {
        let mut stress = vec![Stress::Unstressed; syllables];
        if syllables == 0 {
            return Some(stress);
        }
        let pattern = self.stress_patterns.iter().find(|p| p.applies_to(syllables))?;
        let primary = resolve(pattern.primary, syllables)?;
        stress[primary] = Stress::Primary;
        // `1--1` on one syllable names the same syllable twice.
        if let Some(secondary) = pattern
            .secondary
            .and_then(|s| resolve(s, syllables))
            .filter(|&s| s != primary)
        {
            stress[secondary] = Stress::Secondary;
        }
        Some(stress)
    }
}

/// Partition `word` into syllables and assign stress.
pub fn syllabify(word: &Word, spec: &SyllableSpec, warnings: &mut Vec<Warning>) -> Word {
    let starts = place_boundaries(word, spec, warnings);
    let stress = assign_stress(word, starts.len(), spec, warnings);
    Word::with_prosody(word.symbols().to_vec(), Prosody::new(starts, stress))
}

/// Recompute boundaries after the symbols changed.
///
/// Keeps the existing stress array when the syllable count is unchanged, so
/// stress moved by earlier rules survives. Otherwise stress is reassigned
/// from the patterns.
pub fn resyllabify(word: &Word, spec: &SyllableSpec, warnings: &mut Vec<Warning>) -> Word {
    reflow(
        word.symbols().to_vec(),
        word.prosody().map(Prosody::stress),
        spec,
        warnings,
    )
}

/// Syllabify `symbols`, reusing `previous` stress if the syllable count
/// matches it.
pub(crate) fn reflow(
    symbols: Vec<char>,
    previous: Option<&[Stress]>,
    spec: &SyllableSpec,
    warnings: &mut Vec<Warning>,
) -> Word {
    let word = Word::new(symbols);
    let starts = place_boundaries(&word, spec, warnings);
    let stress = match previous {
        Some(stress) if stress.len() == starts.len() => stress.to_vec(),
        _ => assign_stress(&word, starts.len(), spec, warnings),
    };
    Word::with_prosody(word.symbols().to_vec(), Prosody::new(starts, stress))
}

fn place_boundaries(word: &Word, spec: &SyllableSpec, warnings: &mut Vec<Warning>) -> Vec<usize> {
    match spec.boundaries(word.symbols()) {
        Some(starts) => starts,
        None => {
            Warning::SyllabificationFallback { word: word.text() }.raise(warnings);
            vec![0]
        }
    }
}

fn assign_stress(
    word: &Word,
    syllables: usize,
    spec: &SyllableSpec,
    warnings: &mut Vec<Warning>,
) -> Vec<Stress> {
    match spec.stress_for(syllables) {
        Some(stress) => stress,
        None => {
            if !spec.stress_patterns.is_empty() {
                Warning::NoStressPattern {
                    word: word.text(),
                    syllables,
                }
                .raise(warnings);
            }
            vec![Stress::Unstressed; syllables]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn table() -> CategoryTable {
        let mut t = CategoryTable::new();
        t.insert(Category::parse('C', "ptkbdg").unwrap());
        t.insert(Category::parse('L', "lr").unwrap());
        t.insert(Category::parse('N', "mn").unwrap());
        t.insert(Category::parse('S', "s").unwrap());
        t
    }

    fn spec(onsets: &[&str], codas: &[&str], stress: &[&str]) -> SyllableSpec {
        let t = table();
        let expand = |entries: &[&str]| -> Vec<Vec<char>> {
            entries
                .iter()
                .flat_map(|e| SyllableSpec::expand_entry(e, &t).unwrap())
                .collect()
        };
        SyllableSpec::new(
            expand(onsets),
            expand(codas),
            stress.iter().map(|s| StressPattern::parse(s).unwrap()).collect(),
        )
    }

    fn markup(word: &str, spec: &SyllableSpec) -> (String, Vec<Warning>) {
        let mut warnings = Vec::new();
        let w = syllabify(&Word::from_text(word), spec, &mut warnings);
        (w.markup(), warnings)
    }

    #[test]
    fn test_banana_with_initial_stress() {
        let s = spec(&["C", "L", "N", "S", "CL"], &["N", "S"], &["1"]);
        assert_eq!(markup("banana", &s), ("ˈba.na.na".to_string(), vec![]));
    }

    #[test]
    fn test_maximal_onset_takes_cluster() {
        let s = spec(&["C", "L", "N", "S", "CL"], &["N", "S"], &[]);
        assert_eq!(markup("apla", &s).0, "a.pla");
        // `np` is no onset, so the nasal closes the first syllable.
        assert_eq!(markup("anpa", &s).0, "an.pa");
        assert_eq!(markup("asplan", &s).0, "as.plan");
    }

    #[test]
    fn test_category_entries_expand_in_order() {
        let t = table();
        let seqs = SyllableSpec::expand_entry("CL", &t).unwrap();
        assert_eq!(seqs.len(), 12);
        assert_eq!(seqs[0], vec!['p', 'l']);
        assert_eq!(seqs[1], vec!['p', 'r']);
        assert_eq!(
            SyllableSpec::expand_entry("Q", &t).unwrap_err(),
            LangError::UnknownCategory('Q')
        );
    }

    #[test]
    fn test_illegal_word_falls_back_to_one_syllable() {
        let s = spec(&["C"], &[], &["1"]);
        let (m, warnings) = markup("bant", &s);
        assert_eq!(m, "ˈbant");
        assert_eq!(
            warnings,
            vec![Warning::SyllabificationFallback {
                word: "bant".to_string()
            }]
        );
    }

    #[test]
    fn test_no_nucleus_falls_back() {
        let s = spec(&["C", "S"], &["C"], &[]);
        let (m, warnings) = markup("st", &s);
        assert_eq!(m, "st");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_stress_patterns_first_fit_wins() {
        let s = spec(&["C", "N"], &[], &["3-1", "2", "1"]);
        assert_eq!(markup("banana", &s).0, "ˌba.na.ˈna");
        assert_eq!(markup("bana", &s).0, "ba.ˈna");
        assert_eq!(markup("ba", &s).0, "ˈba");
    }

    #[test]
    fn test_no_fitting_pattern_warns() {
        let s = spec(&["C", "N"], &[], &["2"]);
        let (m, warnings) = markup("ba", &s);
        assert_eq!(m, "ba");
        assert_eq!(
            warnings,
            vec![Warning::NoStressPattern {
                word: "ba".to_string(),
                syllables: 1
            }]
        );
    }

    #[test]
    fn test_no_patterns_means_no_warning() {
        let s = spec(&["C", "N"], &[], &[]);
        assert_eq!(markup("banana", &s), ("ba.na.na".to_string(), vec![]));
    }

    #[test]
    fn test_stress_pattern_parsing() {
        assert_eq!(
            StressPattern::parse("2").unwrap(),
            StressPattern {
                primary: 2,
                secondary: None
            }
        );
        assert_eq!(StressPattern::parse("1-3").unwrap().secondary, Some(3));
        assert_eq!(
            StressPattern::parse("-1").unwrap(),
            StressPattern {
                primary: -1,
                secondary: None
            }
        );
        assert_eq!(
            StressPattern::parse("-2--1").unwrap(),
            StressPattern {
                primary: -2,
                secondary: Some(-1)
            }
        );
        assert_eq!(StressPattern::parse("1-1").unwrap().secondary, None);
        for bad in ["0", "-0", "1-0", "1-", "-", "a", "2-x", "--1", ""] {
            assert!(StressPattern::parse(bad).is_err(), "`{bad}` should fail");
        }
        let p = StressPattern::parse("1-3").unwrap();
        assert!(p.applies_to(3));
        assert!(!p.applies_to(2));
    }

    #[test]
    fn test_negative_stress_counts_from_the_end() {
        let s = spec(&["C", "N"], &["N"], &["-2--1", "-1"]);
        assert_eq!(markup("banana", &s).0, "ba.ˈna.ˌna");
        assert_eq!(markup("ba", &s).0, "ˈba");

        let last = StressPattern::parse("-3").unwrap();
        assert!(last.applies_to(3));
        assert!(!last.applies_to(2));
        assert!(!last.applies_to(0));
    }

    #[test]
    fn test_overlong_pattern_is_skipped_not_fatal() {
        let s = spec(&["C", "N"], &[], &["4", "-5", "2"]);
        assert_eq!(markup("banana", &s), ("ba.ˈna.na".to_string(), vec![]));
    }

    #[test]
    fn test_resyllabify_keeps_stress_when_count_unchanged() {
        let s = spec(&["C", "N"], &["N"], &["1"]);
        let mut warnings = Vec::new();
        let w = syllabify(&Word::from_text("banana"), &s, &mut warnings);
        // Move primary stress by hand, then change a symbol.
        let moved = Word::with_prosody(
            "bamana".chars().collect(),
            Prosody::new(
                w.prosody().unwrap().starts().to_vec(),
                vec![Stress::Unstressed, Stress::Primary, Stress::Unstressed],
            ),
        );
        let again = resyllabify(&moved, &s, &mut warnings);
        assert_eq!(again.markup(), "ba.ˈma.na");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_resyllabify_reassigns_when_count_changes() {
        let s = spec(&["C", "N"], &["N"], &["1"]);
        let shorter = Word::with_prosody(
            "bana".chars().collect(),
            Prosody::new(
                vec![0, 2, 3],
                vec![Stress::Unstressed, Stress::Unstressed, Stress::Primary],
            ),
        );
        let mut warnings = Vec::new();
        assert_eq!(resyllabify(&shorter, &s, &mut warnings).markup(), "ˈba.na");
    }
}
