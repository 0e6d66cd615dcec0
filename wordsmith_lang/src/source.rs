// Source-text front end: comments, line classification, and blocks.
//
// A language file is a flat list of lines. After comment stripping each line
// is classified, in order:
// 1. block markers `-dict` / `-end-dict` / `-syll` / `-end-syll`,
// 2. lines inside an open block belong to that block,
// 3. a line with a rule separator (`/`, `>`, `→`) is a sound-change rule,
// 4. a line with `:` is a category (the colon must be the second character),
// 5. anything else is a word template.
//
// Classification keeps line numbers so that `Config::from_source` can report
// every fatal error against the line that caused it. Lines are only sorted
// into sections here; compiling them needs the complete category table and
// happens in `config`.
//
// A `#` starts a comment when it opens the line or when it is preceded by
// whitespace and followed by whitespace or end of line. A `#` written against
// rule syntax (`_#`, `/#_`) is a word boundary.

use crate::category::{Category, CategoryTable, is_reserved};
use crate::error::{LangError, SourceError, Warning};
use crate::sound_change::is_rule_line;
use crate::syllable::{StressPattern, SyllableSpec};
use crate::types::Word;

const DICT_START: &str = "-dict";
const DICT_END: &str = "-end-dict";
const SYLL_START: &str = "-syll";
const SYLL_END: &str = "-end-syll";

/// A non-empty, comment-free source line and its 1-based number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

impl SourceLine {
    /// Attach this line to an error.
    pub fn error(&self, kind: LangError) -> SourceError {
        SourceError::new(self.number, &self.text, kind)
    }
}

/// Source lines sorted by what they define, each in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub categories: Vec<SourceLine>,
    pub templates: Vec<SourceLine>,
    pub rules: Vec<SourceLine>,
    pub dictionary: Vec<SourceLine>,
    /// `None` when the file has no `-syll` block.
    pub syllables: Option<Vec<SourceLine>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Dict,
    Syll,
}

impl Block {
    fn start_marker(self) -> &'static str {
        match self {
            Block::Dict => DICT_START,
            Block::Syll => SYLL_START,
        }
    }
}

/// Remove a trailing comment and surrounding whitespace.
pub fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        return "";
    }
    let chars: Vec<(usize, char)> = trimmed.char_indices().collect();
    for (k, &(offset, ch)) in chars.iter().enumerate() {
        if ch != '#' || k == 0 {
            continue;
        }
        let after_space = chars[k - 1].1.is_whitespace();
        let before_space = chars.get(k + 1).is_none_or(|(_, c)| c.is_whitespace());
        if after_space && before_space {
            return trimmed[..offset].trim_end();
        }
    }
    trimmed
}

/// Sort the lines of `text` into sections.
pub fn split_sections(text: &str) -> Result<Sections, SourceError> {
    let mut sections = Sections::default();
    let mut open: Option<(Block, SourceLine)> = None;

    for (index, raw) in text.lines().enumerate() {
        let stripped = strip_comment(raw);
        if stripped.is_empty() {
            continue;
        }
        let line = SourceLine {
            number: index + 1,
            text: stripped.to_string(),
        };

        match (open.as_ref().map(|(b, _)| *b), stripped) {
            (None, DICT_START) => open = Some((Block::Dict, line)),
            (None, SYLL_START) => {
                if sections.syllables.is_none() {
                    sections.syllables = Some(Vec::new());
                }
                open = Some((Block::Syll, line));
            }
            (Some(Block::Dict), DICT_END) | (Some(Block::Syll), SYLL_END) => open = None,
            (Some(block), DICT_START | SYLL_START | DICT_END | SYLL_END) => {
                return Err(line.error(LangError::UnterminatedBlock(block.start_marker())));
            }
            (None, DICT_END | SYLL_END) => {
                return Err(line.error(LangError::malformed(stripped, "block end without a matching start")));
            }
            (Some(Block::Dict), _) => sections.dictionary.push(line),
            (Some(Block::Syll), _) => sections.syllables.get_or_insert_with(Vec::new).push(line),
            (None, _) if is_rule_line(stripped) => sections.rules.push(line),
            (None, _) if stripped.contains(':') => {
                check_colon(stripped).map_err(|e| line.error(e))?;
                sections.categories.push(line);
            }
            (None, _) => sections.templates.push(line),
        }
    }

    if let Some((block, start)) = open {
        return Err(start.error(LangError::UnterminatedBlock(block.start_marker())));
    }
    Ok(sections)
}

/// A category line must have exactly one `:`, as its second character.
fn check_colon(line: &str) -> Result<(), LangError> {
    let colons: Vec<usize> = line
        .chars()
        .enumerate()
        .filter(|(_, c)| *c == ':')
        .map(|(i, _)| i)
        .collect();
    if colons == [1] {
        Ok(())
    } else {
        Err(LangError::InvalidColonPlacement)
    }
}

/// Parse `N: members`.
pub fn parse_category_line(line: &str) -> Result<Category, LangError> {
    check_colon(line)?;
    let mut chars = line.chars();
    let name = chars.next().ok_or(LangError::InvalidColonPlacement)?;
    chars.next();
    Category::parse(name, chars.as_str())
}

/// Parse the words of one dictionary line. Syllable dots and stress marks
/// are dropped; any other reserved character is fatal.
pub fn parse_dictionary_line(line: &str) -> Result<Vec<Word>, LangError> {
    line.split_whitespace()
        .map(|raw| {
            let word = Word::from_markup(raw);
            match word.symbols().iter().find(|c| is_reserved(**c)) {
                Some(&ch) => Err(LangError::ReservedCharacter {
                    ch,
                    context: format!("dictionary word `{raw}`"),
                }),
                None => Ok(word),
            }
        })
        .collect()
}

/// Build a `SyllableSpec` from the lines of a `-syll` block. Stress patterns
/// that do not parse are skipped with a warning.
pub fn parse_syllable_block(
    lines: &[SourceLine],
    categories: &CategoryTable,
    warnings: &mut Vec<Warning>,
) -> Result<SyllableSpec, SourceError> {
    let mut onsets = Vec::new();
    let mut codas = Vec::new();
    let mut stress = Vec::new();

    for line in lines {
        let Some((directive, entries)) = line.text.split_once(':') else {
            return Err(line.error(LangError::UnknownSyllableDirective(line.text.clone())));
        };
        let entries = entries.split_whitespace();
        match directive.trim() {
            "ALLOWED_ONSETS" => {
                for entry in entries {
                    onsets.extend(SyllableSpec::expand_entry(entry, categories).map_err(|e| line.error(e))?);
                }
            }
            "ALLOWED_CODAS" => {
                for entry in entries {
                    codas.extend(SyllableSpec::expand_entry(entry, categories).map_err(|e| line.error(e))?);
                }
            }
            "STRESS_PATTERNS" => {
                for entry in entries {
                    match StressPattern::parse(entry) {
                        Ok(pattern) => stress.push(pattern),
                        Err(_) => Warning::InvalidStressPattern {
                            line: line.number,
                            pattern: entry.to_string(),
                        }
                        .raise(warnings),
                    }
                }
            }
            other => return Err(line.error(LangError::UnknownSyllableDirective(other.to_string()))),
        }
    }
    Ok(SyllableSpec::new(onsets, codas, stress))
}
