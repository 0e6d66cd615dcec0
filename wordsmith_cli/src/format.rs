// Text rendering of run results.
//
// Three layers, each optional:
// - the word itself, as plain text or syllable markup;
// - `input → output`, with inputs left-aligned so the arrows line up;
// - ` [rule; rule]`, placed after the longest line so the brackets line up.
//
// Widths count characters, not bytes, so stress marks and `→` align.

use wordsmith_lang::{Word, WordResult};

/// Which layers to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub show_input: bool,
    pub show_rules: bool,
    pub syllables: bool,
}

fn render(word: &Word, syllables: bool) -> String {
    if syllables { word.markup() } else { word.text() }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut out = text.to_string();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
    out
}

/// One output line per result.
pub fn format_results(results: &[WordResult], options: FormatOptions) -> Vec<String> {
    let inputs: Vec<String> = results.iter().map(|r| r.input.text()).collect();
    let arrow_column = inputs.iter().map(|s| s.chars().count()).max().unwrap_or(0);

    let lines: Vec<String> = results
        .iter()
        .zip(&inputs)
        .map(|(result, input)| {
            let output = render(&result.output, options.syllables);
            if options.show_input {
                format!("{} → {output}", pad(input, arrow_column))
            } else {
                output
            }
        })
        .collect();

    if !options.show_rules {
        return lines;
    }
    let rule_column = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    lines
        .into_iter()
        .zip(results)
        .map(|(line, result)| {
            if result.applied.is_empty() {
                line
            } else {
                format!("{} [{}]", pad(&line, rule_column), result.applied.join("; "))
            }
        })
        .collect()
}
