// Word generation from weighted templates.
//
// A template line is a pattern over categories and literals with an optional
// trailing weight: `CV(C){3}`. Each template is expanded once, at load time,
// into its concrete variants. Generating a word then takes three draws:
// a template by weight, one of its variants uniformly, and one member of each
// category token by that category's weights.

use serde::Serialize;
use wordsmith_prng::WordRng;

use crate::category::{CategoryTable, parse_weight};
use crate::error::LangError;
use crate::pattern::{Pattern, PatternContext, Token, Variant};
use crate::sampler::WeightedIndex;
use crate::types::Word;

/// One word-structure template with its weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateRule {
    source: String,
    weight: u32,
    #[serde(skip)]
    variants: Vec<Variant>,
}

impl TemplateRule {
    /// Parse `PATTERN` or `PATTERN{w}`.
    pub fn parse(line: &str, categories: &CategoryTable) -> Result<Self, LangError> {
        let line = line.trim();
        let (pattern, weight) = match line.strip_suffix('}') {
            Some(head) => {
                let open = head.rfind('{').ok_or_else(|| LangError::InvalidWeight {
                    spec: line.to_string(),
                })?;
                let raw = &head[open + 1..];
                let weight = parse_weight(raw).ok_or_else(|| LangError::InvalidWeight {
                    spec: format!("{{{raw}}}"),
                })?;
                (head[..open].trim_end(), weight)
            }
            None => (line, 1),
        };
        let variants = Pattern::parse(pattern, PatternContext::Template, categories)?.expand();
        Ok(Self {
            source: pattern.to_string(),
            weight,
            variants,
        })
    }

    /// The pattern text, without its weight.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }
}

/// All templates of a language, ready for weighted selection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateSet {
    rules: Vec<TemplateRule>,
    #[serde(skip)]
    index: Option<WeightedIndex>,
}

impl TemplateSet {
    pub fn new(rules: Vec<TemplateRule>) -> Self {
        let index = WeightedIndex::new(rules.iter().map(TemplateRule::weight));
        Self { rules, index }
    }

    pub fn rules(&self) -> &[TemplateRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Pick a template by weight.
    pub fn sample(&self, rng: &mut WordRng) -> Result<&TemplateRule, LangError> {
        let index = self.index.as_ref().ok_or(LangError::EmptyTemplates)?;
        Ok(&self.rules[index.sample(rng)])
    }
}

/// Produce one word from `templates`.
pub fn generate(
    templates: &TemplateSet,
    categories: &CategoryTable,
    rng: &mut WordRng,
) -> Result<Word, LangError> {
    let template = templates.sample(rng)?;
    // Expansion always yields at least one variant.
    let variant = &template.variants[rng.range_usize(0, template.variants.len())];
    let mut symbols = Vec::with_capacity(variant.len());
    for token in variant {
        match token {
            Token::Literal(c) => symbols.push(*c),
            Token::Category(name) => symbols.push(categories.resolve(*name)?.sample(rng)),
            other => {
                return Err(LangError::malformed(
                    &template.source,
                    format!("{other:?} cannot be generated"),
                ));
            }
        }
    }
    Ok(Word::new(symbols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn table() -> CategoryTable {
        let mut t = CategoryTable::new();
        t.insert(Category::parse('C', "ptk").unwrap());
        t.insert(Category::parse('V', "a{3} i").unwrap());
        t
    }

    fn set(lines: &[&str]) -> TemplateSet {
        let t = table();
        TemplateSet::new(
            lines
                .iter()
                .map(|l| TemplateRule::parse(l, &t).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_template_weight_parsing() {
        let t = table();
        let rule = TemplateRule::parse("CV(C){4}", &t).unwrap();
        assert_eq!(rule.weight(), 4);
        assert_eq!(rule.source(), "CV(C)");
        assert_eq!(rule.variants().len(), 2);
        assert_eq!(TemplateRule::parse("CV", &t).unwrap().weight(), 1);
        for bad in ["CV{0}", "CV{x}", "CV}", "CV{-2}"] {
            assert!(
                matches!(TemplateRule::parse(bad, &t), Err(LangError::InvalidWeight { .. })),
                "`{bad}` should fail"
            );
        }
    }

    #[test]
    fn test_generated_words_follow_template_shape() {
        let templates = set(&["CV(C)"]);
        let t = table();
        let mut rng = WordRng::new(5);
        for _ in 0..500 {
            let w = generate(&templates, &t, &mut rng).unwrap();
            let s = w.symbols();
            assert!((2..=3).contains(&s.len()));
            assert!(t.contains('C', s[0]));
            assert!(t.contains('V', s[1]));
            if s.len() == 3 {
                assert!(t.contains('C', s[2]));
            }
        }
    }

    #[test]
    fn test_literals_pass_through() {
        let templates = set(&["sVn"]);
        let w = generate(&templates, &table(), &mut WordRng::new(1)).unwrap();
        assert_eq!(w.symbols()[0], 's');
        assert_eq!(w.symbols()[2], 'n');
    }

    #[test]
    fn test_template_weights_bias_selection() {
        let templates = set(&["C{9}", "CVCV"]);
        let t = table();
        let mut rng = WordRng::new(99);
        let n = 20_000;
        let short = (0..n)
            .filter(|_| generate(&templates, &t, &mut rng).unwrap().len() == 1)
            .count();
        let share = short as f64 / n as f64;
        assert!((0.87..0.93).contains(&share), "got {share:.3}");
    }

    #[test]
    fn test_same_seed_same_words() {
        let templates = set(&["CV(C)(V)"]);
        let t = table();
        let draw = |seed| {
            let mut rng = WordRng::new(seed);
            (0..20)
                .map(|_| generate(&templates, &t, &mut rng).unwrap().text())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(3), draw(3));
        assert_ne!(draw(3), draw(4));
    }

    #[test]
    fn test_no_templates_is_an_error() {
        let err = generate(&TemplateSet::default(), &table(), &mut WordRng::new(0)).unwrap_err();
        assert_eq!(err, LangError::EmptyTemplates);
    }
}
