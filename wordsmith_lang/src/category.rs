// Phoneme categories: named, weighted, ordered symbol sets.
//
// A category line reads `V: a{3} e i o{2} u`. The name is a single character,
// members are single-character symbols, and `{n}` gives a positive integer
// weight (default 1). Member order is fixed at construction and never
// re-sorted: category-to-category sound changes map symbols by their index in
// this order, and weights never enter into that mapping. Weights matter only
// when a category is sampled during word generation.
//
// `RESERVED` lists the characters that carry meaning in rule syntax. They may
// not appear in category names, category members, or dictionary words.
//
// The table is built once from source and is read-only afterwards, so it can
// be shared freely across worker threads.

use std::collections::BTreeMap;

use serde::Serialize;
use wordsmith_prng::WordRng;

use crate::error::LangError;
use crate::sampler::WeightedIndex;

/// Characters with syntactic meaning in templates, rules, and environments.
pub const RESERVED: &[char] = &[
    'ˈ', 'ˌ', '˘', 'σ', '!', '[', ']', '(', ')', '²', '-', '→', '/', '>', '#', ':', '_', '{', '}',
];

/// Whether `ch` is one of the `RESERVED` syntax characters.
pub fn is_reserved(ch: char) -> bool {
    RESERVED.contains(&ch)
}

/// A named set of unique symbols, each with a positive weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    name: char,
    members: Vec<(char, u32)>,
    #[serde(skip)]
    index: WeightedIndex,
}

impl Category {
    /// Build a category from `(symbol, weight)` pairs in declaration order.
    ///
    /// A symbol declared twice keeps its first position and accumulates the
    /// weights, so members stay unique.
    pub fn new(name: char, entries: impl IntoIterator<Item = (char, u32)>) -> Result<Self, LangError> {
        if is_reserved(name) || name.is_whitespace() {
            return Err(LangError::ReservedCharacter {
                ch: name,
                context: "category name".to_string(),
            });
        }
        let mut members: Vec<(char, u32)> = Vec::new();
        for (symbol, weight) in entries {
            if is_reserved(symbol) {
                return Err(LangError::ReservedCharacter {
                    ch: symbol,
                    context: format!("category `{name}`"),
                });
            }
            if weight == 0 {
                return Err(LangError::InvalidWeight {
                    spec: format!("{symbol}{{0}}"),
                });
            }
            match members.iter_mut().find(|(s, _)| *s == symbol) {
                Some((_, w)) => *w = w.saturating_add(weight),
                None => members.push((symbol, weight)),
            }
        }
        let index = WeightedIndex::new(members.iter().map(|(_, w)| *w))
            .ok_or(LangError::EmptyCategory(name))?;
        Ok(Self {
            name,
            members,
            index,
        })
    }

    /// Parse the member list of a category line (the text after `:`).
    pub fn parse(name: char, body: &str) -> Result<Self, LangError> {
        let mut entries = Vec::new();
        let mut chars = body.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch.is_whitespace() {
                continue;
            }
            if ch == '{' {
                let raw: String = chars.by_ref().take_while(|&c| c != '}').collect();
                return Err(LangError::InvalidWeight {
                    spec: format!("{{{raw}}}"),
                });
            }
            let weight = if chars.peek() == Some(&'{') {
                chars.next();
                let mut raw = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    raw.push(c);
                }
                if !closed {
                    return Err(LangError::InvalidWeight {
                        spec: format!("{ch}{{{raw}"),
                    });
                }
                parse_weight(&raw).ok_or_else(|| LangError::InvalidWeight {
                    spec: format!("{ch}{{{raw}}}"),
                })?
            } else {
                1
            };
            entries.push((ch, weight));
        }
        Self::new(name, entries)
    }

    pub fn name(&self) -> char {
        self.name
    }

    /// Members with their weights, in declaration order.
    pub fn members(&self) -> &[(char, u32)] {
        &self.members
    }

    /// Member symbols in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.members.iter().map(|(s, _)| *s)
    }

    /// Number of unique symbols. Weights do not count.
    pub fn cardinality(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.members.iter().any(|(s, _)| *s == symbol)
    }

    /// Position of `symbol` in declaration order.
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.members.iter().position(|(s, _)| *s == symbol)
    }

    pub fn symbol_at(&self, index: usize) -> Option<char> {
        self.members.get(index).map(|(s, _)| *s)
    }

    pub fn total_weight(&self) -> u64 {
        self.index.total()
    }

    /// Draw a member with probability proportional to its weight.
    pub fn sample(&self, rng: &mut WordRng) -> char {
        self.members[self.index.sample(rng)].0
    }
}

/// Parse a `{n}` weight body: ASCII digits only, value at least 1.
pub(crate) fn parse_weight(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().filter(|&w| w > 0)
}

/// All categories of a language, keyed by name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryTable {
    categories: BTreeMap<char, Category>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category, replacing any earlier definition with the same name.
    pub fn insert(&mut self, category: Category) {
        self.categories.insert(category.name, category);
    }

    pub fn get(&self, name: char) -> Option<&Category> {
        self.categories.get(&name)
    }

    /// Look up a category, failing if it was never defined.
    pub fn resolve(&self, name: char) -> Result<&Category, LangError> {
        self.get(name).ok_or(LangError::UnknownCategory(name))
    }

    pub fn is_category(&self, name: char) -> bool {
        self.categories.contains_key(&name)
    }

    /// Unique symbol count of a category.
    pub fn cardinality(&self, name: char) -> Result<usize, LangError> {
        self.resolve(name).map(Category::cardinality)
    }

    /// Membership test; unknown categories contain nothing.
    pub fn contains(&self, name: char, symbol: char) -> bool {
        self.get(name).is_some_and(|c| c.contains(symbol))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }
}
