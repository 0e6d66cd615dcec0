// Pattern compilation and expansion.
//
// Templates, rule inputs, rule outputs, and environments share one small
// grammar. Source text compiles to a tree of `PatternNode`s: plain `Token`s
// and `Group`s for `( … )`. Groups hold comma-separated branches that are
// themselves node sequences, so groups nest.
//
//   (X)        optional: with or without X
//   (X,Y)      optional alternative: X, Y, or neither
//   (!X,Y)     mandatory alternative: X or Y
//
// `expand` is a pure recursive fold over the tree producing the Cartesian
// product of every group's options. Output order is stable: the "absent"
// option of an optional group comes first, then branches in source order,
// leftmost group varying slowest. Duplicate variants are dropped, keeping
// the first occurrence.
//
// Which tokens are legal depends on where the pattern sits
// (`PatternContext`): `#`, `_`, `[…]`, and bare stress marks belong to
// environments, `²` to rule inputs and outputs, and templates admit only
// symbols, categories, and groups.

use std::collections::BTreeSet;

use crate::category::{CategoryTable, is_reserved};
use crate::error::LangError;
use crate::types::Stress;

/// Where a pattern appears; decides which tokens are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternContext {
    Template,
    Input,
    Output,
    Environment,
}

/// A single, group-free pattern element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    /// A literal symbol.
    Literal(char),
    /// Any member of the named category.
    Category(char),
    /// Any of the listed symbols (`[aeiou]`).
    AdHocSet(Vec<char>),
    /// Word edge (`#`).
    Boundary,
    /// The substitution site (`_`).
    Focus,
    /// A stress assertion (`ˈ`, `ˌ`, `˘`) on the focus syllable.
    StressMark(Stress),
    /// A syllable (`σ`), optionally restricted to one stress class (`ˈσ`).
    Syllable(Option<Stress>),
    /// Gemination (`²`).
    Doubling,
}

impl Token {
    /// Whether this token consumes exactly one word symbol when matched.
    pub fn is_segment(&self) -> bool {
        matches!(
            self,
            Token::Literal(_) | Token::Category(_) | Token::AdHocSet(_) | Token::Doubling
        )
    }

    /// Whether this token refers to syllable or stress structure.
    pub fn is_prosodic(&self) -> bool {
        matches!(self, Token::StressMark(_) | Token::Syllable(_))
    }

    /// Match a single word symbol. Only meaningful for symbol tokens;
    /// `Doubling` needs the preceding symbol and is handled by the caller.
    pub fn matches_symbol(&self, symbol: char, categories: &CategoryTable) -> bool {
        match self {
            Token::Literal(c) => *c == symbol,
            Token::Category(name) => categories.contains(*name, symbol),
            Token::AdHocSet(set) => set.contains(&symbol),
            _ => false,
        }
    }
}

/// A node of the compiled pattern tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternNode {
    Token(Token),
    Group {
        branches: Vec<Vec<PatternNode>>,
        mandatory: bool,
    },
}

/// One concrete alternative of a pattern: a group-free token sequence.
pub type Variant = Vec<Token>;

/// A compiled pattern together with its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    nodes: Vec<PatternNode>,
}

impl Pattern {
    /// Compile `source` for the given context.
    pub fn parse(
        source: &str,
        context: PatternContext,
        categories: &CategoryTable,
    ) -> Result<Self, LangError> {
        let mut parser = Parser {
            chars: source.chars().collect(),
            pos: 0,
            source,
            context,
            categories,
        };
        let nodes = parser.sequence(0)?;
        Ok(Self {
            source: source.to_string(),
            nodes,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every concrete variant this pattern denotes.
    pub fn expand(&self) -> Vec<Variant> {
        expand(&self.nodes)
    }
}

/// Expand a node sequence into all of its concrete variants.
pub fn expand(nodes: &[PatternNode]) -> Vec<Variant> {
    let mut variants: Vec<Variant> = vec![Vec::new()];
    for node in nodes {
        match node {
            PatternNode::Token(token) => {
                for variant in &mut variants {
                    variant.push(token.clone());
                }
            }
            PatternNode::Group {
                branches,
                mandatory,
            } => {
                let mut options: Vec<Variant> = Vec::new();
                if !mandatory {
                    options.push(Vec::new());
                }
                for branch in branches {
                    options.extend(expand(branch));
                }
                variants = variants
                    .iter()
                    .flat_map(|prefix| {
                        options.iter().map(move |option| {
                            let mut v = prefix.clone();
                            v.extend(option.iter().cloned());
                            v
                        })
                    })
                    .collect();
            }
        }
    }
    let mut seen = BTreeSet::new();
    variants.retain(|v| seen.insert(v.clone()));
    variants
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
    context: PatternContext,
    categories: &'a CategoryTable,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn malformed(&self, reason: impl Into<String>) -> LangError {
        LangError::malformed(self.source, reason)
    }

    /// Parse nodes until end of input, or, inside a group, until the `,` or
    /// `)` that ends the current branch.
    fn sequence(&mut self, depth: usize) -> Result<Vec<PatternNode>, LangError> {
        let mut nodes = Vec::new();
        while let Some(ch) = self.peek() {
            match ch {
                c if c.is_whitespace() => self.pos += 1,
                '(' => {
                    self.pos += 1;
                    nodes.push(self.group(depth + 1)?);
                }
                ')' | ',' if depth > 0 => break,
                ')' => return Err(self.malformed("unmatched `)`")),
                ',' => return Err(self.malformed("`,` outside a group")),
                '!' => return Err(self.malformed("`!` must immediately follow `(`")),
                _ => {
                    let token = self.token()?;
                    self.check_allowed(&token)?;
                    nodes.push(PatternNode::Token(token));
                }
            }
        }
        Ok(nodes)
    }

    /// Parse a group body; the opening `(` is already consumed.
    fn group(&mut self, depth: usize) -> Result<PatternNode, LangError> {
        let mandatory = self.peek() == Some('!');
        if mandatory {
            self.pos += 1;
        }
        let mut branches = Vec::new();
        loop {
            let branch = self.sequence(depth)?;
            if branch.is_empty() {
                return Err(self.malformed("empty alternative"));
            }
            branches.push(branch);
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.malformed("unbalanced `(`")),
            }
        }
        Ok(PatternNode::Group {
            branches,
            mandatory,
        })
    }

    fn token(&mut self) -> Result<Token, LangError> {
        let Some(ch) = self.peek() else {
            return Err(self.malformed("unexpected end of pattern"));
        };
        self.pos += 1;
        let token = match ch {
            '[' => self.adhoc_set()?,
            '#' => Token::Boundary,
            '_' => Token::Focus,
            '²' => Token::Doubling,
            'σ' => Token::Syllable(None),
            'ˈ' | 'ˌ' | '˘' => {
                let stress = Stress::from_marker(ch).unwrap_or(Stress::Unstressed);
                if self.peek() == Some('σ') {
                    self.pos += 1;
                    Token::Syllable(Some(stress))
                } else {
                    Token::StressMark(stress)
                }
            }
            c if is_reserved(c) => {
                return Err(LangError::ReservedCharacter {
                    ch: c,
                    context: format!("pattern `{}`", self.source),
                });
            }
            c if self.categories.is_category(c) => Token::Category(c),
            c if c.is_ascii_uppercase() => return Err(LangError::UnknownCategory(c)),
            c => Token::Literal(c),
        };
        Ok(token)
    }

    /// Parse `[…]`; the `[` is already consumed.
    fn adhoc_set(&mut self) -> Result<Token, LangError> {
        let mut set = Vec::new();
        loop {
            match self.peek() {
                None => return Err(self.malformed("unterminated `[`")),
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some(c) if is_reserved(c) => {
                    return Err(self.malformed(format!("`{c}` inside `[…]`")));
                }
                Some(c) => {
                    self.pos += 1;
                    if !set.contains(&c) {
                        set.push(c);
                    }
                }
            }
        }
        if set.is_empty() {
            return Err(self.malformed("empty `[]`"));
        }
        Ok(Token::AdHocSet(set))
    }

    fn check_allowed(&self, token: &Token) -> Result<(), LangError> {
        use PatternContext::*;
        let allowed = match token {
            Token::Literal(_) | Token::Category(_) => true,
            Token::AdHocSet(_) | Token::Boundary | Token::Focus | Token::StressMark(_) => {
                self.context == Environment
            }
            Token::Doubling => matches!(self.context, Input | Output),
            Token::Syllable(_) => self.context != Template,
        };
        if allowed {
            Ok(())
        } else {
            let where_ = match self.context {
                Template => "a template",
                Input => "a rule input",
                Output => "a rule output",
                Environment => "an environment",
            };
            Err(self.malformed(format!("{token:?} is not allowed in {where_}")))
        }
    }
}
