use serde::{Deserialize, Serialize};

/// A grammar as the table compiler sees it.
///
/// Rules keep their definition order and the first one is the start rule.
/// Every list besides `rules` may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    pub name: String,
    pub rules: Vec<(String, Rule)>,
    /// Skipped between any two tokens, e.g. whitespace and comments.
    #[serde(default)]
    pub extras: Vec<Rule>,
    /// Each inner list orders named levels and symbols, strongest first.
    #[serde(default)]
    pub precedences: Vec<Vec<PrecedenceEntry>>,
    /// Rule sets allowed to conflict; the parser forks on their cells.
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
    /// Terminals supplied by an [external scanner](https://tree-sitter.github.io/tree-sitter/creating-parsers/4-external-scanners.html).
    #[serde(default)]
    pub externals: Vec<Rule>,
    #[serde(default)]
    pub inline: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Identifier-like terminal that keywords are carved out of.
    #[serde(default)]
    pub word: Option<String>,
    /// Named reserved-word sets; the first is in force everywhere.
    #[serde(default)]
    pub reserved: Vec<(String, Vec<Rule>)>,
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            extras: Vec::new(),
            precedences: Vec::new(),
            conflicts: Vec::new(),
            externals: Vec::new(),
            inline: Vec::new(),
            supertypes: Vec::new(),
            word: None,
            reserved: Vec::new(),
        }
    }

    pub fn start_rule(&self) -> Option<&str> {
        self.rules.first().map(|(name, _)| name.as_str())
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rule)| rule)
    }
}

/// Rule expression, one variant per `grammar.json` node type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    Blank,
    String(String),
    Pattern {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    Symbol(String),
    Seq(Vec<Rule>),
    Choice(Vec<Rule>),
    Repeat(Box<Rule>),
    Repeat1(Box<Rule>),
    Field { name: String, content: Box<Rule> },
    /// Renames the node `content` produces; `named` decides its visibility.
    Alias {
        content: Box<Rule>,
        value: String,
        named: bool,
    },
    /// Lexes `content` as one terminal.
    Token(Box<Rule>),
    /// Like `Token`, but only directly after the previous token.
    ImmediateToken(Box<Rule>),
    Prec {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecLeft {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecRight {
        value: Precedence,
        content: Box<Rule>,
    },
    /// Biases the choice between ambiguous parses at runtime.
    PrecDynamic { value: i32, content: Box<Rule> },
    Reserved {
        context_name: String,
        content: Box<Rule>,
    },
}

impl Rule {
    /// The `type` tag this rule has in `grammar.json`.
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Blank => "BLANK",
            Rule::String(_) => "STRING",
            Rule::Pattern { .. } => "PATTERN",
            Rule::Symbol(_) => "SYMBOL",
            Rule::Seq(_) => "SEQ",
            Rule::Choice(_) => "CHOICE",
            Rule::Repeat(_) => "REPEAT",
            Rule::Repeat1(_) => "REPEAT1",
            Rule::Field { .. } => "FIELD",
            Rule::Alias { .. } => "ALIAS",
            Rule::Token(_) => "TOKEN",
            Rule::ImmediateToken(_) => "IMMEDIATE_TOKEN",
            Rule::Prec { .. } => "PREC",
            Rule::PrecLeft { .. } => "PREC_LEFT",
            Rule::PrecRight { .. } => "PREC_RIGHT",
            Rule::PrecDynamic { .. } => "PREC_DYNAMIC",
            Rule::Reserved { .. } => "RESERVED",
        }
    }

    /// The single rule a wrapper variant applies to.
    pub fn content(&self) -> Option<&Rule> {
        match self {
            Rule::Repeat(content)
            | Rule::Repeat1(content)
            | Rule::Token(content)
            | Rule::ImmediateToken(content)
            | Rule::Field { content, .. }
            | Rule::Alias { content, .. }
            | Rule::Prec { content, .. }
            | Rule::PrecLeft { content, .. }
            | Rule::PrecRight { content, .. }
            | Rule::PrecDynamic { content, .. }
            | Rule::Reserved { content, .. } => Some(content),
            Rule::Blank
            | Rule::String(_)
            | Rule::Pattern { .. }
            | Rule::Symbol(_)
            | Rule::Seq(_)
            | Rule::Choice(_) => None,
        }
    }

    /// Whether this rule stands for exactly one terminal: a literal, a
    /// pattern or a `token(...)`, possibly under static precedence or a
    /// reserved-word context.
    pub fn is_lexical(&self) -> bool {
        match self {
            Rule::String(_) | Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => {
                true
            }
            Rule::Prec { .. }
            | Rule::PrecLeft { .. }
            | Rule::PrecRight { .. }
            | Rule::Reserved { .. } => self.content().is_some_and(Rule::is_lexical),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precedence {
    Integer(i32),
    /// A level declared in [`Grammar::precedences`].
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrecedenceEntry {
    Name(String),
    Symbol(String),
}
