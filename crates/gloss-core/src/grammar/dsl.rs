//! Builder helpers mirroring the `grammar.js` DSL.
//!
//! ```
//! use gloss_core::grammar::dsl::*;
//!
//! let grammar = GrammarBuilder::new("calc")
//!     .rule("expr", choice([sym("number"), prec_left(1, seq([sym("expr"), lit("+"), sym("expr")]))]))
//!     .rule("number", pattern(r"\d+"))
//!     .extra(pattern(r"\s"))
//!     .build();
//!
//! assert_eq!(grammar.start_rule(), Some("expr"));
//! ```

use super::types::{Grammar, Precedence, PrecedenceEntry, Rule};

impl From<i32> for Precedence {
    fn from(value: i32) -> Self {
        Precedence::Integer(value)
    }
}

impl From<&str> for Precedence {
    fn from(value: &str) -> Self {
        Precedence::Name(value.to_owned())
    }
}

pub fn blank() -> Rule {
    Rule::Blank
}

/// Literal string token.
pub fn lit(value: impl Into<String>) -> Rule {
    Rule::String(value.into())
}

pub fn pattern(value: impl Into<String>) -> Rule {
    Rule::Pattern {
        value: value.into(),
        flags: None,
    }
}

pub fn pattern_with_flags(value: impl Into<String>, flags: impl Into<String>) -> Rule {
    Rule::Pattern {
        value: value.into(),
        flags: Some(flags.into()),
    }
}

pub fn sym(name: impl Into<String>) -> Rule {
    Rule::Symbol(name.into())
}

pub fn seq(members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Seq(members.into_iter().collect())
}

pub fn choice(members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Choice(members.into_iter().collect())
}

pub fn repeat(rule: Rule) -> Rule {
    Rule::Repeat(Box::new(rule))
}

pub fn repeat1(rule: Rule) -> Rule {
    Rule::Repeat1(Box::new(rule))
}

pub fn optional(rule: Rule) -> Rule {
    Rule::Choice(vec![rule, Rule::Blank])
}

pub fn field(name: impl Into<String>, rule: Rule) -> Rule {
    Rule::Field {
        name: name.into(),
        content: Box::new(rule),
    }
}

/// Rename `rule` to `value`, shown as a named node.
pub fn alias(rule: Rule, value: impl Into<String>) -> Rule {
    Rule::Alias {
        content: Box::new(rule),
        value: value.into(),
        named: true,
    }
}

/// Rename `rule` to `value`, shown as an anonymous node.
pub fn alias_anonymous(rule: Rule, value: impl Into<String>) -> Rule {
    Rule::Alias {
        content: Box::new(rule),
        value: value.into(),
        named: false,
    }
}

pub fn token(rule: Rule) -> Rule {
    Rule::Token(Box::new(rule))
}

pub fn token_immediate(rule: Rule) -> Rule {
    Rule::ImmediateToken(Box::new(rule))
}

pub fn prec(value: impl Into<Precedence>, rule: Rule) -> Rule {
    Rule::Prec {
        value: value.into(),
        content: Box::new(rule),
    }
}

pub fn prec_left(value: impl Into<Precedence>, rule: Rule) -> Rule {
    Rule::PrecLeft {
        value: value.into(),
        content: Box::new(rule),
    }
}

pub fn prec_right(value: impl Into<Precedence>, rule: Rule) -> Rule {
    Rule::PrecRight {
        value: value.into(),
        content: Box::new(rule),
    }
}

pub fn prec_dynamic(value: i32, rule: Rule) -> Rule {
    Rule::PrecDynamic {
        value,
        content: Box::new(rule),
    }
}

pub fn reserved(context_name: impl Into<String>, rule: Rule) -> Rule {
    Rule::Reserved {
        context_name: context_name.into(),
        content: Box::new(rule),
    }
}

/// `rule (',' rule)*`
pub fn comma_sep1(rule: Rule) -> Rule {
    seq([rule.clone(), repeat(seq([lit(","), rule]))])
}

/// Optional `rule (',' rule)*`
pub fn comma_sep(rule: Rule) -> Rule {
    optional(comma_sep1(rule))
}

/// Fluent constructor for [`Grammar`]. The first rule added is the start rule.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    grammar: Grammar,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            grammar: Grammar::new(name),
        }
    }

    pub fn rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.grammar.rules.push((name.into(), rule));
        self
    }

    pub fn extra(mut self, rule: Rule) -> Self {
        self.grammar.extras.push(rule);
        self
    }

    pub fn conflict(mut self, rules: &[&str]) -> Self {
        self.grammar
            .conflicts
            .push(rules.iter().map(|r| (*r).to_owned()).collect());
        self
    }

    pub fn external(mut self, rule: Rule) -> Self {
        self.grammar.externals.push(rule);
        self
    }

    pub fn inline(mut self, name: impl Into<String>) -> Self {
        self.grammar.inline.push(name.into());
        self
    }

    pub fn supertype(mut self, name: impl Into<String>) -> Self {
        self.grammar.supertypes.push(name.into());
        self
    }

    pub fn word(mut self, name: impl Into<String>) -> Self {
        self.grammar.word = Some(name.into());
        self
    }

    /// Declare a named precedence ordering, highest first.
    pub fn precedences(mut self, levels: &[&str]) -> Self {
        self.grammar.precedences.push(
            levels
                .iter()
                .map(|l| PrecedenceEntry::Name((*l).to_owned()))
                .collect(),
        );
        self
    }

    pub fn reserved(
        mut self,
        context: impl Into<String>,
        words: impl IntoIterator<Item = Rule>,
    ) -> Self {
        self.grammar
            .reserved
            .push((context.into(), words.into_iter().collect()));
        self
    }

    pub fn build(self) -> Grammar {
        self.grammar
    }
}
