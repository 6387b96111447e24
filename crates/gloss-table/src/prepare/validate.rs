//! Structural checks that run before any symbol is assigned.

use std::collections::HashSet;

use gloss_core::{Grammar, Rule};

use super::precedence::PrecedenceTable;
use crate::GrammarError;
use crate::lex::PrecedenceLookup;

pub(super) fn validate(grammar: &Grammar, precs: &PrecedenceTable) -> Result<(), GrammarError> {
    if grammar.rules.is_empty() {
        return Err(GrammarError::NoRules);
    }

    let mut known: HashSet<&str> = grammar.rules.iter().map(|(n, _)| n.as_str()).collect();
    for external in &grammar.externals {
        if let Rule::Symbol(name) = external {
            known.insert(name.as_str());
        }
    }

    for (name, rule) in &grammar.rules {
        check_rule(rule, name, &known, precs, false)?;
    }

    for extra in &grammar.extras {
        match extra {
            Rule::Symbol(name) if known.contains(name.as_str()) => {}
            Rule::Symbol(name) => {
                return Err(GrammarError::UndefinedSymbol {
                    name: name.clone(),
                    rule: "extras".to_owned(),
                });
            }
            rule if rule.is_lexical() => check_rule(rule, "extras", &known, precs, false)?,
            other => {
                return Err(GrammarError::UnsupportedExtra {
                    name: format!("{} rule", other.kind()),
                });
            }
        }
    }

    for conflict in &grammar.conflicts {
        for name in conflict {
            if grammar.rule(name).is_none() {
                return Err(GrammarError::UnknownConflictRule(name.clone()));
            }
        }
    }

    Ok(())
}

fn check_rule(
    rule: &Rule,
    rule_name: &str,
    known: &HashSet<&str>,
    precs: &PrecedenceTable,
    in_token: bool,
) -> Result<(), GrammarError> {
    match rule {
        Rule::Blank | Rule::String(_) | Rule::Pattern { .. } => Ok(()),
        Rule::Symbol(name) if in_token => Err(GrammarError::SymbolInToken {
            name: name.clone(),
            rule: rule_name.to_owned(),
        }),
        Rule::Symbol(name) if known.contains(name.as_str()) => Ok(()),
        Rule::Symbol(name) => Err(GrammarError::UndefinedSymbol {
            name: name.clone(),
            rule: rule_name.to_owned(),
        }),
        Rule::Seq(members) | Rule::Choice(members) => members
            .iter()
            .try_for_each(|m| check_rule(m, rule_name, known, precs, in_token)),
        Rule::Token(content) | Rule::ImmediateToken(content) => {
            check_rule(content, rule_name, known, precs, true)
        }
        Rule::Prec { value, content }
        | Rule::PrecLeft { value, content }
        | Rule::PrecRight { value, content } => {
            precs.resolve(value, rule_name)?;
            check_rule(content, rule_name, known, precs, in_token)
        }
        _ => rule.content().map_or(Ok(()), |content| {
            check_rule(content, rule_name, known, precs, in_token)
        }),
    }
}
