//! Reading tree-sitter's `grammar.json`.
//!
//! The top level goes through serde so that rule order survives (the first
//! rule is the start rule). Rule bodies are walked by hand, which lets errors
//! name the offending spot, e.g. `rules.sum.content.members[1]`.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::LoadError;
use super::types::{Grammar, Precedence, PrecedenceEntry, Rule};

impl Grammar {
    /// Parse a grammar from `grammar.json` text.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let document: Document = serde_json::from_str(json).map_err(LoadError::Json)?;
        document.into_grammar()
    }
}

#[derive(Deserialize)]
struct Document {
    name: String,
    rules: IndexMap<String, Value>,
    #[serde(default)]
    extras: Vec<Value>,
    #[serde(default)]
    precedences: Vec<Vec<Value>>,
    #[serde(default)]
    conflicts: Vec<Vec<String>>,
    #[serde(default)]
    externals: Vec<Value>,
    #[serde(default)]
    inline: Vec<String>,
    #[serde(default)]
    supertypes: Vec<String>,
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    reserved: IndexMap<String, Vec<Value>>,
}

impl Document {
    fn into_grammar(self) -> Result<Grammar, LoadError> {
        if self.rules.is_empty() {
            return Err(LoadError::NoRules { grammar: self.name });
        }

        let mut grammar = Grammar::new(self.name);
        for (name, body) in &self.rules {
            let rule = read_rule(body, &format!("rules.{name}"))?;
            grammar.rules.push((name.clone(), rule));
        }
        grammar.extras = read_rules(&self.extras, "extras")?;
        grammar.externals = read_rules(&self.externals, "externals")?;

        for (i, level) in self.precedences.iter().enumerate() {
            let mut entries = Vec::with_capacity(level.len());
            for (j, entry) in level.iter().enumerate() {
                entries.push(read_precedence_entry(entry, &format!("precedences[{i}][{j}]"))?);
            }
            grammar.precedences.push(entries);
        }
        for (context, words) in &self.reserved {
            let words = read_rules(words, &format!("reserved.{context}"))?;
            grammar.reserved.push((context.clone(), words));
        }

        grammar.conflicts = self.conflicts;
        grammar.inline = self.inline;
        grammar.supertypes = self.supertypes;
        grammar.word = self.word;
        Ok(grammar)
    }
}

fn read_rules(values: &[Value], path: &str) -> Result<Vec<Rule>, LoadError> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| read_rule(value, &format!("{path}[{i}]")))
        .collect()
}

fn read_rule(value: &Value, path: &str) -> Result<Rule, LoadError> {
    let object = RuleObject::new(value, path)?;
    let kind = object.string("type")?;

    let rule = match kind.as_str() {
        "BLANK" => Rule::Blank,
        "STRING" => Rule::String(object.string("value")?),
        "PATTERN" => Rule::Pattern {
            value: object.string("value")?,
            flags: object.optional_string("flags")?,
        },
        "SYMBOL" => Rule::Symbol(object.string("name")?),
        "SEQ" => Rule::Seq(object.members()?),
        "CHOICE" => Rule::Choice(object.members()?),
        "REPEAT" => Rule::Repeat(object.content()?),
        "REPEAT1" => Rule::Repeat1(object.content()?),
        "FIELD" => Rule::Field {
            name: object.string("name")?,
            content: object.content()?,
        },
        "ALIAS" => Rule::Alias {
            content: object.content()?,
            value: object.string("value")?,
            named: object.flag("named")?,
        },
        "TOKEN" => Rule::Token(object.content()?),
        "IMMEDIATE_TOKEN" => Rule::ImmediateToken(object.content()?),
        "PREC" => Rule::Prec {
            value: object.precedence()?,
            content: object.content()?,
        },
        "PREC_LEFT" => Rule::PrecLeft {
            value: object.precedence()?,
            content: object.content()?,
        },
        "PREC_RIGHT" => Rule::PrecRight {
            value: object.precedence()?,
            content: object.content()?,
        },
        "PREC_DYNAMIC" => Rule::PrecDynamic {
            value: object.integer("value")?,
            content: object.content()?,
        },
        "RESERVED" => Rule::Reserved {
            context_name: object.string("context_name")?,
            content: object.content()?,
        },
        other => return Err(LoadError::shape(path, format!("unknown rule type `{other}`"))),
    };
    Ok(rule)
}

fn read_precedence_entry(value: &Value, path: &str) -> Result<PrecedenceEntry, LoadError> {
    let object = RuleObject::new(value, path)?;
    match object.string("type")?.as_str() {
        "STRING" => Ok(PrecedenceEntry::Name(object.string("value")?)),
        "SYMBOL" => Ok(PrecedenceEntry::Symbol(object.string("name")?)),
        other => Err(LoadError::shape(
            path,
            format!("precedence entries are STRING or SYMBOL, found `{other}`"),
        )),
    }
}

/// One JSON object of a rule body and where it sits in the document.
struct RuleObject<'a> {
    fields: &'a Map<String, Value>,
    path: &'a str,
}

impl<'a> RuleObject<'a> {
    fn new(value: &'a Value, path: &'a str) -> Result<Self, LoadError> {
        match value {
            Value::Object(fields) => Ok(Self { fields, path }),
            other => Err(LoadError::shape(
                path,
                format!("expected a rule object, found {}", describe(other)),
            )),
        }
    }

    fn get(&self, key: &str) -> Result<&'a Value, LoadError> {
        self.fields
            .get(key)
            .ok_or_else(|| LoadError::shape(self.path, format!("missing `{key}`")))
    }

    fn mismatch(&self, key: &str, expected: &str, found: &Value) -> LoadError {
        LoadError::shape(
            self.path,
            format!("`{key}` should be {expected}, found {}", describe(found)),
        )
    }

    fn string(&self, key: &str) -> Result<String, LoadError> {
        match self.get(key)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(self.mismatch(key, "a string", other)),
        }
    }

    fn optional_string(&self, key: &str) -> Result<Option<String>, LoadError> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mismatch(key, "a string", other)),
        }
    }

    fn flag(&self, key: &str) -> Result<bool, LoadError> {
        match self.get(key)? {
            Value::Bool(b) => Ok(*b),
            other => Err(self.mismatch(key, "a boolean", other)),
        }
    }

    fn integer(&self, key: &str) -> Result<i32, LoadError> {
        let value = self.get(key)?;
        value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| self.mismatch(key, "a 32-bit integer", value))
    }

    /// `value` of a `PREC*` rule: a number or a name from `precedences`.
    fn precedence(&self) -> Result<Precedence, LoadError> {
        match self.get("value")? {
            Value::String(name) => Ok(Precedence::Name(name.clone())),
            Value::Number(_) => self.integer("value").map(Precedence::Integer),
            other => Err(self.mismatch("value", "an integer or a name", other)),
        }
    }

    fn content(&self) -> Result<Box<Rule>, LoadError> {
        let path = format!("{}.content", self.path);
        read_rule(self.get("content")?, &path).map(Box::new)
    }

    fn members(&self) -> Result<Vec<Rule>, LoadError> {
        match self.get("members")? {
            Value::Array(items) => read_rules(items, &format!("{}.members", self.path)),
            other => Err(self.mismatch("members", "an array", other)),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
