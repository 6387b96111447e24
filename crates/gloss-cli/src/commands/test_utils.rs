use std::sync::Arc;

use gloss_lib::GrammarTable;

/// `expr := NUMBER | prec.left(1, expr '+' expr)` with whitespace extras.
pub const CALC_JSON: &str = r#"{
  "name": "calc",
  "rules": {
    "expr": { "type": "CHOICE", "members": [
      { "type": "SYMBOL", "name": "NUMBER" },
      { "type": "PREC_LEFT", "value": 1, "content": { "type": "SEQ", "members": [
        { "type": "SYMBOL", "name": "expr" },
        { "type": "STRING", "value": "+" },
        { "type": "SYMBOL", "name": "expr" }
      ] } }
    ] },
    "NUMBER": { "type": "PATTERN", "value": "\\d+" }
  },
  "extras": [{ "type": "PATTERN", "value": "\\s" }]
}"#;

/// `s := s s | 'a'` with the conflict declared.
pub const PAIRS_JSON: &str = r#"{
  "name": "pairs",
  "rules": {
    "s": { "type": "CHOICE", "members": [
      { "type": "SEQ", "members": [
        { "type": "SYMBOL", "name": "s" },
        { "type": "SYMBOL", "name": "s" }
      ] },
      { "type": "STRING", "value": "a" }
    ] }
  },
  "conflicts": [["s"]]
}"#;

pub fn table(json: &str) -> Arc<GrammarTable> {
    match gloss_lib::compile_grammar(json) {
        Ok(table) => table,
        Err(e) => panic!("grammar failed to compile: {e}"),
    }
}
