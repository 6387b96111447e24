use std::fs;
use std::path::PathBuf;

use gloss_lib::GrammarTable;
use gloss_table::ParseAction;

use super::CliError;
use super::input::read_text;

pub struct CompileArgs {
    pub grammar: PathBuf,
    pub output: Option<PathBuf>,
}

pub fn run(args: CompileArgs) -> Result<(), CliError> {
    let json = read_text(&args.grammar)?;
    let table = gloss_lib::compile_grammar(&json)?;
    let bytes = table.to_binary().map_err(gloss_lib::Error::from)?;

    let output = args
        .output
        .unwrap_or_else(|| args.grammar.with_extension("table"));
    fs::write(&output, &bytes).map_err(|source| CliError::Write {
        path: output.display().to_string(),
        source,
    })?;

    eprint!("{}", conflict_notes(&table));
    println!(
        "{}: wrote {} ({} bytes)",
        summary(&table),
        output.display(),
        bytes.len()
    );
    Ok(())
}

pub fn summary(table: &GrammarTable) -> String {
    format!(
        "{} ({} symbols, {} states, {} lex modes)",
        table.name(),
        table.symbol_count(),
        table.state_count(),
        table.lex_mode_count()
    )
}

/// One note per declared conflict left in the table for the parser to fork on.
pub fn conflict_notes(table: &GrammarTable) -> String {
    let mut out = String::new();
    for conflict in table.conflicts() {
        let actions: Vec<String> = conflict
            .actions
            .iter()
            .map(|a| format_action(table, a))
            .collect();
        out.push_str(&format!(
            "note: declared conflict [{}] in state {} on `{}`: {}\n",
            conflict.rules.join(", "),
            conflict.state.0,
            table.symbol_name(conflict.lookahead),
            actions.join(" | ")
        ));
    }
    out
}

pub fn format_action(table: &GrammarTable, action: &ParseAction) -> String {
    match action {
        ParseAction::Shift { state } => format!("shift s{}", state.0),
        ParseAction::ShiftExtra => "shift-extra".to_string(),
        ParseAction::Reduce { production } => {
            let production = table.production(*production);
            format!(
                "reduce {}/{}",
                table.symbol_name(production.lhs),
                production.len()
            )
        }
        ParseAction::Accept => "accept".to_string(),
    }
}
