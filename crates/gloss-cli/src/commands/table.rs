//! Human-readable and JSON dumps of a compiled table.

use std::fmt::Write;

use gloss_lib::GrammarTable;
use gloss_table::{LexModeId, StateId, SymbolId, SymbolKind};

use super::CliError;
use super::compile::{format_action, summary};
use super::input::TableSource;

pub struct TableArgs {
    pub table: TableSource,
    pub json: bool,
}

pub fn run(args: TableArgs) -> Result<(), CliError> {
    let table = args.table.load()?;
    if args.json {
        println!("{}", symbols_json(&table));
    } else {
        print!("{}", dump(&table));
    }
    Ok(())
}

pub fn dump(table: &GrammarTable) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_dump(table, &mut out);
    out
}

fn write_dump(table: &GrammarTable, w: &mut impl Write) -> std::fmt::Result {
    writeln!(w, "{}", summary(table))?;

    writeln!(w, "\n[symbols]")?;
    for i in 0..table.symbol_count() {
        let id = SymbolId(i as u16);
        let info = table.symbol(id);
        let mut flags = vec![match info.kind {
            SymbolKind::Terminal => "terminal",
            SymbolKind::NonTerminal => "nonterminal",
            SymbolKind::Auxiliary => "auxiliary",
        }];
        if info.named {
            flags.push("named");
        }
        if !info.visible {
            flags.push("hidden");
        }
        if info.extra {
            flags.push("extra");
        }
        if info.external {
            flags.push("external");
        }
        writeln!(w, "{i:>4} {:<24} {}", quoted(&info.name, info.named), flags.join(" "))?;
    }

    writeln!(w, "\n[states]")?;
    for s in 0..table.state_count() {
        let state = StateId(s as u16);
        writeln!(w, "s{s} (lex mode {})", table.lex_mode(state).0)?;
        for t in 0..table.terminal_count() {
            let terminal = SymbolId(t as u16);
            let actions = table.actions(state, terminal);
            if actions.is_empty() {
                continue;
            }
            let actions: Vec<String> = actions.iter().map(|a| format_action(table, a)).collect();
            writeln!(
                w,
                "  {:<20} {}",
                quoted(table.symbol_name(terminal), table.symbol(terminal).named),
                actions.join(" | ")
            )?;
        }
        for n in table.terminal_count()..table.symbol_count() {
            let symbol = SymbolId(n as u16);
            if let Some(target) = table.goto(state, symbol) {
                writeln!(w, "  {:<20} goto s{}", table.symbol_name(symbol), target.0)?;
            }
        }
    }

    writeln!(w, "\n[lex modes]")?;
    for m in 0..table.lex_mode_count() {
        let terminals: Vec<String> = table
            .lex_mode_terminals(LexModeId(m as u16))
            .iter()
            .map(|&t| quoted(table.symbol_name(t), table.symbol(t).named))
            .collect();
        writeln!(w, "{m:>4} {}", terminals.join(" "))?;
    }

    if !table.conflicts().is_empty() {
        writeln!(w, "\n[conflicts]")?;
        for conflict in table.conflicts() {
            writeln!(
                w,
                "  s{} on {}: {}",
                conflict.state.0,
                quoted(
                    table.symbol_name(conflict.lookahead),
                    table.symbol(conflict.lookahead).named
                ),
                conflict.rules.join(", ")
            )?;
        }
    }
    Ok(())
}

/// Anonymous symbols print quoted, like in s-expressions.
fn quoted(name: &str, named: bool) -> String {
    if named {
        name.to_string()
    } else {
        format!("{name:?}")
    }
}

pub fn symbols_json(table: &GrammarTable) -> String {
    let symbols: Vec<serde_json::Value> = (0..table.symbol_count())
        .map(|i| {
            let info = table.symbol(SymbolId(i as u16));
            serde_json::json!({
                "id": i,
                "name": info.name,
                "named": info.named,
                "visible": info.visible,
                "terminal": info.kind == SymbolKind::Terminal,
                "extra": info.extra,
                "external": info.external,
            })
        })
        .collect();
    let doc = serde_json::json!({
        "name": table.name(),
        "states": table.state_count(),
        "lex_modes": table.lex_mode_count(),
        "symbols": symbols,
    });
    serde_json::to_string_pretty(&doc).unwrap_or_default()
}
