use std::ops::Range;
use std::path::PathBuf;
use std::process::ExitCode;

use gloss_lib::{Edit, EditedTree};

use super::input::{TableSource, display_name, read_text};
use super::{CliError, Limits, Render};

pub struct EditArgs {
    pub table: TableSource,
    pub source: PathBuf,
    pub range: Range<usize>,
    pub text: String,
    pub render: Render,
    pub limits: Limits,
}

pub fn run(args: EditArgs) -> Result<ExitCode, CliError> {
    let table = args.table.load()?;
    let old_text = read_text(&args.source)?;
    let mut parser = args.limits.parser(&table);

    let old = parser.parse(&old_text, None)?;
    let new_text = Edit::apply(&old_text, args.range.clone(), &args.text)?;
    let edit = Edit::replace(&old_text, args.range, &args.text);
    let edited = parser.edit(&old, &edit, &new_text)?;

    print!("{}", changed_ranges(&edited));
    print!("{}", args.render.tree(&edited.tree));
    eprint!(
        "{}",
        args.render
            .diagnostics(&edited.tree, &display_name(&args.source))
    );

    if edited.tree.diagnostics().has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

pub fn changed_ranges(edited: &EditedTree) -> String {
    if edited.changed_ranges.is_empty() {
        return "changed: none\n".to_string();
    }
    let ranges: Vec<String> = edited
        .changed_ranges
        .iter()
        .map(|r| format!("{}..{}", r.start, r.end))
        .collect();
    format!("changed: {}\n", ranges.join(", "))
}
