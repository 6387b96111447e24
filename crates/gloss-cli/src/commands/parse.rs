use std::path::PathBuf;
use std::process::ExitCode;

use gloss_lib::{PrintTracer, Verbosity};

use super::input::{TableSource, display_name, read_text};
use super::{CliError, Limits, Render};

pub struct ParseArgs {
    pub table: TableSource,
    pub source: PathBuf,
    pub render: Render,
    pub limits: Limits,
    pub trace: Option<Verbosity>,
}

pub fn verbosity(count: u8) -> Verbosity {
    match count {
        0 => Verbosity::Default,
        1 => Verbosity::Verbose,
        _ => Verbosity::VeryVerbose,
    }
}

pub fn run(args: ParseArgs) -> Result<ExitCode, CliError> {
    let table = args.table.load()?;
    let text = read_text(&args.source)?;
    let mut parser = args.limits.parser(&table);

    let tree = match args.trace {
        Some(verbosity) => {
            let mut tracer = PrintTracer::new(&table, &text, verbosity);
            let tree = parser.parse_with_tracer(&text, None, &mut tracer)?;
            tracer.print();
            println!("---");
            tree
        }
        None => parser.parse(&text, None)?,
    };

    print!("{}", args.render.tree(&tree));
    eprint!(
        "{}",
        args.render.diagnostics(&tree, &display_name(&args.source))
    );

    if tree.diagnostics().has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
