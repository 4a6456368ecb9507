use std::{
    collections::{HashMap, HashSet},
    fs::read_to_string,
    path::PathBuf,
    process,
};

use clap::Parser;
use frontend::{ast::statements::Stmt, compile, parse_program, DiagnosticSink, Position};

/// Parse and type check source files
#[derive(Parser, Debug)]
#[command(name = "frontend", version, about = "Parse and type check source files", long_about = None)]
struct Args {
    /// Source files; all of them form one program
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Print the resolved type of every top-level binding
    #[arg(long)]
    dump_types: bool,

    /// Only print diagnostics
    #[arg(short, long)]
    quiet: bool,
}

/// Renders diagnostics with the offending source line and a caret.
struct ConsoleSink {
    sources: HashMap<String, String>,
}

impl DiagnosticSink for ConsoleSink {
    fn report(&mut self, position: &Position, message: &str, hint: Option<&str>) {
        /*
            Error: message
            -> final.lang:20:8
               |
            20 | let a = #;
               | --------^
        */

        match hint {
            Some(hint) => eprintln!("Error: {} ({})", message, hint),
            None => eprintln!("Error: {}", message),
        }
        eprintln!("-> {}", position);

        let Some(line_text) = self
            .sources
            .get(position.file.as_str())
            .and_then(|source| source.lines().nth(position.line.saturating_sub(1) as usize))
        else {
            return;
        };

        let line_string = position.line.to_string();
        let padding = line_string.len() + 2;

        eprintln!("{:>padding$}", "|");

        let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
        eprintln!("{} | {}", line_string, line_text_removed.trim_end());

        let arrows = (position.column as usize).saturating_sub(removed_whitespace) + 1;
        eprintln!("{:>padding$} {:->arrows$}", "|", "^");
    }
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let trimmed = string.trim_start_matches([' ', '\t']);
    (trimmed, string.len() - trimmed.len())
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();

    let mut enqueued = HashSet::new();
    let mut sources = vec![];

    for path in args.files.iter() {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
        if !enqueued.insert(canonical) {
            tracing::debug!(path = %path.display(), "skipping file already enqueued");
            continue;
        }

        match read_to_string(path) {
            Ok(source) => sources.push((path.to_string_lossy().into_owned(), source)),
            Err(error) => {
                eprintln!("Error: failed to read {}: {}", path.display(), error);
                process::exit(1);
            }
        }
    }

    let mut sink = ConsoleSink {
        sources: sources.iter().cloned().collect(),
    };

    let Some(mut program) = parse_program(sources, &mut sink) else {
        process::exit(1);
    };

    let Some(type_checker) = compile(&mut program, &mut sink) else {
        process::exit(1);
    };

    if args.dump_types {
        for file in program.files.iter() {
            for declaration in file.declarations.iter() {
                let resolved = match declaration {
                    Stmt::Variable(variable) => variable.resolved.get(),
                    Stmt::Declaration(declaration) => declaration.resolved.get(),
                    _ => None,
                };

                if let (Some(name), Some(ty)) = (declaration.name(), resolved) {
                    println!("{}: {}", name, type_checker.describe(ty));
                }
            }
        }
    }

    if !args.quiet {
        println!("Checked {} file(s) without errors", program.files.len());
    }
}
