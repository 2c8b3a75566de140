use std::env;
use std::fs;
use std::process::ExitCode;

use kvazz::{lex, parse, Interpreter, KvazzError, Node, StdPrint};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("lex") => run_lex(args.get(2)),
        Some("parse") => run_parse(args.get(2)),
        Some("exec") => run_exec(args.get(2)),
        Some("compile") => run_compile(),
        Some("help") | None => {
            print_usage();
            ExitCode::SUCCESS
        }
        Some(other) => {
            eprintln!("unknown subcommand '{other}'");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!(
        "usage:\n  kvazz lex <path>\n  kvazz parse <path>\n  kvazz exec <path>\n  kvazz compile <path>\n  kvazz help"
    );
}

fn read_source(path: Option<&String>) -> Result<(String, String), ExitCode> {
    let Some(path) = path else {
        eprintln!("error: missing file path");
        return Err(ExitCode::FAILURE);
    };
    match fs::read_to_string(path) {
        Ok(source) => Ok((path.clone(), source)),
        Err(err) => {
            eprintln!("error: could not read '{path}': {err}");
            Err(ExitCode::FAILURE)
        }
    }
}

fn run_lex(path: Option<&String>) -> ExitCode {
    let (file, source) = match read_source(path) {
        Ok(v) => v,
        Err(code) => return code,
    };
    match lex(&source) {
        Ok(tokens) => {
            println!("[");
            for (i, token) in tokens.iter().enumerate() {
                let suffix = if i + 1 == tokens.len() { "" } else { "," };
                println!("{token}{suffix}");
            }
            println!("]");
            ExitCode::SUCCESS
        }
        Err(err) => report(&file, &source, &err),
    }
}

fn run_parse(path: Option<&String>) -> ExitCode {
    let (file, source) = match read_source(path) {
        Ok(v) => v,
        Err(code) => return code,
    };
    match lex(&source).and_then(parse) {
        Ok(program) => {
            print_tree(&program, "", true);
            ExitCode::SUCCESS
        }
        Err(err) => report(&file, &source, &err),
    }
}

/// Prints `node` using `|-`/`` `- `` tree connectors.
fn print_tree(node: &Node, prefix: &str, is_last: bool) {
    let connector = if prefix.is_empty() {
        ""
    } else if is_last {
        "`- "
    } else {
        "|- "
    };
    println!("{prefix}{connector}{}", node.label());

    let child_prefix = if prefix.is_empty() {
        String::new()
    } else if is_last {
        format!("{prefix}   ")
    } else {
        format!("{prefix}|  ")
    };
    let next_prefix = if prefix.is_empty() { "   ".to_string() } else { child_prefix };

    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        print_tree(child, &next_prefix, i + 1 == children.len());
    }
}

fn run_exec(path: Option<&String>) -> ExitCode {
    let (file, source) = match read_source(path) {
        Ok(v) => v,
        Err(code) => return code,
    };
    let program = match lex(&source).and_then(parse) {
        Ok(program) => program,
        Err(err) => return report(&file, &source, &err),
    };
    let mut out = StdPrint;
    match Interpreter::new().run(&program, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => report(&file, &source, &err),
    }
}

fn run_compile() -> ExitCode {
    eprintln!("compile: not implemented");
    ExitCode::FAILURE
}

/// Renders a `KvazzError`'s byte span as a 1-based line/column; the
/// library stays source-layout-agnostic, so that translation lives here.
fn report(file: &str, source: &str, err: &KvazzError) -> ExitCode {
    match err.span {
        Some(span) => {
            let (line, col) = line_col(source, span.start);
            eprintln!("{file}:{line}:{col}: {err}");
        }
        None => eprintln!("{file}: {err}"),
    }
    ExitCode::FAILURE
}

fn line_col(source: &str, byte_offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= byte_offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}
