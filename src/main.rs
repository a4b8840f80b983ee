//! blitzweb - Blitz-style BASIC to JavaScript
//!
//! This is the command-line interface for the blitzweb compiler.

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blitzweb::Compiler;
use blitzweb::lexer::{TokenKind, lex};
use blitzweb::preprocessor::DiskFileSystem;

/// blitzweb - compile Blitz-style BASIC to frame-driven JavaScript
#[derive(Parser, Debug)]
#[command(name = "blitzweb")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input BASIC source file (.bb)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (default: input name with .js extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only run lexer and print tokens (for debugging)
    #[arg(long)]
    tokens: bool,

    /// Print the parsed AST instead of writing JavaScript
    #[arg(long)]
    ast: bool,

    /// Exit with an error if any diagnostic is reported
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let source = match fs::read_to_string(&args.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {}", args.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if args.verbose {
        println!("Compiling: {}", args.input.display());
        println!("Source length: {} bytes", source.len());
    }

    if args.tokens {
        print_tokens(&args, &source);
        return ExitCode::SUCCESS;
    }

    let root = args
        .input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let output = Compiler::new().compile(&source, &DiskFileSystem::new(root));

    for diagnostic in &output.diagnostics {
        eprintln!(
            "{}:{} ({})",
            args.input.display(),
            diagnostic,
            diagnostic.phase
        );
    }

    if args.ast {
        println!("{:#?}", output.program);
    } else {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| args.input.with_extension("js"));
        if let Err(e) = fs::write(&path, &output.code) {
            eprintln!("Error writing '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        if args.verbose {
            println!("Wrote {} ({} bytes)", path.display(), output.code.len());
        }
    }

    if args.strict && !output.diagnostics.is_empty() {
        eprintln!("{} diagnostic(s) reported", output.diagnostics.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_tokens(args: &Args, source: &str) {
    println!("Tokens for {}:", args.input.display());
    println!("{:-<60}", "");

    for token in lex(source) {
        // Skip newlines in output for readability unless verbose
        if token.kind == TokenKind::Newline && !args.verbose {
            continue;
        }

        println!(
            "{:4}:{:<4} {:20} {:?}",
            token.line,
            token.column,
            format!("{:?}", token.kind),
            token.text
        );
    }
}
