//! The tarn CLI.
//!
//! Provides the `tarn` command with one subcommand per pipeline stage:
//!
//! - `tarn tokens <file>` - print the filtered token stream
//! - `tarn ast <file>` - pretty-print the parsed AST
//! - `tarn eval <file>` - evaluate and print the resulting value
//! - `tarn usedef <file>` - print the free-variable set
//! - `tarn rename <file>` - pretty-print the AST after alpha-renaming
//! - `tarn constraints <file>` - print the constraint set and equivalence classes
//! - `tarn codegen <file>` - print the lowered three-address instructions
//!
//! Every stage is an "external collaborator" view onto the core crates:
//! this binary owns no pipeline logic of its own beyond wiring stages
//! together and rendering their errors.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use tarn_ast::env::Env;
use tarn_ast::expr::Expr;
use tarn_ast::usedef::use_def;
use tarn_ast::RenameVisitor;
use tarn_codegen::{GenVisitor, Instr};
use tarn_common::diagnostics::{self, Diagnostic};
use tarn_common::error::{CodegenError, EvalError, LexError, ParseError};
use tarn_lexer::Scanner;
use tarn_typeck::{CtrGen, Unifier};

#[derive(Parser)]
#[command(name = "tarn", version, about = "The tarn expression-language pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the filtered token stream (no whitespace or comment tokens).
    Tokens { file: PathBuf },
    /// Pretty-print the parsed AST.
    Ast { file: PathBuf },
    /// Evaluate the source and print the resulting value.
    Eval { file: PathBuf },
    /// Print the set of free identifiers.
    Usedef { file: PathBuf },
    /// Pretty-print the AST after alpha-renaming.
    Rename { file: PathBuf },
    /// Print the constraint set and resolved equivalence classes.
    Constraints { file: PathBuf },
    /// Print the lowered three-address instruction sequence.
    Codegen { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tokens { file } => run_tokens(&file),
        Commands::Ast { file } => run_ast(&file),
        Commands::Eval { file } => run_eval(&file),
        Commands::Usedef { file } => run_usedef(&file),
        Commands::Rename { file } => run_rename(&file),
        Commands::Constraints { file } => run_constraints(&file),
        Commands::Codegen { file } => run_codegen(&file),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }
}

/// Everything that can go wrong running a subcommand, with enough context
/// to render against the original source when the failure has a span.
enum DriverError {
    Io(String),
    Lex(LexError, String, String),
    Parse(ParseError, String, String),
    Eval(EvalError, String, String),
    Codegen(CodegenError, String, String),
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverError::Io(msg) => write!(f, "error: {msg}"),
            DriverError::Lex(e, name, src) => write!(f, "{}", diagnostics::render(e, name, src)),
            DriverError::Parse(e, name, src) => write!(f, "{}", diagnostics::render(e, name, src)),
            DriverError::Eval(e, name, src) => write!(f, "{}", diagnostics::render(e, name, src)),
            DriverError::Codegen(e, name, src) => write!(f, "{}", diagnostics::render(e, name, src)),
        }
    }
}

fn read_source(path: &PathBuf) -> Result<String, DriverError> {
    std::fs::read_to_string(path)
        .map_err(|e| DriverError::Io(format!("failed to read '{}': {e}", path.display())))
}

fn file_name(path: &PathBuf) -> String {
    path.display().to_string()
}

fn parse_source(path: &PathBuf) -> Result<(String, String, Expr), DriverError> {
    let source = read_source(path)?;
    let name = file_name(path);
    let tokens = Scanner::filtered(&source)
        .map_err(|e| DriverError::Lex(e, name.clone(), source.clone()))?;
    let ast = tarn_parser::parse(&tokens, &source)
        .map_err(|e| DriverError::Parse(e, name.clone(), source.clone()))?;
    Ok((name, source, ast))
}

fn run_tokens(path: &PathBuf) -> Result<(), DriverError> {
    let source = read_source(path)?;
    let name = file_name(path);
    let tokens = Scanner::filtered(&source).map_err(|e| DriverError::Lex(e, name, source))?;
    for token in &tokens {
        println!("{:?} {:?}", token.kind, token.span);
    }
    Ok(())
}

fn run_ast(path: &PathBuf) -> Result<(), DriverError> {
    let (_, _, ast) = parse_source(path)?;
    println!("{ast:#?}");
    Ok(())
}

fn run_eval(path: &PathBuf) -> Result<(), DriverError> {
    let (name, source, ast) = parse_source(path)?;
    let value = tarn_eval::eval(&ast, &Env::empty())
        .map_err(|e| DriverError::Eval(e, name, source))?;
    println!("{value:?}");
    Ok(())
}

fn run_usedef(path: &PathBuf) -> Result<(), DriverError> {
    let (_, _, ast) = parse_source(path)?;
    let mut free: Vec<String> = use_def(&ast, &Default::default()).into_iter().collect();
    free.sort();
    println!("{{{}}}", free.join(", "));
    Ok(())
}

fn run_rename(path: &PathBuf) -> Result<(), DriverError> {
    let (_, _, mut ast) = parse_source(path)?;
    RenameVisitor::new().rename(&mut ast);
    println!("{ast:#?}");
    Ok(())
}

fn run_constraints(path: &PathBuf) -> Result<(), DriverError> {
    let (_, _, ast) = parse_source(path)?;
    let mut gen = CtrGen::new();
    let root = gen.fresh();
    let mut constraints = Vec::new();
    gen.generate(&ast, root.clone(), &mut constraints);

    println!("root: {root}");
    println!("constraints:");
    for (a, b) in &constraints {
        println!("  {a} = {b}");
    }

    let mut unifier = Unifier::new();
    unifier.solve(&constraints);
    println!("equivalence classes:");
    let mut seen = std::collections::HashSet::new();
    for (handle, class) in unifier.classes() {
        let mut members: Vec<String> = class.iter().map(|h| h.to_string()).collect();
        members.sort();
        let key = members.join(",");
        if seen.insert(key.clone()) {
            println!("  {{{key}}}");
        }
        let _ = handle;
    }
    Ok(())
}

fn run_codegen(path: &PathBuf) -> Result<(), DriverError> {
    let (name, source, mut ast) = parse_source(path)?;
    RenameVisitor::new().rename(&mut ast);
    let mut sink: Vec<Instr> = Vec::new();
    let result = GenVisitor::new().lower(&ast, &mut sink);
    let reg = result.map_err(|e| DriverError::Codegen(e, name, source))?;
    for instr in &sink {
        println!("{instr}");
    }
    println!("result: {reg}");
    Ok(())
}
