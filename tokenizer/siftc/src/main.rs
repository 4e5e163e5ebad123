//! Sift tokenizer CLI.
//!
//! `siftc <file.c>` tokenizes one source file, appends every new root id
//! to the vocabulary log in the working directory, and prints two
//! diagnostic lines. `siftc dump <file.c>` runs the same pipeline and
//! lists every token with its metadata markers.

use std::process::ExitCode;

use sift_tokenize::{Registry, TokenArena, Tokenizer, TokenizerConfig};

mod tracing_setup;

fn main() -> ExitCode {
    tracing_setup::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    match args[1].as_str() {
        "dump" => {
            if args.len() < 3 {
                eprintln!("Usage: siftc dump <file.c>");
                return ExitCode::FAILURE;
            }
            dump_file(&args[2])
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("siftc {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        path => tokenize_file(path),
    }
}

/// Default mode: tokenize, persist vocabulary, report completion.
fn tokenize_file(path: &str) -> ExitCode {
    let Some((mut tokenizer, source)) = open_pipeline(path) else {
        return ExitCode::FAILURE;
    };
    match tokenizer.tokenize(&source) {
        Ok(_) => {
            println!(">> Tokenization Complete.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error tokenizing '{path}': {e}");
            ExitCode::FAILURE
        }
    }
}

/// Debug mode: tokenize and list every token with metadata markers.
fn dump_file(path: &str) -> ExitCode {
    let Some((mut tokenizer, source)) = open_pipeline(path) else {
        return ExitCode::FAILURE;
    };
    let arena = match tokenizer.tokenize(&source) {
        Ok(arena) => arena,
        Err(e) => {
            eprintln!("Error tokenizing '{path}': {e}");
            return ExitCode::FAILURE;
        }
    };
    print_tokens(&arena, &source, path);
    ExitCode::SUCCESS
}

/// Read the source and open the persistent registry, reporting failures.
fn open_pipeline(path: &str) -> Option<(Tokenizer, Vec<u8>)> {
    let source = match std::fs::read(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading '{path}': {e}");
            return None;
        }
    };

    let config = TokenizerConfig::default();
    if config.vocab_path.exists() {
        println!(">> Loading existing vocabulary into RAM...");
    }
    let registry = match Registry::open(&config.vocab_path) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!(
                "Error opening vocabulary log '{}': {e}",
                config.vocab_path.display()
            );
            return None;
        }
    };

    match Tokenizer::new(registry, config) {
        Ok(tokenizer) => Some((tokenizer, source)),
        Err(e) => {
            eprintln!("Error initializing tokenizer: {e}");
            None
        }
    }
}

fn print_tokens(arena: &TokenArena, source: &[u8], path: &str) {
    println!("Tokens for '{}' ({} tokens):", path, arena.len());
    for token in arena.tokens() {
        let text = String::from_utf8_lossy(token.text(source));
        print!("[{:08X}] {text} ", token.root_id);
        if token.meta.has_joiner() {
            print!("(+_) ");
        }
        match token.meta.absorbed_symbol() {
            Some(b';') => print!("(+;) "),
            Some(b',') => print!("(+,) "),
            Some(b'(') => print!("(+() "),
            Some(b')') => print!("(+)) "),
            Some(b'*') => print!("(+*) "),
            _ => {}
        }
        println!();
    }
}

fn print_usage() {
    println!("Sift source tokenizer");
    println!();
    println!("Usage: siftc <command> [options]");
    println!();
    println!("Commands:");
    println!("  <file.c>             Tokenize a file, updating nset_vocab.bin");
    println!("  dump <file.c>        Tokenize and list every token with markers");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Environment:");
    println!("  SIFT_LOG=<filter>    Log filter (RUST_LOG syntax); default warn");
    println!("  SIFT_LOG_TREE=1      Hierarchical log output");
    println!();
    println!("Examples:");
    println!("  siftc main.c");
    println!("  siftc dump main.c");
    println!("  SIFT_LOG=sift_tokenize=debug siftc main.c");
}
