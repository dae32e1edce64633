//! CLI entry point for `delve_script`.
//! Typical usage:
//! - `cargo run -p delve_script -- compile adventure.delve game.html`
//! - `cargo run -p delve_script -- lint adventure.delve`
//!
//! A bare `delve_script <input> [<output>]` invocation is treated as
//! `compile`. Exit codes: 0 on success, 1 on any compile failure, 2 on
//! usage errors.

use std::{env, fs, process};

use delve_script::{CompileError, compile, parse_program, tokenize, validate};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();

    // Accept either:
    // 1) cargo run: <bin> -- <cmd> <args>
    // 2) direct:    <bin> <cmd> <args>
    // 3) bare:      <bin> <input> [<output>]   (implied compile)
    let rest: Vec<String> = match args.as_slice() {
        [flag, cmd, tail @ ..] if flag == "--" && (cmd == "compile" || cmd == "lint") => {
            let mut v = vec![cmd.clone()];
            v.extend_from_slice(tail);
            v
        }
        [cmd, tail @ ..] if cmd == "compile" || cmd == "lint" => {
            let mut v = vec![cmd.clone()];
            v.extend_from_slice(tail);
            v
        }
        [_, ..] => {
            let mut v = vec!["compile".to_string()];
            v.extend_from_slice(&args);
            v
        }
        [] => {
            usage();
            process::exit(2);
        }
    };

    match rest[0].as_str() {
        "compile" => run_compile(&rest[1..]),
        "lint" => run_lint(&rest[1..]),
        other => {
            eprintln!("unknown command: {other}");
            process::exit(2);
        }
    }
}

fn usage() {
    eprintln!(
        "Usage:\n  delve_script compile <input.delve> [<output.html>]\n  delve_script lint <input.delve>\n\nNotes:\n- The output path defaults to 'game.html'.\n- lint parses and validates without writing anything."
    );
}

fn run_compile(args: &[String]) {
    let Some(input) = args.first() else {
        usage();
        process::exit(2);
    };
    let output = args.get(1).map(String::as_str).unwrap_or("game.html");

    let source = read_source(input);
    log::info!("compiling '{input}' -> '{output}'");

    match compile(&source) {
        Ok(html) => {
            // Nothing is written until every stage has succeeded.
            if let Err(e) = fs::write(output, html) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            println!("Successfully compiled {input} to {output}");
        }
        Err(e) => {
            report_compile_error(e);
            process::exit(1);
        }
    }
}

fn run_lint(args: &[String]) {
    let Some(input) = args.first() else {
        usage();
        process::exit(2);
    };

    let source = read_source(input);
    let tokens = match tokenize(&source) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Syntax Error: {e}");
            process::exit(1);
        }
    };
    let program = match parse_program(tokens) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Syntax Error: {e}");
            process::exit(1);
        }
    };

    let errors = validate(&program);
    if errors.is_empty() {
        eprintln!("lint: OK (no diagnostics)");
    } else {
        report_compile_error(CompileError::Validation(errors));
        process::exit(1);
    }
}

fn read_source(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("Error: File '{path}' not found");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn report_compile_error(error: CompileError) {
    match error {
        CompileError::Syntax(e) => {
            eprintln!("Syntax Error: {e}");
        }
        CompileError::Validation(errors) => {
            eprintln!("Compilation errors found:");
            for error in &errors {
                eprintln!("  ERROR: {error}");
            }
        }
    }
}
