//! Tessel model compiler CLI.

use tesselc::commands::{explain_error, parse_build_args, run_build};

fn main() {
    tesselc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "build" => build(&args[2..]),
        "explain" | "--explain" => {
            let Some(code) = args.get(2) else {
                eprintln!("Usage: tessel explain <code>");
                std::process::exit(1);
            };
            if let Some(text) = explain_error(code) {
                println!("{text}");
            } else {
                eprintln!("Unknown diagnostic code: {code}");
                eprintln!();
                eprintln!("Codes look like E1001 (errors) or W0001 (warnings).");
                std::process::exit(1);
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("tessel {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn build(args: &[String]) {
    let options = match parse_build_args(args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("Usage: tessel build <manifest.json> [-o <dir>] [--option key=value]...");
            std::process::exit(1);
        }
    };
    let result = match run_build(&options) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };

    let outcome = &result.outcome;
    for diagnostic in &outcome.diagnostics {
        eprintln!("{diagnostic}");
        eprintln!();
    }
    for artifact in &result.artifacts {
        println!("would write {}", artifact.path);
    }
    println!(
        "{} models, {} generated files",
        outcome.models.len(),
        outcome.emitted.len() + outcome.extensions.len()
    );
    if outcome.has_errors() {
        let errors = outcome.diagnostics.iter().filter(|d| d.is_error()).count();
        eprintln!("error: processing failed with {errors} error(s)");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("Tessel model compiler");
    println!();
    println!("Usage: tessel <command> [options]");
    println!();
    println!("Commands:");
    println!("  build <manifest.json>  Process a declaration manifest");
    println!("  explain <code>         Explain a diagnostic code (e.g., E2001)");
    println!("  help                   Show this help message");
    println!("  version                Show version information");
    println!();
    println!("Build options:");
    println!("  -o, --output <dir>     Write generated files below <dir>");
    println!("  --option key=value     Set a processor option (repeatable)");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=tessel_model=debug) for tracing output.");
}
