// CLI entry point for wordsmith.
//
// Reads a language file, compiles it, and either generates words from its
// templates or rewrites its `-dict` words through the sound changes. Results
// go to the output file as text (see `format.rs`) or, with `--json`, as the
// full run report. See `args.rs` for the flags.
//
// Any fatal error in the language file is reported as `error: line N: ...`
// and the process exits with status 1 before the output file is touched.
// Recoverable warnings are logged to stderr through `tracing`.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;
use wordsmith_cli::args::{CliArgs, parse_args};
use wordsmith_cli::format::{FormatOptions, format_results};
use wordsmith_lang::{Config, Engine, RunOptions, RunReport};

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&argv).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });

    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr at `warn` (or `info` with `-v`), overridable by `RUST_LOG`.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &CliArgs) -> Result<(), String> {
    let text = std::fs::read_to_string(&args.input)
        .map_err(|e| format!("cannot read '{}': {e}", args.input))?;
    let config = Config::from_source(&text).map_err(|e| e.to_string())?;

    if args.syllabify && config.syllables().is_none() {
        tracing::warn!("-s given but the language has no -syll block; words stay unsyllabified");
    }

    let options = RunOptions {
        syllabify: args.syllabify,
        seed: Some(args.seed.unwrap_or_else(clock_seed)),
    };
    let engine = Engine::new(config, options);

    let report = match args.count {
        Some(count) => engine.run_generated(count).map_err(|e| e.to_string())?,
        None => engine.run_dictionary(),
    };

    let contents = if args.json {
        serde_json::to_string_pretty(&report).map_err(|e| e.to_string())? + "\n"
    } else {
        render_text(&report, args)
    };
    std::fs::write(&args.output, contents).map_err(|e| format!("cannot write '{}': {e}", args.output))?;

    let verb = if args.dictionary { "Processed" } else { "Generated" };
    println!("{verb} {} words and saved to '{}'", report.results.len(), args.output);
    Ok(())
}

fn render_text(report: &RunReport, args: &CliArgs) -> String {
    let lines = format_results(
        &report.results,
        FormatOptions {
            show_input: args.show_input,
            show_rules: args.show_rules,
            syllables: args.syllabify,
        },
    );
    let mut out = String::new();
    for line in &lines {
        if args.verbose {
            println!("{line}");
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// A seed for runs without `--seed`.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
