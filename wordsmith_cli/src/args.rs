// Command-line argument parsing for `wordsmith`.
//
// Usage:
//   wordsmith [-v] [-d] [-i] [-r] [-s] [--seed N] [--json] <input> <output> [count]
//     -v        echo output lines to the terminal, log at info level
//     -d        dictionary mode: rewrite the `-dict` words instead of generating
//     -i        show `input → output` (dictionary mode only)
//     -r        show the rules that changed each word in `[...]`
//     -s        syllabify and mark stress
//     --seed N  generation seed (default: derived from the clock)
//     --json    write the full run report as JSON instead of text
//
// Short flags combine (`-dri`). Generation mode needs a positive word count;
// dictionary mode takes none. Plain `std::env::args()` matching, no clap.

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub verbose: bool,
    pub dictionary: bool,
    pub show_input: bool,
    pub show_rules: bool,
    pub syllabify: bool,
    pub json: bool,
    pub seed: Option<u64>,
    pub input: String,
    pub output: String,
    /// Number of words to generate; `None` in dictionary mode.
    pub count: Option<usize>,
}

pub const USAGE: &str =
    "usage: wordsmith [-v] [-d] [-i] [-r] [-s] [--seed N] [--json] <input> <output> [count]";

/// Parse arguments, excluding the program name.
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut positional: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--seed" => {
                i += 1;
                let seed = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .ok_or("--seed requires a non-negative integer")?;
                parsed.seed = Some(seed);
            }
            "--json" => parsed.json = true,
            long if long.starts_with("--") => return Err(format!("unknown flag: {long}")),
            short if short.starts_with('-') && short.len() > 1 => {
                for flag in short.chars().skip(1) {
                    match flag {
                        'v' => parsed.verbose = true,
                        'd' => parsed.dictionary = true,
                        'i' => parsed.show_input = true,
                        'r' => parsed.show_rules = true,
                        's' => parsed.syllabify = true,
                        other => return Err(format!("unknown flag: -{other}")),
                    }
                }
            }
            value => positional.push(value),
        }
        i += 1;
    }

    if parsed.show_input && !parsed.dictionary {
        return Err("-i can only be used with -d".to_string());
    }

    match (parsed.dictionary, positional.as_slice()) {
        (true, [input, output]) => {
            parsed.input = input.to_string();
            parsed.output = output.to_string();
        }
        (true, _) => return Err("dictionary mode takes <input> <output>".to_string()),
        (false, [input, output, count]) => {
            let count: usize = count
                .parse()
                .ok()
                .filter(|&n| n > 0)
                .ok_or("number of words must be a positive integer")?;
            parsed.input = input.to_string();
            parsed.output = output.to_string();
            parsed.count = Some(count);
        }
        (false, _) => return Err(USAGE.to_string()),
    }
    Ok(parsed)
}
