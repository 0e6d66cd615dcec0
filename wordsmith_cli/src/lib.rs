// wordsmith_cli: the `wordsmith` binary's argument parsing and output
// formatting, split out of `main.rs` so both can be unit tested.
//
// - `args.rs`:   `CliArgs` and the hand-rolled flag parser.
// - `format.rs`: plain / `input → output` / `[rule; rule]` line rendering.
//
// Everything that touches words lives in `wordsmith_lang`; this crate only
// reads files, writes files, and prints.

pub mod args;
pub mod format;
