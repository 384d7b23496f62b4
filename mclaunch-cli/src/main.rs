//! mclaunch CLI.

pub mod parse;
pub mod output;
pub mod cmd;

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

use parse::CliArgs;


/// Entry point.
fn main() -> ExitCode {

    let args = CliArgs::parse();

    // Library logs go to stderr, RUST_LOG takes precedence over the verbosity.
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2.. => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();

    cmd::main(&args)

}
