use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use colored::Colorize;

/// Run a `.void` script.
#[derive(ClapParser, Debug)]
#[command(name = "void", version, about = "Interpreter for the Void scripting language")]
struct Cli {
    /// Path to the `.void` source file to run.
    file: PathBuf,
}

/// Directive that marks the end of runnable source; anything after it on the
/// file is ignored, so scratch notes can live at the bottom of a script.
const VOID_END: &str = "@VoidEnd;";

fn main() -> ExitCode {
    simple_logger::init_with_level(log::Level::Warn).expect("logger already initialized");

    let cli = Cli::parse();

    if cli.file.extension().and_then(|ext| ext.to_str()) != Some("void") {
        log::error!("'{}' is not a .void file", cli.file.display());
        return ExitCode::FAILURE;
    }

    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(e) => {
            log::error!("could not read '{}': {e}", cli.file.display());
            return ExitCode::FAILURE;
        }
    };

    let source = match source.find(VOID_END) {
        Some(idx) => &source[..idx + VOID_END.len()],
        None => &source,
    };

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let stdin = io::stdin();
    let mut stdin = stdin.lock();

    match void_lang::run_source(source, &mut stdout, &mut stdin) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            ExitCode::FAILURE
        }
    }
}
