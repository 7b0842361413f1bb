//! Draftsman CLI - render diagrams as code

mod cli;
mod colorizer;

use clap::Parser;

fn main() {
    // Logging is initialised inside `run` once the flags are known
    let cli_args = cli::Cli::parse();

    let mut app = cli::DraftsmanApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
