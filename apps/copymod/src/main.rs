use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use copymod_closure::{Config, SystemClipboard, deliver, print_summary};
use log::{debug, error};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "copymod")]
#[command(about = "Copy all imported project files recursively to the clipboard", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("Parsed CLI arguments: {:?}", cli.config);

    let start = Instant::now();
    let to_stdout = cli.config.stdout;

    let result = match copymod_closure::run_copy(cli.config) {
        Ok(result) => result,
        Err(e) => {
            error!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());
    let delivered = deliver(&result.rendered.output, &SystemClipboard, to_stdout, &mut stdout)?;
    stdout.flush()?;

    // The summary goes to stderr so it never mixes with content on stdout
    let mut stderr = BufWriter::new(std::io::stderr());
    print_summary(&mut stderr, &result, delivered)?;
    writeln!(
        stderr,
        "\n{} Finished in {}ms on {} files.",
        "●".bright_blue(),
        start.elapsed().as_millis().to_string().cyan(),
        result.closure.len().to_string().cyan()
    )?;
    stderr.flush()?;

    Ok(())
}
