#![forbid(unsafe_code)]

use std::io::IsTerminal;
use std::process::exit;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{ArgAction, ArgGroup, Parser, ValueHint};
use ls8_emulator::{load, Machine};
use tracing::{debug, error, info};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[clap(version, about, group = ArgGroup::new("format"))]
struct Opt {
    /// Program file to run
    #[clap(value_parser, value_hint = ValueHint::FilePath)]
    input: Utf8PathBuf,

    /// Increase the level of verbosity. Can be used multiple times.
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Force colored output. Default is to check if the output is a tty
    #[clap(short = 'c', long, group = "format")]
    color: bool,

    /// Force non-colored output. Default is to check if the output is a tty
    #[clap(short = 'C', long, group = "format")]
    no_color: bool,

    /// Use JSON output for log messages
    #[clap(short, long, group = "format")]
    json: bool,
}

impl Opt {
    const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "ls8_emulator=debug,ls8_cli=debug,info",
            2 => "ls8_emulator=trace,ls8_cli=trace,info",
            3 => "ls8_emulator=trace,ls8_cli=trace,debug",
            4..=u8::MAX => "trace",
        }
    }

    fn should_use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            std::io::stdout().is_terminal()
        }
    }

    fn filter_layer(&self) -> EnvFilter {
        // Parse log level from env
        EnvFilter::try_from_default_env()
            // or infer from args
            .or_else(|_| EnvFilter::try_new(self.log_filter()))
            .unwrap()
    }
}

fn run(opt: &Opt) -> anyhow::Result<()> {
    info!(path = %opt.input, "Reading program");
    let source = std::fs::read_to_string(&opt.input)
        .with_context(|| format!("could not read program file {}", opt.input))?;

    let mut machine = Machine::new();
    let loaded = load(&source, &mut machine)?;
    debug!(bytes = loaded, "Machine ready");

    info!("Running program");
    machine.run()?;

    info!(registers = %machine.registers, cycles = machine.cycles(), "End of program");
    Ok(())
}

fn main() {
    // First, parse the arguments
    let opt = Opt::parse();

    // Then, setup the tracing formatter for logging and instrumentation
    let registry = tracing_subscriber::Registry::default().with(opt.filter_layer());

    if opt.json {
        let json_layer = tracing_subscriber::fmt::layer().json();
        registry.with(json_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .without_time()
            .with_ansi(opt.should_use_colors())
            .with_target(false);
        registry.with(fmt_layer).init();
    }

    // And run the machine
    if let Err(e) = run(&opt) {
        error!("{e:#}");
        exit(1);
    }
}
