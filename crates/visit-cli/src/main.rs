//! Visit tracker CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;
use tracing::warn;

use visit_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use visit_cli::commands::{
    install_interrupt_handler, run_collection, run_instruments, run_missing, run_participants,
};
use visit_cli::config::AppConfig;
use visit_cli::logging::{LogConfig, LogFormat, init_logging};
use visit_cli::summary::{
    print_collection, print_instruments, print_missing, print_participants,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    if let Err(error) = install_interrupt_handler() {
        warn!("Ctrl-C will not stop live fetches: {error:#}");
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    match &cli.command {
        Command::Missing(args) => print_missing(&run_missing(args, &config)?),
        Command::Participants(args) => print_participants(&run_participants(args, &config)?),
        Command::Collection(args) => print_collection(&run_collection(args, &config)?),
        Command::Instruments => print_instruments(&run_instruments(&config)?),
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
