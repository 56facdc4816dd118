// src/bin/mjc.rs

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{ColorChoice, CommandFactory, FromArgMatches};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::FormatTime;

use mjc::cli::{Cli, Commands};
use mjc::commands::build::build_file;
use mjc::commands::check::check_files;
use mjc::commands::inspect::inspect_file;
use mjc::commands::run::run_file;
use mjc::errors::set_color_mode;

/// A timer that outputs nothing but still enables span timing calculation
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(
        &self,
        _w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> std::fmt::Result {
        Ok(())
    }
}

fn main() -> ExitCode {
    // MJC_LOG_STYLE: "compact" (default) or "full" (with timestamps)
    if let Ok(filter) = EnvFilter::try_from_env("MJC_LOG") {
        let style = std::env::var("MJC_LOG_STYLE").unwrap_or_default();
        if style == "full" {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_writer(std::io::stderr)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_timer(NoTimestamp)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(std::io::stderr)
                .init();
        }
        tracing::debug!("tracing initialized");
    }

    // Pre-scan args so clap's own help output respects --color
    let color_choice = get_color_choice_from_args();

    let styles = Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default());

    let matches = Cli::command()
        .styles(styles)
        .color(color_choice)
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    set_color_mode(cli.color);

    match cli.command {
        Commands::Run {
            file,
            backend,
            main,
        } => run_file(&file, backend, main.as_deref(), cli.color),
        Commands::Check { files } => check_files(&files, cli.color),
        Commands::Build {
            file,
            output,
            dump,
            main,
        } => build_file(&file, &output, dump, main.as_deref(), cli.color),
        Commands::Inspect { inspect_type, file } => inspect_file(&file, inspect_type, cli.color),
    }
}

fn get_color_choice_from_args() -> ColorChoice {
    let args: Vec<String> = std::env::args().collect();

    for (i, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix("--color=") {
            return parse_color_choice(value);
        }
        if arg == "--color"
            && let Some(value) = args.get(i + 1)
        {
            return parse_color_choice(value);
        }
    }

    if is_stdout_tty() {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    }
}

fn parse_color_choice(value: &str) -> ColorChoice {
    match value.to_lowercase().as_str() {
        "always" => ColorChoice::Always,
        "never" => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn is_stdout_tty() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}
