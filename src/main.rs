use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;

use sqlformatter::config::{IndentStyle, KeywordCase};
use sqlformatter::mode::Mode;

/// sqlformatter - format SQL with sqlformat, then normalize clauses and
/// indentation.
#[derive(Parser, Debug)]
#[command(name = "sqlformatter", version, about)]
struct Cli {
    /// Files or directories to format. Use "-" to read from stdin.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Blank lines between top-level statements.
    #[arg(long)]
    lines_between_queries: Option<u8>,

    /// Keyword case: upper, lower, preserve.
    #[arg(long)]
    keyword_case: Option<KeywordCase>,

    /// Indent style: standard, tabularLeft, tabularRight.
    #[arg(long)]
    indent_style: Option<IndentStyle>,

    /// SQL language: sql, postgresql, tsql.
    #[arg(long)]
    language: Option<String>,

    /// Check formatting without writing changes.
    #[arg(long)]
    check: bool,

    /// Show formatting diff.
    #[arg(long)]
    diff: bool,

    /// Watch the given paths and format SQL files when they are saved.
    #[arg(short, long, conflicts_with_all = ["check", "diff"])]
    watch: bool,

    /// Enable format-on-save regardless of the config file.
    #[arg(long)]
    format_on_save: bool,

    /// Glob patterns to exclude.
    #[arg(long)]
    exclude: Vec<String>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only).
    #[arg(short, long)]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progressbar: bool,

    /// Force color output.
    #[arg(long)]
    force_color: bool,

    /// Disable color output.
    #[arg(long)]
    no_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[arg(short = 't', long, default_value_t = 0)]
    threads: usize,

    /// Disable multi-threaded processing.
    #[arg(long)]
    single_process: bool,

    /// Path to config file (sqlformatter.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    sqlformatter::logging::init_tracing(sqlformatter::logging::level_for(
        cli.verbose,
        cli.quiet,
        cli.watch,
    ));

    let is_stdin = cli.files.len() == 1 && cli.files[0].to_string_lossy() == "-";

    let mut config = match sqlformatter::load_config(&cli.files, cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    if let Some(n) = cli.lines_between_queries {
        config.lines_between_queries = sqlformatter::config::lines_between_queries_or_default(n);
    }
    if let Some(case) = cli.keyword_case {
        config.keyword_case = case;
    }
    if let Some(style) = cli.indent_style {
        config.indent_style = style;
    }
    if let Some(language) = cli.language {
        config.language = language;
    }
    if cli.format_on_save {
        config.format_on_save = true;
    }
    if !cli.exclude.is_empty() {
        config.exclude = cli.exclude;
    }
    if let Err(e) = config.language() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(2);
    }

    let mode = Mode {
        config,
        check: cli.check,
        diff: cli.diff,
        verbose: cli.verbose,
        quiet: cli.quiet,
        no_progressbar: cli.no_progressbar,
        no_color: cli.no_color,
        force_color: cli.force_color,
        threads: cli.threads,
        single_process: cli.single_process,
    };

    if is_stdin {
        if cli.watch {
            eprintln!("Error: --watch needs files or directories, not stdin");
            std::process::exit(2);
        }

        let mut source = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading stdin: {}", e);
            std::process::exit(2);
        }

        let outcome = sqlformatter::format_document(&source, &mode.config);
        print!("{}", outcome.text);
        let _ = io::stdout().flush();
        if let Some(message) = outcome.user_message() {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    } else if cli.watch {
        if let Err(e) = sqlformatter::hook::watch(&cli.files, &mode) {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    } else {
        let report = sqlformatter::run(&cli.files, &mode);

        if !mode.quiet {
            print_verbose_results(&report, &mode);
            eprintln!("{}", report.summary());
        }

        report.print_errors();

        if report.has_errors() {
            std::process::exit(2);
        } else if mode.check && report.has_changes() {
            std::process::exit(1);
        }
    }
}

fn print_verbose_results(report: &sqlformatter::report::Report, mode: &Mode) {
    if !mode.verbose {
        return;
    }
    for result in &report.results {
        match result.status {
            sqlformatter::report::FileStatus::Changed => {
                eprintln!("reformatted {}", result.path.display());
            }
            sqlformatter::report::FileStatus::Unchanged => {
                eprintln!("unchanged {}", result.path.display());
            }
            // errors are printed by Report::print_errors
            sqlformatter::report::FileStatus::Error => {}
        }
    }
}
