use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sqlreindent::mode::Mode;
use sqlreindent::report::{self, FileStatus, Report};

/// sqlreindent - Reindent SQL files and SQL embedded in Go sources.
#[derive(Parser, Debug)]
#[command(name = "sqlreindent", version, about)]
struct Cli {
    /// Files or directories to format. Use "-" to read SQL from stdin.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Write results back to the files.
    #[arg(short = 'w', long)]
    write: bool,

    /// Show formatting diff.
    #[arg(short = 'd', long)]
    diff: bool,

    /// List files whose formatting would change.
    #[arg(short = 'l', long)]
    list: bool,

    /// Exit with status 1 if any file would change.
    #[arg(long)]
    check: bool,

    /// One level of indentation.
    #[arg(long)]
    indent: Option<String>,

    /// Prefix written at the start of every output line.
    #[arg(long)]
    padding: Option<String>,

    /// Go method whose raw-string SQL argument is reindented (repeatable).
    #[arg(long = "method")]
    methods: Vec<String>,

    /// Glob patterns to exclude.
    #[arg(long)]
    exclude: Vec<String>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only).
    #[arg(short, long)]
    quiet: bool,

    /// Disable color output.
    #[arg(long)]
    no_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[arg(short = 't', long, default_value_t = 0)]
    threads: usize,

    /// Disable multi-threaded processing.
    #[arg(long)]
    single_process: bool,

    /// Path to a sqlreindent.toml config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run_cli(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_cli(cli: Cli) -> anyhow::Result<i32> {
    let is_stdin = cli.files.len() == 1 && cli.files[0].to_string_lossy() == "-";

    let base_mode = sqlreindent::load_config(&cli.files, cli.config.as_deref())
        .context("Configuration error")?;
    let files = cli.files.clone();
    let mode = merge_flags(base_mode, cli);

    if is_stdin {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Error reading stdin")?;
        let formatted = sqlreindent::format_document(&source, &mode.options)?;
        print!("{}", formatted);
        return Ok(0);
    }

    let report = sqlreindent::run(&files, &mode);
    emit_results(&report, &mode)?;

    if !mode.quiet {
        print_verbose_results(&report, &mode);
        eprintln!("{}", report.summary());
    }

    report.print_errors();

    if report.has_errors() {
        Ok(2)
    } else if mode.check && report.has_changes() {
        Ok(1)
    } else {
        Ok(0)
    }
}

/// Command-line flags override values from the config file.
fn merge_flags(base: Mode, cli: Cli) -> Mode {
    let mut options = base.options;
    if let Some(indent) = cli.indent {
        options.indent = indent;
    }
    if let Some(padding) = cli.padding {
        options.padding = padding;
    }

    Mode {
        options,
        write: cli.write,
        diff: cli.diff,
        list: cli.list,
        check: cli.check,
        exclude: if cli.exclude.is_empty() {
            base.exclude
        } else {
            cli.exclude
        },
        methods: if cli.methods.is_empty() {
            base.methods
        } else {
            cli.methods
        },
        threads: cli.threads,
        single_process: cli.single_process,
        verbose: cli.verbose,
        quiet: cli.quiet,
        no_color: cli.no_color,
    }
}

/// Print per-file output in path order: formatted text, diffs or names.
fn emit_results(report: &Report, mode: &Mode) -> anyhow::Result<()> {
    if mode.list {
        for path in report.changed_paths() {
            println!("{}", path.display());
        }
    }
    for result in &report.results {
        if let Some(ref diff) = result.diff {
            report::print_diff(diff, mode.color()).context("Error writing diff")?;
        }
        if let Some(ref output) = result.output {
            print!("{}", output);
        }
    }
    Ok(())
}

fn print_verbose_results(report: &Report, mode: &Mode) {
    if !mode.verbose {
        return;
    }
    for result in &report.results {
        if result.status == FileStatus::Changed {
            eprintln!("reformatted {}", result.path.display());
        }
    }
}
