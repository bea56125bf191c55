use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use rewriter::NativeFunction;
use rewriter::config::Configuration;
use tracing_subscriber::EnvFilter;

/// Inject a label into every aggregation and `on (...)` matching of PromQL expressions
#[derive(Parser, Debug)]
#[command(name = "labelinject", version, about)]
pub struct Cli {
    /// Label to inject, defaults to `inject.label` from the configuration
    #[arg(short, long, env = "LABELINJECT_LABEL")]
    label: Option<String>,

    #[arg(long, help = "Configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(short, long, help = "Enable quiet mode (minimal output)")]
    quiet: bool,

    #[arg(long, help = "List the exposed native functions and exit")]
    list_functions: bool,

    /// Expressions to rewrite; read from stdin, one per line, when omitted
    expressions: Vec<String>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);
        let config = load_config(self.config.as_ref())?;

        let stdout = io::stdout();
        let mut out = stdout.lock();

        if self.list_functions {
            let func = NativeFunction::with_name(config.inject.function_name);
            writeln!(out, "- {func}")?;
            return Ok(());
        }

        let label = self
            .label
            .or(config.inject.label)
            .context("no label given: pass --label or set inject.label in the configuration")?;

        if self.expressions.is_empty() {
            rewrite_lines(io::stdin().lock(), &mut out, &label)
        } else {
            for expr in &self.expressions {
                let rewritten = rewriter::label_inject(expr, &label)
                    .with_context(|| format!("failed to rewrite '{expr}'"))?;
                writeln!(out, "{rewritten}")?;
            }
            Ok(())
        }
    }
}

/// Rewrite one expression per input line, skipping blank lines
pub fn rewrite_lines<R: BufRead, W: Write>(input: R, output: &mut W, label: &str) -> Result<()> {
    for (idx, line) in input.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let expr = line.trim();
        if expr.is_empty() {
            continue;
        }
        let rewritten = rewriter::label_inject(expr, label)
            .with_context(|| format!("failed to rewrite line {}", idx + 1))?;
        writeln!(output, "{rewritten}")?;
    }
    Ok(())
}

/// Initialize logging based on CLI arguments; `RUST_LOG` takes precedence
fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load configuration with optional override from CLI
fn load_config(config_path: Option<&PathBuf>) -> Result<Configuration> {
    match config_path {
        Some(path) => {
            ensure!(path.exists(), "configuration file {} does not exist", path.display());
            tracing::info!("Loading configuration from: {}", path.display());
            Configuration::load_from_path(path).context("Failed to load configuration")
        }
        None => Configuration::load().context("Failed to load configuration"),
    }
}
