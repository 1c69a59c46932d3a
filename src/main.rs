//! scriptlet CLI entrypoint
//! Parses command-line arguments and renders or checks template files.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use std::io::Write;
use std::path::{Path, PathBuf};

use scriptlet::core::data::{DataFormat, load_context};
use scriptlet::{Compile, Compiler, Instruction, Template};

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use serde_json::Value as JsonValue;
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scriptlet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Render a template file against a data context
    Render {
        /// Path to the template file
        template: PathBuf,
        /// Data context file (JSON, YAML, or TOML)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Data format; inferred from the data file extension when omitted
        #[arg(long)]
        format: Option<DataFormat>,
        /// Write output here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compile a template file and report syntax errors
    Check {
        /// Path to the template file
        template: PathBuf,
    },
    /// Print the instruction sequence scanned from a template file
    Instructions {
        /// Path to the template file
        template: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so rendered output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Render {
            template,
            data,
            format,
            output,
        } => run_render(template, data.as_deref(), *format, output.as_deref()),
        Commands::Check { template } => run_check(template),
        Commands::Instructions { template } => run_instructions(template),
    }
}

fn read_template(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))
}

/// Runtime handler for the render command
fn run_render(
    template_path: &Path,
    data_path: Option<&Path>,
    format: Option<DataFormat>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let template = Template::new(read_template(template_path)?);

    let data = match data_path {
        Some(path) => load_context(path, format)
            .with_context(|| format!("Failed to load data context {}", path.display()))?,
        None => JsonValue::Null,
    };

    let rendered = template
        .render(&data)
        .with_context(|| format!("Failed to render {}", template_path.display()))?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output {}", path.display()))?;
            info!("Wrote {} bytes to {}", rendered.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write rendered output")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(())
}

/// Runtime handler for the check command
fn run_check(template_path: &Path) -> anyhow::Result<()> {
    let source = read_template(template_path)?;
    Compiler::new()
        .compile(&source)
        .with_context(|| format!("{} does not compile", template_path.display()))?;
    debug!("Template {} compiled", template_path.display());
    println!("✅ {} compiles", template_path.display());
    Ok(())
}

/// Runtime handler for the instructions command
fn run_instructions(template_path: &Path) -> anyhow::Result<()> {
    let source = read_template(template_path)?;
    for instruction in Compiler::new().scan(&source) {
        let kind = match &instruction {
            Instruction::Literal(_) => "literal",
            Instruction::Expression(_) => "expression",
            Instruction::Statement(_) => "statement",
        };
        println!("{kind:<10} {:?}", instruction.text());
    }
    Ok(())
}
