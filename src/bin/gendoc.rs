//! KCL Doc Generator CLI
//!
//! Generates schema documentation for a KCL package and verifies
//! previously generated trees.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kcl_gendoc::{verify_target, DocConfig, Format, TargetPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kcl-gendoc")]
#[command(about = "Generate documentation for KCL package schemas")]
#[command(version)]
struct Cli {
    /// Config file (defaults to kcldoc.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    /// Package to document
    #[arg(short, long)]
    package: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Skip deprecated schemas and attributes
    #[arg(long)]
    ignore_deprecated: bool,

    /// Escape HTML in Markdown descriptions
    #[arg(long)]
    escape_html: bool,

    /// Replace the target even if it was not generated by this tool
    #[arg(long)]
    force: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a generated tree against its manifest
    Verify {
        /// Generated documentation directory
        dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Commands::Verify { dir }) = &cli.command {
        let report = verify_target(dir)
            .with_context(|| format!("verifying {}", dir.display()))?;
        for path in &report.modified {
            println!("modified: {}", path);
        }
        for path in &report.missing {
            println!("missing:  {}", path);
        }
        if !report.is_clean() {
            anyhow::bail!("{} does not match its manifest", dir.display());
        }
        println!("✅ {} matches its manifest", dir.display());
        return Ok(());
    }

    let config = DocConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    let mut ctx = config.gen_context();
    if let Some(package) = cli.package {
        ctx.package_path = package;
    }
    if let Some(target) = cli.target {
        ctx.target = target;
    }
    if let Some(format) = cli.format {
        ctx.format = format;
    }
    ctx.ignore_deprecated |= cli.ignore_deprecated;
    ctx.escape_html |= cli.escape_html;
    if cli.force {
        ctx.target_policy = TargetPolicy::Force;
    }

    let summary = ctx.gen_doc().with_context(|| {
        format!(
            "generating documentation for {}; discard {} before retrying",
            ctx.package_path.display(),
            ctx.target.display()
        )
    })?;

    println!(
        "📦 {} schemas, {} re-export references, {} deprecated skipped -> {}",
        summary.schemas,
        summary.references,
        summary.skipped_deprecated,
        ctx.target.display()
    );
    Ok(())
}
