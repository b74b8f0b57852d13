//! modpipe - Modular Pipeline Inspector
//!
//! Loads a pipeline file, applies its modular layers and prints the
//! resulting execution order, or a JSON snapshot with `--json`.
//!
//! ```text
//! modpipe <pipeline-file> [--json]
//! ```

use anyhow::{bail, Context};
use modpipe_rs::config::PipelineFile;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct Args {
    path: PathBuf,
    json: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Self> {
        let mut path = None;
        let mut json = false;

        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--json" => json = true,
                "-h" | "--help" => {
                    println!("Usage: modpipe <pipeline-file> [--json]");
                    std::process::exit(0);
                }
                flag if flag.starts_with('-') => bail!("Unknown option: {}", flag),
                _ if path.is_some() => bail!("Only one pipeline file can be given"),
                _ => path = Some(PathBuf::from(&arg)),
            }
        }

        let Some(path) = path else {
            bail!("Usage: modpipe <pipeline-file> [--json]");
        };
        Ok(Self { path, json })
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout is reserved for the pipeline output
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,modpipe_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse()?;
    tracing::info!("Loading pipeline from {:?}", args.path);

    let file = PipelineFile::load(&args.path)
        .with_context(|| format!("Could not load {}", args.path.display()))?;
    let pipeline = file
        .build_namespaced()
        .with_context(|| format!("Could not build pipeline '{}'", file.name))?;

    tracing::info!(
        "Built pipeline '{}' with {} nodes after {} modular layers",
        file.name,
        pipeline.len(),
        file.modular.len()
    );

    if args.json {
        let snapshot = serde_json::to_string_pretty(&pipeline.snapshot())
            .context("Failed to serialize pipeline snapshot")?;
        println!("{}", snapshot);
    } else {
        println!("{}", pipeline.describe());
    }

    Ok(())
}
