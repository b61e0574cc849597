//! Command-line driver: assembly tree (RON) in, URDF joint fragments out

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rk_joint::{AssemblyTree, ExportOptions, JointResolver, collect_joints};

/// Resolve CAD assembly joints and print URDF joint and transmission elements
#[derive(Parser)]
#[command(name = "rk-joint")]
#[command(version, long_about = None)]
struct Cli {
    /// Assembly tree exported from the CAD host (RON)
    #[arg(name = "INPUT")]
    input: PathBuf,

    /// Export options (RON); defaults are used when omitted
    #[arg(long)]
    options: Option<PathBuf>,

    /// Print the resolved joints as JSON instead of XML
    #[arg(long)]
    json: bool,

    /// Skip joints that fail to resolve instead of stopping
    #[arg(long)]
    keep_going: bool,
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rk_joint=info,rk_joint_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let options = match &cli.options {
        Some(path) => ExportOptions::load(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => ExportOptions::default(),
    };

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let tree: AssemblyTree = ron::from_str(&content)
        .with_context(|| format!("Failed to parse assembly tree {}", cli.input.display()))?;

    tracing::info!("Loaded assembly tree from {}", cli.input.display());

    let resolver = JointResolver::new(options.clone());
    let collection = collect_joints(&tree, &resolver);

    if !cli.keep_going {
        if let Some(err) = collection.errors().first() {
            bail!("{}", err);
        }
    }

    if cli.json {
        let mut map = serde_json::Map::new();
        for (name, joint) in collection.iter() {
            map.insert(name.to_string(), serde_json::to_value(joint)?);
        }
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        let mut urdf = String::new();
        collection.write_joints(&mut urdf, &options, 2);
        collection.write_transmissions(&mut urdf, &options, 2);
        print!("{}", urdf);
    }

    tracing::info!(
        "Exported {} joints, skipped {}",
        collection.len(),
        collection.errors().len()
    );
    Ok(())
}
