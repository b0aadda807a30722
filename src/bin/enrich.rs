use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solana_account_enricher::{
    strip, AddressMatcher, EnrichConfig, Enricher, HttpMetadataSource, MetadataSource,
    RpcAccountResolver, StaticMetadata, Value,
};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Annotate addresses in decoded account trees",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace addresses with token and label annotations
    Enrich {
        /// Path to a JSON file containing a decoded account tree
        #[arg(long)]
        file: PathBuf,
        /// JSON object mapping addresses to labels
        #[arg(long)]
        labels: Option<PathBuf>,
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// RPC endpoint URL (overrides the configuration)
        #[arg(long, env = "SOLANA_RPC_URL")]
        rpc_url: Option<String>,
        /// Token metadata endpoint (overrides the configuration)
        #[arg(long, env = "TOKEN_METADATA_URL")]
        metadata_url: Option<String>,
    },
    /// Turn annotations back into bare addresses
    Strip {
        #[arg(long)]
        file: PathBuf,
    },
    /// List the address-shaped strings of a tree
    Addresses {
        #[arg(long)]
        file: PathBuf,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(file: &PathBuf) -> Result<T> {
    let data = fs::read(file).with_context(|| format!("failed to read {:?}", file))?;
    serde_json::from_slice(&data).with_context(|| format!("failed to parse JSON in {:?}", file))
}

fn load_config(path: Option<&PathBuf>) -> Result<EnrichConfig> {
    match path {
        Some(path) => read_json(path),
        None => Ok(EnrichConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Enrich {
            file,
            labels,
            config,
            rpc_url,
            metadata_url,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(rpc_url) = rpc_url {
                config.rpc_url = rpc_url;
            }
            if metadata_url.is_some() {
                config.metadata_url = metadata_url;
            }

            let tree: Value = read_json(&file)?;
            let resolver = RpcAccountResolver::from_config(&config)?;
            let metadata: Arc<dyn MetadataSource> = match HttpMetadataSource::from_config(&config)?
            {
                Some(source) => Arc::new(source),
                None => {
                    tracing::info!("no metadata endpoint configured, tokens will show as Unknown");
                    Arc::new(StaticMetadata::default())
                }
            };

            let mut enricher = Enricher::new(&config, Arc::new(resolver), metadata)?;
            if let Some(labels) = labels {
                let labels: HashMap<String, String> = read_json(&labels)?;
                enricher = enricher.with_labels(Arc::new(labels));
            }

            let enriched = enricher.enrich(&tree).await;
            println!("{}", serde_json::to_string_pretty(&enriched)?);
        }
        Commands::Strip { file } => {
            let tree: Value = read_json(&file)?;
            println!("{}", serde_json::to_string_pretty(&strip(&tree))?);
        }
        Commands::Addresses { file } => {
            let config = EnrichConfig::default();
            let tree: Value = read_json(&file)?;
            let matcher = AddressMatcher::new(&config.address_pattern)?;
            for address in matcher.extract(&tree) {
                println!("{address}");
            }
        }
    }

    Ok(())
}
