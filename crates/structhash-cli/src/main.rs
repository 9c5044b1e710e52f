//! structhash CLI: structural digests of JSON and YAML documents.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use sha2::Sha256;
use structhash_core::{Blake3Sink, DigestConfig, DigestSink, Hasher, MapOrder, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "structhash")]
#[command(about = "Deterministic structural digests of JSON and YAML documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the digest of a document
    Digest {
        #[command(flatten)]
        input: InputArgs,

        /// Hash algorithm
        #[arg(short, long, value_enum, default_value_t = Algo::Xxh64)]
        algo: Algo,

        /// Fail on values that cannot be hashed instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Maximum nesting depth (overrides config)
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Print the canonical byte stream of a document as hex
    Bytes {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(clap::Args)]
struct InputArgs {
    /// Path to the document, or '-' for stdin
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Document format (inferred from the file extension when omitted)
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Map ordering: 'sorted' or 'iteration' (overrides config)
    #[arg(long)]
    map_order: Option<MapOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn infer(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algo {
    Xxh64,
    Xxh128,
    Blake3,
    Sha256,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Digest {
            input,
            algo,
            strict,
            max_depth,
        } => {
            let mut config = apply_input_args(DigestConfig::from_env(), &input);
            if strict {
                config.strict = true;
            }
            if let Some(depth) = max_depth {
                config.max_depth = Some(depth);
            }
            match read_input(&input.input)
                .and_then(|text| digest_text(&text, input.resolved_format(), algo, &config))
            {
                Ok(hex) => println!("{hex}"),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Bytes { input } => {
            let config = apply_input_args(DigestConfig::from_env(), &input);
            match read_input(&input.input)
                .and_then(|text| canonical_hex(&text, input.resolved_format(), &config))
            {
                Ok(hex) => println!("{hex}"),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

impl InputArgs {
    fn resolved_format(&self) -> Format {
        self.format.unwrap_or_else(|| Format::infer(&self.input))
    }
}

fn apply_input_args(mut config: DigestConfig, input: &InputArgs) -> DigestConfig {
    if let Some(order) = input.map_order {
        config.map_order = order;
    }
    config
}

fn read_input(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn parse_document(
    text: &str,
    format: Format,
    config: &DigestConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let value = match format {
        Format::Json => {
            let doc: serde_json::Value = serde_json::from_str(text)?;
            structhash_serde::to_value_with(&doc, config)?
        }
        Format::Yaml => {
            let doc: serde_yaml::Value = serde_yaml::from_str(text)?;
            structhash_serde::to_value_with(&doc, config)?
        }
    };
    debug!(?format, kind = value.kind_name(), "parsed document");
    Ok(value)
}

fn digest_text(
    text: &str,
    format: Format,
    algo: Algo,
    config: &DigestConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let value = parse_document(text, format, config)?;
    let hasher = Hasher::new(config.clone());
    let hex = match algo {
        Algo::Xxh64 => hasher.digest64(&value)?.to_hex(),
        Algo::Xxh128 => hasher.digest128(&value)?.to_hex(),
        Algo::Blake3 => hex::encode(hasher.digest_with(&value, Blake3Sink::new())?),
        Algo::Sha256 => hex::encode(hasher.digest_with(&value, DigestSink::<Sha256>::new())?),
    };
    Ok(hex)
}

fn canonical_hex(
    text: &str,
    format: Format,
    config: &DigestConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let value = parse_document(text, format, config)?;
    let bytes = Hasher::new(config.clone()).canonical_bytes(&value)?;
    Ok(hex::encode(bytes))
}
