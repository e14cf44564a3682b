use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use godoc_extract::api::{self, OutputFormat};

#[derive(Parser)]
#[command(name = "godoc-extract")]
#[command(about = "Extracts a structured documentation model from a Go module")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Extract the module enclosing the current directory
    godoc-extract

    # Extract a checkout as YAML
    godoc-extract ./mymodule --format yaml

    # Restrict extraction to two packages and write to a file
    godoc-extract --only example.com/mod/a --only example.com/mod/b --output doc.json
"#)]
pub struct Cli {
    /// Directory inside the Go module to document
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format (json or yaml)
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Write the encoded model to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Restrict extraction to these import paths (repeatable)
    #[arg(long = "only", value_name = "IMPORT_PATH")]
    pub only: Vec<String>,
}

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let format = OutputFormat::from_name(&cli.format)
        .ok_or_else(|| anyhow::anyhow!("unknown format: {}", cli.format))?;

    let module = godoc_extract::extract(&cli.path, &cli.only)?;
    let encoded = api::encode(&module, format)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &encoded)?;
            info!(path = %path.display(), bytes = encoded.len(), "wrote documentation model");
        }
        None => {
            std::io::stdout().write_all(&encoded)?;
        }
    }

    Ok(())
}
