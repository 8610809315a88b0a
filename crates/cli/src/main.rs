//! `tidi-node` CLI entry-point.
//!
//! Available sub-commands:
//! - `describe`: print the node or credential description as JSON.
//! - `run`: run the Tidi node over the items of a JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine::{ExecutorConfig, NodeExecutor};
use nodes::tidi::{TidiApiCredentials, CREDENTIAL_NAME, DEFAULT_BASE_URL};
use nodes::{ExecutionContext, ItemContext, TidiConfig, TidiNode};

#[derive(Parser)]
#[command(
    name = "tidi-node",
    about = "Tidi scheduling API node for workflow automation",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Described {
    Node,
    Credentials,
}

#[derive(Subcommand)]
enum Command {
    /// Print the node or credential description as JSON.
    Describe {
        #[arg(value_enum, default_value = "node")]
        what: Described,
    },
    /// Run the node over the items in a JSON file (an array of parameter
    /// objects) and print the result records.
    Run {
        /// Path to the items JSON file, `-` for stdin.
        items: PathBuf,
        #[arg(long, env = "TIDI_API_KEY", hide_env_values = true)]
        api_key: String,
        #[arg(long, env = "TIDI_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,
        #[arg(long, env = "TIDI_TIMEOUT_SECS", default_value_t = 30)]
        timeout_secs: u64,
        /// Record failed items instead of stopping at the first failure.
        #[arg(long)]
        continue_on_fail: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Describe { what } => {
            let description = match what {
                Described::Node => serde_json::to_value(TidiNode::description())?,
                Described::Credentials => serde_json::to_value(TidiApiCredentials::description())?,
            };
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        Command::Run {
            items,
            api_key,
            base_url,
            timeout_secs,
            continue_on_fail,
        } => {
            let items = read_items(&items)?;
            let config = TidiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            };
            info!("Running {} item(s) against {}", items.len(), config.base_url);

            let node = TidiNode::new(config)?;
            let ctx = ExecutionContext::new(uuid::Uuid::new_v4())
                .with_credentials(CREDENTIAL_NAME, json!({ "apiKey": api_key }));
            let executor = NodeExecutor::new(ExecutorConfig {
                continue_on_failure: continue_on_fail,
            });

            let records = executor.run(&node, &items, &ctx).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

fn read_items(path: &Path) -> Result<Vec<ItemContext>> {
    let content = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("cannot read items from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("cannot read file {}", path.display()))?
    };

    let values = match serde_json::from_str::<Value>(&content).context("invalid JSON")? {
        Value::Array(values) => values,
        obj @ Value::Object(_) => vec![obj],
        other => bail!("expected an array of items, got {other}"),
    };
    Ok(ItemContext::from_json_array(values)?)
}
