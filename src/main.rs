use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use slack_wiki_tools::config::load_settings;
use slack_wiki_tools::tools::{ToolContext, default_registry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slack-wiki-tools", version, about = "Slack and Confluence tools for LLM agents")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the definitions of every registered tool as JSON
    Tools,
    /// Run a single tool and print its JSON result
    Call {
        /// Tool name, e.g. get_slack_channels
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("slack_wiki_tools=info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
    let registry = default_registry();

    match cli.command {
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
        }
        Command::Call { name, args } => {
            let args: Value =
                serde_json::from_str(&args).context("--args must be a JSON value")?;

            let settings = load_settings()?;
            tracing::info!(
                slack = settings.slack.is_some(),
                confluence = settings.confluence.is_some(),
                "Configuration loaded"
            );

            let ctx = ToolContext::from_settings(&settings)?;
            let result = registry.execute(&name, args, &ctx).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if let Ok(slack) = ctx.slack() {
                slack.names().log_stats().await;
            }
        }
    }

    Ok(())
}
