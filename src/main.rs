//! dev-memory —— 项目决策记忆的命令行入口
//!
//! ```bash
//! dev-memory store architecture "Use iterative factorial" --tags factorial,performance
//! dev-memory retrieve factorial --limit 5
//! dev-memory recall factorial
//! dev-memory call store_decision '{"category":"library","content":"serde"}'
//! ```

use clap::{Parser, Subcommand};
use dev_memory::config::Config;
use dev_memory::error::{Result, ToolError};
use dev_memory::memory::{DecisionStore, RetrieveOptions, StoreOptions};
use dev_memory::tools::builtin::memory::parse_tags;
use dev_memory::tools::{ToolManager, ToolParameters};
use std::path::PathBuf;
use tracing::info;

/// Persistent decision memory for the development agent pipeline
#[derive(Parser, Debug)]
#[command(name = "dev-memory", version, about)]
struct Args {
    /// YAML config file; environment variables (and .env) are used when omitted
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the decision store file
    #[arg(long, global = true)]
    memory_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a decision and print its id
    Store {
        category: String,
        content: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Print matching records as JSON
    Retrieve {
        query: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = dev_memory::memory::DEFAULT_RETRIEVE_LIMIT)]
        limit: usize,
    },
    /// Print matching records the way the retrieve_decisions tool does
    Recall {
        query: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Print all tool definitions as JSON
    Tools,
    /// Invoke a tool by name with a JSON object of arguments
    Call {
        tool: String,
        #[arg(default_value = "{}")]
        args: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dev_memory=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };
    if let Some(file) = args.memory_file {
        config.memory_file = file;
    }
    info!(root = %config.project_root.display(), store = %config.memory_path().display(), "配置已加载");

    let store = DecisionStore::new(config.memory_path());
    match args.command {
        Command::Store {
            category,
            content,
            tags,
        } => {
            let id = store.store(
                &category,
                &content,
                StoreOptions::default().tags(parse_tags(&tags)),
            )?;
            println!("{id}");
        }
        Command::Retrieve {
            query,
            category,
            limit,
        } => {
            let mut options = RetrieveOptions::default().limit(limit);
            options.category = category;
            let hits = store.retrieve(&query, &options);
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Command::Recall { query, category } => {
            let mut params = ToolParameters::new();
            params.insert("query".into(), query.into());
            if let Some(category) = category {
                params.insert("category".into(), category.into());
            }
            run_tool(&config, "retrieve_decisions", params).await?;
        }
        Command::Tools => {
            let manager = ToolManager::from_config(&config);
            let defs = manager.get_tool_definitions();
            println!("{}", serde_json::to_string_pretty(&defs)?);
        }
        Command::Call { tool, args } => {
            let params: ToolParameters =
                serde_json::from_str(&args).map_err(|e| ToolError::InvalidParameter {
                    name: "args".to_string(),
                    message: e.to_string(),
                })?;
            run_tool(&config, &tool, params).await?;
        }
    }
    Ok(())
}

async fn run_tool(config: &Config, name: &str, params: ToolParameters) -> Result<()> {
    let manager = ToolManager::from_config(config);
    let result = manager.execute_tool(name, params).await?;
    match result.error {
        Some(error) => eprintln!("{error}"),
        None => println!("{}", result.output),
    }
    Ok(())
}
