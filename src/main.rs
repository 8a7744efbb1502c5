use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rag_ops::cron::grammar;
use rag_ops::{
    AwsCronValidator, Config, CronField, DocumentKey, DocumentStore, Error, FileDocumentStore,
    ProcessBatchRunner, Result, ScriptedBatchRunner, WorkflowExecutor, WorkflowKind,
};

#[derive(Parser)]
#[command(name = "rag-ops", about = "EventBridge cron validation and ingestion workflows")]
struct Cli {
    /// Configuration file
    #[arg(long, short, global = true, default_value = "bin/config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an EventBridge cron expression
    ValidateCron {
        /// Six fields, optionally wrapped in cron(...)
        expression: String,
    },
    /// Print the regular expression of every cron field
    Patterns,
    /// Resolve the SageMaker start/stop schedule from the config
    Schedule,
    /// Print the Amazon States Language definition of a workflow
    Render {
        /// file-import or website-crawl
        kind: WorkflowKind,
    },
    /// Execute a workflow locally
    Run {
        /// file-import or website-crawl
        kind: WorkflowKind,
        /// Execution input as a JSON object
        #[arg(long)]
        input: String,
        /// Document store file (defaults to the config's storePath)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Shell command standing in for the batch job; omit for a dry run
        #[arg(long)]
        command: Option<String>,
    },
    /// Show document statuses from the local store
    Status {
        workspace_id: String,
        /// Show a single document instead of the whole workspace
        document_id: Option<String>,
        /// Document store file (defaults to the config's storePath)
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

/// Config is optional for commands that do not need it
fn load_config(path: &Path, required: bool) -> Result<Config> {
    if !required && !path.exists() {
        return Ok(Config::default());
    }
    let config = Config::load(path)?;
    if required {
        config.validate(Utc::now().date_naive())?;
    }
    Ok(config)
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::ValidateCron { expression } => {
            let expr = AwsCronValidator::validate(&expression)?;
            println!("{}", expr.schedule_expression());
        }
        Commands::Patterns => {
            for field in CronField::ALL {
                println!("{:<13} {}", field, grammar::pattern_for(field));
            }
        }
        Commands::Schedule => {
            let config = load_config(&cli.config, true)?;
            match config.sagemaker_schedule(Utc::now().date_naive())? {
                Some(schedule) => println!("{}", serde_json::to_string_pretty(&schedule)?),
                None => println!("SageMaker schedule is not enabled"),
            }
        }
        Commands::Render { kind } => {
            let config = load_config(&cli.config, true)?;
            let definition = config.workflow_definition(kind)?;
            println!("{}", serde_json::to_string_pretty(&definition.to_asl())?);
        }
        Commands::Run {
            kind,
            input,
            store,
            command,
        } => {
            let config = load_config(&cli.config, true)?;
            let definition = config.workflow_definition(kind)?;
            let input: serde_json::Value = serde_json::from_str(&input)?;

            let store = FileDocumentStore::new(store.unwrap_or(config.store_path)).await?;
            let executor = match command {
                Some(command) => WorkflowExecutor::new(
                    Arc::new(store),
                    Arc::new(ProcessBatchRunner::new(command)),
                ),
                None => WorkflowExecutor::new(
                    Arc::new(store),
                    Arc::new(ScriptedBatchRunner::succeeding()),
                ),
            };

            let execution = executor.execute(&definition, input).await?;
            println!("{}", serde_json::to_string_pretty(&execution)?);
            if !execution.succeeded() {
                std::process::exit(2);
            }
        }
        Commands::Status {
            workspace_id,
            document_id,
            store,
        } => {
            let config = load_config(&cli.config, false)?;
            let store = FileDocumentStore::new(store.unwrap_or(config.store_path)).await?;
            match document_id {
                Some(document_id) => {
                    let key = DocumentKey::new(workspace_id, document_id);
                    let document = store
                        .get(&key)
                        .await?
                        .ok_or_else(|| Error::NotFound(format!("document {}", key)))?;
                    println!("{}", serde_json::to_string_pretty(&document)?);
                }
                None => {
                    let documents = store.list(&workspace_id).await?;
                    println!("{}", serde_json::to_string_pretty(&documents)?);
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = load_config(&cli.config, false)
        .map(|c| c.log_level)
        .unwrap_or_else(|_| "info".to_string());
    init_tracing(&log_level);

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
