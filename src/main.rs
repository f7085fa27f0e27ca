//! `ticket-triage` command line entry point

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use ticket_triage::config::TriageConfig;
use ticket_triage::llm::provider::LlmProvider;
use ticket_triage::observability::{init_default_logging, metrics};
use ticket_triage::store::InMemoryTicketStore;
use ticket_triage::triage::{LlmInvoker, PromptCompiler, TriageEngine};
use tracing::{debug, error, info};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Support ticket triage and assignment
#[derive(Parser)]
#[command(name = "ticket-triage")]
#[command(about = "Prioritize support tickets and assign them to agents")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "TICKET_TRIAGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-analyze an existing ticket and write the result back
    Triage {
        /// Ticket identifier
        #[arg(long)]
        ticket: String,
    },
    /// Create a ticket with a fresh analysis
    Create {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        description: String,
        /// Customer identifier
        #[arg(long)]
        customer: String,
        /// Organization identifier
        #[arg(long)]
        org: String,
    },
    /// Validate configuration
    Config {
        /// Print the parsed configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Triage { ticket } => run_triage(&config, &ticket).await,
        Commands::Create {
            subject,
            description,
            customer,
            org,
        } => run_create(&config, &subject, &description, &customer, &org).await,
        Commands::Config { show } => handle_config_command(&config, show),
    };

    match serde_json::to_string(&metrics().snapshot()) {
        Ok(snapshot) => debug!(metrics = %snapshot, "Final metrics"),
        Err(e) => debug!("Could not serialize metrics: {}", e),
    }

    if let Err(e) = result {
        error!(
            "Command failed: {}",
            ticket_triage::sanitize_error_message(&e.to_string())
        );
        process::exit(1);
    }
}

fn load_configuration(config_path: Option<&Path>) -> CliResult<TriageConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());
        return Ok(TriageConfig::load_from_file(path)?);
    }

    for candidate in ["triage.toml", "config/triage.toml"] {
        let path = PathBuf::from(candidate);
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            return Ok(TriageConfig::load_from_file(&path)?);
        }
    }

    Err("No configuration file found. Provide one with -c/--config or create triage.toml".into())
}

/// Provider factory for creating LLM providers from configuration
struct LlmProviderFactory;

impl LlmProviderFactory {
    fn create_provider(config: &TriageConfig) -> CliResult<Arc<dyn LlmProvider>> {
        use ticket_triage::llm::providers::{
            AnthropicConfig, AnthropicProvider, OpenAiConfig, OpenAiProvider,
        };

        let api_key = config.get_llm_api_key()?;
        let timeout = config.triage.timeout();

        match config.llm.provider.as_str() {
            "openai" => {
                let mut openai_config = OpenAiConfig {
                    api_key,
                    timeout,
                    ..Default::default()
                };
                if let Some(base_url) = &config.llm.base_url {
                    openai_config.base_url = base_url.clone();
                }
                Ok(Arc::new(OpenAiProvider::new(openai_config)?))
            }
            "anthropic" => {
                let mut anthropic_config = AnthropicConfig {
                    api_key,
                    timeout,
                    ..Default::default()
                };
                if let Some(base_url) = &config.llm.base_url {
                    anthropic_config.base_url = base_url.clone();
                }
                Ok(Arc::new(AnthropicProvider::new(anthropic_config)?))
            }
            provider => Err(format!("Unsupported LLM provider: {provider}").into()),
        }
    }
}

fn store_path(config: &TriageConfig) -> CliResult<&Path> {
    config
        .store
        .path
        .as_deref()
        .ok_or_else(|| "[store] path is required for this command".into())
}

/// Wire provider, invoker, store, and engine from configuration
async fn build_engine(
    config: &TriageConfig,
) -> CliResult<(TriageEngine, Arc<InMemoryTicketStore>)> {
    let provider = LlmProviderFactory::create_provider(config)?;
    let invoker = LlmInvoker::new(provider, config.llm.model.clone())
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens)
        .with_timeout(config.triage.timeout());

    let store = Arc::new(InMemoryTicketStore::load(store_path(config)?).await?);
    let engine = TriageEngine::new(Arc::new(invoker), store.clone())
        .with_compiler(PromptCompiler::with_history_window(
            config.triage.history_window,
        ));

    Ok((engine, store))
}

async fn run_triage(config: &TriageConfig, ticket_id: &str) -> CliResult<()> {
    let (engine, store) = build_engine(config).await?;

    let result = engine.reanalyze_ticket(ticket_id).await?;
    store.save(store_path(config)?).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn run_create(
    config: &TriageConfig,
    subject: &str,
    description: &str,
    customer_id: &str,
    org_id: &str,
) -> CliResult<()> {
    let (engine, store) = build_engine(config).await?;

    let created = engine
        .create_triaged_ticket(subject, description, customer_id, org_id)
        .await?;
    store.save(store_path(config)?).await?;

    println!("{}", serde_json::to_string_pretty(&created)?);
    Ok(())
}

fn handle_config_command(config: &TriageConfig, show: bool) -> CliResult<()> {
    if show {
        println!("{}", toml::to_string_pretty(config)?);
    }

    info!("Configuration validation complete");
    Ok(())
}
