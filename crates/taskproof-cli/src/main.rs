//! TaskProof CLI - attest completed tasks with an Ethereum wallet.

mod config;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use taskproof_attest::presentation::{describe_connection, display_state};
use taskproof_attest::{AttestOutcome, AttestationFlow, TaskAttestor};
use taskproof_client::HttpClient;
use taskproof_core::{Task, TaskId, TaskStatus};
use taskproof_wallet::{ConnectionStore, HttpWalletProvider, ProviderAdapter};

use config::Config;

/// TaskProof CLI - wallet-signed task attestations
#[derive(Parser)]
#[command(name = "taskproof")]
#[command(about = "Attest completed tasks with an Ethereum wallet signature", long_about = None)]
struct Cli {
    /// Wallet JSON-RPC endpoint
    #[arg(long)]
    wallet_url: Option<String>,

    /// Task backend base URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Account poll interval for `watch`, in seconds
    #[arg(long)]
    poll_interval_secs: Option<u64>,

    /// Include debug logs for taskproof crates
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show wallet and backend status
    Status,

    /// Connect a wallet account (prompts in the wallet)
    Connect,

    /// List tasks with their verification state
    #[command(name = "list-tasks")]
    ListTasks,

    /// Show one task
    #[command(name = "get-task")]
    GetTask {
        /// Task ID
        id: String,
    },

    /// Sign and store an attestation for a task
    Attest {
        /// Task ID
        id: String,
    },

    /// Follow wallet account changes until Ctrl-C
    Watch,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(url) = &self.wallet_url {
            config.wallet_url = url.clone();
        }
        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(secs) = self.poll_interval_secs {
            config.poll_interval = Duration::from_secs(secs.max(1));
        }
        config
    }
}

/// Everything a command needs.
struct Context {
    config: Config,
    provider: Option<Arc<HttpWalletProvider>>,
    store: Arc<ConnectionStore>,
    backend: Arc<HttpClient>,
}

impl Context {
    async fn build(config: Config) -> Self {
        let provider = HttpWalletProvider::detect(&config.wallet_url, config.probe_timeout).await;
        let adapter = match &provider {
            Some(p) => ProviderAdapter::new(p.clone()),
            None => ProviderAdapter::unavailable(),
        };

        let store = ConnectionStore::new(Arc::new(adapter));
        // Adopt an account the wallet already authorised, without prompting.
        store.check_connection().await;

        let backend = Arc::new(HttpClient::new(&config.backend_url));
        Self {
            config,
            provider,
            store,
            backend,
        }
    }
}

/// Directive added on top of `RUST_LOG`; only taskproof crates are raised.
fn log_directive(verbose: bool) -> &'static str {
    if verbose {
        "taskproof=debug"
    } else {
        "taskproof=info"
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let directive: Directive = log_directive(cli.verbose).parse()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let config = cli.config();
    debug!(?config, "Loaded config");
    let ctx = Context::build(config).await;

    match cli.command {
        Commands::Status => status(&ctx).await?,
        Commands::Connect => return connect(&ctx).await,
        Commands::ListTasks => list_tasks(&ctx).await?,
        Commands::GetTask { id } => get_task(&ctx, TaskId::new(id)).await?,
        Commands::Attest { id } => return attest(&ctx, TaskId::new(id)).await,
        Commands::Watch => return watch(&ctx).await,
    }

    Ok(ExitCode::SUCCESS)
}

async fn status(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let wallet = if ctx.store.adapter().is_available() {
        "detected"
    } else {
        "not found"
    };
    println!("Wallet:     {} ({})", wallet, ctx.config.wallet_url);
    println!("Connection: {}", describe_connection(&ctx.store.snapshot()));

    let backend = match ctx.backend.health().await {
        Ok(true) => "healthy".to_string(),
        Ok(false) => "unhealthy".to_string(),
        Err(e) => format!("unreachable ({})", e),
    };
    println!("Backend:    {} ({})", backend, ctx.backend.base_url());

    Ok(())
}

async fn connect(ctx: &Context) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if let Some(address) = ctx.store.snapshot().connected_address() {
        println!("Already connected as {}", address);
        return Ok(ExitCode::SUCCESS);
    }

    if !ctx.store.adapter().is_available() {
        eprintln!("No wallet found at {}", ctx.config.wallet_url);
        return Ok(ExitCode::FAILURE);
    }

    println!("Approve the connection request in your wallet...");
    match ctx.store.connect().await {
        Ok(address) => {
            println!("Connected as {}", address);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Connection failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn list_tasks(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = ctx.backend.list_tasks().await?;

    println!("Tasks ({}):", tasks.len());
    println!("{:<24}  {:<10}  {:<11}  {}", "ID", "STATE", "STATUS", "TITLE");
    println!("{}", "-".repeat(80));

    for task in tasks {
        println!(
            "{:<24}  {:<10}  {:<11}  {}",
            task.id,
            display_state(&task),
            status_name(task.status),
            task.title
        );
    }

    Ok(())
}

async fn get_task(ctx: &Context, id: TaskId) -> Result<(), Box<dyn std::error::Error>> {
    let task = ctx.backend.get_task(&id).await?;
    print_task(&task);
    Ok(())
}

async fn attest(ctx: &Context, id: TaskId) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let task = ctx.backend.get_task(&id).await?;

    let flow = AttestationFlow::new(ctx.store.clone(), ctx.backend.clone());
    let attestor = TaskAttestor::new(flow, ctx.backend.clone());

    if !display_state(&task).is_verified() && ctx.store.adapter().is_available() {
        if !ctx.store.snapshot().is_connected() {
            println!("Approve the connection request in your wallet...");
        }
        println!("Approve the signature request in your wallet...");
    }

    match attestor.attest_task(&task).await {
        Ok(AttestOutcome::AlreadyVerified) => {
            println!("Task {} is already verified.", task.id);
            Ok(ExitCode::SUCCESS)
        }
        Ok(AttestOutcome::InProgress) => {
            println!("Task {} is already being signed.", task.id);
            Ok(ExitCode::SUCCESS)
        }
        Ok(AttestOutcome::Attested { record, refreshed }) => {
            info!(task_id = %record.task_id, "Attestation stored");
            println!("Task {} verified by {}", record.task_id, record.signer);
            println!("Signature: {}", record.signature);
            match refreshed {
                Some(task) => print_task(&task),
                None => println!("(could not re-read the task from the backend)"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            debug!(error = %e, "Attestation failed");
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn watch(ctx: &Context) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let Some(provider) = &ctx.provider else {
        eprintln!("No wallet found at {}", ctx.config.wallet_url);
        return Ok(ExitCode::FAILURE);
    };

    let cancel = CancellationToken::new();
    let poller = provider.spawn_account_poller(ctx.config.poll_interval, cancel.clone());
    let subscription = ctx.store.watch_accounts();

    let mut states = ctx.store.subscribe();
    println!("{}", describe_connection(&states.borrow_and_update()));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{}", describe_connection(&states.borrow_and_update()));
            }
        }
    }

    if let Some(subscription) = subscription {
        subscription.unsubscribe().await;
    }
    cancel.cancel();
    let _ = poller.await;

    Ok(ExitCode::SUCCESS)
}

fn print_task(task: &Task) {
    println!("  ID:         {}", task.id);
    println!("  Title:      {}", task.title);
    println!("  Status:     {}", status_name(task.status));
    if let Some(assignee) = &task.assignee {
        println!("  Assignee:   {}", assignee);
    }
    println!("  State:      {}", display_state(task));
    if let Some(signature) = &task.attestation {
        println!("  Signature:  {}", signature);
    }
}

fn status_name(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "PENDING",
        TaskStatus::InProgress => "IN_PROGRESS",
        TaskStatus::Completed => "COMPLETED",
    }
}
