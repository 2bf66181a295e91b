// src/main.rs
mod auth;
mod config;
mod permissions;
mod strategies;
mod types;
mod utils;
mod web;

use auth::{CredentialResolver, ResolveError};
use chrono::{DateTime, Utc};
use config::{ConfigError, ConfigTree};
use types::{ClusterDescriptor, Credential};
use utils::logging::{init_tracing, Logger, TracingLogger};
use web::WebServerState;

use clap::{Parser, Subcommand, ValueEnum};
use std::{io, sync::Arc};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file (YAML or JSON). Defaults to the user config directory.
    #[arg(short, long, global = true)]
    pub config: Option<String>,
    #[arg(short, long, global = true)]
    pub debug: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the health and permission routes
    Serve {
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Resolve a credential for a cluster declared under `kubernetes.clusters`
    Resolve {
        cluster: String,
        /// Overrides the cluster's `authProvider`
        #[arg(long)]
        provider: Option<String>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },
    /// List the clusters declared in the config
    Clusters,
    /// List the authentication providers that can be resolved
    Providers,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    /// client.authentication.k8s.io/v1 ExecCredential, for kubectl exec plugins
    ExecCredential,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("cluster {0} is not declared under kubernetes.clusters")]
    UnknownCluster(String),
    #[error("cluster {0} has no authProvider and none was given with --provider")]
    MissingProvider(String),
    #[error("credential for cluster {cluster} expired at {expired_at}")]
    ExpiredCredential {
        cluster: String,
        expired_at: DateTime<Utc>,
    },
}

fn load_config(path: Option<&str>) -> Result<ConfigTree, ConfigError> {
    let path = path
        .map(str::to_string)
        .unwrap_or_else(config::default_config_path);
    tracing::debug!(path = %path, "loading config");
    ConfigTree::load_from_file(&path)
}

async fn resolve(
    args: &Args,
    cluster_name: &str,
    provider: Option<&str>,
    output: OutputFormat,
) -> Result<(), AppError> {
    let config = load_config(args.config.as_deref())?;
    let cluster: ClusterDescriptor = config
        .find_cluster(cluster_name)?
        .ok_or_else(|| AppError::UnknownCluster(cluster_name.to_string()))?;

    let provider = provider
        .map(str::to_string)
        .or_else(|| cluster.auth_provider.clone())
        .ok_or_else(|| AppError::MissingProvider(cluster.name.clone()))?;

    let credential = default_resolver()
        .resolve(&cluster, &provider, &config)
        .await?;

    println!("{}", render_credential(&cluster, &credential, output, Utc::now())?);
    Ok(())
}

fn default_resolver() -> CredentialResolver {
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new("credentials"));
    CredentialResolver::with_default_strategies(logger)
}

// kubectl would reject an already expired token with a less useful message
fn render_credential(
    cluster: &ClusterDescriptor,
    credential: &Credential,
    output: OutputFormat,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    if credential.is_expired(now) {
        if let Some(expired_at) = credential.expires_at() {
            return Err(AppError::ExpiredCredential {
                cluster: cluster.name.clone(),
                expired_at,
            });
        }
    }

    let rendered = match output {
        OutputFormat::Json => serde_json::to_string_pretty(credential)?,
        OutputFormat::ExecCredential => {
            serde_json::to_string_pretty(&credential.to_exec_credential())?
        }
    };
    Ok(rendered)
}

fn list_providers() {
    for provider in default_resolver().providers() {
        println!("{}", provider);
    }
}

fn list_clusters(args: &Args) -> Result<(), AppError> {
    let config = load_config(args.config.as_deref())?;
    for cluster in config.clusters()? {
        println!(
            "{}\t{}\t{}",
            cluster.name,
            cluster.auth_provider.as_deref().unwrap_or("-"),
            cluster.url.as_ref().map(|u| u.as_str()).unwrap_or("-")
        );
    }
    Ok(())
}

async fn serve(port: u16) -> Result<(), AppError> {
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new("web"));
    let state = Arc::new(WebServerState::new(Some(port), logger));

    web::start_web_server(state, async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;
    Ok(())
}

async fn run(args: &Args) -> Result<(), AppError> {
    match &args.command {
        Command::Serve { port } => serve(*port).await,
        Command::Resolve {
            cluster,
            provider,
            output,
        } => resolve(args, cluster, provider.as_deref(), *output).await,
        Command::Clusters => list_clusters(args),
        Command::Providers => {
            list_providers();
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(&args).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("Error: {}", err);
            std::process::ExitCode::FAILURE
        }
    }
}
