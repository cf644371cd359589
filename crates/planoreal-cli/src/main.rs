mod config;
mod export_cmd;
mod prompt_cmd;
mod serve_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::{AppConfig, CliOverrides};

#[derive(Parser)]
#[command(name = "planoreal", about = "Lesson plan generator backed by a chat-completion model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a planoreal config file
    Init {
        /// API key for the chat-completion endpoint
        #[arg(long)]
        api_key: String,
        /// Model identifier to request
        #[arg(long)]
        model: Option<String>,
        /// Port for `planoreal serve`
        #[arg(long)]
        port: Option<u16>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP API
    Serve {
        /// Address to bind (default: 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides PORT env var)
        #[arg(long)]
        port: Option<u16>,
        /// Model identifier (overrides OPENROUTER_MODEL env var)
        #[arg(long)]
        model: Option<String>,
    },
    /// Print the prompt synthesized for a lesson request JSON file
    Prompt {
        /// Path to the request JSON file
        file: PathBuf,
    },
    /// Render a lesson plan JSON file to PDF
    Export {
        /// Path to the plan JSON (or a raw model reply containing it)
        file: PathBuf,
        /// Output file path (defaults to plano-de-aula.pdf)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print Markdown to stdout instead of writing a PDF
        #[arg(long, conflicts_with = "output")]
        markdown: bool,
    },
}

/// Execute the `planoreal init` command: write the config file.
fn cmd_init(
    api_key: &str,
    model: Option<String>,
    port: Option<u16>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if api_key.trim().is_empty() {
        anyhow::bail!("--api-key must not be empty");
    }

    let cfg = config::ConfigFile {
        upstream: config::UpstreamSection {
            api_key: Some(api_key.to_string()),
            model,
            ..Default::default()
        },
        server: config::ServerSection { bind: None, port },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  upstream.api_key = {}", mask_key(api_key));
    if let Some(model) = &cfg.upstream.model {
        println!("  upstream.model = {model}");
    }
    if let Some(port) = cfg.server.port {
        println!("  server.port = {port}");
    }
    println!();
    println!("Next: run `planoreal serve` to start the API.");

    Ok(())
}

/// Show the first and last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    config::load_dotenv();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            api_key,
            model,
            port,
            force,
        } => {
            cmd_init(&api_key, model, port, force)?;
        }
        Commands::Serve { bind, port, model } => {
            let resolved = AppConfig::resolve(&CliOverrides { bind, port, model })?;
            serve_cmd::run_serve(resolved).await?;
        }
        Commands::Prompt { file } => {
            prompt_cmd::run_prompt(&file)?;
        }
        Commands::Export {
            file,
            output,
            markdown,
        } => {
            export_cmd::run_export(&file, output.as_deref(), markdown)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that read or mutate process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }
}
