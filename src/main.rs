mod mcp;
mod persist;
mod session;

use clap::{Parser, Subcommand};
use relay_core::config::{self, default_data_dir, GlobalConfig};
use session::{ConfigureRequest, ProgressReport, Session};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "relay",
    version,
    about = "Relay coding-assistant prompts and task progress to Slack"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding config.toml and saved progress.
    #[arg(long, default_value_t = default_data_dir())]
    data_dir: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the webhook URL, session id, and notification toggles.
    Configure {
        #[arg(long)]
        webhook_url: Option<String>,
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        enable_progress: Option<bool>,
        #[arg(long)]
        enable_compact_prompts: Option<bool>,
        /// Persist the settings to the global config file.
        #[arg(long)]
        save: bool,
    },
    /// Normalize a prompt and send it to Slack.
    SendPrompt {
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Add a task to the checklist.
    AddTask { id: String, name: String },
    /// Mark a task completed and send progress.
    CompleteTask { id: String },
    /// Set the current-task label.
    SetCurrentTask { name: String },
    /// Send a progress update to Slack.
    SendProgress,
    /// Print the current progress.
    GetProgress,
    /// Clear all tasks.
    ResetProgress,
    /// Run the MCP tool server on stdio.
    Serve,
}

impl Commands {
    fn mutates_tracker(&self) -> bool {
        matches!(
            self,
            Commands::Configure { .. }
                | Commands::AddTask { .. }
                | Commands::CompleteTask { .. }
                | Commands::SetCurrentTask { .. }
                | Commands::ResetProgress
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout belongs to CLI output and the MCP transport.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cfg = config::load(&cli.data_dir);

    if let Commands::Serve = cli.command {
        return mcp::serve(Session::new(cfg)).await;
    }

    let mut session = Session::new(cfg);
    if let Some(state) = persist::load_state(&cli.data_dir) {
        session.restore_tracker(state);
    }

    let mutates = cli.command.mutates_tracker();
    let result = run(&mut session, &cli.data_dir, cli.command).await;

    if mutates {
        if let Err(e) = persist::save_state(&cli.data_dir, &session.tracker_state()) {
            warn!("failed to save progress: {e}");
        }
    }

    println!("{}", result?);
    Ok(())
}

async fn run(session: &mut Session, data_dir: &str, command: Commands) -> anyhow::Result<String> {
    let out = match command {
        Commands::Configure {
            webhook_url,
            session_id,
            enable_progress,
            enable_compact_prompts,
            save,
        } => {
            let status = session.configure(ConfigureRequest {
                webhook_url,
                session_id: session_id.clone(),
                enable_progress,
                enable_compact_prompts,
            })?;
            if save {
                let path = config::config_path(data_dir);
                config::save_global(
                    data_dir,
                    &GlobalConfig {
                        webhook_url: session.config().webhook_url.clone(),
                        session_id,
                        enable_progress,
                        enable_compact_prompts,
                    },
                )?;
                format!("✅ {status}\n✅ Saved to {}", path.display())
            } else {
                format!("✅ {status}")
            }
        }
        Commands::SendPrompt { prompt, session_id } => {
            if prompt.is_empty() {
                anyhow::bail!("no prompt provided. Usage: relay send-prompt <prompt>");
            }
            let status = session
                .send_compact_prompt(&prompt.join(" "), session_id)
                .await?;
            format!("✅ {status}")
        }
        Commands::AddTask { id, name } => format!("✅ {}", session.add_task(&id, &name)),
        Commands::CompleteTask { id } => format!("✅ {}", session.complete_task(&id).await?),
        Commands::SetCurrentTask { name } => format!("✅ {}", session.set_current_task(&name)),
        Commands::SendProgress => format!("✅ {}", session.send_progress().await?),
        Commands::GetProgress => render_report(&session.progress_report()),
        Commands::ResetProgress => format!("✅ {}", session.reset_progress()),
        Commands::Serve => anyhow::bail!("serve is handled before session restore"),
    };
    Ok(out)
}

/// Human-readable progress table for the terminal.
fn render_report(report: &ProgressReport) -> String {
    let current = if report.current.is_empty() {
        "None"
    } else {
        &report.current
    };
    let mut out = format!(
        "📊 Progress Report\n\nCurrent Task: {current}\nCompleted: {}/{}\nCompletion Rate: {:.1}%",
        report.completed, report.total, report.completion_rate
    );
    if !report.tasks.is_empty() {
        out.push_str("\n\nTasks:");
        for task in &report.tasks {
            let marker = if task.completed { "✅" } else { "⏳" };
            out.push_str(&format!("\n  {marker} {}", task.name));
        }
    }
    out
}
