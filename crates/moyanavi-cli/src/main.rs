mod prompt;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use moyanavi::agent::bedrock::BedrockAgentRuntime;
use moyanavi::agent::AgentRuntime;
use moyanavi::config::AgentSettings;
use moyanavi::session::Session;

use prompt::{ChatPrompt, InputType, Theme};
use render::TerminalRenderer;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ask once and exit instead of starting an interactive chat
    #[arg(short, long)]
    prompt: Option<String>,

    /// File with AGENT_ID and AGENT_ALIAS_ID; its values win over the environment
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they do not interleave with the board redraws
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = AgentSettings::load(Some(&cli.env_file)).with_context(|| {
        format!(
            "AGENT_ID and AGENT_ALIAS_ID must be set in the environment or {}",
            cli.env_file.display()
        )
    })?;
    let runtime = BedrockAgentRuntime::from_env(settings).await;

    cliclack::intro(style(" Moya Navi ").on_cyan().black())?;
    println!("Tell me what is weighing on your mind. I will dig into the cause and suggest a way forward!");
    println!();

    match cli.prompt {
        Some(text) => ask(&runtime, &text, Theme::Dark).await,
        None => chat(&runtime).await?,
    }
    Ok(())
}

async fn chat(runtime: &dyn AgentRuntime) -> Result<()> {
    let mut prompt = ChatPrompt::new();
    loop {
        let input = prompt.get_input()?;
        match input.input_type {
            InputType::Message => {
                if let Some(content) = &input.content {
                    ask(runtime, content, prompt.theme).await;
                }
            }
            InputType::Exit => break,
            InputType::AskAgain => continue,
        }
    }
    cliclack::outro("Take care!")?;
    Ok(())
}

/// One agent run. Each gets its own session.
async fn ask(runtime: &dyn AgentRuntime, text: &str, theme: Theme) {
    if !text.trim().is_empty() {
        println!("{}", style("💭 What is on your mind").bold());
        println!("{}\n", text);
    }

    let session = Session::new();
    let mut renderer = TerminalRenderer::new(theme);
    let outcome = session.run(runtime, text, &mut renderer).await;
    tracing::debug!(session_id = %session.id(), ?outcome, "run finished");
}
