use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use relay_dashboard::commands::{UserCommand, HELP};
use relay_dashboard::config::Config;
use relay_dashboard::controller::{RelayController, Reply};
use relay_dashboard::device_client::DeviceClient;
use relay_dashboard::presenter::{present, ViewModel};
use relay_dashboard::reset::Confirm;
use relay_dashboard::session::{SessionPhase, SyncSession};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let config = Config::load().await;
    let client = match DeviceClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "Failed to create HTTP client");
            return ExitCode::FAILURE;
        }
    };
    info!(device = %client.base_url(), "Connecting to relay device");

    let controller = RelayController::start(Arc::new(client), &config);
    let format = RenderFormat::from_args(env::args().skip(1));
    let renderer = tokio::spawn(render_loop(controller.session().clone(), format));

    println!("{HELP}");
    let mut input = TerminalInput::new();
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                controller.shutdown().await;
                break;
            }
            line = input.next_line() => {
                let Some(line) = line else {
                    controller.shutdown().await;
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<UserCommand>() {
                    Ok(command) => command,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };
                match controller.handle_until(command, &mut input, &mut ctrl_c).await {
                    Reply::Silent => {}
                    Reply::Info(text) => println!("{text}"),
                    Reply::Alert(text) => println!("!! {text}"),
                    Reply::Quit => break,
                }
            }
        }
    }

    renderer.abort();
    ExitCode::SUCCESS
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderFormat {
    Text,
    /// One JSON view model per line, for piping into another UI.
    Json,
}

impl RenderFormat {
    fn from_args(args: impl Iterator<Item = String>) -> Self {
        let mut format = RenderFormat::Text;
        for arg in args {
            match arg.as_str() {
                "--json" => format = RenderFormat::Json,
                other => warn!(argument = other, "Ignoring unknown argument"),
            }
        }
        format
    }

    fn render(self, view: &ViewModel) {
        match self {
            RenderFormat::Text => println!("\n{view}"),
            RenderFormat::Json => match serde_json::to_string(view) {
                Ok(json) => println!("{json}"),
                Err(err) => error!(error = %err, "Failed to serialize view"),
            },
        }
    }
}

/// Print the view whenever it differs from the last one printed.
async fn render_loop(session: Arc<SyncSession>, format: RenderFormat) {
    let mut changes = session.subscribe();
    let mut last: Option<ViewModel> = None;

    loop {
        let snapshot = session.snapshot().await;
        let view = present(&snapshot, Utc::now());
        if last.as_ref() != Some(&view) {
            format.render(&view);
            last = Some(view);
        }
        if snapshot.phase == SessionPhase::Restarting {
            break;
        }
        if changes.changed().await.is_err() {
            break;
        }
    }
}

struct TerminalInput {
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalInput {
    fn new() -> Self {
        Self {
            lines: BufReader::new(io::stdin()).lines(),
        }
    }

    async fn next_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "Failed to read from stdin");
                None
            }
        }
    }
}

#[async_trait]
impl Confirm for TerminalInput {
    async fn confirm(&mut self, prompt: &str) -> bool {
        println!("{prompt} [y/N]");
        let answer = self.next_line().await.unwrap_or_default();
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
