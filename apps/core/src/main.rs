// CoderBrothers Assistant - console host
// Stands in for the website chat widget: one session, stdin in, stdout out.

use std::io::Write;
use std::sync::Arc;

use coderbrothers_assistant::brain::render_text;
use coderbrothers_assistant::config::AssistantConfig;
use coderbrothers_assistant::conversation::{
    ConversationStore, KeyValueStore, MemoryKvStore, MessageRecord, Sender, SqliteKvStore,
};
use coderbrothers_assistant::session::{ChatSurface, SessionHandle, SessionOptions};
use coderbrothers_assistant::telemetry;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Prints messages to stdout.
struct ConsoleSurface;

impl ChatSurface for ConsoleSurface {
    fn render_message(&self, record: &MessageRecord) {
        // The user's own line is already on screen.
        if record.sender() == Sender::Bot {
            println!("\nbot> {}\n", render_text(record.content()));
        }
    }

    fn show_typing(&self) {
        print!("bot is typing...");
        let _ = std::io::stdout().flush();
    }

    fn hide_typing(&self) {
        print!("\r                \r");
        let _ = std::io::stdout().flush();
    }
}

async fn open_store(config: &AssistantConfig) -> Arc<dyn KeyValueStore> {
    if let Err(e) = config.paths().init() {
        error!("Failed to initialize data directory: {}", e);
    }
    match SqliteKvStore::open(&config.db_path).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("History database unavailable, keeping this session in memory: {}", e);
            Arc::new(MemoryKvStore::new())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AssistantConfig::load()?;
    telemetry::init_tracing(env!("CARGO_PKG_NAME"), &config.log_level, config.log_format)?;

    let kv = open_store(&config).await;
    let options = SessionOptions::from_config(&config)
        .with_store(ConversationStore::with_key(kv, config.history_key.clone()))
        .with_surface(Arc::new(ConsoleSurface));
    let session = SessionHandle::start(options).await;
    session.open().await?;

    info!(session = %session.session_id(), "Console session ready");
    println!("CoderBrothers assistant. Type a message, /history to replay, /quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/history" => {
                for record in session.history().await? {
                    let who = match record.sender() {
                        Sender::User => "you",
                        Sender::Bot => "bot",
                    };
                    println!(
                        "[{}] {}> {}",
                        record.timestamp().format("%Y-%m-%d %H:%M:%S"),
                        who,
                        render_text(record.content())
                    );
                }
            }
            _ => {
                if let Err(e) = session.send_message(line.as_str()).await {
                    error!("Failed to handle message: {}", e);
                }
            }
        }
    }

    // Leaving the console is not the user dismissing the widget.
    session.shutdown().await?;
    Ok(())
}
