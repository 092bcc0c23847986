use clap::{Parser, Subcommand};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use linechat::application::errors::ChatError;
use linechat::application::formatting::MessageFormatter;
use linechat::application::messaging::parser::help_text;
use linechat::application::messaging::{ChatClient, Input, InputParser, TypingThrottle, TypingTracker};
use linechat::application::services::chat_service::WELCOME_MESSAGE;
use linechat::application::services::copy_service::{COPIED_LABEL, COPY_FAILED_MESSAGE};
use linechat::application::services::{ChatService, CopyOutcome, CopyService};
use linechat::domain::entities::{
    ChatMessage, ConnectionState, PresenceChange, Session, TimelineEntry,
};
use linechat::domain::traits::{Clipboard, HistoryStore, Transport};
use linechat::infrastructure::adapters::console::{ConsoleAdapter, DraftLine};
use linechat::infrastructure::adapters::SocketIoTransport;
use linechat::infrastructure::clipboard::SystemClipboard;
use linechat::infrastructure::config::Config;
use linechat::infrastructure::history::HttpHistory;
use linechat::infrastructure::transcript::{Transcript, TranscriptOptions};

#[derive(Parser)]
#[command(name = "linechat")]
#[command(about = "Terminal client for a Socket.IO chat room", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Chat server URL (overrides config)
    #[arg(short, long)]
    server: Option<String>,

    /// Display name (overrides config)
    #[arg(short, long)]
    username: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Join the chat room
    Run {
        /// Write an HTML transcript to this file
        #[arg(short, long)]
        transcript: Option<PathBuf>,
    },
    /// Format Markdown from stdin and print the markup
    Format,
    /// Print the server's message history
    History,
    /// Clear the server's message history
    ClearHistory,
    /// Generate default config
    InitConfig,
    /// Show version
    Version,
}

fn main() {
    // Initialize logging; stdout belongs to the chat
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config, cli.server, cli.username);

    let result = match cli.command {
        Commands::Run { transcript } => block_on(run_chat(config, transcript)),
        Commands::Format => format_stdin(&config),
        Commands::History => block_on(print_history(&config)),
        Commands::ClearHistory => block_on(clear_history(&config)),
        Commands::InitConfig => init_config(),
        Commands::Version => {
            println!("linechat v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn block_on<F>(future: F) -> Result<(), ChatError>
where
    F: std::future::Future<Output = Result<(), ChatError>>,
{
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(future)
}

fn load_config(path: &str, server: Option<String>, username: Option<String>) -> Config {
    let mut config = if Path::new(path).exists() {
        match Config::load(path) {
            Ok(mut config) => {
                config.apply_env();
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using environment", e);
                Config::load_env()
            }
        }
    } else {
        Config::load_env()
    };

    if let Some(url) = server {
        config.server.url = url;
    }
    if let Some(name) = username {
        config.session.username = Some(name);
    }
    config
}

fn formatter(config: &Config) -> MessageFormatter {
    MessageFormatter::new(
        config.formatter.diagram_language.as_str(),
        config.formatter.copy_label.as_str(),
    )
}

fn history(config: &Config) -> HttpHistory {
    HttpHistory::new(config.history_url(), config.clear_url())
}

fn format_stdin(config: &Config) -> Result<(), ChatError> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    if text.trim().is_empty() {
        return Ok(());
    }
    print!("{}", formatter(config).format(&text));
    Ok(())
}

async fn print_history(config: &Config) -> Result<(), ChatError> {
    let messages = history(config).fetch().await?;
    if messages.is_empty() {
        println!("{}", WELCOME_MESSAGE);
    }
    for msg in messages {
        let time = msg
            .sent_at()
            .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string());
        println!("[{}] {}: {}", time, msg.username, msg.content.trim());
    }
    Ok(())
}

async fn clear_history(config: &Config) -> Result<(), ChatError> {
    if history(config).clear().await? {
        println!("History cleared");
    } else {
        println!("Clear failed, please try again later");
    }
    Ok(())
}

fn init_config() -> Result<(), ChatError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}

/// Server events re-posted to the UI loop by the ChatClient subscriptions
enum UiEvent {
    Message(ChatMessage),
    Presence(PresenceChange),
    Typing(String),
    Connection(ConnectionState),
}

fn subscribe(tx: mpsc::UnboundedSender<UiEvent>) -> ChatClient {
    let mut client = ChatClient::new();

    let t = tx.clone();
    client.on_message(move |msg| {
        let _ = t.send(UiEvent::Message(msg.clone()));
    });
    let t = tx.clone();
    client.on_presence_change(move |change| {
        let _ = t.send(UiEvent::Presence(change.clone()));
    });
    let t = tx.clone();
    client.on_typing_indicator(move |user| {
        let _ = t.send(UiEvent::Typing(user.to_string()));
    });
    client.on_connection_state_change(move |state| {
        let _ = tx.send(UiEvent::Connection(state.clone()));
    });

    client
}

/// Everything the interactive loop mutates
struct ChatUi<C: Clipboard> {
    console: ConsoleAdapter,
    transcript: Option<Transcript>,
    typing: TypingTracker,
    copier: CopyService<C>,
    parser: InputParser,
}

impl<C: Clipboard> ChatUi<C> {
    async fn show(&mut self, entry: &TimelineEntry) {
        self.console.show_entry(entry);
        if let Some(transcript) = self.transcript.as_mut() {
            if let Err(e) = transcript.append(entry).await {
                tracing::warn!("Failed to write transcript: {}", e);
            }
        }
    }

    async fn reload<T: Transport, H: HistoryStore>(&mut self, service: &ChatService<T, H>) {
        let entries = service.load_history().await;
        for entry in &entries {
            self.console.show_entry(entry);
        }
        if let Some(transcript) = self.transcript.as_mut() {
            if let Err(e) = transcript.reset(&entries).await {
                tracing::warn!("Failed to write transcript: {}", e);
            }
        }
    }

    async fn on_server_event<T: Transport, H: HistoryStore>(
        &mut self,
        event: UiEvent,
        service: &ChatService<T, H>,
    ) {
        match event {
            UiEvent::Connection(state) => {
                self.console.show_connection(&state);
                if state == ConnectionState::Connected {
                    if let Err(e) = service.join().await {
                        self.console.alert(&format!("Could not join: {}", e));
                    }
                }
            }
            UiEvent::Message(msg) => {
                self.typing.clear(&msg.username);
                let entry = service.render_incoming(&msg);
                self.show(&entry).await;
            }
            UiEvent::Presence(PresenceChange::UserCount(count)) => self.console.show_online(count),
            UiEvent::Presence(change) => {
                if let Some(text) = change.system_text() {
                    self.show(&TimelineEntry::System(text)).await;
                }
            }
            UiEvent::Typing(user) => {
                let me = service.session().display_name();
                if self.typing.observe(&user, me, Instant::now()) {
                    self.console.show_typing(&user);
                }
            }
        }
    }

    /// Handle one stdin line. Returns `false` when the user quits.
    async fn on_line<T: Transport, H: HistoryStore>(
        &mut self,
        line: &str,
        service: &mut ChatService<T, H>,
    ) -> bool {
        let text = match self.console.feed(line) {
            DraftLine::Composing => {
                if let Err(e) = service.notify_typing(Instant::now()).await {
                    tracing::debug!("Typing notification not sent: {}", e);
                }
                return true;
            }
            DraftLine::Complete(text) => text,
        };

        match self.parser.parse(&text) {
            Input::Empty => {}
            Input::Message(content) => match service.send_message(&content).await {
                Ok(Some(entry)) => self.show(&entry).await,
                Ok(None) => {}
                Err(e) => self.console.alert(&format!("Message not sent: {}", e)),
            },
            Input::Rename(name) => match service.rename(&name).await {
                Ok(Some(_)) => self
                    .console
                    .show_notice(&format!("You are now {}", service.session())),
                Ok(None) => {}
                Err(e) => self.console.alert(&format!("Rename failed: {}", e)),
            },
            Input::ClearHistory => match service.clear_history().await {
                Ok(true) => {
                    self.console.show_notice("History cleared");
                    self.reload(service).await;
                }
                Ok(false) => self.console.alert("Clear failed, please try again later"),
                Err(e) => self.console.alert(&format!("Clear failed: {}", e)),
            },
            Input::History => self.reload(service).await,
            Input::Copy(n) => match self.console.copy_target(n).map(str::to_string) {
                Some(encoded) => match self.copier.copy_encoded(&encoded) {
                    CopyOutcome::Copied => self.console.show_notice(COPIED_LABEL),
                    CopyOutcome::Failed(msg) => self.console.alert(&msg),
                },
                None => self
                    .console
                    .alert(&format!("{}: no block {} to copy", COPY_FAILED_MESSAGE, n)),
            },
            Input::Emoji(None) => self.console.show_emoji_picker(),
            Input::Emoji(Some(n)) => match self.console.add_emoji(n) {
                Some(emoji) => self
                    .console
                    .show_notice(&format!("Added {} to your draft", emoji)),
                None => self.console.alert(&format!("No emoji {}", n)),
            },
            Input::Help => self.console.show_notice(&help_text(self.parser.prefix())),
            Input::Quit => return false,
        }
        true
    }
}

async fn run_chat(config: Config, transcript: Option<PathBuf>) -> Result<(), ChatError> {
    config.validate()?;

    let session = Session::resolve(config.session.username.as_deref());
    tracing::info!("Starting linechat as {}", session);

    let clipboard = if std::io::stdout().is_terminal() {
        SystemClipboard::new()
    } else {
        SystemClipboard::system_only()
    };
    let transcript = transcript.or_else(|| config.ui.transcript.clone()).map(|path| {
        Transcript::new(
            path,
            &TranscriptOptions {
                title: format!("linechat - {}", config.server.url),
                diagram_language: config.formatter.diagram_language.clone(),
                copied_label: COPIED_LABEL.to_string(),
                failed_message: COPY_FAILED_MESSAGE.to_string(),
                feedback_ms: config.ui.copy_feedback_ms,
            },
        )
    });

    let mut ui = ChatUi {
        console: ConsoleAdapter::new(),
        transcript,
        typing: TypingTracker::new(config.ui.typing_timeout()),
        copier: CopyService::new(clipboard),
        parser: InputParser::new(config.ui.command_prefix.as_str()),
    };

    // Connection errors are shown, never fatal: without a connection the
    // history, copy and help commands still work
    ui.console.show_connection(&ConnectionState::Connecting);
    let (transport, mut server_events) = match SocketIoTransport::connect(&config.server.url).await {
        Ok(pair) => pair,
        Err(e) => {
            ui.console
                .show_connection(&ConnectionState::Failed(e.to_string()));
            SocketIoTransport::offline()
        }
    };

    let mut service = ChatService::new(transport, history(&config), session, formatter(&config))
        .with_throttle(TypingThrottle::new(config.ui.typing_throttle()));

    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
    let client = subscribe(ui_tx);

    ui.reload(&service).await;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(Duration::from_millis(250));
    let mut events_open = true;

    loop {
        tokio::select! {
            event = server_events.recv(), if events_open => match event {
                Some(event) => client.dispatch(event),
                None => events_open = false,
            },
            Some(event) = ui_rx.recv() => ui.on_server_event(event, &service).await,
            line = stdin.next_line() => match line {
                Ok(Some(line)) => {
                    if !ui.on_line(&line, &mut service).await {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed to read input: {}", e);
                    break;
                }
            },
            _ = tick.tick() => {
                let stopped = ui.typing.expire(Instant::now());
                ui.console.show_typing_stopped(&stopped);
            }
        }
    }

    service.transport().disconnect().await;
    if let Some(transcript) = &ui.transcript {
        println!("Transcript saved to {}", transcript.path().display());
    }
    Ok(())
}
