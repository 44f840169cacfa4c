use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tomo_core::{
    display_for, targets_for, AudioSink, InspirationLine, MoodStore, NarrationSynth,
    NullAudioSink, PhaseGenerator, TomoConfig,
};
use tomo_reasoning::{create_client, OpenAiSpeech, ScriptGenerator};
use tomo_session::{AmbientLibrary, SessionRunner};
use tomo_store::SqliteStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod audio;
mod flow;
mod render;

use audio::FileAudioSink;
use flow::{Journey, JourneyEnd};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, default_value = "tomo.toml")]
    config: PathBuf,

    /// Path to the SQLite database (overrides the config file)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check in and play a guided meditation (the default)
    Journey {
        /// Write narration clips and an audio event log to this directory
        #[arg(long)]
        audio_out: Option<PathBuf>,
    },
    /// Show the directions offered from an emotion
    Targets {
        emotion: String,
        /// Print JSON instead of a menu
        #[arg(long)]
        json: bool,
    },
    /// Recent check-ins and practice totals
    History {
        #[arg(short, long, default_value_t = 7)]
        limit: usize,
    },
    /// Add a line of source material used when generating scripts
    Inspire {
        current: String,
        target: String,
        text: String,
    },
    /// Serve the HTTP API
    #[cfg(feature = "gateway")]
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

fn init_tracing(json: bool, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn api_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY").ok()
}

async fn open_store(config: &TomoConfig) -> Result<Arc<SqliteStore>> {
    info!("Opening store at {}...", config.storage.db_path);
    Ok(Arc::new(SqliteStore::new(&config.storage.db_path).await?))
}

fn build_generator(
    config: &TomoConfig,
    store: Arc<SqliteStore>,
) -> Result<Arc<dyn PhaseGenerator>> {
    let llm = create_client(&config.llm, &config.retry, api_key().as_deref())?;
    info!("Generating scripts with {} ({})", llm.provider_name(), config.llm.model);
    Ok(Arc::new(
        ScriptGenerator::from_config(llm, config).with_inspirations(store),
    ))
}

fn build_speech(config: &TomoConfig) -> Result<Option<Arc<dyn NarrationSynth>>> {
    let speech = OpenAiSpeech::from_config(&config.tts, &config.retry, api_key().as_deref())?;
    Ok(speech.map(|s| Arc::new(s) as Arc<dyn NarrationSynth>))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Journey { audio_out: None });

    // The journey owns the terminal, so only problems are logged by default.
    let default_level = if matches!(command, Commands::Journey { .. }) {
        "warn"
    } else {
        "info"
    };
    init_tracing(cli.log_json, default_level);

    let mut config = TomoConfig::load_or_default(&cli.config);
    if let Some(db) = cli.db {
        config.storage.db_path = db;
    }

    match command {
        Commands::Journey { audio_out } => {
            journey(&config, audio_out).await?;
            // A pending stdin read cannot be cancelled and would hold up runtime shutdown.
            std::process::exit(0);
        }
        Commands::Targets { emotion, json } => targets(&emotion, json),
        Commands::History { limit } => {
            let store = open_store(&config).await?;
            let user = &config.storage.user_id;
            let entries = store.recent_entries(user, limit).await?;
            let stats = store.session_stats(user).await?;
            println!("{}", render::history(&entries, &stats));
            Ok(())
        }
        Commands::Inspire {
            current,
            target,
            text,
        } => {
            let store = open_store(&config).await?;
            store
                .add_inspiration(&InspirationLine {
                    current_emotion: current,
                    target_emotion: target,
                    text,
                })
                .await?;
            println!("Inspiration saved.");
            Ok(())
        }
        #[cfg(feature = "gateway")]
        Commands::Serve { host, port } => serve(&config, host, port).await,
    }
}

fn targets(emotion: &str, json: bool) -> Result<()> {
    if !json {
        println!("{}", render::targets_menu(emotion.trim()));
        return Ok(());
    }
    let targets: Vec<_> = targets_for(Some(emotion))
        .iter()
        .map(|id| {
            let d = display_for(id);
            serde_json::json!({
                "id": id,
                "label": d.label,
                "description": d.description,
                "emoji": d.emoji,
                "color": d.color,
            })
        })
        .collect();
    let body = serde_json::json!({
        "current": emotion.trim().to_lowercase(),
        "targets": targets,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn journey(config: &TomoConfig, audio_out: Option<PathBuf>) -> Result<()> {
    let store = open_store(config).await?;
    let generator = build_generator(config, store.clone())?;

    // Narration is only worth fetching when there is somewhere to put it.
    let (sink, speech): (Arc<dyn AudioSink>, _) = match audio_out {
        Some(dir) => {
            let sink = FileAudioSink::new(dir)?;
            info!("Writing audio to {}", sink.dir().display());
            (Arc::new(sink), build_speech(config)?)
        }
        None => (Arc::new(NullAudioSink), None),
    };

    let runner = SessionRunner::new(store.clone(), sink, config.storage.user_id.clone())
        .with_narration(speech)
        .with_ambient(AmbientLibrary::from_config(&config.ambient))
        .with_session_config(&config.session);
    let journey = Journey::new(store, generator, runner, config.storage.user_id.clone());

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut out = std::io::stdout();
    loop {
        match journey.run(&mut lines, &mut out).await? {
            JourneyEnd::StartOver(reason) => {
                info!("Starting over: {}", reason);
                println!("\nLet's start over.\n");
            }
            JourneyEnd::Finished(_) | JourneyEnd::Cancelled => break,
        }
    }
    Ok(())
}

#[cfg(feature = "gateway")]
async fn serve(config: &TomoConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    use tomo_gateway::{AppState, GatewayServer};

    let store = open_store(config).await?;
    let state = AppState {
        generator: build_generator(config, store)?,
        narration: build_speech(config)?,
    };
    let host = host.unwrap_or_else(|| config.gateway.host.clone());
    let port = port.unwrap_or(config.gateway.port);
    let server = GatewayServer::new(state, &host, port);
    info!("Starting gateway on {}", server.addr());

    let handle = server.start();
    tokio::select! {
        _ = handle => {}
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }
    Ok(())
}
