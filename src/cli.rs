use std::error::Error;

use atty::Stream;
use clap::{Parser, Subcommand};
use noteenglish_rs::client::{ClientConfig, HttpClient, TranslateRequest, TranslationMode};
use noteenglish_rs::orchestrator::{self, LookupSession};
use noteenglish_rs::placement::{MenuGeometry, Rect, Viewport};
use noteenglish_rs::selection::SentenceListLayout;
use noteenglish_rs::{DetailCategory, NoteService, SessionState, VocabularyEntry};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "noteenglish", about = "Translate passages and look up vocabulary", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Base URL of the translation and vocabulary services.
    #[arg(
        long,
        global = true,
        env = "NOTEENGLISH_API_BASE",
        default_value = noteenglish_rs::client::DEFAULT_API_BASE
    )]
    api_base: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a passage into translated sentences with their vocabulary candidates.
    Translate {
        /// Passage to translate.
        text: String,
        /// Ask for learner-oriented translations.
        #[arg(long)]
        learner: bool,
    },
    /// Translate a passage, select a word inside one sentence and look it up.
    Lookup {
        /// Passage to translate.
        text: String,
        /// Zero-based index of the sentence containing the selection.
        #[arg(short, long)]
        sentence: usize,
        /// Selected text.
        #[arg(long = "select")]
        selection: String,
        /// Detail categories to request (translation|zh, definition|en, example|ex, level).
        #[arg(short, long = "option", required = true)]
        options: Vec<DetailCategory>,
    },
    /// Compute where the lookup menu opens for a selection rectangle.
    Place {
        #[arg(long, allow_hyphen_values = true)]
        left: f32,
        #[arg(long, allow_hyphen_values = true)]
        top: f32,
        #[arg(long, allow_hyphen_values = true)]
        right: f32,
        #[arg(long, allow_hyphen_values = true)]
        bottom: f32,
        #[arg(long, default_value_t = 1280.0)]
        viewport_width: f32,
        #[arg(long, default_value_t = 800.0)]
        viewport_height: f32,
    },
    /// Run the translation and vocabulary HTTP backend.
    #[cfg(feature = "web")]
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: std::net::SocketAddr,
        #[arg(long, env = "FRONTEND_ORIGIN", default_value = "http://localhost:5173")]
        frontend_origin: String,
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, default_value = "")]
        gemini_api_key: String,
        #[arg(long, env = "GEMINI_MODEL", default_value = noteenglish_rs::gemini::DEFAULT_GEMINI_MODEL)]
        gemini_model: String,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let client = || {
        HttpClient::new(ClientConfig {
            api_base: cli.api_base.clone(),
            ..ClientConfig::default()
        })
    };
    match cli.command {
        Command::Translate { ref text, learner } => {
            handle_translate(&client()?, text, learner, cli.json).await
        }
        Command::Lookup {
            ref text,
            sentence,
            ref selection,
            ref options,
        } => handle_lookup(&client()?, text, sentence, selection, options, cli.json).await,
        Command::Place {
            left,
            top,
            right,
            bottom,
            viewport_width,
            viewport_height,
        } => {
            handle_place(
                Rect::new(left, top, right, bottom),
                Viewport::new(viewport_width, viewport_height),
                cli.json,
            );
            Ok(())
        }
        #[cfg(feature = "web")]
        Command::Serve {
            addr,
            ref frontend_origin,
            ref gemini_api_key,
            ref gemini_model,
        } => {
            let config = noteenglish_rs::web::WebConfig {
                addr,
                frontend_origin: frontend_origin.clone(),
                gemini: noteenglish_rs::gemini::GeminiConfig {
                    api_key: gemini_api_key.clone(),
                    model: gemini_model.clone(),
                    ..Default::default()
                },
            };
            noteenglish_rs::web::serve(config).await?;
            Ok(())
        }
    }
}

async fn handle_translate(
    client: &HttpClient,
    text: &str,
    learner: bool,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut request = TranslateRequest::new(text);
    if learner {
        request.mode = TranslationMode::Learner;
    }
    let sentences = client.translate(&request).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&json!({ "sentences": sentences }))?);
        return Ok(());
    }
    if sentences.is_empty() {
        println!("No translations yet.");
        return Ok(());
    }
    for (idx, sentence) in sentences.iter().enumerate() {
        println!("{}. Original:    {}", idx, sentence.original);
        println!("   Translation: {}", sentence.translation);
        if !sentence.tokens.is_empty() {
            let tokens: Vec<_> = sentence
                .tokens
                .iter()
                .map(|t| format!("{} ({}, {})", t.surface_text, t.lemma, t.part_of_speech))
                .collect();
            println!("   Vocabulary:  {}", tokens.join(", "));
        }
    }
    Ok(())
}

async fn handle_lookup(
    client: &HttpClient,
    text: &str,
    sentence: usize,
    selection: &str,
    options: &[DetailCategory],
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut state = SessionState::new(text);
    orchestrator::translate(&mut state, client).await;
    if !state.error.is_empty() {
        return Err(state.error.into());
    }

    let layout = SentenceListLayout::build(state.sentences.len());
    let snapshot = layout
        .select_in_original(sentence, selection, Rect::default())
        .ok_or_else(|| format!("No sentence at index {sentence}"))?;
    let mut session = LookupSession::new();
    session.select(
        &snapshot,
        &layout.tree,
        layout.container,
        Viewport::new(1280.0, 800.0),
        &MenuGeometry::default(),
    )?;
    for option in options {
        if !session.options().contains(*option) {
            session.toggle_option(*option);
        }
    }

    let entry = session.lookup(&mut state, client).await.map_err(|err| {
        let notice = err.notice().map(str::to_string);
        notice.unwrap_or_else(|| err.to_string())
    })?;

    if as_json {
        let vocabulary: Vec<_> = state.sentences[sentence].queried_vocabulary().collect();
        let payload = json!({ "entry": entry, "sentence": sentence, "vocabulary": vocabulary });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for card in state.sentences[sentence].queried_vocabulary() {
            render_markdown_block(&card_markdown(card));
        }
    }
    Ok(())
}

fn handle_place(rect: Rect, viewport: Viewport, as_json: bool) {
    let point = MenuGeometry::default().place(rect, viewport);
    if as_json {
        println!("{}", json!({ "x": point.x, "y": point.y }));
    } else {
        println!("Menu anchor: x={} y={}", point.x, point.y);
    }
}

fn card_markdown(entry: &VocabularyEntry) -> String {
    let mut out = format!("### {} • {}\n", entry.lemma, entry.part_of_speech);
    if !entry.surface_text.eq_ignore_ascii_case(&entry.lemma) {
        out.push_str(&format!("*Selected: {}*\n", entry.surface_text));
    }
    let rows = entry.detail_rows();
    if rows.is_empty() {
        out.push_str("\n(no fields returned)\n");
    }
    for (label, value) in rows {
        out.push_str(&format!("\n**{label}**: {value}\n"));
    }
    out
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn render_markdown_block(body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return;
    }
    if stdout_is_tty() {
        let skin = MadSkin::default();
        let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{trimmed}\n");
    }
}
