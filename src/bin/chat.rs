//! Terminal chat client for the learning assistant.
//! Run with: cargo run --bin learning-assistant-chat -- [server-url]
//!
//! Commands: `/image <path> [text]`, `/retry [n]`, `/clear`, `/quit`.
//! `/retry n` resends the n-th question; plain `/retry` resends the latest.

use std::io::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use learning_assistant::client::{Conversation, FrameEffect, StreamingChatClient, TurnOutcome};
use learning_assistant::types::{Material, MessageId, Role};

const SERVER_URL_ENV: &str = "LEARNING_ASSISTANT_URL";
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

enum Command<'a> {
    Quit,
    Clear,
    Retry(&'a str),
    Image { path: &'a str, text: &'a str },
    Message(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let (name, rest) = line
            .split_once(' ')
            .map_or((line, ""), |(name, rest)| (name, rest.trim()));
        match name {
            "/quit" | "/exit" => Self::Quit,
            "/clear" => Self::Clear,
            "/retry" => Self::Retry(rest),
            "/image" => {
                let (path, text) = rest
                    .split_once(' ')
                    .map_or((rest, ""), |(path, text)| (path, text.trim()));
                Self::Image { path, text }
            }
            _ => Self::Message(line),
        }
    }
}

/// Prints the assistant reply as it grows.
#[derive(Default)]
struct Renderer {
    shown: String,
    open: bool,
}

impl Renderer {
    fn on_effect(&mut self, conversation: &Conversation, effect: &FrameEffect) {
        match *effect {
            FrameEffect::Started(id) | FrameEffect::Updated(id) => {
                if let Some(message) = conversation.message(id) {
                    self.show(&message.content);
                }
            }
            FrameEffect::Finished(id) => {
                if let Some(message) = conversation.message(id) {
                    self.show(&message.content);
                    self.close();
                    if let Some(materials) = &message.materials {
                        print_materials(materials);
                    }
                }
            }
            FrameEffect::Failed(_) => {
                self.close();
                if let Some(error) = conversation.error() {
                    eprintln!("! {error}");
                }
            }
            FrameEffect::Ignored => {}
        }
    }

    fn show(&mut self, content: &str) {
        if !self.open {
            print!("Copilot: ");
            self.open = true;
        }
        match content.strip_prefix(self.shown.as_str()) {
            Some(tail) => print!("{tail}"),
            None => print!("\n{content}"),
        }
        self.shown = content.to_string();
        let _ = std::io::stdout().flush();
    }

    fn close(&mut self) {
        if self.open {
            println!();
        }
        self.shown.clear();
        self.open = false;
    }
}

fn print_materials(materials: &[Material]) {
    println!("Materi yang direkomendasikan:");
    for material in materials {
        let mut line = format!("  [{}] {}", material.material_type, material.title);
        if let Some(author) = &material.author {
            line.push_str(&format!(" - {author}"));
        }
        if let Some(duration) = &material.duration {
            line.push_str(&format!(" ({duration})"));
        }
        println!("{line}\n      {}", material.url);
        println!("      gambar: {}", material.thumbnail_or_fallback());
    }
}

/// Message a `/retry` argument points at: the n-th question, or the latest message.
fn retry_target(conversation: &Conversation, arg: &str) -> Result<MessageId> {
    if arg.is_empty() {
        return conversation
            .messages()
            .last()
            .map(|m| m.id)
            .context("belum ada pesan");
    }
    let n: usize = arg.parse().with_context(|| format!("usage: /retry [n], got {arg:?}"))?;
    conversation
        .messages()
        .iter()
        .filter(|m| m.role == Role::User)
        .nth(n.saturating_sub(1))
        .map(|m| m.id)
        .with_context(|| format!("tidak ada pertanyaan ke-{n}"))
}

/// Read an image file into a data URI. The MIME type comes from the extension.
fn load_image(path: &str) -> Result<String> {
    if path.is_empty() {
        bail!("usage: /image <path> [text]");
    }
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        other => bail!("unsupported image extension {other:?} (jpg, png, gif, webp)"),
    };
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {path}"))?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let base_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(SERVER_URL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let client = StreamingChatClient::new(&base_url)
        .with_context(|| format!("invalid server url {base_url}"))?;

    println!("Copilot AI ({})", client.endpoint());
    println!("Perintah: /image <path> [teks], /retry [n], /clear, /quit");

    let mut conversation = Conversation::new();
    let mut renderer = Renderer::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let observer = |c: &Conversation, e: &FrameEffect| renderer.on_effect(c, e);

        let result = match Command::parse(line.trim()) {
            Command::Quit => break,
            Command::Clear => {
                if conversation.clear() {
                    println!("(percakapan dihapus)");
                }
                continue;
            }
            Command::Retry(arg) => match retry_target(&conversation, arg) {
                Ok(target) => client.retry_message(&mut conversation, target, observer).await,
                Err(err) => {
                    eprintln!("! {err:#}");
                    continue;
                }
            },
            Command::Image { path, text } => match load_image(path) {
                Ok(uri) => {
                    client
                        .send_message(&mut conversation, text, Some(uri), observer)
                        .await
                }
                Err(err) => {
                    eprintln!("! {err:#}");
                    continue;
                }
            },
            Command::Message(text) => {
                client
                    .send_message(&mut conversation, text, None, observer)
                    .await
            }
        };

        match result {
            Ok(Some(TurnOutcome::Interrupted(_))) => {
                renderer.close();
                eprintln!("! koneksi terputus sebelum respons selesai");
            }
            Ok(_) => {}
            Err(err) => eprintln!("! {}", err.user_message()),
        }
        conversation.clear_error();
    }

    Ok(())
}
