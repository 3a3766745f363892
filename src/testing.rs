//! In-memory fakes for the model and the material store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::stream;

use crate::llm::{GenerativeModel, LlmError, LlmResult, Prompt, TextStream};
use crate::materials::{MaterialQuery, MaterialStore, StoreError, StoreResult};
use crate::types::{Material, MaterialType};

enum Chunk {
    Text(String),
    Fail,
}

/// Scripted model: `generate` answers the classifier, `generate_stream` replays chunks.
pub struct FakeModel {
    classification: Option<String>,
    chunks: Vec<Chunk>,
    generate_calls: AtomicUsize,
    stream_calls: AtomicUsize,
    last_stream_prompt: Mutex<Option<Prompt>>,
}

impl FakeModel {
    pub fn new(classification: &str, chunks: &[&str]) -> Self {
        Self {
            classification: Some(classification.to_string()),
            chunks: chunks.iter().map(|c| Chunk::Text((*c).to_string())).collect(),
            generate_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            last_stream_prompt: Mutex::new(None),
        }
    }

    pub fn not_a_request(chunks: &[&str]) -> Self {
        Self::new(r#"{"isRequest": false, "subject": null, "type": null}"#, chunks)
    }

    pub fn failing_classifier(chunks: &[&str]) -> Self {
        Self {
            classification: None,
            ..Self::new("", chunks)
        }
    }

    /// Streams `chunks`, then fails.
    pub fn failing_after(classification: &str, chunks: &[&str]) -> Self {
        let mut model = Self::new(classification, chunks);
        model.chunks.push(Chunk::Fail);
        model
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn last_stream_prompt(&self) -> Option<Prompt> {
        self.last_stream_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    async fn generate(&self, _prompt: &Prompt) -> LlmResult<String> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.classification.clone().ok_or(LlmError::EmptyResponse)
    }

    async fn generate_stream(&self, prompt: &Prompt) -> LlmResult<TextStream> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_stream_prompt.lock().unwrap() = Some(prompt.clone());

        let items: Vec<LlmResult<String>> = self
            .chunks
            .iter()
            .map(|chunk| match chunk {
                Chunk::Text(text) => Ok(text.clone()),
                Chunk::Fail => Err(LlmError::HttpStatus {
                    status: 500,
                    body: "stream reset".to_string(),
                }),
            })
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Store over a fixed list, applying the query the way the real table does.
pub struct FakeStore {
    materials: Vec<Material>,
    fail: bool,
    calls: AtomicUsize,
    last_query: Mutex<Option<MaterialQuery>>,
}

impl FakeStore {
    pub fn new(materials: Vec<Material>) -> Self {
        Self {
            materials,
            fail: false,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<MaterialQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl MaterialStore for FakeStore {
    async fn fetch_materials(&self, query: &MaterialQuery) -> StoreResult<Vec<Material>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        if self.fail {
            return Err(StoreError::HttpStatus {
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        let mut rows: Vec<Material> = self
            .materials
            .iter()
            .filter(|m| {
                query
                    .subject
                    .as_ref()
                    .is_none_or(|s| m.subject.to_lowercase().contains(&s.to_lowercase()))
            })
            .filter(|m| query.material_type.is_none_or(|t| m.material_type == t))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(query.limit);
        Ok(rows)
    }
}

/// Material created `days_ago` days before now.
pub fn material(id: u32, subject: &str, material_type: MaterialType, days_ago: i64) -> Material {
    Material {
        id: id.to_string(),
        title: format!("Materi {subject} {id}"),
        description: format!("Deskripsi materi {id}"),
        material_type,
        subject: subject.to_string(),
        url: format!("https://example.com/materi/{id}"),
        thumbnail_url: None,
        duration: None,
        author: None,
        created_at: Utc::now() - Duration::days(days_ago),
    }
}
