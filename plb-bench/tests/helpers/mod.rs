//! Test Helper Utilities
//!
//! Scripted collaborators for driving the benchmark without Ollama or
//! network access.

#![allow(dead_code)]

use async_trait::async_trait;
use plb_bench::{CatalogLookup, CatalogVerdict, ModelResponse, ModelRunner, RunnerError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Scripted reply for one (model, prompt) pair
#[derive(Debug, Clone)]
pub enum Reply {
    Text(&'static str),
    Bytes(Vec<u8>),
    Fail(Option<&'static str>),
}

/// Model runner answering from a (model, prompt) → reply table
///
/// Pairs without a scripted reply answer with an empty track list.
#[derive(Default)]
pub struct ScriptedRunner {
    replies: HashMap<(String, String), Reply>,
    ready: HashSet<String>,
    invocations: Mutex<Vec<(String, String)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, model: &str, prompt: &str, reply: Reply) -> Self {
        self.replies
            .insert((model.to_string(), prompt.to_string()), reply);
        self
    }

    pub fn ready(mut self, model: &str) -> Self {
        self.ready.insert(model.to_string());
        self
    }

    pub fn invocations(&self) -> Vec<(String, String)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelRunner for ScriptedRunner {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn is_ready(&self, model: &str) -> bool {
        self.ready.contains(model)
    }

    async fn ensure_started(&self, model: &str) -> Result<(), RunnerError> {
        Err(RunnerError::Invocation {
            message: Some(format!("model {} unavailable", model)),
        })
    }

    async fn invoke(&self, model: &str, prompt: &str) -> Result<ModelResponse, RunnerError> {
        self.invocations
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));

        match self
            .replies
            .get(&(model.to_string(), prompt.to_string()))
            .cloned()
        {
            Some(Reply::Text(text)) => Ok(ModelResponse::Text(text.to_string())),
            Some(Reply::Bytes(bytes)) => Ok(ModelResponse::from_bytes(bytes)),
            Some(Reply::Fail(message)) => Err(RunnerError::Invocation {
                message: message.map(str::to_string),
            }),
            None => Ok(ModelResponse::Text("[]".to_string())),
        }
    }
}

/// Catalog that knows a fixed set of (title, artist) pairs
#[derive(Default)]
pub struct FixedCatalog {
    known: HashSet<(String, String)>,
    queries: Mutex<Vec<(String, String)>>,
}

impl FixedCatalog {
    pub fn new(known: &[(&str, &str)]) -> Self {
        Self {
            known: known
                .iter()
                .map(|(t, a)| (t.to_string(), a.to_string()))
                .collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogLookup for FixedCatalog {
    async fn exists(&self, title: &str, artist: &str) -> CatalogVerdict {
        self.queries
            .lock()
            .unwrap()
            .push((title.to_string(), artist.to_string()));

        if self.known.contains(&(title.to_string(), artist.to_string())) {
            CatalogVerdict::found(format!("found {}", title))
        } else {
            CatalogVerdict::not_found(format!("missing {}", title))
        }
    }
}
