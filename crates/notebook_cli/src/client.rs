//! Typed HTTP client for the notebook server API.

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct NotebookClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteView {
    pub name: String,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicView {
    pub name: String,
    pub note_count: usize,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    urls: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AddNoteBody<'a> {
    topic: &'a str,
    name: &'a str,
    text: &'a str,
}

/// Server answer for mutating calls: the message plus any returned links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub ok: bool,
    pub message: String,
    pub urls: Vec<String>,
}

impl NotebookClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn add_note(&self, topic: &str, name: &str, text: &str) -> Result<Reply, String> {
        let body = AddNoteBody { topic, name, text };
        self.post("add_note", &body)
    }

    /// Lists notes; a non-success answer comes back as `Err(server message)`.
    pub fn get_notes(&self, topic: &str) -> Result<Vec<NoteView>, String> {
        let resp = self
            .client
            .get(format!("{}/get_notes", self.base_url))
            .query(&[("topic", topic)])
            .send()
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(read_reply(resp)?.message);
        }
        resp.json::<Vec<NoteView>>()
            .map_err(|e| format!("Parse notes response: {}", e))
    }

    pub fn delete_note(&self, topic: &str, name: &str) -> Result<Reply, String> {
        self.post("delete_note", &json!({ "topic": topic, "name": name }))
    }

    pub fn delete_all_notes(&self, topic: &str) -> Result<Reply, String> {
        self.post("delete_all_notes", &json!({ "topic": topic }))
    }

    pub fn add_links(&self, topic: &str, search_term: &str) -> Result<Reply, String> {
        self.post(
            "add_wiki_info",
            &json!({ "topic": topic, "search_term": search_term }),
        )
    }

    pub fn list_topics(&self) -> Result<Vec<TopicView>, String> {
        let resp = self
            .client
            .get(format!("{}/topics", self.base_url))
            .send()
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(read_reply(resp)?.message);
        }
        resp.json::<Vec<TopicView>>()
            .map_err(|e| format!("Parse topics response: {}", e))
    }

    fn post(&self, route: &str, body: &impl Serialize) -> Result<Reply, String> {
        let resp = self
            .client
            .post(format!("{}/{}", self.base_url, route))
            .json(body)
            .send()
            .map_err(|e| format!("Request failed: {}", e))?;
        read_reply(resp)
    }
}

fn read_reply(resp: Response) -> Result<Reply, String> {
    let status = resp.status();
    let text = resp.text().unwrap_or_default();
    Ok(parse_reply(status.is_success(), status.as_u16(), &text))
}

fn parse_reply(ok: bool, status: u16, text: &str) -> Reply {
    match serde_json::from_str::<MessageBody>(text) {
        Ok(body) => Reply {
            ok,
            message: body.message,
            urls: body.urls,
        },
        // Extractor rejections (missing fields, bad JSON) come back as plain text.
        Err(_) => Reply {
            ok,
            message: format!("Server responded with status code {}: {}", status, text.trim()),
            urls: Vec::new(),
        },
    }
}
