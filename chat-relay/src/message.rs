// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

// Inbound chat request types and validation
//
// The request body is validated in full before any upstream call is
// made. A `ChatRequest` only exists once validation has passed and is
// never mutated afterwards.

use serde::{Deserialize, Serialize};

/// A single conversation turn, forwarded to the provider verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Optional facts about the person on the other end of the chat.
///
/// Every field is independently optional; empty strings are treated the
/// same as absent fields by the prompt assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VisitorProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

/// A validated chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    system_prompt: String,
    messages: Vec<Message>,
    visitor_profile: Option<VisitorProfile>,
}

/// Why an inbound request body was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("system_prompt and messages are required")]
    MissingFields,

    #[error("invalid request: {0}")]
    InvalidShape(String),
}

/// Wire shape of the request body.
#[derive(Deserialize)]
struct InboundChatRequest {
    system_prompt: String,
    messages: Vec<Message>,
    #[serde(default)]
    visitor_profile: Option<VisitorProfile>,
}

impl ChatRequest {
    /// Build a request directly. The caller is responsible for supplying a
    /// non-empty prompt and message list; `from_json` enforces this for
    /// inbound bodies.
    pub fn new(
        system_prompt: impl Into<String>,
        messages: Vec<Message>,
        visitor_profile: Option<VisitorProfile>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
            visitor_profile,
        }
    }

    /// Validate a raw request body.
    ///
    /// Presence is checked before shape so that a body missing either
    /// required field always gets the same answer, whatever else it holds.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::MalformedJson(e.to_string()))?;

        if !has_required_fields(&value) {
            return Err(ValidationError::MissingFields);
        }

        let inbound: InboundChatRequest = serde_json::from_value(value)
            .map_err(|e| ValidationError::InvalidShape(e.to_string()))?;

        Ok(Self {
            system_prompt: inbound.system_prompt,
            messages: inbound.messages,
            visitor_profile: inbound.visitor_profile,
        })
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn visitor_profile(&self) -> Option<&VisitorProfile> {
        self.visitor_profile.as_ref()
    }
}

/// `system_prompt` must be present and not an empty string; `messages`
/// must be present and not an empty array. `null` counts as absent.
fn has_required_fields(value: &serde_json::Value) -> bool {
    let prompt_present = match value.get("system_prompt") {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    let messages_present = match value.get("messages") {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    };
    prompt_present && messages_present
}
