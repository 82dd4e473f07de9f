// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

// System prompt assembly
//
// Appends an optional visitor-context sentence to the caller's base
// prompt. Pure and deterministic: the same inputs always produce the
// same prompt.

use crate::message::VisitorProfile;

/// Opens the visitor section appended to the base prompt.
pub const VISITOR_HEADER: &str = "\n\n## Visitor Context\nYou are speaking with ";

/// Used in place of a missing visitor name.
pub const ANONYMOUS_VISITOR: &str = "someone";

/// Build the final system prompt.
///
/// Without a profile the base prompt is returned unchanged. With one,
/// fields are appended in fixed order: name, company, role, context.
/// Absent or empty fields contribute nothing.
pub fn assemble_system_prompt(base_prompt: &str, profile: Option<&VisitorProfile>) -> String {
    let Some(profile) = profile else {
        return base_prompt.to_string();
    };

    let mut prompt = String::with_capacity(base_prompt.len() + 128);
    prompt.push_str(base_prompt);
    prompt.push_str(VISITOR_HEADER);
    prompt.push_str(present(&profile.name).unwrap_or(ANONYMOUS_VISITOR));

    if let Some(company) = present(&profile.company) {
        prompt.push_str(" from ");
        prompt.push_str(company);
    }
    if let Some(role) = present(&profile.role) {
        prompt.push_str(" (");
        prompt.push_str(role);
        prompt.push(')');
    }
    prompt.push('.');

    if let Some(context) = present(&profile.context) {
        prompt.push_str(" Additional context: ");
        prompt.push_str(context);
    }

    prompt
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
