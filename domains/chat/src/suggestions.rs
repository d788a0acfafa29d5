//! Follow-up suggestion generation
//!
//! Asks the completion provider for short questions a visitor might ask next,
//! then normalizes the free-text answer into at most four clean entries.
//! Failures never reach the caller; they degrade to an empty list.

use std::collections::HashSet;
use std::sync::Arc;

use funnel_llm::{CompletionRequest, LlmMessage, LlmService};

use crate::domain::entities::Product;

/// Maximum number of suggestions returned per reply
pub const MAX_SUGGESTIONS: usize = 4;

const SYSTEM_PROMPT: &str = "You write follow-up questions for a sales chat. \
Given the assistant's last reply, suggest up to four short questions the visitor might ask next. \
Each question must be under twelve words and written from the visitor's point of view. \
Return one question per line with no numbering and no extra text.";

#[derive(Clone)]
pub struct SuggestionsService {
    llm: Arc<dyn LlmService>,
}

impl SuggestionsService {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    /// Generate suggestions for a completed assistant reply.
    ///
    /// Blank content short-circuits without calling the provider.
    pub async fn generate(&self, content: &str, product: Option<Product>) -> Vec<String> {
        let content = content.trim();
        if content.is_empty() {
            return Vec::new();
        }

        let mut prompt = format!("Assistant reply:\n{}", content);
        if let Some(product) = product {
            prompt.push_str(&format!(
                "\n\nThe visitor is looking at {}.",
                product.display_name()
            ));
        }

        let request = CompletionRequest {
            model: String::new(),
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            messages: vec![LlmMessage::user(prompt)],
            max_tokens: None,
        };

        match self.llm.complete(request).await {
            Ok(response) => {
                let suggestions = parse_suggestions(&response.content);
                tracing::debug!(
                    model = %response.model,
                    count = suggestions.len(),
                    "Generated follow-up suggestions"
                );
                suggestions
            }
            Err(e) => {
                tracing::warn!(error = %e, "Suggestion generation failed; returning none");
                Vec::new()
            }
        }
    }
}

/// Split provider output into clean suggestions.
///
/// Strips list markers and surrounding quotes, drops blanks and duplicates,
/// and keeps the first [`MAX_SUGGESTIONS`].
pub fn parse_suggestions(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_lowercase()))
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn clean_line(line: &str) -> String {
    let mut rest = line.trim();

    for marker in ["-", "*", "•"] {
        if let Some(stripped) = rest.strip_prefix(marker) {
            rest = stripped.trim_start();
            break;
        }
    }

    // "1." / "12)" style numbering
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let after = &rest[digits..];
        if let Some(stripped) = after.strip_prefix('.').or_else(|| after.strip_prefix(')')) {
            rest = stripped.trim_start();
        }
    }

    rest.trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”'))
        .trim()
        .to_string()
}
