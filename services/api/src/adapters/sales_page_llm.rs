//! services/api/src/adapters/sales_page_llm.rs
//!
//! This module contains the adapter for the sales page generation LLM.
//! It implements the `SalesPageGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use ignite_core::{
    document::Section,
    domain::SalesPageRequest,
    ports::{PortError, PortResult, SalesPageGenerationService},
};

const SYSTEM_INSTRUCTIONS: &str = r#"You are a direct-response copywriter helping a coach turn their messaging strategy and offer outline into a sales page.

Write the page as HTML. Use the customer's own language from the inputs, keep paragraphs short, and speak to one reader.

The page MUST contain these eight sections, in this order, each wrapped in its comment markers exactly as shown and with nothing nested between different sections:
{SECTIONS}

Rules:
- Every marker appears exactly once.
- Put only that section's HTML between its markers.
- Do not wrap the answer in code fences and do not add commentary before or after the page."#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SalesPageGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSalesPageAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSalesPageAdapter {
    /// Creates a new `OpenAiSalesPageAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn system_prompt() -> String {
    let sections = Section::ALL
        .iter()
        .map(|s| format!("{}\n  ...{} HTML...\n{}", s.start_marker(), s.title(), s.end_marker()))
        .collect::<Vec<_>>()
        .join("\n");
    SYSTEM_INSTRUCTIONS.replace("{SECTIONS}", &sections)
}

fn user_prompt(request: &SalesPageRequest) -> PortResult<String> {
    let payload = serde_json::to_string_pretty(request)
        .map_err(|e| PortError::Unexpected(format!("Failed to encode request: {}", e)))?;
    Ok(format!(
        "Write the sales page for offer #{} ({}). Here is everything the user has provided:\n\n{}",
        request.offer_number,
        request.offer_type.as_deref().unwrap_or("offer"),
        payload
    ))
}

/// Models sometimes fence the page despite the instructions.
fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

//=========================================================================================
// `SalesPageGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SalesPageGenerationService for OpenAiSalesPageAdapter {
    /// Generates a full marker-delimited sales page from the user's workbook data.
    async fn generate_sales_page(&self, request: &SalesPageRequest) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt(request)?)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Sales page LLM returned no text content.".to_string())
            })?;

        let page = strip_code_fences(&content);
        if page.is_empty() {
            return Err(PortError::Unexpected(
                "Sales page LLM returned an empty page.".to_string(),
            ));
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_lists_every_marker() {
        let prompt = system_prompt();
        for section in Section::ALL {
            assert!(prompt.contains(section.start_marker()));
            assert!(prompt.contains(section.end_marker()));
        }
        assert!(!prompt.contains("{SECTIONS}"));
    }

    #[test]
    fn strips_fenced_html() {
        let raw = "```html\n<!-- CTA_START -->Go<!-- CTA_END -->\n```\n";
        assert_eq!(strip_code_fences(raw), "<!-- CTA_START -->Go<!-- CTA_END -->");
        assert_eq!(strip_code_fences("  <p>plain</p> "), "<p>plain</p>");
    }

    #[test]
    fn user_prompt_carries_the_request_payload() {
        let request = SalesPageRequest {
            user_id: uuid::Uuid::nil(),
            offer_number: 2,
            offer_type: None,
            messaging_strategy: serde_json::json!({ "customerAvatar": "Coaches" }),
            offer_outline: serde_json::json!({}),
            workbook_responses: serde_json::json!({}),
            sales_page_inputs: serde_json::json!({}),
        };
        let prompt = user_prompt(&request).unwrap();
        assert!(prompt.contains("offer #2 (offer)"));
        assert!(prompt.contains("\"customerAvatar\": \"Coaches\""));
        assert!(prompt.contains("\"offerNumber\": 2"));
    }
}
