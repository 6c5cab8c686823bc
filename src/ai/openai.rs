//! OpenAI implementation of the AI trait.
//!
//! A reference implementation using OpenAI's GPT-4 and text-embedding-3-small,
//! built on top of the `openai-client` wire client.
//!
//! # Example
//!
//! ```rust,ignore
//! use extraction::ai::OpenAI;
//!
//! let ai = OpenAI::new("sk-...").with_model("gpt-4o");
//! let index = Index::new(store, ai);
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use openai_client::{types::StructuredRequest, ChatRequest, Message, OpenAIClient};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{ExtractionError, Result};
use crate::security::credentials::SecretString;
use crate::traits::ai::{ExtractionStrategy, Partition, AI};
use crate::traits::store::ResponseCache;
use crate::types::{
    extraction::{Extraction, MissingField, Source, SourceRole},
    page::CachedPage,
    summary::{RecallSignals, Summary, SummaryResponse},
};

fn ai_error(e: openai_client::OpenAIError) -> ExtractionError {
    ExtractionError::AI(Box::new(e))
}

/// OpenAI-based AI implementation.
///
/// Uses GPT-4o for text generation and text-embedding-3-small for embeddings.
#[derive(Clone)]
pub struct OpenAI {
    client: OpenAIClient,
    api_key: SecretString,
    model: String,
    embedding_model: String,
    /// Advisory cache for deterministic replay of chat completions, keyed by
    /// `(model, prompt_hash, input_hash)`. Not consulted for embeddings.
    response_cache: Option<Arc<dyn ResponseCache>>,
}

impl OpenAI {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        Self {
            client: OpenAIClient::new(api_key.clone()),
            api_key: SecretString::new(api_key),
            model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            response_cache: None,
        }
    }

    /// Attach a response cache so identical `(model, system, user)` chat
    /// requests replay a stored response instead of hitting the network.
    ///
    /// Intended for deterministic testing of `recall_and_partition` and
    /// other calls whose output otherwise varies run to run; callers that
    /// need every response live should leave this unset.
    pub fn with_response_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.response_cache = Some(cache);
        self
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ExtractionError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model (default: text-embedding-3-small).
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the API key (for bridge implementations that need it).
    pub fn api_key(&self) -> &str {
        self.api_key.expose()
    }

    // =========================================================================
    // Generic AI methods (for server integration)
    // =========================================================================

    /// Generic chat completion (for server's BaseAI trait).
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat("You are a helpful assistant.", prompt).await
    }

    /// Chat completion with specific model override.
    pub async fn complete_with_model(&self, prompt: &str, model: Option<&str>) -> Result<String> {
        let model_to_use = model.unwrap_or(&self.model);
        self.chat_with_model("You are a helpful assistant.", prompt, model_to_use)
            .await
    }

    /// Structured output with JSON schema (OpenAI's json_schema response_format).
    pub async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        schema: serde_json::Value,
    ) -> Result<String> {
        let request = StructuredRequest::new(&self.model, system, user, schema);
        self.client.structured_output(request).await.map_err(ai_error)
    }

    /// Tool calling support (for agentic extraction).
    pub async fn generate_with_tools(
        &self,
        messages: &[serde_json::Value],
        tools: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let request = openai_client::types::FunctionRequest::new(
            &self.model,
            messages.to_vec(),
            tools.clone(),
        );
        let response = self.client.function_calling(request).await.map_err(ai_error)?;
        Ok(response.message)
    }

    // =========================================================================
    // Internal methods
    // =========================================================================

    /// Make a chat completion request.
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        self.chat_with_model(system, user, &self.model).await
    }

    /// Make a chat completion request with specific model.
    ///
    /// When a response cache is attached, the request is looked up by
    /// `(model, prompt_hash, input_hash)` before hitting the network and
    /// the result is stored back for later replay.
    async fn chat_with_model(&self, system: &str, user: &str, model: &str) -> Result<String> {
        let prompt_hash = Self::hash_text(system);
        let input_hash = Self::hash_text(user);

        if let Some(cache) = &self.response_cache {
            if let Some(cached) = cache
                .get_cached_response(model, &prompt_hash, &input_hash)
                .await?
            {
                return Ok(cached);
            }
        }

        let request = ChatRequest::new(model)
            .message(Message::system(system))
            .message(Message::user(user))
            .temperature(0.0)
            .max_tokens(4096);

        let response = self
            .client
            .chat_completion(request)
            .await
            .map_err(ai_error)?;

        if let Some(cache) = &self.response_cache {
            cache
                .store_cached_response(model, &prompt_hash, &input_hash, &response.content)
                .await?;
        }

        Ok(response.content)
    }

    fn hash_text(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Make an embedding request.
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .create_embedding(text, &self.embedding_model)
            .await
            .map_err(ai_error)
    }
}

#[async_trait]
impl AI for OpenAI {
    async fn summarize(&self, content: &str, url: &str) -> Result<SummaryResponse> {
        let system = r#"You are an extraction assistant. Summarize the page content and extract recall signals.

Output JSON with this structure:
{
  "summary": "A 2-3 sentence summary of the page",
  "signals": {
    "calls_to_action": ["action phrases like 'sign up', 'contact us'"],
    "offers": ["what the page offers - services, products, programs"],
    "asks": ["what the page asks for - volunteers, donations, applications"],
    "entities": ["key entities - names, dates, contacts, locations"]
  }
}

Be factual. Only extract what's explicitly stated."#;

        let user = format!(
            "URL: {}\n\nContent:\n{}",
            url,
            &content[..content.len().min(12000)]
        );

        let response = self.chat(system, &user).await?;

        let parsed: SummaryJsonResponse = serde_json::from_str(&response)
            .or_else(|_| serde_json::from_str(openai_client::strip_code_blocks(&response)))
            .map_err(|e| ExtractionError::AI(format!("Failed to parse summary: {}", e).into()))?;

        Ok(SummaryResponse {
            summary: parsed.summary,
            signals: RecallSignals {
                calls_to_action: parsed.signals.calls_to_action,
                offers: parsed.signals.offers,
                asks: parsed.signals.asks,
                entities: parsed.signals.entities,
            },
            language: None,
        })
    }

    async fn expand_query(&self, query: &str) -> Result<Vec<String>> {
        let system = "Generate 5 related search terms for the query. Return as JSON array.";
        let response = self.chat(system, query).await?;

        let terms: Vec<String> = serde_json::from_str(&response)
            .or_else(|_| serde_json::from_str(openai_client::strip_code_blocks(&response)))
            .unwrap_or_else(|_| vec![query.to_string()]);

        Ok(terms)
    }

    async fn classify_query(&self, query: &str) -> Result<ExtractionStrategy> {
        let system = r#"Classify the query intent. Return JSON:
{"strategy": "collection" | "singular" | "narrative", "reasoning": "..."}

- collection: "Find all X", lists, multiple items
- singular: Point lookup, specific fact, contact info
- narrative: Summarize, describe, overview"#;

        let response = self.chat(system, query).await?;

        #[derive(Deserialize)]
        struct Classification {
            strategy: String,
        }

        let parsed: Classification = serde_json::from_str(&response)
            .or_else(|_| serde_json::from_str(openai_client::strip_code_blocks(&response)))
            .unwrap_or(Classification {
                strategy: "collection".to_string(),
            });

        Ok(match parsed.strategy.as_str() {
            "singular" => ExtractionStrategy::Singular,
            "narrative" => ExtractionStrategy::Narrative,
            _ => ExtractionStrategy::Collection,
        })
    }

    async fn recall_and_partition(
        &self,
        query: &str,
        summaries: &[Summary],
    ) -> Result<Vec<Partition>> {
        if summaries.is_empty() {
            return Ok(vec![]);
        }

        let system = r#"Given summaries, identify distinct items matching the query and group pages.

Output JSON:
{
  "partitions": [
    {"title": "Item Name", "urls": ["url1", "url2"], "rationale": "Why grouped"}
  ]
}

Each distinct item should be its own partition."#;

        let summaries_text: String = summaries
            .iter()
            .map(|s| format!("URL: {}\nSummary: {}\n", s.url, s.text))
            .collect::<Vec<_>>()
            .join("\n---\n");

        let user = format!("Query: {}\n\nSummaries:\n{}", query, summaries_text);
        let response = self.chat(system, &user).await?;

        #[derive(Deserialize)]
        struct PartitionResponse {
            partitions: Vec<PartitionItem>,
        }

        #[derive(Deserialize)]
        struct PartitionItem {
            title: String,
            urls: Vec<String>,
            rationale: String,
        }

        let parsed: PartitionResponse = serde_json::from_str(&response)
            .or_else(|_| serde_json::from_str(openai_client::strip_code_blocks(&response)))
            .unwrap_or(PartitionResponse { partitions: vec![] });

        Ok(parsed
            .partitions
            .into_iter()
            .map(|p| Partition {
                title: p.title,
                urls: p.urls,
                rationale: p.rationale,
            })
            .collect())
    }

    async fn extract(
        &self,
        query: &str,
        pages: &[CachedPage],
        _hints: Option<&[String]>,
    ) -> Result<Extraction> {
        if pages.is_empty() {
            return Ok(Extraction::new("No pages to extract from.".to_string()));
        }

        let system = r#"Extract information matching the query from the pages. Be evidence-grounded.

Output JSON:
{
  "content": "Markdown formatted extraction with citations [1], [2]",
  "sources_used": ["url1", "url2"],
  "gaps": [{"field": "missing field", "query": "search query to find it"}],
  "has_conflicts": false,
  "conflicts": []
}

Only include information explicitly stated in the sources. Mark anything inferred."#;

        let pages_text: String = pages
            .iter()
            .enumerate()
            .map(|(i, p)| {
                format!(
                    "[{}] URL: {}\nTitle: {}\nContent:\n{}\n",
                    i + 1,
                    p.url,
                    p.title.as_deref().unwrap_or("Untitled"),
                    &p.content[..p.content.len().min(8000)]
                )
            })
            .collect::<Vec<_>>()
            .join("\n---\n");

        let user = format!("Query: {}\n\nPages:\n{}", query, pages_text);
        let response = self.chat(system, &user).await?;

        #[derive(Deserialize)]
        struct ExtractionResponse {
            content: String,
            sources_used: Vec<String>,
            gaps: Vec<GapItem>,
            #[allow(dead_code)]
            has_conflicts: bool,
        }

        #[derive(Deserialize)]
        struct GapItem {
            field: String,
            query: String,
        }

        let parsed: ExtractionResponse = serde_json::from_str(&response)
            .or_else(|_| serde_json::from_str(openai_client::strip_code_blocks(&response)))
            .map_err(|e| {
                ExtractionError::AI(format!("Failed to parse extraction: {}", e).into())
            })?;

        let sources: Vec<Source> = parsed
            .sources_used
            .into_iter()
            .enumerate()
            .map(|(i, url)| {
                let page = pages.iter().find(|p| p.url == url);
                Source {
                    url,
                    title: page.and_then(|p| p.title.clone()),
                    fetched_at: page.map(|p| p.fetched_at).unwrap_or_else(chrono::Utc::now),
                    role: if i == 0 {
                        SourceRole::Primary
                    } else {
                        SourceRole::Supporting
                    },
                    metadata: std::collections::HashMap::new(),
                }
            })
            .collect();

        let grounding = Extraction::calculate_grounding(&sources, &[], false);

        let gaps: Vec<MissingField> = parsed
            .gaps
            .into_iter()
            .map(|g| MissingField::new(g.field, g.query))
            .collect();

        let status = if parsed.content.is_empty() && !gaps.is_empty() {
            crate::types::extraction::ExtractionStatus::Missing
        } else if !gaps.is_empty() {
            crate::types::extraction::ExtractionStatus::Partial
        } else {
            crate::types::extraction::ExtractionStatus::Found
        };

        Ok(Extraction {
            content: parsed.content,
            sources,
            gaps,
            grounding,
            conflicts: vec![],
            status,
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_text(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        // OpenAI supports batch embeddings, but for simplicity use sequential
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed_text(text).await?);
        }
        Ok(results)
    }
}

#[derive(Deserialize)]
struct SummaryJsonResponse {
    summary: String,
    signals: SignalsJson,
}

#[derive(Deserialize)]
struct SignalsJson {
    #[serde(default)]
    calls_to_action: Vec<String>,
    #[serde(default)]
    offers: Vec<String>,
    #[serde(default)]
    asks: Vec<String>,
    #[serde(default)]
    entities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_builder() {
        let ai = OpenAI::new("sk-test")
            .with_model("gpt-4o-mini")
            .with_embedding_model("text-embedding-3-large")
            .with_base_url("https://custom.api.com");

        assert_eq!(ai.model, "gpt-4o-mini");
        assert_eq!(ai.embedding_model, "text-embedding-3-large");
        assert_eq!(ai.client.base_url(), "https://custom.api.com");
    }

    #[test]
    fn test_hash_text_stable_and_sensitive() {
        assert_eq!(OpenAI::hash_text("hello"), OpenAI::hash_text("hello"));
        assert_ne!(OpenAI::hash_text("hello"), OpenAI::hash_text("Hello"));
    }

    #[tokio::test]
    async fn test_response_cache_attaches() {
        use crate::stores::MemoryStore;
        use std::sync::Arc;

        let cache = Arc::new(MemoryStore::new());
        let ai = OpenAI::new("sk-test").with_response_cache(cache.clone());

        assert!(ai.response_cache.is_some());
        assert!(cache
            .get_cached_response("gpt-4o", "p", "i")
            .await
            .unwrap()
            .is_none());
    }
}
