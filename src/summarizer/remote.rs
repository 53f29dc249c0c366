//! Hugging Face inference API backend.
//!
//! Sends `{"inputs": text}` to a summarization model endpoint and reads back
//! `[{"summary_text": ...}]`. The model only produces the summary; title, tags, and
//! sentiment come from [`HeuristicSummarizer`] run over the source text.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::heuristic::HeuristicSummarizer;
use super::{RawSummary, SummaryBackend};
use crate::config::SummarizerConfig;
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct InferenceOutput {
    summary_text: String,
}

/// Error body returned by the inference API, e.g. while a model is loading.
#[derive(Debug, Deserialize)]
struct InferenceError {
    error: String,
}

pub struct HuggingFaceSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    analyzer: HeuristicSummarizer,
}

impl HuggingFaceSummarizer {
    pub fn new(config: &SummarizerConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build summarizer HTTP client")?;

        if config.api_key.is_none() {
            tracing::warn!(
                endpoint = %config.endpoint,
                "no summarizer api_key configured, the endpoint may reject requests"
            );
        }
        tracing::info!(endpoint = %config.endpoint, "remote summarizer ready");

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            analyzer: HeuristicSummarizer,
        })
    }
}

#[async_trait]
impl SummaryBackend for HuggingFaceSummarizer {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn generate(&self, text: &str) -> Result<RawSummary> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: text });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<InferenceError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(classify_status(status, detail));
        }

        let outputs: Vec<InferenceOutput> = response
            .json()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("unreadable response: {e}")))?;
        let summary = outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .ok_or_else(|| Error::UpstreamUnavailable("empty response".into()))?;

        let analysis = self.analyzer.analyze(text);
        Ok(RawSummary {
            title: analysis.title,
            summary,
            tags: analysis.tags,
            sentiment: analysis.sentiment,
        })
    }
}

/// 400/413/422 mean the model refused this text; everything else is an upstream fault.
fn classify_status(status: StatusCode, detail: String) -> Error {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNPROCESSABLE_ENTITY => {
            Error::InvalidInput(format!("summarizer rejected the text: {detail}"))
        }
        _ => Error::UpstreamUnavailable(format!("summarizer returned HTTP {status}: {detail}")),
    }
}
