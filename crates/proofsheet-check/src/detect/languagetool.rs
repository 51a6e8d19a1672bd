//! Grammar checking against a LanguageTool HTTP server

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{DetectorError, GrammarDetector};

const BACKEND: &str = "languagetool";

/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Debug, Deserialize)]
struct Match {
    message: String,
}

/// Sends text to `POST {base_url}/v2/check`
pub struct LanguageToolChecker {
    agent: ureq::Agent,
    base_url: String,
    language: String,
}

impl LanguageToolChecker {
    /// Connect to a server and make sure it answers.
    ///
    /// `base_url` is the server root, e.g. `http://localhost:8081`.
    pub fn connect(base_url: &str, language: &str) -> Result<Self, DetectorError> {
        let agent = ureq::AgentBuilder::new().timeout(DEFAULT_TIMEOUT).build();
        let base_url = base_url.trim_end_matches('/').to_string();

        agent
            .get(&format!("{}/v2/languages", base_url))
            .call()
            .map_err(|e| DetectorError::unavailable(BACKEND, e.to_string()))?;
        debug!(%base_url, %language, "connected to LanguageTool");

        Ok(Self {
            agent,
            base_url,
            language: language.to_string(),
        })
    }

    /// Server URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl GrammarDetector for LanguageToolChecker {
    fn name(&self) -> &str {
        BACKEND
    }

    fn check(&self, text: &str) -> Result<Vec<String>, DetectorError> {
        let response = self
            .agent
            .post(&format!("{}/v2/check", self.base_url))
            .send_form(&[("text", text), ("language", self.language.as_str())])
            .map_err(|e| DetectorError::failed(BACKEND, e.to_string()))?;
        let body: CheckResponse = response
            .into_json()
            .map_err(|e| DetectorError::failed(BACKEND, e.to_string()))?;

        Ok(body.matches.into_iter().map(|m| m.message).collect())
    }
}
