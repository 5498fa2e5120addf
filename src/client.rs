// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Perspective API client
//!
//! One `analyze` call validates the text, resolves the attribute selection,
//! sends a single request and maps the reply. The only retry is the
//! skip-on-language loop, which drops the attribute the service rejected and
//! sends again, at most once per requested attribute.

use serde_json::{json, Map, Value};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::attributes::Attribute;
use crate::config::{ClientConfig, LogLevel};
use crate::language;
use crate::resolver::{self, AttributeSelection};
use crate::scores::AnalyzeResult;
use crate::transport::{HttpTransport, Transport};
use crate::{PerspectiveError, Result};

const LANGUAGE_REJECTION: &str = "does not support request languages";
const INVALID_KEY: &str = "API key not valid";

/// Per-call switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Drop attributes that reject the text's language instead of failing
    pub skip_on_lang: bool,
    /// Drop attribute names that match nothing instead of failing
    pub skip_on_unknown: bool,
    /// Return the untouched response instead of percent scores
    pub return_raw: bool,
}

/// What an analyze call produced
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    Scores(AnalyzeResult),
    Raw(Value),
}

impl AnalyzeOutcome {
    /// Percent scores, simplifying a raw response if needed
    pub fn into_scores(self) -> Result<AnalyzeResult> {
        match self {
            AnalyzeOutcome::Scores(scores) => Ok(scores),
            AnalyzeOutcome::Raw(raw) => AnalyzeResult::from_raw(&raw),
        }
    }
}

/// One outbound request, before serialization
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeRequest {
    pub text: String,
    pub attributes: Vec<Attribute>,
    pub language: Option<String>,
    pub do_not_store: bool,
    pub span_annotations: bool,
}

impl AnalyzeRequest {
    /// Wire body: `{comment: {text}, requestedAttributes: {NAME: {}}, languages?: [code]}`
    pub fn to_body(&self) -> Value {
        let requested: Map<String, Value> = self
            .attributes
            .iter()
            .map(|a| (a.as_str().to_string(), json!({})))
            .collect();

        let mut body = json!({
            "comment": { "text": self.text },
            "requestedAttributes": requested,
        });
        if let Some(code) = &self.language {
            body["languages"] = json!([code]);
        }
        if self.do_not_store {
            body["doNotStore"] = json!(true);
        }
        if self.span_annotations {
            body["spanAnnotations"] = json!(true);
        }
        body
    }
}

/// Client for the comment analyzer endpoint
pub struct Client {
    transport: Box<dyn Transport>,
    token: String,
    config: ClientConfig,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Connect over HTTP, failing with `InvalidToken` if the key is rejected
    pub async fn connect(token: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(token, Box::new(transport), config).await
    }

    /// Build a client over any transport; the token is verified first
    pub async fn with_transport(
        token: impl Into<String>,
        transport: Box<dyn Transport>,
        config: ClientConfig,
    ) -> Result<Self> {
        let token = token.into();
        transport
            .verify_token(&token)
            .await
            .map_err(translate_rejection)?;

        if config.log_level.allows(LogLevel::Debug) {
            debug!("Client ready (endpoint {})", config.endpoint);
        }

        Ok(Self {
            transport,
            token,
            config,
        })
    }

    /// Swap the API key. The new key is verified; on failure the old one stays.
    pub async fn change_token(&mut self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.transport
            .verify_token(&token)
            .await
            .map_err(translate_rejection)?;
        self.token = token;
        if self.logs(LogLevel::Info) {
            info!("API key changed");
        }
        Ok(())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn log_level(&self) -> LogLevel {
        self.config.log_level
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.config.log_level = level;
    }

    fn logs(&self, level: LogLevel) -> bool {
        self.config.log_level.allows(level)
    }

    /// Score `text` against the selected attributes
    pub async fn analyze(
        &self,
        text: &str,
        attributes: impl Into<AttributeSelection>,
        language: Option<&str>,
        options: AnalyzeOptions,
    ) -> Result<AnalyzeOutcome> {
        let request = self.prepare(text, &attributes.into(), language, options)?;
        self.dispatch(request, options).await
    }

    /// [`Client::analyze`] without the raw variant
    pub async fn analyze_scores(
        &self,
        text: &str,
        attributes: impl Into<AttributeSelection>,
        language: Option<&str>,
        options: AnalyzeOptions,
    ) -> Result<AnalyzeResult> {
        let options = AnalyzeOptions {
            return_raw: false,
            ..options
        };
        self.analyze(text, attributes, language, options)
            .await?
            .into_scores()
    }

    /// Validate and resolve everything that does not need the network
    pub fn prepare(
        &self,
        text: &str,
        selection: &AttributeSelection,
        language: Option<&str>,
        options: AnalyzeOptions,
    ) -> Result<AnalyzeRequest> {
        if text.trim().is_empty() {
            return Err(PerspectiveError::EmptyText);
        }

        let attributes = resolver::resolve(selection, options.skip_on_unknown)?;
        if attributes.is_empty() {
            // every token was skipped as unknown
            return Err(PerspectiveError::MissingAttributes);
        }

        let language = match language.map(str::trim).filter(|l| !l.is_empty()) {
            Some(input) => match language::language_code(input) {
                Some(code) => Some(code.to_string()),
                None => {
                    if self.logs(LogLevel::Warn) {
                        warn!("Unknown language \"{}\", letting the service detect it", input);
                    }
                    None
                }
            },
            None => None,
        };

        Ok(AnalyzeRequest {
            text: text.to_string(),
            attributes,
            language,
            do_not_store: self.config.do_not_store,
            span_annotations: self.config.span_annotations,
        })
    }

    async fn dispatch(&self, mut request: AnalyzeRequest, options: AnalyzeOptions) -> Result<AnalyzeOutcome> {
        let started = Instant::now();
        let budget = request.attributes.len();
        let mut retries = 0usize;

        let raw = loop {
            if request.attributes.is_empty() {
                if self.logs(LogLevel::Warn) {
                    warn!("Every attribute rejected the language, nothing left to score");
                }
                return Ok(if options.return_raw {
                    AnalyzeOutcome::Raw(json!({ "attributeScores": {} }))
                } else {
                    AnalyzeOutcome::Scores(AnalyzeResult::new())
                });
            }

            if self.logs(LogLevel::Debug) {
                debug!("Requesting {} attributes", request.attributes.len());
            }

            let err = match self.transport.analyze(&self.token, &request.to_body()).await {
                Ok(raw) => break raw,
                Err(e) => translate_rejection(e),
            };

            match err {
                PerspectiveError::UnsupportedLanguage { attribute, language }
                    if options.skip_on_lang && retries < budget =>
                {
                    let before = request.attributes.len();
                    request.attributes.retain(|a| a.as_str() != attribute);
                    if request.attributes.len() == before {
                        // naming an attribute we did not send would loop forever
                        return Err(PerspectiveError::UnsupportedLanguage { attribute, language });
                    }
                    retries += 1;
                    if self.logs(LogLevel::Warn) {
                        warn!("Skipping {}: language \"{}\" is not supported", attribute, language);
                    }
                }
                other => return Err(other),
            }
        };

        if options.return_raw {
            if self.logs(LogLevel::Info) {
                info!("Analyzed in {:.2?}", started.elapsed());
            }
            return Ok(AnalyzeOutcome::Raw(raw));
        }

        let result = AnalyzeResult::from_response(&raw, &request.attributes)?;
        if self.logs(LogLevel::Info) {
            info!(
                "Analyzed {} attributes in {:.2?}",
                result.len(),
                started.elapsed()
            );
            if let Some(top) = result.highest() {
                info!("Highest score: {} ({:.2}%)", top.attribute, top.value);
            }
        }
        Ok(AnalyzeOutcome::Scores(result))
    }
}

/// Map a service rejection to the typed error its message describes
fn translate_rejection(err: PerspectiveError) -> PerspectiveError {
    let PerspectiveError::Remote { status, message } = err else {
        return err;
    };

    if let Some((attribute, language)) = parse_language_rejection(&message) {
        return PerspectiveError::UnsupportedLanguage { attribute, language };
    }
    if message.contains(INVALID_KEY) {
        return PerspectiveError::InvalidToken;
    }
    PerspectiveError::Http(format!("status {}: {}", status, message))
}

/// `Attribute SPAM does not support request languages: tr` -> (`SPAM`, `tr`)
fn parse_language_rejection(message: &str) -> Option<(String, String)> {
    let idx = message.find(LANGUAGE_REJECTION)?;
    let attribute = message[..idx]
        .split_whitespace()
        .last()?
        .trim_matches('"')
        .to_string();

    let language = message[idx + LANGUAGE_REJECTION.len()..]
        .trim_start_matches(':')
        .split(|c: char| c == ',' || c == '"' || c.is_whitespace())
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string();

    if attribute.is_empty() {
        return None;
    }
    Some((attribute, language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeGroup;
    use crate::scores::SortOrder;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Scores every requested attribute with `value`, rejecting `unsupported`
    /// attributes for the request's language the way the service does
    struct StubTransport {
        value: f64,
        unsupported: Vec<&'static str>,
        valid_token: &'static str,
        /// Fixed rejection returned for every analyze request
        failure: Option<String>,
        bodies: Arc<Mutex<Vec<Value>>>,
    }

    impl StubTransport {
        fn new(value: f64) -> Self {
            Self {
                value,
                unsupported: Vec::new(),
                valid_token: "good-key",
                failure: None,
                bodies: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing(mut self, message: &str) -> Self {
            self.failure = Some(message.to_string());
            self
        }

        fn rejecting(mut self, attrs: &[&'static str]) -> Self {
            self.unsupported = attrs.to_vec();
            self
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn verify_token(&self, token: &str) -> Result<()> {
            if token == self.valid_token {
                Ok(())
            } else {
                Err(PerspectiveError::Remote {
                    status: 400,
                    message: "API key not valid. Please pass a valid API key.".to_string(),
                })
            }
        }

        async fn analyze(&self, _token: &str, body: &Value) -> Result<Value> {
            self.bodies.lock().unwrap().push(body.clone());
            let requested = body["requestedAttributes"].as_object().unwrap();
            let lang = body["languages"][0].as_str().unwrap_or("en");

            if let Some(message) = &self.failure {
                return Err(PerspectiveError::Remote {
                    status: 400,
                    message: message.clone(),
                });
            }

            if let Some(bad) = requested.keys().find(|k| self.unsupported.contains(&k.as_str())) {
                return Err(PerspectiveError::Remote {
                    status: 400,
                    message: format!("Attribute {} does not support request languages: {}", bad, lang),
                });
            }

            let scores: Map<String, Value> = requested
                .keys()
                .map(|k| (k.clone(), json!({"summaryScore": {"value": self.value, "type": "PROBABILITY"}})))
                .collect();
            Ok(json!({ "attributeScores": scores, "languages": [lang] }))
        }
    }

    async fn client_with(stub: StubTransport) -> Client {
        Client::with_transport("good-key", Box::new(stub), ClientConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_single_attribute_scaled_to_percent() {
        let client = client_with(StubTransport::new(0.42)).await;
        let result = client
            .analyze_scores("Never gonna give you up", vec!["TOXICITY"], None, AnalyzeOptions::default())
            .await
            .unwrap();

        assert_eq!(result.attributes(), vec![Attribute::Toxicity]);
        assert!((result.get(Attribute::Toxicity).unwrap() - 42.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_request_body_shape() {
        let stub = StubTransport::new(0.1);
        let bodies = stub.bodies.clone();
        let client = client_with(stub).await;
        client
            .analyze("hello", vec!["insult", "toxicity"], Some("German"), AnalyzeOptions::default())
            .await
            .unwrap();

        let bodies = bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        let body = &bodies[0];
        assert_eq!(body["comment"]["text"], "hello");
        assert_eq!(body["languages"], json!(["de"]));
        let keys: Vec<_> = body["requestedAttributes"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["INSULT", "TOXICITY"]);
        assert_eq!(body["requestedAttributes"]["INSULT"], json!({}));
        assert!(body.get("doNotStore").is_none());
    }

    #[tokio::test]
    async fn test_unknown_language_is_omitted() {
        let stub = StubTransport::new(0.1);
        let bodies = stub.bodies.clone();
        let client = client_with(stub).await;
        client
            .analyze("hello", AttributeGroup::Production, Some("zzzzzzzzzz"), AnalyzeOptions::default())
            .await
            .unwrap();
        assert!(bodies.lock().unwrap()[0].get("languages").is_none());
    }

    #[tokio::test]
    async fn test_blank_text_fails_before_dispatch() {
        let stub = StubTransport::new(0.1);
        let bodies = stub.bodies.clone();
        let client = client_with(stub).await;
        let err = client
            .analyze("   ", vec!["TOXICITY"], None, AnalyzeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PerspectiveError::EmptyText));
        assert!(bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_attributes_fail() {
        let client = client_with(StubTransport::new(0.1)).await;
        let err = client
            .analyze("hello", Vec::<String>::new(), None, AnalyzeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PerspectiveError::MissingAttributes));
    }

    #[tokio::test]
    async fn test_all_unknown_skipped_does_not_dispatch() {
        let stub = StubTransport::new(0.1);
        let bodies = stub.bodies.clone();
        let client = client_with(stub).await;
        let options = AnalyzeOptions {
            skip_on_unknown: true,
            ..Default::default()
        };
        let err = client
            .analyze("hello", vec!["xyzzy", "qwertyuiop"], None, options)
            .await
            .unwrap_err();
        assert!(matches!(err, PerspectiveError::MissingAttributes));
        assert!(bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_skip_on_lang_retries_without_rejected_attribute() {
        let stub = StubTransport::new(0.42).rejecting(&["SPAM"]);
        let bodies = stub.bodies.clone();
        let client = client_with(stub).await;
        let options = AnalyzeOptions {
            skip_on_lang: true,
            ..Default::default()
        };
        let result = client
            .analyze_scores("Merhaba", vec!["TOXICITY", "SPAM"], Some("tr"), options)
            .await
            .unwrap();

        assert_eq!(result.attributes(), vec![Attribute::Toxicity]);
        assert_eq!(bodies.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_language_without_skip() {
        let client = client_with(StubTransport::new(0.42).rejecting(&["SPAM"])).await;
        let err = client
            .analyze("Merhaba", vec!["TOXICITY", "SPAM"], Some("tr"), AnalyzeOptions::default())
            .await
            .unwrap_err();
        match err {
            PerspectiveError::UnsupportedLanguage { attribute, language } => {
                assert_eq!(attribute, "SPAM");
                assert_eq!(language, "tr");
            }
            other => panic!("Expected UnsupportedLanguage, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_skip_on_lang_exhausting_every_attribute() {
        let stub = StubTransport::new(0.42).rejecting(&["SPAM", "OBSCENE"]);
        let bodies = stub.bodies.clone();
        let client = client_with(stub).await;
        let options = AnalyzeOptions {
            skip_on_lang: true,
            ..Default::default()
        };
        let result = client
            .analyze_scores("Merhaba", vec!["SPAM", "OBSCENE"], Some("tr"), options)
            .await
            .unwrap();
        assert!(result.is_empty());
        // one request per attribute, no request once nothing is left
        assert_eq!(bodies.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rejection_for_unrequested_attribute_is_not_retried() {
        let stub = StubTransport::new(0.42)
            .failing("Attribute OBSCENE does not support request languages: tr");
        let bodies = stub.bodies.clone();
        let client = client_with(stub).await;
        let options = AnalyzeOptions {
            skip_on_lang: true,
            ..Default::default()
        };
        let err = client
            .analyze("Merhaba", vec!["TOXICITY", "SPAM"], Some("tr"), options)
            .await
            .unwrap_err();
        match err {
            PerspectiveError::UnsupportedLanguage { attribute, language } => {
                assert_eq!(attribute, "OBSCENE");
                assert_eq!(language, "tr");
            }
            other => panic!("Expected UnsupportedLanguage, got {:?}", other),
        }
        assert_eq!(bodies.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_key_during_analyze() {
        let client = client_with(
            StubTransport::new(0.1).failing("API key not valid. Please pass a valid API key."),
        )
        .await;
        let err = client
            .analyze("hello", Attribute::Toxicity, None, AnalyzeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PerspectiveError::InvalidToken));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_is_unreachable() {
        let config = ClientConfig {
            discovery_url: "http://127.0.0.1:1/discovery".to_string(),
            endpoint: "http://127.0.0.1:1".to_string(),
            timeout_secs: 5,
            ..ClientConfig::default()
        };
        let err = Client::connect("any-key", config).await.unwrap_err();
        assert!(matches!(err, PerspectiveError::Unreachable(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_formatted_scores_are_stable_under_sorting() {
        let client = client_with(StubTransport::new(0.4237)).await;
        let result = client
            .analyze_scores("hello", vec!["TOXICITY"], None, AnalyzeOptions::default())
            .await
            .unwrap();

        let plain = crate::report::format_response(&result, false, None).unwrap();
        assert_eq!(plain, "Toxicity: 42.37%");
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            assert_eq!(crate::report::format_response(&result, false, Some(order)).unwrap(), plain);
        }
    }

    #[tokio::test]
    async fn test_set_log_level() {
        let mut client = client_with(StubTransport::new(0.1)).await;
        assert_eq!(client.log_level(), LogLevel::Info);
        client.set_log_level(LogLevel::Off);
        assert_eq!(client.log_level(), LogLevel::Off);
        assert_eq!(client.config().log_level, LogLevel::Off);
        // a silent client still analyzes
        client
            .analyze("hello", Attribute::Insult, None, AnalyzeOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_return_raw() {
        let client = client_with(StubTransport::new(0.5)).await;
        let options = AnalyzeOptions {
            return_raw: true,
            ..Default::default()
        };
        let outcome = client
            .analyze("hello", Attribute::Spam, None, options)
            .await
            .unwrap();
        match &outcome {
            AnalyzeOutcome::Raw(raw) => {
                assert_eq!(raw["attributeScores"]["SPAM"]["summaryScore"]["value"], json!(0.5));
            }
            other => panic!("Expected raw outcome, got {:?}", other),
        }
        let scores = outcome.into_scores().unwrap();
        assert_eq!(scores.get(Attribute::Spam), Some(50.0));
    }

    #[tokio::test]
    async fn test_invalid_token_at_construction() {
        let err = Client::with_transport("bad-key", Box::new(StubTransport::new(0.1)), ClientConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PerspectiveError::InvalidToken));
    }

    #[tokio::test]
    async fn test_change_token_keeps_old_on_failure() {
        let mut client = client_with(StubTransport::new(0.1)).await;
        assert!(matches!(
            client.change_token("other").await,
            Err(PerspectiveError::InvalidToken)
        ));
        assert_eq!(client.token, "good-key");
        client.change_token("good-key").await.unwrap();
    }

    #[test]
    fn test_translate_rejection() {
        let unknown = translate_rejection(PerspectiveError::Remote {
            status: 500,
            message: "Internal error".to_string(),
        });
        assert!(matches!(unknown, PerspectiveError::Http(msg) if msg.contains("Internal error")));

        let passthrough = translate_rejection(PerspectiveError::Unreachable("dns".to_string()));
        assert!(matches!(passthrough, PerspectiveError::Unreachable(_)));
    }

    #[test]
    fn test_parse_language_rejection() {
        assert_eq!(
            parse_language_rejection("Attribute SEVERE_TOXICITY does not support request languages: ja"),
            Some(("SEVERE_TOXICITY".to_string(), "ja".to_string()))
        );
        assert_eq!(
            parse_language_rejection("\"Attribute SPAM does not support request languages: tr, en\""),
            Some(("SPAM".to_string(), "tr".to_string()))
        );
        assert_eq!(parse_language_rejection("Comment too long"), None);
    }

    #[test]
    fn test_log_level_is_per_instance() {
        let config = ClientConfig {
            log_level: LogLevel::Off,
            ..ClientConfig::default()
        };
        assert!(!config.log_level.allows(LogLevel::Error));
        assert_eq!(ClientConfig::default().log_level, LogLevel::Info);
    }
}
