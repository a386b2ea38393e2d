//! AI request client.
//!
//! Wraps the chat-completion call with a per-call timeout and a bounded
//! retry loop. Timeouts and empty replies are treated as transient and
//! retried against a shared attempt budget; transport and auth failures are
//! assumed non-transient within a run and surfaced immediately. Provider
//! error bodies returned inside a nominally successful reply are surfaced
//! as their own kind.

use crate::config::ProviderConfig;
use crate::error::{NotatError, ProcessingError, Result};
use crate::progress::{NullObserver, ProcessingStatus, ProgressEvent, ProgressObserver};
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Transport seam for issuing a single chat-completion call.
///
/// Returns the reply body, or `None` when the provider answered with an
/// empty message. Timeout handling lives in [`AiRequestClient`], not here.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> std::result::Result<Option<String>, ProcessingError>;
}

/// OpenAI-compatible transport over async-openai.
pub struct OpenAiTransport {
    client: async_openai::Client<OpenAIConfig>,
}

/// Hard cap on a single HTTP request, independent of the per-call timeout.
const HTTP_TIMEOUT_SECS: u64 = 300;

impl OpenAiTransport {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client: async_openai::Client::with_config(config).with_http_client(http_client),
        }
    }
}

#[async_trait]
impl ChatTransport for OpenAiTransport {
    async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> std::result::Result<Option<String>, ProcessingError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| ProcessingError::Request(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| ProcessingError::Request(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()
            .map_err(|e| ProcessingError::Request(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| match e {
            // An error body inside a 2xx reply is provider-reported, not a
            // transport failure.
            OpenAIError::ApiError(api) => ProcessingError::ProviderReported(api.message.clone()),
            other => ProcessingError::Request(other.to_string()),
        })?;

        Ok(response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|s| !s.trim().is_empty()))
    }
}

/// Chat-completion client with timeout and bounded retry.
pub struct AiRequestClient {
    transport: Arc<dyn ChatTransport>,
    max_retries: u32,
    retry_delay: Duration,
    observer: Arc<dyn ProgressObserver>,
}

impl AiRequestClient {
    /// Build a client for the given provider.
    ///
    /// Fails with a configuration error when the provider has no API key or
    /// base URL; no network client is constructed in that case.
    pub fn configure_provider(provider: &ProviderConfig) -> Result<Self> {
        if provider.api_key.trim().is_empty() || provider.base_url.trim().is_empty() {
            return Err(NotatError::Config(format!(
                "Provider '{}' is missing an API key or base URL",
                provider.name
            )));
        }

        Ok(Self::with_transport(Arc::new(OpenAiTransport::new(
            &provider.api_key,
            &provider.base_url,
        ))))
    }

    /// Build a client over an arbitrary transport.
    pub fn with_transport(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            observer: Arc::new(NullObserver),
        }
    }

    /// Set the total attempt budget and the delay between attempts.
    pub fn with_retry(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Set the progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Issue the chat-completion call, returning the raw reply text.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        timeout: Duration,
    ) -> std::result::Result<String, ProcessingError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let status = if attempt == 1 {
                ProcessingStatus::AttemptingRequest
            } else {
                ProcessingStatus::Retrying
            };
            self.observer.notify(&ProgressEvent::new(
                status,
                format!(
                    "Sending request to AI (attempt {}/{})",
                    attempt, self.max_retries
                ),
            ));

            match tokio::time::timeout(
                timeout,
                self.transport.chat(system_prompt, user_prompt, model),
            )
            .await
            {
                Err(_elapsed) => {
                    if attempt >= self.max_retries {
                        return Err(ProcessingError::Timeout { attempts: attempt });
                    }
                    warn!("AI request timed out, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Ok(Err(e)) => return Err(e),
                Ok(Ok(Some(reply))) => {
                    debug!("Received {} chars from AI", reply.len());
                    self.observer.notify(&ProgressEvent::new(
                        ProcessingStatus::ResponseReceived,
                        "Response received from AI",
                    ));
                    return Ok(reply);
                }
                Ok(Ok(None)) => {
                    if attempt >= self.max_retries {
                        return Err(ProcessingError::EmptyResponse { attempts: attempt });
                    }
                    warn!("Empty response from AI, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Scripted, ScriptedTransport};
    use super::*;

    fn client(script: Vec<Scripted>) -> (AiRequestClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(script));
        let client = AiRequestClient::with_transport(transport.clone())
            .with_retry(3, Duration::from_millis(1));
        (client, transport)
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let (client, transport) = client(vec![Scripted::Reply("hello".to_string())]);
        let reply = client
            .complete("sys", "user", "model", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(reply, "hello");
        assert_eq!(*transport.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_timeout_retried_then_surfaced() {
        let (client, transport) =
            client(vec![Scripted::Hang, Scripted::Hang, Scripted::Hang]);
        let err = client
            .complete("sys", "user", "model", Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::Timeout { attempts: 3 }));
        assert_eq!(*transport.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_timeout_then_success() {
        let (client, transport) =
            client(vec![Scripted::Hang, Scripted::Reply("ok".to_string())]);
        let reply = client
            .complete("sys", "user", "model", Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(reply, "ok");
        assert_eq!(*transport.calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_request_failure_not_retried() {
        let (client, transport) = client(vec![Scripted::Fail(|| {
            ProcessingError::Request("401 unauthorized".to_string())
        })]);
        let err = client
            .complete("sys", "user", "model", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::Request(_)));
        assert_eq!(*transport.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_provider_reported_not_retried() {
        let (client, transport) = client(vec![Scripted::Fail(|| {
            ProcessingError::ProviderReported("quota exceeded".to_string())
        })]);
        let err = client
            .complete("sys", "user", "model", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::ProviderReported(_)));
        assert_eq!(*transport.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_response_retried_then_surfaced() {
        let (client, transport) =
            client(vec![Scripted::Empty, Scripted::Empty, Scripted::Empty]);
        let err = client
            .complete("sys", "user", "model", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::EmptyResponse { attempts: 3 }));
        assert_eq!(*transport.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_then_success_shares_budget() {
        let (client, transport) =
            client(vec![Scripted::Empty, Scripted::Reply("late".to_string())]);
        let reply = client
            .complete("sys", "user", "model", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(reply, "late");
        assert_eq!(*transport.calls.lock().unwrap(), 2);
    }

    #[test]
    fn test_configure_provider_requires_credentials() {
        let provider = ProviderConfig {
            name: "acme".to_string(),
            api_key: String::new(),
            base_url: "https://api.acme.test/v1".to_string(),
            model: None,
        };
        assert!(matches!(
            AiRequestClient::configure_provider(&provider),
            Err(NotatError::Config(_))
        ));

        let provider = ProviderConfig {
            name: "acme".to_string(),
            api_key: "sk-test".to_string(),
            base_url: "  ".to_string(),
            model: None,
        };
        assert!(matches!(
            AiRequestClient::configure_provider(&provider),
            Err(NotatError::Config(_))
        ));
    }
}
