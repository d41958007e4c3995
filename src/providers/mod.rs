/*!
 * Provider registry for translation services.
 *
 * Every supported provider speaks the same OpenAI-compatible chat-completion
 * protocol, so a provider is described by data (endpoint, credential lookup,
 * model list) and bound to one shared client:
 * - OpenAI, Anthropic, DeepSeek, Grok, Gemini, GLM
 */

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{ConfigurationError, ProviderError};
use crate::providers::chat_completion::{ChatCompletionClient, ChatMessage, DEFAULT_TIMEOUT_SECS};
use crate::providers::prompts::SystemPrompt;
use crate::vault::CredentialVault;

pub mod chat_completion;
pub mod prompts;

/// The one capability every provider exposes
///
/// Implementations must be safe to share with the background worker, which
/// calls `translate` once per document chunk.
#[async_trait]
pub trait Translate: Send + Sync + Debug {
    /// Translate `text` between the given languages
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError>;
}

/// Translation provider identifier
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    // @provider: OpenAI
    #[default]
    OpenAi,
    // @provider: Anthropic
    Anthropic,
    // @provider: DeepSeek
    DeepSeek,
    // @provider: Grok (xAI)
    Grok,
    // @provider: Google Gemini
    Gemini,
    // @provider: GLM (Zhipu AI)
    Glm,
}

impl ProviderId {
    /// All providers in registry order
    pub const ALL: [ProviderId; 6] = [
        Self::OpenAi,
        Self::Anthropic,
        Self::DeepSeek,
        Self::Grok,
        Self::Gemini,
        Self::Glm,
    ];

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::DeepSeek => "DeepSeek",
            Self::Grok => "Grok (xAI)",
            Self::Gemini => "Google Gemini",
            Self::Glm => "GLM (Zhipu AI)",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::DeepSeek => "deepseek",
            Self::Grok => "grok",
            Self::Gemini => "gemini",
            Self::Glm => "glm",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "deepseek" => Ok(Self::DeepSeek),
            "grok" => Ok(Self::Grok),
            "gemini" => Ok(Self::Gemini),
            "glm" => Ok(Self::Glm),
            _ => Err(ConfigurationError::UnknownProvider(s.to_string())),
        }
    }
}

/// Static description of one provider
#[derive(Debug, Clone, Copy)]
pub struct ProviderDescriptor {
    /// Provider identifier
    pub id: ProviderId,
    /// Human-readable name
    pub display_name: &'static str,
    /// Whether a credential must be present before any request
    pub requires_credential: bool,
    /// Models offered, first entries are preferred
    pub models: &'static [&'static str],
    /// Model used when none is selected
    pub default_model: &'static str,
    /// Base URL of the chat-completion API
    pub default_endpoint: &'static str,
    /// Environment variable consulted when the vault has no secret
    pub api_key_env: &'static str,
    /// Environment variable that overrides the endpoint
    pub api_base_env: &'static str,
}

/// All known providers, in registry order
const DESCRIPTORS: &[ProviderDescriptor] = &[
    ProviderDescriptor {
        id: ProviderId::OpenAi,
        display_name: "OpenAI",
        requires_credential: true,
        models: &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-3.5-turbo"],
        default_model: "gpt-4o",
        default_endpoint: "https://api.openai.com/v1",
        api_key_env: "OPENAI_API_KEY",
        api_base_env: "OPENAI_API_BASE",
    },
    ProviderDescriptor {
        id: ProviderId::Anthropic,
        display_name: "Anthropic",
        requires_credential: true,
        models: &[
            "claude-3-opus-20240229",
            "claude-3-sonnet-20240229",
            "claude-3-haiku-20240307",
        ],
        default_model: "claude-3-opus-20240229",
        default_endpoint: "https://api.anthropic.com/v1",
        api_key_env: "ANTHROPIC_API_KEY",
        api_base_env: "ANTHROPIC_API_BASE",
    },
    ProviderDescriptor {
        id: ProviderId::DeepSeek,
        display_name: "DeepSeek",
        requires_credential: true,
        models: &["deepseek-chat", "deepseek-coder"],
        default_model: "deepseek-chat",
        default_endpoint: "https://api.deepseek.com/v1",
        api_key_env: "DEEPSEEK_API_KEY",
        api_base_env: "DEEPSEEK_API_BASE",
    },
    ProviderDescriptor {
        id: ProviderId::Grok,
        display_name: "Grok (xAI)",
        requires_credential: true,
        models: &["grok-1", "grok-1.5"],
        default_model: "grok-1",
        default_endpoint: "https://api.x.ai/v1",
        api_key_env: "GROK_API_KEY",
        api_base_env: "GROK_API_BASE",
    },
    ProviderDescriptor {
        id: ProviderId::Gemini,
        display_name: "Google Gemini",
        requires_credential: true,
        models: &["gemini-1.5-pro", "gemini-1.5-flash", "gemini-1.0-pro"],
        default_model: "gemini-1.5-pro",
        default_endpoint: "https://generativelanguage.googleapis.com/v1beta/openai",
        api_key_env: "GOOGLE_API_KEY",
        api_base_env: "GEMINI_API_BASE",
    },
    ProviderDescriptor {
        id: ProviderId::Glm,
        display_name: "GLM (Zhipu AI)",
        requires_credential: true,
        models: &["glm-4", "glm-4-flash"],
        default_model: "glm-4",
        default_endpoint: "https://open.bigmodel.cn/api/paas/v4",
        api_key_env: "GLM_API_KEY",
        api_base_env: "GLM_API_BASE",
    },
];

/// Everything needed to bind one provider for a batch
#[derive(Debug, Clone)]
pub struct ProviderSelection {
    /// Which provider to bind
    pub provider: ProviderId,
    /// Model override, descriptor default when empty
    pub model: Option<String>,
    /// Credential, resolved from the vault or environment by the caller
    pub api_key: Option<SecretString>,
    /// Endpoint override, environment or descriptor default when empty
    pub endpoint: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ProviderSelection {
    /// Create a selection with descriptor defaults
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            model: None,
            api_key: None,
            endpoint: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the model override
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the credential
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the endpoint override
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Registry that turns a [`ProviderSelection`] into a bound translator
///
/// Construction is explicit: the binary builds one registry and passes it
/// where needed, there is no global instance.
#[derive(Debug, Default)]
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Create a registry over the built-in provider table
    pub fn new() -> Self {
        Self
    }

    /// Descriptor for a provider
    pub fn descriptor(&self, id: ProviderId) -> &'static ProviderDescriptor {
        DESCRIPTORS
            .iter()
            .find(|descriptor| descriptor.id == id)
            .unwrap_or(&DESCRIPTORS[0])
    }

    /// All descriptors in registry order
    pub fn descriptors(&self) -> &'static [ProviderDescriptor] {
        DESCRIPTORS
    }

    /// Resolve the credential for a provider: vault first, then the
    /// provider's environment variable.
    pub fn resolve_credential(
        &self,
        vault: &CredentialVault,
        id: ProviderId,
    ) -> Option<SecretString> {
        if let Some(secret) = vault.get(id.as_str()) {
            return Some(secret);
        }
        std::env::var(self.descriptor(id).api_key_env)
            .ok()
            .filter(|value| !value.is_empty())
            .map(SecretString::from)
    }

    /// Bind a provider for a batch.
    ///
    /// Fails fast, before any network activity, when a required credential
    /// is missing or the endpoint cannot be parsed.
    pub fn create(
        &self,
        selection: &ProviderSelection,
    ) -> Result<BoundTranslator, ConfigurationError> {
        let descriptor = self.descriptor(selection.provider);

        let has_credential = selection
            .api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty());
        if descriptor.requires_credential && !has_credential {
            return Err(ConfigurationError::MissingCredential {
                provider: descriptor.id.to_string(),
            });
        }

        let endpoint = self.resolve_endpoint(descriptor, selection.endpoint.as_deref())?;

        let model = match selection.model.as_deref() {
            Some(model) if !model.is_empty() => {
                if !descriptor.models.contains(&model) {
                    log::warn!(
                        "Model '{}' is not in the known list for {}; using it anyway",
                        model,
                        descriptor.display_name
                    );
                }
                model.to_string()
            }
            _ => descriptor.default_model.to_string(),
        };

        let client = ChatCompletionClient::new(endpoint, model, selection.api_key.clone())
            .with_timeout(selection.timeout);
        Ok(BoundTranslator::new(selection.provider, client))
    }

    /// Pick the endpoint: explicit override, then the provider's environment
    /// variable, then the descriptor default. The result must parse as an
    /// http(s) URL.
    fn resolve_endpoint(
        &self,
        descriptor: &ProviderDescriptor,
        override_url: Option<&str>,
    ) -> Result<String, ConfigurationError> {
        let candidate = override_url
            .map(str::to_string)
            .filter(|url| !url.is_empty())
            .or_else(|| {
                std::env::var(descriptor.api_base_env)
                    .ok()
                    .filter(|url| !url.is_empty())
            })
            .unwrap_or_else(|| descriptor.default_endpoint.to_string());

        let parsed = Url::parse(&candidate).map_err(|e| ConfigurationError::InvalidEndpoint {
            url: candidate.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidEndpoint {
                url: candidate,
                reason: "scheme must be http or https".to_string(),
            });
        }

        Ok(candidate.trim_end_matches('/').to_string())
    }
}

/// A provider bound to its endpoint, credential, model, and system prompt
#[derive(Debug)]
pub struct BoundTranslator {
    id: ProviderId,
    client: ChatCompletionClient,
    prompt: SystemPrompt,
}

impl BoundTranslator {
    fn new(id: ProviderId, client: ChatCompletionClient) -> Self {
        Self {
            id,
            client,
            prompt: SystemPrompt::technical_translator(),
        }
    }

    /// Provider identifier this translator is bound to
    pub fn id(&self) -> ProviderId {
        self.id
    }

    /// Model this translator sends
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Endpoint this translator posts to
    pub fn endpoint(&self) -> &str {
        self.client.base_url()
    }
}

#[async_trait]
impl Translate for BoundTranslator {
    // The fixed system prompt is part of the provider's identity and is
    // prepended on every call; callers cannot override it.
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let system = self.prompt.render(source_lang, target_lang);
        let messages = vec![ChatMessage::system(system), ChatMessage::user(text)];
        self.client.complete(messages).await
    }
}
