use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};

use crate::configuration::LlmSettings;
use crate::domain::text::{clean_text, dash_if_empty, PLACEHOLDER};

// Upper bound on the page text handed to the model.
const MAX_INPUT_CHARS: usize = 12_000;

const SYSTEM_PROMPT: &str =
    "You extract concise product descriptions from messy marketplace page text. \
     Reply with the description sentence(s) in plain text only. \
     If no seller description exists, reply with a single dash '-'.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Provider {
    DeepSeek,
    OpenAi,
}

// The disabled variant answers "-" without any network activity, so callers
// never special-case an absent model.
#[derive(Clone)]
pub enum LlmClient {
    Disabled,
    Enabled {
        provider: Provider,
        client: Client<OpenAIConfig>,
        model: String,
    },
}

impl LlmClient {
    // A selected provider with a missing credential degrades to Disabled
    // with a warning; it is never fatal to startup.
    pub fn from_settings(settings: &LlmSettings) -> Self {
        let provider = settings.provider.trim().to_lowercase();

        match provider.as_str() {
            "" => LlmClient::Disabled,
            "deepseek" => match settings.api_key.clone() {
                None => {
                    log::warn!(
                        "deepseek selected but LLM__API_KEY is missing; extraction stays disabled"
                    );
                    LlmClient::Disabled
                }
                Some(api_key) => Self::configure(
                    Provider::DeepSeek,
                    api_key,
                    settings
                        .base_url
                        .clone()
                        .unwrap_or_else(|| "https://api.deepseek.com".to_string()),
                    settings
                        .model
                        .clone()
                        .unwrap_or_else(|| "deepseek-chat".to_string()),
                ),
            },
            "openai" => match settings.api_key.clone() {
                None => {
                    log::warn!(
                        "openai selected but LLM__API_KEY is missing; extraction stays disabled"
                    );
                    LlmClient::Disabled
                }
                Some(api_key) => Self::configure(
                    Provider::OpenAi,
                    api_key,
                    settings
                        .base_url
                        .clone()
                        .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                    settings
                        .model
                        .clone()
                        .unwrap_or_else(|| "gpt-4o-mini".to_string()),
                ),
            },
            unknown => {
                log::warn!(
                    "unknown llm provider '{}'; description extraction stays disabled",
                    unknown
                );
                LlmClient::Disabled
            }
        }
    }

    fn configure(provider: Provider, api_key: String, base_url: String, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);

        log::info!(
            "language model ready: provider={} model={}",
            provider_tag(provider),
            model
        );

        LlmClient::Enabled {
            provider,
            client: Client::with_config(config),
            model,
        }
    }

    pub fn enabled(&self) -> bool {
        matches!(self, LlmClient::Enabled { .. })
    }

    pub fn provider(&self) -> &'static str {
        match self {
            LlmClient::Disabled => "none",
            LlmClient::Enabled { provider, .. } => provider_tag(*provider),
        }
    }

    // One round trip, no retries; any upstream failure surfaces as Err and
    // the calling tier treats it as "no description available".
    pub async fn extract_description(&self, raw: &str) -> anyhow::Result<String> {
        let (client, model) = match self {
            LlmClient::Disabled => return Ok(PLACEHOLDER.to_string()),
            LlmClient::Enabled { client, model, .. } => (client, model),
        };

        let request = CreateChatCompletionRequestArgs::default()
            .model(model.as_str())
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(build_user_prompt(raw))
                    .build()?
                    .into(),
            ])
            .temperature(0.2)
            .max_tokens(256_u32)
            .build()?;

        let response = client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(dash_if_empty(&content))
    }
}

fn provider_tag(provider: Provider) -> &'static str {
    match provider {
        Provider::DeepSeek => "deepseek",
        Provider::OpenAi => "openai",
    }
}

fn build_user_prompt(raw: &str) -> String {
    let chunk: String = clean_text(raw).chars().take(MAX_INPUT_CHARS).collect();
    format!(
        "Extract the seller-provided description from the following eBay product page text. \
         Skip prices, shipping, return policy, ads and boilerplate. Keep it brief (1-3 sentences). \
         If nothing relevant, reply '-'.\n\n---\n{}",
        chunk
    )
}
