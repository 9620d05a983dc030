//! OpenAI auth resolution policy.

use crate::{ProviderError, ProviderId, SecureCredentialManager};

use super::types::OpenAiAuth;

/// Resolves OpenAI authentication from API key credentials only.
pub(crate) fn resolve_openai_auth(
    credentials: &SecureCredentialManager,
) -> Result<OpenAiAuth, ProviderError> {
    match credentials.api_key(ProviderId::OpenAi)? {
        Some(api_key) if !api_key.is_blank() => Ok(OpenAiAuth::ApiKey(api_key)),
        _ => Err(ProviderError::authentication("API key is required")),
    }
}
