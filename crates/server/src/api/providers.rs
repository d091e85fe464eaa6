use axum::Json;
use postcraft_core::models::LlmProvider;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub default_model: String,
    pub supports_base_url: bool,
    /// Environment variable holding the API key; absent for keyless backends
    pub env_var: Option<String>,
}

impl From<LlmProvider> for ProviderInfo {
    fn from(provider: LlmProvider) -> Self {
        Self {
            id: provider.id().to_string(),
            name: provider.display_name().to_string(),
            default_model: provider.default_model().to_string(),
            supports_base_url: provider.supports_base_url(),
            env_var: provider.env_var().map(str::to_string),
        }
    }
}

/// Completion backends this build can use
#[utoipa::path(
    get,
    path = "/api/providers",
    tag = "system",
    responses((status = 200, description = "Supported completion backends", body = Vec<ProviderInfo>))
)]
pub async fn get_providers() -> Json<Vec<ProviderInfo>> {
    Json(LlmProvider::all().into_iter().map(ProviderInfo::from).collect())
}
