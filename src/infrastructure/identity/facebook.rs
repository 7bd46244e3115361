use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::identity::{ExternalProfile, IdentityError, IdentityProvider};

/// Graph API `/me` answer; `error` is set instead of the profile on failure
#[derive(Debug, Deserialize)]
struct GraphResponse {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    error: Option<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

/// Facebook Graph API profile lookup
pub struct FacebookIdentityProvider {
    client: reqwest::Client,
    graph_url: String,
}

impl FacebookIdentityProvider {
    /// `graph_url` is the API base, e.g. `https://graph.facebook.com`
    pub fn new(graph_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            graph_url: graph_url.into(),
        }
    }
}

fn into_profile(response: GraphResponse) -> Result<ExternalProfile, IdentityError> {
    if let Some(error) = response.error {
        return Err(IdentityError::Rejected(error.message));
    }

    let provider_id = response
        .id
        .ok_or_else(|| IdentityError::Rejected("profile has no id".to_string()))?;

    Ok(ExternalProfile {
        provider_id,
        name: response.name,
        email: response.email,
    })
}

#[async_trait]
impl IdentityProvider for FacebookIdentityProvider {
    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, IdentityError> {
        let response = self
            .client
            .get(format!("{}/me", self.graph_url))
            .query(&[("fields", "id,name,email"), ("access_token", access_token)])
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        // Graph API reports token problems as JSON bodies on 4xx responses
        let body: GraphResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("unreadable response: {e}")))?;

        into_profile(body)
    }
}
