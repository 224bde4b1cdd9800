use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use crate::models::{Identity, Session};
use crate::services::identity::{IdentityError, IdentityProvider, RegisteredUser};

/// Supabase GoTrue client
///
/// Handles all communication with the hosted auth service:
/// - Creating users through the admin API
/// - Password sign-in
/// - Resolving access tokens to users
pub struct SupabaseIdentity {
    base_url: String,
    service_role_key: String,
    anon_key: String,
    client: Client,
}

impl SupabaseIdentity {
    /// Create a new Supabase client
    ///
    /// Without an anon key, the service role key is sent as `apikey`.
    pub fn new(
        base_url: String,
        service_role_key: String,
        anon_key: Option<String>,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            anon_key: anon_key.unwrap_or_else(|| service_role_key.clone()),
            service_role_key,
            client,
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Best-effort human message from a GoTrue error body
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Supabase returned {}", status))
}

fn display_name(user: &Value) -> Option<String> {
    user.pointer("/user_metadata/name")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    fn provider(&self) -> &'static str {
        "supabase"
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredUser, IdentityError> {
        let payload = json!({
            "email": email,
            "password": password,
            "user_metadata": { "name": name },
            // No mail server is configured, so accounts are confirmed up front
            "email_confirm": true,
        });

        let response = self
            .client
            .post(self.auth_url("admin/users"))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let message = error_message(response).await;
            tracing::info!("Supabase rejected registration for {}: {}", email, message);
            return Err(IdentityError::Rejected(message));
        }
        if !status.is_success() {
            return Err(IdentityError::InvalidResponse(format!(
                "Failed to create user: {}",
                status
            )));
        }

        let json: Value = response.json().await?;
        let user_id = json
            .get("id")
            .or_else(|| json.pointer("/user/id"))
            .and_then(Value::as_str)
            .ok_or_else(|| IdentityError::InvalidResponse("Missing user id".into()))?;

        Ok(RegisteredUser {
            user_id: user_id.to_string(),
            password_hash: None,
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let response = self
            .client
            .post(self.auth_url("token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                return Err(IdentityError::InvalidCredentials)
            }
            status if !status.is_success() => {
                return Err(IdentityError::InvalidResponse(format!("Failed to sign in: {}", status)))
            }
            _ => {}
        }

        let json: Value = response.json().await?;
        let access_token = json
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| IdentityError::InvalidResponse("Missing access_token".into()))?;

        let user_name = json
            .get("user")
            .and_then(display_name)
            .unwrap_or_else(|| email.to_string());

        Ok(Session {
            access_token: access_token.to_string(),
            user_name,
        })
    }

    async fn validate(&self, token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(IdentityError::Unauthorized(error_message(response).await));
        }
        if !status.is_success() {
            return Err(IdentityError::InvalidResponse(format!(
                "Failed to resolve token: {}",
                status
            )));
        }

        let user: Value = response.json().await?;
        let user_id = user
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| IdentityError::InvalidResponse("Missing user id".into()))?;

        Ok(Identity {
            user_id: user_id.to_string(),
            email: user.get("email").and_then(Value::as_str).map(str::to_string),
            name: display_name(&user),
        })
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .delete(self.auth_url(&format!("admin/users/{}", user_id)))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await?;

        let status = response.status();
        // Already gone is as good as deleted
        if status.is_success() || status == StatusCode::NOT_FOUND {
            tracing::info!("Removed Supabase user {}", user_id);
            return Ok(());
        }

        Err(IdentityError::InvalidResponse(format!(
            "Failed to delete user {}: {}",
            user_id, status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_url_trims_slash() {
        let identity = SupabaseIdentity::new(
            "https://project.supabase.co/".to_string(),
            "service".to_string(),
            None,
        )
        .unwrap();

        assert_eq!(identity.auth_url("user"), "https://project.supabase.co/auth/v1/user");
        assert_eq!(identity.anon_key, "service");
    }

    #[test]
    fn test_display_name() {
        let user = json!({ "id": "u1", "user_metadata": { "name": "Ana" } });
        assert_eq!(display_name(&user).as_deref(), Some("Ana"));
        assert_eq!(display_name(&json!({ "id": "u1" })), None);
    }
}
