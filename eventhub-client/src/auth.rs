use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use eventhub_core::{SessionStore, UserIdentity};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::ClientError;
use crate::http::ApiClient;

/// Result of an auth call, already reduced to what the UI shows.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthOutcome {
    fn ok(body: &Value, fallback: &str) -> Self {
        Self {
            success: true,
            message: server_message(body).unwrap_or(fallback).to_string(),
            data: body.get("data").cloned().filter(|d| !d.is_null()),
            user: None,
            token: None,
        }
    }

    fn failed(err: &ClientError, fallback: &str) -> Self {
        let message = match err.to_string() {
            m if m.trim().is_empty() => fallback.to_string(),
            m => m,
        };
        Self {
            success: false,
            message,
            data: None,
            user: None,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
}

/// Client for the auth service. Keeps the session store in sync with sign-in state.
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn session(&self) -> &dyn SessionStore {
        self.api.session().as_ref()
    }

    pub async fn sign_up(&self, data: &SignUp) -> AuthOutcome {
        info!("Signing up user {}", data.email);
        match self.api.post("/auth/signup", data).await {
            Ok(body) => AuthOutcome::ok(
                &body,
                "Account created successfully! Please check your email for verification code.",
            ),
            Err(e) => {
                error!("Sign up error: {}", e);
                AuthOutcome::failed(&e, "Failed to create account. Please try again.")
            }
        }
    }

    /// Signs in and stores the access token (and decoded user, if any) in the session.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthOutcome {
        info!("Signing in user {}", email);
        let body = match self
            .api
            .post("/auth/login", &json!({ "email": email, "password": password }))
            .await
        {
            Ok(body) => body,
            Err(e) => {
                error!("Sign in error: {}", e);
                return AuthOutcome::failed(&e, "Invalid email or password. Please try again.");
            }
        };

        let data = body.get("data").cloned().unwrap_or(Value::Null);
        let user = data
            .get("idToken")
            .and_then(Value::as_str)
            .and_then(identity_from_id_token)
            .or_else(|| {
                data.get("user")
                    .and_then(|u| serde_json::from_value(u.clone()).ok())
            });
        let token = data
            .get("accessToken")
            .and_then(Value::as_str)
            .map(str::to_string);

        match &token {
            Some(token) => self.session().store(token.clone(), user.clone()),
            None => warn!("Sign in response carried no access token"),
        }

        AuthOutcome {
            user,
            token,
            ..AuthOutcome::ok(&body, "Successfully signed in!")
        }
    }

    pub async fn verify_email(&self, email: &str, code: &str) -> AuthOutcome {
        match self
            .api
            .post("/auth/verify-email", &json!({ "email": email, "code": code }))
            .await
        {
            Ok(body) => AuthOutcome::ok(&body, "Email verified successfully! You can now sign in."),
            Err(e) => {
                error!("Email verification error: {}", e);
                AuthOutcome::failed(&e, "Invalid verification code. Please try again.")
            }
        }
    }

    pub async fn resend_verification_code(&self, email: &str) -> AuthOutcome {
        match self
            .api
            .post("/auth/resend-verification", &json!({ "email": email }))
            .await
        {
            Ok(body) => AuthOutcome::ok(&body, "Verification code sent to your email."),
            Err(e) => {
                error!("Resend verification error: {}", e);
                AuthOutcome::failed(
                    &e,
                    "Failed to resend verification code. Please try again.",
                )
            }
        }
    }

    /// Always clears the local session, even if the backend call fails.
    pub async fn sign_out(&self) -> AuthOutcome {
        if let Err(e) = self.api.post_empty("/auth/signout").await {
            warn!("Backend signout failed: {}", e);
        }
        self.session().clear();

        AuthOutcome {
            success: true,
            message: "Successfully signed out.".to_string(),
            data: None,
            user: None,
            token: None,
        }
    }

    /// Cached user first, then `GET /auth/me`. A 401 drops the session.
    pub async fn current_user(&self) -> Option<UserIdentity> {
        self.session().token()?;
        if let Some(user) = self.session().user() {
            return Some(user);
        }

        match self.api.get("/auth/me").await {
            Ok(body) => {
                let user: UserIdentity = body
                    .get("user")
                    .and_then(|u| serde_json::from_value(u.clone()).ok())?;
                self.session().set_user(user.clone());
                Some(user)
            }
            Err(e) => {
                error!("Get current user error: {}", e);
                if e.is_unauthorized() {
                    self.session().clear();
                }
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    /// Renames the signed-in user. The cached identity follows when the backend reports `SUCCESS`.
    pub async fn update_user_details(&self, name: &str) -> AuthOutcome {
        match self.api.post("/auth/update", &json!({ "name": name })).await {
            Ok(body) => {
                if body.get("status").and_then(Value::as_str) == Some("SUCCESS") {
                    let cached = self.session().user().or_else(|| {
                        body.get("user")
                            .and_then(|u| serde_json::from_value(u.clone()).ok())
                    });
                    if let Some(mut user) = cached {
                        user.name = Some(name.to_string());
                        self.session().set_user(user);
                    }
                }
                AuthOutcome::ok(&body, "User details updated successfully.")
            }
            Err(e) => {
                error!("Update user details error: {}", e);
                AuthOutcome::failed(&e, "Failed to update user details. Please try again.")
            }
        }
    }
}

fn server_message(body: &Value) -> Option<&str> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: Option<String>,
    user_id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    #[serde(rename = "userType")]
    user_type: Option<String>,
    #[serde(rename = "custom:userType")]
    custom_user_type: Option<String>,
    email_verified: Option<bool>,
}

/// Reads the payload of an ID token. The signature is not checked, so the result
/// is only good for display and form prefill.
pub fn identity_from_id_token(token: &str) -> Option<UserIdentity> {
    let payload = token.split('.').nth(1)?;
    let bytes = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Error decoding JWT: {}", e);
            return None;
        }
    };
    let claims: IdTokenClaims = match serde_json::from_slice(&bytes) {
        Ok(claims) => claims,
        Err(e) => {
            error!("Error decoding JWT: {}", e);
            return None;
        }
    };

    let name = claims.name.or_else(|| match (claims.given_name, claims.family_name) {
        (Some(given), Some(family)) => Some(format!("{} {}", given, family)),
        (Some(given), None) => Some(given),
        (None, Some(family)) => Some(family),
        (None, None) => None,
    });

    Some(UserIdentity {
        id: claims.sub.or(claims.user_id)?,
        email: claims.email.unwrap_or_default(),
        name,
        user_type: claims.user_type.or(claims.custom_user_type),
        is_verified: claims.email_verified.unwrap_or(true),
    })
}
