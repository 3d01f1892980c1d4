//! Authentication against the partner API and per-request option building.
//!
//! # Design
//! A `Session` is produced once by [`Session::authenticate`] and only read
//! afterwards; endpoints borrow it. The login exchange follows the same
//! build/parse split as the endpoints (`build_sign_in` / `parse_sign_in`) so
//! a caller that does its own I/O can drive it step by step.
//!
//! A failed login is not an `Err`: the session comes back with
//! `is_valid() == false` and the server's message in `message()`. Only blank
//! credentials abort before any request is made.

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::{Credentials, Language};
use crate::error::{ApiError, AuthError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::urls;

/// Login endpoint, relative to the base URL.
pub const SIGN_IN_PATH: &str = "sign_in";

const STORED_TOKEN_MESSAGE: &str = "logged with stored token";
const LOGIN_MESSAGE: &str = "logged in with email and password";

#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    lang: Language,
    email: String,
    token: Option<String>,
    partner_id: Option<String>,
    reviews_url: Option<String>,
    status: Option<u16>,
    message: Option<Value>,
    debug: bool,
}

impl Session {
    /// Validate credentials and log in.
    ///
    /// With a stored token no request is made. Otherwise exactly one POST
    /// goes to `sign_in`; its outcome is recorded on the returned session.
    pub fn authenticate<T: Transport>(
        credentials: &Credentials,
        transport: &T,
    ) -> Result<Self, AuthError> {
        let mut session = Self::new(credentials)?;
        if session.token.is_some() {
            return Ok(session);
        }

        let request = match session.build_sign_in(credentials) {
            Ok(request) => request,
            Err(err) => {
                session.message = Some(err.message());
                return Ok(session);
            }
        };
        session.log_request(&request);

        match transport.execute(&request) {
            Ok(response) => session.parse_sign_in(&response),
            Err(err) => {
                tracing::warn!(error = %err, "sign-in request failed");
                session.message = Some(ApiError::TransportFailure.message());
            }
        }
        Ok(session)
    }

    /// Build an unauthenticated session from trimmed credentials.
    ///
    /// A non-blank stored token is adopted straight away and the session is
    /// marked valid.
    pub fn new(credentials: &Credentials) -> Result<Self, AuthError> {
        let email = credentials.email.trim();
        let password = credentials.password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let mut session = Self {
            base_url: credentials.base_url.trim().to_string(),
            lang: credentials.lang,
            email: email.to_string(),
            token: None,
            partner_id: None,
            reviews_url: None,
            status: None,
            message: None,
            debug: false,
        };

        if let Some(token) = credentials
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            tracing::info!(email = %session.email, "using stored access token");
            session.token = Some(token.to_string());
            session.status = Some(200);
            session.message = Some(Value::String(STORED_TOKEN_MESSAGE.to_string()));
        }
        Ok(session)
    }

    pub fn build_sign_in(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let payload = json!({
            "email": credentials.email.trim(),
            "password": credentials.password.trim(),
        });
        self.build_post_options(&payload, SIGN_IN_PATH)
    }

    /// Record the outcome of the sign-in call.
    pub fn parse_sign_in(&mut self, response: &HttpResponse) {
        let body = response.json();
        self.status = Some(response.status);
        self.token = None;

        if response.status == 200 {
            if let Some(token) = body
                .as_ref()
                .and_then(|b| b.get("access_token"))
                .and_then(Value::as_str)
            {
                let body = body.as_ref();
                self.token = Some(token.to_string());
                self.partner_id = body.and_then(|b| b.get("id")).and_then(scalar_to_string);
                self.reviews_url = body
                    .and_then(|b| b.get("reviews_url"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                self.message = Some(Value::String(LOGIN_MESSAGE.to_string()));
                tracing::info!(email = %self.email, "signed in");
                return;
            }
        }

        let Some(body) = body else {
            tracing::warn!(status = response.status, "sign-in returned no body");
            self.message = Some(ApiError::TransportFailure.message());
            return;
        };

        if response.status == 404 || reports_not_found(&body) {
            self.status = Some(404);
            self.message = Some(body.get("error").cloned().unwrap_or(body));
        } else {
            self.message = Some(body.get("errors").cloned().unwrap_or(body));
        }
        tracing::warn!(status = ?self.status, message = ?self.message, "sign-in rejected");
    }

    /// GET request for `path` relative to the base URL.
    pub fn build_get_options(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: urls::join(&self.base_url, path),
            headers: self.headers(),
            body: None,
        }
    }

    /// POST request carrying `payload` as JSON. Before login there is no
    /// token, so no `Authorization` header is sent.
    pub fn build_post_options<P: Serialize + ?Sized>(
        &self,
        payload: &P,
        path: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: urls::join(&self.base_url, path),
            headers: self.headers(),
            body: Some(body),
        })
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        headers
    }

    /// Request logging; raised from `trace` to `debug` by the debug flag.
    pub(crate) fn log_request(&self, request: &HttpRequest) {
        if self.debug {
            tracing::debug!(method = %request.method, endpoint = %request.url, "request");
        } else {
            tracing::trace!(method = %request.method, endpoint = %request.url, "request");
        }
    }

    /// True when the last login (or stored token) ended with HTTP 200 and a
    /// token is held.
    pub fn is_valid(&self) -> bool {
        self.status == Some(200) && self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn partner_id(&self) -> Option<&str> {
        self.partner_id.as_deref()
    }

    pub fn reviews_url(&self) -> Option<&str> {
        self.reviews_url.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub const fn language(&self) -> Language {
        self.lang
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `scheme://host` of the base URL.
    pub fn host_url(&self) -> Option<String> {
        urls::host_only(&self.base_url)
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Outcome of authentication: a status line, or the server's error
    /// payload as it was returned.
    pub fn message(&self) -> Option<&Value> {
        self.message.as_ref()
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub const fn debug(&self) -> bool {
        self.debug
    }
}

fn reports_not_found(body: &Value) -> bool {
    match body.get("status") {
        Some(Value::Number(n)) => n.as_u64() == Some(404),
        Some(Value::String(s)) => s == "404",
        _ => false,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
