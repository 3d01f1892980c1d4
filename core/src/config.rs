//! Client settings and the credentials derived from them.
//!
//! # Design
//! `Settings` is the loose, user-facing input: every field is optional so it
//! can be deserialized from any serde format or read from the environment.
//! `Credentials` is the resolved form handed to `authenticate`, with the
//! language allow-list and the base URL template already applied.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base URL of the live partner API; `{lang}` is substituted.
pub const BASE_URL_TEMPLATE: &str = "https://transparencyatwork.org/{lang}/api/partners/v1/";

/// Languages the partner API translates its values into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub const fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// Accepts only the lower-case ISO tags on the allow-list.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "en" => Some(Language::En),
            "fr" => Some(Language::Fr),
            _ => None,
        }
    }

    /// Unknown or missing tags fall back to the default without complaint.
    pub fn from_tag_or_default(tag: Option<&str>) -> Self {
        tag.and_then(Self::from_tag).unwrap_or_default()
    }

    pub fn base_url(self) -> String {
        BASE_URL_TEMPLATE.replace("{lang}", self.as_str())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw client settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub email: String,
    pub password: String,
    pub lang: Option<String>,
    /// Replaces the computed base URL entirely when non-blank.
    pub url: Option<String>,
    /// A token from an earlier login; skips the sign-in call.
    pub access_token: Option<String>,
    pub debug: bool,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Read settings from `CAPQI_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            email: lookup("CAPQI_EMAIL").unwrap_or_default(),
            password: lookup("CAPQI_PASSWORD").unwrap_or_default(),
            lang: lookup("CAPQI_LANG"),
            url: lookup("CAPQI_URL"),
            access_token: lookup("CAPQI_ACCESS_TOKEN").filter(|t| !t.trim().is_empty()),
            debug: lookup("CAPQI_DEBUG").is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes")),
            timeout_secs: lookup("CAPQI_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()),
        }
    }

    pub fn language(&self) -> Language {
        Language::from_tag_or_default(self.lang.as_deref())
    }

    pub fn base_url(&self) -> String {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.language().base_url(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
            base_url: self.base_url(),
            lang: self.language(),
            access_token: self.access_token.clone(),
        }
    }
}

/// Everything `authenticate` needs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub base_url: String,
    pub lang: Language,
    pub access_token: Option<String>,
}

impl Credentials {
    /// Credentials for the live API in the default language.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            base_url: Language::default().base_url(),
            lang: Language::default(),
            access_token: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("lang", &self.lang)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_language_builds_english_url() {
        let settings = Settings::default();
        assert_eq!(settings.language(), Language::En);
        assert_eq!(
            settings.base_url(),
            "https://transparencyatwork.org/en/api/partners/v1/"
        );
    }

    #[test]
    fn french_is_substituted_into_template() {
        let settings = Settings {
            lang: Some("fr".to_string()),
            ..Settings::default()
        };
        assert_eq!(
            settings.base_url(),
            "https://transparencyatwork.org/fr/api/partners/v1/"
        );
    }

    #[test]
    fn unknown_language_falls_back_silently() {
        let settings = Settings {
            lang: Some("de".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.language(), Language::En);
    }

    #[test]
    fn url_override_wins_over_language() {
        let settings = Settings {
            lang: Some("fr".to_string()),
            url: Some("http://localhost:3000/api/partners/v1/".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.base_url(), "http://localhost:3000/api/partners/v1/");
        assert_eq!(settings.credentials().lang, Language::Fr);
    }

    #[test]
    fn blank_url_override_is_ignored() {
        let settings = Settings {
            url: Some("   ".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.base_url(), Language::En.base_url());
    }

    #[test]
    fn from_lookup_reads_all_keys() {
        let settings = Settings::from_lookup(lookup(&[
            ("CAPQI_EMAIL", "partner@example.org"),
            ("CAPQI_PASSWORD", "secret"),
            ("CAPQI_LANG", "fr"),
            ("CAPQI_ACCESS_TOKEN", "tok"),
            ("CAPQI_DEBUG", "true"),
            ("CAPQI_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(settings.email, "partner@example.org");
        assert_eq!(settings.password, "secret");
        assert_eq!(settings.language(), Language::Fr);
        assert_eq!(settings.access_token.as_deref(), Some("tok"));
        assert!(settings.debug);
        assert_eq!(settings.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn from_lookup_drops_blank_token_and_bad_timeout() {
        let settings = Settings::from_lookup(lookup(&[
            ("CAPQI_ACCESS_TOKEN", "  "),
            ("CAPQI_TIMEOUT_SECS", "soon"),
        ]));
        assert!(settings.access_token.is_none());
        assert!(settings.timeout().is_none());
        assert!(!settings.debug);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"email":"a@b.c","password":"pw","lang":"fr"}"#).unwrap();
        assert_eq!(settings.email, "a@b.c");
        assert!(settings.url.is_none());
        assert!(!settings.debug);
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::new("a@b.c", "hunter2").with_access_token("tok-123");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("tok-123"));
        assert!(rendered.contains("a@b.c"));
    }
}
