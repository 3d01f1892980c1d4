//! Construction of sessions and endpoints from names and settings.

use std::str::FromStr;

use crate::config::Settings;
use crate::endpoint::ResourceEndpoint;
use crate::error::AuthError;
use crate::resource::{ResourceKind, UnknownKind};
use crate::session::Session;
use crate::transport::Transport;

/// Supported authentication schemes. The partner API only offers
/// email/password login returning a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthKind {
    #[default]
    Basic,
}

impl FromStr for AuthKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" | "basicauth" => Ok(AuthKind::Basic),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

/// Resolve settings into credentials and authenticate.
pub fn new_session<T: Transport>(
    settings: &Settings,
    kind: AuthKind,
    transport: &T,
) -> Result<Session, AuthError> {
    let mut session = match kind {
        AuthKind::Basic => Session::authenticate(&settings.credentials(), transport)?,
    };
    session.set_debug(settings.debug);
    Ok(session)
}

pub fn new_endpoint<'a, T>(
    kind: ResourceKind,
    session: &'a Session,
    transport: &'a T,
) -> ResourceEndpoint<'a, T> {
    ResourceEndpoint::new(session, transport, kind.descriptor())
}

/// Like [`new_endpoint`], with the kind given by name (`"employers"`,
/// `"Sectors"`, ...).
pub fn endpoint_by_name<'a, T>(
    name: &str,
    session: &'a Session,
    transport: &'a T,
) -> Result<ResourceEndpoint<'a, T>, UnknownKind> {
    let kind = name.parse::<ResourceKind>()?;
    Ok(new_endpoint(kind, session, transport))
}

/// A `ureq` transport honouring the configured timeout.
#[cfg(feature = "ureq")]
pub fn transport_from_settings(settings: &Settings) -> crate::transport::UreqTransport {
    crate::transport::UreqTransport::with_timeout(settings.timeout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};
    use std::cell::Cell;

    #[derive(Debug)]
    struct Counting {
        calls: Cell<usize>,
    }

    impl Transport for Counting {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.calls.set(self.calls.get() + 1);
            Ok(HttpResponse::new(200, r#"{"access_token":"fresh","id":1}"#))
        }
    }

    fn settings() -> Settings {
        Settings {
            email: "p@example.org".to_string(),
            password: "pw".to_string(),
            url: Some("http://localhost:3000/api/partners/v1/".to_string()),
            debug: true,
            ..Settings::default()
        }
    }

    #[test]
    fn auth_kind_names() {
        assert_eq!("BasicAuth".parse::<AuthKind>(), Ok(AuthKind::Basic));
        assert!("oauth".parse::<AuthKind>().is_err());
    }

    #[test]
    fn new_session_logs_in_and_applies_debug() {
        let transport = Counting { calls: Cell::new(0) };
        let session = new_session(&settings(), AuthKind::Basic, &transport).unwrap();
        assert!(session.is_valid());
        assert!(session.debug());
        assert_eq!(session.token(), Some("fresh"));
        assert_eq!(transport.calls.get(), 1);
    }

    #[test]
    fn stored_token_in_settings_skips_login() {
        let transport = Counting { calls: Cell::new(0) };
        let settings = Settings {
            access_token: Some("kept".to_string()),
            ..settings()
        };
        let session = new_session(&settings, AuthKind::Basic, &transport).unwrap();
        assert_eq!(session.token(), Some("kept"));
        assert_eq!(transport.calls.get(), 0);
    }

    #[test]
    fn missing_credentials_bubble_up() {
        let transport = Counting { calls: Cell::new(0) };
        let settings = Settings {
            email: " ".to_string(),
            ..settings()
        };
        let err = new_session(&settings, AuthKind::Basic, &transport).unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials);
        assert_eq!(transport.calls.get(), 0);
    }

    #[test]
    fn endpoints_by_name() {
        let transport = Counting { calls: Cell::new(0) };
        let session = new_session(&settings(), AuthKind::Basic, &transport).unwrap();
        let sectors = endpoint_by_name("Sectors", &session, &transport).unwrap();
        assert_eq!(sectors.descriptor().page_size, 15);
        let err = endpoint_by_name("reviews", &session, &transport).unwrap_err();
        assert_eq!(err, UnknownKind("reviews".to_string()));
    }
}
