//! Blocking client for the Transparency at Work partner API.
//!
//! # Overview
//! Signs in, then lists, fetches, searches and creates employers and
//! sectors. Whatever shape the API answers in, every operation returns one
//! [`Envelope`]: a success with records (and page metadata for paginated
//! listings) or an error with a message.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest` / `HttpResponse`).
//!   The network round-trip sits behind the [`Transport`] trait; a `ureq`
//!   implementation ships behind the default `ureq` feature.
//! - `Session` holds the base URL and bearer token; it is written once by
//!   [`Session::authenticate`] and borrowed by every endpoint.
//! - `ResourceEndpoint` is one generic engine configured by a
//!   `ResourceDescriptor`; [`normalize`](normalize::normalize) turns bodies
//!   into envelopes.
//! - Only blank credentials are a hard error. Everything else is reported
//!   inside the envelope, and `full_list` stops quietly at the first bad page.
//!
//! ```no_run
//! use capqi_core::{factory, AuthKind, ResourceKind, Settings};
//!
//! let settings = Settings::from_env();
//! let transport = factory::transport_from_settings(&settings);
//! let session = factory::new_session(&settings, AuthKind::Basic, &transport)?;
//! let employers = factory::new_endpoint(ResourceKind::Employers, &session, &transport);
//! let all = employers.full_list();
//! println!("{} employers", all.total());
//! # Ok::<(), capqi_core::AuthError>(())
//! ```

pub mod config;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod factory;
pub mod http;
pub mod normalize;
pub mod resource;
pub mod session;
pub mod transport;
pub mod urls;

pub use config::{Credentials, Language, Settings};
pub use endpoint::ResourceEndpoint;
pub use envelope::{Envelope, PageInfo};
pub use error::{ApiError, AuthError, TransportError};
pub use factory::AuthKind;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use normalize::RequestKind;
pub use resource::{Pagination, ResourceDescriptor, ResourceKind, UnknownKind};
pub use session::Session;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
