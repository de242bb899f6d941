use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use reqwest::{Method, StatusCode};

/// Broad category of an [`Error`], used to branch on failures without downcasting.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Kind {
    /// No API key could be resolved for an endpoint that requires one.
    MissingCredential,
    /// The server answered with a non-success HTTP status.
    Status,
    /// Invalid configuration or request input.
    Validation,
    /// The server answered 2xx but reported a non-zero `error_code`.
    Api,
    /// Connection, DNS, TLS or body decoding failure from the transport layer.
    Transport,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    #[must_use]
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Returns the typed source of this error, e.g. [`Status`] for [`Kind::Status`].
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    #[must_use]
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Validation {
            reason: message.into(),
        }
        .into()
    }

    #[must_use]
    pub fn missing_credential<V: Into<String>>(endpoint: Option<&str>, env_var: V) -> Self {
        MissingCredential {
            endpoint: endpoint.map(str::to_owned),
            env_var: env_var.into(),
        }
        .into()
    }

    #[must_use]
    pub fn status<P: Into<String>, M: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: P,
        message: M,
    ) -> Self {
        Status {
            status_code,
            method,
            path: path.into(),
            message: message.into(),
        }
        .into()
    }

    #[must_use]
    pub fn api<M: Into<String>>(code: Option<i64>, message: M) -> Self {
        ApiFailure {
            code,
            message: message.into(),
        }
        .into()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{}: {src}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Non-success HTTP response. `message` holds the raw response body.
#[non_exhaustive]
#[derive(Debug)]
pub struct Status {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) making {} call to {} with {}",
            self.status_code, self.method, self.path, self.message
        )
    }
}

impl StdError for Status {}

#[non_exhaustive]
#[derive(Debug)]
pub struct MissingCredential {
    pub endpoint: Option<String>,
    pub env_var: String,
}

impl fmt::Display for MissingCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.endpoint {
            Some(endpoint) => write!(
                f,
                "no API key found for `{endpoint}`: pass one explicitly or set {}",
                self.env_var
            ),
            None => write!(
                f,
                "no API key found: pass one explicitly or set {}",
                self.env_var
            ),
        }
    }
}

impl StdError for MissingCredential {}

#[non_exhaustive]
#[derive(Debug)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

/// Error reported inside a successful response envelope.
///
/// `code` is `None` when the envelope carried no `error_code` at all.
#[non_exhaustive]
#[derive(Debug)]
pub struct ApiFailure {
    pub code: Option<i64>,
    pub message: String,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "error code {code}: {}", self.message),
            None => write!(f, "response has no error_code: {}", self.message),
        }
    }
}

impl StdError for ApiFailure {}

impl From<Status> for Error {
    fn from(err: Status) -> Self {
        Error::with_source(Kind::Status, err)
    }
}

impl From<MissingCredential> for Error {
    fn from(err: MissingCredential) -> Self {
        Error::with_source(Kind::MissingCredential, err)
    }
}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

impl From<ApiFailure> for Error {
    fn from(err: ApiFailure) -> Self {
        Error::with_source(Kind::Api, err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::with_source(Kind::Transport, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_source(Kind::Transport, e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Validation, e)
    }
}
