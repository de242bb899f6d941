//! Endpoint metadata for the v3 API.
//!
//! Every documented endpoint is listed in a static table together with
//! whether it needs an API key. Names are matched after trimming surrounding
//! slashes, so `/shows/query/` and `shows/query` are the same endpoint.

use std::collections::HashMap;

use phf::phf_map;

use crate::Result;
use crate::error::Error;

static DEFAULT_ENDPOINTS: phf::Map<&'static str, bool> = phf_map! {
    "artists/all" => true,
    "blog/get" => false,
    "collections/get" => true,
    "collections/query" => true,
    "jamcharts/all" => true,
    "jamcharts/get" => true,
    "news/get" => true,
    "people/all" => true,
    "people/byshow" => true,
    "people/get" => true,
    "people/getappearances" => true,
    "relationships/get" => true,
    "reviews/query" => true,
    "setlists/get" => true,
    "setlists/latest" => true,
    "setlists/progressive" => true,
    "setlists/random" => true,
    "setlists/recent" => true,
    "setlists/tiph" => true,
    "shows/get" => true,
    "shows/query" => true,
    "shows/upcoming" => true,
    "user/get" => true,
    "user/myshows/get" => true,
    "user/uid/get" => true,
    "venues/all" => true,
    "venues/get" => true,
};

/// A named API resource and whether calling it needs a credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
    requires_auth: bool,
}

impl Endpoint {
    #[must_use]
    pub fn new<P: AsRef<str>>(path: P, requires_auth: bool) -> Self {
        Self {
            path: normalize(path.as_ref()).to_owned(),
            requires_auth,
        }
    }

    /// Authenticated endpoint, the default for anything not in the registry.
    #[must_use]
    pub fn authenticated<P: AsRef<str>>(path: P) -> Self {
        Self::new(path, true)
    }

    #[must_use]
    pub fn exempt<P: AsRef<str>>(path: P) -> Self {
        Self::new(path, false)
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}

/// Lookup table from endpoint name to [`Endpoint`].
///
/// [`EndpointRegistry::default`] holds the documented v3 endpoints; entries
/// added with [`EndpointRegistry::with`] take precedence over them.
#[derive(Clone, Debug, Default)]
pub struct EndpointRegistry {
    overrides: HashMap<String, Endpoint>,
}

impl EndpointRegistry {
    #[must_use]
    pub fn with(mut self, endpoint: Endpoint) -> Self {
        self.overrides.insert(endpoint.path.clone(), endpoint);
        self
    }

    /// Resolves `name` to its metadata. Unknown names require authentication.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Endpoint {
        let path = normalize(name);
        if let Some(endpoint) = self.overrides.get(path) {
            return endpoint.clone();
        }

        let requires_auth = DEFAULT_ENDPOINTS.get(path).copied().unwrap_or(true);
        Endpoint::new(path, requires_auth)
    }

    #[must_use]
    pub fn is_known(&self, name: &str) -> bool {
        let path = normalize(name);
        self.overrides.contains_key(path) || DEFAULT_ENDPOINTS.contains_key(path)
    }
}

fn normalize(name: &str) -> &str {
    name.trim().trim_matches('/')
}

/// Rejects endpoint names that could leave the base URL once joined to it.
///
/// Names are plain `/`-separated segments: no scheme, query, fragment,
/// backslash, percent-escape or dot segment.
pub(crate) fn check_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::validation("endpoint name cannot be empty"));
    }
    if let Some(c) = path.chars().find(|c| matches!(c, ':' | '?' | '#' | '\\' | '%')) {
        return Err(Error::validation(format!(
            "endpoint name `{path}` contains forbidden character `{c}`"
        )));
    }
    if path
        .split('/')
        .any(|segment| matches!(segment.trim(), "" | "." | ".."))
    {
        return Err(Error::validation(format!(
            "endpoint name `{path}` has an empty or dot segment"
        )));
    }
    Ok(())
}
