use std::collections::BTreeMap;

use chrono::{Datelike as _, Utc};
use reqwest::blocking::Client as ReqwestClient;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::credential::Credential;
use crate::endpoint::{self, Endpoint, EndpointRegistry};
use crate::error::Error;
use crate::html::{CLEAN_SETLIST_FIELD, clean_setlist};
use crate::types::{Envelope, FIRST_SHOW_YEAR, SHOWS_QUERY_CAP, Setlists, Shows};
use crate::{API_KEY_PARAM, Result};

/// Query parameters for a single request, kept in key order.
pub type Params = BTreeMap<String, String>;

const MASK: &str = "<<apikey>>";

/// Blocking client for the v3 API.
///
/// The credential is resolved once in [`Client::new`] and never changes
/// afterwards. Construction succeeds without a key; calls to endpoints that
/// need one then fail with [`crate::error::Kind::MissingCredential`].
#[derive(Clone, Debug)]
pub struct Client {
    base_url: Url,
    env_var_name: String,
    credential: Credential,
    registry: EndpointRegistry,
    client: ReqwestClient,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_client(config, ReqwestClient::new())
    }

    /// Client reading its key from `PHISH_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Creates a client with a custom HTTP client.
    pub fn with_client(config: ClientConfig, client: ReqwestClient) -> Result<Self> {
        Self::with_lookup(config, client, |name| std::env::var(name).ok())
    }

    /// Creates a client whose environment fallback goes through `lookup`
    /// instead of the process environment.
    pub fn with_lookup<F>(config: ClientConfig, client: ReqwestClient, lookup: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let base_url = config.validate()?;
        let credential = Credential::resolve_with(
            config.explicit_key.as_ref(),
            &config.env_var_name,
            false,
            lookup,
        )?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            base_url = %base_url,
            has_api_key = !credential.is_empty(),
            "created Phish.net client"
        );

        Ok(Self {
            base_url,
            env_var_name: config.env_var_name,
            credential,
            registry: config.registry,
            client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.credential.is_empty()
    }

    #[must_use]
    pub fn endpoint(&self, name: &str) -> Endpoint {
        self.registry.lookup(name)
    }

    /// Builds the full request URL without sending anything.
    pub fn url_for<I, K, V>(&self, endpoint: &str, params: I) -> Result<Url>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let endpoint = self.registry.lookup(endpoint);
        self.build_url(&endpoint, &collect_params(params))
    }

    /// Sends a GET to `endpoint` and returns the raw body of a 2xx response.
    pub fn request<I, K, V>(&self, endpoint: &str, params: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let endpoint = self.registry.lookup(endpoint);
        let url = self.build_url(&endpoint, &collect_params(params))?;
        let display_url = masked_url(&url);

        let request = self.client.get(url).build()?;
        crate::request(&self.client, request, &display_url)
    }

    /// Sends a request and decodes the response envelope, failing on a
    /// non-zero `error_code`. The `data` payload stays raw JSON.
    pub fn get_json<I, K, V>(&self, endpoint: &str, params: I) -> Result<Envelope>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let body = self.request(endpoint, params)?;
        let envelope: Envelope = serde_json::from_str(&body)?;
        envelope.into_checked()
    }

    /// All venues (`venues/all`).
    pub fn venues(&self) -> Result<Vec<Value>> {
        let envelope = self.get_json("venues/all", Params::new())?;
        Ok(envelope.response.records())
    }

    /// Shows of a single year in ascending date order (`shows/query`).
    ///
    /// The API caps this query at 300 rows. A year that hits the cap is
    /// listed in [`Shows::truncated_years`] and logged.
    pub fn shows_by_year(&self, year: i32) -> Result<Shows> {
        let year_param = year.to_string();
        let envelope = self.get_json(
            "shows/query",
            [("year", year_param.as_str()), ("order", "ASC")],
        )?;

        let mut shows = Shows {
            shows: envelope.response.records(),
            truncated_years: Vec::new(),
        };
        if envelope.response.count >= SHOWS_QUERY_CAP {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                year,
                count = envelope.response.count,
                "year hit the shows/query row cap, results are truncated"
            );
            shows.truncated_years.push(year);
        }

        Ok(shows)
    }

    /// Every show from 1983 through the current year.
    pub fn all_shows(&self) -> Result<Shows> {
        self.shows_between(FIRST_SHOW_YEAR, Utc::now().year())
    }

    /// Shows for each year in `first..=last`, concatenated in year order.
    pub fn shows_between(&self, first: i32, last: i32) -> Result<Shows> {
        let mut all = Shows::default();
        for year in first..=last {
            let Shows {
                shows,
                truncated_years,
            } = self.shows_by_year(year)?;
            all.shows.extend(shows);
            all.truncated_years.extend(truncated_years);
        }
        Ok(all)
    }

    /// Setlist of one show (`setlists/get`). Empty when none is recorded.
    ///
    /// Records with an HTML `setlistdata` field gain a plain-text
    /// `setlistdata_clean` next to it.
    pub fn setlist(&self, showid: u64) -> Result<Vec<Value>> {
        let envelope = self.get_json("setlists/get", [("showid", showid.to_string())])?;
        let mut records = envelope.response.records();
        for record in &mut records {
            add_clean_setlist(record);
        }
        Ok(records)
    }

    /// Setlists for many shows; ids without a setlist end up in [`Setlists::missing`].
    pub fn all_setlists<I>(&self, showids: I) -> Result<Setlists>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut out = Setlists::default();
        for showid in showids {
            let setlist = self.setlist(showid)?;
            if setlist.is_empty() {
                out.missing.push(showid);
            } else {
                out.setlists.extend(setlist);
            }
        }

        #[cfg(feature = "tracing")]
        if !out.missing.is_empty() {
            tracing::warn!(
                missing = out.missing.len(),
                "some shows have no setlist on Phish.net"
            );
        }

        Ok(out)
    }

    /// Blog posts (`blog/get`). Works without an API key.
    pub fn blog<I, K, V>(&self, params: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let envelope = self.get_json("blog/get", params)?;
        Ok(envelope.response.records())
    }

    fn build_url(&self, endpoint: &Endpoint, params: &Params) -> Result<Url> {
        endpoint::check_path(endpoint.path())?;

        let api_key = match (endpoint.requires_auth(), self.credential.expose()) {
            (false, _) => None,
            (true, Some(key)) => Some(key),
            (true, None) => {
                return Err(Error::missing_credential(
                    Some(endpoint.path()),
                    self.env_var_name.as_str(),
                ));
            }
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::validation(format!("`{}` cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(endpoint.path().split('/'));
        if !url.as_str().starts_with(self.base_url.as_str()) {
            return Err(Error::validation(format!(
                "endpoint `{}` escapes the base URL",
                endpoint.path()
            )));
        }

        {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                // The resolved credential replaces any caller-supplied key.
                if api_key.is_some() && name == API_KEY_PARAM {
                    continue;
                }
                query.append_pair(name, value);
            }
            if let Some(key) = api_key {
                query.append_pair(API_KEY_PARAM, key);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }
}

fn add_clean_setlist(record: &mut Value) {
    let Some(fields) = record.as_object_mut() else {
        return;
    };
    let Some(html) = fields.get("setlistdata").and_then(Value::as_str) else {
        return;
    };
    let clean = clean_setlist(html);
    fields.insert(CLEAN_SETLIST_FIELD.to_owned(), Value::String(clean));
}

/// Renders `url` with the value of its `apikey` parameter replaced by `<<apikey>>`.
#[must_use]
pub fn masked_url(url: &Url) -> String {
    if !url.query_pairs().any(|(name, _)| name == API_KEY_PARAM) {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == API_KEY_PARAM {
                MASK.to_owned()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();

    let mut masked = url.clone();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

/// Query string of `url` with the API key masked, `None` when there is no query.
#[must_use]
pub fn masked_query(url: &Url) -> Option<String> {
    url.query()?;
    let masked = masked_url(url);
    masked
        .split_once('?')
        .map(|(_, query)| query.split_once('#').map_or(query, |(q, _)| q).to_owned())
}

fn collect_params<I, K, V>(params: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
