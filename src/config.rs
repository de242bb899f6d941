use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::credential::DEFAULT_API_KEY_ENV;
use crate::endpoint::EndpointRegistry;
use crate::error::Error;

/// Version-pinned root of the Phish.net API.
pub const BASE_URL: &str = "https://api.phish.net/v3/";

/// Client construction settings.
///
/// The credential is resolved from `explicit_key` first and `env_var_name`
/// second, once, when the client is built.
#[non_exhaustive]
#[derive(Clone, Debug, bon::Builder)]
pub struct ClientConfig {
    #[builder(into)]
    pub explicit_key: Option<SecretString>,
    #[builder(into, default = DEFAULT_API_KEY_ENV.to_owned())]
    pub env_var_name: String,
    #[builder(default = default_base_url())]
    pub base_url: Url,
    #[builder(default)]
    pub registry: EndpointRegistry,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientConfig {
    /// Configuration using only an explicit key.
    #[must_use]
    pub fn with_key<K: Into<String>>(key: K) -> Self {
        let key: String = key.into();
        Self::builder().explicit_key(key).build()
    }

    /// Checks the settings and returns a base URL that ends with `/`.
    pub(crate) fn validate(&self) -> Result<Url> {
        if self.env_var_name.trim().is_empty() {
            return Err(Error::validation("env_var_name cannot be empty"));
        }

        let mut base_url = self.base_url.clone();
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::validation(format!(
                "base_url must be http or https, got `{}`",
                base_url.scheme()
            )));
        }
        if base_url.cannot_be_a_base() {
            return Err(Error::validation(format!(
                "base_url `{base_url}` cannot be used as a base"
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        base_url.set_query(None);

        Ok(base_url)
    }
}

fn default_base_url() -> Url {
    // BASE_URL is a constant literal and always parses.
    Url::parse(BASE_URL).unwrap_or_else(|e| unreachable!("invalid BASE_URL: {e}"))
}
