use secrecy::{ExposeSecret as _, SecretString};

use crate::Result;
use crate::error::Error;

/// Name of the environment variable consulted when no explicit key is given.
pub const DEFAULT_API_KEY_ENV: &str = "PHISH_API_KEY";

/// The API key attached to authenticated requests.
///
/// An empty credential means no key was resolved; it is only usable against
/// endpoints that do not require authentication.
#[derive(Clone, Debug)]
pub struct Credential {
    key: Option<SecretString>,
}

impl Credential {
    #[must_use]
    pub fn new<K: Into<String>>(key: K) -> Self {
        let key: String = key.into();
        Self::from_secret(SecretString::from(key))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self { key: None }
    }

    fn from_secret(key: SecretString) -> Self {
        if is_blank(key.expose_secret()) {
            Self::empty()
        } else {
            Self { key: Some(key) }
        }
    }

    /// Resolves a credential from an explicit key, falling back to `env_var`.
    ///
    /// Fails with [`crate::error::Kind::MissingCredential`] when nothing is found
    /// and `requires_auth` is set; otherwise an empty credential is returned.
    pub fn resolve(
        explicit_key: Option<&SecretString>,
        env_var: &str,
        requires_auth: bool,
    ) -> Result<Self> {
        Self::resolve_with(explicit_key, env_var, requires_auth, |name| {
            std::env::var(name).ok()
        })
    }

    /// Same as [`Credential::resolve`] with an injected environment lookup.
    pub fn resolve_with<F>(
        explicit_key: Option<&SecretString>,
        env_var: &str,
        requires_auth: bool,
        lookup: F,
    ) -> Result<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if let Some(key) = explicit_key.filter(|k| !is_blank(k.expose_secret())) {
            return Ok(Self {
                key: Some(key.clone()),
            });
        }

        let credential = lookup(env_var).map_or_else(Self::empty, Self::new);
        if credential.is_empty() && requires_auth {
            return Err(Error::missing_credential(None, env_var));
        }

        Ok(credential)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key.is_none()
    }

    pub(crate) fn expose(&self) -> Option<&str> {
        self.key.as_ref().map(|k| k.expose_secret())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Kind, MissingCredential};

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_owned())
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let explicit = secret("explicit");
        let credential = Credential::resolve_with(Some(&explicit), "KEY", true, |_| {
            Some("from-env".to_owned())
        })
        .unwrap();

        assert_eq!(credential.expose(), Some("explicit"));
    }

    #[test]
    fn blank_explicit_key_falls_through_to_environment() {
        let explicit = secret("   ");
        let credential = Credential::resolve_with(Some(&explicit), "KEY", true, |name| {
            assert_eq!(name, "KEY");
            Some("abc123".to_owned())
        })
        .unwrap();

        assert_eq!(credential.expose(), Some("abc123"));
    }

    #[test]
    fn explicit_key_is_used_verbatim() {
        let explicit = secret(" padded ");
        let credential = Credential::resolve_with(Some(&explicit), "KEY", true, |_| None).unwrap();

        assert_eq!(credential.expose(), Some(" padded "));
    }

    #[test]
    fn missing_key_fails_when_auth_required() {
        let err = Credential::resolve_with(None, "PHISH_API_KEY", true, |_| None).unwrap_err();

        assert_eq!(err.kind(), Kind::MissingCredential);
        let source = err.downcast_ref::<MissingCredential>().unwrap();
        assert_eq!(source.env_var, "PHISH_API_KEY");
        assert_eq!(source.endpoint, None);
    }

    #[test]
    fn blank_environment_value_counts_as_missing() {
        let err = Credential::resolve_with(None, "KEY", true, |_| Some(String::new())).unwrap_err();

        assert_eq!(err.kind(), Kind::MissingCredential);
    }

    #[test]
    fn missing_key_is_empty_for_exempt_endpoints() {
        let credential = Credential::resolve_with(None, "KEY", false, |_| None).unwrap();

        assert!(credential.is_empty());
        assert_eq!(credential.expose(), None);
    }

    #[test]
    fn resolution_is_repeatable() {
        let lookup = |_: &str| Some("abc123".to_owned());
        let a = Credential::resolve_with(None, "KEY", true, lookup).unwrap();
        let b = Credential::resolve_with(None, "KEY", true, lookup).unwrap();

        assert_eq!(a.expose(), b.expose());
    }

    #[test]
    fn debug_output_hides_key() {
        let credential = Credential::new("super-secret");

        assert!(!format!("{credential:?}").contains("super-secret"));
    }
}
