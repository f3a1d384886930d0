use axum_extra::extract::cookie::Key;

use super::error::OnboardError;

/// Shared onboarding settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct OnboardSettings {
    pub(crate) cookie_key: Key,
    pub(crate) flow_cookie_name: String,
    pub(crate) onboard_path: String,
    pub(crate) success_redirect: String,
}

impl OnboardSettings {
    fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            flow_cookie_name: "__oidc_flow".into(),
            onboard_path: "/oidc/onboard".into(),
            success_redirect: "/".into(),
        }
    }
}

/// Onboarding configuration.
///
/// All fields have sensible defaults. Override with `with_*` methods,
/// or use [`from_env()`](OnboardConfig::from_env) for convention-based
/// setup.
///
/// The cookie key MUST match the key the provider callback used when it
/// set the flow cookie; pass the shared application key with
/// [`with_cookie_key`](OnboardConfig::with_cookie_key).
pub struct OnboardConfig {
    pub(super) settings: OnboardSettings,
}

impl OnboardConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: OnboardSettings::defaults(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `ONBOARD_COOKIE_KEY`: Cookie encryption key bytes (ephemeral key
    ///   generated when unset)
    /// - `ONBOARD_FLOW_COOKIE`: Flow cookie name
    /// - `ONBOARD_PATH`: Route path for the onboarding handler
    /// - `ONBOARD_SUCCESS_REDIRECT`: Where the success redirect points
    ///
    /// # Errors
    ///
    /// Returns [`OnboardError::Config`] if `ONBOARD_COOKIE_KEY` is set
    /// but invalid.
    pub fn from_env() -> Result<Self, OnboardError> {
        let mut config = Self::new();

        if let Ok(name) = std::env::var("ONBOARD_FLOW_COOKIE") {
            config = config.with_flow_cookie_name(name);
        }
        if let Ok(path) = std::env::var("ONBOARD_PATH") {
            config = config.with_onboard_path(path);
        }
        if let Ok(to) = std::env::var("ONBOARD_SUCCESS_REDIRECT") {
            config = config.with_success_redirect(to);
        }

        let cookie_key = match std::env::var("ONBOARD_COOKIE_KEY") {
            Ok(k) => Key::try_from(k.as_bytes()).map_err(|_| {
                OnboardError::Config(
                    "ONBOARD_COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?,
            Err(_) => Key::generate(),
        };

        Ok(config.with_cookie_key(cookie_key))
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_flow_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.flow_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_onboard_path(mut self, path: impl Into<String>) -> Self {
        self.settings.onboard_path = path.into();
        self
    }

    #[must_use]
    pub fn with_success_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.success_redirect = path.into();
        self
    }
}

impl Default for OnboardConfig {
    fn default() -> Self {
        Self::new()
    }
}
