use std::time::Duration;

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the backend project, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Public API key sent with every request
    pub anon_key: String,

    /// Privileged key for server-side account provisioning (optional)
    pub service_role_key: Option<String>,

    /// Timeout applied to each remote call
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            service_role_key: None,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_service_role_key(mut self, key: impl Into<String>) -> Self {
        self.service_role_key = Some(key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
