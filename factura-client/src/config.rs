//! Client configuration

use std::str::FromStr;
use std::time::Duration;

/// Shortest accepted delay between stamping status checks
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Tenant (empresa) the client works for
///
/// Passed explicitly to whoever needs it instead of living in ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantInfo {
    pub empresa_id: Option<String>,
    pub nombre: Option<String>,
    pub rfc: Option<String>,
}

/// Client configuration for the invoicing backend and the PAC
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// PAC base URL for stamping status; defaults to `base_url`
    pub pac_base_url: Option<String>,

    /// Bearer token, if the deployment requires one
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Delay between stamping status checks
    pub poll_interval: Duration,

    /// Give up polling after this many checks; `None` polls until a
    /// terminal status or cancellation
    pub poll_max_attempts: Option<u32>,

    /// Rows per invoice list page
    pub page_size: usize,

    /// Quiet period before a search-as-you-type lookup fires
    pub debounce: Duration,

    /// Attempts when looking for a just-created invoice in the list
    pub find_attempts: u32,

    /// Base delay between those attempts (multiplied by the attempt number)
    pub retry_base_delay: Duration,

    pub tenant: TenantInfo,
}

impl ClientConfig {
    /// Create a new client configuration with default timings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pac_base_url: None,
            token: None,
            timeout: 30,
            poll_interval: Duration::from_secs(3),
            poll_max_attempts: Some(200),
            page_size: 10,
            debounce: Duration::from_millis(400),
            find_attempts: 3,
            retry_base_delay: Duration::from_millis(500),
            tenant: TenantInfo::default(),
        }
    }

    /// Load configuration from `FACTURA_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("FACTURA_API_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
        );
        config.pac_base_url = env_string("FACTURA_PAC_URL");
        config.token = env_string("FACTURA_TOKEN");
        if let Some(timeout) = env_parse("FACTURA_TIMEOUT_SECS") {
            config.timeout = timeout;
        }
        if let Some(ms) = env_parse("FACTURA_POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(ms).max(MIN_POLL_INTERVAL);
        }
        if let Some(max) = env_parse::<u32>("FACTURA_POLL_MAX_ATTEMPTS") {
            // 0 disables the bound
            config.poll_max_attempts = (max > 0).then_some(max);
        }
        if let Some(size) = env_parse("FACTURA_PAGE_SIZE") {
            config.page_size = size;
        }
        config.tenant = TenantInfo {
            empresa_id: env_string("FACTURA_EMPRESA_ID"),
            nombre: env_string("FACTURA_EMPRESA_NOMBRE"),
            rfc: env_string("FACTURA_EMPRESA_RFC"),
        };
        config
    }

    /// Set the PAC base URL
    pub fn with_pac_base_url(mut self, url: impl Into<String>) -> Self {
        self.pac_base_url = Some(url.into());
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the polling interval and bound
    pub fn with_polling(mut self, interval: Duration, max_attempts: Option<u32>) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self.poll_max_attempts = max_attempts;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the retry policy used to find a just-created invoice
    pub fn with_find_retry(mut self, attempts: u32, base_delay: Duration) -> Self {
        self.find_attempts = attempts;
        self.retry_base_delay = base_delay;
        self
    }

    pub fn with_tenant(mut self, tenant: TenantInfo) -> Self {
        self.tenant = tenant;
        self
    }

    /// PAC base URL, falling back to the backend URL
    pub fn pac_url(&self) -> &str {
        self.pac_base_url.as_deref().unwrap_or(&self.base_url)
    }

    /// Create the HTTP-backed service from this configuration
    pub fn build_service(&self) -> crate::ClientResult<crate::FacturaService> {
        crate::FacturaService::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
