use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Serialize};

/// X-Frame-Options header value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum XFrameOptions {
    #[default]
    Deny,
    SameOrigin,
}

impl XFrameOptions {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deny => "DENY",
            Self::SameOrigin => "SAMEORIGIN",
        }
    }
}

/// Referrer-Policy header value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferrerPolicy {
    #[default]
    NoReferrer,
    SameOrigin,
    StrictOriginWhenCrossOrigin,
    StrictOrigin,
}

impl ReferrerPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoReferrer => "no-referrer",
            Self::SameOrigin => "same-origin",
            Self::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
            Self::StrictOrigin => "strict-origin",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "no-referrer" => Some(Self::NoReferrer),
            "same-origin" => Some(Self::SameOrigin),
            "strict-origin-when-cross-origin" => Some(Self::StrictOriginWhenCrossOrigin),
            "strict-origin" => Some(Self::StrictOrigin),
            _ => None,
        }
    }
}

/// Security response headers
///
/// Defaults follow a locked-down API profile: no framing, no referrer,
/// same-origin opener, `default-src 'self'`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// `X-XSS-Protection`; `None` omits the header
    #[serde(default = "default_xss_protection")]
    pub xss_protection: Option<String>,

    #[serde(default = "default_enabled")]
    pub nosniff: bool,

    #[serde(default = "default_frame_options")]
    pub x_frame_options: Option<XFrameOptions>,

    #[serde(default = "default_referrer_policy")]
    pub referrer_policy: Option<ReferrerPolicy>,

    /// HSTS max-age in seconds; 0 disables HSTS
    #[serde(default = "default_hsts_max_age")]
    pub hsts_max_age: u64,

    #[serde(default)]
    pub hsts_include_subdomains: bool,

    #[serde(default = "default_csp")]
    pub content_security_policy: Option<String>,

    #[serde(default = "default_coep")]
    pub cross_origin_embedder_policy: Option<String>,

    #[serde(default = "default_coop")]
    pub cross_origin_opener_policy: Option<String>,

    #[serde(default = "default_corp")]
    pub cross_origin_resource_policy: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            xss_protection: default_xss_protection(),
            nosniff: true,
            x_frame_options: default_frame_options(),
            referrer_policy: default_referrer_policy(),
            hsts_max_age: default_hsts_max_age(),
            hsts_include_subdomains: false,
            content_security_policy: default_csp(),
            cross_origin_embedder_policy: default_coep(),
            cross_origin_opener_policy: default_coop(),
            cross_origin_resource_policy: default_corp(),
        }
    }
}

impl SecurityConfig {
    pub fn builder() -> SecurityConfigBuilder {
        SecurityConfigBuilder::new()
    }

    /// Load from the `SECURITY_*` variables. `off` disables an optional header.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = get_env_with_prefix("SECURITY_ENABLED") {
            config.enabled = enabled.parse().unwrap_or(true);
        }

        if let Some(max_age) = get_env_with_prefix("SECURITY_HSTS_MAX_AGE") {
            if let Ok(age) = max_age.parse() {
                config.hsts_max_age = age;
            }
        }

        if let Some(include) = get_env_with_prefix("SECURITY_HSTS_INCLUDE_SUBDOMAINS") {
            config.hsts_include_subdomains = include.parse().unwrap_or(false);
        }

        if let Some(frame_options) = get_env_with_prefix("SECURITY_X_FRAME_OPTIONS") {
            config.x_frame_options = match frame_options.to_ascii_uppercase().as_str() {
                "SAMEORIGIN" => Some(XFrameOptions::SameOrigin),
                "OFF" => None,
                _ => Some(XFrameOptions::Deny),
            };
        }

        if let Some(referrer) = get_env_with_prefix("SECURITY_REFERRER_POLICY") {
            config.referrer_policy = if referrer.eq_ignore_ascii_case("off") {
                None
            } else {
                ReferrerPolicy::parse(&referrer).or(config.referrer_policy)
            };
        }

        override_optional(&mut config.content_security_policy, "SECURITY_CSP");
        override_optional(&mut config.cross_origin_embedder_policy, "SECURITY_COEP");
        override_optional(&mut config.cross_origin_opener_policy, "SECURITY_COOP");
        override_optional(&mut config.cross_origin_resource_policy, "SECURITY_CORP");

        config
    }

    /// `Strict-Transport-Security` value, if HSTS is on
    pub fn hsts_value(&self) -> Option<String> {
        if self.hsts_max_age == 0 {
            return None;
        }
        let mut value = format!("max-age={}", self.hsts_max_age);
        if self.hsts_include_subdomains {
            value.push_str("; includeSubDomains");
        }
        Some(value)
    }
}

fn override_optional(field: &mut Option<String>, key: &str) {
    if let Some(value) = get_env_with_prefix(key) {
        *field = if value.eq_ignore_ascii_case("off") {
            None
        } else {
            Some(value)
        };
    }
}

/// Builder for SecurityConfig
#[must_use = "builder does nothing until you call build()"]
pub struct SecurityConfigBuilder {
    config: SecurityConfig,
}

impl SecurityConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SecurityConfig::default(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn hsts_max_age(mut self, seconds: u64) -> Self {
        self.config.hsts_max_age = seconds;
        self
    }

    pub fn content_security_policy(mut self, csp: Option<String>) -> Self {
        self.config.content_security_policy = csp;
        self
    }

    pub fn x_frame_options(mut self, options: Option<XFrameOptions>) -> Self {
        self.config.x_frame_options = options;
        self
    }

    pub fn build(self) -> SecurityConfig {
        self.config
    }
}

impl Default for SecurityConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_xss_protection() -> Option<String> {
    Some("1; mode=block".to_string())
}

fn default_frame_options() -> Option<XFrameOptions> {
    Some(XFrameOptions::Deny)
}

fn default_referrer_policy() -> Option<ReferrerPolicy> {
    Some(ReferrerPolicy::NoReferrer)
}

fn default_hsts_max_age() -> u64 {
    31_536_000
}

fn default_csp() -> Option<String> {
    Some("default-src 'self'".to_string())
}

fn default_coep() -> Option<String> {
    Some("require-corp".to_string())
}

fn default_coop() -> Option<String> {
    Some("same-origin".to_string())
}

fn default_corp() -> Option<String> {
    Some("cross-origin".to_string())
}
