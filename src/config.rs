use std::env;

use crate::gate::PendingPolicy;

/// AppConfig
///
/// Holds the portal's entire configuration state. Loaded once at startup and never
/// mutated afterwards; it reaches handlers and the access gate through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and cookie hardening.
    pub env: Env,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // Base URL of the auth, posts and comments backend.
    pub api_url: String,
    // Base URL of the chat backend.
    pub chat_url: String,
    // Name of the cookie holding the opaque session token.
    pub token_cookie: String,
    // Lifetime of the session and assessment cookies, in days.
    pub session_max_age_days: i64,
    // Whether cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
    // What the gate does with a signed-in user who has not finished the assessment
    // but asks for a public page.
    pub pending_policy: PendingPolicy,
    // Whether logging out also forgets that the assessment was completed.
    pub reset_assessment_on_logout: bool,
}

/// Env
///
/// Defines the runtime context: pretty logs and plain cookies locally,
/// JSON logs and `Secure` cookies in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_CHAT_URL: &str = "http://127.0.0.1:11435";
pub const DEFAULT_TOKEN_COOKIE: &str = "authToken";
pub const DEFAULT_SESSION_MAX_AGE_DAYS: i64 = 7;

impl Default for AppConfig {
    /// default
    ///
    /// Provides a non-panicking configuration for test setup, pointing at the
    /// local development collaborators.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "0.0.0.0:3000".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            chat_url: DEFAULT_CHAT_URL.to_string(),
            token_cookie: DEFAULT_TOKEN_COOKIE.to_string(),
            session_max_age_days: DEFAULT_SESSION_MAX_AGE_DAYS,
            secure_cookies: false,
            pending_policy: PendingPolicy::Strict,
            reset_assessment_on_logout: true,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables. Local runs fall back to the
    /// development collaborators on localhost.
    ///
    /// # Panics
    /// Panics in production when `API_URL` or `CHAT_URL` is missing, or when a
    /// numeric/boolean/policy variable cannot be parsed.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let (api_url, chat_url) = match env {
            Env::Production => (
                env::var("API_URL").expect("FATAL: API_URL required in prod"),
                env::var("CHAT_URL").expect("FATAL: CHAT_URL required in prod"),
            ),
            Env::Local => (
                env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
                env::var("CHAT_URL").unwrap_or_else(|_| DEFAULT_CHAT_URL.to_string()),
            ),
        };

        let session_max_age_days = match env::var("SESSION_MAX_AGE_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|days| *days > 0)
                .expect("FATAL: SESSION_MAX_AGE_DAYS must be a positive integer"),
            Err(_) => DEFAULT_SESSION_MAX_AGE_DAYS,
        };

        let pending_policy = match env::var("GATE_PENDING_POLICY") {
            Ok(raw) => raw
                .parse::<PendingPolicy>()
                .expect("FATAL: GATE_PENDING_POLICY must be 'strict' or 'allow-public'"),
            Err(_) => PendingPolicy::Strict,
        };

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            api_url: trim_base(api_url),
            chat_url: trim_base(chat_url),
            token_cookie: env::var("TOKEN_COOKIE")
                .unwrap_or_else(|_| DEFAULT_TOKEN_COOKIE.to_string()),
            session_max_age_days,
            secure_cookies: bool_var("SECURE_COOKIES", env == Env::Production),
            pending_policy,
            reset_assessment_on_logout: bool_var("RESET_ASSESSMENT_ON_LOGOUT", true),
            env,
        }
    }
}

/// Base URLs are joined with absolute endpoint paths, so a trailing slash would
/// produce `//api/...`.
fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn bool_var(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => panic!("FATAL: {name} must be a boolean"),
        },
        Err(_) => default,
    }
}
