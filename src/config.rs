use serde::Deserialize;
use std::collections::HashMap;

/// Whether the engine may call the generative-AI provider
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
    /// Always call AI when a credential is configured
    Always,
    /// Never call AI
    Never,
    /// Infer production vs. local from the environment and enable AI only in
    /// inferred-production contexts
    Auto,
}

/// Environment variables whose presence indicates a deployment host
const DEPLOYMENT_HOST_VARS: &[&str] = &[
    "KUBERNETES_SERVICE_HOST",
    "RAILWAY_ENVIRONMENT",
    "FLY_APP_NAME",
    "DYNO",
];

/// Environment variables naming the running environment
const ENVIRONMENT_NAME_VARS: &[&str] = &["APP_ENV", "ENVIRONMENT", "RUST_ENV"];

impl AiMode {
    /// Resolves the mode against a snapshot of environment variables
    ///
    /// Resolved once at engine construction, never re-read at call sites.
    pub fn resolve(self, env: &HashMap<String, String>) -> bool {
        match self {
            AiMode::Always => true,
            AiMode::Never => false,
            AiMode::Auto => {
                let on_deployment_host = DEPLOYMENT_HOST_VARS
                    .iter()
                    .any(|var| env.get(*var).is_some_and(|v| !v.is_empty()));
                let named_production = ENVIRONMENT_NAME_VARS.iter().any(|var| {
                    env.get(*var)
                        .is_some_and(|v| v.to_lowercase().contains("prod"))
                });
                on_deployment_host || named_production
            }
        }
    }
}

fn default_ai_mode() -> AiMode {
    AiMode::Auto
}

/// Application configuration loaded from environment variables
///
/// Provider credentials are optional: a missing key silently disables the
/// matching provider instead of failing startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// TMDB API key (movie listings)
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// Culture open-data portal key (exhibitions and performances)
    #[serde(default)]
    pub culture_api_key: Option<String>,

    /// Kakao Local REST API key (place search)
    #[serde(default)]
    pub kakao_api_key: Option<String>,

    /// Generative-AI provider API key
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// Generative-AI provider base URL
    #[serde(default = "default_ai_api_url")]
    pub ai_api_url: String,

    /// Generative-AI model name
    #[serde(default = "default_ai_model")]
    pub ai_model: String,

    /// AI-use policy
    #[serde(default = "default_ai_mode")]
    pub ai_mode: AiMode,

    /// Outer deadline for one recommend() invocation, in seconds
    #[serde(default = "default_recommend_deadline_secs")]
    pub recommend_deadline_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_ai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_recommend_deadline_secs() -> u64 {
    25
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Resolves the AI-use policy against the current process environment
    pub fn ai_enabled(&self) -> bool {
        let env: HashMap<String, String> = std::env::vars().collect();
        self.ai_mode.resolve(&env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_ai_mode_always_and_never() {
        assert!(AiMode::Always.resolve(&env(&[])));
        assert!(!AiMode::Never.resolve(&env(&[("KUBERNETES_SERVICE_HOST", "10.0.0.1")])));
    }

    #[test]
    fn test_ai_mode_auto_on_deployment_host() {
        assert!(AiMode::Auto.resolve(&env(&[("FLY_APP_NAME", "datecourse-api")])));
        assert!(AiMode::Auto.resolve(&env(&[("KUBERNETES_SERVICE_HOST", "10.0.0.1")])));
    }

    #[test]
    fn test_ai_mode_auto_on_environment_name() {
        assert!(AiMode::Auto.resolve(&env(&[("APP_ENV", "production")])));
        assert!(AiMode::Auto.resolve(&env(&[("ENVIRONMENT", "prod-eu")])));
        assert!(!AiMode::Auto.resolve(&env(&[("APP_ENV", "development")])));
    }

    #[test]
    fn test_ai_mode_auto_local_default_off() {
        assert!(!AiMode::Auto.resolve(&env(&[])));
        assert!(!AiMode::Auto.resolve(&env(&[("RAILWAY_ENVIRONMENT", "")])));
    }

    #[test]
    fn test_ai_mode_wire_form() {
        let mode: AiMode = serde_json::from_str(r#""auto""#).unwrap();
        assert_eq!(mode, AiMode::Auto);
        assert!(serde_json::from_str::<AiMode>(r#""sometimes""#).is_err());
    }
}
