/// Process configuration. The API key is read once here and handed to the
/// provider at construction; nothing downstream touches the environment, so
/// both credential states are testable.
#[derive(Clone)]
pub struct Config {
    /// Absence is a first-class degraded mode, not an error.
    pub api_key: Option<String>,
    pub gemini_base: String,
    pub model: String,
    pub company_id: String,
    pub company_name: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_base: std::env::var("GEMINI_BASE")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            company_id: std::env::var("COMPANY_ID").unwrap_or_else(|_| "c_999".to_string()),
            company_name: std::env::var("COMPANY_NAME")
                .unwrap_or_else(|_| "Global Tech Solutions Inc.".to_string()),
        }
    }
}

pub fn now_ts_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
