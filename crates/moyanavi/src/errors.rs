use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Search API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to serialize search result: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to load tokenizer: {0}")]
    Tokenizer(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    #[error("Malformed trace: {0}")]
    Malformed(String),
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    /// The runtime rejected the call because the model is overloaded or the
    /// account quota is exhausted.
    #[error("Agent runtime is throttling requests: {0}")]
    Throttled(String),

    #[error("Agent runtime error: {0}")]
    Runtime(String),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("Answer chunk is not valid UTF-8: {0}")]
    InvalidChunk(#[from] std::string::FromUtf8Error),
}

impl AgentError {
    /// Classify a runtime failure from its error code, falling back to the
    /// rendered message when the runtime did not supply a code.
    pub fn from_runtime(code: Option<&str>, message: String) -> Self {
        let throttled = match code {
            Some(code) => code.eq_ignore_ascii_case("ThrottlingException"),
            None => message.to_ascii_lowercase().contains("throttlingexception"),
        };
        if throttled {
            AgentError::Throttled(message)
        } else {
            AgentError::Runtime(message)
        }
    }

    pub fn is_throttling(&self) -> bool {
        matches!(self, AgentError::Throttled(_))
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Failed to read env file: {0}")]
    EnvFile(#[from] dotenv::Error),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a settings field to the environment variable that provides it.
pub fn to_env_var(field: &str) -> String {
    field.to_uppercase()
}
