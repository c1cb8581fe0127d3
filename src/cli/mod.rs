use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (gemini, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "gemini")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider (required for Gemini)
    #[arg(long, env = "GOOGLE_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gemini-2.0-flash-thinking-exp-1219, llama3.2)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    // --- Persona Args ---
    /// Subject the tutor persona teaches.
    #[arg(long, env = "SUBJECT", default_value = "Python")]
    pub subject: String,

    /// Optional path to a persona instruction file. `{subject}` is replaced with the subject.
    #[arg(long, env = "PERSONA_PATH")]
    pub persona_path: Option<String>,

    // --- General App Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:5000")]
    pub server_addr: String,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

/// Settings for the terminal chat client.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal front-end for the tutor chat endpoint", long_about = None)]
pub struct ClientArgs {
    /// Base URL of the tutor server.
    #[arg(long, env = "TUTOR_ENDPOINT", default_value = "http://127.0.0.1:5000")]
    pub endpoint: String,

    /// Seconds between subject polls. 0 disables polling.
    #[arg(long, env = "SUBJECT_POLL_SECS", default_value = "30")]
    pub subject_poll_secs: u64,

    /// Print assistant replies as rendered HTML markup instead of plain text.
    #[arg(long, default_value = "false")]
    pub html: bool,
}
