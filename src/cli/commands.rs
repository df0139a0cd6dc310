use clap::Parser;

use crate::config::FlightdeskConfig;

/// Interactive flight assistant backed by a GLM chat model
#[derive(Parser, Debug)]
#[command(
    name = "flightdesk",
    about = "Interactive flight assistant backed by a GLM chat model",
    version,
    author,
    long_about = "flightdesk chats with an OpenAI-compatible GLM endpoint and lets the model \
                  call two local functions: a flight number lookup and a ticket price lookup. \
                  Type 'exit' to quit.\n\n\
                  Examples:\n  \
                  FLIGHTDESK_API_KEY=\"Bearer <key>\" flightdesk\n  \
                  flightdesk --model glm-4-flash --temperature 0.5\n  \
                  flightdesk --no-tools --no-system-prompt"
)]
pub struct CliArgs {
    #[arg(long, value_name = "URL", help = "API base URL (overrides FLIGHTDESK_BASE_URL)")]
    pub base_url: Option<String>,

    #[arg(short = 'm', long, value_name = "MODEL", help = "Model identifier, e.g. 'glm-4'")]
    pub model: Option<String>,

    #[arg(
        long,
        value_name = "KEY",
        help = "Authorization header value, sent verbatim (e.g. \"Bearer <key>\")"
    )]
    pub api_key: Option<String>,

    #[arg(long, value_name = "T", help = "Sampling temperature in [0, 1]")]
    pub temperature: Option<f32>,

    #[arg(long, value_name = "P", help = "Nucleus sampling in (0, 1]")]
    pub top_p: Option<f32>,

    #[arg(long, value_name = "SECONDS", help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Plain chat: do not advertise the flight functions")]
    pub no_tools: bool,

    #[arg(long, help = "Omit the leading system turn")]
    pub no_system_prompt: bool,

    #[arg(long, help = "Print raw request and response traces to stderr")]
    pub show_raw: bool,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Verbose logging (debug level)")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

impl CliArgs {
    /// Overlays the flags that were given on top of `config`
    pub fn apply_to(&self, config: &mut FlightdeskConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(top_p) = self.top_p {
            config.top_p = top_p;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        if self.no_tools {
            config.tools_enabled = false;
        }
        if self.no_system_prompt {
            config.system_prompt = None;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.to_lowercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn base_config() -> FlightdeskConfig {
        FlightdeskConfig {
            base_url: "https://open.bigmodel.cn/api/paas/v4/".to_string(),
            api_key: None,
            model: "glm-4".to_string(),
            temperature: 0.9,
            top_p: 0.7,
            request_timeout_secs: 60,
            system_prompt: Some("You are a helpful assistant.".to_string()),
            tools_enabled: true,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let args = CliArgs::parse_from(["flightdesk"]);
        assert!(args.model.is_none());
        assert!(!args.no_tools);
        assert!(!args.show_raw);

        let mut config = base_config();
        args.apply_to(&mut config);
        assert_eq!(config.model, "glm-4");
        assert!(config.tools_enabled);
        assert!(config.system_prompt.is_some());
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::parse_from([
            "flightdesk",
            "--base-url",
            "http://localhost:8080/v4",
            "--model",
            "glm-4-flash",
            "--api-key",
            "Bearer k",
            "--temperature",
            "0.2",
            "--top-p",
            "0.5",
            "--timeout",
            "30",
            "--no-tools",
            "--no-system-prompt",
            "--log-level",
            "DEBUG",
        ]);

        let mut config = base_config();
        args.apply_to(&mut config);

        assert_eq!(config.base_url, "http://localhost:8080/v4");
        assert_eq!(config.model, "glm-4-flash");
        assert_eq!(config.api_key.as_deref(), Some("Bearer k"));
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.top_p, 0.5);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.tools_enabled);
        assert!(config.system_prompt.is_none());
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["flightdesk", "-v", "-q"]).is_err());
    }
}
