use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://localhost:7878";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub state_path: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            state_path: crate::default_state_path(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    /// Defaults, then `FIVEDRAW_URL`, then command-line flags. The state
    /// path default already honours `FIVEDRAW_STATE`.
    pub fn from_env_and_args(args: &[String]) -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("FIVEDRAW_URL") {
            config.base_url = url;
        }
        config.apply_args(args);
        config
    }

    pub fn apply_args(&mut self, args: &[String]) {
        let mut idx = 0usize;
        while idx < args.len() {
            match args[idx].as_str() {
                "--url" | "-u" => {
                    if let Some(value) = args.get(idx + 1) {
                        self.base_url = value.clone();
                        idx += 1;
                    }
                }
                "--state" | "-s" => {
                    if let Some(value) = args.get(idx + 1) {
                        self.state_path = Some(PathBuf::from(value));
                        idx += 1;
                    }
                }
                "--timeout-ms" => {
                    if let Some(ms) = args.get(idx + 1).and_then(|v| v.parse::<u64>().ok()) {
                        self.timeout = Duration::from_millis(ms);
                        idx += 1;
                    }
                }
                _ => {}
            }
            idx += 1;
        }
    }
}
