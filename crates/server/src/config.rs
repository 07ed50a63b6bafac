use std::time::Duration;

pub const DEFAULT_ADDR: &str = "0.0.0.0:7878";
pub const DEFAULT_DECK_TTL_HOURS: u64 = 24;
/// Characters in a generated deck id.
pub const DECK_ID_LEN: usize = 22;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: String,
    pub deck_ttl: Duration,
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            deck_ttl: Duration::from_secs(DEFAULT_DECK_TTL_HOURS * 60 * 60),
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Defaults, then `FIVEDRAW_ADDR`, then command-line flags.
    pub fn from_env_and_args(args: &[String]) -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("FIVEDRAW_ADDR") {
            config.addr = addr;
        }
        config.apply_args(args);
        config
    }

    pub fn apply_args(&mut self, args: &[String]) {
        let mut idx = 0usize;
        while idx < args.len() {
            match args[idx].as_str() {
                "--addr" | "-a" => {
                    if let Some(value) = args.get(idx + 1) {
                        self.addr = value.clone();
                        idx += 1;
                    }
                }
                "--ttl-hours" => {
                    if let Some(hours) = args.get(idx + 1).and_then(|v| v.parse::<u64>().ok()) {
                        self.deck_ttl = Duration::from_secs(hours * 60 * 60);
                        idx += 1;
                    }
                }
                "--seed" => {
                    if let Some(value) = args.get(idx + 1) {
                        self.seed = value.parse::<u64>().ok();
                        idx += 1;
                    }
                }
                _ => {}
            }
            idx += 1;
        }
    }
}
