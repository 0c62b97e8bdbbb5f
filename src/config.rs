use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;

use crate::ledger::{Identity, ReviewParams, MIN_REVIEW_STAKE};

const ENV_PREFIX: &str = "REVIEW_LEDGER_";

/// Configuration for the review ledger server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Ledger parameters and genesis state
    pub ledger: LedgerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Require an API key on every route except /health
    pub enable_auth: bool,
    /// Accepted API keys
    pub api_keys: Vec<String>,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
    /// Header carrying the authenticated caller identity
    pub identity_header: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Mask caller identities in request logs
    pub sanitize_logs: bool,
    /// Emit span open/close events for requests
    pub log_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Identity of the ledger-owned account that receives staked funds
    pub ledger_account: String,
    /// Minimum accumulated stake required to review
    pub min_review_stake: u64,
    /// Initial balances, in declaration order
    pub genesis_balances: Vec<(String, u64)>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8790,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_auth: false,
            api_keys: Vec::new(),
            max_request_size: 64 * 1024,
            identity_header: "x-caller-identity".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            sanitize_logs: true,
            log_requests: false,
        }
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            ledger_account: "ledger".to_string(),
            min_review_stake: MIN_REVIEW_STAKE,
            genesis_balances: Vec::new(),
        }
    }
}

impl LedgerSettings {
    /// Convert to ReviewParams for use by LedgerState
    pub fn to_params(&self) -> ReviewParams {
        ReviewParams {
            min_review_stake: self.min_review_stake,
        }
    }

    pub fn ledger_identity(&self) -> Identity {
        Identity::new(self.ledger_account.clone())
    }

    pub fn genesis(&self) -> impl Iterator<Item = (Identity, u64)> + '_ {
        self.genesis_balances
            .iter()
            .map(|(id, amount)| (Identity::new(id.clone()), *amount))
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source. Keys are the
    /// full `REVIEW_LEDGER_*` names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(format!("{}{}", ENV_PREFIX, name).as_str());
        let mut config = Self::default();

        // Server configuration
        if let Some(host) = var("HOST") {
            config.server.host = host;
        }

        if let Some(port) = var("PORT") {
            config.server.port = port.parse().context("Invalid REVIEW_LEDGER_PORT value")?;
        }

        // Security configuration
        if let Some(enable_auth) = var("ENABLE_AUTH") {
            config.security.enable_auth = enable_auth
                .parse()
                .context("Invalid REVIEW_LEDGER_ENABLE_AUTH value")?;
        }

        if let Some(keys) = var("API_KEYS") {
            config.security.api_keys = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(size) = var("MAX_REQUEST_SIZE") {
            config.security.max_request_size = size
                .parse()
                .context("Invalid REVIEW_LEDGER_MAX_REQUEST_SIZE value")?;
        }

        if let Some(header) = var("IDENTITY_HEADER") {
            config.security.identity_header = header.trim().to_lowercase();
        }

        // Logging configuration
        if let Some(level) = var("LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(sanitize_logs) = var("SANITIZE_LOGS") {
            config.logging.sanitize_logs = sanitize_logs
                .parse()
                .context("Invalid REVIEW_LEDGER_SANITIZE_LOGS value")?;
        }

        if let Some(log_requests) = var("LOG_REQUESTS") {
            config.logging.log_requests = log_requests
                .parse()
                .context("Invalid REVIEW_LEDGER_LOG_REQUESTS value")?;
        }

        // Ledger configuration
        if let Some(account) = var("ACCOUNT") {
            config.ledger.ledger_account = account;
        }

        if let Some(stake) = var("MIN_REVIEW_STAKE") {
            config.ledger.min_review_stake = stake
                .parse()
                .context("Invalid REVIEW_LEDGER_MIN_REVIEW_STAKE value")?;
        }

        if let Some(balances) = var("GENESIS_BALANCES") {
            config.ledger.genesis_balances = parse_genesis_balances(&balances)?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Non-fatal configuration problems. Loading happens before logging is
    /// set up, so the caller reports these once a subscriber exists.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.ledger.genesis_balances.is_empty() {
            warnings.push(
                "REVIEW_LEDGER_GENESIS_BALANCES not set, ledger starts with no funds".to_string(),
            );
        }

        if self.security.enable_auth && !self.logging.sanitize_logs {
            warnings.push("Log sanitization is off while API keys are in use".to_string());
        }

        warnings
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be non-zero"));
        }

        if self.security.identity_header.is_empty() {
            return Err(anyhow::anyhow!("Identity header name cannot be empty"));
        }

        if self.security.enable_auth && self.security.api_keys.is_empty() {
            return Err(anyhow::anyhow!(
                "Authentication is enabled but no API keys are configured"
            ));
        }

        if self.ledger.ledger_account.is_empty() {
            return Err(anyhow::anyhow!("Ledger account identity cannot be empty"));
        }

        let mut seen = HashSet::new();
        for (identity, _) in &self.ledger.genesis_balances {
            if identity.is_empty() {
                return Err(anyhow::anyhow!("Genesis balance has an empty identity"));
            }
            if !seen.insert(identity.as_str()) {
                return Err(anyhow::anyhow!(
                    "Duplicate genesis balance for {}",
                    identity
                ));
            }
        }

        Ok(())
    }
}

/// Parse `id:amount,id:amount`. The last colon separates the amount.
pub fn parse_genesis_balances(raw: &str) -> Result<Vec<(String, u64)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (identity, amount) = entry
                .rsplit_once(':')
                .ok_or_else(|| anyhow::anyhow!("Genesis entry is not id:amount: {}", entry))?;
            let amount = amount
                .trim()
                .parse()
                .with_context(|| format!("Invalid genesis amount for {}", identity))?;
            Ok((identity.trim().to_string(), amount))
        })
        .collect()
}
