use crate::error::{LtpError, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Options for the outbound HTTP client. Built by [`Config`]; the fetch
/// client itself carries no defaults.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_idle_conns: usize,
    pub idle_conn_timeout: Duration,
    pub max_retries: u32,
    pub retry_wait: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    pub kraken_trades_url: String,
    pub http: HttpClientConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_retries: u32 = parse_var(&lookup, "HTTP_MAX_RETRIES", "3")?;
        if max_retries == 0 {
            return Err(LtpError::Config(
                "HTTP_MAX_RETRIES must be at least 1".to_string(),
            ));
        }

        let http = HttpClientConfig {
            timeout: Duration::from_secs(parse_var(&lookup, "HTTP_TIMEOUT_SECS", "10")?),
            max_idle_conns: parse_var(&lookup, "HTTP_MAX_IDLE_CONNS", "10")?,
            idle_conn_timeout: Duration::from_secs(parse_var(
                &lookup,
                "HTTP_IDLE_CONN_TIMEOUT_SECS",
                "90",
            )?),
            max_retries,
            retry_wait: Duration::from_millis(parse_var(&lookup, "HTTP_RETRY_WAIT_MS", "1000")?),
        };

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, "PORT", "8080")?,
            kraken_trades_url: lookup("KRAKEN_TRADES_URL")
                .unwrap_or_else(|| "https://api.kraken.com/0/public/Trades".to_string()),
            http,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse::<T>()
        .map_err(|_| LtpError::Config(format!("Invalid {}", name)))
}
