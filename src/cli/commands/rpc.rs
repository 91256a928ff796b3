use anyhow::Result;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::ledger::Ledger;
use crate::quotes::build_quote_source;
use crate::rpc::{dispatch, RpcRequest};

#[derive(Args, Clone)]
pub struct RpcArgs {}

/// Line-delimited JSON driver: one request per stdin line, one response per
/// stdout line. The ledger lives for the lifetime of the process.
pub struct RpcCommand {
    #[allow(dead_code)]
    args: RpcArgs,
}

impl RpcCommand {
    pub fn new(args: RpcArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, config: &AppConfig) -> Result<()> {
        let quotes = build_quote_source(&config.quotes)?;
        let ledger = Ledger::new(quotes);
        info!("rpc loop started; reading requests from stdin");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<RpcRequest>(line) {
                Ok(request) => dispatch(&ledger, request).await,
                Err(e) => Err(anyhow::anyhow!("malformed request: {e}")),
            };

            match response {
                Ok(value) => println!("{value}"),
                Err(e) => {
                    warn!("request failed: {e}");
                    println!("{}", serde_json::json!({ "error": e.to_string() }));
                }
            }
        }

        info!("rpc loop finished; stdin closed");
        Ok(())
    }
}
