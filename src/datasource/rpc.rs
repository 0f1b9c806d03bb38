//! Minimal JSON-RPC chain client.
//!
//! Used as the alternate retrieval path when the subgraph has nothing
//! indexed yet: the chain head timestamp then bounds the accounting period.
//! Read-only; same fail-fast semantics as the subgraph client.

use super::SourceError;
use crate::domain::Uint;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    timestamp: String,
}

impl RpcClient {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, SourceError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(SourceError::Rpc(error.to_string()));
        }
        envelope
            .result
            .ok_or_else(|| SourceError::Rpc(format!("{}: empty result", method)))
    }

    /// Current chain head block number.
    pub async fn block_number(&self) -> Result<Uint, SourceError> {
        let hex: String = self.call("eth_blockNumber", serde_json::json!([])).await?;
        parse_hex_quantity("eth_blockNumber", &hex)
    }

    /// Timestamp of the block with the given number.
    pub async fn block_timestamp(&self, number: &Uint) -> Result<Uint, SourceError> {
        let tag = number.to_hex_quantity();
        let header: BlockHeader = self
            .call("eth_getBlockByNumber", serde_json::json!([tag, false]))
            .await?;
        parse_hex_quantity("block timestamp", &header.timestamp)
    }

    /// Timestamp of the current chain head.
    pub async fn latest_block_timestamp(&self) -> Result<Uint, SourceError> {
        let number = self.block_number().await?;
        let timestamp = self.block_timestamp(&number).await?;
        debug!(%number, %timestamp, "resolved chain head timestamp");
        Ok(timestamp)
    }
}

fn parse_hex_quantity(field: &str, value: &str) -> Result<Uint, SourceError> {
    Uint::from_hex(value)
        .ok_or_else(|| SourceError::Parse(format!("invalid {}: {:?}", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(
            parse_hex_quantity("n", "0x10").unwrap(),
            Uint::from(16u64)
        );
        assert!(parse_hex_quantity("n", "16").is_err());
        assert!(parse_hex_quantity("n", "0x").is_err());
    }

    #[test]
    fn test_hex_quantity_formatting() {
        assert_eq!(Uint::from(255u64).to_hex_quantity(), "0xff");
        assert_eq!(Uint::zero().to_hex_quantity(), "0x0");
    }

    #[test]
    fn test_rpc_envelope_error() {
        let json = r#"{ "jsonrpc": "2.0", "id": 1, "result": null, "error": { "code": -32000, "message": "header not found" } }"#;
        let envelope: RpcEnvelope<String> = serde_json::from_str(json).unwrap();
        assert!(envelope.result.is_none());
        assert!(envelope.error.is_some());
    }

    #[test]
    fn test_block_header_deserializes() {
        let json = r#"{ "timestamp": "0x68b1a2c0", "number": "0x1" }"#;
        let header: BlockHeader = serde_json::from_str(json).unwrap();
        assert_eq!(
            parse_hex_quantity("timestamp", &header.timestamp).unwrap(),
            Uint::from(0x68b1a2c0u64)
        );
    }
}
