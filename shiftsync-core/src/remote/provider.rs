//! Provider subprocess protocol.
//!
//! Providers are external binaries (e.g. `shiftsync-provider-google`) that
//! speak JSON over stdin/stdout. Any executable that understands the protocol
//! can be a provider; it manages its own credentials and receives the
//! provider-specific keys from its config table with every request.

use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::{ShiftSyncError, ShiftSyncResult};
use crate::remote::protocol::{Command, ProviderCommand, Request, Response};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("shiftsync-provider-{}", self.0)
    }

    fn binary_path(&self) -> ShiftSyncResult<std::path::PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| ShiftSyncError::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type comes from the command's associated type, and the
    /// call is bounded by the command's timeout.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> ShiftSyncResult<C::Response> {
        let limit = C::timeout();
        timeout(limit, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| ShiftSyncError::ProviderTimeout(limit.as_secs()))?
    }

    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> ShiftSyncResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| ShiftSyncError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| ShiftSyncError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        tracing::debug!(provider = %self.0, ?command, "calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ShiftSyncError::Provider(format!(
                    "Failed to spawn {}: {}",
                    binary_path.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ShiftSyncError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(ShiftSyncError::Provider(format!(
                "{} exited with status: {}",
                self.binary_name(),
                output.status.code().unwrap_or(-1)
            )));
        }

        parse_response(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Read the provider's reply: the first non-empty line of its stdout.
fn parse_response<R: serde::de::DeserializeOwned>(stdout: &str) -> ShiftSyncResult<R> {
    let line = stdout
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| ShiftSyncError::Provider("Provider returned no response".into()))?;

    let response: Response<R> = serde_json::from_str(line)
        .map_err(|e| ShiftSyncError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error } => Err(ShiftSyncError::Provider(error)),
    }
}
