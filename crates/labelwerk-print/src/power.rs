// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Best-effort smart-plug control around the print operation. A plug that is
// offline must never fail a label that would otherwise print, so every error
// here is logged and swallowed.

use std::time::Duration;

use tracing::{debug, warn};

/// Timeout for the plug's HTTP endpoint.
const POWER_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCommand {
    On,
    Off,
}

impl std::fmt::Display for PowerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => write!(f, "On"),
            Self::Off => write!(f, "Off"),
        }
    }
}

/// Fire a `Power On`/`Power Off` command at a Tasmota-style plug.
///
/// Never propagates failure — the outcome is a log line either way.
pub async fn power_switch(host: &str, command: PowerCommand) {
    let url = format!("http://{}/cm", host);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(POWER_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            warn!(%err, "power {} skipped: HTTP client init failed", command);
            return;
        }
    };

    let result = client
        .post(&url)
        .form(&[("cmnd", format!("Power {}", command))])
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            debug!(%host, %command, "power command acknowledged");
        }
        Ok(response) => {
            warn!(%host, %command, status = %response.status(), "power command rejected");
        }
        Err(err) => {
            warn!(%host, %command, %err, "power command failed");
        }
    }
}
