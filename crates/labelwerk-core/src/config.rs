// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration, overridable through LABELWERK_* environment
// variables.

use serde::{Deserialize, Serialize};

use crate::error::{LabelwerkError, Result};
use crate::types::LabelSize;

/// How finished artifacts reach the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    /// Normal queue submission of the artifact file (with rendering hints).
    Queue,
    /// Raster-encode to a ZPL command stream and deliver in raw mode.
    Raw,
}

/// Pipeline settings.
///
/// `Default` gives the operating point for a 203 dpi 100x150mm thermal label
/// printer; `from_env()` layers environment overrides on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Physical label size, e.g. "100x150mm" or "4x6in".
    pub label_size: LabelSize,
    /// Printer resolution in dots per inch (commonly 203 or 300).
    pub dpi: u32,
    /// Binarization threshold: samples strictly below become black.
    pub threshold: u8,
    /// Printer host (IP or name) for network dispatch.
    pub printer_host: String,
    /// Queue name on the printer/print server.
    pub printer_queue: String,
    /// TCP port for raw-mode delivery (JetDirect).
    pub raw_port: u16,
    /// TCP port for queue submission (LPR).
    pub lpr_port: u16,
    /// How artifacts are delivered.
    pub transport: Transport,
    /// Smart-plug host for best-effort power toggling; None disables it.
    pub power_host: Option<String>,
    /// Settle time after powering the printer on, in seconds.
    pub power_on_delay_secs: u64,
    /// Linger time before powering the printer off, in seconds.
    pub power_off_delay_secs: u64,
    /// Character cap for the text-field fallback.
    pub fallback_text_limit: usize,
    /// ZPL font size for the text-field fallback.
    pub fallback_font_size: u32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            label_size: LabelSize::Millimeters {
                width: 100.0,
                height: 150.0,
            },
            dpi: 203,
            threshold: 200,
            printer_host: "127.0.0.1".into(),
            printer_queue: "lp".into(),
            raw_port: 9100,
            lpr_port: 515,
            transport: Transport::Queue,
            power_host: None,
            power_on_delay_secs: 5,
            power_off_delay_secs: 20,
            fallback_text_limit: 200,
            fallback_font_size: 40,
        }
    }
}

impl LabelConfig {
    /// Build a configuration from defaults plus LABELWERK_* environment
    /// overrides. Malformed values are a hard `Config` error rather than a
    /// silent fallback.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = env("LABELWERK_LABEL_SIZE") {
            config.label_size = LabelSize::parse(&value)?;
        }
        if let Some(value) = env("LABELWERK_DPI") {
            config.dpi = parse_var("LABELWERK_DPI", &value)?;
        }
        if let Some(value) = env("LABELWERK_THRESHOLD") {
            config.threshold = parse_var("LABELWERK_THRESHOLD", &value)?;
        }
        if let Some(value) = env("LABELWERK_PRINTER_HOST") {
            config.printer_host = value;
        }
        if let Some(value) = env("LABELWERK_PRINTER_QUEUE") {
            config.printer_queue = value;
        }
        if let Some(value) = env("LABELWERK_RAW_PORT") {
            config.raw_port = parse_var("LABELWERK_RAW_PORT", &value)?;
        }
        if let Some(value) = env("LABELWERK_LPR_PORT") {
            config.lpr_port = parse_var("LABELWERK_LPR_PORT", &value)?;
        }
        if let Some(value) = env("LABELWERK_TRANSPORT") {
            config.transport = match value.to_ascii_lowercase().as_str() {
                "queue" => Transport::Queue,
                "raw" => Transport::Raw,
                other => {
                    return Err(LabelwerkError::Config(format!(
                        "LABELWERK_TRANSPORT must be 'queue' or 'raw', got '{}'",
                        other
                    )));
                }
            };
        }
        if let Some(value) = env("LABELWERK_POWER_HOST") {
            config.power_host = Some(value);
        }
        if let Some(value) = env("LABELWERK_POWER_ON_DELAY_SECS") {
            config.power_on_delay_secs = parse_var("LABELWERK_POWER_ON_DELAY_SECS", &value)?;
        }
        if let Some(value) = env("LABELWERK_POWER_OFF_DELAY_SECS") {
            config.power_off_delay_secs = parse_var("LABELWERK_POWER_OFF_DELAY_SECS", &value)?;
        }
        if let Some(value) = env("LABELWERK_FALLBACK_TEXT_LIMIT") {
            config.fallback_text_limit = parse_var("LABELWERK_FALLBACK_TEXT_LIMIT", &value)?;
        }
        if let Some(value) = env("LABELWERK_FALLBACK_FONT_SIZE") {
            config.fallback_font_size = parse_var("LABELWERK_FALLBACK_FONT_SIZE", &value)?;
        }

        if config.dpi == 0 {
            return Err(LabelwerkError::Config("LABELWERK_DPI must be positive".into()));
        }

        Ok(config)
    }

    /// Target raster dimensions in pixels for the configured label and DPI.
    pub fn target_pixels(&self) -> (u32, u32) {
        self.label_size.to_pixels(self.dpi)
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| LabelwerkError::Config(format!("{} has invalid value '{}'", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_operating_point() {
        let config = LabelConfig::default();
        assert_eq!(config.dpi, 203);
        assert_eq!(config.threshold, 200);
        assert_eq!(config.transport, Transport::Queue);
        assert_eq!(config.target_pixels(), (799, 1199));
    }

    #[test]
    fn round_trips_through_json() {
        let config = LabelConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: LabelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dpi, config.dpi);
        assert_eq!(back.label_size, config.label_size);
    }
}
