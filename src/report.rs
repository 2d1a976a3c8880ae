// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-load reports.

use serde::Serialize;
use std::fmt;

use crate::abi::StatusCode;
use crate::wasm::{PolicyInstance, WasmError};

/// Outcome of loading one policy source into an instance.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub source: String,
    /// Raw status code; absent when the instance failed before answering.
    pub status_code: Option<u32>,
    pub status: &'static str,
    pub message: Option<String>,
    pub policies: Option<u32>,
    pub templates: Option<u32>,
    /// The instance trapped or broke the memory contract and was discarded.
    pub fatal: bool,
}

impl LoadReport {
    pub fn succeeded(&self) -> bool {
        self.status_code == Some(0)
    }

    pub fn fatal(source: &str, error: &WasmError) -> Self {
        Self {
            source: source.to_string(),
            status_code: None,
            status: "fatal",
            message: Some(error.to_string()),
            policies: None,
            templates: None,
            fatal: true,
        }
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{}: status {} ({})", self.source, code, self.status)?,
            None => write!(f, "{}: {}", self.source, self.status)?,
        }
        if let Some(policies) = self.policies {
            write!(f, ", policies={}", policies)?;
        }
        if let Some(templates) = self.templates {
            write!(f, ", templates={}", templates)?;
        }
        if let Some(message) = &self.message {
            write!(f, " - {}", message)?;
        }
        Ok(())
    }
}

/// Load `bytes` into `instance` and query the resulting counts.
///
/// Guest rejections are reported, not propagated. A fatal error is turned
/// into a report flagged `fatal`; the caller must not reuse the instance
/// after that.
pub fn load_into(instance: &mut PolicyInstance, source: &str, bytes: &[u8]) -> LoadReport {
    let raw = match instance.load_policies_raw(bytes) {
        Ok(raw) => raw,
        Err(e) => return LoadReport::fatal(source, &e),
    };
    let status = StatusCode::from_raw(raw);

    let counts = instance
        .count_num_policies()
        .and_then(|p| instance.count_num_templates().map(|t| (p, t)));
    let (policies, templates) = match counts {
        Ok(counts) => counts,
        Err(e) => return LoadReport::fatal(source, &e),
    };

    LoadReport {
        source: source.to_string(),
        status_code: Some(raw),
        status: status.label(),
        message: status.into_result().err().map(|r| r.to_string()),
        policies: Some(policies),
        templates,
        fatal: false,
    }
}
