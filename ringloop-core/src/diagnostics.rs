// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Read-only diagnostic command table.
//!
//! Commands are addressed by path (`/ring/list`, `/ring/info`,
//! `/ethdev/lsc`) and take at most one parameter, written after a comma:
//! `/ring/info,rx-to-worker`. Replies are JSON values; carrying them to a
//! client is left to the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::{DiagnosticError, RingloopResult};
use crate::link_state::LinkStateCounters;
use crate::ring::RingRegistry;
use crate::types::SourceId;

/// Default path prefix for ring commands.
pub const RING_PREFIX: &str = "/ring";

/// Default path of the link-state counter command.
pub const LSC_COMMAND: &str = "/ethdev/lsc";

enum Handler {
    RingList(Arc<RingRegistry>),
    RingInfo(Arc<RingRegistry>),
    LinkState(Arc<LinkStateCounters>),
}

struct Command {
    handler: Handler,
    help: &'static str,
}

/// Table of diagnostic commands keyed by path.
#[derive(Default)]
pub struct DiagnosticCommands {
    commands: BTreeMap<String, Command>,
}

impl DiagnosticCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with ring commands under [`RING_PREFIX`] and the link-state
    /// command at [`LSC_COMMAND`].
    pub fn with_defaults(
        rings: Arc<RingRegistry>,
        link_state: Arc<LinkStateCounters>,
    ) -> RingloopResult<Self> {
        let mut table = Self::new();
        table.register_rings(RING_PREFIX, rings)?;
        table.register_link_state(LSC_COMMAND, link_state)?;
        Ok(table)
    }

    /// Register `<prefix>/list` and `<prefix>/info`.
    pub fn register_rings(
        &mut self,
        prefix: &str,
        rings: Arc<RingRegistry>,
    ) -> Result<(), DiagnosticError> {
        self.insert(
            format!("{}/list", prefix),
            Handler::RingList(Arc::clone(&rings)),
            "Show list of rings. Takes no parameters.",
        )?;
        self.insert(
            format!("{}/info", prefix),
            Handler::RingInfo(rings),
            "Show info on the ring. Param: ring name.",
        )
    }

    /// Register the link-state counter query at `path`.
    pub fn register_link_state(
        &mut self,
        path: &str,
        counters: Arc<LinkStateCounters>,
    ) -> Result<(), DiagnosticError> {
        self.insert(
            path.to_string(),
            Handler::LinkState(counters),
            "Returns LSC counter for specified source id.",
        )
    }

    fn insert(
        &mut self,
        path: String,
        handler: Handler,
        help: &'static str,
    ) -> Result<(), DiagnosticError> {
        if self.commands.contains_key(&path) {
            return Err(DiagnosticError::DuplicateCommand { command: path });
        }
        tracing::debug!(command = %path, "Diagnostic command registered");
        self.commands.insert(path, Command { handler, help });
        Ok(())
    }

    /// Registered paths with their help text, sorted by path.
    pub fn commands(&self) -> Vec<(&str, &'static str)> {
        self.commands
            .iter()
            .map(|(path, cmd)| (path.as_str(), cmd.help))
            .collect()
    }

    /// Execute a request line of the form `path[,param]`.
    pub fn execute(&self, request: &str) -> RingloopResult<Value> {
        let (path, params) = match request.split_once(',') {
            Some((path, params)) => (path, Some(params)),
            None => (request, None),
        };
        self.call(path.trim(), params)
    }

    /// Run command `path` with optional `params`.
    pub fn call(&self, path: &str, params: Option<&str>) -> RingloopResult<Value> {
        let command = self
            .commands
            .get(path)
            .ok_or_else(|| DiagnosticError::UnknownCommand {
                command: path.to_string(),
            })?;

        match &command.handler {
            Handler::RingList(rings) => {
                let names: Vec<String> = rings.list().into_iter().map(String::from).collect();
                Ok(json!(names))
            }
            Handler::RingInfo(rings) => {
                let name = required_param(path, params)?;
                let info = rings.info(name)?;
                serde_json::to_value(info).map_err(|e| {
                    DiagnosticError::Encode {
                        command: path.to_string(),
                        message: e.to_string(),
                    }
                    .into()
                })
            }
            Handler::LinkState(counters) => {
                let param = required_param(path, params)?;
                let source: SourceId =
                    param
                        .parse()
                        .map_err(|_| DiagnosticError::InvalidParameter {
                            command: path.to_string(),
                            param: param.to_string(),
                        })?;
                let info = counters.query(source)?;
                Ok(json!({
                    "enabled": info.enabled,
                    "lsc_counter": info.lsc_counter,
                }))
            }
        }
    }
}

fn required_param<'a>(path: &str, params: Option<&'a str>) -> Result<&'a str, DiagnosticError> {
    match params.map(str::trim) {
        Some(p) if !p.is_empty() => Ok(p),
        _ => Err(DiagnosticError::MissingParameter {
            command: path.to_string(),
        }),
    }
}
