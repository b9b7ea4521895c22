//! Channel addresses
//!
//! Every payload is published to a channel named `scope/namespace/path`.
//! Managed streams publish under the `stream` scope with the stream id as
//! namespace, e.g. `stream/telegraf/cpu`.

use std::str::FromStr;

use thiserror::Error;

/// Top-level channel scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Built-in server features
    Grafana,
    /// Plugin-owned channels
    Plugin,
    /// Data source channels
    DataSource,
    /// Managed streams
    Stream,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Grafana => "grafana",
            Scope::Plugin => "plugin",
            Scope::DataSource => "ds",
            Scope::Stream => "stream",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grafana" => Ok(Scope::Grafana),
            "plugin" => Ok(Scope::Plugin),
            "ds" => Ok(Scope::DataSource),
            "stream" => Ok(Scope::Stream),
            other => Err(ChannelError::UnknownScope(other.to_string())),
        }
    }
}

/// Error parsing a channel address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("channel has no scope")]
    EmptyScope,
    #[error("unknown channel scope: {0}")]
    UnknownScope(String),
    #[error("channel has no namespace")]
    EmptyNamespace,
}

/// Parsed channel address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    pub scope: Scope,
    pub namespace: String,
    /// Remainder of the address, may itself contain `/`
    pub path: String,
}

impl Channel {
    /// Create a channel address
    pub fn new(scope: Scope, namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scope,
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// Canonical channel of a managed stream path
    pub fn stream(stream_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Scope::Stream, stream_id, path)
    }

    /// Parse `scope/namespace/path`
    ///
    /// Splits on the first two `/` only, so the path keeps its own separators.
    pub fn parse(s: &str) -> Result<Self, ChannelError> {
        let mut parts = s.splitn(3, '/');

        let scope = match parts.next() {
            Some("") | None => return Err(ChannelError::EmptyScope),
            Some(scope) => scope.parse()?,
        };
        let namespace = match parts.next() {
            Some("") | None => return Err(ChannelError::EmptyNamespace),
            Some(ns) => ns,
        };
        let path = parts.next().unwrap_or_default();

        Ok(Self::new(scope, namespace, path))
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}/{}", self.scope, self.namespace)
        } else {
            write!(f, "{}/{}/{}", self.scope, self.namespace, self.path)
        }
    }
}

impl FromStr for Channel {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::parse(s)
    }
}
