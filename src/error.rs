// Copyright (c) 2025 CData Connect Cloud Node Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for the CData Connect Cloud node.
//!
//! Every failure surfaces to the per-item boundary unchanged. Nothing in this
//! crate retries or recovers from an error on its own.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, sending or interpreting a request.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed local input, detected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The remote service answered with an explicit `error` payload.
    #[error("CData Connect Cloud error: {message}")]
    RemoteApi { message: String },

    /// Network, timeout or body decoding failure below the application layer.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status without a recognisable error payload.
    #[error("HTTP {status} - {body}")]
    Http { status: u16, body: String },

    /// Missing or malformed credentials and options.
    #[error("{0}")]
    Configuration(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteApi {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// The verbatim message of a [`Error::RemoteApi`], if this is one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::RemoteApi { message } => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display_and_message() {
        let err = Error::remote("bad syntax");
        assert_eq!(err.to_string(), "CData Connect Cloud error: bad syntax");
        assert_eq!(err.remote_message(), Some("bad syntax"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("Invalid JSON in batch operations");
        assert_eq!(err.to_string(), "Invalid JSON in batch operations");
        assert!(err.remote_message().is_none());
    }

    #[test]
    fn test_http_error_display() {
        let err = Error::Http {
            status: 502,
            body: "upstream".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502 - upstream");
    }
}
