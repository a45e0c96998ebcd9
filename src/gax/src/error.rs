// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The error type and error details for all client operations.
//!
//! The client libraries distinguish between errors returned by the service
//! itself, errors detected before the RPC left the process (serialization,
//! authentication), and errors in the transport (I/O, timeouts). Retry
//! policies inspect this classification to decide whether an operation is
//! safe to attempt again.

/// A boxed error source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The status of a failed service RPC.
///
/// Services report failures with an HTTP status code, and sometimes with a
/// canonical status string (e.g. `UNAVAILABLE`) in the error payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Status {
    /// The HTTP status code, if the request reached the service.
    pub code: Option<u16>,
    /// The canonical status string, if the service included one.
    pub status: Option<String>,
    /// A human-readable description of the failure.
    pub message: String,
}

impl Status {
    /// Creates a status from an HTTP status code and message.
    pub fn new<M: Into<String>>(code: u16, message: M) -> Self {
        Self {
            code: Some(code),
            status: None,
            message: message.into(),
        }
    }

    /// Sets the canonical status string.
    pub fn set_status<S: Into<String>>(mut self, status: S) -> Self {
        self.status = Some(status.into());
        self
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code, self.status.as_deref()) {
            (Some(c), Some(s)) => write!(f, "{} [{c}/{s}]", self.message),
            (Some(c), None) => write!(f, "{} [{c}]", self.message),
            (None, Some(s)) => write!(f, "{} [{s}]", self.message),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

/// The error type for all client operations.
///
/// # Example
/// ```
/// use gcloud_gax::error::Error;
/// fn handle(e: Error) {
///     if let Some(status) = e.status() {
///         println!("the service rejected the request: {status}");
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

#[derive(Debug)]
enum ErrorKind {
    Service(Box<Status>),
    Timeout(BoxError),
    Io(BoxError),
    Authentication(BoxError),
    Serialization(BoxError),
    Deserialization(BoxError),
    Exhausted(BoxError),
    Other(BoxError),
}

impl Error {
    /// The service rejected the request or reported a failure.
    pub fn service(status: Status) -> Self {
        Self {
            kind: ErrorKind::Service(Box::new(status)),
        }
    }

    /// The request did not complete in the allotted time.
    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Timeout(source.into()),
        }
    }

    /// The transport reported an I/O failure. It is unknown whether the
    /// request was received by the service.
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Io(source.into()),
        }
    }

    /// The request could not be authenticated. The RPC never left the
    /// process.
    pub fn authentication<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Authentication(source.into()),
        }
    }

    /// The request could not be serialized. The RPC never left the process.
    pub fn ser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Serialization(source.into()),
        }
    }

    /// The response could not be deserialized.
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Deserialization(source.into()),
        }
    }

    /// A retry policy stopped the retry loop before the error became
    /// permanent.
    pub fn exhausted<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Exhausted(source.into()),
        }
    }

    /// An error that does not fit the other classifications.
    pub fn other<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Other(source.into()),
        }
    }

    /// The status reported by the service, if any.
    pub fn status(&self) -> Option<&Status> {
        match &self.kind {
            ErrorKind::Service(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// The HTTP status code of the failed request, if it reached the service.
    pub fn http_status_code(&self) -> Option<u16> {
        self.status().and_then(|s| s.code)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout(_))
    }

    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io(_))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Serialization(_))
    }

    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.kind, ErrorKind::Exhausted(_))
    }

    /// True if the error happened before the RPC could have reached the
    /// service, making a retry always safe.
    pub fn is_before_rpc(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Authentication(_) | ErrorKind::Serialization(_)
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ErrorKind::Service(s) => write!(f, "the service reported an error: {s}"),
            ErrorKind::Timeout(e) => write!(f, "the request exceeded its deadline: {e}"),
            ErrorKind::Io(e) => write!(f, "the transport reported an I/O error: {e}"),
            ErrorKind::Authentication(e) => {
                write!(f, "cannot create the authentication headers: {e}")
            }
            ErrorKind::Serialization(e) => write!(f, "cannot serialize the request: {e}"),
            ErrorKind::Deserialization(e) => write!(f, "cannot deserialize the response: {e}"),
            ErrorKind::Exhausted(e) => write!(f, "the retry policy is exhausted: {e}"),
            ErrorKind::Other(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Service(_) => None,
            ErrorKind::Timeout(e)
            | ErrorKind::Io(e)
            | ErrorKind::Authentication(e)
            | ErrorKind::Serialization(e)
            | ErrorKind::Deserialization(e)
            | ErrorKind::Exhausted(e)
            | ErrorKind::Other(e) => Some(e.as_ref()),
        }
    }
}
