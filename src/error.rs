// Copyright (c) 2025 ADBC Drivers Contributors
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

//! Error types for the BigQuery impersonation examples.
//!
//! Errors raised by this crate (missing configuration, console write
//! failures) go through the driverbase error framework so they carry the
//! same shape as errors reported by the driver itself. Driver errors are
//! classified with [`ErrorClass`].

use adbc_core::error::{Error as AdbcError, Status};
use driverbase::error::ErrorHelper;
use std::fmt;

/// Error helper for errors raised by the examples.
#[derive(Clone)]
pub struct BigQueryErrorHelper;

impl ErrorHelper for BigQueryErrorHelper {
    const NAME: &'static str = "BigQuery";
}

/// The error type for errors raised by this crate.
pub type Error = driverbase::error::Error<BigQueryErrorHelper>;

/// A convenient alias for Results with crate errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Converts a console write failure into an ADBC error.
pub(crate) fn output_error(err: std::io::Error) -> AdbcError {
    BigQueryErrorHelper::io()
        .message(err.to_string())
        .context("write scenario output")
        .to_adbc()
}

/// Coarse classification of a driver-reported status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidArgument,
    Unauthorized,
    NotFound,
    Other,
}

impl ErrorClass {
    /// Classifies a driver error by its status code.
    pub fn of(error: &AdbcError) -> Self {
        Self::from_status(error.status)
    }

    pub fn from_status(status: Status) -> Self {
        match status {
            Status::InvalidArguments => Self::InvalidArgument,
            Status::Unauthenticated | Status::Unauthorized => Self::Unauthorized,
            Status::NotFound => Self::NotFound,
            _ => Self::Other,
        }
    }

    /// Human readable prefix used when reporting an error of this class.
    pub fn label(self) -> &'static str {
        match self {
            Self::InvalidArgument => "Invalid argument",
            Self::Unauthorized => "Authentication failed",
            Self::NotFound => "Resource not found",
            Self::Other => "Error",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
