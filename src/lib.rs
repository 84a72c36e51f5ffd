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

//! Service account impersonation with the BigQuery ADBC driver
//!
//! This crate drives the BigQuery ADBC driver through the standard
//! `adbc_core` traits to show how a base credential can be exchanged for a
//! short-lived credential of another service account.
//!
//! ## Overview
//!
//! - [`config`] - Driver options assembled from environment variables
//! - [`driver`] - Loader for the BigQuery driver shared library
//! - [`scenario`] - The five example scenarios
//! - [`runner`] - Sequential execution of all scenarios
//! - [`mask`] and [`extract`] - Display helpers for secrets and result cells
//!
//! ## Example
//!
//! ```ignore
//! use bigquery_adbc_impersonation::{runner, Driver, ProcessEnv, TolerancePolicy};
//!
//! let mut stdout = std::io::stdout().lock();
//! runner::run(&ProcessEnv, Driver::try_load, &TolerancePolicy::default(), &mut stdout)?;
//! ```

/// Writes a line of scenario output, converting I/O failures into ADBC errors.
macro_rules! say {
    ($out:expr) => {
        writeln!($out).map_err($crate::error::output_error)?
    };
    ($out:expr, $($arg:tt)*) => {
        writeln!($out, $($arg)*).map_err($crate::error::output_error)?
    };
}

pub mod config;
pub mod driver;
pub mod error;
pub mod extract;
pub mod logging;
pub mod mask;
pub mod runner;
pub mod scenario;

pub use config::{EnvSource, ImpersonationConfig, ProcessEnv, UserAuth};
pub use driver::Driver;
pub use error::{BigQueryErrorHelper, Error, ErrorClass, Result};
pub use extract::{safe_int64_value, safe_string_value, CellValue};
pub use mask::mask_sensitive_value;
pub use runner::RunOutcome;
pub use scenario::{Context, Scenario, TolerancePolicy};
