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

//! The example scenarios.
//!
//! Every scenario follows the same shape: open a database and a connection
//! from the driver, execute one or more statements, print the results and
//! drop the handles in reverse order of acquisition. A returned error is
//! fatal to the scenario; tolerated driver errors are reported on the
//! output and the scenario moves on.

pub mod basic_query;
pub mod bulk_insert;
pub mod error_handling;
pub mod metadata;
pub mod user_auth;

use crate::config::{EnvSource, ImpersonationConfig};
use adbc_core::error::{Error as AdbcError, Result, Status};
use adbc_core::{Database, Driver};
use std::fmt;
use std::io::Write;

/// Driver statuses that scenarios treat as expected outcomes.
#[derive(Debug, Clone)]
pub struct TolerancePolicy {
    /// Object listing failures attributed to BigQuery schema complexity.
    pub known_object_listing_failures: Vec<Status>,
    /// Statuses expected when querying a table that does not exist.
    pub expected_missing_table: Vec<Status>,
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self {
            known_object_listing_failures: vec![Status::InvalidArguments],
            expected_missing_table: vec![Status::NotFound],
        }
    }
}

impl TolerancePolicy {
    pub fn is_known_object_listing_failure(&self, err: &AdbcError) -> bool {
        self.known_object_listing_failures.contains(&err.status)
    }

    pub fn is_expected_missing_table(&self, err: &AdbcError) -> bool {
        self.expected_missing_table.contains(&err.status)
    }
}

/// Everything a scenario needs: the driver, where to read configuration
/// from, which failures to tolerate and where to print.
pub struct Context<'a, D> {
    pub driver: &'a mut D,
    pub env: &'a dyn EnvSource,
    pub policy: &'a TolerancePolicy,
    pub out: &'a mut dyn Write,
}

impl<D: Driver> Context<'_, D> {
    /// Reloads the configuration from the environment.
    pub fn config(&self) -> Result<ImpersonationConfig> {
        ImpersonationConfig::load(self.env).map_err(|err| err.to_adbc())
    }

    /// Creates a database configured with `config`.
    pub fn open_database(&mut self, config: &ImpersonationConfig) -> Result<D::DatabaseType> {
        tracing::debug!(?config, "creating database");
        self.driver
            .new_database_with_opts(config.database_options())
            .map_err(failed("create database"))
    }
}

/// Opens a connection on `database`.
pub fn open_connection<DB: Database>(database: &DB) -> Result<DB::ConnectionType> {
    tracing::debug!("opening connection");
    database
        .new_connection()
        .map_err(failed("open connection"))
}

/// Prefixes a driver error with the step that failed, keeping its status.
pub fn failed(step: &'static str) -> impl FnOnce(AdbcError) -> AdbcError {
    move |mut err| {
        err.message = format!("Failed to {step}: {}", err.message);
        err
    }
}

/// Reports a tolerated error and tells the reader the scenario goes on.
pub(crate) fn warn_and_continue(
    out: &mut dyn Write,
    what: &str,
    err: &AdbcError,
    hints: &[&str],
) -> Result<()> {
    tracing::warn!(status = ?err.status, "{what}: {}", err.message);
    say!(out, "⚠️  Warning: {what}: {}", err.message);
    for hint in hints {
        say!(out, "   {hint}");
    }
    Ok(())
}

/// The five example scenarios, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    BasicQuery,
    BulkInsert,
    Metadata,
    UserAuth,
    ErrorHandling,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::BasicQuery,
        Scenario::BulkInsert,
        Scenario::Metadata,
        Scenario::UserAuth,
        Scenario::ErrorHandling,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::BasicQuery => "Basic Query",
            Self::BulkInsert => "Bulk Insert",
            Self::Metadata => "Metadata Queries",
            Self::UserAuth => "User Auth + Impersonation",
            Self::ErrorHandling => "Error Handling",
        }
    }

    pub fn run<D: Driver>(self, ctx: &mut Context<'_, D>) -> Result<()> {
        match self {
            Self::BasicQuery => basic_query::run(ctx),
            Self::BulkInsert => bulk_insert::run(ctx),
            Self::Metadata => metadata::run(ctx),
            Self::UserAuth => user_auth::run(ctx),
            Self::ErrorHandling => error_handling::run(ctx),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
