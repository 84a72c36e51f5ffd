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

//! Classification of driver errors.
//!
//! A failed connection is reported by error class and ends the scenario
//! without failing it. A query against a table that does not exist is
//! expected to fail with one of the policy's expected statuses.

use super::{failed, Context};
use crate::config::ImpersonationConfig;
use crate::error::ErrorClass;
use adbc_core::error::Result;
use adbc_core::{Connection, Database, Driver, Statement};
use std::io::Write;

pub const MISSING_TABLE: &str = "non_existent_table";

pub fn missing_table_sql(config: &ImpersonationConfig) -> String {
    format!(
        "SELECT * FROM {} LIMIT 1",
        config.qualified_table(MISSING_TABLE)
    )
}

pub fn run<D: Driver>(ctx: &mut Context<'_, D>) -> Result<()> {
    let config = ctx.config()?;
    let database = ctx.open_database(&config)?;

    let mut connection = match database.new_connection() {
        Ok(connection) => connection,
        Err(err) => {
            let class = ErrorClass::of(&err);
            tracing::error!(status = ?err.status, "{class}: {}", err.message);
            say!(ctx.out, "{class}: {}", err.message);
            return Ok(());
        }
    };
    say!(ctx.out, "Connection established successfully!");

    let mut statement = connection
        .new_statement()
        .map_err(failed("create statement"))?;
    statement
        .set_sql_query(missing_table_sql(&config))
        .map_err(failed("set SQL query"))?;

    match statement.execute() {
        Ok(_) => say!(ctx.out, "Unexpected success - table should not exist"),
        Err(err) if ctx.policy.is_expected_missing_table(&err) => {
            tracing::info!(status = ?err.status, "missing table reported as expected");
            say!(ctx.out, "Expected error (table not found): {}", err.message)
        }
        Err(err) => {
            tracing::warn!(status = ?err.status, "unexpected error for missing table");
            say!(
                ctx.out,
                "Unexpected ADBC error: {} (code: {:?})",
                err.message,
                err.status
            )
        }
    }
    Ok(())
}
