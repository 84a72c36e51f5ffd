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

//! Impersonation on top of OAuth user credentials instead of application
//! default credentials.

use super::{basic_query, failed, open_connection, Context};
use crate::config::UserAuth;
use adbc_core::error::Result;
use adbc_core::{Connection, Driver, Statement};
use std::io::Write;

pub fn run<D: Driver>(ctx: &mut Context<'_, D>) -> Result<()> {
    let config = ctx.config()?.with_user_auth(UserAuth::load(ctx.env));
    let database = ctx.open_database(&config)?;
    let mut connection = open_connection(&database)?;

    let mut statement = connection
        .new_statement()
        .map_err(failed("create statement"))?;
    statement
        .set_sql_query(basic_query::QUERY)
        .map_err(failed("set SQL query"))?;
    let reader = statement.execute().map_err(failed("execute query"))?;

    let mut rows = 0;
    for batch in reader {
        rows += batch?.num_rows();
    }
    tracing::debug!(rows, "user auth query finished");

    say!(ctx.out, "Query executed successfully with user auth + impersonation!");
    Ok(())
}
