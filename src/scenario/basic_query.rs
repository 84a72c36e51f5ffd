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

//! A single `SELECT 1` executed with impersonated credentials.

use super::{failed, open_connection, Context};
use crate::extract::column_at;
use adbc_core::error::Result;
use adbc_core::{Connection, Driver, Statement};
use arrow_array::cast::AsArray;
use arrow_array::types::Int64Type;
use std::io::Write;

pub const QUERY: &str = "SELECT 1 as test_column";

pub fn run<D: Driver>(ctx: &mut Context<'_, D>) -> Result<()> {
    let config = ctx.config()?;
    let database = ctx.open_database(&config)?;
    let mut connection = open_connection(&database)?;

    let mut statement = connection
        .new_statement()
        .map_err(failed("create statement"))?;
    statement
        .set_sql_query(QUERY)
        .map_err(failed("set SQL query"))?;
    let reader = statement.execute().map_err(failed("execute query"))?;

    say!(ctx.out, "Query executed successfully with impersonated credentials!");
    say!(ctx.out, "Results:");
    for batch in reader {
        let batch = batch?;
        say!(ctx.out, "Schema: {}", batch.schema());
        say!(ctx.out, "Num rows: {}", batch.num_rows());

        let Some(values) = column_at(&batch, 0).and_then(|c| c.as_primitive_opt::<Int64Type>())
        else {
            tracing::debug!("first column is missing or not INT64");
            continue;
        };
        for (row, value) in values.iter().enumerate() {
            if let Some(value) = value {
                say!(ctx.out, "Row {row}: {value}");
            }
        }
    }
    Ok(())
}
