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

//! Bulk insertion of a bound Arrow record as the impersonated account.
//!
//! Creates (or replaces) `test_users`, inserts four rows through a
//! parameterized statement and reads them back ordered by name. The table
//! is recreated on every run.

use super::{failed, open_connection, Context};
use crate::config::ImpersonationConfig;
use crate::extract::{column_at, safe_int64_value, safe_string_value};
use adbc_core::error::Result;
use adbc_core::{Connection, Driver, Statement};
use arrow_array::{ArrayRef, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use std::io::Write;
use std::sync::Arc;

pub const TABLE: &str = "test_users";

const NAMES: [&str; 4] = ["Alice", "Bob", "Charlie", "Diana"];
const AGES: [i64; 4] = [25, 30, 35, 28];
const CITIES: [&str; 4] = ["New York", "San Francisco", "Chicago", "Boston"];

pub fn create_table_sql(config: &ImpersonationConfig) -> String {
    format!(
        "CREATE OR REPLACE TABLE {} (name STRING, age INT64, city STRING)",
        config.qualified_table(TABLE)
    )
}

pub fn insert_sql(config: &ImpersonationConfig) -> String {
    format!(
        "INSERT INTO {} (name, age, city) VALUES (?, ?, ?)",
        config.qualified_table(TABLE)
    )
}

pub fn select_sql(config: &ImpersonationConfig) -> String {
    format!(
        "SELECT name, age, city FROM {} ORDER BY name",
        config.qualified_table(TABLE)
    )
}

/// The rows bound to the insert statement.
pub fn sample_users() -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, true),
        Field::new("age", DataType::Int64, true),
        Field::new("city", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(NAMES.to_vec())),
        Arc::new(Int64Array::from(AGES.to_vec())),
        Arc::new(StringArray::from(CITIES.to_vec())),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

pub fn run<D: Driver>(ctx: &mut Context<'_, D>) -> Result<()> {
    let config = ctx.config()?;
    let database = ctx.open_database(&config)?;
    let mut connection = open_connection(&database)?;

    let mut create = connection
        .new_statement()
        .map_err(failed("create statement"))?;
    create
        .set_sql_query(create_table_sql(&config))
        .map_err(failed("set create table query"))?;
    create.execute_update().map_err(failed("create table"))?;
    say!(ctx.out, "Test table created successfully!");

    let mut insert = connection
        .new_statement()
        .map_err(failed("create statement"))?;
    insert
        .set_sql_query(insert_sql(&config))
        .map_err(failed("set SQL query"))?;
    insert
        .bind(sample_users()?)
        .map_err(failed("bind record"))?;
    let affected = insert.execute_update().map_err(failed("execute update"))?;
    tracing::info!(?affected, table = TABLE, "bulk insert finished");
    match affected {
        Some(rows) => say!(
            ctx.out,
            "Successfully inserted {rows} rows using impersonated credentials"
        ),
        None => say!(
            ctx.out,
            "Successfully inserted rows using impersonated credentials (row count unavailable)"
        ),
    }

    let mut query = connection
        .new_statement()
        .map_err(failed("create query statement"))?;
    query
        .set_sql_query(select_sql(&config))
        .map_err(failed("set query"))?;
    let reader = query.execute().map_err(failed("execute query"))?;

    say!(ctx.out);
    say!(ctx.out, "Querying inserted data:");
    for batch in reader {
        let batch = batch?;
        for row in 0..batch.num_rows() {
            let name = safe_string_value(column_at(&batch, 0), row);
            let age = safe_int64_value(column_at(&batch, 1), row);
            let city = safe_string_value(column_at(&batch, 2), row);
            say!(ctx.out, "Name: {name}, Age: {age}, City: {city}");
        }
    }
    Ok(())
}
