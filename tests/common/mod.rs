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

//! In-memory stand-in for the BigQuery ADBC driver.
//!
//! Implements the `adbc_core` traits over a tiny table store so scenarios
//! can run without the shared library or network access. It understands
//! exactly the statements the scenarios issue, and failures can be injected
//! per operation.

#![allow(dead_code)]

use adbc_core::error::{Error, Result, Status};
use adbc_core::options::{
    InfoCode, ObjectDepth, OptionConnection, OptionDatabase, OptionStatement, OptionValue,
};
use adbc_core::Optionable;
use arrow_array::{
    Array, ArrayRef, Int64Array, RecordBatch, RecordBatchIterator, RecordBatchReader, StringArray,
};
use arrow_schema::{ArrowError, DataType, Field, Schema, SchemaRef};
use bigquery_adbc_impersonation::config::{
    DATASET_ID_ENV, IMPERSONATE_TARGET_PRINCIPAL, PROJECT_ID_ENV, TARGET_PRINCIPAL_ENV,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

pub const PROJECT: &str = "test-project-123";
pub const DATASET: &str = "impersonation_ds";
pub const TARGET: &str = "reader@test-project-123.iam.gserviceaccount.com";

/// Environment with all required variables set.
pub fn full_env() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (PROJECT_ID_ENV, PROJECT),
        (DATASET_ID_ENV, DATASET),
        (TARGET_PRINCIPAL_ENV, TARGET),
    ])
}

/// Operations whose failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    NewConnection,
    NewStatement,
    TableSchema,
    TableTypes,
    Objects,
    TablesQuery,
    SessionUser,
}

/// Type alias for the readers returned by the fake.
type Reader = RecordBatchIterator<std::vec::IntoIter<std::result::Result<RecordBatch, ArrowError>>>;

#[derive(Debug, Clone)]
struct UserRow {
    name: String,
    age: i64,
    city: String,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Vec<UserRow>>,
    failures: HashMap<Op, Status>,
    session_user: Option<String>,
    hide_row_counts: bool,
    database_options: Vec<BTreeMap<String, String>>,
    executed: Vec<String>,
    opened: [usize; 3],
    released: [usize; 3],
}

const DATABASE: usize = 0;
const CONNECTION: usize = 1;
const STATEMENT: usize = 2;

/// Shared handle on the fake's state, used to configure it and to inspect
/// what the scenarios did.
#[derive(Debug, Clone, Default)]
pub struct FakeBigQuery {
    state: Arc<Mutex<State>>,
}

impl FakeBigQuery {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake state poisoned")
    }

    pub fn driver(&self) -> FakeDriver {
        FakeDriver {
            backend: self.clone(),
        }
    }

    /// Makes `op` fail with `status`.
    pub fn fail(&self, op: Op, status: Status) -> &Self {
        self.lock().failures.insert(op, status);
        self
    }

    /// Overrides the user reported by `SESSION_USER()`.
    pub fn with_session_user(&self, user: &str) -> &Self {
        self.lock().session_user = Some(user.to_string());
        self
    }

    /// Makes inserts report no affected-row count.
    pub fn without_row_counts(&self) -> &Self {
        self.lock().hide_row_counts = true;
        self
    }

    /// Options each database was created with, in creation order.
    pub fn database_options(&self) -> Vec<BTreeMap<String, String>> {
        self.lock().database_options.clone()
    }

    /// SQL text of every executed statement, in order.
    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    pub fn table_names(&self, table: &str) -> Option<Vec<String>> {
        self.lock()
            .tables
            .get(table)
            .map(|rows| rows.iter().map(|r| r.name.clone()).collect())
    }

    /// `(opened, released)` counts for databases, connections, statements.
    pub fn handle_counts(&self) -> ([usize; 3], [usize; 3]) {
        let state = self.lock();
        (state.opened, state.released)
    }

    pub fn assert_all_released(&self) {
        let (opened, released) = self.handle_counts();
        assert_eq!(opened, released, "every handle must be released once");
    }

    fn check(&self, op: Op, message: &str) -> Result<()> {
        match self.lock().failures.get(&op) {
            Some(status) => Err(Error::with_message_and_status(message, *status)),
            None => Ok(()),
        }
    }

    fn open(&self, kind: usize) {
        self.lock().opened[kind] += 1;
    }

    fn release(&self, kind: usize) {
        self.lock().released[kind] += 1;
    }
}

fn unsupported(what: &str) -> Error {
    Error::with_message_and_status(format!("{what} not supported by fake"), Status::NotImplemented)
}

fn reader(batch: RecordBatch) -> Reader {
    let schema = batch.schema();
    RecordBatchIterator::new(vec![Ok(batch)], schema)
}

/// Returns the text between the first pair of backticks.
fn quoted_table(sql: &str) -> Option<String> {
    let start = sql.find('`')? + 1;
    let len = sql[start..].find('`')?;
    Some(sql[start..start + len].to_string())
}

fn unqualified(table: &str) -> &str {
    table.rsplit('.').next().unwrap_or(table)
}

fn users_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, true),
        Field::new("age", DataType::Int64, true),
        Field::new("city", DataType::Utf8, true),
    ]))
}

fn not_found(table: &str) -> Error {
    Error::with_message_and_status(
        format!("Not found: Table {table} was not found"),
        Status::NotFound,
    )
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct FakeDriver {
    backend: FakeBigQuery,
}

impl adbc_core::Driver for FakeDriver {
    type DatabaseType = FakeDatabase;

    fn new_database(&mut self) -> Result<Self::DatabaseType> {
        self.backend.open(DATABASE);
        self.backend.lock().database_options.push(BTreeMap::new());
        Ok(FakeDatabase {
            backend: self.backend.clone(),
            options: BTreeMap::new(),
        })
    }

    fn new_database_with_opts(
        &mut self,
        opts: impl IntoIterator<Item = (OptionDatabase, OptionValue)>,
    ) -> Result<Self::DatabaseType> {
        let mut options = BTreeMap::new();
        for (key, value) in opts {
            match value {
                OptionValue::String(v) => {
                    options.insert(key.as_ref().to_string(), v);
                }
                _ => return Err(unsupported("non-string database option")),
            }
        }
        self.backend.open(DATABASE);
        self.backend.lock().database_options.push(options.clone());
        Ok(FakeDatabase {
            backend: self.backend.clone(),
            options,
        })
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct FakeDatabase {
    backend: FakeBigQuery,
    options: BTreeMap<String, String>,
}

impl Drop for FakeDatabase {
    fn drop(&mut self) {
        self.backend.release(DATABASE);
    }
}

impl Optionable for FakeDatabase {
    type Option = OptionDatabase;

    fn set_option(&mut self, key: Self::Option, value: OptionValue) -> Result<()> {
        match value {
            OptionValue::String(v) => {
                self.options.insert(key.as_ref().to_string(), v);
                Ok(())
            }
            _ => Err(unsupported("non-string database option")),
        }
    }

    fn get_option_string(&self, key: Self::Option) -> Result<String> {
        self.options
            .get(key.as_ref())
            .cloned()
            .ok_or_else(|| Error::with_message_and_status("option not set", Status::NotFound))
    }

    fn get_option_bytes(&self, _key: Self::Option) -> Result<Vec<u8>> {
        Err(unsupported("bytes option"))
    }

    fn get_option_int(&self, _key: Self::Option) -> Result<i64> {
        Err(unsupported("int option"))
    }

    fn get_option_double(&self, _key: Self::Option) -> Result<f64> {
        Err(unsupported("double option"))
    }
}

impl adbc_core::Database for FakeDatabase {
    type ConnectionType = FakeConnection;

    fn new_connection(&self) -> Result<Self::ConnectionType> {
        self.backend
            .check(Op::NewConnection, "impersonation token exchange failed")?;
        let session_user = self
            .options
            .get(IMPERSONATE_TARGET_PRINCIPAL)
            .cloned()
            .unwrap_or_default();
        self.backend.open(CONNECTION);
        Ok(FakeConnection {
            backend: self.backend.clone(),
            session_user,
        })
    }

    fn new_connection_with_opts(
        &self,
        opts: impl IntoIterator<Item = (OptionConnection, OptionValue)>,
    ) -> Result<Self::ConnectionType> {
        let mut connection = self.new_connection()?;
        for (key, value) in opts {
            connection.set_option(key, value)?;
        }
        Ok(connection)
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct FakeConnection {
    backend: FakeBigQuery,
    session_user: String,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.backend.release(CONNECTION);
    }
}

impl Optionable for FakeConnection {
    type Option = OptionConnection;

    fn set_option(&mut self, _key: Self::Option, _value: OptionValue) -> Result<()> {
        Err(unsupported("connection option"))
    }

    fn get_option_string(&self, _key: Self::Option) -> Result<String> {
        Err(unsupported("connection option"))
    }

    fn get_option_bytes(&self, _key: Self::Option) -> Result<Vec<u8>> {
        Err(unsupported("connection option"))
    }

    fn get_option_int(&self, _key: Self::Option) -> Result<i64> {
        Err(unsupported("connection option"))
    }

    fn get_option_double(&self, _key: Self::Option) -> Result<f64> {
        Err(unsupported("connection option"))
    }
}

impl adbc_core::Connection for FakeConnection {
    type StatementType = FakeStatement;

    fn new_statement(&mut self) -> Result<Self::StatementType> {
        self.backend
            .check(Op::NewStatement, "statement quota exceeded")?;
        self.backend.open(STATEMENT);
        Ok(FakeStatement {
            backend: self.backend.clone(),
            session_user: self.session_user.clone(),
            query: None,
            bound: None,
        })
    }

    fn cancel(&mut self) -> Result<()> {
        Ok(())
    }

    fn get_info(&self, _codes: Option<HashSet<InfoCode>>) -> Result<impl RecordBatchReader + Send> {
        Err::<Reader, _>(unsupported("get_info"))
    }

    fn get_objects(
        &self,
        _depth: ObjectDepth,
        _catalog: Option<&str>,
        _db_schema: Option<&str>,
        _table_name: Option<&str>,
        _table_type: Option<Vec<&str>>,
        _column_name: Option<&str>,
    ) -> Result<impl RecordBatchReader + Send> {
        self.backend
            .check(Op::Objects, "unsupported nested field in table schema")?;
        let catalogs: ArrayRef = Arc::new(StringArray::from(vec![PROJECT]));
        let batch = RecordBatch::try_from_iter(vec![("catalog_name", catalogs)])?;
        Ok(reader(batch))
    }

    fn get_table_schema(
        &self,
        _catalog: Option<&str>,
        _db_schema: Option<&str>,
        table_name: &str,
    ) -> Result<Schema> {
        self.backend
            .check(Op::TableSchema, "permission denied on table metadata")?;
        let exists = self
            .backend
            .lock()
            .tables
            .keys()
            .any(|name| unqualified(name) == table_name);
        if !exists {
            return Err(not_found(table_name));
        }
        let metadata = HashMap::from([
            ("Type".to_string(), "TABLE".to_string()),
            ("Name".to_string(), table_name.to_string()),
        ]);
        Ok(users_schema().as_ref().clone().with_metadata(metadata))
    }

    fn get_table_types(&self) -> Result<impl RecordBatchReader + Send> {
        self.backend
            .check(Op::TableTypes, "table types unavailable")?;
        let types: ArrayRef = Arc::new(StringArray::from(vec![
            "BASE TABLE",
            "VIEW",
            "MATERIALIZED VIEW",
        ]));
        let batch = RecordBatch::try_from_iter(vec![("table_type", types)])?;
        Ok(reader(batch))
    }

    fn read_partition(&self, _partition: impl AsRef<[u8]>) -> Result<impl RecordBatchReader + Send> {
        Err::<Reader, _>(unsupported("read_partition"))
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Err(unsupported("rollback"))
    }

    fn get_statistic_names(&self) -> Result<impl RecordBatchReader + Send> {
        Err::<Reader, _>(unsupported("get_statistic_names"))
    }

    fn get_statistics(
        &self,
        _catalog: Option<&str>,
        _db_schema: Option<&str>,
        _table_name: Option<&str>,
        _approximate: bool,
    ) -> Result<impl RecordBatchReader + Send> {
        Err::<Reader, _>(unsupported("get_statistics"))
    }
}

// ---------------------------------------------------------------------------
// Statement
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct FakeStatement {
    backend: FakeBigQuery,
    session_user: String,
    query: Option<String>,
    bound: Option<RecordBatch>,
}

impl Drop for FakeStatement {
    fn drop(&mut self) {
        self.backend.release(STATEMENT);
    }
}

impl FakeStatement {
    fn sql(&self) -> Result<String> {
        let sql = self
            .query
            .clone()
            .ok_or_else(|| Error::with_message_and_status("no query set", Status::InvalidState))?;
        self.backend.lock().executed.push(sql.clone());
        Ok(sql)
    }

    fn select_users(&self, table: &str) -> Result<RecordBatch> {
        let mut rows = self
            .backend
            .lock()
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| not_found(table))?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.name.as_str()))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.age))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.city.as_str()))),
        ];
        Ok(RecordBatch::try_new(users_schema(), columns)?)
    }

    fn tables_row(&self, sql: &str) -> Result<RecordBatch> {
        self.backend
            .check(Op::TablesQuery, "Access Denied: __TABLES__")?;
        let dataset = quoted_table(sql).unwrap_or_default();
        let prefix = dataset.trim_end_matches("__TABLES__");
        let row_count = self
            .backend
            .lock()
            .tables
            .get(&format!("{prefix}test_users"))
            .map_or(0, |rows| rows.len() as i64);
        Ok(RecordBatch::try_from_iter(vec![
            ("table_id", Arc::new(StringArray::from(vec!["test_users"])) as ArrayRef),
            (
                "creation_time",
                Arc::new(Int64Array::from(vec![1_700_000_000_000])) as ArrayRef,
            ),
            (
                "last_modified_time",
                Arc::new(Int64Array::from(vec![1_700_000_500_000])) as ArrayRef,
            ),
            ("row_count", Arc::new(Int64Array::from(vec![row_count])) as ArrayRef),
            ("size_bytes", Arc::new(Int64Array::from(vec![row_count * 32])) as ArrayRef),
            ("type", Arc::new(Int64Array::from(vec![1])) as ArrayRef),
        ])?)
    }
}

impl Optionable for FakeStatement {
    type Option = OptionStatement;

    fn set_option(&mut self, _key: Self::Option, _value: OptionValue) -> Result<()> {
        Err(unsupported("statement option"))
    }

    fn get_option_string(&self, _key: Self::Option) -> Result<String> {
        Err(unsupported("statement option"))
    }

    fn get_option_bytes(&self, _key: Self::Option) -> Result<Vec<u8>> {
        Err(unsupported("statement option"))
    }

    fn get_option_int(&self, _key: Self::Option) -> Result<i64> {
        Err(unsupported("statement option"))
    }

    fn get_option_double(&self, _key: Self::Option) -> Result<f64> {
        Err(unsupported("statement option"))
    }
}

impl adbc_core::Statement for FakeStatement {
    fn set_sql_query(&mut self, query: impl AsRef<str>) -> Result<()> {
        self.query = Some(query.as_ref().to_string());
        Ok(())
    }

    fn set_substrait_plan(&mut self, _plan: impl AsRef<[u8]>) -> Result<()> {
        Err(unsupported("Substrait plans"))
    }

    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    fn get_parameter_schema(&self) -> Result<Schema> {
        Err(unsupported("get_parameter_schema"))
    }

    fn bind(&mut self, batch: RecordBatch) -> Result<()> {
        self.bound = Some(batch);
        Ok(())
    }

    fn bind_stream(&mut self, _stream: Box<dyn RecordBatchReader + Send>) -> Result<()> {
        Err(unsupported("bind_stream"))
    }

    fn execute(&mut self) -> Result<impl RecordBatchReader + Send> {
        let sql = self.sql()?;
        let batch = if sql.starts_with("SELECT 1") {
            let values: ArrayRef = Arc::new(Int64Array::from(vec![1]));
            RecordBatch::try_from_iter(vec![("test_column", values)])?
        } else if sql.contains("SESSION_USER()") {
            self.backend
                .check(Op::SessionUser, "session user lookup failed")?;
            let user = self
                .backend
                .lock()
                .session_user
                .clone()
                .unwrap_or_else(|| self.session_user.clone());
            let users: ArrayRef = Arc::new(StringArray::from(vec![user]));
            RecordBatch::try_from_iter(vec![("current_user", users)])?
        } else if sql.contains("__TABLES__") {
            self.tables_row(&sql)?
        } else if sql.starts_with("SELECT") {
            let table = quoted_table(&sql).unwrap_or_default();
            self.select_users(&table)?
        } else {
            return Err(unsupported("query"));
        };
        Ok(reader(batch))
    }

    fn execute_update(&mut self) -> Result<Option<i64>> {
        let sql = self.sql()?;
        let table = quoted_table(&sql).ok_or_else(|| unsupported("unqualified table"))?;
        if sql.starts_with("CREATE OR REPLACE TABLE") {
            self.backend.lock().tables.insert(table, Vec::new());
            return Ok(Some(0));
        }
        if !sql.starts_with("INSERT INTO") {
            return Err(unsupported("update"));
        }

        let batch = self
            .bound
            .take()
            .ok_or_else(|| Error::with_message_and_status("no parameters bound", Status::InvalidState))?;
        let names = batch.column(0).as_any().downcast_ref::<StringArray>();
        let ages = batch.column(1).as_any().downcast_ref::<Int64Array>();
        let cities = batch.column(2).as_any().downcast_ref::<StringArray>();
        let (Some(names), Some(ages), Some(cities)) = (names, ages, cities) else {
            return Err(Error::with_message_and_status(
                "parameter types do not match (STRING, INT64, STRING)",
                Status::InvalidArguments,
            ));
        };

        let mut state = self.backend.lock();
        let rows = state.tables.get_mut(&table).ok_or_else(|| not_found(&table))?;
        for i in 0..batch.num_rows() {
            rows.push(UserRow {
                name: names.value(i).to_string(),
                age: ages.value(i),
                city: cities.value(i).to_string(),
            });
        }
        if state.hide_row_counts {
            return Ok(None);
        }
        Ok(Some(batch.num_rows() as i64))
    }

    fn execute_schema(&mut self) -> Result<Schema> {
        Err(unsupported("execute_schema"))
    }

    fn execute_partitions(&mut self) -> Result<adbc_core::PartitionedResult> {
        Err(unsupported("execute_partitions"))
    }

    fn cancel(&mut self) -> Result<()> {
        Ok(())
    }
}
