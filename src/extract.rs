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

//! Null-safe extraction of scalar values from result columns.
//!
//! Column types returned by BigQuery are not always the ones a query asks
//! for, so these helpers never fail: absent columns, out of range rows, null
//! cells and mismatched types all map to a default value.

use arrow_array::cast::AsArray;
use arrow_array::types::Int64Type;
use arrow_array::{Array, RecordBatch};
use arrow_schema::DataType;
use std::fmt;

const NULL_TEXT: &str = "null";
const UNKNOWN_TEXT: &str = "unknown";

/// A single cell decoded into one of the supported scalar kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Absent column, out of range row or null cell.
    Null,
    Text(String),
    Int64(i64),
    /// The column has a type that is neither text nor a 64-bit integer.
    Unsupported(DataType),
}

impl CellValue {
    /// Decodes the cell at `row` of `column`.
    pub fn from_array(column: Option<&dyn Array>, row: usize) -> Self {
        let Some(column) = column else {
            return Self::Null;
        };
        if row >= column.len() || column.is_null(row) {
            return Self::Null;
        }
        match column.data_type() {
            DataType::Utf8 => Self::Text(column.as_string::<i32>().value(row).to_string()),
            DataType::LargeUtf8 => Self::Text(column.as_string::<i64>().value(row).to_string()),
            DataType::Utf8View => Self::Text(column.as_string_view().value(row).to_string()),
            DataType::Int64 => Self::Int64(column.as_primitive::<Int64Type>().value(row)),
            other => Self::Unsupported(other.clone()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str(NULL_TEXT),
            Self::Text(s) => f.write_str(s),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Unsupported(_) => f.write_str(UNKNOWN_TEXT),
        }
    }
}

/// Returns column `index` of `batch`, or `None` if the batch is narrower.
pub fn column_at(batch: &RecordBatch, index: usize) -> Option<&dyn Array> {
    batch.columns().get(index).map(|column| column.as_ref())
}

/// Reads a text cell, returning `"null"` for missing cells and non-text
/// columns.
pub fn safe_string_value(column: Option<&dyn Array>, row: usize) -> String {
    match CellValue::from_array(column, row) {
        CellValue::Text(s) => s,
        CellValue::Null | CellValue::Int64(_) | CellValue::Unsupported(_) => NULL_TEXT.to_string(),
    }
}

/// Reads a 64-bit integer cell, returning `0` for missing cells and
/// non-integer columns.
pub fn safe_int64_value(column: Option<&dyn Array>, row: usize) -> i64 {
    match CellValue::from_array(column, row) {
        CellValue::Int64(v) => v,
        _ => 0,
    }
}
