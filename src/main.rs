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

//! Runs the BigQuery service account impersonation examples.
//!
//! ```bash
//! export GOOGLE_CLOUD_PROJECT="my-project"
//! export ADBC_BIGQUERY_DATASET_ID="my_dataset"
//! export ADBC_BIGQUERY_IMPERSONATE_TARGET="sa@my-project.iam.gserviceaccount.com"
//! bigquery-impersonation
//! ```
//!
//! The base credentials need the Service Account Token Creator role on the
//! target service account, and `libadbc_driver_bigquery` must be on the
//! library search path.

use bigquery_adbc_impersonation::logging::{init_logging, LogConfig};
use bigquery_adbc_impersonation::{runner, Driver, ProcessEnv, TolerancePolicy};
use std::process::ExitCode;

fn main() -> ExitCode {
    let env = ProcessEnv;
    init_logging(&LogConfig::load(&env));

    let policy = TolerancePolicy::default();
    let mut stdout = std::io::stdout().lock();
    match runner::run(&env, Driver::try_load, &policy, &mut stdout) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.message);
            ExitCode::FAILURE
        }
    }
}
