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

//! Loader for the BigQuery ADBC driver shared library.

use adbc_core::error::Result;
use adbc_core::options::{AdbcVersion, OptionDatabase, OptionValue};
use adbc_driver_manager::{ManagedDatabase, ManagedDriver};
use std::fmt;

/// Library name of the BigQuery driver, without platform prefix/suffix.
pub const DRIVER_NAME: &str = "adbc_driver_bigquery";

/// Entry point exported by the BigQuery driver.
pub const DRIVER_ENTRYPOINT: &[u8] = b"AdbcDriverBigQueryInit";

/// The BigQuery ADBC driver, loaded through the driver manager.
///
/// The driver creates Database instances, which in turn create Connections.
pub struct Driver(ManagedDriver);

impl Driver {
    /// Loads the driver shared library using ADBC 1.1.0.
    pub fn try_load() -> Result<Self> {
        Self::try_load_version(AdbcVersion::V110)
    }

    /// Loads the driver shared library using the given ADBC version.
    pub fn try_load_version(version: AdbcVersion) -> Result<Self> {
        tracing::debug!(name = DRIVER_NAME, ?version, "loading BigQuery ADBC driver");
        ManagedDriver::load_dynamic_from_name(DRIVER_NAME, Some(DRIVER_ENTRYPOINT), version)
            .map(Self)
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigQueryDriver").finish_non_exhaustive()
    }
}

impl adbc_core::Driver for Driver {
    type DatabaseType = ManagedDatabase;

    fn new_database(&mut self) -> Result<Self::DatabaseType> {
        self.0.new_database()
    }

    fn new_database_with_opts(
        &mut self,
        opts: impl IntoIterator<Item = (OptionDatabase, OptionValue)>,
    ) -> Result<Self::DatabaseType> {
        self.0.new_database_with_opts(opts)
    }
}
