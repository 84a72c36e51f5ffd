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

//! Sequential execution of all scenarios.

use crate::config::{
    first_missing_var, EnvSource, DATASET_ID_ENV, PROJECT_ID_ENV, TARGET_PRINCIPAL_ENV,
};
use crate::mask::mask_sensitive_value;
use crate::scenario::{failed, Context, Scenario, TolerancePolicy};
use adbc_core::error::Result;
use adbc_core::Driver;
use std::io::Write;
use std::time::Instant;

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All scenarios ran.
    Completed,
    /// A required environment variable is missing; nothing was run.
    MissingConfig(&'static str),
}

/// Checks the configuration, then loads the driver and runs every scenario.
///
/// The driver is only loaded once the configuration is known to be
/// complete. The first scenario that fails stops the run.
pub fn run<D: Driver>(
    env: &dyn EnvSource,
    load_driver: impl FnOnce() -> Result<D>,
    policy: &TolerancePolicy,
    out: &mut dyn Write,
) -> Result<RunOutcome> {
    if let Some(var) = first_missing_var(env) {
        tracing::error!(var, "missing required environment variable");
        say!(out, "Please set {var} environment variable");
        return Ok(RunOutcome::MissingConfig(var));
    }

    say!(out, "Running service account impersonation examples...");
    for (label, var) in [
        ("Project ID", PROJECT_ID_ENV),
        ("Dataset ID", DATASET_ID_ENV),
        ("Target Principal", TARGET_PRINCIPAL_ENV),
    ] {
        let value = env.non_empty(var).unwrap_or_default();
        say!(out, "{label}: {}", mask_sensitive_value(&value));
    }

    let mut driver = load_driver().map_err(failed("load BigQuery driver"))?;
    let mut ctx = Context {
        driver: &mut driver,
        env,
        policy,
        out,
    };
    run_all(&mut ctx)?;
    Ok(RunOutcome::Completed)
}

/// Runs the scenarios in order, stopping at the first fatal error.
pub fn run_all<D: Driver>(ctx: &mut Context<'_, D>) -> Result<()> {
    for (index, scenario) in Scenario::ALL.into_iter().enumerate() {
        say!(ctx.out);
        say!(ctx.out, "=== Example {}: {scenario} ===", index + 1);

        let span = tracing::info_span!("scenario", name = scenario.title());
        let _guard = span.enter();
        let start = Instant::now();
        if let Err(err) = scenario.run(ctx) {
            tracing::error!(status = ?err.status, "{}", err.message);
            return Err(err);
        }
        tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "scenario finished");
    }
    Ok(())
}
