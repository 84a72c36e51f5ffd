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

//! Driver configuration assembled from environment variables.
//!
//! ## Required variables
//!
//! | Variable | Driver option |
//! |---|---|
//! | `GOOGLE_CLOUD_PROJECT` | `adbc.bigquery.sql.project_id` |
//! | `ADBC_BIGQUERY_DATASET_ID` | `adbc.bigquery.sql.dataset_id` |
//! | `ADBC_BIGQUERY_IMPERSONATE_TARGET` | `adbc.bigquery.sql.impersonate.target_principal` |
//!
//! The remaining options (auth type, impersonation scopes and token
//! lifetime) are fixed.

use crate::error::{BigQueryErrorHelper, Result};
use crate::mask::mask_sensitive_value;
use adbc_core::options::{OptionDatabase, OptionValue};
use driverbase::error::ErrorHelper;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const PROJECT_ID: &str = "adbc.bigquery.sql.project_id";
pub const DATASET_ID: &str = "adbc.bigquery.sql.dataset_id";
pub const AUTH_TYPE: &str = "adbc.bigquery.sql.auth_type";
pub const AUTH_CLIENT_ID: &str = "adbc.bigquery.sql.auth.client_id";
pub const AUTH_CLIENT_SECRET: &str = "adbc.bigquery.sql.auth.client_secret";
pub const AUTH_REFRESH_TOKEN: &str = "adbc.bigquery.sql.auth.refresh_token";
pub const IMPERSONATE_TARGET_PRINCIPAL: &str = "adbc.bigquery.sql.impersonate.target_principal";
pub const IMPERSONATE_SCOPES: &str = "adbc.bigquery.sql.impersonate.scopes";
pub const IMPERSONATE_LIFETIME: &str = "adbc.bigquery.sql.impersonate.lifetime";

// values
pub mod auth_type {
    pub const APP_DEFAULT_CREDENTIALS: &str = "adbc.bigquery.sql.auth_type.app_default_credentials";
    pub const USER_AUTHENTICATION: &str = "adbc.bigquery.sql.auth_type.user_authentication";
}

pub const DEFAULT_IMPERSONATE_SCOPES: &str =
    "https://www.googleapis.com/auth/bigquery,https://www.googleapis.com/auth/cloud-platform";
// 1 hour
pub const DEFAULT_IMPERSONATE_LIFETIME: &str = "3600s";

pub const PROJECT_ID_ENV: &str = "GOOGLE_CLOUD_PROJECT";
pub const DATASET_ID_ENV: &str = "ADBC_BIGQUERY_DATASET_ID";
pub const TARGET_PRINCIPAL_ENV: &str = "ADBC_BIGQUERY_IMPERSONATE_TARGET";
pub const AUTH_CLIENT_ID_ENV: &str = "ADBC_BIGQUERY_AUTH_CLIENT_ID";
pub const AUTH_CLIENT_SECRET_ENV: &str = "ADBC_BIGQUERY_AUTH_CLIENT_SECRET";
pub const AUTH_REFRESH_TOKEN_ENV: &str = "ADBC_BIGQUERY_AUTH_REFRESH_TOKEN";

/// Required variables, in the order they are checked.
pub const REQUIRED_ENV: [&str; 3] = [PROJECT_ID_ENV, DATASET_ID_ENV, TARGET_PRINCIPAL_ENV];

/// A source of environment variables.
pub trait EnvSource {
    /// Returns the value of `key`, or `None` if it is unset.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns the value of `key` if it is set and non-empty.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }
}

/// Returns the first required variable that is unset or empty.
pub fn first_missing_var(env: &(impl EnvSource + ?Sized)) -> Option<&'static str> {
    REQUIRED_ENV
        .into_iter()
        .find(|key| env.non_empty(key).is_none())
}

/// Configuration for connecting to BigQuery as an impersonated service account.
#[derive(Clone, PartialEq, Eq)]
pub struct ImpersonationConfig {
    project_id: String,
    dataset_id: String,
    target_principal: String,
    user_auth: Option<UserAuth>,
}

impl ImpersonationConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(&ProcessEnv)
    }

    /// Loads the configuration from `env`.
    ///
    /// Fails on the first required variable that is unset or empty, checked
    /// in the order project, dataset, target principal.
    pub fn load(env: &(impl EnvSource + ?Sized)) -> Result<Self> {
        if let Some(key) = first_missing_var(env) {
            return Err(BigQueryErrorHelper::invalid_argument()
                .message(format!("{key} environment variable is required")));
        }
        Ok(Self {
            project_id: env.non_empty(PROJECT_ID_ENV).unwrap_or_default(),
            dataset_id: env.non_empty(DATASET_ID_ENV).unwrap_or_default(),
            target_principal: env.non_empty(TARGET_PRINCIPAL_ENV).unwrap_or_default(),
            user_auth: None,
        })
    }

    /// Switches the base authentication to user credentials, keeping the
    /// impersonation settings.
    pub fn with_user_auth(mut self, auth: UserAuth) -> Self {
        self.user_auth = Some(auth);
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn target_principal(&self) -> &str {
        &self.target_principal
    }

    /// Returns the fully qualified, backtick quoted name of `table` in the
    /// configured dataset.
    pub fn qualified_table(&self, table: &str) -> String {
        format!("`{}.{}.{}`", self.project_id, self.dataset_id, table)
    }

    /// Returns the driver options as a key/value mapping.
    pub fn options(&self) -> BTreeMap<String, String> {
        let auth_type = if self.user_auth.is_some() {
            auth_type::USER_AUTHENTICATION
        } else {
            auth_type::APP_DEFAULT_CREDENTIALS
        };

        let mut options = BTreeMap::from([
            (PROJECT_ID.to_string(), self.project_id.clone()),
            (DATASET_ID.to_string(), self.dataset_id.clone()),
            (AUTH_TYPE.to_string(), auth_type.to_string()),
            (
                IMPERSONATE_TARGET_PRINCIPAL.to_string(),
                self.target_principal.clone(),
            ),
            (
                IMPERSONATE_SCOPES.to_string(),
                DEFAULT_IMPERSONATE_SCOPES.to_string(),
            ),
            (
                IMPERSONATE_LIFETIME.to_string(),
                DEFAULT_IMPERSONATE_LIFETIME.to_string(),
            ),
        ]);

        if let Some(auth) = &self.user_auth {
            options.insert(AUTH_CLIENT_ID.to_string(), auth.client_id.clone());
            options.insert(AUTH_CLIENT_SECRET.to_string(), auth.client_secret.clone());
            options.insert(AUTH_REFRESH_TOKEN.to_string(), auth.refresh_token.clone());
        }
        options
    }

    /// Returns the driver options in the form accepted by
    /// `Driver::new_database_with_opts`.
    pub fn database_options(&self) -> Vec<(OptionDatabase, OptionValue)> {
        self.options()
            .into_iter()
            .map(|(key, value)| (OptionDatabase::from(key.as_str()), OptionValue::String(value)))
            .collect()
    }
}

impl fmt::Debug for ImpersonationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImpersonationConfig")
            .field("project_id", &mask_sensitive_value(&self.project_id))
            .field("dataset_id", &mask_sensitive_value(&self.dataset_id))
            .field(
                "target_principal",
                &mask_sensitive_value(&self.target_principal),
            )
            .field("user_auth", &self.user_auth)
            .finish()
    }
}

/// OAuth user credentials used as the base identity for impersonation.
#[derive(Clone, PartialEq, Eq)]
pub struct UserAuth {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl UserAuth {
    /// Reads the OAuth credentials from `env`, falling back to placeholders
    /// for any variable that is unset.
    pub fn load(env: &(impl EnvSource + ?Sized)) -> Self {
        Self {
            client_id: env
                .non_empty(AUTH_CLIENT_ID_ENV)
                .unwrap_or_else(|| "your-client-id".into()),
            client_secret: env
                .non_empty(AUTH_CLIENT_SECRET_ENV)
                .unwrap_or_else(|| "your-client-secret".into()),
            refresh_token: env
                .non_empty(AUTH_REFRESH_TOKEN_ENV)
                .unwrap_or_else(|| "your-refresh-token".into()),
        }
    }
}

impl fmt::Debug for UserAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAuth")
            .field("client_id", &mask_sensitive_value(&self.client_id))
            .field("client_secret", &"***")
            .field("refresh_token", &"***")
            .finish()
    }
}
