use std::str::FromStr;

use log::*;
use qm_common::Secret;

/// Which Square environment the client talks to. Injected explicitly at construction time so that
/// tests can exercise both deterministically; never read from process globals at call time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SquareEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl SquareEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            SquareEnvironment::Sandbox => "https://connect.squareupsandbox.com",
            SquareEnvironment::Production => "https://connect.squareup.com",
        }
    }

    pub fn is_sandbox(&self) -> bool {
        matches!(self, SquareEnvironment::Sandbox)
    }
}

impl FromStr for SquareEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            s => Err(format!("Invalid Square environment: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SquareConfig {
    pub environment: SquareEnvironment,
    pub api_version: String,
    pub access_token: Secret<String>,
    pub location_id: String,
}

impl SquareConfig {
    pub fn new_from_env_or_default() -> Self {
        let environment = std::env::var("QMP_SQUARE_ENVIRONMENT")
            .ok()
            .and_then(|s| {
                s.parse().map_err(|e| warn!("QMP_SQUARE_ENVIRONMENT is invalid ({e}), using sandbox")).ok()
            })
            .unwrap_or_else(|| {
                warn!("QMP_SQUARE_ENVIRONMENT not set, using sandbox as default");
                SquareEnvironment::Sandbox
            });
        let api_version = std::env::var("QMP_SQUARE_API_VERSION").unwrap_or_else(|_| {
            warn!("QMP_SQUARE_API_VERSION not set, using 2024-06-04 as default");
            "2024-06-04".to_string()
        });
        let access_token = Secret::new(std::env::var("QMP_SQUARE_ACCESS_TOKEN").unwrap_or_else(|_| {
            warn!("QMP_SQUARE_ACCESS_TOKEN not set, using (probably useless) default");
            "EAAA-00000000000000".to_string()
        }));
        let location_id = std::env::var("QMP_SQUARE_LOCATION_ID").unwrap_or_else(|_| {
            warn!("QMP_SQUARE_LOCATION_ID not set, using (probably useless) default");
            "L00000000000".to_string()
        });
        Self { environment, api_version, access_token, location_id }
    }
}
