//! Controller configuration, loadable from an optional JSON file.

use crate::domain::payment::{Amount, PaymentSpec};
use crate::domain::ports::SdkInit;
use crate::domain::session::Scope;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

pub const DEFAULT_SDK_URL: &str = "https://sdk.minepi.com/pi-sdk.js";
pub const DEFAULT_SDK_VERSION: &str = "2.0";

/// Which of the app variants the controller behaves as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InferenceMode {
    /// Payments only.
    #[default]
    Disabled,
    /// Analysis runs whenever the user asks for it.
    OnDemand,
    /// Analysis runs only after a payment completes.
    AfterPayment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub script_url: String,
    pub version: String,
    pub sandbox: bool,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            script_url: DEFAULT_SDK_URL.to_string(),
            version: DEFAULT_SDK_VERSION.to_string(),
            sandbox: true,
        }
    }
}

impl SdkConfig {
    pub fn init_params(&self) -> SdkInit {
        SdkInit {
            version: self.version.clone(),
            sandbox: self.sandbox,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sdk: SdkConfig,
    pub scopes: Vec<Scope>,
    pub inference_mode: InferenceMode,
    pub payment: PaymentSpec,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut metadata = Map::new();
        metadata.insert("orderId".to_string(), Value::from(1234));
        Self {
            sdk: SdkConfig::default(),
            scopes: vec![Scope::Payments],
            inference_mode: InferenceMode::default(),
            payment: PaymentSpec {
                amount: Amount::ONE,
                memo: "Test Payment".to_string(),
                metadata,
            },
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
