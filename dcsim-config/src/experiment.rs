//! Comparison experiment parameters.

use dcsim_core::DispatchPolicy;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Policies run back to back by `dcsim compare`, in order.
    #[serde(default = "default_policies")]
    #[validate(custom(function = validation::validate_policy_list))]
    pub policies: Vec<String>,
}

/// Every supported policy, in declaration order.
fn default_policies() -> Vec<String> {
    DispatchPolicy::ALL
        .iter()
        .map(|policy| policy.as_str().to_string())
        .collect()
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            policies: default_policies(),
        }
    }
}
