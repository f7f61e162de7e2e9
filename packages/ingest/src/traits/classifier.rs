//! External text classification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// What the external classifier is asked to return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLabels {
    pub description: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A single-shot classification call, used only when the keyword rules
/// find nothing.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(
        &self,
        title: &str,
        employer_name: Option<&str>,
        location: Option<&str>,
    ) -> Result<ModelLabels, ClassifierError>;
}
