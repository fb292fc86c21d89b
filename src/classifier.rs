// src/classifier.rs

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::classification::ClassificationType;
use crate::scoring::ClassificationInput;

const CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the external cognitive-classification service.
///
/// The service consumes the aggregated per-question effort payload and a
/// classification type, and returns a level/score plus an opaque raw
/// payload which is persisted as-is.
#[derive(Clone)]
pub struct ClassifierClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    classification_type: &'a str,
    materials: &'a ClassificationInput,
}

/// Result returned by the classifier.
#[derive(Debug, Deserialize)]
pub struct ClassificationOutcome {
    pub classification_level: String,
    pub classification_score: f64,
    #[serde(default)]
    pub raw_data: serde_json::Value,
}

/// The classification service was unreachable or returned a non-success
/// status. The caller keeps the stale snapshot instead of overwriting it.
#[derive(Debug)]
pub struct ClassifierError(pub String);

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "classifier service error: {}", self.0)
    }
}

impl std::error::Error for ClassifierError {}

impl ClassifierClient {
    pub fn new(base_url: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(CLASSIFIER_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub async fn classify(
        &self,
        classification_type: ClassificationType,
        input: &ClassificationInput,
    ) -> Result<ClassificationOutcome, ClassifierError> {
        let url = format!("{}/classify", self.base_url);
        let req = ClassifyRequest {
            classification_type: classification_type.as_str(),
            materials: input,
        };

        let res = self
            .client
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| ClassifierError(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ClassifierError(format!("HTTP {}: {}", status, body)));
        }

        res.json::<ClassificationOutcome>()
            .await
            .map_err(|e| ClassifierError(e.to_string()))
    }
}
