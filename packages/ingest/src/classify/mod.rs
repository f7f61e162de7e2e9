//! Listing enrichment: description, department and tags.
//!
//! Keyword rules always run first. The external classifier is consulted
//! only when the rules find neither a department nor a tag, and any
//! failure there degrades to a templated description.

pub mod openai;
pub mod rules;

use std::collections::BTreeSet;
use std::sync::Arc;

pub use openai::OpenAiClassifier;
pub use rules::{RuleMatch, DEPARTMENTS};

use crate::traits::TextClassifier;

/// Which path produced a [`Classification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSignal {
    Rules,
    Model,
    /// Nothing matched and the model was unavailable or unusable
    Fallback,
}

impl ClassificationSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationSignal::Rules => "rules",
            ClassificationSignal::Model => "model",
            ClassificationSignal::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub description: String,
    pub department: Option<String>,
    pub tags: BTreeSet<String>,
    pub signal: ClassificationSignal,
}

impl Classification {
    /// Whether anything beyond the description was found.
    pub fn has_signal(&self) -> bool {
        self.department.is_some() || !self.tags.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct Classifier {
    model: Option<Arc<dyn TextClassifier>>,
}

impl Classifier {
    /// Rules only.
    pub fn rules_only() -> Self {
        Self::default()
    }

    pub fn with_model(model: Arc<dyn TextClassifier>) -> Self {
        Self { model: Some(model) }
    }

    pub async fn classify(
        &self,
        title: &str,
        employer_name: Option<&str>,
        location: Option<&str>,
    ) -> Classification {
        let employer_name = employer_name.filter(|s| !s.trim().is_empty());
        let location = location.filter(|s| !s.trim().is_empty());
        let description = templated_description(title, employer_name, location);

        let found = rules::apply(&[title, employer_name.unwrap_or_default()]);
        if !found.is_empty() {
            return Classification {
                description,
                department: found.department,
                tags: found.tags,
                signal: ClassificationSignal::Rules,
            };
        }

        let fallback = Classification {
            description,
            department: None,
            tags: BTreeSet::new(),
            signal: ClassificationSignal::Fallback,
        };

        let Some(model) = &self.model else {
            return fallback;
        };

        match model.classify(title, employer_name, location).await {
            Ok(labels) => {
                let description = labels.description.trim();
                Classification {
                    description: if description.is_empty() {
                        fallback.description
                    } else {
                        description.to_string()
                    },
                    department: labels
                        .department
                        .as_deref()
                        .and_then(rules::canonical_department)
                        .map(str::to_string),
                    tags: labels
                        .tags
                        .iter()
                        .map(|t| t.trim())
                        .filter(|t| !t.is_empty())
                        .take(rules::MAX_TAGS)
                        .map(str::to_string)
                        .collect(),
                    signal: ClassificationSignal::Model,
                }
            }
            Err(e) => {
                tracing::warn!(title, error = %e, "Classifier fallback failed, using template");
                fallback
            }
        }
    }
}

/// Generic description used when nothing better is available.
pub fn templated_description(title: &str, employer_name: Option<&str>, location: Option<&str>) -> String {
    match (employer_name, location) {
        (Some(employer), Some(location)) => {
            format!("{} bei {} in {}.", title, employer, location)
        }
        (Some(employer), None) => format!("{} bei {}.", title, employer),
        (None, Some(location)) => format!("{} in {}.", title, location),
        (None, None) => format!("{}.", title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockClassifier;
    use crate::traits::ModelLabels;

    #[tokio::test]
    async fn rules_skip_the_model() {
        let model = MockClassifier::answering(ModelLabels::default());
        let classifier = Classifier::with_model(Arc::new(model.clone()));

        let c = classifier
            .classify("Facharzt Radiologie", Some("Klinikum Passau"), None)
            .await;

        assert_eq!(c.signal, ClassificationSignal::Rules);
        assert_eq!(c.department.as_deref(), Some("Radiologie"));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn model_answer_is_normalised() {
        let model = MockClassifier::answering(ModelLabels {
            description: "Stelle in der Hals-Nasen-Ohren-Heilkunde.".into(),
            department: Some("HNO".into()),
            tags: vec![" Vollzeit ".into(), "".into()],
        });
        let classifier = Classifier::with_model(Arc::new(model));

        let c = classifier.classify("Arzt (m/w/d)", None, Some("Kiel")).await;

        assert_eq!(c.signal, ClassificationSignal::Model);
        assert_eq!(c.department, None);
        assert_eq!(c.tags.into_iter().collect::<Vec<_>>(), ["Vollzeit"]);
    }

    #[tokio::test]
    async fn failing_model_falls_back_to_template() {
        let classifier = Classifier::with_model(Arc::new(MockClassifier::failing()));

        let c = classifier
            .classify("Arzt (m/w/d)", Some("Klinikum Nord"), Some("Hamburg"))
            .await;

        assert_eq!(c.signal, ClassificationSignal::Fallback);
        assert_eq!(c.description, "Arzt (m/w/d) bei Klinikum Nord in Hamburg.");
        assert_eq!(c.department, None);
        assert!(!c.has_signal());
    }
}
