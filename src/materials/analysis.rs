//! Classifier deciding whether a message explicitly asks for study materials.
//!
//! The classifier is a separate single-shot call to the same model. Its
//! answer is strict JSON; anything unusable becomes "not a request" so that
//! a classifier hiccup never costs the user their reply.

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::{GenerativeModel, LlmError, Prompt};
use crate::types::{MaterialAnalysis, MaterialType};

/// Why a classification could not be used.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The model call failed.
    #[error("classifier call failed: {0}")]
    Model(#[from] LlmError),
    /// The answer was not JSON.
    #[error("classifier answer is not JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The answer was JSON but not an object.
    #[error("classifier answer is not a JSON object")]
    NotAnObject,
}

/// Material-request classifier.
pub struct MaterialClassifier {
    fence: Regex,
    subjects: Vec<String>,
}

impl MaterialClassifier {
    /// Create a classifier that only honors `subjects`.
    ///
    /// # Errors
    /// Returns an error if the internal patterns fail to compile.
    pub fn new(subjects: &[String]) -> Result<Self, regex::Error> {
        Ok(Self {
            fence: Regex::new(r"```(?:json)?\n?")?,
            subjects: subjects.iter().map(|s| s.trim().to_lowercase()).collect(),
        })
    }

    /// Classify `message`, degrading to "not a request" on any failure.
    pub async fn analyze(&self, model: &dyn GenerativeModel, message: &str) -> MaterialAnalysis {
        match self.classify(model, message).await {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!(error = %err, "material classification failed; treating as not a request");
                MaterialAnalysis::not_a_request()
            }
        }
    }

    /// Classify `message`, reporting failures.
    ///
    /// # Errors
    /// Returns an error if the model call fails or its answer is unusable.
    pub async fn classify(
        &self,
        model: &dyn GenerativeModel,
        message: &str,
    ) -> Result<MaterialAnalysis, ClassifierError> {
        let answer = model.generate(&Prompt::text(self.prompt(message))).await?;
        self.parse(&answer)
    }

    /// Classification prompt for `message`.
    #[must_use]
    pub fn prompt(&self, message: &str) -> String {
        let types = MaterialType::ALL.map(MaterialType::as_str).join(", ");
        format!(
            "Analyze the user message below and decide whether the user is explicitly asking \
             for learning materials (videos, articles, books, courses or exercises).\n\n\
             Available subjects: {subjects}\n\
             Available types: {types}\n\n\
             Answer with JSON only, no explanation, in exactly this shape:\n\
             {{\"isRequest\": true or false, \"subject\": \"<subject>\" or null, \"type\": \"<type>\" or null}}\n\n\
             Rules:\n\
             - isRequest is true only when the user explicitly asks for materials, resources or recommendations.\n\
             - A plain question about a topic is not a request.\n\
             - subject must be one of the available subjects, or null.\n\
             - type must be one of the available types, or null.\n\n\
             User message: {message}",
            subjects = self.subjects.join(", "),
        )
    }

    /// Interpret the classifier's raw answer.
    ///
    /// Missing or mistyped fields count as absent. A subject outside the
    /// allow-list turns the verdict into "not a request"; an unknown type is dropped.
    ///
    /// # Errors
    /// Returns an error if the answer is not a JSON object.
    pub fn parse(&self, answer: &str) -> Result<MaterialAnalysis, ClassifierError> {
        let cleaned = self.fence.replace_all(answer.trim(), "");
        let value: Value = serde_json::from_str(cleaned.trim())?;
        let Value::Object(fields) = value else {
            return Err(ClassifierError::NotAnObject);
        };

        let is_request = fields
            .get("isRequest")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !is_request {
            return Ok(MaterialAnalysis::not_a_request());
        }

        let subject = fields
            .get("subject")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let material_type = fields
            .get("type")
            .and_then(Value::as_str)
            .and_then(|t| t.parse::<MaterialType>().ok());

        if let Some(subject) = &subject {
            if !self.subjects.contains(subject) {
                debug!(%subject, "requested subject not available");
                return Ok(MaterialAnalysis::not_a_request());
            }
        }

        Ok(MaterialAnalysis {
            is_request: true,
            subject,
            material_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeModel;

    fn classifier() -> MaterialClassifier {
        MaterialClassifier::new(&["ekonomi".to_string(), "fisika".to_string()]).unwrap()
    }

    #[test]
    fn test_parse_plain_question() {
        let analysis = classifier()
            .parse(r#"{"isRequest": false, "subject": null, "type": null}"#)
            .unwrap();
        assert_eq!(analysis, MaterialAnalysis::not_a_request());
    }

    #[test]
    fn test_parse_request_with_subject() {
        let analysis = classifier()
            .parse(r#"{"isRequest": true, "subject": "Ekonomi", "type": null}"#)
            .unwrap();
        assert!(analysis.is_request);
        assert_eq!(analysis.subject.as_deref(), Some("ekonomi"));
        assert_eq!(analysis.material_type, None);
    }

    #[test]
    fn test_parse_strips_code_fences() {
        let answer = "```json\n{\"isRequest\": true, \"subject\": \"fisika\", \"type\": \"video\"}\n```";
        let analysis = classifier().parse(answer).unwrap();
        assert_eq!(analysis.subject.as_deref(), Some("fisika"));
        assert_eq!(analysis.material_type, Some(MaterialType::Video));
    }

    #[test]
    fn test_parse_unknown_subject_is_not_a_request() {
        let analysis = classifier()
            .parse(r#"{"isRequest": true, "subject": "biologi", "type": "book"}"#)
            .unwrap();
        assert_eq!(analysis, MaterialAnalysis::not_a_request());
    }

    #[test]
    fn test_parse_coerces_bad_fields() {
        let analysis = classifier()
            .parse(r#"{"isRequest": "yes", "subject": "ekonomi"}"#)
            .unwrap();
        assert!(!analysis.is_request);

        let analysis = classifier()
            .parse(r#"{"isRequest": true, "subject": 7, "type": "podcast"}"#)
            .unwrap();
        assert!(analysis.is_request);
        assert_eq!(analysis.subject, None);
        assert_eq!(analysis.material_type, None);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            classifier().parse("Tentu! Ini materinya."),
            Err(ClassifierError::Json(_))
        ));
        assert!(matches!(
            classifier().parse("[true]"),
            Err(ClassifierError::NotAnObject)
        ));
    }

    #[test]
    fn test_prompt_mentions_allow_lists() {
        let prompt = classifier().prompt("Berikan saya materi ekonomi");
        assert!(prompt.contains("ekonomi, fisika"));
        assert!(prompt.contains("video, article, book, course, exercise"));
        assert!(prompt.ends_with("User message: Berikan saya materi ekonomi"));
    }

    #[tokio::test]
    async fn test_analyze_degrades_on_malformed_answer() {
        let model = FakeModel::new("bukan json", &["x"]);
        let analysis = classifier().analyze(&model, "Berikan saya materi ekonomi").await;
        assert_eq!(analysis, MaterialAnalysis::not_a_request());
        assert_eq!(model.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_analyze_degrades_on_model_failure() {
        let model = FakeModel::failing_classifier(&["x"]);
        let analysis = classifier().analyze(&model, "materi fisika dong").await;
        assert_eq!(analysis, MaterialAnalysis::not_a_request());
    }
}
