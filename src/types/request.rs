//! Upstream request payloads.

use serde::{Deserialize, Serialize};

/// Tagged JSON payload posted to the upstream endpoint.
///
/// Serializes as `{ "type": "<tag>", ...fields }`:
///
/// ```rust
/// # use hermod::UpstreamRequest;
/// let req = UpstreamRequest::Translate {
///     text: "你好".into(),
///     target_lang: "en".into(),
/// };
/// let json = serde_json::to_value(&req).unwrap();
/// assert_eq!(json["type"], "translate");
/// assert_eq!(json["targetLang"], "en");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpstreamRequest {
    Translate {
        text: String,
        #[serde(rename = "targetLang")]
        target_lang: String,
    },
    CultureExplanation {
        prompt: String,
    },
    SentimentAnalysis {
        prompt: String,
        text: String,
    },
    ComplianceCheck {
        prompt: String,
        content: String,
    },
    TrendingTopics,
    TitleAnalysis {
        prompt: String,
        title: String,
    },
    Feedback {
        feedback: String,
    },
}

impl UpstreamRequest {
    /// The `type` tag this payload is sent with.
    pub fn tag(&self) -> &'static str {
        match self {
            UpstreamRequest::Translate { .. } => "translate",
            UpstreamRequest::CultureExplanation { .. } => "culture_explanation",
            UpstreamRequest::SentimentAnalysis { .. } => "sentiment_analysis",
            UpstreamRequest::ComplianceCheck { .. } => "compliance_check",
            UpstreamRequest::TrendingTopics => "trending_topics",
            UpstreamRequest::TitleAnalysis { .. } => "title_analysis",
            UpstreamRequest::Feedback { .. } => "feedback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tag_matches_serialized_type() {
        let requests = [
            UpstreamRequest::Translate {
                text: "a".into(),
                target_lang: "en".into(),
            },
            UpstreamRequest::CultureExplanation { prompt: "p".into() },
            UpstreamRequest::SentimentAnalysis {
                prompt: "p".into(),
                text: "t".into(),
            },
            UpstreamRequest::ComplianceCheck {
                prompt: "p".into(),
                content: "c".into(),
            },
            UpstreamRequest::TrendingTopics,
            UpstreamRequest::TitleAnalysis {
                prompt: "p".into(),
                title: "t".into(),
            },
            UpstreamRequest::Feedback {
                feedback: "f".into(),
            },
        ];
        for req in requests {
            let value = serde_json::to_value(&req).unwrap();
            assert_eq!(value["type"], json!(req.tag()));
        }
    }

    #[test]
    fn unit_variant_is_type_only() {
        let value = serde_json::to_value(UpstreamRequest::TrendingTopics).unwrap();
        assert_eq!(value, json!({ "type": "trending_topics" }));
    }
}
