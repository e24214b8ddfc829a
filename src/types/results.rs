//! Results returned by the public operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub translated: String,
}

/// What sort of expression a cultural explanation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationType {
    InternetSlang,
    TrendingTopic,
    CustomPhrase,
    SocialNorm,
}

impl ExplanationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplanationType::InternetSlang => "internet_slang",
            ExplanationType::TrendingTopic => "trending_topic",
            ExplanationType::CustomPhrase => "custom_phrase",
            ExplanationType::SocialNorm => "social_norm",
        }
    }
}

/// Caller-supplied context for a cultural explanation.
///
/// The optional `type` field partitions the cache (absent means `basic`);
/// the whole context is embedded into the prompt as JSON.
///
/// ```rust
/// # use hermod::ExplanationContext;
/// let ctx = ExplanationContext::new()
///     .context_type("beauty")
///     .field("platform", "xiaohongshu");
/// assert_eq!(ctx.cache_type(), "beauty");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplanationContext {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub context_type: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ExplanationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the context type (e.g. `"slang"`, `"food"`).
    pub fn context_type(mut self, t: impl Into<String>) -> Self {
        self.context_type = Some(t.into());
        self
    }

    /// Attach an arbitrary field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The type used to partition cached explanations.
    pub fn cache_type(&self) -> &str {
        self.context_type.as_deref().unwrap_or("basic")
    }
}

/// Structured cultural explanation of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalExplanation {
    pub explanation_type: ExplanationType,
    pub brief: String,
    pub detailed: String,
    pub examples: Vec<String>,
    pub tips: Vec<String>,
    pub related_topics: Vec<String>,
}

/// Outcome of a content compliance check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub is_compliant: bool,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Sentiment and intent of a comment, as judged upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: String,
    pub intent: String,
    pub needs_response: bool,
}

impl SentimentAnalysis {
    pub fn is_positive(&self) -> bool {
        self.sentiment == "positive"
    }

    pub fn is_follow_request(&self) -> bool {
        self.intent.contains("follow")
    }
}

/// A canned bilingual reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTemplate {
    pub key: String,
    pub zh: String,
    pub en: String,
}

impl ReplyTemplate {
    /// Thank the commenter.
    pub fn thanks() -> Self {
        Self {
            key: "thanks".into(),
            zh: "谢谢你的评论！".into(),
            en: "Thank you for your comment!".into(),
        }
    }

    /// Acknowledge a follow.
    pub fn follow_back() -> Self {
        Self {
            key: "follow_back".into(),
            zh: "已回关，期待你的更多内容！".into(),
            en: "Followed back, looking forward to your content!".into(),
        }
    }

    /// Templates suited to a comment with the given sentiment.
    pub fn suggestions_for(sentiment: &SentimentAnalysis) -> Vec<ReplyTemplate> {
        let mut out = Vec::new();
        if sentiment.is_positive() {
            out.push(Self::thanks());
        }
        if sentiment.is_follow_request() {
            out.push(Self::follow_back());
        }
        out
    }
}

/// A trending topic with its translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub chinese: String,
    pub english: String,
    pub popularity: f64,
    pub description: String,
}

/// Optimization advice for a post title.
///
/// `translation` is the title translated into the requested language; the
/// advice is about that translated title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleOptimization {
    pub translation: Translation,
    pub seo_tips: Vec<String>,
    pub trending_tags: Vec<String>,
    pub length_advice: String,
}
