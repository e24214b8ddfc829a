//! Decoding of upstream response bodies into public result types.
//!
//! This module is internal. The queue caches and returns the raw JSON body;
//! the gateway decodes it here on both the fresh and the cached path, so a
//! cache hit yields exactly what a fresh request would.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{
    ComplianceReport, CulturalExplanation, ExplanationType, SentimentAnalysis, TitleOptimization,
    Translation, TrendingTopic,
};
use crate::{HermodError, Result};

#[derive(Deserialize)]
struct TranslateBody {
    #[serde(default)]
    translated: Option<String>,
}

#[derive(Deserialize)]
struct ExplanationBody {
    brief: String,
    #[serde(default)]
    detailed: String,
    #[serde(default)]
    examples: Vec<String>,
    #[serde(default)]
    tips: Vec<String>,
    #[serde(default)]
    related: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentBody {
    sentiment: String,
    intent: String,
    #[serde(default)]
    needs_response: bool,
}

#[derive(Deserialize)]
struct ComplianceBody {
    compliant: bool,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Deserialize)]
struct TrendingBody {
    #[serde(default)]
    topics: Option<Vec<TopicBody>>,
}

#[derive(Deserialize)]
struct TopicBody {
    name: String,
    #[serde(default)]
    translation: String,
    #[serde(default)]
    popularity: f64,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitleBody {
    #[serde(default)]
    seo_tips: Vec<String>,
    #[serde(default)]
    trending_tags: Vec<String>,
    #[serde(default)]
    length_optimization: Option<String>,
}

/// `{ "translated": "..." }`; a missing or blank translation is an error.
pub(crate) fn to_translation(body: Value) -> Result<Translation> {
    let body: TranslateBody = serde_json::from_value(body)?;
    match body.translated {
        Some(translated) if !translated.trim().is_empty() => Ok(Translation { translated }),
        _ => Err(HermodError::EmptyResponse("translated")),
    }
}

/// `{ "brief", "detailed", "examples", "tips", "related" }`.
pub(crate) fn to_explanation(
    body: Value,
    explanation_type: ExplanationType,
) -> Result<CulturalExplanation> {
    let body: ExplanationBody = serde_json::from_value(body)?;
    Ok(CulturalExplanation {
        explanation_type,
        brief: body.brief,
        detailed: body.detailed,
        examples: body.examples,
        tips: body.tips,
        related_topics: body.related,
    })
}

/// `{ "sentiment", "intent", "needsResponse" }`.
pub(crate) fn to_sentiment(body: Value) -> Result<SentimentAnalysis> {
    let body: SentimentBody = serde_json::from_value(body)?;
    Ok(SentimentAnalysis {
        sentiment: body.sentiment,
        intent: body.intent,
        needs_response: body.needs_response,
    })
}

/// `{ "compliant", "warnings", "suggestions" }`.
pub(crate) fn to_compliance(body: Value) -> Result<ComplianceReport> {
    let body: ComplianceBody = serde_json::from_value(body)?;
    Ok(ComplianceReport {
        is_compliant: body.compliant,
        warnings: body.warnings,
        suggestions: body.suggestions,
    })
}

/// `{ "topics": [{ "name", "translation", "popularity", "description" }] }`.
pub(crate) fn to_trending(body: Value) -> Result<Vec<TrendingTopic>> {
    let body: TrendingBody = serde_json::from_value(body)?;
    let topics = body.topics.ok_or(HermodError::EmptyResponse("topics"))?;
    Ok(topics
        .into_iter()
        .map(|t| TrendingTopic {
            chinese: t.name,
            english: t.translation,
            popularity: t.popularity,
            description: t.description,
        })
        .collect())
}

/// `{ "seoTips", "trendingTags", "lengthOptimization" }` for an already
/// translated title. A body carrying none of the three is an error.
pub(crate) fn to_title(body: Value, translation: Translation) -> Result<TitleOptimization> {
    let body: TitleBody = serde_json::from_value(body)?;
    if body.seo_tips.is_empty()
        && body.trending_tags.is_empty()
        && body.length_optimization.is_none()
    {
        return Err(HermodError::EmptyResponse("seoTips"));
    }
    Ok(TitleOptimization {
        translation,
        seo_tips: body.seo_tips,
        trending_tags: body.trending_tags,
        length_advice: body.length_optimization.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_translation_is_empty_response() {
        let err = to_translation(json!({ "translated": "  " })).unwrap_err();
        assert!(matches!(err, HermodError::EmptyResponse("translated")));
        let err = to_translation(json!({})).unwrap_err();
        assert!(matches!(err, HermodError::EmptyResponse("translated")));
    }

    #[test]
    fn explanation_maps_related_topics() {
        let body = json!({
            "brief": "awesome",
            "detailed": "praise for a great product",
            "examples": ["这个真的绝绝子"],
            "related": ["yyds"],
        });
        let explanation = to_explanation(body, ExplanationType::InternetSlang).unwrap();
        assert_eq!(explanation.related_topics, ["yyds"]);
        assert!(explanation.tips.is_empty());
        assert_eq!(explanation.explanation_type, ExplanationType::InternetSlang);
    }

    #[test]
    fn compliance_requires_verdict() {
        assert!(matches!(
            to_compliance(json!({ "warnings": [] })),
            Err(HermodError::Json(_))
        ));
        let report = to_compliance(json!({ "compliant": false, "warnings": ["ad"] })).unwrap();
        assert!(!report.is_compliant);
        assert_eq!(report.warnings, ["ad"]);
    }

    #[test]
    fn trending_topics_are_renamed() {
        let body = json!({
            "topics": [{
                "name": "新品首发",
                "translation": "product launch",
                "popularity": 0.9,
                "description": "new releases",
            }]
        });
        let topics = to_trending(body).unwrap();
        assert_eq!(topics[0].chinese, "新品首发");
        assert_eq!(topics[0].english, "product launch");
        assert!(matches!(
            to_trending(json!({})),
            Err(HermodError::EmptyResponse("topics"))
        ));
    }

    #[test]
    fn sentiment_reads_camel_case() {
        let s = to_sentiment(json!({
            "sentiment": "positive",
            "intent": "follow request",
            "needsResponse": true,
        }))
        .unwrap();
        assert!(s.is_positive() && s.is_follow_request() && s.needs_response);
    }

    #[test]
    fn title_advice_keeps_translation() {
        let translation = Translation {
            translated: "Summer outfits".into(),
        };
        let title = to_title(
            json!({
                "seoTips": ["lead with the season"],
                "trendingTags": ["#ootd"],
                "lengthOptimization": "fine",
            }),
            translation.clone(),
        )
        .unwrap();
        assert_eq!(title.translation, translation);
        assert_eq!(title.trending_tags, ["#ootd"]);
        assert_eq!(title.length_advice, "fine");

        assert!(matches!(
            to_title(json!({}), translation),
            Err(HermodError::EmptyResponse("seoTips"))
        ));
    }
}
