//! Local classification and prompt construction.
//!
//! Before a cultural explanation is requested, the text is classified
//! locally so the upstream prompt can be tailored: internet slang first,
//! then trending topics, then social-interaction norms, falling back to a
//! custom phrase. Classification is pure and never touches the network.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::types::{ExplanationContext, ExplanationType};

const BASIC_PROMPT: &str = "You are a cultural interpreter helping international users understand Chinese social media content.
Explain the following text, including:
1. Basic meaning
2. Cultural context
3. Current usage
4. Similar expressions in English";

const INTERNET_SLANG_PROMPT: &str = "As a Chinese internet culture expert, explain this internet slang/expression:
1. Literal meaning
2. How it originated
3. Current usage and variations
4. Popular examples
5. Cultural significance";

const TREND_CONTEXT_PROMPT: &str = "Explain this Chinese social media trend:
1. What is it about
2. Why it's popular
3. Cultural background
4. How international creators can participate";

const SOCIAL_NORMS_PROMPT: &str = "Explain these Chinese social media interaction norms:
1. What's the appropriate way to respond
2. Cultural expectations
3. Common mistakes to avoid
4. Tips for international creators";

const SLANG_WORDS: &[&str] = &[
    "神器", "爆款", "真香", "奈斯", "稳", "秒杀", "带货", "冲", "破防", "上头", "绝绝子", "无语",
];

const TRENDING_KEYWORDS: &[&str] = &["挑战", "活动", "潮流", "新品", "种草", "测评", "首发", "探店"];

const SOCIAL_KEYWORDS: &[&str] = &[
    "感谢", "谢谢", "抱歉", "不好意思", "请问", "建议", "回复", "私信",
];

static SLANG_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"[0-9]{2,}",      // number memes like 666
        r"[A-Za-z]+[0-9]+",
        r"[啊哦噢]{3,}",   // drawn-out interjections
        r"[?!？！]{2,}",
        r"[xX]+",
    ])
});

static TRENDING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"#[\x{4e00}-\x{9fa5}a-zA-Z0-9]+#", // hashtag
        r"@[\x{4e00}-\x{9fa5}a-zA-Z0-9]+",  // mention
        r"【[\x{4e00}-\x{9fa5}]+】",         // bracketed title
    ])
});

static POLITENESS_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"[请您]", r"[谢感]", r"[问询]"]));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| {
            Regex::new(p)
                .inspect_err(|e| warn!(pattern = *p, error = %e, "invalid classifier pattern"))
                .ok()
        })
        .collect()
}

fn matches_any(text: &str, patterns: &[Regex], words: &[&str]) -> bool {
    patterns.iter().any(|re| re.is_match(text)) || words.iter().any(|w| text.contains(w))
}

/// Number memes, letter-digit combos, drawn-out interjections, repeated
/// punctuation, or a known slang word.
pub fn is_internet_slang(text: &str) -> bool {
    matches_any(text, &SLANG_PATTERNS, SLANG_WORDS)
}

/// Hashtags, mentions, bracketed titles, or a trending keyword.
pub fn is_trending_topic(text: &str) -> bool {
    matches_any(text, &TRENDING_PATTERNS, TRENDING_KEYWORDS)
}

/// Courtesy phrases and interaction keywords.
pub fn is_social_norm(text: &str) -> bool {
    matches_any(text, &POLITENESS_PATTERNS, SOCIAL_KEYWORDS)
}

/// Classify `text`, checking slang, then trends, then social norms.
///
/// ```rust
/// # use hermod::{ExplanationType, culture::classify};
/// assert_eq!(classify("绝绝子"), ExplanationType::InternetSlang);
/// assert_eq!(classify("#夏日穿搭#"), ExplanationType::TrendingTopic);
/// assert_eq!(classify("不好意思"), ExplanationType::SocialNorm);
/// assert_eq!(classify("今天天气"), ExplanationType::CustomPhrase);
/// ```
pub fn classify(text: &str) -> ExplanationType {
    if is_internet_slang(text) {
        ExplanationType::InternetSlang
    } else if is_trending_topic(text) {
        ExplanationType::TrendingTopic
    } else if is_social_norm(text) {
        ExplanationType::SocialNorm
    } else {
        ExplanationType::CustomPhrase
    }
}

/// Base instructions for an explanation type.
pub fn base_prompt(explanation_type: ExplanationType) -> &'static str {
    match explanation_type {
        ExplanationType::InternetSlang => INTERNET_SLANG_PROMPT,
        ExplanationType::TrendingTopic => TREND_CONTEXT_PROMPT,
        ExplanationType::SocialNorm => SOCIAL_NORMS_PROMPT,
        ExplanationType::CustomPhrase => BASIC_PROMPT,
    }
}

/// Full cultural-explanation prompt: base instructions, then the text and
/// the caller's context as JSON.
pub fn culture_prompt(
    text: &str,
    explanation_type: ExplanationType,
    context: &ExplanationContext,
) -> String {
    let context = serde_json::to_string(context).unwrap_or_else(|_| "{}".to_owned());
    format!(
        "{}\n\nText: {text}\nContext: {context}",
        base_prompt(explanation_type)
    )
}

/// Prompt for the sentiment analysis behind reply suggestions.
pub fn sentiment_prompt(comment: &str) -> String {
    format!(
        "Analyze the sentiment and intent of this Chinese social media comment:\n\
         \"{comment}\"\n\n\
         Consider:\n\
         1. Overall sentiment (positive/negative/neutral)\n\
         2. User intent (question/compliment/complaint/suggestion)\n\
         3. If it's a follow request\n\
         4. If it needs immediate response\n\
         5. Cultural context implications"
    )
}

/// Prompt for a content compliance check.
pub fn compliance_prompt(content: &str) -> String {
    format!(
        "Check this Chinese social media content for compliance:\n\
         \"{content}\"\n\n\
         Check for:\n\
         1. Prohibited content\n\
         2. Sensitive topics\n\
         3. Cultural appropriateness\n\
         4. Platform guidelines\n\
         5. Best practices"
    )
}

/// Prompt for title optimization advice.
pub fn title_prompt(title: &str) -> String {
    format!(
        "Analyze this Chinese social media title for optimization:\n\
         \"{title}\"\n\n\
         Provide:\n\
         1. SEO suggestions\n\
         2. Popular related hashtags\n\
         3. Length optimization\n\
         4. Engagement potential\n\
         5. Cultural sensitivity check"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slang_patterns() {
        assert!(is_internet_slang("666"));
        assert!(is_internet_slang("yyds2024"));
        assert!(is_internet_slang("啊啊啊"));
        assert!(is_internet_slang("真的吗？！"));
        assert!(is_internet_slang("xswl"));
        assert!(is_internet_slang("这个真香"));
        assert!(!is_internet_slang("今天天气很好"));
    }

    #[test]
    fn slang_wins_over_trend() {
        // contains both a hashtag and a slang word
        assert_eq!(classify("#爆款#"), ExplanationType::InternetSlang);
    }

    #[test]
    fn trending_patterns() {
        assert!(is_trending_topic("@小红书"));
        assert!(is_trending_topic("【探店】"));
        assert!(is_trending_topic("新品上市"));
        assert!(!is_trending_topic("吃饭了吗"));
    }

    #[test]
    fn social_norm_single_characters() {
        assert!(is_social_norm("您好"));
        assert!(is_social_norm("私信"));
        assert!(!is_social_norm("吃饭了吗"));
    }

    #[test]
    fn culture_prompt_embeds_text_and_context() {
        let ctx = ExplanationContext::new().context_type("food");
        let prompt = culture_prompt("麻辣", ExplanationType::CustomPhrase, &ctx);
        assert!(prompt.starts_with("You are a cultural interpreter"));
        assert!(prompt.ends_with("\n\nText: 麻辣\nContext: {\"type\":\"food\"}"));
    }

    #[test]
    fn empty_context_is_empty_object() {
        let prompt = culture_prompt("稳", ExplanationType::InternetSlang, &ExplanationContext::new());
        assert!(prompt.ends_with("Context: {}"));
    }

    #[test]
    fn request_prompts_quote_input() {
        assert!(sentiment_prompt("好棒").contains("\"好棒\""));
        assert!(compliance_prompt("广告").contains("1. Prohibited content"));
        assert!(title_prompt("Summer outfits").contains("\"Summer outfits\""));
    }
}
