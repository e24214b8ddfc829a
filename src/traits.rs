//! Core TextGateway trait

use async_trait::async_trait;

use crate::{
    ComplianceReport, CulturalExplanation, ExplanationContext, ReplyTemplate, Result,
    TitleOptimization, Translation, TrendingTopic, UsageSnapshot,
};

/// The public operation surface.
///
/// Every asynchronous operation except
/// [`submit_feedback`](TextGateway::submit_feedback) is governed: served
/// from cache when possible, otherwise admitted through the rate limiter and
/// the daily token budget, dispatched with retry, and recorded in the usage
/// ledger.
#[async_trait]
pub trait TextGateway: Send + Sync {
    /// Translate `text` into `target_lang`.
    async fn translate(&self, text: &str, target_lang: &str) -> Result<Translation>;

    /// Explain the cultural background of an expression.
    async fn cultural_explanation(
        &self,
        text: &str,
        context: &ExplanationContext,
    ) -> Result<CulturalExplanation>;

    /// Check content against platform guidelines.
    async fn check_compliance(&self, content: &str) -> Result<ComplianceReport>;

    /// Canned replies suited to a comment's sentiment and intent.
    async fn suggest_reply(&self, comment: &str) -> Result<Vec<ReplyTemplate>>;

    /// Currently trending topics with translations.
    async fn trending_topics(&self) -> Result<Vec<TrendingTopic>>;

    /// Translate a post title, then ask for optimization advice on the
    /// translation. Two governed requests: a translation and a title analysis.
    async fn optimize_title(&self, title: &str, target_lang: &str) -> Result<TitleOptimization>;

    /// Forward user feedback upstream. Not governed.
    async fn submit_feedback(&self, feedback: &str) -> Result<()>;

    /// Usage counters and the most recent history records.
    fn stats(&self) -> UsageSnapshot;
}
