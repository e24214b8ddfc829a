//! GovernedGateway - the public operations over the request queue

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::cache::{Fingerprint, ResultCache, SweepHandle};
use crate::governance::{RateLimiter, TokenBudget};
use crate::ledger::UsageLedger;
use crate::queue::{GovernedRequest, RequestQueue};
use crate::transport::Transport;
use crate::{
    ComplianceReport, CulturalExplanation, ExplanationContext, HermodError, OperationKind,
    ReplyTemplate, Result, TextGateway, TitleOptimization, Translation, TrendingTopic,
    UpstreamRequest, UsageSnapshot, convert, culture,
};

/// Gateway that serves every operation through cache, rate limit, budget,
/// retry and ledger.
///
/// Built with [`Hermod::builder()`](crate::Hermod::builder).
pub struct GovernedGateway {
    queue: RequestQueue,
    cache: ResultCache,
    sweeper: Option<SweepHandle>,
    budget: Arc<TokenBudget>,
    limiter: Arc<RateLimiter>,
    ledger: Arc<UsageLedger>,
    transport: Arc<dyn Transport>,
    max_input_chars: usize,
}

impl GovernedGateway {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        queue: RequestQueue,
        cache: ResultCache,
        sweeper: Option<SweepHandle>,
        budget: Arc<TokenBudget>,
        limiter: Arc<RateLimiter>,
        ledger: Arc<UsageLedger>,
        transport: Arc<dyn Transport>,
        max_input_chars: usize,
    ) -> Self {
        Self {
            queue,
            cache,
            sweeper,
            budget,
            limiter,
            ledger,
            transport,
            max_input_chars,
        }
    }

    /// Daily token budget (read-only).
    pub fn budget(&self) -> &TokenBudget {
        &self.budget
    }

    /// Per-minute rate limiter (read-only).
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// Requests admitted but not yet settled.
    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    /// Stop the cache sweeper and wait for every queued request to settle.
    pub async fn shutdown(self) {
        let Self {
            queue, mut sweeper, ..
        } = self;
        if let Some(sweeper) = sweeper.as_mut() {
            sweeper.cancel();
        }
        queue.shutdown().await;
    }

    fn validate<'a>(&self, field: &'static str, input: &'a str) -> Result<&'a str> {
        if input.trim().is_empty() {
            return Err(HermodError::EmptyInput(field));
        }
        let actual = input.chars().count();
        if actual > self.max_input_chars {
            return Err(HermodError::InputTooLong {
                field,
                limit: self.max_input_chars,
                actual,
            });
        }
        Ok(input)
    }

    /// Serve from cache when the request carries a fingerprint and a live
    /// entry exists, else submit to the queue.
    async fn governed(&self, request: GovernedRequest) -> Result<Value> {
        if let Some(fingerprint) = &request.fingerprint
            && let Some(hit) = self.cache.get(fingerprint).await
        {
            debug!(kind = %request.kind, "served from cache");
            return Ok(hit);
        }
        self.queue.add(request).await
    }
}

#[async_trait]
impl TextGateway for GovernedGateway {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<Translation> {
        let text = self.validate("text", text)?;
        if target_lang.trim().is_empty() {
            return Err(HermodError::EmptyInput("target language"));
        }
        let kind = OperationKind::Translation;
        let request = GovernedRequest::new(
            kind,
            UpstreamRequest::Translate {
                text: text.to_owned(),
                target_lang: target_lang.to_owned(),
            },
        )
        .fingerprint(Fingerprint::new(kind, text, &[target_lang]))
        .cost_text(text)
        .detail("targetLang", target_lang);

        convert::to_translation(self.governed(request).await?)
    }

    async fn cultural_explanation(
        &self,
        text: &str,
        context: &ExplanationContext,
    ) -> Result<CulturalExplanation> {
        let text = self.validate("text", text)?;
        let kind = OperationKind::CulturalExplanation;
        let explanation_type = culture::classify(text);
        let prompt = culture::culture_prompt(text, explanation_type, context);
        let request = GovernedRequest::new(kind, UpstreamRequest::CultureExplanation { prompt })
            .fingerprint(Fingerprint::new(kind, text, &[context.cache_type()]))
            .cost_text(text)
            .detail("explanationType", explanation_type.as_str())
            .detail("contextType", context.cache_type());

        convert::to_explanation(self.governed(request).await?, explanation_type)
    }

    async fn check_compliance(&self, content: &str) -> Result<ComplianceReport> {
        let content = self.validate("content", content)?;
        let kind = OperationKind::Compliance;
        let request = GovernedRequest::new(
            kind,
            UpstreamRequest::ComplianceCheck {
                prompt: culture::compliance_prompt(content),
                content: content.to_owned(),
            },
        )
        .fingerprint(Fingerprint::new(kind, content, &[]))
        .cost_text(content)
        .detail("contentLength", content.chars().count());

        convert::to_compliance(self.governed(request).await?)
    }

    async fn suggest_reply(&self, comment: &str) -> Result<Vec<ReplyTemplate>> {
        let comment = self.validate("comment", comment)?;
        let kind = OperationKind::ReplySuggestion;
        let request = GovernedRequest::new(
            kind,
            UpstreamRequest::SentimentAnalysis {
                prompt: culture::sentiment_prompt(comment),
                text: comment.to_owned(),
            },
        )
        .fingerprint(Fingerprint::new(kind, comment, &[]))
        .cost_text(comment);

        let sentiment = convert::to_sentiment(self.governed(request).await?)?;
        debug!(sentiment = %sentiment.sentiment, intent = %sentiment.intent, "comment analyzed");
        Ok(ReplyTemplate::suggestions_for(&sentiment))
    }

    async fn trending_topics(&self) -> Result<Vec<TrendingTopic>> {
        let kind = OperationKind::TrendingTopics;
        let request = GovernedRequest::new(kind, UpstreamRequest::TrendingTopics)
            .fingerprint(Fingerprint::new(kind, "", &[]));

        convert::to_trending(self.governed(request).await?)
    }

    async fn optimize_title(&self, title: &str, target_lang: &str) -> Result<TitleOptimization> {
        let title = self.validate("title", title)?;
        let translation = self.translate(title, target_lang).await?;

        let kind = OperationKind::TitleOptimization;
        let translated = translation.translated.as_str();
        let request = GovernedRequest::new(
            kind,
            UpstreamRequest::TitleAnalysis {
                prompt: culture::title_prompt(translated),
                title: translated.to_owned(),
            },
        )
        .fingerprint(Fingerprint::new(kind, translated, &[]))
        .cost_text(translated)
        .detail("targetLang", target_lang);

        let body = self.governed(request).await?;
        convert::to_title(body, translation)
    }

    async fn submit_feedback(&self, feedback: &str) -> Result<()> {
        let feedback = self.validate("feedback", feedback)?;
        self.transport
            .request(&UpstreamRequest::Feedback {
                feedback: feedback.to_owned(),
            })
            .await?;
        Ok(())
    }

    fn stats(&self) -> UsageSnapshot {
        self.ledger.stats()
    }
}
