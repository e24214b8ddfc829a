//! Public types for the Hermod API.

mod operation;
mod request;
mod results;
mod usage;

pub use operation::OperationKind;
pub use request::UpstreamRequest;
pub use results::{
    ComplianceReport, CulturalExplanation, ExplanationContext, ExplanationType, ReplyTemplate,
    SentimentAnalysis, TitleOptimization, TrendingTopic, Translation,
};
pub use usage::{HistoryRecord, UsageSnapshot, UsageStats};
