//! Operation kinds governed by the request queue.

use serde::{Deserialize, Serialize};

/// A kind of governed upstream operation.
///
/// Serialized as its stats key (e.g. `"translations"`), which is also the
/// key its counter is stored under in [`UsageStats`](crate::UsageStats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "translations")]
    Translation,
    #[serde(rename = "culturalExplanations")]
    CulturalExplanation,
    #[serde(rename = "complianceChecks")]
    Compliance,
    #[serde(rename = "replies")]
    ReplySuggestion,
    #[serde(rename = "trendingTopics")]
    TrendingTopics,
    #[serde(rename = "titleOptimizations")]
    TitleOptimization,
}

impl OperationKind {
    /// Every kind, in declaration order.
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Translation,
        OperationKind::CulturalExplanation,
        OperationKind::Compliance,
        OperationKind::ReplySuggestion,
        OperationKind::TrendingTopics,
        OperationKind::TitleOptimization,
    ];

    /// Counter key used in usage stats and metric labels.
    pub fn stats_key(&self) -> &'static str {
        match self {
            OperationKind::Translation => "translations",
            OperationKind::CulturalExplanation => "culturalExplanations",
            OperationKind::Compliance => "complianceChecks",
            OperationKind::ReplySuggestion => "replies",
            OperationKind::TrendingTopics => "trendingTopics",
            OperationKind::TitleOptimization => "titleOptimizations",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stats_key())
    }
}
