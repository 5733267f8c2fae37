use chrono::{DateTime, Utc};
use cofounder_protocol::{ChatMessage, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

// ── Chat ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Option<Vec<ChatMessage>>,
}

impl ChatRequest {
    /// The validated client history: present, non-empty, no system entries.
    pub fn into_messages(self) -> Result<Vec<ChatMessage>, AppError> {
        let messages = self
            .messages
            .ok_or_else(|| AppError::bad_request("No messages provided"))?;
        if messages.is_empty() {
            return Err(AppError::bad_request("No messages provided"));
        }
        if messages.iter().any(|m| m.role == Role::System) {
            return Err(AppError::bad_request("System messages cannot be supplied by the client"));
        }
        Ok(messages)
    }
}

// ── Code generation ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub template: Option<String>,
    pub specifications: Option<CodeSpecifications>,
    #[serde(default)]
    pub features: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSpecifications {
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Document generation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PitchDeck,
    BusinessPlan,
    MarketingPlan,
    FinancialProjection,
    ExecutiveSummary,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::PitchDeck => "pitch_deck",
            DocumentKind::BusinessPlan => "business_plan",
            DocumentKind::MarketingPlan => "marketing_plan",
            DocumentKind::FinancialProjection => "financial_projection",
            DocumentKind::ExecutiveSummary => "executive_summary",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            DocumentKind::PitchDeck => {
                "Create a compelling pitch deck outline with key slides and content"
            }
            DocumentKind::BusinessPlan => {
                "Write a detailed business plan following standard industry format"
            }
            DocumentKind::MarketingPlan => {
                "Develop a comprehensive marketing strategy and execution plan"
            }
            DocumentKind::FinancialProjection => "Generate financial projections and analysis",
            DocumentKind::ExecutiveSummary => {
                "Write a concise executive summary highlighting key business aspects"
            }
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    #[serde(rename = "type")]
    pub kind: Option<DocumentKind>,
    #[serde(default)]
    pub business_info: Value,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub tone: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub document: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub timestamp: DateTime<Utc>,
}

// ── Idea generation ─────────────────────────────────────────────────────────

/// `technology` arrives as a single string from older forms and as a list
/// from the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Technologies {
    One(String),
    Many(Vec<String>),
}

impl Technologies {
    pub fn is_empty(&self) -> bool {
        match self {
            Technologies::One(s) => s.trim().is_empty(),
            Technologies::Many(v) => v.iter().all(|s| s.trim().is_empty()),
        }
    }

    pub fn joined(&self) -> String {
        match self {
            Technologies::One(s) => s.clone(),
            Technologies::Many(v) => v.join(", "),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaRequest {
    pub industry: Option<String>,
    pub target_market: Option<String>,
    pub technology: Option<Technologies>,
    pub problem_space: Option<String>,
}

/// The validated form of an [`IdeaRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaParams {
    pub industry: String,
    pub target_market: String,
    pub technology: String,
    pub problem_space: String,
}

impl IdeaRequest {
    pub fn validate(self) -> Result<IdeaParams, AppError> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let industry = present(self.industry);
        let target_market = present(self.target_market);
        let technology = self.technology.filter(|t| !t.is_empty());
        let problem_space = present(self.problem_space);

        let mut missing = Vec::new();
        if industry.is_none() {
            missing.push("industry");
        }
        if target_market.is_none() {
            missing.push("targetMarket");
        }
        if technology.is_none() {
            missing.push("technology");
        }
        if problem_space.is_none() {
            missing.push("problemSpace");
        }

        match (industry, target_market, technology, problem_space) {
            (Some(industry), Some(target_market), Some(technology), Some(problem_space)) => {
                Ok(IdeaParams {
                    industry,
                    target_market,
                    technology: technology.joined(),
                    problem_space,
                })
            }
            _ => Err(AppError::MissingFields { fields: missing }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedIdea {
    pub name: String,
    pub pitch: String,
    pub description: String,
    #[serde(default)]
    pub key_features: Vec<String>,
    pub target_audience: String,
    pub revenue_model: String,
    #[serde(default)]
    pub challenges: Vec<String>,
    pub growth_strategy: String,
}
