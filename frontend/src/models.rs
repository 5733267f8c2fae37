use serde::{Deserialize, Serialize};

/// Request body for `/api/ai/generate-idea`.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdeaForm {
    pub industry: String,
    pub target_market: String,
    pub technology: Vec<String>,
    pub problem_space: String,
}

impl IdeaForm {
    pub fn is_complete(&self) -> bool {
        !self.industry.is_empty()
            && !self.target_market.is_empty()
            && !self.technology.is_empty()
            && !self.problem_space.trim().is_empty()
    }
}

/// Matches the backend `GeneratedIdea` model.
#[derive(Clone, Debug, Deserialize, PartialEq)]
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

/// Error body returned by the backend before any streaming starts.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ── Documents ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    PitchDeck,
    BusinessPlan,
    MarketingPlan,
    FinancialProjection,
    ExecutiveSummary,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::PitchDeck,
        DocumentKind::BusinessPlan,
        DocumentKind::MarketingPlan,
        DocumentKind::FinancialProjection,
        DocumentKind::ExecutiveSummary,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            DocumentKind::PitchDeck => "pitch_deck",
            DocumentKind::BusinessPlan => "business_plan",
            DocumentKind::MarketingPlan => "marketing_plan",
            DocumentKind::FinancialProjection => "financial_projection",
            DocumentKind::ExecutiveSummary => "executive_summary",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::PitchDeck => "Pitch Deck",
            DocumentKind::BusinessPlan => "Business Plan",
            DocumentKind::MarketingPlan => "Marketing Plan",
            DocumentKind::FinancialProjection => "Financial Projections",
            DocumentKind::ExecutiveSummary => "Executive Summary",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.value() == value)
    }
}

pub const TONES: [&str; 5] = ["professional", "conversational", "technical", "persuasive", "formal"];

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct BusinessInfo {
    pub name: String,
    pub industry: String,
    pub stage: String,
    pub target: String,
}

/// Request body for `/api/ai/generate-document`.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentForm {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub business_info: BusinessInfo,
    pub audience: String,
    pub purpose: String,
    pub tone: String,
}

impl DocumentForm {
    pub fn is_complete(&self) -> bool {
        !self.business_info.name.trim().is_empty() && !self.audience.trim().is_empty()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GeneratedDocument {
    pub document: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub timestamp: String,
}

// ── Code builder ────────────────────────────────────────────────────────────

/// A starting point offered by the code builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: &'static str,
    pub tech_stack: &'static [&'static str],
    pub features: &'static [&'static str],
}

pub const CODE_TEMPLATES: [CodeTemplate; 3] = [
    CodeTemplate {
        id: "next-saas",
        name: "SaaS Platform",
        description: "Full-stack SaaS application with authentication, payments, and dashboard",
        kind: "fullstack",
        tech_stack: &["Next.js", "TypeScript", "Tailwind CSS", "Prisma", "PostgreSQL"],
        features: &["User authentication", "Payment integration", "Dashboard", "Settings"],
    },
    CodeTemplate {
        id: "api-backend",
        name: "REST API",
        description: "Backend API with authentication, database, and documentation",
        kind: "backend",
        tech_stack: &["Node.js", "Express", "TypeScript", "PostgreSQL", "Swagger"],
        features: &["JWT auth", "CRUD operations", "API docs", "Rate limiting"],
    },
    CodeTemplate {
        id: "react-dashboard",
        name: "Admin Dashboard",
        description: "React dashboard with charts, tables, and responsive design",
        kind: "frontend",
        tech_stack: &["React", "TypeScript", "Material UI", "React Query"],
        features: &["Analytics", "Data tables", "Charts", "Theme customization"],
    },
];

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSpecifications {
    #[serde(rename = "type")]
    pub kind: String,
    pub tech_stack: Vec<String>,
}

/// Request body for `/api/ai/generate-code`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CodeForm {
    pub template: String,
    pub specifications: CodeSpecifications,
    pub features: Vec<String>,
}

impl CodeForm {
    /// Template features followed by any extra, comma separated ones.
    pub fn from_template(template: &CodeTemplate, extra_features: &str) -> Self {
        let features = template
            .features
            .iter()
            .map(|f| f.to_string())
            .chain(
                extra_features
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
            )
            .collect();
        Self {
            template: template.id.to_string(),
            specifications: CodeSpecifications {
                kind: template.kind.to_string(),
                tech_stack: template.tech_stack.iter().map(|t| t.to_string()).collect(),
            },
            features,
        }
    }
}

/// Which dashboard panel is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Chat,
    Ideas,
    Documents,
    Code,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn code_form_serializes_like_the_backend_expects() {
        let form = CodeForm::from_template(&CODE_TEMPLATES[1], " Webhooks, ,Audit log");
        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            json!({
                "template": "api-backend",
                "specifications": {
                    "type": "backend",
                    "techStack": ["Node.js", "Express", "TypeScript", "PostgreSQL", "Swagger"]
                },
                "features": [
                    "JWT auth", "CRUD operations", "API docs", "Rate limiting",
                    "Webhooks", "Audit log"
                ]
            })
        );
    }

    #[test]
    fn document_form_uses_wire_names() {
        let form = DocumentForm {
            kind: DocumentKind::ExecutiveSummary,
            tone: "formal".into(),
            ..DocumentForm::default()
        };
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(value["type"], "executive_summary");
        assert_eq!(value["businessInfo"]["name"], "");
        assert_eq!(DocumentKind::from_value("business_plan"), Some(DocumentKind::BusinessPlan));
        assert_eq!(DocumentKind::from_value("novel"), None);
    }

    #[test]
    fn idea_form_needs_every_field() {
        let mut form = IdeaForm {
            industry: "Health".into(),
            target_market: "Clinics".into(),
            technology: vec!["AI".into()],
            problem_space: "  ".into(),
        };
        assert!(!form.is_complete());
        form.problem_space = "No-shows".into();
        assert!(form.is_complete());
    }
}
