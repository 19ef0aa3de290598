use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// Records returned by the bills REST API. Only the fields the pipeline reads
// are modelled; everything else in the payload is ignored.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParliamentBillResponse {
    #[serde(default)]
    pub items: Vec<ParliamentBill>,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub items_per_page: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParliamentBill {
    pub bill_id: u32,
    pub short_title: String,
    #[serde(default)]
    pub current_house: String,
    #[serde(default)]
    pub originating_house: String,
    #[serde(default)]
    pub last_update: String,
    #[serde(default)]
    pub is_act: bool,
    #[serde(default)]
    pub is_defeated: bool,
    #[serde(default)]
    pub bill_withdrawn: Option<String>,
    #[serde(default)]
    pub current_stage: Option<BillStage>,
}

impl ParliamentBill {
    /// Withdrawn and defeated bills are never analysed.
    pub fn is_active(&self) -> bool {
        self.bill_withdrawn.is_none() && !self.is_defeated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillStage {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub house: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationsResponse {
    #[serde(default)]
    pub bill_id: u32,
    #[serde(default)]
    pub publications: Vec<Publication>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub display_date: String,
    pub publication_type: PublicationType,
    #[serde(default)]
    pub links: Vec<PublicationLink>,
    #[serde(default)]
    pub files: Vec<PublicationFile>,
}

impl Publication {
    pub const BILL_TYPE: &'static str = "Bill";

    pub fn is_bill_text(&self) -> bool {
        self.publication_type.name == Self::BILL_TYPE
    }

    /// Display date as a sortable timestamp, `None` when the API sent
    /// something unrecognisable.
    pub fn display_timestamp(&self) -> Option<NaiveDateTime> {
        parse_display_date(&self.display_date)
    }

    pub fn html_file(&self) -> Option<&PublicationFile> {
        self.files.iter().find(|f| f.content_type == HTML_CONTENT_TYPE)
    }

    pub fn html_link(&self) -> Option<&PublicationLink> {
        self.links.iter().find(|l| l.content_type == HTML_CONTENT_TYPE)
    }
}

pub const HTML_CONTENT_TYPE: &str = "text/html";

fn parse_display_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationType {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationFile {
    pub id: u64,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub content_length: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationLink {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content_type: String,
}

// Persisted records. Keys are camelCase because the site reads this file
// directly.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub bill_id: u32,
    pub short_title: String,
    pub current_house: String,
    pub originating_house: String,
    pub last_update: String,
    pub is_act: bool,
    pub current_stage: Option<BillStage>,
    pub bill_url: String,
}

impl Bill {
    pub fn from_upstream(bill: &ParliamentBill, site_base: &str) -> Self {
        Self {
            bill_id: bill.bill_id,
            short_title: bill.short_title.clone(),
            current_house: bill.current_house.clone(),
            originating_house: bill.originating_house.clone(),
            last_update: bill.last_update.clone(),
            is_act: bill.is_act,
            current_stage: bill.current_stage.clone(),
            bill_url: format!("{}/{}", site_base.trim_end_matches('/'), bill.bill_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    #[default]
    Neutral,
    Mixed,
}

impl Impact {
    pub const ALL: [Impact; 4] = [
        Impact::Positive,
        Impact::Negative,
        Impact::Neutral,
        Impact::Mixed,
    ];

    /// Case-insensitive parse of a model-supplied rating.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Impact::Positive),
            "negative" => Some(Impact::Negative),
            "neutral" => Some(Impact::Neutral),
            "mixed" => Some(Impact::Mixed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Positive => "positive",
            Impact::Negative => "negative",
            Impact::Neutral => "neutral",
            Impact::Mixed => "mixed",
        }
    }

    /// Display label for listing pages.
    pub fn label(&self) -> &'static str {
        match self {
            Impact::Positive => "Positive",
            Impact::Negative => "Negative",
            Impact::Neutral => "Neutral",
            Impact::Mixed => "Mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    pub name: &'static str,
    pub icon: &'static str,
    pub question: &'static str,
}

/// The six analysis dimensions, in the order they are prompted and stored.
pub const DIMENSIONS: [Dimension; 6] = [
    Dimension {
        name: "Economy",
        icon: "📈",
        question: "expected impact on growth and productivity",
    },
    Dimension {
        name: "Government Finances",
        icon: "🏛️",
        question: "impact on government cost and revenue",
    },
    Dimension {
        name: "Fairness & Justice",
        icon: "⚖️",
        question: "does the bill unfairly privilege or penalise a minority group? If so, is there good reason for it (e.g. the group is disadvantaged)?",
    },
    Dimension {
        name: "Liberty & Autonomy",
        icon: "🗽",
        question: "if the bill restricts personal liberty, is there good reason for it?",
    },
    Dimension {
        name: "Welfare & Quality of Life",
        icon: "❤️",
        question: "is the bill expected to improve quality of life for citizens?",
    },
    Dimension {
        name: "Environment",
        icon: "🌍",
        question: "is the bill beneficial to the environment?",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisCategory {
    pub name: String,
    pub icon: String,
    pub impact: Impact,
    pub summary: String,
    pub detail: String,
}

/// Parsed model output: a bill summary plus one category per dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub bill_summary: String,
    pub categories: Vec<AnalysisCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillAnalysis {
    pub bill: Bill,
    pub text_available: bool,
    pub summary: String,
    pub categories: Vec<AnalysisCategory>,
    pub analysed_at: DateTime<Utc>,
}

impl BillAnalysis {
    pub const FAILED_SUMMARY: &'static str = "Analysis failed due to an error.";

    pub fn text_unavailable(bill: Bill) -> Self {
        Self {
            bill,
            text_available: false,
            summary: String::new(),
            categories: Vec::new(),
            analysed_at: Utc::now(),
        }
    }

    pub fn analysed(bill: Bill, result: AnalysisResult) -> Self {
        Self {
            bill,
            text_available: true,
            summary: result.bill_summary,
            categories: result.categories,
            analysed_at: Utc::now(),
        }
    }

    pub fn failed(bill: Bill) -> Self {
        Self {
            bill,
            text_available: true,
            summary: Self::FAILED_SUMMARY.to_string(),
            categories: Vec::new(),
            analysed_at: Utc::now(),
        }
    }

    pub fn bill_id(&self) -> u32 {
        self.bill.bill_id
    }
}
