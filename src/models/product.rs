//! Product catalog model
//!
//! Products and the topics a customer can ask about for each of them.
//! Product identifiers double as content keys and as the persisted
//! `product_focus` value.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Financing products offered on the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    #[serde(rename = "gigcash")]
    GigCash,
    #[serde(rename = "empcash")]
    EmpCash,
    #[serde(rename = "scf")]
    Scf,
    #[serde(rename = "icf")]
    Icf,
    #[serde(rename = "imark")]
    IMark,
    #[serde(rename = "lrd")]
    Lrd,
    #[serde(rename = "short_term_loan")]
    ShortTermLoan,
    #[serde(rename = "term_loan")]
    TermLoan,
    #[serde(rename = "lender_services")]
    LenderServices,
}

impl Product {
    pub const ALL: [Product; 9] = [
        Product::GigCash,
        Product::EmpCash,
        Product::Scf,
        Product::Icf,
        Product::IMark,
        Product::Lrd,
        Product::ShortTermLoan,
        Product::TermLoan,
        Product::LenderServices,
    ];

    /// Stable identifier used in persisted state and content keys
    pub fn id(&self) -> &'static str {
        match self {
            Product::GigCash => "gigcash",
            Product::EmpCash => "empcash",
            Product::Scf => "scf",
            Product::Icf => "icf",
            Product::IMark => "imark",
            Product::Lrd => "lrd",
            Product::ShortTermLoan => "short_term_loan",
            Product::TermLoan => "term_loan",
            Product::LenderServices => "lender_services",
        }
    }

    /// Human readable product name
    pub fn display_name(&self) -> &'static str {
        match self {
            Product::GigCash => "GigCash",
            Product::EmpCash => "EmpCash",
            Product::Scf => "Supply Chain Finance (SCF)",
            Product::Icf => "Insurance Claim Finance (ICF)",
            Product::IMark => "iMark",
            Product::Lrd => "Lease Rental Discounting (LRD)",
            Product::ShortTermLoan => "Short Term Loan",
            Product::TermLoan => "Term Loan",
            Product::LenderServices => "Lender Services",
        }
    }

    /// Alternative spellings accepted from extracted entities
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Product::GigCash => &["gig cash", "gig worker finance"],
            Product::EmpCash => &["emp cash", "salary advance", "earned wage access"],
            Product::Scf => &["supply chain finance", "supply chain financing", "invoice financing"],
            Product::Icf => &["insurance claim finance", "insurance claim financing", "claim finance"],
            Product::IMark => &["i mark", "credit rating"],
            Product::Lrd => &["lease rental discounting"],
            Product::ShortTermLoan => &["short term loan", "short term"],
            Product::TermLoan => &["term loan"],
            Product::LenderServices => &["lender services", "lender service", "deal flow"],
        }
    }

    /// Parse a stored product identifier
    ///
    /// Returns `None` for empty, unknown or `"none"` values.
    pub fn from_id(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|product| product.id().eq_ignore_ascii_case(value))
    }

    /// Resolve a free-form product mention such as an entity value
    pub fn from_alias(value: &str) -> Option<Self> {
        if let Some(product) = Self::from_id(value) {
            return Some(product);
        }

        let normalized = normalize(value);
        if normalized.is_empty() {
            return None;
        }

        Self::ALL.iter().copied().find(|product| {
            normalize(product.display_name()) == normalized
                || normalize(product.id()) == normalized
                || product.aliases().iter().any(|alias| *alias == normalized)
        })
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

fn normalize(value: &str) -> String {
    value
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Topics with per-product canned answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Info,
    Fees,
    Eligibility,
    Process,
    Documents,
    Collateral,
    DisbursementSpeed,
}

impl Topic {
    /// Content key for this topic
    pub fn key(&self) -> &'static str {
        match self {
            Topic::Info => "info",
            Topic::Fees => "fees",
            Topic::Eligibility => "eligibility",
            Topic::Process => "process",
            Topic::Documents => "documents",
            Topic::Collateral => "collateral",
            Topic::DisbursementSpeed => "disbursement_speed",
        }
    }

    /// Wording used in "which product's ... " prompts
    pub fn label(&self) -> &'static str {
        match self {
            Topic::Info => "details",
            Topic::Fees => "fees",
            Topic::Eligibility => "eligibility criteria",
            Topic::Process => "application process",
            Topic::Documents => "document requirements",
            Topic::Collateral => "collateral requirements",
            Topic::DisbursementSpeed => "disbursement speed",
        }
    }

    /// Topic requested by an `ask_*` intent
    pub fn from_intent(intent: &str) -> Option<Self> {
        match intent {
            "ask_fees" => Some(Topic::Fees),
            "ask_eligibility" => Some(Topic::Eligibility),
            "ask_process" => Some(Topic::Process),
            "ask_documents" | "ask_requirements" => Some(Topic::Documents),
            "ask_collateral" => Some(Topic::Collateral),
            "ask_disbursement_speed" => Some(Topic::DisbursementSpeed),
            _ => None,
        }
    }
}
