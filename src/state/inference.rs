//! Intent and keyword inference tables
//!
//! Static lookup tables mapping intents and keywords to user types, products
//! and phases. Keywords are matched against whole tokens: a phrase matches
//! when its tokens appear contiguously in the message, so "ola" never fires
//! on "olaf". When several entries match, the one declared first wins.

use once_cell::sync::Lazy;
use regex::Regex;
use crate::models::Product;
use super::conversation::{ConversationPhase, UserType};

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("token pattern is valid"));

/// `declare_*` intents: segment plus the product the declaration implies
pub static DECLARE_INTENTS: &[(&str, UserType, Option<Product>)] = &[
    ("declare_individual", UserType::Individual, None),
    ("declare_gig_worker", UserType::Individual, Some(Product::GigCash)),
    ("declare_freelancer", UserType::Individual, Some(Product::GigCash)),
    ("declare_salaried", UserType::Individual, Some(Product::EmpCash)),
    ("declare_salaried_employee", UserType::Individual, Some(Product::EmpCash)),
    ("declare_business", UserType::Business, None),
    ("declare_msme", UserType::Business, None),
    ("declare_hospital", UserType::Business, Some(Product::Icf)),
    ("declare_lender", UserType::Lender, Some(Product::LenderServices)),
    ("declare_nbfc", UserType::Lender, Some(Product::LenderServices)),
    ("declare_bank", UserType::Lender, Some(Product::LenderServices)),
];

/// Product information intents
pub static PRODUCT_INTENTS: &[(&str, Product)] = &[
    ("ask_gigcash_info", Product::GigCash),
    ("ask_empcash_info", Product::EmpCash),
    ("ask_supply_chain_finance", Product::Scf),
    ("ask_insurance_claim_finance", Product::Icf),
    ("ask_imark_info", Product::IMark),
    ("ask_lease_rental_discounting", Product::Lrd),
    ("ask_short_term_loan", Product::ShortTermLoan),
    ("ask_term_loan", Product::TermLoan),
    ("ask_lender_services", Product::LenderServices),
];

/// Intents that move the funnel to a specific phase
pub static PHASE_INTENTS: &[(&str, ConversationPhase)] = &[
    ("ask_process", ConversationPhase::Process),
    ("ask_eligibility", ConversationPhase::Eligibility),
    ("ask_fees", ConversationPhase::Fees),
    ("ask_documents", ConversationPhase::Documents),
    ("ask_requirements", ConversationPhase::Documents),
    ("ask_collateral", ConversationPhase::Collateral),
    ("ask_disbursement_speed", ConversationPhase::Disbursement),
];

/// Segment keywords, checked in this order
pub static USER_TYPE_KEYWORDS: &[(UserType, &[&str])] = &[
    (
        UserType::Individual,
        &[
            "individual", "personal", "myself", "freelancer", "freelance", "gig", "gig worker",
            "salaried", "salary", "employee", "delivery partner", "driver", "uber", "ola",
            "zomato", "swiggy",
        ],
    ),
    (
        UserType::Business,
        &[
            "business", "company", "msme", "sme", "enterprise", "firm", "startup", "hospital",
            "manufacturer", "supplier", "distributor", "our company", "proprietor",
        ],
    ),
    (
        UserType::Lender,
        &[
            "lender", "nbfc", "bank", "financial institution", "investor", "invest",
            "lending partner", "co lending",
        ],
    ),
];

/// Product keywords, checked in this order
pub static PRODUCT_KEYWORDS: &[(Product, &[&str])] = &[
    (
        Product::GigCash,
        &[
            "gigcash", "gig", "gigs", "gig worker", "freelance", "freelancer", "freelancers",
            "freelancing", "uber", "ola", "zomato", "swiggy", "dunzo", "rapido", "zepto",
            "delivery partner", "platform earnings",
        ],
    ),
    (
        Product::EmpCash,
        &[
            "empcash", "salary advance", "salary", "salaried", "payday", "earned wage",
            "wage advance",
        ],
    ),
    (
        Product::Scf,
        &[
            "scf", "supply chain", "invoice", "invoices", "bill discounting", "working capital",
            "msme", "vendor financing", "dealer financing",
        ],
    ),
    (
        Product::Icf,
        &["icf", "insurance claim", "insurance claims", "hospital", "hospitals", "tpa"],
    ),
    (Product::IMark, &["imark", "credit rating", "rating"]),
    (Product::Lrd, &["lrd", "lease rental", "rental discounting", "lease"]),
    (
        Product::ShortTermLoan,
        &["short term", "quick loan", "bridge loan", "urgent loan"],
    ),
    (
        Product::TermLoan,
        &["term loan", "long term", "expansion loan", "machinery"],
    ),
    (
        Product::LenderServices,
        &["deal flow", "co lending", "investment opportunities", "lending partner"],
    ),
];

/// Lowercased word tokens of `text`
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|token| token.as_str().to_string())
        .collect()
}

/// Whether `phrase` occurs as a contiguous run of whole tokens
pub fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let needle = tokenize(phrase);
    if needle.is_empty() || needle.len() > tokens.len() {
        return false;
    }
    tokens.windows(needle.len()).any(|window| window == needle.as_slice())
}

/// Whether any of `keywords` occurs in `tokens`
pub fn contains_any(tokens: &[String], keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| contains_phrase(tokens, keyword))
}

fn first_match<T: Copy>(tokens: &[String], table: &[(T, &[&str])]) -> Option<T> {
    table
        .iter()
        .find(|(_, keywords)| contains_any(tokens, keywords))
        .map(|(value, _)| *value)
}

/// Segment declared by a `declare_*` intent
pub fn user_type_for_intent(intent: &str) -> Option<UserType> {
    DECLARE_INTENTS
        .iter()
        .find(|(name, _, _)| *name == intent)
        .map(|(_, user_type, _)| *user_type)
}

/// Product named explicitly by an intent
pub fn product_for_intent(intent: &str) -> Option<Product> {
    PRODUCT_INTENTS
        .iter()
        .find(|(name, _)| *name == intent)
        .map(|(_, product)| *product)
        .or_else(|| {
            DECLARE_INTENTS
                .iter()
                .find(|(name, _, _)| *name == intent)
                .and_then(|(_, _, product)| *product)
        })
}

/// Phase an intent moves the funnel to
pub fn phase_for_intent(intent: &str) -> Option<ConversationPhase> {
    if let Some((_, phase)) = PHASE_INTENTS.iter().find(|(name, _)| *name == intent) {
        return Some(*phase);
    }

    let is_product_intent = PRODUCT_INTENTS.iter().any(|(name, _)| *name == intent);
    let is_declaration = DECLARE_INTENTS.iter().any(|(name, _, _)| *name == intent);
    if is_product_intent || is_declaration {
        Some(ConversationPhase::Exploring)
    } else {
        None
    }
}

/// Segment inferred from message keywords
pub fn infer_user_type(tokens: &[String]) -> Option<UserType> {
    first_match(tokens, USER_TYPE_KEYWORDS)
}

/// Product inferred from message keywords
pub fn infer_product(tokens: &[String]) -> Option<Product> {
    first_match(tokens, PRODUCT_KEYWORDS)
}
