//! Response selection
//!
//! Picks the reply for a turn from the updated conversation state. Intents
//! map to response functions through a lookup table; `declare_*` and product
//! intents are matched by prefix, everything else goes to the context-aware
//! fallback.

use std::collections::HashMap;
use once_cell::sync::Lazy;
use crate::content::{ContentParams, ContentStore};
use crate::models::{Product, Topic};
use crate::state::inference::{self, contains_any, contains_phrase};
use crate::state::{Clarification, ConversationPhase, ConversationState, UserType};

/// Inline reply option that triggers an intent directly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReply {
    pub label: String,
    pub intent: String,
}

/// Messages and reply options produced for one turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub messages: Vec<String>,
    pub quick_replies: Vec<QuickReply>,
}

impl Reply {
    fn text(message: String) -> Self {
        Self {
            messages: vec![message],
            quick_replies: Vec::new(),
        }
    }

    fn with_quick_replies(mut self, quick_replies: Vec<QuickReply>) -> Self {
        self.quick_replies = quick_replies;
        self
    }
}

/// Everything a response function may look at
pub struct ResponseContext<'a> {
    pub content: &'a ContentStore,
    pub lang: &'a str,
    pub intent: &'a str,
    pub tokens: &'a [String],
    pub state: &'a ConversationState,
}

impl ResponseContext<'_> {
    fn t(&self, key: &str) -> String {
        self.content.t(key, self.lang, None)
    }

    fn t_with(&self, key: &str, name: &str, value: &str) -> String {
        let mut params = ContentParams::new();
        params.insert(name.to_string(), value.to_string());
        self.content.t(key, self.lang, Some(&params))
    }
}

type ResponseFn = fn(&ResponseContext<'_>) -> Reply;

const AFFIRM_WORDS: &[&str] = &["yes", "yeah", "yep", "ok", "okay", "sure", "proceed"];
const FUNDING_WORDS: &[&str] = &["loan", "loans", "money", "cash", "funding", "finance"];
const HOW_TO_WORDS: &[&str] = &["process", "apply", "how"];
const DEAL_FLOW_WORDS: &[&str] = &["deal", "deals", "flow", "partnership", "invest", "investment"];

/// Topic words recognised in free text, checked in this order
const TOPIC_WORDS: &[(Topic, &[&str])] = &[
    (Topic::Eligibility, &["eligibility", "eligible", "qualify", "requirement", "requirements"]),
    (Topic::Process, &["process", "steps", "how", "procedure"]),
    (Topic::Fees, &["fee", "fees", "charges", "cost", "interest rate"]),
    (Topic::Documents, &["documents", "document", "papers", "kyc"]),
    (Topic::Collateral, &["collateral", "security", "guarantee"]),
    (Topic::DisbursementSpeed, &["disbursement", "how fast", "how soon"]),
    (Topic::Info, &["what is", "what s", "tell me about", "info", "details"]),
];

static RESPONSES: Lazy<HashMap<&'static str, ResponseFn>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, ResponseFn> = HashMap::new();
    table.insert("greet", greet);
    table.insert("goodbye", goodbye);
    table.insert("end_chat", end_chat);
    table.insert("request_demo", request_demo);
    table.insert("thank_you", thanks);
    table.insert("thanks", thanks);
    table.insert("deny", deny);
    table.insert("affirm", affirm);
    table.insert("ask_loan_need", loan_need);
    table.insert("nlu_fallback", nlu_fallback);
    for intent in [
        "ask_fees",
        "ask_eligibility",
        "ask_process",
        "ask_documents",
        "ask_requirements",
        "ask_collateral",
        "ask_disbursement_speed",
    ] {
        table.insert(intent, topic);
    }
    table
});

/// Select the reply for the turn described by `ctx`
pub fn respond(ctx: &ResponseContext<'_>) -> Reply {
    if let Some(handler) = RESPONSES.get(ctx.intent) {
        return handler(ctx);
    }
    if inference::user_type_for_intent(ctx.intent).is_some() {
        return declaration(ctx);
    }
    if inference::product_for_intent(ctx.intent).is_some() {
        return product_overview(ctx);
    }
    smart_fallback(ctx)
}

/// Ask for the segment alongside product answers while it is still unknown
pub fn apply_segment_gate(
    ctx: &ResponseContext<'_>,
    mut reply: Reply,
    clarification: Option<Clarification>,
) -> Reply {
    if clarification != Some(Clarification::Segment)
        || !reply.quick_replies.is_empty()
        || !answers_product(ctx)
    {
        return reply;
    }

    reply.messages.push(ctx.t("prompts.segment_followup"));
    reply.with_quick_replies(segment_quick_replies(ctx.content, ctx.lang))
}

/// Whether the turn is answered with product-specific content
fn answers_product(ctx: &ResponseContext<'_>) -> bool {
    let Some(product) = ctx.state.product_focus else {
        return false;
    };
    if product == Product::LenderServices {
        return false;
    }
    Topic::from_intent(ctx.intent).is_some() || inference::product_for_intent(ctx.intent).is_some()
}

/// Buttons for picking a customer segment
pub fn segment_quick_replies(content: &ContentStore, lang: &str) -> Vec<QuickReply> {
    [
        ("buttons.individual", "declare_individual"),
        ("buttons.business", "declare_business"),
        ("buttons.lender", "declare_lender"),
    ]
    .into_iter()
    .map(|(key, intent)| QuickReply {
        label: content.t(key, lang, None),
        intent: intent.to_string(),
    })
    .collect()
}

fn greet(ctx: &ResponseContext<'_>) -> Reply {
    let reply = Reply {
        messages: vec![ctx.t("prompts.greeting"), ctx.t("prompts.services_brief")],
        quick_replies: Vec::new(),
    };
    if ctx.state.user_type.is_known() {
        reply
    } else {
        reply.with_quick_replies(segment_quick_replies(ctx.content, ctx.lang))
    }
}

fn goodbye(ctx: &ResponseContext<'_>) -> Reply {
    Reply::text(ctx.t("prompts.goodbye"))
}

fn end_chat(ctx: &ResponseContext<'_>) -> Reply {
    Reply::text(ctx.t("prompts.end_chat"))
}

fn request_demo(ctx: &ResponseContext<'_>) -> Reply {
    Reply::text(ctx.t("prompts.demo_requested"))
}

fn thanks(ctx: &ResponseContext<'_>) -> Reply {
    Reply::text(ctx.t("prompts.thanks"))
}

fn deny(ctx: &ResponseContext<'_>) -> Reply {
    Reply::text(ctx.t("prompts.deny"))
}

fn loan_need(ctx: &ResponseContext<'_>) -> Reply {
    segment_prompt(ctx)
}

fn segment_prompt(ctx: &ResponseContext<'_>) -> Reply {
    Reply::text(ctx.t("prompts.segment"))
        .with_quick_replies(segment_quick_replies(ctx.content, ctx.lang))
}

fn affirm(ctx: &ResponseContext<'_>) -> Reply {
    let message = match ctx.state.product_focus {
        Some(product) if ctx.state.conversation_phase == ConversationPhase::Process => {
            ctx.t_with("prompts.affirm_ready", "product", product.display_name())
        }
        Some(product) => ctx.t_with("prompts.affirm_product", "product", product.display_name()),
        None => ctx.t("prompts.affirm_generic"),
    };
    Reply::text(message)
}

fn topic(ctx: &ResponseContext<'_>) -> Reply {
    match Topic::from_intent(ctx.intent) {
        Some(topic) => topic_answer(ctx, topic),
        None => smart_fallback(ctx),
    }
}

/// Canned answer for the focused product, or a request to name one
fn topic_answer(ctx: &ResponseContext<'_>, topic: Topic) -> Reply {
    let answer = ctx
        .state
        .product_focus
        .and_then(|product| ctx.content.product_topic(product, topic, ctx.lang));

    match answer {
        Some(text) => Reply::text(text),
        None => Reply::text(ctx.t_with("prompts.specify_product", "topic", topic.label())),
    }
}

fn declaration(ctx: &ResponseContext<'_>) -> Reply {
    match (ctx.state.user_type, ctx.state.product_focus) {
        (UserType::Unknown, _) => segment_prompt(ctx),
        (_, Some(product)) if inference::product_for_intent(ctx.intent) == Some(product) => {
            product_reply(ctx, product)
        }
        (user_type, _) => Reply::text(ctx.t(&format!("segments.{}", user_type.as_str()))),
    }
}

fn product_overview(ctx: &ResponseContext<'_>) -> Reply {
    match ctx.state.product_focus {
        Some(product) => product_reply(ctx, product),
        None => Reply::text(ctx.t("prompts.choose_product")),
    }
}

fn product_reply(ctx: &ResponseContext<'_>, product: Product) -> Reply {
    let mut messages = Vec::with_capacity(2);
    match ctx.content.product_topic(product, Topic::Info, ctx.lang) {
        Some(info) => messages.push(info),
        None => messages.push(ctx.t_with("prompts.specify_product", "topic", Topic::Info.label())),
    }
    messages.push(ctx.t_with("prompts.product_followup", "product", product.display_name()));
    Reply {
        messages,
        quick_replies: Vec::new(),
    }
}

/// Low-confidence predictions: a coarse keyword triage
fn nlu_fallback(ctx: &ResponseContext<'_>) -> Reply {
    if contains_any(ctx.tokens, FUNDING_WORDS) {
        segment_prompt(ctx)
    } else if contains_any(ctx.tokens, HOW_TO_WORDS) {
        Reply::text(ctx.t("prompts.choose_product"))
    } else {
        Reply::text(ctx.t("prompts.menu"))
    }
}

/// Unrecognised intents, answered from conversation context
fn smart_fallback(ctx: &ResponseContext<'_>) -> Reply {
    let state = ctx.state;

    if matches!(state.product_focus, Some(product) if product != Product::LenderServices) {
        if let Some(topic) = topic_in_text(ctx.tokens) {
            return topic_answer(ctx, topic);
        }
    }

    if contains_any(ctx.tokens, AFFIRM_WORDS) {
        return affirm(ctx);
    }

    let lender_context = matches!(state.product_focus, None | Some(Product::LenderServices));
    if state.user_type == UserType::Lender
        && lender_context
        && contains_any(ctx.tokens, DEAL_FLOW_WORDS)
    {
        return Reply::text(ctx.t("prompts.lender_deal_flow"));
    }

    Reply::text(ctx.t("prompts.fallback"))
}

fn topic_in_text(tokens: &[String]) -> Option<Topic> {
    TOPIC_WORDS
        .iter()
        .find(|(_, words)| words.iter().any(|word| contains_phrase(tokens, word)))
        .map(|(topic, _)| *topic)
}
