//! Recovers a structured `{reply, followups}` answer from whatever
//! text the model produced.
//!
//! The system prompt asks for strict JSON but nothing guarantees it.
//! Models wrap the object in prose, emit half an object, or ignore
//! the format entirely. None of that is an error here: every input
//! produces a reply the front end can render.
//!
//! The fallback chain is:
//! 1. Parse the whole completion as a JSON object
//! 2. If it isn't JSON at all, parse the span from the first `{` to the
//!    last `}`
//! 3. Use the raw completion as the reply
//!
//! Followups missing after extraction are replaced by a static set in
//! the same language as the reply.
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static CJK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{4e00}-\u{9fff}]").expect("Invalid CJK pattern"));

/// Used when the model returns nothing at all
pub const EMPTY_COMPLETION_REPLY: &str = "Sorry, I could not generate an answer just now. \
Please try asking your question again.\n抱歉，系統暫時未能產生回覆，請重新提出你的問題。";

pub const FALLBACK_FOLLOWUPS_ZH: [&str; 3] = [
    "我還可以進一步了解哪些有關 IN-SMART 支援目標或活動的資訊？",
    "我可以如何善用 IN-SMART 提供的教師培訓或 STEAM／AI 教學設計支援？",
    "如果我之後有問題或想參加計劃，我可以用甚麼方式聯絡 IN-SMART 團隊？",
];

pub const FALLBACK_FOLLOWUPS_EN: [&str; 3] = [
    "What else can I learn about IN-SMART’s support goals or activities?",
    "How can I make use of IN-SMART’s support for teacher training or STEAM/AI learning design?",
    "If I have more questions or want to participate, how can I contact the IN-SMART team?",
];

#[derive(Debug, PartialEq)]
pub enum ParseResult {
    Parsed(Map<String, Value>),
    Malformed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedReply {
    pub reply: String,
    pub followups: Vec<String>,
}

/// Whether the text contains any CJK unified ideograph.
pub fn contains_cjk(text: &str) -> bool {
    CJK.is_match(text)
}

pub fn fallback_followups(reply: &str) -> Vec<String> {
    let set = if contains_cjk(reply) {
        FALLBACK_FOLLOWUPS_ZH
    } else {
        FALLBACK_FOLLOWUPS_EN
    };
    set.iter().map(|s| s.to_string()).collect()
}

fn parse_object(text: &str) -> ParseResult {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => ParseResult::Parsed(obj),
        _ => ParseResult::Malformed,
    }
}

/// The span between the first `{` and the last `}`, inclusive.
fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Strict parse first, then the embedded object. Valid JSON that
/// isn't an object is malformed, the span is only tried when the
/// strict parse fails.
pub fn parse_completion(raw: &str) -> ParseResult {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(obj)) => ParseResult::Parsed(obj),
        Ok(_) => ParseResult::Malformed,
        Err(_) => match object_span(raw) {
            Some(span) => parse_object(span),
            None => ParseResult::Malformed,
        },
    }
}

fn extract_reply(obj: &Map<String, Value>) -> Option<String> {
    obj.get("reply")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// Non-string items are dropped without complaint
fn extract_followups(obj: &Map<String, Value>) -> Vec<String> {
    obj.get("followups")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Turns a raw completion into a reply and followups. Never fails.
pub fn normalize(raw: &str) -> NormalizedReply {
    if raw.trim().is_empty() {
        tracing::warn!("Empty completion, replying with an apology");
        return NormalizedReply {
            reply: EMPTY_COMPLETION_REPLY.to_string(),
            followups: fallback_followups(EMPTY_COMPLETION_REPLY),
        };
    }

    let (reply, followups) = match parse_completion(raw) {
        ParseResult::Parsed(obj) => (extract_reply(&obj), extract_followups(&obj)),
        ParseResult::Malformed => {
            tracing::debug!("Completion is not JSON, using it as the reply");
            (None, Vec::new())
        }
    };

    let reply = reply.unwrap_or_else(|| raw.to_string());
    let followups = if followups.is_empty() {
        fallback_followups(&reply)
    } else {
        followups
    };

    NormalizedReply { reply, followups }
}
