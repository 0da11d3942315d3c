//! Reusable prompts using Handlebars for templating. Strict mode is on
//! so a missing field fails loudly at startup instead of producing a
//! prompt with holes in it.

use std::fmt;

use anyhow::Result;
use handlebars::Handlebars;
use serde::Serialize;

use crate::ai::chat::{Entry, History};
use crate::corpus::{self, Corpus};
use crate::openai::{Message, Role};

#[derive(Debug)]
pub enum Prompt {
    SystemInstructions,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Prompt> for String {
    fn from(item: Prompt) -> String {
        format!("{:?}", item)
    }
}

const SYSTEM_INSTRUCTIONS_PROMPT: &str = r#"
You are the official Q&A assistant for the "IN-SMART – Innovative Network for STEAM and AI Talent"
project at The University of Hong Kong, serving mainly Hong Kong schools and teachers.

LANGUAGE:
- If the user's message is mainly in Chinese, respond in Traditional Chinese.
- If it is mainly in English, respond in English.
- If mixed, choose the dominant language but you may briefly use both when helpful.
- Whatever language you use in "reply", you MUST use the SAME language in ALL items of "followups".

ABOUT IN-SMART:
{{summary}}

{{#if crawl_error}}
[Note: an error occurred while crawling the IN-SMART website at startup: {{crawl_error}}]
{{/if}}
{{#if crawled}}
Below is content automatically retrieved at startup from the IN-SMART official website
(up to {{max_pages}} pages, Chinese and English, possibly truncated):

================ IN-SMART WEBSITE CONTENT START ================
{{#if corpus}}{{corpus}}{{else}}[No crawled content available at the moment]{{/if}}
================ IN-SMART WEBSITE CONTENT END ==================
{{/if}}

You must strictly follow these rules:

1. SCOPE
   - ONLY answer questions directly related to IN-SMART, its goals, activities, STEAM education,
     self-directed learning, AI in education, and closely related school implementation issues.
   - If the user asks something clearly unrelated (e.g. general news, entertainment, finance,
     personal matters), reply in the user's language that this chatbot only handles IN-SMART
     related enquiries and cannot answer that question.

2. CONTENT SOURCE
   - Base your answers primarily on the IN-SMART content above.
   - If the user asks something NOT clearly covered, you may give general educational advice,
     BUT explicitly state that it is general advice and remind the user to check the latest
     official information on: {{home_url}}
   - NEVER fabricate concrete factual details such as the list of participating schools,
     specific dates, quotas, or fees, unless they are clearly present in the content above.

3. STYLE
   - Be concise, structured and helpful; use bullet points when useful.
   - Do NOT use Markdown formatting in your reply text. Plain text is enough.

4. OUTPUT FORMAT (IMPORTANT)
   - You must output ONLY valid JSON in the following format, with double quotes and no extra text:

   {
     "reply": "your main answer to the user, in the appropriate language",
     "followups": [
       "follow-up question 1, SAME LANGUAGE as reply",
       "follow-up question 2, SAME LANGUAGE as reply",
       "follow-up question 3, SAME LANGUAGE as reply"
     ]
   }

   - Do not include any explanation outside this JSON.
   - "followups" must be tailored to THIS conversation turn, closely related to the user's
     question AND your reply, written as questions the user might ask next, e.g. about support
     focus, activities, participation modes, practical implementation of STEAM/AI/self-directed
     learning in school, or how IN-SMART can support their specific role.
   - If the user's message is in Traditional Chinese, both "reply" and all "followups" MUST be
     in Traditional Chinese. If it is in English, both MUST be in English.
"#;

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    // Prompts are plain text, HTML escaping would mangle the corpus
    registry.register_escape_fn(handlebars::no_escape);
    registry
        .register_template_string(
            &Prompt::SystemInstructions.to_string(),
            SYSTEM_INSTRUCTIONS_PROMPT,
        )
        .expect("Failed to register template");
    registry
}

#[derive(Serialize)]
struct SystemInstructionsContext<'a> {
    summary: &'a str,
    crawled: bool,
    crawl_error: Option<&'a str>,
    corpus: &'a str,
    max_pages: usize,
    home_url: &'a str,
}

/// Renders the system message: the fixed instructions with the corpus
/// embedded in them.
pub fn system_instructions(corpus: &Corpus, home_url: &str, max_pages: usize) -> Result<String> {
    let templates = templates();
    let ctx = SystemInstructionsContext {
        summary: corpus::BUNDLED_SUMMARY.trim(),
        crawled: corpus.is_crawled(),
        crawl_error: corpus.error(),
        corpus: corpus.content(),
        max_pages,
        home_url,
    };
    let content = templates.render(&Prompt::SystemInstructions.to_string(), &ctx)?;
    Ok(content.trim().to_string())
}

/// The message list sent upstream: system instructions, then the
/// caller's history as-is, then the new user message. History is never
/// truncated.
pub fn compose_messages(instructions: &str, history: &History, user_message: &str) -> Vec<Entry> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::new(Role::System, instructions).into());
    messages.extend(history.iter().cloned());
    messages.push(Message::new(Role::User, user_message).into());
    messages
}
