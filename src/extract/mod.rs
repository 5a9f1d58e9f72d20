// src/extract/mod.rs

//! Pulls a JSON object out of free-form model text.
//!
//! Strategies run in a fixed order, cheapest and safest first:
//! 1. the whole trimmed text,
//! 2. each markdown fenced block (```` ```json ```` or bare ```` ``` ````),
//! 3. the span from the first `{` to the last `}`.
//!
//! Only JSON objects count; a bare array or scalar is treated as not found.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no JSON object found in model output")]
    NoJsonFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Fenced,
    BraceSpan,
}

pub const STRATEGIES: [Strategy; 3] = [Strategy::Direct, Strategy::Fenced, Strategy::BraceSpan];

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid")
});

/// Parse the first JSON object any strategy can find.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    extract_with_strategy(text).map(|(value, _)| value)
}

/// Like [`extract_json`], also reporting which strategy succeeded.
///
/// `Direct` always sees the whole trimmed text; the fallbacks skip a leading
/// `<think>` block first.
pub fn extract_with_strategy(text: &str) -> Result<(Value, Strategy), ExtractError> {
    let text = text.trim();
    let answer = strip_think(text);
    STRATEGIES
        .iter()
        .find_map(|&strategy| {
            let input = match strategy {
                Strategy::Direct => text,
                Strategy::Fenced | Strategy::BraceSpan => answer,
            };
            apply(strategy, input).map(|value| (value, strategy))
        })
        .ok_or(ExtractError::NoJsonFound)
}

pub fn apply(strategy: Strategy, text: &str) -> Option<Value> {
    match strategy {
        Strategy::Direct => parse_object(text),
        Strategy::Fenced => fenced(text),
        Strategy::BraceSpan => brace_span(text),
    }
}

fn fenced(text: &str) -> Option<Value> {
    FENCE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|body| parse_object(body.as_str()))
}

fn brace_span(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&text[start..=end])
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

// Reasoning models may prefix the answer with a <think>...</think> block.
fn strip_think(text: &str) -> &str {
    text.strip_prefix("<think>")
        .and_then(|rest| rest.split_once("</think>"))
        .map_or(text, |(_, answer)| answer.trim())
}
