/*!
 * Parsing of batch translation replies.
 *
 * The model is asked for a JSON array of `{"id", "text"}` items. Replies are
 * read as leniently as possible and never fail: whatever cannot be matched to
 * a request position keeps its source text, and the result always has exactly
 * as many texts as the request.
 *
 * Reading order:
 * 1. JSON (after removing a Markdown code fence). An array is used directly;
 *    an object wrapping a single array is unwrapped.
 * 2. Salvage of complete `{...}` objects from broken JSON (truncated replies,
 *    chatter around the array).
 * 3. Line heuristics: drop structural lines, strip field labels and quotes,
 *    then pad or truncate to the expected count.
 */

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Flat JSON object, used to salvage items from an unparsable reply
static FLAT_OBJECT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^{}]*\}").unwrap()
});

/// Opening Markdown code fence with an optional language tag
static CODE_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^```[A-Za-z0-9_-]*\s*\n").unwrap()
});

/// Something that went wrong with a batch but was absorbed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchWarning {
    /// The service call failed; the whole batch kept its source texts
    ServiceFailed(String),
    /// The reply was not valid JSON and was recovered heuristically
    UnstructuredReply,
    /// These positions got no translation and kept their source text
    MissingIds(Vec<usize>),
    /// Reply items that were malformed or out of range
    IgnoredItems(usize),
    /// Line recovery found a different number of texts than expected
    CountAdjusted {
        /// Number of texts in the request
        expected: usize,
        /// Number of texts recovered from the reply
        recovered: usize,
    },
}

impl fmt::Display for BatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceFailed(message) => write!(f, "translation request failed, using original texts: {}", message),
            Self::UnstructuredReply => write!(f, "reply was not valid JSON, used fallback parsing"),
            Self::MissingIds(ids) => write!(f, "no translation for id(s) {:?}, kept original text", ids),
            Self::IgnoredItems(count) => write!(f, "ignored {} malformed or out-of-range reply item(s)", count),
            Self::CountAdjusted { expected, recovered } => write!(
                f,
                "recovered {} text(s) for {} entries, padded or truncated to fit",
                recovered, expected
            ),
        }
    }
}

/// Texts for one batch plus whatever was absorbed while producing them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// One text per request position
    pub texts: Vec<String>,
    /// Degradations that happened, in the order they were detected
    pub warnings: Vec<BatchWarning>,
}

impl BatchOutcome {
    /// Outcome that keeps every source text
    pub fn originals<S: AsRef<str>>(originals: &[S], warning: BatchWarning) -> Self {
        Self {
            texts: originals.iter().map(|s| s.as_ref().to_string()).collect(),
            warnings: vec![warning],
        }
    }

    /// True when the reply mapped cleanly onto every position
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Turn a reply into exactly `originals.len()` texts
pub fn parse_reply<S: AsRef<str>>(reply: &str, originals: &[S]) -> BatchOutcome {
    let body = strip_code_fence(reply.trim());

    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            let items = match value {
                Value::Array(items) => items,
                Value::Object(map) => unwrap_single_array(map),
                _ => Vec::new(),
            };
            place_items(&items, originals, Vec::new())
        }
        Err(_) => recover_unstructured(body, originals),
    }
}

/// Best-effort recovery for a reply that is not valid JSON
pub fn recover_unstructured<S: AsRef<str>>(reply: &str, originals: &[S]) -> BatchOutcome {
    let salvaged: Vec<Value> = FLAT_OBJECT_REGEX
        .find_iter(reply)
        .filter_map(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .filter(|v| item_parts(v).is_some())
        .collect();

    if !salvaged.is_empty() {
        return place_items(&salvaged, originals, vec![BatchWarning::UnstructuredReply]);
    }

    recover_lines(reply, originals)
}

/// Line-oriented fallback: one translated text per meaningful line
pub fn recover_lines<S: AsRef<str>>(reply: &str, originals: &[S]) -> BatchOutcome {
    let mut texts: Vec<String> = reply
        .lines()
        .filter_map(clean_line)
        .collect();

    let mut warnings = vec![BatchWarning::UnstructuredReply];
    let recovered = texts.len();
    if recovered != originals.len() {
        warnings.push(BatchWarning::CountAdjusted {
            expected: originals.len(),
            recovered,
        });
    }

    texts.truncate(originals.len());
    while texts.len() < originals.len() {
        texts.push(originals[texts.len()].as_ref().to_string());
    }

    BatchOutcome { texts, warnings }
}

fn clean_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty()
        || line.starts_with('{')
        || line.starts_with('[')
        || line.starts_with('}')
        || line.starts_with(']')
        || line.starts_with("\"id\"")
        || line.starts_with("```")
    {
        return None;
    }

    let stripped = line.replace("\"text\":", "").replace('"', "");
    let mut cleaned = stripped.trim();
    if let Some(rest) = cleaned.strip_prefix(": ") {
        cleaned = rest;
    }
    subtitle_text(cleaned.trim_end_matches(','))
}

/// Make a translated text safe to write as the body of an SRT block
///
/// Blank lines would end the block early, so they are dropped along with
/// trailing whitespace on each line. `None` when nothing is left.
fn subtitle_text(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn strip_code_fence(reply: &str) -> &str {
    match CODE_FENCE_REGEX.find(reply) {
        Some(fence) => reply[fence.end()..]
            .trim_end()
            .trim_end_matches("```")
            .trim(),
        None => reply,
    }
}

// `{"translations": [...]}` and similar single-array wrappers
fn unwrap_single_array(map: Map<String, Value>) -> Vec<Value> {
    if item_parts(&Value::Object(map.clone())).is_some() {
        return vec![Value::Object(map)];
    }

    let mut arrays = map.into_iter().filter_map(|(_, v)| match v {
        Value::Array(items) => Some(items),
        _ => None,
    });

    match (arrays.next(), arrays.next()) {
        (Some(items), None) => items,
        _ => Vec::new(),
    }
}

fn item_parts(value: &Value) -> Option<(usize, &str)> {
    let object = value.as_object()?;
    let id = match object.get("id")? {
        Value::Number(n) => usize::try_from(n.as_u64()?).ok()?,
        Value::String(s) => s.trim().parse::<usize>().ok()?,
        _ => return None,
    };
    let text = object.get("text")?.as_str()?;
    Some((id, text))
}

fn place_items<S: AsRef<str>>(items: &[Value], originals: &[S], mut warnings: Vec<BatchWarning>) -> BatchOutcome {
    let mut slots: Vec<Option<String>> = vec![None; originals.len()];
    let mut ignored = 0;

    for item in items {
        match item_parts(item) {
            Some((id, text)) if id < slots.len() => {
                // A blank text counts as no answer and never replaces an earlier one
                if let Some(text) = subtitle_text(text) {
                    slots[id] = Some(text);
                }
            }
            _ => ignored += 1,
        }
    }

    if ignored > 0 {
        warnings.push(BatchWarning::IgnoredItems(ignored));
    }

    let missing: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none())
        .map(|(id, _)| id)
        .collect();
    if !missing.is_empty() {
        warnings.push(BatchWarning::MissingIds(missing));
    }

    let texts = slots
        .into_iter()
        .zip(originals)
        .map(|(slot, original)| slot.unwrap_or_else(|| original.as_ref().to_string()))
        .collect();

    BatchOutcome { texts, warnings }
}
