//! Language utilities for ISO language code handling
//!
//! Languages can be given on the command line either as ISO 639-1/639-2
//! codes ("fr", "fra", "fre") or as plain names ("French"). Codes are turned
//! into English names before they reach a prompt; names pass through.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Map an ISO 639-2/B code to its ISO 639-2/T form
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    let part2t = match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => return None,
    };
    Some(part2t)
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = bibliographic_to_terminology(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Name to use for a language in translation instructions
///
/// Recognized ISO codes become their English name, anything else
/// (already a name, or a regional variant like "pt-BR") is kept as given.
pub fn prompt_language_name(language: &str) -> String {
    let trimmed = language.trim();
    get_language_name(trimmed).unwrap_or_else(|_| trimmed.to_string())
}

/// Whether two user-supplied languages denote the same language
///
/// Compares codes through ISO normalization and names case-insensitively.
pub fn same_language(a: &str, b: &str) -> bool {
    language_codes_match(a, b)
        || prompt_language_name(a).eq_ignore_ascii_case(&prompt_language_name(b))
}
