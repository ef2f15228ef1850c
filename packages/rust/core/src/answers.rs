//! Answer-key and worked-solution parsers.
//!
//! Both produce `(question number, text)` pairs in document order; grouping
//! into sections happens in [`crate::sections`].

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

/// Parse an answer key.
///
/// Per line, first match wins:
/// 1. `12. (c)`: a lettered answer (a–d), lowercased
/// 2. `12. 3/4 cm`: free text, unless it is a bare letter a–d
///
/// Anything else (headings, blank lines, `3. b`) is ignored.
#[instrument(skip_all, fields(len = text.len()))]
pub fn parse_answer_key(text: &str) -> Vec<(u32, String)> {
    static LETTERED: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^\s*([0-9]+)\.\s*\(\s*([abcd])\s*\)").expect("valid regex")
    });
    static FREEFORM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*([0-9]+)\.\s*(.+)$").expect("valid regex"));
    static BARE_LETTER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)^[abcd]$").expect("valid regex"));

    let mut pairs = Vec::new();

    for line in text.lines() {
        if let Some(caps) = LETTERED.captures(line) {
            if let Ok(number) = caps[1].parse::<u32>() {
                pairs.push((number, caps[2].to_ascii_lowercase()));
                continue;
            }
        }

        let Some(caps) = FREEFORM.captures(line) else {
            continue;
        };
        let rest = caps[2].trim();
        if rest.is_empty() || BARE_LETTER.is_match(rest) {
            debug!(line, "ignoring answer line");
            continue;
        }
        match caps[1].parse::<u32>() {
            Ok(number) => pairs.push((number, rest.to_string())),
            Err(_) => debug!(line, "answer number out of range"),
        }
    }

    debug!(count = pairs.len(), "parsed answer key");
    pairs
}

/// Parse a worked-solutions document.
///
/// A line starting with `<number>.` opens an entry; that line's remainder
/// and every following line up to the next numbered line belong to it.
/// Text before the first numbered line is dropped. Entries are trimmed but
/// keep their interior newlines.
#[instrument(skip_all, fields(len = text.len()))]
pub fn parse_solutions(text: &str) -> Vec<(u32, String)> {
    static NUMBERED: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*([0-9]+)\.\s*(.*)").expect("valid regex"));

    let mut pairs = Vec::new();
    let mut current: Option<(u32, String)> = None;

    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);

        let opened = NUMBERED
            .captures(content)
            .and_then(|caps| Some((caps[1].parse::<u32>().ok()?, caps[2].to_string())));

        if let Some((number, first)) = opened {
            if let Some((n, body)) = current.take() {
                pairs.push((n, body.trim().to_string()));
            }
            current = Some((number, format!("{first}\n")));
        } else if let Some((_, body)) = current.as_mut() {
            body.push_str(line);
        }
    }

    if let Some((n, body)) = current {
        pairs.push((n, body.trim().to_string()));
    }

    debug!(count = pairs.len(), "parsed solutions");
    pairs
}
