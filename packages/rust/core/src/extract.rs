//! Question extraction: numbered markdown blocks → [`QuestionRecord`]s.
//!
//! A question starts on a line beginning with `<number>.` followed by
//! whitespace. Its text runs until the first line that opens with `(a)`;
//! lettered lines from there on are options.
//!
//! ```text
//! 12. Which of these is prime?
//! (a) 4
//! (b) 7
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use quizsheet_markup::{Profile, normalize};
use quizsheet_shared::{QuestionOption, QuestionRecord, QuestionType, columns};
use quizsheet_tabular::{Cell, Table};

/// Parse a question document into records, in document order.
///
/// Blocks without a leading number (titles, instructions) are dropped.
#[instrument(skip_all, fields(len = markdown.len()))]
pub fn parse_questions(markdown: &str) -> Vec<QuestionRecord> {
    let markdown = markdown.replace("\r\n", "\n");
    let mut records = Vec::new();

    for block in split_blocks(&markdown) {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let Some((number, body)) = split_number(block) else {
            debug!(
                preview = %block.chars().take(40).collect::<String>(),
                "skipping block without a question number"
            );
            continue;
        };

        let options = parse_options(body);
        let kind = if options.is_empty() {
            QuestionType::ShortAnswer
        } else {
            QuestionType::MultipleChoice
        };

        records.push(QuestionRecord {
            serial: records.len() + 1,
            number,
            text: normalize(question_text(body), Profile::Extraction),
            kind,
            options,
            answer: String::new(),
            explanation: String::new(),
        });
    }

    debug!(count = records.len(), "parsed questions");
    records
}

/// Build the extractor's sheet from parsed records.
pub fn records_to_table(records: &[QuestionRecord]) -> Table {
    let mut table = Table::new(columns::EXTRACTOR_SCHEMA);

    for record in records {
        table.push_row(vec![
            Cell::Int(record.serial as i64),
            Cell::Int(i64::from(record.number)),
            Cell::from(record.text.as_str()),
            Cell::from(record.kind.label()),
            Cell::from(record.options_cell()),
            Cell::from(record.answer.as_str()),
            Cell::from(record.explanation.as_str()),
        ]);
    }

    table
}

// ---------------------------------------------------------------------------
// Block splitting
// ---------------------------------------------------------------------------

/// Split at every newline directly followed by `<digits>.<whitespace>`.
///
/// The newline is dropped; the numbered line opens the next block.
fn split_blocks(markdown: &str) -> Vec<&str> {
    static BOUNDARY: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n[0-9]+\.\s").expect("valid regex"));

    let mut blocks = Vec::new();
    let mut start = 0;

    // The whitespace after the period may itself be a newline that opens
    // the next boundary, so matching resumes right after each newline.
    while let Some(m) = BOUNDARY.find_at(markdown, start) {
        blocks.push(&markdown[start..m.start()]);
        start = m.start() + 1;
    }
    blocks.push(&markdown[start..]);

    blocks
}

/// Leading question number and the text after it.
fn split_number(block: &str) -> Option<(u32, &str)> {
    static HEAD: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^([0-9]+)\.\s*").expect("valid regex"));

    let caps = HEAD.captures(block)?;
    let number = caps[1].parse().ok()?;
    let end = caps.get(0)?.end();
    Some((number, &block[end..]))
}

/// Question text: everything before the first line opening with `(a)`.
fn question_text(body: &str) -> &str {
    static FIRST_OPTION: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n\s*\(a\)").expect("valid regex"));

    match FIRST_OPTION.find(body) {
        Some(m) => &body[..m.start()],
        None => body,
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Collect lettered options from the block body.
///
/// A line starting with `(x)` opens an option. Following lines continue it
/// up to the next option line or the first blank line; text after a blank
/// line (a set heading, instructions) belongs to no option. Inside an
/// option, `(y)` preceded by whitespace opens the next option only when `y`
/// follows `x` in the alphabet and `y` has no option line of its own, so
/// `(a) 1 (b) 2` splits but `(a) f (x)` does not. Options with no text are
/// dropped.
fn parse_options(body: &str) -> Vec<QuestionOption> {
    static OPTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*\(\s*([a-zA-Z])\s*\)\s*(.*)$").expect("valid regex")
    });

    let mut raw: Vec<(char, String)> = Vec::new();
    let mut open = false;

    for line in body.lines() {
        if let Some(caps) = OPTION_LINE.captures(line) {
            let label = lowercase_label(&caps[1]);
            raw.push((label, caps[2].to_string()));
            open = true;
        } else if line.trim().is_empty() {
            open = false;
        } else if open {
            if let Some((_, text)) = raw.last_mut() {
                text.push('\n');
                text.push_str(line);
            }
        } else if !raw.is_empty() {
            debug!(line, "dropping text after the option list");
        }
    }

    let own_lines: HashSet<char> = raw.iter().map(|(label, _)| *label).collect();

    raw.into_iter()
        .flat_map(|(label, text)| split_inline(label, &text, &own_lines))
        .map(|(label, text)| QuestionOption {
            label,
            text: normalize(&text, Profile::Extraction),
        })
        .filter(|option| !option.text.is_empty())
        .collect()
}

/// Split `(a) 1 (b) 2` style text into consecutive options. Labels in
/// `own_lines` already have an option line and never split.
fn split_inline(label: char, text: &str, own_lines: &HashSet<char>) -> Vec<(char, String)> {
    static INLINE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?:^|\s)\(\s*([a-zA-Z])\s*\)").expect("valid regex")
    });

    let mut parts = Vec::new();
    let mut current = label;
    let mut start = 0;

    for caps in INLINE_MARKER.captures_iter(text) {
        let marker = lowercase_label(&caps[1]);
        if Some(marker) != next_label(current) || own_lines.contains(&marker) {
            continue;
        }
        let Some(m) = caps.get(0) else { continue };
        parts.push((current, text[start..m.start()].to_string()));
        current = marker;
        start = m.end();
    }
    parts.push((current, text[start..].to_string()));

    parts
}

fn lowercase_label(s: &str) -> char {
    s.chars()
        .next()
        .map(|c| c.to_ascii_lowercase())
        .unwrap_or('a')
}

fn next_label(label: char) -> Option<char> {
    if label.is_ascii_lowercase() && label != 'z' {
        char::from_u32(label as u32 + 1)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
