//! Section grouping by question-number restarts.
//!
//! A document may hold several question sets, each numbered from 1. A new
//! section begins whenever number 1 shows up after at least one entry. The
//! Nth section of one document is paired with the Nth section of another
//! purely by position; nothing checks that they describe the same set.

use std::collections::BTreeMap;

/// Entries of one section, keyed by question number. A repeated number
/// inside a section keeps the last value.
pub type Section = BTreeMap<u32, String>;

/// Group `(number, value)` pairs into sections.
pub fn split_into_sections<I>(pairs: I) -> Vec<Section>
where
    I: IntoIterator<Item = (u32, String)>,
{
    let mut sections = Vec::new();
    let mut current = Section::new();

    for (number, value) in pairs {
        if number == 1 && !current.is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        current.insert(number, value);
    }

    if !current.is_empty() {
        sections.push(current);
    }

    sections
}

/// Tracks the section index while walking table rows top to bottom.
///
/// The index moves forward each time number 1 follows any previously seen
/// number. Rows that never reach [`SectionCursor::advance`] leave the state
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct SectionCursor {
    previous: Option<u32>,
    index: usize,
}

impl SectionCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the next row's question number and return its section index.
    pub fn advance(&mut self, number: u32) -> usize {
        if number == 1 && self.previous.is_some() {
            self.index += 1;
        }
        self.previous = Some(number);
        self.index
    }

    /// Current section index.
    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(numbers: &[u32]) -> Vec<(u32, String)> {
        numbers.iter().map(|n| (*n, format!("v{n}"))).collect()
    }

    #[test]
    fn restart_at_one_opens_section() {
        let sections = split_into_sections(pairs(&[1, 2, 3, 1, 2]));
        let sizes: Vec<usize> = sections.iter().map(Section::len).collect();
        assert_eq!(sizes, vec![3, 2]);
    }

    #[test]
    fn leading_one_does_not_open_empty_section() {
        let sections = split_into_sections(pairs(&[1, 1, 1]));
        assert_eq!(sections.len(), 3);
        assert!(sections.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn document_not_starting_at_one() {
        let sections = split_into_sections(pairs(&[4, 5, 1, 2]));
        assert_eq!(sections.len(), 2);
        assert!(sections[0].contains_key(&4));
        assert!(sections[1].contains_key(&2));
    }

    #[test]
    fn duplicate_number_overwrites_within_section() {
        let sections =
            split_into_sections(vec![(2, "first".to_string()), (2, "second".to_string())]);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0][&2], "second");
    }

    #[test]
    fn empty_input() {
        assert!(split_into_sections(Vec::new()).is_empty());
    }

    #[test]
    fn cursor_counts_restarts() {
        let mut cursor = SectionCursor::new();
        let indexes: Vec<usize> = [1, 2, 3, 1, 2, 1].iter().map(|n| cursor.advance(*n)).collect();
        assert_eq!(indexes, vec![0, 0, 0, 1, 1, 2]);
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn cursor_first_row_never_advances() {
        let mut cursor = SectionCursor::new();
        assert_eq!(cursor.advance(1), 0);
        assert_eq!(cursor.advance(1), 1);
    }
}
