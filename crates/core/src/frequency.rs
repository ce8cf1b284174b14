//! Symbol frequency analysis.
//!
//! Counts every `char` of the input. Entries are kept in first-occurrence
//! order so that tree construction can break frequency ties deterministically.

use std::collections::HashMap;

/// Occurrence counts per symbol, in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(char, u64)>,
}

impl FrequencyTable {
    /// Count the symbols of `text`.
    ///
    /// Empty input yields an empty table.
    pub fn from_text(text: &str) -> Self {
        let mut index: HashMap<char, usize> = HashMap::new();
        let mut entries: Vec<(char, u64)> = Vec::new();

        for symbol in text.chars() {
            match index.get(&symbol) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(symbol, entries.len());
                    entries.push((symbol, 1));
                }
            }
        }

        Self { entries }
    }

    /// Count for `symbol`, or 0 if it never occurred.
    pub fn get(&self, symbol: char) -> u64 {
        self.entries
            .iter()
            .find(|(s, _)| *s == symbol)
            .map_or(0, |(_, count)| *count)
    }

    /// Iterate `(symbol, count)` pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts (the input length in chars).
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let freqs = FrequencyTable::from_text("aaabbc");
        assert_eq!(freqs.get('a'), 3);
        assert_eq!(freqs.get('b'), 2);
        assert_eq!(freqs.get('c'), 1);
        assert_eq!(freqs.get('z'), 0);
        assert_eq!(freqs.len(), 3);
        assert_eq!(freqs.total(), 6);
    }

    #[test]
    fn test_first_occurrence_order() {
        let freqs = FrequencyTable::from_text("cabbac");
        let symbols: Vec<char> = freqs.iter().map(|(s, _)| s).collect();
        assert_eq!(symbols, vec!['c', 'a', 'b']);
    }

    #[test]
    fn test_empty_input() {
        let freqs = FrequencyTable::from_text("");
        assert!(freqs.is_empty());
        assert_eq!(freqs.total(), 0);
    }

    #[test]
    fn test_unicode_symbols() {
        let freqs = FrequencyTable::from_text("héé✓\n");
        assert_eq!(freqs.get('é'), 2);
        assert_eq!(freqs.get('✓'), 1);
        assert_eq!(freqs.get('\n'), 1);
        assert_eq!(freqs.len(), 4);
    }
}
