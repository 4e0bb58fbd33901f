use indexmap::IndexMap;
use log::warn;

use super::{Grammar, GrammarError};

impl Grammar {
    /// Reads the line-oriented `LHS -> alt1 | alt2` format. Malformed lines
    /// and empty alternatives are dropped with a warning; the left side of
    /// the first well-shaped line becomes the initial symbol.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut initial_symbol: Option<&str> = None;
        let mut rules: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();

        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }

            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() == 1 {
                warn!("line {}: no \"->\", skipping: {}", i + 1, line.trim());
                continue;
            }
            if parts.len() > 2 {
                warn!("line {}: too many \"->\", skipping: {}", i + 1, line.trim());
                continue;
            }

            let left = parts[0].trim();
            if left.is_empty() {
                warn!("line {}: empty left side, skipping", i + 1);
                continue;
            }
            if left.split_whitespace().count() != 1 {
                warn!("line {}: left side contains whitespace, skipping", i + 1);
                continue;
            }

            // The first well-shaped line claims the initial symbol even if
            // all of its alternatives turn out to be empty.
            if initial_symbol.is_none() {
                initial_symbol = Some(left);
            }

            let mut alternatives: Vec<Vec<String>> = Vec::new();
            for alternative in parts[1].split('|') {
                if alternative.trim().is_empty() {
                    warn!("line {}: empty alternative, skipping", i + 1);
                    continue;
                }
                alternatives.push(
                    alternative
                        .split_whitespace()
                        .map(|s| s.to_string())
                        .collect(),
                );
            }

            if alternatives.is_empty() {
                warn!("line {}: no surviving alternatives, skipping", i + 1);
                continue;
            }

            // A repeated left side replaces the earlier entry.
            rules.insert(left.to_string(), alternatives);
        }

        let initial_symbol = initial_symbol.ok_or(GrammarError::NoInitialSymbol)?;
        Grammar::create(initial_symbol, rules)
    }
}
