use std::collections::HashSet;
use std::fmt;

use indexmap::{IndexMap, IndexSet};

use super::{END_MARK, EPSILON};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(String),
    NonTerminal(String),
    /// The empty symbol `&` (epsilon).
    Empty,
    /// The end-of-input marker `$`.
    End,
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::NonTerminal(name) => name.as_str(),
            Symbol::Empty => EPSILON,
            Symbol::End => END_MARK,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Symbol::Empty)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One alternative of a rewrite rule. The empty production is the single
/// empty symbol, never a zero-length sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production(Vec<Symbol>);

impl Production {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        if symbols.is_empty() {
            Production::empty()
        } else {
            Production(symbols)
        }
    }

    pub fn empty() -> Self {
        Production(vec![Symbol::Empty])
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn is_empty_production(&self) -> bool {
        self.0 == [Symbol::Empty]
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|s| s.name()).collect();
        f.write_str(&names.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    NoInitialSymbol,
    NoProductions,
    EmptyAlternatives(String),
    ReservedSymbol(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::NoInitialSymbol => write!(f, "grammar with no initial symbol"),
            GrammarError::NoProductions => write!(f, "grammar with no productions"),
            GrammarError::EmptyAlternatives(name) => {
                write!(f, "non-terminal \"{}\" has no alternatives", name)
            }
            GrammarError::ReservedSymbol(name) => {
                write!(f, "\"{}\" is reserved and cannot be defined", name)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// A context-free grammar. Built once, then only read; the transforms in
/// `transform` return fresh values instead of rewriting in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    initial_symbol: String,
    productions: IndexMap<String, IndexSet<Production>>,
    terminals: HashSet<String>,
}

impl Grammar {
    /// Builds a grammar from a raw name-based mapping. Keys become the
    /// non-terminals; every other right-hand-side name becomes a terminal,
    /// except `&` which is the empty symbol. `$` is rejected everywhere.
    pub fn create(
        initial_symbol: &str,
        rules: IndexMap<String, Vec<Vec<String>>>,
    ) -> Result<Self, GrammarError> {
        if rules.is_empty() {
            return Err(GrammarError::NoProductions);
        }
        if !rules.contains_key(initial_symbol) {
            return Err(GrammarError::NoInitialSymbol);
        }

        let non_terminals: HashSet<&String> = rules.keys().collect();
        for name in &non_terminals {
            if name.as_str() == EPSILON || name.as_str() == END_MARK {
                return Err(GrammarError::ReservedSymbol(name.to_string()));
            }
        }

        let mut productions: IndexMap<String, IndexSet<Production>> = IndexMap::new();
        let mut terminals: HashSet<String> = HashSet::new();
        for (left, alternatives) in &rules {
            if alternatives.is_empty() {
                return Err(GrammarError::EmptyAlternatives(left.clone()));
            }
            let mut set = IndexSet::new();
            for alternative in alternatives {
                let mut symbols = Vec::with_capacity(alternative.len());
                for name in alternative {
                    symbols.push(match name.as_str() {
                        EPSILON => Symbol::Empty,
                        END_MARK => return Err(GrammarError::ReservedSymbol(name.clone())),
                        _ if non_terminals.contains(name) => Symbol::NonTerminal(name.clone()),
                        _ => {
                            terminals.insert(name.clone());
                            Symbol::Terminal(name.clone())
                        }
                    });
                }
                set.insert(Production::new(symbols));
            }
            productions.insert(left.clone(), set);
        }

        Ok(Grammar {
            initial_symbol: initial_symbol.to_string(),
            productions,
            terminals,
        })
    }

    pub fn initial_symbol(&self) -> &str {
        &self.initial_symbol
    }

    pub fn productions(&self) -> &IndexMap<String, IndexSet<Production>> {
        &self.productions
    }

    pub fn alternatives(&self, non_terminal: &str) -> Option<&IndexSet<Production>> {
        self.productions.get(non_terminal)
    }

    pub fn non_terminals(&self) -> impl Iterator<Item = &str> {
        self.productions.keys().map(|k| k.as_str())
    }

    pub fn terminals(&self) -> &HashSet<String> {
        &self.terminals
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.productions.contains_key(name)
    }

    /// Classifies a single name against this grammar.
    pub fn symbol(&self, name: &str) -> Symbol {
        match name {
            EPSILON => Symbol::Empty,
            END_MARK => Symbol::End,
            _ if self.is_non_terminal(name) => Symbol::NonTerminal(name.to_string()),
            _ => Symbol::Terminal(name.to_string()),
        }
    }

    /// Classifies a whitespace-delimited sequence of names.
    pub fn sentence(&self, text: &str) -> Vec<Symbol> {
        text.split_whitespace().map(|name| self.symbol(name)).collect()
    }

    /// Appends `'` to `name` until it collides with no existing symbol.
    pub fn prime_name(&self, mut name: String) -> String {
        while self.productions.contains_key(&name) || self.terminals.contains(&name) {
            name.push('\'');
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules(pairs: &[(&str, &[&[&str]])]) -> IndexMap<String, Vec<Vec<String>>> {
        pairs
            .iter()
            .map(|(left, alternatives)| {
                (
                    left.to_string(),
                    alternatives
                        .iter()
                        .map(|a| a.iter().map(|s| s.to_string()).collect())
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn create_derives_terminals_and_non_terminals() {
        let g = Grammar::create(
            "E",
            rules(&[
                ("E", &[&["T", "E'"]]),
                ("E'", &[&["+", "T", "E'"], &["&"]]),
                ("T", &[&["id"]]),
            ]),
        )
        .unwrap();

        let mut non_terminals: Vec<&str> = g.non_terminals().collect();
        non_terminals.sort();
        assert_eq!(non_terminals, vec!["E", "E'", "T"]);

        let mut terminals: Vec<&String> = g.terminals().iter().collect();
        terminals.sort();
        assert_eq!(terminals, vec!["+", "id"]);

        assert_eq!(g.symbol("E'"), Symbol::NonTerminal("E'".to_string()));
        assert_eq!(g.symbol("id"), Symbol::Terminal("id".to_string()));
        assert_eq!(g.symbol("&"), Symbol::Empty);
        assert_eq!(g.symbol("$"), Symbol::End);
    }

    #[test]
    fn create_rejects_empty_mapping() {
        let result = Grammar::create("S", rules(&[]));
        assert_eq!(result.unwrap_err(), GrammarError::NoProductions);
    }

    #[test]
    fn create_rejects_unknown_initial_symbol() {
        let result = Grammar::create("S", rules(&[("A", &[&["a"]])]));
        assert_eq!(result.unwrap_err(), GrammarError::NoInitialSymbol);
    }

    #[test]
    fn create_rejects_non_terminal_without_alternatives() {
        let result = Grammar::create("S", rules(&[("S", &[&["a"]]), ("A", &[])]));
        assert_eq!(
            result.unwrap_err(),
            GrammarError::EmptyAlternatives("A".to_string())
        );
    }

    #[test]
    fn create_rejects_reserved_names() {
        let result = Grammar::create("&", rules(&[("&", &[&["a"]])]));
        assert_eq!(
            result.unwrap_err(),
            GrammarError::ReservedSymbol("&".to_string())
        );

        let result = Grammar::create("S", rules(&[("S", &[&["a", "$"]])]));
        assert_eq!(
            result.unwrap_err(),
            GrammarError::ReservedSymbol("$".to_string())
        );
    }

    #[test]
    fn duplicate_alternatives_collapse() {
        let g = Grammar::create("S", rules(&[("S", &[&["a"], &["a"], &["b"]])])).unwrap();
        assert_eq!(g.alternatives("S").unwrap().len(), 2);
    }

    #[test]
    fn empty_alternative_normalizes_to_the_empty_symbol() {
        let g = Grammar::create("S", rules(&[("S", &[&[]])])).unwrap();
        let alternatives = g.alternatives("S").unwrap();
        assert!(alternatives.contains(&Production::empty()));
    }

    #[test]
    fn prime_name_skips_taken_names() {
        let g = Grammar::create("S", rules(&[("S", &[&["S'"]]), ("S'", &[&["a"]])])).unwrap();
        assert_eq!(g.prime_name("S".to_string()), "S''");
    }
}
