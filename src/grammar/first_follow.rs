use std::collections::HashSet;

use super::{Grammar, Symbol};

impl Grammar {
    /// FIRST of a symbol sequence: the terminals that can begin a string
    /// derived from it, plus the empty symbol when the whole sequence can
    /// derive empty.
    pub fn first(&self, sentence: &[Symbol]) -> HashSet<Symbol> {
        self.first_guarded(sentence, &mut HashSet::new())
    }

    fn first_guarded(
        &self,
        sentence: &[Symbol],
        visited: &mut HashSet<Vec<Symbol>>,
    ) -> HashSet<Symbol> {
        let mut first = HashSet::new();
        visited.insert(sentence.to_vec());

        for y in sentence {
            let name = match y {
                Symbol::NonTerminal(name) => name,
                // FIRST of anything else is the symbol itself.
                other => {
                    visited.remove(sentence);
                    first.insert(other.clone());
                    return first;
                }
            };

            // A sentence already being expanded contributes nothing.
            let mut first_y = HashSet::new();
            if let Some(alternatives) = self.alternatives(name) {
                for alternative in alternatives {
                    if !visited.contains(alternative.symbols()) {
                        first_y.extend(self.first_guarded(alternative.symbols(), visited));
                    }
                }
            }

            let nullable = first_y.remove(&Symbol::Empty);
            first.extend(first_y);
            if !nullable {
                visited.remove(sentence);
                return first;
            }
        }

        visited.remove(sentence);
        // the scan ran off the end, so every symbol can derive empty
        first.insert(Symbol::Empty);
        first
    }

    /// The non-terminals that can appear as the leading non-terminal in some
    /// derivation of `symbol`, the symbol itself included when it is directly
    /// self-referencing. Used for left-recursion detection.
    pub fn first_non_terminal(&self, symbol: &Symbol) -> HashSet<Symbol> {
        self.first_non_terminal_guarded(symbol, &mut HashSet::new())
    }

    fn first_non_terminal_guarded(
        &self,
        symbol: &Symbol,
        visited: &mut HashSet<Symbol>,
    ) -> HashSet<Symbol> {
        let name = match symbol {
            Symbol::NonTerminal(name) => name,
            Symbol::Empty => return HashSet::from([Symbol::Empty]),
            _ => return HashSet::new(),
        };

        visited.insert(symbol.clone());
        let mut first = HashSet::new();

        if let Some(alternatives) = self.alternatives(name) {
            for alternative in alternatives {
                let mut exhausted = true;
                for y in alternative.symbols() {
                    if y.is_non_terminal() {
                        first.insert(y.clone());
                    }
                    if visited.contains(y) {
                        continue;
                    }
                    let first_y = self.first_non_terminal_guarded(y, visited);
                    let nullable = first_y.contains(&Symbol::Empty);
                    first.extend(first_y.into_iter().filter(|s| !s.is_empty()));
                    if !nullable {
                        exhausted = false;
                        break;
                    }
                }
                if exhausted {
                    first.insert(Symbol::Empty);
                }
            }
        }

        visited.remove(symbol);
        first
    }

    /// FOLLOW of a symbol: the terminals (and possibly `$`) that can appear
    /// immediately after it in some derivation from the initial symbol.
    pub fn follow(&self, symbol: &Symbol) -> HashSet<Symbol> {
        self.follow_guarded(symbol, &mut HashSet::new())
    }

    fn follow_guarded(&self, symbol: &Symbol, visited: &mut HashSet<Symbol>) -> HashSet<Symbol> {
        let mut follow = HashSet::new();
        visited.insert(symbol.clone());

        if symbol.is_non_terminal() && symbol.name() == self.initial_symbol() {
            follow.insert(Symbol::End);
        }

        for (producer, alternatives) in self.productions() {
            for alternative in alternatives {
                let symbols = alternative.symbols();
                for (i, occurrence) in symbols.iter().enumerate() {
                    if occurrence != symbol {
                        continue;
                    }
                    // FIRST over the suffix after this occurrence, falling
                    // through to FOLLOW of the producer while nullable.
                    let mut exhausted = true;
                    for y in &symbols[i + 1..] {
                        let first = self.first(std::slice::from_ref(y));
                        let nullable = first.contains(&Symbol::Empty);
                        follow.extend(first.into_iter().filter(|s| !s.is_empty()));
                        if !nullable {
                            exhausted = false;
                            break;
                        }
                    }
                    if exhausted {
                        let producer = Symbol::NonTerminal(producer.clone());
                        if producer != *symbol && !visited.contains(&producer) {
                            follow.extend(self.follow_guarded(&producer, visited));
                        }
                    }
                }
            }
        }

        visited.remove(symbol);
        follow
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use crate::grammar::{Grammar, Symbol};

    fn set(g: &Grammar, names: &[&str]) -> HashSet<Symbol> {
        names.iter().map(|name| g.symbol(name)).collect()
    }

    fn expression_grammar() -> Grammar {
        Grammar::parse("E -> T E'\nE' -> + T E' | &\nT -> id").unwrap()
    }

    #[test]
    fn first_of_terminal_is_itself() {
        let g = expression_grammar();
        assert_eq!(g.first(&g.sentence("id")), set(&g, &["id"]));
        assert_eq!(g.first(&g.sentence("&")), set(&g, &["&"]));
    }

    #[test]
    fn first_of_expression_grammar() {
        let g = expression_grammar();
        assert_eq!(g.first(&g.sentence("E")), set(&g, &["id"]));
        assert_eq!(g.first(&g.sentence("E'")), set(&g, &["+", "&"]));
        assert_eq!(g.first(&g.sentence("E' id")), set(&g, &["+", "id"]));
    }

    #[test]
    fn first_of_all_nullable_sentence_keeps_empty() {
        let g = Grammar::parse("S -> A B\nA -> a | &\nB -> b | &").unwrap();
        assert_eq!(g.first(&g.sentence("S")), set(&g, &["a", "b", "&"]));
        assert_eq!(g.first(&g.sentence("A B")), set(&g, &["a", "b", "&"]));
    }

    #[test]
    fn first_terminates_on_left_recursion() {
        let g = Grammar::parse("E -> E + T | T\nT -> id").unwrap();
        assert_eq!(g.first(&g.sentence("E")), set(&g, &["id"]));
    }

    #[test]
    fn first_guard_is_fresh_per_call() {
        let g = Grammar::parse("E -> E + T | T\nT -> id").unwrap();
        let once = g.first(&g.sentence("E"));
        let twice = g.first(&g.sentence("E"));
        assert_eq!(once, twice);
    }

    #[test]
    fn first_non_terminal_sees_through_nullable_prefixes() {
        let g = Grammar::parse("S -> A B c\nA -> a | &\nB -> b").unwrap();
        assert_eq!(
            g.first_non_terminal(&g.symbol("S")),
            set(&g, &["A", "B"])
        );
    }

    #[test]
    fn first_non_terminal_flags_direct_left_recursion() {
        let g = Grammar::parse("E -> E + T | T\nT -> id").unwrap();
        let first = g.first_non_terminal(&g.symbol("E"));
        assert!(first.contains(&g.symbol("E")));
    }

    #[test]
    fn first_non_terminal_flags_mutual_left_recursion() {
        let g = Grammar::parse("A -> B a\nB -> A b | c").unwrap();
        assert!(g.first_non_terminal(&g.symbol("A")).contains(&g.symbol("A")));
        assert!(g.first_non_terminal(&g.symbol("B")).contains(&g.symbol("B")));
    }

    #[test]
    fn first_non_terminal_of_right_recursion_is_clean() {
        let g = Grammar::parse("S -> a S | &").unwrap();
        assert_eq!(g.first_non_terminal(&g.symbol("S")), set(&g, &["&"]));
    }

    #[test]
    fn follow_of_initial_symbol_contains_end_mark() {
        let g = expression_grammar();
        assert_eq!(g.follow(&g.symbol("E")), set(&g, &["$"]));
    }

    #[test]
    fn follow_of_expression_grammar() {
        let g = expression_grammar();
        assert_eq!(g.follow(&g.symbol("E'")), set(&g, &["$"]));
        assert_eq!(g.follow(&g.symbol("T")), set(&g, &["+", "$"]));
    }

    #[test]
    fn follow_skips_nullable_suffix() {
        let g = Grammar::parse("S -> A B\nA -> a | &\nB -> b | &").unwrap();
        assert_eq!(g.follow(&g.symbol("A")), set(&g, &["b", "$"]));
        assert_eq!(g.follow(&g.symbol("B")), set(&g, &["$"]));
    }

    #[test]
    fn follow_collects_every_occurrence() {
        let g = Grammar::parse("S -> a X b X c\nX -> x").unwrap();
        assert_eq!(g.follow(&g.symbol("X")), set(&g, &["b", "c"]));
    }
}
