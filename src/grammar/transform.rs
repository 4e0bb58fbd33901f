use std::collections::HashSet;
use std::hash::Hash;

use indexmap::IndexMap;

use super::{Grammar, GrammarError, Symbol, EPSILON};

/// Grows `seed` with the candidates of `step` until a pass adds nothing new.
fn closure<T, F>(mut seed: HashSet<T>, step: F) -> HashSet<T>
where
    T: Hash + Eq,
    F: Fn(&HashSet<T>) -> Vec<T>,
{
    loop {
        let additions: Vec<T> = step(&seed)
            .into_iter()
            .filter(|candidate| !seed.contains(candidate))
            .collect();
        if additions.is_empty() {
            return seed;
        }
        seed.extend(additions);
    }
}

impl Grammar {
    /// Drops every non-terminal that cannot derive a finite terminal string,
    /// along with every alternative that mentions one. Fails when the
    /// initial symbol itself is infertile, since no well-formed grammar
    /// remains.
    pub fn without_infertile(&self) -> Result<Grammar, GrammarError> {
        let fertile = closure(HashSet::new(), |fertile: &HashSet<String>| {
            self.productions()
                .iter()
                .filter(|(_, alternatives)| {
                    alternatives.iter().any(|alternative| {
                        alternative.symbols().iter().all(|symbol| match symbol {
                            Symbol::NonTerminal(name) => fertile.contains(name),
                            _ => true,
                        })
                    })
                })
                .map(|(left, _)| left.clone())
                .collect()
        });

        let survives = |symbols: &[Symbol]| {
            symbols.iter().all(|symbol| match symbol {
                Symbol::NonTerminal(name) => fertile.contains(name),
                _ => true,
            })
        };

        let rules: IndexMap<String, Vec<Vec<String>>> = self
            .productions()
            .iter()
            .filter(|(left, _)| fertile.contains(*left))
            .map(|(left, alternatives)| {
                (
                    left.clone(),
                    alternatives
                        .iter()
                        .filter(|alternative| survives(alternative.symbols()))
                        .map(|alternative| {
                            alternative
                                .symbols()
                                .iter()
                                .map(|symbol| symbol.name().to_string())
                                .collect()
                        })
                        .collect(),
                )
            })
            .collect();

        Grammar::create(self.initial_symbol(), rules)
    }

    /// Rewrites the grammar without epsilon productions. Every subset of
    /// nullable positions of every alternative is produced by a worklist of
    /// single-position deletions; empty alternatives then survive only on a
    /// fresh initial symbol introduced when the original one was nullable.
    pub fn epsilon_free(&self) -> Result<Grammar, GrammarError> {
        // nullability is judged against the input grammar throughout
        let nullable =
            |symbol: &Symbol| self.first(std::slice::from_ref(symbol)).contains(&Symbol::Empty);
        let initial_nullable = nullable(&Symbol::NonTerminal(self.initial_symbol().to_string()));

        let mut rules: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();
        for (left, alternatives) in self.productions() {
            let seed: HashSet<Vec<Symbol>> = alternatives
                .iter()
                .map(|alternative| alternative.symbols().to_vec())
                .collect();

            let expanded = closure(seed, |current: &HashSet<Vec<Symbol>>| {
                let mut candidates = Vec::new();
                for alternative in current {
                    for (i, symbol) in alternative.iter().enumerate() {
                        if nullable(symbol) {
                            let mut shorter = alternative.clone();
                            shorter.remove(i);
                            candidates.push(shorter);
                        }
                    }
                }
                candidates
            });

            let surviving: Vec<Vec<String>> = expanded
                .into_iter()
                .filter(|alternative| {
                    // blank candidates and epsilon alternatives both go; the
                    // fresh initial symbol reintroduces epsilon if needed
                    !alternative.is_empty() && alternative != &[Symbol::Empty]
                })
                .map(|alternative| {
                    alternative
                        .iter()
                        .map(|symbol| symbol.name().to_string())
                        .collect()
                })
                .collect();

            if !surviving.is_empty() {
                rules.insert(left.clone(), surviving);
            }
        }

        let mut initial = self.initial_symbol().to_string();
        if initial_nullable {
            let fresh = self.prime_name(initial.clone());
            rules.insert(fresh.clone(), vec![vec![initial], vec![EPSILON.to_string()]]);
            initial = fresh;
        }

        Grammar::create(&initial, rules)
    }
}
