use std::fmt;

use super::{Grammar, ParseTable, Symbol};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Stack-top terminal does not match the next input token.
    Mismatch { expected: Symbol, found: Symbol },
    /// No table cell for the current non-terminal/lookahead pair.
    NoTableEntry { non_terminal: Symbol, lookahead: Symbol },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Mismatch { expected, found } => {
                write!(f, "{} != {}", expected, found)
            }
            ParseError::NoTableEntry {
                non_terminal,
                lookahead,
            } => {
                write!(
                    f,
                    "there is no ({}, {}) in parse table",
                    non_terminal, lookahead
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// One snapshot of the pushdown automaton: the remaining input without the
/// trailing `$` and the stack without the bottom `$`, top last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStep {
    pub input: Vec<Symbol>,
    pub stack: Vec<Symbol>,
}

enum State {
    Initial,
    Running,
    Done,
}

/// Stack-based predictive parse over one input sentence. Yields the initial
/// snapshot, then one snapshot per match/expand step; empty-symbol pops are
/// silent. The iterator fuses after acceptance or the first error.
pub struct Parse {
    table: ParseTable,
    input: Vec<Symbol>,
    position: usize,
    stack: Vec<Symbol>,
    state: State,
}

impl Grammar {
    pub fn parse_sentence(&self, sentence: &[Symbol]) -> Parse {
        let mut input = sentence.to_vec();
        input.push(Symbol::End);
        let initial = Symbol::NonTerminal(self.initial_symbol().to_string());
        Parse {
            table: self.parse_table(),
            input,
            position: 0,
            stack: vec![Symbol::End, initial],
            state: State::Initial,
        }
    }
}

impl Parse {
    fn snapshot(&self) -> ParseStep {
        ParseStep {
            input: self.input[self.position..self.input.len() - 1].to_vec(),
            stack: self.stack.get(1..).unwrap_or(&[]).to_vec(),
        }
    }
}

impl Iterator for Parse {
    type Item = Result<ParseStep, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::Done => return None,
            State::Initial => {
                self.state = State::Running;
                return Some(Ok(self.snapshot()));
            }
            State::Running => {}
        }

        loop {
            let top = match self.stack.pop() {
                Some(top) => top,
                None => {
                    self.state = State::Done;
                    return None;
                }
            };

            if top.is_empty() {
                continue;
            }

            let front = self.input[self.position].clone();

            if top == Symbol::End && front == Symbol::End {
                self.state = State::Done;
                return None;
            }

            if top.is_terminal() {
                if top != front {
                    self.state = State::Done;
                    return Some(Err(ParseError::Mismatch {
                        expected: top,
                        found: front,
                    }));
                }
                self.position += 1;
            } else {
                match self.table.get(&(top.clone(), front.clone())) {
                    Some(rule) => {
                        if !rule.is_empty_production() {
                            self.stack.extend(rule.symbols().iter().rev().cloned());
                        }
                    }
                    None => {
                        self.state = State::Done;
                        return Some(Err(ParseError::NoTableEntry {
                            non_terminal: top,
                            lookahead: front,
                        }));
                    }
                }
            }

            return Some(Ok(self.snapshot()));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ParseError, ParseStep};
    use crate::grammar::Grammar;

    fn steps(g: &Grammar, sentence: &str) -> Result<Vec<ParseStep>, ParseError> {
        g.parse_sentence(&g.sentence(sentence)).collect()
    }

    #[test]
    fn accepts_a_sentence_of_the_expression_grammar() {
        let g = Grammar::parse("E -> T E'\nE' -> + T E' | &\nT -> id").unwrap();
        let steps = steps(&g, "id + id").unwrap();

        let last = steps.last().unwrap();
        assert_eq!(last.input, vec![]);
        assert_eq!(last.stack, vec![]);
    }

    #[test]
    fn replays_the_leftmost_derivation_stepwise() {
        let g = Grammar::parse("E -> T E'\nE' -> + T E' | &\nT -> id").unwrap();
        let steps = steps(&g, "id").unwrap();

        assert_eq!(steps[0].input, g.sentence("id"));
        assert_eq!(steps[0].stack, g.sentence("E"));
        // E expanded to T E', stack top last
        assert_eq!(steps[1].stack, g.sentence("E' T"));
        assert_eq!(steps[2].stack, g.sentence("E' id"));
        // id consumed
        assert_eq!(steps[3].input, vec![]);
        assert_eq!(steps[3].stack, g.sentence("E'"));
        // E' derived empty
        assert_eq!(steps[4].stack, vec![]);
        assert_eq!(steps.len(), 5);
    }

    #[test]
    fn accepts_the_empty_sentence_via_the_empty_alternative() {
        let g = Grammar::parse("S -> a S | &").unwrap();
        let steps = steps(&g, "").unwrap();
        assert_eq!(steps.last().unwrap().stack, vec![]);
    }

    #[test]
    fn fails_with_mismatch_on_a_wrong_trailing_terminal() {
        let g = Grammar::parse("A -> a b").unwrap();
        let error = steps(&g, "a c").unwrap_err();
        assert_eq!(
            error,
            ParseError::Mismatch {
                expected: g.symbol("b"),
                found: g.symbol("c"),
            }
        );
    }

    #[test]
    fn fails_without_table_entry_on_an_unexpected_token() {
        let g = Grammar::parse("E -> T E'\nE' -> + T E' | &\nT -> id").unwrap();
        let error = steps(&g, "id =").unwrap_err();
        assert_eq!(
            error,
            ParseError::NoTableEntry {
                non_terminal: g.symbol("E'"),
                lookahead: g.symbol("="),
            }
        );
    }

    #[test]
    fn fuses_after_an_error() {
        let g = Grammar::parse("A -> a b").unwrap();
        let mut parse = g.parse_sentence(&g.sentence("a c"));
        assert!(parse.any(|step| step.is_err()));
        assert!(parse.next().is_none());
    }

    #[test]
    fn rejects_trailing_input_after_a_complete_derivation() {
        let g = Grammar::parse("A -> a").unwrap();
        let error = steps(&g, "a a").unwrap_err();
        assert_eq!(
            error,
            ParseError::NoTableEntry {
                non_terminal: g.symbol("$"),
                lookahead: g.symbol("a"),
            }
        );
    }
}
