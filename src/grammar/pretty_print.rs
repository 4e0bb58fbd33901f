use std::fmt;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{Grammar, Production, Symbol, END_MARK, EPSILON};

/// Rank in the fixed listing alphabet: the initial symbol's letter first,
/// then lowercase, then uppercase, the empty symbol always last.
fn symbol_key(initial: &str, name: &str) -> (usize, String) {
    let rank = match name.chars().next() {
        Some(c) if initial.starts_with(c) => 0,
        Some(c @ 'a'..='z') => 1 + c as usize - 'a' as usize,
        Some(c @ 'A'..='Z') => 27 + c as usize - 'A' as usize,
        Some('&') => usize::MAX,
        _ => 53,
    };
    (rank, name.to_string())
}

fn production_key(initial: &str, production: &Production) -> Vec<(usize, String)> {
    production
        .symbols()
        .iter()
        .map(|symbol| symbol_key(initial, symbol.name()))
        .collect()
}

fn tex_symbol(name: &str) -> String {
    if name == EPSILON {
        "\\epsilon".to_string()
    } else {
        escape::tex(name).to_string()
    }
}

impl Grammar {
    /// Non-terminals in canonical listing order.
    pub fn ordered_non_terminals(&self) -> Vec<&str> {
        let mut rest: Vec<&str> = self
            .non_terminals()
            .filter(|name| *name != self.initial_symbol())
            .collect();
        rest.sort_by_key(|name| symbol_key(self.initial_symbol(), name));

        let mut ordered = vec![self.initial_symbol()];
        ordered.extend(rest);
        ordered
    }

    fn ordered_alternatives(&self, non_terminal: &str) -> Vec<&Production> {
        let mut alternatives: Vec<&Production> = self
            .alternatives(non_terminal)
            .map(|set| set.iter().collect())
            .unwrap_or_default();
        alternatives.sort_by_key(|production| production_key(self.initial_symbol(), production));
        alternatives
    }

    fn ordered_terminals(&self) -> Vec<&str> {
        let mut terminals: Vec<&str> = self.terminals().iter().map(|t| t.as_str()).collect();
        terminals.sort_by_key(|name| symbol_key(self.initial_symbol(), name));
        terminals
    }

    fn ordered_set(&self, set: &std::collections::HashSet<Symbol>) -> Vec<String> {
        let mut names: Vec<String> = set.iter().map(|symbol| symbol.name().to_string()).collect();
        names.sort_by_key(|name| symbol_key(self.initial_symbol(), name));
        names
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<Grammar initial_symbol='{}' productions={{", self.initial_symbol())?;
        for name in self.ordered_non_terminals() {
            let alternatives: Vec<String> = self
                .ordered_alternatives(name)
                .iter()
                .map(|production| production.to_string())
                .collect();
            writeln!(f, "\t{} -> {}", name, alternatives.join(" | "))?;
        }
        write!(f, "}}>")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput {
    left: String,
    rights: Vec<Vec<String>>,
}

impl ProductionOutput {
    pub fn to_plaintext(&self, left_width: usize) -> String {
        let rights: Vec<String> = self.rights.iter().map(|right| right.join(" ")).collect();
        format!(
            "{:>width$} -> {}",
            self.left,
            rights.join(" | "),
            width = left_width
        )
    }

    pub fn to_latex(&self) -> String {
        let rights: Vec<String> = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|name| tex_symbol(name))
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect();
        format!(
            "{} & \\rightarrow & {}",
            escape::tex(self.left.as_str()),
            rights.join(" \\mid ")
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ProductionOutputVec {
    productions: Vec<ProductionOutput>,
}

impl ProductionOutputVec {
    pub fn to_plaintext(&self) -> String {
        let left_width = self
            .productions
            .iter()
            .map(|p| p.left.len())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|p| p.to_plaintext(left_width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|p| p.to_latex()))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<_>>()
            .join("\\\\\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
struct NonTerminalOutput {
    name: String,
    nullable: bool,
    first: Vec<String>,
    follow: Vec<String>,
}

impl NonTerminalOutput {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn row(names: &[String]) -> String {
            names
                .iter()
                .map(|name| tex_symbol(name))
                .collect::<Vec<_>>()
                .join("\\ ")
        }
        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name.as_str()),
            self.nullable,
            row(&self.first),
            row(&self.follow)
        )
    }
}

#[derive(Debug, Serialize)]
pub struct NonTerminalOutputVec {
    data: Vec<NonTerminalOutput>,
}

impl NonTerminalOutputVec {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|row| row.to_plaintext())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|row| row.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
struct ParseTableRow {
    non_terminal: String,
    cells: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ParseTableOutput {
    terminals: Vec<String>,
    rows: Vec<ParseTableRow>,
}

impl ParseTableOutput {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().cloned());
        let mut output: Vec<Vec<String>> = vec![header];
        for row in &self.rows {
            let mut line: Vec<String> = vec![row.non_terminal.clone()];
            line.extend(row.cells.iter().cloned());
            output.push(line);
        }

        let mut width = vec![0; self.terminals.len() + 1];
        for line in &output {
            for (j, cell) in line.iter().enumerate() {
                width[j] = width[j].max(cell.len());
            }
        }
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(j, cell)| format!("{:>width$}", cell, width = width[j]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len())
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|name| format!("\\text{{{}}}", escape::tex(name.as_str()))),
        );
        let header = header.join(" & ");

        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let mut line: Vec<String> = vec![escape::tex(row.non_terminal.as_str()).to_string()];
                line.extend(row.cells.iter().map(|cell| {
                    if cell.is_empty() {
                        String::new()
                    } else {
                        format!("\\text{{{}}}", escape::tex(cell.as_str()))
                    }
                }));
                line.join(" & ")
            })
            .collect();

        header + "\\\\\\hline\n" + &rows.join("\\\\\n") + "\n\\end{array}\\]"
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .ordered_non_terminals()
            .into_iter()
            .map(|name| ProductionOutput {
                left: name.to_string(),
                rights: self
                    .ordered_alternatives(name)
                    .iter()
                    .map(|production| {
                        production
                            .symbols()
                            .iter()
                            .map(|symbol| symbol.name().to_string())
                            .collect()
                    })
                    .collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }

    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec {
        let data = self
            .ordered_non_terminals()
            .into_iter()
            .map(|name| {
                let symbol = Symbol::NonTerminal(name.to_string());
                let first = self.first(std::slice::from_ref(&symbol));
                let follow = self.follow(&symbol);
                NonTerminalOutput {
                    name: name.to_string(),
                    nullable: first.contains(&Symbol::Empty),
                    first: self.ordered_set(&first),
                    follow: self.ordered_set(&follow),
                }
            })
            .collect();
        NonTerminalOutputVec { data }
    }

    pub fn to_parse_table_output(&self) -> ParseTableOutput {
        let table = self.parse_table();
        let mut terminals: Vec<String> = self
            .ordered_terminals()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        terminals.push(END_MARK.to_string());

        let rows = self
            .ordered_non_terminals()
            .into_iter()
            .map(|name| ParseTableRow {
                non_terminal: name.to_string(),
                cells: terminals
                    .iter()
                    .map(|terminal| {
                        let key = (
                            Symbol::NonTerminal(name.to_string()),
                            self.symbol(terminal),
                        );
                        table
                            .get(&key)
                            .map(|production| format!("{} -> {}", name, production))
                            .unwrap_or_default()
                    })
                    .collect(),
            })
            .collect();

        ParseTableOutput { terminals, rows }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::grammar::Grammar;

    #[test]
    fn display_lists_the_initial_symbol_first_and_epsilon_last() {
        let g = Grammar::parse("S -> b A | &\nA -> a S | a").unwrap();
        assert_eq!(
            g.to_string(),
            "<Grammar initial_symbol='S' productions={\n\
             \tS -> b A | &\n\
             \tA -> a | a S\n\
             }>"
        );
    }

    #[test]
    fn display_orders_non_terminals_by_the_fixed_alphabet() {
        let g = Grammar::parse("E -> T\nT -> id\nB -> b\nE -> T | B b").unwrap();
        let rendered = g.to_string();
        let e = rendered.find("\tE ->").unwrap();
        let b = rendered.find("\tB ->").unwrap();
        let t = rendered.find("\tT ->").unwrap();
        assert!(e < b && b < t);
    }

    #[test]
    fn production_listing_aligns_left_sides() {
        let g = Grammar::parse("E -> T E'\nE' -> + T E' | &\nT -> id").unwrap();
        assert_eq!(
            g.to_production_output_vec().to_plaintext(),
            " E -> T E'\nE' -> + T E' | &\n T -> id"
        );
    }

    #[test]
    fn non_terminal_output_reports_nullable_first_follow() {
        let g = Grammar::parse("S -> a S | &").unwrap();
        let rendered = g.to_non_terminal_output_vec().to_plaintext();
        assert_eq!(rendered, "S | true | a, & | $");
    }

    #[test]
    fn parse_table_output_has_one_column_per_terminal_plus_end_mark() {
        let g = Grammar::parse("S -> a S | &").unwrap();
        let table = g.to_parse_table_output();
        let plaintext = table.to_plaintext();
        assert!(plaintext.contains("S -> a S"));
        assert!(plaintext.contains("S -> &"));
    }
}
