use wasm_bindgen::prelude::*;

mod grammar;
pub use grammar::{
    Grammar, GrammarError, Parse, ParseError, ParseStep, ParseTable, Production, Symbol,
};

#[wasm_bindgen]
pub fn nullable_first_follow_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => g.to_non_terminal_output_vec().to_json(),
        Err(e) => format!("{{\"error\":\"{}\"}}", e),
    }
}

#[wasm_bindgen]
pub fn ll1_parse_table_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => g.to_parse_table_output().to_json(),
        Err(e) => format!("{{\"error\":\"{}\"}}", e),
    }
}
