pub mod grammar;
use std::{fs, io::BufRead};

pub use grammar::Grammar;
use grammar::Symbol;

fn print_help() {
    println!("Usage: cfg-toolkit [actions] outputs [options] [grammar file]");
    println!("actions:");
    println!("  rminf: Remove infertile symbols");
    println!("  epsfree: Eliminate epsilon productions");
    println!("outputs:");
    println!("  prod: Productions");
    println!("  nff: Nullable first and follow");
    println!("  ll1: LL(1) parse table");
    println!("options:");
    println!("  -h: Print this help");
    println!("  -c: Check whether the grammar is LL(1)");
    println!("  -p <sentence>: Run the predictive parser over a sentence");
    println!("  -l: Print in LaTeX format");
    println!("  -j: Print in JSON format");
}

fn render(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() {
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<String>>();
    let mut actions: Vec<&str> = Vec::new();
    let mut outputs: Vec<&str> = Vec::new();
    let mut i: usize = 0;
    while i < args.len() && ["rminf", "epsfree"].contains(&args[i].as_str()) {
        actions.push(args[i].as_str());
        i += 1;
    }
    while i < args.len() && ["prod", "nff", "ll1"].contains(&args[i].as_str()) {
        outputs.push(args[i].as_str());
        i += 1;
    }

    enum OutputFormat {
        Plain,
        LaTeX,
        Json,
    }
    let mut output_format = OutputFormat::Plain;
    let mut check = false;
    let mut sentence: Option<String> = None;

    while i < args.len() && ["-h", "--help", "-l", "-j", "-c", "-p"].contains(&args[i].as_str()) {
        if args[i] == "-h" || args[i] == "--help" {
            print_help();
            return;
        } else if args[i] == "-l" {
            output_format = OutputFormat::LaTeX;
        } else if args[i] == "-j" {
            output_format = OutputFormat::Json;
        } else if args[i] == "-c" {
            check = true;
        } else if args[i] == "-p" {
            i += 1;
            if i == args.len() {
                print_help();
                return;
            }
            sentence = Some(args[i].clone());
        }
        i += 1;
    }

    if i + 1 < args.len() || (outputs.is_empty() && !check && sentence.is_none()) {
        print_help();
        return;
    }

    let input: String = if i == args.len() {
        std::io::stdin()
            .lock()
            .lines()
            .map(|l| l.unwrap())
            .collect::<Vec<String>>()
            .join("\n")
    } else {
        fs::read_to_string(args[i].as_str()).expect("Failed to read file")
    };

    let mut g = match Grammar::parse(&input) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    for action in actions {
        let transformed = if action == "rminf" {
            g.without_infertile()
        } else {
            g.epsilon_free()
        };
        g = match transformed {
            Ok(g) => g,
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        };
    }

    for output in outputs {
        if output == "prod" {
            let t = g.to_production_output_vec();
            println!(
                "{}",
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::Json => t.to_json(),
                }
            );
        }
        if output == "nff" {
            let t = g.to_non_terminal_output_vec();
            println!(
                "{}",
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::Json => t.to_json(),
                }
            );
        }
        if output == "ll1" {
            let t = g.to_parse_table_output();
            println!(
                "{}",
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::Json => t.to_json(),
                }
            );
        }
    }

    if check {
        if g.is_ll1() {
            println!("grammar is LL(1)");
        } else {
            println!("grammar is not LL(1)");
        }
    }

    if let Some(sentence) = sentence {
        for step in g.parse_sentence(&g.sentence(&sentence)) {
            match step {
                Ok(step) => println!("{} | {}", render(&step.input), render(&step.stack)),
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        println!("sentence accepted");
    }
}
