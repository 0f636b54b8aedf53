use std::{io::Write, process::exit};

use clap::Parser;

use expense_tracker::{
    ExpenseStore,
    cli::{Args, run},
    logging::setup_logging,
};

/// Record and review personal expenses stored in a SQLite database.
fn main() {
    let args = Args::parse();

    setup_logging(args.log_level);

    let store = match ExpenseStore::open(&args.db_path) {
        Ok(store) => store,
        Err(error) => {
            print_error(error);
            exit(1);
        }
    };

    let mut stdout = std::io::stdout().lock();

    if let Err(error) = run(args.command, args.json, &store, &mut stdout) {
        print_error(error);
        exit(1);
    }

    if let Err(error) = stdout.flush() {
        print_error(format!("could not write output: {error}"));
        exit(1);
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
