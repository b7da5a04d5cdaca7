use std::env;
use std::io::{self, BufRead, Write};

use minisql::Database;

fn main() {
    env_logger::init();

    let db_path = env::args().nth(1).unwrap_or_else(|| "./database".into());

    println!("minisql v{}", env!("CARGO_PKG_VERSION"));
    println!("Supported commands:");
    println!("  CREATE TABLE tablename (col1 INT, col2 VARCHAR(50))");
    println!("  INSERT INTO tablename (col1, col2) VALUES (1, 'text')");
    println!("  SELECT col1, col2 FROM tablename WHERE col1 > 5");
    println!("  .tables - List all tables");
    println!("  .describe tablename - Show table structure");
    println!("  .quit - Exit");
    println!();

    let mut db = match Database::open(&db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error opening database: {e}");
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("sql> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(_) => break,
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('.') {
            if !handle_dot_command(input, &db) {
                break;
            }
            continue;
        }

        println!("{}", db.execute(input));
        println!();
    }

    println!("Goodbye!");
}

/// Handles a `.command` line; returns `false` when the loop should stop.
fn handle_dot_command(input: &str, db: &Database) -> bool {
    match input.split_whitespace().collect::<Vec<_>>().as_slice() {
        [".quit"] => return false,
        [".tables"] => {
            let tables = db.list_tables();
            if tables.is_empty() {
                println!("No tables found");
            } else {
                println!("Tables:");
                for table in tables {
                    println!("  - {table}");
                }
            }
        }
        [".describe", name] => println!("{}", db.describe_table(name)),
        _ => {
            eprintln!("Error: unknown command: {input}");
        }
    }
    true
}
