use std::{io, path::PathBuf, process};

use clap::Parser;
use student_roster::{ThreadSafeRoster, menu};
use tracing_subscriber::EnvFilter;

/// Interactive student roster backed by a flat text file
#[derive(Parser, Debug)]
#[command(name = "student-roster")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path of the backing file, created if missing
    #[arg(long, env = "STUDENT_ROSTER_FILE", default_value = "students.txt")]
    file: PathBuf,

    /// Print the roster as JSON and exit instead of starting the menu
    #[arg(long)]
    json: bool,
}

fn main() {
    // Logs go to stderr so they never interleave with the menu prompts.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let roster = ThreadSafeRoster::new(&cli.file);

    let loaded = roster.load();

    if cli.json {
        if let Err(e) = loaded.and_then(|_| menu::write_json(&roster, io::stdout().lock())) {
            eprintln!("Error: {}", menu::describe(&e));
            process::exit(1);
        }
        return;
    }

    // A failed load is reported and the session continues with an empty roster.
    match loaded {
        Ok(summary) if summary.skipped > 0 => println!(
            "Loaded {} students from file ({} malformed lines skipped).",
            summary.loaded, summary.skipped
        ),
        Ok(summary) => println!("Loaded {} students from file.", summary.loaded),
        Err(e) => println!("Could not load file: {}", menu::describe(&e)),
    }

    if let Err(e) = menu::run(&roster, io::stdin().lock(), io::stdout().lock()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
