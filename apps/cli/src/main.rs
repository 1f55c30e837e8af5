use std::process::ExitCode;

use clap::Parser;

use joplin_anki_sync::{logging, Cli, SyncReport};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_level.as_deref()) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    match joplin_anki_sync::run(&cli).await {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &SyncReport) {
    let stats = &report.stats;

    if stats.dry_run {
        for deletion in &report.plan.delete {
            println!("- {}", deletion.front);
        }
        for card in &report.plan.create {
            println!("+ {} [{}]", card.front, card.deck);
        }
        for update in &report.plan.update {
            println!("~ {}", update.front);
        }
        println!("Dry run, nothing was changed.");
    }

    println!("Deleted notes: {}", stats.deleted);
    println!("Added notes: {}", stats.created);
    println!("Updated notes: {}", stats.updated);
    if stats.failed > 0 {
        println!("Failed notes: {}", stats.failed);
    }
}
