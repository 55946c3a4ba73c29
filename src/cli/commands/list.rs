//! List command - show cached UIDs

use crate::cli::args::{ListArgs, OutputFormat};
use crate::cli::commands::open_store;
use crate::config::Config;
use crate::error::CacheResult;
use crate::store::{Record, Slot};
use console::style;
use serde::Serialize;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> CacheResult<()> {
    let store = open_store(config)?;
    let records: Vec<(Slot, Record)> = store
        .records()?
        .into_iter()
        .filter(|(_, record)| args.all || matches!(record, Record::Live(_)))
        .collect();

    match args.format {
        OutputFormat::Table => print_table(&records),
        OutputFormat::Json => print_json(&records)?,
        OutputFormat::Plain => print_plain(&records),
    }

    Ok(())
}

fn print_table(records: &[(Slot, Record)]) {
    if records.is_empty() {
        println!("No authorised UIDs.");
        return;
    }

    println!("{:<6} {:<8} {:<10} {:<8}", "SLOT", "OFFSET", "UID", "STATE");
    println!("{}", "-".repeat(36));

    for (slot, record) in records {
        let (uid, state) = match record {
            Record::Live(uid) => (uid.to_string(), style("live").green().to_string()),
            Record::Free => ("-".to_string(), style("free").dim().to_string()),
            Record::Corrupt => ("?".to_string(), style("corrupt").red().to_string()),
        };
        println!(
            "{:<6} {:<8} {:<10} {:<8}",
            slot.index(),
            slot.offset(),
            uid,
            state
        );
    }

    println!();
    let live = records
        .iter()
        .filter(|(_, r)| matches!(r, Record::Live(_)))
        .count();
    println!("Total: {} authorised", live);
}

fn print_json(records: &[(Slot, Record)]) -> CacheResult<()> {
    #[derive(Serialize)]
    struct RecordJson {
        slot: u64,
        offset: u64,
        state: &'static str,
        uid: Option<String>,
    }

    let json_records: Vec<RecordJson> = records
        .iter()
        .map(|(slot, record)| RecordJson {
            slot: slot.index(),
            offset: slot.offset(),
            state: match record {
                Record::Live(_) => "live",
                Record::Free => "free",
                Record::Corrupt => "corrupt",
            },
            uid: match record {
                Record::Live(uid) => Some(uid.to_string()),
                _ => None,
            },
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_records)?);
    Ok(())
}

fn print_plain(records: &[(Slot, Record)]) {
    for (_, record) in records {
        if let Record::Live(uid) = record {
            println!("{}", uid);
        }
    }
}
