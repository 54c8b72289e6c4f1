//! Output formatting for `slotwise` commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use serde::Serialize;
use tabled::{Table, Tabled};

use crate::domain::ScoredSlot;

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// One line of the ranking table.
#[derive(Debug, Serialize, Tabled)]
pub struct RankRow {
    pub rank: usize,
    pub day: u8,
    pub hour: u8,
    pub duration: u32,
    pub participants: u32,
    #[tabled(rename = "type")]
    pub meeting_type: String,
    pub score: String,
}

impl RankRow {
    pub fn from_scored(rank: usize, scored: &ScoredSlot) -> Self {
        let f = &scored.slot.features;
        Self {
            rank,
            day: f.day_of_week,
            hour: f.hour_of_day,
            duration: f.duration,
            participants: f.participant_count,
            meeting_type: f.meeting_type.clone(),
            score: format!("{:.4}", scored.score),
        }
    }
}

/// Print ranked slots: a table, or the `{slot, score}` list as JSON.
pub fn print_ranking(ranked: &[ScoredSlot], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            let rows: Vec<RankRow> = ranked
                .iter()
                .enumerate()
                .map(|(i, s)| RankRow::from_scored(i + 1, s))
                .collect();
            print_items(&rows, mode)
        }
        OutputMode::Json => print_item(&ranked, mode),
    }
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                let table = Table::new(items).to_string();
                println!("{table}");
            }
        }
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(items)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Print a single Serialize item as pretty JSON.
pub fn print_item<T: Serialize + ?Sized>(item: &T, _mode: OutputMode) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

/// Print a simple key-value pair.
pub fn print_kv(key: &str, value: &str) {
    println!("{key}: {value}");
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("\x1b[32m{msg}\x1b[0m");
}

/// Print a warning message.
pub fn print_warn(msg: &str) {
    println!("\x1b[33m{msg}\x1b[0m");
}
