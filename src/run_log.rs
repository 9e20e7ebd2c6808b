use std::io;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Outcome of one finished round. Never changed once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub won: bool,
    pub duration_secs: u64,
    pub pair_count: usize,
    pub difficulty: String,
    pub seconds_remaining: u64,
    pub completed_at: DateTime<Local>,
}

impl ResultRecord {
    pub fn headline(&self) -> &'static str {
        if self.won {
            "Won"
        } else {
            "Lost"
        }
    }

    pub fn settings_line(&self) -> String {
        format!(
            "{} | {} s | {} pairs to match",
            self.difficulty, self.duration_secs, self.pair_count
        )
    }

    pub fn time_line(&self) -> String {
        if self.seconds_remaining > 0 {
            format!("Completed with {} s to spare!", self.seconds_remaining)
        } else {
            "Incomplete time".to_string()
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    date: String,
    won: bool,
    difficulty: &'a str,
    duration_secs: u64,
    pairs: usize,
    seconds_remaining: u64,
}

/// Append-only history of the rounds played in this run.
#[derive(Debug, Default, Clone)]
pub struct RunLog {
    records: Vec<ResultRecord>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in the order they were logged.
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Most recent round first, the way the log screen lists them.
    pub fn newest_first(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter().rev()
    }

    pub fn last(&self) -> Option<&ResultRecord> {
        self.records.last()
    }

    pub fn wins(&self) -> usize {
        self.records.iter().filter(|r| r.won).count()
    }

    /// Dump the log as CSV, oldest first, with a header row.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        for record in &self.records {
            out.serialize(CsvRow {
                date: record.completed_at.to_rfc3339(),
                won: record.won,
                difficulty: &record.difficulty,
                duration_secs: record.duration_secs,
                pairs: record.pair_count,
                seconds_remaining: record.seconds_remaining,
            })?;
        }
        out.flush()?;
        Ok(())
    }
}
