use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, StatisticsError};

/// Per-item answer history, as tracked by the quiz service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub times_solved: u32,
    #[serde(default)]
    pub times_correct: u32,
    #[serde(default)]
    pub current_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub id: i64,
    pub question: String,
    pub answer: String,
    #[serde(flatten)]
    pub stats: Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        self == Outcome::Correct
    }
}

impl Statistics {
    pub fn new(times_solved: u32, times_correct: u32, current_streak: u32) -> Self {
        Statistics {
            times_solved,
            times_correct,
            current_streak,
        }
    }

    /// Statistics after one more submission with the given outcome.
    pub fn record(self, outcome: Outcome) -> Statistics {
        match outcome {
            Outcome::Correct => Statistics {
                times_solved: self.times_solved.saturating_add(1),
                times_correct: self.times_correct.saturating_add(1),
                current_streak: self.current_streak.saturating_add(1),
            },
            Outcome::Wrong => Statistics {
                times_solved: self.times_solved.saturating_add(1),
                times_correct: self.times_correct,
                current_streak: 0,
            },
        }
    }
}

impl QuizItem {
    pub fn new(id: i64, question: impl Into<String>, answer: impl Into<String>) -> Self {
        QuizItem {
            id,
            question: question.into(),
            answer: answer.into(),
            stats: Statistics::default(),
        }
    }

    pub fn with_stats(mut self, stats: Statistics) -> Self {
        self.stats = stats;
        self
    }

    pub fn validate(&self) -> Result<(), StatisticsError> {
        if self.stats.times_correct > self.stats.times_solved {
            return Err(StatisticsError::InvalidStatistics {
                id: self.id,
                solved: self.stats.times_solved,
                correct: self.stats.times_correct,
            });
        }
        Ok(())
    }
}

/// Logs a warning for every item whose statistics are inconsistent.
/// Such items are kept; the classifier treats them as unsolved.
pub fn warn_invalid(items: &[QuizItem]) {
    for item in items {
        if let Err(e) = item.validate() {
            log::warn!("{e}");
        }
    }
}

/// Ids used by more than one item, in order of their second appearance.
pub fn duplicate_ids(items: &[QuizItem]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();
    for item in items {
        if !seen.insert(item.id) && !duplicates.contains(&item.id) {
            duplicates.push(item.id);
        }
    }
    duplicates
}

/// Logs a warning for every id shared by several items. Outcomes for such
/// an id only ever reach the first of them.
pub fn warn_duplicate_ids(items: &[QuizItem]) {
    for id in duplicate_ids(items) {
        log::warn!("item id {id} is used by more than one item");
    }
}

// -- CSV deck files --

const HEADER: [&str; 6] = [
    "id",
    "question",
    "answer",
    "times_solved",
    "times_correct",
    "current_streak",
];

fn get_field(record: &csv::StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").to_string()
}

fn parse_count(s: &str) -> u32 {
    s.trim().parse().unwrap_or(0)
}

/// Reads a deck file. Rows without a positive integer id get id 0;
/// `assign_missing_ids` hands out real ones once every deck is loaded.
pub fn load_csv(path: &Path) -> Result<Vec<QuizItem>, ServiceError> {
    let deck_err = |source| ServiceError::Deck {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(deck_err)?;

    let mut items = Vec::new();
    for result in reader.records() {
        let record = result.map_err(deck_err)?;

        let id = get_field(&record, 0)
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .unwrap_or(0);

        items.push(QuizItem {
            id,
            question: get_field(&record, 1),
            answer: get_field(&record, 2),
            stats: Statistics {
                times_solved: parse_count(&get_field(&record, 3)),
                times_correct: parse_count(&get_field(&record, 4)),
                current_streak: parse_count(&get_field(&record, 5)),
            },
        });
    }
    Ok(items)
}

pub fn save_csv(path: &Path, items: &[QuizItem]) -> Result<(), ServiceError> {
    let save_err = |source| ServiceError::Save {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(save_err)?;
    writer.write_record(HEADER).map_err(save_err)?;

    for item in items {
        writer
            .write_record([
                item.id.to_string(),
                item.question.clone(),
                item.answer.clone(),
                item.stats.times_solved.to_string(),
                item.stats.times_correct.to_string(),
                item.stats.current_streak.to_string(),
            ])
            .map_err(save_err)?;
    }

    writer
        .flush()
        .map_err(|e| save_err(csv::Error::from(e)))?;
    Ok(())
}

/// Gives every item with id 0 a fresh id above the largest one in use.
pub fn assign_missing_ids(items: &mut [QuizItem]) {
    let mut next = items.iter().map(|i| i.id).max().unwrap_or(0).max(0) + 1;
    for item in items.iter_mut().filter(|i| i.id == 0) {
        item.id = next;
        next += 1;
    }
}

pub fn discover_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_csv_recursive(path, &mut files);
        } else if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path.clone());
        }
    }
    files
}

fn collect_csv_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_csv_recursive(&path, files);
        } else if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path);
        }
    }
}
