use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::ServiceError;
use crate::item::{self, Outcome, QuizItem};

/// The system of record for items and their statistics.
#[allow(async_fn_in_trait)]
pub trait QuizService {
    /// Full item set with current statistics.
    async fn fetch_pool(&mut self) -> Result<Vec<QuizItem>, ServiceError>;

    async fn report_outcome(&mut self, id: i64, outcome: Outcome) -> Result<(), ServiceError>;
}

// -- REST service --

pub struct HttpQuizService {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct AnswerBody {
    correct: bool,
}

impl HttpQuizService {
    pub fn new(base_url: &str) -> Self {
        HttpQuizService {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl QuizService for HttpQuizService {
    async fn fetch_pool(&mut self) -> Result<Vec<QuizItem>, ServiceError> {
        let url = format!("{}/question", self.base_url);
        debug!("GET {url}");
        let items: Vec<QuizItem> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        item::warn_invalid(&items);
        item::warn_duplicate_ids(&items);
        Ok(items)
    }

    async fn report_outcome(&mut self, id: i64, outcome: Outcome) -> Result<(), ServiceError> {
        let url = format!("{}/question/{id}/answer", self.base_url);
        debug!("POST {url} ({outcome:?})");
        self.client
            .post(&url)
            .json(&AnswerBody {
                correct: outcome.is_correct(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

// -- Local CSV decks --

/// Deck files on disk acting as the system of record. Every reported
/// outcome is written straight back to the item's source file.
pub struct DeckFileService {
    items: Vec<QuizItem>,
    sources: Vec<PathBuf>,
}

impl DeckFileService {
    pub fn open(paths: &[PathBuf]) -> Result<Self, ServiceError> {
        let files = item::discover_files(paths);

        let mut items: Vec<QuizItem> = Vec::new();
        let mut sources: Vec<PathBuf> = Vec::new();
        for file in &files {
            match item::load_csv(file) {
                Ok(loaded) => {
                    for i in loaded {
                        sources.push(file.clone());
                        items.push(i);
                    }
                }
                Err(e) => warn!("{e}"),
            }
        }

        // ids must survive across sessions, so decks that were missing some
        // are rewritten with the assigned ones
        let unnumbered: Vec<PathBuf> = items
            .iter()
            .zip(&sources)
            .filter(|(i, _)| i.id == 0)
            .map(|(_, s)| s.clone())
            .collect();
        item::assign_missing_ids(&mut items);
        item::warn_invalid(&items);
        item::warn_duplicate_ids(&items);

        let service = DeckFileService { items, sources };
        let mut rewritten: Vec<&PathBuf> = Vec::new();
        for path in &unnumbered {
            if !rewritten.contains(&path) {
                service.save_file(path)?;
                rewritten.push(path);
            }
        }

        info!(
            "loaded {} items from {} deck files",
            service.items.len(),
            files.len()
        );
        Ok(service)
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    fn save_file(&self, target: &Path) -> Result<(), ServiceError> {
        let file_items: Vec<QuizItem> = self
            .items
            .iter()
            .zip(&self.sources)
            .filter(|(_, source)| source.as_path() == target)
            .map(|(i, _)| i.clone())
            .collect();
        item::save_csv(target, &file_items)
    }
}

impl QuizService for DeckFileService {
    async fn fetch_pool(&mut self) -> Result<Vec<QuizItem>, ServiceError> {
        Ok(self.items.clone())
    }

    async fn report_outcome(&mut self, id: i64, outcome: Outcome) -> Result<(), ServiceError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(ServiceError::UnknownItem(id))?;

        let previous = self.items[index].stats;
        self.items[index].stats = previous.record(outcome);
        let source = self.sources[index].clone();
        if let Err(e) = self.save_file(&source) {
            self.items[index].stats = previous;
            return Err(e);
        }
        Ok(())
    }
}
