use chrono::{DateTime, Local};
use log::{debug, info, warn};
use rand::Rng;
use uuid::Uuid;

use crate::error::SessionError;
use crate::item::{Outcome, QuizItem};
use crate::scheduler::{Mode, Scheduler};
use crate::service::QuizService;

pub struct SessionSummary {
    pub id: Uuid,
    pub mode: Mode,
    pub seen: u32,
    pub correct: u32,
    pub wrong: u32,
    pub started_at: DateTime<Local>,
    pub elapsed: chrono::Duration,
}

/// Drives one quiz session: draws from the scheduler, reports answers to
/// the service and mirrors them into the scheduler's pool snapshot.
pub struct Session<S, R> {
    id: Uuid,
    service: S,
    scheduler: Scheduler<R>,
    current: Option<QuizItem>,
    resync: bool,
    seen: u32,
    correct: u32,
    wrong: u32,
    started_at: DateTime<Local>,
}

impl<S: QuizService, R: Rng> Session<S, R> {
    /// With `resync`, the pool is fetched again before every new pass so
    /// the pass classifies the service's statistics rather than the local
    /// mirror.
    pub async fn start(
        mut service: S,
        mode: Mode,
        rng: R,
        resync: bool,
    ) -> Result<Self, SessionError> {
        let pool = service.fetch_pool().await?;
        let scheduler = Scheduler::new(mode, pool, rng)?;
        let id = Uuid::new_v4();
        info!(
            "session {id} started: {} items, {mode:?} mode",
            scheduler.pool().len()
        );
        Ok(Session {
            id,
            service,
            scheduler,
            current: None,
            resync,
            seen: 0,
            correct: 0,
            wrong: 0,
            started_at: Local::now(),
        })
    }

    pub async fn next_item(&mut self) -> Result<&QuizItem, SessionError> {
        if self.resync && self.scheduler.pass_complete() {
            match self.service.fetch_pool().await {
                Ok(pool) => {
                    debug!("session {}: refreshed {} items", self.id, pool.len());
                    self.scheduler.replace_pool(pool);
                }
                Err(e) => warn!(
                    "session {}: refresh failed, keeping local statistics: {e}",
                    self.id
                ),
            }
        }

        let item = self.scheduler.pick_next()?.clone();
        self.seen += 1;
        Ok(self.current.insert(item))
    }

    pub fn current(&self) -> Option<&QuizItem> {
        self.current.as_ref()
    }

    /// Reports the outcome for the current item. On failure nothing changes
    /// and the item can be answered again.
    pub async fn answer(&mut self, outcome: Outcome) -> Result<(), SessionError> {
        let item = self.current.as_ref().ok_or(SessionError::NoCurrentItem)?;
        self.service.report_outcome(item.id, outcome).await?;

        let mut updated = item.clone();
        updated.stats = updated.stats.record(outcome);
        debug!(
            "session {}: item {} answered {outcome:?}, now {:?}",
            self.id, updated.id, updated.stats
        );
        self.scheduler.replace_item(updated);
        self.current = None;

        match outcome {
            Outcome::Correct => self.correct += 1,
            Outcome::Wrong => self.wrong += 1,
        }
        Ok(())
    }

    /// Items as the session currently knows them.
    pub fn pool(&self) -> &[QuizItem] {
        self.scheduler.pool()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            mode: self.scheduler.mode(),
            seen: self.seen,
            correct: self.correct,
            wrong: self.wrong,
            started_at: self.started_at,
            elapsed: Local::now() - self.started_at,
        }
    }

    pub fn into_service(self) -> S {
        self.service
    }
}
