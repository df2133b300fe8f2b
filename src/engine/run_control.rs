// ==========================================
// Altar Rota - run control
// ==========================================
// - PeriodLockRegistry: same-period runs are serialised,
//   different periods proceed in parallel
// - RunCancellation: abort before commit, no durable effect
// - GenerationRun: Planning -> Staffing(n) -> Committing -> Completed|Failed
// ==========================================

use crate::domain::types::{PeriodId, RunState};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

// ==========================================
// PeriodLockRegistry
// ==========================================
#[derive(Debug, Default)]
pub struct PeriodLockRegistry {
    locks: Mutex<HashMap<PeriodId, Arc<AsyncMutex<()>>>>,
}

/// Held for the whole run; released on drop
pub type PeriodGuard = OwnedMutexGuard<()>;

impl PeriodLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, period_id: PeriodId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(period_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Wait until no other run holds the period
    pub async fn acquire(&self, period_id: PeriodId) -> PeriodGuard {
        let lock = self.lock_for(period_id);
        debug!(period_id, "waiting for period lock");
        lock.lock_owned().await
    }
}

// ==========================================
// RunCancellation
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RunCancellation {
    flag: Arc<AtomicBool>,
}

impl RunCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Err(Cancelled) once `cancel` has been called
    pub fn check(&self) -> EngineResult<()> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// ==========================================
// GenerationRun - lifecycle state machine
// ==========================================
#[derive(Debug, Clone)]
pub struct GenerationRun {
    run_id: String,
    period_id: PeriodId,
    state: RunState,
}

impl GenerationRun {
    pub fn new(period_id: PeriodId) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            period_id,
            state: RunState::Planning,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn period_id(&self) -> PeriodId {
        self.period_id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn transition(&mut self, next: RunState) -> EngineResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        match next {
            RunState::Staffing { .. } => {
                debug!(run_id = %self.run_id, from = %self.state, to = %next, "run state")
            }
            _ => info!(run_id = %self.run_id, from = %self.state, to = %next, "run state"),
        }
        self.state = next;
        Ok(())
    }

    /// Move to Failed unless already terminal
    pub fn fail(&mut self, reason: &EngineError) {
        if self.state.is_terminal() {
            return;
        }
        warn!(run_id = %self.run_id, from = %self.state, error = %reason, "run failed");
        self.state = RunState::Failed;
    }
}
