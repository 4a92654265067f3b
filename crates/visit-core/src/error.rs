use thiserror::Error;

use visit_model::ScheduleError;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
