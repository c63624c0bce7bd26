//! Start/close lifecycle of a served factory.
//!
//! ```text
//! Unstarted --start()--> Started --close()--> Stopped
//! ```
//!
//! Each transition happens at most once.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// `start` was called after the service had already started.
    #[error("{0} has already been started")]
    AlreadyStarted(String),

    /// The service has not been started yet.
    #[error("{0} is not started")]
    NotStarted(String),

    /// `close` was called more than once.
    #[error("{0} has already been stopped")]
    AlreadyStopped(String),
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Created, not yet started.
    Unstarted,
    /// Serving.
    Started,
    /// Closed; cannot be restarted.
    Stopped,
}

/// A named service wrapping `F`.
#[derive(Debug)]
pub struct FactoryService<F> {
    name: String,
    state: Mutex<ServiceState>,
    inner: F,
}

impl<F> FactoryService<F> {
    /// Wrap `inner` in an unstarted service called `name`.
    pub fn new(name: impl Into<String>, inner: F) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(ServiceState::Unstarted),
            inner,
        }
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wrapped value.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move from unstarted to started.
    pub fn start(&self) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            ServiceState::Unstarted => {
                *state = ServiceState::Started;
                tracing::info!(service = %self.name, "service started");
                Ok(())
            }
            ServiceState::Started | ServiceState::Stopped => {
                Err(ServiceError::AlreadyStarted(self.name.clone()))
            }
        }
    }

    /// Move from started to stopped.
    pub fn close(&self) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            ServiceState::Started => {
                *state = ServiceState::Stopped;
                tracing::info!(service = %self.name, "service stopped");
                Ok(())
            }
            ServiceState::Unstarted => Err(ServiceError::NotStarted(self.name.clone())),
            ServiceState::Stopped => Err(ServiceError::AlreadyStopped(self.name.clone())),
        }
    }

    /// Health keyed by service name; healthy only while started.
    pub fn health_report(&self) -> HashMap<String, Result<(), ServiceError>> {
        let health = match self.state() {
            ServiceState::Started => Ok(()),
            ServiceState::Unstarted => Err(ServiceError::NotStarted(self.name.clone())),
            ServiceState::Stopped => Err(ServiceError::AlreadyStopped(self.name.clone())),
        };
        HashMap::from([(self.name.clone(), health)])
    }
}
