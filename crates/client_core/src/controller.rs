//! Form State Controller: owns the contact form's fields, inline errors and
//! submission status, and guards the relay call so only one runs at a time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::domain::{FormField, FormFields, FormSnapshot, SubmissionStatus, ValidationErrors};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{gateway::SubmissionGateway, validation};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Relay acknowledged the message; fields were reset.
    Sent,
    /// Relay call failed; fields were kept so the user can resubmit.
    Failed,
    /// Local correction needed. The relay was not called.
    Rejected(ValidationErrors),
    /// Another submission is still waiting on the relay.
    AlreadyInFlight,
}

#[derive(Debug, Default)]
struct FormState {
    fields: FormFields,
    errors: ValidationErrors,
    status: SubmissionStatus,
    in_flight: bool,
}

impl FormState {
    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            fields: self.fields.clone(),
            errors: self.errors.clone(),
            status: self.status.clone(),
            in_flight: self.in_flight,
        }
    }
}

pub struct ContactFormController {
    gateway: Arc<dyn SubmissionGateway>,
    inner: Mutex<FormState>,
    events: broadcast::Sender<FormSnapshot>,
}

impl ContactFormController {
    pub fn new(gateway: Arc<dyn SubmissionGateway>) -> Arc<Self> {
        let (events, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Arc::new(Self {
            gateway,
            inner: Mutex::new(FormState::default()),
            events,
        })
    }

    /// Every state change is published here as a full snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<FormSnapshot> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.state().snapshot()
    }

    pub fn fields(&self) -> FormFields {
        self.state().fields.clone()
    }

    pub fn errors(&self) -> ValidationErrors {
        self.state().errors.clone()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.state().status.clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state().in_flight
    }

    pub fn update_field(&self, field: FormField, value: impl Into<String>) {
        let snapshot = {
            let mut state = self.state();
            state.fields.set(field, value);
            if state.errors.clear(field) {
                debug!(%field, "cleared validation error on edit");
            }
            if !state.status.is_idle() {
                state.status = SubmissionStatus::Idle;
            }
            state.snapshot()
        };
        self.publish(snapshot);
    }

    pub fn validate(&self) -> ValidationErrors {
        validation::validate(&self.state().fields)
    }

    pub async fn submit(&self) -> SubmissionOutcome {
        let submission_id = Uuid::new_v4();
        let (fields, snapshot) = {
            let mut state = self.state();
            if state.in_flight {
                debug!(%submission_id, "submission already in flight; ignoring");
                return SubmissionOutcome::AlreadyInFlight;
            }

            let errors = validation::validate(&state.fields);
            if !errors.is_empty() {
                state.errors = errors.clone();
                let snapshot = state.snapshot();
                drop(state);
                debug!(%submission_id, invalid = errors.len(), "contact form rejected locally");
                self.publish(snapshot);
                return SubmissionOutcome::Rejected(errors);
            }

            state.errors = ValidationErrors::new();
            state.in_flight = true;
            state.status = SubmissionStatus::Idle;
            (state.fields.clone(), state.snapshot())
        };
        self.publish(snapshot);

        let guard = InFlightGuard { controller: self };
        info!(%submission_id, "sending contact message through relay");
        let result = self.gateway.send(&fields).await;

        let (outcome, snapshot) = {
            let mut state = self.state();
            state.in_flight = false;
            let outcome = match result {
                Ok(()) => {
                    info!(%submission_id, "contact message delivered");
                    state.status = SubmissionStatus::success();
                    state.fields = FormFields::default();
                    SubmissionOutcome::Sent
                }
                Err(error) => {
                    warn!(%submission_id, %error, "contact message delivery failed");
                    state.status = SubmissionStatus::failure();
                    SubmissionOutcome::Failed
                }
            };
            (outcome, state.snapshot())
        };
        drop(guard);
        self.publish(snapshot);
        outcome
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: FormSnapshot) {
        // No subscribers is fine.
        let _ = self.events.send(snapshot);
    }
}

/// Clears the in-flight flag if `submit` unwinds or its future is dropped
/// while the relay call is pending.
struct InFlightGuard<'a> {
    controller: &'a ContactFormController,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let snapshot = {
            let mut state = self.controller.state();
            if !state.in_flight {
                return;
            }
            state.in_flight = false;
            state.snapshot()
        };
        warn!("contact submission abandoned before the relay responded");
        self.controller.publish(snapshot);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
