//! One user session: every user action arrives as an [`Intent`] and maps to a
//! single form, dispatcher or renderer operation.

use serde::Serialize;
use tracing::{info, warn};

use crate::dispatch::{DispatchError, OptimizationService};
use crate::form::{EntryId, FormModel, ValidationErrors};
use crate::model::{HealthStatus, OptimizationRequest};
use crate::render::{ResultRenderer, ResultView};

pub const UNREACHABLE_MESSAGE: &str =
    "Cannot reach the optimization service. Check that the backend is running.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddEntry,
    RemoveEntry(EntryId),
    SetCapacity(String),
    SetName(EntryId, String),
    SetCost(EntryId, String),
    SetExpectedGain(EntryId, String),
    Clear,
    LoadExample,
    Calculate,
    CheckHealth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ExampleSource {
    Remote { case: String },
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    FormChanged,
    EntryAdded(EntryId),
    /// Edit or removal aimed at an entry that no longer exists.
    Unchanged,
    Invalid(ValidationErrors),
    Rendered(Box<ResultView>),
    ServiceError(String),
    Unreachable(String),
    ExampleLoaded(ExampleSource),
    Healthy(HealthStatus),
    Unhealthy(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Loading,
}

/// Message shown to the user for a failed call.
pub fn describe_failure(error: &DispatchError) -> String {
    match error {
        DispatchError::Unreachable { .. } => UNREACHABLE_MESSAGE.to_string(),
        DispatchError::Service { detail, .. } => detail.clone(),
        other => other.to_string(),
    }
}

pub struct Session<S> {
    form: FormModel,
    service: S,
    renderer: ResultRenderer,
    activity: Activity,
    preferred_example: String,
}

impl<S: OptimizationService> Session<S> {
    pub fn new(service: S, preferred_example: impl Into<String>) -> Self {
        Self {
            form: FormModel::new(),
            service,
            renderer: ResultRenderer::new(),
            activity: Activity::Idle,
            preferred_example: preferred_example.into(),
        }
    }

    pub fn form(&self) -> &FormModel {
        &self.form
    }

    pub fn renderer(&self) -> &ResultRenderer {
        &self.renderer
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub async fn handle(&mut self, intent: Intent) -> Outcome {
        match intent {
            Intent::AddEntry => Outcome::EntryAdded(self.form.add_entry()),
            Intent::RemoveEntry(id) => changed(self.form.remove_entry(id)),
            Intent::SetCapacity(text) => {
                self.form.set_capacity(text);
                Outcome::FormChanged
            }
            Intent::SetName(id, text) => changed(self.form.set_name(id, text)),
            Intent::SetCost(id, text) => changed(self.form.set_cost(id, text)),
            Intent::SetExpectedGain(id, text) => changed(self.form.set_expected_gain(id, text)),
            Intent::Clear => {
                self.form.clear();
                self.renderer.reset();
                Outcome::FormChanged
            }
            Intent::LoadExample => self.load_example().await,
            Intent::Calculate => self.calculate().await,
            Intent::CheckHealth => self.check_health().await,
        }
    }

    async fn calculate(&mut self) -> Outcome {
        let request = match self.form.build_request().into_validated() {
            Ok(request) => request,
            Err(errors) => {
                info!("refusing to submit: {} validation issue(s)", errors.len());
                return Outcome::Invalid(errors);
            }
        };

        self.activity = Activity::Loading;
        let result = self.service.optimize_detailed(&request).await;
        self.activity = Activity::Idle;

        match result {
            Ok(result) => Outcome::Rendered(Box::new(self.renderer.render(&result))),
            Err(error) => {
                warn!("optimization failed: {error}");
                let message = describe_failure(&error);
                if error.is_unreachable() {
                    Outcome::Unreachable(message)
                } else {
                    Outcome::ServiceError(message)
                }
            }
        }
    }

    async fn load_example(&mut self) -> Outcome {
        let remote = match self.service.examples().await {
            Ok(catalog) => catalog
                .pick(&self.preferred_example)
                .map(|(key, case)| (case.input.clone(), key.to_string())),
            Err(error) => {
                warn!("failed loading examples, using local example: {error}");
                None
            }
        };

        let (payload, source) = match remote {
            Some((payload, case)) => (payload, ExampleSource::Remote { case }),
            None => (OptimizationRequest::local_example(), ExampleSource::Local),
        };
        self.form.populate(&payload);
        self.renderer.reset();
        Outcome::ExampleLoaded(source)
    }

    async fn check_health(&self) -> Outcome {
        match self.service.health().await {
            Ok(status) => {
                if !status.is_healthy() {
                    warn!("optimization service reports status {}", status.status);
                }
                Outcome::Healthy(status)
            }
            Err(error) => {
                warn!("optimization service not available: {error}");
                Outcome::Unhealthy(describe_failure(&error))
            }
        }
    }
}

fn changed(applied: bool) -> Outcome {
    if applied {
        Outcome::FormChanged
    } else {
        Outcome::Unchanged
    }
}
