//! Single-oracle observations from an external pipeline.
//!
//! A [`DataSource`] runs one pipeline spec through a [`PipelineRunner`] and
//! turns the first final result into an integer observation. The last answer
//! and when it was recorded are attached to every run as job metadata, so
//! pipelines can fall back to it.

use std::sync::{Arc, PoisonError, RwLock};

use feeds_types::fixed_point::parse_fixed_point;
use feeds_types::BigInt;
use serde_json::{json, Value};

use crate::clock::{unix_seconds, Clock, SystemClock};
use crate::{MedianError, Result};

/// One final result of a pipeline run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunResult {
    /// The produced value, a number or a decimal string.
    pub value: Value,
    /// Set when the pipeline failed to produce a value.
    pub error: Option<String>,
}

impl RunResult {
    /// A successful result.
    pub fn ok(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            error: None,
        }
    }

    /// A failed result.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            value: Value::Null,
            error: Some(error.into()),
        }
    }
}

/// Executes pipeline specs. Implemented outside this crate.
pub trait PipelineRunner: Send + Sync {
    /// Run `spec` with `vars` and return its final results.
    ///
    /// # Errors
    ///
    /// Implementations report failures as [`MedianError::Pipeline`].
    fn execute_run(&self, spec: &str, vars: &Value) -> Result<Vec<RunResult>>;
}

impl<T: PipelineRunner + ?Sized> PipelineRunner for &T {
    fn execute_run(&self, spec: &str, vars: &Value) -> Result<Vec<RunResult>> {
        (**self).execute_run(spec, vars)
    }
}

impl<T: PipelineRunner + ?Sized> PipelineRunner for Arc<T> {
    fn execute_run(&self, spec: &str, vars: &Value) -> Result<Vec<RunResult>> {
        (**self).execute_run(spec, vars)
    }
}

/// The last answer a data source produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BridgeMetadata {
    /// Last observed value.
    pub latest_answer: Option<BigInt>,
    /// Unix seconds when `latest_answer` was recorded.
    pub updated_at: Option<u64>,
}

impl BridgeMetadata {
    /// Metadata as pipeline variables. The answer is a decimal string.
    pub fn to_vars(&self) -> Value {
        json!({
            "latestAnswer": self.latest_answer.as_ref().map(ToString::to_string),
            "updatedAt": self.updated_at,
        })
    }
}

/// Produces this oracle's observation by running a pipeline.
#[derive(Debug)]
pub struct DataSource<R, C = SystemClock> {
    runner: R,
    spec: String,
    clock: C,
    current: RwLock<BridgeMetadata>,
}

impl<R: PipelineRunner> DataSource<R> {
    /// Create a data source for `spec` using the system clock.
    pub fn new(runner: R, spec: impl Into<String>) -> Self {
        Self::with_clock(runner, spec, SystemClock)
    }
}

impl<R: PipelineRunner, C: Clock> DataSource<R, C> {
    /// Create a data source for `spec` timestamping answers with `clock`.
    pub fn with_clock(runner: R, spec: impl Into<String>, clock: C) -> Self {
        Self {
            runner,
            spec: spec.into(),
            clock,
            current: RwLock::new(BridgeMetadata::default()),
        }
    }

    /// The pipeline spec this source runs.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Run the pipeline and return the observed value.
    ///
    /// Fractional results are truncated toward zero.
    ///
    /// # Errors
    ///
    /// - any error returned by the runner
    /// - [`MedianError::Pipeline`] if the run produced no final result, the
    ///   first result carries an error, or its value is not a decimal
    pub fn observe(&self) -> Result<BigInt> {
        let vars = json!({ "jobRun": self.current_answer().to_vars() });

        let results = self.runner.execute_run(&self.spec, &vars)?;
        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| MedianError::Pipeline("not enough results".to_string()))?;
        if let Some(err) = first.error {
            tracing::warn!(error = %err, "pipeline run failed");
            return Err(MedianError::Pipeline(err));
        }

        let text = match &first.value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => {
                tracing::warn!(value = %other, "pipeline result is not a decimal");
                return Err(MedianError::Pipeline(format!(
                    "cannot convert observation to decimal: {other}"
                )));
            }
        };
        let value = parse_fixed_point(&text, 0).map_err(|e| {
            tracing::warn!(value = %text, "pipeline result is not a decimal");
            MedianError::Pipeline(format!("cannot convert observation to decimal: {e}"))
        })?;

        self.update_answer(value.clone());
        tracing::debug!(spec_len = self.spec.len(), %value, "observed pipeline value");
        Ok(value)
    }

    /// The last recorded answer.
    pub fn current_answer(&self) -> BridgeMetadata {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_answer(&self, latest_answer: BigInt) {
        let updated_at = unix_seconds(self.clock.now());
        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = BridgeMetadata {
            latest_answer: Some(latest_answer),
            updated_at: Some(updated_at),
        };
    }
}
