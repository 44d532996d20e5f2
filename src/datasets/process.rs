//! Benchmark runner that shells out to the fine-tuning command
//!
//! The command receives the dataset's hyperparameters and the run settings as
//! flags, fine-tunes the model `--num-finetunings` times and prints its scores
//! as one JSON document on stdout. Exit code 3 means the model cannot be
//! evaluated on the dataset; any other non-zero exit is a hard failure.

use super::runner::{BenchmarkRunner, RunConfig, RunResult};
use super::task::DatasetParams;
use crate::config::RunnerConfig;
use crate::error::{ScandevalError, ScandevalResult};
use async_trait::async_trait;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Exit code the fine-tuning command uses for "model incompatible with task"
pub const INCOMPATIBLE_MODEL_EXIT_CODE: i32 = 3;

/// Runs one dataset's benchmark through the external fine-tuning command
pub struct ProcessRunner {
    params: DatasetParams,
    config: RunnerConfig,
}

impl ProcessRunner {
    pub fn new(params: DatasetParams, config: RunnerConfig) -> Self {
        Self { params, config }
    }

    pub fn params(&self) -> &DatasetParams {
        &self.params
    }

    /// Build the command line for one model
    fn build_command(&self, model_id: &str, run: &RunConfig) -> Command {
        let mut cmd = Command::new(&self.config.binary);

        for arg in &self.config.args {
            cmd.arg(arg);
        }

        cmd.arg("--dataset").arg(&self.params.key);
        cmd.arg("--task").arg(self.params.task.as_str());
        cmd.arg("--model-id").arg(model_id);
        cmd.arg("--labels").arg(self.params.id2label.join(","));
        cmd.arg("--learning-rate")
            .arg(self.params.learning_rate.to_string());
        cmd.arg("--warmup-steps")
            .arg(self.params.warmup_steps.to_string());
        cmd.arg("--epochs").arg(self.params.epochs.to_string());
        cmd.arg("--batch-size").arg(run.batch_size.to_string());
        cmd.arg("--num-finetunings")
            .arg(run.num_finetunings.to_string());
        cmd.arg("--cache-dir").arg(&self.config.cache_dir);

        if run.evaluate_train {
            cmd.arg("--evaluate-train");
        }
        if run.progress_bar {
            cmd.arg("--progress-bar");
        }
        if run.verbose {
            cmd.arg("--verbose");
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }

    fn failure(&self, message: String) -> ScandevalError {
        ScandevalError::Runner {
            dataset: self.params.key.clone(),
            message,
        }
    }

    /// Map the finished process onto a result or one of the failure kinds
    fn interpret_output(&self, model_id: &str, output: Output) -> ScandevalResult<RunResult> {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        if output.status.success() {
            if !stderr.is_empty() {
                tracing::trace!(dataset = %self.params.key, model_id = %model_id, stderr = %stderr, "Fine-tuning output");
            }
            let value: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(|e| {
                self.failure(format!("Fine-tuning command printed invalid JSON: {}", e))
            })?;
            return Ok(RunResult::new(value));
        }

        if output.status.code() == Some(INCOMPATIBLE_MODEL_EXIT_CODE) {
            let reason = if stderr.is_empty() {
                format!("the model is not compatible with {}", self.params.task)
            } else {
                stderr.to_string()
            };
            return Err(ScandevalError::incompatible(model_id, reason));
        }

        Err(self.failure(format!(
            "{} exited with {}: {}",
            self.config.binary, output.status, stderr
        )))
    }
}

#[async_trait]
impl BenchmarkRunner for ProcessRunner {
    async fn benchmark(&self, model_id: &str, config: &RunConfig) -> ScandevalResult<RunResult> {
        if is_spacy_model(model_id) && !self.params.task.supports_spacy() {
            return Err(ScandevalError::incompatible(
                model_id,
                format!(
                    "Evaluation of {} predictions for SpaCy models is not yet implemented.",
                    self.params.task
                ),
            ));
        }

        let mut cmd = self.build_command(model_id, config);

        tracing::debug!(
            binary = %self.config.binary,
            dataset = %self.params.key,
            model_id = %model_id,
            num_finetunings = config.num_finetunings,
            batch_size = config.batch_size,
            "Spawning fine-tuning command"
        );

        let child = cmd
            .spawn()
            .map_err(|e| self.failure(format!("Failed to spawn {}: {}", self.config.binary, e)))?;

        // Dropping the child on timeout kills it
        let output = match self.config.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), child.wait_with_output())
                .await
                .map_err(|_| self.failure(format!("Timed out after {}s", secs)))?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| self.failure(format!("Failed to wait for {}: {}", self.config.binary, e)))?;

        self.interpret_output(model_id, output)
    }
}

/// spaCy pipelines live under the `spacy/` namespace on the hub
fn is_spacy_model(model_id: &str) -> bool {
    model_id.starts_with("spacy/")
}
