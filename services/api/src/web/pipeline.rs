//! services/api/src/web/pipeline.rs
//!
//! Runs one detection or summarization request end to end: claim the session's
//! slot, normalize and extract the submission, run the engine off the async
//! runtime, and commit the outcome.

use crate::web::state::{AppState, SessionWorkspace};
use news_guardian_core::domain::{DetectionVerdict, SubmissionInput, SummaryResult};
use news_guardian_core::error::{GuardianError, GuardianResult};
use news_guardian_core::normalizer::{normalize, resolve};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn run_detection(
    state: &AppState,
    workspace: &SessionWorkspace,
    input: SubmissionInput,
) -> GuardianResult<DetectionVerdict> {
    let ticket = workspace.detection.begin()?;
    let engine = state.analysis.clone();
    let extractor = state.extractor.clone();

    let work = async move {
        let source = normalize(input)?;
        let kind = source.kind();
        let payload = resolve(source, extractor.as_ref()).await?;
        info!(
            "Analyzing {} submission ({} bytes)",
            kind.as_str(),
            payload.byte_len()
        );
        tokio::task::spawn_blocking(move || engine.analyze(&payload))
            .await
            .map_err(|e| GuardianError::Analysis(format!("analysis task failed: {}", e)))?
    };

    let outcome = guarded(ticket.token(), state.config.request_timeout, work).await;
    log_failure("detection", &outcome);
    ticket.finish(outcome)
}

pub async fn run_summary(
    state: &AppState,
    workspace: &SessionWorkspace,
    input: SubmissionInput,
    language: String,
) -> GuardianResult<SummaryResult> {
    let ticket = workspace.summary.begin()?;
    let engine = state.summarizer.clone();
    let extractor = state.extractor.clone();

    let work = async move {
        let source = normalize(input)?;
        let kind = source.kind();
        let payload = resolve(source, extractor.as_ref()).await?;
        info!(
            "Summarizing {} submission ({} bytes) in '{}'",
            kind.as_str(),
            payload.byte_len(),
            language
        );
        tokio::task::spawn_blocking(move || engine.summarize(&payload, &language))
            .await
            .map_err(|e| GuardianError::Summarization(format!("summary task failed: {}", e)))?
    };

    let outcome = guarded(ticket.token(), state.config.request_timeout, work).await;
    log_failure("summarization", &outcome);
    ticket.finish(outcome)
}

/// Races `work` against cancellation and a deadline.
pub async fn guarded<T, F>(token: CancellationToken, limit: Duration, work: F) -> GuardianResult<T>
where
    F: Future<Output = GuardianResult<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(GuardianError::Cancelled),
        outcome = tokio::time::timeout(limit, work) => {
            outcome.unwrap_or_else(|_| Err(GuardianError::Timeout(limit)))
        }
    }
}

fn log_failure<T>(capability: &str, outcome: &GuardianResult<T>) {
    if let Err(e) = outcome {
        warn!("{} request failed ({}): {}", capability, e.kind(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LocalExtractor, MemoryStore};
    use crate::config::Config;
    use news_guardian_core::analysis::SeededScorer;
    use news_guardian_core::domain::ContentPayload;
    use news_guardian_core::ports::{Assessment, ScoringStrategy};
    use std::sync::{mpsc, Arc, Mutex};

    /// Blocks inside the engine until the test releases it.
    struct GatedScorer {
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl ScoringStrategy for GatedScorer {
        fn assess(&self, _payload: &ContentPayload) -> GuardianResult<Assessment> {
            let gate = self.gate.lock().unwrap();
            gate.recv()
                .map_err(|_| GuardianError::Analysis("gate closed".to_string()))?;
            Ok(Assessment {
                fake_probability: 80,
                evidence: Vec::new(),
            })
        }
    }

    fn state_with(scorer: Arc<dyn ScoringStrategy>, timeout: Duration) -> Arc<AppState> {
        let config = Config {
            request_timeout: timeout,
            ..Config::default()
        };
        Arc::new(AppState::new(
            Arc::new(config),
            Arc::new(MemoryStore::new()),
            Arc::new(LocalExtractor::new()),
            scorer,
        ))
    }

    fn gated(timeout: Duration) -> (Arc<AppState>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let scorer = Arc::new(GatedScorer {
            gate: Mutex::new(rx),
        });
        (state_with(scorer, timeout), tx)
    }

    async fn wait_until_busy(workspace: &SessionWorkspace) {
        while !workspace.detection.is_busy() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn second_detection_is_busy_and_first_result_survives() {
        let (state, release) = gated(Duration::from_secs(5));
        let workspace = state.workspace("s1");

        let first = tokio::spawn({
            let state = state.clone();
            let workspace = workspace.clone();
            async move {
                run_detection(&state, &workspace, SubmissionInput::text("First story.")).await
            }
        });
        wait_until_busy(&workspace).await;

        let second = run_detection(&state, &workspace, SubmissionInput::text("Second.")).await;
        assert_eq!(second, Err(GuardianError::Busy));

        release.send(()).unwrap();
        let verdict = first.await.unwrap().unwrap();
        assert!(verdict.is_fake);
        assert_eq!(verdict.confidence, 80);
        assert_eq!(workspace.detection.latest(), Some(verdict));
        assert!(!workspace.detection.is_busy());
    }

    #[tokio::test]
    async fn slow_engines_time_out_and_free_the_slot() {
        let (state, release) = gated(Duration::from_millis(50));
        let workspace = state.workspace("s1");

        let outcome = run_detection(&state, &workspace, SubmissionInput::text("Story.")).await;
        assert_eq!(
            outcome,
            Err(GuardianError::Timeout(Duration::from_millis(50)))
        );
        assert!(!workspace.detection.is_busy());
        assert_eq!(workspace.detection.latest(), None);
        drop(release);
    }

    #[tokio::test]
    async fn reset_cancels_a_pending_detection() {
        let (state, release) = gated(Duration::from_secs(5));
        let workspace = state.workspace("s1");

        let pending = tokio::spawn({
            let state = state.clone();
            let workspace = workspace.clone();
            async move { run_detection(&state, &workspace, SubmissionInput::text("Story.")).await }
        });
        wait_until_busy(&workspace).await;

        workspace.detection.reset();
        assert_eq!(pending.await.unwrap(), Err(GuardianError::Cancelled));
        assert_eq!(workspace.detection.latest(), None);
        drop(release);
    }

    #[tokio::test]
    async fn invalid_input_keeps_the_last_verdict() {
        let state = state_with(Arc::new(SeededScorer::new(3)), Duration::from_secs(5));
        let workspace = state.workspace("s1");

        let verdict = run_detection(&state, &workspace, SubmissionInput::text("A real story."))
            .await
            .unwrap();
        let err = run_detection(&state, &workspace, SubmissionInput::text("   "))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "validation");
        assert_eq!(workspace.detection.latest(), Some(verdict));
    }

    #[tokio::test]
    async fn identical_detections_agree() {
        let state = state_with(Arc::new(SeededScorer::new(3)), Duration::from_secs(5));
        let workspace = state.workspace("s1");
        let input = || SubmissionInput::text("The council approved the budget on Monday.");

        let first = run_detection(&state, &workspace, input()).await.unwrap();
        let second = run_detection(&state, &workspace, input()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn summaries_reject_unknown_languages() {
        let state = state_with(Arc::new(SeededScorer::new(3)), Duration::from_secs(5));
        let workspace = state.workspace("s1");

        let err = run_summary(
            &state,
            &workspace,
            SubmissionInput::text("Markets rallied today. Investors cheered."),
            "xx".to_string(),
        )
        .await
        .unwrap_err();
        assert_eq!(err, GuardianError::UnsupportedLanguage("xx".to_string()));

        let summary = run_summary(
            &state,
            &workspace,
            SubmissionInput::text("Markets rallied today. Investors cheered."),
            "hi".to_string(),
        )
        .await
        .unwrap();
        assert_eq!(workspace.summary.latest(), Some(summary));
    }
}
