//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::adapters::StaticCatalogue;
use crate::config::Config;
use crate::web::inflight::RequestSlot;
use news_guardian_core::analysis::AnalysisEngine;
use news_guardian_core::domain::{DetectionVerdict, SummaryResult, UserSession};
use news_guardian_core::intent::IntentResponder;
use news_guardian_core::ports::{ContentExtractor, NewsCatalogue, ScoringStrategy, SessionStore};
use news_guardian_core::summarization::SummarizationEngine;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub extractor: Arc<dyn ContentExtractor>,
    pub news: Arc<dyn NewsCatalogue>,
    pub analysis: AnalysisEngine,
    pub summarizer: Arc<SummarizationEngine>,
    pub responder: Arc<IntentResponder>,
    pub config: Arc<Config>,
    workspaces: Arc<Mutex<HashMap<String, WorkspaceEntry>>>,
}

struct WorkspaceEntry {
    workspace: Arc<SessionWorkspace>,
    last_used: Instant,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn SessionStore>,
        extractor: Arc<dyn ContentExtractor>,
        scorer: Arc<dyn ScoringStrategy>,
    ) -> Self {
        Self {
            store,
            extractor,
            news: Arc::new(StaticCatalogue::seeded()),
            analysis: AnalysisEngine::new(scorer),
            summarizer: Arc::new(SummarizationEngine::new()),
            responder: Arc::new(IntentResponder::default()),
            config,
            workspaces: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the request slots of a signed-in session, creating them on first use.
    ///
    /// Other sessions' slots that sat unused for longer than `workspace_idle` are
    /// dropped on the way, unless a request still holds or runs in them.
    pub fn workspace(&self, session_id: &str) -> Arc<SessionWorkspace> {
        let now = Instant::now();
        let mut workspaces = self
            .workspaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let idle_limit = self.config.workspace_idle;
        let before = workspaces.len();
        workspaces.retain(|id, entry| {
            id == session_id
                || now.duration_since(entry.last_used) < idle_limit
                || Arc::strong_count(&entry.workspace) > 1
                || entry.workspace.is_busy()
        });
        let pruned = before - workspaces.len();
        if pruned > 0 {
            debug!("Pruned {} idle session workspaces", pruned);
        }

        let entry = workspaces
            .entry(session_id.to_string())
            .or_insert_with(|| WorkspaceEntry {
                workspace: Arc::default(),
                last_used: now,
            });
        entry.last_used = now;
        Arc::clone(&entry.workspace)
    }

    /// Cancels whatever the session still has in flight and forgets its results.
    pub fn drop_workspace(&self, session_id: &str) {
        let removed = self
            .workspaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id)
            .map(|entry| entry.workspace);
        if let Some(workspace) = removed {
            workspace.detection.reset();
            workspace.summary.reset();
            info!("Dropped request slots for session {}", session_id);
        }
    }
}

//=========================================================================================
// Per-Session State
//=========================================================================================

/// One single-flight slot per capability for a signed-in session.
#[derive(Default)]
pub struct SessionWorkspace {
    pub detection: RequestSlot<DetectionVerdict>,
    pub summary: RequestSlot<SummaryResult>,
}

impl SessionWorkspace {
    pub fn is_busy(&self) -> bool {
        self.detection.is_busy() || self.summary.is_busy()
    }
}

/// Inserted into request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub session_id: String,
    pub user: UserSession,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LocalExtractor, MemoryStore};
    use news_guardian_core::analysis::SeededScorer;
    use std::time::Duration;

    fn state_with_idle(workspace_idle: Duration) -> AppState {
        let config = Config {
            workspace_idle,
            ..Config::default()
        };
        AppState::new(
            Arc::new(config),
            Arc::new(MemoryStore::new()),
            Arc::new(LocalExtractor::new()),
            Arc::new(SeededScorer::new(0)),
        )
    }

    fn tracked(state: &AppState) -> Vec<String> {
        let mut ids: Vec<String> = state.workspaces.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    #[test]
    fn same_session_gets_the_same_workspace() {
        let state = state_with_idle(Duration::from_secs(3600));
        let first = state.workspace("s1");
        let second = state.workspace("s1");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn idle_workspaces_are_pruned() {
        let state = state_with_idle(Duration::ZERO);
        drop(state.workspace("old"));
        let _current = state.workspace("new");
        assert_eq!(tracked(&state), vec!["new".to_string()]);
    }

    #[test]
    fn workspaces_in_use_survive_pruning() {
        let state = state_with_idle(Duration::ZERO);
        let held = state.workspace("held");
        let running = state.workspace("running");
        let _ticket = running.summary.begin().unwrap();
        drop(running);

        let _current = state.workspace("new");
        assert_eq!(
            tracked(&state),
            vec!["held".to_string(), "new".to_string(), "running".to_string()]
        );
        drop(held);
    }

    #[test]
    fn recent_workspaces_are_kept() {
        let state = state_with_idle(Duration::from_secs(3600));
        drop(state.workspace("a"));
        drop(state.workspace("b"));
        assert_eq!(tracked(&state), vec!["a".to_string(), "b".to_string()]);
    }
}
