use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::SessionStatus;

/// Timers and streams owned by one session state. Leaving the state tears the
/// scope down: the token is cancelled and every task aborted.
pub(super) struct StateScope {
    status: SessionStatus,
    cancel_token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl StateScope {
    pub fn new(status: SessionStatus) -> Self {
        Self {
            status,
            cancel_token: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Token for a timer that can also be cancelled on its own, before the state exits.
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.retain(|handle| !handle.is_finished());
        self.tasks.push(tokio::spawn(task));
    }

    pub fn live_tasks(&self) -> usize {
        self.tasks.iter().filter(|handle| !handle.is_finished()).count()
    }

    pub fn teardown(&mut self) {
        self.cancel_token.cancel();
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for StateScope {
    fn drop(&mut self) {
        self.teardown();
    }
}
