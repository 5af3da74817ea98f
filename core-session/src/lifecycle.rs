//! # Lifecycle Binding
//!
//! Drives a [`SessionController`] from the visibility of its host component:
//!
//! | Lifecycle state | Action |
//! |-----------------|--------|
//! | `Started` | `activate()` |
//! | `Resumed` | route volume keys to media (when configured) |
//! | `Paused` | nothing |
//! | `Stopped` | `deactivate()` |
//! | `Destroyed` / stream end | `teardown()`, then the binding ends |
//!
//! The binding task only holds a weak reference to the controller, so it
//! never keeps the controller alive on its own.

use crate::controller::SessionController;
use bridge_traits::{LifecycleObserver, LifecycleState};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Handle of a running lifecycle binding. Dropping it stops following the
/// lifecycle; the controller is left in whatever state it was in.
pub struct LifecycleBinding {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl LifecycleBinding {
    /// Stop following the lifecycle.
    pub fn unbind(self) {}

    /// Whether the binding task is still running.
    pub fn is_bound(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for LifecycleBinding {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for LifecycleBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleBinding")
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl SessionController {
    /// Follow `observer` until it reports `Destroyed`, its stream ends, or the
    /// returned binding is dropped.
    ///
    /// If the host component is already started when binding, the controller
    /// is activated right away. Must be called from within a Tokio runtime.
    pub fn bind_lifecycle(self: &Arc<Self>, observer: Arc<dyn LifecycleObserver>) -> LifecycleBinding {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(follow_lifecycle(
            Arc::downgrade(self),
            observer,
            cancel.clone(),
        ));
        LifecycleBinding { cancel, task }
    }
}

async fn follow_lifecycle(
    controller: Weak<SessionController>,
    observer: Arc<dyn LifecycleObserver>,
    cancel: CancellationToken,
) {
    let mut changes = match observer.subscribe_changes().await {
        Ok(changes) => changes,
        Err(err) => {
            warn!(error = %err, "failed to subscribe to lifecycle changes");
            return;
        }
    };

    match observer.get_state().await {
        Ok(state @ (LifecycleState::Started | LifecycleState::Resumed)) => {
            let Some(controller) = controller.upgrade() else {
                return;
            };
            controller.apply_lifecycle(LifecycleState::Started).await;
            if state == LifecycleState::Resumed {
                controller.apply_lifecycle(state).await;
            }
        }
        Ok(_) => {}
        Err(err) => warn!(error = %err, "failed to read lifecycle state"),
    }

    loop {
        let change = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            change = changes.next() => change,
        };

        let Some(controller) = controller.upgrade() else {
            break;
        };

        let state = change.unwrap_or_else(|| {
            debug!("lifecycle stream ended");
            LifecycleState::Destroyed
        });

        controller.apply_lifecycle(state).await;
        if state == LifecycleState::Destroyed {
            break;
        }
    }

    debug!("lifecycle binding finished");
}

impl SessionController {
    async fn apply_lifecycle(&self, state: LifecycleState) {
        debug!(?state, "lifecycle transition");
        match state {
            LifecycleState::Started => {
                // Failure is logged by the connection manager; the next start retries
                self.activate().await.ok();
            }
            LifecycleState::Resumed => self.route_volume_to_media().await,
            LifecycleState::Paused => {}
            LifecycleState::Stopped => self.deactivate().await,
            LifecycleState::Destroyed => self.teardown().await,
        }
    }
}
