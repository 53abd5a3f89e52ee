// SPDX-License-Identifier: GPL-3.0-only

//! In-process authority with a scripted consent answer

use super::{AuthorizationState, CaptureAuthority};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::debug;

/// How the simulated user answers the consent prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentResponse {
    #[default]
    Grant,
    Deny,
    /// Close the prompt without answering; state stays undetermined
    Dismiss,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<AuthorizationState>,
    response: ConsentResponse,
    prompts: AtomicUsize,
}

/// Simulated capture-permission subsystem
///
/// Clones share state, so a test can keep one handle and give another to the
/// gate.
#[derive(Debug, Clone)]
pub struct MemoryAuthority {
    inner: Arc<Inner>,
}

impl MemoryAuthority {
    /// Authority that grants when prompted
    pub fn new(state: AuthorizationState) -> Self {
        Self::with_response(state, ConsentResponse::default())
    }

    pub fn with_response(state: AuthorizationState, response: ConsentResponse) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                response,
                prompts: AtomicUsize::new(0),
            }),
        }
    }

    /// Number of consent prompts shown so far
    pub fn prompt_count(&self) -> usize {
        self.inner.prompts.load(Ordering::SeqCst)
    }

    /// Change the state as if the user edited system settings
    pub fn set_status(&self, state: AuthorizationState) {
        *lock(&self.inner.state) = state;
    }
}

fn lock(state: &Mutex<AuthorizationState>) -> MutexGuard<'_, AuthorizationState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CaptureAuthority for MemoryAuthority {
    fn status(&self) -> AuthorizationState {
        *lock(&self.inner.state)
    }

    fn request_access(&self, reply: oneshot::Sender<bool>) {
        self.inner.prompts.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);

        // Answer from another thread, like a real consent dialog
        std::thread::spawn(move || {
            let granted = match inner.response {
                ConsentResponse::Grant => true,
                ConsentResponse::Deny => false,
                ConsentResponse::Dismiss => {
                    debug!("Simulated consent prompt dismissed");
                    return;
                }
            };

            *lock(&inner.state) = if granted {
                AuthorizationState::Authorized
            } else {
                AuthorizationState::Denied
            };
            debug!(granted, "Simulated consent prompt answered");
            let _ = reply.send(granted);
        });
    }
}
