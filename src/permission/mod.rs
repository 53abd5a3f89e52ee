// SPDX-License-Identifier: GPL-3.0-only

//! Camera capture permission gate
//!
//! The gate reads the platform's consent state through an injected
//! [`CaptureAuthority`] and only ever prompts while the state is
//! [`AuthorizationState::Undetermined`]. The prompt outcome is delivered once,
//! through a oneshot channel.

pub mod device_node;
pub mod memory;
pub mod portal;

pub use device_node::DeviceNodeAuthority;
pub use memory::{ConsentResponse, MemoryAuthority};
pub use portal::PortalAuthority;

use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// The user's camera consent decision as tracked by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationState {
    /// The user has not been asked yet
    Undetermined,
    /// Camera access granted
    Authorized,
    /// The user refused access
    Denied,
    /// Access is blocked by policy or no camera is available
    Restricted,
}

impl AuthorizationState {
    /// Denied and Restricted cannot change without leaving the app
    pub fn is_terminal_refusal(self) -> bool {
        matches!(self, Self::Denied | Self::Restricted)
    }
}

impl fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Undetermined => "undetermined",
            Self::Authorized => "authorized",
            Self::Denied => "denied",
            Self::Restricted => "restricted",
        };
        f.write_str(name)
    }
}

/// Platform capture-permission subsystem
pub trait CaptureAuthority: Send + Sync {
    /// Current consent state, read fresh on every call
    fn status(&self) -> AuthorizationState;

    /// Show the consent prompt and send the outcome on `reply`
    ///
    /// May reply from any thread. Dropping `reply` without sending counts as
    /// a refusal.
    fn request_access(&self, reply: oneshot::Sender<bool>);
}

impl<A: CaptureAuthority + ?Sized> CaptureAuthority for Arc<A> {
    fn status(&self) -> AuthorizationState {
        (**self).status()
    }

    fn request_access(&self, reply: oneshot::Sender<bool>) {
        (**self).request_access(reply)
    }
}

impl<A: CaptureAuthority + ?Sized> CaptureAuthority for Box<A> {
    fn status(&self) -> AuthorizationState {
        (**self).status()
    }

    fn request_access(&self, reply: oneshot::Sender<bool>) {
        (**self).request_access(reply)
    }
}

/// What the caller should do after [`PermissionGate::ensure_access`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Camera can be used
    Granted,
    /// The user was prompted just now and refused
    Declined,
    /// Refused earlier or restricted; the user has to change system settings
    NeedsSettings(AuthorizationState),
}

/// Queries and requests camera authorization
#[derive(Debug, Clone)]
pub struct PermissionGate<A> {
    authority: A,
}

impl<A: CaptureAuthority> PermissionGate<A> {
    pub fn new(authority: A) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Read the current consent state without side effects
    pub fn check_authorization(&self) -> AuthorizationState {
        let state = self.authority.status();
        debug!(%state, "Camera authorization checked");
        state
    }

    /// Prompt for access if undetermined and report the outcome once
    ///
    /// `callback` fires exactly once. When a prompt is needed it runs on a
    /// helper thread after the platform answers; otherwise it runs before this
    /// returns, with the existing state. Returns whether a prompt was shown.
    pub fn request_authorization<F>(&self, callback: F) -> bool
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let state = self.authority.status();
        if state != AuthorizationState::Undetermined {
            debug!(%state, "Authorization already decided, not prompting");
            callback(state == AuthorizationState::Authorized);
            return false;
        }

        let (tx, rx) = oneshot::channel();
        info!("Requesting camera access");
        self.authority.request_access(tx);

        deliver_answer(rx, callback, |job| {
            std::thread::Builder::new()
                .name("camera-consent".into())
                .spawn(job)
                .map(|_| ())
        });

        true
    }

    /// Prompt for access if undetermined and await the outcome
    ///
    /// Resolves immediately with the existing state when no prompt is needed.
    pub async fn request(&self) -> bool {
        let state = self.authority.status();
        if state != AuthorizationState::Undetermined {
            debug!(%state, "Authorization already decided, not prompting");
            return state == AuthorizationState::Authorized;
        }

        let (tx, rx) = oneshot::channel();
        info!("Requesting camera access");
        self.authority.request_access(tx);

        match rx.await {
            Ok(granted) => {
                info!(granted, "Camera access prompt answered");
                granted
            }
            Err(_) => {
                warn!("Camera access prompt closed without an answer");
                false
            }
        }
    }

    /// Check the state and prompt when it is still undetermined
    pub async fn ensure_access(&self) -> AccessDecision {
        match self.check_authorization() {
            AuthorizationState::Authorized => AccessDecision::Granted,
            AuthorizationState::Undetermined => {
                if self.request().await {
                    AccessDecision::Granted
                } else {
                    AccessDecision::Declined
                }
            }
            state => {
                info!(%state, "Camera access refused, settings change required");
                AccessDecision::NeedsSettings(state)
            }
        }
    }
}

type ListenerJob = Box<dyn FnOnce() + Send + 'static>;

/// Hand the prompt answer to `callback` from a listener started by `spawn`
///
/// If the listener cannot be started the callback still fires, with `false`.
fn deliver_answer<F, S>(rx: oneshot::Receiver<bool>, callback: F, spawn: S)
where
    F: FnOnce(bool) + Send + 'static,
    S: FnOnce(ListenerJob) -> std::io::Result<()>,
{
    let slot = Arc::new(Mutex::new(Some(callback)));
    let listener_slot = Arc::clone(&slot);

    let job: ListenerJob = Box::new(move || {
        let granted = rx.blocking_recv().unwrap_or(false);
        info!(granted, "Camera access prompt answered");
        if let Some(callback) = take_callback(&listener_slot) {
            callback(granted);
        }
    });

    if let Err(e) = spawn(job) {
        warn!(error = %e, "Failed to spawn consent listener, reporting not granted");
        if let Some(callback) = take_callback(&slot) {
            callback(false);
        }
    }
}

fn take_callback<F>(slot: &Mutex<Option<F>>) -> Option<F> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).take()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_terminal_refusal() {
        assert!(AuthorizationState::Denied.is_terminal_refusal());
        assert!(AuthorizationState::Restricted.is_terminal_refusal());
        assert!(!AuthorizationState::Undetermined.is_terminal_refusal());
        assert!(!AuthorizationState::Authorized.is_terminal_refusal());
    }

    #[test]
    fn test_authorized_check_does_not_prompt() {
        let authority = MemoryAuthority::new(AuthorizationState::Authorized);
        let gate = PermissionGate::new(authority.clone());

        assert_eq!(gate.check_authorization(), AuthorizationState::Authorized);
        assert_eq!(authority.prompt_count(), 0);
    }

    #[test]
    fn test_decided_states_answer_without_prompt() {
        for (state, expected) in [
            (AuthorizationState::Authorized, true),
            (AuthorizationState::Denied, false),
            (AuthorizationState::Restricted, false),
        ] {
            let authority = MemoryAuthority::new(state);
            let gate = PermissionGate::new(authority.clone());
            let (tx, rx) = mpsc::channel();

            let prompted = gate.request_authorization(move |granted| {
                tx.send(granted).unwrap();
            });

            assert!(!prompted);
            assert_eq!(rx.recv_timeout(Duration::from_secs(1)), Ok(expected));
            assert_eq!(authority.prompt_count(), 0);
            assert_eq!(gate.check_authorization(), state);
        }
    }

    #[test]
    fn test_undetermined_prompts_and_callback_fires_once() {
        let authority = MemoryAuthority::with_response(
            AuthorizationState::Undetermined,
            ConsentResponse::Grant,
        );
        let gate = PermissionGate::new(authority.clone());
        let (tx, rx) = mpsc::channel();

        let prompted = gate.request_authorization(move |granted| {
            tx.send(granted).unwrap();
        });

        assert!(prompted);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
        // Sender was moved into the callback, so a second delivery is impossible
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert_eq!(authority.prompt_count(), 1);
        assert_eq!(gate.check_authorization(), AuthorizationState::Authorized);
    }

    #[tokio::test]
    async fn test_dismissed_prompt_counts_as_refusal() {
        let authority = MemoryAuthority::with_response(
            AuthorizationState::Undetermined,
            ConsentResponse::Dismiss,
        );
        let gate = PermissionGate::new(authority.clone());

        assert!(!gate.request().await);
        assert_eq!(gate.check_authorization(), AuthorizationState::Undetermined);
    }

    #[tokio::test]
    async fn test_ensure_access_decisions() {
        let granted = PermissionGate::new(MemoryAuthority::with_response(
            AuthorizationState::Undetermined,
            ConsentResponse::Grant,
        ));
        assert_eq!(granted.ensure_access().await, AccessDecision::Granted);

        let declined = PermissionGate::new(MemoryAuthority::with_response(
            AuthorizationState::Undetermined,
            ConsentResponse::Deny,
        ));
        assert_eq!(declined.ensure_access().await, AccessDecision::Declined);
        // A second pass lands in the terminal branch, no new prompt
        assert_eq!(
            declined.ensure_access().await,
            AccessDecision::NeedsSettings(AuthorizationState::Denied)
        );
        assert_eq!(declined.authority().prompt_count(), 1);

        let restricted = PermissionGate::new(MemoryAuthority::new(AuthorizationState::Restricted));
        assert_eq!(
            restricted.ensure_access().await,
            AccessDecision::NeedsSettings(AuthorizationState::Restricted)
        );
    }

    #[test]
    fn test_listener_spawn_failure_still_answers() {
        let (_reply, rx) = oneshot::channel::<bool>();
        let answers = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&answers);

        deliver_answer(
            rx,
            move |granted| seen.lock().unwrap().push(granted),
            |_job| Err(std::io::Error::other("no threads")),
        );

        assert_eq!(*answers.lock().unwrap(), vec![false]);
    }

    #[test]
    fn test_listener_delivers_answer_once() {
        let (reply, rx) = oneshot::channel();
        reply.send(true).unwrap();
        let answers = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&answers);

        deliver_answer(
            rx,
            move |granted| seen.lock().unwrap().push(granted),
            |job| {
                job();
                Ok(())
            },
        );

        assert_eq!(*answers.lock().unwrap(), vec![true]);
    }
}
