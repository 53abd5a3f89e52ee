// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 device node authority
//!
//! Without a consent service the only gate is the file mode of
//! `/dev/video*`. There is nothing to prompt for, so the state is never
//! undetermined.

use super::{AuthorizationState, CaptureAuthority};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tracing::debug;

/// Default directory holding video device nodes
pub const DEFAULT_DEV_DIR: &str = "/dev";

/// Authority that checks read/write access to video device nodes
#[derive(Debug, Clone)]
pub struct DeviceNodeAuthority {
    dev_dir: PathBuf,
}

impl Default for DeviceNodeAuthority {
    fn default() -> Self {
        Self::new(DEFAULT_DEV_DIR)
    }
}

impl DeviceNodeAuthority {
    pub fn new(dev_dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
        }
    }

    /// `video*` nodes in the device directory, sorted by name
    pub fn device_nodes(&self) -> Vec<PathBuf> {
        let mut nodes: Vec<PathBuf> = std::fs::read_dir(&self.dev_dir)
            .map(|entries| {
                entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|path| {
                        path.file_name()
                            .and_then(|name| name.to_str())
                            .is_some_and(|name| name.starts_with("video"))
                    })
                    .collect()
            })
            .unwrap_or_default();
        nodes.sort();
        nodes
    }
}

fn is_read_writable(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
    unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::W_OK) == 0 }
}

impl CaptureAuthority for DeviceNodeAuthority {
    fn status(&self) -> AuthorizationState {
        let nodes = self.device_nodes();
        if nodes.is_empty() {
            debug!(dir = %self.dev_dir.display(), "No video device nodes");
            return AuthorizationState::Restricted;
        }

        if nodes.iter().any(|node| is_read_writable(node)) {
            AuthorizationState::Authorized
        } else {
            debug!(count = nodes.len(), "Video device nodes not accessible");
            AuthorizationState::Denied
        }
    }

    fn request_access(&self, reply: oneshot::Sender<bool>) {
        let _ = reply.send(self.status() == AuthorizationState::Authorized);
    }
}
