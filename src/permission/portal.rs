// SPDX-License-Identifier: GPL-3.0-only

//! XDG desktop portal camera authority
//!
//! Consent state comes from the portal permission store (`devices` table,
//! `camera` entry). Prompting goes through `org.freedesktop.portal.Camera`,
//! whose answer arrives as a `Response` signal on a request object.

use super::{AuthorizationState, CaptureAuthority};
use std::collections::HashMap;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use zbus::blocking::{Connection, Proxy};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_DEST: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_IFACE: &str = "org.freedesktop.portal.Camera";
const REQUEST_IFACE: &str = "org.freedesktop.portal.Request";

const STORE_DEST: &str = "org.freedesktop.impl.portal.PermissionStore";
const STORE_PATH: &str = "/org/freedesktop/impl/portal/PermissionStore";
const STORE_IFACE: &str = "org.freedesktop.impl.portal.PermissionStore";
const STORE_TABLE: &str = "devices";
const STORE_ID: &str = "camera";

/// Portal response code for a granted request
const RESPONSE_SUCCESS: u32 = 0;

/// Camera authority backed by the desktop portal over the session bus
#[derive(Debug, Clone, Default)]
pub struct PortalAuthority {
    /// Permission store key; empty for unsandboxed host apps
    app_id: String,
}

impl PortalAuthority {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }

    fn query_status(&self) -> zbus::Result<AuthorizationState> {
        let connection = Connection::session()?;

        let camera = Proxy::new(&connection, PORTAL_DEST, PORTAL_PATH, CAMERA_IFACE)?;
        let present: bool = camera.get_property("IsCameraPresent")?;
        if !present {
            debug!("Portal reports no camera");
            return Ok(AuthorizationState::Restricted);
        }

        let store = Proxy::new(&connection, STORE_DEST, STORE_PATH, STORE_IFACE)?;
        let lookup: zbus::Result<(HashMap<String, Vec<String>>, OwnedValue)> =
            store.call("Lookup", &(STORE_TABLE, STORE_ID));

        match lookup {
            Ok((permissions, _data)) => Ok(state_from_permissions(&permissions, &self.app_id)),
            Err(e) => {
                // The table does not exist until the first prompt
                debug!(error = %e, "No camera entry in permission store");
                Ok(AuthorizationState::Undetermined)
            }
        }
    }
}

/// Map a permission store entry to a consent state
pub(crate) fn state_from_permissions(
    permissions: &HashMap<String, Vec<String>>,
    app_id: &str,
) -> AuthorizationState {
    match permissions
        .get(app_id)
        .and_then(|values| values.first())
        .map(String::as_str)
    {
        Some("yes") => AuthorizationState::Authorized,
        Some("no") => AuthorizationState::Denied,
        _ => AuthorizationState::Undetermined,
    }
}

/// Ask the portal for camera access and wait for the user's answer
fn access_camera() -> zbus::Result<bool> {
    let connection = Connection::session()?;

    let token = format!("photo_filter_{}", uuid::Uuid::new_v4().simple());
    let sender = connection
        .unique_name()
        .map(|name| name.as_str().trim_start_matches(':').replace('.', "_"))
        .ok_or_else(|| zbus::Error::Failure("Session bus connection has no name".into()))?;

    // Subscribe before calling so the response cannot be missed
    let request_path = format!("{}/request/{}/{}", PORTAL_PATH, sender, token);
    let request = Proxy::new(
        &connection,
        PORTAL_DEST,
        request_path.as_str(),
        REQUEST_IFACE,
    )?;
    let mut responses = request.receive_signal("Response")?;

    let camera = Proxy::new(&connection, PORTAL_DEST, PORTAL_PATH, CAMERA_IFACE)?;
    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::from(token.as_str()));
    let handle: OwnedObjectPath = camera.call("AccessCamera", &(options,))?;
    debug!(handle = %handle, "Camera access request started");

    let message = responses
        .next()
        .ok_or_else(|| zbus::Error::Failure("Portal request closed without response".into()))?;
    let (response, _results): (u32, HashMap<String, OwnedValue>) = message.body().deserialize()?;

    Ok(response == RESPONSE_SUCCESS)
}

impl CaptureAuthority for PortalAuthority {
    fn status(&self) -> AuthorizationState {
        match self.query_status() {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Camera portal unavailable, treating access as restricted");
                AuthorizationState::Restricted
            }
        }
    }

    fn request_access(&self, reply: oneshot::Sender<bool>) {
        let spawned = std::thread::Builder::new()
            .name("camera-portal".into())
            .spawn(move || match access_camera() {
                Ok(granted) => {
                    info!(granted, "Camera portal answered");
                    let _ = reply.send(granted);
                }
                Err(e) => {
                    warn!(error = %e, "Camera portal request failed");
                }
            });

        if let Err(e) = spawned {
            warn!(error = %e, "Failed to spawn camera portal request");
        }
    }
}
