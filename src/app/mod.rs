//! Application layer: page state, rendering, and the fallback catalog.

pub mod controller;
pub mod fallback;
pub mod render;
pub mod surface;

pub use controller::{run_load_more, AppController, AuthState, LoadMoreRequest};
pub use render::Renderer;
pub use surface::{Container, Notice, NoticeKind, PageSurface, Surface};

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::backend::AuthChange;

/// Consume session-change events and keep the page's auth widget in
/// sync. Runs until the sending side is dropped.
pub fn spawn_auth_listener<S>(
    app: Arc<Mutex<AppController<S>>>,
    mut events: broadcast::Receiver<AuthChange>,
) -> JoinHandle<()>
where
    S: Surface + 'static,
{
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(change) => app.lock().await.apply_auth_change(change).await,
                Err(RecvError::Lagged(missed)) => {
                    warn!("Auth listener lagged, skipped {} events", missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
