//! The host side of the preview protocol.
//!
//! [`HostSession`] is the durable controller: it is the only component that
//! touches the filesystem or the network. It reacts to one inbound envelope
//! or one filesystem event at a time, pushing state to the surface over the
//! outbound channel and never holding state the surface owns (selection,
//! cursor, in-flight flag).

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::credential;
use crate::protocol::{HostMessage, SurfaceMessage};
use crate::sender::{RemoteSender, SendError};
use crate::watcher::{DocumentIndex, WatchEvent};

/// A user-visible notification raised by the host outside the preview
/// channel (status toasts in whatever frontend hosts the session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Sender for host notices.
pub type NoticeSender = tokio::sync::mpsc::UnboundedSender<Notice>;

pub struct HostConfig {
    /// Workspace root; the credential file and candidate scan anchor here.
    pub root: PathBuf,
    /// The document the host environment considers "active", if any.
    pub active_document: Option<PathBuf>,
}

pub struct HostSession {
    config: HostConfig,
    index: Arc<dyn DocumentIndex>,
    sender: Arc<dyn RemoteSender>,
    surface_tx: UnboundedSender<HostMessage>,
    notices: Option<NoticeSender>,
}

impl HostSession {
    pub fn new(
        config: HostConfig,
        index: Arc<dyn DocumentIndex>,
        sender: Arc<dyn RemoteSender>,
        surface_tx: UnboundedSender<HostMessage>,
    ) -> Self {
        Self {
            config,
            index,
            sender,
            surface_tx,
            notices: None,
        }
    }

    /// Attach a notice channel for user-visible host notifications.
    pub fn with_notices(mut self, tx: NoticeSender) -> Self {
        self.notices = Some(tx);
        self
    }

    /// Drive the session: one envelope or filesystem event at a time, run to
    /// completion. Returns when the envelope channel closes (teardown); a
    /// closed watcher channel only stops event handling.
    pub async fn run(
        self,
        mut messages: UnboundedReceiver<SurfaceMessage>,
        mut fs_events: UnboundedReceiver<WatchEvent>,
    ) {
        let mut watching = true;
        loop {
            tokio::select! {
                msg = messages.recv() => match msg {
                    Some(msg) => self.handle_message(msg).await,
                    None => break,
                },
                ev = fs_events.recv(), if watching => match ev {
                    Some(ev) => self.handle_fs_event(ev).await,
                    None => watching = false,
                },
            }
        }
    }

    pub async fn handle_message(&self, msg: SurfaceMessage) {
        match msg {
            SurfaceMessage::RequestActiveDocument => self.push_active_document().await,
            SurfaceMessage::ViewDocument { path } => self.view_document(&path).await,
            SurfaceMessage::RequestCandidateFiles => self.push_candidates(),
            SurfaceMessage::RequestCredential => self.push_credential().await,
            SurfaceMessage::SendDocument {
                credential,
                document,
            } => self.send_document(&credential, document).await,
        }
    }

    pub async fn handle_fs_event(&self, event: WatchEvent) {
        match event {
            WatchEvent::Created(_) | WatchEvent::Deleted(_) => self.push_candidates(),
            WatchEvent::Changed(path) => {
                // List first, content second; the channel preserves the
                // order and the surface decides whether the path is the one
                // it is showing.
                self.push_candidates();
                match tokio::fs::read_to_string(&path).await {
                    Ok(text) => self.push(HostMessage::ActiveDocument {
                        text,
                        path: Some(path.to_string_lossy().into_owned()),
                    }),
                    Err(e) => {
                        tracing::warn!("failed to read changed file {}: {e}", path.display());
                    }
                }
            }
        }
    }

    async fn push_active_document(&self) {
        let Some(path) = &self.config.active_document else {
            return;
        };
        match tokio::fs::read_to_string(path).await {
            Ok(text) => self.push(HostMessage::ActiveDocument { text, path: None }),
            Err(e) => tracing::warn!("active document unreadable: {e}"),
        }
    }

    async fn view_document(&self, path: &str) {
        if path.is_empty() {
            return;
        }
        match tokio::fs::read_to_string(path).await {
            Ok(text) => self.push(HostMessage::ActiveDocument {
                text,
                path: Some(path.to_string()),
            }),
            // The surface keeps its prior state; the user can re-click.
            Err(e) => tracing::warn!("failed to read {path}: {e}"),
        }
    }

    fn push_candidates(&self) {
        let paths = self
            .index
            .enumerate()
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        self.push(HostMessage::CandidateFiles { paths });
    }

    async fn push_credential(&self) {
        let value = credential::read_credential(&self.config.root, credential::CREDENTIAL_KEY).await;
        // Exactly one response per request, empty on any lookup failure.
        self.push(HostMessage::Credential { value });
    }

    async fn send_document(&self, credential: &str, document: serde_json::Value) {
        // Pre-flight rejections still complete, so the surface's in-flight
        // flag can never stay stuck on a handled envelope.
        if credential.is_empty() {
            tracing::warn!("send requested without a credential");
            self.notify(Notice::Error("API key is required".into()));
            self.push(HostMessage::SendComplete);
            return;
        }
        if document.is_array() {
            self.notify(Notice::Error(SendError::ArrayPayload.to_string()));
            self.push(HostMessage::SendComplete);
            return;
        }

        match self.sender.send(credential, &document).await {
            Ok(response) => {
                tracing::debug!(?response, "document dispatched");
                self.notify(Notice::Info("RCS message sent successfully!".into()));
            }
            Err(e) => self.notify(Notice::Error(e.to_string())),
        }
        self.push(HostMessage::SendComplete);
    }

    fn push(&self, msg: HostMessage) {
        let _ = self.surface_tx.send(msg);
    }

    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Info(text) => tracing::info!("{text}"),
            Notice::Error(text) => tracing::warn!("{text}"),
        }
        if let Some(tx) = &self.notices {
            let _ = tx.send(notice);
        }
    }
}
