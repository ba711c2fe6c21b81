pub mod credential;
pub mod document;
pub mod host;
pub mod protocol;
pub mod sender;
pub mod surface;
pub mod watcher;

// Re-exports
pub use document::{Card, Document, Suggestion, ViewKind};
pub use host::{HostConfig, HostSession, Notice, NoticeSender};
pub use protocol::{HostMessage, SurfaceMessage};
pub use sender::{PinnacleSender, RemoteSender, SendError};
pub use surface::PreviewSurface;
pub use watcher::{DocumentIndex, PollWatcher, WatchEvent, WorkspaceIndex};
