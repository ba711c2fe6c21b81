use crossterm::event::Event as TermEvent;
use rcsview::{HostMessage, Notice};

/// Unified event type for the main loop.
pub enum AppEvent {
    Terminal(TermEvent),
    Host(HostMessage),
    Notice(Notice),
    Tick,
}
