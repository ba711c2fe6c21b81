//! Local state machine for the preview surface.
//!
//! The surface owns rendering state only: the last document it was shown,
//! its parse status, the candidate list, its own selection, a display copy
//! of the credential, the carousel cursor, and the in-flight send flag. It
//! never touches the filesystem or the network — every effect goes through
//! the host channel.

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use crate::document::{Card, Document, ViewKind};
use crate::protocol::{HostMessage, SurfaceMessage};

/// Leading characters left visible when masking a credential.
const MASK_VISIBLE: usize = 5;
const MASK_CHAR: char = '•';

pub struct PreviewSurface {
    host_tx: UnboundedSender<SurfaceMessage>,
    /// Pretty-printed JSON when parsed; the received text verbatim otherwise.
    text: String,
    /// The parsed value. `None` means unparsed (or nothing received yet);
    /// this full value is what a send dispatches.
    value: Option<Value>,
    /// Typed view of `value` for rendering; default when shapeless.
    document: Document,
    candidates: Vec<String>,
    selected: Option<String>,
    credential: String,
    sending: bool,
    cursor: usize,
}

impl PreviewSurface {
    pub fn new(host_tx: UnboundedSender<SurfaceMessage>) -> Self {
        Self {
            host_tx,
            text: String::new(),
            value: None,
            document: Document::default(),
            candidates: Vec::new(),
            selected: None,
            credential: String::new(),
            sending: false,
            cursor: 0,
        }
    }

    /// Kick off the initial round-trips: active document, credential, and
    /// candidate list.
    pub fn request_initial(&self) {
        let _ = self.host_tx.send(SurfaceMessage::RequestActiveDocument);
        let _ = self.host_tx.send(SurfaceMessage::RequestCredential);
        let _ = self.host_tx.send(SurfaceMessage::RequestCandidateFiles);
    }

    /// Apply one host envelope.
    pub fn handle_message(&mut self, msg: HostMessage) {
        match msg {
            HostMessage::ActiveDocument { text, path } => {
                // Updates tagged with a path are for a specific file; only
                // the currently selected one is ours.
                if let Some(p) = &path
                    && self.selected.as_deref() != Some(p.as_str())
                {
                    return;
                }
                self.apply_document(text);
            }
            HostMessage::CandidateFiles { paths } => self.candidates = paths,
            HostMessage::Credential { value } => self.credential = value,
            HostMessage::SendComplete => self.sending = false,
        }
    }

    fn apply_document(&mut self, text: String) {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                self.text =
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.clone());
                self.document = Document::from_value(&value);
                self.value = Some(value);
            }
            Err(e) => {
                tracing::debug!("document is not valid JSON: {e}");
                self.text = text;
                self.value = None;
                self.document = Document::default();
            }
        }
        self.cursor = 0;
    }

    /// Select a candidate file and ask the host for its content.
    pub fn select_file(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.selected = Some(path.clone());
        let _ = self.host_tx.send(SurfaceMessage::ViewDocument { path });
    }

    /// Dispatch the current document. No-op while a send is in flight (the
    /// control is disabled) and without a credential or a parsed document.
    pub fn send(&mut self) {
        if self.sending {
            return;
        }
        if self.credential.is_empty() {
            tracing::warn!("send requested without an API key");
            return;
        }
        let Some(document) = self.value.clone() else {
            return;
        };
        self.sending = true;
        let _ = self.host_tx.send(SurfaceMessage::SendDocument {
            credential: self.credential.clone(),
            document,
        });
    }

    // --- carousel navigation ---

    pub fn next_card(&mut self) {
        let len = self.document.cards.len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor + 1) % len;
    }

    pub fn prev_card(&mut self) {
        let len = self.document.cards.len();
        if len == 0 {
            return;
        }
        self.cursor = if self.cursor == 0 { len - 1 } else { self.cursor - 1 };
    }

    /// Jump to a card by index; out-of-range indices are ignored.
    pub fn jump_to_card(&mut self, index: usize) {
        if index < self.document.cards.len() {
            self.cursor = index;
        }
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.document.cards.get(self.cursor)
    }

    // --- derived/display state ---

    /// Which view to render. Unparsed text always falls back to raw.
    pub fn view_kind(&self) -> ViewKind {
        if self.value.is_some() {
            self.document.view_kind()
        } else {
            ViewKind::Raw
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn set_credential(&mut self, value: String) {
        self.credential = value;
    }

    pub fn masked_credential(&self) -> String {
        mask(&self.credential)
    }

    pub fn sending(&self) -> bool {
        self.sending
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn card_count(&self) -> usize {
        self.document.cards.len()
    }
}

/// Display mask: the first five characters verbatim, one mask character per
/// remaining character. Short keys are shown in full.
pub fn mask(key: &str) -> String {
    let total = key.chars().count();
    let mut out: String = key.chars().take(MASK_VISIBLE).collect();
    out.extend(std::iter::repeat_n(
        MASK_CHAR,
        total.saturating_sub(MASK_VISIBLE),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn surface() -> (PreviewSurface, UnboundedReceiver<SurfaceMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PreviewSurface::new(tx), rx)
    }

    fn apply(surface: &mut PreviewSurface, value: serde_json::Value) {
        surface.handle_message(HostMessage::ActiveDocument {
            text: value.to_string(),
            path: None,
        });
    }

    fn carousel(n: usize) -> serde_json::Value {
        let cards: Vec<_> = (0..n).map(|i| json!({"title": format!("card {i}")})).collect();
        json!({ "cards": cards })
    }

    #[test]
    fn starts_empty_and_raw() {
        let (s, _rx) = surface();
        assert_eq!(s.view_kind(), ViewKind::Raw);
        assert!(s.text().is_empty());
        assert!(!s.sending());
    }

    #[test]
    fn parsed_document_is_pretty_printed() {
        let (mut s, _rx) = surface();
        apply(&mut s, json!({"text": "hi"}));
        assert_eq!(s.view_kind(), ViewKind::Message);
        assert_eq!(s.text(), "{\n  \"text\": \"hi\"\n}");
    }

    #[test]
    fn unparsable_text_is_kept_verbatim() {
        let (mut s, _rx) = surface();
        s.handle_message(HostMessage::ActiveDocument {
            text: "{not json".into(),
            path: None,
        });
        assert_eq!(s.view_kind(), ViewKind::Raw);
        assert_eq!(s.text(), "{not json");
    }

    #[test]
    fn cursor_wraps_forward_and_backward() {
        let (mut s, _rx) = surface();
        apply(&mut s, carousel(3));
        assert_eq!(s.cursor(), 0);

        s.next_card();
        s.next_card();
        assert_eq!(s.cursor(), 2);
        s.next_card();
        assert_eq!(s.cursor(), 0);

        s.prev_card();
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn cursor_stays_in_bounds_after_navigation() {
        let (mut s, _rx) = surface();
        apply(&mut s, carousel(4));
        for _ in 0..17 {
            s.next_card();
            assert!(s.cursor() < s.card_count());
        }
    }

    #[test]
    fn jump_ignores_out_of_range() {
        let (mut s, _rx) = surface();
        apply(&mut s, carousel(3));
        s.jump_to_card(2);
        assert_eq!(s.cursor(), 2);
        s.jump_to_card(7);
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn single_card_navigation_is_a_noop() {
        let (mut s, _rx) = surface();
        apply(&mut s, carousel(1));
        s.next_card();
        assert_eq!(s.cursor(), 0);
        s.prev_card();
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn new_document_resets_cursor() {
        let (mut s, _rx) = surface();
        apply(&mut s, carousel(5));
        s.jump_to_card(4);
        assert_eq!(s.cursor(), 4);

        apply(&mut s, carousel(2));
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn update_for_foreign_path_is_ignored() {
        let (mut s, _rx) = surface();
        s.select_file("/ws/mine.rcs.json");
        apply(&mut s, json!({"text": "old"}));

        s.handle_message(HostMessage::ActiveDocument {
            text: json!({"text": "other"}).to_string(),
            path: Some("/ws/other.rcs.json".into()),
        });
        assert!(s.text().contains("old"));

        s.handle_message(HostMessage::ActiveDocument {
            text: json!({"text": "mine v2"}).to_string(),
            path: Some("/ws/mine.rcs.json".into()),
        });
        assert!(s.text().contains("mine v2"));
    }

    #[test]
    fn untagged_update_always_applies() {
        let (mut s, _rx) = surface();
        s.select_file("/ws/mine.rcs.json");
        s.handle_message(HostMessage::ActiveDocument {
            text: json!({"text": "untagged"}).to_string(),
            path: None,
        });
        assert!(s.text().contains("untagged"));
    }

    #[test]
    fn select_file_emits_view_request() {
        let (mut s, mut rx) = surface();
        s.select_file("/ws/a.rcs.json");
        assert_eq!(s.selected(), Some("/ws/a.rcs.json"));
        assert!(matches!(
            rx.try_recv().unwrap(),
            SurfaceMessage::ViewDocument { path } if path == "/ws/a.rcs.json"
        ));
    }

    #[test]
    fn send_sets_flag_synchronously_and_dispatches() {
        let (mut s, mut rx) = surface();
        apply(&mut s, json!({"text": "hi"}));
        s.set_credential("key".into());

        s.send();
        assert!(s.sending());
        assert!(matches!(
            rx.try_recv().unwrap(),
            SurfaceMessage::SendDocument { credential, .. } if credential == "key"
        ));

        // Control is disabled while in flight: no second envelope.
        s.send();
        assert!(rx.try_recv().is_err());

        s.handle_message(HostMessage::SendComplete);
        assert!(!s.sending());
    }

    #[test]
    fn send_without_credential_never_sets_flag() {
        let (mut s, mut rx) = surface();
        apply(&mut s, json!({"text": "hi"}));
        s.send();
        assert!(!s.sending());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_without_document_is_a_noop() {
        let (mut s, mut rx) = surface();
        s.set_credential("key".into());
        s.send();
        assert!(!s.sending());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn array_document_send_is_optimistic_until_completion() {
        // The surface dispatches whatever parsed; the host rejects arrays
        // pre-flight and still completes, which clears the flag.
        let (mut s, mut rx) = surface();
        apply(&mut s, json!([{"text": "hi"}]));
        s.set_credential("key".into());

        s.send();
        assert!(s.sending());
        assert!(matches!(
            rx.try_recv().unwrap(),
            SurfaceMessage::SendDocument { document, .. } if document.is_array()
        ));

        s.handle_message(HostMessage::SendComplete);
        assert!(!s.sending());
    }

    #[test]
    fn candidate_and_credential_updates_replace_state() {
        let (mut s, _rx) = surface();
        s.handle_message(HostMessage::CandidateFiles {
            paths: vec!["/ws/a.rcs.json".into(), "/ws/b.rcs.json".into()],
        });
        assert_eq!(s.candidates().len(), 2);

        s.handle_message(HostMessage::Credential {
            value: "secret123".into(),
        });
        assert_eq!(s.credential(), "secret123");
        assert_eq!(s.masked_credential(), "secre••••");
    }

    #[test]
    fn mask_boundaries() {
        assert_eq!(mask(""), "");
        assert_eq!(mask("ab"), "ab");
        assert_eq!(mask("abcde"), "abcde");
        assert_eq!(mask("abcdefgh"), "abcde•••");
    }
}
