use serde::{Deserialize, Serialize};

// --- Surface → Host ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceMessage {
    #[serde(rename = "requestActiveDocument")]
    RequestActiveDocument,
    #[serde(rename = "viewDocument")]
    ViewDocument { path: String },
    #[serde(rename = "requestCandidateFiles")]
    RequestCandidateFiles,
    #[serde(rename = "requestCredential")]
    RequestCredential,
    #[serde(rename = "sendDocument")]
    SendDocument {
        credential: String,
        document: serde_json::Value,
    },
}

// --- Host → Surface ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostMessage {
    /// The text of a document. `path` is set when the push was triggered by
    /// a specific file (a view request or a change event) so the surface can
    /// filter updates for files it is not currently showing.
    #[serde(rename = "activeDocument")]
    ActiveDocument {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    #[serde(rename = "candidateFiles")]
    CandidateFiles { paths: Vec<String> },
    #[serde(rename = "credential")]
    Credential { value: String },
    #[serde(rename = "sendComplete")]
    SendComplete,
}
