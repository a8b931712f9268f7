//! Notarization records: the memo written on the ledger for a published spec.
//!
//! Wire form: `<name>:j{"app-spec-cid":"<cid>","app-spec-url":"<gateway><cid>"}`.
//! The `:j` marker says the rest of the note is JSON.

use notary_core::Cid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const JSON_MARKER: &[u8] = b":j";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("note has no `:j` JSON marker")]
    MissingMarker,

    #[error("note name is not UTF-8")]
    InvalidName,

    #[error("note body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Field order is fixed by declaration order.
#[derive(Serialize, Deserialize)]
struct NoteBody {
    #[serde(rename = "app-spec-cid")]
    cid: Cid,
    #[serde(rename = "app-spec-url")]
    url: String,
}

/// What a deployment notarizes: a logical name and where its spec lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotarizationRecord {
    pub name: String,
    pub cid: Cid,
    /// `gateway_base + cid`.
    pub url: String,
}

impl NotarizationRecord {
    pub fn new(name: impl Into<String>, cid: Cid, gateway_base: &str) -> Self {
        let url = format!("{}{}", gateway_base, cid);
        Self {
            name: name.into(),
            cid,
            url,
        }
    }

    /// Record for `name` with a stand-in CID, used to size the notarization
    /// before the real CID exists.
    ///
    /// The stand-in has the length of a CIDv1 sha2-256 identifier, the
    /// longest form pinning services return, so the draft note is never
    /// shorter than the final one.
    pub fn draft(name: impl Into<String>, gateway_base: &str) -> Self {
        Self::new(name, Cid::for_bytes(&[]), gateway_base)
    }

    /// Note bytes for the notarization transaction.
    pub fn to_note(&self) -> Result<Vec<u8>, RecordError> {
        let body = NoteBody {
            cid: self.cid.clone(),
            url: self.url.clone(),
        };
        let mut note = Vec::with_capacity(self.name.len() + 128);
        note.extend_from_slice(self.name.as_bytes());
        note.extend_from_slice(JSON_MARKER);
        serde_json::to_writer(&mut note, &body)?;
        Ok(note)
    }

    /// Parse a note written by [`to_note`](Self::to_note).
    pub fn decode(note: &[u8]) -> Result<Self, RecordError> {
        let split = note
            .windows(JSON_MARKER.len() + 1)
            .position(|w| w.starts_with(JSON_MARKER) && w[JSON_MARKER.len()] == b'{')
            .ok_or(RecordError::MissingMarker)?;

        let name = std::str::from_utf8(&note[..split]).map_err(|_| RecordError::InvalidName)?;
        let body: NoteBody = serde_json::from_slice(&note[split + JSON_MARKER.len()..])?;

        Ok(Self {
            name: name.to_owned(),
            cid: body.cid,
            url: body.url,
        })
    }
}
