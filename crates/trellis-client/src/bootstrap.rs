//! Hydration bootstrap record
//!
//! Read once from the data block of a server-rendered document and handed
//! to the hydration entry point. It is never mutated; navigation keeps its
//! own mount state.

use crate::{ClientError, Result};
use trellis_core::markup::script_contents;
use trellis_core::HydrationPayload;

/// Default id of the inline data block
pub const DEFAULT_DATA_SCRIPT_ID: &str = "__TRELLIS_DATA__";

/// What a full document tells the client about itself
#[derive(Debug, Clone, PartialEq)]
pub struct Bootstrap {
    payload: HydrationPayload,
}

impl Bootstrap {
    /// Wrap an already decoded payload
    pub fn new(payload: HydrationPayload) -> Self {
        Self { payload }
    }

    /// Extract the payload from a full HTML document
    pub fn from_document(document: &str, data_script_id: &str) -> Result<Self> {
        let json = script_contents(document, data_script_id).ok_or_else(|| {
            ClientError::Decode(format!("no data block with id '{data_script_id}'"))
        })?;
        HydrationPayload::from_json(json)
            .map(Self::new)
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// The embedded payload
    pub fn payload(&self) -> &HydrationPayload {
        &self.payload
    }

    /// Identifiers of the chain the document was rendered for
    pub fn chain(&self) -> Vec<String> {
        self.payload.identifiers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_data_block_is_a_decode_error() {
        let err = Bootstrap::from_document("<html></html>", DEFAULT_DATA_SCRIPT_ID).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn reads_escaped_payload() {
        let doc = concat!(
            r#"<script type="application/json" id="__TRELLIS_DATA__">"#,
            r#"{"targetViewPath":"/a","props":{"q":"\u003c/script\u003e"},"#,
            r#""context":{"path":"/a","url":"/a","query":{},"locale":"en","extensions":{}},"#,
            r#""layoutChain":[{"id":"Root","props":{}}]}"#,
            "</script>"
        );
        let bootstrap = Bootstrap::from_document(doc, DEFAULT_DATA_SCRIPT_ID).unwrap();
        assert_eq!(bootstrap.payload().props["q"], "</script>");
        assert_eq!(bootstrap.chain(), vec!["Root", "/a"]);
    }
}
