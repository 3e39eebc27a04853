//! Hydration payload embedded in full documents and segment responses

use crate::component::Props;
use crate::context::{ClientContext, RenderContext};
use crate::markup::escape_inline_json;
use crate::resolver::LayoutChain;
use crate::{Result, TrellisError};
use serde::{Deserialize, Serialize};

/// Props for one transmitted layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainProps {
    pub id: String,
    pub props: Props,
}

/// What the client needs to hydrate the markup it received
///
/// `chain` lists only the layouts actually transmitted: the whole chain for
/// a full document, the suffix below the swap point for a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationPayload {
    pub target_view_path: String,
    pub props: Props,
    pub context: ClientContext,
    pub layout_chain: Vec<ChainProps>,
}

impl HydrationPayload {
    /// Payload for the layouts of `chain` starting at position `from`
    pub fn for_chain(chain: &LayoutChain, from: usize, props: Props, context: &RenderContext) -> Self {
        Self {
            target_view_path: chain.view_path().to_string(),
            props,
            context: context.client_view(),
            layout_chain: chain
                .layouts()
                .iter()
                .skip(from)
                .map(|layout| ChainProps {
                    id: layout.id().to_string(),
                    props: layout.props(),
                })
                .collect(),
        }
    }

    /// Identifiers this payload hydrates: transmitted layouts then the view
    pub fn identifiers(&self) -> Vec<String> {
        self.layout_chain
            .iter()
            .map(|c| c.id.clone())
            .chain(std::iter::once(self.target_view_path.clone()))
            .collect()
    }

    /// Serialize for an inline `<script type="application/json">` block
    pub fn to_inline_json(&self) -> Result<String> {
        let json = serde_json::to_string(self)
            .map_err(|e| TrellisError::serialization(format!("hydration payload: {e}")))?;
        Ok(escape_inline_json(&json))
    }

    /// Parse a payload from JSON (inline-escaped or not)
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TrellisError::serialization(format!("hydration payload: {e}")))
    }
}

/// Convert handler output into props, failing at render time rather than
/// handing the client something it cannot read
pub fn to_props<T: Serialize + ?Sized>(value: &T) -> Result<Props> {
    serde_json::to_value(value).map_err(|e| TrellisError::serialization(format!("props: {e}")))
}
