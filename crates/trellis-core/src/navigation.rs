//! Server half of the segment navigation protocol
//!
//! A client that already has a page mounted sends the identifiers of its
//! mounted chain (layout ids followed by the view path) in a request
//! header. The server compares that chain with the target chain position
//! by position. The length of the common prefix is the divergence index;
//! the element just above it is the swap point. Only the part of the
//! target chain below the swap point is rendered and sent, with hydration
//! data for that part alone, so layouts the client keeps are neither
//! re-rendered nor re-hydrated.
//!
//! The leaf is always re-rendered: when the mounted chain already equals
//! the target chain the divergence index is capped so the swap point is the
//! deepest layout and the page is rendered with the new props.
//!
//! With no header, an unparseable header, or no shared prefix, the server
//! answers with a full document.

use crate::component::Props;
use crate::context::RenderContext;
use crate::payload::HydrationPayload;
use crate::pipeline::{RenderPipeline, RenderedOutput};
use crate::resolver::LayoutChain;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Content type of a segment response body
pub const SEGMENT_CONTENT_TYPE: &str = "application/vnd.trellis.segment+json";

/// Value of the response-kind header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// A complete HTML document
    Full,
    /// A JSON segment to graft below a swap point
    Segment,
}

impl ResponseKind {
    /// Header value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Segment => "segment",
        }
    }

    /// Parse a header value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "full" => Some(Self::Full),
            "segment" => Some(Self::Segment),
            _ => None,
        }
    }
}

/// Parse the mounted-chain header
///
/// Accepts a JSON array of strings or a comma-separated list. Returns
/// `None` for an empty or malformed value, which callers treat as "nothing
/// mounted".
pub fn parse_mounted_chain(value: &str) -> Option<Vec<String>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let chain: Vec<String> = if value.starts_with('[') {
        serde_json::from_str(value).ok()?
    } else {
        value
            .split(',')
            .map(|id| id.trim().to_string())
            .collect()
    };

    if chain.is_empty() || chain.iter().any(|id| id.is_empty()) {
        return None;
    }
    Some(chain)
}

/// Encode a mounted chain for the request header (JSON array)
pub fn encode_mounted_chain(chain: &[String]) -> String {
    serde_json::to_string(chain).unwrap_or_else(|_| "[]".to_string())
}

/// Length of the longest common prefix, compared position by position
pub fn divergence_index<A: AsRef<str>, B: AsRef<str>>(current: &[A], target: &[B]) -> usize {
    current
        .iter()
        .zip(target)
        .take_while(|(a, b)| a.as_ref() == b.as_ref())
        .count()
}

/// What to send for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationPlan {
    /// Render the whole document
    Full,
    /// Render `target[divergence..]` below `swap_point`
    Segment {
        divergence: usize,
        swap_point: String,
    },
}

impl NavigationPlan {
    /// Decide between a full render and a segment
    pub fn for_chains(current: Option<&[String]>, target: &LayoutChain) -> Self {
        let Some(current) = current else {
            return Self::Full;
        };
        let target_ids = target.identifiers();
        // keep at least the leaf in the rendered suffix
        let divergence = divergence_index(current, &target_ids).min(target_ids.len() - 1);
        if divergence == 0 {
            return Self::Full;
        }
        Self::Segment {
            divergence,
            swap_point: target_ids[divergence - 1].clone(),
        }
    }
}

/// Body of a segment response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResponse {
    /// Deepest layout the client keeps
    pub swap_point: String,
    /// Number of mounted chain elements the client keeps
    pub divergence_index: usize,
    /// Identifiers of the replaced suffix: layouts then the view path
    pub new_chain: Vec<String>,
    /// Markup to place inside the swap point's slot
    pub markup: String,
    /// Hydration data for the suffix only
    pub payload: HydrationPayload,
}

impl SegmentResponse {
    /// Mounted chain after the client applies this segment to `mounted`
    ///
    /// Returns `None` if `mounted` does not have the swap point where this
    /// response expects it.
    pub fn apply_to(&self, mounted: &[String]) -> Option<Vec<String>> {
        if self.divergence_index == 0 || mounted.len() < self.divergence_index {
            return None;
        }
        if mounted[self.divergence_index - 1] != self.swap_point {
            return None;
        }
        let mut next = mounted[..self.divergence_index].to_vec();
        next.extend(self.new_chain.iter().cloned());
        Some(next)
    }
}

/// A rendered answer to a navigation or first-load request
#[derive(Debug)]
pub enum NavigationResponse {
    /// Full document (string or stream)
    Full(RenderedOutput),
    /// Segment for a client that keeps its outer layouts
    Segment(SegmentResponse),
}

impl NavigationResponse {
    /// Value for the response-kind header
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Full(_) => ResponseKind::Full,
            Self::Segment(_) => ResponseKind::Segment,
        }
    }
}

/// Render a segment response for a planned divergence
pub fn render_segment(
    pipeline: &RenderPipeline,
    chain: &LayoutChain,
    divergence: usize,
    swap_point: String,
    props: Props,
    context: &RenderContext,
) -> Result<SegmentResponse> {
    let segment = pipeline.render_segment(chain, divergence, props, context)?;
    let new_chain = chain.identifiers().split_off(divergence);
    Ok(SegmentResponse {
        swap_point,
        divergence_index: divergence,
        new_chain,
        markup: segment.markup,
        payload: segment.payload,
    })
}
