//! Navigation state machine and mount state
//!
//! ```text
//! Idle/Hydrated --navigate--> Requesting --received--> Swapping --hydrated--> Hydrated
//! Requesting --navigate--> Requesting          (supersedes the in-flight request)
//! Requesting/Swapping --failed--> Error --settle--> Idle
//! ```
//!
//! `Hydrated` behaves like `Idle` for new navigations. `Error` is left
//! immediately; it exists so observers can see the failure.

use crate::ClientError;
use std::collections::HashMap;
use trellis_core::{ClientContext, HydrationPayload, Props, SegmentResponse};

/// Where the navigator is
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavState {
    /// Nothing in flight; mount state reflects the hydrated chain
    #[default]
    Idle,
    /// Waiting for the server
    Requesting { target: String, generation: u64 },
    /// Response received, DOM being updated
    Swapping { target: String },
    /// Last navigation applied and hydrated
    Hydrated { target: String },
    /// Last navigation failed
    Error { target: String, error: ClientError },
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    Navigate { target: String, generation: u64 },
    Received,
    Hydrated,
    Failed(ClientError),
    Settle,
}

/// Next state, or `None` when `event` is not valid in `state`
pub fn transition(state: &NavState, event: NavEvent) -> Option<NavState> {
    use NavState as S;

    match (state, event) {
        (S::Idle | S::Hydrated { .. } | S::Requesting { .. }, NavEvent::Navigate { target, generation }) => {
            Some(S::Requesting { target, generation })
        }
        (S::Requesting { target, .. }, NavEvent::Received) => Some(S::Swapping {
            target: target.clone(),
        }),
        (S::Swapping { target }, NavEvent::Hydrated) => Some(S::Hydrated {
            target: target.clone(),
        }),
        (S::Requesting { target, .. } | S::Swapping { target }, NavEvent::Failed(error)) => {
            Some(S::Error {
                target: target.clone(),
                error,
            })
        }
        (S::Error { .. }, NavEvent::Settle) => Some(S::Idle),
        _ => None,
    }
}

/// What is currently mounted and hydrated
#[derive(Debug, Clone, PartialEq)]
pub struct ClientMountState {
    /// Layout ids followed by the view path
    pub mounted_chain: Vec<String>,
    /// Props of the mounted page
    pub props: Props,
    /// Context the mounted page was rendered with
    pub context: ClientContext,
    /// Props of each mounted layout by id
    pub layout_props: HashMap<String, Props>,
}

impl ClientMountState {
    /// Mount state described by a full-document payload
    pub fn from_payload(payload: &HydrationPayload) -> Self {
        Self {
            mounted_chain: payload.identifiers(),
            props: payload.props.clone(),
            context: payload.context.clone(),
            layout_props: payload
                .layout_chain
                .iter()
                .map(|l| (l.id.clone(), l.props.clone()))
                .collect(),
        }
    }

    /// Mount state after grafting a segment, or `None` if the segment does
    /// not fit the mounted chain
    pub fn after_segment(&self, segment: &SegmentResponse) -> Option<Self> {
        let mounted_chain = segment.apply_to(&self.mounted_chain)?;
        let kept = &self.mounted_chain[..segment.divergence_index];

        let mut layout_props: HashMap<String, Props> = self
            .layout_props
            .iter()
            .filter(|(id, _)| kept.contains(*id))
            .map(|(id, props)| (id.clone(), props.clone()))
            .collect();
        for layout in &segment.payload.layout_chain {
            layout_props.insert(layout.id.clone(), layout.props.clone());
        }

        Some(Self {
            mounted_chain,
            props: segment.payload.props.clone(),
            context: segment.payload.context.clone(),
            layout_props,
        })
    }

    /// Logical path of the mounted view
    pub fn view_path(&self) -> Option<&str> {
        self.mounted_chain.last().map(String::as_str)
    }
}
