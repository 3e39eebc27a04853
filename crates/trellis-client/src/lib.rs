//! # Trellis Client
//!
//! The browser-side half of segment navigation, written against small
//! traits so it can run headless: a [`NavigationTransport`] fetches targets
//! with the mounted chain attached, a [`DomHost`] applies swaps, and a
//! [`ClientRegistry`] attaches interactivity to exactly the elements a
//! response describes.
//!
//! ```rust,no_run
//! use trellis_client::{Bootstrap, ClientRegistry, HttpTransport, Inert, MemoryDom, Navigator};
//!
//! # async fn run(html: String) -> trellis_client::Result<()> {
//! let bootstrap = Bootstrap::from_document(&html, "__TRELLIS_DATA__")?;
//! let registry = ClientRegistry::new().with("root", Inert).with("/home", Inert);
//! let navigator = Navigator::start(
//!     &bootstrap,
//!     registry,
//!     HttpTransport::new("http://127.0.0.1:3000"),
//!     MemoryDom::new(html),
//!     "__TRELLIS_DATA__",
//! )?;
//! navigator.navigate("/home").await?;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod dom;
mod error;
pub mod hydrate;
pub mod navigator;
pub mod state;
pub mod transport;

pub use bootstrap::{Bootstrap, DEFAULT_DATA_SCRIPT_ID};
pub use dom::{DomHost, MemoryDom};
pub use error::{ClientError, Result};
pub use hydrate::{ClientRegistry, Hydrate, HydrationTarget, Inert};
pub use navigator::{NavigationOutcome, Navigator};
pub use state::{transition, ClientMountState, NavEvent, NavState};
pub use transport::{HttpTransport, NavigationReply, NavigationTransport, ProtocolHeaders};
