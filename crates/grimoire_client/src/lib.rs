//! Client side of the grimoire catalog.
//!
//! Keeps a spell or house view in sync with the catalog server: builds list
//! queries from view controls, renders escaped cards, and re-fetches after
//! every mutation.

pub mod controller;
pub mod error;
pub mod form;
pub mod query;
pub mod render;
pub mod state;
pub mod transport;
pub mod view;

pub use controller::{LoadOutcome, SyncController};
pub use error::{ClientError, TransportError};
pub use form::{EditForm, FormField};
pub use query::{build_list_url, parse_base_url, resource_url, ListControls};
pub use render::{crest_for, describe_filters, escape_html, render_cards, render_text};
pub use state::{LoadTicket, Phase, ViewState};
pub use transport::{ApiRequest, ApiResponse, CatalogTransport, HttpMethod, HttpTransport};
pub use view::ViewEntity;
