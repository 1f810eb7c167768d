//! HTTP API for the recap engine.
//!
//! `POST /options` lists filter values for uploaded workbooks and
//! `POST /recap` builds the per-date recaps with their exports.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{OptionsRequest, RecapRequest, UploadedFile};
pub use response::{ApiError, DateRecapResponse, ExportLink, RecapResponse};
pub use state::AppState;
