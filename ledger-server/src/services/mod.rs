//! Business services over the tabular source
//!
//! Services read and write through [`TabularSource`](crate::source::TabularSource)
//! and know nothing about caching or sessions; the request router layers those
//! on top.

mod blobs;
mod customers;
mod sales;
mod settings;

pub use blobs::BlobSheet;
pub use customers::CustomerService;
pub use sales::{SalesService, UpdateSummary};
pub use settings::{GoalsView, PasswordsView, SettingsService, SettingsView};
