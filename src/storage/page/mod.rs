//! Page types and layout.
//!
//! - [`Page`] - The raw 4KB data container
//! - [`PageHeader`] - Page number and checksum at the start of every page

#[allow(clippy::module_inception)]
mod page;
mod page_header;

pub use page::Page;
pub use page_header::PageHeader;
