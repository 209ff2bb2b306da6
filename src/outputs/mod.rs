//! Output generation for scraped articles.
//!
//! # Submodules
//!
//! - [`json`]: Writes a [`Harvest`](crate::models::Harvest) to disk or renders it for stdout
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2026-10-18/
//!     ├── 08-00-00.json
//!     └── 14-30-12.json
//! ```

pub mod json;
