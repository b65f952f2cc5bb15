//! Output generation for batch runs.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 08-15-02.json
//!     └── 19-40-55.json
//! ```

pub mod json;
