//! usezone-cli
//! ===========
//!
//! Command-line interface for the `usezone-core` zone lookup engine.
//!
//! This crate primarily provides a binary (`usezone-cli`). We include a small
//! library target so that docs.rs renders a documentation page and shows this
//! overview. See the README for full usage examples.
//!
//! Quick start
//! -----------
//!
//! ```text
//! usezone-cli --help
//! usezone-cli stats
//! usezone-cli address "東京都千代田区九段北4-1-3"
//! usezone-cli point 35.693593 139.753012
//! ```
//!
//! For programmatic access to the dataset and lookup APIs, use the
//! [`usezone-core`] crate directly.
//!
//! [`usezone-core`]: https://docs.rs/usezone-core
#![cfg_attr(docsrs, feature(doc_cfg))]

// This library target intentionally exposes no API; the binary is the primary
// deliverable. The presence of this file enables a rendered page on docs.rs.
