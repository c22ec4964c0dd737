//! # netcomm
//!
//! Community detection over delimited edge-list files.
//!
//! The pipeline sniffs the input's format (delimiter, header, column
//! count), validates it against the declared delimiter and weighting,
//! builds an undirected petgraph graph, hands it to one of several
//! interchangeable detection backends, and persists the node→community
//! mapping as a reloadable snapshot plus a grouped text file.
//!
//! ```no_run
//! use netcomm::pipeline::{self, RunConfig};
//! use netcomm::{Backend, BackendOptions, Weighting};
//!
//! let report = pipeline::run(&RunConfig {
//!     input: "edges.txt".into(),
//!     delimiter: None, // whitespace
//!     weighting: Weighting::Unweighted,
//!     backend: Backend::Louvain,
//!     options: BackendOptions::default(),
//!     write_output: true,
//! })?;
//! println!("{} communities", report.communities);
//! # Ok::<(), netcomm::Error>(())
//! ```

pub mod backend;
pub mod error;
pub mod filter;
pub mod generate;
pub mod graph;
pub mod mapping;
pub mod output;
pub mod pipeline;
pub mod relabel;
pub mod sanity;
pub mod sniff;

pub use backend::{Backend, BackendOptions, CommunityBackend, Detection, Quality};
pub use error::{Error, Result};
pub use graph::EdgeGraph;
pub use mapping::CommunityMapping;
pub use pipeline::{RunConfig, RunReport};
pub use sanity::{Verdict, Weighting};
pub use sniff::FormatInference;
