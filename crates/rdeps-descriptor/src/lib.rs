//! rdeps Descriptor System
//!
//! Resource descriptors for the `resolvedDependencies` section of a SLSA
//! provenance predicate.
//!
//! # Core Concepts
//!
//! - [`ResourceDescriptor`]: in-toto v1 descriptor (`name`, `uri`, `digest`, `content`)
//! - [`Material`]: loose extractor output, converted with [`normalize`]
//! - [`DescriptorName`]: role tags shared by every aggregator
//! - [`dedupe`]: content-addressed duplicate removal, first occurrence wins
//!
//! # Example
//!
//! ```rust
//! use rdeps_descriptor::{dedupe, normalize_all, Material};
//!
//! let mats = vec![
//!     Material::with_digest("oci://alpine", "sha256", "abc"),
//!     Material::with_digest("oci://alpine", "sha256", "abc"),
//! ];
//! let rds = dedupe(normalize_all(mats, "inputs/result")).unwrap();
//! assert_eq!(rds.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod dedupe;
mod descriptor;
mod error;
mod hash;
mod material;

// Re-exports
pub use dedupe::{dedupe, identity_key};
pub use descriptor::{DescriptorName, DigestSet, ResourceDescriptor};
pub use error::DescriptorError;
pub use hash::ContentHash;
pub use material::{append_materials, normalize, normalize_all, Material};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
