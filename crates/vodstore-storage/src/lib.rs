//! Artifact store: per-video directories on local disk.
//!
//! Every ingested video owns one directory under the configured root,
//! named by its artifact identifier, holding the HLS playlist, the media
//! segments, and the thumbnail. The store exposes allocation plus the
//! existence/listing queries the integrity reconciler needs.

mod artifact;

pub use artifact::{ArtifactStore, StorageError, StorageResult};
