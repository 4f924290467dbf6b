//! Request handlers.

pub mod integrity;
pub mod public_file;
pub mod video_get;
pub mod video_upload;
