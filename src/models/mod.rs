//! Data carried through one invocation of the upload function.
//!
//! An inbound [`event::UploadEvent`] is turned into an
//! [`upload::UploadRequest`] (decoded bytes + storage key), written, and
//! answered with an [`response::UploadResponse`].

pub mod event;
pub mod response;
pub mod upload;
