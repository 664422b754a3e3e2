//! Background decoding and the id-keyed template cache.

/// Image decoding into straight-alpha buffers.
pub mod decode;
/// Template loaders and the id-keyed template cache.
pub mod store;
