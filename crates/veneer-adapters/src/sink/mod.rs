//! Output sink adapters.

mod flush;

pub use flush::FlushWriter;
