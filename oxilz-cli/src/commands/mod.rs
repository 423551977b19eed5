//! Command implementations for OxiLZ CLI.

pub mod batch;
pub mod decode;
pub mod inspect;
pub mod presets;

pub use batch::cmd_batch;
pub use decode::cmd_decode;
pub use inspect::cmd_inspect;
pub use presets::cmd_presets;
