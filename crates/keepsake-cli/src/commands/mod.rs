//! Command implementations.
//!
//! Each command returns its rendered output; `main` prints it.

pub mod decide;
pub mod preset;
pub mod tier;

pub use self::decide::execute_decide;
pub use self::preset::execute_preset;
pub use self::tier::execute_tier;
