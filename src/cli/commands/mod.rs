pub mod fork_worker;
pub mod list;
pub mod run;

pub use fork_worker::*;
pub use list::*;
pub use run::*;
