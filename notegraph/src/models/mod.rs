mod entry;
mod person;
mod project;

pub use entry::*;
pub use person::*;
pub use project::*;
