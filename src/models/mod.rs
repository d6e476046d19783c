pub mod comment;
pub mod discussion;
pub mod reaction;

pub use comment::*;
pub use discussion::*;
pub use reaction::*;
