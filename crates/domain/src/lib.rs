pub mod errors;
pub mod identifiers;
pub mod todo;
pub mod user;

pub use errors::*;
pub use identifiers::*;
pub use todo::*;
pub use user::*;
