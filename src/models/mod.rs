pub mod project;
pub mod shopping;
pub mod user;

pub use project::*;
pub use shopping::*;
pub use user::*;

/// Fresh identifier for records and embedded entries.
pub fn new_id() -> String {
    ulid::Ulid::new().to_string()
}
