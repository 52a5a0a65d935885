pub mod id;

pub use id::EntityId;
