pub mod forms;
pub mod identity;
pub mod item;

pub use identity::Identity;
pub use item::{Item, ItemChanges, ItemList, NewItem, Owner};
