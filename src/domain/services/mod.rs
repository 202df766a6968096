mod selector;
pub mod timezone;

pub use selector::{ProviderSelector, RotationState, SelectionPolicy};
