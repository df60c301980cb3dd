// Application layer - Use case interactors

pub mod batch_interactor;
pub mod container;

// Re-export interactors
pub use batch_interactor::{BatchInteractor, BatchRequest};
pub use container::{AppContainer, DefaultAppContainer};
