pub mod extraction;
pub mod oscillation;
pub mod propagation;

mod traits;

pub use traits::ModuleExecutor;
