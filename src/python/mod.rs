pub mod activation;
pub mod executor;

pub use activation::{ActivatedEnv, EnvironmentResolver};
pub use executor::AppExecutor;
