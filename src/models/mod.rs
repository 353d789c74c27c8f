pub mod config;
pub mod error;
pub mod key_info;

pub use config::{ManagerConfig, CONFIG_ENV_VAR};
pub use error::{AuthManagerError, AuthResult};
pub use key_info::{ConnectionTarget, KeyPairInfo, KeyType, Outcome, UserAccount};
