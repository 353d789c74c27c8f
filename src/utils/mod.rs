pub mod path_validator;
pub mod sshd_config;

pub use path_validator::{expand_home, validate_hostname, validate_key_name, validate_username};
pub use sshd_config::{ConfigLine, SetAction, SshdConfig};
