pub mod command_runner;
pub mod config_mutator;
pub mod connection_tester;
pub mod key_generator;
pub mod permission_service;
pub mod privilege;
pub mod user_lookup;

pub use command_runner::{CommandOutput, CommandRunner, CommandSpec, SystemCommandRunner};
pub use config_mutator::{AuthMode, ConfigMutator, DirectiveChange, MutationReport};
pub use connection_tester::{ConnectionTestResult, ConnectionTester};
pub use key_generator::{KeyGenerator, KeyRequest};
pub use permission_service::{PermissionCheckResult, PermissionService};
pub use privilege::PrivilegeGate;
pub use user_lookup::UserLookup;
