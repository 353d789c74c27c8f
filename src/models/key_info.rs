use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Ed25519,
    Rsa,
    Ecdsa,
    Unknown,
}

impl From<&str> for KeyType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ed25519" | "ssh-ed25519" => KeyType::Ed25519,
            "rsa" | "ssh-rsa" => KeyType::Rsa,
            "ecdsa" | "ecdsa-sha2-nistp256" | "ecdsa-sha2-nistp384" | "ecdsa-sha2-nistp521" => {
                KeyType::Ecdsa
            }
            _ => KeyType::Unknown,
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyType::Ed25519 => write!(f, "ed25519"),
            KeyType::Rsa => write!(f, "rsa"),
            KeyType::Ecdsa => write!(f, "ecdsa"),
            KeyType::Unknown => write!(f, "unknown"),
        }
    }
}

/// A generated key pair as it sits on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairInfo {
    pub name: String,
    pub owner: String,
    pub key_type: KeyType,
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
    pub fingerprint: Option<String>,
}

/// Local account resolved from the OS user database.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub username: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
}

impl UserAccount {
    pub fn ssh_dir(&self) -> PathBuf {
        self.home.join(".ssh")
    }
}

/// Where a connection test should go and which key to present.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionTarget {
    pub host: String,
    pub username: String,
    pub key_path: PathBuf,
}

impl ConnectionTarget {
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

/// Result of a menu operation, mapped to the 0/1 status convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::Failure => 1,
        }
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}
