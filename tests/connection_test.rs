mod common;

use common::{exit_with, success, FakeRunner, MockHost, ScriptedPrompter};
use sshd_auth_manager::commands::{test_ssh_connection, CommandContext};
use sshd_auth_manager::models::{AuthManagerError, Outcome};

#[tokio::test]
async fn test_successful_connection() {
    let host = MockHost::new();
    let key = host.write_key("test_key.pem", 0o600);
    let runner =
        FakeRunner::new().respond("ssh", |_| Ok(success("SSH connection successful!\n")));
    let mut prompter =
        ScriptedPrompter::new(&["192.168.1.1", "testuser", key.to_str().unwrap()]);

    let outcome =
        test_ssh_connection(CommandContext::new(&host.config, &runner), &mut prompter).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(runner.calls_to("ssh").len(), 1);
    let transcript = prompter.transcript();
    assert!(transcript.contains("Output: SSH connection successful!"));
    assert!(transcript.contains("exit status 0"));
}

#[tokio::test]
async fn test_rejected_login_still_counts_as_performed() {
    let host = MockHost::new();
    let key = host.write_key("test_key.pem", 0o600);
    let runner = FakeRunner::new().respond("ssh", |_| {
        Ok(exit_with(255, "testuser@192.168.1.1: Permission denied (publickey)."))
    });
    let mut prompter =
        ScriptedPrompter::new(&["192.168.1.1", "testuser", key.to_str().unwrap()]);

    let outcome =
        test_ssh_connection(CommandContext::new(&host.config, &runner), &mut prompter).await;

    assert_eq!(outcome, Outcome::Success);
    let transcript = prompter.transcript();
    assert!(transcript.contains("Permission denied"));
    assert!(transcript.contains("exit status 255"));
}

#[tokio::test]
async fn test_missing_key_skips_attempt() {
    let host = MockHost::new();
    let runner = FakeRunner::new();
    let mut prompter = ScriptedPrompter::new(&["192.168.1.1", "testuser", "/nonexistent/pem"]);

    let outcome =
        test_ssh_connection(CommandContext::new(&host.config, &runner), &mut prompter).await;

    assert_eq!(outcome, Outcome::Failure);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_insecure_key_declined() {
    let host = MockHost::new();
    let key = host.write_key("test_key.pem", 0o755);
    let runner = FakeRunner::new();
    let mut prompter =
        ScriptedPrompter::new(&["192.168.1.1", "testuser", key.to_str().unwrap(), "n"]);

    let outcome =
        test_ssh_connection(CommandContext::new(&host.config, &runner), &mut prompter).await;

    assert_eq!(outcome, Outcome::Failure);
    assert!(runner.calls().is_empty());
    assert!(prompter.transcript().contains("Key permissions are 755"));
}

#[tokio::test]
async fn test_insecure_key_accepted() {
    let host = MockHost::new();
    let key = host.write_key("test_key.pem", 0o644);
    let runner = FakeRunner::new().respond("ssh", |_| {
        Ok(exit_with(255, "ssh: connect to host 192.168.1.1 port 22: Connection refused"))
    });
    let mut prompter =
        ScriptedPrompter::new(&["192.168.1.1", "testuser", key.to_str().unwrap(), "y"]);

    let outcome =
        test_ssh_connection(CommandContext::new(&host.config, &runner), &mut prompter).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(runner.calls_to("ssh").len(), 1);
    assert!(prompter.transcript().contains("Connection refused"));
}

#[tokio::test]
async fn test_secure_key_is_not_questioned() {
    let host = MockHost::new();
    let key = host.write_key("test_key.pem", 0o600);
    let runner = FakeRunner::new();
    let mut prompter =
        ScriptedPrompter::new(&["192.168.1.1", "testuser", key.to_str().unwrap()]);

    let outcome =
        test_ssh_connection(CommandContext::new(&host.config, &runner), &mut prompter).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(prompter.prompts.len(), 3);
}

#[tokio::test]
async fn test_ssh_binary_missing() {
    let host = MockHost::new();
    let key = host.write_key("test_key.pem", 0o600);
    let runner = FakeRunner::new().respond("ssh", |spec| {
        Err(AuthManagerError::CommandUnavailable {
            program: spec.program.clone(),
            message: "No such file or directory (os error 2)".to_string(),
        })
    });
    let mut prompter =
        ScriptedPrompter::new(&["192.168.1.1", "testuser", key.to_str().unwrap()]);

    let outcome =
        test_ssh_connection(CommandContext::new(&host.config, &runner), &mut prompter).await;

    assert_eq!(outcome, Outcome::Failure);
}

#[tokio::test]
async fn test_timeout_is_reported_as_performed() {
    let host = MockHost::new();
    let key = host.write_key("test_key.pem", 0o600);
    let runner = FakeRunner::new().respond("ssh", |spec| {
        Err(AuthManagerError::CommandTimeout {
            program: spec.program.clone(),
            secs: 15,
        })
    });
    let mut prompter =
        ScriptedPrompter::new(&["10.255.255.1", "testuser", key.to_str().unwrap()]);

    let outcome =
        test_ssh_connection(CommandContext::new(&host.config, &runner), &mut prompter).await;

    assert_eq!(outcome, Outcome::Success);
    assert!(prompter.transcript().contains("timed out"));
}

#[tokio::test]
async fn test_bad_host_rejected_before_attempt() {
    let host = MockHost::new();
    let key = host.write_key("test_key.pem", 0o600);
    let runner = FakeRunner::new();
    let mut prompter = ScriptedPrompter::new(&[
        "-oProxyCommand=touch /tmp/pwned",
        "testuser",
        key.to_str().unwrap(),
    ]);

    let outcome =
        test_ssh_connection(CommandContext::new(&host.config, &runner), &mut prompter).await;

    assert_eq!(outcome, Outcome::Failure);
    assert!(runner.calls().is_empty());
}
