// Unit tests for process module private functions
// Integration tests for public API are in integration_tests/discovery/process.rs

use crate::discovery::process::{format_command, with_process};

/// **VALUE**: Tests the private `format_command()` helper on a real process.
///
/// **WHY THIS MATTERS**: Port-in-use errors include the owner's command line.
/// If `format_command()` panics on a process, the launch fails with a panic
/// instead of a readable PortInUse error.
///
/// **BUG THIS CATCHES**: Would catch if the process refresh stops loading
/// command lines (e.g. a refresh kind without `cmd`).
#[test]
fn given_valid_process_when_format_command_called_then_returns_command_string() {
    // GIVEN: A valid process (using our own PID)
    let our_pid = std::process::id();

    // WHEN: Calling format_command on the process
    let result = with_process(our_pid, |p| format_command(p));

    // THEN: Should return Some with non-empty command string
    let cmd = result.expect("Should find the process");
    assert!(!cmd.is_empty(), "Command string should not be empty");
}

/// **VALUE**: Tests that `with_process()` gracefully handles non-existent PIDs.
///
/// **WHY THIS MATTERS**: The owner of a port can exit between the socket scan
/// and the process lookup.
///
/// **BUG THIS CATCHES**: Prevents panics when querying processes that died
/// between the socket scan and the process info lookup.
#[test]
fn given_nonexistent_pid_when_with_process_called_then_returns_none() {
    // GIVEN: A PID that doesn't exist
    let fake_pid = u32::MAX;

    // WHEN: Calling with_process with the invalid PID
    let result = with_process(fake_pid, |_| true);

    // THEN: Should return None (graceful handling)
    assert!(
        result.is_none(),
        "Should return None for non-existent process"
    );
}

#[test]
fn given_valid_pid_when_with_process_called_then_executes_closure() {
    // GIVEN: A valid PID (our own process)
    let our_pid = std::process::id();

    // WHEN: Calling with_process with a closure that returns the PID
    let result = with_process(our_pid, |p| p.pid().as_u32());

    // THEN: Should execute closure with correct process
    assert_eq!(result, Some(our_pid));
}
