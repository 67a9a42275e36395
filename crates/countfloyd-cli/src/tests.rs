//! End-to-end runtime tests: argument dispatch, command payloads, and the
//! socket exchange against a fake server.

pub(crate) mod support;

use std::process::ExitCode;

use rstest::rstest;

use support::run_cli;
#[cfg(unix)]
use support::{FakeDaemon, Reply, SocketPaths, session_args, socket_paths};

#[test]
fn missing_command_is_a_usage_error() {
    let output = run_cli(Vec::<String>::new());
    assert_eq!(output.exit, ExitCode::from(2));
    assert!(output.stderr.contains("no command given"));
    assert!(output.stderr.contains("control:"));
}

#[test]
fn unknown_command_lists_usage() {
    let output = run_cli(["frobnicate"]);
    assert_eq!(output.exit, ExitCode::from(2));
    assert!(output.stderr.contains("unknown command 'frobnicate'"));
    assert!(output.stderr.contains("populate"));
    assert!(output.stdout.is_empty());
}

#[test]
fn unknown_command_flag_is_named() {
    let output = run_cli(["query", "-bogus", "x"]);
    assert_eq!(output.exit, ExitCode::from(2));
    assert!(output.stderr.contains("--bogus"), "stderr: {}", output.stderr);
}

#[test]
fn invalid_top_level_value_is_a_usage_error() {
    let output = run_cli(["-timeout", "soon", "status"]);
    assert_eq!(output.exit, ExitCode::from(2));
    assert!(output.stderr.contains("soon"));
}

#[rstest]
#[case(&["-h"])]
#[case(&["status", "-h"])]
#[case(&["apply", "--help"])]
fn help_requests_succeed(#[case] args: &[&str]) {
    let output = run_cli(args.iter().copied());
    assert_eq!(output.exit, ExitCode::SUCCESS);
    assert!(output.stdout.contains("Usage"), "stdout: {}", output.stdout);
}

#[test]
fn populate_without_files_does_not_connect() {
    let output = run_cli(["-socket", "/nonexistent/cfc-test.sock", "populate"]);
    assert_eq!(output.exit, ExitCode::from(2));
    assert!(output.stderr.contains("-featuresDir"));
}

#[test]
fn version_prints_the_client_name() {
    let output = run_cli(["version"]);
    assert_eq!(output.exit, ExitCode::SUCCESS);
    assert!(output.stdout.starts_with("cfc "));
}

#[cfg(unix)]
mod exchanges {
    use super::*;

    fn run_against(
        paths: &SocketPaths,
        reply: Reply,
        command: &[&str],
    ) -> (support::RunOutput, String) {
        let mut daemon = FakeDaemon::spawn(&paths.server(), reply).expect("spawn fake server");
        let mut args = paths.session_args(500);
        args.extend(command.iter().map(|argument| (*argument).to_owned()));
        let output = run_cli(args);
        let requests = daemon.take_requests().expect("collect requests");
        assert_eq!(requests.len(), 1, "expected a single request");
        (output, requests[0].payload.clone())
    }

    #[rstest]
    #[case(&["stop"], "QUIT")]
    #[case(&["status"], "STATUS")]
    #[case(&["query", "-feature", "alpha"], "QUERY alpha")]
    #[case(&["query"], "QUERY ")]
    #[case(
        &["apply", "-number", "3", "-features", "a,b"],
        r#"{"action":"apply","meta.number":"3","meta.features":"a,b"}"#
    )]
    #[case(
        &["populate", "-featuresFiles", "x.feature,y.feature"],
        r#"{"action":"populate_from_files","files":"x.feature,y.feature"}"#
    )]
    fn commands_send_their_payload(
        socket_paths: SocketPaths,
        #[case] command: &[&str],
        #[case] expected: &str,
    ) {
        let (output, request) = run_against(&socket_paths, Reply::text("ok"), command);
        assert_eq!(output.exit, ExitCode::SUCCESS, "stderr: {}", output.stderr);
        assert_eq!(request, expected);
        assert_eq!(output.stdout, "ok\n");
    }

    #[rstest]
    fn client_binds_the_local_path_and_removes_it(socket_paths: SocketPaths) {
        let mut daemon = FakeDaemon::spawn(&socket_paths.server(), Reply::text("up"))
            .expect("spawn fake server");
        let mut args = socket_paths.session_args(500);
        args.push(String::from("status"));
        let output = run_cli(args);
        let requests = daemon.take_requests().expect("collect requests");

        assert_eq!(output.exit, ExitCode::SUCCESS);
        assert_eq!(requests[0].client.as_ref(), Some(&socket_paths.local()));
        assert!(!socket_paths.local().exists());
    }

    #[rstest]
    fn apply_socket_flag_overrides_the_session(socket_paths: SocketPaths) {
        let mut daemon = FakeDaemon::spawn(&socket_paths.server(), Reply::text("applied"))
            .expect("spawn fake server");
        let mut args = session_args(
            &socket_paths.local(),
            &socket_paths.path("missing.sock"),
            500,
        );
        args.extend([
            String::from("apply"),
            String::from("-socket"),
            socket_paths.server().to_string(),
        ]);
        let output = run_cli(args);
        let requests = daemon.take_requests().expect("collect requests");

        assert_eq!(output.exit, ExitCode::SUCCESS, "stderr: {}", output.stderr);
        assert_eq!(requests.len(), 1);
        assert_eq!(output.stdout, "applied\n");
    }

    #[rstest]
    fn silent_server_times_out(socket_paths: SocketPaths) {
        let mut daemon =
            FakeDaemon::spawn(&socket_paths.server(), Reply::Silent).expect("spawn fake server");
        let mut args = socket_paths.session_args(50);
        args.push(String::from("status"));
        let output = run_cli(args);
        let _ = daemon.take_requests();

        assert_eq!(output.exit, ExitCode::FAILURE);
        assert!(output.stderr.contains("time out"), "stderr: {}", output.stderr);
        assert!(output.stdout.is_empty());
        assert!(!socket_paths.local().exists());
    }

    #[rstest]
    fn missing_server_is_a_failure(socket_paths: SocketPaths) {
        let mut args = socket_paths.session_args(200);
        args.push(String::from("stop"));
        let output = run_cli(args);

        assert_eq!(output.exit, ExitCode::FAILURE);
        assert!(output.stderr.contains("countfloyd server"));
        assert!(!socket_paths.local().exists());
    }

    #[rstest]
    fn closed_connection_prints_an_empty_reply(socket_paths: SocketPaths) {
        let (output, request) = run_against(&socket_paths, Reply::Close, &["status"]);
        assert_eq!(output.exit, ExitCode::SUCCESS);
        assert_eq!(request, "STATUS");
        assert_eq!(output.stdout, "\n");
    }

    #[rstest]
    fn populate_expands_a_features_directory(socket_paths: SocketPaths) {
        let features = socket_paths.path("features");
        std::fs::create_dir(&features).expect("create features dir");
        std::fs::write(features.join("one.feature"), "f").expect("write feature");
        let (output, request) = run_against(
            &socket_paths,
            Reply::text("populated"),
            &["populate", "-featuresDir", features.as_str(), "-featuresFiles", "extra"],
        );
        assert_eq!(output.exit, ExitCode::SUCCESS, "stderr: {}", output.stderr);
        assert_eq!(
            request,
            format!(r#"{{"action":"populate_from_files","files":"{features}/one.feature,extra"}}"#)
        );
    }
}
