use std::process::{Command, Output};

fn waypoint_defence(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_waypoint-defence"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("failed to launch the waypoint-defence binary")
}

#[test]
fn help_lists_the_session_options() {
    let output = waypoint_defence(&["--help"]);
    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    for option in ["--config", "--ticks", "--tick-ms", "--build", "--upgrade-all"] {
        assert!(help.contains(option), "help is missing {option}:\n{help}");
    }
}

#[test]
fn skirmish_session_prints_a_summary() {
    let output = waypoint_defence(&[
        "--config",
        "scenarios/skirmish.toml",
        "--ticks",
        "50",
        "--build",
        "cannon@-4,2",
    ]);
    assert!(
        output.status.success(),
        "session failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let summary = String::from_utf8_lossy(&output.stdout);
    assert!(summary.contains("holding after 50 ticks"), "{summary}");
    assert!(summary.contains("coins 300"), "{summary}");
    assert!(summary.contains("health 5"), "{summary}");
}

#[test]
fn malformed_build_orders_are_refused() {
    let output = waypoint_defence(&["--build", "laser@1,2"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("laser"));
}
