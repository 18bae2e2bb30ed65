use predicates::str::diff;

#[test]
fn normal_scenario_without_jitter_is_exact() {
    let expected = concat!(
        "Metadata:\n",
        "scenario: normal\n",
        "users: 1000\n",
        "jitter: off\n",
        "Metrics:\n",
        "avg_response_time: 1.05s\n",
        "avg_error_rate: 0.50%\n",
        "cpu: 45.0%\n",
        "memory: 60.0%\n",
        "Response times:\n",
        "- Balance inquiry (Deposit API): 1.00s\n",
        "- P2P transfers (P2P API): 1.20s\n",
        "- QR payments (QR API): 1.00s\n",
        "- Withdrawals (Withdrawal API): 1.00s\n",
        "Error rates:\n",
        "- Balance inquiry (Deposit API): 0.50%\n",
        "- P2P transfers (P2P API): 0.50%\n",
        "- QR payments (QR API): 0.50%\n",
        "- Withdrawals (Withdrawal API): 0.50%\n",
        "Diagnosis: optimal\n",
        "The system performs optimally under this load.\n",
        "Recommendations:\n",
        "1. Continuous monitoring: The system performs well. Set up continuous monitoring ",
        "to catch shifts in usage patterns and anticipate future peaks.\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fin-loadsim");
    cmd.args(["run", "--scenario", "normal", "--no-jitter"]);
    cmd.assert().success().stdout(diff(expected));
}

#[test]
fn extreme_scenario_summary_is_overloaded() {
    let expected = concat!(
        "Metadata:\n",
        "scenario: extreme\n",
        "users: 20000\n",
        "jitter: off\n",
        "Metrics:\n",
        "avg_response_time: 9.00s\n",
        "avg_error_rate: 35.00%\n",
        "cpu: 100.0%\n",
        "memory: 95.0%\n",
        "Diagnosis: overloaded\n",
        "System overloaded! Smart throttling, transaction prioritization and immediate ",
        "horizontal scaling are required.\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fin-loadsim");
    cmd.args([
        "run",
        "--scenario",
        "extreme",
        "--no-jitter",
        "--format",
        "summary",
    ]);
    cmd.assert().success().stdout(diff(expected));
}

#[test]
fn custom_distribution_summary() {
    let expected = concat!(
        "Metadata:\n",
        "scenario: custom\n",
        "users: 2000\n",
        "jitter: off\n",
        "Metrics:\n",
        "avg_response_time: 1.33s\n",
        "avg_error_rate: 1.25%\n",
        "cpu: 49.0%\n",
        "memory: 63.0%\n",
        "Diagnosis: optimal\n",
        "The system performs optimally under this load.\n",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fin-loadsim");
    cmd.args([
        "run",
        "--users",
        "2000",
        "--distribution",
        "balance:60",
        "--share",
        "qr:40",
        "--no-jitter",
        "--format",
        "summary",
    ]);
    cmd.assert().success().stdout(diff(expected));
}

#[test]
fn seeded_runs_repeat_exactly() {
    let run = || {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fin-loadsim");
        cmd.args(["run", "--scenario", "high", "--seed", "42", "--format", "json"]);
        let output = cmd.output().expect("binary should run");
        assert!(output.status.success());
        String::from_utf8(output.stdout).expect("stdout should be utf-8")
    };
    let first = run();
    assert!(first.contains("\"jitter\": \"seeded(42)\""));
    assert_eq!(first, run());
}

#[test]
fn extreme_errors_are_listed_per_api() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fin-loadsim");
    cmd.args(["run", "--scenario", "extreme", "--no-jitter"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains(concat!(
            "- P2P transfers (P2P API): 429 Too Many Requests\n",
            "- P2P transfers (P2P API): 504 Gateway Timeout\n",
            "- P2P transfers (P2P API): 503 Service Unavailable\n",
            "- P2P transfers (P2P API): 500 Internal Server Error\n",
        )))
        .stdout(predicates::str::contains("2. Scale horizontally:"));
}
