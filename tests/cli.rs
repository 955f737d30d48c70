use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn renders_a_small_flame() {
    Command::cargo_bin("flame")
        .unwrap()
        .args(&[
            "--size", "64x48", "--iterations", "20000", "--threads", "1", "--seed", "7",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("flame: 64x48 (supersample 1), 1 threads"))
        .stdout(predicate::str::contains("iterations: 20000"))
        .stdout(predicate::str::contains("lit pixels:"));
}

#[test]
fn accepts_tone_and_variation_choices() {
    Command::cargo_bin("flame")
        .unwrap()
        .args(&[
            "--size", "32x32", "--iterations", "5000", "--seed", "3", "--tone", "linear",
            "--variations", "julia,swirl,noise", "--final", "-a", "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("supersample 2"));
}

#[test]
fn rejects_unknown_variations() {
    Command::cargo_bin("flame")
        .unwrap()
        .args(&["--variations", "linear,sparkle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sparkle"));
}

#[test]
fn rejects_bad_sizes() {
    Command::cargo_bin("flame")
        .unwrap()
        .args(&["--size", "wide"])
        .assert()
        .failure();
}
