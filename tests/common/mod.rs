use assert_cmd::Command;
use std::io::Write;

pub fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf-trace").unwrap();
    // Keep the user's own config file and environment out of the picture.
    cmd.env("XDG_CONFIG_HOME", std::env::temp_dir().join("bf-trace-tests-no-config"))
        .env_remove("BF_TRACE_DELAY")
        .env_remove("BF_TRACE_MAX_STEPS")
        .env_remove("RUST_LOG");
    cmd
}

pub fn program_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}
