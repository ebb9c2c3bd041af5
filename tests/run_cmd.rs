use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("brainfudge").unwrap();
    // Keep the user's environment and config file out of the way
    cmd.env_remove("BRAINFUDGE_TAPE_SIZE")
        .env_remove("BRAINFUDGE_DUMP")
        .env_remove("BRAINFUDGE_MAX_STEPS")
        .env_remove("BRAINFUDGE_TIMEOUT_MS")
        .env_remove("BRAINFUDGE_LOG")
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("brainfudge-tests-no-config"))
        .timeout(Duration::from_secs(5));
    cmd
}

#[test]
fn hello_world_prints_exactly() {
    cargo_bin()
        .args(["run", HELLO_WORLD])
        .assert()
        .success()
        .stdout("Hello World!\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn comments_and_split_code_parts_are_accepted() {
    // 'A' is 65
    let plus = "+".repeat(65);
    cargo_bin()
        .args(["run", "print an A:", &plus, "."])
        .assert()
        .success()
        .stdout("A");
}

#[test]
fn unmatched_open_bracket_is_a_syntax_error() {
    cargo_bin()
        .args(["run", "+["])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("unmatched bracket '['")
                .and(predicate::str::contains("line 1, column 2")),
        );
}

#[test]
fn unmatched_close_bracket_produces_no_output() {
    cargo_bin()
        .args(["run", "+++.]"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unmatched bracket ']'"));
}

#[test]
fn dump_prints_aligned_rows_after_run() {
    cargo_bin()
        .args(["run", "--cells", "5", "--dump", ">>+++"])
        .assert()
        .success()
        .stdout("\nCell Num:         0   1   2   3   4 \nCell Contents:    0   0   3   0   0 \n");
}

#[test]
fn dump_can_be_enabled_from_the_environment() {
    cargo_bin()
        .env("BRAINFUDGE_DUMP", "1")
        .env("BRAINFUDGE_TAPE_SIZE", "3")
        .args(["run", "+"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cell Contents:    1   0   0 "));
}

#[test]
fn pointer_stays_at_the_edges_of_the_tape() {
    cargo_bin()
        .args(["run", "--cells", "2", "--dump", "<<+>>>+"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cell Contents:    1   1 "));
}

#[test]
fn zero_cells_is_a_usage_error() {
    cargo_bin()
        .args(["run", "--cells", "0", "+"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("positive integer"));
}

#[test]
fn missing_code_prints_usage() {
    cargo_bin()
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn input_is_read_from_piped_stdin() {
    cargo_bin()
        .args(["run", ",.,."])
        .write_stdin("Zq")
        .assert()
        .success()
        .stdout("Zq");
}

#[test]
fn cat_stops_at_newline() {
    cargo_bin()
        .args(["run", ",[.,]"])
        .write_stdin("abc\ndef")
        .assert()
        .success()
        .stdout("abc");
}

#[test]
fn end_of_input_reads_as_zero() {
    cargo_bin()
        .args(["run", "--cells", "1", "--dump", "+++,"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cell Contents:    0 "));
}

#[test]
fn step_limit_aborts_infinite_loop() {
    cargo_bin()
        .args(["run", "--max-steps", "50", "+[]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn timeout_aborts_infinite_loop() {
    cargo_bin()
        .args(["run", "--timeout", "100", "+[]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("wall-clock timeout exceeded (100 ms)"));
}

#[test]
fn debug_writes_trace_table_to_stderr() {
    cargo_bin()
        .args(["run", "--debug", ">"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("STEP | NODE")
                .and(predicate::str::contains("Moved pointer head to index 1")),
        );
}

#[test]
fn runs_program_from_bf_file() {
    let mut file = tempfile::Builder::new().suffix(".bf").tempfile().unwrap();
    writeln!(file, "{HELLO_WORLD}").unwrap();

    cargo_bin()
        .arg("run")
        .arg("--file")
        .arg(file.path())
        .assert()
        .success()
        .stdout("Hello World!\n");
}

#[test]
fn extension_check_ignores_case() {
    let mut file = tempfile::Builder::new().suffix(".B").tempfile().unwrap();
    write!(file, "++++++++[>++++++++<-]>+.").unwrap();

    cargo_bin()
        .arg("run")
        .arg("-f")
        .arg(file.path())
        .assert()
        .success()
        .stdout("A");
}

#[test]
fn rejects_files_without_bf_extension() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    write!(file, "+.").unwrap();

    cargo_bin()
        .arg("run")
        .arg("--file")
        .arg(file.path())
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unsupported file extension"));
}

#[test]
fn reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    cargo_bin()
        .arg("run")
        .arg("--file")
        .arg(dir.path().join("nope.bf"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn file_and_positional_code_conflict() {
    cargo_bin()
        .args(["run", "--file", "x.bf", "+"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot use positional code together with --file"));
}

#[test]
fn zero_step_limit_and_timeout_are_usage_errors() {
    cargo_bin()
        .args(["run", "--max-steps", "0", "+"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("positive integer"));
    cargo_bin()
        .args(["run", "--timeout", "0", "+"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("positive number of milliseconds"));
}

fn config_home(contents: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("brainfudge.toml"), contents).unwrap();
    dir
}

#[test]
fn settings_are_read_from_config_file() {
    let home = config_home("[interpreter]\ntape_size = 3 # tiny\ndump_memory = true\n");
    cargo_bin()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["run", "+"])
        .assert()
        .success()
        .stdout("\nCell Num:         0   1   2 \nCell Contents:    1   0   0 \n");
}

#[test]
fn flag_and_env_override_config_file() {
    let home = config_home("[interpreter]\ntape_size = 3\ndump_memory = true\n");

    cargo_bin()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["run", "--cells", "5", "+"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cell Num:         0   1   2   3   4 \n"));

    cargo_bin()
        .env("XDG_CONFIG_HOME", home.path())
        .env("BRAINFUDGE_TAPE_SIZE", "4")
        .args(["run", "+"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cell Num:         0   1   2   3 \n"));
}

#[test]
fn config_file_step_limit_applies() {
    let home = config_home("[interpreter]\nmax_steps = 40\n");
    cargo_bin()
        .env("XDG_CONFIG_HOME", home.path())
        .args(["run", "+[]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (40)"));
}
