//! Integration tests for the smallsh REPL.
//!
//! These run lines through a REPL backed by real processes. The prompt
//! loop reaps with `waitpid(-1, ...)`, so tests that start children hold
//! `SERIAL` to keep from reaping each other's.

use std::io::Cursor;
use std::sync::{Mutex, MutexGuard};

use rstest::rstest;
use smallsh_kernel::KernelConfig;
use smallsh_repl::{BufReadSource, Repl};

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn repl() -> Repl {
    Repl::with_config(KernelConfig::named("integration")).expect("Failed to create REPL")
}

/// Run a script through the prompt loop and return the last status.
fn run_script(repl: &mut Repl, script: &str) -> i64 {
    let mut source = BufReadSource::new(Cursor::new(script.as_bytes().to_vec()), false);
    repl.run_loop(&mut source).expect("loop should end at EOF")
}

#[rstest]
#[case::true_cmd("true\n", 0)]
#[case::false_cmd("false\n", 1)]
#[case::sequence_last_wins("false ; true\n", 0)]
#[case::missing_program("no_such_program_xyz\n", 127)]
#[case::blank("\n", 0)]
fn line_status(#[case] line: &str, #[case] expected: i64) {
    let _guard = serial();
    let mut repl = repl();
    repl.process_line(line);
    assert_eq!(repl.last_code(), expected);
}

#[test]
fn builtin_errors_are_reported() {
    let mut repl = repl();
    assert_eq!(repl.process_line("fg 3\n").as_deref(), Some("fg: 3: no such job\n"));
    assert_eq!(repl.process_line("bg x\n").as_deref(), Some("bg: x: invalid job id\n"));
    assert_eq!(
        repl.process_line("kill\n").as_deref(),
        Some("kill: usage: kill <job-id>\n")
    );
}

#[test]
fn empty_jobs_listing_prints_nothing() {
    let mut repl = repl();
    assert_eq!(repl.process_line("jobs\n"), None);
    assert_eq!(repl.last_code(), 0);
}

#[test]
fn background_launch_prints_pid() {
    let _guard = serial();
    let mut repl = repl();

    let out = repl.process_line("sleep 30 &\n").expect("launch notice");
    assert!(out.starts_with("[Process id "), "{out}");

    let listing = repl.process_line("jobs\n").expect("one job");
    assert_eq!(listing, "[1] Running\tsleep 30\n");

    assert_eq!(repl.process_line("kill 1\n"), None);
    assert_eq!(repl.process_line("jobs\n"), None);
}

#[test]
fn script_runs_to_eof() {
    let _guard = serial();
    let mut repl = repl();

    let code = run_script(&mut repl, "true\nsleep 30 &\nfalse\n");

    assert_eq!(code, 1);
    assert_eq!(
        repl.process_line("jobs\n").as_deref(),
        Some("[1] Running\tsleep 30\n")
    );
    repl.process_line("kill 1\n");
}

#[test]
fn overlong_line_is_skipped() {
    let _guard = serial();
    let mut repl = Repl::with_config(KernelConfig::default().with_max_line_len(16)).expect("REPL");

    let script = format!("{} &\nfalse\n", "sleep".repeat(10));
    let code = run_script(&mut repl, &script);

    // The long line never ran; the next one did.
    assert_eq!(code, 1);
    assert_eq!(repl.process_line("jobs\n"), None);
}

#[test]
fn finished_jobs_are_reaped_between_lines() {
    let _guard = serial();
    let mut repl = repl();

    repl.process_line("true &\n");
    let mut notices = Vec::new();
    for _ in 0..100 {
        notices.extend(repl.poll());
        if !notices.is_empty() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
    }

    assert_eq!(notices, vec!["[1] Done\ttrue\n".to_string()]);
    assert_eq!(repl.process_line("jobs\n"), None);
}

#[test]
fn non_utf8_line_is_not_run() {
    let _guard = serial();
    let mut repl = repl();

    let mut source = BufReadSource::new(Cursor::new(b"sleep 30 \xff &\nfalse\n".to_vec()), false);
    let code = repl.run_loop(&mut source).expect("loop should end at EOF");

    assert_eq!(code, 1);
    assert_eq!(repl.process_line("jobs\n"), None);
}
