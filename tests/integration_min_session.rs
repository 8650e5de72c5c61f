// Drives the compiled binary through a PTY, exercising the real event loop
// and crossterm input handling.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Unix-only and ignored by default.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

const ONE_QUESTION: &str = r#"[
  {"domain": "math", "question": "2 + 2 = ?", "options": ["4", "5"], "correct": "4"}
]"#;

#[test]
#[ignore]
fn minimal_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bank = dir.path().join("bank.json");
    std::fs::write(&bank, ONE_QUESTION)?;

    let bin = assert_cmd::cargo::cargo_bin("quizr");
    let cmd = format!("{} --no-save {}", bin.display(), bank.display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // start, answer, advance to the end panel
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("1")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("n")?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("\x1b")?; // ESC
    p.expect(Eof)?;
    Ok(())
}
