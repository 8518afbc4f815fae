use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir()
            .join(format!("webalias_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const BIN: &str = env!("CARGO_BIN_EXE_webalias");

const ALIASES: &str = "\
# test aliases
gh https://github.com/{search}
wiki<>dump
    https://en.wikipedia.org/wiki/{search}
broken<>browser=gui8 https://broken.example
news
    https://news.ycombinator.com <|> https://lobste.rs<>dump+1
";

/// Writes a config whose handlers point at an executable that certainly
/// exists, plus an alias file next to it.
fn write_config(dir: &TempDir, aliases: &str, search: bool) -> PathBuf {
    let yaml = format!(
        r#"handlers:
  gui1: "{BIN} --gui"
  term1: "{BIN}"
default_handler: gui1
default_terminal: term1
search_if_not_found: {search}
aliases: [aliases]
terminal: "xterm -e sh -c {{command}}"
clipboard: cat
"#
    );
    let path = dir.join("config.yml");
    fs::write(&path, yaml).expect("failed to write config");
    fs::write(dir.join("aliases"), aliases).expect("failed to write aliases");
    path
}

fn webalias(config: &PathBuf, args: &[&str]) -> Output {
    Command::new(BIN)
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("WEBALIAS_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run webalias")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Dry runs
// ---------------------------------------------------------------------------

#[test]
fn dry_run_alias_on_default_gui() {
    let dir = TempDir::new("dry_alias");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["--dry-run", "--format", "json", "gh", "golang/go"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = stdout_json(&output);
    assert_eq!(report["result"], "dispatch");
    assert_eq!(report["mode"], "alias");
    assert_eq!(report["actions"][0]["handler_name"], "gui1");
    assert_eq!(report["launches"][0]["kind"], "gui");
    assert_eq!(report["launches"][0]["command"], format!("{BIN} --gui"));
    assert_eq!(
        report["launches"][0]["urls"],
        serde_json::json!(["https://github.com/golang/go"])
    );
}

#[test]
fn dry_run_dump_alias_uses_terminal() {
    let dir = TempDir::new("dry_dump");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["-n", "--format", "json", "wiki", "Rust"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report = stdout_json(&output);
    assert_eq!(report["actions"][0]["handler_name"], "term1");
    assert_eq!(report["actions"][0]["dump"], true);
    assert_eq!(report["launches"][0]["kind"], "terminal");
    assert_eq!(
        report["launches"][0]["command"],
        format!("{BIN} -dump https://en.wikipedia.org/wiki/Rust | less")
    );
}

#[test]
fn dry_run_cli_flags_override_handler_and_dump() {
    let dir = TempDir::new("dry_flags");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["-n", "--format", "json", "--dump=2", "gh", "x"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report = stdout_json(&output);
    assert_eq!(report["actions"][0]["handler_name"], "term1");
    assert_eq!(report["actions"][0]["dump_page_forward"], 2);
    assert_eq!(
        report["launches"][0]["command"],
        format!("{BIN} -dump https://github.com/x | less +48g")
    );
}

#[test]
fn dry_run_search_fallback() {
    let dir = TempDir::new("dry_search");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["-n", "--format", "yaml", "rust", "traits"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mode: search"));
    assert!(stdout.contains("https://duckduckgo.com/?q=rust+traits"));
}

#[test]
fn dry_run_table_lists_launches() {
    let dir = TempDir::new("dry_table");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["-n", "news"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "mode: alias");
    assert!(lines[1].starts_with("gui"));
    assert!(lines[1].ends_with("https://news.ycombinator.com"));
    assert!(lines[2].starts_with("terminal"));
    assert!(lines[2].ends_with("https://lobste.rs | less +24g"));
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[test]
fn list_prints_aliases_in_order() {
    let dir = TempDir::new("list_table");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["--list"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<&str> = stdout
        .lines()
        .filter(|line| !line.starts_with(' '))
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(names, vec!["gh", "wiki", "broken", "news"]);
    assert!(stdout.contains("https://lobste.rs  [dump=1]"));
}

#[test]
fn list_json_round_trips_definitions() {
    let dir = TempDir::new("list_json");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["-l", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let aliases = stdout_json(&output);
    assert_eq!(aliases.as_array().unwrap().len(), 4);
    assert_eq!(aliases[1]["name"], "wiki");
    assert_eq!(aliases[1]["options"][0]["key"], "dump");
    assert_eq!(aliases[3]["url_entries"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Failures and exit codes
// ---------------------------------------------------------------------------

#[test]
fn unknown_handler_exits_with_error() {
    let dir = TempDir::new("unknown_handler");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["broken"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("error: "), "stderr: {err}");
    assert!(err.contains("gui8"));
}

#[test]
fn not_found_without_search_exits_cleanly() {
    let dir = TempDir::new("not_found");
    let config = write_config(&dir, ALIASES, false);

    let output = webalias(&config, &["nosuchalias", "x"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("alias not found: nosuchalias"));

    let output = webalias(&config, &["-s", "-n", "nosuchalias"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("mode: search"));
}

#[test]
fn multi_alias_without_match_fails() {
    let dir = TempDir::new("multi_none");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["-m", "nomatch", "gh"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no aliases found"));
}

#[test]
fn clipboard_with_direct_url_is_rejected() {
    let dir = TempDir::new("clip_direct");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["-c", "https://example.com/x"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("incompatible options"));
}

#[test]
fn parse_error_names_alias() {
    let dir = TempDir::new("parse_error");
    let config = write_config(&dir, "gh https://github.com/{search}\ngh https://x.example\n", true);

    let output = webalias(&config, &["gh", "x"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("aliases:2"), "stderr: {err}");
    assert!(err.contains("duplicate alias 'gh'"), "stderr: {err}");
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new("missing_config");
    let output = webalias(&dir.join("absent.yml"), &["gh"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to load"));
}

#[cfg(unix)]
#[test]
fn clipboard_writes_through_configured_command() {
    let dir = TempDir::new("clip_alias");
    let config = write_config(&dir, ALIASES, true);

    let output = webalias(&config, &["-c", "gh", "x"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}
