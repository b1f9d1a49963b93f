//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

const EN_HOME: &str = "https://en.wikipedia.org/wiki/Main_Page";
const EN_ARTICLE: &str = "https://en.wikipedia.org/wiki/Anthony_Roll";
const RU_HOME: &str = "https://ru.wikipedia.org/wiki/Заглавная_страница";

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wikifeat");
    cmd.env_remove("WIKIFEAT_TOKEN")
        .env_remove("WIKIFEAT_CHANNELS")
        .env_remove("WIKIFEAT_SOURCE")
        .env_remove("WIKIFEAT_CHECKPOINT")
        .env_remove("RUST_LOG");
    cmd
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

/// Offline dry run against a saved page, with its checkpoint in a fresh directory.
fn dry_run(tmp: &TempDir, source: &str, fixture: &str) -> assert_cmd::Command {
    let mut cmd = cmd();
    cmd.args(["--dry-run", "--no-image", "--source", source])
        .args(["--html", &get_fixture_path(fixture)])
        .arg("--checkpoint")
        .arg(tmp.path().join("last_article.txt"));
    cmd
}

#[test]
fn test_cli_dry_run_main_page() {
    let tmp = TempDir::new().unwrap();
    dry_run(&tmp, EN_HOME, "en_main_page.html")
        .args(["--lang", "en"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<b>Anthony Roll</b>"))
        .stdout(predicate::str::contains("<a href='https://en.wikipedia.org/wiki/Anthony_Roll'>Read the article</a>"))
        .stdout(predicate::str::contains("Text license: CC BY-SA"));
}

#[test]
fn test_cli_dry_run_russian_labels() {
    let tmp = TempDir::new().unwrap();
    dry_run(&tmp, RU_HOME, "ru_main_page.html")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<b>Foo</b>"))
        .stdout(predicate::str::contains("Читать статью"))
        .stdout(predicate::str::contains("Лицензия на изображение").not());
}

#[test]
fn test_cli_dry_run_article_page() {
    let tmp = TempDir::new().unwrap();
    dry_run(&tmp, EN_ARTICLE, "article.html")
        .assert()
        .success()
        .stdout(predicate::str::contains("<b>Anthony Roll</b>"))
        .stdout(predicate::str::contains("Navigation box").not());
}

#[test]
fn test_cli_dry_run_does_not_write_checkpoint() {
    let tmp = TempDir::new().unwrap();
    dry_run(&tmp, EN_HOME, "en_main_page.html").assert().success();

    assert!(!tmp.path().join("last_article.txt").exists());
}

#[test]
fn test_cli_json_output() {
    let tmp = TempDir::new().unwrap();
    let output = dry_run(&tmp, EN_HOME, "en_main_page.html")
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["title"], "Anthony Roll");
    assert_eq!(json["link"], EN_ARTICLE);
    assert!(json["image"].is_null());
}

#[test]
fn test_cli_json_requires_dry_run() {
    cmd()
        .args(["--json", "--token", "123:abc", "--channel", "@a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dry-run"));
}

#[test]
fn test_cli_unchanged_checkpoint() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("last_article.txt"), "Anthony Roll\n").unwrap();

    dry_run(&tmp, EN_HOME, "en_main_page.html")
        .args(["--lang", "en"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Featured article unchanged"));
}

#[test]
fn test_cli_missing_token_fails() {
    cmd()
        .args(["--channel", "@a", "--html", &get_fixture_path("en_main_page.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--token"));
}

#[test]
fn test_cli_invalid_language() {
    cmd()
        .args(["--dry-run", "--lang", "de"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid language"));
}

#[test]
fn test_cli_invalid_source_url() {
    cmd()
        .args(["--dry-run", "--source", "not a url"])
        .assert()
        .failure();
}

#[test]
fn test_cli_missing_snapshot() {
    let tmp = TempDir::new().unwrap();
    dry_run(&tmp, EN_HOME, "nonexistent.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("featured article"))
        .stdout(predicate::str::contains("--channel"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_cli_version() {
    cmd().arg("--version").assert().success().stdout(predicate::str::contains("wikifeat"));
}

#[test]
fn test_cli_verbose() {
    let tmp = TempDir::new().unwrap();
    dry_run(&tmp, EN_HOME, "en_main_page.html")
        .arg("-v")
        .assert()
        .success()
        .stderr(predicate::str::contains("wikifeat"))
        .stderr(predicate::str::contains("Anthony Roll"));
}

#[test]
fn test_completions_offer_accepted_flags() {
    let script = std::fs::read_to_string(concat!(env!("OUT_DIR"), "/completions/wikifeat.bash")).unwrap();

    for flag in ["--rules-url", "--no-image", "--dry-run", "--user-agent", "--channel", "--checkpoint"] {
        assert!(script.contains(flag), "missing {flag}");
    }
    for flag in ["--rules_url", "--no_image", "--dry_run", "--user_agent"] {
        assert!(!script.contains(flag), "unexpected {flag}");
    }

    cmd()
        .args(["--dry-run", "--no-image", "--rules-url", "https://t.me/x/1", "--user-agent", "test"])
        .args(["--source", EN_HOME, "--html", &get_fixture_path("en_main_page.html")])
        .arg("--checkpoint")
        .arg(TempDir::new().unwrap().path().join("last.txt"))
        .assert()
        .success();
}
