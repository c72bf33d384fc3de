//! Configuration tests

use super::*;
use crate::pane::Side;
use std::collections::HashMap;

fn parse(toml_str: &str) -> FileConfig {
    toml::from_str(toml_str).unwrap()
}

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

const TWO_PANES: &str = r#"
[[panes]]
name = "topics"
side = "left"
kind = "list"
command = "printf 'a\nb\n'"

[[panes.bindings]]
target = "info"
command = "echo {}"

[[panes]]
name = "info"
side = "right"
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// The template written by `config --init` must parse back
#[test]
fn test_config_roundtrip_default() {
    let toml_str = Config::default().to_toml();
    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );

    let config = Config::from_file(parsed.unwrap(), &no_env).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_roundtrip_with_panes() {
    let mut config = Config::from_file(parse(TWO_PANES), &no_env).unwrap();
    config.panes[0].interval_ms = Some(250);
    config.panes[0].bindings[0].ttl_ms = Some(1500);
    config.panes[0].bindings[0].follow = Some("tail -f \"{}\"".to_string());
    config.panes[1].tail = true;
    config.logging.pane = true;

    let toml_str = config.to_toml();
    let reparsed = Config::from_file(parse(&toml_str), &no_env).unwrap();
    assert_eq!(reparsed.panes, config.panes);
    assert!(reparsed.logging.pane);
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing and precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_panes_parse_with_defaults() {
    let config = Config::from_file(parse(TWO_PANES), &no_env).unwrap();

    assert_eq!(config.panes.len(), 2);
    let topics = &config.panes[0];
    assert_eq!(topics.side, Side::Left);
    assert_eq!(topics.kind, PaneKindConfig::List);
    assert_eq!(topics.bindings[0].target, "info");
    assert_eq!(topics.bindings[0].ttl(), None);

    let info = &config.panes[1];
    assert_eq!(info.kind, PaneKindConfig::Text);
    assert!(info.bindings.is_empty());
    assert!(!config.runs_demo());
}

#[test]
fn test_empty_config_runs_demo() {
    let config = Config::from_file(FileConfig::default(), &no_env).unwrap();
    assert!(config.runs_demo());
    assert_eq!(config.tick, DEFAULT_TICK);
}

#[test]
fn test_tick_precedence() {
    let file = || parse("tick_ms = 50");

    let from_file = Config::from_file(file(), &no_env).unwrap();
    assert_eq!(from_file.tick, Duration::from_millis(50));

    let from_env = Config::from_file(file(), &env_from(&[("PANEBOARD_TICK_MS", "75")])).unwrap();
    assert_eq!(from_env.tick, Duration::from_millis(75));
}

#[test]
fn test_invalid_tick_is_rejected() {
    let env = env_from(&[("PANEBOARD_TICK_MS", "soon")]);
    assert!(Config::from_file(FileConfig::default(), &env).is_err());
    assert!(Config::from_file(parse("tick_ms = 0"), &no_env).is_err());
}

#[test]
fn test_log_level_env_overrides_file() {
    let file = parse("[logging]\nlevel = \"warn\"\nfile_rotation = \"HOURLY\"");
    let config = Config::from_file(file, &env_from(&[("PANEBOARD_LOG", "trace")])).unwrap();

    assert_eq!(config.logging.level, "trace");
    assert_eq!(config.logging.file_rotation, LogRotation::Hourly);
}

#[test]
fn test_unknown_rotation_falls_back_to_daily() {
    assert_eq!(LogRotation::from_str("weekly"), LogRotation::Daily);
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

fn rejects(toml_str: &str, needle: &str) {
    let err = Config::from_file(parse(toml_str), &no_env).unwrap_err();
    let message = format!("{:#}", err);
    assert!(
        message.contains(needle),
        "expected {:?} in {:?}",
        needle,
        message
    );
}

#[test]
fn test_duplicate_names_rejected() {
    rejects(
        "[[panes]]\nname = \"a\"\nside = \"left\"\n[[panes]]\nname = \"a\"\nside = \"right\"",
        "defined more than once",
    );
}

#[test]
fn test_empty_name_rejected() {
    rejects("[[panes]]\nname = \" \"\nside = \"left\"", "must not be empty");
}

#[test]
fn test_unknown_target_rejected() {
    rejects(
        "[[panes]]\nname = \"a\"\nside = \"left\"\nkind = \"list\"\n\
         [[panes.bindings]]\ntarget = \"ghost\"\ncommand = \"echo\"",
        "unknown pane ghost",
    );
}

#[test]
fn test_bindings_need_a_list_pane() {
    rejects(
        "[[panes]]\nname = \"a\"\nside = \"left\"\n\
         [[panes.bindings]]\ntarget = \"b\"\ncommand = \"echo\"\n\
         [[panes]]\nname = \"b\"\nside = \"right\"",
        "only list panes",
    );
}

#[test]
fn test_binding_without_command_rejected() {
    rejects(
        "[[panes]]\nname = \"a\"\nside = \"left\"\nkind = \"list\"\n\
         [[panes.bindings]]\ntarget = \"b\"\n\
         [[panes]]\nname = \"b\"\nside = \"right\"",
        "needs a command",
    );
}

#[test]
fn test_self_binding_rejected() {
    rejects(
        "[[panes]]\nname = \"a\"\nside = \"left\"\nkind = \"list\"\n\
         [[panes.bindings]]\ntarget = \"a\"\ncommand = \"echo\"",
        "binding to itself",
    );
}

#[test]
fn test_unknown_side_fails_to_parse() {
    let parsed: Result<FileConfig, _> =
        toml::from_str("[[panes]]\nname = \"a\"\nside = \"middle\"");
    assert!(parsed.is_err());
}

// ─────────────────────────────────────────────────────────────────────────────
// Files
// ─────────────────────────────────────────────────────────────────────────────

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("paneboard-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let path = scratch_dir("missing").join("config.toml");
    assert!(Config::load_with(Some(path), false, no_env).is_err());
}

#[test]
fn test_template_written_and_loaded() {
    let dir = scratch_dir("template");
    let path = dir.join("nested").join("config.toml");

    Config::write_template(&path).unwrap();
    assert!(Config::write_template(&path).is_err());

    let config = Config::load_with(Some(path.clone()), true, no_env).unwrap();
    assert_eq!(config.source.as_deref(), Some(path.as_path()));
    assert!(config.demo);
    assert!(config.panes.is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_env_names_config_file() {
    let dir = scratch_dir("env");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("dash.toml");
    std::fs::write(&path, TWO_PANES).unwrap();

    let env = env_from(&[("PANEBOARD_CONFIG", path.to_str().unwrap())]);
    let config = Config::load_with(None, false, env).unwrap();
    assert_eq!(config.panes.len(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}
