use anyhow::{Context, Result};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["srcPath"], serde_json::json!(["./src"]));
    assert_eq!(parsed["messagesPath"], "./messages");
    assert_eq!(parsed["sourceLocale"], "en");
    assert_eq!(parsed["locales"], "infer");
    assert_eq!(parsed["format"], "json");
    assert_eq!(parsed["accessors"].as_array().map(Vec::len), Some(4));

    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["init"])?;

    assert_eq!(output.status.code(), Some(0));
    assert_snapshot!(stdout(&output).trim_end(), @"✓ Created .intlrc.json");
    let content = test.read_file(".intlrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_with_root_flag() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("web/.keep", "")?;

    let output = test.run(&["init", "--root", "web"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(test.root().join("web/.intlrc.json").exists());
    assert!(!test.root().join(".intlrc.json").exists());

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".intlrc.json", "{}")?;

    let output = test.run(&["init"])?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output).trim_end(), "Error: .intlrc.json already exists");
    assert_eq!(test.read_file(".intlrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_generated_config_is_loadable() -> Result<()> {
    let test = CliTest::new()?;
    test.run(&["init"])?;
    test.write_file("src/page.tsx", &crate::component(&["Hey!"]))?;

    let output = test.run(&["extract"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(test.root().join("messages/en.json").exists());

    Ok(())
}
