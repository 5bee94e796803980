use anyhow::Result;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use crate::{CliTest, component, stderr, stdout};

#[test]
fn test_extract_writes_source_and_target_catalogs() -> Result<()> {
    let test = CliTest::with_file("src/app/page.tsx", &component(&["Hey!"]))?;
    test.write_file("messages/en.json", "{}")?;
    test.write_file("messages/de.json", "{\"+YJVTi\": \"Hallo!\"}")?;

    let output = test.run(&["extract"])?;

    assert_eq!(output.status.code(), Some(0));
    assert_snapshot!(stdout(&output).trim_end(), @"✓ Extracted 1 message from 1 file into en, de");
    assert_eq!(test.read_file("messages/en.json")?, "{\n  \"+YJVTi\": \"Hey!\"\n}\n");
    assert_eq!(test.read_file("messages/de.json")?, "{\n  \"+YJVTi\": \"Hallo!\"\n}\n");

    Ok(())
}

#[test]
fn test_extract_namespaced_messages() -> Result<()> {
    let test = CliTest::with_file(
        "src/components/Greeting.tsx",
        "import {useExtracted} from 'next-intl';\n\
         export function Greeting() {\n\
           const t = useExtracted('ui');\n\
           return t('Hello!');\n\
         }\n",
    )?;

    let output = test.run(&["extract"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(
        test.read_file("messages/en.json")?,
        "{\n  \"ui\": {\n    \"OpKKos\": \"Hello!\"\n  }\n}\n"
    );

    Ok(())
}

#[test]
fn test_extract_po_format_from_cli_flag() -> Result<()> {
    let test = CliTest::with_file("src/a.tsx", &component(&["Hey!"]))?;
    test.write_file("src/b.tsx", &component(&["Hey!", "Bye"]))?;

    let output = test.run(&["extract", "--format", "po", "--source-locale", "de"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let po = test.read_file("messages/de.po")?;
    assert!(po.contains("\"Language: de\\n\""), "{}", po);
    assert!(
        po.contains("#: src/a.tsx:4\n#: src/b.tsx:4\nmsgid \"+YJVTi\"\nmsgstr \"Hey!\""),
        "{}",
        po
    );
    assert!(po.contains("#: src/b.tsx:4\nmsgid \"wNBUiv\"\nmsgstr \"Bye\""), "{}", po);

    Ok(())
}

#[test]
fn test_extract_uses_config_file() -> Result<()> {
    let test = CliTest::with_file("web/page.tsx", &component(&["Save"]))?;
    test.write_file(
        ".intlrc.json",
        r#"{"srcPath": ["./web"], "messagesPath": "./locales", "locales": ["en", "fr"]}"#,
    )?;

    let output = test.run(&["extract"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(test.read_file("locales/fr.json")?, "{\n  \"jvo0vs\": \"\"\n}\n");
    assert!(test.root().join("locales/en.json").exists());

    Ok(())
}

#[test]
fn test_extract_reports_dynamic_message() -> Result<()> {
    let test = CliTest::with_file("src/good.tsx", &component(&["Hey!"]))?;
    test.write_file(
        "src/bad.tsx",
        "import {useExtracted} from 'next-intl';\n\
         export function Bad({name}) {\n\
           const t = useExtracted();\n\
           return t(`Hello ${name}!`);\n\
         }\n",
    )?;

    let output = test.run(&["extract"])?;

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("✘ src/bad.tsx: Cannot extract message from src/bad.tsx:4"), "{}", out);
    assert!(out.contains("(1 file skipped)"), "{}", out);
    assert_eq!(test.read_file("messages/en.json")?, "{\n  \"+YJVTi\": \"Hey!\"\n}\n");

    Ok(())
}

#[test]
fn test_extract_invalid_config_is_fatal() -> Result<()> {
    let test = CliTest::with_file(".intlrc.json", r#"{"ignores": ["[invalid"]}"#)?;

    let output = test.run(&["extract"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("Error:"), "{}", stderr(&output));

    Ok(())
}

#[test]
fn test_extract_debug_log_file() -> Result<()> {
    let test = CliTest::with_file("src/page.tsx", &component(&["Hey!"]))?;

    let output = test
        .command()
        .arg("extract")
        .env("INTL_EXTRACTOR_DEBUG", "1")
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    let log = test.read_file("intl-extractor.log")?;
    let first: serde_json::Value = serde_json::from_str(log.lines().next().unwrap_or("{}"))?;
    assert!(first.get("level").is_some(), "{}", log);
    assert!(first.get("msg").is_some(), "{}", log);

    Ok(())
}
