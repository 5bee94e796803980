use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{CliTest, component, stderr, stdout};

const PROVIDER_LAYOUT: &str = r#"import {NextIntlClientProvider} from 'next-intl';

export default function Layout({children, modal}) {
  return (
    <NextIntlClientProvider>
      {children}
      {modal}
    </NextIntlClientProvider>
  );
}
"#;

fn app_with_slot() -> Result<CliTest> {
    let test = CliTest::with_file("src/app/layout.tsx", PROVIDER_LAYOUT)?;
    test.write_file(
        "src/app/page.tsx",
        "import Welcome from '@/components/Welcome';\n\
         export default function Page() { return <Welcome/>; }\n",
    )?;
    test.write_file("src/components/Welcome.tsx", &component(&["Welcome"]))?;
    test.write_file("src/app/@modal/default.tsx", &component(&["Modal"]))?;
    test.write_file("src/app/@modal/(.)photo/page.tsx", &component(&["Photo"]))?;
    test.write_file(
        ".intlrc.json",
        r#"{"paths": {"@/*": ["./src/*"]}}"#,
    )?;
    Ok(test)
}

#[test]
fn test_manifest_to_stdout() -> Result<()> {
    let test = app_with_slot()?;

    let output = test.run(&["manifest"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let manifest: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(
        manifest,
        json!({
            "/": {
                "hasLayoutProvider": true,
                "namespaces": {"PwaN2o": true, "ruN6PI": true, "/b3UL8": true}
            }
        })
    );

    Ok(())
}

#[test]
fn test_manifest_to_output_file() -> Result<()> {
    let test = app_with_slot()?;
    test.write_file("src/app/@modal/(.)photo/layout.tsx", PROVIDER_LAYOUT)?;

    let output = test.run(&["manifest", "--output", "build/manifest.json"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(
        stdout(&output).trim_end(),
        "✓ Wrote manifest for 2 segments to build/manifest.json"
    );
    let manifest: Value = serde_json::from_str(&test.read_file("build/manifest.json")?)?;
    assert_eq!(
        manifest,
        json!({
            "/": {
                "hasLayoutProvider": true,
                "namespaces": {"PwaN2o": true, "ruN6PI": true}
            },
            "/(.)photo": {
                "hasLayoutProvider": true,
                "namespaces": {"/b3UL8": true}
            }
        })
    );

    Ok(())
}

#[test]
fn test_manifest_app_dir_flag() -> Result<()> {
    let test = CliTest::with_file("app/layout.tsx", PROVIDER_LAYOUT)?;
    test.write_file("app/page.tsx", &component(&["Dashboard"]))?;
    test.write_file(".intlrc.json", r#"{"srcPath": ["./app"], "appDirs": ["./nowhere"]}"#)?;

    let output = test.run(&["manifest", "--app-dir", "./app"])?;

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let manifest: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(manifest["/"]["namespaces"], json!({"hzSNj4": true}));

    Ok(())
}

#[test]
fn test_manifest_without_app_dir_fails() -> Result<()> {
    let test = CliTest::with_file("src/page.tsx", &component(&["Hey!"]))?;

    let output = test.run(&["manifest"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr(&output).contains("No app directory found"),
        "{}",
        stderr(&output)
    );

    Ok(())
}
