//! Session integration tests
//!
//! Drives a full session over an on-disk store the way the TUI and the CLI do.

use std::sync::Arc;
use std::time::Duration;

use devhub::catalog::CatalogSource;
use devhub::controller::{AppSession, ControllerState};
use devhub::error::{DevhubError, Result};
use devhub::storage::{FileStore, SharedStore};
use devhub::tools::{InputFile, ListenerSettings, ToolInput, Widget, WidgetContext};
use tempfile::TempDir;

fn session_in(dir: &TempDir) -> Result<AppSession> {
    let store: SharedStore = Arc::new(FileStore::open(dir.path())?);
    let mut session = AppSession::with_store(store);
    session.load(&CatalogSource::Builtin)?;
    Ok(session)
}

/// Category selection survives a restart
#[test]
fn test_category_persists_across_sessions() -> Result<()> {
    let dir = TempDir::new()?;
    {
        let mut session = session_in(&dir)?;
        session.filter_by_category("encoders");
    }

    let session = session_in(&dir)?;
    assert_eq!(session.selected_category(), "encoders");
    assert!(session.visible_tools().iter().all(|t| t.category == "encoders"));
    Ok(())
}

/// A catalog path that does not exist still yields a usable, empty session
#[test]
fn test_missing_catalog_file() -> Result<()> {
    let dir = TempDir::new()?;
    let store: SharedStore = Arc::new(FileStore::open(dir.path())?);
    let mut session = AppSession::with_store(store);
    session.load(&CatalogSource::Path(dir.path().join("missing.json")))?;

    assert_eq!(session.state(), ControllerState::Ready);
    assert!(session.visible_tools().is_empty());
    assert!(session.categories_with_counts().is_empty());
    assert!(matches!(session.open_tool("json-beautifier"), Err(DevhubError::ToolNotFound(_))));
    Ok(())
}

#[test]
fn test_search_properties() -> Result<()> {
    let dir = TempDir::new()?;
    let mut session = session_in(&dir)?;
    let all = session.visible_tools();

    session.search("   ");
    assert_eq!(session.visible_tools(), all);

    session.search("JSON");
    let upper = session.visible_tools();
    session.search("json");
    assert_eq!(session.visible_tools(), upper);
    assert!(upper.iter().any(|t| t.id == "json-beautifier"));
    Ok(())
}

#[test]
fn test_headless_tool_runs() -> Result<()> {
    let dir = TempDir::new()?;
    let mut session = session_in(&dir)?;

    let out = session.run_tool("base64-encoder", "encode", &ToolInput::text("hello"))?;
    assert_eq!(out.content, "aGVsbG8=");

    let out = session.run_tool("base64-encoder", "decode", &ToolInput::text("not-base64!"))?;
    assert!(out.is_error);

    let out = session.run_tool("json-beautifier", "beautify", &ToolInput::text(r#"{"a":"#))?;
    assert!(out.is_error);
    assert!(out.content.starts_with("Error:"));

    let out = session.run_tool("sha256-hash", "hash", &ToolInput::text("abc"))?;
    assert_eq!(out.content, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");

    assert_eq!(session.state(), ControllerState::Ready);
    Ok(())
}

/// Converting and exporting keeps state inside one open widget
#[test]
fn test_csv_convert_then_export() -> Result<()> {
    let dir = TempDir::new()?;
    let mut session = session_in(&dir)?;
    session.open_tool("csv-to-excel")?;

    let file = InputFile::new("people.csv", "name,age\nAda,36\nAlan,41\n");
    let out = session.run_current("convert", &ToolInput::new().with_file(file))?;
    assert!(out.content.starts_with("Conversion successful! 3 rows, 2 columns"));

    let out = session.run_current("export", &ToolInput::new())?;
    let export = out.export.expect("export file");
    assert!(export.file_name.starts_with("converted_"));
    let path = export.save_in(dir.path())?;
    let markup = std::fs::read_to_string(path)?;
    assert!(markup.contains("<th>name</th>"));

    session.close_tool()?;
    Ok(())
}

#[test]
fn test_sender_history_is_capped() -> Result<()> {
    let dir = TempDir::new()?;
    let mut session = session_in(&dir)?;
    session.open_tool("servicebus-sender")?;

    for i in 0..7 {
        let input = ToolInput::new()
            .with_option("connectionString", format!("Endpoint=sb://ns{}/", i))
            .with_option("queueName", "orders");
        session.run_current("save-config", &input)?;
    }
    // Saving an existing connection again moves it to the front
    let again = ToolInput::new()
        .with_option("connectionString", "Endpoint=sb://ns4/")
        .with_option("queueName", "orders");
    session.run_current("save-config", &again)?;
    session.close_tool()?;

    let history = session.factory().context().configs.load_history("servicebus-sender");
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].connection_string, "Endpoint=sb://ns4/");
    assert_eq!(history[1].connection_string, "Endpoint=sb://ns6/");
    assert_eq!(
        history.iter().filter(|h| h.connection_string == "Endpoint=sb://ns4/").count(),
        1
    );
    Ok(())
}

/// Start, three intervals, stop: exactly three messages and none after
#[tokio::test(start_paused = true)]
async fn test_listener_three_ticks() -> Result<()> {
    let dir = TempDir::new()?;
    let store: SharedStore = Arc::new(FileStore::open(dir.path())?);
    let context = WidgetContext::new(store.clone()).with_listener(ListenerSettings {
        interval: Duration::from_millis(1000),
        max_log_entries: 100,
    });
    let mut session = AppSession::new(store, context);
    session.load(&CatalogSource::Builtin)?;
    session.open_tool("servicebus-listener")?;

    let input = ToolInput::new()
        .with_option("connectionString", "Endpoint=sb://local/")
        .with_option("queueName", "orders");
    assert!(!session.run_current("start", &input)?.is_error);

    tokio::time::sleep(Duration::from_millis(3050)).await;
    let out = session.run_current("stop", &ToolInput::new())?;
    assert!(out.content.contains("Total messages received: 3"));

    tokio::time::sleep(Duration::from_millis(5000)).await;
    let listener = session.current_widget().and_then(Widget::as_listener).expect("listener");
    assert_eq!(listener.messages().len(), 3);
    assert_eq!(listener.received_count(), 3);

    session.close_tool()?;
    Ok(())
}
