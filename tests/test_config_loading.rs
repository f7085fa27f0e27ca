//! Configuration loading and store snapshot round trips through real files

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use ticket_triage::config::{ConfigError, TriageConfig};
use ticket_triage::store::InMemoryTicketStore;
use ticket_triage::testing::{seeded_snapshot, MockInvoker, TICKET_ID};
use ticket_triage::triage::TriageEngine;

#[test]
fn test_config_loads_successfully_from_valid_toml() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(
        temp_file,
        r#"
[llm]
provider = "anthropic"
model = "claude-3-5-haiku-20241022"
api_key_env = "ANTHROPIC_API_KEY"

[triage]
history_window = 8

[store]
path = "/var/lib/triage/tickets.json"
"#
    )
    .unwrap();

    let config = TriageConfig::load_from_file(temp_file.path()).unwrap();

    assert_eq!(config.llm.provider, "anthropic");
    assert_eq!(config.llm.temperature, 0.1);
    assert_eq!(config.triage.history_window, 8);
    assert_eq!(config.triage.timeout_ms, 15_000);
    assert_eq!(
        config.store.path.as_deref(),
        Some(Path::new("/var/lib/triage/tickets.json"))
    );
}

#[test]
fn test_missing_file_is_file_read_error() {
    let result = TriageConfig::load_from_file(Path::new("/nonexistent/triage.toml"));
    assert!(matches!(result, Err(ConfigError::FileRead(_))));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "[llm\nprovider = ").unwrap();

    let result = TriageConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(
        temp_file,
        r#"
[llm]
provider = "openai"
model = "gpt-4o-mini"
api_key_env = "OPENAI_API_KEY"
temperature = -0.5
"#
    )
    .unwrap();

    let result = TriageConfig::load_from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_store_snapshot_survives_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tickets.json");

    InMemoryTicketStore::from_snapshot(seeded_snapshot())
        .save(&path)
        .await
        .unwrap();

    let store = Arc::new(InMemoryTicketStore::load(&path).await.unwrap());
    let engine = TriageEngine::new(
        Arc::new(MockInvoker::returning(
            r#"{"priority": 2, "agent_id": "agt-sso", "reason": "SSO outage"}"#,
        )),
        store.clone(),
    );
    engine.reanalyze_ticket(TICKET_ID).await.unwrap();
    store.save(&path).await.unwrap();

    let reloaded = InMemoryTicketStore::load(&path).await.unwrap();
    let ticket = reloaded.ticket(TICKET_ID).await.unwrap();
    assert_eq!(ticket.priority, Some(2));
    assert_eq!(ticket.assigned_agent_id.as_deref(), Some("agt-sso"));
    assert_eq!(reloaded.agent("agt-sso").await.unwrap().current_open_tickets, 3);
}

#[tokio::test]
async fn test_corrupt_snapshot_is_serialization_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "{{\"agents\": 42}}").unwrap();

    let result = InMemoryTicketStore::load(temp_file.path()).await;
    assert!(matches!(
        result,
        Err(ticket_triage::store::StoreError::Serialization(_))
    ));
}
