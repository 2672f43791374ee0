use anyhow::Result;
use httpmock::prelude::*;
use toggl_rounder::{OnInvalid, RoundingEngine, Settings, TogglClient, TogglPipeline};

fn settings(endpoint: &str) -> Settings {
    Settings {
        days: 1,
        input: None,
        output_path: "./output".to_string(),
        api_endpoint: endpoint.to_string(),
        on_invalid: OnInvalid::Skip,
        start_column: "start".to_string(),
        stop_column: "stop".to_string(),
        duration_column: "duration".to_string(),
        workday: None,
        verbose: false,
    }
}

#[tokio::test]
async fn test_end_to_end_fetch_round_and_update() -> Result<()> {
    let server = MockServer::start();

    let fetch_mock = server.mock(|when, then| {
        when.method(GET).path("/me/time_entries");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {
                    "id": 1,
                    "workspace_id": 876389,
                    "description": "Standup",
                    "start": "2024-01-01T09:07:42+00:00",
                    "stop": "2024-01-01T09:21:10+00:00",
                    "duration": 808,
                    "billable": false,
                    "project_id": 12780480
                },
                {
                    "id": 2,
                    "workspace_id": 876389,
                    "description": "Code review",
                    "start": "2024-01-01T09:53:00+00:00",
                    "stop": "2024-01-01T11:38:12+00:00",
                    "duration": 6312,
                    "billable": true,
                    "project_id": 12780480
                }
            ]));
    });

    let update_standup = server.mock(|when, then| {
        when.method(PUT)
            .path("/workspaces/876389/time_entries/1")
            .json_body_partial(
                r#"{
                    "start": "2024-01-01T09:00:00+00:00",
                    "stop": "2024-01-01T09:15:00+00:00",
                    "duration": 900,
                    "description": "Standup",
                    "billable": false
                }"#,
            );
        then.status(200).json_body(serde_json::json!({"id": 1}));
    });

    let update_review = server.mock(|when, then| {
        when.method(PUT)
            .path("/workspaces/876389/time_entries/2")
            .json_body_partial(
                r#"{
                    "start": "2024-01-01T10:00:00+00:00",
                    "stop": "2024-01-01T11:45:00+00:00",
                    "duration": 6300
                }"#,
            );
        then.status(200).json_body(serde_json::json!({"id": 2}));
    });

    let client = TogglClient::new(server.url(""), "secret-token".to_string());
    let pipeline = TogglPipeline::new(client, settings(&server.url("")));
    let summary = RoundingEngine::new(pipeline).run().await?;

    fetch_mock.assert();
    update_standup.assert();
    update_review.assert();
    assert_eq!(summary, "updated 2 entries");
    Ok(())
}

#[tokio::test]
async fn test_running_entries_are_skipped_not_updated() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/me/time_entries");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {
                    "id": 1,
                    "workspace_id": 99,
                    "description": "Finished",
                    "start": "2024-01-01T09:07:42+00:00",
                    "stop": "2024-01-01T09:21:10+00:00",
                    "duration": 808
                },
                {
                    "id": 2,
                    "workspace_id": 99,
                    "description": "Still running",
                    "start": "2024-01-01T10:00:00+00:00",
                    "stop": null,
                    "duration": -1
                }
            ]));
    });

    let finished_update = server.mock(|when, then| {
        when.method(PUT).path("/workspaces/99/time_entries/1");
        then.status(200).json_body(serde_json::json!({"id": 1}));
    });

    let client = TogglClient::new(server.url(""), "secret-token".to_string());
    let pipeline = TogglPipeline::new(client, settings(&server.url("")));
    let summary = RoundingEngine::new(pipeline).run().await?;

    // The running entry never reaches the API; only the finished one does.
    finished_update.assert();
    assert_eq!(summary, "updated 1 entries");
    Ok(())
}

#[tokio::test]
async fn test_api_failure_fails_the_run() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/me/time_entries");
        then.status(500).body("upstream exploded");
    });

    let client = TogglClient::new(server.url(""), "secret-token".to_string());
    let pipeline = TogglPipeline::new(client, settings(&server.url("")));
    let result = RoundingEngine::new(pipeline).run().await;

    assert!(result.is_err());
}
