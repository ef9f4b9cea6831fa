mod common;

use std::io::Cursor;

use common::*;
use honeycomb_cleaner::activity::Cutoff;
use honeycomb_cleaner::cleaner::{
    AssumeYes, Cleaner, CleanupOptions, DeletionPhase, LinePrompt,
};
use honeycomb_cleaner::cli::OutputMode;
use honeycomb_cleaner::report::Reporter;
use httpmock::prelude::*;
use serde_json::json;

fn quiet_reporter() -> Reporter {
    Reporter::new(OutputMode::Robot, "https://ui.honeycomb.io", 150)
}

fn options(days: u32) -> CleanupOptions {
    CleanupOptions {
        days,
        ..CleanupOptions::default()
    }
}

/// One active dataset (`fresh`) and two inactive ones (`stale`, `never`).
fn mixed_datasets(server: &MockServer) {
    let recent = days_ago(1);
    mock_datasets(
        server,
        json!([
            dataset("fresh", Some(recent.as_str())),
            dataset("stale", Some(STALE)),
            dataset("never", None),
        ]),
    );
}

#[test]
fn dry_run_reports_without_deleting() {
    let server = MockServer::start();
    mock_auth(&server);
    mixed_datasets(&server);
    let delete = server.mock(|when, then| {
        when.method(DELETE);
        then.status(200);
    });
    let update = server.mock(|when, then| {
        when.method(PUT);
        then.status(200);
    });

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = options(30);
    let summary = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut AssumeYes)
        .unwrap();

    delete.assert_calls(0);
    update.assert_calls(0);
    assert_eq!(summary.environment, "Production");
    assert_eq!(summary.team, "My Team");
    assert_eq!(summary.active_datasets.len(), 1);
    assert_eq!(summary.active_datasets[0].slug, "fresh");
    let inactive: Vec<_> = summary
        .inactive_datasets
        .iter()
        .map(|entry| entry.slug.as_str())
        .collect();
    assert_eq!(inactive, vec!["stale", "never"]);
    assert_eq!(summary.dataset_deletion, DeletionPhase::NotRequested);
    assert!(summary.columns.is_none());
}

#[test]
fn delete_with_consent_removes_inactive_datasets() {
    let server = MockServer::start();
    mock_auth(&server);
    mixed_datasets(&server);
    let stale = server.mock(|when, then| {
        when.method(DELETE).path("/1/datasets/stale");
        then.status(202);
    });
    let never = server.mock(|when, then| {
        when.method(DELETE).path("/1/datasets/never");
        then.status(202);
    });
    let fresh = server.mock(|when, then| {
        when.method(DELETE).path("/1/datasets/fresh");
        then.status(202);
    });

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = CleanupOptions {
        delete: true,
        ..options(30)
    };
    let summary = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut AssumeYes)
        .unwrap();

    stale.assert();
    never.assert();
    fresh.assert_calls(0);
    assert_eq!(
        summary.dataset_deletion,
        DeletionPhase::Completed {
            deleted: 2,
            failed: 0,
            skipped: 0
        }
    );
    assert_eq!(summary.deleted_total(), 2);
}

#[test]
fn declined_prompt_deletes_nothing() {
    let server = MockServer::start();
    mock_auth(&server);
    mixed_datasets(&server);
    let delete = server.mock(|when, then| {
        when.method(DELETE);
        then.status(202);
    });

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = CleanupOptions {
        delete: true,
        ..options(30)
    };
    let mut prompt = LinePrompt::new(Cursor::new("no\n"), Vec::new());
    let summary = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut prompt)
        .unwrap();

    delete.assert_calls(0);
    assert_eq!(summary.dataset_deletion, DeletionPhase::Aborted);
    let transcript = String::from_utf8(prompt.into_output()).unwrap();
    assert!(transcript.contains("Do you want to delete 2 inactive datasets?"));
}

#[test]
fn delete_with_nothing_inactive_is_a_no_op() {
    let server = MockServer::start();
    mock_auth(&server);
    let recent = days_ago(2);
    mock_datasets(&server, json!([dataset("fresh", Some(recent.as_str()))]));
    let delete = server.mock(|when, then| {
        when.method(DELETE);
        then.status(202);
    });

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = CleanupOptions {
        delete: true,
        ..options(30)
    };
    let summary = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut AssumeYes)
        .unwrap();

    delete.assert_calls(0);
    assert_eq!(summary.dataset_deletion, DeletionPhase::NothingToDelete);
}

#[test]
fn name_filter_limits_candidates() {
    let server = MockServer::start();
    mock_auth(&server);
    mixed_datasets(&server);
    let stale = server.mock(|when, then| {
        when.method(DELETE).path("/1/datasets/stale");
        then.status(202);
    });
    let never = server.mock(|when, then| {
        when.method(DELETE).path("/1/datasets/never");
        then.status(202);
    });

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = CleanupOptions {
        delete: true,
        names: vec!["stale".to_string(), "fresh".to_string()],
        ..options(30)
    };
    let summary = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut AssumeYes)
        .unwrap();

    stale.assert();
    never.assert_calls(0);
    assert_eq!(summary.filtered_out, 1);
    assert_eq!(summary.active_datasets.len(), 1);
    assert_eq!(summary.inactive_datasets.len(), 1);
}

#[test]
fn failed_deletions_are_counted_and_do_not_stop_the_run() {
    let server = MockServer::start();
    mock_auth(&server);
    mixed_datasets(&server);
    server.mock(|when, then| {
        when.method(DELETE).path("/1/datasets/stale");
        then.status(404).json_body(json!({"error": "Dataset not found"}));
    });
    let never = server.mock(|when, then| {
        when.method(DELETE).path("/1/datasets/never");
        then.status(202);
    });

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = CleanupOptions {
        delete: true,
        ..options(30)
    };
    let summary = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut AssumeYes)
        .unwrap();

    never.assert();
    assert_eq!(summary.deleted_total(), 1);
    assert_eq!(summary.failed_total(), 1);
}

#[test]
fn dataset_list_failure_is_fatal() {
    let server = MockServer::start();
    mock_auth(&server);
    server.mock(|when, then| {
        when.method(GET).path("/1/datasets");
        then.status(500).body("boom");
    });

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = options(30);
    let err = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut AssumeYes)
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
}

#[test]
fn auth_failure_falls_back_to_unknown_environment() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/1/auth");
        then.status(401).json_body(json!({"error": "Unauthorized"}));
    });
    mock_datasets(&server, json!([]));

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = options(30);
    let summary = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut AssumeYes)
        .unwrap();

    assert_eq!(summary.environment, "Unknown");
    assert_eq!(summary.team, "Unknown");
    assert!(summary.inactive_datasets.is_empty());
}

#[test]
fn column_check_reports_without_deleting() {
    let server = MockServer::start();
    mock_auth(&server);
    mixed_datasets(&server);
    let recent = days_ago(3);
    server.mock(|when, then| {
        when.method(GET).path("/1/columns/fresh");
        then.status(200).json_body(json!([
            column("c1", "user_id", Some(recent.as_str())),
            column("c2", "legacy_field", Some(STALE)),
            column("c3", "never_written", None),
        ]));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE);
        then.status(200);
    });

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = CleanupOptions {
        check_columns: true,
        ..options(30)
    };
    let summary = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut AssumeYes)
        .unwrap();

    delete.assert_calls(0);
    let reports = summary.columns.as_ref().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].dataset_slug, "fresh");
    assert_eq!(reports[0].active, 1);
    assert_eq!(summary.inactive_column_count(), 2);
    assert_eq!(summary.column_deletion, DeletionPhase::NotRequested);
}

#[test]
fn column_deletion_removes_inactive_columns() {
    let server = MockServer::start();
    mock_auth(&server);
    mixed_datasets(&server);
    let recent = days_ago(3);
    server.mock(|when, then| {
        when.method(GET).path("/1/columns/fresh");
        then.status(200).json_body(json!([
            column("c1", "user_id", Some(recent.as_str())),
            column("c2", "legacy_field", Some(STALE)),
            column("", "no_id", None),
        ]));
    });
    let legacy = server.mock(|when, then| {
        when.method(DELETE).path("/1/columns/fresh/c2");
        then.status(200);
    });
    let active = server.mock(|when, then| {
        when.method(DELETE).path("/1/columns/fresh/c1");
        then.status(200);
    });

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = CleanupOptions {
        check_columns: true,
        delete_columns: true,
        ..options(30)
    };
    let summary = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut AssumeYes)
        .unwrap();

    legacy.assert();
    active.assert_calls(0);
    assert_eq!(
        summary.column_deletion,
        DeletionPhase::Completed {
            deleted: 1,
            failed: 0,
            skipped: 1
        }
    );
}

#[test]
fn unauthorized_column_listing_becomes_a_warning() {
    let server = MockServer::start();
    mock_auth(&server);
    mixed_datasets(&server);
    server.mock(|when, then| {
        when.method(GET).path("/1/columns/fresh");
        then.status(401).json_body(json!({"error": "Unauthorized"}));
    });

    let client = client_for(&server);
    let reporter = quiet_reporter();
    let opts = CleanupOptions {
        check_columns: true,
        ..options(30)
    };
    let summary = Cleaner::new(&client, &reporter, &opts)
        .run(&Cutoff::now(30).unwrap(), &mut AssumeYes)
        .unwrap();

    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("Manage Queries and Columns"));
    assert_eq!(summary.inactive_column_count(), 0);
}
