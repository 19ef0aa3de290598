use anyhow::Result;
use bill_impact::core::store::AnalysisStore;
use bill_impact::{
    AppConfig, BillAnalysis, BillPipeline, BillsApiClient, EtlEngine, GeminiAnalyser, ImpactError,
    LocalStorage, DIMENSIONS,
};
use httpmock::prelude::*;
use std::collections::HashSet;
use std::time::Duration;
use tempfile::TempDir;

type TestEngine = EtlEngine<BillPipeline<BillsApiClient, GeminiAnalyser, LocalStorage, AppConfig>>;

fn bill_json(bill_id: u32, title: &str) -> serde_json::Value {
    serde_json::json!({
        "billId": bill_id,
        "shortTitle": title,
        "currentHouse": "Commons",
        "originatingHouse": "Commons",
        "lastUpdate": "2024-06-01T09:00:00",
        "isAct": false,
        "isDefeated": false,
        "billWithdrawn": null,
        "currentStage": {
            "description": "Committee stage",
            "abbreviation": "CS",
            "house": "Commons",
            "stageSittings": []
        }
    })
}

fn bill_document(title: &str) -> String {
    format!(
        "<html><head><script>track()</script></head><body><nav>Home</nav><h1>{}</h1><p>{}</p></body></html>",
        title,
        "A BILL to make provision about the matters set out below. ".repeat(15)
    )
}

fn model_reply() -> serde_json::Value {
    let dimensions: Vec<serde_json::Value> = DIMENSIONS
        .iter()
        .map(|d| {
            serde_json::json!({
                "name": d.name,
                "impact": "positive",
                "summary": format!("Good for {}.", d.name),
                "detail": "Longer reasoning."
            })
        })
        .collect();
    let text =
        serde_json::json!({"billSummary": "Does a thing.", "dimensions": dimensions}).to_string();
    serde_json::json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
}

fn engine(server: &MockServer, dir: &TempDir) -> TestEngine {
    let config = AppConfig {
        bills_api_base: server.base_url(),
        model_api_base: server.base_url(),
        model: "gemini-test".to_string(),
        output_path: dir.path().join("data/bills.json").to_str().unwrap().to_string(),
        analysis_delay: Duration::ZERO,
        api_key: Some("test-key".to_string()),
        ..AppConfig::default()
    };
    let (root, file_name) = config.storage_location();
    let store = AnalysisStore::new(LocalStorage::new(root), file_name);
    let source = BillsApiClient::new(&config.bills_api_base);
    let analyser = GeminiAnalyser::new(config.gemini_settings().unwrap()).unwrap();
    EtlEngine::new(BillPipeline::new(source, analyser, store, config))
}

fn read_store(dir: &TempDir) -> Result<Vec<BillAnalysis>> {
    let raw = std::fs::read(dir.path().join("data/bills.json"))?;
    Ok(serde_json::from_slice(&raw)?)
}

#[tokio::test]
async fn test_end_to_end_run_then_idempotent_rerun() -> Result<()> {
    let dir = TempDir::new()?;
    let server = MockServer::start();

    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/Bills")
            .query_param("Take", "20")
            .query_param("SortOrder", "DateUpdatedDescending");
        then.status(200).json_body(serde_json::json!({
            "items": [bill_json(1, "Analysed Bill"), bill_json(2, "Paper Only Bill")],
            "totalResults": 2,
            "itemsPerPage": 20
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Bills/1/Publications");
        then.status(200).json_body(serde_json::json!({
            "billId": 1,
            "publications": [{
                "id": 11,
                "title": "Bill as introduced",
                "displayDate": "2024-05-01T00:00:00",
                "publicationType": {"id": 5, "name": "Bill", "description": "Bill"},
                "links": [],
                "files": [{
                    "id": 111,
                    "filename": "bill.html",
                    "contentType": "text/html",
                    "contentLength": 900
                }]
            }]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Publications/11/Documents/111/Download");
        then.status(200).body(bill_document("Analysed Bill"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Bills/2/Publications");
        then.status(200)
            .json_body(serde_json::json!({"billId": 2, "publications": []}));
    });
    let model = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-test:generateContent")
            .header("x-goog-api-key", "test-key")
            .body_contains("BILL TITLE: Analysed Bill");
        then.status(200).json_body(model_reply());
    });

    let first = engine(&server, &dir).run().await?;
    assert_eq!(first.new_records, 2);
    assert_eq!(first.total_records, 2);
    model.assert_hits(1);

    let stored = read_store(&dir)?;
    assert_eq!(stored.len(), 2);

    let analysed = &stored[0];
    assert_eq!(analysed.bill.bill_id, 1);
    assert!(analysed.text_available);
    assert_eq!(analysed.summary, "Does a thing.");
    let names: Vec<&str> = analysed.categories.iter().map(|c| c.name.as_str()).collect();
    let expected: Vec<&str> = DIMENSIONS.iter().map(|d| d.name).collect();
    assert_eq!(names, expected);
    assert_eq!(analysed.bill.bill_url, "https://bills.parliament.uk/bills/1");

    let paper_only = &stored[1];
    assert!(!paper_only.text_available);
    assert_eq!(paper_only.summary, "");
    assert!(paper_only.categories.is_empty());

    let second = engine(&server, &dir).run().await?;
    assert_eq!(second.new_records, 0);
    assert_eq!(second.total_records, 2);
    list.assert_hits(2);
    model.assert_hits(1);
    assert_eq!(read_store(&dir)?, stored);

    Ok(())
}

#[tokio::test]
async fn test_existing_records_are_kept_and_only_new_bills_processed() -> Result<()> {
    let dir = TempDir::new()?;
    let server = MockServer::start();

    let seed = serde_json::json!([{
        "bill": {
            "billId": 1,
            "shortTitle": "Old Bill",
            "currentHouse": "Lords",
            "originatingHouse": "Lords",
            "lastUpdate": "2023-01-01T00:00:00",
            "isAct": true,
            "currentStage": null,
            "billUrl": "https://bills.parliament.uk/bills/1"
        },
        "textAvailable": false,
        "summary": "",
        "categories": [],
        "analysedAt": "2023-01-02T00:00:00.000Z"
    }]);
    std::fs::create_dir_all(dir.path().join("data"))?;
    std::fs::write(dir.path().join("data/bills.json"), seed.to_string())?;

    server.mock(|when, then| {
        when.method(GET).path("/Bills");
        then.status(200).json_body(serde_json::json!({
            "items": [bill_json(1, "Old Bill"), bill_json(2, "New Bill")],
            "totalResults": 2,
            "itemsPerPage": 20
        }));
    });
    let old_pubs = server.mock(|when, then| {
        when.method(GET).path("/Bills/1/Publications");
        then.status(200).json_body(serde_json::json!({"billId": 1, "publications": []}));
    });
    let new_pubs = server.mock(|when, then| {
        when.method(GET).path("/Bills/2/Publications");
        then.status(200).json_body(serde_json::json!({"billId": 2, "publications": []}));
    });

    let report = engine(&server, &dir).run().await?;

    old_pubs.assert_hits(0);
    new_pubs.assert_hits(1);
    assert_eq!(report.new_records, 1);

    let stored = read_store(&dir)?;
    let ids: HashSet<u32> = stored.iter().map(|r| r.bill.bill_id).collect();
    assert_eq!(stored.len(), 2);
    assert_eq!(ids, HashSet::from([1, 2]));
    assert_eq!(stored[0].bill.short_title, "Old Bill");
    assert!(stored[0].bill.is_act);

    Ok(())
}

#[tokio::test]
async fn test_model_failure_is_recorded_not_fatal() -> Result<()> {
    let dir = TempDir::new()?;
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/Bills");
        then.status(200).json_body(serde_json::json!({
            "items": [bill_json(5, "Unlucky Bill")],
            "totalResults": 1,
            "itemsPerPage": 20
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Bills/5/Publications");
        then.status(200).json_body(serde_json::json!({
            "billId": 5,
            "publications": [{
                "id": 55,
                "displayDate": "2024-05-01T00:00:00",
                "publicationType": {"id": 5, "name": "Bill"},
                "files": [{"id": 555, "contentType": "text/html"}]
            }]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Publications/55/Documents/555/Download");
        then.status(200).body(bill_document("Unlucky Bill"));
    });
    server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Sorry, I can't do that."}]}}]
        }));
    });

    let report = engine(&server, &dir).run().await?;
    assert_eq!(report.new_records, 1);

    let stored = read_store(&dir)?;
    assert!(stored[0].text_available);
    assert_eq!(stored[0].summary, BillAnalysis::FAILED_SUMMARY);
    assert!(stored[0].categories.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_listing_failure_aborts_without_writing() -> Result<()> {
    let dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Bills");
        then.status(500);
    });

    let result = engine(&server, &dir).run().await;

    assert!(matches!(
        result,
        Err(ImpactError::UpstreamStatusError { status: 500, .. })
    ));
    assert!(!dir.path().join("data/bills.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_malformed_store_is_replaced() -> Result<()> {
    let dir = TempDir::new()?;
    let server = MockServer::start();
    std::fs::create_dir_all(dir.path().join("data"))?;
    std::fs::write(dir.path().join("data/bills.json"), "[{\"bill\": ")?;

    server.mock(|when, then| {
        when.method(GET).path("/Bills");
        then.status(200).json_body(serde_json::json!({
            "items": [bill_json(9, "Fresh Bill")],
            "totalResults": 1,
            "itemsPerPage": 20
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/Bills/9/Publications");
        then.status(200).json_body(serde_json::json!({"billId": 9, "publications": []}));
    });

    let report = engine(&server, &dir).run().await?;
    tokio_test::assert_ok!(read_store(&dir));
    assert_eq!(report.total_records, 1);

    Ok(())
}
