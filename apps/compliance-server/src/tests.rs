//! HTTP endpoint tests using axum-test
//!
//! Every server runs on an in-memory store with the offline hashing embedder,
//! so the tests need neither network nor disk.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD, Engine};
use compliance_engine::ComplianceEngine;
use corpus_core::{CompliancePipeline, CorpusConfig, DistanceMetric, HashingEmbedder, InMemoryVectorStore};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shared_types::{ComplianceReport, CorpusKind, CorrectionReport, Language};

use crate::build_router;
use crate::state::AppState;

const REGULATION: &str = "Bank kredit shartnomasini imzolashdan oldin mijozga barcha shartlar haqida to'liq ma'lumot berishi shart.\n\
    Kredit bo'yicha foiz stavkasi shartnomada aniq va tushunarli tarzda ko'rsatilishi kerak.\n\
    Garov mulki baholash hisobotiga asoslanib shartnomada alohida band bilan belgilanadi.";

fn pipeline() -> CompliancePipeline {
    CompliancePipeline::new(
        ComplianceEngine::default(),
        Arc::new(HashingEmbedder::new(64)),
        Arc::new(InMemoryVectorStore::new(DistanceMetric::L2)),
        CorpusConfig::local("unused").with_top_k(1),
    )
}

/// Create a test server whose regulation corpus holds `REGULATION`
async fn create_test_server() -> TestServer {
    let pipeline = pipeline();
    pipeline
        .ingest_text("nizom.pdf", REGULATION, CorpusKind::Regulations, Language::Uzbek)
        .await
        .unwrap();

    TestServer::new(build_router(AppState::new(pipeline), 1024 * 1024)).unwrap()
}

#[tokio::test]
async fn test_health_returns_200() {
    let server = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "compliance-server");
}

#[tokio::test]
async fn test_segment_returns_chunks_and_statistics() {
    let server = create_test_server().await;
    let response = server
        .post("/api/segment")
        .json(&json!({ "text": REGULATION, "corpus": "regulations", "document": "nizom.pdf" }))
        .await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["chunks"].as_array().unwrap().len(), 3);
    assert_eq!(json["chunks"][0]["id"], "reg_nizom_0");
    assert_eq!(json["statistics"]["total_chunks"], 3);
    assert_eq!(json["statistics"]["hotspot_distribution"]["collateral"], 1);
}

#[tokio::test]
async fn test_segment_rejects_short_text() {
    let server = create_test_server().await;
    let response = server.post("/api/segment").json(&json!({ "text": "Qisqa matn" })).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let json = response.json::<Value>();
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "EMPTY_DOCUMENT");
}

#[tokio::test]
async fn test_check_text_reports_each_corpus() {
    let server = create_test_server().await;
    let response = server
        .post("/api/check")
        .json(&json!({ "document": "contract.pdf", "text": REGULATION }))
        .await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["success"], true);
    assert_eq!(json["chunks_analyzed"], 3);
    assert_eq!(json["report"]["regulation_compliance"]["score"], 100.0);
    assert_eq!(
        json["report"]["policy_compliance"]["error"],
        "bank_policies collection not available"
    );
    assert_eq!(json["report"]["overall_status"], "FAIL");
    assert_eq!(json["corrections"]["total_corrections_needed"], 0);
}

#[tokio::test]
async fn test_check_requires_a_document() {
    let server = create_test_server().await;
    let response = server.post("/api/check").json(&json!({ "document": "x.pdf" })).await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_check_rejects_bad_base64() {
    let server = create_test_server().await;
    let response = server
        .post("/api/check")
        .json(&json!({ "pdf_base64": "%%% not base64 %%%" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_check_rejects_unreadable_pdf() {
    let server = create_test_server().await;
    let response = server
        .post("/api/check")
        .json(&json!({ "pdf_base64": STANDARD.encode(b"plain bytes, not a pdf") }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["code"], "EXTRACTION_FAILED");
}

#[tokio::test]
async fn test_corrections_from_posted_report() {
    let server = create_test_server().await;

    let violation = json!({
        "uploaded_chunk_id": "uploaded_chunk_0",
        "uploaded_section": "4.2.",
        "uploaded_text_excerpt": "kredit muddati 90 kalendar kun",
        "matched_text_excerpt": "kredit muddati 60 kalendar kun",
        "source_document": "nizom.pdf",
        "distance": 0.61,
        "similarity": 0.39,
        "tier": "violation",
        "potential_issue": "DAYS: Uploaded says 90.0, reference says 60.0"
    });
    let report = json!({
        "report_date": "2026-10-15T09:30:00Z",
        "document": "contract.pdf",
        "overall_status": "FAIL",
        "overall_compliance_score": 0.0,
        "regulation_compliance": { "score": 0.0, "total_violations": 1, "violations": [violation] },
        "policy_compliance": { "score": 0.0, "total_violations": 0, "violations": [] },
        "detailed_findings": {
            "regulation_matches": 0,
            "regulation_weak_matches": 0,
            "policy_matches": 0,
            "policy_weak_matches": 0
        }
    });

    let response = server.post("/api/corrections").json(&report).await;
    response.assert_status_ok();

    assert_eq!(response.json::<Value>()["high_priority_corrections"][0]["corpus"], "regulation");

    let corrections = response.json::<CorrectionReport>();
    assert_eq!(corrections.total_corrections_needed, 1);
    assert_eq!(corrections.summary.high_count, 1);
    let item = &corrections.high_priority_corrections[0];
    assert_eq!(item.current_value, "90.0");
    assert_eq!(item.correct_value, "60.0");
    assert_eq!(item.section, "4.2.");
    assert_eq!(item.action_required, "Change '90.0 kalendar kun' to '60.0 kalendar kun'");
}

#[tokio::test]
async fn test_check_report_round_trips_into_corrections() {
    let server = create_test_server().await;
    let check = server
        .post("/api/check")
        .json(&json!({ "text": REGULATION }))
        .await
        .json::<Value>();
    let report: ComplianceReport = serde_json::from_value(check["report"].clone()).unwrap();

    let response = server.post("/api/corrections").json(&report).await;
    response.assert_status_ok();
    assert_eq!(response.json::<CorrectionReport>().overall_status, report.overall_status);
}

#[tokio::test]
async fn test_collections_lists_ingested_corpus() {
    let server = create_test_server().await;
    let response = server.get("/api/collections").await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["collections"][0]["name"], "regulations");
    assert_eq!(json["collections"][0]["count"], 3);
}
