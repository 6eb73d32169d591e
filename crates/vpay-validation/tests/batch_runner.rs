//! Batch runner behavior, including per-item failure isolation.

mod common;

use pretty_assertions::assert_eq;
use vpay_core::enums::{ExtractionStatus, PaymentType, ValidationStatus};
use vpay_db::repos::processing_log::LogFilter;
use vpay_validation::{BatchRunner, ValidationEngine, ValidationError};

use common::{FlakyStore, extraction, reference, service, tolerance};

#[tokio::test]
async fn one_failing_lookup_is_excluded_from_results() {
    let svc = service().await;
    let cnpjs = [
        "11111111111111",
        "22222222222222",
        "33333333333333",
        "44444444444444",
        "55555555555555",
    ];
    for cnpj in cnpjs {
        reference(&svc, cnpj, &[(PaymentType::Pc, "1000.00")]).await;
        extraction(&svc, cnpj, "1000.00", PaymentType::Pc, "08/2024").await;
    }

    let store = FlakyStore {
        inner: &svc,
        failing_cnpj: "33333333333333".into(),
    };
    let engine = ValidationEngine::new(store, tolerance());
    let report = BatchRunner::new(&engine).run().await.unwrap();

    assert_eq!(report.results.len(), 4);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert!(matches!(failure.error, ValidationError::Store { .. }));

    let failed = svc
        .get_extraction(&failure.extraction_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(failed.cnpj, "33333333333333");
    assert_eq!(failed.status, ExtractionStatus::Extracted, "no partial write");
    assert!(
        report
            .results
            .iter()
            .all(|r| r.extraction_id != failure.extraction_id)
    );
}

#[tokio::test]
async fn results_follow_extraction_order_and_share_a_trace() {
    let svc = service().await;
    reference(&svc, "11111111111111", &[(PaymentType::Pc, "1000.00")]).await;

    let a = extraction(&svc, "11111111111111", "1000.00", PaymentType::Pc, "06/2024").await;
    let b = extraction(&svc, "99999999999999", "1000.00", PaymentType::Pc, "06/2024").await;
    let c = extraction(&svc, "11111111111111", "500.00", PaymentType::Pc, "07/2024").await;

    let engine = ValidationEngine::new(&svc, tolerance());
    let report = BatchRunner::new(&engine).run().await.unwrap();

    let order: Vec<_> = report.results.iter().map(|r| r.extraction_id.clone()).collect();
    assert_eq!(order, vec![a.id, b.id, c.id]);
    let statuses: Vec<_> = report.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            ValidationStatus::Valid,
            ValidationStatus::MetaNotFound,
            ValidationStatus::Invalid
        ]
    );

    assert!(report.trace_id.starts_with("trc-"));
    let logs = svc
        .query_logs(&LogFilter {
            trace_id: Some(report.trace_id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(logs.len(), 3);
}

#[tokio::test]
async fn only_extracted_records_are_picked_up() {
    let svc = service().await;
    reference(&svc, "11111111111111", &[(PaymentType::Pc, "1000.00")]).await;
    let engine = ValidationEngine::new(&svc, tolerance());

    let first = extraction(&svc, "11111111111111", "1000.00", PaymentType::Pc, "06/2024").await;
    let results = BatchRunner::new(&engine).validate_all_pending().await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].extraction_id, first.id);

    let again = BatchRunner::new(&engine).validate_all_pending().await.unwrap();
    assert!(again.is_empty(), "validated extractions are not revisited");
}

#[tokio::test]
async fn empty_batch_returns_nothing() {
    let svc = service().await;
    let engine = ValidationEngine::new(&svc, tolerance());
    let report = BatchRunner::new(&engine).run().await.unwrap();
    assert!(report.results.is_empty());
    assert!(report.failures.is_empty());
}
