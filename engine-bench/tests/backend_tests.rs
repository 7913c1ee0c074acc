mod common;

use engine_bench::backend::{EngineKind, TableSource};
use engine_bench::queries::Workload;

#[tokio::test]
async fn test_every_engine_reads_parquet_directories() {
    let dir = tempfile::tempdir().unwrap();
    common::write_mortgage_data(dir.path());

    for engine in EngineKind::ALL {
        let backend = engine.connect(2).expect("Failed to connect");
        for source in Workload::FannieMae.sources(dir.path()) {
            backend
                .register_parquet(&source)
                .await
                .unwrap_or_else(|e| panic!("{}: register {} failed: {}", engine, source.name, e));
        }

        let perf = backend.execute("SELECT loan_id FROM perf").await.unwrap();
        assert_eq!(perf.rows, 5, "{} should read both perf files", engine);
        assert_eq!(perf.columns, 1);

        let acq = backend
            .execute("SELECT loan_id, orig_date FROM acq WHERE borrower_credit_score > 660")
            .await
            .unwrap();
        assert_eq!(acq.rows, 2, "{}", engine);
    }
}

#[tokio::test]
async fn test_every_engine_runs_mortgage_summary() {
    let dir = tempfile::tempdir().unwrap();
    common::write_mortgage_data(dir.path());
    let summary = &Workload::FannieMae.queries()[0];

    for engine in EngineKind::ALL {
        let backend = engine.connect(1).unwrap();
        for source in Workload::FannieMae.sources(dir.path()) {
            backend.register_parquet(&source).await.unwrap();
        }

        let output = backend
            .execute(summary.sql)
            .await
            .unwrap_or_else(|e| panic!("{} failed the summary: {}", engine, e));
        assert_eq!(output.rows, common::MORTGAGE_SUMMARY_ROWS, "{}", engine);
        assert_eq!(output.columns, 6, "{}", engine);
    }
}

#[tokio::test]
async fn test_single_file_source() {
    let dir = tempfile::tempdir().unwrap();
    common::write_mortgage_data(dir.path());
    let file = dir.path().join("acq/Acquisition_2000Q1.txt.parquet");

    for engine in EngineKind::ALL {
        let backend = engine.connect(1).unwrap();
        backend
            .register_parquet(&TableSource::file("loans", &file))
            .await
            .unwrap();
        let output = backend.execute("SELECT * FROM loans").await.unwrap();
        assert_eq!(output.rows, 3, "{}", engine);
        assert_eq!(output.columns, 3, "{}", engine);
    }
}

#[tokio::test]
async fn test_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = TableSource::directory("perf", dir.path().join("nowhere"));

    let backend = EngineKind::DuckDb.connect(1).unwrap();
    assert!(backend.register_parquet(&source).await.is_err());
}
