use chrono::{DateTime, FixedOffset, TimeZone};
use jobmatch_etl::core::deadline::reference_offset;
use jobmatch_etl::{AggregateConfig, AggregatePipeline, EtlEngine, JobSource, LocalStorage, MatchedJob};
use std::path::Path;
use tempfile::TempDir;

fn fixed_now() -> DateTime<FixedOffset> {
    reference_offset()
        .with_ymd_and_hms(2025, 12, 30, 10, 0, 0)
        .unwrap()
}

fn write_json(dir: &Path, name: &str, value: serde_json::Value) {
    std::fs::write(dir.join(name), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

fn config_for(data: &TempDir, output: &TempDir) -> AggregateConfig {
    AggregateConfig {
        data_dir: data.path().to_str().unwrap().to_string(),
        output_dir: output.path().to_str().unwrap().to_string(),
        ..AggregateConfig::default()
    }
}

fn engine_for(config: AggregateConfig) -> EtlEngine<AggregatePipeline<LocalStorage, AggregateConfig>> {
    let data = LocalStorage::new(config.data_dir.clone());
    let output = LocalStorage::new(config.output_dir.clone());
    let pipeline = AggregatePipeline::new(data, output, config).with_reference_time(fixed_now());
    EtlEngine::new(pipeline)
}

fn seed_inputs(dir: &Path) {
    write_json(
        dir,
        "companies.json",
        serde_json::json!([
            {"name": "(주)테크코", "sector": "정보처리", "location": "서울", "activePersonnel": 2, "supplementaryPersonnel": 999},
            {"name": "주식회사 한빛소프트", "sector": "정보처리", "location": "경기"},
            {"name": "㈜새롬전자", "sector": "전자", "location": "대전"}
        ]),
    );
    write_json(
        dir,
        "jobs_saramin.json",
        serde_json::json!([
            {"company": "테크코", "title": "백엔드 개발자", "link": "https://www.saramin.co.kr/1", "deadline": "D-3", "sector": "IT", "source": "saramin"},
            {"company": "다른회사", "title": "프론트엔드", "link": "https://www.saramin.co.kr/2", "deadline": "D-3", "sector": "IT", "source": "saramin"},
            {"company": "한빛소프트", "title": "QA", "link": "https://www.saramin.co.kr/3", "deadline": "~01/01(목)", "sector": "IT", "source": "saramin"}
        ]),
    );
    write_json(
        dir,
        "jobs_wanted.json",
        serde_json::json!([
            {"company": "새롬전자", "title": "펌웨어", "link": "https://www.wanted.co.kr/wd/1", "deadline": "2025.12.01", "sector": "IT", "source": "wanted"},
            {"company": "새롬 전자", "title": "회로 설계", "link": "https://www.wanted.co.kr/wd/2", "deadline": "상시채용", "sector": "IT", "source": "wanted", "salary": "4000만원"}
        ]),
    );
}

#[tokio::test]
async fn test_end_to_end_aggregation() {
    let data = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    seed_inputs(data.path());

    let output_path = engine_for(config_for(&data, &output)).run().await.unwrap();

    assert!(output_path.ends_with("matched_jobs.json"));
    let written = std::fs::read(output.path().join("matched_jobs.json")).unwrap();
    let matched: Vec<MatchedJob> = serde_json::from_slice(&written).unwrap();

    // jobkorea is missing on disk and contributes nothing
    let links: Vec<&str> = matched.iter().map(|m| m.job.link.as_str()).collect();
    assert_eq!(
        links,
        vec![
            "https://www.saramin.co.kr/1",
            "https://www.saramin.co.kr/3",
            "https://www.wanted.co.kr/wd/2",
        ]
    );
    assert_eq!(matched[0].designated_company_info.location, "서울");
    assert_eq!(matched[1].designated_company_info.name, "주식회사 한빛소프트");
    assert_eq!(matched[2].job.salary.as_deref(), Some("4000만원"));
    assert!(matched.iter().all(|m| m.is_designated && !m.closed));
}

#[tokio::test]
async fn test_output_uses_camel_case_fields() {
    let data = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    seed_inputs(data.path());

    engine_for(config_for(&data, &output)).run().await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output.path().join("matched_jobs.json")).unwrap())
            .unwrap();
    let first = &raw[0];
    assert_eq!(first["isDesignated"], serde_json::json!(true));
    assert_eq!(first["closed"], serde_json::json!(false));
    assert_eq!(first["designatedCompanyInfo"]["activePersonnel"], serde_json::json!(2));
    assert_eq!(first["source"], serde_json::json!("saramin"));
}

#[tokio::test]
async fn test_missing_registry_aborts_without_output() {
    let data = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_json(data.path(), "jobs_saramin.json", serde_json::json!([]));

    let result = engine_for(config_for(&data, &output)).run().await;

    let err = result.unwrap_err();
    assert!(matches!(err, jobmatch_etl::EtlError::MissingRegistry { .. }));
    assert!(!output.path().join("matched_jobs.json").exists());
}

#[tokio::test]
async fn test_all_job_sources_missing_writes_empty_array() {
    let data = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_json(data.path(), "companies.json", serde_json::json!([{"name": "테크코", "location": "서울"}]));

    engine_for(config_for(&data, &output)).run().await.unwrap();

    let written = std::fs::read_to_string(output.path().join("matched_jobs.json")).unwrap();
    assert_eq!(written.trim(), "[]");
}

#[test]
fn test_rerun_produces_identical_bytes() {
    let data = TempDir::new().unwrap();
    let first_out = TempDir::new().unwrap();
    let second_out = TempDir::new().unwrap();
    seed_inputs(data.path());

    tokio_test::block_on(engine_for(config_for(&data, &first_out)).run()).unwrap();
    tokio_test::block_on(engine_for(config_for(&data, &second_out)).run()).unwrap();

    let first = std::fs::read(first_out.path().join("matched_jobs.json")).unwrap();
    let second = std::fs::read(second_out.path().join("matched_jobs.json")).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_source_order_follows_configuration() {
    let data = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    seed_inputs(data.path());

    let config = AggregateConfig {
        sources: vec![JobSource::Wanted, JobSource::Saramin],
        ..config_for(&data, &output)
    };
    engine_for(config).run().await.unwrap();

    let matched: Vec<MatchedJob> =
        serde_json::from_slice(&std::fs::read(output.path().join("matched_jobs.json")).unwrap())
            .unwrap();
    assert_eq!(matched[0].job.source, JobSource::Wanted);
    assert_eq!(matched.last().unwrap().job.source, JobSource::Saramin);
}
