use super::*;
use crate::core::identifier::Expansion;
use crate::core::source::RawSource;
use crate::expansion::AMAP;
use crate::io::MemorySink;
use crate::mining::{DECLARATIONS, GLOBAL_FREQUENCY, LOCAL_FREQUENCY, SCOPES};

const MAIN_GO: &str = r#"package main

// main is the main function, the entry point
func main() {
	// the string buffer
	sb := newBuffer()
	_ = sb
}

// Buffer holds bytes.
type Buffer struct {
	data []byte
}

const maxLen = 10
"#;

const HELPER_GO: &str = r#"package main

func newBuffer() *Buffer {
	return &Buffer{}
}
"#;

fn config() -> NomenConfig {
    let mut config = NomenConfig::default();
    config.project = "acme/widgets".to_string();
    config.pipeline.workers = 2;
    config
}

fn sources() -> Vec<RawSource> {
    vec![
        RawSource::new("main.go", MAIN_GO),
        RawSource::new("helper.go", HELPER_GO),
    ]
}

#[test]
fn test_unknown_names_fail_on_assembly() {
    let mut config = config();
    config.splitters.push("bogus".to_string());
    let err = NomenPipeline::new(config).unwrap_err();
    assert_eq!(err.to_string(), "no factory for splitter 'bogus'");

    let mut config = self::config();
    config.miners.push("telepathy".to_string());
    let err = NomenPipeline::new(config).unwrap_err();
    assert_eq!(err.to_string(), "no factory for miner 'telepathy'");
}

#[test]
fn test_missing_miner_requirement_fails_on_assembly() {
    let mut config = config();
    config.miners.retain(|m| m != SCOPES);
    let err = NomenPipeline::new(config).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains(AMAP));

    let mut config = self::config();
    config.miners = vec![DECLARATIONS.to_string(), SCOPES.to_string()];
    let err = NomenPipeline::new(config).unwrap_err();
    assert!(err.to_string().contains(GLOBAL_FREQUENCY) || err.to_string().contains(LOCAL_FREQUENCY));
}

#[test]
fn test_reduced_configuration_assembles() {
    let mut config = config();
    config.miners = vec![DECLARATIONS.to_string()];
    config.splitters = vec!["conserv".to_string(), "greedy".to_string()];
    config.expanders = vec!["noexp".to_string(), "basic".to_string()];
    assert!(NomenPipeline::new(config).is_ok());
}

#[tokio::test]
async fn test_end_to_end_run() {
    let pipeline = NomenPipeline::new(config()).unwrap();
    let report = pipeline.analyze(&sources()).await.unwrap();

    assert_eq!(report.project, "acme/widgets");
    assert_eq!(report.stats.files_read, 2);
    assert_eq!(report.stats.files_parsed, 2);
    assert!(report.stats.failed_files.is_empty());
    assert!(!report.stats.cancelled);

    let names: Vec<&str> = report
        .identifiers_in("main.go")
        .iter()
        .map(|id| id.name.as_str())
        .collect();
    assert_eq!(names.len(), 4);
    for expected in ["main", "sb", "Buffer", "maxLen"] {
        assert!(names.contains(&expected), "missing {expected}");
    }
    assert_eq!(report.identifiers_in("helper.go").len(), 1);

    for identifier in &report.identifiers {
        assert_eq!(identifier.splits.len(), 3, "{}", identifier.id);
        assert!(!identifier.normalization.is_undefined(), "{}", identifier.id);
    }

    let main_id = "filename:main.go+++pkg:main+++declType:FUNC+++name:main";
    let sb = report
        .identifiers
        .iter()
        .find(|id| id.name == "sb")
        .unwrap();
    assert_eq!(sb.parent, main_id);
    assert!(sb.id.contains("+++local:"));
    assert_eq!(sb.expansions[AMAP][0].values[0], "string buffer");
    assert_eq!(sb.normalization.word, "stringBuffer");

    assert_eq!(report.insights.len(), 1);
    assert_eq!(report.insights[0].package, "main");
    assert_eq!(report.insights[0].total_identifiers, 5);
    assert_eq!(report.insights[0].files.len(), 2);
    assert_eq!(report.overall.total_identifiers, 5);
}

#[tokio::test]
async fn test_broken_file_is_dropped() {
    let mut raw = sources();
    raw.push(RawSource::new("broken.go", "package main\n\nfunc {\n"));
    raw.push(RawSource::failed("unreadable.go", "permission denied"));

    let pipeline = NomenPipeline::new(config()).unwrap();
    let report = pipeline.analyze(&raw).await.unwrap();

    assert_eq!(report.stats.files_read, 4);
    assert_eq!(report.stats.files_parsed, 2);
    assert_eq!(report.stats.failed_files, vec!["broken.go", "unreadable.go"]);
    assert!(report.identifiers.iter().all(|id| id.file != "broken.go"));
    assert_eq!(report.identifiers.len(), 5);
}

#[tokio::test]
async fn test_no_valid_file_fails_the_run() {
    let raw = vec![
        RawSource::new("broken.go", "package main\n\nfunc {\n"),
        RawSource::failed("gone.go", "not found"),
    ];
    let pipeline = NomenPipeline::new(config()).unwrap();
    let err = pipeline.start(&raw).await.unwrap_err();

    match err {
        NomenError::Pipeline {
            stage,
            processed_count,
            ..
        } => {
            assert_eq!(stage, "parse");
            assert_eq!(processed_count, Some(2));
        }
        other => panic!("Expected Pipeline error, got {other:?}"),
    }

    let empty: Vec<RawSource> = Vec::new();
    assert!(pipeline.start(&empty).await.is_err());
}

#[tokio::test]
async fn test_streaming_and_cancellation() {
    let pipeline = NomenPipeline::new(config()).unwrap();

    let mut run = pipeline.start(&sources()).await.unwrap();
    assert_eq!(run.stats().files_parsed, 2);
    let first = run.next().await.unwrap();
    assert!(!first.normalization.is_undefined());

    run.cancel();
    let report = run.collect().await.unwrap();
    assert!(report.stats.cancelled);
    assert!(report.identifiers.len() < 5);
}

#[tokio::test]
async fn test_dropping_a_run_stops_its_stages() {
    let pipeline = NomenPipeline::new(config()).unwrap();
    let run = pipeline.start(&sources()).await.unwrap();
    let token = run.cancellation_token();
    assert!(!token.is_cancelled());

    drop(run);
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_collected_run_reports_not_cancelled() {
    let pipeline = NomenPipeline::new(config()).unwrap();
    let run = pipeline.start(&sources()).await.unwrap();
    let token = run.cancellation_token();

    let report = run.collect().await.unwrap();
    assert!(!report.stats.cancelled);
    // the finished run is dropped after collecting
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_persist_hands_output_to_sink() {
    let pipeline = NomenPipeline::new(config()).unwrap();
    let sink = MemorySink::new();

    let report = pipeline
        .start(&sources())
        .await
        .unwrap()
        .persist(&sink)
        .await
        .unwrap();

    assert_eq!(sink.identifiers().await.len(), report.identifiers.len());
    assert_eq!(sink.insights().await, report.insights);
}

#[tokio::test]
async fn test_custom_score_strategy() {
    struct Constant;

    impl ScoreStrategy for Constant {
        fn name(&self) -> &'static str {
            "constant"
        }

        fn score(&self, _word: &str, _chain: &[Expansion]) -> f64 {
            0.25
        }
    }

    let pipeline = NomenPipeline::new(config())
        .unwrap()
        .with_score_strategy(Arc::new(Constant));
    let report = pipeline.analyze(&sources()).await.unwrap();

    assert!(report
        .identifiers
        .iter()
        .all(|id| (id.normalization.score - 0.25).abs() < f64::EPSILON));
    // every chain ties, so the first expander in name order wins
    assert!(report
        .identifiers
        .iter()
        .all(|id| id.normalization.algorithm == "samurai+amap"));
}
