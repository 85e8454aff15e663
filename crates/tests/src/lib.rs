//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 本地 HTTP 模拟服务器上的 e2e 测试（无需真实搜索服务）

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ErrorDetail, RunnerConfig, SinkType};

    #[test]
    fn test_config_toml_roundtrip() {
        let mut config = RunnerConfig::default();
        config.endpoint.host = "http://localhost:8094".into();
        config.dispatch.concurrency = 7;
        config.results.sink = SinkType::Log;

        let text = ConfigLoader::to_toml(&config).unwrap();
        let back = ConfigLoader::load_from_str(&text, ConfigFormat::Toml).unwrap();
        assert_eq!(back.dispatch.concurrency, 7);
        assert_eq!(back.results.sink, SinkType::Log);
    }

    #[test]
    fn test_error_detail_kinds_are_stable() {
        let kinds: Vec<_> = [
            ErrorDetail::transport("x"),
            ErrorDetail::Timeout { after_ms: 1 },
            ErrorDetail::status(500, ""),
            ErrorDetail::decode("x"),
            ErrorDetail::Cancelled,
            ErrorDetail::Aborted {
                message: "x".into(),
            },
        ]
        .iter()
        .map(ErrorDetail::kind)
        .collect();
        assert_eq!(
            kinds,
            ["transport", "timeout", "status", "decode", "cancelled", "aborted"]
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{OutcomeRecord, ResultSink};
    use dispatcher::{BoundedDispatcher, CancellationToken, FileSink};
    use observability::RunMetricsAggregator;
    use query_producer::{expand, QueryProducer, QueryShape, QueryStore};
    use search_client::{HttpSearchClient, HttpSearchConfig};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLES: &str = r#"[
        {"bklctrcb": {"geometry": {"coordinates": [-122.4194, 37.7749]}, "relationship": "parent"}},
        {"bklctrcb": {"geometry": {"coordinates": [2.3522, 48.8566]}, "relationship": "child"}},
        {"bklctrcb": {"geometry": {"coordinates": [139.6917, 35.6895]}, "relationship": "sibling"}}
    ]"#;

    const OK_BODY: &str = r#"{"status":{"total":1,"failed":0,"successful":1},
        "total_hits":3,"hits":[{"index":"geo_1","id":"a","score":0.9}],
        "took":1000,"max_score":0.9}"#;

    fn client(server: &MockServer, timeout: Duration) -> Arc<HttpSearchClient> {
        Arc::new(
            HttpSearchClient::new(HttpSearchConfig {
                base_url: server.uri(),
                username: "admin".into(),
                password: "secret".into(),
                index: "geo".into(),
                timeout,
            })
            .unwrap(),
        )
    }

    fn store_in(dir: &Path, count: usize) -> QueryStore {
        fs::write(dir.join("long-lat.json"), SAMPLES).unwrap();
        let store = QueryStore::new(dir.join("queries.json"));
        store
            .load_or_generate(
                &QueryProducer::with_seed(42),
                &dir.join("long-lat.json"),
                count,
            )
            .unwrap();
        store
    }

    /// End-to-end: samples -> store -> expand -> dispatcher -> HTTP -> FileSink
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_http_pipeline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/index/geo/query"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(OK_BODY)
                    .set_delay(Duration::from_millis(5)),
            )
            .expect(24)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let defs = store_in(dir.path(), 12).load().unwrap();
        let blobs = expand(&defs, 2).unwrap();

        let summary = BoundedDispatcher::new(4)
            .unwrap()
            .run(blobs, client(&server, Duration::from_secs(5)))
            .await
            .unwrap();

        assert_eq!(summary.len(), 24);
        assert_eq!(summary.success_count(), 24);
        assert_eq!(summary.failure_count(), 0);

        let results = dir.path().join("results.json");
        let mut sink = FileSink::new("results", &results);
        sink.write(&summary).await.unwrap();
        sink.close().await.unwrap();

        let records: Vec<OutcomeRecord> =
            serde_json::from_str(&fs::read_to_string(&results).unwrap()).unwrap();
        assert_eq!(records.len(), 24);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.position, i);
            assert!(r.success);
            assert_eq!(r.result.as_ref().map(|x| x.total_hits), Some(3));
        }
    }

    /// Server rejects every conjunct query; failures land exactly on those positions
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_failures_follow_query_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("conjuncts"))
            .respond_with(ResponseTemplate::new(500).set_body_string("too complex"))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_BODY))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let defs = store_in(dir.path(), 9).load().unwrap();
        let blobs = expand(&defs, 1).unwrap();

        let summary = BoundedDispatcher::new(3)
            .unwrap()
            .run(blobs, client(&server, Duration::from_secs(5)))
            .await
            .unwrap();

        assert_eq!(summary.success_count(), 6);
        assert_eq!(summary.failure_count(), 3);
        for (i, o) in summary.outcomes().iter().enumerate() {
            let is_conjunct = QueryShape::detect(&defs[i]) == Some(QueryShape::Conjunct);
            assert_eq!(o.outcome.is_success(), !is_conjunct, "position {i}");
            if is_conjunct {
                assert_eq!(o.outcome.error().map(|e| e.kind()), Some("status"));
            }
        }

        let metrics = RunMetricsAggregator::from_summary(&summary).summary();
        assert_eq!(metrics.failures_by_kind.get("status"), Some(&3));
    }

    /// Slow server + cancellation: every position still gets an outcome
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_cancellation_against_slow_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(OK_BODY)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let defs = store_in(dir.path(), 6).load().unwrap();
        let blobs = expand(&defs, 2).unwrap();

        let token = CancellationToken::new();
        let dispatcher = BoundedDispatcher::new(2)
            .unwrap()
            .with_cancellation(token.clone());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            token.cancel();
        });

        let summary = dispatcher
            .run(blobs, client(&server, Duration::from_secs(30)))
            .await
            .unwrap();

        assert_eq!(summary.len(), 12);
        assert_eq!(summary.success_count(), 0);
        assert_eq!(summary.failure_count(), 12);
        assert!(summary
            .outcomes()
            .iter()
            .all(|o| o.outcome.error().map(|e| e.kind()) == Some("cancelled")));
    }

    #[tokio::test]
    async fn test_e2e_unreachable_endpoint_is_isolated() {
        let caller = Arc::new(
            HttpSearchClient::new(HttpSearchConfig {
                base_url: "http://127.0.0.1:1".into(),
                username: "u".into(),
                password: "p".into(),
                index: "geo".into(),
                timeout: Duration::from_secs(2),
            })
            .unwrap(),
        );

        let dir = tempfile::tempdir().unwrap();
        let defs = store_in(dir.path(), 3).load().unwrap();

        let summary = BoundedDispatcher::new(2)
            .unwrap()
            .run(expand(&defs, 1).unwrap(), caller)
            .await
            .unwrap();

        assert_eq!(summary.failure_count(), 3);
        assert!(summary
            .outcomes()
            .iter()
            .all(|o| o.outcome.error().map(|e| e.kind()) == Some("transport")));
    }
}
