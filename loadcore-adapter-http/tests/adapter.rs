use loadcore::{Operation, PoolConfig, ProtocolAdapter};
use loadcore_adapter_http::{HttpAdapter, HttpConfig};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: String) -> HttpConfig {
    HttpConfig {
        base_url,
        headers: Default::default(),
        request_timeout: Duration::from_secs(2),
        pool: PoolConfig {
            max_size: 4,
            min_idle: 0,
            acquire_timeout: Duration::from_secs(1),
            idle_check_interval: Duration::from_millis(50),
        },
    }
}

#[tokio::test]
async fn http_get_hit_returns_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/i:0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
        .mount(&server)
        .await;

    let adapter = HttpAdapter::new(test_config(server.uri()));
    adapter.connect().await.unwrap();

    let result = adapter
        .execute(&Operation::new("http_get", "i:0"))
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.value.as_deref(), Some(&b"hello"[..]));
    adapter.close().await;
}

#[tokio::test]
async fn http_get_miss_is_a_successful_empty_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let adapter = HttpAdapter::new(test_config(server.uri()));
    adapter.connect().await.unwrap();

    let result = adapter
        .execute(&Operation::new("http_get", "missing"))
        .await
        .unwrap();
    assert!(result.success);
    assert!(result.value.is_none());
    adapter.close().await;
}

#[tokio::test]
async fn http_post_writes_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/i:0"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let adapter = HttpAdapter::new(test_config(server.uri()));
    adapter.connect().await.unwrap();

    let op = Operation::new("http_post", "i:0").with_value(bytes::Bytes::from_static(b"payload"));
    let result = adapter.execute(&op).await.unwrap();
    assert!(result.success);
    assert!(!result.is_read);
    adapter.close().await;
}

#[tokio::test]
async fn unsupported_operation_type_is_bad_operation() {
    let server = MockServer::start().await;
    let adapter = HttpAdapter::new(test_config(server.uri()));
    adapter.connect().await.unwrap();

    let result = adapter.execute(&Operation::new("http_patch", "i:0")).await;
    assert!(matches!(
        result,
        Err(loadcore::AdapterError::BadOperation { .. })
    ));
}

#[tokio::test]
async fn connecting_twice_is_rejected() {
    let server = MockServer::start().await;
    let adapter = HttpAdapter::new(test_config(server.uri()));
    adapter.connect().await.unwrap();
    let second = adapter.connect().await;
    assert!(matches!(second, Err(loadcore::AdapterError::AlreadyConnected)));
}
