/// Integration tests with mocked external lookup services
/// Tests CEP/CNPJ lookups and UF resolution without hitting real external services
use rust_bi_geo_api::config::Config;
use rust_bi_geo_api::models::LocationKeys;
use rust_bi_geo_api::resolver::{ResolutionSource, UfResolver};
use rust_bi_geo_api::services::{CepService, CnpjService};
use rust_bi_geo_api::uf::{ResolvedUf, Uf};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create test config
fn create_test_config(cep_base_url: String, cnpj_base_url: String) -> Config {
    Config {
        port: 8080,
        cep_api_base_url: cep_base_url,
        cnpj_api_base_url: cnpj_base_url,
        lookup_timeout: Duration::from_secs(2),
        enrich_batch_size: 10,
        enrich_batch_delay: Duration::ZERO,
        cache_max_capacity: 1_000,
        cache_ttl: Duration::from_secs(3600),
        cache_negative_ttl: Duration::from_secs(300),
    }
}

fn location(uf: Option<&str>, cep: Option<&str>, cnpj: Option<&str>) -> LocationKeys {
    LocationKeys {
        uf: uf.map(String::from),
        cep: cep.map(String::from),
        cnpj: cnpj.map(String::from),
    }
}

/// Mounts a catch-all mock that fails the test if any request reaches it.
async fn mount_no_calls(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cep_lookup_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/01310100/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cep": "01310-100",
            "logradouro": "Avenida Paulista",
            "localidade": "São Paulo",
            "uf": "SP"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let service = CepService::new(&config).unwrap();

    let result = service.lookup_uf("01310100").await;
    assert_eq!(result.unwrap(), Some(Uf::SP));
}

#[tokio::test]
async fn test_cep_lookup_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/99999999/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"erro": true})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/88888888/json/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"erro": "true"})),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let service = CepService::new(&config).unwrap();

    assert_eq!(service.lookup_uf("99999999").await.unwrap(), None);
    assert_eq!(service.lookup_uf("88888888").await.unwrap(), None);
}

#[tokio::test]
async fn test_cep_lookup_malformed_uf_is_not_a_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/01310100/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"uf": "ZZ"})))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let service = CepService::new(&config).unwrap();

    assert_eq!(service.lookup_uf("01310100").await.unwrap(), None);
}

#[tokio::test]
async fn test_cep_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/01310100/json/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let service = CepService::new(&config).unwrap();

    let result = service.lookup_uf("01310100").await;
    assert!(result.is_err());
    assert!(!result.unwrap_err().is_timeout());
}

#[tokio::test]
async fn test_cep_lookup_timeout_is_distinct() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/01310100/json/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"uf": "SP"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(mock_server.uri(), mock_server.uri());
    config.lookup_timeout = Duration::from_millis(200);
    let service = CepService::new(&config).unwrap();

    let result = service.lookup_uf("01310100").await;
    assert!(result.unwrap_err().is_timeout());
}

#[tokio::test]
async fn test_cnpj_lookup_success_and_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cnpj/12345678000195"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cnpj": "12345678000195",
            "razao_social": "EMPRESA TESTE LTDA",
            "uf": "ce"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cnpj/00000000000000"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "CNPJ 00000000000000 não encontrado."
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cnpj/11111111000111"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ERROR",
            "message": "CNPJ inválido"
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), format!("{}/cnpj", mock_server.uri()));
    let service = CnpjService::new(&config).unwrap();

    assert_eq!(service.lookup_uf("12345678000195").await.unwrap(), Some(Uf::CE));
    assert_eq!(service.lookup_uf("00000000000000").await.unwrap(), None);
    assert_eq!(service.lookup_uf("11111111000111").await.unwrap(), None);
}

#[tokio::test]
async fn test_circuit_breaker_stops_calling_failing_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(5)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), format!("{}/cnpj", mock_server.uri()));
    let service = CnpjService::new(&config).unwrap();

    for i in 0..8 {
        let cnpj = format!("1234567800019{}", i);
        assert!(service.lookup_uf(&cnpj).await.is_err());
    }
}

#[tokio::test]
async fn test_resolver_explicit_uf_makes_no_calls() {
    let cep_server = MockServer::start().await;
    let cnpj_server = MockServer::start().await;
    mount_no_calls(&cep_server).await;
    mount_no_calls(&cnpj_server).await;

    let config = create_test_config(cep_server.uri(), cnpj_server.uri());
    let resolver = UfResolver::new(&config).unwrap();

    for raw in ["SP", "sp", "Ce", "df"] {
        let resolved = resolver
            .resolve_uf(&location(Some(raw), Some("01310100"), Some("12345678000195")))
            .await;
        assert_eq!(resolved.as_str(), raw.to_uppercase());
    }
}

#[tokio::test]
async fn test_resolver_caches_cep_hits() {
    let cep_server = MockServer::start().await;
    let cnpj_server = MockServer::start().await;
    mount_no_calls(&cnpj_server).await;

    Mock::given(method("GET"))
        .and(path("/60115221/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"uf": "CE"})))
        .expect(1)
        .mount(&cep_server)
        .await;

    let config = create_test_config(cep_server.uri(), cnpj_server.uri());
    let resolver = UfResolver::new(&config).unwrap();

    for cep in ["60115-221", "60115221", "60.115-221"] {
        let resolution = resolver
            .resolve(&location(None, Some(cep), Some("12345678000195")))
            .await;
        assert_eq!(resolution.uf, ResolvedUf::Known(Uf::CE));
        assert_eq!(resolution.source, ResolutionSource::Cep);
    }
}

#[tokio::test]
async fn test_resolver_falls_back_to_cnpj() {
    let cep_server = MockServer::start().await;
    let cnpj_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/99999999/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"erro": true})))
        .expect(1)
        .mount(&cep_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/12345678000195"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"uf": "MG"})))
        .expect(1)
        .mount(&cnpj_server)
        .await;

    let config = create_test_config(cep_server.uri(), cnpj_server.uri());
    let resolver = UfResolver::new(&config).unwrap();

    let record = location(Some("XX"), Some("99999-999"), Some("12.345.678/0001-95"));
    let first = resolver.resolve(&record).await;
    let second = resolver.resolve(&record).await;

    assert_eq!(first.uf, ResolvedUf::Known(Uf::MG));
    assert_eq!(first.source, ResolutionSource::Cnpj);
    assert_eq!(first, second);
    assert_eq!(resolver.cep_cache().get("99999999").await, Some(None));
}

#[tokio::test]
async fn test_resolver_caches_negative_results() {
    let cep_server = MockServer::start().await;
    let cnpj_server = MockServer::start().await;
    mount_no_calls(&cep_server).await;

    Mock::given(method("GET"))
        .and(path("/00000000000000"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&cnpj_server)
        .await;

    let config = create_test_config(cep_server.uri(), cnpj_server.uri());
    let resolver = UfResolver::new(&config).unwrap();

    let record = location(None, None, Some("00000000000000"));
    for _ in 0..3 {
        assert_eq!(resolver.resolve_uf(&record).await, ResolvedUf::Unknown);
    }
}

#[tokio::test]
async fn test_resolver_absorbs_transport_failures() {
    let cep_server = MockServer::start().await;
    let cnpj_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&cep_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/12345678000195"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"uf": "PR"})))
        .expect(1)
        .mount(&cnpj_server)
        .await;

    let config = create_test_config(cep_server.uri(), cnpj_server.uri());
    let resolver = UfResolver::new(&config).unwrap();

    let record = location(None, Some("80010000"), Some("12345678000195"));
    assert_eq!(resolver.resolve_uf(&record).await, ResolvedUf::Known(Uf::PR));
    assert_eq!(resolver.resolve_uf(&record).await, ResolvedUf::Known(Uf::PR));
}

#[tokio::test]
async fn test_resolver_timeout_resolves_unknown() {
    let cep_server = MockServer::start().await;
    let cnpj_server = MockServer::start().await;
    mount_no_calls(&cnpj_server).await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"uf": "SP"}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&cep_server)
        .await;

    let mut config = create_test_config(cep_server.uri(), cnpj_server.uri());
    config.lookup_timeout = Duration::from_millis(200);
    let resolver = UfResolver::new(&config).unwrap();

    let record = location(None, Some("01310100"), None);
    assert_eq!(resolver.resolve_uf(&record).await, ResolvedUf::Unknown);
    // Negative result is cached: no second call
    assert_eq!(resolver.resolve_uf(&record).await, ResolvedUf::Unknown);
}

#[tokio::test]
async fn test_resolver_skips_malformed_documents() {
    let cep_server = MockServer::start().await;
    let cnpj_server = MockServer::start().await;
    mount_no_calls(&cep_server).await;
    mount_no_calls(&cnpj_server).await;

    let config = create_test_config(cep_server.uri(), cnpj_server.uri());
    let resolver = UfResolver::new(&config).unwrap();

    let record = location(None, Some("0131010"), Some("123456780001"));
    assert_eq!(resolver.resolve_uf(&record).await, ResolvedUf::Unknown);
}

#[tokio::test]
async fn test_cache_invalidation_allows_retry() {
    let cep_server = MockServer::start().await;
    let cnpj_server = MockServer::start().await;
    mount_no_calls(&cnpj_server).await;

    Mock::given(method("GET"))
        .and(path("/01310100/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"erro": true})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&cep_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/01310100/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"uf": "SP"})))
        .expect(1)
        .mount(&cep_server)
        .await;

    let config = create_test_config(cep_server.uri(), cnpj_server.uri());
    let resolver = UfResolver::new(&config).unwrap();
    let record = location(None, Some("01310100"), None);

    assert_eq!(resolver.resolve_uf(&record).await, ResolvedUf::Unknown);
    assert_eq!(resolver.resolve_uf(&record).await, ResolvedUf::Unknown);

    resolver.invalidate_caches();
    assert_eq!(resolver.resolve_uf(&record).await, ResolvedUf::Known(Uf::SP));
}

/// Serves 200 headers and the start of a JSON body, then stalls without
/// sending the rest. Returns the base URL.
async fn start_stalled_body_server() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\n\
                          Content-Type: application/json\r\n\
                          Content-Length: 64\r\n\r\n\
                          {\"uf\":",
                    )
                    .await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_secs(10)).await;
            });
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_body_read_timeout_is_a_timeout() {
    let base_url = start_stalled_body_server().await;
    let mut config = create_test_config(base_url.clone(), base_url);
    config.lookup_timeout = Duration::from_millis(300);

    let cep_err = CepService::new(&config)
        .unwrap()
        .lookup_uf("01310100")
        .await
        .unwrap_err();
    assert!(cep_err.is_timeout(), "unexpected error: {}", cep_err);

    let cnpj_err = CnpjService::new(&config)
        .unwrap()
        .lookup_uf("12345678000195")
        .await
        .unwrap_err();
    assert!(cnpj_err.is_timeout(), "unexpected error: {}", cnpj_err);
}
