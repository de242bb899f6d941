use httpmock::prelude::*;
use phishnet_client::error::{Kind, MissingCredential, Status};
use phishnet_client::{Client, ClientConfig, Endpoint, EndpointRegistry, Params};
use reqwest::StatusCode;
use url::Url;

const UNSET_ENV: &str = "PHISHNET_CLIENT_IT_UNSET_KEY";

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .base_url(Url::parse(&server.url("/v3/")).unwrap())
        .env_var_name(UNSET_ENV)
        .build()
}

fn keyed_client(server: &MockServer, key: &str) -> Client {
    let mut config = config(server);
    config.explicit_key = Some(key.to_owned().into());
    Client::new(config).unwrap()
}

#[test]
fn authenticated_endpoints_require_a_key() {
    let server = MockServer::start();
    let mock = server.mock(|_when, then| {
        then.status(200).body("{}");
    });
    let client = Client::new(config(&server)).unwrap();

    assert!(!client.has_api_key());
    for endpoint in ["shows/get", "setlists/get", "venues/all", "not/registered"] {
        let err = client.request(endpoint, Params::new()).unwrap_err();
        assert_eq!(err.kind(), Kind::MissingCredential, "{endpoint}");
        let source = err.downcast_ref::<MissingCredential>().unwrap();
        assert_eq!(source.env_var, UNSET_ENV);
    }

    mock.assert_hits(0);
}

#[test]
fn blog_reads_work_without_a_key() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v3/blog/get").query_param("month", "7");
        then.status(200).body("blog");
    });
    let client = Client::new(config(&server)).unwrap();

    let url = client.url_for("blog/get", [("month", "7")]).unwrap();
    assert_eq!(url.query(), Some("month=7"));

    let body = client.request("blog/get", [("month", "7")]).unwrap();
    assert_eq!(body, "blog");
    mock.assert();
}

#[test]
fn registry_can_declare_new_exempt_endpoints() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v3/news/get");
        then.status(200).body("news");
    });
    let mut config = config(&server);
    config.registry = EndpointRegistry::default().with(Endpoint::exempt("news/get"));
    let client = Client::new(config).unwrap();

    assert_eq!(client.request("news/get", Params::new()).unwrap(), "news");
    mock.assert();
}

#[test]
fn endpoint_names_cannot_redirect_the_key() {
    let server = MockServer::start();
    let mock = server.mock(|_when, then| {
        then.status(200).body("{}");
    });
    let client = keyed_client(&server, "abc123");

    for name in [
        "https://evil.example/steal",
        "../v2/shows/get",
        "shows/get?apikey=forged",
    ] {
        let err = client.request(name, Params::new()).unwrap_err();
        assert_eq!(err.kind(), Kind::Validation, "{name}");
    }

    mock.assert_hits(0);
}

#[test]
fn non_success_status_carries_code_and_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v3/shows/get");
        then.status(404).body("no such show");
    });
    let client = keyed_client(&server, "abc123");

    let err = client
        .request("shows/get", [("date", "1900-01-01")])
        .unwrap_err();

    assert_eq!(err.kind(), Kind::Status);
    let status = err.downcast_ref::<Status>().unwrap();
    assert_eq!(status.status_code, StatusCode::NOT_FOUND);
    assert_eq!(status.message, "no such show");
    assert_eq!(status.path, "/v3/shows/get");
    assert!(!err.to_string().contains("abc123"));
}

#[test]
fn server_errors_are_not_retried() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v3/venues/all");
        then.status(503).body("down");
    });
    let client = keyed_client(&server, "abc123");

    let err = client.request("venues/all", Params::new()).unwrap_err();

    assert_eq!(err.kind(), Kind::Status);
    mock.assert_hits(1);
}

#[test]
fn transport_failures_surface_reqwest_error() {
    let client = Client::new(
        ClientConfig::builder()
            .base_url(Url::parse("http://127.0.0.1:1/v3/").unwrap())
            .explicit_key("abc123".to_owned())
            .build(),
    )
    .unwrap();

    let err = client.request("venues/all", Params::new()).unwrap_err();

    assert_eq!(err.kind(), Kind::Transport);
    assert!(err.downcast_ref::<reqwest::Error>().is_some());
}

#[test]
fn clients_can_be_used_from_many_threads() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v3/venues/all");
        then.status(200).body("{}");
    });
    let a = keyed_client(&server, "key-a");
    let b = keyed_client(&server, "key-b");

    std::thread::scope(|scope| {
        for client in [&a, &b, &a, &b] {
            scope.spawn(move || client.request("venues/all", Params::new()).unwrap());
        }
    });

    mock.assert_hits(4);
}
