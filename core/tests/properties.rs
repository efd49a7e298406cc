//! Property tests for query encoding and header precedence.

use std::collections::BTreeMap;

use async_trait::async_trait;
use proptest::prelude::*;
use request_core::{
    ClientConfig, HttpMethod, HttpRequest, HttpResponse, RequestClient, RequestOptions, RequestSpec,
    Transport, TransportError,
};

struct Unused;

#[async_trait]
impl Transport for Unused {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Other("not used".to_string()))
    }
}

fn client() -> RequestClient {
    RequestClient::with_transport(ClientConfig::new("http://localhost:3000"), Unused)
}

fn header_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("x-[a-z]{1,6}", "[ -~]{0,12}", 0..6)
}

proptest! {
    // Property: the query string of a GET decodes back to the params it was built from.
    #[test]
    fn prop_get_query_roundtrips(params in prop::collection::btree_map("[a-z_]{1,8}", "\\PC{0,16}", 1..8)) {
        let mut options = RequestOptions::new();
        for (key, value) in &params {
            options = options.param(key.clone(), value.clone());
        }
        let req = client().build_request(&RequestSpec::new(HttpMethod::Get, "/search", options)).unwrap();

        let (base, query) = req.url.split_once('?').expect("query string present");
        prop_assert_eq!(base, "http://localhost:3000/search");
        let decoded: BTreeMap<String, String> = serde_urlencoded::from_str(query).unwrap();
        prop_assert_eq!(decoded, params);
        prop_assert!(req.body.is_empty());
    }

    // Property: on colliding names the request header wins over the default header.
    #[test]
    fn prop_request_headers_override_defaults(defaults in header_map(), overrides in header_map()) {
        let mut client = client();
        client.with_headers(defaults.clone());
        let mut options = RequestOptions::new();
        for (name, value) in &overrides {
            options = options.header(name.clone(), value.clone());
        }
        let req = client.build_request(&RequestSpec::new(HttpMethod::Post, "/", options)).unwrap();

        for (name, value) in &defaults {
            let expected = overrides.get(name).unwrap_or(value);
            prop_assert_eq!(req.header(name), Some(expected.as_str()));
        }
        for (name, value) in &overrides {
            prop_assert_eq!(req.header(name), Some(value.as_str()));
        }
        prop_assert_eq!(req.headers.len(), defaults.keys().chain(overrides.keys()).collect::<std::collections::BTreeSet<_>>().len() + 1);
    }
}
