//! Transport settings checked against hand-rolled peers: a TLS server with a
//! self-signed certificate and a SOCKS5 proxy that records the target it was
//! asked to reach.

use std::sync::Arc;

use request_core::{Body, ClientConfig, RequestClient, RequestOptions, ResultRecord};
use rustls::ServerConfig;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;

const CERT_PEM: &[u8] = include_bytes!("fixtures/localhost.crt");
const KEY_PEM: &[u8] = include_bytes!("fixtures/localhost.key");

const TLS_REPLY: &[u8] = b"HTTP/1.1 200 OK\r\n\
content-type: application/json\r\n\
content-length: 12\r\n\
connection: close\r\n\
\r\n\
{\"tls\":true}";

fn tls_acceptor() -> TlsAcceptor {
    let certs = CertificateDer::pem_slice_iter(CERT_PEM)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let key = PrivateKeyDer::from_pem_slice(KEY_PEM).unwrap();
    let config = ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

/// Serve one canned JSON response per TLS connection. Failed handshakes are
/// dropped and the loop keeps accepting.
async fn start_tls_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let acceptor = tls_acceptor();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = tls.write_all(TLS_REPLY).await;
                let _ = tls.shutdown().await;
            });
        }
    });
    format!("https://127.0.0.1:{}", addr.port())
}

#[tokio::test]
async fn self_signed_certificate_is_rejected_by_default() {
    let base = start_tls_server().await;
    let client = RequestClient::new(ClientConfig::new(base)).unwrap();

    let record = client.get("/", RequestOptions::new()).await;
    match record {
        ResultRecord::Failure { message, code } => {
            assert_eq!(code, None);
            assert!(!message.is_empty());
        }
        other => panic!("expected certificate failure, got {other:?}"),
    }
}

#[tokio::test]
async fn skipping_verification_accepts_self_signed_certificate() {
    let base = start_tls_server().await;
    let client = RequestClient::new(ClientConfig::new(base).danger_skip_tls_verify()).unwrap();

    let record = client.get("/", RequestOptions::new()).await;
    assert_eq!(record.code(), Some(200));
    assert_eq!(record.body(), Some(&Body::Json(Some(json!({"tls": true})))));
}

/// A SOCKS5 proxy that accepts the no-auth handshake, reports the requested
/// target and then refuses it with "host unreachable".
async fn start_recording_proxy() -> (String, oneshot::Receiver<(u8, Vec<u8>, u16)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut greeting = [0u8; 2];
        stream.read_exact(&mut greeting).await.unwrap();
        assert_eq!(greeting[0], 5);
        let mut methods = vec![0u8; greeting[1] as usize];
        stream.read_exact(&mut methods).await.unwrap();
        assert!(methods.contains(&0));
        stream.write_all(&[5, 0]).await.unwrap();

        let mut head = [0u8; 4];
        stream.read_exact(&mut head).await.unwrap();
        assert_eq!(&head[..3], &[5, 1, 0]);
        let atyp = head[3];
        let target = match atyp {
            1 => {
                let mut ip = vec![0u8; 4];
                stream.read_exact(&mut ip).await.unwrap();
                ip
            }
            3 => {
                let len = stream.read_u8().await.unwrap();
                let mut name = vec![0u8; len as usize];
                stream.read_exact(&mut name).await.unwrap();
                name
            }
            4 => {
                let mut ip = vec![0u8; 16];
                stream.read_exact(&mut ip).await.unwrap();
                ip
            }
            other => panic!("unexpected address type {other}"),
        };
        let port = stream.read_u16().await.unwrap();
        let _ = tx.send((atyp, target, port));

        let _ = stream.write_all(&[5, 4, 0, 1, 0, 0, 0, 0, 0, 0]).await;
    });
    (addr.to_string(), rx)
}

#[tokio::test]
async fn proxy_resolves_host_names() {
    let (proxy, target) = start_recording_proxy().await;
    let client = RequestClient::new(
        ClientConfig::new("http://unresolvable.invalid").with_proxy(proxy),
    )
    .unwrap();

    let record = client.get("/echo", RequestOptions::new()).await;

    let (atyp, host, port) = target.await.unwrap();
    assert_eq!(atyp, 3, "target was not sent as a domain name");
    assert_eq!(host, b"unresolvable.invalid");
    assert_eq!(port, 80);

    assert!(!record.is_success());
    assert_eq!(record.code(), None);
    let message = record.error().unwrap().to_ascii_lowercase();
    assert!(!message.contains("dns error"), "resolved locally: {message}");
}
