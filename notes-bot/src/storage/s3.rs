//! S3-compatible object storage over the REST API (path-style addressing)

use super::sigv4::{self, Credentials, RequestParts};
use super::{ObjectStorage, StorageError};
use crate::config::S3Config;
use crate::http::shared_client;
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Method, StatusCode};

static KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<Key>([^<]*)</Key>").expect("valid regex"));
static CONTINUATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<NextContinuationToken>([^<]*)</NextContinuationToken>").expect("valid regex")
});

pub struct S3Storage {
    config: S3Config,
    host: String,
    client: reqwest::Client,
}

/// One page of a ListObjectsV2 response
#[derive(Debug, Default, PartialEq, Eq)]
struct ListPage {
    keys: Vec<String>,
    next_token: Option<String>,
}

impl S3Storage {
    pub fn new(config: S3Config) -> Self {
        Self::with_client(config, shared_client().clone())
    }

    pub fn with_client(config: S3Config, client: reqwest::Client) -> Self {
        let host = host_of(&config.endpoint);
        Self {
            config,
            host,
            client,
        }
    }

    fn object_key(&self, name: &str) -> String {
        if self.config.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.config.prefix, name)
        }
    }

    async fn send(
        &self,
        method: Method,
        key: Option<&str>,
        query: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<reqwest::Response, StorageError> {
        let mut canonical_uri = format!("/{}", sigv4::encode_key_path(&self.config.bucket));
        if let Some(key) = key {
            canonical_uri.push('/');
            canonical_uri.push_str(&sigv4::encode_key_path(key));
        }
        let query_string = sigv4::canonical_query(query);

        let signed = sigv4::sign(
            &Credentials {
                access_key_id: &self.config.access_key_id,
                secret_access_key: &self.config.secret_access_key,
                region: &self.config.region,
                service: "s3",
            },
            &RequestParts {
                method: method.as_str(),
                host: &self.host,
                canonical_uri: &canonical_uri,
                query,
                payload: &body,
            },
            Utc::now(),
        );

        let mut url = format!("{}{}", self.config.endpoint, canonical_uri);
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }

        log::debug!("S3: {} {}", method, url);

        let response = self
            .client
            .request(method, url.as_str())
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .header("authorization", signed.authorization)
            .body(body)
            .send()
            .await?;
        Ok(response)
    }

    async fn fail(response: reqwest::Response, action: &str) -> StorageError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let detail: String = body.chars().take(300).collect();
        log::error!("S3: {} failed with status {}: {}", action, status, detail);
        StorageError::with_status(format!("S3 {} failed", action), status)
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let object_key = self.object_key(key);
        let response = self.send(Method::GET, Some(&object_key), &[], Vec::new()).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(response.bytes().await?.to_vec())),
            _ => Err(Self::fail(response, &format!("GET {}", object_key)).await),
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let object_key = self.object_key(key);
        let response = self.send(Method::PUT, Some(&object_key), &[], bytes).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::fail(response, &format!("PUT {}", object_key)).await)
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let object_key = self.object_key(key);
        let response = self.send(Method::HEAD, Some(&object_key), &[], Vec::new()).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            _ => Err(Self::fail(response, &format!("HEAD {}", object_key)).await),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let prefix = if self.config.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.config.prefix)
        };

        let mut names = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut query: Vec<(&str, &str)> = vec![("list-type", "2"), ("prefix", prefix.as_str())];
            if let Some(t) = token.as_deref() {
                query.push(("continuation-token", t));
            }
            let response = self.send(Method::GET, None, &query, Vec::new()).await?;
            if !response.status().is_success() {
                return Err(Self::fail(response, "LIST").await);
            }
            let body = response.text().await?;
            let page = parse_list_page(&body);

            names.extend(names_from_keys(&page.keys, &prefix));

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        names.sort();
        Ok(names)
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.config.bucket, self.config.prefix)
    }
}

/// Host header value for an endpoint URL, keeping an explicit non-default port
fn host_of(endpoint: &str) -> String {
    match url::Url::parse(endpoint) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default().to_string();
            match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            }
        }
        Err(e) => {
            log::warn!("S3: Could not parse endpoint '{}': {}", endpoint, e);
            endpoint.to_string()
        }
    }
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// File names directly under `prefix`. The bare prefix key and anything
/// nested deeper are skipped.
fn names_from_keys(keys: &[String], prefix: &str) -> Vec<String> {
    keys.iter()
        .filter_map(|k| k.strip_prefix(prefix))
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .map(str::to_string)
        .collect()
}

fn parse_list_page(xml: &str) -> ListPage {
    ListPage {
        keys: KEY_PATTERN
            .captures_iter(xml)
            .map(|c| unescape_xml(&c[1]))
            .collect(),
        next_token: CONTINUATION_PATTERN
            .captures(xml)
            .map(|c| unescape_xml(&c[1])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(endpoint: &str, prefix: &str) -> S3Config {
        S3Config {
            bucket: "meeting-notes".to_string(),
            region: "us-east-1".to_string(),
            endpoint: endpoint.to_string(),
            prefix: prefix.to_string(),
            access_key_id: "AKID".to_string(),
            secret_access_key: "secret".to_string(),
        }
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://s3.us-east-1.amazonaws.com"), "s3.us-east-1.amazonaws.com");
        assert_eq!(host_of("http://localhost:9000"), "localhost:9000");
        assert_eq!(host_of("https://minio.internal:443"), "minio.internal");
    }

    #[test]
    fn test_object_key_uses_prefix() {
        let storage = S3Storage::new(config("http://localhost:9000", "waiter"));
        assert_eq!(storage.object_key("q1.json"), "waiter/q1.json");

        let bare = S3Storage::new(config("http://localhost:9000", ""));
        assert_eq!(bare.object_key("q1.json"), "q1.json");
    }

    #[test]
    fn test_parse_list_page() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>meeting-notes</Name>
  <Prefix>waiter/</Prefix>
  <IsTruncated>true</IsTruncated>
  <Contents><Key>waiter/q1.json</Key><Size>2</Size></Contents>
  <Contents><Key>waiter/r&amp;d.json</Key><Size>2</Size></Contents>
  <NextContinuationToken>1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM=</NextContinuationToken>
</ListBucketResult>"#;
        let page = parse_list_page(xml);
        assert_eq!(page.keys, vec!["waiter/q1.json", "waiter/r&d.json"]);
        assert_eq!(
            page.next_token.as_deref(),
            Some("1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM=")
        );
    }

    #[test]
    fn test_parse_last_page() {
        let xml = "<ListBucketResult><IsTruncated>false</IsTruncated></ListBucketResult>";
        assert_eq!(parse_list_page(xml), ListPage::default());
    }

    #[test]
    fn test_names_from_keys() {
        let keys: Vec<String> = ["waiter/", "waiter/a.json", "waiter/nested/b.json", "other/c.json"]
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(names_from_keys(&keys, "waiter/"), vec!["a.json"]);

        let bare: Vec<String> = ["a.json", "nested/b.json"].iter().map(|k| k.to_string()).collect();
        assert_eq!(names_from_keys(&bare, ""), vec!["a.json"]);
    }

    type Route = fn(&str) -> (u16, String);

    /// Plain HTTP/1.1 server answering one request per connection.
    /// Returns the endpoint and every request line it saw.
    async fn stub_server(route: Route) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let log = log.clone();
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }
                    let request_line = String::from_utf8_lossy(&head)
                        .lines()
                        .next()
                        .unwrap_or_default()
                        .to_string();
                    log.lock().unwrap().push(request_line.clone());

                    let (status, mut body) = route(&request_line);
                    if request_line.starts_with("HEAD ") {
                        body.clear();
                    }
                    let response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (endpoint, seen)
    }

    fn stub_storage(endpoint: &str) -> S3Storage {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        S3Storage::with_client(config(endpoint, "waiter"), client)
    }

    fn object_route(request_line: &str) -> (u16, String) {
        if request_line.contains("/meeting-notes/waiter/q1.json ") {
            (200, r#"{"jan-m":"https://example.com/m"}"#.to_string())
        } else if request_line.contains("/meeting-notes/waiter/broken.json ") {
            (500, "<Error><Code>InternalError</Code></Error>".to_string())
        } else {
            (404, "<Error><Code>NoSuchKey</Code></Error>".to_string())
        }
    }

    #[tokio::test]
    async fn test_get_maps_status_codes() {
        let (endpoint, seen) = stub_server(object_route).await;
        let storage = stub_storage(&endpoint);

        assert_eq!(
            storage.get("q1.json").await.unwrap(),
            Some(br#"{"jan-m":"https://example.com/m"}"#.to_vec())
        );
        assert_eq!(storage.get("missing.json").await.unwrap(), None);

        let err = storage.get("broken.json").await.unwrap_err();
        assert_eq!(err.status_code, Some(500));

        assert!(seen.lock().unwrap()[0].starts_with("GET /meeting-notes/waiter/q1.json "));
    }

    #[tokio::test]
    async fn test_exists_maps_head_status() {
        let (endpoint, seen) = stub_server(object_route).await;
        let storage = stub_storage(&endpoint);

        assert!(storage.exists("q1.json").await.unwrap());
        assert!(!storage.exists("missing.json").await.unwrap());
        assert_eq!(
            storage.exists("broken.json").await.unwrap_err().status_code,
            Some(500)
        );
        assert!(seen.lock().unwrap().iter().all(|line| line.starts_with("HEAD ")));
    }

    fn list_route(request_line: &str) -> (u16, String) {
        if !request_line.contains("list-type=2") {
            return (400, String::new());
        }
        if request_line.contains("continuation-token=page-2") {
            (
                200,
                "<ListBucketResult><IsTruncated>false</IsTruncated>\
                 <Contents><Key>waiter/b.json</Key></Contents>\
                 <Contents><Key>waiter/nested/c.json</Key></Contents>\
                 </ListBucketResult>"
                    .to_string(),
            )
        } else {
            (
                200,
                "<ListBucketResult><IsTruncated>true</IsTruncated>\
                 <Contents><Key>waiter/</Key></Contents>\
                 <Contents><Key>waiter/z.json</Key></Contents>\
                 <Contents><Key>waiter/a.json</Key></Contents>\
                 <NextContinuationToken>page-2</NextContinuationToken>\
                 </ListBucketResult>"
                    .to_string(),
            )
        }
    }

    #[tokio::test]
    async fn test_list_follows_continuation_token() {
        let (endpoint, seen) = stub_server(list_route).await;
        let storage = stub_storage(&endpoint);

        assert_eq!(storage.list().await.unwrap(), vec!["a.json", "b.json", "z.json"]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("prefix=waiter%2F"));
        assert!(!seen[0].contains("continuation-token"));
        assert!(seen[1].contains("continuation-token=page-2"));
    }

    #[tokio::test]
    async fn test_list_failure_carries_status() {
        let (endpoint, _) = stub_server(|_| (403, "<Error><Code>AccessDenied</Code></Error>".to_string())).await;
        let storage = stub_storage(&endpoint);

        assert_eq!(storage.list().await.unwrap_err().status_code, Some(403));
    }
}
