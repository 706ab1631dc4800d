/// API routes and handlers
pub mod animes;
pub mod articles;
pub mod health;
pub mod payload;
pub mod projects;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(health::routes())
        .merge(articles::routes())
        .merge(animes::routes())
        .merge(projects::routes())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::{
        config::{LoggingConfig, ServerConfig, ServiceConfig, StorageConfig},
        context::AppContext,
    };
    use axum::body::Body;
    use axum::http::Request;

    pub const TEST_BASE_URL: &str = "http://testserver";

    /// Build an application context rooted in a fresh temp directory
    pub async fn test_context() -> (tempfile::TempDir, AppContext) {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().to_path_buf();

        let config = ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".into(),
                port: 0,
                public_base_url: TEST_BASE_URL.into(),
                upload_limit: 5_242_880,
            },
            storage: StorageConfig {
                data_directory: data.clone(),
                database_path: data.join("test.sqlite"),
                asset_directory: data.join("content"),
            },
            logging: LoggingConfig {
                level: "info".into(),
            },
        };

        let ctx = AppContext::new(config).await.unwrap();
        (dir, ctx)
    }

    pub const BOUNDARY: &str = "atelier-test-boundary";

    /// Hand-rolled multipart/form-data body for upload tests
    pub fn multipart_body(
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((field, filename, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, field, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    pub fn multipart_request(uri: &str, method: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    pub fn json_request(uri: &str, method: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn response_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Names of the files currently present in the asset directory
    pub fn asset_listing(ctx: &AppContext) -> Vec<String> {
        let dir = &ctx.config.storage.asset_directory;
        if !dir.exists() {
            return Vec::new();
        }
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}
