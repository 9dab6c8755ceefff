//! Request dispatcher for the MOLA backend

use std::sync::Arc;

use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Client as HttpClient, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Operation, Result};
use crate::storage::{SessionStorage, TOKEN_KEY};
use crate::token;

/// Base URL compiled in from the build environment
pub const DEFAULT_API_BASE_URL: &str = match option_env!("MOLA_API_BASE_URL") {
    Some(url) => url,
    None => "http://localhost:8080/api/v1",
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Request body variants
enum Payload {
    Empty,
    Json(Vec<u8>),
    /// Content type and boundary are left to the transport
    Multipart(Form),
}

/// HTTP client for the MOLA API.
///
/// Holds no session state of its own: the stored token is read on every
/// call, so a sign-in or sign-out takes effect on the next request. Cheap to
/// clone and safe to share between tasks.
#[derive(Clone)]
pub struct MolaClient {
    http: HttpClient,
    base_url: String,
    storage: Arc<dyn SessionStorage>,
}

impl MolaClient {
    /// Create a client against the compiled-in base URL
    pub fn new(storage: Arc<dyn SessionStorage>) -> Result<Self> {
        Self::with_base_url(storage, DEFAULT_API_BASE_URL)
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(storage: Arc<dyn SessionStorage>, base_url: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            storage,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path`
    pub async fn get<T: DeserializeOwned>(&self, path: &str, with_auth: bool) -> Result<T> {
        self.dispatch(Method::GET, path, Payload::Empty, with_auth, Operation::Get)
            .await
    }

    /// POST a JSON body to `path`
    pub async fn post<B, T>(&self, path: &str, body: &B, with_auth: bool) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = Payload::Json(serde_json::to_vec(body)?);
        self.dispatch(Method::POST, path, payload, with_auth, Operation::Send)
            .await
    }

    /// POST a multipart form (file uploads) to `path`
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        with_auth: bool,
    ) -> Result<T> {
        let payload = Payload::Multipart(form);
        self.dispatch(Method::POST, path, payload, with_auth, Operation::Send)
            .await
    }

    /// PUT a JSON body to `path`
    pub async fn put<B, T>(&self, path: &str, body: &B, with_auth: bool) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = Payload::Json(serde_json::to_vec(body)?);
        self.dispatch(Method::PUT, path, payload, with_auth, Operation::Update)
            .await
    }

    /// PUT a multipart form to `path`
    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        with_auth: bool,
    ) -> Result<T> {
        let payload = Payload::Multipart(form);
        self.dispatch(Method::PUT, path, payload, with_auth, Operation::Update)
            .await
    }

    /// DELETE `path`
    pub async fn delete<T: DeserializeOwned>(&self, path: &str, with_auth: bool) -> Result<T> {
        self.dispatch(Method::DELETE, path, Payload::Empty, with_auth, Operation::Delete)
            .await
    }

    /// Stored token if it is usable as a bearer credential
    fn bearer_token(&self) -> Result<Option<String>> {
        let token = self.storage.get(TOKEN_KEY)?;
        Ok(token.filter(|t| !t.is_empty() && !token::is_placeholder(t)))
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        with_auth: bool,
        operation: Operation,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);

        request = match payload {
            Payload::Empty => request.header(CONTENT_TYPE, JSON_CONTENT_TYPE),
            Payload::Json(bytes) => request.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(bytes),
            Payload::Multipart(form) => request.multipart(form),
        };

        let token = if with_auth { self.bearer_token()? } else { None };
        debug!("{} {} (auth: {})", method, path, token.is_some());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            debug!("{} {} failed with status {}", method, path, status);
            return Err(ApiError::RequestFailed { operation }.into());
        }

        let bytes = response.bytes().await.map_err(ApiError::from)?;
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        let data = serde_json::from_slice(body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::MemoryStorage;
    use mockito::Matcher;
    use reqwest::multipart::Part;
    use serde_json::{Value, json};

    fn client_for(server: &mockito::Server, storage: &MemoryStorage) -> MolaClient {
        MolaClient::with_base_url(Arc::new(storage.clone()), &server.url()).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = MolaClient::with_base_url(
            Arc::new(MemoryStorage::new()),
            "http://localhost:8080/api/v1/",
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api/v1");
    }

    #[tokio::test]
    async fn test_anonymous_get_sends_no_authorization() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products")
            .match_header("authorization", Matcher::Missing)
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"data":{"products":[]}}"#)
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "a.b.c").unwrap();
        let client = client_for(&server, &storage);

        let body: Value = client.get("/products", false).await.unwrap();

        assert_eq!(body["data"]["products"], json!([]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_authenticated_get_attaches_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/profile")
            .match_header("authorization", "Bearer a.b.c")
            .with_status(200)
            .with_body(r#"{"data":{"user":{"name":"Sari"}}}"#)
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "a.b.c").unwrap();
        let client = client_for(&server, &storage);

        let body: Value = client.get("/users/profile", true).await.unwrap();

        assert_eq!(body["data"]["user"]["name"], "Sari");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_placeholder_tokens_are_not_sent() {
        for placeholder in ["undefined", "null", ""] {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("GET", "/carts")
                .match_header("authorization", Matcher::Missing)
                .with_status(200)
                .with_body("{}")
                .create_async()
                .await;

            let storage = MemoryStorage::new();
            storage.set(TOKEN_KEY, placeholder).unwrap();
            let client = client_for(&server, &storage);

            let _: Value = client.get("/carts", true).await.unwrap();
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_missing_token_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/orders/show")
            .match_header("authorization", Matcher::Missing)
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(&server, &MemoryStorage::new());
        let err = client.get::<Value>("/orders/show", true).await.unwrap_err();

        // The backend's 401 is reported like any other failed status
        assert!(matches!(
            err,
            Error::Api(ApiError::RequestFailed {
                operation: Operation::Get
            })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_server_error_is_generic_send_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/admin/categories")
            .match_header("authorization", "Bearer a.b.c")
            .match_body(Matcher::Json(json!({ "name": "" })))
            .with_status(500)
            .with_body(r#"{"message":"name is required"}"#)
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "a.b.c").unwrap();
        let client = client_for(&server, &storage);

        let err = client
            .post::<_, Value>("/admin/categories", &json!({ "name": "" }), true)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to send data");
        assert!(!err.to_string().contains("name is required"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failure_messages_per_verb() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/carts/1")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("DELETE", "/carts/1")
            .with_status(400)
            .create_async()
            .await;
        server
            .mock("GET", "/carts")
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server, &MemoryStorage::new());

        let err = client
            .put::<_, Value>("/carts/1", &json!({ "quantity": 2 }), true)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to update data");

        let err = client.delete::<Value>("/carts/1", true).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to delete data");

        let err = client.get::<Value>("/carts", true).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to get data");
    }

    #[tokio::test]
    async fn test_multipart_does_not_force_json_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/admin/products")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_header("authorization", "Bearer a.b.c")
            .with_status(201)
            .with_body(r#"{"message":"created"}"#)
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "a.b.c").unwrap();
        let client = client_for(&server, &storage);

        let form = Form::new().text("name", "Tote Bag").part(
            "image",
            Part::bytes(vec![0x89, 0x50, 0x4e, 0x47]).file_name("tote.png"),
        );
        let body: Value = client
            .post_multipart("/admin/products", form, true)
            .await
            .unwrap();

        assert_eq!(body["message"], "created");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/admin/ads/7")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server, &MemoryStorage::new());
        let body: Value = client.delete("/admin/ads/7", true).await.unwrap();
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_unparseable_success_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/products")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = client_for(&server, &MemoryStorage::new());
        let err = client.get::<Value>("/products", false).await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let client = MolaClient::with_base_url(
            Arc::new(MemoryStorage::new()),
            "http://127.0.0.1:1",
        )
        .unwrap();

        let err = client.get::<Value>("/products", false).await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Network(_))));
    }

    #[tokio::test]
    async fn test_token_is_read_at_call_time() {
        let mut server = mockito::Server::new_async().await;
        let anonymous = server
            .mock("GET", "/carts")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let storage = MemoryStorage::new();
        let client = client_for(&server, &storage);
        let _: Value = client.get("/carts", true).await.unwrap();
        anonymous.assert_async().await;

        let authed = server
            .mock("GET", "/carts")
            .match_header("authorization", "Bearer x.y.z")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        storage.set(TOKEN_KEY, "x.y.z").unwrap();
        let _: Value = client.get("/carts", true).await.unwrap();
        authed.assert_async().await;
    }
}
