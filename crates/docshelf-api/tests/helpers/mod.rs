//! Shared integration-test helpers: an in-process app over temp storage and
//! HS256 token minting.

use axum_test::TestServer;
use docshelf_core::Config;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use tempfile::TempDir;

pub const JWT_SECRET: &str = "test-secret-0123456789abcdef0123456789ab";
pub const SERVICE_API_KEY: &str = "svc-test-key-0123456789abcdef0123456789";

pub struct TestApp {
    pub server: TestServer,
    // Held so the storage directories outlive the test.
    _dir: TempDir,
}

pub fn test_config(base_path: &str, max_file_size_bytes: u64) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        storage_base_path: base_path.to_string(),
        max_file_size_bytes,
        jwt_secret: JWT_SECRET.to_string(),
        service_api_key: Some(SERVICE_API_KEY.to_string()),
        idp_jwks_url: None,
        idp_jwks_cache_ttl_secs: 3600,
        preview_max_width: 800,
        preview_max_height: 600,
        preview_timeout_secs: 10,
        preview_dpi: 150,
        max_concurrent_renders: 2,
        pdftoppm_path: "pdftoppm".to_string(),
        soffice_path: "soffice".to_string(),
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_limit(10 * 1024 * 1024).await
}

pub async fn setup_test_app_with_limit(max_file_size_bytes: u64) -> TestApp {
    let dir = tempfile::tempdir().expect("create temp storage dir");
    let config = test_config(dir.path().to_str().unwrap(), max_file_size_bytes);

    let (_state, router) = docshelf_api::setup::initialize_app(config)
        .await
        .expect("initialize app");

    TestApp {
        server: TestServer::new(router).expect("start test server"),
        _dir: dir,
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    role: String,
    exp: i64,
    iat: i64,
}

/// Mint an HS256 bearer token for the given role.
pub fn token(role: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = TestClaims {
        sub: format!("test-{}", role),
        role: role.to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("mint test token")
}

pub fn bearer(role: &str) -> String {
    format!("Bearer {}", token(role))
}

/// A tiny but valid PNG, generated rather than checked in.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([40, 80, 120, 255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode test png");
    buf.into_inner()
}

/// Raw bytes carrying a PDF signature and a visible 3-page page tree.
pub fn three_page_pdf() -> Vec<u8> {
    b"%PDF-1.4\n/Type /Pages /Count 3\n%%EOF".to_vec()
}

/// Raw bytes carrying an OOXML word-processing signature.
pub fn docx_bytes() -> Vec<u8> {
    let mut data = b"PK\x03\x04....".to_vec();
    data.extend_from_slice(b"word/document.xml");
    data
}
