//! Preview API integration tests.
//!
//! These exercise every preview path that does not need the external
//! rasterizer binary: image pass-through, page validation against the PDF
//! page tree, unsupported kinds, and lifecycle interactions. Rendering
//! itself is covered by unit tests against a mock renderer.
//!
//! Run with: `cargo test -p docshelf-api --test preview_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{bearer, docx_bytes, png_bytes, setup_test_app, three_page_pdf};

fn upload_form(file_name: &str, data: Vec<u8>, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "files",
        Part::bytes(data).file_name(file_name).mime_type(mime),
    )
}

#[tokio::test]
async fn test_image_preview_passes_source_through() {
    let app = setup_test_app().await;
    let source = png_bytes(10, 10);

    app.server
        .post("/api/v0/files")
        .add_header("Authorization", bearer("admin"))
        .multipart(upload_form("photo.png", source.clone(), "image/png"))
        .await;

    let response = app
        .server
        .get("/api/v0/files/photo.png/preview")
        .add_header("Authorization", bearer("admin"))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );
    assert_eq!(response.as_bytes().as_ref(), source.as_slice());
}

#[tokio::test]
async fn test_image_preview_page_two_is_out_of_range() {
    let app = setup_test_app().await;

    app.server
        .post("/api/v0/files")
        .add_header("Authorization", bearer("admin"))
        .multipart(upload_form("photo.png", png_bytes(10, 10), "image/png"))
        .await;

    let response = app
        .server
        .get("/api/v0/files/photo.png/preview")
        .add_query_param("page", "2")
        .add_header("Authorization", bearer("admin"))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PAGE_OUT_OF_RANGE");
}

#[tokio::test]
async fn test_preview_page_zero_is_invalid() {
    let app = setup_test_app().await;

    app.server
        .post("/api/v0/files")
        .add_header("Authorization", bearer("admin"))
        .multipart(upload_form("doc.pdf", three_page_pdf(), "application/pdf"))
        .await;

    let response = app
        .server
        .get("/api/v0/files/doc.pdf/preview")
        .add_query_param("page", "0")
        .add_header("Authorization", bearer("admin"))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_PAGE");
}

#[tokio::test]
async fn test_pdf_preview_page_beyond_count_is_out_of_range() {
    let app = setup_test_app().await;

    app.server
        .post("/api/v0/files")
        .add_header("Authorization", bearer("admin"))
        .multipart(upload_form("doc.pdf", three_page_pdf(), "application/pdf"))
        .await;

    let response = app
        .server
        .get("/api/v0/files/doc.pdf/preview")
        .add_query_param("page", "5")
        .add_header("Authorization", bearer("admin"))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PAGE_OUT_OF_RANGE");
}

#[tokio::test]
async fn test_preview_of_plain_text_is_unsupported() {
    let app = setup_test_app().await;

    app.server
        .post("/api/v0/files")
        .add_header("Authorization", bearer("admin"))
        .multipart(upload_form("notes.txt", b"plain text".to_vec(), "text/plain"))
        .await;

    let response = app
        .server
        .get("/api/v0/files/notes.txt/preview")
        .add_header("Authorization", bearer("admin"))
        .await;
    assert_eq!(response.status_code(), 415);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PREVIEW_UNSUPPORTED");
}

#[tokio::test]
async fn test_preview_of_missing_file_is_404() {
    let app = setup_test_app().await;

    let response = app
        .server
        .get("/api/v0/files/ghost.pdf/preview")
        .add_header("Authorization", bearer("admin"))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_preview_after_delete_is_404() {
    let app = setup_test_app().await;

    app.server
        .post("/api/v0/files")
        .add_header("Authorization", bearer("admin"))
        .multipart(upload_form(
            "notes.docx",
            docx_bytes(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ))
        .await;
    app.server
        .delete("/api/v0/files/notes.docx")
        .add_header("Authorization", bearer("admin"))
        .await;

    let response = app
        .server
        .get("/api/v0/files/notes.docx/preview")
        .add_header("Authorization", bearer("admin"))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_preview_defaults_to_page_one() {
    let app = setup_test_app().await;
    let source = png_bytes(5, 5);

    app.server
        .post("/api/v0/files")
        .add_header("Authorization", bearer("admin"))
        .multipart(upload_form("photo.png", source.clone(), "image/png"))
        .await;

    // No page parameter at all.
    let response = app
        .server
        .get("/api/v0/files/photo.png/preview")
        .add_header("Authorization", bearer("admin"))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().as_ref(), source.as_slice());
}
