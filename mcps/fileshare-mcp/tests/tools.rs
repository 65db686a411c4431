//! End-to-end tool calls against a temporary share
//!
//! Each test builds a share under a temp directory and drives the server
//! through `EmbeddableMcp::call_tool`, the same path a host uses in-process.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use fileshare_mcp::{Config, FileShareMcpServer};
use mcp_common::{EmbeddableError, EmbeddableMcp};
use rmcp::model::{CallToolResult, RawContent};
use serde_json::{json, Value};

struct Share {
    _dir: tempfile::TempDir,
    server: FileShareMcpServer,
}

/// Layout: `data/a.txt` (10 bytes), `data/secret/x`, `data/docs/`, with
/// `data/secret` excluded and a 1 MiB return ceiling.
fn share(setup: impl FnOnce(&Path, &mut Config)) -> Share {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("data");
    fs::create_dir_all(root.join("secret")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(root.join("a.txt"), b"0123456789").unwrap();
    fs::write(root.join("secret/x"), b"classified").unwrap();

    let mut config = Config::for_root(&root);
    config.exclude_folders = vec![root.join("secret").display().to_string()];
    config.limits.max_return_file_size = 1024 * 1024;
    setup(&root, &mut config);

    Share {
        server: FileShareMcpServer::with_config(config).unwrap(),
        _dir: dir,
    }
}

fn text(result: &CallToolResult) -> &str {
    match &result.content[0].raw {
        RawContent::Text(t) => t.text.as_str(),
        other => panic!("expected text content, got {:?}", other),
    }
}

fn json_of(result: &CallToolResult) -> Value {
    serde_json::from_str(text(result)).unwrap()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::new(width, height);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

#[tokio::test]
async fn base64_content_round_trips() {
    let share = share(|_, _| {});
    let result = share
        .server
        .call_tool("get_content_base64", json!({"path": "/a.txt"}))
        .await
        .unwrap();

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(text(&result))
        .unwrap();
    assert_eq!(decoded, b"0123456789");
}

#[tokio::test]
async fn raw_content_at_and_over_return_ceiling() {
    let share = share(|root, config| {
        fs::write(root.join("exact.txt"), vec![b'x'; 64]).unwrap();
        fs::write(root.join("over.txt"), vec![b'x'; 65]).unwrap();
        config.limits.max_return_file_size = 64;
    });

    let exact = share
        .server
        .call_tool("get_content_raw", json!({"path": "exact.txt"}))
        .await
        .unwrap();
    assert_eq!(text(&exact).len(), 64);

    let over = share
        .server
        .call_tool("get_content_raw", json!({"path": "over.txt"}))
        .await;
    match over {
        Err(EmbeddableError::McpError(message)) => {
            assert!(message.contains("too large to return"), "{message}")
        }
        other => panic!("expected size error, got {:?}", other),
    }
}

#[tokio::test]
async fn excluded_and_escaping_paths_denied() {
    let share = share(|_, _| {});

    let metadata = share
        .server
        .call_tool("get_metadata", json!({"path": "/secret/x"}))
        .await;
    assert!(matches!(metadata, Err(EmbeddableError::McpError(m)) if m.contains("Access denied")));

    let listing = share
        .server
        .call_tool("list_folder", json!({"path": "/../../etc"}))
        .await;
    assert!(matches!(listing, Err(EmbeddableError::McpError(m)) if m.contains("Access denied")));

    let content = share
        .server
        .call_tool("get_content_raw", json!({"path": "secret/x"}))
        .await;
    assert!(matches!(content, Err(EmbeddableError::McpError(m)) if m.contains("Access denied")));
}

#[tokio::test]
async fn root_listing_hides_excluded_folder() {
    let share = share(|_, _| {});
    let result = share
        .server
        .call_tool("list_folder", json!({}))
        .await
        .unwrap();
    let listing = json_of(&result);

    let folders: Vec<&str> = listing["subfolders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(folders, ["docs"]);
    assert_eq!(listing["files"][0]["name"], "a.txt");
    assert_eq!(listing["files"][0]["size"], 10);
    assert_eq!(listing["files"][0]["is_too_large"], false);
    assert_eq!(listing["truncated"], false);
}

#[tokio::test]
async fn listing_respects_limit_argument() {
    let share = share(|root, _| {
        for i in 0..20 {
            fs::write(root.join(format!("docs/{i:02}.md")), b"#").unwrap();
        }
    });

    let result = share
        .server
        .call_tool("list_folder", json!({"path": "docs/", "limit": "5"}))
        .await
        .unwrap();
    let listing = json_of(&result);
    assert_eq!(listing["files"].as_array().unwrap().len(), 5);
    assert_eq!(listing["truncated"], true);
    assert_eq!(listing["folder"]["name"], "docs");
    assert!(listing["files"][0]["path"]
        .as_str()
        .unwrap()
        .starts_with("docs/"));
}

#[tokio::test]
async fn metadata_reports_image_dimensions() {
    let share = share(|root, _| {
        fs::write(root.join("docs/chart.png"), png(64, 32)).unwrap();
    });

    let result = share
        .server
        .call_tool("get_metadata", json!({"path": "docs/chart.png"}))
        .await
        .unwrap();
    let meta = json_of(&result);
    assert_eq!(meta["file"]["is_supported_image"], true);
    assert_eq!(meta["metadata"]["width"], 64);
    assert_eq!(meta["metadata"]["height"], 32);
    assert_eq!(meta["metadata"]["mime_type"], "image/png");
}

#[tokio::test]
async fn metadata_on_directory_fails() {
    let share = share(|_, _| {});
    let result = share
        .server
        .call_tool("get_metadata", json!({"path": "docs"}))
        .await;
    assert!(matches!(result, Err(EmbeddableError::McpError(m)) if m.contains("directory")));
}

#[tokio::test]
async fn thumbnail_preserves_aspect_ratio() {
    let source = png(2000, 1000);
    let share = share(|root, config| {
        fs::write(root.join("wide.png"), &source).unwrap();
        // Source is over the return ceiling; only the thumbnail must fit it
        config.limits.max_return_file_size = 1024;
        config.limits.max_read_file_size = 0;
    });

    let result = share
        .server
        .call_tool(
            "get_image_content",
            json!({"path": "wide.png", "thumb_width": 100}),
        )
        .await
        .unwrap();

    let (data, mime_type) = match &result.content[0].raw {
        RawContent::Image(image) => (image.data.clone(), image.mime_type.clone()),
        other => panic!("expected image content, got {:?}", other),
    };
    assert_eq!(mime_type, "image/png");

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .unwrap();
    let thumb = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png).unwrap();
    assert!(thumb.width() <= 100);
    assert!((49..=51).contains(&thumb.height()));
}

#[tokio::test]
async fn image_tool_rejects_other_formats() {
    let share = share(|_, _| {});
    let result = share
        .server
        .call_tool("get_image_content", json!({"path": "a.txt"}))
        .await;
    assert!(matches!(result, Err(EmbeddableError::McpError(m)) if m.contains("Unsupported format")));
}

#[tokio::test]
async fn extracted_text_falls_back_to_utf8() {
    let share = share(|root, _| {
        fs::write(root.join("docs/notes.md"), "# Notes\nline two").unwrap();
    });
    let result = share
        .server
        .call_tool(
            "get_content_as_extracted_text",
            json!({"path": "docs/notes.md"}),
        )
        .await
        .unwrap();
    assert_eq!(text(&result), "# Notes\nline two");
}

#[tokio::test]
async fn missing_path_parameter_is_invalid_params() {
    let share = share(|_, _| {});
    let result = share.server.call_tool("get_content_raw", json!({})).await;
    assert!(matches!(result, Err(EmbeddableError::InvalidParams(_))));
}
