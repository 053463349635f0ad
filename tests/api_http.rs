mod common;

use predicates::prelude::*;
use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::TestEnv;

fn endpoint(server: &MockServer) -> String {
    format!("{}/api/1/", server.uri())
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// --- offers ---

#[tokio::test(flavor = "multi_thread")]
async fn list_offers_sends_app_id_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/offer"))
        .and(header("X-App-Id", "test"))
        .and(header("X-Auth-Token", "abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "offers": [{"slug": "ebook"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("abc");
    let output = env
        .cmd_at(&endpoint(&server))
        .args(["offer", "list"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["offers"][0]["slug"], "ebook");
    assert!(String::from_utf8_lossy(&output.stderr).contains("API token loaded from file."));
}

#[tokio::test(flavor = "multi_thread")]
async fn show_and_delete_use_slug_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/offer/ebook/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"offer": {"title": "E"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/1/offer/ebook/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("abc");
    let output = env
        .cmd_at(&endpoint(&server))
        .args(["offer", "show", "ebook"])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)["offer"]["title"], "E");

    env.cmd_at(&endpoint(&server))
        .args(["offer", "delete", "ebook"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"success":true}"#));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_offer_posts_form_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1/offer/"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string("title=T&base_inr=100"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"success": true, "offer": {"slug": "t"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("abc");
    let output = env
        .cmd_at(&endpoint(&server))
        .args(["offer", "create", "--title", "T", "--inr", "100"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["offer"]["slug"], "t");
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_with_json_body_is_printed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/offer/missing/"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"success": false, "message": "Not found"})),
        )
        .mount(&server)
        .await;

    let env = TestEnv::with_token("abc");
    let output = env
        .cmd_at(&endpoint(&server))
        .args(["offer", "show", "missing"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["message"], "Not found");
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_body_fails_with_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/debug/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let env = TestEnv::new();
    env.cmd_at(&endpoint(&server))
        .arg("debug")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected JSON"))
        .stderr(predicate::str::contains("<html>maintenance</html>"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("X-Auth-Token").is_none());
}

// --- auth ---

#[tokio::test(flavor = "multi_thread")]
async fn login_saves_token_for_later_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1/auth/"))
        .and(body_string("username=alice&password=s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "token": "tok-9"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/1/offer"))
        .and(header("X-Auth-Token", "tok-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"offers": []})))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    env.cmd_at(&endpoint(&server))
        .env("INSTAMOJO_PASSWORD", "s3cret")
        .args(["auth", "login", "alice"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Token saved"));
    assert_eq!(env.read_token().as_deref(), Some("tok-9"));

    env.cmd_at(&endpoint(&server))
        .args(["offer", "list"])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_login_keeps_existing_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1/auth/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Invalid credentials"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("old");
    let output = env
        .cmd_at(&endpoint(&server))
        .env("INSTAMOJO_PASSWORD", "wrong")
        .args(["auth", "login", "alice"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["message"], "Invalid credentials");
    assert_eq!(env.read_token().as_deref(), Some("old"));
}

#[tokio::test(flavor = "multi_thread")]
async fn revoke_deletes_token_and_clears_file() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/1/auth/abc/"))
        .and(header("X-Auth-Token", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("abc");
    env.cmd_at(&endpoint(&server))
        .args(["auth", "revoke"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Token revoked."));

    assert!(env.token_file().exists());
    assert_eq!(env.read_token(), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn verbose_auth_logs_never_show_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1/auth/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "token": "SECRET-TOK"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/1/auth/SECRET-TOK/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    let login = env
        .cmd_at(&endpoint(&server))
        .env("INSTAMOJO_PASSWORD", "s3cret")
        .args(["-v", "auth", "login", "alice"])
        .output()
        .unwrap();
    assert!(login.status.success());
    let stderr = String::from_utf8_lossy(&login.stderr);
    assert!(stderr.contains("response preview"), "debug logging is on: {stderr}");
    assert!(!stderr.contains("SECRET-TOK"), "login logs: {stderr}");
    assert!(!stderr.contains("s3cret"), "login logs: {stderr}");

    let revoke = env
        .cmd_at(&endpoint(&server))
        .args(["-v", "auth", "revoke"])
        .output()
        .unwrap();
    assert!(revoke.status.success());
    let stderr = String::from_utf8_lossy(&revoke.stderr);
    assert!(stderr.contains("DELETE"), "debug logging is on: {stderr}");
    assert!(!stderr.contains("SECRET-TOK"), "revoke logs: {stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn login_reissuing_same_token_reports_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1/auth/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "token": "same"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("same");
    env.cmd_at(&endpoint(&server))
        .env("INSTAMOJO_PASSWORD", "pw")
        .args(["auth", "login", "alice"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Token saved"))
        .stderr(predicate::str::contains("did not return").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn slug_is_sent_as_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/offer/a%2Fb/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"offer": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("abc");
    env.cmd_at(&endpoint(&server))
        .args(["offer", "show", "a/b"])
        .assert()
        .success();
}

// --- configuration ---

#[tokio::test(flavor = "multi_thread")]
async fn configured_auth_header_and_app_id_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/offer"))
        .and(header("X-Token", "abc"))
        .and(header("X-App-Id", "shop-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"offers": []})))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("abc");
    env.write_config("auth_header = \"X-Token\"\n");
    env.cmd_at(&endpoint(&server))
        .env("INSTAMOJO_APP_ID", "shop-42")
        .args(["offer", "list"])
        .assert()
        .success();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("X-Auth-Token").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn disallowed_method_never_reaches_server() {
    let server = MockServer::start().await;

    let env = TestEnv::with_token("abc");
    env.write_config("allowed_methods = [\"GET\", \"POST\"]\n");
    env.cmd_at(&endpoint(&server))
        .args(["offer", "delete", "ebook"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#"Unable to make an API call for "DELETE" method"#));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn token_flag_overrides_saved_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/offer"))
        .and(header("X-Auth-Token", "from-flag"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"offers": []})))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("from-file");
    env.cmd_at(&endpoint(&server))
        .args(["--token", "from-flag", "offer", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded from file").not());
}

// --- uploads ---

#[tokio::test(flavor = "multi_thread")]
async fn create_with_file_uploads_then_attaches_reference() {
    let server = MockServer::start().await;
    let upload_url = format!("{}/upload/xyz", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/1/offer/get_file_upload_url/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "upload_url": upload_url})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload/xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"file":"ref-1"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/1/offer/"))
        .and(body_string(
            "title=Ebook&file_upload_json=%7B%22file%22%3A%22ref-1%22%7D",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("abc");
    let file = env.dir.path().join("ebook.pdf");
    std::fs::write(&file, b"%PDF-1.4 test").unwrap();

    env.cmd_at(&endpoint(&server))
        .args(["offer", "create", "--title", "Ebook", "--file"])
        .arg(&file)
        .assert()
        .success();

    let requests = server.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|r| r.url.path() == "/upload/xyz")
        .unwrap();
    let content_type = upload.headers.get("Content-Type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains(r#"name="fileUpload"; filename="ebook.pdf""#));
    assert!(body.contains("%PDF-1.4 test"));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_with_file_fails_when_no_upload_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/offer/get_file_upload_url/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "quota"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::with_token("abc");
    let file = env.dir.path().join("ebook.pdf");
    std::fs::write(&file, b"x").unwrap();

    env.cmd_at(&endpoint(&server))
        .args(["offer", "create", "--title", "Ebook", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to get file upload url"));

    // Only the upload-url request was made; no offer was created
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_url_command_prints_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/offer/get_file_upload_url/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "upload_url": "https://files.test/u"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    let output = env
        .cmd_at(&endpoint(&server))
        .args(["offer", "upload-url"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["upload_url"], "https://files.test/u");
}
