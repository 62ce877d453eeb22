use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Secret shared between the spawned server and tests that craft tokens.
pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_kanban-api"));
        cmd.env("PORT", port.to_string())
            .env("JWT_SECRET", JWT_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/api/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

/// Spawn (or reuse) the shared server. Returns `None` when no database is
/// configured, so tests can skip instead of failing.
pub async fn server() -> Result<Option<&'static TestServer>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

/// A registered user with their bearer token.
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Register a fresh user with a unique email and return their token.
pub async fn register_user(base_url: &str, name: &str) -> Result<TestUser> {
    let client = reqwest::Client::new();
    let email = format!("{}-{}@example.com", name.to_lowercase(), uuid::Uuid::new_v4());

    let res = client
        .post(format!("{}/api/auth/register", base_url))
        .json(&json!({
            "name": name,
            "email": email,
            "password": "Passw0rd"
        }))
        .send()
        .await?;

    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "registration failed: {}",
        res.text().await?
    );

    let body: Value = res.json().await?;
    let id = body["data"]["user"]["id"]
        .as_str()
        .context("missing user id")?
        .to_string();
    let token = body["data"]["token"]
        .as_str()
        .context("missing token")?
        .to_string();

    Ok(TestUser { id, email, token })
}

pub async fn authed_get(base_url: &str, path: &str, token: &str) -> Result<reqwest::Response> {
    Ok(reqwest::Client::new()
        .get(format!("{}{}", base_url, path))
        .bearer_auth(token)
        .send()
        .await?)
}

pub async fn authed_post(
    base_url: &str,
    path: &str,
    token: &str,
    body: &Value,
) -> Result<reqwest::Response> {
    Ok(reqwest::Client::new()
        .post(format!("{}{}", base_url, path))
        .bearer_auth(token)
        .json(body)
        .send()
        .await?)
}

pub async fn authed_put(
    base_url: &str,
    path: &str,
    token: &str,
    body: &Value,
) -> Result<reqwest::Response> {
    Ok(reqwest::Client::new()
        .put(format!("{}{}", base_url, path))
        .bearer_auth(token)
        .json(body)
        .send()
        .await?)
}

pub async fn authed_delete(base_url: &str, path: &str, token: &str) -> Result<reqwest::Response> {
    Ok(reqwest::Client::new()
        .delete(format!("{}{}", base_url, path))
        .bearer_auth(token)
        .send()
        .await?)
}
