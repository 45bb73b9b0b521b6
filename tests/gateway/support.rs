use eventdesk::config::Config;
use eventdesk::gateway::run_gateway_with_listener;
use std::time::Duration;

pub const TEST_TOKEN: &str = "tok-integration";
pub const TEST_API_KEY: &str = "test-gemini-key";

pub struct GatewayTestServer {
    pub port: u16,
    handle: tokio::task::JoinHandle<eventdesk::error::Result<()>>,
}

impl GatewayTestServer {
    /// Start a gateway on an ephemeral port, pointed at `upstream_url` as
    /// the Gemini base URL.
    pub async fn start(upstream_url: &str, api_key: Option<&str>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let mut config = Config::default();
        config.gateway.api_tokens = vec![TEST_TOKEN.to_string()];
        config.generation.base_url = upstream_url.to_string();
        config.generation.api_key = api_key.map(ToOwned::to_owned);

        let handle = tokio::spawn(async move { run_gateway_with_listener(listener, config).await });

        wait_until_gateway_ready(port).await;

        Self { port, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{port}/health");
    for _ in 0..50 {
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("gateway did not become ready on port {port}");
}
