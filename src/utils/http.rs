use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, ClientBuilder,
};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "TubeBrief/1.0";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn create_telegram_client() -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .user_agent(DEFAULT_USER_AGENT);

    build_client(builder)
}

/// The watch page only embeds caption tracks for browser-looking requests.
pub fn create_transcript_client() -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    // Skips the EU consent interstitial.
    headers.insert(header::COOKIE, HeaderValue::from_static("CONSENT=YES+1"));

    let builder = Client::builder()
        .timeout(Duration::from_secs(20))
        .connect_timeout(Duration::from_secs(10))
        .default_headers(headers)
        .user_agent(BROWSER_USER_AGENT);

    build_client(builder)
}

pub fn create_generation_client() -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(DEFAULT_USER_AGENT);

    build_client(builder)
}

fn build_client(builder: ClientBuilder) -> Result<Client, reqwest::Error> {
    let client = builder.build()?;
    debug!("HTTP client built");
    Ok(client)
}
