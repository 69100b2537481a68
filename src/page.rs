use crate::errors::ToggleError;
use crate::models::PageSnapshot;
use reqwest::{Client, Url};
use std::{future::Future, path::PathBuf};
use tokio::fs;
use tracing::debug;

/// Where server-rendered page state comes from, both on first load and on
/// a forced reload.
pub trait PageSource: Send + Sync + 'static {
    fn load(&self) -> impl Future<Output = Result<PageSnapshot, ToggleError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct StaticPage(pub PageSnapshot);

impl PageSource for StaticPage {
    async fn load(&self) -> Result<PageSnapshot, ToggleError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone)]
pub struct JsonFilePage {
    pub path: PathBuf,
}

impl JsonFilePage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageSource for JsonFilePage {
    async fn load(&self) -> Result<PageSnapshot, ToggleError> {
        let bytes = fs::read(&self.path).await?;
        let snapshot = serde_json::from_slice(&bytes)?;
        debug!("loaded page snapshot from {}", self.path.display());
        Ok(snapshot)
    }
}

/// Fetches the snapshot from the server that renders the page.
#[derive(Debug, Clone)]
pub struct HttpPage {
    client: Client,
    url: Url,
}

impl HttpPage {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

impl PageSource for HttpPage {
    async fn load(&self) -> Result<PageSnapshot, ToggleError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToggleError::Status(status));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToggleMode;

    #[tokio::test]
    async fn file_page_reads_snapshot() {
        let mut path = std::env::temp_dir();
        path.push(format!("like_toggle_page_{}.json", std::process::id()));
        fs::write(
            &path,
            br#"{"elements":[{"id":"3","action":"unlike","url":"/posts/like/"}],"total":"8"}"#,
        )
        .await
        .unwrap();

        let snapshot = JsonFilePage::new(&path).load().await.unwrap();
        assert_eq!(snapshot.elements[0].action, ToggleMode::Unlike);
        assert_eq!(snapshot.elements[0].url.as_deref(), Some("/posts/like/"));
        assert_eq!(snapshot.total.as_deref(), Some("8"));
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let page = JsonFilePage::new("/nonexistent/like_toggle/page.json");
        assert!(matches!(page.load().await, Err(ToggleError::Io(_))));
    }
}
