//! Retrieval of raw source documents. Everything here is mechanical: the
//! extractors only ever see the fetched text.

use crate::config::FetchConfig;
use crate::constants::{OFAC_DELTA_URL, OFAC_SOURCE, UN_LIST_PAGE_URL, UN_SOURCE};
use crate::error::{PipelineError, Result};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{info, instrument, warn};

pub struct Fetcher {
    client: reqwest::Client,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;
        Ok(Self {
            client,
            retry_attempts: config.retry_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// Fetches the latest OFAC delta document.
    #[instrument(skip(self))]
    pub async fn fetch_ofac_delta(&self) -> Result<String> {
        info!("Fetching latest sanctions data from OFAC...");
        let body = self.get_text(OFAC_DELTA_URL, OFAC_SOURCE).await?;
        info!("Fetched OFAC delta, {} characters", body.len());
        Ok(body)
    }

    /// Fetches the UN consolidated list: scrape the download page for the
    /// XML link, then download the document itself.
    #[instrument(skip(self))]
    pub async fn fetch_un_consolidated(&self) -> Result<String> {
        info!("Locating UN consolidated list download link...");
        let page = self.get_text(UN_LIST_PAGE_URL, UN_SOURCE).await?;
        let link = find_xml_link(&page).ok_or_else(|| PipelineError::SourceUnavailable {
            source_name: UN_SOURCE.to_string(),
            message: "No XML download link found on the consolidated-list page".to_string(),
        })?;
        let url = absolutize(&link);
        info!("Downloading UN consolidated list from {}", url);
        let body = self.get_text(&url, UN_SOURCE).await?;
        info!("Fetched UN consolidated list, {} bytes", body.len());
        Ok(body)
    }

    /// GET with the configured bounded retry and linear backoff.
    async fn get_text(&self, url: &str, source_name: &str) -> Result<String> {
        let mut last_error = String::new();
        for attempt in 1..=self.retry_attempts {
            match self.client.get(url).send().await {
                Ok(response) => match response.error_for_status() {
                    Ok(response) => match response.text().await {
                        Ok(text) => return Ok(text),
                        Err(e) => last_error = e.to_string(),
                    },
                    Err(e) => last_error = e.to_string(),
                },
                Err(e) => last_error = e.to_string(),
            }
            if attempt < self.retry_attempts {
                warn!(
                    "Fetch attempt {}/{} for {} failed: {}",
                    attempt, self.retry_attempts, url, last_error
                );
                tokio::time::sleep(self.retry_backoff * attempt).await;
            }
        }
        Err(PipelineError::SourceUnavailable {
            source_name: source_name.to_string(),
            message: last_error,
        })
    }
}

/// Finds the consolidated-list XML link in the download page. Tries an
/// href pattern first, then falls back to link text.
fn find_xml_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").unwrap();

    for anchor in document.select(&anchors) {
        let href = anchor.value().attr("href").unwrap_or_default();
        let href_lower = href.to_lowercase();
        if href_lower.contains(".xml")
            && (href_lower.contains("consolidated") || href_lower.contains("sanctions"))
        {
            return Some(href.to_string());
        }
    }

    for anchor in document.select(&anchors) {
        let text = anchor.text().collect::<String>().to_lowercase();
        if text.contains("xml") && (text.contains("format") || text.contains("download")) {
            return Some(anchor.value().attr("href").unwrap_or_default().to_string());
        }
    }

    None
}

fn absolutize(link: &str) -> String {
    if link.starts_with('/') {
        format!("https://main.un.org{link}")
    } else if !link.starts_with("http") {
        format!("{}/{}", UN_LIST_PAGE_URL.trim_end_matches('/'), link)
    } else {
        link.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_link_by_href_pattern() {
        let html = r#"<html><body>
            <a href="/files/other.pdf">PDF</a>
            <a href="/sc/consolidated_list.xml">List</a>
        </body></html>"#;
        assert_eq!(
            find_xml_link(html).as_deref(),
            Some("/sc/consolidated_list.xml")
        );
    }

    #[test]
    fn falls_back_to_link_text() {
        let html = r#"<html><body>
            <a href="/files/list-en">Download XML format</a>
        </body></html>"#;
        assert_eq!(find_xml_link(html).as_deref(), Some("/files/list-en"));
    }

    #[test]
    fn no_link_is_none() {
        assert!(find_xml_link("<html><body><p>nothing</p></body></html>").is_none());
    }

    #[test]
    fn relative_links_are_absolutized() {
        assert_eq!(
            absolutize("/sc/list.xml"),
            "https://main.un.org/sc/list.xml"
        );
        assert_eq!(absolutize("https://x.org/a.xml"), "https://x.org/a.xml");
    }
}
