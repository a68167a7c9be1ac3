use crate::error::ResearchError;
use crate::models::CrawlResult;
use crate::tools::firecrawl::CrawlClient;
use tracing::{info, instrument};
use url::form_urlencoded;

const SEARCH_URL_PREFIX: &str = "https://www.google.com/search?q=";

/// Search-engine query URL for `topic`, with the topic form-URL-encoded.
pub fn build_search_url(topic: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(topic.as_bytes()).collect();
    format!("{}{}", SEARCH_URL_PREFIX, encoded)
}

#[instrument(skip(client, api_key))]
pub async fn run(
    client: &dyn CrawlClient,
    api_key: &str,
    topic: &str,
) -> Result<CrawlResult, ResearchError> {
    let url = build_search_url(topic);
    info!("Crawling {}", url);
    let result = client.crawl(api_key, &url).await?;
    info!("Crawl data received");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn decoded_query(url: &str) -> String {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[test]
    fn search_url_round_trips_awkward_topics() {
        let topics = [
            "electric vehicles",
            "R&D budgets?",
            "a=b&c=d",
            "100% renewable #energy",
            "Müller über Straße",
            "電気自動車",
            "  padded  ",
        ];
        for topic in topics {
            let url = build_search_url(topic);
            assert!(url.starts_with("https://www.google.com/search?q="));
            assert_eq!(decoded_query(&url), topic, "topic {topic:?}");
        }
    }

    #[test]
    fn search_url_escapes_reserved_characters() {
        let url = build_search_url("cats & dogs?");
        let query = url.trim_start_matches(SEARCH_URL_PREFIX);
        assert!(!query.contains('&'));
        assert!(!query.contains('?'));
        assert!(!query.contains(' '));
    }
}
