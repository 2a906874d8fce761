use crate::config::{SCRYFALL_BASE_URL, USER_AGENT};
use mtg_common::{
    parse_retry_after, ScryfallCard, ScryfallError, ScryfallErrorBody, ScryfallList, ScryfallSet,
};
use reqwest::blocking::{Client, Response};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use std::time::Duration;

/// Result type alias for Scryfall calls
pub type ScryfallResult<T> = Result<T, ScryfallError>;

/// Blocking Scryfall client. One instance is shared by every lookup of a
/// resolution run so the connection pool is reused.
#[derive(Debug, Clone)]
pub struct ScryfallClient {
    base_url: String,
    http: Client,
    page_delay: Duration,
}

impl ScryfallClient {
    /// Client for the public Scryfall API
    pub fn new() -> ScryfallResult<Self> {
        Self::with_base_url(SCRYFALL_BASE_URL, USER_AGENT)
    }

    /// Client for the given base URL (for testing with mock servers)
    pub fn with_base_url(base_url: &str, user_agent: &str) -> ScryfallResult<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            page_delay: Duration::from_millis(100),
        })
    }

    /// Pause between fetching consecutive result pages
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs a search with `unique=prints` and follows every result page.
    /// A search without matches yields an empty vector.
    pub fn search_prints(&self, query: &str) -> ScryfallResult<Vec<ScryfallCard>> {
        let url = format!("{}/cards/search", self.base_url);
        log::info!("Searching Scryfall: {}", query);

        let first = self
            .http
            .get(&url)
            .query(&[("q", query), ("unique", "prints")])
            .send()?;

        let mut page: ScryfallList<ScryfallCard> = match check_response(first) {
            Ok(response) => response.json()?,
            Err(e) if e.is_not_found() => {
                log::debug!("No Scryfall matches for: {}", query);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut cards = std::mem::take(&mut page.data);
        while page.has_more {
            let Some(next) = page.next_page.take() else {
                break;
            };
            if !self.page_delay.is_zero() {
                std::thread::sleep(self.page_delay);
            }
            log::debug!("Fetching next result page: {}", next);
            let response = check_response(self.http.get(&next).send()?)?;
            page = response.json()?;
            cards.append(&mut page.data);
        }

        log::debug!("Scryfall returned {} printings", cards.len());
        Ok(cards)
    }

    /// Fetches metadata for a single set
    pub fn fetch_set(&self, set_code: &str) -> ScryfallResult<ScryfallSet> {
        let url = format!("{}/sets/{}", self.base_url, set_code.to_lowercase());
        log::info!("Fetching set from Scryfall: {}", url);

        let response = check_response(self.http.get(&url).send()?)?;
        Ok(response.json::<ScryfallSet>()?)
    }

    /// Fetches the full set catalog
    pub fn fetch_sets(&self) -> ScryfallResult<Vec<ScryfallSet>> {
        let url = format!("{}/sets", self.base_url);
        log::info!("Fetching set catalog from Scryfall");

        let response = check_response(self.http.get(&url).send()?)?;
        let list: ScryfallList<ScryfallSet> = response.json()?;
        Ok(list.data)
    }
}

/// Maps non-success responses onto `ScryfallError`
fn check_response(response: Response) -> ScryfallResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let header = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok());
        let retry_after = parse_retry_after(header);
        log::warn!("Scryfall rate limit hit, retry after {:?}", retry_after);
        return Err(ScryfallError::RateLimited { retry_after });
    }

    match response.json::<ScryfallErrorBody>() {
        Ok(body) if body.object == "error" || !body.code.is_empty() => Err(ScryfallError::Api {
            status: status.as_u16(),
            code: body.code,
            details: body.details,
        }),
        _ => Err(ScryfallError::HttpStatus(status)),
    }
}

/// Builds a disjunctive exact-name query: `!"a" OR !"b"`
pub fn exact_name_query<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| {
            let escaped = name.as_ref().replace('\\', "\\\\").replace('"', "\\\"");
            format!("!\"{}\"", escaped)
        })
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[cfg(test)]
#[path = "scryfall_tests.rs"]
mod tests;
