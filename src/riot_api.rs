use crate::collect::MatchSource;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};
use std::thread::sleep;
use std::time::{Duration, Instant};

const DEFAULT_MAX_REQS_PER_2MIN: usize = 80;
const DEFAULT_MAX_REQS_PER_SEC: usize = 20;
const MATCH_ID_PAGE_SIZE: usize = 100;
static GLOBAL_RATE_LIMITER: OnceLock<Mutex<RateLimiter>> = OnceLock::new();

/// Failure classes for Riot API requests. Rate-limit exhaustion is kept
/// distinct from permanent failures so callers can tell "retry later"
/// from "this match is gone".
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("rate limit exhausted for {url}")]
    RateLimited { url: String },
    #[error("request to {url} failed with status {status}")]
    Status { status: StatusCode, url: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid API key")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
}

#[derive(Deserialize)]
struct AccountResponse {
    puuid: String,
}

fn build_headers(api_key: &str) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert("X-Riot-Token", HeaderValue::from_str(api_key)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}

pub struct RiotClient {
    client: Client,
    headers: HeaderMap,
    base_url: String,
}

impl RiotClient {
    pub fn new(api_key: &str, region_routing: &str) -> Result<Self, FetchError> {
        global_rate_limiter();

        Ok(Self {
            client: Client::new(),
            headers: build_headers(api_key)?,
            base_url: format!("https://{}.api.riotgames.com", region_routing),
        })
    }

    pub fn new_with_max(
        api_key: &str,
        region_routing: &str,
        max_reqs_per_2min: usize,
    ) -> Result<Self, FetchError> {
        {
            let limiter = global_rate_limiter();
            let mut guard = limiter
                .lock()
                .expect("Rate limiter mutex poisoned while setting max");
            guard.set_max_reqs_per_2min(max_reqs_per_2min);
        }

        Self::new(api_key, region_routing)
    }

    pub fn resolve_puuid(&self, game_name: &str, tag_line: &str) -> Result<String, FetchError> {
        let url = format!(
            "{}/riot/account/v1/accounts/by-riot-id/{}/{}",
            self.base_url, game_name, tag_line
        );

        let account: AccountResponse = self.get_json(&url)?;
        Ok(account.puuid)
    }

    /// Lists up to `count` recent match IDs, newest first, paging through
    /// the API in batches of 100. A short final page ends the history and
    /// is not an error.
    pub fn get_match_ids(&self, puuid: &str, count: usize) -> Result<Vec<String>, FetchError> {
        page_match_ids(count, |start, batch_size| {
            let url = format!(
                "{}/lol/match/v5/matches/by-puuid/{}/ids?start={}&count={}",
                self.base_url, puuid, start, batch_size
            );

            self.get_json(&url)
        })
    }

    pub fn get_match_json(&self, match_id: &str) -> Result<Value, FetchError> {
        let url = format!("{}/lol/match/v5/matches/{}", self.base_url, match_id);

        self.get_json(&url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.request_with_retry(url)?;
        Ok(response.json()?)
    }

    fn request_with_retry(&self, url: &str) -> Result<reqwest::blocking::Response, FetchError> {
        const MAX_ATTEMPTS: usize = 3;
        let mut attempt = 0;

        loop {
            attempt += 1;

            wait_global_rate_limit();

            let response = self.client.get(url).headers(self.headers.clone()).send()?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= MAX_ATTEMPTS {
                    return Err(FetchError::RateLimited {
                        url: url.to_string(),
                    });
                }

                if let Some(retry_after) = parse_retry_after(&response) {
                    sleep(retry_after);
                } else {
                    sleep(Duration::from_secs(2 * attempt as u64));
                }

                continue;
            }

            if !response.status().is_success() {
                return Err(FetchError::Status {
                    status: response.status(),
                    url: url.to_string(),
                });
            }

            return Ok(response);
        }
    }
}

impl MatchSource for RiotClient {
    fn list_match_ids(&self, puuid: &str, count: usize) -> Result<Vec<String>, FetchError> {
        self.get_match_ids(puuid, count)
    }

    fn fetch_match(&self, match_id: &str) -> Result<Value, FetchError> {
        self.get_match_json(match_id)
    }
}

pub struct RateLimiter {
    max_reqs_per_2min: usize,
    max_reqs_per_sec: usize,
    timestamps_2min: VecDeque<Instant>,
    timestamps_1s: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_reqs_per_2min: usize, max_reqs_per_sec: usize) -> Self {
        Self {
            max_reqs_per_2min,
            max_reqs_per_sec,
            timestamps_2min: VecDeque::new(),
            timestamps_1s: VecDeque::new(),
        }
    }

    pub fn set_max_reqs_per_2min(&mut self, max_reqs_per_2min: usize) {
        self.max_reqs_per_2min = max_reqs_per_2min;
    }

    pub fn wait(&mut self) {
        loop {
            let now = Instant::now();
            self.prune(now);

            let mut sleep_duration: Option<Duration> = None;

            if self.timestamps_1s.len() >= self.max_reqs_per_sec {
                if let Some(oldest) = self.timestamps_1s.front() {
                    let elapsed = now.duration_since(*oldest);
                    if elapsed < Duration::from_secs(1) {
                        sleep_duration = Some(Duration::from_secs(1) - elapsed);
                    }
                }
            }

            if sleep_duration.is_none() && self.timestamps_2min.len() >= self.max_reqs_per_2min {
                if let Some(oldest) = self.timestamps_2min.front() {
                    let elapsed = now.duration_since(*oldest);
                    if elapsed < Duration::from_secs(120) {
                        sleep_duration = Some(Duration::from_secs(120) - elapsed);
                    }
                }
            }

            if let Some(duration) = sleep_duration {
                sleep(duration);
                continue;
            }

            let timestamp = Instant::now();
            self.timestamps_1s.push_back(timestamp);
            self.timestamps_2min.push_back(timestamp);
            break;
        }
    }

    fn prune(&mut self, now: Instant) {
        while let Some(front) = self.timestamps_1s.front() {
            if now.duration_since(*front) > Duration::from_secs(1) {
                self.timestamps_1s.pop_front();
            } else {
                break;
            }
        }

        while let Some(front) = self.timestamps_2min.front() {
            if now.duration_since(*front) > Duration::from_secs(120) {
                self.timestamps_2min.pop_front();
            } else {
                break;
            }
        }
    }
}

fn global_rate_limiter() -> &'static Mutex<RateLimiter> {
    GLOBAL_RATE_LIMITER.get_or_init(|| {
        Mutex::new(RateLimiter::new(
            DEFAULT_MAX_REQS_PER_2MIN,
            DEFAULT_MAX_REQS_PER_SEC,
        ))
    })
}

fn wait_global_rate_limit() {
    let limiter = global_rate_limiter();
    let mut guard = limiter
        .lock()
        .expect("Rate limiter mutex poisoned while waiting");
    guard.wait();
}

/// Accumulates pages from `fetch_page(start, batch_size)` until `count`
/// IDs are collected or a page comes back empty, then truncates to
/// `count`. Kept free of HTTP so the paging policy is testable.
fn page_match_ids<F>(count: usize, mut fetch_page: F) -> Result<Vec<String>, FetchError>
where
    F: FnMut(usize, usize) -> Result<Vec<String>, FetchError>,
{
    let mut match_ids: Vec<String> = Vec::new();
    let mut start = 0;

    while match_ids.len() < count {
        let batch_size = MATCH_ID_PAGE_SIZE.min(count - match_ids.len());
        let batch = fetch_page(start, batch_size)?;
        if batch.is_empty() {
            break;
        }

        start += batch.len();
        match_ids.extend(batch);
    }

    match_ids.truncate(count);
    Ok(match_ids)
}

fn parse_retry_after(response: &reqwest::blocking::Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
