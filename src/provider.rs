use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Passages bundled into the binary for offline runs.
static SAMPLE_DIR: Dir = include_dir!("assets/samples");

/// Listing URL the original practice-file repository exposes.
const DEFAULT_LISTING_URL: &str =
    "https://api.github.com/repos/atrajit-sarkar/TypingPracticeWebsite/contents/PracticeFiles";

const USER_AGENT: &str = concat!("typr/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("listing request returned status {0}")]
    Status(u16),
    #[error("malformed listing: {0}")]
    Listing(#[from] serde_json::Error),
    #[error("no .txt samples found")]
    NoSamples,
    #[error("sample text was empty")]
    EmptySample,
}

/// The single capability the session core needs from the outside world.
pub trait TextProvider {
    fn fetch_sample_text(&self) -> Result<String, FetchError>;
}

/// Collapse all whitespace runs (including newlines) to single spaces.
/// Terminal input has no newline key distinct from submit, so reference
/// texts must be a single line to be typeable.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Deserialize)]
struct DirEntry {
    name: String,
    download_url: Option<String>,
}

fn parse_listing(body: &str) -> Result<Vec<DirEntry>, FetchError> {
    Ok(serde_json::from_str(body)?)
}

fn pick_txt_entry(entries: Vec<DirEntry>) -> Result<DirEntry, FetchError> {
    let mut candidates: Vec<DirEntry> = entries
        .into_iter()
        .filter(|e| e.name.ends_with(".txt") && e.download_url.is_some())
        .collect();

    if candidates.is_empty() {
        return Err(FetchError::NoSamples);
    }

    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..candidates.len());
    Ok(candidates.swap_remove(idx))
}

fn non_empty(text: String) -> Result<String, FetchError> {
    if text.is_empty() {
        Err(FetchError::EmptySample)
    } else {
        Ok(text)
    }
}

/// Fetches a random `.txt` file from a GitHub directory listing, the way
/// the practice-file repository publishes its passages.
pub struct GithubDirProvider {
    listing_url: String,
    client: reqwest::blocking::Client,
}

impl GithubDirProvider {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_listing_url(DEFAULT_LISTING_URL)
    }

    pub fn with_listing_url(listing_url: &str) -> Result<Self, FetchError> {
        // The GitHub API rejects requests without a User-Agent.
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            listing_url: listing_url.to_string(),
            client,
        })
    }
}

impl TextProvider for GithubDirProvider {
    fn fetch_sample_text(&self) -> Result<String, FetchError> {
        let resp = self.client.get(&self.listing_url).send()?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        let entries = parse_listing(&resp.text()?)?;
        debug!(candidates = entries.len(), "fetched sample listing");
        let entry = pick_txt_entry(entries)?;
        debug!(sample = %entry.name, "selected sample");

        let url = entry.download_url.ok_or(FetchError::NoSamples)?;
        let resp = self.client.get(&url).send()?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        non_empty(normalize(&resp.text()?))
    }
}

/// Serves one of the passages embedded at build time. Same contract as the
/// remote provider, no network.
pub struct BundledProvider;

impl TextProvider for BundledProvider {
    fn fetch_sample_text(&self) -> Result<String, FetchError> {
        let candidates: Vec<_> = SAMPLE_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|e| e == "txt"))
            .collect();

        let file = candidates
            .choose(&mut rand::thread_rng())
            .ok_or(FetchError::NoSamples)?;
        let text = file.contents_utf8().ok_or(FetchError::EmptySample)?;
        non_empty(normalize(text))
    }
}

/// Wraps a caller-supplied reference text (`--text` flag, tests).
pub struct FixedTextProvider(pub String);

impl TextProvider for FixedTextProvider {
    fn fetch_sample_text(&self) -> Result<String, FetchError> {
        non_empty(normalize(&self.0))
    }
}
