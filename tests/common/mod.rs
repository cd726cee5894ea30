#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use postgrab::{
    Resolver, ResolverSettings,
    error::FetchError,
    fetch::{Headers, PageFetcher},
};

/// In-memory `PageFetcher`: a map of URL -> body, recording every request.
/// Unknown URLs answer 404.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    pages: Arc<HashMap<String, String>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn new<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageFetcher for FakeFetcher {
    async fn fetch(
        &self,
        url: &str,
        _headers: &Headers,
        _timeout_ms: u64,
    ) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

pub const ORIGIN: &str = "https://example.com";

pub fn settings() -> ResolverSettings {
    ResolverSettings {
        origin: ORIGIN.to_string(),
        ..ResolverSettings::default()
    }
}

pub fn resolver(fetcher: &FakeFetcher) -> Resolver<FakeFetcher> {
    Resolver::new(fetcher.clone(), settings())
}

/// A page that carries no media at all.
pub const LOGIN_WALL: &str =
    "<html><head><title>Login</title></head><body><form>log in</form></body></html>";
