/*
 *  news.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  News feed client. Two configured sources, each either the provider's
 *  news-item XML (items carry `longTitle`) or a generic RSS channel;
 *  headlines are folded into one ticker line stamped with the minute
 *  about to begin.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::info;
use reqwest::{header, Client};
use std::time::Duration;
use thiserror::Error;

use crate::config::{Config, FeedSchema, NewsSourceSpec};
use crate::constants::{HEADLINE_SEPARATOR, NEWS_ITEM_LIMIT};
use crate::tick::Tick;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no headlines in feed from {0}")]
    EmptyFeed(String),
}

/// Which configured source is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsSlot {
    A,
    B,
}

impl NewsSlot {
    fn other(self) -> Self {
        match self {
            NewsSlot::A => NewsSlot::B,
            NewsSlot::B => NewsSlot::A,
        }
    }
}

pub struct NewsClient {
    client: Client,
    source_a: NewsSourceSpec,
    source_b: NewsSourceSpec,
    active: NewsSlot,
    alternate: bool,
    /// The assembled ticker line; empty until the first good update.
    pub titles: String,
}

impl NewsClient {
    pub fn new(cfg: &Config) -> Result<Self, NewsError> {
        const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        let client = Client::builder()
            .connect_timeout(Duration::from_millis(cfg.timeout_ms / 2))
            .default_headers(headers)
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;

        Ok(NewsClient {
            client,
            source_a: cfg.news.source_a.clone(),
            source_b: cfg.news.source_b.clone(),
            active: NewsSlot::A,
            alternate: cfg.news.alternate,
            titles: String::new(),
        })
    }

    pub fn source(&self) -> &NewsSourceSpec {
        match self.active {
            NewsSlot::A => &self.source_a,
            NewsSlot::B => &self.source_b,
        }
    }

    pub fn active_slot(&self) -> NewsSlot {
        self.active
    }

    pub fn select(&mut self, slot: NewsSlot) {
        self.active = slot;
        info!("News source set to {}", self.source().name);
    }

    /// Fetch the active feed and rebuild the ticker line. On success,
    /// optionally rotates to the other source for next time.
    pub async fn refresh(&mut self, tick: &Tick) -> Result<(), NewsError> {
        info!("Fetching news from {}...", self.source().name);
        let body = self
            .client
            .get(&self.source().url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        self.apply_feed(&body, tick)?;
        if self.alternate {
            self.active = self.active.other();
        }
        Ok(())
    }

    /// Parse a feed body into the ticker line. Split from `refresh` so
    /// feeds are exercised without the network.
    pub fn apply_feed(&mut self, body: &str, tick: &Tick) -> Result<(), NewsError> {
        let schema = self.source().schema;
        let name = self.source().name.clone();
        let items = extract_titles(schema, body, NEWS_ITEM_LIMIT);
        if items.is_empty() {
            return Err(NewsError::EmptyFeed(name));
        }

        let mut line = format!(
            "{} {} {}",
            name,
            rounded_up_hhmm(tick),
            HEADLINE_SEPARATOR.trim_start()
        );
        for title in &items {
            line.push_str(title);
            line.push_str(HEADLINE_SEPARATOR);
        }
        self.titles = line;
        info!("News updated: {} headlines from {}", items.len(), name);
        Ok(())
    }
}

/// The headline stamp is the minute about to begin: updates fire late
/// in the minute preceding the show window.
fn rounded_up_hhmm(tick: &Tick) -> String {
    let mut h = tick.hour;
    let m = (tick.minute + 1) % 60;
    if tick.minute == 59 {
        h = (h + 1) % 24;
    }
    format!("{:02}:{:02}", h, m)
}

/// Pull item titles out of a feed body. The provider schema takes every
/// `longTitle` element; RSS takes the first `title` inside each `item`
/// block (skipping the channel's own title).
fn extract_titles(schema: FeedSchema, body: &str, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    match schema {
        FeedSchema::Provider => {
            let mut rest = body;
            while out.len() < limit {
                let Some(title) = next_element(&mut rest, "longTitle") else { break };
                if !title.is_empty() {
                    out.push(title);
                }
            }
        }
        FeedSchema::Rss => {
            let mut rest = body;
            while out.len() < limit {
                let Some(item) = next_element(&mut rest, "item") else { break };
                let mut inner = item.as_str();
                if let Some(title) = next_element(&mut inner, "title") {
                    if !title.is_empty() {
                        out.push(title);
                    }
                }
            }
        }
    }
    out
}

/// Advance past the next `<tag>...</tag>` pair in `rest`, returning the
/// unescaped inner text. CDATA wrappers are unwrapped.
fn next_element<'a>(rest: &mut &'a str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let src: &'a str = *rest;
    let start = src.find(&open)? + open.len();
    let end = src[start..].find(&close)? + start;
    let inner = &src[start..end];
    *rest = &src[end + close.len()..];

    let inner = inner.trim();
    let inner = inner
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
        .unwrap_or(inner);
    Some(unescape(inner.trim()))
}

fn unescape(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Example News</title>
  <item><title>First headline</title><link>x</link></item>
  <item><title><![CDATA[Second &amp; third]]></title></item>
  <item><title>Last one</title></item>
</channel></rss>"#;

    const PROVIDER: &str = r#"<page><items>
  <news><longTitle>Breaking: something happened</longTitle></news>
  <news><longTitle>Markets &amp; weather</longTitle></news>
</items></page>"#;

    #[test]
    fn test_rss_titles_skip_channel_title() {
        let titles = extract_titles(FeedSchema::Rss, RSS, 5);
        assert_eq!(
            titles,
            vec!["First headline", "Second & third", "Last one"]
        );
    }

    #[test]
    fn test_provider_titles() {
        let titles = extract_titles(FeedSchema::Provider, PROVIDER, 5);
        assert_eq!(titles, vec!["Breaking: something happened", "Markets & weather"]);
    }

    #[test]
    fn test_item_limit_respected() {
        let titles = extract_titles(FeedSchema::Rss, RSS, 2);
        assert_eq!(titles.len(), 2);
    }

    #[test]
    fn test_headline_stamp_rounds_up() {
        assert_eq!(rounded_up_hhmm(&Tick::from_hms(10, 4, 50)), "10:05");
        assert_eq!(rounded_up_hhmm(&Tick::from_hms(10, 59, 50)), "11:00");
        assert_eq!(rounded_up_hhmm(&Tick::from_hms(23, 59, 50)), "00:00");
    }

    #[test]
    fn test_apply_feed_builds_ticker_line() {
        let mut cfg = Config::default();
        cfg.news.source_b.schema = FeedSchema::Rss;
        let mut client = NewsClient::new(&cfg).unwrap();
        client.select(NewsSlot::B);
        client.apply_feed(RSS, &Tick::from_hms(9, 4, 50)).unwrap();
        assert!(client.titles.starts_with("BBC 09:05"));
        assert!(client.titles.contains("First headline"));
        assert!(client.titles.contains(HEADLINE_SEPARATOR.trim()));
    }

    #[test]
    fn test_empty_feed_is_an_error() {
        let cfg = Config::default();
        let mut client = NewsClient::new(&cfg).unwrap();
        let err = client
            .apply_feed("<page></page>", &Tick::from_hms(9, 0, 0))
            .unwrap_err();
        assert!(matches!(err, NewsError::EmptyFeed(_)));
    }
}
