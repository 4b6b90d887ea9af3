//! Depth-bounded, single-site crawler.
//!
//! Traversal is depth-first over an explicit stack, visiting pages in the same
//! pre-order a recursive crawl would. A failing page only ends its own branch:
//! nothing raised by the fetcher escapes [`Crawler::crawl`]. A page that was
//! redirected off the seed's site is dropped; otherwise it is recorded under
//! the URL it was served from.

pub mod corpus;

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::CrawlConfig;
use crate::fetch::Fetcher;
use crate::text::{extract_links, extract_text};

/// Link targets that are downloads rather than pages.
const BINARY_EXTENSIONS: &[&str] = &[
    ".pdf", ".zip", ".gz", ".tar", ".rar", ".7z", ".jpg", ".jpeg", ".png", ".gif", ".svg",
    ".ico", ".mp4", ".mp3", ".avi", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".nc",
    ".h5", ".hdf", ".hdf5", ".tif", ".tiff", ".exe", ".apk",
];

/// One crawled page: its URL and visible text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub text: String,
}

/// Tunables for one crawler instance.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Default maximum link-hops from the seed.
    pub depth: usize,
    /// Pause between successive fetches.
    pub politeness_delay: Duration,
    /// Pages with less visible text than this are discarded.
    pub min_content_chars: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            depth: 1,
            politeness_delay: Duration::from_millis(500),
            min_content_chars: 50,
        }
    }
}

impl From<&CrawlConfig> for CrawlOptions {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            depth: config.depth,
            politeness_delay: Duration::from_millis(config.politeness_delay_ms),
            min_content_chars: config.min_content_chars,
        }
    }
}

/// Whether `candidate` lives on the same site as `base`.
///
/// Compares scheme, normalized host and effective port, never substrings.
pub fn same_site(candidate: &Url, base: &Url) -> bool {
    candidate.scheme() == base.scheme()
        && candidate.host_str().is_some()
        && candidate.host_str() == base.host_str()
        && candidate.port_or_known_default() == base.port_or_known_default()
}

fn looks_binary(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    BINARY_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Single-site crawler over any [`Fetcher`].
pub struct Crawler<F> {
    fetcher: F,
    options: CrawlOptions,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(fetcher: F, options: CrawlOptions) -> Self {
        Self { fetcher, options }
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Crawl `base_url` up to `depth` hops (or the configured default).
    ///
    /// Returns page records in first-visit order. Every URL is fetched at most
    /// once per call, including pages that fail or turn out too thin.
    pub fn crawl(&self, base_url: &str, depth: Option<usize>) -> Vec<PageRecord> {
        let max_depth = depth.unwrap_or(self.options.depth);
        let mut base = match Url::parse(base_url) {
            Ok(url) => url,
            Err(e) => {
                error!(url = %base_url, error = %e, "invalid base URL, nothing crawled");
                return Vec::new();
            }
        };
        base.set_fragment(None);

        info!(url = %base, depth = max_depth, "starting crawl");

        let mut visited: HashSet<String> = HashSet::new();
        let mut pages = Vec::new();
        let mut frontier = vec![(base.clone(), 0usize)];
        let mut first_fetch = true;

        while let Some((url, depth)) = frontier.pop() {
            if depth > max_depth || !visited.insert(url.as_str().to_string()) {
                continue;
            }

            if !first_fetch && !self.options.politeness_delay.is_zero() {
                std::thread::sleep(self.options.politeness_delay);
            }
            first_fetch = false;

            let page = match self.fetcher.fetch(url.as_str()) {
                Ok(page) => page,
                Err(e) => {
                    warn!(url = %url, depth, error = %e, "failed to crawl page, skipping branch");
                    continue;
                }
            };

            let Ok(mut served) = Url::parse(&page.url) else {
                warn!(url = %url, served = %page.url, "unparsable served URL, skipping page");
                continue;
            };
            served.set_fragment(None);
            if served != url {
                if !same_site(&served, &base) {
                    warn!(url = %url, served = %served, "redirected off-site, skipping page");
                    continue;
                }
                if !visited.insert(served.as_str().to_string()) {
                    debug!(url = %url, served = %served, "redirected to a visited page");
                    continue;
                }
            }
            let html = page.body;

            let text = extract_text(&html);
            let chars = text.trim().chars().count();
            if chars < self.options.min_content_chars {
                warn!(url = %url, chars, "skipping page: insufficient content");
                continue;
            }

            info!(url = %served, depth, chars, "crawled");
            pages.push(PageRecord {
                url: served.as_str().to_string(),
                text,
            });

            if depth == max_depth {
                continue;
            }

            let children: Vec<Url> = extract_links(&html, &served)
                .into_iter()
                .filter(|link| same_site(link, &base))
                .filter(|link| !looks_binary(link))
                .filter(|link| !visited.contains(link.as_str()))
                .collect();

            // Reversed so the first link on the page is explored first.
            for child in children.into_iter().rev() {
                frontier.push((child, depth + 1));
            }
        }

        info!(url = %base, pages = pages.len(), fetched = visited.len(), "crawl finished");
        pages
    }
}

impl<F> std::fmt::Debug for Crawler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::time::Instant;

    use super::*;
    use crate::error::FetchError;
    use crate::fetch::{FetchResult, FetchedPage};

    const FILLER: &str = "The portal distributes satellite observations of the ocean and atmosphere.";

    /// A site served from memory; records every fetched URL and when.
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, Result<String, u16>>,
        redirects: HashMap<String, String>,
        log: RefCell<Vec<String>>,
        times: RefCell<Vec<Instant>>,
    }

    impl FakeSite {
        fn page(mut self, url: &str, links: &[&str]) -> Self {
            let anchors: String = links
                .iter()
                .map(|l| format!("<a href=\"{l}\">link</a>"))
                .collect();
            let html = format!("<html><body><p>{url}: {FILLER}</p>{anchors}</body></html>");
            self.pages.insert(url.to_string(), Ok(html));
            self
        }

        fn raw(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(html.to_string()));
            self
        }

        fn failing(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), Err(status));
            self
        }

        fn redirect(mut self, from: &str, to: &str) -> Self {
            self.redirects.insert(from.to_string(), to.to_string());
            self
        }
    }

    impl Fetcher for &FakeSite {
        fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
            self.log.borrow_mut().push(url.to_string());
            self.times.borrow_mut().push(Instant::now());
            let served = self.redirects.get(url).map_or(url, String::as_str);
            match self.pages.get(served) {
                Some(Ok(html)) => Ok(FetchedPage::direct(served, html.clone())),
                Some(Err(status)) => Err(FetchError::Status {
                    url: url.to_string(),
                    status: *status,
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn quiet() -> CrawlOptions {
        CrawlOptions {
            politeness_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn urls(pages: &[PageRecord]) -> Vec<&str> {
        pages.iter().map(|p| p.url.as_str()).collect()
    }

    #[test]
    fn visits_in_depth_first_order() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/a", "/b"])
            .page("https://portal.test/a", &["/a1"])
            .page("https://portal.test/a1", &[])
            .page("https://portal.test/b", &[]);

        let crawler = Crawler::new(&site, quiet());
        let pages = crawler.crawl("https://portal.test/", Some(2));
        assert_eq!(
            urls(&pages),
            vec![
                "https://portal.test/",
                "https://portal.test/a",
                "https://portal.test/a1",
                "https://portal.test/b",
            ]
        );
    }

    #[test]
    fn depth_bound_is_respected() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/a"])
            .page("https://portal.test/a", &["/a1"])
            .page("https://portal.test/a1", &[]);

        let crawler = Crawler::new(&site, quiet());
        assert_eq!(urls(&crawler.crawl("https://portal.test/", Some(0))), vec!["https://portal.test/"]);
        assert_eq!(crawler.crawl("https://portal.test/", Some(1)).len(), 2);
    }

    #[test]
    fn default_depth_comes_from_options() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/a"])
            .page("https://portal.test/a", &["/a1"])
            .page("https://portal.test/a1", &[]);

        let crawler = Crawler::new(&site, quiet());
        assert_eq!(crawler.crawl("https://portal.test/", None).len(), 2);
    }

    #[test]
    fn never_leaves_the_base_host() {
        let site = FakeSite::default()
            .page(
                "https://portal.test/",
                &[
                    "https://other.test/",
                    "https://portal.test.evil.example/",
                    "http://portal.test/insecure",
                    "/inside",
                ],
            )
            .page("https://portal.test/inside", &[]);

        let crawler = Crawler::new(&site, quiet());
        crawler.crawl("https://portal.test/", Some(3));
        let log = site.log.borrow();
        assert_eq!(*log, vec!["https://portal.test/", "https://portal.test/inside"]);
    }

    #[test]
    fn off_site_redirect_is_dropped() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/r", "/ok"])
            .redirect("https://portal.test/r", "https://other.test/landing")
            .page("https://other.test/landing", &["https://other.test/deeper"])
            .page("https://portal.test/ok", &[]);

        let crawler = Crawler::new(&site, quiet());
        let pages = crawler.crawl("https://portal.test/", Some(2));
        assert_eq!(urls(&pages), vec!["https://portal.test/", "https://portal.test/ok"]);
        assert!(pages.iter().all(|p| !p.text.contains("other.test")));
        assert_eq!(
            *site.log.borrow(),
            vec!["https://portal.test/", "https://portal.test/r", "https://portal.test/ok"]
        );
    }

    #[test]
    fn redirected_page_resolves_links_from_served_url() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/old"])
            .redirect("https://portal.test/old", "https://portal.test/docs/new")
            .page("https://portal.test/docs/new", &["guide"])
            .page("https://portal.test/docs/guide", &[]);

        let crawler = Crawler::new(&site, quiet());
        let pages = crawler.crawl("https://portal.test/", Some(2));
        assert_eq!(
            urls(&pages),
            vec![
                "https://portal.test/",
                "https://portal.test/docs/new",
                "https://portal.test/docs/guide",
            ]
        );
    }

    #[test]
    fn redirect_to_visited_page_is_not_recorded_twice() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/home"])
            .redirect("https://portal.test/home", "https://portal.test/");

        let crawler = Crawler::new(&site, quiet());
        let pages = crawler.crawl("https://portal.test/", Some(2));
        assert_eq!(urls(&pages), vec!["https://portal.test/"]);
    }

    #[test]
    fn politeness_delay_separates_fetches() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/a", "/b"])
            .page("https://portal.test/a", &[])
            .page("https://portal.test/b", &[]);
        let delay = Duration::from_millis(20);

        let crawler = Crawler::new(
            &site,
            CrawlOptions {
                politeness_delay: delay,
                ..Default::default()
            },
        );
        crawler.crawl("https://portal.test/", Some(1));

        let times = site.times.borrow();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= delay);
        }
    }

    #[test]
    fn each_url_is_fetched_once() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/a", "/b"])
            .page("https://portal.test/a", &["/", "/b"])
            .page("https://portal.test/b", &["/a", "/"]);

        let crawler = Crawler::new(&site, quiet());
        let pages = crawler.crawl("https://portal.test/", Some(5));
        assert_eq!(pages.len(), 3);

        let log = site.log.borrow();
        let unique: HashSet<&String> = log.iter().collect();
        assert_eq!(unique.len(), log.len());
    }

    #[test]
    fn failing_page_does_not_abort_crawl() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/broken", "/ok"])
            .failing("https://portal.test/broken", 500)
            .page("https://portal.test/ok", &[]);

        let crawler = Crawler::new(&site, quiet());
        let pages = crawler.crawl("https://portal.test/", Some(1));
        assert_eq!(urls(&pages), vec!["https://portal.test/", "https://portal.test/ok"]);
    }

    #[test]
    fn thin_pages_are_discarded_and_not_followed() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/thin"])
            .raw(
                "https://portal.test/thin",
                "<html><body>Login <a href=\"/hidden\">x</a></body></html>",
            )
            .page("https://portal.test/hidden", &[]);

        let crawler = Crawler::new(&site, quiet());
        let pages = crawler.crawl("https://portal.test/", Some(3));
        assert_eq!(urls(&pages), vec!["https://portal.test/"]);
        assert!(pages.iter().all(|p| p.text.trim().chars().count() >= 50));
        assert!(!site.log.borrow().contains(&"https://portal.test/hidden".to_string()));
    }

    #[test]
    fn binary_links_are_skipped() {
        let site = FakeSite::default()
            .page("https://portal.test/", &["/docs/manual.PDF", "/archive.zip"]);

        let crawler = Crawler::new(&site, quiet());
        crawler.crawl("https://portal.test/", Some(2));
        assert_eq!(site.log.borrow().len(), 1);
    }

    #[test]
    fn invalid_base_url_yields_nothing() {
        let site = FakeSite::default();
        let crawler = Crawler::new(&site, quiet());
        assert!(crawler.crawl("not a url", Some(1)).is_empty());
        assert!(site.log.borrow().is_empty());
    }

    #[test]
    fn same_site_compares_hosts_exactly() {
        let base = Url::parse("https://www.mosdac.gov.in/").unwrap();
        let inside = Url::parse("https://WWW.MOSDAC.GOV.IN/catalog").unwrap();
        let lookalike = Url::parse("https://www.mosdac.gov.in.example.com/").unwrap();
        let port = Url::parse("https://www.mosdac.gov.in:8443/").unwrap();
        assert!(same_site(&inside, &base));
        assert!(!same_site(&lookalike, &base));
        assert!(!same_site(&port, &base));
    }
}
