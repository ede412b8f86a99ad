use once_cell::sync::Lazy;
use regex::Regex;

static VIDEO_EMBED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:https?:)?//(?:[a-z0-9-]+\.)*(?:youtube\.com|youtube-nocookie\.com|youtu\.be|vimeo\.com)(?:[/?#:]|$)",
    )
    .expect("video embed pattern is valid")
});

/// True for URLs the browser should embed as a video player.
pub fn is_video_url(url: &str) -> bool {
    VIDEO_EMBED.is_match(url)
}

/// Rewrites image URLs through an optional fetch-style image proxy.
#[derive(Debug, Clone, Default)]
pub struct ImageUrlResolver {
    proxy_base: Option<String>,
}

impl ImageUrlResolver {
    pub fn new(proxy_base: Option<String>) -> Self {
        let proxy_base = proxy_base
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty());
        Self { proxy_base }
    }

    pub fn is_proxied(&self) -> bool {
        self.proxy_base.is_some()
    }

    pub fn resolve(&self, url: &str, width: u32, height: u32) -> String {
        if is_video_url(url) {
            return url.to_string();
        }
        match &self.proxy_base {
            Some(base) => format!("{base}/w_{width},h_{height},c_fill,f_auto,q_auto/{url}"),
            None => url.to_string(),
        }
    }
}
