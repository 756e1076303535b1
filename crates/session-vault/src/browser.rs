//! User-agent sniffing.
//!
//! Pure string matching over a user-agent string and the MIME types the
//! host advertises. Rules are checked in order; the first hit wins.

use std::fmt;

use serde::{Deserialize, Serialize};

/// MIME type only 360 Secure Browser registers among Chromium builds.
pub const MIME_360_REMOTING: &str = "application/vnd.chromium.remoting-viewer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrowserKind {
    InternetExplorer,
    Firefox,
    UcBrowser,
    Opera,
    Baidu,
    Sogou,
    QqBrowser,
    Maxthon,
    Browser360,
    Chrome,
    Safari,
}

impl BrowserKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::InternetExplorer => "IE",
            Self::Firefox => "Firefox",
            Self::UcBrowser => "UC",
            Self::Opera => "Opera",
            Self::Baidu => "Baidu",
            Self::Sogou => "Sogou",
            Self::QqBrowser => "QQ",
            Self::Maxthon => "Maxthon",
            Self::Browser360 => "360",
            Self::Chrome => "Chrome",
            Self::Safari => "Safari",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of sniffing a user agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserInfo {
    pub kind: BrowserKind,
    /// Only extracted for Internet Explorer.
    pub version: Option<String>,
}

/// Identify the browser behind `user_agent`.
///
/// `mime_types` is the list of MIME types the host exposes; it only
/// matters for telling 360 apart from Chrome.
pub fn detect<S: AsRef<str>>(user_agent: &str, mime_types: &[S]) -> Option<BrowserInfo> {
    let ua = user_agent.to_lowercase();
    let has = |needle: &str| ua.contains(needle);

    let kind = if has("msie") || has("trident") {
        let version = version_after(&ua, "msie ").or_else(|| version_after(&ua, "rv:"));
        return Some(BrowserInfo {
            kind: BrowserKind::InternetExplorer,
            version,
        });
    } else if has("firefox") {
        BrowserKind::Firefox
    } else if has("ubrowser") {
        BrowserKind::UcBrowser
    } else if has("opera") {
        BrowserKind::Opera
    } else if has("bidubrowser") {
        BrowserKind::Baidu
    } else if has("metasr") {
        BrowserKind::Sogou
    } else if has("tencenttraveler") || has("qqbrowse") {
        BrowserKind::QqBrowser
    } else if has("maxthon") {
        BrowserKind::Maxthon
    } else if has("chrome") {
        if mime_types.iter().any(|m| m.as_ref() == MIME_360_REMOTING) {
            BrowserKind::Browser360
        } else {
            BrowserKind::Chrome
        }
    } else if has("safari") {
        BrowserKind::Safari
    } else {
        return None;
    };

    Some(BrowserInfo {
        kind,
        version: None,
    })
}

/// Return `true` if `user_agent` sniffs as `kind`.
pub fn is_browser<S: AsRef<str>>(user_agent: &str, mime_types: &[S], kind: BrowserKind) -> bool {
    detect(user_agent, mime_types).is_some_and(|info| info.kind == kind)
}

/// The `[0-9.]+` run directly after `marker`, if any.
fn version_after(ua: &str, marker: &str) -> Option<String> {
    let start = ua.find(marker)? + marker.len();
    let version: String = ua[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    (!version.is_empty()).then_some(version)
}
