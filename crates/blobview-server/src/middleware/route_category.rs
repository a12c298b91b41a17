//! Route categorization for metrics and logging.

use axum::http::Uri;

/// Route classification for metrics grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCategory {
    /// The viewer page (`/`).
    Viewer,
    /// Image content (`/content/*`).
    Content,
    /// Health checks (`/health`).
    Monitors,
    /// Unknown or uncategorized routes.
    Unknown,
}

impl RouteCategory {
    /// Categorizes a route based on its URI path.
    pub fn from_uri(uri: &Uri) -> Self {
        match uri.path() {
            "/" => Self::Viewer,
            "/health" => Self::Monitors,
            path if path.starts_with("/content/") => Self::Content,
            _ => Self::Unknown,
        }
    }

    /// Returns the string representation for logging and metrics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Content => "content",
            Self::Monitors => "monitors",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizes_routes() {
        let cases = [
            ("/", RouteCategory::Viewer),
            ("/content/cats/a.png", RouteCategory::Content),
            ("/health", RouteCategory::Monitors),
            ("/favicon.ico", RouteCategory::Unknown),
        ];

        for (path, category) in cases {
            let uri: Uri = path.parse().expect("valid uri");
            assert_eq!(RouteCategory::from_uri(&uri), category);
        }
    }
}
