use thiserror::Error;

/// Failure to hand a URL to the desktop
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("don't know how to open a browser on platform '{0}'")]
    Unsupported(String),

    #[error("failed to open browser: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
}

/// Opens a URL for the user. Failures are recoverable: the caller prints the
/// URL instead.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> Result<(), LaunchError>;
}

/// Opens URLs in the user's default browser
#[derive(Debug, Clone, Copy)]
pub struct SystemBrowser {
    platform: &'static str,
}

impl SystemBrowser {
    pub fn for_platform(platform: &'static str) -> Self {
        Self { platform }
    }
}

impl Default for SystemBrowser {
    fn default() -> Self {
        Self::for_platform(std::env::consts::OS)
    }
}

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<(), LaunchError> {
        if !is_supported_platform(self.platform) {
            return Err(LaunchError::Unsupported(self.platform.to_string()));
        }

        webbrowser::open(url).map_err(|source| LaunchError::Spawn { source })
    }
}

/// Whether a default browser can be opened on `platform` (as in `std::env::consts::OS`)
pub fn is_supported_platform(platform: &str) -> bool {
    matches!(
        platform,
        "linux"
            | "freebsd"
            | "openbsd"
            | "netbsd"
            | "dragonfly"
            | "macos"
            | "windows"
            | "android"
            | "ios"
            | "haiku"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://accounts.example.com/auth?client_id=abc";

    #[test]
    fn desktop_platforms_are_supported() {
        for platform in ["linux", "macos", "windows", "freebsd"] {
            assert!(is_supported_platform(platform), "{platform}");
        }
    }

    #[test]
    fn unknown_platform_is_not_supported() {
        assert!(!is_supported_platform("plan9"));
        assert!(!is_supported_platform(""));
    }

    #[test]
    fn unsupported_platform_fails_without_launching() {
        let err = SystemBrowser::for_platform("plan9").open(URL).unwrap_err();
        assert!(matches!(err, LaunchError::Unsupported(p) if p == "plan9"));
    }
}
