//! Share targets and the native → web intent → download fallback chain.

use std::fmt;
use std::str::FromStr;

use notepad_core::NoteError;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::platform::Capabilities;

const WHATSAPP_SEND: &str = "https://api.whatsapp.com/send";
const FACEBOOK_SHARER: &str = "https://www.facebook.com/sharer/sharer.php";

/// Where a note is being shared to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareTarget {
    /// WhatsApp.
    WhatsApp,
    /// Facebook.
    Facebook,
    /// Whatever the platform share sheet offers.
    System,
}

impl ShareTarget {
    /// All targets.
    pub const ALL: [Self; 3] = [Self::WhatsApp, Self::Facebook, Self::System];

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WhatsApp => "whatsapp",
            Self::Facebook => "facebook",
            Self::System => "system",
        }
    }

    /// Human-readable name for notices.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::WhatsApp => "WhatsApp",
            Self::Facebook => "Facebook",
            Self::System => "your app",
        }
    }

    /// Whether the target takes image files. Facebook has no file share API.
    #[must_use]
    pub fn accepts_files(self) -> bool {
        !matches!(self, Self::Facebook)
    }

    /// Web intent URL for the target, if it has one.
    ///
    /// Facebook's `u` parameter is only set when `page_url` is given.
    #[must_use]
    pub fn intent_url(self, text: &str, page_url: Option<&str>) -> Option<Url> {
        match self {
            Self::WhatsApp => Url::parse_with_params(WHATSAPP_SEND, &[("text", text)]).ok(),
            Self::Facebook => {
                let mut params = Vec::with_capacity(2);
                if let Some(page) = page_url {
                    params.push(("u", page));
                }
                params.push(("quote", text));
                Url::parse_with_params(FACEBOOK_SHARER, &params).ok()
            }
            Self::System => None,
        }
    }
}

impl fmt::Display for ShareTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareTarget {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whatsapp" => Ok(Self::WhatsApp),
            "facebook" => Ok(Self::Facebook),
            "system" | "native" => Ok(Self::System),
            _ => Err(NoteError::InvalidValue {
                field: "share target",
                value: s.to_string(),
            }),
        }
    }
}

/// What to do when the user dismisses the native share sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelPolicy {
    /// Continue with the next share step.
    #[default]
    FallBack,
    /// End the share silently.
    Stop,
}

/// A step of the share chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharer {
    /// Platform share sheet with the image attached.
    NativeShare,
    /// Open the target's web intent URL.
    WebIntentFallback,
    /// Save the image for the user to attach by hand.
    DownloadFallback,
}

impl Sharer {
    /// Pick the first step the platform supports.
    #[must_use]
    pub fn probe(capabilities: &Capabilities) -> Self {
        if capabilities.native_file_share() {
            Self::NativeShare
        } else if capabilities.url_opener.is_some() {
            Self::WebIntentFallback
        } else {
            Self::DownloadFallback
        }
    }

    /// The step tried after this one fails.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::NativeShare => Some(Self::WebIntentFallback),
            Self::WebIntentFallback => Some(Self::DownloadFallback),
            Self::DownloadFallback => None,
        }
    }

    /// This step and every step after it.
    pub fn chain(self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |step| step.next())
    }

    /// Whether this step can deliver to `target` on this platform.
    #[must_use]
    pub fn applies_to(self, target: ShareTarget, capabilities: &Capabilities) -> bool {
        match self {
            Self::NativeShare => target.accepts_files() && capabilities.native_file_share(),
            Self::WebIntentFallback => {
                capabilities.url_opener.is_some() && target.intent_url("", None).is_some()
            }
            Self::DownloadFallback => true,
        }
    }
}

impl fmt::Display for Sharer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NativeShare => "native share",
            Self::WebIntentFallback => "web intent",
            Self::DownloadFallback => "download",
        };
        f.write_str(name)
    }
}
