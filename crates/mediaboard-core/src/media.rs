//! Media sources and video playback lifetime.

use crate::error::{SceneError, SceneResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Kind of media an item displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Detect kind from a file extension. Only `mp4` is treated as video.
    pub fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("mp4") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    /// Detect kind from a link's trailing extension.
    ///
    /// `data:` URIs dispatch on their MIME type instead. A link with nothing
    /// after its last `.` is rejected.
    pub fn from_link(link: &str) -> SceneResult<Self> {
        let malformed = || SceneError::MalformedLink(link.to_string());

        if let Some(rest) = link.strip_prefix("data:") {
            let mime = rest.split([';', ',']).next().unwrap_or("");
            return if mime.is_empty() {
                Err(malformed())
            } else if mime.eq_ignore_ascii_case("video/mp4") {
                Ok(MediaKind::Video)
            } else {
                Ok(MediaKind::Image)
            };
        }

        // Query and fragment never carry the extension.
        let path = link.split(['?', '#']).next().unwrap_or("");
        match path.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => Ok(Self::from_extension(ext)),
            _ => Err(malformed()),
        }
    }
}

/// The link an item was created from, with its detected kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    pub link: String,
    pub kind: MediaKind,
}

impl MediaSource {
    pub fn parse(link: impl Into<String>) -> SceneResult<Self> {
        let link = link.into();
        let kind = MediaKind::from_link(&link)?;
        Ok(Self { link, kind })
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// Owner side of a video's per-frame refresh loop.
///
/// Held by the item. Dropping it (or calling [`Playback::cancel`]) stops every
/// [`PlaybackToken`] handed out for it.
#[derive(Debug)]
pub struct Playback {
    active: Arc<AtomicBool>,
}

impl Playback {
    pub fn start() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Get an observer the host's frame loop polls each frame.
    pub fn token(&self) -> PlaybackToken {
        PlaybackToken {
            active: Arc::clone(&self.active),
        }
    }

    pub fn cancel(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Observer side of a [`Playback`]. The frame loop exits once it goes inactive.
#[derive(Debug, Clone)]
pub struct PlaybackToken {
    active: Arc<AtomicBool>,
}

impl PlaybackToken {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Host-side values (video elements) kept while their playback is live.
///
/// A single frame loop can serve every entry and stop once the set drains.
#[derive(Debug)]
pub struct PlaybackSet<T> {
    entries: Vec<(PlaybackToken, T)>,
}

impl<T> Default for PlaybackSet<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> PlaybackSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: PlaybackToken, value: T) {
        self.entries.push((token, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the entries whose playback stopped and return their values.
    pub fn prune(&mut self) -> Vec<T> {
        let (live, stopped): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|(token, _)| token.is_active());
        self.entries = live;
        stopped.into_iter().map(|(_, value)| value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(MediaKind::from_extension("mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_extension("MP4"), MediaKind::Video);
        assert_eq!(MediaKind::from_extension("jpg"), MediaKind::Image);
        assert_eq!(MediaKind::from_extension("webm"), MediaKind::Image);
    }

    #[test]
    fn test_kind_from_link() {
        assert_eq!(
            MediaKind::from_link("http://example.com/clip.mp4").unwrap(),
            MediaKind::Video
        );
        assert_eq!(
            MediaKind::from_link("https://example.com/a/photo.jpg").unwrap(),
            MediaKind::Image
        );
        assert_eq!(
            MediaKind::from_link("https://cdn.example.com/clip.mp4?t=30#start").unwrap(),
            MediaKind::Video
        );
    }

    #[test]
    fn test_link_without_extension_is_malformed() {
        for link in ["", "no-extension", "trailing.", "/clip.?x=1"] {
            let err = MediaKind::from_link(link).unwrap_err();
            assert!(matches!(err, SceneError::MalformedLink(ref l) if l == link), "{link}");
        }
    }

    #[test]
    fn test_data_uri_dispatches_on_mime() {
        assert_eq!(
            MediaKind::from_link("data:image/png;base64,iVBORw0KGgo").unwrap(),
            MediaKind::Image
        );
        assert_eq!(
            MediaKind::from_link("data:video/mp4;base64,AAAAIGZ0eXA").unwrap(),
            MediaKind::Video
        );
        assert!(MediaKind::from_link("data:,hello").is_err());
    }

    #[test]
    fn test_playback_cancelled_on_drop() {
        let playback = Playback::start();
        let token = playback.token();
        assert!(token.is_active());
        drop(playback);
        assert!(!token.is_active());
    }

    #[test]
    fn test_playback_cancel() {
        let playback = Playback::start();
        let a = playback.token();
        let b = a.clone();
        playback.cancel();
        assert!(!a.is_active());
        assert!(!b.is_active());
    }

    #[test]
    fn test_playback_set_prunes_stopped() {
        let first = Playback::start();
        let second = Playback::start();
        let mut set = PlaybackSet::new();
        set.insert(first.token(), "first");
        set.insert(second.token(), "second");

        assert!(set.prune().is_empty());
        assert_eq!(set.len(), 2);

        drop(first);
        assert_eq!(set.prune(), vec!["first"]);
        assert_eq!(set.len(), 1);

        second.cancel();
        assert_eq!(set.prune(), vec!["second"]);
        assert!(set.is_empty());
    }
}
