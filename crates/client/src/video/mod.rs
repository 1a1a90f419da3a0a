//! Video title annotations for the gallery's embedded players.
//!
//! Annotations are best-effort bookkeeping: a corrupt stored map is
//! replaced rather than reported, and seeding never overwrites an
//! existing entry.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use stagecraft_core::worker::Clock;
use stagecraft_core::{CacheDb, Error};

/// Key the annotation map is stored under.
pub const VIDEO_CACHE_KEY: &str = "stagecraft_video_cache";

/// Videos embedded in the gallery, as (YouTube id, title).
pub const CATALOG: [(&str, &str); 13] = [
    ("0_1LkZHjVBE", "Ennile"),
    ("eborT0V26EM", "Aapki Bahon Me"),
    ("FbgeWJDao3A", "Waiting For You"),
    ("31t3W8RhWqE", "Dhanumasapulariyil"),
    ("eF-2S_Wlnk0", "Maa"),
    ("IYcJgQcWc3c", "Munpe Va"),
    ("D-T6GSqutJg", "Indraneelimayolum"),
    ("JhLubfh7yRQ", "Vaseegara"),
    ("ZNDQrNXaLAQ", "Netru Illatha Matram"),
    ("hUoj3jx8DQc", "Taningle"),
    ("5Og--dlmZ8E", "Dala Sangeetholsavam"),
    ("ySh8du8MwEo", "Goonjthi Dhwani"),
    ("V7ShoMhK_8M", "Kalai Koodam"),
];

static EMBED_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"embed/([^?]+)").expect("valid embed regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAnnotation {
    pub title: String,
    /// Epoch milliseconds when the annotation was first seeded.
    pub timestamp: i64,
    /// Whether a player for this video has been seen on the page.
    pub cached: bool,
}

/// Annotations keyed by video id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoAnnotations(BTreeMap<String, VideoAnnotation>);

impl VideoAnnotations {
    pub async fn load(db: &CacheDb) -> Result<Self, Error> {
        match db.kv_get_json::<Self>(VIDEO_CACHE_KEY).await {
            Ok(found) => Ok(found.unwrap_or_default()),
            Err(Error::CorruptRecord(reason)) => {
                tracing::warn!(key = VIDEO_CACHE_KEY, %reason, "discarding unreadable video annotations");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, db: &CacheDb) -> Result<(), Error> {
        db.kv_set_json(VIDEO_CACHE_KEY, self).await
    }

    /// Add catalog entries that are not yet annotated. Returns how many were added.
    pub fn seed(&mut self, now_millis: i64) -> usize {
        let mut added = 0;
        for (id, title) in CATALOG {
            self.0.entry(id.to_string()).or_insert_with(|| {
                added += 1;
                VideoAnnotation { title: title.to_string(), timestamp: now_millis, cached: false }
            });
        }
        added
    }

    /// Flag the video behind an embed URL as seen. Unknown ids are ignored.
    pub fn mark_embedded(&mut self, embed_url: &str) -> bool {
        let Some(annotation) = extract_video_id(embed_url).and_then(|id| self.0.get_mut(id)) else {
            return false;
        };
        annotation.cached = true;
        true
    }

    pub fn get(&self, id: &str) -> Option<&VideoAnnotation> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Video id from a player URL such as `https://www.youtube.com/embed/<id>?rel=0`.
pub fn extract_video_id(embed_url: &str) -> Option<&str> {
    EMBED_ID
        .captures(embed_url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Load, seed, mark the given embeds, and persist.
pub async fn annotate(db: &CacheDb, clock: &impl Clock, embed_urls: &[String]) -> Result<VideoAnnotations, Error> {
    let mut annotations = VideoAnnotations::load(db).await?;
    let added = annotations.seed(clock.now_millis());

    let marked = embed_urls
        .iter()
        .filter(|url| annotations.mark_embedded(url))
        .count();

    annotations.save(db).await?;
    tracing::debug!(added, marked, total = annotations.len(), "video annotations updated");
    Ok(annotations)
}
