//! Resource-carrying segments.
//!
//! Image, audio, voice, video and file segments share one set of fields,
//! [`MediaFields`], embedded in each variant. A resource can be referenced by
//! platform id, by URL, by local path, or carried as raw bytes; exporters
//! resolve them in that priority order through [`MediaFields::resolve`].

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;

use super::Backref;
use crate::error::MediaError;
use crate::sniff::{self, FileInfo};

// ============================================================================
// Media Fields
// ============================================================================

/// Fields shared by every media segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaFields {
    id: Option<String>,
    url: Option<String>,
    path: Option<PathBuf>,
    raw: Option<Bytes>,
    mimetype: Option<String>,
    name: String,
}

/// Where an exporter should take a resource from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceSource<'a> {
    /// Platform id or URL.
    Url(&'a str),
    /// Local file.
    Path(&'a Path),
    /// Attached bytes with a known mime type.
    Raw { data: &'a Bytes, mimetype: String },
}

impl MediaFields {
    /// Creates empty fields with a default file name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            url: None,
            path: None,
            raw: None,
            mimetype: None,
            name: name.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the URL, prefixing `https://` when it has no host part.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(coerce_url(url.into()));
        self
    }

    /// Sets the local path. The file name becomes the resource name.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(file_name) = path.file_name() {
            self.name = file_name.to_string_lossy().into_owned();
        }
        self.path = Some(path);
        self
    }

    pub fn with_raw(mut self, raw: impl Into<Bytes>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    /// Sets the resource name. Ignored when a local path names the resource.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        if self.path.is_none() {
            self.name = name.into();
        }
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Attached bytes, without sniffing.
    pub fn raw(&self) -> Option<&Bytes> {
        self.raw.as_ref()
    }

    pub fn mimetype(&self) -> Option<&str> {
        self.mimetype.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attached bytes.
    ///
    /// The first call on media without a mime type sniffs the content and
    /// records the detected mime type and a `{type}.{extension}` name.
    pub fn raw_bytes(&mut self) -> Result<Bytes, MediaError> {
        let raw = self.raw.clone().ok_or_else(|| MediaError::MissingRaw {
            name: self.name.clone(),
        })?;
        if self.mimetype.is_none() {
            let info = sniff::sniff(&raw);
            if let Some(mime) = info.mimes.first() {
                self.mimetype = Some((*mime).to_owned());
            }
            if let (Some(kind), Some(ext)) = (info.types.first(), info.extensions.first()) {
                self.name = format!("{kind}.{ext}");
            }
        }
        Ok(raw)
    }

    /// Content information of the attached bytes, without recording it.
    pub fn sniff(&self) -> Option<FileInfo> {
        self.raw.as_deref().map(sniff::sniff)
    }

    /// Picks the source an exporter should use.
    ///
    /// Priority is id or URL, then local path, then raw bytes whose mime type
    /// is known or can be sniffed. `None` means nothing usable is attached.
    pub fn resolve(&self) -> Option<ResourceSource<'_>> {
        if let Some(url) = self.id.as_deref().or(self.url.as_deref()) {
            return Some(ResourceSource::Url(url));
        }
        if let Some(path) = &self.path {
            return Some(ResourceSource::Path(path));
        }
        let data = self.raw.as_ref()?;
        let mimetype = match &self.mimetype {
            Some(mimetype) => mimetype.clone(),
            None => (*sniff::sniff(data).mimes.first()?).to_owned(),
        };
        Some(ResourceSource::Raw { data, mimetype })
    }
}

/// Prefixes `https://` to URLs that carry no network location.
fn coerce_url(url: String) -> String {
    if has_host(&url) {
        url
    } else {
        format!("https://{url}")
    }
}

/// Whether `url` has the shape `[scheme:]//host...` with a non-empty host.
fn has_host(url: &str) -> bool {
    let rest = match url.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => url,
    };
    let Some(authority) = rest.strip_prefix("//") else {
        return false;
    };
    let authority = authority.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();
    let host = match host.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next().unwrap_or_default(),
        None => host.split(':').next().unwrap_or_default(),
    };
    !host.is_empty()
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// ============================================================================
// Media Variants
// ============================================================================

macro_rules! media_segment {
    ($(#[$doc:meta])* $name:ident => $default_name:literal $(, $extra:ident: $extra_ty:ty)*) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Serialize)]
        pub struct $name {
            #[serde(flatten)]
            pub media: MediaFields,
            $(pub $extra: Option<$extra_ty>,)*
            #[serde(skip)]
            pub(crate) origin: Backref,
        }

        impl $name {
            /// Name used when nothing else names the resource.
            pub const DEFAULT_NAME: &'static str = $default_name;

            pub fn new(media: MediaFields) -> Self {
                Self {
                    media,
                    $($extra: None,)*
                    origin: Backref::default(),
                }
            }

            pub fn from_id(id: impl Into<String>) -> Self {
                Self::new(MediaFields::new($default_name).with_id(id))
            }

            pub fn from_url(url: impl Into<String>) -> Self {
                Self::new(MediaFields::new($default_name).with_url(url))
            }

            pub fn from_path(path: impl Into<PathBuf>) -> Self {
                Self::new(MediaFields::new($default_name).with_path(path))
            }

            pub fn from_raw(raw: impl Into<Bytes>) -> Self {
                Self::new(MediaFields::new($default_name).with_raw(raw))
            }
        }

        impl Deref for $name {
            type Target = MediaFields;

            fn deref(&self) -> &Self::Target {
                &self.media
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.media
            }
        }
    };
}

media_segment!(
    /// An image.
    Image => "image.png"
);
media_segment!(
    /// A music or sound file.
    Audio => "audio.mp3", duration: u32
);
media_segment!(
    /// A voice message.
    Voice => "voice.wav", duration: u32
);
media_segment!(
    /// A video.
    Video => "video.mp4"
);
media_segment!(
    /// An arbitrary file attachment.
    File => "file.bin"
);

impl Audio {
    /// Sets the duration in seconds.
    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }
}

impl Voice {
    /// Sets the duration in seconds.
    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }
}
