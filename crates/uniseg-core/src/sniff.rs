//! Content sniffing by magic bytes.
//!
//! Only the leading [`HEADER_LEN`] bytes are inspected. Results list every
//! matching signature in table order, so `mimes[0]`, `types[0]` and
//! `extensions[0]` describe the most specific match.

/// Number of leading bytes examined.
pub const HEADER_LEN: usize = 128;

/// What the leading bytes of a payload look like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub mimes: Vec<&'static str>,
    /// Coarse category, e.g. `raster-image` or `audio`.
    pub types: Vec<&'static str>,
    pub extensions: Vec<&'static str>,
}

impl FileInfo {
    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.mimes.is_empty()
    }
}

struct Signature {
    offset: usize,
    magic: &'static [u8],
    /// Second marker that must also be present (e.g. the RIFF sub-format).
    also: Option<(usize, &'static [u8])>,
    kind: &'static str,
    extension: &'static str,
    mime: &'static str,
}

impl Signature {
    const fn at(offset: usize, magic: &'static [u8]) -> Self {
        Self {
            offset,
            magic,
            also: None,
            kind: "",
            extension: "",
            mime: "",
        }
    }

    const fn and(mut self, offset: usize, magic: &'static [u8]) -> Self {
        self.also = Some((offset, magic));
        self
    }

    const fn is(mut self, kind: &'static str, extension: &'static str, mime: &'static str) -> Self {
        self.kind = kind;
        self.extension = extension;
        self.mime = mime;
        self
    }

    fn matches(&self, header: &[u8]) -> bool {
        let found = |offset: usize, magic: &[u8]| {
            header
                .get(offset..offset + magic.len())
                .is_some_and(|window| window == magic)
        };
        found(self.offset, self.magic)
            && self.also.is_none_or(|(offset, magic)| found(offset, magic))
    }
}

const SIGNATURES: &[Signature] = &[
    Signature::at(0, b"\x89PNG\r\n\x1a\n").is("raster-image", "png", "image/png"),
    Signature::at(0, b"\xff\xd8\xff").is("raster-image", "jpg", "image/jpeg"),
    Signature::at(0, b"GIF87a").is("raster-image", "gif", "image/gif"),
    Signature::at(0, b"GIF89a").is("raster-image", "gif", "image/gif"),
    Signature::at(0, b"RIFF")
        .and(8, b"WEBP")
        .is("raster-image", "webp", "image/webp"),
    Signature::at(0, b"BM").is("raster-image", "bmp", "image/bmp"),
    Signature::at(0, b"RIFF")
        .and(8, b"WAVE")
        .is("audio", "wav", "audio/wav"),
    Signature::at(0, b"ID3").is("audio", "mp3", "audio/mpeg"),
    Signature::at(0, b"\xff\xfb").is("audio", "mp3", "audio/mpeg"),
    Signature::at(0, b"OggS").is("audio", "ogg", "audio/ogg"),
    Signature::at(0, b"fLaC").is("audio", "flac", "audio/flac"),
    Signature::at(0, b"#!AMR").is("audio", "amr", "audio/amr"),
    Signature::at(0, b"#!SILK_V3").is("audio", "silk", "audio/silk"),
    Signature::at(1, b"#!SILK_V3").is("audio", "silk", "audio/silk"),
    Signature::at(4, b"ftyp").is("video", "mp4", "video/mp4"),
    Signature::at(0, b"\x1a\x45\xdf\xa3").is("video", "webm", "video/webm"),
    Signature::at(0, b"RIFF")
        .and(8, b"AVI ")
        .is("video", "avi", "video/x-msvideo"),
    Signature::at(0, b"%PDF").is("document", "pdf", "application/pdf"),
    Signature::at(0, b"PK\x03\x04").is("archive", "zip", "application/zip"),
];

/// Identifies a payload from its leading bytes.
pub fn sniff(header: &[u8]) -> FileInfo {
    let header = &header[..header.len().min(HEADER_LEN)];
    let mut info = FileInfo::default();
    for signature in SIGNATURES.iter().filter(|sig| sig.matches(header)) {
        push_unique(&mut info.mimes, signature.mime);
        push_unique(&mut info.types, signature.kind);
        push_unique(&mut info.extensions, signature.extension);
    }
    info
}

fn push_unique(list: &mut Vec<&'static str>, value: &'static str) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_images() {
        let png = sniff(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR");
        assert_eq!(png.mimes, ["image/png"]);
        assert_eq!(png.types, ["raster-image"]);
        assert_eq!(png.extensions, ["png"]);

        assert_eq!(sniff(b"\xff\xd8\xff\xe0").extensions, ["jpg"]);
        assert_eq!(sniff(b"RIFF\0\0\0\0WEBPVP8 ").mimes, ["image/webp"]);
    }

    #[test]
    fn test_sniff_riff_subformats() {
        assert_eq!(sniff(b"RIFF\x24\0\0\0WAVEfmt ").mimes, ["audio/wav"]);
        assert_eq!(sniff(b"RIFF\x24\0\0\0AVI LIST").mimes, ["video/x-msvideo"]);
        assert!(sniff(b"RIFF").is_empty());
    }

    #[test]
    fn test_sniff_av() {
        assert_eq!(sniff(b"\0\0\0\x18ftypmp42").types, ["video"]);
        assert_eq!(sniff(b"ID3\x03\0").extensions, ["mp3"]);
        assert_eq!(sniff(b"\x02#!SILK_V3").extensions, ["silk"]);
    }

    #[test]
    fn test_only_header_is_inspected() {
        let mut payload = vec![0u8; HEADER_LEN];
        payload.extend_from_slice(b"%PDF");
        assert!(sniff(&payload).is_empty());
        assert!(sniff(b"").is_empty());
        assert!(sniff(b"hello").is_empty());
    }
}
