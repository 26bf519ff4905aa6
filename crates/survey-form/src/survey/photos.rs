use std::fmt;

/// Maximum number of photos attached to one survey record.
pub const MAX_PHOTOS: usize = 3;

/// One image picked from the device camera or gallery.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Photo from a camera that did not report a content type.
    pub fn jpeg(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, mime::IMAGE_JPEG.essence_str(), bytes)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Ordered photo sequence capped at [`MAX_PHOTOS`].
///
/// Appends past capacity are dropped silently: earlier photos always win, no
/// deduplication happens and image content is never inspected.
// TODO: enforce a per-photo byte limit once the spreadsheet endpoint publishes one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoAlbum {
    photos: Vec<Photo>,
}

impl PhotoAlbum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends photos in order until the album is full, returning how many
    /// were kept.
    pub fn extend<I>(&mut self, photos: I) -> usize
    where
        I: IntoIterator<Item = Photo>,
    {
        let before = self.photos.len();
        let room = MAX_PHOTOS.saturating_sub(before);
        self.photos.extend(photos.into_iter().take(room));
        self.photos.len() - before
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.photos.len() >= MAX_PHOTOS
    }

    pub fn remaining(&self) -> usize {
        MAX_PHOTOS.saturating_sub(self.photos.len())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Photo> {
        self.photos.iter()
    }

    pub fn as_slice(&self) -> &[Photo] {
        &self.photos
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }
}

impl<'a> IntoIterator for &'a PhotoAlbum {
    type Item = &'a Photo;
    type IntoIter = std::slice::Iter<'a, Photo>;

    fn into_iter(self) -> Self::IntoIter {
        self.photos.iter()
    }
}
