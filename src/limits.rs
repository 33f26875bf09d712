use crate::{ImageError, ImageResult};

/// Resource limits applied while decoding.
///
/// A file declares its own dimensions, so without limits a few header bytes
/// can request gigabytes of pixel storage. The decoder checks these limits
/// after reading the headers and before allocating the pixel grid.
///
/// ```
/// use bmp24::Limits;
///
/// let limits = Limits {
///     max_image_width: Some(4096),
///     max_image_height: Some(4096),
///     ..Limits::default()
/// };
/// # let _ = limits;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest accepted width in pixels.
    pub max_image_width: Option<u32>,
    /// Largest accepted height in pixels.
    pub max_image_height: Option<u32>,
    /// Largest accepted pixel grid in bytes.
    pub max_alloc: Option<u64>,
}

impl Default for Limits {
    /// No dimension limits and a 512 MiB allocation cap.
    fn default() -> Limits {
        Limits {
            max_image_width: None,
            max_image_height: None,
            max_alloc: Some(512 * 1024 * 1024),
        }
    }
}

impl Limits {
    /// Disable every check.
    pub fn no_limits() -> Limits {
        Limits {
            max_image_width: None,
            max_image_height: None,
            max_alloc: None,
        }
    }

    pub(crate) fn check_dimensions(&self, width: u32, height: u32) -> ImageResult<()> {
        if let Some(max) = self.max_image_width {
            if width > max {
                return Err(ImageError::LimitError(format!(
                    "width {} exceeds limit {}",
                    width, max
                )));
            }
        }
        if let Some(max) = self.max_image_height {
            if height > max {
                return Err(ImageError::LimitError(format!(
                    "height {} exceeds limit {}",
                    height, max
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn reserve(&self, bytes: u64) -> ImageResult<()> {
        match self.max_alloc {
            Some(max) if bytes > max => Err(ImageError::LimitError(format!(
                "{} bytes of pixel data exceed limit {}",
                bytes, max
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_caps_allocation_only() {
        let limits = Limits::default();
        assert!(limits.check_dimensions(u32::MAX, u32::MAX).is_ok());
        assert!(limits.reserve(512 * 1024 * 1024).is_ok());
        assert!(limits.reserve(512 * 1024 * 1024 + 1).is_err());
    }

    #[test]
    fn dimension_limits() {
        let limits = Limits {
            max_image_width: Some(10),
            max_image_height: Some(20),
            ..Limits::no_limits()
        };
        assert!(limits.check_dimensions(10, 20).is_ok());
        assert!(limits.check_dimensions(11, 1).is_err());
        assert!(limits.check_dimensions(1, 21).is_err());
        assert!(limits.reserve(u64::MAX).is_ok());
    }
}
