//! Sheet rendering backend trait and shared types.
//!
//! The [`SheetBackend`] trait defines the three operations every backend
//! must support: decode, compose, and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so pipeline logic can be checked
//! without any pixel work.

use super::params::{ComposeParams, EncodeParams};
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode photo: {0}")]
    Decode(String),
    #[error("Failed to encode sheet: {0}")]
    Encode(String),
}

/// Trait for sheet rendering backends.
///
/// `Sync` so a single backend can be shared across rayon workers when a
/// batch renders many sheets at once.
pub trait SheetBackend: Sync {
    /// Decode an encoded photo into an opaque RGB bitmap.
    fn decode(&self, bytes: &[u8]) -> Result<RgbImage, BackendError>;

    /// Draw every placement of `photo` onto a fresh page-sized canvas.
    fn compose(&self, params: &ComposeParams, photo: &RgbImage) -> Result<RgbImage, BackendError>;

    /// Encode a composed sheet into a byte buffer.
    fn encode(&self, sheet: &RgbImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::OutputFormat;
    use std::sync::Mutex;

    /// Mock backend that records operations without drawing anything.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub fail_decode: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode {
            len: usize,
        },
        Compose {
            page: (u32, u32),
            native: (u32, u32),
            cells: usize,
        },
        Encode {
            format: OutputFormat,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_decode() -> Self {
            Self {
                fail_decode: true,
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl SheetBackend for MockBackend {
        fn decode(&self, bytes: &[u8]) -> Result<RgbImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode { len: bytes.len() });
            if self.fail_decode {
                return Err(BackendError::Decode("mock decode failure".to_string()));
            }
            Ok(RgbImage::new(2, 2))
        }

        fn compose(
            &self,
            params: &ComposeParams,
            _photo: &RgbImage,
        ) -> Result<RgbImage, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Compose {
                page: params.page,
                native: params.native,
                cells: params.placements.len(),
            });
            Ok(RgbImage::new(params.page.0, params.page.1))
        }

        fn encode(&self, _sheet: &RgbImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                format: params.format,
                quality: params.quality.value(),
            });
            Ok(b"mock-sheet".to_vec())
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::new();
        backend.decode(&[1, 2, 3]).unwrap();
        assert_eq!(backend.get_operations(), vec![RecordedOp::Decode { len: 3 }]);
    }

    #[test]
    fn mock_can_fail_decode() {
        let backend = MockBackend::failing_decode();
        assert!(matches!(backend.decode(&[0]), Err(BackendError::Decode(_))));
    }

    #[test]
    fn mock_compose_returns_page_sized_canvas() {
        let backend = MockBackend::new();
        let canvas = backend
            .compose(
                &ComposeParams {
                    page: (30, 20),
                    native: (5, 7),
                    placements: Vec::new(),
                    style: Default::default(),
                },
                &RgbImage::new(1, 1),
            )
            .unwrap();
        assert_eq!(canvas.dimensions(), (30, 20));
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Compose { cells: 0, .. }
        ));
    }
}
