//! Saved model files and the two capabilities the filter report needs from a
//! model: its first two weight matrices, and a way to view first layer
//! weights as images.
//!
//! A model file is a flat sequence of native-endian words:
//!
//! ```text
//! FileHeader  { magic, version, view_rows, view_cols, view_channels, layer_count }
//! layer_count x ( LayerHeader { rows, cols }, rows * cols f32 row-major )
//! ```

use std::fs;
use std::mem;
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use log::debug;

use crate::error::{Error, Result};
use crate::matrix::Matrix;

pub const MAGIC: u32 = 0x5744_4244;
pub const VERSION: u32 = 1;

/// Yields the weights between the visible layer and the first hidden layer
/// (`W1`, D x N1) and between the first and second hidden layers (`W2`,
/// N1 x N2).
pub trait WeightProvider {
    fn weights(&self) -> Result<(Matrix, Matrix)>;
}

/// Maps a matrix with one row per first layer unit to one image per row.
pub trait ImageProjector {
    fn weights_view(&self, weights: &Matrix) -> Result<ImageStack>;
}

/// A stack of `len` images, each `rows x cols x channels`, stored contiguously.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageStack {
    len: usize,
    rows: usize,
    cols: usize,
    channels: usize,
    pixels: Vec<f32>,
}

impl ImageStack {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn image_shape(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.channels)
    }

    pub fn is_color(&self) -> bool {
        self.channels == 3
    }

    /// Pixels of image `idx` in row, column, channel order.
    pub fn image(&self, idx: usize) -> &[f32] {
        let size = self.rows * self.cols * self.channels;
        &self.pixels[idx * size..(idx + 1) * size]
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct ViewGeometry {
    pub rows: u32,
    pub cols: u32,
    pub channels: u32,
}

impl ViewGeometry {
    pub fn size(&self) -> usize {
        self.rows as usize * self.cols as usize * self.channels as usize
    }
}

impl ImageProjector for ViewGeometry {
    fn weights_view(&self, weights: &Matrix) -> Result<ImageStack> {
        if self.size() != weights.cols() {
            return Err(Error::ViewMismatch {
                rows: self.rows as usize,
                cols: self.cols as usize,
                channels: self.channels as usize,
                expected: self.size(),
                actual: weights.cols(),
            });
        }

        Ok(ImageStack {
            len: weights.rows(),
            rows: self.rows as usize,
            cols: self.cols as usize,
            channels: self.channels as usize,
            pixels: weights.as_slice().to_vec(),
        })
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct FileHeader {
    magic: u32,
    version: u32,
    view: ViewGeometry,
    layer_count: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct LayerHeader {
    rows: u32,
    cols: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SavedModel {
    pub view: ViewGeometry,
    pub hidden_layers: Vec<Matrix>,
}

impl SavedModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::io(path.display().to_string(), e))?;

        debug!("read {} bytes from {}", bytes.len(), path.display());

        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader { bytes, offset: 0 };

        let header: FileHeader = reader.read_pod("file header")?;

        if header.magic != MAGIC {
            return Err(Error::Format(format!("bad magic {:#010x}", header.magic)));
        }

        if header.version != VERSION {
            return Err(Error::Format(format!(
                "unsupported version {}",
                header.version
            )));
        }

        let mut hidden_layers = Vec::new();

        for idx in 0..header.layer_count {
            let layer: LayerHeader = reader.read_pod("layer header")?;
            let (rows, cols) = (layer.rows as usize, layer.cols as usize);

            if rows == 0 || cols == 0 {
                return Err(Error::Format(format!("layer {idx} has shape ({rows}, {cols})")));
            }

            let len = rows
                .checked_mul(cols)
                .and_then(|n| n.checked_mul(mem::size_of::<f32>()))
                .ok_or_else(|| Error::Format(format!("layer {idx} is too large")))?;
            let raw = reader.take(len, "layer weights")?;
            let data: Vec<f32> = bytemuck::pod_collect_to_vec(raw);

            hidden_layers.push(Matrix::from_raw(rows, cols, data).ok_or_else(|| {
                Error::Format(format!("layer {idx} has the wrong number of weights"))
            })?);
        }

        if reader.offset != bytes.len() {
            return Err(Error::Format(format!(
                "{} trailing bytes",
                bytes.len() - reader.offset
            )));
        }

        Ok(Self {
            view: header.view,
            hidden_layers,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header = FileHeader {
            magic: MAGIC,
            version: VERSION,
            view: self.view,
            layer_count: self.hidden_layers.len() as u32,
        };

        let mut bytes = bytemuck::bytes_of(&header).to_vec();

        for layer in &self.hidden_layers {
            let (rows, cols) = layer.shape();
            let layer_header = LayerHeader {
                rows: rows as u32,
                cols: cols as u32,
            };
            bytes.extend_from_slice(bytemuck::bytes_of(&layer_header));
            bytes.extend_from_slice(bytemuck::cast_slice(layer.as_slice()));
        }

        bytes
    }

    pub fn write_to_bin<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes()).map_err(|e| Error::io(path.display().to_string(), e))
    }
}

impl WeightProvider for SavedModel {
    fn weights(&self) -> Result<(Matrix, Matrix)> {
        let [w1, w2, ..] = self.hidden_layers.as_slice() else {
            return Err(Error::TooFewLayers {
                found: self.hidden_layers.len(),
            });
        };

        if w1.cols() != w2.rows() {
            return Err(Error::ShapeMismatch {
                left_name: "W1",
                left: w1.shape(),
                right_name: "W2",
                right: w2.shape(),
            });
        }

        Ok((w1.clone(), w2.clone()))
    }
}

impl ImageProjector for SavedModel {
    fn weights_view(&self, weights: &Matrix) -> Result<ImageStack> {
        self.view.weights_view(weights)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| Error::Format(format!("truncated {what} at byte {}", self.offset)))?;

        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_pod<T: Pod>(&mut self, what: &str) -> Result<T> {
        let raw = self.take(mem::size_of::<T>(), what)?;
        Ok(bytemuck::pod_read_unaligned(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: ViewGeometry = ViewGeometry {
        rows: 2,
        cols: 2,
        channels: 1,
    };

    fn model() -> SavedModel {
        SavedModel {
            view: VIEW,
            hidden_layers: vec![
                Matrix::from_fn(4, 3, |i, j| (i * 3 + j) as f32),
                Matrix::from_rows(&[[1.0, 0.0], [0.0, 2.0], [0.5, 0.0]]),
            ],
        }
    }

    #[test]
    fn test_load_written_file() {
        let path = std::env::temp_dir().join(format!("dbm-filters-{}.bin", std::process::id()));

        model().write_to_bin(&path).unwrap();
        let loaded = SavedModel::load(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.unwrap(), model());
    }

    #[test]
    fn test_rejects_truncated_file() {
        let bytes = model().to_bytes();

        let err = SavedModel::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();

        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_rejects_trailing_bytes_and_bad_magic() {
        let mut bytes = model().to_bytes();
        bytes.push(0);
        assert!(matches!(SavedModel::from_bytes(&bytes), Err(Error::Format(_))));

        let mut bytes = model().to_bytes();
        bytes[0] ^= 0xff;
        assert!(matches!(SavedModel::from_bytes(&bytes), Err(Error::Format(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SavedModel::load("/nonexistent/dbm-filters/model.bin").unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_weights_need_two_layers() {
        let mut m = model();
        m.hidden_layers.truncate(1);

        assert!(matches!(m.weights(), Err(Error::TooFewLayers { found: 1 })));
    }

    #[test]
    fn test_weights_shape_mismatch() {
        let mut m = model();
        m.hidden_layers[1] = Matrix::zeroed(5, 2);

        let err = m.weights().unwrap_err();

        assert_eq!(err.to_string(), "cannot multiply W1 (4, 3) by W2 (5, 2)");
    }

    #[test]
    fn test_weights_view() {
        let m = model();
        let (w1, _) = m.weights().unwrap();

        let imgs = m.weights_view(&w1.transpose()).unwrap();

        assert_eq!(imgs.len(), 3);
        assert_eq!(imgs.image_shape(), (2, 2, 1));
        assert_eq!(imgs.image(1), &[1.0, 4.0, 7.0, 10.0]);
        assert!(!imgs.is_color());
    }

    #[test]
    fn test_weights_view_size_mismatch() {
        let geometry = ViewGeometry {
            rows: 3,
            cols: 3,
            channels: 1,
        };

        let err = geometry.weights_view(&Matrix::zeroed(2, 4)).unwrap_err();

        assert!(matches!(
            err,
            Error::ViewMismatch {
                expected: 9,
                actual: 4,
                ..
            }
        ));
    }
}
