//! 像素数据到PNG的转换
//!
//! 像素值按全图最小/最大值线性缩放到 0-255 并截断为8位整数，
//! 单通道输出灰度PNG，三通道输出RGB PNG。

use crate::decoder::Document;
use dcmvault_core::{Result, VaultError};
use dicom::core::Tag;
use dicom::dictionary_std::tags;
use dicom::object::mem::InMemElement;
use dicom::pixeldata::image::codecs::png::PngEncoder;
use dicom::pixeldata::image::{ExtendedColorType, ImageEncoder};
use dicom::pixeldata::{
    ConvertOptions, ModalityLutOption, PixelDecoder, PixelRepresentation, PlanarConfiguration,
};
use tracing::{debug, warn};

/// 8位输出的最大值
const MAX_INTENSITY: f64 = 255.0;

/// 二维像素网格，样本按行优先存放，多通道时逐像素交错
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    rows: u32,
    columns: u32,
    channels: u16,
    samples: Vec<f64>,
}

impl PixelGrid {
    pub fn new(rows: u32, columns: u32, channels: u16, samples: Vec<f64>) -> Result<Self> {
        let expected = rows as usize * columns as usize * channels as usize;
        if samples.len() != expected {
            return Err(VaultError::ConversionFailed(format!(
                "pixel grid {}x{}x{} expects {} samples, got {}",
                rows,
                columns,
                channels,
                expected,
                samples.len()
            )));
        }

        Ok(Self {
            rows,
            columns,
            channels,
            samples,
        })
    }

    /// 从文档中取出第一帧的原始像素值（不应用模态LUT）
    pub fn from_document(document: &Document) -> Result<Self> {
        if let Some(element) = document
            .element(tags::FLOAT_PIXEL_DATA)
            .or_else(|| document.element(tags::DOUBLE_FLOAT_PIXEL_DATA))
        {
            return Self::from_float_pixels(document, element);
        }
        if !document.has_pixel_data() {
            return Err(VaultError::NoPixelData);
        }

        let decoded = document
            .object()
            .decode_pixel_data()
            .map_err(|e| VaultError::ConversionFailed(format!("Failed to decode pixel data: {}", e)))?;

        if decoded.number_of_frames() == 0 {
            return Err(VaultError::ConversionFailed(
                "pixel data contains no frames".to_string(),
            ));
        }

        let channels = decoded.samples_per_pixel();
        let planar = channels > 1
            && matches!(decoded.planar_configuration(), PlanarConfiguration::PixelFirst);

        // 逐平面存放或32位的数据由原始帧字节直接读取
        let samples = if planar || decoded.bits_allocated() == 32 {
            let raw = decoded
                .frame_data(0)
                .map_err(|e| VaultError::ConversionFailed(format!("Failed to read frame data: {}", e)))?;
            let samples =
                samples_from_bytes(raw, decoded.bits_allocated(), decoded.pixel_representation())?;
            if planar {
                interleave_planes(&samples, channels as usize)
            } else {
                samples
            }
        } else {
            let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
            decoded
                .to_vec_frame_with_options(0, &options)
                .map_err(|e| VaultError::ConversionFailed(format!("Failed to read frame data: {}", e)))?
        };

        debug!(
            "像素网格: {}x{}, 通道数 {}, 位数 {}, 帧数 {}",
            decoded.rows(),
            decoded.columns(),
            channels,
            decoded.bits_allocated(),
            decoded.number_of_frames()
        );

        Self::new(decoded.rows(), decoded.columns(), channels, samples)
    }

    /// 浮点像素数据 (7FE0,0008) / (7FE0,0009)，取第一帧
    fn from_float_pixels(document: &Document, element: &InMemElement) -> Result<Self> {
        let rows = required_dimension(document, tags::ROWS, "Rows")?;
        let columns = required_dimension(document, tags::COLUMNS, "Columns")?;
        let channels = document
            .element(tags::SAMPLES_PER_PIXEL)
            .and_then(|element| element.to_int::<u16>().ok())
            .unwrap_or(1);

        let mut samples = element
            .value()
            .primitive()
            .ok_or_else(|| {
                VaultError::ConversionFailed("float pixel data is not a primitive value".to_string())
            })?
            .to_multi_float64()
            .map_err(|e| VaultError::ConversionFailed(format!("Failed to read float pixel data: {}", e)))?;

        let frame_len = rows as usize * columns as usize * channels as usize;
        if samples.len() < frame_len {
            return Err(VaultError::ConversionFailed(format!(
                "float pixel data holds {} samples, first frame needs {}",
                samples.len(),
                frame_len
            )));
        }
        samples.truncate(frame_len);

        debug!("浮点像素网格: {}x{}, 通道数 {}", rows, columns, channels);
        Self::new(rows, columns, channels, samples)
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// 全部样本的最小值和最大值，空网格返回 `None`
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.samples.iter().copied().fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
    }

    /// 归一化到8位
    ///
    /// `(sample - min) / (max - min) * 255` 后截断取整；
    /// 所有样本相同时输出全零。
    pub fn normalize(&self) -> Vec<u8> {
        let (min, max) = match self.min_max() {
            Some(bounds) => bounds,
            None => return Vec::new(),
        };

        let range = max - min;
        if range <= 0.0 || !range.is_finite() {
            debug!("像素值无变化 (min = max = {})，输出全零图像", min);
            return vec![0; self.samples.len()];
        }

        self.samples
            .iter()
            .map(|&sample| ((sample - min) / range * MAX_INTENSITY) as u8)
            .collect()
    }
}

/// PNG转换器
pub struct RasterConverter;

impl RasterConverter {
    /// 将文档的像素数据转换为PNG
    pub fn to_raster(document: &Document) -> Result<Vec<u8>> {
        let grid = PixelGrid::from_document(document)?;
        Self::encode(&grid)
    }

    /// 归一化像素网格并编码为PNG
    pub fn encode(grid: &PixelGrid) -> Result<Vec<u8>> {
        let color = match grid.channels() {
            1 => ExtendedColorType::L8,
            3 => ExtendedColorType::Rgb8,
            other => {
                warn!("不支持的每像素样本数: {}", other);
                return Err(VaultError::ConversionFailed(format!(
                    "unsupported samples per pixel: {}",
                    other
                )));
            }
        };

        let data = grid.normalize();
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(&data, grid.columns(), grid.rows(), color)
            .map_err(|e| VaultError::ConversionFailed(format!("png encode: {}", e)))?;

        Ok(png)
    }
}

fn required_dimension(document: &Document, tag: Tag, name: &str) -> Result<u32> {
    document
        .element(tag)
        .and_then(|element| element.to_int::<u32>().ok())
        .ok_or_else(|| VaultError::ConversionFailed(format!("missing or invalid {}", name)))
}

/// 按小端序解析原始样本字节
fn samples_from_bytes(
    raw: &[u8],
    bits_allocated: u16,
    representation: PixelRepresentation,
) -> Result<Vec<f64>> {
    let signed = matches!(representation, PixelRepresentation::Signed);
    let samples = match bits_allocated {
        8 if signed => raw.iter().map(|&byte| byte as i8 as f64).collect(),
        8 => raw.iter().map(|&byte| byte as f64).collect(),
        16 => raw
            .chunks_exact(2)
            .map(|chunk| {
                let bytes = [chunk[0], chunk[1]];
                if signed {
                    i16::from_le_bytes(bytes) as f64
                } else {
                    u16::from_le_bytes(bytes) as f64
                }
            })
            .collect(),
        32 => raw
            .chunks_exact(4)
            .map(|chunk| {
                let bytes = [chunk[0], chunk[1], chunk[2], chunk[3]];
                if signed {
                    i32::from_le_bytes(bytes) as f64
                } else {
                    u32::from_le_bytes(bytes) as f64
                }
            })
            .collect(),
        other => {
            return Err(VaultError::ConversionFailed(format!(
                "unsupported bits allocated: {}",
                other
            )))
        }
    };
    Ok(samples)
}

fn interleave_planes(samples: &[f64], channels: usize) -> Vec<f64> {
    let pixel_count = samples.len() / channels;
    let mut interleaved = Vec::with_capacity(samples.len());
    for idx in 0..pixel_count {
        for channel in 0..channels {
            interleaved.push(samples[channel * pixel_count + idx]);
        }
    }
    interleaved
}
