//! 测试用的DICOM文档构造工具

use dicom::core::value::DataSetSequence;
use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::dictionary_std::{tags, uids};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};

const SOP_INSTANCE_UID: &str = "2.25.314159265358979323846";

/// 将数据集写成带前导区的完整DICOM文件
pub fn document_bytes(dataset: InMemDicomObject) -> Vec<u8> {
    let file = dataset
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(SOP_INSTANCE_UID),
        )
        .expect("file meta group should be complete");

    let mut bytes = Vec::new();
    file.write_all(&mut bytes)
        .expect("writing to memory should not fail");
    bytes
}

/// 只包含患者和实例信息、没有像素数据的数据集
pub fn patient_dataset(patient_name: &str) -> InMemDicomObject {
    let mut dataset = InMemDicomObject::new_empty();
    dataset.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
    ));
    dataset.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(SOP_INSTANCE_UID),
    ));
    dataset.put(DataElement::new(
        tags::PATIENT_NAME,
        VR::PN,
        PrimitiveValue::from(patient_name),
    ));
    dataset.put(DataElement::new(
        tags::MODALITY,
        VR::CS,
        PrimitiveValue::from("OT"),
    ));
    dataset
}

/// 添加16位单通道像素数据，`samples` 按行优先排列
pub fn put_gray_pixels(dataset: &mut InMemDicomObject, rows: u16, columns: u16, samples: Vec<u16>) {
    put_image_header(dataset, rows, columns, 1, "MONOCHROME2", 16);
    dataset.put(DataElement::new(
        tags::PIXEL_REPRESENTATION,
        VR::US,
        PrimitiveValue::from(0_u16),
    ));
    dataset.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U16(samples.into()),
    ));
}

/// 添加8位RGB像素数据（逐像素交错）
pub fn put_rgb_pixels(dataset: &mut InMemDicomObject, rows: u16, columns: u16, samples: Vec<u8>) {
    put_color_pixels(dataset, rows, columns, 0, samples);
}

/// 添加8位RGB像素数据（逐平面存放：先全部R，再G，再B）
pub fn put_planar_rgb_pixels(
    dataset: &mut InMemDicomObject,
    rows: u16,
    columns: u16,
    planes: Vec<u8>,
) {
    put_color_pixels(dataset, rows, columns, 1, planes);
}

/// 添加32位无符号单通道像素数据
pub fn put_gray32_pixels(dataset: &mut InMemDicomObject, rows: u16, columns: u16, samples: Vec<u32>) {
    put_image_header(dataset, rows, columns, 1, "MONOCHROME2", 32);
    dataset.put(DataElement::new(
        tags::PIXEL_REPRESENTATION,
        VR::US,
        PrimitiveValue::from(0_u16),
    ));
    // 小端序下每个32位样本由低位字和高位字组成
    let words: Vec<u16> = samples
        .iter()
        .flat_map(|&sample| [sample as u16, (sample >> 16) as u16])
        .collect();
    dataset.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U16(words.into()),
    ));
}

/// 添加32位浮点像素数据 (Float Pixel Data)
pub fn put_float_pixels(dataset: &mut InMemDicomObject, rows: u16, columns: u16, samples: Vec<f32>) {
    put_image_header(dataset, rows, columns, 1, "MONOCHROME2", 32);
    dataset.put(DataElement::new(
        tags::FLOAT_PIXEL_DATA,
        VR::OF,
        PrimitiveValue::F32(samples.into()),
    ));
}

fn put_color_pixels(
    dataset: &mut InMemDicomObject,
    rows: u16,
    columns: u16,
    planar_configuration: u16,
    samples: Vec<u8>,
) {
    put_image_header(dataset, rows, columns, 3, "RGB", 8);
    dataset.put(DataElement::new(
        tags::PIXEL_REPRESENTATION,
        VR::US,
        PrimitiveValue::from(0_u16),
    ));
    dataset.put(DataElement::new(
        tags::PLANAR_CONFIGURATION,
        VR::US,
        PrimitiveValue::from(planar_configuration),
    ));
    dataset.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OB,
        PrimitiveValue::U8(samples.into()),
    ));
}

fn put_image_header(
    dataset: &mut InMemDicomObject,
    rows: u16,
    columns: u16,
    samples_per_pixel: u16,
    photometric_interpretation: &str,
    bits: u16,
) {
    dataset.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(rows)));
    dataset.put(DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(columns)));
    dataset.put(DataElement::new(
        tags::SAMPLES_PER_PIXEL,
        VR::US,
        PrimitiveValue::from(samples_per_pixel),
    ));
    dataset.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from(photometric_interpretation),
    ));
    dataset.put(DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(bits)));
    dataset.put(DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(bits)));
    dataset.put(DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(bits - 1)));
}

/// Doe^John，2x2 像素 `[[0, 100], [200, 255]]`
pub fn sample_document_bytes() -> Vec<u8> {
    let mut dataset = patient_dataset("Doe^John");
    put_gray_pixels(&mut dataset, 2, 2, vec![0, 100, 200, 255]);
    document_bytes(dataset)
}

/// 包含嵌套序列和空值属性的数据集
pub fn dataset_with_sequence() -> InMemDicomObject {
    let mut dataset = patient_dataset("Seq^Patient");

    let item = InMemDicomObject::from_element_iter([DataElement::new(
        tags::REFERENCED_SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from("1.2.3.4.5"),
    )]);
    dataset.put(DataElement::new(
        tags::REFERENCED_IMAGE_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(vec![item]),
    ));
    dataset.put(DataElement::new(
        tags::PATIENT_BIRTH_DATE,
        VR::DA,
        PrimitiveValue::Empty,
    ));
    dataset
}
