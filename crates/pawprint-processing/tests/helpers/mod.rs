use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use pawprint_core::PolicyTable;
use pawprint_processing::UploadCoordinator;
use pawprint_storage::MemoryStorage;

pub const OWNER: &str = "user-42";

pub fn setup_coordinator(storage: MemoryStorage) -> (UploadCoordinator, Arc<MemoryStorage>) {
    let storage = Arc::new(storage);
    let policies = PolicyTable::load().expect("default policies are valid");
    (UploadCoordinator::new(storage.clone(), policies), storage)
}

pub fn jpeg(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
        .unwrap();
    Bytes::from(buffer)
}

pub fn dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).unwrap();
    (img.width(), img.height())
}
