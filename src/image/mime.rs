/// Label a mission photo with a MIME type from its leading bytes.
///
/// Anything not recognized is sent as `image/jpeg`, which is what phone
/// cameras upload in practice. HEIC/HEIF containers are logged separately
/// since iPhones produce them and Gemini may still reject the upload.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [_, _, _, _, b'f', b't', b'y', b'p', brand @ ..] if brand.len() >= 4 => {
            tracing::warn!(
                "Photo is an ISO media container (brand {:?}), sending as image/jpeg",
                String::from_utf8_lossy(&brand[..4])
            );
            "image/jpeg"
        }
        _ => {
            tracing::warn!(
                "Unrecognized photo format (leading bytes {:02X?}), sending as image/jpeg",
                &bytes[..bytes.len().min(4)]
            );
            "image/jpeg"
        }
    }
}
