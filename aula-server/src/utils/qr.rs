//! Room QR code rendering

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use shared::models::Room;

use crate::utils::AppError;

/// Text encoded in a room's QR code
pub fn room_payload(room: &Room) -> String {
    format!("Aula: {}\nMódulo: {}\nID: {}", room.name, room.module, room.id)
}

/// Render `payload` as a PNG `data:` URL
pub fn render_data_url(payload: &str) -> Result<String, AppError> {
    let code = QrCode::new(payload.as_bytes()).map_err(qr_error)?;
    let img = code.render::<Luma<u8>>().min_dimensions(256, 256).build();

    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png).map_err(qr_error)?;

    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(png.into_inner())
    ))
}

fn qr_error(e: impl std::fmt::Display) -> AppError {
    AppError::with_message(
        shared::ErrorCode::QrRenderFailed,
        format!("Failed to render QR code: {e}"),
    )
}
