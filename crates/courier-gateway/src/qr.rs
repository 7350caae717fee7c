// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pairing page rendering.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use qrcode::QrCode;
use qrcode::render::svg;

use courier_core::CourierError;

/// Seconds between automatic reloads of the pairing page.
pub const REFRESH_SECS: u32 = 5;

/// Encodes `code` as an SVG QR image in a `data:` URI.
pub fn pairing_data_uri(code: &str) -> Result<String, CourierError> {
    let qr = QrCode::new(code.as_bytes())
        .map_err(|e| CourierError::Internal(format!("failed to encode pairing code: {e}")))?;
    let image = qr
        .render::<svg::Color<'_>>()
        .min_dimensions(256, 256)
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image.as_bytes())
    ))
}

/// Full HTML page showing the pairing QR code.
pub fn pairing_page(code: &str) -> Result<String, CourierError> {
    let src = pairing_data_uri(code)?;
    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{REFRESH_SECS}">
<title>Courier pairing</title>
<style>
body {{ font-family: sans-serif; display: flex; align-items: center; justify-content: center; min-height: 100vh; margin: 0; background: #f2f4f7; }}
.card {{ background: #fff; padding: 32px; border-radius: 8px; text-align: center; box-shadow: 0 4px 24px rgba(0,0,0,.15); }}
img {{ width: 300px; height: 300px; }}
p {{ color: #666; }}
</style>
</head>
<body>
<div class="card">
<h1>Scan to pair</h1>
<img src="{src}" alt="pairing QR code">
<p>Scan this code with the phone that owns the account.</p>
<p><small>This page refreshes every {REFRESH_SECS} seconds.</small></p>
</div>
</body>
</html>
"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_wraps_svg() {
        let uri = pairing_data_uri("2@abc,def,ghi").unwrap();
        let encoded = uri.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn page_embeds_image_and_refresh() {
        let page = pairing_page("code").unwrap();
        assert!(page.contains("data:image/svg+xml;base64,"));
        assert!(page.contains(r#"http-equiv="refresh" content="5""#));
    }
}
