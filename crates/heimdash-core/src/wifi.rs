// ── Wi-Fi credential snapshot ──
//
// On-demand, not polled: cheap enough to regenerate per request. The
// join string and the snapshot both contain the network password, so
// nothing in this module is ever traced.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use qrcode::QrCode;
use qrcode::render::svg;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::CoreError;

/// Configured Wi-Fi network credentials.
pub struct WifiAccess {
    ssid: String,
    password: SecretString,
}

/// One generated credential snapshot, served once per request.
#[derive(Clone, Serialize)]
pub struct WifiSnapshot {
    pub ssid: String,
    pub pass: String,
    /// QR image as a `data:` URL, ready for direct display.
    #[serde(rename = "qrImage")]
    pub qr_image: String,
}

impl WifiAccess {
    pub fn new(ssid: impl Into<String>, password: SecretString) -> Self {
        Self {
            ssid: ssid.into(),
            password,
        }
    }

    /// Generate the credential snapshot, including the QR-encoded join
    /// string (`WIFI:T:WPA;S:<ssid>;P:<password>;;`).
    pub fn snapshot(&self) -> Result<WifiSnapshot, CoreError> {
        let credential = self.credential_string();
        let code = QrCode::new(credential.as_bytes())?;
        let image = code
            .render::<svg::Color<'_>>()
            .min_dimensions(240, 240)
            .build();

        Ok(WifiSnapshot {
            ssid: self.ssid.clone(),
            pass: self.password.expose_secret().to_owned(),
            qr_image: format!("data:image/svg+xml;base64,{}", BASE64.encode(image)),
        })
    }

    /// The standard Wi-Fi network config join string.
    fn credential_string(&self) -> String {
        format!(
            "WIFI:T:WPA;S:{};P:{};;",
            self.ssid,
            self.password.expose_secret()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn access() -> WifiAccess {
        WifiAccess::new("Home", "secret".to_string().into())
    }

    #[test]
    fn credential_string_matches_wifi_config_format() {
        assert_eq!(access().credential_string(), "WIFI:T:WPA;S:Home;P:secret;;");
    }

    #[test]
    fn snapshot_carries_plain_credentials_and_data_url() {
        let snap = access().snapshot().unwrap();
        assert_eq!(snap.ssid, "Home");
        assert_eq!(snap.pass, "secret");
        assert!(snap.qr_image.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn snapshot_serializes_camel_case_image_key() {
        let value = serde_json::to_value(access().snapshot().unwrap()).unwrap();
        assert!(value.get("qrImage").is_some());
        assert_eq!(value["ssid"], "Home");
        assert_eq!(value["pass"], "secret");
    }
}
