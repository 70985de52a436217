use std::fmt;
use std::str::FromStr;

use crate::error::SymbologyError;

/// Barcode formats reported by the scanning engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Symbology {
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Code128,
    Code39,
    QrCode,
}

impl Symbology {
    /// Formats found on retail product labels.
    pub const RETAIL: [Symbology; 6] = [
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::UpcA,
        Symbology::UpcE,
        Symbology::Code128,
        Symbology::Code39,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Symbology::Ean13 => "EAN_13",
            Symbology::Ean8 => "EAN_8",
            Symbology::UpcA => "UPC_A",
            Symbology::UpcE => "UPC_E",
            Symbology::Code128 => "CODE_128",
            Symbology::Code39 => "CODE_39",
            Symbology::QrCode => "QR_CODE",
        }
    }

    pub fn is_retail(self) -> bool {
        Self::RETAIL.contains(&self)
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbology {
    type Err = SymbologyError;

    /// Accepts canonical names (`EAN_13`), compact ones (`ean13`, `upc-a`) and
    /// Quagga reader names (`ean_reader`, `upc_e_reader`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();
        let key = key.strip_suffix("reader").unwrap_or(&key);

        let sym = match key {
            "ean13" | "ean" => Symbology::Ean13,
            "ean8" => Symbology::Ean8,
            "upca" | "upc" => Symbology::UpcA,
            "upce" => Symbology::UpcE,
            "code128" => Symbology::Code128,
            "code39" => Symbology::Code39,
            "qrcode" | "qr" => Symbology::QrCode,
            _ => return Err(SymbologyError::Unknown(s.to_string())),
        };
        Ok(sym)
    }
}

impl TryFrom<String> for Symbology {
    type Error = SymbologyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Symbology> for &'static str {
    fn from(s: Symbology) -> Self {
        s.as_str()
    }
}
