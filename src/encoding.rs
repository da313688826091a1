//! 文字エンコーディング処理
//!
//! 設定された文字コードでバイト列とテキストを相互変換する。
//! 変換は厳密で、BOM の付与・除去は行わない。

use crate::error::{Result, TxtError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// サポートする文字コード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    #[default]
    Utf8,
    UsAscii,
    Iso8859_1,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    /// 正規化された文字コード名
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::UsAscii => "US-ASCII",
            TextEncoding::Iso8859_1 => "ISO-8859-1",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
        }
    }

    /// バイト列をテキストへデコード
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| {
                self.error("decode", format!(
                    "invalid byte sequence at offset {}",
                    e.utf8_error().valid_up_to()
                ))
            }),
            TextEncoding::UsAscii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(self.error("decode", format!(
                    "non-ASCII byte 0x{:02X} at offset {}",
                    bytes[offset], offset
                ))),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
            TextEncoding::Iso8859_1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => self.decode_utf16(bytes),
        }
    }

    /// テキストをバイト列へエンコード
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::UsAscii => self.encode_single_byte(text, 0x7F),
            TextEncoding::Iso8859_1 => self.encode_single_byte(text, 0xFF),
            TextEncoding::Utf16Le => Ok(text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect()),
            TextEncoding::Utf16Be => Ok(text
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect()),
        }
    }

    fn encode_single_byte(self, text: &str, max: u32) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(text.len());
        for (offset, ch) in text.char_indices() {
            let code = ch as u32;
            if code > max {
                return Err(self.error("encode", format!(
                    "unmappable character {:?} at offset {}",
                    ch, offset
                )));
            }
            bytes.push(code as u8);
        }
        Ok(bytes)
    }

    fn decode_utf16(self, bytes: &[u8]) -> Result<String> {
        if bytes.len() % 2 != 0 {
            return Err(self.error("decode", format!("odd byte length {}", bytes.len())));
        }

        let units = bytes.chunks_exact(2).map(|pair| {
            let pair = [pair[0], pair[1]];
            if self == TextEncoding::Utf16Le {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            }
        });

        let mut text = String::with_capacity(bytes.len() / 2);
        for (index, unit) in char::decode_utf16(units).enumerate() {
            match unit {
                Ok(ch) => text.push(ch),
                Err(e) => {
                    return Err(self.error("decode", format!(
                        "unpaired surrogate 0x{:04X} near offset {}",
                        e.unpaired_surrogate(),
                        index * 2
                    )))
                }
            }
        }
        Ok(text)
    }

    /// 操作名とパスは呼び出し側が `TxtError::at` で付与する
    fn error(self, operation: &str, message: String) -> TxtError {
        TxtError::Encoding {
            operation: operation.to_string(),
            path: String::new(),
            encoding: self.label().to_string(),
            message,
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = TxtError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "utf8" => Ok(TextEncoding::Utf8),
            "usascii" | "ascii" => Ok(TextEncoding::UsAscii),
            "iso88591" | "latin1" => Ok(TextEncoding::Iso8859_1),
            "utf16le" => Ok(TextEncoding::Utf16Le),
            "utf16be" => Ok(TextEncoding::Utf16Be),
            _ => Err(TxtError::invalid_argument(
                "encoding",
                "charset",
                format!("unsupported charset: {}", s),
            )),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = TxtError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(encoding: TextEncoding) -> Self {
        encoding.label().to_string()
    }
}
