//! PDF text extraction using lopdf and pdf-extract.

use std::panic::{AssertUnwindSafe, catch_unwind};

use lopdf::{Dictionary, Document, Object, ObjectId, encryption};
use tracing::{debug, trace};

use super::{Result, TextExtractor};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Two-strategy PDF text extractor.
///
/// The layout strategy runs `pdf-extract` over the decrypted document, which
/// spaces words from glyph positions and keeps labels and values on the lines
/// the catalog patterns expect. If that yields nothing, the permissive strategy
/// walks every page with lopdf's own text extraction.
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    min_text_chars: usize,
}

impl PdfTextExtractor {
    /// Create a new extractor with default settings.
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            min_text_chars: config.min_text_chars.max(1),
        }
    }

    /// Set the minimum number of non-whitespace characters a strategy must produce.
    pub fn with_min_text_chars(mut self, min_text_chars: usize) -> Self {
        self.min_text_chars = min_text_chars.max(1);
        self
    }

    /// Layout-preserving strategy.
    fn layout_text(&self, data: &[u8], password: &str) -> Result<Option<String>> {
        let mut doc = open(data)?;
        let decrypted = if doc.is_encrypted() {
            decrypt(&mut doc, password)?;
            let mut buf = Vec::new();
            doc.save_to(&mut buf)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            Some(buf)
        } else {
            None
        };
        let bytes = decrypted.as_deref().unwrap_or(data);

        let text = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
            .map_err(|panic| PdfError::DecoderPanic(panic_message(panic.as_ref())))?
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        Ok(self.usable(tidy(&text)))
    }

    /// Permissive strategy: explicit decryption, then page-by-page extraction.
    fn permissive_text(&self, data: &[u8], password: &str) -> Result<Option<String>> {
        let mut doc = open(data)?;
        if doc.is_encrypted() {
            decrypt(&mut doc, password)?;
        }

        let mut text = String::new();
        for page in doc.get_pages().keys() {
            match doc.extract_text(&[*page]) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Err(e) => trace!("skipping page {}: {}", page, e),
            }
        }

        Ok(self.usable(tidy(&text)))
    }

    fn usable(&self, text: String) -> Option<String> {
        let chars = text.chars().filter(|c| !c.is_whitespace()).count();
        (chars >= self.min_text_chars).then_some(text)
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, document: &[u8], password: &str) -> Option<String> {
        match self.layout_text(document, password) {
            Ok(Some(text)) => {
                debug!("layout strategy produced {} characters", text.len());
                return Some(text);
            }
            Ok(None) => debug!("layout strategy produced no text, trying permissive strategy"),
            Err(e) => debug!("layout strategy failed: {}, trying permissive strategy", e),
        }

        match self.permissive_text(document, password) {
            Ok(Some(text)) => {
                debug!("permissive strategy produced {} characters", text.len());
                Some(text)
            }
            Ok(None) => {
                debug!("permissive strategy produced no text");
                None
            }
            Err(e) => {
                debug!("permissive strategy failed: {}", e);
                None
            }
        }
    }
}

fn open(data: &[u8]) -> Result<Document> {
    let doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;
    if doc.get_pages().is_empty() {
        return Err(PdfError::NoPages);
    }
    Ok(doc)
}

/// Cipher a crypt filter applies to one class of objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CryptMethod {
    Identity,
    Rc4,
    Aes128,
}

#[derive(Debug, Clone, Copy)]
struct Ciphers {
    streams: CryptMethod,
    strings: CryptMethod,
}

impl Ciphers {
    /// Handlers before `/V 4` have no crypt filters and encrypt everything with RC4.
    fn from_encrypt_dict(encrypt: &Dictionary) -> Result<Self> {
        let version = encrypt.get(b"V").and_then(Object::as_i64).unwrap_or(0);
        if version < 4 {
            return Ok(Self {
                streams: CryptMethod::Rc4,
                strings: CryptMethod::Rc4,
            });
        }
        Ok(Self {
            streams: crypt_filter(encrypt, b"StmF")?,
            strings: crypt_filter(encrypt, b"StrF")?,
        })
    }
}

fn crypt_filter(encrypt: &Dictionary, key: &[u8]) -> Result<CryptMethod> {
    let name = encrypt
        .get(key)
        .and_then(Object::as_name)
        .unwrap_or(b"Identity".as_slice());
    if name == b"Identity" {
        return Ok(CryptMethod::Identity);
    }

    let method = encrypt
        .get(b"CF")
        .and_then(Object::as_dict)
        .and_then(|filters| filters.get(name))
        .and_then(Object::as_dict)
        .and_then(|filter| filter.get(b"CFM"))
        .and_then(Object::as_name)
        .unwrap_or(b"None".as_slice());
    match method {
        b"None" => Ok(CryptMethod::Identity),
        b"V2" => Ok(CryptMethod::Rc4),
        b"AESV2" => Ok(CryptMethod::Aes128),
        other => Err(PdfError::Decrypt(format!(
            "unsupported crypt filter method {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// Decrypt every string and stream in place with the standard security handler.
///
/// Key derivation and the password check come from lopdf. The crypt method is
/// resolved here so that `/V 1` and `/V 2` documents without a `/CF` dictionary
/// decrypt as RC4.
fn decrypt(doc: &mut Document, password: &str) -> Result<()> {
    let encrypt_id = doc
        .trailer
        .get(b"Encrypt")
        .and_then(Object::as_reference)
        .map_err(|e| PdfError::Decrypt(e.to_string()))?;
    let encrypt = doc
        .get_encrypted()
        .map_err(|e| PdfError::Decrypt(e.to_string()))?;
    let ciphers = Ciphers::from_encrypt_dict(encrypt)?;
    let encrypt_metadata = encrypt
        .get(b"EncryptMetadata")
        .and_then(Object::as_bool)
        .unwrap_or(true);

    let key = encryption::get_encryption_key(doc, password, true)
        .map_err(|e| PdfError::Decrypt(e.to_string()))?;

    for (&id, object) in doc.objects.iter_mut() {
        if id == encrypt_id {
            continue;
        }
        match object.type_name().ok() {
            Some(b"XRef") => continue,
            Some(b"Metadata") if !encrypt_metadata => continue,
            _ => {}
        }
        decrypt_object(&key, id, object, ciphers)?;
    }

    doc.trailer.remove(b"Encrypt");
    trace!("decrypted PDF ({:?})", ciphers);
    Ok(())
}

fn decrypt_object(key: &[u8], id: ObjectId, object: &mut Object, ciphers: Ciphers) -> Result<()> {
    let method = match object {
        Object::String(..) => ciphers.strings,
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                decrypt_object(key, id, value, ciphers)?;
            }
            ciphers.streams
        }
        Object::Array(items) => {
            for item in items.iter_mut() {
                decrypt_object(key, id, item, ciphers)?;
            }
            return Ok(());
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                decrypt_object(key, id, value, ciphers)?;
            }
            return Ok(());
        }
        _ => return Ok(()),
    };
    if method == CryptMethod::Identity {
        return Ok(());
    }

    let aes = method == CryptMethod::Aes128;
    if aes {
        // IV plus at least one padded block.
        let len = match object {
            Object::String(content, _) => content.len(),
            Object::Stream(stream) => stream.content.len(),
            _ => 0,
        };
        if len < 32 || len % 16 != 0 {
            return Err(PdfError::Decrypt(format!(
                "object {} {} is not a valid AES payload",
                id.0, id.1
            )));
        }
    }

    let plain = catch_unwind(AssertUnwindSafe(|| encryption::decrypt_object(key, id, &*object, aes)))
        .map_err(|panic| PdfError::DecoderPanic(panic_message(panic.as_ref())))?
        .map_err(|e| PdfError::Decrypt(e.to_string()))?;
    match object {
        Object::String(content, _) => *content = plain,
        Object::Stream(stream) => stream.set_content(plain),
        _ => {}
    }
    Ok(())
}

/// Normalize decoder output: form feeds become line breaks, NULs are dropped
/// and trailing whitespace is removed from every line.
fn tidy(text: &str) -> String {
    text.replace('\u{c}', "\n")
        .replace('\0', "")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    fn sample_pdf(line: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_extract_plain_pdf() {
        let data = sample_pdf("Payment Due Date 05/02/2024");
        let text = PdfTextExtractor::new().extract_text(&data, "").unwrap();
        assert!(text.contains("05/02/2024"), "unexpected text: {:?}", text);
    }

    #[test]
    fn test_garbage_yields_none() {
        let extractor = PdfTextExtractor::new();
        assert!(extractor.extract_text(b"not a pdf at all", "secret").is_none());
        assert!(extractor.extract_text(&[], "").is_none());
    }

    const ENCRYPTED: [(&str, &[u8]); 4] = [
        ("rc4_40", include_bytes!("../../tests/fixtures/rc4_40.pdf")),
        ("rc4_128", include_bytes!("../../tests/fixtures/rc4_128.pdf")),
        ("rc4_v4", include_bytes!("../../tests/fixtures/rc4_v4.pdf")),
        ("aes_v4", include_bytes!("../../tests/fixtures/aes_v4.pdf")),
    ];

    #[test]
    fn test_encrypted_with_right_password() {
        let extractor = PdfTextExtractor::new();
        for (name, data) in ENCRYPTED {
            let text = extractor
                .extract_text(data, "secret")
                .unwrap_or_else(|| panic!("{} did not decrypt", name));
            assert!(text.contains("1234********5678"), "{}: {:?}", name, text);
            assert!(text.contains("05/02/2024"), "{}: {:?}", name, text);
        }
    }

    #[test]
    fn test_encrypted_with_wrong_password() {
        let extractor = PdfTextExtractor::new();
        for (name, data) in ENCRYPTED {
            assert_eq!(extractor.extract_text(data, "wrong"), None, "{}", name);
            assert_eq!(extractor.extract_text(data, ""), None, "{}", name);
        }
    }

    #[test]
    fn test_rc4_without_crypt_filters() {
        let mut doc = Document::load_mem(ENCRYPTED[1].1).unwrap();
        assert!(doc.get_encrypted().unwrap().get(b"CF").is_err());

        decrypt(&mut doc, "secret").unwrap();
        assert!(!doc.is_encrypted());
        let content = &doc.get_object((5, 0)).unwrap().as_stream().unwrap().content;
        assert!(String::from_utf8_lossy(content).contains("(Card 1234********5678 Payment Due Date 05/02/2024) Tj"));
    }

    #[test]
    fn test_crypt_methods() {
        let legacy = dictionary! { "V" => 2, "R" => 3 };
        let ciphers = Ciphers::from_encrypt_dict(&legacy).unwrap();
        assert_eq!((ciphers.streams, ciphers.strings), (CryptMethod::Rc4, CryptMethod::Rc4));

        let aes = dictionary! {
            "V" => 4,
            "CF" => dictionary! {
                "StdCF" => dictionary! { "CFM" => "AESV2" },
            },
            "StmF" => "StdCF",
        };
        let ciphers = Ciphers::from_encrypt_dict(&aes).unwrap();
        assert_eq!(
            (ciphers.streams, ciphers.strings),
            (CryptMethod::Aes128, CryptMethod::Identity)
        );

        let aes256 = dictionary! {
            "V" => 5,
            "CF" => dictionary! {
                "StdCF" => dictionary! { "CFM" => "AESV3" },
            },
            "StmF" => "StdCF",
            "StrF" => "StdCF",
        };
        assert!(Ciphers::from_encrypt_dict(&aes256).is_err());
    }

    #[test]
    fn test_min_text_chars() {
        let extractor = PdfTextExtractor::new().with_min_text_chars(3);
        assert_eq!(extractor.usable("  a b ".to_string()), None);
        assert_eq!(extractor.usable("abc".to_string()), Some("abc".to_string()));
    }

    #[test]
    fn test_tidy() {
        assert_eq!(tidy("Total   \n\u{c}Due\0 \n"), "Total\n\nDue");
    }
}
