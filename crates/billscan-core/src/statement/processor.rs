//! End-to-end processing of one statement document.

use std::fmt;

use tracing::{debug, info, trace};

use super::catalog::Catalog;
use super::extractor::FieldExtractor;
use super::rules::normalize;
use super::validator::{Validator, Verdict};
use crate::models::config::BillscanConfig;
use crate::models::institution::Institution;
use crate::models::record::ExtractedRecord;
use crate::pdf::{PdfTextExtractor, TextExtractor};

/// One document handed to the processor.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    bytes: &'a [u8],
    passwords: Vec<String>,
    name: Option<String>,
}

impl<'a> Document<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            passwords: Vec::new(),
            name: None,
        }
    }

    /// Append one password candidate.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.passwords.push(password.into());
        self
    }

    /// Append password candidates, keeping their order.
    pub fn with_passwords<I, S>(mut self, passwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passwords.extend(passwords.into_iter().map(Into::into));
        self
    }

    /// Attach a file name used in log output only.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Password candidates in trial order. No candidates means the empty password.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        let fallback = self.passwords.is_empty().then_some("");
        self.passwords.iter().map(String::as_str).chain(fallback)
    }
}

/// Processing stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    TextExtracted,
    FieldsExtracted,
    Normalized,
    Validated,
    Accepted,
    Rejected,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::TextExtracted => "text-extracted",
            Stage::FieldsExtracted => "fields-extracted",
            Stage::Normalized => "normalized",
            Stage::Validated => "validated",
            Stage::Accepted => "accepted",
            Stage::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Terminal result of processing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(ExtractedRecord),
    Rejected,
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn record(&self) -> Option<&ExtractedRecord> {
        match self {
            Outcome::Accepted(record) => Some(record),
            Outcome::Rejected => None,
        }
    }

    pub fn into_record(self) -> Option<ExtractedRecord> {
        match self {
            Outcome::Accepted(record) => Some(record),
            Outcome::Rejected => None,
        }
    }
}

impl From<Option<ExtractedRecord>> for Outcome {
    fn from(record: Option<ExtractedRecord>) -> Self {
        record.map_or(Outcome::Rejected, Outcome::Accepted)
    }
}

/// Turns statement documents into validated records.
///
/// Processing never fails: wrong passwords, unreadable documents, missing
/// fields and implausible values all end in [`Outcome::Rejected`]. The
/// processor holds no mutable state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct StatementProcessor<'c, E = PdfTextExtractor> {
    extractor: E,
    catalog: &'c Catalog,
    validator: Validator,
}

impl StatementProcessor<'static, PdfTextExtractor> {
    /// Processor with the built-in catalog, PDF extraction and the local clock.
    pub fn new() -> Self {
        Self {
            extractor: PdfTextExtractor::new(),
            catalog: Catalog::builtin(),
            validator: Validator::default(),
        }
    }

    /// Processor configured from a [`BillscanConfig`].
    pub fn from_config(config: &BillscanConfig) -> Self {
        Self {
            extractor: PdfTextExtractor::from_config(&config.pdf),
            catalog: Catalog::builtin(),
            validator: Validator::new(config.validation.clone()),
        }
    }
}

impl Default for StatementProcessor<'static, PdfTextExtractor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c, E: TextExtractor> StatementProcessor<'c, E> {
    /// Replace the text extractor.
    pub fn with_extractor<F: TextExtractor>(self, extractor: F) -> StatementProcessor<'c, F> {
        StatementProcessor {
            extractor,
            catalog: self.catalog,
            validator: self.validator,
        }
    }

    /// Replace the pattern catalog.
    pub fn with_catalog<'d>(self, catalog: &'d Catalog) -> StatementProcessor<'d, E> {
        StatementProcessor {
            extractor: self.extractor,
            catalog,
            validator: self.validator,
        }
    }

    /// Replace the validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Process one document for `institution`.
    pub fn process(&self, document: &Document<'_>, institution: Institution) -> Outcome {
        let name = document.name().unwrap_or("<unnamed>");
        debug!("{}: {} as {}", name, Stage::Start, institution);

        if self.catalog.profile(institution).is_none() {
            debug!("{}: no profile for {}, {}", name, institution, Stage::Rejected);
            return Outcome::Rejected;
        }

        let Some(text) = self.recover_text(document) else {
            info!("{}: no password candidate produced text", name);
            return Outcome::Rejected;
        };

        let outcome = self.process_text(&text, institution);
        info!(
            "{}: {}",
            name,
            if outcome.is_accepted() { Stage::Accepted } else { Stage::Rejected }
        );
        outcome
    }

    /// Process one document for an institution given by key. Unknown keys are rejected.
    pub fn process_key(&self, document: &Document<'_>, key: &str) -> Outcome {
        match Institution::from_key(key) {
            Some(institution) => self.process(document, institution),
            None => {
                debug!("unknown institution key {:?}, {}", key, Stage::Rejected);
                Outcome::Rejected
            }
        }
    }

    /// Run every stage after text extraction.
    pub fn process_text(&self, text: &str, institution: Institution) -> Outcome {
        let Some(profile) = self.catalog.profile(institution) else {
            debug!("no profile for {}, {}", institution, Stage::Rejected);
            return Outcome::Rejected;
        };

        if let Some(marker) = profile.reject_marker(text) {
            debug!("text contains {:?}, not a {} statement", marker, institution);
            return Outcome::Rejected;
        }

        let raw = FieldExtractor::new(self.catalog).extract(text, institution);
        trace!("{}: {} fields", Stage::FieldsExtracted, raw.len());

        let fields = normalize(&raw);
        trace!("{}: {:?}", Stage::Normalized, fields);

        match self.validator.validate(&fields) {
            Verdict::Accept => {
                trace!("{}", Stage::Validated);
                fields.into_record(institution).into()
            }
            Verdict::Reject => Outcome::Rejected,
        }
    }

    /// Try each password candidate in order; the first non-empty text wins.
    fn recover_text(&self, document: &Document<'_>) -> Option<String> {
        for (attempt, password) in document.candidates().enumerate() {
            match self.extractor.extract_text(document.bytes(), password) {
                Some(text) if !text.trim().is_empty() => {
                    debug!("{} with candidate #{}", Stage::TextExtracted, attempt);
                    return Some(text);
                }
                _ => trace!("candidate #{} produced no text", attempt),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::validator::ValidationWindow;
    use chrono::{Days, NaiveDate};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns canned text for known passwords.
    #[derive(Default)]
    struct FakeExtractor {
        texts: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl FakeExtractor {
        fn with(password: &str, text: &str) -> Self {
            let mut fake = Self::default();
            fake.texts.insert(password.to_string(), text.to_string());
            fake
        }
    }

    impl TextExtractor for FakeExtractor {
        fn extract_text(&self, _document: &[u8], password: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts.get(password).cloned()
        }
    }

    const ICICI_TEXT: &str = "ICICI Bank Credit Card\n\
        Card 1234********5678\n\
        Statement Date 15/01/2024\n\
        Payment Due Date 05/02/2024\n\
        Total Amount due - `12,345.00\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 3, 1)
    }

    fn processor<E: TextExtractor>(extractor: E) -> StatementProcessor<'static, E> {
        StatementProcessor::new()
            .with_extractor(extractor)
            .with_validator(Validator::pinned(today()))
    }

    #[test]
    fn test_accepts_icici_statement() {
        let processor = processor(FakeExtractor::with("", ICICI_TEXT));
        let outcome = processor.process(&Document::new(b"%PDF"), Institution::Icici);

        let record = outcome.into_record().unwrap();
        assert_eq!(record.institution, Institution::Icici);
        assert_eq!(record.card_last4, "5678");
        assert_eq!(record.statement_date, Some(date(2024, 1, 15)));
        assert_eq!(record.due_date, date(2024, 2, 5));
        assert_eq!(record.total_due, Some(Decimal::new(1234500, 2)));
    }

    #[test]
    fn test_due_before_statement_is_rejected() {
        let text = ICICI_TEXT.replace("05/02/2024", "01/01/2023");
        let processor = processor(FakeExtractor::default());
        assert_eq!(processor.process_text(&text, Institution::Icici), Outcome::Rejected);
    }

    #[test]
    fn test_stale_due_date_is_rejected() {
        let due = today() - Days::new(600);
        let text = format!("Card 1234********5678\nPayment Due Date {}", due.format("%d/%m/%Y"));
        let processor = processor(FakeExtractor::default());
        assert_eq!(processor.process_text(&text, Institution::Icici), Outcome::Rejected);

        let due = today() - Days::new(550);
        let text = format!("Card 1234********5678\nPayment Due Date {}", due.format("%d/%m/%Y"));
        assert!(processor.process_text(&text, Institution::Icici).is_accepted());
    }

    #[test]
    fn test_second_password_succeeds() {
        let processor = processor(FakeExtractor::with("right", ICICI_TEXT));
        let document = Document::new(b"%PDF").with_passwords(["wrong", "right"]);

        let outcome = processor.process(&document, Institution::Icici);
        assert_eq!(outcome.record().map(|r| r.card_last4.as_str()), Some("5678"));
        assert_eq!(processor.extractor.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stops_at_first_working_password() {
        let mut fake = FakeExtractor::with("first", ICICI_TEXT);
        fake.texts.insert("second".to_string(), String::new());
        let processor = processor(fake);
        let document = Document::new(b"%PDF").with_passwords(["first", "second"]);

        assert!(processor.process(&document, Institution::Icici).is_accepted());
        assert_eq!(processor.extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_all_passwords_fail() {
        let processor = processor(FakeExtractor::with("right", ICICI_TEXT));
        let document = Document::new(b"%PDF")
            .with_password("a")
            .with_password("b")
            .with_name("statement.pdf");
        assert_eq!(processor.process(&document, Institution::Icici), Outcome::Rejected);
    }

    #[test]
    fn test_encrypted_pdf_second_password() {
        let data = include_bytes!("../../tests/fixtures/rc4_128.pdf");
        let processor = processor(PdfTextExtractor::new());

        let document = Document::new(data).with_passwords(["wrong", "secret"]);
        let record = processor.process(&document, Institution::Icici).into_record().unwrap();
        assert_eq!(record.card_last4, "5678");
        assert_eq!(record.due_date, date(2024, 2, 5));

        let document = Document::new(data).with_password("wrong");
        assert_eq!(processor.process(&document, Institution::Icici), Outcome::Rejected);
    }

    #[test]
    fn test_unknown_institution_is_rejected() {
        let processor = processor(FakeExtractor::with("", ICICI_TEXT));
        let document = Document::new(b"%PDF");

        assert_eq!(processor.process_key(&document, "citibank"), Outcome::Rejected);
        assert!(processor.process_key(&document, "ICICI").is_accepted());

        let empty = Catalog::default();
        let processor = processor.with_catalog(&empty);
        assert_eq!(processor.process(&document, Institution::Icici), Outcome::Rejected);
        assert_eq!(processor.extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_kotak_total_due() {
        let text = "Kotak Credit Card 4321XXXXXXXX9876\n\
            Statement Date 10-Feb-2024\n\
            Total Amount Due Rs.12,345.00\n\
            Remember to pay by 28-Feb-2024\n";
        let processor = processor(FakeExtractor::default());

        let record = processor
            .process_text(text, Institution::Kotak)
            .into_record()
            .unwrap();
        assert_eq!(record.card_last4, "9876");
        assert_eq!(record.statement_date, Some(date(2024, 2, 10)));
        assert_eq!(record.due_date, date(2024, 2, 28));
        assert_eq!(record.total_due, Some(Decimal::new(1234500, 2)));
        assert_eq!(record.min_due, None);
    }

    #[test]
    fn test_amortization_schedule_is_rejected() {
        let text = format!("{}\nEMI Amortization Schedule\n", ICICI_TEXT);
        let processor = processor(FakeExtractor::default());
        assert_eq!(processor.process_text(&text, Institution::Icici), Outcome::Rejected);
    }

    #[test]
    fn test_missing_mandatory_field_is_rejected() {
        let text = "Statement Date 15/01/2024\nPayment Due Date 05/02/2024";
        let processor = processor(FakeExtractor::default());
        assert_eq!(processor.process_text(text, Institution::Icici), Outcome::Rejected);
    }

    #[test]
    fn test_processing_is_deterministic() {
        let processor = processor(FakeExtractor::with("", ICICI_TEXT));
        let document = Document::new(b"%PDF");
        let first = processor.process(&document, Institution::Icici);
        for _ in 0..3 {
            assert_eq!(processor.process(&document, Institution::Icici), first);
        }
    }

    #[test]
    fn test_from_config_uses_window() {
        let mut config = BillscanConfig::default();
        config.validation = ValidationWindow {
            max_future_months: 0,
            max_past_days: 0,
        };
        let processor = StatementProcessor::from_config(&config);
        assert_eq!(processor.validator.window(), &config.validation);
    }

    #[tokio::test]
    async fn test_concurrent_processing() {
        let processor = Arc::new(processor(FakeExtractor::with("", ICICI_TEXT)));

        let mut handles = Vec::new();
        for institution in Institution::ALL {
            let processor = Arc::clone(&processor);
            handles.push(tokio::task::spawn_blocking(move || {
                let outcome = processor.process(&Document::new(b"%PDF"), institution);
                (institution, outcome)
            }));
        }

        for handle in handles {
            let (institution, outcome) = handle.await.unwrap();
            let expected = processor.process(&Document::new(b"%PDF"), institution);
            assert_eq!(outcome, expected, "{}", institution);
            if institution == Institution::Icici {
                assert!(outcome.is_accepted());
            }
        }
    }
}
