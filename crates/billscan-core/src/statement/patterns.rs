//! Built-in extraction patterns for supported card issuers.
//!
//! Each list runs from the most specific layout to the loosest fallback. Literal
//! spaces match any whitespace run once compiled (see [`super::catalog::Strategy`]).

use super::catalog::{Field, ProfileSpec};
use crate::models::institution::Institution;

pub(crate) static BUILTIN_PROFILES: &[ProfileSpec] = &[
    ProfileSpec {
        institution: Institution::Sbi,
        fields: SBI,
        reject_markers: &[],
    },
    ProfileSpec {
        institution: Institution::IndusInd,
        fields: INDUSIND,
        reject_markers: &[],
    },
    ProfileSpec {
        institution: Institution::Axis,
        fields: AXIS,
        reject_markers: &[],
    },
    ProfileSpec {
        institution: Institution::Icici,
        fields: ICICI,
        // EMI amortization schedules arrive from the same sender as statements.
        reject_markers: &["amortization schedule"],
    },
    ProfileSpec {
        institution: Institution::Kotak,
        fields: KOTAK,
        reject_markers: &[],
    },
    ProfileSpec {
        institution: Institution::Rbl,
        fields: RBL,
        reject_markers: &[],
    },
    ProfileSpec {
        institution: Institution::Hdfc,
        fields: HDFC,
        reject_markers: &[],
    },
    ProfileSpec {
        institution: Institution::Bob,
        fields: BOB,
        reject_markers: &[],
    },
];

const SBI: &[(Field, &[&str])] = &[
    (
        Field::CardNumber,
        &[
            r"XXXX XXXX XXXX (\w+)",
            r"XXXX XXXX XXXX (\w{2,4})",
            r"Credit Card Number.*?XXXX XXXX XXXX (\w+)",
            r"XXXX\s+XXXX\s+XXXX\s+XX(\d{2,4})",
        ],
    ),
    (
        Field::StatementDate,
        &[
            r"Statement\s*Date\s*[:\-]?\s*(\d{2}\s+[A-Za-z]{3}\s+\d{4})",
            r"Statement\s*Date\s*[:\-]?\s*(\d{1,2}\s+[A-Za-z]+\s+\d{4})",
            r"Statement.*?Date.*?(\d{2}/\d{2}/\d{4})",
            r"Statement.*?(\d{2}-\d{2}-\d{4})",
        ],
    ),
    (
        Field::DueDate,
        &[
            // label and value on separate lines, or value pushed to the far right
            r"Payment\s+Due\s+Date[\s:\-.]*?(?:\r?\n|\s)+.*?([0-3]?\d\s+[A-Za-z]{3}\s+\d{4})",
            r"Payment\s+Due\s+Date[\s:\-.]*?(?:\r?\n|\s)+.*?(\d{2}/\d{2}/\d{4})",
            r"Payment\s+Due\s+Date[\s:\-.]*?(?:\r?\n|\s)+.*?(\d{2}-[A-Za-z]{3}-\d{4})",
            r"(?:Total\s+)?Payment\s+Due\s+Date\s*[:\-]?\s*([0-3]?\d\s+[A-Za-z]{3}\s+\d{4})",
            r"Payment\s+Due\s+Date\s*[:\-]?\s*(\d{2}-[A-Za-z]{3}-\d{4})",
            r"Payment\s+Due\s+Date\s*[:\-]?\s*(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::TotalDue,
        &[
            r"Total Payment Due\s*[:\-]?\s*₹?\s*([\d,]+\.\d{2})",
            r"Total Amount Due\s*[:\-]?\s*₹?\s*([\d,]+\.\d{2})",
            r"\*Total Amount Due.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::MinDue,
        &[
            r"Minimum\s+(?:Amount|Payment)\s+Due\s*[:\-]?\s*₹?\s*([\d,]+\.\d{2})",
            r"\*\*Minimum Amount Due.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::CreditLimit,
        &[
            r"Credit\s+Limit\s*\(.*?\)\s*[:\-]?\s*₹?\s*([\d,]+\.\d{2})",
            r"Credit\s+Limit.*?₹?\s*([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::AvailableLimit,
        &[
            r"Available\s+Credit\s+Limit\s*[:\-]?\s*₹?\s*([\d,]+\.\d{2})",
            r"Available.*?Limit.*?₹?\s*([\d,]+\.\d{2})",
        ],
    ),
];

const INDUSIND: &[(Field, &[&str])] = &[
    (
        Field::CardNumber,
        &[
            r"Credit Card No\. (\d{4})XXXXXXXX(\d{4})",
            r"Credit Card No\.\s+\d{4}X+(\d{4})",
            r"Card.*?No.*?(\d{4})XXXXXXXX(\d{4})",
            r"(\d{4})\*+(\d{4})",
        ],
    ),
    (
        Field::StatementDate,
        &[
            r"Statement Date\s+(\d{2}/\d{2}/\d{4})",
            r"Statement.*?Date.*?(\d{2}/\d{2}/\d{4})",
            r"Statement.*?(\d{2}-\d{2}-\d{4})",
        ],
    ),
    (
        Field::DueDate,
        &[
            r"Payment Due Date\s+(\d{2}/\d{2}/\d{4})",
            r"Due Date.*?(\d{2}/\d{2}/\d{4})",
            r"Pay.*?by.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::TotalDue,
        &[
            r"Total Amount Due[\s\S]*?([\d,]+\.\d{2}) DR",
            r"Total Amount Due\s+([\d,]+\.\d{2})\s+DR",
            r"Total.*?Due.*?([\d,]+\.\d{2})",
            r"Amount Due.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::MinDue,
        &[
            r"Minimum Amount Due\s+([\d,]+\.\d{2})",
            r"Min.*?Due.*?([\d,]+\.\d{2})",
            r"MAD.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::CreditLimit,
        &[
            r"Credit.*?Credit Limit\s+([\d,]+\.\d{2})",
            r"Total.*?Limit.*?([\d,]+\.\d{2})",
            r"Credit Limit.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::AvailableLimit,
        &[
            r"Available Credit Limit\s+([\d,]+\.\d{2})",
            r"Available.*?Limit.*?([\d,]+\.\d{2})",
        ],
    ),
];

const AXIS: &[(Field, &[&str])] = &[
    (
        Field::CardNumber,
        &[
            r"(\d{6})\*+(\d{4})",
            r"(\d{4})\*+(\d{4})",
            r"Card.*?(\d{6})\*+(\d{4})",
            r"Neo.*?(\d{6})\*+(\d{4})",
        ],
    ),
    (
        Field::StatementDate,
        &[
            r"Statement\s*Date\s*[:\-]?\s*(\d{2}/\d{2}/\d{4})",
            r"Generation\s*Date\s*[:\-]?\s*(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::DueDate,
        &[
            // summary row: statement period end, then due date
            r"(\d{2}/\d{2}/\d{4})\s+(\d{2}/\d{2}/\d{4})\s*$",
            r"Payment Due Date.*?(\d{2}/\d{2}/\d{4})",
            r"Due.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::TotalDue,
        &[
            r"([\d,]+\.\d{2}) Dr\s+([\d,]+\.\d{2}) Dr",
            r"Total Payment Due.*?([\d,]+\.\d{2})",
            r"Total.*?Due.*?([\d,]+\.\d{2}) Dr",
            r"Amount Due.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::MinDue,
        &[
            r"([\d,]+\.\d{2}) Dr\s+([\d,]+\.\d{2}) Dr",
            r"Minimum Payment Due.*?([\d,]+\.\d{2})",
            r"Min.*?Due.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::CreditLimit,
        &[
            r"Credit Limit\s+([\d,]+\.\d{2})",
            r"Total.*?Limit.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::AvailableLimit,
        &[
            r"Available Credit Limit\s+([\d,]+\.\d{2})",
            r"Available.*?Limit.*?([\d,]+\.\d{2})",
        ],
    ),
];

// ICICI statements render headings with doubled glyphs ("SSTTAATTEEMMEENNTT")
// and the rupee sign as a backtick.
const ICICI: &[(Field, &[&str])] = &[
    (
        Field::CardNumber,
        &[
            r"(\d{4})XXXXXXXX(\d{4})",
            r"(\d{4})\*+(\d{4})",
            r"Card.*?(\d{4})XXXXXXXX(\d{4})",
            r"Credit Card.*?(\d{4})\*+(\d{4})",
        ],
    ),
    (
        Field::StatementDate,
        &[
            r"SSTTAATTEEMMEENNTT DDAATTEE\s+(\w+ \d{1,2}, \d{4})",
            r"Statement.*?Date.*?(\w+ \d{1,2}, \d{4})",
            r"Statement.*?(\d{2}/\d{2}/\d{4})",
            r"STATEMENT.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::DueDate,
        &[
            r"PPAAYYMMEENNTT DDUUEE DDAATTEE\s+(\w+ \d{1,2}, \d{4})",
            r"Payment.*?Due.*?Date.*?(\w+ \d{1,2}, \d{4})",
            r"Due Date.*?(\d{2}/\d{2}/\d{4})",
            r"PAYMENT.*?DUE.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::TotalDue,
        &[
            r"Total Amount due\s+-\s+`([\d,]+\.\d{2})",
            r"Total.*?due.*?`([\d,]+\.\d{2})",
            r"Total Amount.*?([\d,]+\.\d{2})",
            r"Amount due.*?([\d,]+\.\d{2})",
            r"TOTAL\s+([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::MinDue,
        &[
            r"Minimum Amount due.*?`([\d,]+\.\d{2})",
            r"Minimum.*?due.*?([\d,]+\.\d{2})",
            r"Min.*?Amount.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::CreditLimit,
        &[
            r"Credit Limit \(Including cash\).*?`([\d,]+\.\d{2})",
            r"Credit Limit.*?`([\d,]+\.\d{2})",
            r"Total.*?Limit.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::AvailableLimit,
        &[
            r"Available Credit \(Including cash\).*?`([\d,]+\.\d{2})",
            r"Available.*?Credit.*?`([\d,]+\.\d{2})",
            r"Available.*?([\d,]+\.\d{2})",
        ],
    ),
];

const KOTAK: &[(Field, &[&str])] = &[
    (
        Field::CardNumber,
        &[
            r"(\d{4})XXXXXXXX(\d{4})",
            r"(\d{4})\*+(\d{4})",
            r"Card.*?(\d{4})XXXXXXXX(\d{4})",
        ],
    ),
    (
        Field::StatementDate,
        &[
            r"Statement Date (\d{2}-\w{3}-\d{4})",
            r"Statement.*?Date.*?(\d{2}-\w{3}-\d{4})",
            r"Statement.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::DueDate,
        &[
            r"Remember to pay by (\d{2}-\w{3}-\d{4})",
            r"Pay by (\d{2}-\w{3}-\d{4})",
            r"Due.*?(\d{2}-\w{3}-\d{4})",
            r"Payment.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::TotalDue,
        &[
            r"Total Amount Due \(TAD\) Rs\.([\d,]+\.\d{2})",
            r"Total.*?Due.*?Rs\.([\d,]+\.\d{2})",
            r"TAD.*?Rs\.([\d,]+\.\d{2})",
            r"Amount Due.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::MinDue,
        &[
            r"Minimum Amount Due \(MAD\) Rs\.([\d,]+\.\d{2})",
            r"MAD.*?Rs\.([\d,]+\.\d{2})",
            r"Minimum.*?Rs\.([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::CreditLimit,
        &[
            r"Total Credit Limit \(incl\.cash\): Rs\.([\d,]+\.\d{2})",
            r"Credit Limit.*?Rs\.([\d,]+\.\d{2})",
            r"Total.*?Limit.*?Rs\.([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::AvailableLimit,
        &[
            r"Available Credit Limit: Rs\.([\d,]+\.\d{2})",
            r"Available.*?Rs\.([\d,]+\.\d{2})",
            r"Available.*?Limit.*?([\d,]+\.\d{2})",
        ],
    ),
];

const RBL: &[(Field, &[&str])] = &[
    (
        Field::CardNumber,
        &[
            r"XXXXXXXXXXXXXX(\d{2})",
            r"(\d{4})\*+(\d{4})",
            r"Card.*?(\d{4})\*+(\d{4})",
            r"XXXX.*?(\d{4})",
        ],
    ),
    (
        Field::StatementDate,
        &[
            r"Statement Date\s+(\d{2}-\d{2}-\d{4})",
            r"Statement.*?Date.*?(\d{2}-\d{2}-\d{4})",
            r"Statement.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::DueDate,
        &[
            r"Payment Due Date\s+(\d{2} \w{3} \d{4})",
            r"Due Date.*?(\d{2} \w{3} \d{4})",
            r"Payment.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::TotalDue,
        &[
            r"Total Amount Due\s+([\d,]+\.\d{2})",
            r"Total.*?Due.*?([\d,]+\.\d{2})",
            r"Amount Due.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::MinDue,
        &[
            r"Min\. Amt\. Due\s+([\d,]+\.\d{2})",
            r"Minimum.*?Due.*?([\d,]+\.\d{2})",
            r"Min.*?Due.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::CreditLimit,
        &[
            r"Total Credit Limit\s+([\d,]+\.\d{2})",
            r"Credit Limit.*?([\d,]+\.\d{2})",
            r"Total.*?Limit.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::AvailableLimit,
        &[
            r"Available Credit Limit\s+([\d,]+\.\d{2})",
            r"Available.*?Limit.*?([\d,]+\.\d{2})",
        ],
    ),
];

const HDFC: &[(Field, &[&str])] = &[
    (
        Field::CardNumber,
        &[
            r"(\d{4})\s*\*+\s*(\d{4})",
            r"(\d{4})XXXXXXXX(\d{4})",
            r"Card.*?(\d{4})\*+(\d{4})",
            r"HDFC.*?(\d{4})\*+(\d{4})",
        ],
    ),
    (
        Field::StatementDate,
        &[
            r"Statement Date\s*:?\s*(\d{2}/\d{2}/\d{4})",
            r"Statement.*?(\d{2}-\d{2}-\d{4})",
            r"Date.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::DueDate,
        &[
            r"Payment Due Date\s*:?\s*(\d{2}/\d{2}/\d{4})",
            r"Due Date.*?(\d{2}/\d{2}/\d{4})",
            r"Pay.*?by.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::TotalDue,
        &[
            r"Total Amount Due\s*:?\s*Rs\.?\s*([\d,]+\.\d{2})",
            r"Total.*?Due.*?Rs\.?\s*([\d,]+\.\d{2})",
            r"Amount Due.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::MinDue,
        &[
            r"Minimum Amount Due\s*:?\s*Rs\.?\s*([\d,]+\.\d{2})",
            r"Min.*?Due.*?Rs\.?\s*([\d,]+\.\d{2})",
            r"Minimum.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::CreditLimit,
        &[
            r"Credit Limit\s*:?\s*Rs\.?\s*([\d,]+\.\d{2})",
            r"Total.*?Limit.*?Rs\.?\s*([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::AvailableLimit,
        &[
            r"Available Credit\s*:?\s*Rs\.?\s*([\d,]+\.\d{2})",
            r"Available.*?Rs\.?\s*([\d,]+\.\d{2})",
        ],
    ),
];

const BOB: &[(Field, &[&str])] = &[
    (
        Field::CardNumber,
        &[
            r"(\d{4})\s*\*+\s*(\d{4})",
            r"(\d{4})XXXXXXXX(\d{4})",
            r"Card.*?(\d{4})\*+(\d{4})",
        ],
    ),
    (
        Field::StatementDate,
        &[
            r"Statement Date\s*:?\s*(\d{2}/\d{2}/\d{4})",
            r"Statement.*?(\d{2}-\d{2}-\d{4})",
            r"Date.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::DueDate,
        &[
            r"Payment Due Date\s*:?\s*(\d{2}/\d{2}/\d{4})",
            r"Due Date.*?(\d{2}/\d{2}/\d{4})",
            r"Pay.*?by.*?(\d{2}/\d{2}/\d{4})",
        ],
    ),
    (
        Field::TotalDue,
        &[
            r"Total Amount Due\s*:?\s*([\d,]+\.\d{2})",
            r"Total.*?Due.*?([\d,]+\.\d{2})",
            r"Amount Due.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::MinDue,
        &[
            r"Minimum Amount Due\s*:?\s*([\d,]+\.\d{2})",
            r"Min.*?Due.*?([\d,]+\.\d{2})",
            r"Minimum.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::CreditLimit,
        &[
            r"Credit Limit\s*:?\s*([\d,]+\.\d{2})",
            r"Total.*?Limit.*?([\d,]+\.\d{2})",
        ],
    ),
    (
        Field::AvailableLimit,
        &[
            r"Available Credit\s*:?\s*([\d,]+\.\d{2})",
            r"Available.*?([\d,]+\.\d{2})",
        ],
    ),
];
