//! Ledger export

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::types::*;
use crate::utils::money::format_amount;

/// Header row of the CSV export
pub const CSV_HEADER: [&str; 8] = [
    "Compte",
    "Libelle",
    "Date",
    "Piece",
    "Description",
    "Debit",
    "Credit",
    "Solde",
];

/// Requested export format
///
/// Only CSV has a defined layout. The other formats are recognised so that
/// callers get `UnsupportedFormat` instead of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Pdf => "pdf",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(LedgerError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// One row per ledger entry, grouped by account in ledger order
pub fn ledger_to_csv(
    ledgers: &BTreeMap<String, AccountLedger>,
    delimiter: u8,
) -> LedgerResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    for ledger in ledgers.values() {
        for entry in &ledger.entries {
            let date = entry.date.format("%Y-%m-%d").to_string();
            let debit = format_amount(&entry.debit);
            let credit = format_amount(&entry.credit);
            let balance = format_amount(&entry.balance);

            writer.write_record([
                ledger.account_code.as_str(),
                ledger.label.as_str(),
                date.as_str(),
                entry.piece.as_str(),
                entry.label.as_str(),
                debit.as_str(),
                credit.as_str(),
                balance.as_str(),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LedgerError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| LedgerError::InvalidInput(format!("CSV output is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::builder::LedgerBuilder;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn entries() -> Vec<JournalEntry> {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        vec![
            JournalEntryBuilder::new("e2".to_string(), day(20), "Règlement; partiel".to_string())
                .reference("RG-1")
                .debit("521", "Banque", BigDecimal::from(400))
                .credit("411", "Clients", BigDecimal::from(400))
                .build()
                .unwrap(),
            JournalEntryBuilder::new("e1".to_string(), day(5), "Vente".to_string())
                .reference("FA-1")
                .debit("411", "Clients", BigDecimal::from(1000))
                .credit("701", "Ventes", BigDecimal::from(1000))
                .build()
                .unwrap(),
        ]
    }

    #[test]
    fn test_csv_layout() {
        let entries = entries();
        let ledgers = LedgerBuilder::new(&entries).build(&LedgerFilter::new());
        let csv = ledger_to_csv(&ledgers, b';').unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Compte;Libelle;Date;Piece;Description;Debit;Credit;Solde");
        assert_eq!(lines.len(), 1 + 4);
        assert_eq!(lines[1], "411;Clients;2024-01-05;FA-1;Vente;1000.00;0.00;1000.00");
        assert_eq!(
            lines[2],
            "411;Clients;2024-01-20;RG-1;\"Règlement; partiel\";0.00;400.00;600.00"
        );
        assert!(lines[3].starts_with("521;Banque;"));
        assert!(lines[4].starts_with("701;Ventes;"));
    }

    #[test]
    fn test_csv_of_empty_ledger_is_header_only() {
        let csv = ledger_to_csv(&BTreeMap::new(), b';').unwrap();
        assert_eq!(csv.trim_end(), CSV_HEADER.join(";"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!(matches!(
            "odt".parse::<ExportFormat>(),
            Err(LedgerError::UnsupportedFormat(_))
        ));
    }
}
