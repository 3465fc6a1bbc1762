//! Monthly depreciation run example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use syscohada_core::utils::{init_tracing, MemoryJournal};
use syscohada_core::{
    AmortizationScheduleGenerator, ConformityValidator, EngineConfig, ExportFormat, FixedAsset,
    JournalEntryBuilder, JournalEntryGenerator, LedgerFilter, LedgerQueryService, Period,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    println!("🧾 SYSCOHADA Core - Depreciation Run Example\n");

    let config = EngineConfig::default();
    let journal = MemoryJournal::new();

    // 1. Record the acquisitions
    println!("📊 Recording acquisitions...");
    journal.record(
        JournalEntryBuilder::new(
            "je-001".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            "Acquisition véhicule de livraison".to_string(),
        )
        .reference("FA-2024-001")
        .journal("AC")
        .debit("2451", "Matériel automobile", BigDecimal::from(6_000_000))
        .credit("481", "Fournisseurs d'investissements", BigDecimal::from(6_000_000))
        .build()?,
    )?;
    journal.record(
        JournalEntryBuilder::new(
            "je-002".to_string(),
            NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
            "Acquisition serveur".to_string(),
        )
        .reference("FA-2024-002")
        .journal("AC")
        .debit("2444", "Matériel informatique", BigDecimal::from(2_500_000))
        .credit("481", "Fournisseurs d'investissements", BigDecimal::from(2_500_000))
        .build()?,
    )?;
    println!("  ✓ {} entries in the journal\n", journal.len()?);

    let mut assets = vec![
        FixedAsset::linear(
            "asset-001".to_string(),
            "VEH-001".to_string(),
            "Véhicule de livraison".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            BigDecimal::from(6_000_000),
            5,
        )
        .with_accounts("6813", "2845", "2451")
        .with_residual_value(BigDecimal::from(600_000)),
        FixedAsset::linear(
            "asset-002".to_string(),
            "INF-001".to_string(),
            "Serveur".to_string(),
            NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
            BigDecimal::from(2_500_000),
            4,
        )
        .declining(BigDecimal::from(50)),
    ];

    // 2. Amortization schedules
    println!("📅 Amortization schedules...");
    let schedules = AmortizationScheduleGenerator::new(&config);
    for asset in &assets {
        let schedule = schedules.generate_schedule(asset)?;
        println!("  {} ({})", asset.label, asset.method);
        for line in &schedule.lines {
            println!(
                "    Année {}: dotation {}, cumul {}, VNC {}",
                line.fiscal_year, line.dotation, line.cumulative_depreciation, line.net_book_value
            );
        }
    }
    println!();

    // 3. Monthly postings for the first quarter
    println!("💰 Generating monthly postings...");
    let generator = JournalEntryGenerator::new(&config);
    let validator = ConformityValidator::new(&config);
    let mut sequence = 100;

    for month in 1..=3 {
        let period = Period::new(2024, month)?;
        let checked = generator.generate_checked_batch(&assets, &period, "EX-2024", &validator)?;

        for item in checked {
            if !item.report.valid {
                println!("  ✗ {} rejected: {:?}", item.posting.piece, item.report.errors);
                continue;
            }

            let amount = item.posting.amount.clone();
            if let Some(asset) = assets.iter_mut().find(|a| a.id == item.posting.asset_id) {
                asset.accumulated_depreciation += &amount;
            }

            let piece = item.posting.piece.clone();
            sequence += 1;
            journal.record(item.posting.into_journal_entry(format!("je-{sequence}"))?)?;
            println!("  ✓ {piece}: {amount}");
        }
    }
    println!();

    // 4. Query the resulting ledger
    println!("📈 Ledger statistics...");
    let service = LedgerQueryService::with_config(journal.clone(), config);
    let stats = service.get_stats(&LedgerFilter::new()).await?;
    println!("  Period: {}", stats.period);
    println!("  Accounts: {}", stats.account_count);
    println!("  Entries: {}", stats.entry_count);
    println!("  Total debit: {}", stats.total_debit);
    println!("  Total credit: {}\n", stats.total_credit);

    let expense = service
        .get_account_ledger("6813", &LedgerFilter::new().journal("OD"))
        .await?;
    println!("  {} {}: solde {}", expense.account_code, expense.label, expense.closing_balance);
    for entry in &expense.entries {
        println!("    {} {} {} -> {}", entry.date, entry.piece, entry.debit, entry.balance);
    }
    println!();

    // 5. CSV export
    println!("📄 CSV export...");
    let csv = service
        .export(ExportFormat::Csv, &LedgerFilter::for_period(&Period::new(2024, 3)?))
        .await?;
    print!("{csv}");

    Ok(())
}
