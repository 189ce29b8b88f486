use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use bibliostat::columns as col;
use bibliostat::config::Settings;
use bibliostat::data::Value;
use bibliostat::import::{self, Domain};
use bibliostat::report::{Collection, Expenditures, Period};
use bibliostat::Error;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Fixed-width report with `banner` header lines and a three-line footer.
fn report(banner: usize, headers: (&str, &str), rows: &[(&str, f64)]) -> String {
    let mut out = String::from("Statistik\nBibliothek\n");
    for _ in 2..banner {
        out.push('\n');
    }
    writeln!(out, "{:<28}  {:>12}", headers.0, headers.1).unwrap();
    writeln!(out, "{}  {}", "-".repeat(28), "-".repeat(12)).unwrap();
    for (name, amount) in rows {
        writeln!(out, "{name:<28}  {amount:>12.2}").unwrap();
    }
    writeln!(out, "{}  {}", "-".repeat(28), "-".repeat(12)).unwrap();
    writeln!(out, "{:<28}  {:>12}", "Summe", "0.00").unwrap();
    out.push_str("Ende\n");
    out
}

fn settings(root: &Path) -> Settings {
    let settings = Settings::default().rooted_at(root);
    write(
        &settings.helpers.suppliers,
        "Lieferant,Lieferant Abk.\nAutorenbuchhandlung Marx,Marx\n",
    );
    write(
        &settings.helpers.cost_centres,
        "S Bezeichnung,Bezeichnung\nKST 100,Monographien\n",
    );
    write(
        &settings.helpers.rvk,
        "Notation,Benennung\nLH,Kunstgeschichte\nLH 100,Allgemeines\n",
    );
    settings
}

#[test]
fn umsatz_exports_become_a_store_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let import_dir = settings.import_dir(Domain::Umsatz);
    let headers = ("Lieferant", "Umsatz (EUR)");
    write(
        &import_dir.join("2020_12_01.txt"),
        &report(5, headers, &[("Autorenbuchhandlung Marx", 1000.0), ("Antiquariat Müller", 250.5)]),
    );
    write(
        &import_dir.join("2021_03_01.txt"),
        &report(5, headers, &[("Autorenbuchhandlung Marx", 1200.0), ("Antiquariat Müller", 300.0)]),
    );
    write(&import_dir.join("notes.txt"), "not an export\n");

    let outcome = import::run(Domain::Umsatz, &settings).unwrap();
    assert_eq!(outcome.files.len(), 2);
    assert_eq!(outcome.records, 4);
    assert_eq!(outcome.store, settings.store_path(Domain::Umsatz));

    let period = Period::new(ymd(2014, 12, 1), ymd(2021, 3, 15));
    let sales = Expenditures::open(&outcome.store, period).unwrap();
    assert_eq!(
        sales.table().columns,
        vec![col::SUPPLIER, col::SALES, col::DATE, col::SUPPLIER_SHORT]
    );
    assert_eq!(sales.total_net(col::DATE, col::SALES).unwrap(), 2750.5);
    assert_eq!(sales.net_current_year(col::DATE, col::SALES).unwrap(), 1500.0);

    // unmapped suppliers keep their full name
    let suppliers = sales.table().unique_values(col::SUPPLIER_SHORT).unwrap();
    assert!(suppliers.contains(&Value::from("Marx")));
    assert!(suppliers.contains(&Value::from("Antiquariat Müller")));

    let marx = Value::from("Marx");
    let monthly = sales
        .monthly_difference(col::DATE, col::SUPPLIER_SHORT, col::SALES, col::SALES_DIFF, &marx)
        .unwrap();
    let diffs: Vec<_> = monthly.column(col::SALES_DIFF).unwrap().cloned().collect();
    assert_eq!(diffs, vec![Value::Float(1200.0)]);
}

#[test]
fn budget_codes_are_named() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    write(
        &settings.import_dir(Domain::Budget).join("2021_12_01.txt"),
        &report(6, ("S Bezeichnung", "Ausg. ges."), &[("KST 100", 500.0), ("KST 999", 20.0)]),
    );

    let outcome = import::run(Domain::Budget, &settings).unwrap();
    assert_eq!(outcome.records, 2);

    let period = Period::new(ymd(2014, 12, 1), ymd(2022, 1, 10));
    let budget = Expenditures::open(&outcome.store, period).unwrap();
    let names: Vec<_> = budget.table().column(col::COST_CENTRE).unwrap().cloned().collect();
    assert_eq!(names, vec![Value::from("Monographien"), Value::from("KST 999")]);
}

#[test]
fn new_acquisitions_are_classified_and_appended() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let import_dir = settings.import_dir(Domain::NewAcquisitions);
    write(
        &import_dir.join("2021_01_01.tsv"),
        "Signatur\tTitel\nLH 100 A\tEins\nMS 2000\tZwei\n/\tOhne\n",
    );

    let first = import::run(Domain::NewAcquisitions, &settings).unwrap();
    assert_eq!(first.records, 3);

    fs::remove_file(import_dir.join("2021_01_01.tsv")).unwrap();
    write(&import_dir.join("2021_02_01.tsv"), "Signatur\tTitel\nLH 100 A\tEins\n/\tOhne\n");
    let second = import::run(Domain::NewAcquisitions, &settings).unwrap();
    assert_eq!(second.records, 2);

    let period = Period::new(ymd(2014, 12, 1), ymd(2021, 3, 1));
    let acquisitions = Collection::open(&second.store, period).unwrap();
    let table = acquisitions.table();
    assert_eq!(table.len(), 5);

    let groups: Vec<_> = table.column(col::RVK_GROUP).unwrap().cloned().collect();
    assert_eq!(groups[0], Value::from("LH"));
    let group_names: Vec<_> = table.column(col::RVK_GROUP_NAME).unwrap().cloned().collect();
    assert_eq!(group_names[0], Value::from("Kunstgeschichte"));
    assert_eq!(group_names[1], Value::Null);
    let notation_names: Vec<_> = table.column(col::RVK_NOTATION_NAME).unwrap().cloned().collect();
    assert_eq!(notation_names[0], Value::from("Allgemeines"));

    // the repeated shelfmark counts once, the placeholders every time
    let growth = acquisitions
        .total_years(col::DATE, col::SHELFMARK, col::COPIES, col::TOTAL)
        .unwrap();
    assert_eq!(
        growth.rows,
        vec![vec![Value::Integer(2021), Value::Integer(4), Value::Integer(4)]]
    );
}

#[test]
fn missing_folder_and_store_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());

    let err = import::run(Domain::Umsatz, &settings).unwrap_err();
    assert!(matches!(err, Error::DirectoryNotFound(_)));

    let period = Period::new(ymd(2014, 12, 1), ymd(2021, 3, 1));
    let err = Expenditures::open(&settings.store_path(Domain::Umsatz), period).unwrap_err();
    assert!(matches!(err, Error::StoreNotFound(_)));
}

#[test]
fn folder_without_dated_files_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    write(&settings.import_dir(Domain::Budget).join("readme.txt"), "nothing\n");

    let outcome = import::run(Domain::Budget, &settings).unwrap();
    assert_eq!(outcome.records, 0);
    assert!(!settings.store_path(Domain::Budget).exists());
}
