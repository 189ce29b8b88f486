//! Writes a demo folder layout: export files for the text-based domains plus
//! the helper lookups, ready for `bibliostat-import`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use clap::Parser;

use bibliostat::config::{HelperFiles, Settings};
use bibliostat::import::Domain;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// (full name, abbreviation, yearly sales in EUR)
const SUPPLIERS: [(&str, &str, f64); 6] = [
    ("Autorenbuchhandlung Marx GmbH", "Marx", 48_000.0),
    ("Antiquariat Müller", "Antiquariat", 6_500.0),
    ("Hugendubel Fachinformationen", "Hugendubel", 31_000.0),
    ("Schweitzer Fachinformationen", "Schweitzer", 22_000.0),
    ("Dietrich Reimer Verlag", "Reimer", 3_200.0),
    ("Buchhandlung Walther König", "König", 9_800.0),
];

/// (cost centre code, name, yearly budget in EUR)
const COST_CENTRES: [(&str, &str, f64); 5] = [
    ("KST 100", "Monographien", 60_000.0),
    ("KST 110", "Zeitschriften", 35_000.0),
    ("KST 120", "E-Medien", 28_000.0),
    ("KST 130", "Buchbinderei", 7_500.0),
    ("KST 140", "Antiquaria", 4_000.0),
];

/// (RVK main class, name)
const RVK_CLASSES: [(&str, &str); 8] = [
    ("LH", "Kunstgeschichte"),
    ("LK", "Kunstgeschichte: Mittelalter"),
    ("LI", "Kunstgeschichte: Malerei"),
    ("LO", "Kunstgeschichte: Plastik"),
    ("LP", "Kunstgeschichte: Architektur"),
    ("AN", "Buch- und Bibliothekswesen"),
    ("NK", "Geschichte: Mittelalter"),
    ("MS", "Soziologie"),
];

/// (media type code, name)
const MEDIA_TYPES: [(&str, &str); 3] = [("Aa", "Buch"), ("Oa", "E-Book"), ("Ac", "Mehrbändiges Werk")];

const TITLES: [&str; 8] = [
    "Die Kunst der Renaissance",
    "Handbuch der Bibliothekspraxis",
    "Bauhaus und Moderne",
    "Skulptur im Mittelalter",
    "Stadtgeschichte Münchens",
    "Farbe und Licht",
    "Sammeln und Ausstellen",
    "Architektur des Barock",
];

/// Write demo export files and helper lookups.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Folder that receives `import_folders/` and `helper/`.
    #[arg(default_value = "data")]
    root: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Export dates: December 1st of the last `years` years and the first of
/// every month of the running year.
fn export_dates(today: NaiveDate, years: i32) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = (today.year() - years..today.year())
        .filter_map(|y| NaiveDate::from_ymd_opt(y, 12, 1))
        .collect();
    dates.extend((1..=today.month()).filter_map(|m| NaiveDate::from_ymd_opt(today.year(), m, 1)));
    dates
}

fn file_name(date: NaiveDate, ext: &str) -> String {
    format!("{}.{ext}", date.format("%Y_%m_%d"))
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Fixed-width report: a banner of `banner_lines` lines, a ruled table and
/// a three-line footer.
fn fixed_width_report(
    title: &str,
    date: NaiveDate,
    banner_lines: usize,
    headers: (&str, &str),
    rows: &[(&str, f64)],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "Bibliothek Musterstadt");
    let _ = writeln!(out, "Stichtag {}", date.format("%d.%m.%Y"));
    for _ in 3..banner_lines {
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "{:<32}  {:>14}", headers.0, headers.1);
    let _ = writeln!(out, "{}  {}", "-".repeat(32), "-".repeat(14));
    let mut total = 0.0;
    for (name, amount) in rows {
        let _ = writeln!(out, "{name:<32}  {amount:>14.2}");
        total += amount;
    }
    let _ = writeln!(out, "{}  {}", "-".repeat(32), "-".repeat(14));
    let _ = writeln!(out, "{:<32}  {total:>14.2}", "Summe");
    let _ = writeln!(out, "Ende der Liste");
    out
}

/// Cumulative share of the yearly amount reached at an export date.
fn year_share(date: NaiveDate) -> f64 {
    f64::from(date.month()) / 12.0
}

fn umsatz(settings: &Settings, dates: &[NaiveDate], rng: &mut SimpleRng) -> anyhow::Result<()> {
    let dir = settings.import_dir(Domain::Umsatz);
    for &date in dates {
        let rows: Vec<(&str, f64)> = SUPPLIERS
            .iter()
            .map(|&(name, _, yearly)| {
                let noise = 0.85 + 0.3 * rng.next_f64();
                (name, (yearly * year_share(date) * noise * 100.0).round() / 100.0)
            })
            .collect();
        let report = fixed_width_report(
            "Umsatzstatistik Lieferanten",
            date,
            5,
            ("Lieferant", "Umsatz (EUR)"),
            &rows,
        );
        write_file(&dir.join(file_name(date, "txt")), &report)?;
    }
    Ok(())
}

fn budget(settings: &Settings, dates: &[NaiveDate], rng: &mut SimpleRng) -> anyhow::Result<()> {
    let dir = settings.import_dir(Domain::Budget);
    for &date in dates {
        let rows: Vec<(&str, f64)> = COST_CENTRES
            .iter()
            .map(|&(code, _, yearly)| {
                let noise = 0.9 + 0.2 * rng.next_f64();
                (code, (yearly * year_share(date) * noise * 100.0).round() / 100.0)
            })
            .collect();
        let report = fixed_width_report(
            "Budgetübersicht Kostenstellen",
            date,
            6,
            ("S Bezeichnung", "Ausg. ges."),
            &rows,
        );
        write_file(&dir.join(file_name(date, "txt")), &report)?;
    }
    Ok(())
}

/// Monthly acquisition lists for the previous `years` years and the running
/// year. Some shelfmarks reappear in later lists.
fn new_acquisitions(
    settings: &Settings,
    today: NaiveDate,
    years: i32,
    rng: &mut SimpleRng,
) -> anyhow::Result<()> {
    let dir = settings.import_dir(Domain::NewAcquisitions);
    let mut issued: Vec<String> = Vec::new();
    let mut number = 100;
    for year in today.year() - years..=today.year() {
        let last_month = if year == today.year() { today.month() } else { 12 };
        for month in 1..=last_month {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) else {
                continue;
            };
            let mut out = String::from("Signatur\tTitel\t0500\n");
            for _ in 0..8 + rng.below(12) {
                let shelfmark = if !issued.is_empty() && rng.next_f64() < 0.08 {
                    rng.pick(&issued).clone()
                } else if rng.next_f64() < 0.05 {
                    "/".to_string()
                } else {
                    number += 1 + rng.below(40);
                    let (class, _) = rng.pick(&RVK_CLASSES);
                    format!("{class} {number}")
                };
                let (media, _) = rng.pick(&MEDIA_TYPES);
                let _ = writeln!(out, "{shelfmark}\t{}\t{media}", rng.pick(&TITLES));
                issued.push(shelfmark);
            }
            write_file(&dir.join(file_name(date, "tsv")), &out)?;
        }
    }
    Ok(())
}

fn lookup_csv(header: (&str, &str), rows: impl IntoIterator<Item = (String, String)>) -> String {
    let mut out = format!("{},{}\n", header.0, header.1);
    for (key, value) in rows {
        let _ = writeln!(out, "{key},{value}");
    }
    out
}

fn helpers(settings: &Settings) -> anyhow::Result<()> {
    let h = &settings.helpers;
    write_file(
        &h.suppliers,
        &lookup_csv(
            ("Lieferant", "Lieferant Abk."),
            SUPPLIERS.iter().map(|(n, a, _)| (n.to_string(), a.to_string())),
        ),
    )?;
    write_file(
        &h.cost_centres,
        &lookup_csv(
            ("S Bezeichnung", "Bezeichnung"),
            COST_CENTRES.iter().map(|(c, n, _)| (c.to_string(), n.to_string())),
        ),
    )?;
    write_file(
        &h.rvk,
        &lookup_csv(
            ("Notation", "Benennung"),
            RVK_CLASSES.iter().map(|(c, n)| (c.to_string(), n.to_string())),
        ),
    )?;
    write_file(
        &h.media_types,
        &lookup_csv(
            ("Code", "Materialart"),
            MEDIA_TYPES.iter().map(|(c, n)| (c.to_string(), n.to_string())),
        ),
    )?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let settings = Settings {
        import_root: args.root.join("import_folders"),
        storage_root: args.root.join("storage_folders"),
        helpers: HelperFiles {
            suppliers: args.root.join("helper/lieferanten.csv"),
            cost_centres: args.root.join("helper/kostenstellen.csv"),
            rvk: args.root.join("helper/rvk.csv"),
            media_types: args.root.join("helper/materialarten.csv"),
        },
        ..Settings::default()
    };

    let mut rng = SimpleRng::new(args.seed);
    let today = chrono::Local::now().date_naive();
    let dates = export_dates(today, 5);

    helpers(&settings)?;
    umsatz(&settings, &dates, &mut rng)?;
    budget(&settings, &dates, &mut rng)?;
    new_acquisitions(&settings, today, 3, &mut rng)?;

    println!(
        "Sample exports written below {}; run `bibliostat-import --all` next",
        args.root.display()
    );
    Ok(())
}
