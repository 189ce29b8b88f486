use std::path::PathBuf;

use anyhow::Context;

use bibliostat::columns as col;
use bibliostat::config::Settings;
use bibliostat::data::{Lookup, Table, Value};
use bibliostat::import::Domain;
use bibliostat::report::present::{
    category_bars, column_series, dropdown_options, format_eur, series_by_group, Axis, Series,
};
use bibliostat::report::{
    group_sum, top_number_values, Collection, Expenditures, LoanStats, Period, ReadingRoom,
    DEFAULT_TOP_N,
};

const TOP_COST_CENTRES: usize = 4;
const TOP_TITLES: usize = 5;

// ---------------------------------------------------------------------------
// View model: what the panels draw
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tab {
    Expenditures,
    ReadingAndLoans,
    Collection,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Expenditures, Tab::ReadingAndLoans, Tab::Collection];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Expenditures => "Umsatz und Budget",
            Tab::ReadingAndLoans => "Lesesaal und Ausleihe",
            Tab::Collection => "Neuerwerbungen und Bestand",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    Lines(Vec<Series>),
    /// Bars of every series stacked at the same x.
    StackedBars(Vec<Series>),
    /// One labelled bar per category.
    Categories(Vec<(String, f64)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub kind: ChartKind,
}

impl Chart {
    fn new(title: impl Into<String>, x_label: &'static str, y_label: &'static str, kind: ChartKind) -> Self {
        Self {
            title: title.into(),
            x_label,
            y_label,
            kind,
        }
    }
}

/// A headline figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub value: String,
}

impl Card {
    fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

/// Cards, charts and tables of one tab section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub cards: Vec<Card>,
    pub charts: Vec<Chart>,
    pub tables: Vec<(String, Table)>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct DashboardState {
    pub settings: Settings,
    pub period: Period,
    pub tab: Tab,

    sales: Option<Expenditures>,
    reading_room: Option<ReadingRoom>,

    pub suppliers: Vec<Value>,
    pub selected_supplier: Option<Value>,
    pub reading_years: Vec<i32>,
    pub selected_year: Option<i32>,

    pub expenditures: Section,
    pub supplier: Section,
    pub reading_loans: Section,
    pub reading_month: Section,
    pub collection: Section,

    /// Status / error messages shown in the UI.
    pub status_messages: Vec<String>,
}

impl DashboardState {
    pub fn new(settings: Settings) -> Self {
        let period = Period::until_today(settings.snapshot_start);
        let mut state = Self {
            settings,
            period,
            tab: Tab::Expenditures,
            sales: None,
            reading_room: None,
            suppliers: Vec::new(),
            selected_supplier: None,
            reading_years: Vec::new(),
            selected_year: None,
            expenditures: Section::default(),
            supplier: Section::default(),
            reading_loans: Section::default(),
            reading_month: Section::default(),
            collection: Section::default(),
            status_messages: Vec::new(),
        };
        state.reload();
        state
    }

    /// Point the dashboard at another storage folder and rebuild every view.
    pub fn set_storage_root(&mut self, root: PathBuf) {
        log::info!("Storage folder set to {}", root.display());
        self.settings.storage_root = root;
        self.reload();
    }

    /// Re-read all stores and rebuild every view.
    pub fn reload(&mut self) {
        self.status_messages.clear();
        self.period = Period::until_today(self.settings.snapshot_start);

        self.expenditures = match self.build_expenditures() {
            Ok(section) => section,
            Err(e) => self.report_failure("Umsatz und Budget", e),
        };
        self.reading_loans = match self.build_reading_loans() {
            Ok(section) => section,
            Err(e) => self.report_failure("Lesesaal und Ausleihe", e),
        };
        self.collection = match self.build_collection() {
            Ok(section) => section,
            Err(e) => self.report_failure("Neuerwerbungen und Bestand", e),
        };

        let supplier = self.selected_supplier.clone();
        self.select_supplier(supplier);
        let year = self.selected_year;
        self.select_year(year);
    }

    fn report_failure(&mut self, section: &str, e: anyhow::Error) -> Section {
        log::error!("{section}: {e:#}");
        self.status_messages.push(format!("{section}: {e:#}"));
        Section::default()
    }

    fn store(&self, domain: Domain) -> PathBuf {
        self.settings.store_path(domain)
    }

    // ---- Umsatz und Budget ----

    fn build_expenditures(&mut self) -> anyhow::Result<Section> {
        self.sales = None;
        self.suppliers.clear();

        let sales = Expenditures::open(&self.store(Domain::Umsatz), self.period)
            .context("Umsatz store")?;
        let mut section = Section::default();
        section.cards.push(Card::new(
            "Gesamtumsatz",
            format_eur(sales.total_net(col::DATE, col::SALES)?),
        ));
        section.cards.push(Card::new(
            "Umsatz laufendes Jahr",
            format_eur(sales.net_current_year(col::DATE, col::SALES)?),
        ));

        let years = sales.net_years(col::DATE)?;
        let years = top_number_values(&years, col::SUPPLIER_SHORT, col::SALES, col::OTHER, DEFAULT_TOP_N)?;
        let years = group_sum(&years, &[col::DATE, col::SUPPLIER_SHORT], &[col::SALES])?;
        section.charts.push(Chart::new(
            "Gesamtumsatz Lieferanten nach Jahren",
            "Jahr",
            "Umsatz (EUR)",
            ChartKind::StackedBars(series_by_group(
                &years,
                col::DATE,
                col::SALES,
                Some(col::SUPPLIER_SHORT),
                Axis::Year,
            )?),
        ));

        let top = sales.top_bodies(col::DATE, col::SUPPLIER_SHORT, col::SALES, col::OTHER, DEFAULT_TOP_N)?;
        section.charts.push(Chart::new(
            "Top 10 Lieferanten mit Sonstige",
            "Lieferant",
            "Umsatz (EUR)",
            ChartKind::Categories(category_bars(&top, col::SUPPLIER_SHORT, col::SALES)?),
        ));

        self.suppliers = dropdown_options(sales.table(), col::SUPPLIER_SHORT)?;
        self.sales = Some(sales);

        let budget = Expenditures::open(&self.store(Domain::Budget), self.period)
            .context("Budget store")?;
        let years = budget.net_years(col::DATE)?;
        section.charts.push(Chart::new(
            "Gesamtbudget Kostenstellen nach Jahren",
            "Jahr",
            "Kosten (EUR)",
            ChartKind::StackedBars(series_by_group(
                &years,
                col::DATE,
                col::SPENT,
                Some(col::COST_CENTRE),
                Axis::Year,
            )?),
        ));
        let top = budget.top_bodies(col::DATE, col::COST_CENTRE, col::SPENT, col::OTHER, TOP_COST_CENTRES)?;
        section.charts.push(Chart::new(
            "Top 5 Kostenstellen mit Sonstige",
            "Kostenstelle",
            "Kosten (EUR)",
            ChartKind::Categories(category_bars(&top, col::COST_CENTRE, col::SPENT)?),
        ));
        Ok(section)
    }

    /// Select a supplier (or the first one) and rebuild its cards and charts.
    pub fn select_supplier(&mut self, supplier: Option<Value>) {
        self.selected_supplier = supplier
            .filter(|s| self.suppliers.contains(s))
            .or_else(|| self.suppliers.first().cloned());
        self.supplier = match self.build_supplier() {
            Ok(section) => section,
            Err(e) => self.report_failure("Lieferant", e),
        };
    }

    fn build_supplier(&self) -> anyhow::Result<Section> {
        let (Some(sales), Some(body)) = (&self.sales, &self.selected_supplier) else {
            return Ok(Section::default());
        };
        let mut section = Section::default();
        section.cards.push(Card::new(
            format!("Umsatz {body} laufendes Jahr"),
            format_eur(sales.net_current_year_by_body(col::DATE, col::SALES, col::SUPPLIER_SHORT, body)?),
        ));
        let mean = sales.mean_by_body(col::DATE, col::SALES, col::SUPPLIER_SHORT, body)?;
        section.cards.push(Card::new(
            format!("Ø Jahresumsatz {body}"),
            mean.map(format_eur).unwrap_or_else(|| "–".into()),
        ));

        let years = sales.net_years_by_body(col::DATE, col::SUPPLIER_SHORT, body)?;
        section.charts.push(Chart::new(
            "Gesamtumsatz Lieferant nach Jahren",
            "Jahr",
            "Umsatz (EUR)",
            ChartKind::Categories(category_bars(&years, col::DATE, col::SALES)?),
        ));

        let monthly =
            sales.monthly_difference(col::DATE, col::SUPPLIER_SHORT, col::SALES, col::SALES_DIFF, body)?;
        section.charts.push(Chart::new(
            "Lieferant Umsatz pro Monat laufendes Jahr",
            "Monat",
            "Umsatz (EUR)",
            ChartKind::StackedBars(series_by_group(&monthly, col::DATE, col::SALES_DIFF, None, Axis::Month)?),
        ));
        Ok(section)
    }

    // ---- Lesesaal und Ausleihe ----

    fn build_reading_loans(&mut self) -> anyhow::Result<Section> {
        self.reading_room = None;
        self.reading_years.clear();

        let reading = ReadingRoom::open(&self.store(Domain::ReadingRoom), self.period)
            .context("Lesesaal store")?;
        let mut section = Section::default();
        let years = reading.use_by_years(col::YEAR, &[col::MONTH])?;
        section.charts.push(Chart::new(
            "Jährliche Lesesaalnutzung nach Service-Zeiten",
            "Jahr",
            "Anzahl der Nutzer:innen",
            ChartKind::StackedBars(column_series(&years, col::YEAR, &[], Axis::Year)?),
        ));
        self.reading_years = reading
            .table()
            .unique_values(col::YEAR)?
            .iter()
            .filter_map(Value::year)
            .collect();
        self.reading_years.dedup();
        self.reading_room = Some(reading);

        let loans = LoanStats::open(&self.store(Domain::Loans), self.period)
            .context("Ausleihe store")?;
        let per_year = loans.total_loans(col::LOAN_YEAR, col::LOANS, col::RVK_GROUP, "Sonstiges", DEFAULT_TOP_N)?;
        section.charts.push(Chart::new(
            "Ausleihe Top RVK-Fachsystematiken mit Buchservice und Sonstige",
            "Jahr",
            "Anzahl Ausleihen",
            ChartKind::StackedBars(series_by_group(
                &per_year,
                col::LOAN_YEAR,
                col::LOANS,
                Some(col::RVK_GROUP),
                Axis::Year,
            )?),
        ));

        let split = loans.total_loans(col::LOAN_YEAR, col::LOANS, col::RVK_GROUP, "Bibliothek", 1)?;
        let split = group_sum(&split, &[col::RVK_GROUP], &[col::LOANS])?;
        section.charts.push(Chart::new(
            "Gesamtverteilung Ausleihe Buchservice / Bibliothek",
            "",
            "Anzahl Ausleihen",
            ChartKind::Categories(category_bars(&split, col::RVK_GROUP, col::LOANS)?),
        ));

        section.tables.push((
            format!("Die {TOP_TITLES} besonders nachgefragten Titel nach Jahren"),
            top_titles(&loans)?,
        ));
        Ok(section)
    }

    /// Select a reading-room year (or the latest one) and rebuild its chart.
    pub fn select_year(&mut self, year: Option<i32>) {
        self.selected_year = year
            .filter(|y| self.reading_years.contains(y))
            .or_else(|| self.reading_years.last().copied());
        self.reading_month = match self.build_reading_month() {
            Ok(section) => section,
            Err(e) => self.report_failure("Lesesaal", e),
        };
    }

    fn build_reading_month(&self) -> anyhow::Result<Section> {
        let (Some(reading), Some(year)) = (&self.reading_room, self.selected_year) else {
            return Ok(Section::default());
        };
        let months = reading.use_by_months(col::YEAR, col::DATE, col::MONTH, year)?;
        Ok(Section {
            charts: vec![Chart::new(
                format!("Monatliche Anzahl der Nutzer:innen nach Service-Zeiten {year}"),
                "Monat",
                "Anzahl der Nutzer:innen",
                ChartKind::StackedBars(column_series(&months, col::DATE, &[col::YEAR], Axis::Month)?),
            )],
            ..Section::default()
        })
    }

    // ---- Neuerwerbungen und Bestand ----

    fn build_collection(&mut self) -> anyhow::Result<Section> {
        let acquisitions = Collection::open(&self.store(Domain::NewAcquisitions), self.period)
            .context("Neuerwerbungen store")?;
        let mut section = Section::default();

        let months = acquisitions.current_year_by_month(col::DATE, col::SHELFMARK)?;
        section.charts.push(Chart::new(
            "Monatliche Neuerwerbungen laufendes Jahr",
            "Monat",
            "Anzahl der Exemplare",
            ChartKind::StackedBars(series_by_group(&months, col::DATE, col::SHELFMARK, None, Axis::Month)?),
        ));

        let growth = acquisitions.total_years(col::DATE, col::SHELFMARK, col::COPIES, col::TOTAL)?;
        section.charts.push(Chart::new(
            "Bestandswachstum pro Jahr und Gesamt",
            "Jahr",
            "Anzahl der Exemplare",
            ChartKind::Lines(column_series(&growth, col::DATE, &[], Axis::Year)?),
        ));

        let cumulative = acquisitions.cumulative_by_month(
            col::SHELFMARK,
            col::DATE,
            col::COPIES,
            col::YEAR,
            col::MONTH,
            col::CUMULATIVE,
        )?;
        section.charts.push(Chart::new(
            "Jährliche Bestandsentwicklung nach Monaten",
            "Monat",
            "Anzahl der Exemplare",
            ChartKind::Lines(series_by_group(
                &cumulative,
                col::MONTH,
                col::CUMULATIVE,
                Some(col::YEAR),
                Axis::Number,
            )?),
        ));

        let classes = acquisitions.top_class_years(col::RVK_GROUP, col::SHELFMARK, col::DATE, col::COPIES)?;
        section.charts.push(Chart::new(
            "Top 10 RVK-Fachsystematiken pro Jahr",
            "Jahr",
            "Anzahl der Exemplare",
            ChartKind::StackedBars(series_by_group(
                &classes,
                col::DATE,
                col::COPIES,
                Some(col::RVK_GROUP),
                Axis::Year,
            )?),
        ));

        let overall = acquisitions.class_overall_top(
            col::SHELFMARK,
            col::RVK_GROUP,
            col::COPIES,
            col::OTHER,
            DEFAULT_TOP_N,
        )?;
        section.charts.push(Chart::new(
            "Top RVK-Fachsystematiken Bestand mit Sonstige",
            "RVK-Systematikstellen",
            "Anzahl der Exemplare",
            ChartKind::Categories(category_bars(&overall, col::RVK_GROUP, col::COPIES)?),
        ));

        if let Some(chart) = self.media_type_chart(&acquisitions)? {
            section.charts.push(chart);
        }

        let loans = LoanStats::open(&self.store(Domain::Loans), self.period)
            .context("Ausleihe store")?;
        let loan_classes = loans.library_loan_class(
            col::RVK_GROUP,
            &Value::from(col::BOOK_SERVICE),
            col::LOANS,
            col::OTHER,
            DEFAULT_TOP_N,
        )?;
        section.charts.push(Chart::new(
            "Top RVK-Fachsystematiken Ausleihe mit Sonstige",
            "RVK-Systematikstellen",
            "Anzahl der Ausleihen",
            ChartKind::Categories(category_bars(&loan_classes, col::RVK_GROUP, col::LOANS)?),
        ));
        Ok(section)
    }

    /// Yearly growth per media type; `None` with a status message when the
    /// media type lookup cannot be read.
    fn media_type_chart(&mut self, acquisitions: &Collection) -> anyhow::Result<Option<Chart>> {
        let media_types = match Lookup::from_csv(&self.settings.helpers.media_types, None) {
            Ok(lookup) => lookup,
            Err(e) => {
                log::warn!("Media types not shown: {e:#}");
                self.status_messages
                    .push(format!("Medienarten nicht verfügbar: {e:#}"));
                return Ok(None);
            }
        };
        let media = acquisitions.media_type_years(
            &media_types,
            col::MEDIA_TYPE,
            col::SHELFMARK,
            col::DATE,
            col::COPIES,
        )?;
        Ok(Some(Chart::new(
            "Bestandswachstum Medienart pro Jahr",
            "Jahr",
            "Anzahl der Exemplare",
            ChartKind::StackedBars(series_by_group(
                &media,
                col::DATE,
                col::COPIES,
                Some(col::MEDIA_TYPE),
                Axis::Year,
            )?),
        )))
    }
}

/// Most loaned titles per year under German headers.
fn top_titles(loans: &LoanStats) -> anyhow::Result<Table> {
    let top = loans.top_loans_by_title(col::LOAN_YEAR, col::LOANS, TOP_TITLES)?;
    let mut table = project(
        &top,
        &[col::LOAN_YEAR, col::LOAN_SHELFMARK, col::SHORT_TITLE, col::LOANS],
    )?;
    table.columns = ["Jahr", "Signatur", "Titel", "Anzahl der Ausleihen"]
        .map(String::from)
        .to_vec();
    Ok(table)
}

/// The given columns of `table`, in that order.
fn project(table: &Table, columns: &[&str]) -> anyhow::Result<Table> {
    let idx = columns
        .iter()
        .map(|c| table.column_index(c))
        .collect::<bibliostat::Result<Vec<_>>>()?;
    Ok(Table::from_rows(
        columns.iter().map(|c| c.to_string()).collect(),
        table
            .rows
            .iter()
            .map(|row| idx.iter().map(|&i| row[i].clone()).collect())
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period() -> Period {
        Period::new(ymd(2014, 12, 1), ymd(2021, 6, 1))
    }

    fn empty_state(root: &std::path::Path) -> DashboardState {
        let mut state = DashboardState::new(Settings::default().rooted_at(root));
        state.status_messages.clear();
        state
    }

    fn acquisitions() -> Collection {
        let rows = vec![
            vec!["LH 100".into(), "Aa".into(), ymd(2021, 3, 1).into(), Value::Integer(1)],
            vec!["LH 200".into(), "Oa".into(), ymd(2021, 4, 1).into(), Value::Integer(1)],
        ];
        let columns = [col::SHELFMARK, col::MEDIA_TYPE, col::DATE, col::COPIES]
            .map(String::from)
            .to_vec();
        Collection::new(Table::from_rows(columns, rows), period())
    }

    #[test]
    fn missing_stores_become_status_messages() {
        let dir = tempfile::tempdir().unwrap();
        let state = DashboardState::new(Settings::default().rooted_at(dir.path()));
        assert!(state
            .status_messages
            .iter()
            .any(|m| m.starts_with("Umsatz und Budget")));
        assert_eq!(state.expenditures, Section::default());
    }

    #[test]
    fn missing_media_lookup_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = empty_state(dir.path());

        let chart = state.media_type_chart(&acquisitions()).unwrap();
        assert!(chart.is_none());
        assert_eq!(state.status_messages.len(), 1);
        assert!(state.status_messages[0].starts_with("Medienarten"));
    }

    #[test]
    fn media_chart_groups_by_type_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = empty_state(dir.path());
        let lookup = &state.settings.helpers.media_types;
        std::fs::create_dir_all(lookup.parent().unwrap()).unwrap();
        std::fs::write(lookup, "Code,Materialart\nAa,Buch\nOa,E-Book\n").unwrap();

        let chart = state.media_type_chart(&acquisitions()).unwrap().unwrap();
        let ChartKind::StackedBars(series) = chart.kind else {
            panic!("expected stacked bars");
        };
        let names: Vec<_> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Buch", "E-Book"]);
        assert!(state.status_messages.is_empty());
    }

    #[test]
    fn top_titles_show_shelfmarks() {
        let columns = [col::LOAN_YEAR, col::LOAN_SHELFMARK, col::SHORT_TITLE, col::LOANS]
            .map(String::from)
            .to_vec();
        let rows = vec![
            vec![Value::Integer(2021), "0990 A".into(), "Eins".into(), Value::Integer(2)],
            vec![Value::Integer(2021), "LH 100".into(), "Zwei".into(), Value::Integer(7)],
        ];
        let loans = LoanStats::new(Table::from_rows(columns, rows), period());

        let t = top_titles(&loans).unwrap();
        assert_eq!(t.columns, vec!["Jahr", "Signatur", "Titel", "Anzahl der Ausleihen"]);
        assert_eq!(
            t.rows[0],
            vec![Value::Integer(2021), "LH 100".into(), "Zwei".into(), Value::Integer(7)]
        );
        assert_eq!(t.rows[1][1], Value::from("0990 A"));
    }
}
