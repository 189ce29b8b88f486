//! Column names shared by the import pipelines, the stores and the dashboard.

/// Export date stamped on every imported row.
pub const DATE: &str = "Datum";

// Umsatz (sales per supplier)
pub const SUPPLIER: &str = "Lieferant";
pub const SUPPLIER_SHORT: &str = "Lieferant Abk.";
pub const SALES: &str = "Umsatz (EUR)";
pub const SALES_DIFF: &str = "Umsatz Diff";

// Budget (per cost centre)
pub const COST_CENTRE_RAW: &str = "S Bezeichnung";
pub const COST_CENTRE: &str = "Bezeichnung";
pub const SPENT: &str = "Ausg. ges.";

// Reading room
pub const YEAR: &str = "Jahr";
pub const MONTH: &str = "Monat";

// Loans
pub const LOAN_YEAR: &str = "year";
pub const LOAN_SHELFMARK: &str = "shelfmark";
pub const SHORT_TITLE: &str = "shorttitle";
pub const LOANS: &str = "cum_loans";

// New acquisitions
pub const SHELFMARK: &str = "Signatur";
pub const COPIES: &str = "Ex";
pub const MEDIA_TYPE: &str = "0500";
pub const TOTAL: &str = "Gesamt";
pub const CUMULATIVE: &str = "cum_s";

// RVK classification
pub const RVK_NOTATION: &str = "Systematikstelle";
pub const RVK_NOTATION_NAME: &str = "RVK-Bez-SysStelle";
pub const RVK_GROUP: &str = "Systematikgruppe";
pub const RVK_GROUP_NAME: &str = "RVK-Bez-SysGruppe";

/// Notation such as `AB 12345` at any position of a shelfmark.
pub const RVK_NOTATION_PATTERN: &str = r"([A-Z]{1,2}\s\d{2,5})";
/// Main class letters at the start of a shelfmark.
pub const RVK_GROUP_PATTERN: &str = r"(^[A-Z]{1,2})";

/// Shelfmarks of the book service carry this marker.
pub const BOOK_SERVICE_MARKER: &str = "099";
pub const BOOK_SERVICE: &str = "Buchservice";

/// Label for everything outside a top-N selection.
pub const OTHER: &str = "Sonstige";
