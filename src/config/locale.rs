use serde::{Deserialize, Serialize};

/// Display strings and column labels for one language.
#[derive(Debug)]
pub struct LabelSet {
    /// Output columns in report order.
    pub columns: [&'static str; 9],
    pub sheet_name: &'static str,
    pub file_stem: &'static str,
    pub input_preview_title: &'static str,
    pub result_preview_title: &'static str,
    pub analysis_completed: &'static str,
    pub analysis_failed: &'static str,
    pub saved_to: &'static str,
    pub suggestion: &'static str,
    pub empty_table: &'static str,
}

static ENGLISH: LabelSet = LabelSet {
    columns: [
        "Customer_Number",
        "Packages",
        "Rows",
        "Total_Cost",
        "Energy_23_5",
        "Season_Peak_1",
        "Climate_Protect_2",
        "Total_with_Surcharges",
        "Average_per_Package",
    ],
    sheet_name: "Report",
    file_stem: "report_per_customer",
    input_preview_title: "Preview of the imported file:",
    result_preview_title: "Result (preview):",
    analysis_completed: "Analysis completed!",
    analysis_failed: "Error during analysis",
    saved_to: "Report saved to",
    suggestion: "Suggestion",
    empty_table: "(no rows)",
};

static GERMAN: LabelSet = LabelSet {
    columns: [
        "Kundennummer",
        "Pakete",
        "Zeilen",
        "Gesamtkosten",
        "Energie_23_5",
        "Saison_Peak_1",
        "Klimaschutz_2",
        "Gesamt_mit_Zuschlaegen",
        "Durchschnitt_pro_Paket",
    ],
    sheet_name: "Bericht",
    file_stem: "bericht_pro_kunde",
    input_preview_title: "Vorschau der importierten Datei:",
    result_preview_title: "Ergebnis (Vorschau):",
    analysis_completed: "Analyse abgeschlossen!",
    analysis_failed: "Fehler bei der Analyse",
    saved_to: "Bericht gespeichert unter",
    suggestion: "Vorschlag",
    empty_table: "(keine Zeilen)",
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
}

impl Locale {
    pub fn labels(&self) -> &'static LabelSet {
        match self {
            Locale::En => &ENGLISH,
            Locale::De => &GERMAN,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            other => Err(format!("unsupported locale '{}', expected 'en' or 'de'", other)),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
