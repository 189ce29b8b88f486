use eframe::egui;

use bibliostat::config::Settings;

use crate::color::ColorMap;
use crate::state::{DashboardState, Section, Tab};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: DashboardState,
}

impl DashboardApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: DashboardState::new(settings),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: dropdowns ----
        egui::SidePanel::left("selection_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: cards, charts, tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &self.state;
            let sections: Vec<&Section> = match state.tab {
                Tab::Expenditures => vec![&state.expenditures, &state.supplier],
                Tab::ReadingAndLoans => vec![&state.reading_loans, &state.reading_month],
                Tab::Collection => vec![&state.collection],
            };
            let colors = ColorMap::for_sections(sections.iter().copied());

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for s in &sections {
                        plot::section(ui, s, &colors);
                    }
                });
        });
    }
}
