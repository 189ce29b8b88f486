use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{DashboardState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – dropdowns and status
// ---------------------------------------------------------------------------

/// Render the left panel: the selections of the current tab.
pub fn side_panel(ui: &mut Ui, state: &mut DashboardState) {
    ui.heading(state.tab.title());
    ui.separator();

    match state.tab {
        Tab::Expenditures => supplier_dropdown(ui, state),
        Tab::ReadingAndLoans => year_dropdown(ui, state),
        Tab::Collection => {}
    }

    ui.add_space(12.0);
    ui.separator();
    ui.label(RichText::new("Datenbestand").small());
    ui.label(state.settings.storage_root.display().to_string());
    ui.label(RichText::new(format!("Stand: {}", state.period.today.format("%d.%m.%Y"))).small());

    for msg in &state.status_messages {
        ui.add_space(4.0);
        ui.label(RichText::new(msg).color(Color32::RED));
    }
}

fn supplier_dropdown(ui: &mut Ui, state: &mut DashboardState) {
    ui.strong("Lieferant");
    if state.suppliers.is_empty() {
        ui.label("Keine Lieferanten vorhanden.");
        return;
    }

    let current = state.selected_supplier.clone();
    let mut chosen = current.clone();
    egui::ComboBox::from_id_salt("supplier")
        .selected_text(current.as_ref().map(|v| v.to_string()).unwrap_or_default())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for supplier in &state.suppliers {
                ui.selectable_value(&mut chosen, Some(supplier.clone()), supplier.to_string());
            }
        });
    if chosen != current {
        state.select_supplier(chosen);
    }
}

fn year_dropdown(ui: &mut Ui, state: &mut DashboardState) {
    ui.strong("Lesesaal Jahr");
    if state.reading_years.is_empty() {
        ui.label("Keine Lesesaaldaten vorhanden.");
        return;
    }

    let current = state.selected_year;
    let mut chosen = current;
    egui::ComboBox::from_id_salt("reading_year")
        .selected_text(current.map(|y| y.to_string()).unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for &year in &state.reading_years {
                ui.selectable_value(&mut chosen, Some(year), year.to_string());
            }
        });
    if chosen != current {
        state.select_year(chosen);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu and the tab selector.
pub fn top_bar(ui: &mut Ui, state: &mut DashboardState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Datei", |ui: &mut Ui| {
            if ui.button("Datenordner öffnen…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Neu laden").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.title());
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut DashboardState) {
    let folder = rfd::FileDialog::new()
        .set_title("Datenordner (storage_folders) wählen")
        .set_directory(&state.settings.storage_root)
        .pick_folder();

    if let Some(path) = folder {
        state.set_storage_root(path);
        if state.status_messages.is_empty() {
            log::info!("All stores loaded");
        }
    }
}
