use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use bibliostat::data::Table;
use bibliostat::report::present::Series;

use crate::color::ColorMap;
use crate::state::{Card, Chart, ChartKind, Section};

const CHART_HEIGHT: f32 = 260.0;
const BAR_WIDTH: f64 = 0.6;

// ---------------------------------------------------------------------------
// Section: cards, then charts in two columns, then tables
// ---------------------------------------------------------------------------

pub fn section(ui: &mut Ui, section: &Section, colors: &ColorMap) {
    if !section.cards.is_empty() {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for c in &section.cards {
                card(ui, c);
            }
        });
        ui.add_space(8.0);
    }

    for pair in section.charts.chunks(2) {
        ui.columns(2, |columns: &mut [Ui]| {
            for (ui, c) in columns.iter_mut().zip(pair) {
                chart(ui, c, colors);
            }
        });
        ui.add_space(8.0);
    }

    for (title, table) in &section.tables {
        ui.strong(title);
        table_view(ui, title, table);
        ui.add_space(8.0);
    }
}

fn card(ui: &mut Ui, card: &Card) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(180.0);
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(&card.title).small());
            ui.label(RichText::new(&card.value).heading().strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

pub fn chart(ui: &mut Ui, chart: &Chart, colors: &ColorMap) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(&chart.title);
    });

    let mut plot = Plot::new(&chart.title)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .allow_drag(true)
        .allow_zoom(true)
        .allow_scroll(false);

    if let ChartKind::Categories(bars) = &chart.kind {
        let labels: Vec<String> = bars.iter().map(|(label, _)| label.clone()).collect();
        plot = plot.x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        });
    }

    plot.show(ui, |plot_ui| match &chart.kind {
        ChartKind::Lines(series) => {
            for s in series {
                let points: PlotPoints = s.points.iter().copied().collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&s.name)
                        .color(colors.color_for(&s.name))
                        .width(2.0),
                );
            }
        }
        ChartKind::StackedBars(series) => {
            for bars in stacked(series, colors) {
                plot_ui.bar_chart(bars);
            }
        }
        ChartKind::Categories(bars) => {
            let bars: Vec<Bar> = bars
                .iter()
                .enumerate()
                .map(|(i, (label, value))| {
                    Bar::new(i as f64, *value)
                        .name(label)
                        .width(BAR_WIDTH)
                        .fill(colors.color_for(label))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars));
        }
    });
}

/// One bar chart per series, every chart stacked on the previous ones.
/// Stacking pairs bars by position, so all series share the same x grid.
fn stacked(series: &[Series], colors: &ColorMap) -> Vec<BarChart> {
    let mut xs: Vec<f64> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p[0]))
        .collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();

    let mut charts: Vec<BarChart> = Vec::with_capacity(series.len());
    for s in series {
        let bars: Vec<Bar> = xs
            .iter()
            .map(|&x| {
                let y = s
                    .points
                    .iter()
                    .find(|p| p[0] == x)
                    .map(|p| p[1])
                    .unwrap_or(0.0);
                Bar::new(x, y).width(BAR_WIDTH)
            })
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(&s.name)
            .color(colors.color_for(&s.name))
            .stack_on(&below);
        charts.push(chart);
    }
    charts
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn table_view(ui: &mut Ui, id: &str, table: &Table) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(60.0))
            .columns(Column::remainder(), table.columns.len().saturating_sub(1))
            .header(20.0, |mut header| {
                for name in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for row in &table.rows {
                    body.row(18.0, |mut cells| {
                        for value in row {
                            cells.col(|ui: &mut Ui| {
                                ui.label(value.to_field());
                            });
                        }
                    });
                }
            });
    });
}
