use eframe::egui::{self, Align2, Color32, FontId, Ui};
use egui_extras::{Column, TableBuilder};
use bubbles_core::export::palette_rgb;
use bubbles_core::human::human_weight;
use bubbles_core::loader::LoadMsg;
use bubbles_core::search::filter_labels;
use bubbles_core::ContainerSize;

use crate::state::AppState;

const NO_SUBTOPICS: &str = "The topic you selected has no relevant subtopics";

pub fn draw(app: &mut AppState, ctx: &egui::Context) {
    poll_load(app, ctx);

    // Keep repainting while a load is in flight
    if app.load_rx.is_some() {
        ctx.request_repaint();
    }

    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        top_bar(ui, app);
        ui.separator();
        breadcrumbs(ui, app);
    });

    egui::SidePanel::left("sidebar").resizable(true).default_width(280.0).show(ctx, |ui| {
        ui.heading("Topics");
        if let Some(file) = &app.file { ui.label(file.display().to_string()); }
        else { ui.label("Open a topic file to start"); }
        ui.separator();
        topic_table(ui, app);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        bubble_canvas(ui, app);
    });
}

fn top_bar(ui: &mut Ui, app: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("Open Topics…").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Topics", &["json", "csv"])
                .pick_file()
            {
                app.start_load(path);
            }
        }
        if ui.add_enabled(app.file.is_some(), egui::Button::new("Reload")).clicked() { app.reload(); }
        if ui.add_enabled(app.load_rx.is_some(), egui::Button::new("Cancel")).clicked() { app.cancel_load(); }
        ui.separator();
        ui.label("Filter:");
        ui.text_edit_singleline(&mut app.filter);
        ui.separator();
        if app.load_rx.is_some() {
            ui.spinner();
            ui.label(format!("{} records", app.load_records));
        }
        for err in app.error.iter().chain(&app.layout_error) {
            ui.colored_label(Color32::LIGHT_RED, err);
        }
    });
}

fn breadcrumbs(ui: &mut Ui, app: &mut AppState) {
    let crumbs: Vec<String> = app.path.breadcrumbs().into_iter().map(str::to_string).collect();
    let last = crumbs.len() - 1;
    let mut clicked = None;
    ui.horizontal(|ui| {
        for (i, crumb) in crumbs.iter().enumerate() {
            let text = if i == last { crumb.clone() } else { format!("{crumb} >") };
            if ui.add_enabled(i != last, egui::Button::new(text).frame(false)).clicked() {
                clicked = Some(i);
            }
        }
    });
    match clicked {
        Some(0) => app.reset_path(),
        Some(i) => app.truncate_path(i - 1),
        None => {}
    }
}

fn topic_table(ui: &mut Ui, app: &mut AppState) {
    let weights: Vec<(String, f64)> = {
        let items = app.items();
        filter_labels(&app.filter, items.iter().map(|i| i.label.as_str()))
            .into_iter()
            .filter_map(|l| items.iter().find(|i| i.label == l))
            .map(|i| (i.label.clone(), i.weight))
            .collect()
    };
    let mut clicked = None;
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::remainder())
        .column(Column::auto())
        .header(20.0, |mut header| {
            header.col(|ui| { ui.strong("Topic"); });
            header.col(|ui| { ui.strong("Weight"); });
        })
        .body(|mut body| {
            for (label, weight) in &weights {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        if ui.link(label).clicked() { clicked = Some(label.clone()); }
                    });
                    row.col(|ui| { ui.label(human_weight(*weight)); });
                });
            }
        });
    if let Some(label) = clicked {
        app.drill_into(label);
    }
}

fn bubble_canvas(ui: &mut Ui, app: &mut AppState) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
    let rect = response.rect;
    let message = |text: &str| {
        painter.text(rect.center(), Align2::CENTER_CENTER, text, FontId::proportional(16.0), Color32::GRAY);
    };

    if app.tree.is_none() {
        message(if app.load_rx.is_some() { "Loading topics…" } else { "No topics loaded" });
        return;
    }
    if app.items().is_empty() {
        message(NO_SUBTOPICS);
        return;
    }

    // Layout space has its origin at the bottom-left corner of the canvas
    let size = ContainerSize::new(rect.width() as f64, rect.height() as f64);
    let to_screen = |x: f64, y: f64| egui::pos2(rect.left() + x as f32, rect.bottom() - y as f32);
    let mut clicked = None;
    {
        let layout = app.layout_for(size);
        for (i, c) in layout.circles.iter().enumerate() {
            let (r, g, b) = palette_rgb(i);
            let center = to_screen(c.center_x, c.center_y);
            painter.circle_filled(center, c.radius as f32, Color32::from_rgb(r, g, b));
            painter.text(center, Align2::CENTER_CENTER, &c.label, FontId::proportional(14.0), Color32::WHITE);
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let x = (pos.x - rect.left()) as f64;
                let y = (rect.bottom() - pos.y) as f64;
                clicked = layout.circle_at(x, y).map(|c| c.label.clone());
            }
        }
    }
    if let Some(label) = clicked {
        app.drill_into(label);
    }
}

fn poll_load(app: &mut AppState, ctx: &egui::Context) {
    // Take the receiver so the state can be mutated while draining it
    let Some(rx) = app.load_rx.take() else { return; };
    let mut had_msg = false;
    let mut finished = false;
    while let Ok(msg) = rx.try_recv() {
        had_msg = true;
        match msg {
            LoadMsg::Progress { records } => app.load_records = records,
            LoadMsg::Done(tree) => {
                app.finish_load(tree);
                finished = true;
                break;
            }
            LoadMsg::Error(e) => {
                tracing::error!(error = %e, "topic load failed");
                app.error = Some(e);
                finished = true;
                break;
            }
        }
    }
    if !finished {
        app.load_rx = Some(rx);
    }
    if had_msg {
        ctx.request_repaint();
    }
}
