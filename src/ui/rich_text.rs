// egui presentation of rendered assistant text

use eframe::egui;
use egui_phosphor::regular as icons;
use finishlab::rich_text::{Block, Span};

const ROUTE_COLOR: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);

fn span_text(span: &Span) -> egui::RichText {
    match span {
        Span::Plain(text) => egui::RichText::new(text),
        Span::Bold(text) => egui::RichText::new(text).strong(),
        Span::Italic(text) => egui::RichText::new(text).italics(),
    }
}

fn show_spans(ui: &mut egui::Ui, spans: &[Span]) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            ui.label(span_text(span));
        }
    });
}

/// Draw `blocks`; returns the route target the user activated this frame
pub fn show_blocks(ui: &mut egui::Ui, blocks: &[Block]) -> Option<String> {
    let mut clicked = None;

    for block in blocks {
        match block {
            Block::Spacer => ui.add_space(6.0),
            Block::Route { target } => {
                let label = egui::RichText::new(format!("{} /{}", icons::ARROW_RIGHT, target))
                    .color(ROUTE_COLOR)
                    .strong();
                if ui.button(label).clicked() {
                    clicked = Some(target.clone());
                }
            }
            Block::Bullet(spans) => {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("•").color(ROUTE_COLOR));
                    show_spans(ui, spans);
                });
            }
            Block::Paragraph(spans) => show_spans(ui, spans),
        }
    }

    clicked
}
