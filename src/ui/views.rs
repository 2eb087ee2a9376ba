// View rendering for FinishApp
// Each method draws one surface and forwards user actions to the controllers.

use crate::ui::{rich_text, PARTNER_INTERESTS};
use eframe::egui;
use egui_phosphor::regular as icons;
use finishlab::chat::render_message;
use finishlab::directory::DirectoryEntry;
use finishlab::intake::{FormKind, FormStatus};
use finishlab::modal::{ModalState, ModalTab, QUICK_PROMPTS};
use finishlab::pages::{Navigator, PageId};
use finishlab::session::Role;
use finishlab::version;
use std::time::Instant;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);
const MUTED: egui::Color32 = egui::Color32::from_rgb(120, 120, 120);

/// Pages linked from the header
const HEADER_LINKS: [PageId; 6] = [
    PageId::HowItWorks,
    PageId::Pricing,
    PageId::Stories,
    PageId::Partner,
    PageId::Faq,
    PageId::Diagnostic,
];

impl crate::FinishApp {
    pub fn render_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let brand = egui::RichText::new("FINISH").strong().size(20.0);
                if ui.add(egui::Button::new(brand).frame(false)).clicked() {
                    self.router.go(PageId::Home);
                }
                ui.add_space(16.0);

                for page in HEADER_LINKS {
                    let selected = self.router.current() == page;
                    if ui.selectable_label(selected, page.metadata().short_title()).clicked() {
                        self.router.go(page);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let search = ui.button(format!("{} Search  ⌘K", icons::MAGNIFYING_GLASS));
                    if search.clicked() {
                        self.modal.open();
                    }
                });
            });
        });
    }

    pub fn render_footer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for page in [PageId::PrivacyPolicy, PageId::TermsOfService] {
                    if ui.link(page.metadata().short_title()).clicked() {
                        self.router.go(page);
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(version::full_version_info())
                            .size(12.0)
                            .color(MUTED),
                    );
                });
            });
        });
    }

    pub fn render_page(&mut self, ctx: &egui::Context) {
        let reset_scroll = self.router.take_scroll_request();
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut area = egui::ScrollArea::vertical().auto_shrink([false; 2]);
            if reset_scroll {
                area = area.vertical_scroll_offset(0.0);
            }
            area.show(ui, |ui| {
                ui.add_space(24.0);
                ui.label(egui::RichText::new(self.router.location_hash()).color(MUTED).small());
                ui.heading(self.router.document_title());
                ui.add_space(8.0);
                ui.label(self.router.meta_description());
                ui.add_space(24.0);

                if let Some(kind) = FormKind::for_page(self.router.current()) {
                    self.render_intake_form(ui, kind);
                }
            });
        });
    }

    fn render_intake_form(&mut self, ui: &mut egui::Ui, kind: FormKind) {
        let status = self.form_mut(kind).status();

        if status == FormStatus::Success {
            ui.label(
                egui::RichText::new(format!("{} {}", icons::CHECK_CIRCLE, kind.success_notice()))
                    .color(egui::Color32::from_rgb(22, 163, 74))
                    .strong(),
            );
            ui.add_space(12.0);
        }

        let now = Instant::now();
        let enabled = status != FormStatus::Submitting;
        ui.add_enabled_ui(enabled, |ui| match kind {
            FormKind::Diagnostic => {
                ui.label("Describe the blocker");
                ui.add(
                    egui::TextEdit::multiline(&mut self.diagnostic_notes)
                        .desired_rows(5)
                        .hint_text("What is broken, where, and since when?"),
                );
            }
            FormKind::Blueprint => {
                ui.label("Your product vision");
                ui.add(
                    egui::TextEdit::multiline(&mut self.blueprint_vision)
                        .desired_rows(5)
                        .hint_text("Who is it for and what must v1 do?"),
                );
            }
            FormKind::Partner => self.render_partner_fields(ui, now),
        });

        ui.add_space(12.0);
        let label = if status == FormStatus::Submitting {
            kind.submitting_label()
        } else {
            kind.submit_label()
        };
        if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
            self.submit_intake(kind);
        }
    }

    fn render_partner_fields(&mut self, ui: &mut egui::Ui, now: Instant) {
        let profile = &mut self.partner_profile;
        egui::Grid::new("partner_fields").num_columns(2).show(ui, |ui| {
            ui.label("Organization");
            ui.text_edit_singleline(&mut profile.org_name);
            ui.end_row();
            ui.label("Partner type");
            ui.text_edit_singleline(&mut profile.partner_type);
            ui.end_row();
            ui.label("Contact name");
            ui.text_edit_singleline(&mut profile.contact_name);
            ui.end_row();
            ui.label("Contact email");
            ui.text_edit_singleline(&mut profile.contact_email);
            ui.end_row();
            ui.label("Client profile");
            ui.text_edit_singleline(&mut profile.client_profile);
            ui.end_row();
        });

        ui.add_space(8.0);
        ui.label("Technical capabilities");
        let capabilities = ui.text_edit_multiline(&mut profile.tech_capabilities);
        ui.label("Collaboration goals");
        let goals = ui.text_edit_multiline(&mut profile.collaboration_goals);
        if capabilities.changed() || goals.changed() {
            self.tip_advisor.profile_changed(&self.partner_profile, now);
        }

        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            for interest in PARTNER_INTERESTS {
                let selected = self.partner_profile.interests.iter().any(|i| i == interest);
                if ui.selectable_label(selected, interest).clicked() {
                    self.partner_profile.toggle_interest(interest);
                }
            }
        });

        if self.tip_advisor.is_thinking() || !self.tip_advisor.tip().is_empty() {
            ui.add_space(8.0);
            egui::Frame::group(ui.style()).show(ui, |ui| {
                let heading = format!("{} strategic alignment tip", icons::SPARKLE);
                ui.label(egui::RichText::new(heading).color(ACCENT));
                if self.tip_advisor.is_thinking() {
                    ui.add(egui::Spinner::new());
                } else {
                    ui.label(egui::RichText::new(self.tip_advisor.tip()).italics());
                }
            });
        }
    }

    pub fn render_modal(&mut self, ctx: &egui::Context, now: Instant) {
        if !self.modal.is_open() {
            return;
        }

        egui::Window::new("search_modal")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .fixed_size([620.0, 480.0])
            .anchor(egui::Align2::CENTER_TOP, [0.0, 80.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(icons::MAGNIFYING_GLASS);
                    let mut query = self.modal.query().to_string();
                    let field = ui.add(
                        egui::TextEdit::singleline(&mut query)
                            .desired_width(500.0)
                            .hint_text("Search pages or describe a technical blocker..."),
                    );
                    if !field.has_focus() && self.modal.query().is_empty() {
                        field.request_focus();
                    }
                    if field.changed() {
                        self.modal.set_query(query, now);
                    }
                    if ui.button(icons::X).clicked() {
                        self.modal.close();
                    }
                });
                ui.separator();

                ui.horizontal(|ui| {
                    let tab = self.modal.tab();
                    let directory_label = self.modal.directory_tab_label();
                    if ui
                        .selectable_label(tab == ModalTab::Directory, directory_label)
                        .clicked()
                    {
                        self.modal.set_tab(ModalTab::Directory);
                    }
                    let ai_label = format!("{} AI Architect", icons::SPARKLE);
                    if ui.selectable_label(tab == ModalTab::Ai, ai_label).clicked() {
                        self.modal.set_tab(ModalTab::Ai);
                    }
                    if self.modal.state() == ModalState::OpenDiagnosing {
                        ui.add(egui::Spinner::new());
                    }
                });
                ui.add_space(6.0);

                egui::ScrollArea::vertical().show(ui, |ui| match self.modal.tab() {
                    ModalTab::Directory => self.render_directory_results(ui),
                    ModalTab::Ai => self.render_diagnosis(ui, now),
                });
            });
    }

    fn render_directory_results(&mut self, ui: &mut egui::Ui) {
        let results: Vec<&'static DirectoryEntry> = self.modal.results().to_vec();
        if results.is_empty() {
            ui.label(egui::RichText::new("No pages match. Try the AI Architect tab.").color(MUTED));
            return;
        }

        let mut selected = None;
        for entry in results {
            let response = ui.add(
                egui::Button::new(format!(
                    "{}  [{} · {}]\n{}",
                    entry.title,
                    entry.category,
                    entry.kind.label(),
                    entry.description
                ))
                .wrap(),
            );
            if response.clicked() {
                selected = Some(entry.id);
            }
        }

        if let Some(page) = selected {
            self.modal.select_entry(page, &mut self.router);
        }
    }

    fn render_diagnosis(&mut self, ui: &mut egui::Ui, now: Instant) {
        match self.modal.state() {
            ModalState::OpenDiagnosing => {
                ui.horizontal(|ui| {
                    ui.add(egui::Spinner::new());
                    ui.label("Analyzing your blocker...");
                });
            }
            ModalState::OpenDiagnosed => {
                let Some(diagnosis) = self.modal.diagnosis().cloned() else {
                    return;
                };
                ui.label(egui::RichText::new(&diagnosis.problem_summary).strong().size(18.0));
                ui.add_space(4.0);
                ui.label(&diagnosis.technical_path);
                ui.add_space(4.0);
                ui.label(egui::RichText::new(&diagnosis.logic).italics().color(MUTED));
                ui.add_space(8.0);

                let cta_text = format!("{} {}", diagnosis.cta_label(), icons::ARROW_RIGHT);
                let cta = egui::RichText::new(cta_text).color(ACCENT).strong();
                if ui.button(cta).clicked() {
                    self.modal.accept_recommendation(&mut self.router);
                    return;
                }

                if !diagnosis.suggestions.is_empty() {
                    ui.add_space(8.0);
                    ui.label(egui::RichText::new("Related").color(MUTED).small());
                    for suggestion in &diagnosis.suggestions {
                        if ui.link(suggestion).clicked() {
                            self.modal.apply_suggestion(suggestion, now);
                        }
                    }
                }
            }
            _ => {
                ui.label(egui::RichText::new("Try one of these:").color(MUTED));
                for prompt in QUICK_PROMPTS {
                    if ui.link(prompt).clicked() {
                        self.modal.apply_quick_prompt(prompt, now);
                    }
                }
            }
        }
    }

    pub fn render_chat_widget(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("chat_widget"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -48.0])
            .show(ctx, |ui| {
                if self.chat.is_expanded() {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.set_width(360.0);
                        self.render_chat_panel(ui);
                    });
                    ui.add_space(8.0);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    let glyph = if self.chat.is_expanded() {
                        icons::X
                    } else {
                        icons::CHATS_CIRCLE
                    };
                    if ui.button(egui::RichText::new(glyph).size(24.0)).clicked() {
                        self.chat.toggle();
                    }
                });
            });
    }

    fn render_chat_panel(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("FINISH Assistant").strong());
        ui.separator();

        let scroll_to_bottom = self.chat.take_scroll_request();
        let mut route = None;

        egui::ScrollArea::vertical()
            .max_height(360.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for message in self.chat.messages() {
                    let (label, color) = match message.role {
                        Role::User => ("You", ACCENT),
                        Role::Assistant => ("Assistant", egui::Color32::from_rgb(60, 150, 60)),
                    };
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(label).color(color).strong());
                        ui.label(
                            egui::RichText::new(message.sent_at.format("%H:%M").to_string())
                                .size(10.0)
                                .color(MUTED),
                        );
                    });
                    if let Some(target) = rich_text::show_blocks(ui, &render_message(message)) {
                        route = Some(target);
                    }
                    ui.add_space(8.0);
                }

                if self.chat.is_waiting() {
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new());
                        ui.label(egui::RichText::new("typing...").color(MUTED));
                    });
                }

                if scroll_to_bottom {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });

        if let Some(target) = route {
            self.router.navigate(&target);
        }

        ui.separator();
        let mut send = false;
        ui.horizontal(|ui| {
            let input = ui.add(
                egui::TextEdit::singleline(self.chat.input_mut())
                    .desired_width(290.0)
                    .hint_text("Ask about your project..."),
            );
            if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send = true;
            }
            let can_submit = self.chat.can_submit();
            if ui
                .add_enabled(can_submit, egui::Button::new(icons::PAPER_PLANE_RIGHT))
                .clicked()
            {
                send = true;
            }
        });
        if send {
            self.send_chat_message();
        }
    }
}
