mod ui;

use eframe::egui;
use finishlab::app_builder::{AppBuilder, AppDependencies};
use finishlab::chat::ChatWidget;
use finishlab::config::SiteConfig;
use finishlab::intake::{self, FormKind, IntakeForm, PartnerProfile, PartnerTipAdvisor};
use finishlab::modal::SearchModal;
use finishlab::pages::Router;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use ui::RemoteEvent;

fn main() -> std::result::Result<(), eframe::Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let config = SiteConfig::load().unwrap_or_else(|e| {
        tracing::error!("{}; falling back to default settings", e);
        SiteConfig::default()
    });

    // optional deep link such as `finishlab '#pricing'`
    let start_fragment = std::env::args().nth(1);

    let runtime = Arc::new(tokio::runtime::Runtime::new().expect("Failed to create runtime"));
    let deps = AppBuilder::new()
        .with_config(config)
        .with_runtime(runtime)
        .build()
        .expect("Failed to build dependencies");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_title("FINISH Inc"),
        ..Default::default()
    };

    eframe::run_native(
        "finishlab",
        options,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);

            Ok(Box::new(FinishApp::new(deps, start_fragment.as_deref())))
        }),
    )
}

struct FinishApp {
    deps: AppDependencies,
    router: Router,
    modal: SearchModal,
    chat: ChatWidget,
    diagnostic_form: IntakeForm,
    blueprint_form: IntakeForm,
    partner_form: IntakeForm,
    partner_profile: PartnerProfile,
    tip_advisor: PartnerTipAdvisor,
    // Free-text fields of the diagnostic and blueprint forms
    diagnostic_notes: String,
    blueprint_vision: String,
    shown_title: String,
    events_tx: mpsc::UnboundedSender<RemoteEvent>,
    events_rx: mpsc::UnboundedReceiver<RemoteEvent>,
}

impl FinishApp {
    fn new(deps: AppDependencies, start_fragment: Option<&str>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut router = Router::new();
        if let Some(fragment) = start_fragment {
            router.handle_hash_change(fragment);
        }
        let modal = deps.search_modal();
        let chat = deps.chat_widget();

        Self {
            deps,
            router,
            modal,
            chat,
            diagnostic_form: IntakeForm::new(FormKind::Diagnostic),
            blueprint_form: IntakeForm::new(FormKind::Blueprint),
            partner_form: IntakeForm::new(FormKind::Partner),
            partner_profile: PartnerProfile::default(),
            tip_advisor: PartnerTipAdvisor::new(),
            diagnostic_notes: String::new(),
            blueprint_vision: String::new(),
            shown_title: String::new(),
            events_tx,
            events_rx,
        }
    }

    fn form_mut(&mut self, kind: FormKind) -> &mut IntakeForm {
        match kind {
            FormKind::Diagnostic => &mut self.diagnostic_form,
            FormKind::Blueprint => &mut self.blueprint_form,
            FormKind::Partner => &mut self.partner_form,
        }
    }

    /// Run `task` on the host runtime
    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match &self.deps.runtime {
            Some(runtime) => {
                runtime.spawn(task);
            }
            None => tracing::error!("No runtime configured; background task dropped"),
        }
    }

    fn send_chat_message(&mut self) {
        let Some(pending) = self.chat.submit() else {
            return;
        };
        let tx = self.events_tx.clone();
        self.spawn(async move {
            let outcome = pending.resolve().await;
            let _ = tx.send(RemoteEvent::ChatReply(outcome));
        });
    }

    fn submit_intake(&mut self, kind: FormKind) {
        let Some(latency) = self.form_mut(kind).begin_submit() else {
            return;
        };
        let tx = self.events_tx.clone();
        self.spawn(async move {
            tokio::time::sleep(latency).await;
            let _ = tx.send(RemoteEvent::IntakeSubmitted(kind));
        });
    }

    fn drain_events(&mut self) {
        loop {
            match self.events_rx.try_recv() {
                Ok(RemoteEvent::Diagnosis { id, outcome }) => {
                    self.modal.apply_diagnosis(id, outcome);
                }
                Ok(RemoteEvent::ChatReply(outcome)) => self.chat.complete(outcome),
                Ok(RemoteEvent::PartnerTip { id, outcome }) => {
                    self.tip_advisor.apply_tip(id, outcome);
                }
                Ok(RemoteEvent::IntakeSubmitted(kind)) => {
                    self.form_mut(kind).complete_submit(Instant::now());
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    tracing::error!("Event channel disconnected unexpectedly");
                    break;
                }
            }
        }
    }

    /// Fire whatever timers have elapsed and start the work they trigger
    fn run_timers(&mut self, now: Instant) {
        if let Some(request) = self.modal.poll(now) {
            let client = self.deps.diagnosis.clone();
            let tx = self.events_tx.clone();
            self.spawn(async move {
                let outcome = client.diagnose(&request.query).await;
                let _ = tx.send(RemoteEvent::Diagnosis {
                    id: request.id,
                    outcome,
                });
            });
        }

        if let Some(request) = self.tip_advisor.poll(&self.partner_profile, now) {
            let completion = Arc::clone(&self.deps.completion);
            let timeout = self.deps.config.request_timeout;
            let tx = self.events_tx.clone();
            self.spawn(async move {
                let outcome = intake::fetch_tip(completion, request.prompt, timeout).await;
                let _ = tx.send(RemoteEvent::PartnerTip {
                    id: request.id,
                    outcome,
                });
            });
        }

        for kind in [FormKind::Diagnostic, FormKind::Blueprint, FormKind::Partner] {
            self.form_mut(kind).expire_notice(now);
        }
    }

    /// Ask egui to wake up for the nearest pending deadline or outstanding call
    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        let busy = self.modal.is_thinking()
            || self.chat.is_waiting()
            || self.tip_advisor.is_thinking()
            || self.diagnostic_form.is_submitting()
            || self.blueprint_form.is_submitting()
            || self.partner_form.is_submitting();
        if busy {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let deadlines = [
            self.modal.next_deadline(),
            self.tip_advisor.next_deadline(),
            self.diagnostic_form.notice_deadline(),
            self.blueprint_form.notice_deadline(),
            self.partner_form.notice_deadline(),
        ];
        if let Some(next) = deadlines.into_iter().flatten().min() {
            ctx.request_repaint_after(next.saturating_duration_since(now));
        }
    }
}

impl eframe::App for FinishApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        let now = Instant::now();
        self.run_timers(now);

        // Cmd/Ctrl+K opens search, Escape closes it
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::K)) {
            self.modal.open();
        }
        if self.modal.is_open() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.modal.close();
        }

        ctx.set_visuals(egui::Visuals::light());

        self.render_header(ctx);
        self.render_footer(ctx);
        self.render_page(ctx);
        self.render_modal(ctx, now);
        self.render_chat_widget(ctx);

        if self.shown_title != self.router.document_title() {
            self.shown_title = self.router.document_title().to_string();
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.shown_title.clone()));
        }

        self.schedule_repaint(ctx, now);
    }
}
