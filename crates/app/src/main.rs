//! Siteweaver: describe a website in chat, get a single-file HTML document,
//! see it in the preview panel. Projects persist locally between runs.

use eframe::egui;
use parking_lot::Mutex;
use std::sync::Arc;

mod preview;
mod projects;
mod state;

use state::{save_settings, AppState};

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "Siteweaver",
        options,
        Box::new(|_cc| {
            Box::new(SiteweaverApp {
                state: Arc::new(Mutex::new(AppState::default())),
            })
        }),
    )
}

struct SiteweaverApp {
    state: Arc<Mutex<AppState>>,
}

impl eframe::App for SiteweaverApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut s = self.state.lock();

        // Apply finished background work (non-blocking).
        s.poll_generation();
        s.poll_enhance();
        if s.is_generating() || s.is_enhancing() {
            ctx.request_repaint();
        }

        let dark = s.settings.dark_mode;
        let mut style = (*ctx.style()).clone();
        style.visuals = if dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        style.visuals.window_rounding = egui::Rounding::same(10.0);
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        ctx.set_style(style);

        render_header(&mut s, ctx, dark);
        render_project_list(&mut s, ctx, dark);
        render_preview_panel(&mut s, ctx, dark);
        render_chat(&mut s, ctx, dark);
        render_settings_dialog(&mut s, ctx);
    }
}

fn render_header(s: &mut AppState, ctx: &egui::Context, dark: bool) {
    egui::TopBottomPanel::top("header")
        .frame(egui::Frame::none().fill(if dark {
            egui::Color32::from_rgb(35, 35, 42)
        } else {
            egui::Color32::from_rgb(245, 247, 250)
        }))
        .show(ctx, |ui| {
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.add_space(16.0);
                ui.heading(
                    egui::RichText::new("Siteweaver")
                        .size(22.0)
                        .color(if dark {
                            egui::Color32::from_rgb(220, 220, 230)
                        } else {
                            egui::Color32::from_rgb(60, 60, 80)
                        }),
                );
                ui.label(
                    egui::RichText::new("chat-driven website builder")
                        .size(12.0)
                        .weak(),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(16.0);
                    if ui.button("Settings").clicked() {
                        s.show_settings_dialog = true;
                    }
                    let dark_icon = if s.settings.dark_mode { "☀" } else { "🌙" };
                    if ui
                        .add(egui::Button::new(egui::RichText::new(dark_icon).size(16.0)).frame(false))
                        .clicked()
                    {
                        s.settings.dark_mode = !s.settings.dark_mode;
                        save_settings(&s.settings);
                    }
                    if !s.show_preview && ui.small_button("◂ Preview").clicked() {
                        s.show_preview = true;
                    }
                });
            });
            ui.add_space(10.0);
        });
}

fn render_project_list(s: &mut AppState, ctx: &egui::Context, dark: bool) {
    // Snapshot the rows so the list UI never fights the store borrow.
    let rows: Vec<(String, String)> = s
        .store
        .projects()
        .iter()
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect();
    let active_id = s.store.active_project_id().map(str::to_string);

    let mut selected: Option<String> = None;
    let mut deleted: Option<String> = None;
    let mut create = false;

    egui::SidePanel::left("projects")
        .default_width(230.0)
        .min_width(180.0)
        .frame(
            egui::Frame::none()
                .fill(if dark {
                    egui::Color32::from_rgb(30, 30, 36)
                } else {
                    egui::Color32::from_rgb(248, 248, 252)
                })
                .inner_margin(egui::Margin::same(10.0)),
        )
        .show(ctx, |ui| {
            if ui.button("+ New Website").clicked() {
                create = true;
            }
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (id, name) in &rows {
                        let is_active = active_id.as_deref() == Some(id.as_str());
                        ui.horizontal(|ui| {
                            if ui
                                .selectable_label(is_active, name)
                                .on_hover_text("Open this project")
                                .clicked()
                            {
                                selected = Some(id.clone());
                            }
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui
                                        .small_button("🗑")
                                        .on_hover_text("Delete this project")
                                        .clicked()
                                    {
                                        deleted = Some(id.clone());
                                    }
                                },
                            );
                        });
                    }
                });
        });

    if create {
        s.store.create_project();
    }
    if let Some(id) = selected {
        s.store.select_project(&id);
    }
    if let Some(id) = deleted {
        s.store.delete_project(&id);
    }
}

fn render_preview_panel(s: &mut AppState, ctx: &egui::Context, dark: bool) {
    if !s.show_preview {
        return;
    }

    let code = s
        .store
        .active_project()
        .and_then(|p| p.generated_code.clone());

    egui::SidePanel::right("preview")
        .default_width(460.0)
        .min_width(320.0)
        .frame(
            egui::Frame::none()
                .fill(if dark {
                    egui::Color32::from_rgb(35, 35, 42)
                } else {
                    egui::Color32::WHITE
                })
                .inner_margin(egui::Margin::same(12.0)),
        )
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Preview").size(16.0).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Hide").clicked() {
                        s.show_preview = false;
                    }
                });
            });
            ui.separator();

            match &code {
                Some(html) => s.preview.ui(ui, html),
                None => {
                    ui.add_space(24.0);
                    ui.vertical_centered(|ui| {
                        ui.label(
                            egui::RichText::new("Nothing generated yet")
                                .size(14.0)
                                .weak(),
                        );
                        ui.label(
                            egui::RichText::new(
                                "Describe the website you want in the chat and it will show up here.",
                            )
                            .size(12.0)
                            .weak(),
                        );
                    });
                }
            }
        });
}

fn render_chat(s: &mut AppState, ctx: &egui::Context, dark: bool) {
    egui::CentralPanel::default()
        .frame(
            egui::Frame::none()
                .fill(if dark {
                    egui::Color32::from_rgb(25, 25, 30)
                } else {
                    egui::Color32::from_rgb(250, 250, 252)
                })
                .inner_margin(egui::Margin::same(16.0)),
        )
        .show(ctx, |ui| {
            if !s.has_api_key() {
                key_notice(ui, dark);
                ui.add_space(8.0);
            }

            if let Some(error) = s.store.last_error().map(str::to_string) {
                let mut dismissed = false;
                egui::Frame::none()
                    .fill(egui::Color32::from_rgb(90, 40, 40))
                    .rounding(egui::Rounding::same(8.0))
                    .inner_margin(egui::Margin::same(10.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new(format!("Generation failed: {}", error))
                                    .color(egui::Color32::from_rgb(240, 200, 200)),
                            );
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.small_button("Dismiss").clicked() {
                                        dismissed = true;
                                    }
                                },
                            );
                        });
                    });
                if dismissed {
                    s.store.clear_error();
                }
                ui.add_space(8.0);
            }

            let messages: Vec<(shared::chat_api::Role, String)> = s
                .store
                .active_project()
                .map(|p| {
                    p.chat_history
                        .iter()
                        .map(|m| (m.role, m.content.clone()))
                        .collect()
                })
                .unwrap_or_default();
            let generating = s.is_generating();

            let chat_height = ui.available_height() - 70.0;
            egui::ScrollArea::vertical()
                .max_height(chat_height)
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for (role, content) in &messages {
                        ui.add_space(6.0);
                        render_message(ui, dark, *role, content);
                    }

                    if generating {
                        ui.add_space(6.0);
                        let time = ui.input(|i| i.time);
                        let dots = match ((time * 2.0) as i32) % 4 {
                            0 => "   ",
                            1 => ".  ",
                            2 => ".. ",
                            _ => "...",
                        };
                        ui.label(
                            egui::RichText::new(format!("Generating{}", dots))
                                .italics()
                                .weak(),
                        );
                    }
                });

            if let Some(notice) = s.notice.clone() {
                ui.label(
                    egui::RichText::new(notice)
                        .size(12.0)
                        .color(egui::Color32::from_rgb(220, 180, 100)),
                );
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let response = ui.add_sized(
                    [ui.available_width() - 170.0, 40.0],
                    egui::TextEdit::singleline(&mut s.input_text)
                        .hint_text("Describe the website you want...")
                        .font(egui::FontId::new(15.0, egui::FontFamily::Proportional)),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    s.send_message();
                }

                let enhance_label = if s.is_enhancing() { "Enhancing..." } else { "✨ Enhance" };
                if ui
                    .add_enabled(!s.is_enhancing(), egui::Button::new(enhance_label))
                    .on_hover_text("Expand your prompt into a detailed brief")
                    .clicked()
                {
                    s.enhance_prompt();
                }

                let send = egui::Button::new("Send").fill(egui::Color32::from_rgb(70, 130, 180));
                if ui.add_enabled(!generating, send).clicked() {
                    s.send_message();
                }
            });
        });
}

fn render_message(ui: &mut egui::Ui, dark: bool, role: shared::chat_api::Role, content: &str) {
    use shared::chat_api::Role;

    let (fill, label) = match role {
        Role::User => (
            if dark {
                egui::Color32::from_rgb(45, 60, 80)
            } else {
                egui::Color32::from_rgb(215, 230, 245)
            },
            content.to_string(),
        ),
        // Assistant turns hold the full document; the preview panel shows it.
        _ => (
            if dark {
                egui::Color32::from_rgb(45, 55, 45)
            } else {
                egui::Color32::from_rgb(222, 238, 222)
            },
            format!(
                "Updated the website ({} lines of HTML). See the preview panel.",
                content.lines().count()
            ),
        ),
    };

    egui::Frame::none()
        .fill(fill)
        .rounding(egui::Rounding::same(10.0))
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            ui.label(label);
        });
}

fn key_notice(ui: &mut egui::Ui, dark: bool) {
    egui::Frame::none()
        .fill(if dark {
            egui::Color32::from_rgb(60, 55, 35)
        } else {
            egui::Color32::from_rgb(250, 243, 215)
        })
        .rounding(egui::Rounding::same(8.0))
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            ui.label(
                "No OpenRouter API key configured. Add one in Settings, or set the \
                 OPENROUTER_API_KEY environment variable before launching.",
            );
        });
}

fn render_settings_dialog(s: &mut AppState, ctx: &egui::Context) {
    if !s.show_settings_dialog {
        return;
    }

    let mut open = true;
    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        open = false;
    }
    let mut wants_close = false;

    egui::Window::new("Settings")
        .collapsible(false)
        .resizable(true)
        .open(&mut open)
        .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
        .show(ctx, |ui| {
            ui.set_min_width(380.0);

            ui.heading("OpenRouter");
            ui.label(
                egui::RichText::new("Generation needs an API key. It stays on this device.")
                    .size(11.0)
                    .weak(),
            );
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.label("API key:");
                if s.settings.generator.api_key.is_some() {
                    ui.label(
                        egui::RichText::new("✓ Set")
                            .color(egui::Color32::from_rgb(100, 180, 100))
                            .size(11.0),
                    );
                }
                ui.add(egui::TextEdit::singleline(&mut s.api_key_input).password(true));
                if !s.api_key_input.is_empty() && ui.button("Save").clicked() {
                    s.save_api_key();
                }
            });

            ui.horizontal(|ui| {
                ui.label("Model:");
                if ui
                    .text_edit_singleline(&mut s.settings.generator.model)
                    .changed()
                {
                    save_settings(&s.settings);
                }
            });
            ui.horizontal(|ui| {
                ui.hyperlink_to("Get a key", "https://openrouter.ai/keys");
            });

            if let Some(status) = &s.settings_status {
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(status)
                        .size(11.0)
                        .color(egui::Color32::from_rgb(100, 180, 100)),
                );
            }

            ui.add_space(8.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Done").clicked() {
                    wants_close = true;
                }
            });
        });

    if !open || wants_close {
        s.show_settings_dialog = false;
        s.settings_status = None;
    }
}
