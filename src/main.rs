use iced::widget::{button, column, container, image as preview, row, slider, text};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;

mod filter;
mod photo;
mod state;

use filter::engine::CpuEngine;
use filter::kind::FilterKind;
use state::session::{FilterSession, ReviewPrompt};
use state::usage::{CounterStore, MemoryCounter, UsageDb};

/// Main application state
struct FilterStudio {
    /// The filter session: source photo, active filter, intensity, output
    session: FilterSession,
    /// Cached iced handle for the current rendered output
    preview: Option<preview::Handle>,
    /// Whether the filter palette is open
    showing_filters: bool,
    /// Bumped on every pick; stale load completions are dropped
    load_generation: u64,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the "Pick Photo" button
    PickPhoto,
    /// Background load finished (generation it was started with, result)
    PhotoLoaded(u64, Option<image::RgbaImage>),
    /// User toggled the filter palette
    ToggleFilters,
    /// User picked a filter from the palette
    FilterPicked(FilterKind),
    /// User moved the intensity slider
    IntensityChanged(f32),
    /// User clicked the share button
    SharePhoto,
}

/// Review prompt backed by a native message dialog
///
/// The session calls this on every filter change past the threshold; we
/// show the dialog at most once per run.
struct DialogReviewPrompt {
    prompted: bool,
}

impl ReviewPrompt for DialogReviewPrompt {
    fn request_review(&mut self) {
        if self.prompted {
            return;
        }
        self.prompted = true;

        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title("Enjoying Filter Studio?")
            .set_description("You've tried a few filters now. A quick review would mean a lot!")
            .show();
    }
}

impl FilterStudio {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // A broken usage database must not keep the app from starting;
        // fall back to a counter that only lives for this run
        let counter: Box<dyn CounterStore> = match UsageDb::new() {
            Ok(db) => Box::new(db),
            Err(e) => {
                eprintln!("⚠️  Usage database unavailable, counting in memory: {}", e);
                Box::new(MemoryCounter::new())
            }
        };

        let session = FilterSession::new(
            Box::new(CpuEngine::new()),
            counter,
            Box::new(DialogReviewPrompt { prompted: false }),
        );

        println!("🎨 Filter Studio initialized");

        (
            FilterStudio {
                session,
                preview: None,
                showing_filters: false,
                load_generation: 0,
                status: String::from("Pick a photo to get started."),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickPhoto => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Pick a Photo")
                    .add_filter("Images", &photo::loader::PHOTO_EXTENSIONS)
                    .pick_file();

                if let Some(path) = picked {
                    // A newer pick supersedes any load still in flight
                    self.load_generation += 1;
                    let generation = self.load_generation;

                    self.status = format!("Loading {}...", path.display());

                    return Task::perform(
                        async move {
                            match photo::loader::load_photo(path).await {
                                Ok(bitmap) => Some(bitmap),
                                Err(e) => {
                                    eprintln!("⚠️  Photo load failed: {}", e);
                                    None
                                }
                            }
                        },
                        move |bitmap| Message::PhotoLoaded(generation, bitmap),
                    );
                }

                Task::none()
            }
            Message::PhotoLoaded(generation, bitmap) => {
                if generation != self.load_generation {
                    println!("⏭️  Ignoring stale photo load (generation {})", generation);
                    return Task::none();
                }

                // A failed load changes nothing, the last photo stays up
                if let Some(bitmap) = bitmap {
                    self.session.install_source(bitmap);
                    self.refresh_preview();
                    self.status = format!("{} at work.", self.session.filter().label());
                }

                Task::none()
            }
            Message::ToggleFilters => {
                self.showing_filters = !self.showing_filters;
                Task::none()
            }
            Message::FilterPicked(kind) => {
                self.showing_filters = false;
                self.session.set_filter(kind);
                self.refresh_preview();
                if self.session.has_source() {
                    self.status = format!("{} at work.", kind.label());
                }
                Task::none()
            }
            Message::IntensityChanged(value) => {
                self.session.set_intensity(value);
                self.refresh_preview();
                Task::none()
            }
            Message::SharePhoto => {
                let Some(rendered) = self.session.rendered() else {
                    return Task::none();
                };

                match photo::share::share_image(rendered, self.session.filter().label()) {
                    Ok(Some(path)) => {
                        self.status = format!("✅ Shared to {}", path.display());
                    }
                    Ok(None) => {} // dialog cancelled
                    Err(e) => {
                        eprintln!("⚠️  Share failed: {}", e);
                    }
                }

                Task::none()
            }
        }
    }

    /// Rebuild the cached preview handle from the session's output
    fn refresh_preview(&mut self) {
        self.preview = self.session.rendered().map(|output| {
            preview::Handle::from_rgba(output.width(), output.height(), output.clone().into_raw())
        });
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let preview_area: Element<Message> = match &self.preview {
            Some(handle) => container(
                preview::Image::new(handle.clone())
                    .width(Length::Fill)
                    .height(Length::Fill),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into(),
            None => container(text("No picture yet. Pick a photo to import one.").size(20))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        let intensity_row = row![
            text("Intensity"),
            slider(0.0..=1.0, self.session.intensity(), Message::IntensityChanged).step(0.01),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let mut controls = row![
            button("Pick Photo").on_press(Message::PickPhoto),
            button("Change Filter").on_press(Message::ToggleFilters),
        ]
        .spacing(10);

        if self.preview.is_some() {
            controls = controls.push(button("Share").on_press(Message::SharePhoto));
        }

        let mut content = column![preview_area, intensity_row, controls]
            .spacing(15)
            .padding(20);

        if self.showing_filters {
            let mut palette = row![].spacing(8);
            for kind in FilterKind::ALL {
                palette = palette
                    .push(button(text(kind.label()).size(14)).on_press(Message::FilterPicked(kind)));
            }
            content = content.push(palette);
        }

        content = content.push(text(&self.status).size(14));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application("Filter Studio", FilterStudio::update, FilterStudio::view)
        .theme(FilterStudio::theme)
        .centered()
        .run_with(FilterStudio::new)
}
