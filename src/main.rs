use iced::widget::{button, column, container, image, row, scrollable, slider, text, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod state;
mod transfer;
mod ui;

use config::Config;
use state::data::SearchResult;
use state::session::{SearchSession, SearchToken, SelectedFile, SessionState, SubmitBlocked};
use transfer::{SearchClient, TransferError};

/// Main application state
struct StyleMuse {
    /// The search session state machine; all workflow decisions live there
    session: SearchSession,
    /// HTTP client for the similarity-search service
    client: SearchClient,
    config: Config,
    /// Preview of the selected image; replacing it drops the old handle
    preview: Option<image::Handle>,
    /// Product thumbnails by product ID, filled in as fetches complete
    thumbnails: HashMap<String, image::Handle>,
    /// Transient inline prompt (e.g. submit without choosing a file)
    notice: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Choose Image"
    BrowseFile,
    /// The picked file finished loading from disk
    FileLoaded(Result<SelectedFile, String>),
    /// User clicked "Find Similar"
    Submit,
    /// The upload for the tagged search attempt finished
    SearchFinished(SearchToken, Result<Vec<SearchResult>, TransferError>),
    /// A product thumbnail finished downloading (None on failure)
    ThumbnailLoaded(String, Option<image::Handle>),
    /// User moved the similarity slider
    SetThreshold(f32),
}

impl StyleMuse {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // Without the service URL the app cannot do anything useful, so
        // refuse to start instead of defaulting to some host silently
        let config = Config::from_env()
            .expect("Cannot start without the search service URL. Set STYLE_MUSE_SERVER_URL.");

        let client = SearchClient::new(config.search_endpoint());
        tracing::info!(endpoint = %config.search_endpoint(), "Style Muse initialized");

        (
            StyleMuse {
                session: SearchSession::new(),
                client,
                config,
                preview: None,
                thumbnails: HashMap::new(),
                notice: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::BrowseFile => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Select an image to search with")
                    .add_filter("Images", &["jpg", "jpeg", "png", "webp"])
                    .pick_file();

                if let Some(path) = picked {
                    return Task::perform(load_selected_file(path), Message::FileLoaded);
                }

                Task::none()
            }
            Message::FileLoaded(Ok(file)) => {
                self.notice = None;
                // Derive the display preview before the session takes the
                // file; the previous handle is dropped by the replacement
                self.preview = Some(image::Handle::from_bytes(file.bytes().as_ref().clone()));
                self.thumbnails.clear();
                self.session.select_file(file);
                Task::none()
            }
            Message::FileLoaded(Err(message)) => {
                tracing::warn!(%message, "could not load the picked file");
                self.notice = Some(message);
                Task::none()
            }
            Message::Submit => match self.session.begin_search() {
                Ok(pending) => {
                    self.notice = None;
                    let client = self.client.clone();
                    let token = pending.token;
                    tracing::info!(file = %pending.file_name, "uploading image for search");
                    Task::perform(
                        async move { client.find_similar(pending.file_name, pending.bytes).await },
                        move |outcome| Message::SearchFinished(token, outcome),
                    )
                }
                Err(blocked @ SubmitBlocked::NoFileSelected) => {
                    self.notice = Some(blocked.to_string());
                    Task::none()
                }
                // Reentrancy guard: an upload is already in flight
                Err(SubmitBlocked::SearchInFlight) => Task::none(),
            },
            Message::SearchFinished(token, outcome) => {
                let applied = self.session.complete_search(token, outcome);
                if applied && self.session.state() == SessionState::ResultsReady {
                    return self.fetch_thumbnails();
                }
                Task::none()
            }
            Message::ThumbnailLoaded(id, handle) => {
                if let Some(handle) = handle {
                    // A new selection may have cleared the results since
                    // this fetch started; only keep images we still show
                    let still_listed = self
                        .session
                        .results()
                        .iter()
                        .any(|r| r.product_details.id == id);
                    if still_listed {
                        self.thumbnails.insert(id, handle);
                    }
                }
                Task::none()
            }
            Message::SetThreshold(value) => {
                self.session.set_threshold(value);
                Task::none()
            }
        }
    }

    /// Kick off one download per result's product image
    fn fetch_thumbnails(&self) -> Task<Message> {
        let tasks: Vec<Task<Message>> = self
            .session
            .results()
            .iter()
            .map(|result| {
                let id = result.product_details.id.clone();
                let url = self.config.image_url(&result.product_details.image_filename);
                let client = self.client.clone();
                Task::perform(
                    async move {
                        match client.fetch_image(url).await {
                            Ok(bytes) => Some(image::Handle::from_bytes(bytes)),
                            Err(err) => {
                                tracing::warn!(error = %err, "failed to fetch product image");
                                None
                            }
                        }
                    },
                    move |handle| Message::ThumbnailLoaded(id.clone(), handle),
                )
            })
            .collect();

        Task::batch(tasks)
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let searching = self.session.state() == SessionState::Uploading;

        let mut content: Column<Message> = column![text("Style Muse").size(48)]
            .spacing(20)
            .padding(40)
            .align_x(Alignment::Center);

        content = content.push(
            button("Choose Image")
                .padding(10)
                .on_press_maybe((!searching).then_some(Message::BrowseFile)),
        );

        if let (Some(handle), Some(file)) = (&self.preview, self.session.selected_file()) {
            content = content.push(
                column![
                    image(handle.clone()).height(Length::Fixed(220.0)),
                    text(file.file_name()).size(14),
                ]
                .spacing(6)
                .align_x(Alignment::Center),
            );
        }

        let submit_label = if searching { "Searching..." } else { "Find Similar" };
        content = content.push(
            button(submit_label)
                .padding(10)
                .on_press_maybe((!searching).then_some(Message::Submit)),
        );

        content = content.push(
            row![
                text(format!(
                    "Similarity threshold: {:.0}%",
                    self.session.threshold() * 100.0
                ))
                .size(14),
                slider(0.0..=1.0, self.session.threshold(), Message::SetThreshold)
                    .step(0.01)
                    .width(Length::Fixed(260.0)),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        );

        if let Some(notice) = &self.notice {
            content = content.push(text(notice.as_str()).size(14));
        }

        if let Some(error) = self.session.error() {
            content = content.push(text(format!("Something went wrong: {}", error)).size(16));
        }

        if self.session.state() == SessionState::ResultsReady {
            let visible = self.session.visible_results();
            content = content.push(ui::results::results_section(
                &visible,
                self.session.results().len(),
                self.session.threshold(),
                &self.thumbnails,
            ));
        }

        container(scrollable(content.width(Length::Fill)))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Read the picked image off disk without blocking the UI
async fn load_selected_file(path: PathBuf) -> Result<SelectedFile, String> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(SelectedFile::new(path, bytes)),
        Err(err) => Err(format!("Could not read {}: {}", path.display(), err)),
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("style_muse=info")),
        )
        .init();

    iced::application("Style Muse", StyleMuse::update, StyleMuse::view)
        .theme(StyleMuse::theme)
        .centered()
        .run_with(StyleMuse::new)
}
