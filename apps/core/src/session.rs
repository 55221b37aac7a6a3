use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::contract::{ResultsResponse, SearchRequest, SuggestionRequest, SuggestionsResponse};
use crate::controller::{Command, SearchController, SearchFilters};
use crate::keyboard::Key;
use crate::model::{EntityFilter, ResultEntry};
use crate::navigator::{Router, SelectionNavigator};
use crate::ranking::SortKey;
use crate::source::{ResultSource, SourceError, SuggestionSource};
use crate::view::PanelView;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug)]
pub enum SessionEvent {
    TimerFired {
        ticket: u64,
    },
    Suggestions {
        seq: u64,
        outcome: Result<SuggestionsResponse, SourceError>,
    },
    Results {
        seq: u64,
        outcome: Result<ResultsResponse, SourceError>,
    },
}

pub type SearchCallback = Box<dyn FnMut(&str, &SearchFilters) + Send>;
pub type ResultClickCallback = Box<dyn FnMut(&ResultEntry) + Send>;

#[derive(Default)]
pub struct Callbacks {
    on_search: Option<SearchCallback>,
    on_result_click: Option<ResultClickCallback>,
}

impl Callbacks {
    pub fn on_search(mut self, callback: impl FnMut(&str, &SearchFilters) + Send + 'static) -> Self {
        self.on_search = Some(Box::new(callback));
        self
    }

    pub fn on_result_click(mut self, callback: impl FnMut(&ResultEntry) + Send + 'static) -> Self {
        self.on_result_click = Some(Box::new(callback));
        self
    }
}

pub struct SearchSession<S, R>
where
    S: SuggestionSource + 'static,
    R: ResultSource + 'static,
{
    controller: SearchController,
    suggestion_source: Arc<S>,
    result_source: Arc<R>,
    navigator: SelectionNavigator,
    router: Box<dyn Router>,
    callbacks: Callbacks,
    fetch_timeout: Duration,
    timer: Option<JoinHandle<()>>,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
}

impl<S, R> SearchSession<S, R>
where
    S: SuggestionSource + 'static,
    R: ResultSource + 'static,
{
    pub fn new(
        controller: SearchController,
        suggestion_source: Arc<S>,
        result_source: Arc<R>,
        router: impl Router + 'static,
    ) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            controller,
            suggestion_source,
            result_source,
            navigator: SelectionNavigator::default(),
            router: Box::new(router),
            callbacks: Callbacks::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            timer: None,
            events_tx,
            events_rx,
        }
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_navigator(mut self, navigator: SelectionNavigator) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn view(&self) -> PanelView {
        self.controller.view()
    }

    pub fn open(&mut self) {
        let commands = self.controller.open();
        self.run(commands);
    }

    pub fn input(&mut self, text: &str) {
        let commands = self.controller.input(text);
        self.run(commands);
    }

    pub fn key(&mut self, key: Key) {
        let commands = self.controller.key(key);
        self.run(commands);
    }

    pub fn activate(&mut self, index: usize) {
        let commands = self.controller.activate(index);
        self.run(commands);
    }

    pub fn commit(&mut self) {
        let commands = self.controller.commit();
        self.run(commands);
    }

    pub fn escape(&mut self) {
        let commands = self.controller.escape();
        self.run(commands);
    }

    pub fn click_outside(&mut self) {
        let commands = self.controller.click_outside();
        self.run(commands);
    }

    pub fn clear(&mut self) {
        let commands = self.controller.clear();
        self.run(commands);
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.controller.set_sort(key);
    }

    pub fn set_entity_filter(&mut self, filter: EntityFilter) {
        let commands = self.controller.set_entity_filter(filter);
        self.run(commands);
    }

    // Waits for the next timer or fetch completion. Cancel safe.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::TimerFired { ticket } => {
                let commands = self.controller.timer_fired(ticket);
                let fired = !commands.is_empty();
                self.run(commands);
                fired
            }
            SessionEvent::Suggestions { seq, outcome } => {
                self.controller.apply_suggestions(seq, outcome)
            }
            SessionEvent::Results { seq, outcome } => self.controller.apply_results(seq, outcome),
        }
    }

    pub async fn process_next(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => self.handle_event(event),
            None => false,
        }
    }

    pub async fn settle(&mut self) {
        while self.controller.is_busy() {
            if self.next_event().await.map(|event| self.handle_event(event)).is_none() {
                break;
            }
        }
    }

    pub fn unmount(mut self) {
        let commands = self.controller.unmount();
        self.run(commands);
    }

    fn run(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::StartTimer { ticket, delay } => self.start_timer(ticket, delay),
                Command::CancelTimer => self.abort_timer(),
                Command::FetchSuggestions(request) => self.spawn_suggestions(request),
                Command::FetchResults(request) => self.spawn_results(request),
                Command::Search { query, filters } => match self.callbacks.on_search.as_mut() {
                    Some(callback) => callback(&query, &filters),
                    None => tracing::debug!(query = %query, "search committed without callback"),
                },
                Command::Select(entry) => self.select(entry),
            }
        }
    }

    fn select(&mut self, entry: ResultEntry) {
        if let Some(callback) = self.callbacks.on_result_click.as_mut() {
            callback(&entry);
            return;
        }
        if let Some(destination) = self.navigator.destination_for(&entry) {
            tracing::info!(id = %entry.id, route = %destination, "navigating to result");
            self.router.navigate(&destination);
        }
    }

    fn start_timer(&mut self, ticket: u64, delay: Duration) {
        self.abort_timer();
        let events_tx = self.events_tx.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events_tx.send(SessionEvent::TimerFired { ticket });
        }));
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn spawn_suggestions(&self, request: SuggestionRequest) {
        let source = Arc::clone(&self.suggestion_source);
        let events_tx = self.events_tx.clone();
        let limit = self.fetch_timeout;
        tracing::debug!(seq = request.seq, partial = ?request.partial, "fetching suggestions");
        tokio::spawn(async move {
            let outcome = within(
                limit,
                source.fetch_suggestions(request.partial.as_deref(), request.role.as_deref()),
            )
            .await;
            let _ = events_tx.send(SessionEvent::Suggestions {
                seq: request.seq,
                outcome,
            });
        });
    }

    fn spawn_results(&self, request: SearchRequest) {
        let source = Arc::clone(&self.result_source);
        let events_tx = self.events_tx.clone();
        let limit = self.fetch_timeout;
        tracing::debug!(seq = request.seq, query = %request.query, "fetching results");
        tokio::spawn(async move {
            let outcome = within(
                limit,
                source.fetch_results(&request.query, request.entity_filter, request.cap),
            )
            .await;
            let _ = events_tx.send(SessionEvent::Results {
                seq: request.seq,
                outcome,
            });
        });
    }
}

impl<S, R> Drop for SearchSession<S, R>
where
    S: SuggestionSource + 'static,
    R: ResultSource + 'static,
{
    fn drop(&mut self) {
        self.abort_timer();
    }
}

async fn within<T>(
    limit: Duration,
    fetch: impl Future<Output = Result<T, SourceError>>,
) -> Result<T, SourceError> {
    match tokio::time::timeout(limit, fetch).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SourceError::Timeout(limit)),
    }
}
