use std::time::Duration;

use crate::contract::{ResultsResponse, SearchRequest, SuggestionRequest, SuggestionsResponse};
use crate::history_store::HistoryStore;
use crate::keyboard::{Key, KeyIntent, KeyboardSession};
use crate::model::{EntityFilter, ResultEntry, SuggestionEntry};
use crate::query_dsl::ParsedQuery;
use crate::ranking::{sanitize_relevance, sort_results, SortKey};
use crate::source::SourceError;

pub const MIN_RESULT_QUERY_LEN: usize = 2;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub debounce: Duration,
    pub max_results: usize,
    pub role: Option<String>,
    pub show_filters: bool,
    pub show_suggestions: bool,
    pub show_history: bool,
    pub query_dsl_enabled: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            max_results: 20,
            role: None,
            show_filters: true,
            show_suggestions: true,
            show_history: true,
            query_dsl_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    HasResults,
    NoResults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Suggesting,
    Pending,
    Searching,
    Resolved(Resolution),
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchFilters {
    pub entity: EntityFilter,
    pub sort: SortKey,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    StartTimer { ticket: u64, delay: Duration },
    CancelTimer,
    FetchSuggestions(SuggestionRequest),
    FetchResults(SearchRequest),
    Search { query: String, filters: SearchFilters },
    Select(ResultEntry),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Candidate<'a> {
    History(&'a str),
    Suggestion(&'a SuggestionEntry),
    Result(&'a ResultEntry),
}

pub struct SearchController {
    settings: ControllerSettings,
    history: HistoryStore,
    query: String,
    parsed: ParsedQuery,
    filters: SearchFilters,
    phase: Phase,
    open: bool,
    mounted: bool,
    last_seq: u64,
    awaiting: Option<u64>,
    last_ticket: u64,
    live_ticket: Option<u64>,
    recent: Vec<String>,
    suggestions: Vec<SuggestionEntry>,
    results: Vec<ResultEntry>,
    user_role: Option<String>,
    last_error: Option<SourceError>,
    keyboard: KeyboardSession,
}

impl SearchController {
    pub fn new(settings: ControllerSettings, history: HistoryStore) -> Self {
        let recent = if settings.show_history {
            history.load()
        } else {
            Vec::new()
        };

        Self {
            settings,
            history,
            query: String::new(),
            parsed: ParsedQuery::default(),
            filters: SearchFilters::default(),
            phase: Phase::Idle,
            open: false,
            mounted: true,
            last_seq: 0,
            awaiting: None,
            last_ticket: 0,
            live_ticket: None,
            recent,
            suggestions: Vec::new(),
            results: Vec::new(),
            user_role: None,
            last_error: None,
            keyboard: KeyboardSession::default(),
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn parsed_query(&self) -> &ParsedQuery {
        &self.parsed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn filters(&self) -> SearchFilters {
        self.filters
    }

    // An inline `@type` token wins over the selected filter.
    pub fn effective_filter(&self) -> EntityFilter {
        self.parsed.entity_override.unwrap_or(self.filters.entity)
    }

    pub fn results(&self) -> &[ResultEntry] {
        &self.results
    }

    pub fn suggestions(&self) -> &[SuggestionEntry] {
        &self.suggestions
    }

    pub fn recent_history(&self) -> &[String] {
        &self.recent
    }

    pub fn user_role(&self) -> Option<&str> {
        self.user_role.as_deref()
    }

    pub fn last_error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }

    pub fn keyboard(&self) -> &KeyboardSession {
        &self.keyboard
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.keyboard.highlighted()
    }

    pub fn latest_sequence(&self) -> u64 {
        self.last_seq
    }

    pub fn has_live_timer(&self) -> bool {
        self.live_ticket.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.live_ticket.is_some() || self.awaiting.is_some()
    }

    pub fn query_qualifies(&self) -> bool {
        self.parsed.text_len() >= MIN_RESULT_QUERY_LEN
    }

    pub fn showing_results(&self) -> bool {
        self.open && self.query_qualifies() && !self.results.is_empty()
    }

    pub fn showing_history(&self) -> bool {
        self.open && self.settings.show_history && self.parsed.raw.is_empty()
    }

    pub fn candidates(&self) -> Vec<Candidate<'_>> {
        if !self.open {
            return Vec::new();
        }
        if self.query_qualifies() {
            return self.results.iter().map(Candidate::Result).collect();
        }

        let mut candidates = Vec::new();
        if self.showing_history() {
            candidates.extend(self.recent.iter().map(|term| Candidate::History(term)));
        }
        if self.settings.show_suggestions {
            candidates.extend(self.suggestions.iter().map(Candidate::Suggestion));
        }
        candidates
    }

    pub fn open(&mut self) -> Vec<Command> {
        if !self.mounted || self.open {
            return Vec::new();
        }
        self.open = true;
        self.reload_recent();
        self.refresh_keyboard();

        if self.query_qualifies() && !self.results.is_empty() {
            return Vec::new();
        }
        self.dispatch()
    }

    pub fn input(&mut self, text: &str) -> Vec<Command> {
        if !self.mounted {
            return Vec::new();
        }
        if !self.open {
            self.open = true;
            self.reload_recent();
        }

        self.set_query(text);
        if self.parsed.raw.is_empty() {
            // Emptied by typing: same as a clear, but still debounced.
            self.awaiting = None;
            self.results.clear();
            self.last_error = None;
            self.phase = Phase::Idle;
        } else if self.query_qualifies() {
            self.phase = Phase::Pending;
        } else {
            self.awaiting = None;
            self.results.clear();
            self.phase = Phase::Suggesting;
        }
        self.refresh_keyboard();
        self.schedule()
    }

    pub fn clear(&mut self) -> Vec<Command> {
        if !self.mounted {
            return Vec::new();
        }
        self.set_query("");
        self.awaiting = None;
        self.results.clear();
        self.last_error = None;
        self.phase = Phase::Idle;
        self.reload_recent();
        self.refresh_keyboard();

        let mut commands = self.cancel_timer();
        if self.open {
            commands.extend(self.dispatch());
        }
        commands
    }

    pub fn timer_fired(&mut self, ticket: u64) -> Vec<Command> {
        if !self.mounted || self.live_ticket != Some(ticket) {
            return Vec::new();
        }
        self.live_ticket = None;
        self.dispatch()
    }

    pub fn apply_suggestions(
        &mut self,
        seq: u64,
        outcome: Result<SuggestionsResponse, SourceError>,
    ) -> bool {
        if !self.accepts(seq) {
            tracing::debug!(seq, latest = self.last_seq, "discarding stale suggestions");
            return false;
        }
        self.awaiting = None;

        match outcome {
            Ok(response) => {
                if response.user_role.is_some() {
                    self.user_role = response.user_role;
                }
                self.suggestions = response
                    .suggestions
                    .into_iter()
                    .filter(|entry| !entry.text.is_empty())
                    .collect();
                self.last_error = None;
                if !self.has_live_timer() {
                    self.phase = self.short_query_phase();
                }
            }
            Err(error) => {
                tracing::warn!(seq, error = %error, "suggestion fetch failed");
                self.suggestions.clear();
                self.last_error = Some(error);
                if !self.has_live_timer() {
                    self.phase = Phase::Error;
                }
            }
        }
        self.refresh_keyboard();
        true
    }

    pub fn apply_results(
        &mut self,
        seq: u64,
        outcome: Result<ResultsResponse, SourceError>,
    ) -> bool {
        if !self.accepts(seq) {
            tracing::debug!(seq, latest = self.last_seq, "discarding stale results");
            return false;
        }
        self.awaiting = None;

        match outcome {
            Ok(response) => {
                if response.user_role.is_some() {
                    self.user_role = response.user_role;
                }
                let mut results = response.results;
                for entry in &mut results {
                    entry.relevance = sanitize_relevance(entry.relevance);
                }
                sort_results(&mut results, SortKey::Relevance);
                results.truncate(self.settings.max_results);
                if self.filters.sort != SortKey::Relevance {
                    sort_results(&mut results, self.filters.sort);
                }
                self.results = results;
                self.last_error = None;
                if !self.has_live_timer() {
                    self.phase = if self.results.is_empty() {
                        Phase::Resolved(Resolution::NoResults)
                    } else {
                        Phase::Resolved(Resolution::HasResults)
                    };
                }
            }
            Err(error) => {
                tracing::warn!(seq, error = %error, "result fetch failed");
                self.results.clear();
                self.last_error = Some(error);
                if !self.has_live_timer() {
                    self.phase = Phase::Error;
                }
            }
        }
        self.refresh_keyboard();
        true
    }

    pub fn key(&mut self, key: Key) -> Vec<Command> {
        if !self.mounted {
            return Vec::new();
        }
        match self.keyboard.on_key(key) {
            KeyIntent::Moved(_) => Vec::new(),
            KeyIntent::Select(index) => self.activate(index),
            KeyIntent::Commit => self.commit(),
            KeyIntent::Close => self.escape(),
        }
    }

    pub fn activate(&mut self, index: usize) -> Vec<Command> {
        enum Picked {
            Result(ResultEntry),
            Text(String),
        }

        let picked = match self.candidates().get(index) {
            Some(Candidate::Result(entry)) => Picked::Result((*entry).clone()),
            Some(Candidate::Suggestion(entry)) => Picked::Text(entry.text.clone()),
            Some(Candidate::History(term)) => Picked::Text((*term).to_string()),
            None => return Vec::new(),
        };

        match picked {
            Picked::Result(entry) => self.select_result(entry),
            Picked::Text(text) => self.input(&text),
        }
    }

    pub fn commit(&mut self) -> Vec<Command> {
        if !self.mounted || self.parsed.raw.is_empty() {
            return Vec::new();
        }
        let term = self.parsed.raw.clone();
        self.history.record(&term);
        self.reload_recent();

        let filters = SearchFilters {
            entity: self.effective_filter(),
            sort: self.filters.sort,
        };
        let query = self.parsed.free_text.clone();
        let mut commands = self.close();
        commands.push(Command::Search { query, filters });
        commands
    }

    pub fn escape(&mut self) -> Vec<Command> {
        self.close()
    }

    pub fn click_outside(&mut self) -> Vec<Command> {
        self.close()
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.filters.sort = key;
        if sort_results(&mut self.results, key) {
            self.refresh_keyboard();
        }
    }

    pub fn set_entity_filter(&mut self, filter: EntityFilter) -> Vec<Command> {
        if !self.mounted || !self.settings.show_filters || self.filters.entity == filter {
            return Vec::new();
        }
        self.filters.entity = filter;
        if !self.open || !self.query_qualifies() || self.parsed.entity_override.is_some() {
            return Vec::new();
        }
        self.phase = Phase::Pending;
        self.schedule()
    }

    pub fn unmount(&mut self) -> Vec<Command> {
        if !self.mounted {
            return Vec::new();
        }
        let commands = self.close();
        self.mounted = false;
        commands
    }

    fn select_result(&mut self, entry: ResultEntry) -> Vec<Command> {
        let term = if self.parsed.raw.is_empty() {
            entry.title.clone()
        } else {
            self.parsed.raw.clone()
        };
        self.history.record(&term);

        let mut commands = self.close();
        self.set_query("");
        self.results.clear();
        self.last_error = None;
        self.phase = Phase::Idle;
        self.reload_recent();
        commands.push(Command::Select(entry));
        commands
    }

    fn close(&mut self) -> Vec<Command> {
        let commands = self.cancel_timer();
        self.awaiting = None;
        self.open = false;
        if matches!(self.phase, Phase::Pending | Phase::Searching) {
            self.phase = Phase::Idle;
        }
        self.keyboard.reset(0);
        commands
    }

    fn schedule(&mut self) -> Vec<Command> {
        if !self.query_qualifies() && !self.settings.show_suggestions {
            return self.cancel_timer();
        }
        self.last_ticket += 1;
        self.live_ticket = Some(self.last_ticket);
        vec![Command::StartTimer {
            ticket: self.last_ticket,
            delay: self.settings.debounce,
        }]
    }

    fn cancel_timer(&mut self) -> Vec<Command> {
        match self.live_ticket.take() {
            Some(_) => vec![Command::CancelTimer],
            None => Vec::new(),
        }
    }

    fn dispatch(&mut self) -> Vec<Command> {
        if self.query_qualifies() {
            let seq = self.mint();
            self.phase = Phase::Searching;
            return vec![Command::FetchResults(SearchRequest {
                seq,
                query: self.parsed.free_text.clone(),
                entity_filter: self.effective_filter(),
                cap: self.settings.max_results,
            })];
        }

        if !self.settings.show_suggestions {
            return Vec::new();
        }
        let seq = self.mint();
        let partial = Some(self.parsed.free_text.clone()).filter(|text| !text.is_empty());
        vec![Command::FetchSuggestions(SuggestionRequest {
            seq,
            partial,
            role: self.settings.role.clone(),
        })]
    }

    fn mint(&mut self) -> u64 {
        self.last_seq += 1;
        self.awaiting = Some(self.last_seq);
        self.last_seq
    }

    fn accepts(&self, seq: u64) -> bool {
        self.mounted && self.awaiting == Some(seq)
    }

    fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.parsed = ParsedQuery::parse(text, self.settings.query_dsl_enabled);
    }

    fn short_query_phase(&self) -> Phase {
        if self.parsed.raw.is_empty() {
            Phase::Idle
        } else if self.query_qualifies() {
            // Suggestions only land for short queries; keep whatever
            // result phase is current.
            self.phase
        } else {
            Phase::Suggesting
        }
    }

    fn reload_recent(&mut self) {
        if self.settings.show_history {
            self.recent = self.history.load();
        }
    }

    fn refresh_keyboard(&mut self) {
        let len = self.candidates().len();
        self.keyboard.reset(len);
    }
}
