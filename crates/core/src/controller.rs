use crate::history::QueryHistoryStore;
use crate::state::{Event, ViewState};
use crate::traits::{KeyValueStore, SearchClient, SuggestionClient};
use crate::view::{similar_query, LinkSection, ResultCard};
use crate::voice::VoiceCapability;
use crate::{ClientError, DictationError, Query, RemoteHistoryEntry, SearchResult};
use tracing::{debug, error, info, warn};

/// Monotonic tags for one class of outbound request.
#[derive(Debug, Default)]
struct RequestSequence {
    issued: u64,
}

impl RequestSequence {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn is_latest(&self, seq: u64) -> bool {
        seq == self.issued
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub seq: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: Query,
}

/// Drives the search screen: query text, suggestions, history selection,
/// results, dictation and the stemmed-word panel.
///
/// Requests are split into `begin_*` / `finish_*` halves so a front end can
/// run them concurrently; only the latest request of each kind may land.
pub struct SearchController<B, S>
where
    B: SearchClient + SuggestionClient,
    S: KeyValueStore,
{
    backend: B,
    history: QueryHistoryStore<S>,
    voice: VoiceCapability,
    state: ViewState,
    query: String,
    suggestions: Vec<String>,
    cards: Vec<ResultCard>,
    selected: Option<usize>,
    vocabulary: Vec<String>,
    listening: bool,
    searched: bool,
    suggestion_seq: RequestSequence,
    search_seq: RequestSequence,
}

impl<B, S> SearchController<B, S>
where
    B: SearchClient + SuggestionClient + Send + Sync,
    S: KeyValueStore,
{
    pub fn new(backend: B, history: QueryHistoryStore<S>, voice: VoiceCapability) -> Self {
        Self {
            backend,
            history,
            voice,
            state: ViewState::default(),
            query: String::new(),
            suggestions: Vec::new(),
            cards: Vec::new(),
            selected: None,
            vocabulary: Vec::new(),
            listening: false,
            searched: false,
            suggestion_seq: RequestSequence::default(),
            search_seq: RequestSequence::default(),
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Suggestions as displayed; hidden while a search is in flight.
    pub fn suggestions(&self) -> &[String] {
        if self.state.shows_suggestions() {
            self.suggestions.as_slice()
        } else {
            &[]
        }
    }

    pub fn cards(&self) -> &[ResultCard] {
        &self.cards
    }

    pub fn results(&self) -> Vec<&SearchResult> {
        self.cards.iter().map(ResultCard::result).collect()
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    pub fn selected_history(&self) -> Option<usize> {
        self.selected
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn voice_available(&self) -> bool {
        self.voice.is_available()
    }

    /// The vocabulary panel is offered only until the first search.
    pub fn stemmed_words_available(&self) -> bool {
        !self.searched
    }

    fn apply(&mut self, event: Event) {
        let next = self.state.next(event);
        if next != self.state {
            debug!(from = ?self.state, to = ?next, ?event, "view transition");
        }
        self.state = next;
    }

    pub fn input_changed(&mut self, text: impl Into<String>) -> Option<SuggestionRequest> {
        self.query = text.into();
        let empty = self.query.is_empty();
        self.apply(Event::InputChanged { empty });

        let seq = self.suggestion_seq.issue();
        if empty {
            self.suggestions.clear();
            return None;
        }

        Some(SuggestionRequest {
            seq,
            text: self.query.clone(),
        })
    }

    /// Returns `false` when the response was superseded and dropped.
    pub fn finish_suggestions(
        &mut self,
        seq: u64,
        outcome: Result<Vec<String>, ClientError>,
    ) -> bool {
        if !self.suggestion_seq.is_latest(seq) {
            debug!(seq, latest = self.suggestion_seq.issued, "dropping stale suggestions");
            return false;
        }

        match outcome {
            Ok(suggestions) => self.suggestions = suggestions,
            Err(error) => {
                warn!(%error, query = %self.query, "suggestion fetch failed");
                self.suggestions.clear();
            }
        }
        true
    }

    pub async fn type_text(&mut self, text: impl Into<String>) {
        if let Some(request) = self.input_changed(text) {
            let outcome = self.backend.suggestions(&request.text).await;
            self.finish_suggestions(request.seq, outcome);
        }
    }

    /// Puts the suggestion in the input without searching.
    pub fn select_suggestion(&mut self, index: usize) -> bool {
        let Some(suggestion) = self.suggestions().get(index).cloned() else {
            return false;
        };

        self.query = suggestion;
        self.suggestions.clear();
        self.suggestion_seq.issue();
        self.apply(Event::InputChanged { empty: self.query.is_empty() });
        true
    }

    /// Records the query and moves to `Searching`. A blank query clears the
    /// results instead and returns `None`.
    pub fn begin_search(&mut self) -> Option<SearchRequest> {
        let seq = self.search_seq.issue();

        let Some(query) = Query::parse(&self.query) else {
            self.cards.clear();
            self.apply(Event::SubmittedEmpty);
            return None;
        };

        // A parsed query is never blank, so the entry always lands at the front.
        if let Some(selected) = self.selected.as_mut() {
            *selected += 1;
        }
        if let Err(error) = self.history.add(query.as_str()) {
            error!(%error, "failed to persist query history");
        }

        self.suggestions.clear();
        self.suggestion_seq.issue();
        self.searched = true;
        self.apply(Event::SearchStarted);
        info!(query = %query, seq, "search started");

        Some(SearchRequest { seq, query })
    }

    /// Returns `false` when the response was superseded and dropped.
    pub fn finish_search(
        &mut self,
        seq: u64,
        outcome: Result<Vec<SearchResult>, ClientError>,
    ) -> bool {
        if !self.search_seq.is_latest(seq) {
            debug!(seq, latest = self.search_seq.issued, "dropping stale search results");
            return false;
        }

        self.cards = match outcome {
            Ok(results) => results.into_iter().map(ResultCard::new).collect(),
            Err(error) => {
                error!(%error, query = %self.query, "search failed");
                Vec::new()
            }
        };

        let found = !self.cards.is_empty();
        self.apply(Event::SearchFinished { found });
        info!(results = self.cards.len(), "search finished");
        true
    }

    pub async fn submit(&mut self) {
        if let Some(request) = self.begin_search() {
            let outcome = self.backend.search(&request.query).await;
            self.finish_search(request.seq, outcome);
        }
    }

    /// Sets the query text and submits it as if typed by the user.
    pub async fn search_for(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.submit().await;
    }

    /// Toggles the entry's selection. Only a click that selects it searches.
    pub async fn click_history(&mut self, index: usize) -> bool {
        let Some(entry) = self.history.get(index).map(str::to_string) else {
            return false;
        };

        if self.selected == Some(index) {
            self.selected = None;
            return true;
        }

        self.selected = Some(index);
        self.search_for(entry).await;
        true
    }

    /// Deletes every copy of the entry; no confirmation, no undo.
    pub fn double_click_history(&mut self, index: usize) -> usize {
        let Some(target) = self.history.get(index).map(str::to_string) else {
            return 0;
        };

        self.selected = self.selected.and_then(|selected| {
            let entries = self.history.entries();
            if entries[selected] == target {
                return None;
            }
            let shift = entries[..selected]
                .iter()
                .filter(|entry| **entry == target)
                .count();
            Some(selected - shift)
        });

        let before = self.history.len();
        if let Err(error) = self.history.delete(&target) {
            error!(%error, query = %target, "failed to persist history deletion");
        }
        before - self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.selected = None;
        if let Err(error) = self.history.clear() {
            error!(%error, "failed to persist cleared history");
        }
    }

    /// Searches with the result's keywords, strongest first.
    pub async fn find_similar(&mut self, index: usize) -> bool {
        let Some(card) = self.cards.get(index) else {
            return false;
        };

        let query = similar_query(card.result());
        debug!(index, query = %query, "find similar");
        self.search_for(query).await;
        true
    }

    pub fn toggle_links(&mut self, index: usize, section: LinkSection) -> Option<bool> {
        self.cards.get_mut(index).map(|card| card.toggle(section))
    }

    pub fn start_dictation(&mut self) -> Result<(), DictationError> {
        self.voice.start()?;
        self.listening = true;
        self.query.clear();
        self.suggestions.clear();
        self.suggestion_seq.issue();
        self.apply(Event::InputChanged { empty: true });
        Ok(())
    }

    /// Each transcript replaces the query text; nothing is submitted.
    pub fn transcript_update(&mut self, transcript: impl Into<String>) -> bool {
        if !self.listening {
            return false;
        }

        self.query = transcript.into();
        self.apply(Event::InputChanged {
            empty: self.query.is_empty(),
        });
        true
    }

    pub fn stop_dictation(&mut self) -> Result<(), DictationError> {
        if !self.listening {
            return Ok(());
        }
        self.listening = false;
        self.voice.stop()
    }

    /// Opens or closes the vocabulary panel. Every opening fetches the
    /// whole list again. Returns whether the panel is open afterwards.
    pub async fn toggle_stemmed_words(&mut self) -> bool {
        if !self.stemmed_words_available() {
            debug!("stemmed words are only offered before the first search");
            return false;
        }

        let has_query = !self.query.is_empty();
        if self.state == ViewState::StemmedBrowsing {
            self.apply(Event::StemmedToggled { has_query });
            return false;
        }

        self.apply(Event::StemmedToggled { has_query });
        if self.state != ViewState::StemmedBrowsing {
            return false;
        }

        self.vocabulary = match self.backend.stemmed_words().await {
            Ok(words) => words,
            Err(error) => {
                warn!(%error, "stemmed word fetch failed");
                Vec::new()
            }
        };
        true
    }

    /// Backend query log, newest first.
    pub async fn remote_history(&self) -> Vec<RemoteHistoryEntry> {
        let mut entries = match self.backend.recent_queries().await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(%error, "remote history fetch failed");
                Vec::new()
            }
        };
        entries.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
        entries
    }
}
