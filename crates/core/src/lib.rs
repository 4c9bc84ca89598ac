pub mod backends;
pub mod controller;
pub mod error;
pub mod history;
pub mod models;
pub mod state;
pub mod store;
pub mod traits;
pub mod view;
pub mod voice;

pub use backends::HttpBackend;
pub use controller::{SearchController, SearchRequest, SuggestionRequest};
pub use error::{ClientError, DictationError, StorageError};
pub use history::{QueryHistoryStore, HISTORY_KEY};
pub use models::{ClientConfig, Query, RemoteHistoryEntry, SearchResult, DEFAULT_REQUEST_TIMEOUT};
pub use state::{Event, ViewState};
pub use store::{FileStore, MemoryStore};
pub use traits::{KeyValueStore, SearchClient, SpeechRecognizer, SuggestionClient};
pub use view::{display_date, similar_query, sorted_keywords, LinkSection, ResultCard, ScoreBucket};
pub use voice::VoiceCapability;
