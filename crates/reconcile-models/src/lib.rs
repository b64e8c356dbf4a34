pub mod ids;
pub mod movie;
pub mod show;
pub mod payload;
pub mod skip;

pub use ids::{ImdbId, TmdbId, TvdbId};
pub use movie::MovieRecord;
pub use show::{EpisodeKey, EpisodeRecord, MissingEpisode, ShowRecord};
pub use payload::{AdditionPayload, EpisodeRef, MovieRef, RemovalPayload, ShowRef};
pub use skip::{SkipNotice, SkipReason};
