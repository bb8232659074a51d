//! Location-aware derivation of the safety feed.
//!
//! The engine turns a post snapshot, a resolved location and a category
//! filter into the list a rendering layer shows, and owns the location and
//! search state behind that list.

pub mod category;
pub mod location;
pub mod ranker;
pub mod search;
pub mod view;

pub use category::CategorySelector;
pub use location::{
    Accuracy, Coordinates, GeocodedAddress, LocationProvider, LocationResolver, LocationStore,
    PermissionStatus, ResolutionOutcome, StaticLocationProvider, USER_LOCATION_KEY,
};
pub use ranker::{filter_feed, global_hot_pick};
pub use search::{SearchClient, SearchHistory, SubmitOutcome};
pub use view::{format_timestamp, FeedView, HomeDigest, TimestampStyle, HOME_DIGEST_LABELS};
