use chrono::{DateTime, Utc};

/// A typed domain fact.
///
/// `event_type` names are dotted: `<context>.<aggregate>.<what happened>`
/// (e.g. `picking.load.planned`). Everything before the last dot is the
/// stream category and must equal the aggregate type the event is stored under.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn event_type(&self) -> &'static str;

    /// Payload schema version for `event_type`.
    fn version(&self) -> u32;

    /// Business time.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Stream category derived from `event_type` (`picking.load`).
    fn category(&self) -> &'static str {
        let name = self.event_type();
        name.rsplit_once('.').map(|(category, _)| category).unwrap_or(name)
    }
}
