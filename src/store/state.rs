/// Marker trait for store state.
///
/// State is replaced as a whole on every reduction, and handed out as clones
/// to readers and subscribers, so it should be cheap to clone (wrap large
/// parts in `Arc` if needed).
pub trait State: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> State for T {}
