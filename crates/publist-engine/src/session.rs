//! Last publish options per session.

use dashmap::DashMap;
use publist_core::types::{CmsContext, PublishOptions};

/// Remembers the options a session last opened the publish dialog with.
///
/// Contexts without a session id are neither stored nor looked up.
#[derive(Debug, Default)]
pub struct SessionOptionsStore {
    entries: DashMap<String, PublishOptions>,
}

impl SessionOptionsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored options of the context's session.
    pub fn get(&self, ctx: &CmsContext) -> Option<PublishOptions> {
        let session = ctx.session_id.as_deref()?;
        self.entries.get(session).map(|entry| entry.value().clone())
    }

    /// Returns the stored options, or the defaults.
    pub fn get_or_default(&self, ctx: &CmsContext) -> PublishOptions {
        self.get(ctx).unwrap_or_default()
    }

    /// Stores the options for the context's session.
    pub fn save(&self, ctx: &CmsContext, options: &PublishOptions) {
        if let Some(session) = &ctx.session_id {
            self.entries.insert(session.clone(), options.clone());
        }
    }

    /// Forgets a session.
    pub fn remove(&self, session_id: &str) -> Option<PublishOptions> {
        self.entries.remove(session_id).map(|(_, options)| options)
    }

    /// Returns the number of stored sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no session is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use publist_core::types::{ProjectId, UserId};

    use super::*;

    #[test]
    fn stores_options_per_session() {
        let store = SessionOptionsStore::new();
        let ctx = CmsContext::new(UserId::new(), "editor", ProjectId::new());
        let a = ctx.clone().with_session("a");
        let b = ctx.clone().with_session("b");

        store.save(&a, &PublishOptions::default().with_siblings(true));
        store.save(&ctx, &PublishOptions::default().with_related(false));

        assert!(store.get(&a).unwrap().include_siblings);
        assert_eq!(store.get_or_default(&b), PublishOptions::default());
        assert!(store.get(&ctx).is_none());
        assert_eq!(store.len(), 1);

        assert!(store.remove("a").is_some());
        assert!(store.is_empty());
    }
}
