mod auth;
mod bookmarks;

pub use auth::AuthService;
pub use bookmarks::BookmarkService;

use std::sync::Arc;

use crate::types::Dependencies;

#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub bookmarks: BookmarkService,
}

impl Services {
    pub fn new(deps: Arc<Dependencies>) -> Self {
        Self {
            auth: AuthService::new(deps.clone()),
            bookmarks: BookmarkService::new(deps),
        }
    }
}
