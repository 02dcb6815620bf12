//! Session
//!
//! The signed-in user and their token, passed explicitly to whoever needs
//! them. A session is restored once at startup and torn down on logout;
//! the token itself lives in a [`TokenStore`].

use std::cell::RefCell;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{Comment, Member, MemberId};
use crate::error::ApiResult;

/// Persistent home of the bearer token (browser storage, or memory in tests)
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// Token store that forgets everything on drop
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RefCell<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RefCell::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) {
        *self.token.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        self.token.borrow_mut().take();
    }
}

/// Resolves a token to the user it belongs to
#[async_trait(?Send)]
pub trait UserSource {
    async fn fetch_user(&self, token: &str) -> ApiResult<Member>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<Member>,
    pub token: Option<String>,
}

impl Session {
    /// Restore the session from a persisted token. A token the backend no
    /// longer accepts is cleared and the session starts signed out.
    pub async fn hydrate<S, U>(store: &S, users: &U) -> Session
    where
        S: TokenStore + ?Sized,
        U: UserSource + ?Sized,
    {
        let Some(token) = store.load().filter(|t| !t.is_empty()) else {
            return Session::default();
        };

        match users.fetch_user(&token).await {
            Ok(user) => {
                info!(user = %user.id, "session restored");
                Session {
                    user: Some(user),
                    token: Some(token),
                }
            }
            Err(err) => {
                warn!(error = %err, "stored token rejected, signing out");
                store.clear();
                Session::default()
            }
        }
    }

    pub fn logout<S: TokenStore + ?Sized>(&mut self, store: &S) {
        store.clear();
        self.user = None;
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn user_id(&self) -> Option<&MemberId> {
        self.user.as_ref().map(|u| &u.id)
    }

    /// Comments may be edited or deleted by their author only
    pub fn can_modify(&self, comment: &Comment) -> bool {
        self.user_id().is_some_and(|id| comment.is_editable_by(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CardId, CommentId};
    use crate::error::ApiError;

    struct FakeUsers {
        accepts: &'static str,
    }

    #[async_trait(?Send)]
    impl UserSource for FakeUsers {
        async fn fetch_user(&self, token: &str) -> ApiResult<Member> {
            if token == self.accepts {
                Ok(Member {
                    id: MemberId::new("u1"),
                    name: Some("Ann".into()),
                    email: None,
                })
            } else {
                Err(ApiError::Status {
                    status: 401,
                    message: "expired".into(),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_hydrate_with_valid_token() {
        let store = MemoryTokenStore::with_token("good");
        let session = Session::hydrate(&store, &FakeUsers { accepts: "good" }).await;

        assert!(session.is_authenticated());
        assert_eq!(session.user_id().map(MemberId::as_str), Some("u1"));
        assert_eq!(store.load().as_deref(), Some("good"));
    }

    #[tokio::test]
    async fn test_hydrate_clears_rejected_token() {
        let store = MemoryTokenStore::with_token("stale");
        let session = Session::hydrate(&store, &FakeUsers { accepts: "good" }).await;

        assert_eq!(session, Session::default());
        assert_eq!(store.load(), None);
    }

    #[tokio::test]
    async fn test_hydrate_without_token_stays_signed_out() {
        let store = MemoryTokenStore::default();
        let session = Session::hydrate(&store, &FakeUsers { accepts: "good" }).await;
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_logout_and_comment_permissions() {
        let store = MemoryTokenStore::with_token("t");
        let ann = Member {
            id: MemberId::new("u1"),
            name: None,
            email: None,
        };
        let mut session = Session {
            user: Some(ann.clone()),
            token: Some("t".into()),
        };
        let comment = Comment {
            id: CommentId::new("k1"),
            card_id: CardId::new("c1"),
            author: ann,
            content: "done".into(),
            created_at: None,
        };
        assert!(session.can_modify(&comment));

        session.logout(&store);
        assert!(!session.can_modify(&comment));
        assert_eq!(store.load(), None);
    }
}
