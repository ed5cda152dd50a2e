use mastery_common::{Role, User};
use mastery_db::{EntryStore, KvBackend};
use tracing::{info, warn};

use crate::error::Result;

struct Account {
    username: &'static str,
    password: &'static str,
    name: &'static str,
    role: Role,
}

// Fixed demo accounts. This lookup only decides which identity is shown;
// it is not an access-control boundary.
const ACCOUNTS: &[Account] = &[
    Account { username: "student1", password: "s1pass", name: "Student 1", role: Role::Student },
    Account { username: "student2", password: "s2pass", name: "Student 2", role: Role::Student },
    Account { username: "mentor", password: "mentorpass", name: "Mentor", role: Role::Mentor },
];

fn lookup(username: &str, password: &str) -> Option<User> {
    ACCOUNTS
        .iter()
        .find(|account| account.username == username && account.password == password)
        .map(|account| User {
            id: account.username.to_string(),
            name: account.name.to_string(),
            role: account.role,
        })
}

/// Holds the single current identity, persisted alongside the task data.
pub struct SessionManager<'a, B> {
    store: &'a EntryStore<B>,
}

impl<'a, B: KvBackend> SessionManager<'a, B> {
    pub fn new(store: &'a EntryStore<B>) -> Self {
        Self { store }
    }

    /// Check the credentials and make the matching user current. Returns
    /// `None` and leaves any existing session alone when they don't match.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = lookup(username, password) else {
            warn!("Login rejected for {}", username);
            return Ok(None);
        };

        self.store.save_session(&user).await?;
        info!("{} logged in as {}", user.name, user.role);
        Ok(Some(user))
    }

    pub async fn logout(&self) -> Result<()> {
        if self.store.clear_session().await? {
            info!("Session ended");
        }
        Ok(())
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        Ok(self.store.current_session().await?)
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.current_user().await?.is_some())
    }
}
