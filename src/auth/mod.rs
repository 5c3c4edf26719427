//! User accounts, permissions and the in-memory user database.
//!
//! The database is populated through [`Server::add_user`](crate::Server::add_user)
//! and [`Server::add_anonymous`](crate::Server::add_anonymous) before the
//! server starts and is frozen afterwards; sessions only ever read it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bitflags::bitflags;

/// The two well-known usernames that FTP clients use for password-less access.
/// Registering either one reserves both.
pub const ANONYMOUS_ALIASES: [&str; 2] = ["anonymous", "ftp"];

bitflags! {
    /// What a user is allowed to do. Combine with `|`; [`Permissions::ALL`]
    /// grants everything.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u32 {
        /// Allow RETR and SIZE on files.
        const FILE_READ = 0b0_0000_0001;
        /// Allow STOR and STOU, and overwriting through APPE.
        const FILE_WRITE = 0b0_0000_0010;
        /// Allow APPE.
        const FILE_APPEND = 0b0_0000_0100;
        /// Allow DELE.
        const FILE_DELETE = 0b0_0000_1000;
        /// Allow RNFR/RNTO on files.
        const FILE_RENAME = 0b0_0001_0000;
        /// Allow LIST and NLST.
        const DIR_LIST = 0b0_0010_0000;
        /// Allow MKD.
        const DIR_CREATE = 0b0_0100_0000;
        /// Allow RMD.
        const DIR_DELETE = 0b0_1000_0000;
        /// Allow RNFR/RNTO on directories.
        const DIR_RENAME = 0b1_0000_0000;
        /// Every permission bit set.
        const ALL = Self::FILE_READ.bits()
            | Self::FILE_WRITE.bits()
            | Self::FILE_APPEND.bits()
            | Self::FILE_DELETE.bits()
            | Self::FILE_RENAME.bits()
            | Self::DIR_LIST.bits()
            | Self::DIR_CREATE.bits()
            | Self::DIR_DELETE.bits()
            | Self::DIR_RENAME.bits();
    }
}

/// A registered account: credentials, the local directory that becomes the
/// user's `/`, and the permission mask applied to every command.
#[derive(Debug)]
pub struct User {
    username: String,
    password: String,
    root: PathBuf,
    permissions: Permissions,
    // Anonymous aliases accept any password.
    any_password: bool,
}

impl User {
    /// The name the user logs in with.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The local directory serving as this user's virtual root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The user's permission mask.
    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub(crate) fn can(&self, wanted: Permissions) -> bool {
        self.permissions.contains(wanted)
    }
}

/// The in-memory username → account map consulted on every login.
#[derive(Debug, Default, Clone)]
pub struct UserDatabase {
    users: HashMap<String, Arc<User>>,
}

impl UserDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        UserDatabase { users: HashMap::new() }
    }

    /// Registers a user. Returns false and leaves the database untouched when
    /// the username is already taken, syntactically invalid (empty, longer
    /// than 255 bytes, or containing control characters), or when `root` does
    /// not name an existing directory.
    ///
    /// Registering "anonymous" or "ftp" reserves both aliases and makes the
    /// password irrelevant for them.
    pub fn add_user<P: Into<PathBuf>>(&mut self, username: &str, password: &str, root: P, permissions: Permissions) -> bool {
        if username.is_empty() || username.len() > 255 || username.chars().any(|c| c.is_control()) {
            return false;
        }
        let root = root.into();
        if !root.is_absolute() || !root.is_dir() {
            return false;
        }
        if ANONYMOUS_ALIASES.contains(&username) {
            return self.insert_anonymous(root, permissions);
        }
        if self.users.contains_key(username) {
            return false;
        }
        let user = Arc::new(User {
            username: username.to_string(),
            password: password.to_string(),
            root,
            permissions,
            any_password: false,
        });
        self.users.insert(username.to_string(), user);
        true
    }

    /// Registers the anonymous account under both well-known aliases.
    pub fn add_anonymous<P: Into<PathBuf>>(&mut self, root: P, permissions: Permissions) -> bool {
        let root = root.into();
        if !root.is_absolute() || !root.is_dir() {
            return false;
        }
        self.insert_anonymous(root, permissions)
    }

    fn insert_anonymous(&mut self, root: PathBuf, permissions: Permissions) -> bool {
        if ANONYMOUS_ALIASES.iter().any(|alias| self.users.contains_key(*alias)) {
            return false;
        }
        for alias in ANONYMOUS_ALIASES {
            let user = Arc::new(User {
                username: alias.to_string(),
                password: String::new(),
                root: root.clone(),
                permissions,
                any_password: true,
            });
            self.users.insert(alias.to_string(), user);
        }
        true
    }

    /// Looks up `username` (case-sensitive) and verifies `password`.
    /// Anonymous aliases authenticate with any password.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Arc<User>> {
        let user = self.users.get(username)?;
        if user.any_password || user.password == password {
            Some(Arc::clone(user))
        } else {
            None
        }
    }

    /// Tells whether an anonymous account has been registered.
    pub fn has_anonymous(&self) -> bool {
        self.users.contains_key("anonymous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_root() -> PathBuf {
        std::env::temp_dir()
    }

    #[test]
    fn add_and_authenticate() {
        let mut db = UserDatabase::new();
        assert!(db.add_user("alice", "secret", tmp_root(), Permissions::ALL));
        assert!(db.authenticate("alice", "secret").is_some());
        assert!(db.authenticate("alice", "wrong").is_none());
        assert!(db.authenticate("Alice", "secret").is_none(), "usernames are case-sensitive");
        assert!(db.authenticate("bob", "secret").is_none());
    }

    #[test]
    fn duplicate_username_rejected() {
        let mut db = UserDatabase::new();
        assert!(db.add_user("alice", "a", tmp_root(), Permissions::ALL));
        assert!(!db.add_user("alice", "b", tmp_root(), Permissions::ALL));
    }

    #[test]
    fn invalid_usernames_rejected() {
        let mut db = UserDatabase::new();
        assert!(!db.add_user("", "pw", tmp_root(), Permissions::ALL));
        assert!(!db.add_user("bad\x07name", "pw", tmp_root(), Permissions::ALL));
        let long = "x".repeat(256);
        assert!(!db.add_user(&long, "pw", tmp_root(), Permissions::ALL));
    }

    #[test]
    fn missing_root_rejected() {
        let mut db = UserDatabase::new();
        assert!(!db.add_user("alice", "pw", "/definitely/not/a/real/path", Permissions::ALL));
    }

    #[test]
    fn anonymous_aliases_reserve_each_other() {
        let mut db = UserDatabase::new();
        assert!(db.add_anonymous(tmp_root(), Permissions::DIR_LIST));
        assert!(!db.add_user("ftp", "pw", tmp_root(), Permissions::ALL));
        assert!(!db.add_anonymous(tmp_root(), Permissions::ALL));
        assert!(db.authenticate("anonymous", "anything@example.com").is_some());
        assert!(db.authenticate("ftp", "").is_some());
    }

    #[test]
    fn permission_mask() {
        let all = Permissions::ALL;
        assert!(all.contains(Permissions::FILE_READ | Permissions::DIR_RENAME));
        let read_only = Permissions::FILE_READ | Permissions::DIR_LIST;
        assert!(!read_only.contains(Permissions::FILE_DELETE));
    }
}
