//! 会话存储
//!
//! 两个键（token 与用户 JSON）总是一起写入、一起清除。
//! 客户端不校验 token 格式或过期时间，过期只能通过服务端 401 发现。

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::User;
use crate::{STORAGE_TOKEN_KEY, STORAGE_USER_KEY};

/// 持久化键值存储抽象
///
/// 浏览器中由 `localStorage` 实现；测试中使用内存实现。
/// 返回 `bool` 表示操作是否成功，与浏览器存储 API 的容错风格一致。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn delete(&self, key: &str) -> bool;
}

/// 当前会话
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore<K> {
    backend: K,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    /// 保存会话，覆盖已有会话
    pub fn save(&self, token: &str, user: &User) -> bool {
        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to encode user record");
                return false;
            }
        };
        let saved =
            self.backend.set(STORAGE_TOKEN_KEY, token) && self.backend.set(STORAGE_USER_KEY, &user_json);
        if saved {
            info!(username = %user.username, role = %user.role, "session saved");
        } else {
            warn!("persistent storage rejected session write");
        }
        saved
    }

    /// 读取当前会话；从未保存、已清除或用户记录损坏时返回 `None`
    pub fn read(&self) -> Option<Session> {
        let token = self.token()?;
        let user = self.user()?;
        Some(Session { token, user })
    }

    /// 原始 token（空串视为不存在）
    pub fn token(&self) -> Option<String> {
        self.backend
            .get(STORAGE_TOKEN_KEY)
            .filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<User> {
        let raw = self.backend.get(STORAGE_USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "stored user record is unreadable");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// 清除会话（两个键一起删除）
    pub fn clear(&self) {
        let token_removed = self.backend.delete(STORAGE_TOKEN_KEY);
        let user_removed = self.backend.delete(STORAGE_USER_KEY);
        if !(token_removed && user_removed) {
            warn!("persistent storage rejected session removal");
        }
        info!("session cleared");
    }
}

// =========================================================
// 测试工具: MemoryStore
// =========================================================

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::models::Role;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// 内存键值存储，克隆体共享同一份数据
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        entries: Rc<RefCell<HashMap<String, String>>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contains(&self, key: &str) -> bool {
            self.entries.borrow().contains_key(key)
        }
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.entries.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> bool {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            true
        }

        fn delete(&self, key: &str) -> bool {
            self.entries.borrow_mut().remove(key);
            true
        }
    }

    pub fn admin() -> User {
        User {
            id: 1,
            username: "admin".into(),
            role: Role::Admin,
        }
    }

    pub fn technician() -> User {
        User {
            id: 2,
            username: "tech".into(),
            role: Role::Technician,
        }
    }

    #[test]
    fn save_then_read_returns_same_session() {
        let store = SessionStore::new(MemoryStore::new());
        assert!(store.save("tok-1", &admin()));

        let session = store.read().unwrap();
        assert_eq!(session.token, "tok-1");
        assert_eq!(session.user, admin());
        assert!(store.is_authenticated());
    }

    #[test]
    fn save_overwrites_existing_session() {
        let store = SessionStore::new(MemoryStore::new());
        store.save("tok-1", &admin());
        store.save("tok-2", &technician());

        let session = store.read().unwrap();
        assert_eq!(session.token, "tok-2");
        assert_eq!(session.user.username, "tech");
    }

    #[test]
    fn clear_removes_both_keys() {
        let backend = MemoryStore::new();
        let store = SessionStore::new(backend.clone());
        store.save("tok-1", &admin());
        store.clear();

        assert_eq!(store.read(), None);
        assert_eq!(store.token(), None);
        assert!(!backend.contains(STORAGE_TOKEN_KEY));
        assert!(!backend.contains(STORAGE_USER_KEY));
    }

    #[test]
    fn read_on_empty_store_is_none() {
        let store = SessionStore::new(MemoryStore::new());
        assert_eq!(store.read(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn corrupt_user_record_reads_as_no_session_but_keeps_token() {
        let backend = MemoryStore::new();
        backend.set(STORAGE_TOKEN_KEY, "tok-1");
        backend.set(STORAGE_USER_KEY, "{not json");
        let store = SessionStore::new(backend);

        assert_eq!(store.read(), None);
        assert_eq!(store.token().as_deref(), Some("tok-1"));
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let backend = MemoryStore::new();
        backend.set(STORAGE_TOKEN_KEY, "");
        assert!(!SessionStore::new(backend).is_authenticated());
    }
}
