//! CORS rule management
//!
//! The backend only knows "replace all rules" and "delete the configuration".
//! [`CorsRuleSet`] builds add/remove-by-origin on top of that, keeping at
//! most one rule per origin. Only the first allowed origin of each rule is
//! matched, following the one-origin-per-rule convention the add operation
//! produces.
//!
//! An empty rule set is never written: some providers reject an explicit
//! empty list, so removing the last rule deletes the configuration instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::traits::ObjectStore;

/// Methods a CORS rule can allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CorsMethod {
    Get,
    Put,
    Delete,
    Post,
    Head,
}

impl CorsMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorsMethod::Get => "GET",
            CorsMethod::Put => "PUT",
            CorsMethod::Delete => "DELETE",
            CorsMethod::Post => "POST",
            CorsMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for CorsMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorsMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(CorsMethod::Get),
            "PUT" => Ok(CorsMethod::Put),
            "DELETE" => Ok(CorsMethod::Delete),
            "POST" => Ok(CorsMethod::Post),
            "HEAD" => Ok(CorsMethod::Head),
            other => Err(Error::General(format!(
                "CORS method must be one of GET, PUT, DELETE, POST, HEAD, got '{other}'"
            ))),
        }
    }
}

/// One CORS rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsRule {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<CorsMethod>,
    #[serde(default)]
    pub allowed_headers: Vec<String>,
    #[serde(default)]
    pub max_age_seconds: u32,
}

impl CorsRule {
    /// Rule for a single origin
    pub fn new(
        origin: impl Into<String>,
        methods: Vec<CorsMethod>,
        max_age_seconds: u32,
        headers: Vec<String>,
    ) -> Self {
        Self {
            allowed_origins: vec![origin.into()],
            allowed_methods: methods,
            allowed_headers: headers,
            max_age_seconds,
        }
    }

    /// The origin this rule is keyed by
    pub fn origin(&self) -> Option<&str> {
        self.allowed_origins.first().map(String::as_str)
    }
}

/// Rules left after dropping every rule keyed by `origin`
pub fn without_origin(rules: Vec<CorsRule>, origin: &str) -> Vec<CorsRule> {
    rules
        .into_iter()
        .filter(|rule| rule.origin() != Some(origin))
        .collect()
}

/// CORS rules of one space
pub struct CorsRuleSet<'a> {
    store: &'a dyn ObjectStore,
    bucket: &'a str,
}

impl<'a> CorsRuleSet<'a> {
    pub fn new(store: &'a dyn ObjectStore, bucket: &'a str) -> Self {
        Self { store, bucket }
    }

    /// Current rules, or `None` when the space has no CORS configuration
    pub async fn get(&self) -> Result<Option<Vec<CorsRule>>> {
        match self.store.get_bucket_cors(self.bucket).await {
            Ok(rules) => Ok(Some(rules)),
            Err(Error::NoCorsConfiguration(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Allow `origin`, replacing any rule already keyed by it
    pub async fn add_origin(
        &self,
        origin: &str,
        methods: Vec<CorsMethod>,
        max_age_seconds: u32,
        headers: Vec<String>,
    ) -> Result<()> {
        let mut rules = self.rules_without(origin).await?;
        rules.push(CorsRule::new(origin, methods, max_age_seconds, headers));
        tracing::debug!(bucket = self.bucket, origin, rules = rules.len(), "Writing CORS rules");
        self.store.put_bucket_cors(self.bucket, &rules).await
    }

    /// Stop allowing `origin`
    pub async fn remove_origin(&self, origin: &str) -> Result<()> {
        let rules = self.rules_without(origin).await?;
        if rules.is_empty() {
            self.remove_all().await
        } else {
            tracing::debug!(bucket = self.bucket, origin, rules = rules.len(), "Writing CORS rules");
            self.store.put_bucket_cors(self.bucket, &rules).await
        }
    }

    /// Delete the whole CORS configuration
    pub async fn remove_all(&self) -> Result<()> {
        tracing::debug!(bucket = self.bucket, "Deleting CORS configuration");
        self.store.delete_bucket_cors(self.bucket).await
    }

    async fn rules_without(&self, origin: &str) -> Result<Vec<CorsRule>> {
        let rules = self.get().await?.unwrap_or_default();
        Ok(without_origin(rules, origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockObjectStore;
    use std::sync::{Arc, Mutex};

    /// Mock store whose CORS calls read and write a shared rule list
    fn cors_backed_store(state: Arc<Mutex<Option<Vec<CorsRule>>>>) -> MockObjectStore {
        let mut store = MockObjectStore::new();

        let get_state = state.clone();
        store.expect_get_bucket_cors().returning(move |bucket| {
            get_state
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| Error::NoCorsConfiguration(bucket.to_string()))
        });

        let put_state = state.clone();
        store.expect_put_bucket_cors().returning(move |_, rules| {
            assert!(!rules.is_empty(), "empty rule list must never be written");
            *put_state.lock().unwrap() = Some(rules.to_vec());
            Ok(())
        });

        store.expect_delete_bucket_cors().returning(move |_| {
            *state.lock().unwrap() = None;
            Ok(())
        });

        store
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("get".parse::<CorsMethod>().unwrap(), CorsMethod::Get);
        assert_eq!("HEAD".parse::<CorsMethod>().unwrap(), CorsMethod::Head);
        assert!("PATCH".parse::<CorsMethod>().is_err());
    }

    #[test]
    fn test_without_origin_drops_every_match() {
        let rules = vec![
            CorsRule::new("http://a.com", vec![CorsMethod::Get], 0, vec![]),
            CorsRule::new("http://b.com", vec![CorsMethod::Get], 0, vec![]),
            CorsRule::new("http://a.com", vec![CorsMethod::Put], 0, vec![]),
        ];
        let left = without_origin(rules, "http://a.com");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].origin(), Some("http://b.com"));
    }

    #[test]
    fn test_only_first_origin_is_matched() {
        let mut rule = CorsRule::new("http://b.com", vec![CorsMethod::Get], 0, vec![]);
        rule.allowed_origins.push("http://a.com".into());
        let left = without_origin(vec![rule], "http://a.com");
        assert_eq!(left.len(), 1);
    }

    #[tokio::test]
    async fn test_get_without_configuration_is_none() {
        let store = cors_backed_store(Arc::new(Mutex::new(None)));
        let cors = CorsRuleSet::new(&store, "t1");
        assert!(cors.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_then_remove_origin() {
        let store = cors_backed_store(Arc::new(Mutex::new(None)));
        let cors = CorsRuleSet::new(&store, "t1");

        cors.add_origin(
            "http://a.com",
            vec![CorsMethod::Get, CorsMethod::Put],
            3200,
            vec!["x-custom".into()],
        )
        .await
        .unwrap();

        let rules = cors.get().await.unwrap().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].allowed_origins, vec!["http://a.com".to_string()]);
        assert_eq!(rules[0].allowed_methods, vec![CorsMethod::Get, CorsMethod::Put]);
        assert_eq!(rules[0].allowed_headers, vec!["x-custom".to_string()]);
        assert_eq!(rules[0].max_age_seconds, 3200);

        cors.remove_origin("http://a.com").await.unwrap();
        assert!(cors.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_same_origin_twice_keeps_latest() {
        let store = cors_backed_store(Arc::new(Mutex::new(None)));
        let cors = CorsRuleSet::new(&store, "t1");

        cors.add_origin("http://a.com", vec![CorsMethod::Get], 60, vec![])
            .await
            .unwrap();
        cors.add_origin("http://b.com", vec![CorsMethod::Get], 60, vec![])
            .await
            .unwrap();
        cors.add_origin("http://a.com", vec![CorsMethod::Post], 120, vec![])
            .await
            .unwrap();

        let rules = cors.get().await.unwrap().unwrap();
        let for_a: Vec<_> = rules
            .iter()
            .filter(|r| r.origin() == Some("http://a.com"))
            .collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].allowed_methods, vec![CorsMethod::Post]);
        assert_eq!(for_a[0].max_age_seconds, 120);
    }

    #[tokio::test]
    async fn test_remove_one_of_two_puts_remaining() {
        let state = Arc::new(Mutex::new(Some(vec![
            CorsRule::new("http://a.com", vec![CorsMethod::Get], 0, vec![]),
            CorsRule::new("http://b.com", vec![CorsMethod::Get], 0, vec![]),
        ])));
        let store = cors_backed_store(state.clone());
        let cors = CorsRuleSet::new(&store, "t1");

        cors.remove_origin("http://a.com").await.unwrap();

        let rules = state.lock().unwrap().clone().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].origin(), Some("http://b.com"));
    }

    #[tokio::test]
    async fn test_remove_all_deletes_configuration() {
        let mut store = MockObjectStore::new();
        store
            .expect_delete_bucket_cors()
            .withf(|bucket| bucket == "t1")
            .times(1)
            .returning(|_| Ok(()));
        store.expect_put_bucket_cors().never();

        CorsRuleSet::new(&store, "t1").remove_all().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_propagates_other_errors() {
        let mut store = MockObjectStore::new();
        store
            .expect_get_bucket_cors()
            .returning(|_| Err(Error::service("AccessDenied", Some(403), "denied")));

        let err = CorsRuleSet::new(&store, "t1").get().await.unwrap_err();
        assert!(err.is_auth_failure());
    }
}
