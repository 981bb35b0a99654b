//! Access control resolution
//!
//! Spaces and files expose a single public/private switch. Reading it means
//! scanning the raw grant list for an anonymous read grant; writing it means
//! replacing the whole ACL with a canned one.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::traits::ObjectStore;

/// Grantee URI of the anonymous "everyone" group
pub const ALL_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// Canned ACLs understood by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    #[default]
    Private,
    PublicRead,
}

impl CannedAcl {
    /// Canned ACL for a public/private flag
    pub fn from_public(public: bool) -> Self {
        if public {
            CannedAcl::PublicRead
        } else {
            CannedAcl::Private
        }
    }

    /// Wire value of the canned ACL
    pub fn as_str(&self) -> &'static str {
        match self {
            CannedAcl::Private => "private",
            CannedAcl::PublicRead => "public-read",
        }
    }
}

/// Grant permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    FullControl,
    Read,
    ReadAcp,
    Write,
    WriteAcp,
    Other(String),
}

impl Permission {
    /// Parse a wire permission value
    pub fn parse(value: &str) -> Self {
        match value {
            "FULL_CONTROL" => Permission::FullControl,
            "READ" => Permission::Read,
            "READ_ACP" => Permission::ReadAcp,
            "WRITE" => Permission::Write,
            "WRITE_ACP" => Permission::WriteAcp,
            other => Permission::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Permission::FullControl => "FULL_CONTROL",
            Permission::Read => "READ",
            Permission::ReadAcp => "READ_ACP",
            Permission::Write => "WRITE",
            Permission::WriteAcp => "WRITE_ACP",
            Permission::Other(other) => other,
        }
    }
}

/// Who a grant applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Grantee {
    /// A predefined group, identified by URI
    Group { uri: String },
    /// A canonical user
    CanonicalUser {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
    },
    /// A user identified by e-mail address
    Email { address: String },
}

/// One ACL grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub grantee: Grantee,
    pub permission: Permission,
}

impl Grant {
    /// Grant to a group URI
    pub fn group(uri: impl Into<String>, permission: Permission) -> Self {
        Self {
            grantee: Grantee::Group { uri: uri.into() },
            permission,
        }
    }

    /// Grant to a canonical user id
    pub fn user(id: impl Into<String>, permission: Permission) -> Self {
        Self {
            grantee: Grantee::CanonicalUser {
                id: id.into(),
                display_name: None,
            },
            permission,
        }
    }

    /// Whether this grant lets anonymous users read
    pub fn is_anonymous_read(&self) -> bool {
        matches!(&self.grantee, Grantee::Group { uri } if uri == ALL_USERS_URI)
            && self.permission == Permission::Read
    }
}

/// What an ACL applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclTarget<'a> {
    Space(&'a str),
    File { space: &'a str, key: &'a str },
}

/// Whether a grant list makes its resource public
///
/// Only an `AllUsers` READ grant counts; `AuthenticatedUsers` and
/// non-READ permissions leave the resource private.
pub fn is_public(grants: &[Grant]) -> bool {
    grants.iter().any(Grant::is_anonymous_read)
}

/// Read the target's ACL and resolve it to a public/private verdict
pub async fn fetch_is_public(store: &dyn ObjectStore, target: AclTarget<'_>) -> Result<bool> {
    let grants = match target {
        AclTarget::Space(space) => store.get_bucket_acl(space).await?,
        AclTarget::File { space, key } => store.get_object_acl(space, key).await?,
    };
    Ok(is_public(&grants))
}

/// Replace the target's ACL with `public-read` or `private`
pub async fn set_public(store: &dyn ObjectStore, target: AclTarget<'_>, public: bool) -> Result<()> {
    let acl = CannedAcl::from_public(public);
    tracing::debug!(?target, acl = acl.as_str(), "Replacing ACL");
    match target {
        AclTarget::Space(space) => store.put_bucket_acl(space, acl).await,
        AclTarget::File { space, key } => store.put_object_acl(space, key, acl).await,
    }
}
