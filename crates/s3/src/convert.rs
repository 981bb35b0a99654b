//! Mapping between SDK types and spaces-core types

use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::delete_objects::DeleteObjectsOutput;
use aws_sdk_s3::types as s3;

use spaces_core::{CorsMethod, CorsRule, Error, Grant, Grantee, Permission, Result};

/// Error code for a bucket with no CORS configuration
const NO_CORS_CODE: &str = "NoSuchCORSConfiguration";

/// Convert an SDK error into a core error
///
/// Timeouts and dispatch failures become [`Error::Network`]. A service
/// response becomes [`Error::Service`] with its code, status and message;
/// bodiless responses (HEAD) get a code derived from the status.
pub(crate) fn sdk_error<E>(err: SdkError<E, HttpResponse>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            Error::Network(DisplayErrorContext(&err).to_string())
        }
        SdkError::ServiceError(context) => {
            let status = context.raw().status().as_u16();
            let code = context
                .err()
                .code()
                .map(str::to_string)
                .unwrap_or_else(|| status_code_name(status).to_string());
            let message = context.err().message().unwrap_or_default().to_string();
            Error::service(code, Some(status), message)
        }
        _ => Error::General(DisplayErrorContext(&err).to_string()),
    }
}

/// Like [`sdk_error`], but reports a missing CORS configuration as such
pub(crate) fn cors_error<E>(bucket: &str, err: SdkError<E, HttpResponse>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match sdk_error(err) {
        Error::Service { code, .. } if code == NO_CORS_CODE => {
            Error::NoCorsConfiguration(bucket.to_string())
        }
        other => other,
    }
}

fn status_code_name(status: u16) -> &'static str {
    match status {
        301 => "PermanentRedirect",
        400 => "BadRequest",
        403 => "Forbidden",
        404 => "NotFound",
        409 => "Conflict",
        412 => "PreconditionFailed",
        500 => "InternalError",
        503 => "ServiceUnavailable",
        _ => "Unknown",
    }
}

/// Number of deleted keys, or the first per-key failure of a delete-objects call
pub(crate) fn delete_outcome(bucket: &str, response: &DeleteObjectsOutput) -> Result<usize> {
    let errors = response.errors();
    let Some(first) = errors.first() else {
        return Ok(response.deleted().len());
    };

    let failed: Vec<&str> = errors.iter().filter_map(|e| e.key()).collect();
    Err(Error::service(
        first.code().unwrap_or("DeleteFailed"),
        None,
        format!(
            "{} ({} of {} key(s) not deleted from {bucket}: {})",
            first.message().unwrap_or("Failed to delete objects"),
            errors.len(),
            errors.len() + response.deleted().len(),
            failed.join(", "),
        ),
    ))
}

/// Strip the quotes S3 puts around ETags
pub(crate) fn clean_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

pub(crate) fn grant_from_sdk(grant: &s3::Grant) -> Option<Grant> {
    let grantee = grant.grantee()?;
    let grantee = match grantee.r#type() {
        s3::Type::Group => Grantee::Group {
            uri: grantee.uri()?.to_string(),
        },
        s3::Type::AmazonCustomerByEmail => Grantee::Email {
            address: grantee.email_address()?.to_string(),
        },
        _ => Grantee::CanonicalUser {
            id: grantee.id()?.to_string(),
            display_name: grantee.display_name().map(str::to_string),
        },
    };
    let permission = Permission::parse(grant.permission()?.as_str());
    Some(Grant {
        grantee,
        permission,
    })
}

pub(crate) fn cors_rule_from_sdk(rule: &s3::CorsRule) -> CorsRule {
    let allowed_methods = rule
        .allowed_methods()
        .iter()
        .filter_map(|method| match method.parse::<CorsMethod>() {
            Ok(method) => Some(method),
            Err(_) => {
                tracing::warn!(method = %method, "Ignoring unknown CORS method");
                None
            }
        })
        .collect();

    CorsRule {
        allowed_origins: rule.allowed_origins().to_vec(),
        allowed_methods,
        allowed_headers: rule.allowed_headers().to_vec(),
        max_age_seconds: rule.max_age_seconds().unwrap_or(0).max(0) as u32,
    }
}

pub(crate) fn cors_rule_to_sdk(rule: &CorsRule) -> Result<s3::CorsRule> {
    let methods = rule
        .allowed_methods
        .iter()
        .map(|m| m.as_str().to_string())
        .collect();
    let headers = if rule.allowed_headers.is_empty() {
        None
    } else {
        Some(rule.allowed_headers.clone())
    };

    s3::CorsRule::builder()
        .set_allowed_origins(Some(rule.allowed_origins.clone()))
        .set_allowed_methods(Some(methods))
        .set_allowed_headers(headers)
        .max_age_seconds(i32::try_from(rule.max_age_seconds).unwrap_or(i32::MAX))
        .build()
        .map_err(|e| Error::General(format!("Invalid CORS rule: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::get_bucket_cors::GetBucketCorsError;
    use aws_sdk_s3::operation::head_object::HeadObjectError;
    use aws_sdk_s3::types::error::NotFound;
    use aws_smithy_types::body::SdkBody;
    use spaces_core::acl::ALL_USERS_URI;

    fn response(status: u16) -> HttpResponse {
        HttpResponse::new(status.try_into().unwrap(), SdkBody::empty())
    }

    #[test]
    fn test_head_not_found_gets_code_from_status() {
        let err = SdkError::service_error(
            HeadObjectError::NotFound(NotFound::builder().build()),
            response(404),
        );
        let err = sdk_error(err);
        assert!(err.is_not_found());
        assert!(matches!(err, Error::Service { status: Some(404), .. }));
    }

    #[test]
    fn test_service_code_is_kept() {
        let meta = ErrorMetadata::builder()
            .code("AccessDenied")
            .message("Access Denied")
            .build();
        let err = SdkError::service_error(GetBucketCorsError::generic(meta), response(403));
        let err = sdk_error(err);
        assert!(err.is_auth_failure());
        assert_eq!(err.to_string(), "Service error (AccessDenied): Access Denied");
    }

    #[test]
    fn test_missing_cors_is_translated() {
        let meta = ErrorMetadata::builder().code(NO_CORS_CODE).build();
        let err = SdkError::service_error(GetBucketCorsError::generic(meta), response(404));
        assert!(matches!(
            cors_error("t1", err),
            Error::NoCorsConfiguration(ref bucket) if bucket == "t1"
        ));
    }

    #[test]
    fn test_timeout_is_network_error() {
        let err: SdkError<HeadObjectError, HttpResponse> = SdkError::timeout_error("too slow");
        assert!(matches!(sdk_error(err), Error::Network(_)));
    }

    #[test]
    fn test_delete_outcome_counts_deleted_keys() {
        let response = DeleteObjectsOutput::builder()
            .deleted(s3::DeletedObject::builder().key("logs/a").build())
            .deleted(s3::DeletedObject::builder().key("logs/b").build())
            .build();
        assert_eq!(delete_outcome("t1", &response).unwrap(), 2);
    }

    #[test]
    fn test_delete_outcome_fails_on_refused_key() {
        let response = DeleteObjectsOutput::builder()
            .deleted(s3::DeletedObject::builder().key("logs/a").build())
            .errors(
                s3::Error::builder()
                    .key("logs/b")
                    .code("AccessDenied")
                    .message("Access Denied")
                    .build(),
            )
            .build();

        let err = delete_outcome("t1", &response).unwrap_err();
        assert!(err.is_auth_failure());
        assert!(err.to_string().contains("logs/b"));
        assert!(err.to_string().contains("1 of 2"));
    }

    #[test]
    fn test_clean_etag() {
        assert_eq!(clean_etag("\"abc\""), "abc");
        assert_eq!(clean_etag("abc"), "abc");
    }

    #[test]
    fn test_group_grant() {
        let grant = s3::Grant::builder()
            .grantee(
                s3::Grantee::builder()
                    .r#type(s3::Type::Group)
                    .uri(ALL_USERS_URI)
                    .build()
                    .unwrap(),
            )
            .permission(s3::Permission::Read)
            .build();

        let grant = grant_from_sdk(&grant).unwrap();
        assert!(grant.is_anonymous_read());
    }

    #[test]
    fn test_user_grant() {
        let grant = s3::Grant::builder()
            .grantee(
                s3::Grantee::builder()
                    .r#type(s3::Type::CanonicalUser)
                    .id("owner-id")
                    .display_name("owner")
                    .build()
                    .unwrap(),
            )
            .permission(s3::Permission::FullControl)
            .build();

        let grant = grant_from_sdk(&grant).unwrap();
        assert_eq!(grant.permission, Permission::FullControl);
        assert!(matches!(grant.grantee, Grantee::CanonicalUser { ref id, .. } if id == "owner-id"));
    }

    #[test]
    fn test_cors_rule_conversion() {
        let rule = CorsRule::new(
            "https://a.com",
            vec![CorsMethod::Get, CorsMethod::Head],
            600,
            vec!["x-custom".into()],
        );
        let sdk = cors_rule_to_sdk(&rule).unwrap();
        assert_eq!(sdk.allowed_methods(), ["GET", "HEAD"]);
        assert_eq!(sdk.max_age_seconds(), Some(600));

        assert_eq!(cors_rule_from_sdk(&sdk), rule);
    }

    #[test]
    fn test_unknown_cors_method_is_dropped() {
        let sdk = s3::CorsRule::builder()
            .allowed_origins("https://a.com")
            .allowed_methods("GET")
            .allowed_methods("PATCH")
            .build()
            .unwrap();
        let rule = cors_rule_from_sdk(&sdk);
        assert_eq!(rule.allowed_methods, vec![CorsMethod::Get]);
        assert!(rule.allowed_headers.is_empty());
        assert_eq!(rule.max_age_seconds, 0);
    }
}
